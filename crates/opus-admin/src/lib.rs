#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions)]

//! Profile administration: store mutations followed by a service reload.
//!
//! Layout: `reload.rs` (`ReloadNotifier` and the HTTP `ReloadCoordinator`),
//! `service.rs` (`ProfileService` and mutation outcomes), `settings.rs`
//! (resolved configuration), `error.rs` (service and reload errors).

pub mod error;
pub mod reload;
pub mod service;
pub mod settings;

pub use error::{AdminError, AdminResult, ReloadError};
pub use reload::{ReloadCoordinator, ReloadNotifier};
pub use service::{MutationOutcome, ProfileService, ReloadStatus};
pub use settings::{AdminSettings, ReloadSettings};
