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
#![allow(clippy::module_name_repetitions, clippy::redundant_pub_crate)]

//! File-backed store for Opus codec profiles.
//!
//! Layout: `model.rs` (profile records and submitted resources), `ini.rs`
//! (section-oriented text codec), `store.rs` (`ProfileStore`), `validate.rs`
//! (form constraint table), `defaults.rs` (fixed paths and reserved keys).

pub mod defaults;
pub mod error;
mod ini;
pub mod model;
pub mod store;
pub mod validate;

pub use defaults::{CODEC_TYPE, DEFAULT_STORE_PATH};
pub use error::{ConfigError, ConfigResult};
pub use model::{OpusOption, Profile, ProfileList, ProfileResource};
pub use store::ProfileStore;
pub use validate::{
    Constraint, NAME_MAX_LEN, OPTION_CONSTRAINTS, OptionConstraint, validate_resource,
};
