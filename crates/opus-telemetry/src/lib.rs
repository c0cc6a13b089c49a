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

//! Logging setup shared by the opus administration binaries.

pub mod init;

pub use init::{
    DEFAULT_LOG_LEVEL, LOG_FILTER_ENV, LogFormat, LoggingConfig, init_logging, level_filter,
};
