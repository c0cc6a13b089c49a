//! Fixed locations and reserved keys for the profile store.
//!
//! # Design
//! - One store file per host; the path is configuration, not per-call input.
//! - Reserved keys are written by the store itself and never taken verbatim
//!   from a submitted resource.

/// Store location used when no override is configured.
pub const DEFAULT_STORE_PATH: &str = "/etc/asterisk/codecs.d/opus_via_ui.conf";
/// Codec family tag written to the `type` key of every profile section.
pub const CODEC_TYPE: &str = "opus";
/// Reserved key carrying the codec family tag.
pub(crate) const TYPE_KEY: &str = "type";
/// Reserved key mirroring the section name.
pub(crate) const NAME_KEY: &str = "name";
/// Key exposing the section name as the profile's external identifier.
pub(crate) const ID_KEY: &str = "id";
/// Caller-supplied unique identifier that `update` never writes.
pub(crate) const UNIQUE_ID_FIELD: &str = "uuid";
/// Suffix of the sidecar file used for advisory locking.
pub(crate) const LOCK_SUFFIX: &str = ".lock";
