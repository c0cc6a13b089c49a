//! Scratch profile stores for integration tests.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::TempDir;

/// File name used for scratch stores, matching the production file name.
pub const STORE_FILE_NAME: &str = "opus_via_ui.conf";

/// Two profiles laid out the way the store writes them.
pub const SAMPLE_STORE: &str = "\
[office]
type = opus
name = office
packet_loss = 10
signal = voice

[music]
type = opus
name = music
signal = music
bitrate = 128000
fec = yes

";

/// A store path inside a temporary directory that is removed on drop.
#[derive(Debug)]
pub struct ScratchStore {
    dir: TempDir,
    path: PathBuf,
}

impl ScratchStore {
    /// Scratch directory with no store file yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary directory cannot be created.
    pub fn empty() -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("opus-store-")
            .tempdir()
            .context("failed to create scratch directory")?;
        let path = dir.path().join(STORE_FILE_NAME);
        Ok(Self { dir, path })
    }

    /// Scratch store pre-populated with `contents`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be created.
    pub fn with_contents(contents: &str) -> Result<Self> {
        let store = Self::empty()?;
        fs::write(&store.path, contents)
            .with_context(|| format!("failed to seed {}", store.path.display()))?;
        Ok(store)
    }

    /// Scratch store seeded with [`SAMPLE_STORE`].
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be created.
    pub fn sample() -> Result<Self> {
        Self::with_contents(SAMPLE_STORE)
    }

    /// Path of the store file (which may not exist yet).
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory holding the store.
    #[must_use]
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Current store contents; empty when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub fn contents(&self) -> Result<String> {
        if !self.path.exists() {
            return Ok(String::new());
        }
        fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_store_has_no_file() -> Result<()> {
        let store = ScratchStore::empty()?;
        assert!(!store.path().exists());
        assert!(store.dir().is_dir());
        assert_eq!(store.contents()?, "");
        Ok(())
    }

    #[test]
    fn sample_store_is_seeded() -> Result<()> {
        let store = ScratchStore::sample()?;
        assert_eq!(store.contents()?, SAMPLE_STORE);
        assert!(store.path().ends_with(STORE_FILE_NAME));
        Ok(())
    }
}
