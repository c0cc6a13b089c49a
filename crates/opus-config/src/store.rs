//! `ProfileStore`: CRUD over the sections of a single profile file.
//!
//! # Design
//! - The store is configured with its path and holds no parsed state; every
//!   operation opens, parses, and closes the file itself.
//! - Reads hold a shared advisory lock and read-modify-write cycles hold an
//!   exclusive one, both on a sidecar `<store>.lock` file so the data file can
//!   be replaced by rename while the lock stays valid.
//! - `create` appends, leaving existing bytes untouched. `update` and `delete`
//!   rewrite through a temporary file in the same directory and rename it
//!   over the store.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use nix::fcntl::{Flock, FlockArg};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::defaults::{CODEC_TYPE, LOCK_SUFFIX, NAME_KEY, TYPE_KEY, UNIQUE_ID_FIELD};
use crate::error::{ConfigError, ConfigResult};
use crate::ini::{IniDocument, IniSection};
use crate::model::{OpusOption, Profile, ProfileResource, is_truthy, render_value};

/// File-backed profile store.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    path: PathBuf,
    lock_path: PathBuf,
}

impl ProfileStore {
    /// Create a store backed by the file at `path`. The file need not exist.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut lock_path = OsString::from(path.as_os_str());
        lock_path.push(LOCK_SUFFIX);
        Self {
            path,
            lock_path: PathBuf::from(lock_path),
        }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All profiles in file order. A missing or empty file yields no profiles.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MalformedStore`] when the file cannot be parsed,
    /// or an IO/lock error when it cannot be read.
    pub fn list(&self) -> ConfigResult<Vec<Profile>> {
        let document = self.read_shared()?;
        let profiles: Vec<Profile> = document
            .sections()
            .iter()
            .map(Profile::from_section)
            .collect();
        debug!(path = %self.path.display(), count = profiles.len(), "listed profiles");
        Ok(profiles)
    }

    /// The profile stored under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] when no such section exists, plus the
    /// read errors of [`ProfileStore::list`].
    pub fn get(&self, name: &str) -> ConfigResult<Profile> {
        let document = self.read_shared()?;
        document
            .section(name)
            .map(Profile::from_section)
            .ok_or_else(|| not_found(name))
    }

    /// Append a new profile section built from `resource`.
    ///
    /// `type` and `name` are always written; each Opus option is written only
    /// when the submitted value is truthy.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DuplicateSection`] when the name is taken, a
    /// resource error when `name` or an option value is unrepresentable, plus
    /// read and write failures.
    pub fn create(&self, resource: &ProfileResource) -> ConfigResult<Profile> {
        let name = resource.name()?;
        check_section_name(name)?;

        let mut section = IniSection::new(name);
        section.set(TYPE_KEY, CODEC_TYPE);
        section.set(NAME_KEY, name);
        for option in OpusOption::ALL {
            let key = option.as_str();
            let rendered = resource
                .get(key)
                .filter(|value| is_truthy(value))
                .and_then(render_value);
            if let Some(value) = rendered {
                section.set(key, check_option_value(key, &value)?);
            }
        }

        let _lock = self.lock(FlockArg::LockExclusive)?;
        let existing = self.read_text()?;
        let document = self.parse(existing.as_deref().unwrap_or_default())?;
        if document.contains(name) {
            return Err(ConfigError::DuplicateSection {
                section: name.to_string(),
            });
        }

        let mut payload = String::new();
        if existing
            .as_deref()
            .is_some_and(|text| !text.is_empty() && !text.ends_with('\n'))
        {
            payload.push('\n');
        }
        payload.push_str(&section.render());
        self.append(&payload)?;

        info!(path = %self.path.display(), section = name, "profile created");
        Ok(Profile::from_section(&section))
    }

    /// Rewrite the attributes of an existing profile from `resource`.
    ///
    /// `type` is reset to the codec constant. Every other submitted key except
    /// `uuid` is written when its value is not null, so explicit `false`, `0`,
    /// or `"no"` values are stored.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] when the section does not exist, a
    /// resource error for a missing name or an unstorable key or value, plus
    /// read and write failures.
    pub fn update(&self, resource: &ProfileResource) -> ConfigResult<Profile> {
        let name = resource.name()?;

        let mut pending = Vec::new();
        for (key, value) in resource.iter() {
            let key = key.to_lowercase();
            if key == UNIQUE_ID_FIELD || key == TYPE_KEY {
                continue;
            }
            check_option_key(&key)?;
            if let Some(text) = render_value(value) {
                let stored = check_option_value(&key, &text)?;
                pending.push((key, stored));
            }
        }

        let _lock = self.lock(FlockArg::LockExclusive)?;
        let mut document = self.load()?;
        let section = document.section_mut(name).ok_or_else(|| not_found(name))?;
        section.set(TYPE_KEY, CODEC_TYPE);
        for (key, text) in pending {
            section.set(&key, text);
        }
        let profile = Profile::from_section(section);
        self.replace(&document)?;

        info!(path = %self.path.display(), section = name, "profile updated");
        Ok(profile)
    }

    /// Remove the profile stored under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] when no such section exists, plus read
    /// and write failures.
    pub fn delete(&self, name: &str) -> ConfigResult<()> {
        let _lock = self.lock(FlockArg::LockExclusive)?;
        let mut document = self.load()?;
        if !document.remove_section(name) {
            return Err(not_found(name));
        }
        self.replace(&document)?;

        info!(path = %self.path.display(), section = name, "profile deleted");
        Ok(())
    }

    fn read_shared(&self) -> ConfigResult<IniDocument> {
        if !self.path.exists() {
            return Ok(IniDocument::default());
        }
        let _lock = self.lock(FlockArg::LockShared)?;
        self.load()
    }

    fn load(&self) -> ConfigResult<IniDocument> {
        let text = self.read_text()?;
        self.parse(text.as_deref().unwrap_or_default())
    }

    fn read_text(&self) -> ConfigResult<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(self.io_error("read_store", source)),
        }
    }

    fn parse(&self, text: &str) -> ConfigResult<IniDocument> {
        IniDocument::parse(text).map_err(|err| ConfigError::MalformedStore {
            path: self.path.clone(),
            line: err.line,
            reason: err.reason,
        })
    }

    fn lock(&self, mode: FlockArg) -> ConfigResult<Flock<File>> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.lock_path)
            .map_err(|source| ConfigError::Io {
                operation: "open_lock",
                path: self.lock_path.clone(),
                source,
            })?;
        Flock::lock(file, mode).map_err(|(_, source)| ConfigError::Lock {
            path: self.lock_path.clone(),
            source,
        })
    }

    fn append(&self, payload: &str) -> ConfigResult<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| self.io_error("open_store", source))?;
        file.write_all(payload.as_bytes())
            .map_err(|source| self.io_error("append_store", source))?;
        file.sync_all()
            .map_err(|source| self.io_error("sync_store", source))
    }

    fn replace(&self, document: &IniDocument) -> ConfigResult<()> {
        let dir = self
            .path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut temp = NamedTempFile::new_in(dir).map_err(|source| ConfigError::Io {
            operation: "create_temp",
            path: dir.to_path_buf(),
            source,
        })?;
        temp.write_all(document.render().as_bytes())
            .map_err(|source| ConfigError::Io {
                operation: "write_temp",
                path: temp.path().to_path_buf(),
                source,
            })?;
        temp.as_file()
            .sync_all()
            .map_err(|source| ConfigError::Io {
                operation: "sync_temp",
                path: temp.path().to_path_buf(),
                source,
            })?;
        if let Ok(metadata) = fs::metadata(&self.path) {
            fs::set_permissions(temp.path(), metadata.permissions()).map_err(|source| {
                ConfigError::Io {
                    operation: "copy_permissions",
                    path: temp.path().to_path_buf(),
                    source,
                }
            })?;
        }
        temp.persist(&self.path)
            .map_err(|err| self.io_error("replace_store", err.error))?;
        Ok(())
    }

    fn io_error(&self, operation: &'static str, source: io::Error) -> ConfigError {
        ConfigError::Io {
            operation,
            path: self.path.clone(),
            source,
        }
    }
}

fn not_found(name: &str) -> ConfigError {
    ConfigError::NotFound {
        section: name.to_string(),
    }
}

fn check_section_name(name: &str) -> ConfigResult<()> {
    let reason = if name.trim().is_empty() {
        "must not be empty"
    } else if name.contains(['[', ']']) {
        "must not contain brackets"
    } else if name.contains(['\n', '\r']) {
        "must not contain line breaks"
    } else {
        return Ok(());
    };
    Err(ConfigError::InvalidSectionName {
        value: name.to_string(),
        reason,
    })
}

fn check_option_key(key: &str) -> ConfigResult<()> {
    let trimmed = key.trim();
    if trimmed.is_empty()
        || trimmed != key
        || key.starts_with(['[', '#', ';'])
        || key.contains(['=', ':', '\n', '\r'])
    {
        return Err(ConfigError::InvalidField {
            field: key.to_string(),
            value: None,
            reason: "key cannot be stored",
        });
    }
    Ok(())
}

/// The text `value` reads back as once written under `key`.
///
/// Lines are trimmed and trailing line breaks dropped, as the reader does.
/// A blank or comment-led continuation line cannot be read back at all.
fn check_option_value(key: &str, value: &str) -> ConfigResult<String> {
    let mut lines = value.trim_end().split('\n').map(str::trim);
    let mut stored = lines.next().unwrap_or_default().to_string();
    for line in lines {
        let reason = if line.is_empty() {
            "blank lines cannot be stored"
        } else if line.starts_with(['#', ';']) {
            "continuation line starts with a comment marker"
        } else {
            stored.push('\n');
            stored.push_str(line);
            continue;
        };
        return Err(ConfigError::InvalidField {
            field: key.to_string(),
            value: Some(value.to_string()),
            reason,
        });
    }
    Ok(stored)
}
