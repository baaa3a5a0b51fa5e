//! Directory-backed key-value store.
//!
//! Each key is one file under the root directory. Keys are escaped so that
//! any string maps to a safe file name: bytes outside `[A-Za-z0-9_-]` are
//! written as `%XX`.

use std::fmt::Write as _;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{KeyValueStore, StorageError};

const FILE_EXTENSION: &str = "json";

/// A store that keeps each key in its own file.
///
/// The root directory is created on first write. Writes go to a temporary
/// sibling file which is then renamed over the target, so a failed write
/// leaves the previous value in place.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
    quota: Option<usize>,
}

impl FileStore {
    /// Create a store rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            quota: None,
        }
    }

    /// Limit each stored value to `quota` bytes.
    #[must_use]
    pub const fn with_quota(mut self, quota: usize) -> Self {
        self.quota = Some(quota);
        self
    }

    /// The root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file holding `key`.
    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root
            .join(format!("{}.{FILE_EXTENSION}", escape_key(key)))
    }
}

fn escape_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'-' {
            out.push(char::from(byte));
        } else {
            let _ = write!(out, "%{byte:02X}");
        }
    }
    out
}

impl KeyValueStore for FileStore {
    fn is_available(&self) -> bool {
        // A root that exists as a regular file can never hold keys.
        !self.root.is_file()
    }

    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Some(quota) = self.quota.filter(|&quota| value.len() > quota) {
            return Err(StorageError::QuotaExceeded {
                needed: value.len(),
                quota,
            });
        }

        fs::create_dir_all(&self.root)?;

        let target = self.path_for(key);
        let staging = target.with_extension(format!("{FILE_EXTENSION}.tmp"));
        if let Err(e) = fs::write(&staging, value) {
            let _ = fs::remove_file(&staging);
            return Err(e.into());
        }
        fs::rename(&staging, &target).map_err(|e| {
            let _ = fs::remove_file(&staging);
            StorageError::from(e)
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
