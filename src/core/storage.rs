//! Durable key-value slots for conversation snapshots.
//!
//! A slot holds one text value. [`FileStorage`] keeps each slot in its own
//! file under a data directory and replaces it atomically on write;
//! [`MemoryStorage`] is used where nothing should touch the disk.

use std::collections::HashMap;
use std::error::Error as StdError;
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use tempfile::NamedTempFile;

use crate::core::config::data::path_display;

const SNAPSHOT_EXTENSION: &str = "json";

/// Errors raised while touching a storage slot.
#[derive(Debug)]
pub enum StorageError {
    Read { path: PathBuf, source: io::Error },
    Write { path: PathBuf, source: io::Error },
    Remove { path: PathBuf, source: io::Error },
    /// The conversation could not be serialized; nothing was written.
    Encode(serde_json::Error),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Read { path, source } => {
                write!(f, "Failed to read {}: {}", path_display(path), source)
            }
            StorageError::Write { path, source } => {
                write!(f, "Failed to write {}: {}", path_display(path), source)
            }
            StorageError::Remove { path, source } => {
                write!(f, "Failed to remove {}: {}", path_display(path), source)
            }
            StorageError::Encode(err) => write!(f, "Failed to encode conversation: {err}"),
        }
    }
}

impl StdError for StorageError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            StorageError::Read { source, .. }
            | StorageError::Write { source, .. }
            | StorageError::Remove { source, .. } => Some(source),
            StorageError::Encode(err) => Some(err),
        }
    }
}

pub trait SnapshotStorage {
    /// Returns `Ok(None)` when nothing is stored under `key`.
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    /// Removing an absent key succeeds.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Storage rooted at the per-user data directory.
    pub fn in_default_location() -> Option<Self> {
        Self::default_dir().map(Self::new)
    }

    pub fn default_dir() -> Option<PathBuf> {
        ProjectDirs::from("org", "gemchat", "gemchat").map(|dirs| dirs.data_dir().to_path_buf())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn slot_path(&self, key: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{}", encode_key(key), SNAPSHOT_EXTENSION))
    }
}

impl SnapshotStorage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.slot_path(key);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Read { path, source }),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.slot_path(key);
        write_atomically(&self.dir, &path, value)
            .map_err(|source| StorageError::Write { path, source })
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let path = self.slot_path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Remove { path, source }),
        }
    }
}

fn write_atomically(dir: &Path, path: &Path, value: &str) -> io::Result<()> {
    fs::create_dir_all(dir)?;
    let mut temp_file = NamedTempFile::new_in(dir)?;
    temp_file.write_all(value.as_bytes())?;
    temp_file.as_file_mut().sync_all()?;
    temp_file.persist(path).map_err(|err| err.error)?;
    Ok(())
}

/// Encode a key as a file name. `[A-Za-z0-9-]` pass through and every other
/// byte of the key's UTF-8 form becomes `_XX`, so distinct keys never share a
/// file. The empty key is `_`, which no other key can produce.
fn encode_key(key: &str) -> String {
    if key.is_empty() {
        return "_".to_string();
    }

    let mut encoded = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' {
            encoded.push(char::from(byte));
        } else {
            encoded.push_str(&format!("_{byte:02X}"));
        }
    }
    encoded
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    slots: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.slots.contains_key(key)
    }
}

impl SnapshotStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.slots.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.slots.remove(key);
        Ok(())
    }
}

/// Storage whose every operation fails with an I/O error.
#[cfg(test)]
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct FailingStorage;

#[cfg(test)]
impl FailingStorage {
    fn path(key: &str) -> PathBuf {
        PathBuf::from("/unavailable").join(key)
    }

    fn error() -> io::Error {
        io::Error::new(io::ErrorKind::PermissionDenied, "storage unavailable")
    }
}

#[cfg(test)]
impl SnapshotStorage for FailingStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Read {
            path: Self::path(key),
            source: Self::error(),
        })
    }

    fn write(&mut self, key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Write {
            path: Self::path(key),
            source: Self::error(),
        })
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        Err(StorageError::Remove {
            path: Self::path(key),
            source: Self::error(),
        })
    }
}
