use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::remote::{LoaderSlot, StorageLocation};

/// Largest file an entity will read, anything bigger degrades to an empty key
pub const MAX_FILE_SIZE: u64 = i32::MAX as u64;

/// Identity of a local file: size, modification time and path
///
/// A file rewritten in place gets a new key, so stale decodes are never reused.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct FileKey {
    pub size: u64,
    /// Seconds since the epoch
    pub modified: i64,
    pub path: PathBuf,
}

impl FileKey {
    pub fn from_path(path: &Path) -> Self {
        let Ok(meta) = std::fs::metadata(path) else {
            return Self {
                path: path.to_path_buf(),
                ..Self::default()
            };
        };

        if meta.len() > MAX_FILE_SIZE {
            warn!("{} is too large to load ({} bytes)", path.display(), meta.len());
            return Self::default();
        }

        let modified = meta
            .modified()
            .map(|time| DateTime::<Utc>::from(time).timestamp())
            .unwrap_or(0);

        Self {
            size: meta.len(),
            modified,
            path: path.to_path_buf(),
        }
    }

    /// The empty key an unreadable or oversized file degrades to
    pub fn is_empty(&self) -> bool {
        self.path.as_os_str().is_empty()
    }
}

/// Kind of chat that asks for an automatic download
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatKind {
    Private,
    Group,
}

/// Remote-only state of an entity
#[derive(Debug)]
pub struct RemoteState {
    pub location: StorageLocation,
    /// Expected byte size, corrected to the real size on arrival
    pub size: u64,
    pub loader: LoaderSlot,
}

/// Where an entity's bytes come from
#[derive(Debug)]
pub enum Origin {
    /// The context's blank placeholder
    Placeholder,
    /// A file on disk, read on first access
    File(FileKey),
    /// Bytes or a bitmap handed over by the caller
    Memory,
    Remote(RemoteState),
}
