use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::Result;
use crate::remote::StorageKey;

/// The LocalStorage keeps raw image bytes in an SQLite database.
/// It is the persistent layer under remote-backed images: bytes received
/// from the network are written here and read back before going online again.
pub struct LocalStorage {
    conn: Connection,
    db_path: Option<PathBuf>,
}

impl LocalStorage {
    /// Open (or create) the database file at `path`.
    ///
    /// The parent directory is created when missing. Background loaders call
    /// this too: rusqlite::Connection is not Sync, so every thread opens its own.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        let storage = LocalStorage {
            conn,
            db_path: Some(path.to_path_buf()),
        };
        storage.init_schema()?;

        debug!("local image storage opened at {}", path.display());
        Ok(storage)
    }

    /// A private database that disappears with the connection
    pub fn open_in_memory() -> Result<Self> {
        let storage = LocalStorage {
            conn: Connection::open_in_memory()?,
            db_path: None,
        };
        storage.init_schema()?;
        Ok(storage)
    }

    /// Creates the images table if it doesn't exist.
    fn init_schema(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS images (
                key_hi          INTEGER NOT NULL,
                key_lo          INTEGER NOT NULL,
                bytes           BLOB NOT NULL,
                written_at      INTEGER NOT NULL,
                PRIMARY KEY (key_hi, key_lo)
            )",
            [],
        )?;
        Ok(())
    }

    /// Get the path to the database file, `None` for in-memory storage
    pub fn path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Persist `bytes` under `key`, logging instead of failing
    pub fn write(&self, key: StorageKey, bytes: &[u8]) {
        if let Err(e) = self.try_write(key, bytes) {
            warn!("failed to persist image {:?}: {}", key, e);
        }
    }

    /// Persist `bytes` under `key`, replacing any previous copy
    pub fn try_write(&self, key: StorageKey, bytes: &[u8]) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO images (key_hi, key_lo, bytes, written_at) VALUES (?1, ?2, ?3, ?4)",
            params![key.hi as i64, key.lo as i64, bytes, Utc::now().timestamp()],
        )?;
        Ok(())
    }

    pub fn read(&self, key: StorageKey) -> Result<Option<Vec<u8>>> {
        let bytes = self
            .conn
            .query_row(
                "SELECT bytes FROM images WHERE key_hi = ?1 AND key_lo = ?2",
                params![key.hi as i64, key.lo as i64],
                |row| row.get(0),
            )
            .optional()?;
        Ok(bytes)
    }

    /// Delete the stored copy, returns whether there was one
    pub fn remove(&self, key: StorageKey) -> Result<bool> {
        let changed = self.conn.execute(
            "DELETE FROM images WHERE key_hi = ?1 AND key_lo = ?2",
            params![key.hi as i64, key.lo as i64],
        )?;
        Ok(changed > 0)
    }

    /// Get a count of images in the storage
    pub fn image_count(&self) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM images", [], |row| row.get(0))?;
        Ok(count)
    }
}

// Implement Debug for better error messages
impl std::fmt::Debug for LocalStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalStorage")
            .field("db_path", &self.db_path)
            .finish()
    }
}
