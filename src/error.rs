//! Error type shared by the fallible parts of the cache
//!
//! Rendering accessors never return errors; they degrade to the blank
//! placeholder instead. Storage, configuration and remote fetching do.

use thiserror::Error;

/// Errors produced by storage, configuration, codec and remote plumbing
#[derive(Debug, Error)]
pub enum PixError {
    /// The codec rejected the bytes
    #[error("image codec error: {0}")]
    Image(#[from] image::ImageError),

    /// Neither the native format nor PNG could encode the bitmap
    #[error("failed to encode bitmap as {0}")]
    Encode(String),

    /// Local persistent cache failure
    #[error("local storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration could not be parsed or written
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),

    /// A remote source failed to deliver bytes
    #[error("remote fetch failed: {0}")]
    Remote(String),
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, PixError>;
