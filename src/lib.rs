/// Client-side image cache
///
/// Image entities are looked up through an `ImageContext`, which
/// de-duplicates them by file or remote location. Each entity keeps its
/// decoded bitmap and encoded bytes and caches derived variants: scaled,
/// blurred, tinted, rounded or letterboxed. Every resident bitmap is charged
/// to one byte counter so callers can decide when to `forget` images.
pub mod cache;
pub mod config;
pub mod context;
pub mod error;
pub mod filters;
pub mod image;
pub mod remote;
pub mod state;

pub use cache::{MemoryCounter, Pixmap, VariantKey, VariantKind};
pub use config::{AutoDownload, CacheConfig, ScaleFilter};
pub use context::{ImageContext, ImageKey, ImageMut};
pub use error::{PixError, Result};
pub use self::image::{ChatKind, FileKey, Image};
pub use remote::{
    FileLoader, LoadFrom, LoaderFactory, LocalLoaderFactory, Progress, RemoteSource, StorageKey,
    StorageLocation, TaskLoaderFactory,
};
