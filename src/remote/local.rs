use std::path::PathBuf;

use tracing::debug;

use super::loader::{FileLoader, LoadFrom, LoaderFactory};
use super::location::StorageLocation;
use crate::image::codec::{self, Decoded};
use crate::state::storage::LocalStorage;

/// Loaders for a context without network access
///
/// Each loader reads the local persistent cache synchronously when started.
/// A miss finishes with nothing, which the entity records as cancelled.
#[derive(Debug, Clone, Default)]
pub struct LocalLoaderFactory {
    storage_path: Option<PathBuf>,
}

impl LocalLoaderFactory {
    pub fn new(storage_path: Option<PathBuf>) -> Self {
        Self { storage_path }
    }
}

impl LoaderFactory for LocalLoaderFactory {
    fn create(
        &self,
        location: &StorageLocation,
        size: u64,
        _from: LoadFrom,
        auto_loading: bool,
    ) -> Box<dyn FileLoader> {
        Box::new(LocalLoader {
            location: *location,
            size,
            storage_path: self.storage_path.clone(),
            auto_loading,
            done: false,
            bytes: Vec::new(),
            decoded: None,
        })
    }
}

#[derive(Debug)]
struct LocalLoader {
    location: StorageLocation,
    size: u64,
    storage_path: Option<PathBuf>,
    auto_loading: bool,
    done: bool,
    bytes: Vec<u8>,
    decoded: Option<Decoded>,
}

impl LocalLoader {
    fn read(&self) -> Option<Vec<u8>> {
        let path = self.storage_path.as_deref()?;
        let storage = LocalStorage::open(path).ok()?;
        storage.read(self.location.storage_key()).ok().flatten()
    }
}

impl FileLoader for LocalLoader {
    fn start(&mut self, _load_first: bool, _priority: bool) {
        if self.done {
            return;
        }
        if let Some(bytes) = self.read() {
            self.decoded = codec::decode(&bytes, None);
            self.bytes = bytes;
        } else {
            debug!("no local copy of {:?}", self.location.storage_key());
        }
        self.done = true;
    }

    fn cancel(&mut self) {
        self.done = true;
        self.bytes.clear();
        self.decoded = None;
    }

    fn done(&self) -> bool {
        self.done
    }

    fn take_bytes(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.bytes)
    }

    fn take_decoded(&mut self) -> Option<Decoded> {
        self.decoded.take()
    }

    fn current_progress(&self) -> f64 {
        if self.done && self.size > 0 {
            (self.bytes.len() as f64 / self.size as f64).min(1.0)
        } else {
            0.0
        }
    }

    fn current_offset(&self) -> u64 {
        self.bytes.len() as u64
    }

    fn permit_load_from_cloud(&mut self) {}

    fn loading_local(&self) -> bool {
        true
    }

    fn auto_loading(&self) -> bool {
        self.auto_loading
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};

    #[test]
    fn test_reads_stored_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("images.db");
        let location = StorageLocation::new(4, 4, 1, 10, 20, 0);

        let png = codec::encode(&RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 255])), false, ImageFormat::Png).unwrap();
        LocalStorage::open(&path).unwrap().write(location.storage_key(), &png);

        let factory = LocalLoaderFactory::new(Some(path));
        let mut loader = factory.create(&location, png.len() as u64, LoadFrom::LocalOnly, true);
        assert!(!loader.done());

        loader.start(false, false);
        assert!(loader.done());
        assert_eq!(loader.current_progress(), 1.0);
        assert_eq!(loader.take_decoded().unwrap().bitmap.dimensions(), (4, 4));
        assert_eq!(loader.take_bytes(), png);
    }

    #[test]
    fn test_miss_finishes_empty() {
        let mut loader = LocalLoaderFactory::new(None).create(
            &StorageLocation::new(1, 1, 1, 1, 1, 1),
            10,
            LoadFrom::CloudOrLocal,
            false,
        );
        loader.start(true, true);
        assert!(loader.done());
        assert!(loader.take_decoded().is_none());
        assert!(loader.take_bytes().is_empty());
    }
}
