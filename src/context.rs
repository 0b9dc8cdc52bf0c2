/// The image cache service
///
/// One `ImageContext` owns every image entity in an arena, the two
/// de-duplicating lookup tables (local files and remote locations), the
/// shared byte counter, the corner masks and the loader factory. Callers
/// hold `ImageKey` handles and reach entities through `image(key)`.
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use image::{ImageFormat, Rgba, RgbaImage};
use slotmap::{new_key_type, SlotMap};
use tracing::{debug, info};

use crate::cache::{MemoryCounter, Pixmap};
use crate::config::{AutoDownload, CacheConfig};
use crate::error::Result;
use crate::filters::{Canvas, CornerMasks};
use crate::image::{ChatKind, Env, FileKey, Image, Origin};
use crate::remote::{LoaderFactory, LocalLoaderFactory, StorageKey, StorageLocation};
use crate::state::storage::LocalStorage;

new_key_type! { pub struct ImageKey; }

pub struct ImageContext {
    config: CacheConfig,
    counter: MemoryCounter,
    masks: CornerMasks,
    blank_key: ImageKey,
    blank: Pixmap,
    images: SlotMap<ImageKey, Image>,
    local_files: HashMap<FileKey, ImageKey>,
    remote: HashMap<StorageKey, ImageKey>,
    storage: Option<LocalStorage>,
    loaders: Box<dyn LoaderFactory>,
}

impl ImageContext {
    /// A context whose remote images are only served from local storage
    pub fn new(config: CacheConfig) -> Result<Self> {
        let loaders = LocalLoaderFactory::new(config.storage_path.clone());
        Self::with_loaders(config, Box::new(loaders))
    }

    pub fn with_loaders(config: CacheConfig, loaders: Box<dyn LoaderFactory>) -> Result<Self> {
        let storage = match &config.storage_path {
            Some(path) => Some(LocalStorage::open(path)?),
            None => None,
        };

        let counter = MemoryCounter::new();
        let mut images = SlotMap::with_key();
        let placeholder = Image::placeholder(counter.clone());
        let blank = placeholder
            .data()
            .cloned()
            .unwrap_or_else(|| Arc::new(RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 0]))));
        let blank_key = images.insert(placeholder);

        info!(
            "image context ready (dpr {}, radius {}, storage {:?})",
            config.dpr(),
            config.corner_radius,
            config.storage_path
        );

        Ok(Self {
            masks: CornerMasks::new(config.corner_radius * config.dpr()),
            config,
            counter,
            blank_key,
            blank,
            images,
            local_files: HashMap::new(),
            remote: HashMap::new(),
            storage,
            loaders,
        })
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn storage(&self) -> Option<&LocalStorage> {
        self.storage.as_ref()
    }

    /// The blank placeholder every failed lookup degrades to
    pub fn blank(&self) -> ImageKey {
        self.blank_key
    }

    pub fn is_null(&self, key: ImageKey) -> bool {
        key == self.blank_key
    }

    /// Number of live entities, the placeholder included
    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Bytes held by every resident bitmap, decoded or derived
    pub fn acquired_size(&self) -> i64 {
        self.counter.get()
    }

    /// Entity for a local file, shared by every lookup of the same file version
    pub fn image_from_file(&mut self, path: &Path, format: Option<ImageFormat>) -> ImageKey {
        let key = FileKey::from_path(path);
        if key.is_empty() {
            return self.blank_key;
        }
        if let Some(&existing) = self.local_files.get(&key) {
            return existing;
        }

        let image = Image::from_file(key.clone(), format, self.counter.clone());
        let handle = self.images.insert(image);
        self.local_files.insert(key, handle);
        handle
    }

    /// Unregistered entity decoded from bytes
    pub fn image_from_bytes(&mut self, bytes: Vec<u8>, format: Option<ImageFormat>) -> ImageKey {
        let image = Image::from_bytes(bytes, format, self.counter.clone());
        self.images.insert(image)
    }

    /// Unregistered entity from a decoded bitmap, with or without its encoded bytes
    pub fn image_from_bitmap(
        &mut self,
        bitmap: RgbaImage,
        has_alpha: bool,
        format: ImageFormat,
        bytes: Vec<u8>,
    ) -> ImageKey {
        let image = Image::from_bitmap(bitmap, has_alpha, format, bytes, self.counter.clone());
        self.images.insert(image)
    }

    /// Entity for a remote location, loaded on demand
    pub fn image_from_location(&mut self, location: StorageLocation, size: u64) -> ImageKey {
        if location.is_null() {
            return self.blank_key;
        }
        let key = location.storage_key();
        if let Some(&existing) = self.remote.get(&key) {
            return existing;
        }

        let image = Image::from_location(location, size, self.counter.clone());
        let handle = self.images.insert(image);
        self.remote.insert(key, handle);
        handle
    }

    /// Entity for a remote location whose bytes are already known
    ///
    /// The bytes are persisted to local storage. An existing entity that has
    /// not loaded yet adopts them in place of its pending load.
    pub fn image_from_location_bytes(&mut self, location: StorageLocation, bytes: Vec<u8>) -> ImageKey {
        if location.is_null() || bytes.is_empty() {
            return self.blank_key;
        }
        let key = location.storage_key();

        if let Some(&existing) = self.remote.get(&key) {
            if let Some(image) = self.images.get_mut(existing) {
                if !image.loaded() {
                    if let Some(storage) = &self.storage {
                        storage.write(key, &bytes);
                    }
                    image.set_data(bytes, None);
                }
            }
            return existing;
        }

        if let Some(storage) = &self.storage {
            storage.write(key, &bytes);
        }
        let image = Image::from_location_bytes(location, bytes, self.counter.clone());
        let handle = self.images.insert(image);
        self.remote.insert(key, handle);
        handle
    }

    pub fn get(&self, key: ImageKey) -> Option<&Image> {
        self.images.get(key)
    }

    /// Mutable access to an entity together with what it needs to render and load
    pub fn image(&mut self, key: ImageKey) -> Option<ImageMut<'_>> {
        let canvas = Canvas {
            dpr: self.config.dpr(),
            fill: Rgba(self.config.letterbox_fill),
            filter: self.config.scale_filter.filter_type(),
            masks: &self.masks,
        };
        let image = self.images.get_mut(key)?;
        Some(ImageMut {
            image,
            env: Env {
                canvas,
                blank: &self.blank,
                loaders: self.loaders.as_ref(),
            },
            policy: self.config.auto_download,
        })
    }

    /// Destroy one entity and unregister it; the placeholder is never removed
    pub fn remove(&mut self, key: ImageKey) -> bool {
        if key == self.blank_key {
            return false;
        }
        if self.images.remove(key).is_none() {
            return false;
        }
        self.local_files.retain(|_, handle| *handle != key);
        self.remote.retain(|_, handle| *handle != key);
        true
    }

    /// Destroy every remote-backed entity
    pub fn clear_storage_images(&mut self) {
        let count = self.remote.len();
        for (_, handle) in self.remote.drain() {
            self.images.remove(handle);
        }
        debug!("cleared {} remote images", count);
    }

    /// Destroy every entity except the placeholder
    pub fn clear_all(&mut self) {
        let blank_key = self.blank_key;
        self.images.retain(|key, _| key == blank_key);
        self.local_files.clear();
        self.remote.clear();
        info!("cleared image cache, {} bytes still acquired", self.counter.get());
    }

    /// Drop every decoded bitmap that can be restored later
    pub fn forget_all(&mut self) {
        for (key, image) in self.images.iter_mut() {
            if key != self.blank_key {
                image.forget();
            }
        }
    }

    /// Change the corner radius in logical pixels and drop rounded output made with the old one
    pub fn set_corner_radius(&mut self, radius: u32) {
        self.config.corner_radius = radius;
        self.masks = CornerMasks::new(radius * self.config.dpr());
        for image in self.images.values_mut() {
            image.invalidate_variants();
        }
    }

    /// Change the auto-download policy; cancelled remote images may be retried
    pub fn set_auto_download(&mut self, policy: AutoDownload) {
        self.config.auto_download = policy;
        self.automatic_load_settings_changed();
    }

    pub fn automatic_load_settings_changed(&mut self) {
        for image in self.images.values_mut() {
            if matches!(image.origin(), Origin::Remote(_)) {
                image.automatic_load_settings_changed();
            }
        }
    }
}

impl std::fmt::Debug for ImageContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageContext")
            .field("images", &self.images.len())
            .field("local_files", &self.local_files.len())
            .field("remote", &self.remote.len())
            .field("acquired", &self.counter.get())
            .finish()
    }
}

/// An entity borrowed from its context
pub struct ImageMut<'a> {
    image: &'a mut Image,
    env: Env<'a>,
    policy: AutoDownload,
}

impl ImageMut<'_> {
    pub fn entity(&self) -> &Image {
        self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn is_null(&self) -> bool {
        self.image.is_null()
    }

    pub fn pix(&mut self, w: i32, h: i32) -> Pixmap {
        self.image.pix(&self.env, w, h)
    }

    pub fn pix_rounded(&mut self, w: i32, h: i32) -> Pixmap {
        self.image.pix_rounded(&self.env, w, h)
    }

    pub fn pix_blurred(&mut self, w: i32, h: i32) -> Pixmap {
        self.image.pix_blurred(&self.env, w, h)
    }

    pub fn pix_colored(&mut self, tint: Rgba<u8>, w: i32, h: i32) -> Pixmap {
        self.image.pix_colored(&self.env, tint, w, h)
    }

    pub fn pix_blurred_colored(&mut self, tint: Rgba<u8>, w: i32, h: i32) -> Pixmap {
        self.image.pix_blurred_colored(&self.env, tint, w, h)
    }

    pub fn pix_single(&mut self, w: i32, h: i32, outer_w: i32, outer_h: i32) -> Pixmap {
        self.image.pix_single(&self.env, w, h, outer_w, outer_h)
    }

    pub fn pix_blurred_single(&mut self, w: i32, h: i32, outer_w: i32, outer_h: i32) -> Pixmap {
        self.image.pix_blurred_single(&self.env, w, h, outer_w, outer_h)
    }

    pub fn forget(&mut self) {
        self.image.forget();
    }

    pub fn restore(&mut self) {
        self.image.restore();
    }

    pub fn load(&mut self, load_first: bool, priority: bool) {
        self.image.load(self.env.loaders, load_first, priority);
    }

    pub fn load_even_cancelled(&mut self, load_first: bool, priority: bool) {
        self.image.load_even_cancelled(self.env.loaders, load_first, priority);
    }

    /// Download under the context's auto-download policy for `chat`
    pub fn automatic_load(&mut self, chat: ChatKind) {
        self.image.automatic_load(self.env.loaders, self.policy, chat);
    }

    pub fn cancel(&mut self) {
        self.image.cancel();
    }

    pub fn check_load(&mut self) {
        self.image.check_load();
    }

    pub fn loaded(&mut self) -> bool {
        self.image.loaded()
    }

    pub fn loading(&self) -> bool {
        self.image.loading()
    }

    pub fn display_loading(&self) -> bool {
        self.image.display_loading()
    }

    pub fn progress(&mut self) -> f64 {
        self.image.progress()
    }

    pub fn offset(&mut self) -> u64 {
        self.image.offset()
    }
}
