/// Image entities
///
/// This module handles:
/// - The entity owning a decoded bitmap, its encoded bytes and its variants
/// - Where the bytes come from: file, memory or a remote location (origin.rs)
/// - Loader polling and the remote load state machine (remote.rs)
/// - Decoding and re-encoding through the `image` crate (codec.rs)
pub mod codec;
pub mod origin;
mod remote;

pub use origin::{ChatKind, FileKey, Origin, RemoteState, MAX_FILE_SIZE};

use std::fmt;
use std::sync::Arc;

use image::{ImageFormat, Rgba, RgbaImage};
use tracing::{debug, trace, warn};

use crate::cache::{pixmap_cost, MemoryCounter, Pixmap, VariantCache, VariantKey, VariantKind};
use crate::filters::{self, Canvas, PixOptions};
use crate::remote::{LoaderFactory, LoaderSlot, StorageLocation};

/// What an entity borrows from its context while rendering
#[derive(Clone, Copy)]
pub struct Env<'a> {
    pub canvas: Canvas<'a>,
    /// Plain rendering of the blank placeholder, returned when nothing decodes
    pub blank: &'a Pixmap,
    pub loaders: &'a dyn LoaderFactory,
}

/// One image and every bitmap derived from it
///
/// The decoded bitmap may be dropped ("forgotten") to save memory as long as
/// the encoded bytes are kept; the next accessor decodes it again. Every
/// resident bitmap, decoded or derived, is charged to the shared counter.
pub struct Image {
    data: Option<Pixmap>,
    /// Natural size, kept while forgotten
    size: (u32, u32),
    has_alpha: bool,
    saved: Vec<u8>,
    format: Option<ImageFormat>,
    forgot: bool,
    loaded_once: bool,
    variants: VariantCache,
    counter: MemoryCounter,
    origin: Origin,
}

impl Image {
    fn with_origin(origin: Origin, counter: MemoryCounter) -> Self {
        Self {
            data: None,
            size: (0, 0),
            has_alpha: false,
            saved: Vec::new(),
            format: None,
            forgot: false,
            loaded_once: false,
            variants: VariantCache::new(counter.clone()),
            counter,
            origin,
        }
    }

    /// The 1x1 transparent blank image
    pub fn placeholder(counter: MemoryCounter) -> Self {
        let mut image = Self::with_origin(Origin::Placeholder, counter);
        image.format = Some(ImageFormat::Png);
        image.loaded_once = true;
        image.set_bitmap(Some(RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 0]))), true);
        image
    }

    /// An image read from `key.path` on first access
    pub fn from_file(key: FileKey, format: Option<ImageFormat>, counter: MemoryCounter) -> Self {
        let mut image = Self::with_origin(Origin::File(key), counter);
        image.format = format;
        image
    }

    /// An image decoded eagerly from encoded bytes
    pub fn from_bytes(bytes: Vec<u8>, format: Option<ImageFormat>, counter: MemoryCounter) -> Self {
        let mut image = Self::with_origin(Origin::Memory, counter);
        image.adopt_bytes(bytes, format);
        image
    }

    /// An image from an already decoded bitmap
    ///
    /// `bytes` may be empty; they are produced by encoding the bitmap the
    /// first time the image is forgotten.
    pub fn from_bitmap(
        bitmap: RgbaImage,
        has_alpha: bool,
        format: ImageFormat,
        bytes: Vec<u8>,
        counter: MemoryCounter,
    ) -> Self {
        let mut image = Self::with_origin(Origin::Memory, counter);
        image.format = Some(format);
        image.saved = bytes;
        image.loaded_once = true;
        image.set_bitmap(Some(bitmap), has_alpha);
        image
    }

    /// A remote image with nothing loaded yet
    pub fn from_location(location: StorageLocation, size: u64, counter: MemoryCounter) -> Self {
        Self::with_origin(
            Origin::Remote(RemoteState {
                location,
                size,
                loader: LoaderSlot::Absent,
            }),
            counter,
        )
    }

    /// A remote image whose bytes are already at hand
    pub fn from_location_bytes(location: StorageLocation, bytes: Vec<u8>, counter: MemoryCounter) -> Self {
        let mut image = Self::from_location(location, bytes.len() as u64, counter);
        image.set_data(bytes, None);
        image
    }

    /// Replace the decoded bitmap, keeping the counter and variant cache consistent
    fn set_bitmap(&mut self, bitmap: Option<RgbaImage>, has_alpha: bool) {
        self.variants.invalidate_all();
        if let Some(old) = self.data.take() {
            self.counter.release(pixmap_cost(&old));
        }
        if let Some(bitmap) = bitmap {
            self.counter.acquire(pixmap_cost(&bitmap));
            self.size = bitmap.dimensions();
            self.has_alpha = has_alpha;
            self.data = Some(Arc::new(bitmap));
        }
        self.forgot = false;
    }

    fn adopt_bytes(&mut self, bytes: Vec<u8>, hint: Option<ImageFormat>) {
        match codec::decode(&bytes, hint) {
            Some(decoded) => {
                self.format = Some(decoded.format);
                self.set_bitmap(Some(decoded.bitmap), decoded.has_alpha);
            }
            None => {
                self.format = hint;
                self.size = (0, 0);
                self.set_bitmap(None, false);
            }
        }
        self.saved = bytes;
        self.loaded_once = true;
    }

    fn load_file(&mut self) {
        if self.loaded_once {
            return;
        }
        self.loaded_once = true;

        let path = match &self.origin {
            Origin::File(key) if !key.is_empty() => key.path.clone(),
            _ => return,
        };
        match std::fs::read(&path) {
            Ok(bytes) => {
                let hint = self.format;
                self.adopt_bytes(bytes, hint);
                debug!("loaded {} ({}x{})", path.display(), self.size.0, self.size.1);
            }
            Err(e) => warn!("failed to read {}: {}", path.display(), e),
        }
    }

    /// Start whatever loading this origin needs
    ///
    /// Files are read once; remote images get a network-enabled loader
    /// unless they are loaded or cancelled. Memory images have nothing to do.
    pub fn load(&mut self, loaders: &dyn LoaderFactory, load_first: bool, priority: bool) {
        match self.origin {
            Origin::File(_) => self.load_file(),
            Origin::Remote(_) => self.load_remote(loaders, load_first, priority),
            Origin::Placeholder | Origin::Memory => {}
        }
    }

    /// Poll the loader and read the file if that has not happened yet
    fn prepare(&mut self) {
        self.check_load();
        self.load_file();
    }

    /// Drop the decoded bitmap, keeping encoded bytes to restore it from
    ///
    /// Bitmaps without saved bytes are encoded first, in their own format or
    /// as PNG if that fails. When neither works the image stays resident.
    pub fn forget(&mut self) {
        if self.forgot {
            return;
        }
        let Some(data) = self.data.clone() else {
            return;
        };

        if self.saved.is_empty() {
            let format = self.format.unwrap_or(ImageFormat::Png);
            match codec::encode_with_fallback(&data, self.has_alpha, format) {
                Some((bytes, format)) => {
                    self.saved = bytes;
                    self.format = Some(format);
                }
                None => {
                    warn!("cannot forget {}x{} image: no encodable format", data.width(), data.height());
                    return;
                }
            }
        }

        self.variants.invalidate_all();
        self.counter.release(pixmap_cost(&data));
        self.data = None;
        self.forgot = true;
        trace!("forgot {}x{} image, kept {} bytes", self.size.0, self.size.1, self.saved.len());
    }

    /// Decode the saved bytes again after `forget`
    pub fn restore(&mut self) {
        if !self.forgot {
            return;
        }
        match codec::decode(&self.saved, self.format) {
            Some(decoded) => {
                self.counter.acquire(pixmap_cost(&decoded.bitmap));
                self.size = decoded.bitmap.dimensions();
                self.has_alpha = decoded.has_alpha;
                self.data = Some(Arc::new(decoded.bitmap));
            }
            None => warn!("failed to restore forgotten image from {} bytes", self.saved.len()),
        }
        self.forgot = false;
    }

    /// Natural size; remote images report their location's size until loaded
    pub fn dimensions(&self) -> (u32, u32) {
        match &self.origin {
            Origin::Remote(remote) if self.size.0 == 0 || self.size.1 == 0 => {
                (remote.location.width, remote.location.height)
            }
            _ => self.size,
        }
    }

    pub fn width(&self) -> u32 {
        self.dimensions().0
    }

    pub fn height(&self) -> u32 {
        self.dimensions().1
    }

    /// True only for the blank placeholder
    pub fn is_null(&self) -> bool {
        matches!(self.origin, Origin::Placeholder)
    }

    pub fn is_forgotten(&self) -> bool {
        self.forgot
    }

    pub fn format(&self) -> Option<ImageFormat> {
        self.format
    }

    pub fn has_alpha(&self) -> bool {
        self.has_alpha
    }

    /// Encoded bytes kept for restoring
    pub fn saved(&self) -> &[u8] {
        &self.saved
    }

    /// The decoded bitmap if resident, without loading anything
    pub fn data(&self) -> Option<&Pixmap> {
        self.data.as_ref()
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    pub fn variant_count(&self) -> usize {
        self.variants.len()
    }

    pub fn invalidate_variants(&mut self) {
        self.variants.invalidate_all();
    }

    /// Bytes this image currently has charged to the counter
    pub fn accounted(&self) -> i64 {
        self.data.as_ref().map_or(0, |data| pixmap_cost(data)) + self.variants.accounted()
    }

    /// Requested size in device pixels
    ///
    /// A non-positive width, or an image without a natural size, falls back
    /// to the natural width with the height left as requested. Only the
    /// variants passing `scale_natural` multiply that fallback by the density.
    fn request_size(&self, dpr: u32, w: i32, h: i32, scale_natural: bool) -> (u32, u32) {
        let (natural_w, natural_h) = self.dimensions();
        let h = h.max(0) as u32;
        if w <= 0 || natural_w == 0 || natural_h == 0 {
            let w = if scale_natural {
                natural_w.saturating_mul(dpr)
            } else {
                natural_w
            };
            (w, h)
        } else {
            ((w as u32).saturating_mul(dpr), h.saturating_mul(dpr))
        }
    }

    fn render(&mut self, env: &Env<'_>, w: u32, h: u32, options: &PixOptions) -> Option<Pixmap> {
        if self.is_null() {
            if let Some((outer_w, outer_h)) = options.outer.filter(|&(ow, oh)| ow > 0 && oh > 0) {
                return Some(Arc::new(blank_canvas(outer_w, outer_h, options.rounded, &env.canvas)));
            }
        }

        self.load(env.loaders, false, false);
        self.check_load();
        self.restore();

        let data = self.data.as_ref()?;
        Some(Arc::new(filters::image_pix(data, self.has_alpha, w, h, options, &env.canvas)))
    }

    fn cached(&mut self, env: &Env<'_>, key: VariantKey, w: u32, h: u32, options: PixOptions) -> Pixmap {
        if let Some(pix) = self.variants.get(key) {
            return pix;
        }
        match self.render(env, w, h, &options) {
            Some(pix) => {
                self.variants.put(key, pix.clone());
                pix
            }
            None => env.blank.clone(),
        }
    }

    /// Like `cached`, but the slot is reused for any size and rebuilt when
    /// the requested outer canvas no longer matches the stored bitmap
    fn cached_single(&mut self, env: &Env<'_>, key: VariantKey, w: u32, h: u32, options: PixOptions) -> Pixmap {
        let dpr = env.canvas.dpr;
        let (outer_w, outer_h) = options.outer.unwrap_or_default();
        if let Some(pix) = self.variants.get_single(key, outer_w * dpr, outer_h * dpr) {
            return pix;
        }
        match self.render(env, w, h, &options) {
            Some(pix) => {
                self.variants.put(key, pix.clone());
                pix
            }
            None => env.blank.clone(),
        }
    }

    pub fn pix(&mut self, env: &Env<'_>, w: i32, h: i32) -> Pixmap {
        self.prepare();
        let (w, h) = self.request_size(env.canvas.dpr, w, h, false);
        self.cached(env, VariantKey::new(VariantKind::Plain, w, h), w, h, PixOptions::default())
    }

    pub fn pix_rounded(&mut self, env: &Env<'_>, w: i32, h: i32) -> Pixmap {
        self.prepare();
        let (w, h) = self.request_size(env.canvas.dpr, w, h, false);
        let options = PixOptions {
            rounded: true,
            ..PixOptions::default()
        };
        self.cached(env, VariantKey::new(VariantKind::Rounded, w, h), w, h, options)
    }

    pub fn pix_blurred(&mut self, env: &Env<'_>, w: i32, h: i32) -> Pixmap {
        self.prepare();
        let (w, h) = self.request_size(env.canvas.dpr, w, h, true);
        let options = PixOptions {
            blurred: true,
            ..PixOptions::default()
        };
        self.cached(env, VariantKey::new(VariantKind::Blurred, w, h), w, h, options)
    }

    pub fn pix_colored(&mut self, env: &Env<'_>, tint: Rgba<u8>, w: i32, h: i32) -> Pixmap {
        self.prepare();
        let (w, h) = self.request_size(env.canvas.dpr, w, h, true);
        self.variants.retint(tint);
        let options = PixOptions {
            tint: Some(tint),
            ..PixOptions::default()
        };
        self.cached(env, VariantKey::new(VariantKind::Colored, w, h), w, h, options)
    }

    pub fn pix_blurred_colored(&mut self, env: &Env<'_>, tint: Rgba<u8>, w: i32, h: i32) -> Pixmap {
        self.prepare();
        let (w, h) = self.request_size(env.canvas.dpr, w, h, true);
        self.variants.retint(tint);
        let options = PixOptions {
            blurred: true,
            tint: Some(tint),
            ..PixOptions::default()
        };
        self.cached(env, VariantKey::new(VariantKind::BlurredColored, w, h), w, h, options)
    }

    /// Rounded `w x h` rendering letterboxed into `outer_w x outer_h`, one slot per image
    pub fn pix_single(&mut self, env: &Env<'_>, w: i32, h: i32, outer_w: i32, outer_h: i32) -> Pixmap {
        self.prepare();
        let (w, h) = self.request_size(env.canvas.dpr, w, h, true);
        let options = PixOptions {
            rounded: true,
            outer: Some((outer_w.max(0) as u32, outer_h.max(0) as u32)),
            ..PixOptions::default()
        };
        self.cached_single(env, VariantKey::SINGLE, w, h, options)
    }

    pub fn pix_blurred_single(&mut self, env: &Env<'_>, w: i32, h: i32, outer_w: i32, outer_h: i32) -> Pixmap {
        self.prepare();
        let (w, h) = self.request_size(env.canvas.dpr, w, h, true);
        let options = PixOptions {
            blurred: true,
            rounded: true,
            outer: Some((outer_w.max(0) as u32, outer_h.max(0) as u32)),
            ..PixOptions::default()
        };
        self.cached_single(env, VariantKey::BLURRED_SINGLE, w, h, options)
    }
}

/// Letterbox canvas with nothing on it, in the fill color
fn blank_canvas(outer_w: u32, outer_h: u32, rounded: bool, canvas: &Canvas<'_>) -> RgbaImage {
    let dpr = canvas.dpr;
    let mut img = RgbaImage::from_pixel(outer_w * dpr, outer_h * dpr, canvas.fill);
    if rounded {
        filters::image_round(&mut img, canvas.masks);
    }
    img
}

impl Drop for Image {
    fn drop(&mut self) {
        if let Some(data) = self.data.take() {
            self.counter.release(pixmap_cost(&data));
        }
    }
}

impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Image")
            .field("size", &self.size)
            .field("format", &self.format)
            .field("resident", &self.data.is_some())
            .field("forgot", &self.forgot)
            .field("saved", &self.saved.len())
            .field("variants", &self.variants.len())
            .field("origin", &self.origin)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::CornerMasks;
    use crate::remote::LocalLoaderFactory;
    use image::imageops::FilterType;

    struct Fixture {
        masks: CornerMasks,
        blank: Pixmap,
        loaders: LocalLoaderFactory,
        dpr: u32,
    }

    impl Fixture {
        fn new(dpr: u32) -> Self {
            Self {
                masks: CornerMasks::new(2 * dpr),
                blank: Arc::new(RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 0]))),
                loaders: LocalLoaderFactory::new(None),
                dpr,
            }
        }

        fn env(&self) -> Env<'_> {
            Env {
                canvas: Canvas {
                    dpr: self.dpr,
                    fill: Rgba([0, 0, 0, 255]),
                    filter: FilterType::Triangle,
                    masks: &self.masks,
                },
                blank: &self.blank,
                loaders: &self.loaders,
            }
        }
    }

    fn gradient(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_fn(w, h, |x, y| Rgba([(x * 7) as u8, (y * 5) as u8, 99, 255]))
    }

    fn memory_image(counter: &MemoryCounter, w: u32, h: u32) -> Image {
        Image::from_bitmap(gradient(w, h), false, ImageFormat::Png, Vec::new(), counter.clone())
    }

    #[test]
    fn test_forget_restore_roundtrip() {
        let counter = MemoryCounter::new();
        let mut image = memory_image(&counter, 30, 20);
        let before = counter.get();
        assert_eq!(before, 30 * 20 * 4);

        image.forget();
        assert!(image.is_forgotten());
        assert!(image.data().is_none());
        assert!(!image.saved().is_empty());
        assert_eq!(counter.get(), 0);
        assert_eq!(image.dimensions(), (30, 20));

        image.restore();
        assert_eq!(counter.get(), before);
        assert_eq!(**image.data().unwrap(), gradient(30, 20));
    }

    #[test]
    fn test_forget_and_restore_are_idempotent() {
        let counter = MemoryCounter::new();
        let mut image = memory_image(&counter, 10, 10);

        image.forget();
        let saved = image.saved().to_vec();
        image.forget();
        assert_eq!(image.saved(), saved.as_slice());
        assert_eq!(counter.get(), 0);

        image.restore();
        image.restore();
        assert_eq!(counter.get(), 400);
    }

    #[test]
    fn test_forget_drops_variants() {
        let fixture = Fixture::new(1);
        let counter = MemoryCounter::new();
        let mut image = memory_image(&counter, 20, 20);

        image.pix(&fixture.env(), 10, 10);
        image.pix_rounded(&fixture.env(), 10, 10);
        assert_eq!(image.variant_count(), 2);
        assert_eq!(counter.get(), 1600 + 400 + 400);

        image.forget();
        assert_eq!(image.variant_count(), 0);
        assert_eq!(counter.get(), 0);

        // next access restores transparently
        let pix = image.pix(&fixture.env(), 10, 10);
        assert_eq!(pix.dimensions(), (10, 10));
        assert!(!image.is_forgotten());
        assert_eq!(counter.get(), image.accounted());
    }

    #[test]
    fn test_variants_are_cached() {
        let fixture = Fixture::new(1);
        let counter = MemoryCounter::new();
        let mut image = memory_image(&counter, 40, 30);

        let first = image.pix_blurred(&fixture.env(), 20, 15);
        let second = image.pix_blurred(&fixture.env(), 20, 15);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(image.variant_count(), 1);
    }

    #[test]
    fn test_zero_width_uses_natural_width() {
        let fixture = Fixture::new(1);
        let counter = MemoryCounter::new();
        let mut image = memory_image(&counter, 300, 200);

        let pix = image.pix(&fixture.env(), 0, 100);
        assert_eq!(pix.width(), 300);
        let pix = image.pix_rounded(&fixture.env(), -5, 0);
        assert_eq!(pix.dimensions(), (300, 200));
    }

    #[test]
    fn test_fallback_differs_per_variant_on_dense_display() {
        let fixture = Fixture::new(2);
        let counter = MemoryCounter::new();
        let mut image = memory_image(&counter, 30, 20);

        // plain keeps the natural width as is
        assert_eq!(image.pix(&fixture.env(), 0, 0).dimensions(), (30, 20));
        // blurred multiplies the natural width by the density, scaling to width
        assert_eq!(image.pix_blurred(&fixture.env(), 0, 0).dimensions(), (60, 40));
        // explicit sizes are always multiplied
        assert_eq!(image.pix(&fixture.env(), 10, 5).dimensions(), (20, 10));
    }

    #[test]
    fn test_single_slot_replaces() {
        let fixture = Fixture::new(1);
        let counter = MemoryCounter::new();
        let mut image = memory_image(&counter, 200, 100);

        let first = image.pix_single(&fixture.env(), 50, 50, 80, 80);
        assert_eq!(first.dimensions(), (80, 80));
        let again = image.pix_single(&fixture.env(), 50, 50, 80, 80);
        assert!(Arc::ptr_eq(&first, &again));

        let second = image.pix_single(&fixture.env(), 50, 50, 100, 60);
        assert_eq!(second.dimensions(), (100, 60));
        assert_eq!(image.variant_count(), 1);
        assert_eq!(counter.get(), 200 * 100 * 4 + 100 * 60 * 4);
    }

    #[test]
    fn test_undecodable_bytes_render_blank() {
        let fixture = Fixture::new(1);
        let counter = MemoryCounter::new();
        let mut image = Image::from_bytes(b"garbage".to_vec(), None, counter.clone());

        let pix = image.pix(&fixture.env(), 10, 10);
        assert!(Arc::ptr_eq(&pix, &fixture.blank));
        assert!(Arc::ptr_eq(&image.pix_blurred_single(&fixture.env(), 5, 5, 9, 9), &fixture.blank));
        assert_eq!(image.variant_count(), 0);
        assert_eq!(counter.get(), 0);
    }

    #[test]
    fn test_colored_variant_follows_tint() {
        let fixture = Fixture::new(1);
        let counter = MemoryCounter::new();
        let mut image = memory_image(&counter, 12, 12);

        // source pixel (21, 15, 99, 255)
        let red = image.pix_colored(&fixture.env(), Rgba([255, 0, 0, 255]), 12, 12);
        assert_eq!(red.get_pixel(3, 3), &Rgba([253, 0, 0, 255]));
        let blue = image.pix_colored(&fixture.env(), Rgba([0, 0, 255, 255]), 12, 12);
        assert_eq!(blue.get_pixel(3, 3), &Rgba([0, 0, 253, 255]));
        assert_eq!(image.variant_count(), 1);
    }

    #[test]
    fn test_drop_releases_everything() {
        let fixture = Fixture::new(1);
        let counter = MemoryCounter::new();
        {
            let mut image = memory_image(&counter, 16, 16);
            image.pix_blurred_colored(&fixture.env(), Rgba([1, 2, 3, 128]), 8, 8);
            assert!(counter.get() > 0);
        }
        assert_eq!(counter.get(), 0);
    }

    #[test]
    fn test_file_is_read_lazily() {
        let fixture = Fixture::new(1);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.png");
        gradient(8, 6).save(&path).unwrap();

        let counter = MemoryCounter::new();
        let mut image = Image::from_file(FileKey::from_path(&path), None, counter.clone());
        assert_eq!(counter.get(), 0);
        assert_eq!(image.dimensions(), (0, 0));

        let pix = image.pix(&fixture.env(), 0, 0);
        assert_eq!(pix.dimensions(), (8, 6));
        assert_eq!(image.format(), Some(ImageFormat::Png));
        assert_eq!(counter.get(), image.accounted());
    }

    #[test]
    fn test_blurred_alpha_image_keeps_requested_size() {
        let fixture = Fixture::new(1);
        let counter = MemoryCounter::new();
        let bitmap = RgbaImage::from_pixel(20, 20, Rgba([80, 90, 100, 200]));
        let mut image = Image::from_bitmap(bitmap, true, ImageFormat::Png, Vec::new(), counter);

        assert_eq!(image.pix_blurred(&fixture.env(), 20, 20).dimensions(), (20, 20));
        assert_eq!(image.pix_blurred(&fixture.env(), 0, 0).dimensions(), (20, 20));
        assert_eq!(image.pix_blurred(&fixture.env(), 10, 10).dimensions(), (10, 10));
    }

    #[test]
    fn test_placeholder_single_is_filled_canvas() {
        let fixture = Fixture::new(2);
        let mut blank = Image::placeholder(MemoryCounter::new());

        let pix = blank.pix_single(&fixture.env(), 40, 40, 40, 30);
        assert_eq!(pix.dimensions(), (80, 60));
        assert_eq!(pix.get_pixel(40, 30), &Rgba([0, 0, 0, 255]));
        // corners are cut like any other single variant
        assert_eq!(pix.get_pixel(0, 0)[3], 0);

        // without an outer canvas the placeholder renders as itself
        assert_eq!(blank.pix(&fixture.env(), 0, 0).dimensions(), (1, 1));
    }

    #[test]
    fn test_placeholder_is_null() {
        let counter = MemoryCounter::new();
        let blank = Image::placeholder(counter.clone());
        assert!(blank.is_null());
        assert_eq!(blank.dimensions(), (1, 1));
        assert!(!memory_image(&counter, 2, 2).is_null());
    }
}
