use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use image::RgbaImage;

/// Bytes a resident bitmap is charged: four per pixel
pub fn pixmap_cost(img: &RgbaImage) -> i64 {
    img.width() as i64 * img.height() as i64 * 4
}

/// Aggregate byte counter shared by a context and everything it owns
///
/// Every resident decoded bitmap and every cached variant is charged here
/// exactly once. Clones share the same total.
#[derive(Debug, Clone, Default)]
pub struct MemoryCounter(Arc<AtomicI64>);

impl MemoryCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquire(&self, bytes: i64) {
        self.0.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn release(&self, bytes: i64) {
        self.0.fetch_sub(bytes, Ordering::Relaxed);
    }

    pub fn get(&self) -> i64 {
        self.0.load(Ordering::Relaxed)
    }
}
