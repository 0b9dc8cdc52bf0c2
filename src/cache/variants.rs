use std::collections::HashMap;

use image::Rgba;
use tracing::trace;

use super::counter::{pixmap_cost, MemoryCounter};
use super::key::VariantKey;
use super::Pixmap;

/// Derived bitmaps of one image, keyed by kind and requested size
///
/// Owned by exactly one entity. Every entry is charged to the shared counter
/// on insert and released before it is dropped or replaced.
#[derive(Debug)]
pub struct VariantCache {
    entries: HashMap<VariantKey, Pixmap>,
    /// Tint the colored entries were built with
    tint: Option<Rgba<u8>>,
    counter: MemoryCounter,
}

impl VariantCache {
    pub fn new(counter: MemoryCounter) -> Self {
        Self {
            entries: HashMap::new(),
            tint: None,
            counter,
        }
    }

    pub fn get(&self, key: VariantKey) -> Option<Pixmap> {
        self.entries.get(&key).cloned()
    }

    /// Look up a single-slot entry, missing when its canvas is a different size
    pub fn get_single(&self, key: VariantKey, outer_w: u32, outer_h: u32) -> Option<Pixmap> {
        self.entries
            .get(&key)
            .filter(|pix| pix.dimensions() == (outer_w, outer_h))
            .cloned()
    }

    /// Store `pix` under `key`, releasing whatever the key held before
    pub fn put(&mut self, key: VariantKey, pix: Pixmap) {
        self.counter.acquire(pixmap_cost(&pix));
        if let Some(old) = self.entries.insert(key, pix) {
            self.counter.release(pixmap_cost(&old));
        }
    }

    /// Drop colored entries built with a tint other than `tint`
    ///
    /// Keys carry no color, so switching tints has to clear them.
    pub fn retint(&mut self, tint: Rgba<u8>) {
        if self.tint == Some(tint) {
            return;
        }
        if self.tint.is_some() {
            let counter = &self.counter;
            self.entries.retain(|key, pix| {
                let keep = !key.kind().is_colored();
                if !keep {
                    counter.release(pixmap_cost(pix));
                }
                keep
            });
            trace!("colored variants dropped for new tint");
        }
        self.tint = Some(tint);
    }

    /// Release and drop every entry
    pub fn invalidate_all(&mut self) {
        for (_, pix) in self.entries.drain() {
            self.counter.release(pixmap_cost(&pix));
        }
        self.tint = None;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bytes currently charged for this cache's entries
    pub fn accounted(&self) -> i64 {
        self.entries.values().map(|pix| pixmap_cost(pix)).sum()
    }
}

impl Drop for VariantCache {
    fn drop(&mut self) {
        self.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::VariantKind;
    use image::RgbaImage;
    use std::sync::Arc;

    fn pix(w: u32, h: u32) -> Pixmap {
        Arc::new(RgbaImage::new(w, h))
    }

    #[test]
    fn test_put_get_and_accounting() {
        let counter = MemoryCounter::new();
        let mut cache = VariantCache::new(counter.clone());

        let key = VariantKey::new(VariantKind::Plain, 10, 10);
        assert!(cache.get(key).is_none());

        cache.put(key, pix(10, 10));
        assert_eq!(counter.get(), 400);
        assert_eq!(cache.get(key).unwrap().dimensions(), (10, 10));

        // overwrite releases the old entry
        cache.put(key, pix(5, 5));
        assert_eq!(counter.get(), 100);
        assert_eq!(cache.accounted(), 100);

        cache.put(VariantKey::new(VariantKind::Rounded, 10, 10), pix(10, 10));
        assert_eq!(counter.get(), 500);

        cache.invalidate_all();
        assert!(cache.is_empty());
        assert_eq!(counter.get(), 0);
    }

    #[test]
    fn test_single_slot_replaces() {
        let counter = MemoryCounter::new();
        let mut cache = VariantCache::new(counter.clone());

        cache.put(VariantKey::SINGLE, pix(80, 80));
        assert!(cache.get_single(VariantKey::SINGLE, 80, 80).is_some());
        assert!(cache.get_single(VariantKey::SINGLE, 60, 40).is_none());

        cache.put(VariantKey::SINGLE, pix(60, 40));
        assert_eq!(cache.len(), 1);
        assert_eq!(counter.get(), 60 * 40 * 4);
    }

    #[test]
    fn test_retint_drops_colored_only() {
        let counter = MemoryCounter::new();
        let mut cache = VariantCache::new(counter.clone());
        let red = Rgba([255, 0, 0, 255]);
        let blue = Rgba([0, 0, 255, 255]);

        cache.retint(red);
        cache.put(VariantKey::new(VariantKind::Colored, 4, 4), pix(4, 4));
        cache.put(VariantKey::new(VariantKind::BlurredColored, 4, 4), pix(4, 4));
        cache.put(VariantKey::new(VariantKind::Plain, 4, 4), pix(4, 4));

        cache.retint(red);
        assert_eq!(cache.len(), 3);

        cache.retint(blue);
        assert_eq!(cache.len(), 1);
        assert_eq!(counter.get(), 64);
    }

    #[test]
    fn test_drop_releases() {
        let counter = MemoryCounter::new();
        {
            let mut cache = VariantCache::new(counter.clone());
            cache.put(VariantKey::new(VariantKind::Blurred, 3, 3), pix(3, 3));
            assert_eq!(counter.get(), 36);
        }
        assert_eq!(counter.get(), 0);
    }
}
