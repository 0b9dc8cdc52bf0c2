/// Derived-variant cache
///
/// This module handles:
/// - Packing (kind, width, height) into 64-bit keys (key.rs)
/// - Per-image storage of derived bitmaps (variants.rs)
/// - The aggregate byte counter shared by a whole context (counter.rs)
pub mod counter;
pub mod key;
pub mod variants;

pub use counter::{pixmap_cost, MemoryCounter};
pub use key::{VariantKey, VariantKind, MAX_KEY_WIDTH};
pub use variants::VariantCache;

use std::sync::Arc;

/// A decoded bitmap shared between a cache and its callers
pub type Pixmap = Arc<image::RgbaImage>;
