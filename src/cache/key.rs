//! Variant cache keys
//!
//! Layout of the 64-bit key:
//!
//! ```text
//!  63   61 60                32 31                 0
//! +-------+--------------------+--------------------+
//! | kind  |   width (29 bits)  |  height (32 bits)  |
//! +-------+--------------------+--------------------+
//! ```
//!
//! Five kinds need three tag bits, which leaves 29 bits of width. Widths at
//! or above `MAX_KEY_WIDTH` are saturated; no bitmap that large can be
//! allocated anyway.

const KIND_SHIFT: u32 = 61;
const WIDTH_SHIFT: u32 = 32;

/// Exclusive upper bound of widths that map to distinct keys
pub const MAX_KEY_WIDTH: u32 = 1 << (KIND_SHIFT - WIDTH_SHIFT);

/// Filter combination a cached bitmap was built with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariantKind {
    Plain = 0,
    Blurred = 1,
    Colored = 2,
    BlurredColored = 3,
    Rounded = 4,
}

impl VariantKind {
    pub fn is_colored(self) -> bool {
        matches!(self, VariantKind::Colored | VariantKind::BlurredColored)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariantKey(u64);

impl VariantKey {
    /// Slot shared by every `pix_single` request, whatever its size
    ///
    /// Identical to `VariantKey::new(Plain, 0, 0)`, which a plain request
    /// only produces while the image's natural width is unknown. The two
    /// uses alias if both happen on the same image.
    pub const SINGLE: VariantKey = VariantKey(0);

    /// Slot shared by every `pix_blurred_single` request
    pub const BLURRED_SINGLE: VariantKey = VariantKey((VariantKind::Blurred as u64) << KIND_SHIFT);

    pub fn new(kind: VariantKind, width: u32, height: u32) -> Self {
        let width = width.min(MAX_KEY_WIDTH - 1) as u64;
        VariantKey((kind as u64) << KIND_SHIFT | width << WIDTH_SHIFT | height as u64)
    }

    pub fn kind(self) -> VariantKind {
        match self.0 >> KIND_SHIFT {
            0 => VariantKind::Plain,
            1 => VariantKind::Blurred,
            2 => VariantKind::Colored,
            3 => VariantKind::BlurredColored,
            _ => VariantKind::Rounded,
        }
    }

    pub fn width(self) -> u32 {
        ((self.0 >> WIDTH_SHIFT) & (MAX_KEY_WIDTH as u64 - 1)) as u32
    }

    pub fn height(self) -> u32 {
        self.0 as u32
    }
}
