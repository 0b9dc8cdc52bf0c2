/// Pixel filters for derived variants
///
/// This module handles:
/// - Fixed radius box blur (blur.rs)
/// - Corner rounding against precomputed masks (round.rs, corners.rs)
/// - Color tinting (tint.rs)
/// - The composite scale/blur/tint/letterbox/round builder (compose.rs)
///
/// All filters work on 8-bit RGBA bitmaps with straight (not premultiplied)
/// alpha, as the decoder produces them. They are total: malformed sizes are
/// returned unchanged rather than reported.
pub mod blur;
pub mod compose;
pub mod corners;
pub mod round;
pub mod tint;

pub use blur::{image_blur, BLUR_RADIUS};
pub use compose::{image_pix, Canvas, PixOptions};
pub use corners::{Corner, CornerMasks};
pub use round::image_round;
pub use tint::image_colored;

use image::RgbaImage;

/// View the bitmap as one `[r, g, b, a]` array per pixel
pub(crate) fn pixels(img: &mut RgbaImage) -> &mut [[u8; 4]] {
    bytemuck::cast_slice_mut(&mut **img)
}
