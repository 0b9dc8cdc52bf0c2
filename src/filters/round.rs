use image::RgbaImage;

use super::corners::{Corner, CornerMasks};
use super::pixels;

/// Cut rounded corners into `img` using the precomputed masks
///
/// Bitmaps carry straight alpha, so only the alpha of a corner pixel is
/// scaled: `(a * (mask + 1)) >> 8`. Color stays as it is and pixels outside
/// the four squares are never touched. Images too small to hold two masks
/// side by side are left as they are.
pub fn image_round(img: &mut RgbaImage, masks: &CornerMasks) {
    let size = masks.size();
    let (w, h) = img.dimensions();
    if size == 0 || w < 2 * size || h < 2 * size {
        return;
    }

    let width = w as usize;
    let px = pixels(img);

    for corner in Corner::ALL {
        let (x0, y0) = match corner {
            Corner::TopLeft => (0, 0),
            Corner::TopRight => (w - size, 0),
            Corner::BottomLeft => (0, h - size),
            Corner::BottomRight => (w - size, h - size),
        };
        let mask = masks.mask(corner);

        for (mx, my, alpha) in mask.enumerate_pixels() {
            let weight = alpha[0] as u32 + 1;
            let pixel = &mut px[(y0 + my) as usize * width + (x0 + mx) as usize];
            pixel[3] = ((pixel[3] as u32 * weight) >> 8) as u8;
        }
    }
}
