use image::{Rgba, RgbaImage};

use super::pixels;

/// Blend every pixel towards `tint`, weighted by source alpha times tint alpha
///
/// Each color channel becomes `c + ((a * ta * (t - c)) >> 16)` with an
/// arithmetic shift, so even an opaque tint stops just short of its target.
/// Alpha blends towards fully opaque; transparent pixels are left alone.
pub fn image_colored(tint: Rgba<u8>, mut img: RgbaImage) -> RgbaImage {
    let tint_alpha = tint[3] as i32;
    if tint_alpha == 0 {
        return img;
    }
    let targets = [tint[0], tint[1], tint[2], 0xff];

    for pixel in pixels(&mut img) {
        let weight = pixel[3] as i32 * tint_alpha;
        for (channel, target) in pixel.iter_mut().zip(targets) {
            let c = *channel as i32;
            *channel = (c + ((weight * (target as i32 - c)) >> 16)) as u8;
        }
    }
    img
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opaque_tint_over_opaque_pixel() {
        let img = RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 255]));
        let out = image_colored(Rgba([200, 100, 50, 255]), img);
        assert!(out.pixels().all(|p| *p == Rgba([198, 99, 49, 255])));
    }

    #[test]
    fn test_darker_tint_rounds_towards_target() {
        let img = RgbaImage::from_pixel(1, 1, Rgba([10, 200, 0, 255]));
        let out = image_colored(Rgba([0, 0, 0, 255]), img);
        assert_eq!(out.get_pixel(0, 0), &Rgba([0, 1, 0, 255]));
    }

    #[test]
    fn test_transparent_source_is_kept() {
        let img = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 0]));
        let out = image_colored(Rgba([255, 255, 255, 255]), img.clone());
        assert_eq!(out, img);
    }

    #[test]
    fn test_half_alpha_tint_blends() {
        let img = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 255]));
        let out = image_colored(Rgba([254, 254, 254, 128]), img);
        assert_eq!(out.get_pixel(0, 0), &Rgba([126, 126, 126, 255]));
    }

    #[test]
    fn test_alpha_moves_towards_opaque() {
        let img = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 128]));
        let out = image_colored(Rgba([0, 0, 0, 128]), img);
        // 128 + (128 * 128 * 127) >> 16
        assert_eq!(out.get_pixel(0, 0)[3], 159);
    }
}
