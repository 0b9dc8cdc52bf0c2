use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

use super::{image_blur, image_colored, image_round, CornerMasks};

/// Which filters a derived variant goes through
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PixOptions {
    pub blurred: bool,
    pub rounded: bool,
    pub tint: Option<Rgba<u8>>,
    /// Letterbox canvas in logical pixels; multiplied by the density factor
    pub outer: Option<(u32, u32)>,
}

/// Render environment shared by every entity of a context
#[derive(Debug, Clone, Copy)]
pub struct Canvas<'a> {
    pub dpr: u32,
    pub fill: Rgba<u8>,
    pub filter: FilterType,
    pub masks: &'a CornerMasks,
}

/// Build a derived bitmap from `src`
///
/// Order matters: blur on the source, scale to `w x h`, tint, letterbox onto
/// the outer canvas, and round last so corners always follow the final
/// canvas. `w == 0` keeps the natural size; `h == 0` scales to width keeping
/// the aspect ratio.
pub fn image_pix(
    src: &RgbaImage,
    with_alpha: bool,
    w: u32,
    h: u32,
    options: &PixOptions,
    canvas: &Canvas<'_>,
) -> RgbaImage {
    let (natural_w, natural_h) = src.dimensions();

    let mut img = src.clone();
    if options.blurred {
        img = image_blur(img, with_alpha);
    }

    let keep_size = w == 0
        || natural_w == 0
        || natural_h == 0
        || (w == natural_w && (h == 0 || h == natural_h));
    if !keep_size {
        let target_h = if h == 0 {
            ((img.height() as u64 * w as u64 + img.width() as u64 / 2) / img.width() as u64).max(1) as u32
        } else {
            h
        };
        img = imageops::resize(&img, w, target_h, canvas.filter);
    }

    if let Some(tint) = options.tint {
        img = image_colored(tint, img);
    }

    if let Some((outer_w, outer_h)) = options.outer {
        if outer_w > 0 && outer_h > 0 {
            img = letterbox(img, w, h, outer_w * canvas.dpr, outer_h * canvas.dpr, canvas.fill);
        }
    }

    if options.rounded {
        image_round(&mut img, canvas.masks);
    }
    img
}

/// Center `img` on an `outer_w x outer_h` canvas
///
/// The canvas is painted with `fill` only when the image leaves some of it
/// uncovered; a request that already matches the outer size is passed through.
fn letterbox(img: RgbaImage, w: u32, h: u32, outer_w: u32, outer_h: u32, fill: Rgba<u8>) -> RgbaImage {
    if outer_w == w && outer_h == h {
        return img;
    }

    let background = if img.width() < outer_w || img.height() < outer_h {
        fill
    } else {
        Rgba([0, 0, 0, 0])
    };
    let mut result = RgbaImage::from_pixel(outer_w, outer_h, background);
    let x = (outer_w as i64 - img.width() as i64) / 2;
    let y = (outer_h as i64 - img.height() as i64) / 2;
    imageops::overlay(&mut result, &img, x, y);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas(masks: &CornerMasks) -> Canvas<'_> {
        Canvas {
            dpr: 1,
            fill: Rgba([0, 0, 0, 255]),
            filter: FilterType::Triangle,
            masks,
        }
    }

    #[test]
    fn test_natural_size_is_kept() {
        let masks = CornerMasks::new(0);
        let src = RgbaImage::from_pixel(30, 20, Rgba([1, 2, 3, 255]));
        let out = image_pix(&src, false, 0, 5, &PixOptions::default(), &canvas(&masks));
        assert_eq!(out, src);
    }

    #[test]
    fn test_scale_ignores_aspect() {
        let masks = CornerMasks::new(0);
        let src = RgbaImage::from_pixel(30, 20, Rgba([1, 2, 3, 255]));
        let out = image_pix(&src, false, 10, 40, &PixOptions::default(), &canvas(&masks));
        assert_eq!(out.dimensions(), (10, 40));
    }

    #[test]
    fn test_zero_height_scales_to_width() {
        let masks = CornerMasks::new(0);
        let src = RgbaImage::from_pixel(300, 200, Rgba([1, 2, 3, 255]));
        let out = image_pix(&src, false, 150, 0, &PixOptions::default(), &canvas(&masks));
        assert_eq!(out.dimensions(), (150, 100));
    }

    #[test]
    fn test_letterbox_centers_image() {
        let masks = CornerMasks::new(0);
        let src = RgbaImage::from_pixel(200, 100, Rgba([255, 255, 255, 255]));
        let options = PixOptions {
            outer: Some((80, 80)),
            ..PixOptions::default()
        };
        let out = image_pix(&src, false, 50, 50, &options, &canvas(&masks));

        assert_eq!(out.dimensions(), (80, 80));
        assert_eq!(out.get_pixel(40, 40), &Rgba([255, 255, 255, 255]));
        assert_eq!(out.get_pixel(15, 15), &Rgba([255, 255, 255, 255]));
        assert_eq!(out.get_pixel(14, 40), &Rgba([0, 0, 0, 255]));
        assert_eq!(out.get_pixel(65, 40), &Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_rounding_follows_final_canvas() {
        let masks = CornerMasks::new(4);
        let src = RgbaImage::from_pixel(20, 20, Rgba([255, 255, 255, 255]));
        let options = PixOptions {
            rounded: true,
            outer: Some((40, 30)),
            ..PixOptions::default()
        };
        let out = image_pix(&src, false, 20, 20, &options, &canvas(&masks));

        assert_eq!(out.dimensions(), (40, 30));
        assert_eq!(out.get_pixel(0, 0)[3], 0);
        assert_eq!(out.get_pixel(39, 29)[3], 0);
        // a corner of the inner image is not rounded
        assert_eq!(out.get_pixel(10, 5), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_tint_applies_after_scale() {
        let masks = CornerMasks::new(0);
        let src = RgbaImage::from_pixel(16, 16, Rgba([0, 0, 0, 255]));
        let options = PixOptions {
            tint: Some(Rgba([10, 20, 30, 255])),
            ..PixOptions::default()
        };
        let out = image_pix(&src, false, 8, 8, &options, &canvas(&masks));
        assert_eq!(out.dimensions(), (8, 8));
        assert!(out.pixels().all(|p| *p == Rgba([9, 19, 29, 255])));
    }
}
