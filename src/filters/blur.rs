//! Fixed-radius box blur
//!
//! A two-pass approximation of a gaussian using a triangular kernel of
//! radius 3. Every pixel is widened into a `u64` with one 16-bit lane per
//! channel so all four channels are summed with a single add. Kernel weights
//! sum to `(radius + 1)^2 = 16` per pass, so every pass stays below 4096 per
//! lane and is normalized with `>> 4` before the next one reads it: lanes
//! never carry into each other.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

use super::pixels;

/// Kernel radius in pixels
pub const BLUR_RADIUS: u32 = 3;

const LANES: u64 = 0x00ff_00ff_00ff_00ff;

#[inline]
fn widen(px: [u8; 4]) -> u64 {
    px[0] as u64 | (px[1] as u64) << 16 | (px[2] as u64) << 32 | (px[3] as u64) << 48
}

/// Divide every lane by the kernel weight of one pass
#[inline]
fn normalize(sum: u64) -> u64 {
    (sum >> 4) & LANES
}

#[inline]
fn narrow(v: u64) -> [u8; 4] {
    [v as u8, (v >> 16) as u8, (v >> 32) as u8, (v >> 48) as u8]
}

/// Triangular sliding-window sum over one line of packed values
///
/// `get(i)` must return the sample for `i` already clamped into the line.
/// Writes `len` sums through `put`. The window is advanced by adding the
/// samples entering the rising half and removing the ones leaving the
/// falling half, subtracting before adding so no lane ever goes negative.
fn slide(len: usize, get: impl Fn(isize) -> u64, mut put: impl FnMut(usize, u64)) {
    let r = BLUR_RADIUS as isize;
    let r1 = r + 1;

    let mut sum = 0u64;
    for d in -r..=r {
        sum += (r1 - d.abs()) as u64 * get(d);
    }
    // samples in [x - r, x] leave the kernel's weight by one when x advances
    let mut out_sum = 0u64;
    for d in -r..=0 {
        out_sum += get(d);
    }
    // samples in [x + 1, x + r + 1] gain one
    let mut in_sum = 0u64;
    for d in 1..=r1 {
        in_sum += get(d);
    }

    for x in 0..len {
        put(x, sum);

        let xi = x as isize;
        sum = sum - out_sum + in_sum;
        out_sum = out_sum - get(xi - r) + get(xi + 1);
        in_sum = in_sum - get(xi + 1) + get(xi + r1 + 1);
    }
}

/// Blur `img` with the fixed radius kernel
///
/// Images no larger than the kernel in either dimension come back unchanged.
/// With `with_alpha` set the source is shrunk into the inner rectangle of a
/// same-size transparent canvas, inset by the radius on every side, so the
/// blur fades out towards the edges instead of clamping opaque pixels.
/// The result always has the size of the input.
pub fn image_blur(img: RgbaImage, with_alpha: bool) -> RgbaImage {
    let (w, h) = img.dimensions();
    let div = BLUR_RADIUS * 2 + 1;
    if BLUR_RADIUS >= 16 || div >= w || div >= h {
        return img;
    }

    let mut img = if with_alpha {
        let pad = BLUR_RADIUS;
        let inner = imageops::resize(&img, w - 2 * pad, h - 2 * pad, FilterType::Triangle);
        let mut canvas = RgbaImage::from_pixel(w, h, Rgba([0, 0, 0, 0]));
        imageops::replace(&mut canvas, &inner, pad as i64, pad as i64);
        canvas
    } else {
        img
    };

    blur_in_place(&mut img);
    img
}

fn blur_in_place(img: &mut RgbaImage) {
    let (w, h) = img.dimensions();
    let (w, h) = (w as usize, h as usize);
    let mut scratch = vec![0u64; w * h];

    let px = pixels(img);

    for y in 0..h {
        let row = &px[y * w..(y + 1) * w];
        let line = &mut scratch[y * w..(y + 1) * w];
        slide(
            w,
            |i| widen(row[i.clamp(0, w as isize - 1) as usize]),
            |x, sum| line[x] = normalize(sum),
        );
    }

    for x in 0..w {
        let column = |i: isize| scratch[i.clamp(0, h as isize - 1) as usize * w + x];
        slide(h, column, |y, sum| px[y * w + x] = narrow(normalize(sum)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_image_is_unchanged() {
        for (w, h) in [(8, 8), (13, 9), (40, 17)] {
            let src = RgbaImage::from_pixel(w, h, Rgba([200, 17, 90, 255]));
            let out = image_blur(src.clone(), false);
            assert_eq!(out, src, "{}x{}", w, h);
        }
    }

    #[test]
    fn test_small_image_is_returned_unmodified() {
        let mut src = RgbaImage::from_pixel(7, 20, Rgba([0, 0, 0, 255]));
        src.put_pixel(3, 3, Rgba([255, 255, 255, 255]));
        let out = image_blur(src.clone(), false);
        assert_eq!(out, src);

        let out = image_blur(src.clone(), true);
        assert_eq!(out.dimensions(), (7, 20));
    }

    #[test]
    fn test_spreads_single_bright_pixel() {
        let mut src = RgbaImage::from_pixel(16, 16, Rgba([0, 0, 0, 255]));
        src.put_pixel(8, 8, Rgba([255, 255, 255, 255]));
        let out = image_blur(src, false);

        // (255 * 4 >> 4) * 4 >> 4
        assert_eq!(out.get_pixel(8, 8)[0], 15);
        // (255 * 2 >> 4) * 4 >> 4
        assert_eq!(out.get_pixel(10, 8)[0], 7);
        assert_eq!(out.get_pixel(12, 8)[0], 0);
        assert_eq!(out.get_pixel(8, 8)[3], 255);
    }

    #[test]
    fn test_alpha_path_keeps_size() {
        let src = RgbaImage::from_pixel(20, 24, Rgba([50, 60, 70, 255]));
        let out = image_blur(src, true);
        assert_eq!(out.dimensions(), (20, 24));
        // edges fade towards transparent, the middle stays opaque
        assert_eq!(out.get_pixel(0, 0)[3], 0);
        assert!(out.get_pixel(3, 12)[3] < 255);
        assert_eq!(out.get_pixel(10, 12)[3], 255);
    }

    #[test]
    fn test_each_pass_truncates() {
        let mut src = RgbaImage::from_pixel(12, 12, Rgba([0, 0, 0, 255]));
        src.put_pixel(5, 5, Rgba([255, 255, 255, 255]));
        src.put_pixel(7, 6, Rgba([200, 200, 200, 255]));
        let out = image_blur(src, false);
        // a single division by 256 at the end would give 15 and 11
        assert_eq!(out.get_pixel(5, 4)[0], 14);
        assert_eq!(out.get_pixel(8, 5)[0], 10);
        assert_eq!(out.get_pixel(5, 4)[3], 255);
    }
}
