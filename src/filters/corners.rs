/// Corner alpha masks for rounded variants
///
/// Four square coverage masks, one per corner, each `size x size`. Rebuilt
/// by the context whenever the corner radius or density factor changes.
use image::{GrayImage, Luma};

/// Samples per axis when estimating how much of a pixel the arc covers
const SUPERSAMPLE: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    TopLeft = 0,
    TopRight = 1,
    BottomLeft = 2,
    BottomRight = 3,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];
}

#[derive(Debug, Clone)]
pub struct CornerMasks {
    size: u32,
    masks: [GrayImage; 4],
}

impl CornerMasks {
    /// Build masks for a radius given in device pixels
    pub fn new(radius: u32) -> Self {
        let top_left = quarter_disc(radius);
        let top_right = image::imageops::flip_horizontal(&top_left);
        let bottom_left = image::imageops::flip_vertical(&top_left);
        let bottom_right = image::imageops::flip_vertical(&top_right);

        Self {
            size: radius,
            masks: [top_left, top_right, bottom_left, bottom_right],
        }
    }

    /// Side length of each mask
    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn mask(&self, corner: Corner) -> &GrayImage {
        &self.masks[corner as usize]
    }
}

/// Coverage of a disc of `radius` centered on the mask's bottom-right corner
fn quarter_disc(radius: u32) -> GrayImage {
    let r = radius as f32;
    let step = 1.0 / SUPERSAMPLE as f32;
    let total = (SUPERSAMPLE * SUPERSAMPLE) as f32;

    GrayImage::from_fn(radius, radius, |x, y| {
        let mut inside = 0u32;
        for sy in 0..SUPERSAMPLE {
            for sx in 0..SUPERSAMPLE {
                let px = x as f32 + (sx as f32 + 0.5) * step;
                let py = y as f32 + (sy as f32 + 0.5) * step;
                let (dx, dy) = (r - px, r - py);
                if dx * dx + dy * dy <= r * r {
                    inside += 1;
                }
            }
        }
        Luma([(inside as f32 / total * 255.0).round() as u8])
    })
}
