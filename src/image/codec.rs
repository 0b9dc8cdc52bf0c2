//! Decoding and encoding of stored image bytes
//!
//! Thin layer over the `image` crate. Decoding never fails loudly: corrupt or
//! empty input yields `None` and the caller falls back to the blank image.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, RgbaImage};
use tracing::{debug, warn};

use crate::error::{PixError, Result};

/// A decoded bitmap plus what the codec told us about it
#[derive(Debug, Clone)]
pub struct Decoded {
    pub bitmap: RgbaImage,
    /// The source color type carried an alpha channel
    pub has_alpha: bool,
    pub format: ImageFormat,
}

/// Decode `bytes`, trying `hint` first and then sniffing the format
pub fn decode(bytes: &[u8], hint: Option<ImageFormat>) -> Option<Decoded> {
    if bytes.is_empty() {
        return None;
    }

    if let Some(format) = hint {
        match image::load_from_memory_with_format(bytes, format) {
            Ok(img) => return Some(decoded(img, format)),
            Err(e) => debug!("decode as {:?} failed, sniffing format: {}", format, e),
        }
    }

    let format = match image::guess_format(bytes) {
        Ok(format) => format,
        Err(e) => {
            warn!("unrecognised image data ({} bytes): {}", bytes.len(), e);
            return None;
        }
    };
    match image::load_from_memory_with_format(bytes, format) {
        Ok(img) => Some(decoded(img, format)),
        Err(e) => {
            warn!("failed to decode {:?} image: {}", format, e);
            None
        }
    }
}

fn decoded(img: DynamicImage, format: ImageFormat) -> Decoded {
    Decoded {
        has_alpha: img.color().has_alpha(),
        bitmap: img.into_rgba8(),
        format,
    }
}

/// Encode `bitmap` as `format`
///
/// Opaque bitmaps are written as RGB so formats without alpha support
/// (JPEG) accept them.
pub fn encode(bitmap: &RgbaImage, has_alpha: bool, format: ImageFormat) -> Result<Vec<u8>> {
    let img = if has_alpha {
        DynamicImage::ImageRgba8(bitmap.clone())
    } else {
        DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(bitmap.clone()).into_rgb8())
    };

    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, format)?;
    let bytes = buffer.into_inner();
    if bytes.is_empty() {
        return Err(PixError::Encode(format!("{:?}", format)));
    }
    Ok(bytes)
}

/// Encode in `format`, falling back to PNG
///
/// Returns the bytes and the format they ended up in, or `None` when both
/// encoders refused.
pub fn encode_with_fallback(
    bitmap: &RgbaImage,
    has_alpha: bool,
    format: ImageFormat,
) -> Option<(Vec<u8>, ImageFormat)> {
    match encode(bitmap, has_alpha, format) {
        Ok(bytes) => return Some((bytes, format)),
        Err(e) if format != ImageFormat::Png => {
            debug!("encode as {:?} failed, retrying as PNG: {}", format, e);
        }
        Err(e) => {
            warn!("failed to encode bitmap: {}", e);
            return None;
        }
    }

    match encode(bitmap, has_alpha, ImageFormat::Png) {
        Ok(bytes) => Some((bytes, ImageFormat::Png)),
        Err(e) => {
            warn!("failed to encode bitmap as PNG: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn checker() -> RgbaImage {
        RgbaImage::from_fn(9, 7, |x, y| {
            if (x + y) % 2 == 0 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 255, 128])
            }
        })
    }

    #[test]
    fn test_png_roundtrip_is_lossless() {
        let src = checker();
        let bytes = encode(&src, true, ImageFormat::Png).unwrap();
        let back = decode(&bytes, Some(ImageFormat::Png)).unwrap();
        assert_eq!(back.bitmap, src);
        assert!(back.has_alpha);
        assert_eq!(back.format, ImageFormat::Png);
    }

    #[test]
    fn test_wrong_hint_is_sniffed() {
        let bytes = encode(&checker(), true, ImageFormat::Png).unwrap();
        let back = decode(&bytes, Some(ImageFormat::Gif)).unwrap();
        assert_eq!(back.format, ImageFormat::Png);
    }

    #[test]
    fn test_garbage_decodes_to_none() {
        assert!(decode(&[], None).is_none());
        assert!(decode(b"definitely not an image", Some(ImageFormat::Jpeg)).is_none());
    }

    #[test]
    fn test_opaque_jpeg_encodes() {
        let src = RgbaImage::from_pixel(8, 8, Rgba([90, 90, 90, 255]));
        let (bytes, format) = encode_with_fallback(&src, false, ImageFormat::Jpeg).unwrap();
        assert_eq!(format, ImageFormat::Jpeg);
        let back = decode(&bytes, None).unwrap();
        assert!(!back.has_alpha);
        assert_eq!(back.bitmap.dimensions(), (8, 8));
    }

    #[test]
    fn test_unencodable_format_falls_back_to_png() {
        // DDS is decode-only
        let (bytes, format) = encode_with_fallback(&checker(), true, ImageFormat::Dds).unwrap();
        assert_eq!(format, ImageFormat::Png);
        assert_eq!(decode(&bytes, None).unwrap().bitmap, checker());
    }
}
