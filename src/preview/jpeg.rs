//! JPEG encoding of frames for display and for saved photos.

use image::RgbImage;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};

use crate::camera::Frame;
use crate::media::MediaError;

/// Frames wider than this are scaled down before preview encoding.
pub const DEFAULT_MAX_WIDTH: u32 = 640;

/// Preview JPEG quality; lower is faster to encode and ship.
pub const DEFAULT_JPEG_QUALITY: u8 = 80;

/// Wrap a frame's pixels in an [`RgbImage`].
pub fn to_rgb_image(frame: &Frame) -> Result<RgbImage, MediaError> {
    RgbImage::from_raw(frame.width, frame.height, frame.data.clone()).ok_or(
        MediaError::MalformedFrame {
            width: frame.width,
            height: frame.height,
            len: frame.data.len(),
        },
    )
}

/// Downscale `image` so it is at most `max_width` wide, keeping aspect ratio.
pub fn fit_width(image: RgbImage, max_width: u32) -> RgbImage {
    if max_width == 0 || image.width() <= max_width {
        return image;
    }
    let height = ((image.height() as u64 * max_width as u64) / image.width() as u64).max(1) as u32;
    imageops::resize(&image, max_width, height, FilterType::Triangle)
}

/// Encode a frame as JPEG, optionally limiting its width first.
pub fn encode_jpeg(frame: &Frame, max_width: Option<u32>, quality: u8) -> Result<Vec<u8>, MediaError> {
    let mut image = to_rgb_image(frame)?;
    if let Some(max_width) = max_width {
        image = fit_width(image, max_width);
    }

    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100)).encode_image(&image)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_jpeg_downscales_wide_frames() {
        let frame = Frame::solid(1280, 720, [10, 200, 30]);
        let bytes = encode_jpeg(&frame, Some(640), 80).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.width(), 640);
        assert_eq!(decoded.height(), 360);
    }

    #[test]
    fn test_encode_jpeg_keeps_small_frames() {
        let frame = Frame::solid(320, 240, [0, 0, 0]);
        let bytes = encode_jpeg(&frame, Some(640), 80).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (320, 240));
    }

    #[test]
    fn test_encode_jpeg_rejects_malformed_frame() {
        let frame = Frame::new(vec![0; 5], 2, 2);
        assert!(matches!(
            encode_jpeg(&frame, None, 80),
            Err(MediaError::MalformedFrame { len: 5, .. })
        ));
    }
}
