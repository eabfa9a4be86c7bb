//! Frame conversion and transformation utilities.

use nokhwa::pixel_format::RgbFormat;

use super::types::{CameraError, Frame};

/// Convert a nokhwa buffer to an RGB [`Frame`].
///
/// nokhwa's `decode_image` handles the camera's native format (MJPEG, YUYV,
/// NV12, ...).
pub fn convert_to_rgb(buffer: &nokhwa::Buffer) -> Result<Frame, CameraError> {
    let decoded = buffer
        .decode_image::<RgbFormat>()
        .map_err(|e| CameraError::ReadFailed(e.to_string()))?;
    let resolution = buffer.resolution();

    Ok(Frame::new(
        decoded.into_raw(),
        resolution.width(),
        resolution.height(),
    ))
}

/// Mirror a frame horizontally (flip left-right) for selfie mode.
pub fn mirror_horizontal(frame: &mut Frame) {
    let width = frame.width as usize;
    let bpp = Frame::BYTES_PER_PIXEL;
    let stride = width * bpp;
    if stride == 0 {
        return;
    }

    for row in frame.data.chunks_exact_mut(stride) {
        for x in 0..width / 2 {
            let left = x * bpp;
            let right = (width - 1 - x) * bpp;
            for i in 0..bpp {
                row.swap(left + i, right + i);
            }
        }
    }
}
