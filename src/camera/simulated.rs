//! Synthetic camera feed used when no physical camera is available.

use super::source::FrameSource;
use super::types::{CameraError, Frame, Resolution};

const SIM_FPS: u32 = 30;

/// Animated colour gradient, 640x480.
///
/// Each frame is computed from its index rather than the wall clock, so the
/// feed is reproducible.
#[derive(Debug)]
pub struct SimulatedSource {
    resolution: Resolution,
    frame_index: u64,
}

impl Default for SimulatedSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedSource {
    pub fn new() -> Self {
        Self::with_resolution(Resolution::VGA)
    }

    pub fn with_resolution(resolution: Resolution) -> Self {
        Self {
            resolution,
            frame_index: 0,
        }
    }

    /// Render frame number `index`. Pixels are painted in 2x2 blocks.
    pub fn render(&self, index: u64) -> Frame {
        let width = self.resolution.width as usize;
        let height = self.resolution.height as usize;
        let t = index as f32 * 2.0 / SIM_FPS as f32;
        let mut data = vec![0u8; width * height * Frame::BYTES_PER_PIXEL];

        for y in (0..height).step_by(2) {
            for x in (0..width).step_by(2) {
                let (xf, yf) = (x as f32, y as f32);
                let r = channel(xf / 50.0 + t);
                let g = channel(yf / 50.0 + t * 0.7);
                let b = channel((xf + yf) / 100.0 + t * 1.3);

                for py in y..(y + 2).min(height) {
                    for px in x..(x + 2).min(width) {
                        let i = (py * width + px) * Frame::BYTES_PER_PIXEL;
                        data[i] = r;
                        data[i + 1] = g;
                        data[i + 2] = b;
                    }
                }
            }
        }

        Frame::new(data, self.resolution.width, self.resolution.height)
    }
}

fn channel(phase: f32) -> u8 {
    (127.0 + 127.0 * phase.sin()) as u8
}

impl FrameSource for SimulatedSource {
    fn read_frame(&mut self) -> Result<Frame, CameraError> {
        self.frame_index += 1;
        Ok(self.render(self.frame_index))
    }

    fn resolution(&self) -> Resolution {
        self.resolution
    }

    fn frame_rate(&self) -> u32 {
        SIM_FPS
    }

    fn describe(&self) -> String {
        "simulated camera".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frames_have_declared_size() {
        let mut source = SimulatedSource::with_resolution(Resolution { width: 33, height: 17 });
        let frame = source.read_frame().unwrap();
        assert!(frame.is_consistent());
        assert_eq!(frame.width, 33);
        assert_eq!(frame.height, 17);
    }

    #[test]
    fn test_feed_animates() {
        let source = SimulatedSource::with_resolution(Resolution { width: 16, height: 16 });
        assert_ne!(source.render(1).data, source.render(10).data);
    }

    #[test]
    fn test_feed_is_reproducible() {
        let source = SimulatedSource::with_resolution(Resolution { width: 8, height: 8 });
        assert_eq!(source.render(5).data, source.render(5).data);
    }
}
