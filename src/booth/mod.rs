//! Booth experiences and the capture session behind the camera screen.

mod experience;
mod session;

pub use experience::Experience;
pub use session::{BoothError, CaptureSession, CapturedMedia, StatusLine, Tone};
