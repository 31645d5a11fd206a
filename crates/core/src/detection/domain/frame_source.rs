use crate::shared::detection::Detection;

/// Domain interface for the external face detector.
///
/// Each call pulls the next available frame and returns its best face, or
/// `None` when the frame holds no face. Implementations may block until a
/// frame is ready, hence `&mut self`.
pub trait FrameSource: Send {
    fn next_detection(&mut self) -> Result<Option<Detection>, Box<dyn std::error::Error>>;
}
