use crate::shared::error::AnonymizeError;
use crate::shared::frame::Frame;
use crate::shared::region::FaceRegion;

/// Domain interface for face detection.
///
/// Detection is a pure read of the frame: deterministic for a fixed model and
/// fixed frame bytes, no mutation of the input, and an empty result when no
/// face clears the model's confidence threshold (never an error). The model
/// behind an implementation is loaded once and read-only, so a single
/// detector instance is shared across concurrent requests (`&self` + `Sync`).
pub trait FaceDetector: Send + Sync {
    fn detect(&self, frame: &Frame) -> Result<Vec<FaceRegion>, AnonymizeError>;
}
