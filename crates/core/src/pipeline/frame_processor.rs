use std::sync::Arc;

use crate::detection::face_detector::FaceDetector;
use crate::shared::error::AnonymizeError;
use crate::shared::frame::Frame;
use crate::shared::settings::AnonymizationSettings;
use crate::transform::anonymizer::anonymize;

/// Result of processing one frame. Immutable once produced.
#[derive(Clone, Debug)]
pub struct FrameResult {
    pub frame: Frame,
    /// Number of regions the transform rendered for this frame. Always equal
    /// to the regions actually consumed; nothing is dropped silently.
    pub face_count: usize,
}

/// Detect-then-transform unit shared by the single-frame and video paths.
///
/// Orchestration only: detection and transform own the actual work. The
/// detector handle is shared and read-only, so one processor serves
/// concurrent requests.
#[derive(Clone)]
pub struct FrameProcessor {
    detector: Arc<dyn FaceDetector>,
}

impl FrameProcessor {
    pub fn new(detector: Arc<dyn FaceDetector>) -> Self {
        Self { detector }
    }

    /// Anonymizes one frame with the given per-request settings.
    ///
    /// Fails only when detection fails; zero detections yields the input
    /// pixels untouched with `face_count == 0`.
    pub fn process(
        &self,
        frame: &Frame,
        settings: &AnonymizationSettings,
    ) -> Result<FrameResult, AnonymizeError> {
        let regions = self.detector.detect(frame)?;
        let (anonymized, rendered) = anonymize(frame, &regions, settings);

        Ok(FrameResult {
            frame: anonymized,
            face_count: rendered,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::region::FaceRegion;
    use crate::shared::settings::Method;

    struct StubDetector {
        regions: Vec<FaceRegion>,
    }

    impl FaceDetector for StubDetector {
        fn detect(&self, _frame: &Frame) -> Result<Vec<FaceRegion>, AnonymizeError> {
            Ok(self.regions.clone())
        }
    }

    struct FailingDetector;

    impl FaceDetector for FailingDetector {
        fn detect(&self, _frame: &Frame) -> Result<Vec<FaceRegion>, AnonymizeError> {
            Err(AnonymizeError::InvalidImage("undecodable".into()))
        }
    }

    fn noisy_frame(width: u32, height: u32) -> Frame {
        let data = (0..(width * height * 3) as usize)
            .map(|i| ((i * 89 + 7) % 251) as u8)
            .collect();
        Frame::new(data, width, height, 3, 0)
    }

    fn settings() -> AnonymizationSettings {
        AnonymizationSettings::new(Method::Gaussian, 40, 10)
    }

    #[test]
    fn test_zero_detections_is_pixel_identical() {
        let processor = FrameProcessor::new(Arc::new(StubDetector { regions: vec![] }));
        let frame = noisy_frame(20, 20);
        let result = processor.process(&frame, &settings()).unwrap();
        assert_eq!(result.face_count, 0);
        assert_eq!(result.frame.data(), frame.data());
    }

    #[test]
    fn test_face_count_matches_rendered_regions() {
        let regions = vec![
            FaceRegion::new(2, 2, 6, 6, 0.9),
            FaceRegion::new(10, 10, 6, 6, 0.8),
            FaceRegion::new(500, 500, 6, 6, 0.7), // clips to nothing, not counted
        ];
        let processor = FrameProcessor::new(Arc::new(StubDetector { regions }));
        let result = processor.process(&noisy_frame(20, 20), &settings()).unwrap();
        assert_eq!(result.face_count, 2);
    }

    #[test]
    fn test_detector_failure_propagates() {
        let processor = FrameProcessor::new(Arc::new(FailingDetector));
        let err = processor.process(&noisy_frame(8, 8), &settings()).unwrap_err();
        assert!(matches!(err, AnonymizeError::InvalidImage(_)));
    }

    #[test]
    fn test_detected_region_is_obscured() {
        let regions = vec![FaceRegion::new(4, 4, 10, 10, 0.95)];
        let processor = FrameProcessor::new(Arc::new(StubDetector { regions }));
        let frame = noisy_frame(20, 20);
        let result = processor.process(&frame, &settings()).unwrap();
        assert_eq!(result.face_count, 1);
        assert_ne!(result.frame.data(), frame.data());
    }
}
