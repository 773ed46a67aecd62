/// An axis-aligned face bounding box in the coordinate space of the frame it
/// was detected on, with the detector's confidence score.
///
/// A region is only meaningful against the frame it came from; it must not be
/// reused across frames of different dimensions without re-detection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FaceRegion {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    /// Detection confidence in `[0, 1]`.
    pub confidence: f64,
}

impl FaceRegion {
    pub fn new(x: i32, y: i32, width: i32, height: i32, confidence: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    /// Clips the region to frame bounds.
    ///
    /// Returns `None` when nothing of the region remains inside the frame
    /// (degenerate box, or entirely out of bounds); such regions are skipped
    /// by the transform and not counted as faces.
    pub fn clip(&self, frame_width: u32, frame_height: u32) -> Option<FaceRegion> {
        let x1 = self.x.max(0);
        let y1 = self.y.max(0);
        let x2 = (self.x + self.width).min(frame_width as i32);
        let y2 = (self.y + self.height).min(frame_height as i32);

        if x2 <= x1 || y2 <= y1 {
            return None;
        }
        Some(FaceRegion {
            x: x1,
            y: y1,
            width: x2 - x1,
            height: y2 - y1,
            confidence: self.confidence,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[test]
    fn test_confidence_is_clamped() {
        assert_relative_eq!(FaceRegion::new(0, 0, 10, 10, 1.7).confidence, 1.0);
        assert_relative_eq!(FaceRegion::new(0, 0, 10, 10, -0.2).confidence, 0.0);
    }

    #[test]
    fn test_clip_inside_frame_is_unchanged() {
        let r = FaceRegion::new(10, 20, 30, 40, 0.9);
        assert_eq!(r.clip(100, 100), Some(r));
    }

    #[test]
    fn test_clip_trims_overhang() {
        let r = FaceRegion::new(-5, 90, 20, 20, 0.8);
        let clipped = r.clip(100, 100).unwrap();
        assert_eq!(
            (clipped.x, clipped.y, clipped.width, clipped.height),
            (0, 90, 15, 10)
        );
        assert_relative_eq!(clipped.confidence, 0.8);
    }

    #[rstest]
    #[case::zero_width(FaceRegion::new(10, 10, 0, 20, 0.5))]
    #[case::zero_height(FaceRegion::new(10, 10, 20, 0, 0.5))]
    #[case::negative_size(FaceRegion::new(10, 10, -5, -5, 0.5))]
    #[case::fully_left(FaceRegion::new(-30, 10, 20, 20, 0.5))]
    #[case::fully_below(FaceRegion::new(10, 200, 20, 20, 0.5))]
    fn test_clip_degenerate_is_none(#[case] region: FaceRegion) {
        assert_eq!(region.clip(100, 100), None);
    }

    #[test]
    fn test_clip_touching_edge_is_none() {
        // Starts exactly at the right edge: zero visible area.
        let r = FaceRegion::new(100, 0, 20, 20, 0.5);
        assert_eq!(r.clip(100, 100), None);
    }
}
