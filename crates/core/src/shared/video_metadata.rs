use std::path::PathBuf;

/// Properties of an opened video source, fixed for the duration of a job.
///
/// The output container preserves `fps` and the frame size; `total_frames` is
/// the container's declared count and may be 0 for streams that don't report
/// one (actual totals come from counting decoded frames).
#[derive(Clone, Debug, PartialEq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub total_frames: usize,
    pub codec: String,
    pub source_path: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction() {
        let meta = VideoMetadata {
            width: 1280,
            height: 720,
            fps: 25.0,
            total_frames: 250,
            codec: "h264".to_string(),
            source_path: Some(PathBuf::from("/tmp/in.mp4")),
        };
        assert_eq!(meta.width, 1280);
        assert_eq!(meta.fps, 25.0);
        assert_eq!(meta.clone(), meta);
    }
}
