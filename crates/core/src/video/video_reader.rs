use std::path::Path;

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;

/// Decodes frames from a video source.
///
/// The frame sequence is lazy, finite, and non-restartable: implementations
/// yield frames in decode order exactly once. Codec and container details
/// stay behind this trait so the pipeline only sees `Frame` and
/// `VideoMetadata`.
pub trait VideoReader: Send {
    /// Opens the source and returns its fixed properties.
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>>;

    /// Iterator over frames in decode order. A decode failure mid-sequence
    /// surfaces as an `Err` item.
    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_>;

    /// Releases any resources held by the reader.
    fn close(&mut self);
}
