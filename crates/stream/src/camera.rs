use std::path::PathBuf;

use anonymizer_core::shared::frame::Frame;
use anonymizer_core::video::ffmpeg_reader::FfmpegReader;
use anonymizer_core::video::video_reader::VideoReader;

use crate::error::StreamError;

/// Source of live frames for the streaming loop.
///
/// Exclusively owned while capturing; `release` must leave the device
/// reusable for a later `open`.
pub trait CameraSource: Send {
    fn open(&mut self) -> Result<(), StreamError>;

    fn capture(&mut self) -> Result<Frame, StreamError>;

    fn release(&mut self);
}

/// Camera backed by a video file: decodes the clip once on `open` and then
/// cycles through its frames forever. Meant for short clips.
pub struct FileCamera {
    path: PathBuf,
    frames: Vec<Frame>,
    cursor: usize,
    captured: usize,
}

impl FileCamera {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            frames: Vec::new(),
            cursor: 0,
            captured: 0,
        }
    }

    #[cfg(test)]
    fn preloaded(frames: Vec<Frame>) -> Self {
        Self {
            path: PathBuf::new(),
            frames,
            cursor: 0,
            captured: 0,
        }
    }
}

impl CameraSource for FileCamera {
    fn open(&mut self) -> Result<(), StreamError> {
        let mut reader = FfmpegReader::new();
        reader
            .open(&self.path)
            .map_err(|e| StreamError::DeviceAccess(e.to_string()))?;

        let mut frames = Vec::new();
        for frame in reader.frames() {
            frames.push(frame.map_err(|e| StreamError::DeviceAccess(e.to_string()))?);
        }
        reader.close();

        if frames.is_empty() {
            return Err(StreamError::DeviceAccess(format!(
                "{} contains no frames",
                self.path.display()
            )));
        }

        self.frames = frames;
        self.cursor = 0;
        self.captured = 0;
        Ok(())
    }

    fn capture(&mut self) -> Result<Frame, StreamError> {
        if self.frames.is_empty() {
            return Err(StreamError::DeviceAccess("camera is not open".into()));
        }

        let source = &self.frames[self.cursor];
        self.cursor = (self.cursor + 1) % self.frames.len();

        // Re-index so emitted frames form one monotonically increasing stream.
        let frame = Frame::new(
            source.data().to_vec(),
            source.width(),
            source.height(),
            source.channels(),
            self.captured,
        );
        self.captured += 1;
        Ok(frame)
    }

    fn release(&mut self) {
        self.frames.clear();
        self.cursor = 0;
    }
}
