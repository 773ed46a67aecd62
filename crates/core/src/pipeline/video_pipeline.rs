use std::path::Path;

use crate::pipeline::frame_processor::FrameProcessor;
use crate::shared::error::AnonymizeError;
use crate::shared::settings::AnonymizationSettings;
use crate::video::video_reader::VideoReader;
use crate::video::video_writer::VideoWriter;

/// Aggregated counts for a completed video job.
///
/// Created only after the full input sequence has been consumed.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct VideoStats {
    pub total_frames: usize,
    pub total_faces: usize,
}

impl VideoStats {
    pub fn avg_faces_per_frame(&self) -> f64 {
        if self.total_frames == 0 {
            0.0
        } else {
            self.total_faces as f64 / self.total_frames as f64
        }
    }
}

/// Sequential decode → process → encode pipeline.
///
/// Frames are processed strictly in decode order because the encoder requires
/// ordered input; the output preserves the input's frame count, order, native
/// frame rate, and frame size. A video is either fully processed or produces
/// nothing: any mid-stream decode failure fails the job and the partially
/// written output file is removed, so a truncated artifact can never leak
/// unanonymized content.
pub struct VideoPipeline {
    processor: FrameProcessor,
}

impl VideoPipeline {
    pub fn new(processor: FrameProcessor) -> Self {
        Self { processor }
    }

    /// Runs the full job. The writer is opened before the frame loop and
    /// closed on every exit path; the output file only survives when
    /// finalization succeeds.
    pub fn run(
        &self,
        reader: &mut dyn VideoReader,
        writer: &mut dyn VideoWriter,
        input: &Path,
        output: &Path,
        settings: &AnonymizationSettings,
    ) -> Result<VideoStats, AnonymizeError> {
        let metadata = reader
            .open(input)
            .map_err(AnonymizeError::invalid_video)?;
        log::info!(
            "video job: {}x{} @ {:.2} fps, {} declared frames",
            metadata.width,
            metadata.height,
            metadata.fps,
            metadata.total_frames
        );

        if let Err(e) = writer.open(output, &metadata) {
            reader.close();
            // The writer may have created the output file before failing.
            remove_partial(output);
            return Err(std::io::Error::other(e.to_string()).into());
        }

        let result = self.drive(reader, writer, settings);
        reader.close();
        let finalize = writer.close();

        match (result, finalize) {
            (Ok(stats), Ok(())) => Ok(stats),
            (Err(e), _) => {
                remove_partial(output);
                Err(e)
            }
            (Ok(_), Err(e)) => {
                remove_partial(output);
                Err(std::io::Error::other(e.to_string()).into())
            }
        }
    }

    fn drive(
        &self,
        reader: &mut dyn VideoReader,
        writer: &mut dyn VideoWriter,
        settings: &AnonymizationSettings,
    ) -> Result<VideoStats, AnonymizeError> {
        let mut stats = VideoStats::default();

        for frame in reader.frames() {
            let frame = frame.map_err(AnonymizeError::invalid_video)?;
            let result = self.processor.process(&frame, settings)?;
            writer
                .write(&result.frame)
                .map_err(|e| AnonymizeError::Io(std::io::Error::other(e.to_string())))?;
            stats.total_frames += 1;
            stats.total_faces += result.face_count;
        }

        Ok(stats)
    }
}

fn remove_partial(output: &Path) {
    if output.exists() {
        if let Err(e) = std::fs::remove_file(output) {
            log::warn!("failed to remove partial output {}: {e}", output.display());
        }
    }
}
