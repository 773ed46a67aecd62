pub mod annotator;

use std::io::Write;
use std::sync::Arc;

use crate::artifact::store::{ArtifactId, ArtifactStore};
use crate::detection::face_detector::FaceDetector;
use crate::pipeline::frame_processor::FrameProcessor;
use crate::pipeline::video_pipeline::VideoPipeline;
use crate::shared::error::AnonymizeError;
use crate::shared::settings::AnonymizationSettings;
use crate::video::ffmpeg_reader::FfmpegReader;
use crate::video::ffmpeg_writer::FfmpegWriter;
use crate::video::image_codec::{decode_image, encode_jpeg, write_image};

use annotator::{JobAnnotator, JobReport};

/// Reply for a single live frame: re-encoded pixels plus the face count.
#[derive(Clone, Debug)]
pub struct FrameResponse {
    pub image: Vec<u8>,
    pub face_count: usize,
}

/// Reply for an uploaded image: stats plus a downloadable artifact.
#[derive(Clone, Debug)]
pub struct ImageJobResult {
    pub face_count: usize,
    pub artifact: ArtifactId,
}

/// Reply for an uploaded video: aggregated stats plus a downloadable artifact.
#[derive(Clone, Debug)]
pub struct VideoJobResult {
    pub total_frames: usize,
    pub total_faces: usize,
    pub avg_faces_per_frame: f64,
    pub artifact: ArtifactId,
}

/// Boundary the HTTP layer talks to: one synchronous operation per route.
///
/// Holds the process-wide read-only detector handle and the artifact store;
/// settings always arrive per request, never from shared state.
pub struct AnonymizerService {
    processor: FrameProcessor,
    store: ArtifactStore,
    annotator: Option<Box<dyn JobAnnotator>>,
}

impl AnonymizerService {
    pub fn new(detector: Arc<dyn FaceDetector>, store: ArtifactStore) -> Self {
        Self {
            processor: FrameProcessor::new(detector),
            store,
            annotator: None,
        }
    }

    pub fn with_annotator(mut self, annotator: Box<dyn JobAnnotator>) -> Self {
        self.annotator = Some(annotator);
        self
    }

    /// Anonymizes one webcam frame and returns it re-encoded as JPEG.
    pub fn process_frame(
        &self,
        image_bytes: &[u8],
        settings: &AnonymizationSettings,
    ) -> Result<FrameResponse, AnonymizeError> {
        let frame = decode_image(image_bytes)?;
        let result = self.processor.process(&frame, settings)?;
        Ok(FrameResponse {
            image: encode_jpeg(&result.frame)?,
            face_count: result.face_count,
        })
    }

    /// Anonymizes an uploaded image and stores the result for download.
    pub fn process_image(
        &self,
        image_bytes: &[u8],
        settings: &AnonymizationSettings,
    ) -> Result<ImageJobResult, AnonymizeError> {
        let frame = decode_image(image_bytes)?;
        let result = self.processor.process(&frame, settings)?;

        let (id, path) = self.store.allocate("png");
        write_image(&result.frame, &path)?;
        self.store.commit(id.clone(), path);

        self.annotate(&JobReport::Image {
            face_count: result.face_count,
        });

        Ok(ImageJobResult {
            face_count: result.face_count,
            artifact: id,
        })
    }

    /// Anonymizes an uploaded video and stores the result for download.
    ///
    /// The upload is staged to a temp file for the decoder; the output
    /// artifact only becomes retrievable after the whole video has been
    /// processed and finalized.
    pub fn process_video(
        &self,
        video_bytes: &[u8],
        settings: &AnonymizationSettings,
    ) -> Result<VideoJobResult, AnonymizeError> {
        let mut staged = tempfile::NamedTempFile::new()?;
        staged.write_all(video_bytes)?;
        staged.flush()?;

        let (id, output_path) = self.store.allocate("mp4");
        let mut reader = FfmpegReader::new();
        let mut writer = FfmpegWriter::new();

        let stats = VideoPipeline::new(self.processor.clone()).run(
            &mut reader,
            &mut writer,
            staged.path(),
            &output_path,
            settings,
        )?;

        self.store.commit(id.clone(), output_path);
        self.annotate(&JobReport::Video { stats });

        Ok(VideoJobResult {
            total_frames: stats.total_frames,
            total_faces: stats.total_faces,
            avg_faces_per_frame: stats.avg_faces_per_frame(),
            artifact: id,
        })
    }

    /// Raw bytes of a previously produced artifact.
    pub fn fetch_artifact(&self, id: &ArtifactId) -> Result<Vec<u8>, AnonymizeError> {
        self.store.fetch(id)
    }

    /// On-disk location of a previously produced artifact, for callers that
    /// stream large files instead of buffering them.
    pub fn artifact_path(&self, id: &ArtifactId) -> Result<std::path::PathBuf, AnonymizeError> {
        self.store.path_of(id)
    }

    fn annotate(&self, report: &JobReport) {
        let Some(annotator) = self.annotator.as_deref() else {
            return;
        };
        match annotator.describe(report) {
            Ok(summary) => log::info!("{summary}"),
            // Best-effort only; the job result is already fixed.
            Err(e) => log::warn!("job annotator failed: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::frame::Frame;
    use crate::shared::region::FaceRegion;
    use crate::shared::settings::Method;
    use image::{ImageFormat, RgbImage};
    use std::io::Cursor;
    use tempfile::TempDir;

    struct StubDetector {
        regions: Vec<FaceRegion>,
    }

    impl FaceDetector for StubDetector {
        fn detect(&self, _frame: &Frame) -> Result<Vec<FaceRegion>, AnonymizeError> {
            Ok(self.regions.clone())
        }
    }

    struct FailingAnnotator;

    impl JobAnnotator for FailingAnnotator {
        fn describe(&self, _report: &JobReport) -> Result<String, Box<dyn std::error::Error>> {
            Err("annotation backend unreachable".into())
        }
    }

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([((x * 31 + y * 7) % 255) as u8, (y * 11 % 255) as u8, 90])
        });
        let mut bytes = Cursor::new(Vec::new());
        img.write_to(&mut bytes, ImageFormat::Png).unwrap();
        bytes.into_inner()
    }

    fn service(tmp: &TempDir, regions: Vec<FaceRegion>) -> AnonymizerService {
        let store = ArtifactStore::new(tmp.path().join("artifacts")).unwrap();
        AnonymizerService::new(Arc::new(StubDetector { regions }), store)
    }

    fn settings() -> AnonymizationSettings {
        AnonymizationSettings::new(Method::Pixelate, 50, 10)
    }

    #[test]
    fn test_process_frame_zero_faces() {
        let tmp = TempDir::new().unwrap();
        let svc = service(&tmp, vec![]);
        let reply = svc.process_frame(&png_bytes(16, 16), &settings()).unwrap();
        assert_eq!(reply.face_count, 0);
        // The reply is a decodable image of the same dimensions.
        let frame = decode_image(&reply.image).unwrap();
        assert_eq!((frame.width(), frame.height()), (16, 16));
    }

    #[test]
    fn test_process_frame_counts_faces() {
        let tmp = TempDir::new().unwrap();
        let svc = service(&tmp, vec![FaceRegion::new(2, 2, 8, 8, 0.9)]);
        let reply = svc.process_frame(&png_bytes(16, 16), &settings()).unwrap();
        assert_eq!(reply.face_count, 1);
    }

    #[test]
    fn test_process_frame_rejects_garbage() {
        let tmp = TempDir::new().unwrap();
        let svc = service(&tmp, vec![]);
        let err = svc.process_frame(b"not an image", &settings()).unwrap_err();
        assert!(matches!(err, AnonymizeError::InvalidImage(_)));
    }

    #[test]
    fn test_process_image_produces_retrievable_artifact() {
        let tmp = TempDir::new().unwrap();
        let svc = service(&tmp, vec![FaceRegion::new(1, 1, 6, 6, 0.8)]);

        let result = svc.process_image(&png_bytes(12, 12), &settings()).unwrap();
        assert_eq!(result.face_count, 1);

        let bytes = svc.fetch_artifact(&result.artifact).unwrap();
        let frame = decode_image(&bytes).unwrap();
        assert_eq!((frame.width(), frame.height()), (12, 12));
    }

    #[test]
    fn test_zero_face_image_artifact_is_pixel_identical() {
        let tmp = TempDir::new().unwrap();
        let svc = service(&tmp, vec![]);
        let input = png_bytes(10, 10);

        let result = svc.process_image(&input, &settings()).unwrap();
        assert_eq!(result.face_count, 0);

        let stored = decode_image(&svc.fetch_artifact(&result.artifact).unwrap()).unwrap();
        let original = decode_image(&input).unwrap();
        assert_eq!(stored.data(), original.data());
    }

    #[test]
    fn test_corrupt_video_yields_no_artifact() {
        let tmp = TempDir::new().unwrap();
        let svc = service(&tmp, vec![]);

        let err = svc
            .process_video(b"\x00\x01garbage payload", &settings())
            .unwrap_err();
        assert!(matches!(err, AnonymizeError::InvalidVideo(_)));

        // Nothing may be left behind in the artifact directory.
        let leftovers: Vec<_> = std::fs::read_dir(tmp.path().join("artifacts"))
            .unwrap()
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_failing_annotator_does_not_change_result() {
        let tmp = TempDir::new().unwrap();
        let store = ArtifactStore::new(tmp.path().join("artifacts")).unwrap();
        let svc = AnonymizerService::new(
            Arc::new(StubDetector {
                regions: vec![FaceRegion::new(2, 2, 5, 5, 0.9)],
            }),
            store,
        )
        .with_annotator(Box::new(FailingAnnotator));

        let result = svc.process_image(&png_bytes(12, 12), &settings()).unwrap();
        assert_eq!(result.face_count, 1);
        assert!(svc.fetch_artifact(&result.artifact).is_ok());
    }

    #[test]
    fn test_artifact_path_matches_fetched_bytes() {
        let tmp = TempDir::new().unwrap();
        let svc = service(&tmp, vec![]);

        let result = svc.process_image(&png_bytes(8, 8), &settings()).unwrap();
        let path = svc.artifact_path(&result.artifact).unwrap();
        assert_eq!(
            std::fs::read(path).unwrap(),
            svc.fetch_artifact(&result.artifact).unwrap()
        );
    }

    #[test]
    fn test_fetch_unknown_artifact() {
        let tmp = TempDir::new().unwrap();
        let svc = service(&tmp, vec![]);
        let other = TempDir::new().unwrap();
        let foreign = ArtifactStore::new(other.path()).unwrap();
        let (foreign_id, _) = foreign.allocate("png");

        assert!(matches!(
            svc.fetch_artifact(&foreign_id).unwrap_err(),
            AnonymizeError::UnknownArtifact(_)
        ));
    }

    // Settings are owned per call; two concurrent-style calls with different
    // methods must not observe each other.
    #[test]
    fn test_settings_are_per_request() {
        let tmp = TempDir::new().unwrap();
        let svc = service(&tmp, vec![FaceRegion::new(0, 0, 12, 12, 0.9)]);
        let input = png_bytes(16, 16);

        let gaussian = AnonymizationSettings::new(Method::Gaussian, 90, 10);
        let pixelate = AnonymizationSettings::new(Method::Pixelate, 90, 10);

        let a = svc.process_frame(&input, &gaussian).unwrap();
        let b = svc.process_frame(&input, &pixelate).unwrap();
        assert_eq!(a.face_count, 1);
        assert_eq!(b.face_count, 1);
        assert_ne!(a.image, b.image);
    }

    #[test]
    fn test_service_is_shareable_across_threads() {
        fn requires_send_sync<T: Send + Sync>(_: &T) {}
        let tmp = TempDir::new().unwrap();
        let svc = service(&tmp, vec![]);
        requires_send_sync(&svc);
    }
}
