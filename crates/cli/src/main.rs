use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use clap::Parser;

use anonymizer_core::detection::face_detector::FaceDetector;
use anonymizer_core::detection::model_resolver;
use anonymizer_core::detection::onnx_face_detector::OnnxFaceDetector;
use anonymizer_core::pipeline::frame_processor::FrameProcessor;
use anonymizer_core::pipeline::video_pipeline::VideoPipeline;
use anonymizer_core::shared::constants::{
    DEFAULT_INTENSITY, DETECTION_CONFIDENCE, FACE_MODEL_NAME, FACE_MODEL_URL, IMAGE_EXTENSIONS,
};
use anonymizer_core::shared::settings::{AnonymizationSettings, Method};
use anonymizer_core::video::ffmpeg_reader::FfmpegReader;
use anonymizer_core::video::ffmpeg_writer::FfmpegWriter;
use anonymizer_core::video::image_codec::{decode_image, write_image};

/// Anonymize faces in an image or video by blurring or pixelating them.
#[derive(Parser)]
#[command(name = "anonymize")]
struct Cli {
    /// Input image or video file.
    input: PathBuf,

    /// Output file; the extension picks the image format for images.
    output: PathBuf,

    /// Anonymization method: gaussian or pixelate.
    #[arg(long, default_value = "gaussian")]
    method: Method,

    /// Effect intensity (1-100).
    #[arg(long, default_value_t = DEFAULT_INTENSITY)]
    intensity: u32,

    /// Face detection confidence threshold (0.0-1.0).
    #[arg(long, default_value_t = DETECTION_CONFIDENCE)]
    confidence: f64,

    /// Directory with a bundled detection model (skips the download).
    #[arg(long)]
    model_dir: Option<PathBuf>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if !(0.0..=1.0).contains(&cli.confidence) {
        return Err("confidence must be between 0.0 and 1.0".into());
    }

    let model_path = model_resolver::resolve(
        FACE_MODEL_NAME,
        FACE_MODEL_URL,
        cli.model_dir.as_deref(),
    )?;
    let detector: Arc<dyn FaceDetector> =
        Arc::new(OnnxFaceDetector::new(&model_path, cli.confidence)?);
    let processor = FrameProcessor::new(detector);
    let settings = AnonymizationSettings::new(cli.method, cli.intensity, 1);

    if is_image(&cli.input) {
        run_image(&processor, &cli.input, &cli.output, &settings)
    } else {
        run_video(processor, &cli.input, &cli.output, &settings)
    }
}

fn run_image(
    processor: &FrameProcessor,
    input: &Path,
    output: &Path,
    settings: &AnonymizationSettings,
) -> Result<(), Box<dyn std::error::Error>> {
    let frame = decode_image(&fs::read(input)?)?;
    let result = processor.process(&frame, settings)?;
    write_image(&result.frame, output)?;

    log::info!(
        "{} face(s) anonymized, output written to {}",
        result.face_count,
        output.display()
    );
    Ok(())
}

fn run_video(
    processor: FrameProcessor,
    input: &Path,
    output: &Path,
    settings: &AnonymizationSettings,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut reader = FfmpegReader::new();
    let mut writer = FfmpegWriter::new();

    let stats = VideoPipeline::new(processor).run(&mut reader, &mut writer, input, output, settings)?;

    log::info!(
        "{} frame(s), {} face(s), {:.2} avg faces/frame, output written to {}",
        stats.total_frames,
        stats.total_faces,
        stats.avg_faces_per_frame(),
        output.display()
    );
    Ok(())
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}
