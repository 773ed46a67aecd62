mod camera;
mod controller;
mod endpoint;
mod error;
mod stats;

use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::Parser;

use anonymizer_core::shared::constants::{DEFAULT_INTENSITY, DEFAULT_TARGET_FPS};
use anonymizer_core::shared::settings::{AnonymizationSettings, Method};

use camera::FileCamera;
use controller::{RenderSink, StreamController};
use endpoint::{FrameReply, HttpEndpoint};

/// Stream a video file to an anonymization server as if it were a webcam.
#[derive(Parser)]
#[command(name = "anonymize-stream")]
struct Cli {
    /// Video file standing in for the camera.
    input: PathBuf,

    /// Frame processing endpoint.
    #[arg(long, default_value = "http://127.0.0.1:8000/process_frame")]
    server: String,

    /// Anonymization method: gaussian or pixelate.
    #[arg(long, default_value = "gaussian")]
    method: Method,

    /// Effect intensity (1-100).
    #[arg(long, default_value_t = DEFAULT_INTENSITY)]
    intensity: u32,

    /// Frames submitted per second (1-60).
    #[arg(long, default_value_t = DEFAULT_TARGET_FPS)]
    fps: u32,

    /// Stop after this many seconds; runs until killed when omitted.
    #[arg(long)]
    duration: Option<u64>,
}

/// Sink for headless runs: the interesting signal is the log line, not the
/// pixels.
struct LogSink;

impl RenderSink for LogSink {
    fn render(&mut self, reply: &FrameReply) {
        log::debug!(
            "rendered frame: {} byte(s), {} face(s)",
            reply.image.len(),
            reply.face_count
        );
    }
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
    let settings = AnonymizationSettings::new(cli.method, cli.intensity, cli.fps);

    let camera = FileCamera::new(&cli.input);
    let endpoint = HttpEndpoint::new(&cli.server);
    let mut controller = StreamController::new(Box::new(camera), Arc::new(endpoint));

    let (stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(1);
    if let Some(secs) = cli.duration {
        let stop_tx = stop_tx.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_secs(secs));
            let _ = stop_tx.send(());
        });
    }

    let mut sink = LogSink;
    let summary = controller.run(settings, &mut sink, &stop_rx)?;

    log::info!(
        "session over: {} frame(s) captured, {} rendered, {} submission failure(s)",
        summary.frames_captured,
        summary.frames_rendered,
        controller.recent_errors().len()
    );
    Ok(())
}
