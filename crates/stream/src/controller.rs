use std::collections::VecDeque;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{select, tick, unbounded, Receiver};

use anonymizer_core::shared::constants::ERROR_LOG_CAPACITY;
use anonymizer_core::shared::settings::AnonymizationSettings;

use crate::camera::CameraSource;
use crate::endpoint::{FrameEndpoint, FrameReply};
use crate::error::StreamError;
use crate::stats::StatsAggregator;

/// Consumer of anonymized frames coming back from the endpoint.
pub trait RenderSink {
    fn render(&mut self, reply: &FrameReply);
}

/// Totals for one capture session.
#[derive(Clone, Copy, Debug)]
pub struct StreamSummary {
    pub frames_captured: usize,
    pub frames_rendered: usize,
    pub last_face_count: usize,
}

/// Drives the capture-submit-render loop at a fixed rate.
///
/// `run` moves the controller from idle to capturing: a tick channel fires
/// every `1000 / target_fps` ms, each tick captures a frame and submits it
/// on its own worker thread. Ticks never wait for in-flight submissions, so
/// a slow endpoint overlaps requests instead of stalling the camera.
/// Completions that arrive while capturing are rendered and counted;
/// anything arriving after stop is discarded. Failed submissions land in a
/// bounded rolling error log and never halt the timer.
pub struct StreamController {
    camera: Box<dyn CameraSource>,
    endpoint: Arc<dyn FrameEndpoint>,
    errors: VecDeque<StreamError>,
}

impl StreamController {
    pub fn new(camera: Box<dyn CameraSource>, endpoint: Arc<dyn FrameEndpoint>) -> Self {
        Self {
            camera,
            endpoint,
            errors: VecDeque::new(),
        }
    }

    /// Captures until `stop` yields, then releases the camera.
    ///
    /// A camera that cannot be opened aborts immediately with
    /// `DeviceAccess` and the controller stays idle.
    pub fn run(
        &mut self,
        settings: AnonymizationSettings,
        sink: &mut dyn RenderSink,
        stop: &Receiver<()>,
    ) -> Result<StreamSummary, StreamError> {
        self.camera.open()?;

        let capture_tick = tick(Duration::from_millis(
            1000 / u64::from(settings.target_fps()),
        ));
        let stats_tick = tick(Duration::from_secs(1));
        let (done_tx, done_rx) = unbounded::<Result<FrameReply, StreamError>>();
        let mut stats = StatsAggregator::new();
        let mut captured = 0usize;

        loop {
            select! {
                recv(stop) -> _ => break,
                recv(capture_tick) -> _ => match self.camera.capture() {
                    Ok(frame) => {
                        captured += 1;
                        let endpoint = Arc::clone(&self.endpoint);
                        let done_tx = done_tx.clone();
                        thread::spawn(move || {
                            // Send fails once the loop has exited; the late
                            // reply is dropped instead of rendered.
                            let _ = done_tx.send(endpoint.submit(&frame, &settings));
                        });
                    }
                    Err(e) => self.log_failure(e),
                },
                recv(stats_tick) -> _ => {
                    stats.roll();
                    log::info!(
                        "streaming at {} fps, {} face(s) in view",
                        stats.displayed_fps(),
                        stats.last_face_count()
                    );
                },
                recv(done_rx) -> msg => match msg {
                    Ok(Ok(reply)) => {
                        stats.record(reply.face_count);
                        sink.render(&reply);
                    }
                    Ok(Err(e)) => self.log_failure(e),
                    Err(_) => {}
                },
            }
        }

        self.camera.release();
        Ok(StreamSummary {
            frames_captured: captured,
            frames_rendered: stats.total_completed(),
            last_face_count: stats.last_face_count(),
        })
    }

    /// Submission failures since the controller was created, oldest evicted
    /// beyond a fixed capacity.
    pub fn recent_errors(&self) -> &VecDeque<StreamError> {
        &self.errors
    }

    fn log_failure(&mut self, error: StreamError) {
        log::warn!("{error}");
        if self.errors.len() == ERROR_LOG_CAPACITY {
            self.errors.pop_front();
        }
        self.errors.push_back(error);
    }
}
