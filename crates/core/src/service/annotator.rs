use crate::pipeline::video_pipeline::VideoStats;

/// Summary of a completed job, handed to the optional annotator.
#[derive(Clone, Debug)]
pub enum JobReport {
    Image { face_count: usize },
    Video { stats: VideoStats },
}

/// Optional post-job enrichment hook (log lines, notifications, generated
/// summaries).
///
/// Strictly best-effort: the service logs its output, and a failing or
/// missing annotator never changes face counts, pixels, or the outcome of
/// the job that produced the report.
pub trait JobAnnotator: Send + Sync {
    fn describe(&self, report: &JobReport) -> Result<String, Box<dyn std::error::Error>>;
}

/// Default annotator: renders a one-line human-readable summary.
pub struct LogAnnotator;

impl JobAnnotator for LogAnnotator {
    fn describe(&self, report: &JobReport) -> Result<String, Box<dyn std::error::Error>> {
        Ok(match report {
            JobReport::Image { face_count } => {
                format!("anonymized image: {face_count} face(s) obscured")
            }
            JobReport::Video { stats } => format!(
                "anonymized video: {} frame(s), {} face(s), {:.2} avg faces/frame",
                stats.total_frames,
                stats.total_faces,
                stats.avg_faces_per_frame()
            ),
        })
    }
}
