use thiserror::Error;

/// Failure taxonomy for the server-side processing pipeline.
///
/// `InvalidImage` and `InvalidVideo` abort the whole request or job; a job is
/// either fully processed or produces nothing. Zero detected faces is never
/// an error at any layer.
#[derive(Error, Debug)]
pub enum AnonymizeError {
    #[error("invalid image: {0}")]
    InvalidImage(String),
    #[error("invalid video: {0}")]
    InvalidVideo(String),
    #[error("unknown artifact: {0}")]
    UnknownArtifact(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AnonymizeError {
    pub fn invalid_image(err: impl std::fmt::Display) -> Self {
        AnonymizeError::InvalidImage(err.to_string())
    }

    pub fn invalid_video(err: impl std::fmt::Display) -> Self {
        AnonymizeError::InvalidVideo(err.to_string())
    }
}
