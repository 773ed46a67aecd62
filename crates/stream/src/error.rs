use thiserror::Error;

/// Failures on the streaming client side.
///
/// `DeviceAccess` aborts starting a capture; `Network` covers a single
/// frame submission and is recovered locally, the next tick proceeds.
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("camera unavailable: {0}")]
    DeviceAccess(String),

    #[error("frame submission failed: {0}")]
    Network(String),
}
