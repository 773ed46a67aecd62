use std::fmt;
use std::str::FromStr;

use crate::shared::constants::{
    DEFAULT_INTENSITY, DEFAULT_TARGET_FPS, MAX_INTENSITY, MAX_TARGET_FPS,
};

/// How a detected face region is obscured.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Gaussian,
    Pixelate,
}

impl FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gaussian" => Ok(Method::Gaussian),
            "pixelate" => Ok(Method::Pixelate),
            other => Err(format!("unknown anonymization method: {other}")),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Gaussian => write!(f, "gaussian"),
            Method::Pixelate => write!(f, "pixelate"),
        }
    }
}

/// Per-request anonymization parameters.
///
/// Constructed once per request or job and passed by value; nothing in the
/// pipeline reads settings from shared mutable state. `target_fps` only
/// matters for the streaming capture cadence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnonymizationSettings {
    pub method: Method,
    intensity: u32,
    target_fps: u32,
}

impl AnonymizationSettings {
    pub fn new(method: Method, intensity: u32, target_fps: u32) -> Self {
        Self {
            method,
            intensity: intensity.clamp(1, MAX_INTENSITY),
            target_fps: target_fps.clamp(1, MAX_TARGET_FPS),
        }
    }

    pub fn intensity(&self) -> u32 {
        self.intensity
    }

    pub fn target_fps(&self) -> u32 {
        self.target_fps
    }
}

impl Default for AnonymizationSettings {
    fn default() -> Self {
        Self::new(Method::Gaussian, DEFAULT_INTENSITY, DEFAULT_TARGET_FPS)
    }
}
