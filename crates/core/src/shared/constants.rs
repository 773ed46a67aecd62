pub const FACE_MODEL_NAME: &str = "version-RFB-320.onnx";
pub const FACE_MODEL_URL: &str =
    "https://github.com/onnx/models/raw/main/validated/vision/body_analysis/ultraface/models/version-RFB-320.onnx";

/// Minimum detector score for a box to count as a face.
pub const DETECTION_CONFIDENCE: f64 = 0.5;

pub const DEFAULT_INTENSITY: u32 = 30;
pub const MAX_INTENSITY: u32 = 100;

pub const DEFAULT_TARGET_FPS: u32 = 10;
pub const MAX_TARGET_FPS: u32 = 60;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];

/// How long a processed artifact stays retrievable.
pub const ARTIFACT_TTL_SECS: u64 = 3600;

/// Capacity of the streaming client's rolling submission-error log.
pub const ERROR_LOG_CAPACITY: usize = 32;
