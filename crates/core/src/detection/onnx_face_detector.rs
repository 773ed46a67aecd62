//! UltraFace (RFB-320) detector on ONNX Runtime via `ort`.
//!
//! Fixed 320x240 input; the model emits per-anchor class scores and
//! normalized corner boxes, which are thresholded, NMS-filtered, and mapped
//! back to frame coordinates.

use std::path::Path;
use std::sync::Mutex;

use crate::detection::face_detector::FaceDetector;
use crate::shared::error::AnonymizeError;
use crate::shared::frame::Frame;
use crate::shared::region::FaceRegion;

const INPUT_WIDTH: usize = 320;
const INPUT_HEIGHT: usize = 240;

/// UltraFace normalization: `(pixel - MEAN) / SCALE`.
const MEAN: f32 = 127.0;
const SCALE: f32 = 128.0;

/// NMS IoU threshold.
const NMS_IOU_THRESH: f64 = 0.45;

/// Face detector backed by a read-only ONNX Runtime session.
///
/// `ort::Session::run` needs exclusive access, so the session sits behind a
/// mutex; the model weights themselves are never mutated after load.
pub struct OnnxFaceDetector {
    session: Mutex<ort::session::Session>,
    confidence: f64,
}

impl OnnxFaceDetector {
    pub fn new(model_path: &Path, confidence: f64) -> Result<Self, Box<dyn std::error::Error>> {
        let session = ort::session::Session::builder()?.commit_from_file(model_path)?;
        Ok(Self {
            session: Mutex::new(session),
            confidence,
        })
    }
}

impl FaceDetector for OnnxFaceDetector {
    fn detect(&self, frame: &Frame) -> Result<Vec<FaceRegion>, AnonymizeError> {
        if frame.width() == 0 || frame.height() == 0 {
            return Err(AnonymizeError::InvalidImage(
                "frame has zero dimensions".into(),
            ));
        }

        let input_tensor = preprocess(frame);
        let input_value =
            ort::value::Tensor::from_array(input_tensor).map_err(AnonymizeError::invalid_image)?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| AnonymizeError::InvalidImage("detector session poisoned".into()))?;
        let outputs = session
            .run(ort::inputs![input_value])
            .map_err(AnonymizeError::invalid_image)?;
        if outputs.len() < 2 {
            return Err(AnonymizeError::InvalidImage(
                "detector produced incomplete outputs".into(),
            ));
        }

        // outputs: scores [1, N, 2], boxes [1, N, 4] with normalized corners
        let scores = outputs[0]
            .try_extract_array::<f32>()
            .map_err(AnonymizeError::invalid_image)?;
        let boxes = outputs[1]
            .try_extract_array::<f32>()
            .map_err(AnonymizeError::invalid_image)?;

        let scores = scores
            .as_slice()
            .ok_or_else(|| AnonymizeError::InvalidImage("non-contiguous score tensor".into()))?;
        let boxes = boxes
            .as_slice()
            .ok_or_else(|| AnonymizeError::InvalidImage("non-contiguous box tensor".into()))?;

        let mut raw = collect_detections(scores, boxes, self.confidence);
        let kept = nms(&mut raw, NMS_IOU_THRESH);

        Ok(kept
            .iter()
            .map(|d| to_region(d, frame.width(), frame.height()))
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Preprocessing
// ---------------------------------------------------------------------------

/// Nearest-neighbor resize to the fixed model input and normalize to NCHW
/// float32.
fn preprocess(frame: &Frame) -> ndarray::Array4<f32> {
    let mut tensor = ndarray::Array4::<f32>::zeros((1, 3, INPUT_HEIGHT, INPUT_WIDTH));
    let src = frame.as_ndarray();
    let src_w = frame.width() as usize;
    let src_h = frame.height() as usize;

    for y in 0..INPUT_HEIGHT {
        let sy = (y * src_h / INPUT_HEIGHT).min(src_h - 1);
        for x in 0..INPUT_WIDTH {
            let sx = (x * src_w / INPUT_WIDTH).min(src_w - 1);
            for c in 0..3 {
                tensor[[0, c, y, x]] = (src[[sy, sx, c]] as f32 - MEAN) / SCALE;
            }
        }
    }

    tensor
}

// ---------------------------------------------------------------------------
// Postprocessing
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
struct RawDetection {
    // Normalized corners in [0, 1].
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
    confidence: f64,
}

/// Pair anchor scores with boxes and keep those above the threshold.
///
/// `scores` holds `[background, face]` per anchor.
fn collect_detections(scores: &[f32], boxes: &[f32], threshold: f64) -> Vec<RawDetection> {
    let num_anchors = scores.len() / 2;
    let mut raw = Vec::new();

    for i in 0..num_anchors.min(boxes.len() / 4) {
        let conf = scores[i * 2 + 1] as f64;
        if conf < threshold {
            continue;
        }
        raw.push(RawDetection {
            x1: boxes[i * 4] as f64,
            y1: boxes[i * 4 + 1] as f64,
            x2: boxes[i * 4 + 2] as f64,
            y2: boxes[i * 4 + 3] as f64,
            confidence: conf,
        });
    }

    raw
}

/// Greedy NMS: sort by confidence descending, suppress overlapping boxes.
fn nms(dets: &mut [RawDetection], iou_thresh: f64) -> Vec<RawDetection> {
    dets.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut keep = Vec::new();
    let mut suppressed = vec![false; dets.len()];

    for i in 0..dets.len() {
        if suppressed[i] {
            continue;
        }
        keep.push(dets[i].clone());
        for j in (i + 1)..dets.len() {
            if !suppressed[j] && corner_iou(&dets[i], &dets[j]) > iou_thresh {
                suppressed[j] = true;
            }
        }
    }
    keep
}

fn corner_iou(a: &RawDetection, b: &RawDetection) -> f64 {
    let x1 = a.x1.max(b.x1);
    let y1 = a.y1.max(b.y1);
    let x2 = a.x2.min(b.x2);
    let y2 = a.y2.min(b.y2);

    let inter = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
    if inter == 0.0 {
        return 0.0;
    }
    let area_a = (a.x2 - a.x1) * (a.y2 - a.y1);
    let area_b = (b.x2 - b.x1) * (b.y2 - b.y1);
    inter / (area_a + area_b - inter)
}

/// Scale a normalized detection to frame pixel coordinates.
fn to_region(det: &RawDetection, frame_width: u32, frame_height: u32) -> FaceRegion {
    let fw = frame_width as f64;
    let fh = frame_height as f64;

    let x1 = (det.x1 * fw).round() as i32;
    let y1 = (det.y1 * fh).round() as i32;
    let x2 = (det.x2 * fw).round() as i32;
    let y2 = (det.y2 * fh).round() as i32;

    FaceRegion::new(x1, y1, x2 - x1, y2 - y1, det.confidence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_preprocess_shape_and_normalization() {
        let frame = Frame::new(vec![255u8; 64 * 48 * 3], 64, 48, 3, 0);
        let tensor = preprocess(&frame);
        assert_eq!(tensor.shape(), &[1, 3, INPUT_HEIGHT, INPUT_WIDTH]);
        // 255 -> (255 - 127) / 128 = 1.0
        assert_relative_eq!(tensor[[0, 0, 0, 0]], 1.0);
        assert_relative_eq!(tensor[[0, 2, INPUT_HEIGHT - 1, INPUT_WIDTH - 1]], 1.0);
    }

    #[test]
    fn test_preprocess_midgray_maps_to_zero() {
        let frame = Frame::new(vec![127u8; 8 * 8 * 3], 8, 8, 3, 0);
        let tensor = preprocess(&frame);
        assert_relative_eq!(tensor[[0, 1, 100, 100]], 0.0);
    }

    #[test]
    fn test_collect_detections_thresholds_on_face_score() {
        // Two anchors: one weak, one strong.
        let scores = [0.9f32, 0.1, 0.2, 0.8];
        let boxes = [0.0f32, 0.0, 0.5, 0.5, 0.25, 0.25, 0.75, 0.75];
        let dets = collect_detections(&scores, &boxes, 0.5);
        assert_eq!(dets.len(), 1);
        assert_relative_eq!(dets[0].confidence, 0.8, epsilon = 1e-6);
        assert_relative_eq!(dets[0].x1, 0.25, epsilon = 1e-6);
    }

    #[test]
    fn test_collect_detections_empty_when_nothing_clears_threshold() {
        let scores = [0.9f32, 0.1];
        let boxes = [0.0f32, 0.0, 1.0, 1.0];
        assert!(collect_detections(&scores, &boxes, 0.5).is_empty());
    }

    #[test]
    fn test_nms_suppresses_overlapping() {
        let mut dets = vec![
            RawDetection {
                x1: 0.1,
                y1: 0.1,
                x2: 0.5,
                y2: 0.5,
                confidence: 0.9,
            },
            RawDetection {
                x1: 0.12,
                y1: 0.12,
                x2: 0.52,
                y2: 0.52,
                confidence: 0.7,
            },
            RawDetection {
                x1: 0.7,
                y1: 0.7,
                x2: 0.9,
                y2: 0.9,
                confidence: 0.8,
            },
        ];
        let kept = nms(&mut dets, 0.4);
        assert_eq!(kept.len(), 2);
        assert!(kept[0].confidence > kept[1].confidence);
    }

    #[test]
    fn test_to_region_scales_to_frame() {
        let det = RawDetection {
            x1: 0.25,
            y1: 0.5,
            x2: 0.75,
            y2: 1.0,
            confidence: 0.9,
        };
        let r = to_region(&det, 200, 100);
        assert_eq!((r.x, r.y, r.width, r.height), (50, 50, 100, 50));
    }
}
