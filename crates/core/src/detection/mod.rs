pub mod face_detector;
pub mod model_resolver;
pub mod onnx_face_detector;
