pub mod frame_processor;
pub mod video_pipeline;
