pub mod ffmpeg_reader;
pub mod ffmpeg_writer;
pub mod image_codec;
pub mod video_reader;
pub mod video_writer;
