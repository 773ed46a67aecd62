use std::io::Cursor;
use std::path::Path;

use image::{ImageFormat, RgbImage};

use crate::shared::error::AnonymizeError;
use crate::shared::frame::Frame;

/// Decodes uploaded image bytes into an RGB frame.
///
/// Corrupt encodings and zero-dimension images are `InvalidImage`; the caller
/// never sees a frame that cannot serve as pipeline input.
pub fn decode_image(bytes: &[u8]) -> Result<Frame, AnonymizeError> {
    let decoded = image::load_from_memory(bytes).map_err(AnonymizeError::invalid_image)?;
    let rgb = decoded.to_rgb8();
    let (width, height) = rgb.dimensions();

    if width == 0 || height == 0 {
        return Err(AnonymizeError::InvalidImage(
            "image has zero dimensions".into(),
        ));
    }

    Ok(Frame::new(rgb.into_raw(), width, height, 3, 0))
}

/// Encodes a frame as JPEG bytes for transport back to the caller.
pub fn encode_jpeg(frame: &Frame) -> Result<Vec<u8>, AnonymizeError> {
    let mut bytes = Cursor::new(Vec::new());
    to_rgb_image(frame)?
        .write_to(&mut bytes, ImageFormat::Jpeg)
        .map_err(AnonymizeError::invalid_image)?;
    Ok(bytes.into_inner())
}

/// Writes a frame to disk; the format follows the path's extension.
pub fn write_image(frame: &Frame, path: &Path) -> Result<(), AnonymizeError> {
    to_rgb_image(frame)?
        .save(path)
        .map_err(AnonymizeError::invalid_image)
}

fn to_rgb_image(frame: &Frame) -> Result<RgbImage, AnonymizeError> {
    RgbImage::from_raw(frame.width(), frame.height(), frame.data().to_vec()).ok_or_else(|| {
        AnonymizeError::InvalidImage("frame buffer does not match its dimensions".into())
    })
}
