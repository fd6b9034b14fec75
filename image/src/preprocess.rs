use super::{Frame, ImageError, ImageOwned, ImageRef, ImageRef3, FRAME_SIZE};

/// Turns a raw RGB observation into a [`Frame`]: luma conversion followed by
/// an area-average resize to `84 x 84`.
///
/// Deterministic and free of side effects. An image without pixels is
/// rejected.
pub fn preprocess(raw: &ImageRef3) -> Result<Frame, ImageError> {
    if raw.width() == 0 || raw.height() == 0 {
        return Err(ImageError::EmptyImage {
            width: raw.width(),
            height: raw.height(),
        });
    }
    let resized = raw
        .to_grayscale()
        .as_ref()
        .resize_by_area_average(FRAME_SIZE, FRAME_SIZE);
    match Frame::try_from(resized) {
        Ok(frame) => Ok(frame),
        Err(_) => unreachable!("resize always yields FRAME_SIZE x FRAME_SIZE"),
    }
}

/// Validates raw `height x width x 3` bytes and preprocesses them.
pub fn preprocess_raw(width: u32, height: u32, data: &[u8]) -> Result<Frame, ImageError> {
    let raw = ImageRef3::new(width, height, data)?;
    preprocess(&raw)
}
