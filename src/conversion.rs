//! Pixel-buffer helpers shared by the decoder and the encoder.
//!
//! FFmpeg frames carry per-row padding (`stride >= width * bytes_per_pixel`)
//! while `image` buffers are tightly packed. These helpers copy between the
//! two layouts.

use ffmpeg_next::{format::Pixel, frame::Video as VideoFrame};
use image::{DynamicImage, RgbImage};

use crate::error::FrameForgeError;

const RGB_BYTES_PER_PIXEL: usize = 3;

/// Copy an RGB24 FFmpeg frame into a tightly packed [`DynamicImage`].
pub(crate) fn rgb_frame_to_image(
    rgb_frame: &VideoFrame,
    width: u32,
    height: u32,
) -> Result<DynamicImage, FrameForgeError> {
    let stride = rgb_frame.stride(0);
    let row_len = width as usize * RGB_BYTES_PER_PIXEL;
    let data = rgb_frame.data(0);

    let buffer = if stride == row_len {
        data[..row_len * height as usize].to_vec()
    } else {
        let mut buffer = Vec::with_capacity(row_len * height as usize);
        for row in 0..height as usize {
            let start = row * stride;
            buffer.extend_from_slice(&data[start..start + row_len]);
        }
        buffer
    };

    let image = RgbImage::from_raw(width, height, buffer).ok_or_else(|| {
        FrameForgeError::VideoDecodeError(
            "Failed to construct RGB image from decoded frame data".to_string(),
        )
    })?;
    Ok(DynamicImage::ImageRgb8(image))
}

/// Copy an RGB image into a freshly allocated RGB24 FFmpeg frame.
///
/// The image must already have the frame's dimensions.
pub(crate) fn rgb_image_to_frame(image: &RgbImage) -> VideoFrame {
    let (width, height) = image.dimensions();
    let row_len = width as usize * RGB_BYTES_PER_PIXEL;

    let mut frame = VideoFrame::new(Pixel::RGB24, width, height);
    let stride = frame.stride(0);
    let destination = frame.data_mut(0);
    for (row, pixels) in image.as_raw().chunks_exact(row_len).enumerate() {
        let start = row * stride;
        destination[start..start + row_len].copy_from_slice(pixels);
    }
    frame
}
