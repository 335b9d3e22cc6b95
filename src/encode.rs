//! Streaming video encoder.
//!
//! [`VideoWriter`] encodes [`DynamicImage`] frames into a video container one
//! frame at a time, so a long image sequence never has to sit in memory.
//! The codec is fixed to MPEG-4 Part 2 (FourCC `mp4v`), which every FFmpeg
//! build ships with and every common player decodes.
//!
//! # Example
//!
//! ```no_run
//! use frameforge::{FrameForgeError, VideoWriter, VideoWriterOptions};
//!
//! let first = image::open("frames/frame_000000.png")?;
//! let options = VideoWriterOptions::new(24, first.width(), first.height());
//! let mut writer = VideoWriter::create("out.mp4", &options)?;
//! writer.write_frame(&first)?;
//! writer.finish()?;
//! # Ok::<(), FrameForgeError>(())
//! ```

use std::path::{Path, PathBuf};

use ffmpeg_next::codec::Id;
use ffmpeg_next::codec::context::Context as CodecContext;
use ffmpeg_next::codec::encoder::video::Encoder as VideoEncoder;
use ffmpeg_next::format::context::Output;
use ffmpeg_next::format::{Flags as FormatFlags, Pixel};
use ffmpeg_next::frame::Video as VideoFrame;
use ffmpeg_next::software::scaling::{Context as ScalingContext, Flags as ScalingFlags};
use ffmpeg_next::{Packet, Rational};
use image::DynamicImage;
use image::imageops::FilterType;

use crate::conversion::rgb_image_to_frame;
use crate::error::FrameForgeError;

/// Four-character code written into MP4/MOV sample descriptions.
pub const OUTPUT_FOURCC: [u8; 4] = *b"mp4v";

/// Quantiser used when no bit rate is requested (MPEG-4 range 1-31, lower
/// is better).
pub const DEFAULT_QUANTIZER: u32 = 3;

const OUTPUT_CODEC: Id = Id::MPEG4;
const ENCODER_PIXEL_FORMAT: Pixel = Pixel::YUV420P;

/// Little-endian packing FFmpeg uses for codec tags (`MKTAG`).
fn codec_tag(fourcc: [u8; 4]) -> u32 {
    u32::from_le_bytes(fourcc)
}

/// Output settings for a [`VideoWriter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoWriterOptions {
    /// Frames per second. Must be positive.
    pub fps: u32,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Target bit rate in bits per second. When `None` every frame is
    /// encoded at [`DEFAULT_QUANTIZER`] instead.
    pub bitrate: Option<usize>,
}

impl VideoWriterOptions {
    /// Options for a `width`×`height` video at `fps`, constant quality.
    pub fn new(fps: u32, width: u32, height: u32) -> Self {
        Self {
            fps,
            width,
            height,
            bitrate: None,
        }
    }

    /// Switch to rate-controlled encoding at `bitrate` bits per second.
    #[must_use]
    pub fn with_bitrate(mut self, bitrate: usize) -> Self {
        self.bitrate = Some(bitrate).filter(|&rate| rate > 0);
        self
    }
}

/// Lambda FFmpeg expects in `global_quality` and `AVFrame::quality` for a
/// given quantiser.
fn quantizer_lambda(quantizer: u32) -> i32 {
    quantizer as i32 * ffmpeg_sys_next::FF_QP2LAMBDA as i32
}

/// Encodes frames into a video file.
///
/// Created with [`VideoWriter::create`], fed with
/// [`write_frame`](VideoWriter::write_frame), and closed with
/// [`finish`](VideoWriter::finish). Dropping a writer without calling
/// `finish` leaves a truncated file behind.
pub struct VideoWriter {
    output: Output,
    encoder: VideoEncoder,
    scaler: ScalingContext,
    stream_index: usize,
    encoder_time_base: Rational,
    frame_quality: Option<i32>,
    options: VideoWriterOptions,
    path: PathBuf,
    frames_written: u64,
}

impl VideoWriter {
    /// Create the output file, configure the encoder, and write the header.
    ///
    /// The container is inferred from the file extension.
    ///
    /// # Errors
    ///
    /// - [`FrameForgeError::InvalidFrameRate`] if `options.fps` is zero.
    /// - [`FrameForgeError::VideoEncodeError`] if the encoder is missing or
    ///   rejects the settings.
    /// - [`FrameForgeError::VideoWriteError`] if the file cannot be created.
    pub fn create<P: AsRef<Path>>(
        path: P,
        options: &VideoWriterOptions,
    ) -> Result<Self, FrameForgeError> {
        let path = path.as_ref().to_path_buf();
        let options = *options;
        if options.fps == 0 {
            return Err(FrameForgeError::InvalidFrameRate(options.fps));
        }
        if options.width == 0 || options.height == 0 {
            return Err(FrameForgeError::VideoEncodeError(format!(
                "invalid dimensions {}x{}",
                options.width, options.height
            )));
        }

        crate::ffmpeg::initialize()?;

        log::debug!(
            "Opening encoder for {} ({}x{} @ {} fps, {})",
            path.display(),
            options.width,
            options.height,
            options.fps,
            match options.bitrate {
                Some(bitrate) => format!("{bitrate} b/s"),
                None => format!("q{DEFAULT_QUANTIZER}"),
            },
        );

        let mut output = ffmpeg_next::format::output(&path)
            .map_err(|e| FrameForgeError::VideoWriteError(format!("cannot open output: {e}")))?;

        let needs_global_header = output.format().flags().contains(FormatFlags::GLOBAL_HEADER);
        let is_iso_media = output
            .format()
            .name()
            .split(',')
            .any(|name| matches!(name, "mp4" | "mov"));

        let codec = ffmpeg_next::encoder::find(OUTPUT_CODEC).ok_or_else(|| {
            FrameForgeError::VideoEncodeError(format!("codec {OUTPUT_CODEC:?} not available"))
        })?;

        let encoder_time_base = Rational::new(1, options.fps as i32);

        let mut stream = output
            .add_stream(codec)
            .map_err(|e| FrameForgeError::VideoWriteError(format!("cannot add stream: {e}")))?;
        let stream_index = stream.index();
        stream.set_time_base(encoder_time_base);

        let mut encoder = CodecContext::from_parameters(stream.parameters())
            .and_then(|context| context.encoder().video())
            .map_err(|e| {
                FrameForgeError::VideoEncodeError(format!("cannot create encoder context: {e}"))
            })?;

        encoder.set_width(options.width);
        encoder.set_height(options.height);
        encoder.set_format(ENCODER_PIXEL_FORMAT);
        encoder.set_time_base(encoder_time_base);
        encoder.set_frame_rate(Some(Rational::new(options.fps as i32, 1)));

        // A context built from fresh stream parameters carries a zero bit
        // rate, so one of the two rate modes has to be chosen explicitly.
        let frame_quality = match options.bitrate {
            Some(bitrate) => {
                encoder.set_bit_rate(bitrate);
                None
            }
            None => {
                let lambda = quantizer_lambda(DEFAULT_QUANTIZER);
                unsafe {
                    (*encoder.as_mut_ptr()).flags |= ffmpeg_sys_next::AV_CODEC_FLAG_QSCALE as i32;
                    (*encoder.as_mut_ptr()).global_quality = lambda;
                }
                Some(lambda)
            }
        };

        if needs_global_header {
            unsafe {
                (*encoder.as_mut_ptr()).flags |=
                    ffmpeg_sys_next::AV_CODEC_FLAG_GLOBAL_HEADER as i32;
            }
        }

        let encoder = encoder
            .open_as(codec)
            .map_err(|e| FrameForgeError::VideoEncodeError(format!("cannot open encoder: {e}")))?;

        stream.set_parameters(&encoder);
        if is_iso_media {
            unsafe {
                (*stream.parameters().as_mut_ptr()).codec_tag = codec_tag(OUTPUT_FOURCC);
            }
        }

        output
            .write_header()
            .map_err(|e| FrameForgeError::VideoWriteError(format!("cannot write header: {e}")))?;

        let scaler = ScalingContext::get(
            Pixel::RGB24,
            options.width,
            options.height,
            ENCODER_PIXEL_FORMAT,
            options.width,
            options.height,
            ScalingFlags::BILINEAR,
        )
        .map_err(|e| FrameForgeError::VideoWriteError(format!("cannot create scaler: {e}")))?;

        Ok(Self {
            output,
            encoder,
            scaler,
            stream_index,
            encoder_time_base,
            frame_quality,
            options,
            path,
            frames_written: 0,
        })
    }

    /// Encode one frame.
    ///
    /// Frames whose size differs from the writer's are resized to fit.
    pub fn write_frame(&mut self, image: &DynamicImage) -> Result<(), FrameForgeError> {
        let (width, height) = (self.options.width, self.options.height);
        let rgb = if image.width() != width || image.height() != height {
            log::debug!(
                "Resizing {}x{} frame to {width}x{height}",
                image.width(),
                image.height(),
            );
            image
                .resize_exact(width, height, FilterType::Lanczos3)
                .to_rgb8()
        } else {
            image.to_rgb8()
        };

        let source_frame = rgb_image_to_frame(&rgb);
        let mut encoded_frame = VideoFrame::empty();
        self.scaler
            .run(&source_frame, &mut encoded_frame)
            .map_err(|e| FrameForgeError::VideoWriteError(format!("scaling failed: {e}")))?;
        encoded_frame.set_pts(Some(self.frames_written as i64));
        if let Some(quality) = self.frame_quality {
            unsafe {
                (*encoded_frame.as_mut_ptr()).quality = quality;
            }
        }

        self.encoder
            .send_frame(&encoded_frame)
            .map_err(|e| FrameForgeError::VideoEncodeError(format!("send_frame failed: {e}")))?;
        self.frames_written += 1;

        self.drain_packets()
    }

    /// Number of frames passed to the encoder so far.
    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// Path of the file being written.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush the encoder and write the container trailer.
    pub fn finish(mut self) -> Result<u64, FrameForgeError> {
        self.encoder
            .send_eof()
            .map_err(|e| FrameForgeError::VideoEncodeError(format!("send_eof failed: {e}")))?;
        self.drain_packets()?;

        self.output
            .write_trailer()
            .map_err(|e| FrameForgeError::VideoWriteError(format!("cannot write trailer: {e}")))?;

        log::debug!(
            "Finalised {} with {} frames",
            self.path.display(),
            self.frames_written
        );
        Ok(self.frames_written)
    }

    fn drain_packets(&mut self) -> Result<(), FrameForgeError> {
        let stream_time_base = self
            .output
            .stream(self.stream_index)
            .map(|stream| stream.time_base())
            .ok_or_else(|| FrameForgeError::VideoWriteError("output stream vanished".into()))?;

        let mut packet = Packet::empty();
        while self.encoder.receive_packet(&mut packet).is_ok() {
            packet.set_stream(self.stream_index);
            packet.rescale_ts(self.encoder_time_base, stream_time_base);
            packet
                .write_interleaved(&mut self.output)
                .map_err(|e| FrameForgeError::VideoWriteError(format!("write packet failed: {e}")))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fourcc_packs_little_endian() {
        let expected = (b'm' as u32)
            | ((b'p' as u32) << 8)
            | ((b'4' as u32) << 16)
            | ((b'v' as u32) << 24);
        assert_eq!(codec_tag(OUTPUT_FOURCC), expected);
    }

    #[test]
    fn bitrate_selects_rate_control() {
        let options = VideoWriterOptions::new(30, 64, 48);
        assert_eq!(options.bitrate, None);
        assert_eq!(options.with_bitrate(800_000).bitrate, Some(800_000));
        assert_eq!(options.with_bitrate(0).bitrate, None);
        assert_eq!(quantizer_lambda(DEFAULT_QUANTIZER), 354);
    }

    #[test]
    fn zero_fps_is_rejected() {
        let scratch = tempfile::tempdir().expect("tempdir");
        let result = VideoWriter::create(
            scratch.path().join("out.mp4"),
            &VideoWriterOptions::new(0, 16, 16),
        );
        assert!(matches!(result, Err(FrameForgeError::InvalidFrameRate(0))));
        assert!(!scratch.path().join("out.mp4").exists());
    }
}
