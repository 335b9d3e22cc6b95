//! Opening videos and decoding their frames in order.
//!
//! [`VideoSource`] opens a container, locates its best video stream, and
//! caches [`VideoMetadata`]. [`VideoSource::frames`] returns a
//! [`SequentialFrames`] iterator that decodes one frame per call to
//! [`next()`](Iterator::next), in decode order, from the start of the
//! stream to its end. There is no seeking.
//!
//! # Example
//!
//! ```no_run
//! use frameforge::{FrameForgeError, VideoSource};
//!
//! let mut source = VideoSource::open("input.mp4")?;
//! println!("{}x{}", source.metadata().width, source.metadata().height);
//!
//! for result in source.frames()? {
//!     let (index, image) = result?;
//!     image.save(format!("frame_{index:06}.png"))?;
//! }
//! # Ok::<(), FrameForgeError>(())
//! ```

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use ffmpeg_next::{
    Error as FfmpegError, Packet,
    codec::context::Context as CodecContext,
    decoder::Video as VideoDecoder,
    format::{Pixel, context::Input},
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use image::DynamicImage;

use crate::{
    conversion::rgb_frame_to_image,
    error::FrameForgeError,
    metadata::{VideoMetadata, estimate_frame_count},
};

/// File extensions offered when picking videos to extract from.
pub const SUPPORTED_VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mkv", "mov", "wmv"];

/// Whether `path` has one of the [`SUPPORTED_VIDEO_EXTENSIONS`]
/// (case-insensitive).
///
/// This is only a filter for directory listings; extraction itself will
/// attempt any path it is given.
pub fn is_supported_video<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            SUPPORTED_VIDEO_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}

/// An opened video file.
///
/// Holds the demuxer and cached metadata. Decoder state lives in the
/// [`SequentialFrames`] iterator and is released when it is dropped; the
/// demuxer is released when the source is dropped.
pub struct VideoSource {
    input_context: Input,
    video_stream_index: usize,
    metadata: VideoMetadata,
    path: PathBuf,
    packets_read: bool,
}

impl std::fmt::Debug for VideoSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoSource")
            .field("path", &self.path)
            .field("video_stream_index", &self.video_stream_index)
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

impl VideoSource {
    /// Open a video file for decoding.
    ///
    /// # Errors
    ///
    /// - [`FrameForgeError::FileOpen`] if the file is missing or FFmpeg
    ///   cannot recognise it.
    /// - [`FrameForgeError::NoVideoStream`] if it has no video stream.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, FrameForgeError> {
        let path = path.as_ref().to_path_buf();
        log::debug!("Opening video file: {}", path.display());

        crate::ffmpeg::initialize()?;

        let input_context =
            ffmpeg_next::format::input(&path).map_err(|error| FrameForgeError::FileOpen {
                path: path.clone(),
                reason: error.to_string(),
            })?;

        let stream = input_context
            .streams()
            .best(Type::Video)
            .ok_or(FrameForgeError::NoVideoStream)?;
        let video_stream_index = stream.index();

        let decoder = CodecContext::from_parameters(stream.parameters())
            .and_then(|context| context.decoder().video())
            .map_err(|error| FrameForgeError::FileOpen {
                path: path.clone(),
                reason: format!("Failed to create video decoder: {error}"),
            })?;

        let duration_microseconds = input_context.duration();
        let duration = if duration_microseconds > 0 {
            Duration::from_micros(duration_microseconds as u64)
        } else {
            Duration::ZERO
        };

        let frames_per_second = [stream.avg_frame_rate(), stream.rate()]
            .into_iter()
            .find(|rate| rate.numerator() > 0 && rate.denominator() > 0)
            .map(|rate| rate.numerator() as f64 / rate.denominator() as f64)
            .unwrap_or(0.0);

        let frame_count = match stream.frames() {
            reported if reported > 0 => reported as u64,
            _ => estimate_frame_count(duration, frames_per_second),
        };

        let codec = decoder
            .codec()
            .map(|codec| codec.name().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let metadata = VideoMetadata {
            width: decoder.width(),
            height: decoder.height(),
            frames_per_second,
            frame_count,
            duration,
            codec,
            format: input_context.format().name().to_string(),
        };

        Ok(Self {
            input_context,
            video_stream_index,
            metadata,
            path,
            packets_read: false,
        })
    }

    /// Open a file just long enough to read its metadata.
    pub fn probe<P: AsRef<Path>>(path: P) -> Result<VideoMetadata, FrameForgeError> {
        Ok(Self::open(path)?.metadata)
    }

    /// Metadata cached at open time.
    pub fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    /// Path this source was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Decode every frame from the start of the stream, in order.
    ///
    /// Calling this again on the same source rewinds to the beginning.
    ///
    /// # Errors
    ///
    /// Returns an error if the decoder cannot be created or the rewind
    /// fails. Per-frame errors are yielded by the iterator.
    pub fn frames(&mut self) -> Result<SequentialFrames<'_>, FrameForgeError> {
        if self.packets_read {
            self.input_context.seek(0, ..0)?;
        }
        self.packets_read = true;

        let stream = self
            .input_context
            .stream(self.video_stream_index)
            .ok_or(FrameForgeError::NoVideoStream)?;
        let decoder = CodecContext::from_parameters(stream.parameters())?
            .decoder()
            .video()?;

        Ok(SequentialFrames {
            source: self,
            decoder,
            scaler: None,
            decoded_frame: VideoFrame::empty(),
            rgb_frame: VideoFrame::empty(),
            next_index: 0,
            eof_sent: false,
            done: false,
        })
    }
}

/// Lazy iterator over every frame of a video, in decode order.
///
/// Yields `(index, image)` where `index` counts decoded frames from 0.
/// Images are RGB8 at the stream's native resolution. The iterator ends at
/// the end of the stream; after yielding an error it also ends.
pub struct SequentialFrames<'a> {
    source: &'a mut VideoSource,
    decoder: VideoDecoder,
    scaler: Option<ScalingContext>,
    decoded_frame: VideoFrame,
    rgb_frame: VideoFrame,
    next_index: u64,
    eof_sent: bool,
    done: bool,
}

impl SequentialFrames<'_> {
    /// Number of frames yielded so far.
    pub fn decoded(&self) -> u64 {
        self.next_index
    }

    fn convert_current_frame(&mut self) -> Result<DynamicImage, FrameForgeError> {
        let format = self.decoded_frame.format();
        let width = self.decoded_frame.width();
        let height = self.decoded_frame.height();

        // Rebuild the scaler if the stream changes resolution or format
        // mid-way.
        let stale = self.scaler.as_ref().is_none_or(|scaler| {
            scaler.input().format != format
                || scaler.input().width != width
                || scaler.input().height != height
        });
        if stale {
            self.scaler = Some(ScalingContext::get(
                format,
                width,
                height,
                Pixel::RGB24,
                width,
                height,
                ScalingFlags::BILINEAR,
            )?);
        }

        if let Some(scaler) = self.scaler.as_mut() {
            scaler.run(&self.decoded_frame, &mut self.rgb_frame)?;
        }
        rgb_frame_to_image(&self.rgb_frame, width, height)
    }

    /// Hand a converted frame to the caller. Only frames that are actually
    /// yielded take an index.
    fn emit(
        &mut self,
        converted: Result<DynamicImage, FrameForgeError>,
    ) -> Option<<Self as Iterator>::Item> {
        match converted {
            Ok(image) => {
                let index = self.next_index;
                self.next_index += 1;
                Some(Ok((index, image)))
            }
            Err(error) => self.fail(error),
        }
    }

    fn fail(&mut self, error: FrameForgeError) -> Option<<Self as Iterator>::Item> {
        self.done = true;
        Some(Err(error))
    }
}

impl Iterator for SequentialFrames<'_> {
    type Item = Result<(u64, DynamicImage), FrameForgeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            if self.decoder.receive_frame(&mut self.decoded_frame).is_ok() {
                let converted = self.convert_current_frame();
                return self.emit(converted);
            }

            if self.eof_sent {
                self.done = true;
                return None;
            }

            let mut packet = Packet::empty();
            match packet.read(&mut self.source.input_context) {
                Ok(()) => {
                    if packet.stream() != self.source.video_stream_index {
                        continue;
                    }
                    if let Err(error) = self.decoder.send_packet(&packet) {
                        return self.fail(FrameForgeError::VideoDecodeError(format!(
                            "frame {}: {error}",
                            self.next_index
                        )));
                    }
                }
                Err(error) => {
                    if error != FfmpegError::Eof {
                        log::debug!(
                            "Stopping read of {} after demuxer error: {error}",
                            self.source.path.display()
                        );
                    }
                    if let Err(error) = self.decoder.send_eof() {
                        return self.fail(error.into());
                    }
                    self.eof_sent = true;
                }
            }
        }
    }
}
