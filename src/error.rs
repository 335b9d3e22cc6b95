//! Error types for the `frameforge` crate.
//!
//! This module defines [`FrameForgeError`], the unified error type returned
//! by every fallible operation in the crate. Extraction and assembly report
//! failures through the same type, so callers handle both operations the
//! same way.

use std::{io::Error as IoError, path::PathBuf};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

/// The unified error type for all `frameforge` operations.
///
/// Variants carry enough context (paths, counts, upstream messages) to be
/// shown to a user without extra logging at the call site.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FrameForgeError {
    /// The video file could not be opened.
    #[error("Failed to open video file at {path}: {reason}")]
    FileOpen {
        /// Path that was passed to [`crate::VideoSource::open`].
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The file does not contain a video stream.
    #[error("No video stream found in file")]
    NoVideoStream,

    /// A video frame could not be decoded.
    #[error("Failed to decode video frame: {0}")]
    VideoDecodeError(String),

    /// A frame-save interval of zero was provided.
    #[error("Interval must be greater than zero")]
    InvalidInterval,

    /// A frame rate of zero was provided to the assembler.
    #[error("Frame rate must be a positive number (got {0})")]
    InvalidFrameRate(u32),

    /// The frame folder given to the assembler does not exist.
    #[error("Frame folder {0} does not exist")]
    FolderNotFound(PathBuf),

    /// The path given to the assembler exists but is not a directory.
    #[error("{0} is not a directory")]
    NotADirectory(PathBuf),

    /// The frame folder contains no `frame_*.png` files.
    #[error("No frame_*.png files found in {0}")]
    NoFrameFiles(PathBuf),

    /// The first frame of a sequence could not be decoded, so the output
    /// dimensions are unknown.
    #[error("Failed to read first frame {path}: {reason}")]
    FirstFrameUnreadable {
        /// Path of the first frame file in sort order.
        path: PathBuf,
        /// Underlying decode error.
        reason: String,
    },

    /// The encoder could not be found, configured, or fed.
    #[error("Video encoding error: {0}")]
    VideoEncodeError(String),

    /// The output container could not be written.
    #[error("Video write error: {0}")]
    VideoWriteError(String),

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// An error from the `image` crate while reading or writing a frame.
    #[error("Image processing error: {0}")]
    ImageError(#[from] ImageError),

    /// The operation was cancelled via a [`CancellationToken`](crate::CancellationToken).
    #[error("Operation cancelled")]
    Cancelled,
}

impl From<FfmpegError> for FrameForgeError {
    fn from(error: FfmpegError) -> Self {
        FrameForgeError::FfmpegError(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_context() {
        let error = FrameForgeError::NoFrameFiles(PathBuf::from("clips/a"));
        assert_eq!(error.to_string(), "No frame_*.png files found in clips/a");

        let error = FrameForgeError::InvalidFrameRate(0);
        assert!(error.to_string().contains("positive"));
    }

    #[test]
    fn io_errors_convert() {
        let io = IoError::new(std::io::ErrorKind::PermissionDenied, "denied");
        let error: FrameForgeError = io.into();
        assert!(matches!(error, FrameForgeError::IoError(_)));
    }
}
