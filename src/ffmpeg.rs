//! FFmpeg initialisation and log-level control.
//!
//! FFmpeg keeps its own logger, separate from the [`log`] facade the rest
//! of the crate uses, and prints warnings to stderr by default. Command-line
//! users usually want it quieter than that; [`set_ffmpeg_log_level`] lets
//! them tune it without importing `ffmpeg-next` directly.
//!
//! ```no_run
//! use frameforge::FfmpegLogLevel;
//!
//! frameforge::set_ffmpeg_log_level(FfmpegLogLevel::Error);
//! ```

use std::{fmt, str::FromStr};

use ffmpeg_next::util::log::Level;

use crate::error::FrameForgeError;

/// Initialise the FFmpeg libraries. Safe to call any number of times.
pub(crate) fn initialize() -> Result<(), FrameForgeError> {
    ffmpeg_next::init().map_err(|error| {
        FrameForgeError::FfmpegError(format!("initialisation failed: {error}"))
    })
}

/// FFmpeg log verbosity, from silent to most verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FfmpegLogLevel {
    /// No output at all.
    Quiet,
    /// Only unrecoverable errors.
    Fatal,
    /// Recoverable errors.
    Error,
    /// Warnings (FFmpeg's default).
    Warning,
    /// Informational messages.
    Info,
    /// Debugging output.
    Debug,
}

impl From<FfmpegLogLevel> for Level {
    fn from(level: FfmpegLogLevel) -> Self {
        match level {
            FfmpegLogLevel::Quiet => Level::Quiet,
            FfmpegLogLevel::Fatal => Level::Fatal,
            FfmpegLogLevel::Error => Level::Error,
            FfmpegLogLevel::Warning => Level::Warning,
            FfmpegLogLevel::Info => Level::Info,
            FfmpegLogLevel::Debug => Level::Debug,
        }
    }
}

impl FromStr for FfmpegLogLevel {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "quiet" | "off" => Ok(FfmpegLogLevel::Quiet),
            "fatal" => Ok(FfmpegLogLevel::Fatal),
            "error" => Ok(FfmpegLogLevel::Error),
            "warning" | "warn" => Ok(FfmpegLogLevel::Warning),
            "info" => Ok(FfmpegLogLevel::Info),
            "debug" => Ok(FfmpegLogLevel::Debug),
            other => Err(format!(
                "unknown FFmpeg log level '{other}' (quiet, fatal, error, warning, info, debug)"
            )),
        }
    }
}

impl fmt::Display for FfmpegLogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FfmpegLogLevel::Quiet => "quiet",
            FfmpegLogLevel::Fatal => "fatal",
            FfmpegLogLevel::Error => "error",
            FfmpegLogLevel::Warning => "warning",
            FfmpegLogLevel::Info => "info",
            FfmpegLogLevel::Debug => "debug",
        };
        f.write_str(name)
    }
}

/// Set FFmpeg's internal log level. Does not affect `log` crate output.
pub fn set_ffmpeg_log_level(level: FfmpegLogLevel) {
    ffmpeg_next::util::log::set_level(level.into());
}
