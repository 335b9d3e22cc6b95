//! Video metadata.
//!
//! Read once when a [`VideoSource`](crate::VideoSource) is opened. Frame
//! count and frame rate come from the container and are best-effort: some
//! codecs and containers report zero or approximate values, so nothing in
//! the crate relies on them for correctness.

use std::time::Duration;

/// Metadata for the primary video stream of a file.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct VideoMetadata {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Frames per second, or `0.0` when the container does not say.
    pub frames_per_second: f64,
    /// Frame count reported by the container, or estimated from duration and
    /// frame rate. `0` when neither is known.
    pub frame_count: u64,
    /// Container-level duration.
    pub duration: Duration,
    /// Decoder name (e.g. `"h264"`, `"mpeg4"`).
    pub codec: String,
    /// Container format name (e.g. `"mov,mp4,m4a,3gp,3g2,mj2"`).
    pub format: String,
}

impl VideoMetadata {
    /// Frame count the container reports, if any.
    pub fn known_frame_count(&self) -> Option<u64> {
        (self.frame_count > 0).then_some(self.frame_count)
    }
}

/// Estimate a frame count from duration and frame rate.
pub(crate) fn estimate_frame_count(duration: Duration, frames_per_second: f64) -> u64 {
    if frames_per_second > 0.0 {
        (duration.as_secs_f64() * frames_per_second).round() as u64
    } else {
        0
    }
}
