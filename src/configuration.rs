//! Operation options.
//!
//! [`ExtractOptions`] and [`AssembleOptions`] are builders that thread the
//! interval, frame rate, output locations, progress callbacks, and
//! cancellation tokens through the two operations without growing every
//! function signature.
//!
//! # Example
//!
//! ```no_run
//! use frameforge::{AssembleOptions, CancellationToken, ExtractOptions};
//!
//! let token = CancellationToken::new();
//! let extract = ExtractOptions::new()
//!     .with_interval(5)
//!     .with_storage_root("out/frames")
//!     .with_cancellation(token.clone());
//!
//! let assemble = AssembleOptions::new()
//!     .with_fps(24)
//!     .with_output("out/clip.mp4");
//! ```

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::progress::{CancellationToken, NoOpProgress, ProgressCallback};
use crate::storage::DEFAULT_STORAGE_PATH;

/// How often progress is reported by default (every N items).
pub const DEFAULT_BATCH_SIZE: u64 = 100;

/// Frame rate used by [`AssembleOptions::new`].
pub const DEFAULT_FPS: u32 = 30;

/// Options for [`extract_frames`](crate::extract_frames).
///
/// Defaults: every frame (interval 1), storage root `Storage/Frames`,
/// progress every 100 saved frames, no callback, no cancellation.
#[derive(Clone)]
pub struct ExtractOptions {
    pub(crate) interval: u64,
    pub(crate) storage_root: PathBuf,
    pub(crate) progress: Arc<dyn ProgressCallback>,
    pub(crate) cancellation: Option<CancellationToken>,
    pub(crate) batch_size: u64,
}

impl Debug for ExtractOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ExtractOptions")
            .field("interval", &self.interval)
            .field("storage_root", &self.storage_root)
            .field("has_cancellation", &self.cancellation.is_some())
            .field("batch_size", &self.batch_size)
            .finish()
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractOptions {
    /// Create options with default settings.
    pub fn new() -> Self {
        Self {
            interval: 1,
            storage_root: PathBuf::from(DEFAULT_STORAGE_PATH),
            progress: Arc::new(NoOpProgress),
            cancellation: None,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Save every Nth decoded frame. `1` saves every frame.
    ///
    /// Zero is not clamped: extraction rejects it with
    /// [`FrameForgeError::InvalidInterval`](crate::FrameForgeError::InvalidInterval).
    #[must_use]
    pub fn with_interval(mut self, interval: u64) -> Self {
        self.interval = interval;
        self
    }

    /// Write per-video folders under `root` instead of `Storage/Frames`.
    #[must_use]
    pub fn with_storage_root<P: AsRef<Path>>(mut self, root: P) -> Self {
        self.storage_root = root.as_ref().to_path_buf();
        self
    }

    /// Attach a progress callback.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Attach a cancellation token.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Set how often the progress callback fires. Clamped to at least 1.
    #[must_use]
    pub fn with_batch_size(mut self, size: u64) -> Self {
        self.batch_size = size.max(1);
        self
    }

    /// The configured frame-save interval.
    pub fn interval(&self) -> u64 {
        self.interval
    }

    /// The configured storage root.
    pub fn storage_root(&self) -> &Path {
        &self.storage_root
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(|token| token.is_cancelled())
    }
}

/// Options for [`assemble_frames`](crate::assemble_frames).
///
/// Defaults: 30 fps, output `<folder>/output_30fps.mp4`, progress every
/// 100 frames, no callback, no cancellation.
#[derive(Clone)]
pub struct AssembleOptions {
    pub(crate) fps: u32,
    pub(crate) output: Option<PathBuf>,
    pub(crate) bitrate: Option<usize>,
    pub(crate) progress: Arc<dyn ProgressCallback>,
    pub(crate) cancellation: Option<CancellationToken>,
    pub(crate) batch_size: u64,
}

impl Debug for AssembleOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("AssembleOptions")
            .field("fps", &self.fps)
            .field("output", &self.output)
            .field("bitrate", &self.bitrate)
            .field("has_cancellation", &self.cancellation.is_some())
            .field("batch_size", &self.batch_size)
            .finish()
    }
}

impl Default for AssembleOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl AssembleOptions {
    /// Create options with default settings.
    pub fn new() -> Self {
        Self {
            fps: DEFAULT_FPS,
            output: None,
            bitrate: None,
            progress: Arc::new(NoOpProgress),
            cancellation: None,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Set the output frame rate. Zero is rejected at assembly time.
    #[must_use]
    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = fps;
        self
    }

    /// Write the video to `path` instead of the default location.
    #[must_use]
    pub fn with_output<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.output = Some(path.as_ref().to_path_buf());
        self
    }

    /// Encode at a target bit rate instead of constant quality.
    #[must_use]
    pub fn with_bitrate(mut self, bitrate: usize) -> Self {
        self.bitrate = Some(bitrate);
        self
    }

    /// Attach a progress callback.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Attach a cancellation token.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Set how often the progress callback fires. Clamped to at least 1.
    #[must_use]
    pub fn with_batch_size(mut self, size: u64) -> Self {
        self.batch_size = size.max(1);
        self
    }

    /// The configured frame rate.
    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Where the video will be written for a given frame folder.
    ///
    /// Returns the explicit output path if one was set, otherwise
    /// `<folder>/output_<fps>fps.mp4`.
    pub fn output_path_for(&self, folder: &Path) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| folder.join(format!("output_{}fps.mp4", self.fps)))
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(|token| token.is_cancelled())
    }
}
