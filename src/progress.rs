//! Progress reporting and cancellation support.
//!
//! This module provides [`ProgressCallback`] for monitoring long-running
//! extraction and assembly, [`ProgressInfo`] for the snapshot delivered to
//! it, and [`CancellationToken`] for cooperative cancellation.
//!
//! Callbacks decouple the core operations from any rendering mechanism: a
//! terminal progress bar, a log line, or a GUI widget can all sit behind
//! the same trait.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use frameforge::{ExtractOptions, FrameForgeError, ProgressInfo};
//!
//! let options = ExtractOptions::new()
//!     .with_progress(Arc::new(|info: &ProgressInfo| {
//!         println!("{}: {} frames saved", info.label, info.current);
//!     }));
//!
//! let report = frameforge::extract_frames(&["clip.mp4"], &options)?;
//! # Ok::<(), FrameForgeError>(())
//! ```

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::{Duration, Instant};

/// The kind of operation currently in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum OperationType {
    /// Decoding a video and saving frames as images.
    FrameExtraction,
    /// Encoding an image sequence into a video.
    FrameAssembly,
}

/// A snapshot of operation progress.
///
/// Delivered to [`ProgressCallback::on_progress`] every `batch_size` items
/// (100 by default) and once more when a unit of work completes.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// What kind of work is being performed.
    pub operation: OperationType,
    /// What is being processed: the video name during extraction, the
    /// frame folder during assembly.
    pub label: String,
    /// Items processed so far (frames saved, or frames encoded).
    pub current: u64,
    /// Total items expected, if known. For extraction this comes from
    /// container metadata and is only an estimate.
    pub total: Option<u64>,
    /// Completion percentage (0.0 – 100.0), if `total` is known.
    pub percentage: Option<f32>,
    /// Wall-clock time elapsed since the unit of work started.
    pub elapsed: Duration,
    /// `true` on the final report for this unit of work.
    pub finished: bool,
}

/// Trait for receiving progress updates.
///
/// Callbacks are infallible: they observe but cannot halt the operation.
/// Use [`CancellationToken`] to stop one.
///
/// Any `Fn(&ProgressInfo) + Send + Sync` closure implements this trait.
pub trait ProgressCallback: Send + Sync {
    /// Called at the configured cadence during an operation.
    fn on_progress(&self, info: &ProgressInfo);
}

impl<F> ProgressCallback for F
where
    F: Fn(&ProgressInfo) + Send + Sync,
{
    fn on_progress(&self, info: &ProgressInfo) {
        self(info)
    }
}

/// Discards all progress notifications. The default when no callback is set.
pub(crate) struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

/// Cooperative cancellation token backed by an [`AtomicBool`].
///
/// Clones share state, so a clone can be handed to a signal handler or
/// another thread while the operation runs. Both operations check the
/// token before each frame.
///
/// # Example
///
/// ```
/// use frameforge::CancellationToken;
///
/// let token = CancellationToken::new();
/// let handle = token.clone();
/// assert!(!token.is_cancelled());
///
/// handle.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a new, non-cancelled token.
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request cancellation. All clones observe it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Check whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Tracks one unit of work (one video, or one assembly) and fires the
/// callback every `batch_size` items.
pub(crate) struct ProgressTracker {
    callback: Arc<dyn ProgressCallback>,
    operation: OperationType,
    label: String,
    total: Option<u64>,
    current: u64,
    batch_size: u64,
    start_time: Instant,
}

impl ProgressTracker {
    pub(crate) fn new(
        callback: Arc<dyn ProgressCallback>,
        operation: OperationType,
        label: impl Into<String>,
        total: Option<u64>,
        batch_size: u64,
    ) -> Self {
        Self {
            callback,
            operation,
            label: label.into(),
            total: total.filter(|&t| t > 0),
            current: 0,
            batch_size: batch_size.max(1),
            start_time: Instant::now(),
        }
    }

    /// Record one completed item. Returns `true` when this item crossed a
    /// batch boundary and the callback fired.
    pub(crate) fn advance(&mut self) -> bool {
        self.current += 1;
        if self.current % self.batch_size == 0 {
            self.report(false);
            true
        } else {
            false
        }
    }

    /// Emit the final report for this unit of work.
    pub(crate) fn finish(&self) {
        self.report(true);
    }

    pub(crate) fn current(&self) -> u64 {
        self.current
    }

    fn report(&self, finished: bool) {
        let percentage = self
            .total
            .map(|t| (self.current as f32 / t as f32 * 100.0).min(100.0));

        let info = ProgressInfo {
            operation: self.operation,
            label: self.label.clone(),
            current: self.current,
            total: self.total,
            percentage,
            elapsed: self.start_time.elapsed(),
            finished,
        };

        self.callback.on_progress(&info);
    }
}
