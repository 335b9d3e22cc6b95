//! # frameforge
//!
//! Extract still frames from video files into numbered PNG sequences, and
//! assemble PNG sequences back into video files, powered by FFmpeg via the
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) crate.
//!
//! Both operations are synchronous and sequential: one video at a time,
//! one frame at a time.
//!
//! ## Quick Start
//!
//! ### Extract Frames
//!
//! ```no_run
//! use frameforge::{ExtractOptions, FrameForgeError};
//!
//! // Every frame of each video, into Storage/Frames/<video stem>/.
//! let report = frameforge::extract_frames(&["intro.mp4", "outro.mov"], &ExtractOptions::new())?;
//! for (name, saved) in report.counts() {
//!     println!("{name}: {saved} frames extracted");
//! }
//! # Ok::<(), FrameForgeError>(())
//! ```
//!
//! ### Assemble a Video
//!
//! ```no_run
//! use frameforge::{AssembleOptions, FrameForgeError};
//!
//! // Writes Storage/Frames/intro/output_24fps.mp4.
//! let report = frameforge::assemble_frames(
//!     "Storage/Frames/intro",
//!     &AssembleOptions::new().with_fps(24),
//! )?;
//! # Ok::<(), FrameForgeError>(())
//! ```
//!
//! ## Layout on disk
//!
//! - Extraction writes `Storage/Frames/<stem>/frame_<index:06>.png`, where
//!   `<index>` is the frame's position in decode order. With an interval
//!   above 1 the numbering has gaps.
//! - Assembly reads every `frame_*.png` in a folder, sorted by name, and
//!   writes an MPEG-4 (`mp4v`) video, `<folder>/output_<fps>fps.mp4` by
//!   default.
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on your system.

mod assemble;
pub mod configuration;
mod conversion;
pub mod encode;
pub mod error;
mod extract;
pub mod ffmpeg;
pub mod metadata;
pub mod progress;
pub mod storage;
pub mod video;

pub use assemble::{AssemblyReport, assemble_frames};
pub use configuration::{AssembleOptions, ExtractOptions};
pub use encode::{VideoWriter, VideoWriterOptions};
pub use error::FrameForgeError;
pub use extract::{ExtractionReport, VideoExtraction, extract_frames, extract_video};
pub use ffmpeg::{FfmpegLogLevel, set_ffmpeg_log_level};
pub use metadata::VideoMetadata;
pub use progress::{CancellationToken, OperationType, ProgressCallback, ProgressInfo};
pub use storage::{frame_file_name, resolve_storage_path};
pub use video::{SequentialFrames, VideoSource, is_supported_video};
