//! Frame assembly: a folder of `frame_*.png` files in, one video out.
//!
//! Files are read in lexicographic order, which matches decode order for
//! the zero-padded names the extractor writes. The first file fixes the
//! output dimensions. Later files that fail to decode are skipped and
//! counted; everything else that goes wrong is returned as an error.
//!
//! # Example
//!
//! ```no_run
//! use frameforge::{AssembleOptions, FrameForgeError};
//!
//! let report = frameforge::assemble_frames(
//!     "Storage/Frames/holiday",
//!     &AssembleOptions::new().with_fps(25),
//! )?;
//! println!("wrote {} frames to {}", report.frames_written, report.output.display());
//! # Ok::<(), FrameForgeError>(())
//! ```

use std::path::{Path, PathBuf};

use crate::{
    configuration::AssembleOptions,
    encode::{VideoWriter, VideoWriterOptions},
    error::FrameForgeError,
    progress::{OperationType, ProgressTracker},
    storage::list_frame_files,
};

/// Outcome of a successful assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyReport {
    /// The video file that was written.
    pub output: PathBuf,
    /// Frames encoded into the video.
    pub frames_written: u64,
    /// Frame files found but not decodable (excluding the first, which is
    /// fatal).
    pub frames_skipped: u64,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frame rate.
    pub fps: u32,
}

/// Encode the `frame_*.png` files in `folder` into one video.
///
/// # Errors
///
/// Returned before any output file is created:
/// - [`FrameForgeError::InvalidFrameRate`] if the frame rate is zero.
/// - [`FrameForgeError::FolderNotFound`] / [`FrameForgeError::NotADirectory`].
/// - [`FrameForgeError::NoFrameFiles`] if nothing matches `frame_*.png`.
/// - [`FrameForgeError::FirstFrameUnreadable`] if the first file cannot be
///   decoded.
///
/// After the encoder is open, encoding and I/O failures are returned as
/// well; the partially written output is left in place.
pub fn assemble_frames<P: AsRef<Path>>(
    folder: P,
    options: &AssembleOptions,
) -> Result<AssemblyReport, FrameForgeError> {
    let folder = folder.as_ref();

    if options.fps == 0 {
        return Err(FrameForgeError::InvalidFrameRate(options.fps));
    }
    if !folder.exists() {
        return Err(FrameForgeError::FolderNotFound(folder.to_path_buf()));
    }
    if !folder.is_dir() {
        return Err(FrameForgeError::NotADirectory(folder.to_path_buf()));
    }

    let frame_files = list_frame_files(folder)?;
    let Some(first_path) = frame_files.first() else {
        return Err(FrameForgeError::NoFrameFiles(folder.to_path_buf()));
    };

    let first = image::open(first_path).map_err(|error| FrameForgeError::FirstFrameUnreadable {
        path: first_path.clone(),
        reason: error.to_string(),
    })?;
    let (width, height) = (first.width(), first.height());

    if options.is_cancelled() {
        log::info!("Assembly of {} cancelled before encoding", folder.display());
        return Err(FrameForgeError::Cancelled);
    }

    let output = options.output_path_for(folder);
    let total = frame_files.len() as u64;

    let mut writer_options = VideoWriterOptions::new(options.fps, width, height);
    if let Some(bitrate) = options.bitrate {
        writer_options = writer_options.with_bitrate(bitrate);
    }

    log::info!(
        "Assembling {total} frames from {} at {} fps ({width}x{height}) into {}",
        folder.display(),
        options.fps,
        output.display(),
    );

    let mut writer = VideoWriter::create(&output, &writer_options)?;
    let mut tracker = ProgressTracker::new(
        options.progress.clone(),
        OperationType::FrameAssembly,
        folder.display().to_string(),
        Some(total),
        options.batch_size,
    );

    writer.write_frame(&first)?;
    tracker.advance();
    drop(first);

    let mut frames_skipped = 0;
    for (position, path) in frame_files.iter().enumerate().skip(1) {
        if options.is_cancelled() {
            log::info!("Assembly cancelled after {} frames", writer.frames_written());
            return Err(FrameForgeError::Cancelled);
        }

        match image::open(path) {
            Ok(image) => writer.write_frame(&image)?,
            Err(error) => {
                log::warn!("Skipping unreadable frame {}: {error}", path.display());
                frames_skipped += 1;
            }
        }

        // Cadence follows file position, not frames written, so skipped
        // files still move the counter.
        if tracker.advance() {
            log::info!("Processing frame {}/{total}", position + 1);
        }
    }

    let frames_written = writer.finish()?;
    tracker.finish();

    log::info!(
        "Video created at {} ({frames_written} frames, {frames_skipped} skipped)",
        output.display()
    );

    Ok(AssemblyReport {
        output,
        frames_written,
        frames_skipped,
        width,
        height,
        fps: options.fps,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_fps_is_rejected_first() {
        let result = assemble_frames("no/such/folder", &AssembleOptions::new().with_fps(0));
        assert!(matches!(result, Err(FrameForgeError::InvalidFrameRate(0))));
    }

    #[test]
    fn missing_folder() {
        let result = assemble_frames("no/such/folder", &AssembleOptions::new());
        assert!(matches!(result, Err(FrameForgeError::FolderNotFound(_))));
    }

    #[test]
    fn file_instead_of_folder() {
        let scratch = tempfile::tempdir().expect("tempdir");
        let file = scratch.path().join("frame_000000.png");
        std::fs::write(&file, b"").unwrap();
        let result = assemble_frames(&file, &AssembleOptions::new());
        assert!(matches!(result, Err(FrameForgeError::NotADirectory(_))));
    }

    #[test]
    fn unreadable_first_frame_creates_no_output() {
        let scratch = tempfile::tempdir().expect("tempdir");
        std::fs::write(scratch.path().join("frame_000000.png"), b"garbage").unwrap();
        let result = assemble_frames(scratch.path(), &AssembleOptions::new());
        assert!(matches!(
            result,
            Err(FrameForgeError::FirstFrameUnreadable { .. })
        ));
        assert!(!scratch.path().join("output_30fps.mp4").exists());
    }
}
