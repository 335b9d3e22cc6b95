//! Frame extraction: video files in, numbered PNG files out.
//!
//! [`extract_frames`] walks a list of videos one at a time. For each video
//! it creates `<storage root>/<video stem>/`, decodes every frame in order,
//! and saves every Nth one as `frame_<index>.png`, where `<index>` is the
//! frame's position in decode order. A video that cannot be opened is
//! recorded with zero frames and the batch moves on; any other failure
//! (a frame that cannot be written, a folder that cannot be created) stops
//! the batch and is returned.
//!
//! # Example
//!
//! ```no_run
//! use frameforge::{ExtractOptions, FrameForgeError};
//!
//! let options = ExtractOptions::new().with_interval(10);
//! let report = frameforge::extract_frames(&["a.mp4", "b.mkv"], &options)?;
//! for (name, saved) in report.counts() {
//!     println!("{name}: {saved} frames extracted");
//! }
//! # Ok::<(), FrameForgeError>(())
//! ```

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use crate::{
    configuration::ExtractOptions,
    error::FrameForgeError,
    progress::{OperationType, ProgressTracker},
    storage::{ensure_directory, frame_file_name, video_name, video_output_dir},
    video::VideoSource,
};

/// Outcome of extracting frames from one video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoExtraction {
    /// The video's file stem, also the name of its output folder.
    pub name: String,
    /// Path the video was read from.
    pub source: PathBuf,
    /// Folder the frames were written to.
    pub output_dir: PathBuf,
    /// Number of frame files written.
    pub frames_saved: u64,
    /// Number of frames decoded, saved or not.
    pub frames_decoded: u64,
    /// Why the video could not be opened, if it could not.
    pub open_error: Option<String>,
}

impl VideoExtraction {
    /// Whether the video was opened and decoded.
    pub fn is_success(&self) -> bool {
        self.open_error.is_none()
    }
}

/// Per-video results of an extraction batch, in input order.
///
/// There is exactly one entry per input path, including videos that could
/// not be opened (with zero frames saved).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionReport {
    videos: Vec<VideoExtraction>,
}

impl ExtractionReport {
    /// All entries, in input order.
    pub fn videos(&self) -> &[VideoExtraction] {
        &self.videos
    }

    /// `(video name, frames saved)` pairs, in input order.
    pub fn counts(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.videos
            .iter()
            .map(|video| (video.name.as_str(), video.frames_saved))
    }

    /// Frames saved for the video named `name`.
    ///
    /// If several inputs share a name, the last one wins.
    pub fn saved_count(&self, name: &str) -> Option<u64> {
        self.videos
            .iter()
            .rev()
            .find(|video| video.name == name)
            .map(|video| video.frames_saved)
    }

    /// Total frames saved across the batch.
    pub fn total_saved(&self) -> u64 {
        self.videos.iter().map(|video| video.frames_saved).sum()
    }

    /// Number of inputs that could not be opened.
    pub fn failed(&self) -> usize {
        self.videos.iter().filter(|video| !video.is_success()).count()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.videos.len()
    }

    /// Whether the report has no entries.
    pub fn is_empty(&self) -> bool {
        self.videos.is_empty()
    }
}

impl IntoIterator for ExtractionReport {
    type Item = VideoExtraction;
    type IntoIter = std::vec::IntoIter<VideoExtraction>;

    fn into_iter(self) -> Self::IntoIter {
        self.videos.into_iter()
    }
}

/// Extract frames from each video in `paths`, in order.
///
/// An empty `paths` yields an empty report without touching the disk.
///
/// # Errors
///
/// - [`FrameForgeError::InvalidInterval`] if the interval is zero.
/// - [`FrameForgeError::IoError`] if a folder cannot be created.
/// - [`FrameForgeError::ImageError`] if a frame cannot be written.
/// - [`FrameForgeError::Cancelled`] if the cancellation token fires.
pub fn extract_frames<P: AsRef<Path>>(
    paths: &[P],
    options: &ExtractOptions,
) -> Result<ExtractionReport, FrameForgeError> {
    if options.interval == 0 {
        return Err(FrameForgeError::InvalidInterval);
    }

    let mut report = ExtractionReport::default();
    if paths.is_empty() {
        log::info!("No videos selected");
        return Ok(report);
    }

    let storage_root = ensure_directory(&options.storage_root)?;
    let mut claimed_folders: HashMap<PathBuf, PathBuf> = HashMap::new();

    for path in paths {
        let path = path.as_ref();
        let output_dir = video_output_dir(&storage_root, path);

        if let Some(previous) = claimed_folders.insert(output_dir.clone(), path.to_path_buf()) {
            if previous != path {
                log::warn!(
                    "{} and {} share the output folder {}; their frames will be merged",
                    previous.display(),
                    path.display(),
                    output_dir.display(),
                );
            }
        }

        let extraction = extract_into(path, &output_dir, options)?;
        report.videos.push(extraction);
    }

    log::info!(
        "Extraction finished: {} frames from {} video(s), {} could not be opened",
        report.total_saved(),
        report.len(),
        report.failed(),
    );
    Ok(report)
}

/// Extract frames from a single video.
///
/// Equivalent to [`extract_frames`] with a one-element list.
pub fn extract_video<P: AsRef<Path>>(
    path: P,
    options: &ExtractOptions,
) -> Result<VideoExtraction, FrameForgeError> {
    if options.interval == 0 {
        return Err(FrameForgeError::InvalidInterval);
    }
    let storage_root = ensure_directory(&options.storage_root)?;
    let path = path.as_ref();
    extract_into(path, &video_output_dir(&storage_root, path), options)
}

fn extract_into(
    path: &Path,
    output_dir: &Path,
    options: &ExtractOptions,
) -> Result<VideoExtraction, FrameForgeError> {
    let name = video_name(path);
    ensure_directory(output_dir)?;

    log::info!("Extracting frames from {name}");

    let mut extraction = VideoExtraction {
        name: name.clone(),
        source: path.to_path_buf(),
        output_dir: output_dir.to_path_buf(),
        frames_saved: 0,
        frames_decoded: 0,
        open_error: None,
    };

    let mut source = match VideoSource::open(path) {
        Ok(source) => source,
        Err(error) => {
            log::warn!("Could not open {}: {error}", path.display());
            extraction.open_error = Some(error.to_string());
            return Ok(extraction);
        }
    };

    let metadata = source.metadata();
    log::info!(
        "{name}: {} frames reported at {:.2} fps ({}x{})",
        metadata.frame_count,
        metadata.frames_per_second,
        metadata.width,
        metadata.height,
    );

    let expected = metadata
        .known_frame_count()
        .map(|total| total.div_ceil(options.interval));
    let mut tracker = ProgressTracker::new(
        options.progress.clone(),
        OperationType::FrameExtraction,
        name.clone(),
        expected,
        options.batch_size,
    );

    let mut frames = source.frames()?;
    loop {
        if options.is_cancelled() {
            log::info!("Extraction of {name} cancelled after {} frames", tracker.current());
            return Err(FrameForgeError::Cancelled);
        }

        let (index, image) = match frames.next() {
            Some(Ok(frame)) => frame,
            Some(Err(error)) => {
                log::warn!(
                    "{name}: decoding stopped at frame {}: {error}",
                    frames.decoded()
                );
                break;
            }
            None => break,
        };

        if index % options.interval == 0 {
            image.save(output_dir.join(frame_file_name(index)))?;
            if tracker.advance() {
                log::info!("Frames saved for {name}: {}", tracker.current());
            }
        }
    }

    extraction.frames_decoded = frames.decoded();
    extraction.frames_saved = tracker.current();
    tracker.finish();

    log::info!(
        "Finished {name}: saved {} of {} frames to {}",
        extraction.frames_saved,
        extraction.frames_decoded,
        output_dir.display(),
    );
    Ok(extraction)
}
