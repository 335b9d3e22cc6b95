//! Output locations and frame file naming.
//!
//! Extraction writes into `Storage/Frames/<video stem>/frame_NNNNNN.png`.
//! This module owns those conventions: resolving (and creating) the base
//! directory, deriving a per-video folder from a path, and naming frame
//! files so that lexicographic order matches decode order.

use std::{
    ffi::OsStr,
    fs,
    path::{Path, PathBuf},
};

use crate::error::FrameForgeError;

/// Base directory for extracted frames, relative to the working directory.
pub const DEFAULT_STORAGE_PATH: &str = "Storage/Frames";

/// Prefix shared by every frame file.
pub const FRAME_FILE_PREFIX: &str = "frame_";

/// Extension of every frame file.
pub const FRAME_FILE_EXTENSION: &str = "png";

/// Resolve the default storage directory, creating it if absent.
///
/// Idempotent: when the directory already exists this only checks for it.
///
/// # Errors
///
/// [`FrameForgeError::IoError`] if the directory (or a parent) cannot be
/// created.
pub fn resolve_storage_path() -> Result<PathBuf, FrameForgeError> {
    ensure_directory(DEFAULT_STORAGE_PATH)
}

/// Make sure `path` exists as a directory, creating missing parents.
pub fn ensure_directory<P: AsRef<Path>>(path: P) -> Result<PathBuf, FrameForgeError> {
    let path = path.as_ref();
    if !path.is_dir() {
        log::debug!("Creating directory {}", path.display());
        fs::create_dir_all(path)?;
    }
    Ok(path.to_path_buf())
}

/// Name used for a video's output folder and in extraction reports: the
/// file name without its extension.
pub fn video_name<P: AsRef<Path>>(video_path: P) -> String {
    video_path
        .as_ref()
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "video".to_string())
}

/// Folder that receives the frames of `video_path` under `base`.
pub fn video_output_dir<B: AsRef<Path>, P: AsRef<Path>>(base: B, video_path: P) -> PathBuf {
    base.as_ref().join(video_name(video_path))
}

/// File name for the frame at decode index `index`.
///
/// The index is zero-padded to six digits; larger indices widen the field.
pub fn frame_file_name(index: u64) -> String {
    format!("{FRAME_FILE_PREFIX}{index:06}.{FRAME_FILE_EXTENSION}")
}

/// Whether `name` matches the `frame_*.png` pattern the assembler reads.
///
/// Matching is on the raw name, so the wildcard part need not be UTF-8.
pub fn is_frame_file_name<S: AsRef<OsStr>>(name: S) -> bool {
    name.as_ref()
        .as_encoded_bytes()
        .strip_prefix(FRAME_FILE_PREFIX.as_bytes())
        .and_then(|rest| rest.strip_suffix(FRAME_FILE_EXTENSION.as_bytes()))
        .is_some_and(|middle| middle.ends_with(b"."))
}

/// List the frame files directly inside `folder`, sorted by file name.
pub(crate) fn list_frame_files(folder: &Path) -> Result<Vec<PathBuf>, FrameForgeError> {
    let mut frames = Vec::new();
    for entry in fs::read_dir(folder)? {
        let entry = entry?;
        let path = entry.path();
        // `Path::is_file` follows symlinks.
        if is_frame_file_name(entry.file_name()) && path.is_file() {
            frames.push(path);
        }
    }
    frames.sort();
    Ok(frames)
}
