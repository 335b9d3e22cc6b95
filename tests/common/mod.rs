//! Shared fixtures: small synthetic videos written with [`VideoWriter`].

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use frameforge::{ProgressCallback, ProgressInfo, VideoWriter, VideoWriterOptions};
use image::{DynamicImage, Rgb, RgbImage};

pub const WIDTH: u32 = 64;
pub const HEIGHT: u32 = 48;

/// A solid frame whose colour depends on `index`.
pub fn solid_frame(index: u64, width: u32, height: u32) -> DynamicImage {
    let shade = ((index * 37) % 256) as u8;
    DynamicImage::ImageRgb8(RgbImage::from_pixel(
        width,
        height,
        Rgb([shade, 255 - shade, 128]),
    ))
}

/// A smooth colour ramp that shifts with `index`, with detail in every
/// macroblock.
pub fn gradient_frame(index: u64, width: u32, height: u32) -> DynamicImage {
    let shift = (index * 8) as u32;
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            ((x * 255 / width + shift) % 256) as u8,
            (y * 255 / height) as u8,
            ((x + y) * 255 / (width + height)) as u8,
        ])
    }))
}

/// Mean absolute per-channel difference between two same-sized images.
pub fn mean_abs_error(a: &DynamicImage, b: &DynamicImage) -> f64 {
    let (a, b) = (a.to_rgb8(), b.to_rgb8());
    assert_eq!(a.dimensions(), b.dimensions());
    let total: u64 = a
        .as_raw()
        .iter()
        .zip(b.as_raw())
        .map(|(&left, &right)| u64::from(left.abs_diff(right)))
        .sum();
    total as f64 / a.as_raw().len() as f64
}

/// Write a `frames`-long video at `path`.
pub fn write_video(path: &Path, frames: u64, fps: u32) -> PathBuf {
    write_video_sized(path, frames, fps, WIDTH, HEIGHT)
}

pub fn write_video_sized(path: &Path, frames: u64, fps: u32, width: u32, height: u32) -> PathBuf {
    let mut writer = VideoWriter::create(path, &VideoWriterOptions::new(fps, width, height))
        .expect("create fixture writer");
    for index in 0..frames {
        writer
            .write_frame(&solid_frame(index, width, height))
            .expect("write fixture frame");
    }
    assert_eq!(writer.finish().expect("finish fixture"), frames);
    path.to_path_buf()
}

/// Write `count` PNG frames named `frame_000000.png` onwards into `folder`.
pub fn write_frames(folder: &Path, count: u64) {
    std::fs::create_dir_all(folder).expect("create frame folder");
    for index in 0..count {
        solid_frame(index, WIDTH, HEIGHT)
            .save(folder.join(frameforge::frame_file_name(index)))
            .expect("save frame");
    }
}

/// Sorted file names in `folder`.
pub fn file_names(folder: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(folder)
        .expect("read folder")
        .map(|entry| entry.expect("entry").file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// A callback that records every snapshot it receives.
pub fn recorder() -> (Arc<Mutex<Vec<ProgressInfo>>>, Arc<dyn ProgressCallback>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let callback: Arc<dyn ProgressCallback> = Arc::new(move |info: &ProgressInfo| {
        sink.lock().unwrap().push(info.clone());
    });
    (seen, callback)
}
