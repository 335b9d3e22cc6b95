//! Benchmarks for frame extraction and assembly.
//!
//! Run with: cargo bench
//!
//! Input videos are generated into a temporary directory before timing.

use std::{path::Path, time::Duration};

use criterion::Criterion;
use frameforge::{
    AssembleOptions, ExtractOptions, FfmpegLogLevel, VideoSource, VideoWriter,
    VideoWriterOptions,
};
use image::{DynamicImage, Rgb, RgbImage};

const FRAMES: u64 = 60;
const WIDTH: u32 = 320;
const HEIGHT: u32 = 240;

fn write_fixture(path: &Path) {
    let mut writer =
        VideoWriter::create(path, &VideoWriterOptions::new(30, WIDTH, HEIGHT)).unwrap();
    for index in 0..FRAMES {
        let shade = (index * 4 % 256) as u8;
        let image = RgbImage::from_pixel(WIDTH, HEIGHT, Rgb([shade, 64, 255 - shade]));
        writer.write_frame(&DynamicImage::ImageRgb8(image)).unwrap();
    }
    writer.finish().unwrap();
}

fn benchmark_decoding(criterion: &mut Criterion) {
    frameforge::set_ffmpeg_log_level(FfmpegLogLevel::Error);
    let scratch = tempfile::tempdir().unwrap();
    let video = scratch.path().join("bench.mp4");
    write_fixture(&video);

    criterion.bench_function("decode all frames (no save)", |bencher| {
        bencher.iter(|| {
            let mut source = VideoSource::open(&video).unwrap();
            let decoded = source.frames().unwrap().filter_map(Result::ok).count();
            assert_eq!(decoded as u64, FRAMES);
        });
    });
}

fn benchmark_extraction(criterion: &mut Criterion) {
    let scratch = tempfile::tempdir().unwrap();
    let video = scratch.path().join("bench.mp4");
    write_fixture(&video);
    let root = scratch.path().join("frames");

    for interval in [1, 10] {
        let options = ExtractOptions::new()
            .with_interval(interval)
            .with_storage_root(&root);
        criterion.bench_function(&format!("extract every {interval} frame(s)"), |bencher| {
            bencher.iter(|| frameforge::extract_frames(&[&video], &options).unwrap());
        });
    }
}

fn benchmark_assembly(criterion: &mut Criterion) {
    let scratch = tempfile::tempdir().unwrap();
    let video = scratch.path().join("bench.mp4");
    write_fixture(&video);
    let root = scratch.path().join("frames");
    frameforge::extract_frames(&[&video], &ExtractOptions::new().with_storage_root(&root))
        .unwrap();
    let folder = root.join("bench");

    criterion.bench_function("assemble 60 frames", |bencher| {
        bencher.iter(|| frameforge::assemble_frames(&folder, &AssembleOptions::new()).unwrap());
    });
}

fn configured() -> Criterion {
    Criterion::default()
        .sample_size(10)
        .measurement_time(Duration::from_secs(5))
}

criterion::criterion_group!(
    name = benches;
    config = configured();
    targets = benchmark_decoding, benchmark_extraction, benchmark_assembly
);
criterion::criterion_main!(benches);
