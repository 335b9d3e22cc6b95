//! Frame extraction integration tests.
//!
//! Fixture videos are generated on the fly with the crate's own encoder.

mod common;

use frameforge::{
    CancellationToken, ExtractOptions, FrameForgeError, OperationType, VideoSource,
    extract_frames, extract_video,
};

use common::{HEIGHT, WIDTH, file_names, recorder, write_video};

#[test]
fn every_frame_with_contiguous_names() {
    let scratch = tempfile::tempdir().expect("tempdir");
    let video = write_video(&scratch.path().join("clip.mp4"), 12, 24);
    let root = scratch.path().join("frames");

    let report = extract_frames(&[&video], &ExtractOptions::new().with_storage_root(&root))
        .expect("extract");

    assert_eq!(report.saved_count("clip"), Some(12));
    let expected: Vec<String> = (0..12).map(frameforge::frame_file_name).collect();
    assert_eq!(file_names(&root.join("clip")), expected);
}

#[test]
fn interval_saves_ceiling_of_count() {
    let scratch = tempfile::tempdir().expect("tempdir");
    let video = write_video(&scratch.path().join("clip.mp4"), 10, 24);
    let root = scratch.path().join("frames");

    let options = ExtractOptions::new()
        .with_interval(3)
        .with_storage_root(&root);
    let extraction = extract_video(&video, &options).expect("extract");

    assert_eq!(extraction.frames_decoded, 10);
    assert_eq!(extraction.frames_saved, 4);
    assert_eq!(
        file_names(&root.join("clip")),
        vec![
            "frame_000000.png",
            "frame_000003.png",
            "frame_000006.png",
            "frame_000009.png"
        ]
    );
}

#[test]
fn interval_larger_than_video_saves_first_frame() {
    let scratch = tempfile::tempdir().expect("tempdir");
    let video = write_video(&scratch.path().join("short.mp4"), 5, 24);
    let root = scratch.path().join("frames");

    let options = ExtractOptions::new()
        .with_interval(100)
        .with_storage_root(&root);
    let report = extract_frames(&[&video], &options).expect("extract");

    assert_eq!(report.saved_count("short"), Some(1));
    assert_eq!(file_names(&root.join("short")), vec!["frame_000000.png"]);
}

#[test]
fn saved_frames_keep_source_dimensions() {
    let scratch = tempfile::tempdir().expect("tempdir");
    let video = write_video(&scratch.path().join("clip.mp4"), 3, 24);
    let root = scratch.path().join("frames");

    extract_frames(&[&video], &ExtractOptions::new().with_storage_root(&root)).expect("extract");

    let frame = image::open(root.join("clip").join("frame_000002.png")).expect("open frame");
    assert_eq!((frame.width(), frame.height()), (WIDTH, HEIGHT));
}

#[test]
fn rerun_overwrites_with_identical_listing() {
    let scratch = tempfile::tempdir().expect("tempdir");
    let video = write_video(&scratch.path().join("clip.mp4"), 6, 24);
    let root = scratch.path().join("frames");
    let options = ExtractOptions::new()
        .with_interval(2)
        .with_storage_root(&root);

    let first = extract_frames(&[&video], &options).expect("first run");
    let listing = file_names(&root.join("clip"));
    let second = extract_frames(&[&video], &options).expect("second run");

    assert_eq!(first, second);
    assert_eq!(file_names(&root.join("clip")), listing);
}

#[test]
fn unopenable_input_does_not_stop_the_batch() {
    let scratch = tempfile::tempdir().expect("tempdir");
    let good = write_video(&scratch.path().join("good.mp4"), 4, 24);
    let missing = scratch.path().join("missing.avi");
    let root = scratch.path().join("frames");
    let options = ExtractOptions::new().with_storage_root(&root);

    for inputs in [[&missing, &good], [&good, &missing]] {
        let report = extract_frames(&inputs, &options).expect("extract");
        assert_eq!(report.len(), 2);
        assert_eq!(report.saved_count("good"), Some(4));
        assert_eq!(report.saved_count("missing"), Some(0));
        assert_eq!(report.failed(), 1);
        assert!(root.join("missing").is_dir());
        assert!(file_names(&root.join("missing")).is_empty());
    }
}

#[test]
fn shared_stem_merges_into_one_folder() {
    let scratch = tempfile::tempdir().expect("tempdir");
    let long = write_video(&scratch.path().join("take.mp4"), 6, 24);
    let short = write_video(&scratch.path().join("take.mkv"), 2, 24);
    let root = scratch.path().join("frames");

    let report = extract_frames(&[&long, &short], &ExtractOptions::new().with_storage_root(&root))
        .expect("extract");

    let counts: Vec<_> = report.counts().collect();
    assert_eq!(counts, vec![("take", 6), ("take", 2)]);
    assert_eq!(report.saved_count("take"), Some(2));
    // The second video overwrites the first two files; the rest remain.
    assert_eq!(file_names(&root.join("take")).len(), 6);
}

#[test]
fn zero_interval_is_rejected() {
    let scratch = tempfile::tempdir().expect("tempdir");
    let video = write_video(&scratch.path().join("clip.mp4"), 2, 24);
    let root = scratch.path().join("frames");

    let options = ExtractOptions::new()
        .with_interval(0)
        .with_storage_root(&root);
    assert!(matches!(
        extract_frames(&[&video], &options),
        Err(FrameForgeError::InvalidInterval)
    ));
    assert!(matches!(
        extract_video(&video, &options),
        Err(FrameForgeError::InvalidInterval)
    ));
    assert!(!root.exists());
}

#[test]
fn cancelled_token_stops_before_first_frame() {
    let scratch = tempfile::tempdir().expect("tempdir");
    let video = write_video(&scratch.path().join("clip.mp4"), 5, 24);
    let root = scratch.path().join("frames");

    let token = CancellationToken::new();
    token.cancel();
    let options = ExtractOptions::new()
        .with_storage_root(&root)
        .with_cancellation(token);

    assert!(matches!(
        extract_frames(&[&video], &options),
        Err(FrameForgeError::Cancelled)
    ));
    assert!(file_names(&root.join("clip")).is_empty());
}

#[test]
fn progress_fires_per_batch_and_on_finish() {
    let scratch = tempfile::tempdir().expect("tempdir");
    let video = write_video(&scratch.path().join("clip.mp4"), 7, 24);
    let root = scratch.path().join("frames");
    let (seen, callback) = recorder();

    let options = ExtractOptions::new()
        .with_storage_root(&root)
        .with_batch_size(3)
        .with_progress(callback);
    extract_frames(&[&video], &options).expect("extract");

    let seen = seen.lock().unwrap();
    let counts: Vec<u64> = seen.iter().map(|info| info.current).collect();
    assert_eq!(counts, vec![3, 6, 7]);
    assert!(seen.iter().all(|info| info.operation == OperationType::FrameExtraction));
    assert!(seen.iter().all(|info| info.label == "clip"));
    assert!(seen.last().unwrap().finished);
}

#[test]
fn probe_reports_stream_properties() {
    let scratch = tempfile::tempdir().expect("tempdir");
    let video = write_video(&scratch.path().join("clip.mp4"), 8, 25);

    let metadata = VideoSource::probe(&video).expect("probe");
    assert_eq!((metadata.width, metadata.height), (WIDTH, HEIGHT));
    assert!((metadata.frames_per_second - 25.0).abs() < 0.5);
    assert!(metadata.frame_count > 0);
}

#[test]
fn frames_iterator_restarts_after_rewind() {
    let scratch = tempfile::tempdir().expect("tempdir");
    let video = write_video(&scratch.path().join("clip.mp4"), 4, 24);

    let mut source = VideoSource::open(&video).expect("open");
    let first: Vec<u64> = source
        .frames()
        .expect("frames")
        .map(|frame| frame.expect("decode").0)
        .collect();
    let second: Vec<u64> = source
        .frames()
        .expect("frames")
        .map(|frame| frame.expect("decode").0)
        .collect();

    assert_eq!(first, vec![0, 1, 2, 3]);
    assert_eq!(second, first);
}

#[test]
fn opening_a_missing_file_fails() {
    let result = VideoSource::open("definitely/not/here.mp4");
    assert!(matches!(result, Err(FrameForgeError::FileOpen { .. })));
}
