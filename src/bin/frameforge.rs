use std::{
    fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use env_logger::Env;
use frameforge::{
    AssembleOptions, ExtractOptions, FfmpegLogLevel, OperationType, ProgressCallback,
    ProgressInfo, VideoSource,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;

const CLI_AFTER_HELP: &str = "Examples:\n  frameforge extract clip.mp4 other.mkv --every 5\n  frameforge extract videos/ --storage out/frames --progress\n  frameforge assemble Storage/Frames/clip --fps 24\n  frameforge probe clip.mp4 --json\n  frameforge completions zsh > _frameforge";

#[derive(Debug, Parser)]
#[command(
    name = "frameforge",
    version,
    about = "Extract frames from videos and assemble frames into videos",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser, Clone, Default)]
struct GlobalOptions {
    /// Show debug-level logging output.
    #[arg(long, global = true)]
    verbose: bool,

    /// Show a progress bar while working.
    #[arg(long, global = true)]
    progress: bool,

    /// FFmpeg log level (quiet, fatal, error, warning, info, debug).
    #[arg(long, global = true)]
    log_level: Option<FfmpegLogLevel>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extract frames from one or more videos.
    #[command(
        about = "Extract video frames as PNG files",
        after_help = "Frames land in <storage>/<video name>/frame_NNNNNN.png.\n\nExamples:\n  frameforge extract a.mp4 b.avi\n  frameforge extract videos/ --every 30 --json"
    )]
    Extract {
        /// Video files, or directories of videos (mp4, avi, mkv, mov, wmv).
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Save every Nth frame.
        #[arg(long, default_value_t = 1)]
        every: u64,
        /// Base directory for per-video frame folders.
        #[arg(long, default_value = frameforge::storage::DEFAULT_STORAGE_PATH)]
        storage: PathBuf,
        /// Print the per-video results as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Join a folder of frame_*.png files into a video.
    #[command(
        about = "Assemble PNG frames into a video",
        after_help = "Examples:\n  frameforge assemble Storage/Frames/clip\n  frameforge assemble frames/ --fps 60 --out clip.mp4"
    )]
    Assemble {
        /// Folder containing frame_*.png files.
        folder: PathBuf,
        /// Output frame rate.
        #[arg(long, default_value_t = frameforge::configuration::DEFAULT_FPS)]
        fps: u32,
        /// Output video path (default: <folder>/output_<fps>fps.mp4).
        #[arg(long)]
        out: Option<PathBuf>,
        /// Target bit rate in bits per second (default: constant quality).
        #[arg(long)]
        bitrate: Option<usize>,
    },

    /// Print metadata for a video file.
    #[command(about = "Print video metadata", visible_alias = "info")]
    Probe {
        /// Video file path.
        input: PathBuf,
        /// Output metadata as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts.
    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Expand directories into the supported videos they contain.
///
/// Files are kept as given, even with unfamiliar extensions, so the
/// extractor can report them as unopenable.
fn expand_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, std::io::Error> {
    let mut videos = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut found: Vec<PathBuf> = fs::read_dir(input)?
                .filter_map(Result::ok)
                .map(|entry| entry.path())
                .filter(|path| path.is_file() && frameforge::is_supported_video(path))
                .collect();
            found.sort();
            if found.is_empty() {
                log::warn!("No supported videos in {}", input.display());
            }
            videos.extend(found);
        } else {
            videos.push(input.clone());
        }
    }
    Ok(videos)
}

fn init_logging(global: &GlobalOptions) {
    let default_filter = if global.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter))
        .format_target(false)
        .format_timestamp(None)
        .init();

    if let Some(level) = global.log_level {
        frameforge::set_ffmpeg_log_level(level);
    } else if !global.verbose {
        frameforge::set_ffmpeg_log_level(FfmpegLogLevel::Error);
    }
}

/// Renders progress snapshots on a single terminal bar.
struct TerminalProgress {
    bar: ProgressBar,
    label: Mutex<String>,
}

impl TerminalProgress {
    fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template("{spinner:.green} {msg} {bar:40.cyan/blue} {pos}/{len}")?
                .progress_chars("##-"),
        );
        Ok(Self {
            bar,
            label: Mutex::new(String::new()),
        })
    }

    fn clear(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressCallback for TerminalProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        if let Ok(mut label) = self.label.lock() {
            if *label != info.label {
                *label = info.label.clone();
                self.bar.reset();
                self.bar.set_message(info.label.clone());
            }
        }
        self.bar.set_length(info.total.unwrap_or(0).max(info.current));
        self.bar.set_position(info.current);

        if info.finished {
            let verb = match info.operation {
                OperationType::FrameExtraction => "saved",
                _ => "encoded",
            };
            self.bar
                .println(format!("{} {} frame(s) {verb}", info.label.cyan(), info.current));
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(&cli.global);

    let progress = if cli.global.progress {
        Some(Arc::new(TerminalProgress::new()?))
    } else {
        None
    };

    match cli.command {
        Commands::Extract {
            inputs,
            every,
            storage,
            json,
        } => {
            let videos = expand_inputs(&inputs)?;
            if videos.is_empty() {
                println!("{}", "No videos selected.".yellow());
                return Ok(());
            }

            let mut options = ExtractOptions::new()
                .with_interval(every)
                .with_storage_root(&storage);
            if let Some(progress) = &progress {
                options = options.with_progress(progress.clone());
            }

            println!("Processing {} video(s)...", videos.len());
            let report = frameforge::extract_frames(&videos, &options)?;
            if let Some(progress) = &progress {
                progress.clear();
            }

            if json {
                let payload: Vec<_> = report
                    .videos()
                    .iter()
                    .map(|video| {
                        json!({
                            "name": video.name,
                            "source": video.source.display().to_string(),
                            "output_dir": video.output_dir.display().to_string(),
                            "frames_saved": video.frames_saved,
                            "frames_decoded": video.frames_decoded,
                            "error": video.open_error,
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                for video in report.videos() {
                    match &video.open_error {
                        None => println!("{}: {} frames extracted", video.name, video.frames_saved),
                        Some(reason) => println!(
                            "{}: {} ({})",
                            video.name,
                            "0 frames extracted".yellow(),
                            reason
                        ),
                    }
                }
                println!(
                    "{} {}",
                    "success:".green().bold(),
                    format!(
                        "Extraction completed: {} frame(s) from {} video(s) in {}",
                        report.total_saved(),
                        report.len(),
                        storage.display()
                    )
                    .green()
                );
            }
        }
        Commands::Assemble {
            folder,
            fps,
            out,
            bitrate,
        } => {
            let mut options = AssembleOptions::new().with_fps(fps);
            if let Some(out) = &out {
                options = options.with_output(out);
            }
            if let Some(bitrate) = bitrate {
                options = options.with_bitrate(bitrate);
            }
            if let Some(progress) = &progress {
                options = options.with_progress(progress.clone());
            }

            let report = frameforge::assemble_frames(&folder, &options)?;
            if let Some(progress) = &progress {
                progress.clear();
            }

            if report.frames_skipped > 0 {
                eprintln!(
                    "{} {}",
                    "warning:".yellow().bold(),
                    format!("{} unreadable frame(s) skipped", report.frames_skipped).yellow()
                );
            }
            println!(
                "{} {}",
                "success:".green().bold(),
                format!(
                    "Video created at {} ({} frames, {}x{} @ {} fps)",
                    report.output.display(),
                    report.frames_written,
                    report.width,
                    report.height,
                    report.fps
                )
                .green()
            );
        }
        Commands::Probe { input, json } => {
            print_metadata(&input, json)?;
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "frameforge", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn print_metadata(input: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let metadata = VideoSource::probe(input)?;
    if json {
        let payload = json!({
            "format": metadata.format,
            "codec": metadata.codec,
            "width": metadata.width,
            "height": metadata.height,
            "fps": metadata.frames_per_second,
            "frame_count": metadata.frame_count,
            "duration_seconds": metadata.duration.as_secs_f64(),
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        println!("Format: {}", metadata.format);
        println!("Duration: {:?}", metadata.duration);
        println!(
            "Video: {}x{} @ {:.2} fps [{}]",
            metadata.width, metadata.height, metadata.frames_per_second, metadata.codec,
        );
        println!("Frames: {}", metadata.frame_count);
    }
    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("{} {error}", "error:".red().bold());
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_extract_defaults() {
        let cli = Cli::try_parse_from(["frameforge", "extract", "a.mp4", "b.mkv"]).unwrap();
        match cli.command {
            Commands::Extract {
                inputs,
                every,
                storage,
                json,
            } => {
                assert_eq!(inputs.len(), 2);
                assert_eq!(every, 1);
                assert_eq!(storage, PathBuf::from("Storage/Frames"));
                assert!(!json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_negative_fps() {
        assert!(Cli::try_parse_from(["frameforge", "assemble", "dir", "--fps", "-3"]).is_err());
    }

    #[test]
    fn parses_ffmpeg_log_level() {
        let cli =
            Cli::try_parse_from(["frameforge", "--log-level", "quiet", "probe", "a.mp4"]).unwrap();
        assert_eq!(cli.global.log_level, Some(FfmpegLogLevel::Quiet));
    }

    #[test]
    fn expands_directories_to_supported_videos() {
        let scratch = tempfile::tempdir().expect("tempdir");
        for name in ["b.mp4", "a.MKV", "notes.txt", "c.wmv"] {
            fs::write(scratch.path().join(name), b"").unwrap();
        }
        let loose = PathBuf::from("loose.xyz");

        let videos = expand_inputs(&[scratch.path().to_path_buf(), loose.clone()]).unwrap();
        let names: Vec<_> = videos
            .iter()
            .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.MKV", "b.mp4", "c.wmv", "loose.xyz"]);
        assert_eq!(videos.last(), Some(&loose));
    }
}
