//! Binary entry point for the subtitle generator.

use anyhow::{bail, Result};
use clap::{ArgGroup, Parser};
use std::path::PathBuf;
use subgen_core::config::DEFAULT_FFMPEG_THREADS;
use subgen_core::{
    run, ExternalTools, InputTarget, Report, RunConfiguration, RunOptions, Status, Workspace,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Create English subtitles for video files using whisper.cpp.
#[derive(Parser, Debug)]
#[command(version, about)]
#[command(group(ArgGroup::new("input").required(true).args(["file", "directory"])))]
struct Cli {
    /// Path to the whisper.cpp model file.
    #[arg(short, long, value_name = "MODEL")]
    model: PathBuf,

    /// Path to the whisper.cpp executable. Defaults to the first executable
    /// found in the model's grandparent directory.
    #[arg(short, long, value_name = "EXECUTABLE")]
    executable: Option<PathBuf>,

    /// Threads for whisper.cpp (default: number of CPU cores).
    #[arg(long, value_name = "THREADS")]
    whisper_threads: Option<usize>,

    /// Threads for ffmpeg.
    #[arg(long, value_name = "THREADS", default_value_t = DEFAULT_FFMPEG_THREADS)]
    ffmpeg_threads: usize,

    /// ffmpeg program to run.
    #[arg(long, value_name = "PROGRAM", default_value = "ffmpeg")]
    ffmpeg: PathBuf,

    /// Create subtitles even if they already exist.
    #[arg(long)]
    force: bool,

    /// Only report what would be created.
    #[arg(long)]
    dry_run: bool,

    /// A single video file.
    #[arg(short, long, value_name = "FILE")]
    file: Option<PathBuf>,

    /// A directory containing video files.
    #[arg(short, long, value_name = "DIRECTORY")]
    directory: Option<PathBuf>,

    /// Also process videos in subdirectories.
    #[arg(short, long, requires = "directory")]
    recursive: bool,

    /// Keep the temporary WAV files.
    #[arg(long)]
    keep_temp: bool,

    /// Directory for temporary audio and transcripts (default: system temp dir).
    #[arg(long, value_name = "DIR")]
    temp_dir: Option<PathBuf>,

    /// Directory for whisper.cpp logs.
    #[arg(long, value_name = "DIR", default_value = "logs")]
    log_dir: PathBuf,

    /// Print the final report as JSON.
    #[arg(long)]
    json: bool,

    /// Enable verbose debug and trace logs.
    #[arg(long)]
    debug: bool,
}

impl Cli {
    /// Turn the parsed arguments into unvalidated run options.
    fn options(self) -> RunOptions {
        // clap guarantees exactly one of the two.
        let target = match self.directory {
            Some(path) => InputTarget::Directory {
                path,
                recursive: self.recursive,
            },
            None => InputTarget::File(self.file.unwrap_or_default()),
        };
        let mut workspace = Workspace {
            logs_dir: self.log_dir,
            ..Workspace::default()
        };
        if let Some(dir) = self.temp_dir {
            workspace.temp_dir = dir;
        }
        RunOptions {
            model: self.model,
            executable: self.executable,
            ffmpeg: self.ffmpeg,
            whisper_threads: self.whisper_threads,
            ffmpeg_threads: self.ffmpeg_threads,
            force: self.force,
            dry_run: self.dry_run,
            keep_temp: self.keep_temp,
            target,
            workspace,
        }
    }
}

/// Print one status line to stdout.
fn print_status(status: &Status) {
    match status {
        Status::Create(srt) => println!("CREATE:\t{}", srt.display()),
        Status::Skip(srt) => println!(
            "SKIP:\t{} is present",
            srt.file_name().unwrap_or_default().to_string_lossy()
        ),
        Status::Exists(srt) => println!("EXISTS:\t{}", srt.display()),
        Status::Failed(video, err) => println!("FAILED:\t{}: {}", video.display(), err),
    }
}

/// Print the end-of-run summary.
fn print_summary(report: &Report) {
    if report.dry_run {
        println!("to create: {}", report.created);
        println!("existing: {}", report.existing);
    } else {
        println!("created: {}", report.created);
        println!("skipped: {}", report.existing);
        println!("failed: {}", report.failures.len());
    }
}

/// Application entry point which parses CLI args and performs actions.
/// This function should initialize logging and delegate to the core library.
fn main() -> Result<()> {
    let cli = Cli::parse();
    let filter = if cli.debug {
        EnvFilter::default()
            .add_directive("subgen=trace".parse().unwrap())
            .add_directive("subgen_core=trace".parse().unwrap())
            .add_directive("info".parse().unwrap())
    } else {
        EnvFilter::default()
            .add_directive("subgen=info".parse().unwrap())
            .add_directive("subgen_core=info".parse().unwrap())
            .add_directive("warn".parse().unwrap())
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let json = cli.json;
    let config = RunConfiguration::resolve(cli.options())?;
    info!("found whisper.cpp executable at {}", config.executable.display());
    let tools = ExternalTools::from_config(&config);
    let report = run(&config, &tools, print_status)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }
    if !report.failures.is_empty() {
        bail!("{} of {} file(s) failed", report.failures.len(), report.total());
    }
    Ok(())
}
