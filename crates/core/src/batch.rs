//! Batch driver: enumerate videos and run the pipeline on each in turn.

use crate::audio::stage;
use crate::config::{is_video, InputTarget, RunConfiguration};
use crate::error::{Result, SubgenError};
use crate::task::{should_transcribe, FileTask};
use crate::tools::Toolchain;
use crate::transcribe::transcribe;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{error, info, trace};
use walkdir::WalkDir;

/// Per-file progress reported while a batch runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// A subtitle is being (or in a dry run, would be) created.
    Create(PathBuf),
    /// The subtitle already exists and the file was left alone.
    Skip(PathBuf),
    /// Dry-run counterpart of `Skip`.
    Exists(PathBuf),
    /// The pipeline failed for this video.
    Failed(PathBuf, String),
}

/// One video that could not be processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub video: PathBuf,
    pub error: String,
}

/// Outcome of a whole batch.
/// In a dry run `created` counts the subtitles that would be created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    pub dry_run: bool,
    pub created: usize,
    pub existing: usize,
    pub failures: Vec<Failure>,
}

impl Report {
    pub fn total(&self) -> usize {
        self.created + self.existing + self.failures.len()
    }
}

/// List the videos named by `target`.
/// Directory entries are visited in name order; only accepted video
/// extensions are kept and subdirectories are entered when `recursive`.
/// Directory symlinks are not followed, symlinked video files are kept.
pub fn collect_inputs(target: &InputTarget) -> Result<Vec<PathBuf>> {
    trace!("collect_inputs(target={:?})", target);
    match target {
        InputTarget::File(path) => Ok(vec![path.clone()]),
        InputTarget::Directory { path, recursive } => {
            let walker = WalkDir::new(path)
                .min_depth(1)
                .max_depth(if *recursive { usize::MAX } else { 1 })
                .sort_by_file_name();
            let mut out = Vec::new();
            for entry in walker {
                let entry = entry.map_err(|e| {
                    let at = e.path().unwrap_or(path.as_path()).to_path_buf();
                    SubgenError::fs(at, e.into())
                })?;
                let is_file = entry.file_type().is_file()
                    || (entry.path_is_symlink() && entry.path().is_file());
                if is_file && is_video(entry.path()) {
                    out.push(entry.into_path());
                }
            }
            Ok(out)
        }
    }
}

/// Process every input of `config` sequentially.
/// Failures of a single file are reported through `on_status` and collected
/// in the report; the batch carries on with the next file. Only enumeration
/// errors abort the run.
pub fn run<T, F>(config: &RunConfiguration, tools: &T, mut on_status: F) -> Result<Report>
where
    T: Toolchain,
    F: FnMut(&Status),
{
    let inputs = collect_inputs(&config.target)?;
    info!("found {} video file(s)", inputs.len());
    let mut report = Report {
        dry_run: config.dry_run,
        ..Report::default()
    };
    for video in inputs {
        let task = FileTask::new(&video, &config.workspace);
        let needed = should_transcribe(&video, config.force);
        if config.dry_run {
            if needed {
                report.created += 1;
                on_status(&Status::Create(task.final_subtitle));
            } else {
                report.existing += 1;
                on_status(&Status::Exists(task.final_subtitle));
            }
            continue;
        }
        if !needed {
            report.existing += 1;
            on_status(&Status::Skip(task.final_subtitle));
            continue;
        }
        on_status(&Status::Create(task.final_subtitle.clone()));
        match process(config, tools, &task) {
            Ok(()) => report.created += 1,
            Err(err) => {
                error!("{}: {err} ({:?})", video.display(), err.kind());
                on_status(&Status::Failed(video.clone(), err.to_string()));
                report.failures.push(Failure {
                    video,
                    error: err.to_string(),
                });
            }
        }
    }
    Ok(report)
}

fn process<T: Toolchain>(config: &RunConfiguration, tools: &T, task: &FileTask) -> Result<()> {
    let audio = stage(task, tools, config.ffmpeg_threads)?;
    transcribe(task, &audio, tools, config.whisper_threads, !config.keep_temp)
}
