//! Run configuration: validation of what the user asked for.
//! Everything here fails fast, before any file is processed.

use crate::error::{Result, SubgenError};
use crate::task::Workspace;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

/// Extensions accepted as video input, compared case-insensitively.
pub const VIDEO_EXTENSIONS: [&str; 4] = ["mp4", "mkv", "avi", "webm"];

/// Default thread count handed to ffmpeg.
pub const DEFAULT_FFMPEG_THREADS: usize = 2;

/// Whether `path` carries one of the accepted video extensions.
pub fn is_video(path: &Path) -> bool {
    path.extension()
        .map(|e| {
            VIDEO_EXTENSIONS
                .iter()
                .any(|v| e.eq_ignore_ascii_case(v))
        })
        .unwrap_or(false)
}

/// What the user pointed us at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputTarget {
    File(PathBuf),
    Directory { path: PathBuf, recursive: bool },
}

/// Raw, unvalidated options as collected from the command line.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub model: PathBuf,
    pub executable: Option<PathBuf>,
    pub ffmpeg: PathBuf,
    pub whisper_threads: Option<usize>,
    pub ffmpeg_threads: usize,
    pub force: bool,
    pub dry_run: bool,
    pub keep_temp: bool,
    pub target: InputTarget,
    pub workspace: Workspace,
}

/// Validated configuration, read-only for the rest of the run.
#[derive(Debug, Clone)]
pub struct RunConfiguration {
    pub model: PathBuf,
    pub executable: PathBuf,
    pub ffmpeg: PathBuf,
    pub whisper_threads: usize,
    pub ffmpeg_threads: usize,
    pub force: bool,
    pub dry_run: bool,
    pub keep_temp: bool,
    pub target: InputTarget,
    pub workspace: Workspace,
}

impl RunConfiguration {
    /// Validate `opts` against the machine this runs on.
    pub fn resolve(opts: RunOptions) -> Result<Self> {
        Self::resolve_with_cpus(opts, num_cpus::get())
    }

    /// Same as `resolve` with an explicit logical CPU count.
    pub fn resolve_with_cpus(opts: RunOptions, cpus: usize) -> Result<Self> {
        trace!("resolve_with_cpus(opts={:?}, cpus={})", opts, cpus);
        validate_target(&opts.target)?;
        if !opts.model.is_file() {
            return Err(SubgenError::Configuration(format!(
                "model file {} does not exist",
                opts.model.display()
            )));
        }
        let executable = match opts.executable {
            Some(exe) if exe.is_file() => exe,
            Some(exe) => {
                return Err(SubgenError::Configuration(format!(
                    "executable {} is not a file",
                    exe.display()
                )))
            }
            None => discover_executable(&opts.model)?,
        };
        debug!("using whisper.cpp executable {}", executable.display());
        Ok(Self {
            model: opts.model,
            executable,
            ffmpeg: opts.ffmpeg,
            whisper_threads: clamp_threads(
                "whisper_threads",
                opts.whisper_threads.unwrap_or(cpus),
                cpus,
            ),
            ffmpeg_threads: clamp_threads("ffmpeg_threads", opts.ffmpeg_threads, cpus),
            force: opts.force,
            dry_run: opts.dry_run,
            keep_temp: opts.keep_temp,
            target: opts.target,
            workspace: opts.workspace,
        })
    }
}

/// Clamp a requested thread count to the available CPUs.
/// Out of range values (zero or more than `cpus`) fall back to `cpus` with a warning.
pub fn clamp_threads(name: &str, requested: usize, cpus: usize) -> usize {
    let cpus = cpus.max(1);
    if requested == 0 || requested > cpus {
        warn!("{name} ({requested}) is out of range, using the number of CPU cores ({cpus})");
        cpus
    } else {
        requested
    }
}

fn validate_target(target: &InputTarget) -> Result<()> {
    match target {
        InputTarget::File(path) => {
            if !path.is_file() {
                return Err(SubgenError::Configuration(format!(
                    "input file {} does not exist",
                    path.display()
                )));
            }
            if !is_video(path) {
                return Err(SubgenError::Configuration(format!(
                    "input file {} does not have a valid video extension, valid extensions are: {}",
                    path.display(),
                    VIDEO_EXTENSIONS.map(|e| format!(".{e}")).join(", ")
                )));
            }
        }
        InputTarget::Directory { path, .. } => {
            if !path.is_dir() {
                return Err(SubgenError::Configuration(format!(
                    "input directory {} does not exist",
                    path.display()
                )));
            }
        }
    }
    Ok(())
}

/// Parent of `path` the way a shell sees it: a bare file name lives in `.`
/// and the root is its own parent.
fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if p.as_os_str().is_empty() => Path::new("."),
        Some(p) => p,
        None => path,
    }
}

/// Directory scanned for an executable: the model's grandparent.
pub fn executable_search_dir(model: &Path) -> PathBuf {
    parent_dir(parent_dir(model)).to_path_buf()
}

/// Find the whisper.cpp executable next to the model.
/// The way this works is by scanning the model's grandparent directory, in
/// name order, for the first regular file with execute permission. This is a
/// convenience; an explicit path is preferred.
pub fn discover_executable(model: &Path) -> Result<PathBuf> {
    let dir = executable_search_dir(model);
    trace!("discover_executable(model={}): scanning {}", model.display(), dir.display());
    let mut entries: Vec<PathBuf> = fs::read_dir(&dir)
        .map_err(|e| SubgenError::fs(&dir, e))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect();
    entries.sort();
    let found = entries.into_iter().find(|p| is_executable(p));
    match found {
        Some(exe) => {
            warn!(
                "no executable given, picked {}; pass --executable to be explicit",
                exe.display()
            );
            Ok(exe)
        }
        None => Err(SubgenError::Configuration(format!(
            "no executable found in {}, pass --executable",
            dir.display()
        ))),
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .map(|e| e.eq_ignore_ascii_case("exe"))
            .unwrap_or(false)
}
