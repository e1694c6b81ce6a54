//! Audio staging: turn a video into the temporary WAV whisper.cpp reads.

use crate::error::{Result, SubgenError};
use crate::task::FileTask;
use crate::tools::Toolchain;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace};

/// A temporary WAV produced for one video.
#[derive(Debug)]
pub struct StagedAudio {
    path: PathBuf,
}

impl StagedAudio {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the temporary WAV. A file that is already gone is fine.
    pub fn cleanup(&self) -> Result<()> {
        remove_if_present(&self.path)
    }
}

/// Remove `path`, treating a missing file as success.
pub(crate) fn remove_if_present(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(SubgenError::fs(path, e)),
    }
}

/// Extract the audio track of `task.video` into `task.temp_audio`.
/// A stale WAV from an earlier run is removed first. The extractor must leave
/// a file behind, otherwise this is reported as a tool failure.
pub fn stage<T: Toolchain>(task: &FileTask, tools: &T, threads: usize) -> Result<StagedAudio> {
    trace!(
        "stage(video={}, threads={}): writing {}",
        task.video.display(),
        threads,
        task.temp_audio.display()
    );
    if let Some(dir) = task.temp_audio.parent() {
        fs::create_dir_all(dir).map_err(|e| SubgenError::fs(dir, e))?;
    }
    if task.temp_audio.exists() {
        debug!("removing stale {}", task.temp_audio.display());
        remove_if_present(&task.temp_audio)?;
    }
    info!("WAV:\t{}", task.temp_audio.display());
    tools.extract_audio(&task.video, &task.temp_audio, threads)?;
    if !task.temp_audio.is_file() {
        return Err(SubgenError::MissingOutput {
            tool: tools.extractor_name(),
            path: task.temp_audio.clone(),
        });
    }
    Ok(StagedAudio {
        path: task.temp_audio.clone(),
    })
}
