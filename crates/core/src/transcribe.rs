//! Transcription of a staged WAV and relocation of the resulting subtitle.

use crate::audio::{remove_if_present, StagedAudio};
use crate::error::{Result, SubgenError};
use crate::task::FileTask;
use crate::tools::Toolchain;
use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, info, trace};

/// Run the transcription tool for `task` and move its subtitle into place.
/// This function should log all tool output to `task.log_file`, then move
/// `task.temp_transcript` to `task.final_subtitle` and, when `cleanup` is
/// set, remove the temporary WAV.
pub fn transcribe<T: Toolchain>(
    task: &FileTask,
    audio: &StagedAudio,
    tools: &T,
    threads: usize,
    cleanup: bool,
) -> Result<()> {
    trace!(
        "transcribe(audio={}, threads={}, cleanup={})",
        audio.path().display(),
        threads,
        cleanup
    );
    if let Some(dir) = task.log_file.parent() {
        fs::create_dir_all(dir).map_err(|e| SubgenError::fs(dir, e))?;
    }
    {
        let log_err = |e| SubgenError::fs(&task.log_file, e);
        let stdout = File::create(&task.log_file).map_err(log_err)?;
        let stderr = stdout.try_clone().map_err(log_err)?;
        tools.transcribe(audio.path(), threads, stdout, stderr)?;
    }
    debug!("transcription log at {}", task.log_file.display());

    relocate(
        &task.temp_transcript,
        &task.final_subtitle,
        &tools.transcriber_name(),
    )?;
    info!("wrote {}", task.final_subtitle.display());

    if cleanup {
        audio.cleanup()?;
    }
    Ok(())
}

/// Move `from` to `to`, copying when a plain rename cannot cross filesystems.
fn relocate(from: &Path, to: &Path, tool: &str) -> Result<()> {
    trace!("relocate(from={}, to={})", from.display(), to.display());
    if !from.is_file() {
        return Err(SubgenError::MissingOutput {
            tool: tool.to_string(),
            path: from.to_path_buf(),
        });
    }
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(SubgenError::fs(to, e)),
        Err(e) => {
            debug!("rename failed ({e}), copying instead");
            fs::copy(from, to).map_err(|e| SubgenError::fs(to, e))?;
            remove_if_present(from)
        }
    }
}
