//! External collaborators: ffmpeg for audio extraction and the whisper.cpp
//! executable for transcription. Both run as blocking child processes.

use crate::config::RunConfiguration;
use crate::error::{Result, SubgenError};
use std::ffi::OsString;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, trace};

/// The two external programs the pipeline drives.
pub trait Toolchain {
    /// Name of the audio extractor, used in error reports.
    fn extractor_name(&self) -> String;

    /// Name of the transcription program, used in error reports.
    fn transcriber_name(&self) -> String;

    /// Convert `video` into a 16 kHz mono PCM WAV at `output`.
    fn extract_audio(&self, video: &Path, output: &Path, threads: usize) -> Result<()>;

    /// Transcribe `audio` with its standard streams attached to `stdout` and
    /// `stderr`. The tool writes `<audio>.srt` next to its input.
    fn transcribe(&self, audio: &Path, threads: usize, stdout: File, stderr: File) -> Result<()>;
}

/// Build the ffmpeg arguments to produce whisper-compatible audio.
/// Paths are passed through as-is so non UTF-8 names survive.
pub fn ffmpeg_args(video: &Path, output: &Path, threads: usize) -> Vec<OsString> {
    vec![
        "-loglevel".into(),
        "quiet".into(),
        "-threads".into(),
        threads.to_string().into(),
        "-i".into(),
        video.as_os_str().to_os_string(),
        "-ar".into(),
        "16000".into(),
        "-ac".into(),
        "1".into(),
        "-c:a".into(),
        "pcm_s16le".into(),
        output.as_os_str().to_os_string(),
    ]
}

/// Build the whisper.cpp arguments for an SRT transcription of `audio`.
pub fn whisper_args(model: &Path, audio: &Path, threads: usize) -> Vec<OsString> {
    vec![
        "--model".into(),
        model.as_os_str().to_os_string(),
        "--print-colors".into(),
        "--output-srt".into(),
        "--threads".into(),
        threads.to_string().into(),
        "--file".into(),
        audio.as_os_str().to_os_string(),
    ]
}

/// Real processes, as configured for this run.
#[derive(Debug, Clone)]
pub struct ExternalTools {
    pub ffmpeg: PathBuf,
    pub whisper: PathBuf,
    pub model: PathBuf,
}

impl ExternalTools {
    pub fn from_config(config: &RunConfiguration) -> Self {
        Self {
            ffmpeg: config.ffmpeg.clone(),
            whisper: config.executable.clone(),
            model: config.model.clone(),
        }
    }
}

/// Short name of a program path, e.g. `ffmpeg` for `/usr/bin/ffmpeg`.
pub fn tool_name(program: &Path) -> String {
    program
        .file_name()
        .unwrap_or(program.as_os_str())
        .to_string_lossy()
        .to_string()
}

impl Toolchain for ExternalTools {
    fn extractor_name(&self) -> String {
        tool_name(&self.ffmpeg)
    }

    fn transcriber_name(&self) -> String {
        tool_name(&self.whisper)
    }

    fn extract_audio(&self, video: &Path, output: &Path, threads: usize) -> Result<()> {
        let tool = self.extractor_name();
        let args = ffmpeg_args(video, output, threads);
        trace!("extract_audio: {} {:?}", self.ffmpeg.display(), args);
        let out = Command::new(&self.ffmpeg)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| SubgenError::Spawn {
                tool: tool.clone(),
                source,
            })?;
        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr);
            let detail = stderr
                .lines()
                .rev()
                .find(|l| !l.trim().is_empty())
                .map(|l| format!(": {}", l.trim()))
                .unwrap_or_default();
            return Err(SubgenError::ToolExit {
                tool,
                status: out.status,
                detail,
            });
        }
        debug!("{tool} finished for {}", video.display());
        Ok(())
    }

    fn transcribe(&self, audio: &Path, threads: usize, stdout: File, stderr: File) -> Result<()> {
        let tool = self.transcriber_name();
        let args = whisper_args(&self.model, audio, threads);
        trace!("transcribe: {} {:?}", self.whisper.display(), args);
        let status = Command::new(&self.whisper)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr))
            .status()
            .map_err(|source| SubgenError::Spawn {
                tool: tool.clone(),
                source,
            })?;
        if !status.success() {
            return Err(SubgenError::ToolExit {
                tool,
                status,
                detail: String::new(),
            });
        }
        debug!("{tool} finished for {}", audio.display());
        Ok(())
    }
}
