//! Per-file path derivation and the "is there work to do" check.
//! Nothing in here touches the filesystem except `should_transcribe`.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::trace;

/// Directories shared by every file of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    /// Where the intermediate WAV and raw transcript live.
    pub temp_dir: PathBuf,
    /// Where the transcription logs are written.
    pub logs_dir: PathBuf,
}

impl Default for Workspace {
    fn default() -> Self {
        Self {
            temp_dir: std::env::temp_dir(),
            logs_dir: PathBuf::from("logs"),
        }
    }
}

impl Workspace {
    /// Temporary 16 kHz mono WAV for `video`.
    pub fn temp_audio_path(&self, video: &Path) -> PathBuf {
        self.temp_dir.join(stem_with(video, ".wav"))
    }

    /// Transcript whisper.cpp writes next to the temporary WAV.
    pub fn temp_transcript_path(&self, video: &Path) -> PathBuf {
        self.temp_dir.join(stem_with(video, ".wav.srt"))
    }

    pub fn log_file_path(&self, video: &Path) -> PathBuf {
        self.logs_dir.join(stem_with(video, ".log"))
    }
}

/// The subtitle we deliver, always a sibling of the video.
pub fn final_subtitle_path(video: &Path) -> PathBuf {
    video.with_file_name(stem_with(video, ".en.srt"))
}

/// Decide whether `video` still needs a subtitle.
/// Returns true when `force` is set or when the final subtitle is missing.
pub fn should_transcribe(video: &Path, force: bool) -> bool {
    let target = final_subtitle_path(video);
    trace!(
        "should_transcribe(video={}, force={}): checking {}",
        video.display(),
        force,
        target.display()
    );
    force || !target.exists()
}

/// The file stem of `video` followed by `suffix`, without lossy conversion.
fn stem_with(video: &Path, suffix: &str) -> OsString {
    let mut name = video.file_stem().unwrap_or_default().to_os_string();
    name.push(suffix);
    name
}

/// All paths involved in turning one video into a subtitle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTask {
    pub video: PathBuf,
    pub temp_audio: PathBuf,
    pub temp_transcript: PathBuf,
    pub final_subtitle: PathBuf,
    pub log_file: PathBuf,
}

impl FileTask {
    pub fn new(video: &Path, workspace: &Workspace) -> Self {
        Self {
            video: video.to_path_buf(),
            temp_audio: workspace.temp_audio_path(video),
            temp_transcript: workspace.temp_transcript_path(video),
            final_subtitle: final_subtitle_path(video),
            log_file: workspace.log_file_path(video),
        }
    }
}
