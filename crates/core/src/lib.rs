//! Core library for turning video files into `.en.srt` subtitles.
//! It derives the per-file paths, drives ffmpeg and whisper.cpp as external
//! processes and walks input directories in batch.

pub mod audio;
pub mod batch;
pub mod config;
pub mod error;
pub mod task;
pub mod tools;
pub mod transcribe;

pub use batch::{run, Failure, Report, Status};
pub use config::{InputTarget, RunConfiguration, RunOptions};
pub use error::{ErrorKind, Result, SubgenError};
pub use task::{FileTask, Workspace};
pub use tools::{ExternalTools, Toolchain};
