//! Command line tests for subgen. None of these reach ffmpeg or whisper.cpp.

use assert_cmd::Command;
use rstest::rstest;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Model and (empty) executable living in a scratch directory.
fn tools(dir: &Path) -> (PathBuf, PathBuf) {
    let model = dir.join("ggml-base.en.bin");
    let exe = dir.join("whisper-main");
    fs::write(&model, "model").unwrap();
    fs::write(&exe, "").unwrap();
    (model, exe)
}

fn subgen(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("subgen").unwrap();
    cmd.arg("--log-dir")
        .arg(dir.join("logs"))
        .arg("--temp-dir")
        .arg(dir.join("tmp"))
        .arg("--ffmpeg")
        .arg(dir.join("missing-ffmpeg"));
    cmd
}

#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("subgen").unwrap();
    cmd.arg("--help");
    cmd.assert().success();
}

#[test]
fn test_requires_an_input() {
    let temp = TempDir::new().unwrap();
    let (model, exe) = tools(temp.path());
    let mut cmd = subgen(temp.path());
    cmd.arg("-m").arg(&model).arg("-e").arg(&exe);
    cmd.assert().failure();
}

#[test]
fn test_file_and_directory_are_exclusive() {
    let temp = TempDir::new().unwrap();
    let (model, exe) = tools(temp.path());
    let video = temp.path().join("clip.mp4");
    fs::write(&video, "x").unwrap();
    let mut cmd = subgen(temp.path());
    cmd.arg("-m")
        .arg(&model)
        .arg("-e")
        .arg(&exe)
        .arg("-f")
        .arg(&video)
        .arg("-d")
        .arg(temp.path());
    cmd.assert().failure();
}

/// Inputs without a video extension are rejected before anything runs.
#[rstest]
#[case("clip.txt")]
#[case("clip.srt")]
#[case("clip")]
fn test_rejects_non_video_file(#[case] name: &str) {
    let temp = TempDir::new().unwrap();
    let (model, exe) = tools(temp.path());
    let input = temp.path().join(name);
    fs::write(&input, "not a video").unwrap();

    let output = subgen(temp.path())
        .arg("-m")
        .arg(&model)
        .arg("-e")
        .arg(&exe)
        .arg("-f")
        .arg(&input)
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("valid video extension"), "{stderr}");
    assert!(String::from_utf8_lossy(&output.stdout).is_empty());
    assert!(!temp.path().join("logs").exists());
}

#[test]
fn test_dry_run_summary() {
    let temp = TempDir::new().unwrap();
    let (model, exe) = tools(temp.path());
    let videos = temp.path().join("videos");
    fs::create_dir(&videos).unwrap();
    fs::write(videos.join("a.mp4"), "x").unwrap();
    fs::write(videos.join("b.mkv"), "x").unwrap();
    fs::write(videos.join("b.en.srt"), "1\n").unwrap();
    fs::write(videos.join("notes.txt"), "x").unwrap();

    let output = subgen(temp.path())
        .arg("-m")
        .arg(&model)
        .arg("-e")
        .arg(&exe)
        .arg("-d")
        .arg(&videos)
        .arg("--dry-run")
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("CREATE:"), "{stdout}");
    assert!(stdout.contains("EXISTS:"), "{stdout}");
    assert!(stdout.contains("to create: 1"), "{stdout}");
    assert!(stdout.contains("existing: 1"), "{stdout}");
    assert!(!videos.join("a.en.srt").exists());
    assert!(!temp.path().join("logs").exists());
    assert!(!temp.path().join("tmp").exists());
}

#[test]
fn test_dry_run_json_report() {
    let temp = TempDir::new().unwrap();
    let (model, exe) = tools(temp.path());
    let videos = temp.path().join("videos");
    fs::create_dir_all(videos.join("season1")).unwrap();
    fs::write(videos.join("a.mp4"), "x").unwrap();
    fs::write(videos.join("season1/e1.webm"), "x").unwrap();

    let output = subgen(temp.path())
        .arg("-m")
        .arg(&model)
        .arg("-e")
        .arg(&exe)
        .arg("-d")
        .arg(&videos)
        .arg("--recursive")
        .arg("--dry-run")
        .arg("--json")
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let start = stdout.find('{').unwrap();
    let report: serde_json::Value = serde_json::from_str(&stdout[start..]).unwrap();
    assert_eq!(report["dry_run"], true);
    assert_eq!(report["created"], 2);
    assert_eq!(report["existing"], 0);
}

/// An existing subtitle is skipped without spawning any tool; the ffmpeg
/// path points nowhere, so any spawn would show up as a failure.
#[test]
fn test_skips_existing_subtitle() {
    let temp = TempDir::new().unwrap();
    let (model, exe) = tools(temp.path());
    let video = temp.path().join("clip.webm");
    fs::write(&video, "x").unwrap();
    fs::write(temp.path().join("clip.en.srt"), "1\n").unwrap();

    let output = subgen(temp.path())
        .arg("-m")
        .arg(&model)
        .arg("-e")
        .arg(&exe)
        .arg("-f")
        .arg(&video)
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("SKIP:\tclip.en.srt is present"), "{stdout}");
    assert!(stdout.contains("failed: 0"), "{stdout}");
    assert!(!temp.path().join("logs").exists());
}

#[test]
fn test_tool_failure_sets_exit_code() {
    let temp = TempDir::new().unwrap();
    let (model, exe) = tools(temp.path());
    let video = temp.path().join("clip.mp4");
    fs::write(&video, "x").unwrap();

    let output = subgen(temp.path())
        .arg("-m")
        .arg(&model)
        .arg("-e")
        .arg(&exe)
        .arg("-f")
        .arg(&video)
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("CREATE:"), "{stdout}");
    assert!(stdout.contains("FAILED:"), "{stdout}");
    assert!(stdout.contains("failed: 1"), "{stdout}");
}

#[test]
fn test_no_discoverable_executable() {
    let temp = TempDir::new().unwrap();
    let models = temp.path().join("whisper/models");
    fs::create_dir_all(&models).unwrap();
    let model = models.join("ggml-base.en.bin");
    fs::write(&model, "model").unwrap();
    let video = temp.path().join("clip.mp4");
    fs::write(&video, "x").unwrap();

    let output = subgen(temp.path())
        .arg("-m")
        .arg(&model)
        .arg("-f")
        .arg(&video)
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no executable found"), "{stderr}");
}
