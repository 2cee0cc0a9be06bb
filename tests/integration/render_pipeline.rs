// Render mode: frames go to a directory, the encoder runs, the directory is cleaned up

use crate::common::helpers::*;
use ffexport::engine::{EncodeError, FrameProgress, Settings, render_and_encode};
use std::path::Path;
use tempfile::TempDir;

#[cfg(unix)]
#[test]
fn test_temporary_frames_removed_after_success() {
    let out = TempDir::new().unwrap();
    let settings = render_settings("true", &out.path().join("out.mkv"));
    let mut renderer = RecordingRenderer::default();

    let summary = render_and_encode(
        &settings,
        &scene(24.0, 1, 3),
        &mut renderer,
        &quiet_runner(),
        &mut ignore_progress(),
    )
    .unwrap();

    assert_eq!(summary.frames_rendered, 3);
    assert!(summary.retained_frame_dir.is_none());
    assert!(summary.cleanup_warning.is_none());

    let frame_dir = renderer.frame_dir().unwrap().to_path_buf();
    assert_eq!(renderer.paths[0], frame_dir.join("00001.png"));
    assert_eq!(renderer.paths[2], frame_dir.join("00003.png"));
    assert!(!frame_dir.exists(), "temporary frames were left behind");

    // the encoder read from the directory the frames were written to
    let pattern = frame_dir.join("%05d.png");
    assert!(summary.args.iter().any(|a| Path::new(a) == pattern));
}

#[cfg(unix)]
#[test]
fn test_temporary_frames_removed_after_encoder_failure() {
    let out = TempDir::new().unwrap();
    let settings = render_settings("false", &out.path().join("out.mkv"));
    let mut renderer = RecordingRenderer::default();

    let err = render_and_encode(
        &settings,
        &scene(24.0, 1, 2),
        &mut renderer,
        &quiet_runner(),
        &mut ignore_progress(),
    )
    .unwrap_err();

    assert_eq!(err.exit_code(), Some(1));
    assert!(err.to_string().contains("ffmpeg exited with exit code 1"));
    assert!(!renderer.frame_dir().unwrap().exists());
}

#[test]
fn test_render_failure_skips_encoder_and_cleans_up() {
    let out = TempDir::new().unwrap();
    // would fail with EncoderNotFound if the encoder were started
    let settings = render_settings("/nonexistent/ffmpeg-binary", &out.path().join("out.mkv"));
    let mut renderer = RecordingRenderer {
        fail_on: Some(3),
        ..Default::default()
    };

    let err = render_and_encode(
        &settings,
        &scene(24.0, 1, 5),
        &mut renderer,
        &quiet_runner(),
        &mut ignore_progress(),
    )
    .unwrap_err();

    assert!(matches!(err, EncodeError::Render { frame: 3, .. }));
    assert_eq!(renderer.paths.len(), 2);
    assert!(!renderer.frame_dir().unwrap().exists());
}

#[cfg(unix)]
#[test]
fn test_stored_frames_are_kept() {
    let work = TempDir::new().unwrap();
    let frame_dir = work.path().join("frames").join("shot_010");
    let settings = Settings {
        store_frames: true,
        frame_dir: frame_dir.clone(),
        ..render_settings("true", &work.path().join("out.mkv"))
    };
    let mut renderer = RecordingRenderer::default();

    let summary = render_and_encode(
        &settings,
        &scene(24.0, 5, 6),
        &mut renderer,
        &quiet_runner(),
        &mut ignore_progress(),
    )
    .unwrap();

    assert_eq!(summary.retained_frame_dir.as_deref(), Some(frame_dir.as_path()));
    assert!(frame_dir.join("00005.png").is_file());
    assert!(frame_dir.join("00006.png").is_file());
    assert!(summary.args.iter().any(|a| a == "5"), "start number missing");
}

#[cfg(unix)]
#[test]
fn test_stored_frames_kept_after_encoder_failure() {
    let work = TempDir::new().unwrap();
    let frame_dir = work.path().join("frames");
    let settings = Settings {
        store_frames: true,
        frame_dir: frame_dir.clone(),
        ..render_settings("false", &work.path().join("out.mkv"))
    };

    let err = render_and_encode(
        &settings,
        &scene(24.0, 1, 1),
        &mut RecordingRenderer::default(),
        &quiet_runner(),
        &mut ignore_progress(),
    )
    .unwrap_err();

    assert!(matches!(err, EncodeError::EncoderExit { .. }));
    assert!(frame_dir.join("00001.png").is_file());
}

#[cfg(unix)]
#[test]
fn test_encoder_sees_every_frame() {
    let work = TempDir::new().unwrap();
    let ffmpeg = fake_ffmpeg(work.path(), 0);
    let settings = render_settings(
        &ffmpeg.to_string_lossy(),
        &work.path().join("out.mkv"),
    );

    render_and_encode(
        &settings,
        &scene(25.0, 1, 4),
        &mut RecordingRenderer::default(),
        &quiet_runner(),
        &mut ignore_progress(),
    )
    .unwrap();

    assert_eq!(
        read_lines(&work.path().join("frames.txt")),
        ["00001.png", "00002.png", "00003.png", "00004.png"]
    );
    let args = read_lines(&work.path().join("args.txt"));
    assert_eq!(args[..5], ["-y", "-r", "25", "-start_number", "1"]);
    assert_eq!(args.last().unwrap(), &work.path().join("out.mkv").to_string_lossy());
}

#[cfg(unix)]
#[test]
fn test_progress_reported_per_frame() {
    let out = TempDir::new().unwrap();
    let settings = render_settings("true", &out.path().join("out.mkv"));
    let mut updates: Vec<FrameProgress> = Vec::new();

    render_and_encode(
        &settings,
        &scene(24.0, 10, 13),
        &mut RecordingRenderer::default(),
        &quiet_runner(),
        &mut |p| updates.push(p),
    )
    .unwrap();

    let frames: Vec<u32> = updates.iter().map(|p| p.frame).collect();
    assert_eq!(frames, [10, 11, 12, 13]);
    assert!(updates.iter().all(|p| p.total == 4));
    assert_eq!(updates.last().unwrap().pct(), 100.0);
}

#[cfg(unix)]
#[test]
fn test_cleanup_failure_is_only_a_warning() {
    let work = TempDir::new().unwrap();
    let ffmpeg = fake_ffmpeg_removing_frames(work.path(), 0);
    let settings = render_settings(&ffmpeg.to_string_lossy(), &work.path().join("out.mkv"));
    let mut renderer = RecordingRenderer::default();

    let summary = render_and_encode(
        &settings,
        &scene(24.0, 1, 2),
        &mut renderer,
        &quiet_runner(),
        &mut ignore_progress(),
    )
    .unwrap();

    assert_eq!(summary.frames_rendered, 2);
    match summary.cleanup_warning {
        Some(EncodeError::Cleanup { path, .. }) => {
            assert_eq!(Some(path.as_path()), renderer.frame_dir())
        }
        other => panic!("expected a cleanup warning, got {other:?}"),
    }
}

#[cfg(unix)]
#[test]
fn test_cleanup_failure_keeps_encoder_error() {
    let work = TempDir::new().unwrap();
    let ffmpeg = fake_ffmpeg_removing_frames(work.path(), 4);
    let settings = render_settings(&ffmpeg.to_string_lossy(), &work.path().join("out.mkv"));

    let err = render_and_encode(
        &settings,
        &scene(24.0, 1, 2),
        &mut RecordingRenderer::default(),
        &quiet_runner(),
        &mut ignore_progress(),
    )
    .unwrap_err();

    assert!(matches!(err, EncodeError::EncoderExit { code: Some(4), .. }));
    assert_eq!(err.exit_code(), Some(4));
}
