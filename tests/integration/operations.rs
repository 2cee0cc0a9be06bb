// run_operation dispatch and the command-line renderer

use crate::common::helpers::*;
use ffexport::engine::{
    CommandRenderer, EncodeError, FrameRenderer, Operation, Settings, run_operation,
};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_render_without_renderer() {
    let settings = render_settings("ffmpeg", &PathBuf::from("out.mkv"));
    let err = run_operation(
        &settings,
        &scene(24.0, 1, 2),
        None,
        &quiet_runner(),
        &mut ignore_progress(),
    )
    .unwrap_err();
    assert!(matches!(err, EncodeError::RendererMissing));
}

#[test]
fn test_encode_requires_frame_dir() {
    let work = TempDir::new().unwrap();
    let settings = Settings {
        frame_dir: work.path().join("missing"),
        ..encode_settings()
    };
    let err = run_operation(
        &settings,
        &scene(24.0, 1, 2),
        None,
        &quiet_runner(),
        &mut ignore_progress(),
    )
    .unwrap_err();
    assert!(matches!(err, EncodeError::FrameDirMissing { path } if path == work.path().join("missing")));
}

#[test]
fn test_reencode_requires_input() {
    let work = TempDir::new().unwrap();
    let settings = Settings {
        input: work.path().join("nope.mkv"),
        ..reencode_settings()
    };
    let err = run_operation(
        &settings,
        &scene(24.0, 1, 2),
        None,
        &quiet_runner(),
        &mut ignore_progress(),
    )
    .unwrap_err();
    assert!(matches!(err, EncodeError::InputMissing { .. }));
}

#[test]
fn test_missing_encoder_binary() {
    let work = TempDir::new().unwrap();
    fs::write(work.path().join("in.mkv"), b"video").unwrap();
    let settings = Settings {
        ffmpeg_path: PathBuf::from("/nonexistent/bin/ffmpeg"),
        input: work.path().join("in.mkv"),
        output: work.path().join("out.mkv"),
        ..reencode_settings()
    };
    let err = run_operation(
        &settings,
        &scene(24.0, 1, 2),
        None,
        &quiet_runner(),
        &mut ignore_progress(),
    )
    .unwrap_err();
    assert!(matches!(err, EncodeError::EncoderNotFound { .. }));
    assert_eq!(err.exit_code(), None);
}

#[cfg(unix)]
#[test]
fn test_reencode_runs_encoder() {
    let work = TempDir::new().unwrap();
    fs::write(work.path().join("in.mkv"), b"video").unwrap();
    let ffmpeg = fake_ffmpeg(work.path(), 0);
    let settings = Settings {
        ffmpeg_path: ffmpeg,
        input: work.path().join("in.mkv"),
        output: work.path().join("out.mkv"),
        ..reencode_settings()
    };

    let summary = run_operation(
        &settings,
        &scene(24.0, 1, 2),
        None,
        &quiet_runner(),
        &mut ignore_progress(),
    )
    .unwrap();

    assert_eq!(summary.frames_rendered, 0);
    let recorded = read_lines(&work.path().join("args.txt"));
    assert_eq!(recorded, summary.args[1..]);
    assert_eq!(recorded[..2], ["-y", "-i"]);
}

#[cfg(unix)]
#[test]
fn test_encode_reports_exit_code() {
    let work = TempDir::new().unwrap();
    let ffmpeg = fake_ffmpeg(work.path(), 3);
    let settings = Settings {
        ffmpeg_path: ffmpeg,
        frame_dir: work.path().to_path_buf(),
        output: work.path().join("out.mp4"),
        ..encode_settings()
    };

    let err = run_operation(
        &settings,
        &scene(24.0, 1, 2),
        None,
        &quiet_runner(),
        &mut ignore_progress(),
    )
    .unwrap_err();

    assert_eq!(err.exit_code(), Some(3));
    match err {
        EncodeError::EncoderExit { args, .. } => {
            assert_eq!(args.last().unwrap(), &work.path().join("out.mp4").to_string_lossy())
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[cfg(unix)]
#[test]
fn test_stderr_tail_attached_to_failure() {
    let work = TempDir::new().unwrap();
    fs::write(work.path().join("in.mkv"), b"video").unwrap();
    let settings = Settings {
        ffmpeg_path: PathBuf::from("sh"),
        input: work.path().join("in.mkv"),
        ..reencode_settings()
    };
    // "sh -y" is rejected by the shell, which complains on stderr
    let err = run_operation(
        &settings,
        &scene(24.0, 1, 2),
        None,
        &quiet_runner(),
        &mut ignore_progress(),
    )
    .unwrap_err();

    match err {
        EncodeError::EncoderExit { stderr_tail, code, .. } => {
            assert_ne!(code, Some(0));
            assert!(stderr_tail.is_some());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[cfg(unix)]
#[test]
fn test_command_renderer_writes_frames() {
    let work = TempDir::new().unwrap();
    let mut renderer = CommandRenderer::new(r#"sh -c 'printf "frame %s" "$1" > "$2"' render {frame} {output}"#)
        .unwrap();
    renderer.quiet = true;

    let path = work.path().join("00042.png");
    renderer.render_frame(42, &path).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "frame 42");
}

#[cfg(unix)]
#[test]
fn test_command_renderer_failure() {
    let work = TempDir::new().unwrap();
    let mut renderer = CommandRenderer::new("false {output}").unwrap();
    let err = renderer
        .render_frame(1, &work.path().join("00001.png"))
        .unwrap_err();
    assert!(err.to_string().contains("Render command exited"));
}

#[cfg(unix)]
#[test]
fn test_render_operation_with_command_renderer() {
    let work = TempDir::new().unwrap();
    let frame_dir = work.path().join("frames");
    let settings = Settings {
        operation: Operation::Render,
        store_frames: true,
        frame_dir: frame_dir.clone(),
        ..render_settings("true", &work.path().join("out.webm"))
    };
    let mut renderer = CommandRenderer::new("touch {output}").unwrap();

    let summary = run_operation(
        &settings,
        &scene(24.0, 1, 3),
        Some(&mut renderer),
        &quiet_runner(),
        &mut ignore_progress(),
    )
    .unwrap();

    assert_eq!(summary.frames_rendered, 3);
    assert!(frame_dir.join("00003.png").is_file());
}
