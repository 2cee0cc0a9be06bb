use super::error::EncodeError;
use super::process::EncoderRunner;
use super::settings::{SceneInfo, Settings};
use super::types::Operation;
use std::path::Path;
use tracing::{info, warn};

/// Input pattern for a numbered PNG sequence: `<dir>/%05d.png`
pub fn frame_pattern(frame_dir: &Path) -> String {
    frame_dir.join("%05d.png").to_string_lossy().into_owned()
}

/// Path of a single rendered frame, matching `frame_pattern`
pub fn frame_path(frame_dir: &Path, frame: u32) -> std::path::PathBuf {
    frame_dir.join(format!("{:05}.png", frame))
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Split user-provided extra arguments into tokens.
/// Uses shell-style parsing so quoted strings with spaces are preserved.
pub fn split_additional_args(additional_args: &str) -> Vec<String> {
    if additional_args.trim().is_empty() {
        return Vec::new();
    }

    match shlex::split(additional_args) {
        Some(args) => args,
        None => {
            // Unbalanced quotes: fall back to simple whitespace split
            warn!(
                extra_args = additional_args,
                "Could not parse extra arguments with shell quoting, splitting on whitespace"
            );
            additional_args
                .split_whitespace()
                .map(str::to_string)
                .collect()
        }
    }
}

fn push_input_args(args: &mut Vec<String>, settings: &Settings, scene: &SceneInfo) {
    match settings.operation {
        Operation::Reencode => {
            args.push("-i".into());
            args.push(path_arg(&settings.input));
        }
        Operation::Render | Operation::Encode => {
            args.push("-r".into());
            args.push(scene.fps.to_string());
            args.push("-start_number".into());
            args.push(scene.frame_start.to_string());
            args.push("-i".into());
            args.push(frame_pattern(&settings.frame_dir));
        }
    }
}

fn push_video_args(args: &mut Vec<String>, settings: &Settings) {
    args.push("-c:v".into());
    args.push(settings.codec.ffmpeg_encoder().into());

    let (speed_flag, speed_value) = settings.codec.speed_args(settings.preset);
    args.push(speed_flag.into());
    args.push(speed_value);

    if settings.constant_bitrate {
        let rate = &settings.bitrate;
        args.push("-b:v".into());
        args.push(format!("{}k", rate.target_kbps));
        args.push("-minrate".into());
        args.push(format!("{}k", rate.min_kbps));
        args.push("-maxrate".into());
        args.push(format!("{}k", rate.max_kbps));
        args.push("-bufsize".into());
        args.push(format!("{}k", rate.buffer_kb));
        args.push("-muxrate".into());
        args.push(format!("{}k", rate.mux_rate_kbps));
        args.push("-pkt_size".into());
        args.push(rate.mux_packet_bytes.to_string());
    } else {
        args.push("-crf".into());
        args.push(settings.crf.to_string());
    }

    args.push("-pix_fmt".into());
    args.push(settings.bit_depth.pix_fmt().into());
}

/// Build the full ffmpeg argument vector, program path first.
///
/// The order is fixed: program, `-y`, input clause, output rate, format,
/// video options (skipped for GIF), extra arguments, output path.
/// Assumes settings were validated; any combination still yields a vector.
pub fn build_ffmpeg_args(settings: &Settings, scene: &SceneInfo) -> Vec<String> {
    let mut args = vec![path_arg(&settings.ffmpeg_path), "-y".to_string()];

    push_input_args(&mut args, settings, scene);

    // Output rate is restated even though the input rate was already set
    args.push("-r".into());
    args.push(scene.fps.to_string());

    args.push("-f".into());
    args.push(settings.container.ffmpeg_format().into());

    if !settings.container.is_gif() {
        push_video_args(&mut args, settings);
    }

    args.extend(split_additional_args(&settings.extra_args));

    args.push(path_arg(&settings.output));
    args
}

/// Format an argument vector as a single line for display
pub fn format_ffmpeg_cmd(args: &[String]) -> String {
    args.iter()
        .map(|arg| {
            if arg.is_empty() || arg.chars().any(char::is_whitespace) {
                format!("\"{}\"", arg)
            } else {
                arg.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Build the command for the current settings and run it to completion
pub fn encode(
    settings: &Settings,
    scene: &SceneInfo,
    runner: &EncoderRunner,
) -> Result<Vec<String>, EncodeError> {
    let args = build_ffmpeg_args(settings, scene);
    info!(
        operation = %settings.operation,
        output = %settings.output.display(),
        "Encoding: {}",
        format_ffmpeg_cmd(&args)
    );
    runner.run(&args)?;
    Ok(args)
}
