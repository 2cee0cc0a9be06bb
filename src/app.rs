use crate::cli::{Cli, Commands, SettingsArgs};
use anyhow::{Context, Result};
use ffexport::engine::{
    self, CommandRenderer, EncodeError, EncoderRunner, FrameProgress, FrameRenderer, Operation,
    SceneInfo, Settings,
};
use ffexport::{config, logging};
use std::path::{Path, PathBuf};
use std::process;
use tracing::{info, warn};

pub fn run(cli: Cli) {
    let config = config::Config::load().unwrap_or_else(|e| {
        eprintln!("Warning: {:#}", e);
        config::Config::default()
    });

    let level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        config.logging.level.as_str()
    };
    if let Err(e) = logging::init(level) {
        eprintln!("Warning: Could not initialise logging: {:#}", e);
    }

    let quiet = cli.quiet;
    let result = match cli.command {
        Commands::Render {
            render_cmd,
            settings,
        } => handle_render(&config, &settings, &render_cmd, quiet),
        Commands::Encode { settings } => {
            handle_export(&config, &settings, Operation::Encode, quiet)
        }
        Commands::Reencode { settings } => {
            handle_export(&config, &settings, Operation::Reencode, quiet)
        }
        Commands::DryRun {
            operation,
            json,
            settings,
        } => handle_dry_run(&config, &settings, operation, json),
        Commands::Codecs { container } => {
            handle_codecs(container);
            Ok(())
        }
        Commands::CheckFfmpeg { ffmpeg } => handle_check_ffmpeg(&config, ffmpeg),
        Commands::ShowSettings { settings } => handle_show_settings(&config, &settings),
        Commands::SaveSettings { file, settings } => {
            handle_save_settings(&config, &settings, &file)
        }
        Commands::InitConfig => {
            handle_init_config();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        if let Some(EncodeError::EncoderExit {
            stderr_tail: Some(tail),
            ..
        }) = e.downcast_ref::<EncodeError>()
        {
            eprintln!("Last ffmpeg output:\n{}", tail);
        }
        // Surface the encoder's own exit code when that is what failed
        let code = e
            .downcast_ref::<EncodeError>()
            .and_then(EncodeError::exit_code)
            .filter(|c| *c != 0)
            .unwrap_or(1);
        process::exit(code);
    }
}

/// Merge config defaults, the project settings file and command-line flags
pub fn resolve_settings(
    config: &config::Config,
    args: &SettingsArgs,
    operation: Operation,
) -> Result<(Settings, SceneInfo)> {
    let mut settings = match &args.settings {
        Some(path) => Settings::load(path)?,
        None => config.defaults.clone(),
    };
    settings.operation = operation;

    if let Some(output) = &args.output {
        settings.output = output.clone();
    }
    if let Some(input) = &args.input {
        settings.input = input.clone();
    }
    if let Some(frame_dir) = &args.frame_dir {
        settings.frame_dir = frame_dir.clone();
    }
    if args.store_frames {
        settings.store_frames = true;
    }
    if let Some(ffmpeg) = &args.ffmpeg {
        settings.ffmpeg_path = ffmpeg.clone();
    }
    if let Some(container) = args.container {
        settings.container = container;
    }
    if let Some(codec) = args.codec {
        settings.codec = codec;
    }
    if let Some(bit_depth) = args.bit_depth {
        settings.bit_depth = bit_depth;
    }
    if let Some(preset) = args.preset {
        settings.preset = preset;
    }
    if let Some(crf) = args.crf {
        settings.crf = crf;
        settings.constant_bitrate = false;
    }
    if args.constant_bitrate {
        settings.constant_bitrate = true;
    }

    let rate = &mut settings.bitrate;
    let bitrate_overrides = [
        (args.bitrate, &mut rate.target_kbps),
        (args.min_bitrate, &mut rate.min_kbps),
        (args.max_bitrate, &mut rate.max_kbps),
        (args.buffer, &mut rate.buffer_kb),
        (args.mux_rate, &mut rate.mux_rate_kbps),
        (args.mux_packet, &mut rate.mux_packet_bytes),
    ];
    for (value, field) in bitrate_overrides {
        if let Some(value) = value {
            *field = value;
        }
    }

    if let Some(params) = &args.params {
        settings.extra_args = params.clone();
    }

    // Choices that were not given explicitly follow the container, like the
    // dependent dropdowns they replace; explicit ones are left for validation
    let mut normalized = settings.clone();
    for adjustment in normalized.normalize() {
        let explicit = match adjustment {
            engine::Adjustment::Codec { .. } => args.codec.is_some(),
            engine::Adjustment::BitDepth { .. } => args.bit_depth.is_some(),
        };
        if explicit {
            continue;
        }
        info!("{}", adjustment);
        match adjustment {
            engine::Adjustment::Codec { to, .. } => settings.codec = to,
            engine::Adjustment::BitDepth { to, .. } => settings.bit_depth = to,
        }
    }

    let mut scene = config.scene;
    if let Some(fps) = args.fps {
        scene.fps = fps;
    }
    if let Some(start) = args.frame_start {
        scene.frame_start = start;
    }
    if let Some(end) = args.frame_end {
        scene.frame_end = end;
    }

    Ok((settings, scene))
}

fn resolve_validated(
    config: &config::Config,
    args: &SettingsArgs,
    operation: Operation,
) -> Result<(Settings, SceneInfo)> {
    let (settings, scene) = resolve_settings(config, args, operation)?;
    if let Err(errors) = engine::validate_settings(&settings, &scene) {
        for error in &errors {
            eprintln!("  {}", error);
        }
        anyhow::bail!("Invalid settings ({} problem(s))", errors.len());
    }
    Ok((settings, scene))
}

fn runner_for(quiet: bool) -> EncoderRunner {
    if quiet {
        EncoderRunner::capturing()
    } else {
        EncoderRunner::new()
    }
}

fn print_progress(progress: FrameProgress) {
    info!(
        frame = progress.frame,
        "Rendered {}/{} ({:.1}%)",
        progress.done,
        progress.total,
        progress.pct()
    );
}

fn handle_render(
    config: &config::Config,
    args: &SettingsArgs,
    render_cmd: &str,
    quiet: bool,
) -> Result<()> {
    let (settings, scene) = resolve_validated(config, args, Operation::Render)?;
    let mut renderer = CommandRenderer::new(render_cmd)?;
    renderer.quiet = quiet;

    let summary = engine::run_operation(
        &settings,
        &scene,
        Some(&mut renderer as &mut dyn FrameRenderer),
        &runner_for(quiet),
        &mut print_progress,
    )?;

    if let Some(dir) = &summary.retained_frame_dir {
        println!("Frames kept in {}", dir.display());
    }
    if summary.cleanup_warning.is_some() {
        warn!("Temporary frames could not be fully removed");
    }
    println!(
        "Rendered {} frame(s) and wrote {}",
        summary.frames_rendered,
        settings.output.display()
    );
    Ok(())
}

fn handle_export(
    config: &config::Config,
    args: &SettingsArgs,
    operation: Operation,
    quiet: bool,
) -> Result<()> {
    let (settings, scene) = resolve_validated(config, args, operation)?;
    engine::run_operation(&settings, &scene, None, &runner_for(quiet), &mut |_| {})?;
    println!("Wrote {}", settings.output.display());
    Ok(())
}

fn handle_dry_run(
    config: &config::Config,
    args: &SettingsArgs,
    operation: Operation,
    json: bool,
) -> Result<()> {
    let (settings, scene) = resolve_validated(config, args, operation)?;
    let cmd_args = engine::build_ffmpeg_args(&settings, &scene);

    if json {
        let out = serde_json::to_string_pretty(&cmd_args).context("Failed to serialize args")?;
        println!("{}", out);
    } else {
        if operation == Operation::Render && !settings.store_frames {
            println!("# frames are rendered to a temporary folder that replaces the input folder below");
        }
        println!("{}", engine::format_ffmpeg_cmd(&cmd_args));
    }
    Ok(())
}

fn handle_codecs(container: Option<engine::Container>) {
    let containers = match container {
        Some(c) => vec![c],
        None => engine::CONTAINERS.to_vec(),
    };

    for container in containers {
        println!("{} ({})", container.label(), container);
        if container.is_gif() {
            println!("  no codec options; the container alone sets the output");
            continue;
        }
        for codec in engine::valid_codecs(container) {
            let depths = engine::valid_depths(*codec)
                .iter()
                .map(|d| d.bits().to_string())
                .collect::<Vec<_>>()
                .join(", ");
            println!(
                "  {:<6} {:<12} bit depths: {}",
                codec.label(),
                codec.ffmpeg_encoder(),
                depths
            );
        }
    }
}

fn handle_check_ffmpeg(config: &config::Config, ffmpeg: Option<PathBuf>) -> Result<()> {
    let path = ffmpeg.unwrap_or_else(|| config.defaults.ffmpeg_path.clone());
    let version = engine::ffmpeg_version(&path)?;
    println!("ffmpeg found: {}", version);

    for codec in engine::CODECS {
        let status = if engine::encoder_available(&path, codec.ffmpeg_encoder()) {
            "available"
        } else {
            "missing"
        };
        println!("  {:<12} {}", codec.ffmpeg_encoder(), status);
    }
    Ok(())
}

/// Operation stored in the project settings file, else the config default
fn stored_operation(config: &config::Config, args: &SettingsArgs) -> Result<Operation> {
    match &args.settings {
        Some(path) => Ok(Settings::load(path)?.operation),
        None => Ok(config.defaults.operation),
    }
}

fn handle_show_settings(config: &config::Config, args: &SettingsArgs) -> Result<()> {
    let operation = stored_operation(config, args)?;
    let (settings, _scene) = resolve_settings(config, args, operation)?;
    let out = toml::to_string_pretty(&settings).context("Failed to serialize settings")?;
    print!("{}", out);
    Ok(())
}

fn handle_save_settings(
    config: &config::Config,
    args: &SettingsArgs,
    file: &Path,
) -> Result<()> {
    let operation = stored_operation(config, args)?;
    let (settings, _scene) = resolve_settings(config, args, operation)?;
    settings.save(file)?;
    println!("Settings saved to {}", file.display());
    Ok(())
}

fn handle_init_config() {
    match config::Config::config_path() {
        Ok(path) => {
            if config::Config::exists() {
                println!("Config file exists at: {}", path.display());
            } else {
                match config::Config::ensure_default() {
                    Ok(()) => println!("Created default config at: {}", path.display()),
                    Err(e) => {
                        eprintln!("Error creating config: {:#}", e);
                        process::exit(1);
                    }
                }
            }
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}
