use anyhow::{Context, Result, bail};
use std::fs;
use std::process::ExitCode;
use std::sync::Arc;

use ffbatch::cli::{self, Commands, TranscodeArgs};
use ffbatch::config::Config;
use ffbatch::engine::hardware::platform_encoders;
use ffbatch::engine::{
    BatchError, BatchProcessor, CommandExecutor, EncodingOrchestrator, Platform, PlatformDetector,
    PresetRegistry, SystemExecutor, detect_platform, find_video_files,
};
use ffbatch::stats::{AnalyticsRecorder, format_bytes};

fn main() -> ExitCode {
    let cli = cli::parse();

    let default_level = if cli.transcode.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Some(Commands::Check) => run_check(),
        Some(Commands::Presets { all, json }) => run_presets(all, json),
        Some(Commands::InitConfig) => run_init_config(),
        None => run_transcode(&cli.transcode),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config() -> Config {
    Config::load().unwrap_or_else(|e| {
        eprintln!("Warning: {:#}", e);
        eprintln!("Using built-in defaults. Run 'ffbatch init-config' to create a config file.");
        Config::default()
    })
}

fn run_transcode(args: &TranscodeArgs) -> Result<()> {
    let file_config = load_config();
    let mut config = args.to_config(&file_config.defaults);
    config.validate()?;

    if !config.input_path.exists() {
        bail!(
            "input file or directory does not exist: {}",
            config.input_path.display()
        );
    }
    if !config.dry_run {
        fs::create_dir_all(&config.output_dir).with_context(|| {
            format!(
                "failed to create output directory: {}",
                config.output_dir.display()
            )
        })?;
    }

    let executor: Arc<dyn CommandExecutor> = Arc::new(SystemExecutor);
    let mut platform = detect_platform();
    let registry = Arc::new(PresetRegistry::new(platform));

    if !registry.is_valid_preset(&config.preset) {
        bail!(
            "invalid preset '{}'. Available presets: {}",
            config.preset,
            registry.available_presets().join(", ")
        );
    }

    let detector = PlatformDetector::with_tools(
        executor.clone(),
        file_config.tools.ffmpeg_bin.clone(),
        file_config.tools.nvidia_smi_bin.clone(),
    );

    if !config.dry_run {
        let version = detector.check_ffmpeg_availability(platform)?;
        tracing::debug!(%version, "ffmpeg available");
    }

    if !config.no_hardware && !config.dry_run {
        let check = detector.check_gpu_availability(platform, config.gpu_device(), config.verbose);
        platform = check.platform;
        if let Err(e) = check.result {
            eprintln!("Hardware acceleration check failed: {}", e);
            eprintln!("Consider using --no-gpu flag for software encoding");
            return Err(e.into());
        }
        if let Some(gpu) = check.devices.get(config.gpu_device()) {
            println!("Using {}", gpu);
        }
    } else if config.dry_run {
        platform = detector.planning_platform(platform, config.gpu_device(), config.no_hardware);
    }
    tracing::debug!(%platform, "platform resolved");

    let files = find_video_files(&config.input_path, config.recursive)?;
    if files.is_empty() {
        bail!("no video files found in {}", config.input_path.display());
    }
    println!("Found {} video file(s) to process", files.len());

    let orchestrator = EncodingOrchestrator::new(executor, file_config.tools.ffmpeg_bin.clone());
    let csv_output = config.csv_output.clone();
    let dry_run = config.dry_run;
    let processor = BatchProcessor::new(config, registry, orchestrator, platform);

    if dry_run {
        processor.dry_run(&files)?;
        return Ok(());
    }

    let mut recorder = match &csv_output {
        Some(path) => Some(AnalyticsRecorder::create(path)?),
        None => None,
    };

    match processor.process_files(&files, recorder.as_mut()) {
        Ok(summary) => {
            print_summary(&summary);
            if let Some(path) = &csv_output {
                println!("Analytics written to {}", path.display());
            }
            Ok(())
        }
        Err(BatchError::Failed { failures, summary }) => {
            print_summary(&summary);
            bail!("transcoding completed with errors ({} failed)", failures.len())
        }
        Err(e) => Err(e.into()),
    }
}

fn print_summary(summary: &ffbatch::stats::BatchSummary) {
    println!();
    println!(
        "Encoded {}, skipped {}, failed {} in {}",
        summary.succeeded,
        summary.skipped,
        summary.failed,
        summary.format_elapsed()
    );
    if summary.succeeded > 0 {
        println!(
            "{} -> {} ({})",
            format_bytes(summary.input_bytes),
            format_bytes(summary.output_bytes),
            summary.format_space_saved()
        );
    }
    if summary.fallbacks > 0 {
        println!("{} file(s) needed a fallback encoder", summary.fallbacks);
    }
}

fn run_check() -> Result<()> {
    let file_config = load_config();
    let executor: Arc<dyn CommandExecutor> = Arc::new(SystemExecutor);
    let detector = PlatformDetector::with_tools(
        executor,
        file_config.tools.ffmpeg_bin.clone(),
        file_config.tools.nvidia_smi_bin.clone(),
    );

    println!("System Check Results:");
    println!("====================");

    let detected = detect_platform();
    match detector.check_ffmpeg_availability(detected) {
        Ok(version) => println!("FFmpeg: Available ({})", version),
        Err(e) => println!("FFmpeg: {}", e),
    }

    let gpu_index = file_config.defaults.gpu_index.max(0) as usize;
    let check = detector.check_gpu_availability(detected, gpu_index, true);
    let platform = check.platform;
    match &check.result {
        Ok(()) => match platform {
            Platform::AppleSilicon => {
                println!("Hardware Acceleration: Apple Silicon VideoToolbox detected")
            }
            Platform::VendorGpu => {
                println!("Hardware Acceleration: NVIDIA GPU with CUDA support detected");
                for gpu in &check.devices {
                    println!("  {}", gpu);
                }
            }
            _ => println!("Hardware Acceleration: Available"),
        },
        Err(e) => println!("Hardware Acceleration: {}", e),
    }

    println!("\nEncoder Availability ({}):", platform);
    for encoder in platform_encoders(platform) {
        let status = match detector.check_encoder_availability(encoder) {
            Ok(true) => "Available".to_string(),
            Ok(false) => "Not available".to_string(),
            Err(e) => e.to_string(),
        };
        println!("  {}: {}", encoder, status);
    }

    Ok(())
}

fn run_presets(all: bool, json: bool) -> Result<()> {
    let registry = PresetRegistry::new(detect_platform());

    let presets: Vec<_> = if all {
        Platform::CONCRETE
            .iter()
            .flat_map(|&p| registry.presets_for_platform(p))
            .collect()
    } else {
        registry.resolved().collect()
    };

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&presets).context("Failed to serialize presets")?
        );
        return Ok(());
    }

    println!("Available Presets ({}):", registry.resolved_platform());
    println!("==================");
    let mut current = None;
    for preset in presets {
        if all && current != Some(preset.platform) {
            current = Some(preset.platform);
            println!("\n[{}]", preset.platform);
        }
        println!(
            "  {:<12} {:<10} {:<18} {}",
            preset.name, preset.resolution, preset.encoder, preset.description
        );
    }

    println!("\nExample Usage:");
    println!("  ffbatch -i input.mp4 -p 1080p_av1 -o output/");

    Ok(())
}

fn run_init_config() -> Result<()> {
    let config_path = Config::config_path()?;

    if Config::exists() {
        println!("Config file already exists at {}", config_path.display());
        let config = Config::load()?;
        println!(
            "Defaults: preset={}, audio_codec={}, gpu_index={}, workers={}, overwrite={}",
            config.defaults.preset,
            config.defaults.audio_codec,
            config.defaults.gpu_index,
            config.defaults.workers,
            config.defaults.overwrite
        );
    } else {
        Config::default().save()?;
        println!("Created default config at {}", config_path.display());
    }

    Ok(())
}
