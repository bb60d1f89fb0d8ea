// whisper-bridge CLI: model download, status and benchmarking
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use sysinfo::System;

use whisper_bridge::audio::WHISPER_SAMPLE_RATE;
use whisper_bridge::whisper_engine::downloader::{
    download_coreml_model, download_model, DownloadOptions, DownloadProgress,
};
use whisper_bridge::whisper_engine::model_registry::{
    coreml_model_path, default_model_dir, format_bytes, is_bin_model_downloaded,
    is_coreml_model_downloaded, is_model_downloaded, is_supported_language, model_path,
    COREML_MODEL_NAME, WHISPER_MODEL,
};
use whisper_bridge::whisper_engine::types::AUTO_LANGUAGE;
use whisper_bridge::whisper_engine::log_acceleration_capabilities;
use whisper_bridge::{get_version, EngineOptions, EngineRegistry};

#[derive(Parser)]
#[command(name = "whisper-bridge", version, about = "Whisper transcription bridge")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Download the Whisper model
    Download {
        /// Re-download even if the model exists
        #[arg(long)]
        force: bool,
        #[arg(long)]
        model_dir: Option<PathBuf>,
    },
    /// Check whether the model is downloaded
    Status {
        #[arg(long)]
        model_dir: Option<PathBuf>,
    },
    /// Print the model directory
    Path,
    /// Print version and acceleration info as JSON
    Version,
    /// Measure transcription speed on a synthesized tone
    Benchmark {
        /// Model file, defaults to the downloaded model
        #[arg(long)]
        model: Option<PathBuf>,
        #[arg(long, default_value_t = 3)]
        runs: usize,
        /// Length of the benchmark audio in seconds
        #[arg(long, default_value_t = 30)]
        seconds: u32,
        #[arg(long, default_value_t = 0)]
        threads: u32,
    },
    /// Transcribe raw little-endian f32 mono PCM and print the result as JSON
    Transcribe {
        #[arg(long)]
        model: Option<PathBuf>,
        #[arg(long)]
        input: PathBuf,
        #[arg(long, default_value_t = WHISPER_SAMPLE_RATE as i32)]
        sample_rate: i32,
        #[arg(long, default_value = "auto")]
        language: String,
        #[arg(long, default_value_t = 0)]
        threads: u32,
        #[arg(long)]
        translate: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize env_logger to output to stderr (reads RUST_LOG env var)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Download { force, model_dir } => run_download(force, model_dir).await,
        Command::Status { model_dir } => {
            print_status(model_dir.as_deref());
            Ok(())
        }
        Command::Path => {
            println!("{}", default_model_dir().display());
            Ok(())
        }
        Command::Version => {
            println!("{}", serde_json::to_string_pretty(&get_version())?);
            Ok(())
        }
        Command::Benchmark { model, runs, seconds, threads } => {
            let model = resolve_model(model)?;
            tokio::task::spawn_blocking(move || run_benchmark(&model, runs, seconds, threads)).await?
        }
        Command::Transcribe { model, input, sample_rate, language, threads, translate } => {
            if language != AUTO_LANGUAGE && !is_supported_language(&language) {
                return Err(anyhow!("Unsupported language code: {}", language));
            }
            let options = EngineOptions::new(resolve_model(model)?)
                .with_language(language)
                .with_threads(threads)
                .with_translate(translate);
            tokio::task::spawn_blocking(move || run_transcribe(options, &input, sample_rate)).await?
        }
    }
}

fn resolve_model(model: Option<PathBuf>) -> Result<PathBuf> {
    match model {
        Some(path) => Ok(path),
        None if is_bin_model_downloaded(None) => Ok(model_path(None)),
        None => Err(anyhow!("Model not downloaded. Run: whisper-bridge download")),
    }
}

async fn run_download(force: bool, model_dir: Option<PathBuf>) -> Result<()> {
    let options = DownloadOptions {
        model_dir,
        force,
        on_progress: Some(Box::new(print_progress)),
    };

    let steps = if cfg!(feature = "coreml") { 2 } else { 1 };
    log::info!("Step 1/{}: Downloading Whisper model...", steps);
    let path = download_model(&options).await.context("Model download failed")?;
    println!("Model ready: {}", path.display());

    if cfg!(feature = "coreml") {
        log::info!("Step 2/2: Downloading CoreML encoder...");
        let path = download_coreml_model(&options).await.context("CoreML encoder download failed")?;
        println!("CoreML encoder ready: {}", path.display());
    }

    Ok(())
}

fn progress_line(progress: &DownloadProgress) -> String {
    if progress.total > 0 {
        format!(
            "{}% ({} / {})",
            progress.percent,
            format_bytes(progress.downloaded),
            format_bytes(progress.total)
        )
    } else {
        format!("{} downloaded", format_bytes(progress.downloaded))
    }
}

fn print_progress(progress: DownloadProgress) {
    eprint!("\r  {}   ", progress_line(&progress));
    if progress.total > 0 && progress.downloaded >= progress.total {
        eprintln!();
    }
}

fn print_status(model_dir: Option<&Path>) {
    println!("Model directory: {}", model_dir.map(Path::to_path_buf).unwrap_or_else(default_model_dir).display());

    let bin_path = model_path(model_dir);
    if is_bin_model_downloaded(model_dir) {
        let size = std::fs::metadata(&bin_path).map(|m| m.len()).unwrap_or(0);
        println!("✓ ggml-{}.bin ({})", WHISPER_MODEL.name, format_bytes(size));
    } else {
        println!(
            "✗ ggml-{}.bin - Not downloaded ({}, {})",
            WHISPER_MODEL.name, WHISPER_MODEL.size, WHISPER_MODEL.languages
        );
    }

    if cfg!(feature = "coreml") {
        if is_coreml_model_downloaded(model_dir) {
            println!("✓ {}", COREML_MODEL_NAME);
        } else {
            println!("✗ {} - Not downloaded ({})", COREML_MODEL_NAME, coreml_model_path(model_dir).display());
        }
    }

    if is_model_downloaded(model_dir) {
        println!("✓ All models ready!");
    } else {
        println!("Run: whisper-bridge download");
    }
}

fn sine_wave(seconds: u32, frequency: f32) -> Vec<f32> {
    let len = seconds as usize * WHISPER_SAMPLE_RATE as usize;
    (0..len)
        .map(|i| (2.0 * std::f32::consts::PI * frequency * i as f32 / WHISPER_SAMPLE_RATE as f32).sin() * 0.5)
        .collect()
}

fn cpu_name() -> String {
    let system = System::new_all();
    system
        .cpus()
        .first()
        .map(|cpu| cpu.brand().trim().to_string())
        .filter(|brand| !brand.is_empty())
        .unwrap_or_else(|| "Unknown".to_string())
}

fn run_benchmark(model: &Path, runs: usize, seconds: u32, threads: u32) -> Result<()> {
    log_acceleration_capabilities();
    println!("Chip: {}", cpu_name());
    println!("Model: {}", model.display());

    let samples = sine_wave(seconds, 440.0);
    let audio_seconds = samples.len() as f64 / WHISPER_SAMPLE_RATE as f64;
    println!("Audio: {:.1}s ({} samples)", audio_seconds, samples.len());

    let registry: EngineRegistry = EngineRegistry::new();
    let init_start = std::time::Instant::now();
    registry
        .initialize_with(EngineOptions::new(model).with_threads(threads))
        .context("Failed to initialize Whisper")?;
    println!("Init time: {:.2}s", init_start.elapsed().as_secs_f64());

    // Warm-up on the first five seconds
    let warmup_len = samples.len().min(5 * WHISPER_SAMPLE_RATE as usize);
    registry.transcribe(&samples[..warmup_len], WHISPER_SAMPLE_RATE as i32)?;

    let mut times = Vec::with_capacity(runs);
    for run in 0..runs {
        let result = registry.transcribe(&samples, WHISPER_SAMPLE_RATE as i32)?;
        println!("  Run {}: {:.3}s", run + 1, result.duration_ms / 1000.0);
        times.push(result.duration_ms);
    }
    registry.cleanup();

    if times.is_empty() {
        return Ok(());
    }

    let avg_ms = times.iter().sum::<f64>() / times.len() as f64;
    let rtf = avg_ms / 1000.0 / audio_seconds;
    println!("Avg process time:  {:.3}s", avg_ms / 1000.0);
    println!("Real-time factor:  {:.4}x", rtf);
    if rtf > 0.0 {
        println!("Speed:             {:.0}x real-time", 1.0 / rtf);
    }
    Ok(())
}

fn read_f32_pcm(path: &Path) -> Result<Vec<f32>> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    if bytes.len() % 4 != 0 {
        return Err(anyhow!("{} is not raw f32 PCM ({} bytes)", path.display(), bytes.len()));
    }
    // Copy into an f32 buffer; Vec<u8> isn't guaranteed to be 4-byte aligned
    let mut samples = vec![0.0f32; bytes.len() / 4];
    bytemuck::cast_slice_mut::<f32, u8>(&mut samples).copy_from_slice(&bytes);
    if cfg!(target_endian = "big") {
        for sample in samples.iter_mut() {
            *sample = f32::from_bits(u32::from_le(sample.to_bits()));
        }
    }
    Ok(samples)
}

fn run_transcribe(options: EngineOptions, input: &Path, sample_rate: i32) -> Result<()> {
    let samples = read_f32_pcm(input)?;
    let registry: EngineRegistry = EngineRegistry::new();
    registry.initialize_with(options).context("Failed to initialize Whisper")?;

    let result = registry.transcribe(&samples, sample_rate).context("Transcription failed")?;
    registry.cleanup();

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
