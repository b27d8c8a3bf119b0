//! Obscura CLI — Command-line interface for media obfuscation.
//!
//! Usage:
//!   obscura blur [OPTIONS]          Blur faces across a frame sequence
//!   obscura scramble <INPUT.wav>    Scramble a voice recording

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "obscura",
    about = "Real-time media obfuscation: face blurring and voice disguise",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Blur detected faces across an ordered frame sequence
    Blur {
        /// Directory of input frames (processed in filename order)
        #[arg(short, long)]
        frames: PathBuf,

        /// Detections JSONL file produced by an external detector
        #[arg(short, long)]
        detections: PathBuf,

        /// Output directory for blurred frames
        #[arg(short, long)]
        out: PathBuf,

        /// Frame cadence for re-running detection while tracking
        #[arg(long, default_value = "30")]
        detection_interval: u64,

        /// Frames a lost region is retained before removal
        #[arg(long, default_value = "0")]
        grace: u32,

        /// Save the one-shot diagnostic face crop into the configured
        /// crops directory
        #[arg(long)]
        save_crop: bool,
    },

    /// Pitch-scramble a 16-bit PCM WAV recording
    Scramble {
        /// Input WAV file
        input: PathBuf,

        /// Output path (defaults to scrambled_<input name>)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Frames per processing chunk
        #[arg(long, default_value = "1024")]
        chunk_frames: usize,

        /// Snap pitch factors to multiples of this step (robotic variant)
        #[arg(long)]
        robotic_step: Option<f64>,

        /// Clip sample magnitude to (1 - LEVEL) of full scale
        #[arg(long)]
        distortion: Option<f64>,

        /// Use the additive-noise scrambler instead of pitch modulation
        #[arg(long)]
        noise: bool,

        /// Seed the generator for a reproducible scramble
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    obscura_common::logging::init_logging(&obscura_common::config::LoggingConfig {
        level: log_level.to_string(),
        json: false,
        file: None,
    });

    match cli.command {
        Commands::Blur {
            frames,
            detections,
            out,
            detection_interval,
            grace,
            save_crop,
        } => commands::blur::run(
            frames,
            detections,
            out,
            detection_interval,
            grace,
            save_crop,
        ),
        Commands::Scramble {
            input,
            out,
            chunk_frames,
            robotic_step,
            distortion,
            noise,
            seed,
        } => commands::scramble::run(
            input,
            out,
            chunk_frames,
            robotic_step,
            distortion,
            noise,
            seed,
        ),
    }
}
