// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-channel-impairment project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

// Main entry point for the channel impairment simulator
use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use rust_channel_impairment::config::{output_config_schema, Config};
use rust_channel_impairment::impairment::{
    AwgnImpairment, FadingProfile, Impairment, MultipathProfile,
};
use rust_channel_impairment::{run, ImpairmentError, OutputTarget, RunReport, WavCodec};
use std::path::PathBuf;
use std::process::ExitCode;

/// Radio channel impairment simulator for modem testing
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// YAML configuration file (created with defaults if missing)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Write a JSON run report to this file
    #[arg(long, value_name = "FILE", global = true)]
    report: Option<PathBuf>,

    /// Fixed noise seed for reproducible runs
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Print the configuration JSON schema and exit
    #[arg(long)]
    show_config_schema: bool,

    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Subcommand)]
enum Mode {
    /// Band-limit the input and add Gaussian noise at a target SNR
    Awgn {
        /// Input WAV file
        input: PathBuf,
        /// Pass-band edge in Hz
        #[arg(allow_negative_numbers = true)]
        bandwidth: f64,
        /// Target signal-to-noise ratio in dB
        #[arg(allow_negative_numbers = true)]
        snr: f64,
        /// Output WAV file (default: a new run directory)
        output: Option<PathBuf>,
    },
    /// Apply a sinusoidal fading envelope
    Fade {
        /// Input WAV file
        input: PathBuf,
        /// Fade depth in dB
        #[arg(allow_negative_numbers = true)]
        depth: f64,
        /// Fade period in seconds
        #[arg(allow_negative_numbers = true)]
        period: f64,
        /// Output WAV file (default: a new run directory)
        output: Option<PathBuf>,
    },
    /// Add a delayed echo whose delay ramps across the file
    Multipath {
        /// Input WAV file
        input: PathBuf,
        /// Echo delay at the start, in milliseconds
        #[arg(allow_negative_numbers = true)]
        start_ms: f64,
        /// Echo delay at the end, in milliseconds
        #[arg(allow_negative_numbers = true)]
        end_ms: f64,
        /// Echo gain in dB (negative attenuates)
        #[arg(allow_negative_numbers = true)]
        attenuation: f64,
        /// Output WAV file (default: a new run directory)
        output: Option<PathBuf>,
    },
}

impl Mode {
    fn into_parts(self) -> Result<(PathBuf, Impairment, Option<PathBuf>), ImpairmentError> {
        Ok(match self {
            Mode::Awgn {
                input,
                bandwidth,
                snr,
                output,
            } => (
                input,
                Impairment::Awgn(AwgnImpairment::new(bandwidth, snr)),
                output,
            ),
            Mode::Fade {
                input,
                depth,
                period,
                output,
            } => (
                input,
                Impairment::Fade(FadingProfile::new(depth, period)?),
                output,
            ),
            Mode::Multipath {
                input,
                start_ms,
                end_ms,
                attenuation,
                output,
            } => (
                input,
                Impairment::Multipath(MultipathProfile::new(start_ms, end_ms, attenuation)?),
                output,
            ),
        })
    }
}

fn load_config(args: &Args) -> Result<Config, ImpairmentError> {
    let mut config = match &args.config {
        Some(path) => Config::from_file(path).map_err(|err| {
            match err.downcast::<ImpairmentError>() {
                Ok(typed) => typed,
                Err(other) => ImpairmentError::Configuration(other),
            }
        })?,
        None => Config::default(),
    };
    config.apply_args(args.seed);
    Ok(config)
}

fn execute(args: Args) -> Result<(), ImpairmentError> {
    if args.show_config_schema {
        return output_config_schema().map_err(ImpairmentError::Configuration);
    }

    let config = load_config(&args)?;
    let mode = args
        .mode
        .ok_or_else(|| ImpairmentError::Usage("a mode is required: awgn, fade or multipath".into()))?;
    let (input, impairment, output) = mode.into_parts()?;
    let target = OutputTarget::from_args(output, &config.output);

    println!("Channel impairment: {}", impairment.mode_name());
    println!("Input: {}", input.display());

    let report = run(
        &WavCodec::new(),
        &input,
        &target,
        &impairment,
        &config.engine_settings(),
    )?;
    print_summary(&report);

    if let Some(report_path) = &args.report {
        report.save_to_file(report_path)?;
        println!("Report saved to: {}", report_path.display());
    }

    Ok(())
}

fn print_summary(report: &RunReport) {
    println!("Sample rate: {} Hz", report.sample_rate);
    println!(
        "Samples: {} in, {} out",
        report.stats.input_samples, report.output_samples
    );
    if !report.stats.silence_intervals.is_empty() {
        println!(
            "Removed {} silent section(s), {} samples",
            report.stats.silence_intervals.len(),
            report.stats.removed_samples()
        );
    }
    if let Some(signal) = report.stats.signal_energy_db {
        println!("Signal energy: {:.1} dB", signal);
    }
    if let Some(noise) = report.stats.noise_energy_db {
        println!("Noise energy: {:.1} dB", noise);
    }
    if let Some(snr) = report.stats.achieved_snr_db {
        println!("Signal to noise ratio: {:.1} dB", snr);
    }
    println!("Wrote file {}", report.output.display());
}

fn main() -> ExitCode {
    env_logger::init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            return match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    let _ = err.print();
                    ExitCode::SUCCESS
                }
                _ => {
                    let _ = err.print();
                    ExitCode::from(ImpairmentError::Usage(err.kind().to_string()).exit_code() as u8)
                }
            };
        }
    };

    match execute(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::from(err.exit_code() as u8)
        }
    }
}
