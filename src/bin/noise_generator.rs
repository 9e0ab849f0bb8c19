// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-channel-impairment project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

// Test recording generator
// Writes mono 16-bit Gaussian noise or a sine tone, optionally framed by silence

use clap::Parser;
use std::path::PathBuf;

use rust_channel_impairment::acquisition::{AudioCodec, WavCodec};
use rust_channel_impairment::impairment::normalizer::peak_magnitude;
use rust_channel_impairment::utility::noise_generator::NoiseGenerator;

/// Test recording generator for channel impairment runs
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Output file path (.wav)
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,

    /// Duration in seconds
    #[arg(short, long, default_value_t = 2.0)]
    duration: f64,

    /// Sample rate in Hz
    #[arg(short, long, default_value_t = 8000)]
    sample_rate: u32,

    /// Peak amplitude as a fraction of full scale (0.0 to 1.0)
    #[arg(short, long, default_value_t = 0.5)]
    amplitude: f64,

    /// Write a sine tone at this frequency instead of noise
    #[arg(short, long)]
    tone: Option<f64>,

    /// Seconds of digital silence before and after the signal
    #[arg(long, default_value_t = 0.0)]
    padding: f64,

    /// Fixed seed for the noise
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if args.sample_rate == 0 {
        eprintln!("Error: Sample rate must be positive");
        std::process::exit(1);
    }
    if args.amplitude <= 0.0 || args.amplitude > 1.0 {
        eprintln!("Error: Amplitude must be between 0.0 and 1.0");
        std::process::exit(1);
    }
    if args.duration <= 0.0 || args.padding < 0.0 {
        eprintln!("Error: Duration must be positive and padding non-negative");
        std::process::exit(1);
    }
    if let Some(freq) = args.tone {
        if freq <= 0.0 || freq >= args.sample_rate as f64 / 2.0 {
            eprintln!("Error: Tone frequency must lie between 0 and the Nyquist frequency");
            std::process::exit(1);
        }
    }

    let fs = args.sample_rate as f64;
    let num_samples = (args.duration * fs) as usize;
    let pad_samples = (args.padding * fs) as usize;
    let peak = args.amplitude * i16::MAX as f64;

    let signal: Vec<f64> = match args.tone {
        Some(freq) => {
            println!("Generating {} s tone at {} Hz", args.duration, freq);
            (0..num_samples)
                .map(|i| peak * (2.0 * std::f64::consts::PI * freq * i as f64 / fs).sin())
                .collect()
        }
        None => {
            println!("Generating {} s of white noise", args.duration);
            let mut generator = NoiseGenerator::from_optional_seed(args.seed, 1.0)?;
            let raw = generator.generate_mono(num_samples);
            let raw_peak = peak_magnitude(&raw);
            let scale = if raw_peak > 0.0 { peak / raw_peak } else { 0.0 };
            raw.into_iter().map(|x| x * scale).collect()
        }
    };

    let mut samples = vec![0i16; pad_samples];
    samples.extend(
        signal
            .iter()
            .map(|&x| x.round().clamp(-(i16::MAX as f64), i16::MAX as f64) as i16),
    );
    samples.extend(std::iter::repeat_n(0i16, pad_samples));

    println!("Sample rate: {} Hz", args.sample_rate);
    println!("Amplitude: {}", args.amplitude);

    WavCodec::new().write(&args.output, args.sample_rate, &samples)?;
    println!(
        "Test recording successfully generated and saved to: {}",
        args.output.display()
    );

    Ok(())
}
