use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use sumosense::simulation::{SimulationConfig, simulate, true_heading_degrees};

#[derive(Parser, Debug)]
#[command(name = "simulate_trace")]
#[command(about = "Generate synthetic IMU traces for replay through the estimators")]
struct Args {
    /// TOML simulation profile (turns, impacts, sensor noise)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output trace CSV
    #[arg(short, long, default_value = "data/synthetic/trace.csv")]
    output: PathBuf,

    /// Seed for reproducibility (overrides the profile)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Run length in milliseconds (overrides the profile)
    #[arg(short, long)]
    duration_ms: Option<u32>,

    /// Add a turn: START_MS:DURATION_MS:RATE_DPS (repeatable)
    #[arg(long, allow_hyphen_values = true)]
    turn: Vec<String>,

    /// Add an impact: AT_MS:DURATION_MS:X:Y (repeatable)
    #[arg(long, allow_hyphen_values = true)]
    impact: Vec<String>,

    /// Gyro noise standard deviation in digits (overrides the profile)
    #[arg(long)]
    gyro_noise: Option<f32>,

    /// Accelerometer noise standard deviation (overrides the profile)
    #[arg(long)]
    accel_noise: Option<f32>,

    /// Increase output verbosity
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_fields<const N: usize>(spec: &str, what: &str) -> Result<[f32; N]> {
    let values: Vec<f32> = spec
        .split(':')
        .map(|s| s.trim().parse::<f32>())
        .collect::<std::result::Result<_, _>>()
        .with_context(|| format!("Invalid {} {:?}", what, spec))?;
    let found = values.len();
    values
        .try_into()
        .map_err(|_| anyhow::anyhow!("{} {:?} needs {} fields, got {}", what, spec, N, found))
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let mut config = match args.config {
        Some(ref path) => SimulationConfig::load(path)
            .with_context(|| format!("Failed to load profile {}", path.display()))?,
        None => SimulationConfig::default(),
    };

    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(duration_ms) = args.duration_ms {
        config.duration_ms = duration_ms;
    }
    if let Some(noise) = args.gyro_noise {
        config.gyro_noise = noise;
    }
    if let Some(noise) = args.accel_noise {
        config.accel_noise = noise;
    }
    for spec in &args.turn {
        let [start, duration, rate] = parse_fields::<3>(spec, "turn")?;
        config = config.with_turn(start as u32, duration as u32, rate);
    }
    for spec in &args.impact {
        let [at, duration, x, y] = parse_fields::<4>(spec, "impact")?;
        config = config.with_impact(at as u32, duration as u32, x, y);
    }

    let trace = simulate(&config)?;

    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }
    trace
        .save(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    println!(
        "Wrote {} rows to {} (expected final heading {:.1}°)",
        trace.len(),
        args.output.display(),
        true_heading_degrees(&config, config.duration_ms)
    );

    Ok(())
}
