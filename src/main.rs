use anyhow::Context;
use clap::Parser;
use rolling_stats::Stats;
use serde::Serialize;
use std::path::PathBuf;

use sumosense::config::SenseConfig;
use sumosense::output::{OutputFormat, create_formatter};
use sumosense::processing::MotionEstimator;
use sumosense::trace::Trace;

#[derive(Parser, Debug)]
#[command(name = "sumosense")]
#[command(about = "Replay recorded IMU traces through the collision and heading estimators", long_about = None)]
struct Args {
    /// Trace CSV file (millis,micros,ax,ay,gz)
    trace: PathBuf,

    /// TOML estimator configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format: text, csv, json
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Increase output verbosity
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Contact threshold override (raw accelerometer units)
    #[arg(short = 't', long)]
    threshold: Option<i32>,

    /// Gyro calibration sample count override
    #[arg(long)]
    calib_samples: Option<u32>,

    /// Use this gyro bias instead of calibrating from the trace
    #[arg(long, allow_hyphen_values = true)]
    bias: Option<i16>,

    /// Report every iteration, not only fresh accelerometer samples
    #[arg(short = 'a', long)]
    all: bool,

    /// Only print the summary
    #[arg(short = 's', long)]
    summary_only: bool,
}

#[derive(Debug, Clone, Serialize)]
struct StatsSummary {
    count: usize,
    mean: f32,
    std_dev: f32,
    min: f32,
    max: f32,
}

impl StatsSummary {
    fn from_stats(stats: &Stats<f32>) -> Option<Self> {
        if stats.count == 0 {
            return None;
        }
        Some(Self {
            count: stats.count,
            mean: stats.mean,
            std_dev: stats.std_dev,
            min: stats.min,
            max: stats.max,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
struct ReplaySummary {
    trace: String,
    iterations: usize,
    fresh_samples: u64,
    gyro_bias: i16,
    contact_onsets: Vec<u32>,
    final_heading: i32,
    smoothed_accel: Option<StatsSummary>,
    turn_rate_dps: Option<StatsSummary>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let mut config = match args.config {
        Some(ref path) => SenseConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => SenseConfig::default(),
    };
    if let Some(threshold) = args.threshold {
        config.collision.threshold = threshold;
    }
    if let Some(samples) = args.calib_samples {
        config.gyro.calibration_samples = samples;
    }

    let trace = Trace::load(&args.trace)
        .with_context(|| format!("Failed to read trace {}", args.trace.display()))?;
    log::info!("Loaded {} rows from {}", trace.len(), args.trace.display());

    let summary = replay(&trace, &config, &args)?;

    if args.summary_only {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }

    Ok(())
}

fn replay(trace: &Trace, config: &SenseConfig, args: &Args) -> anyhow::Result<ReplaySummary> {
    let (bus, clock) = trace.replay();
    let mut estimator = MotionEstimator::new(bus, clock, config)?;

    let gyro_bias = match args.bias {
        Some(bias) => {
            estimator.bus_mut().advance();
            estimator.set_gyro_bias(bias);
            estimator.reset_heading();
            log::info!("Using fixed gyro bias {}", bias);
            bias
        }
        // A trace that ends mid-calibration stops being data-ready
        None => estimator
            .calibrate_bounded(1)
            .context("Trace too short for gyro calibration")?,
    };

    let formatter = create_formatter(args.format, args.verbose > 0);
    if !args.summary_only {
        if let Some(header) = formatter.header() {
            println!("{}", header);
        }
    }

    let mut iterations = 0;
    let mut contact_onsets = Vec::new();
    let mut was_contact = false;
    let mut accel_stats: Stats<f32> = Stats::new();
    let mut rate_stats: Stats<f32> = Stats::new();

    while estimator.bus_mut().advance() {
        let snapshot = estimator.poll();
        iterations += 1;

        rate_stats.update(snapshot.heading_rate_dps);
        if snapshot.fresh_sample {
            accel_stats.update((snapshot.smoothed_squared_magnitude as f32).sqrt());
        }

        if snapshot.contact && !was_contact {
            log::info!("Contact at {} ms", snapshot.timestamp_ms);
            contact_onsets.push(snapshot.timestamp_ms);
        }
        was_contact = snapshot.contact;

        if !args.summary_only && (snapshot.fresh_sample || args.all) {
            println!("{}", formatter.format(&estimator.report()));
        }
    }

    Ok(ReplaySummary {
        trace: args.trace.display().to_string(),
        iterations,
        fresh_samples: estimator.collision().accepted_samples(),
        gyro_bias,
        contact_onsets,
        final_heading: estimator.heading().signed_heading_degrees(),
        smoothed_accel: StatsSummary::from_stats(&accel_stats),
        turn_rate_dps: StatsSummary::from_stats(&rate_stats),
    })
}

fn print_summary(summary: &ReplaySummary) {
    eprintln!();
    eprintln!("Replay summary for {}:", summary.trace);
    eprintln!("  Iterations: {}", summary.iterations);
    eprintln!("  Fresh accel samples: {}", summary.fresh_samples);
    eprintln!("  Gyro bias: {}", summary.gyro_bias);
    eprintln!("  Final heading: {}°", summary.final_heading);
    if summary.contact_onsets.is_empty() {
        eprintln!("  No contact detected");
    } else {
        let onsets: Vec<String> = summary
            .contact_onsets
            .iter()
            .map(|ms| format!("{} ms", ms))
            .collect();
        eprintln!("  Contacts: {}", onsets.join(", "));
    }
    if let Some(ref accel) = summary.smoothed_accel {
        eprintln!(
            "  Smoothed accel: mean {:.1}, std {:.1}, max {:.1}",
            accel.mean, accel.std_dev, accel.max
        );
    }
    if let Some(ref rate) = summary.turn_rate_dps {
        eprintln!(
            "  Turn rate: mean {:.2} dps, min {:.1}, max {:.1}",
            rate.mean, rate.min, rate.max
        );
    }
}
