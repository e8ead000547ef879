//! Household Telemetry Simulation
//!
//! Generates a synthetic whole-house power feed plus upper/lower water-heater
//! tank sensors, written as logger-format JSON documents:
//!
//! - `power.json`: baseload, refrigerator, furnace blower, water heater
//! - `upper.json`: upper tank sensor (°F)
//! - `lower.json`: lower tank sensor (°F)
//!
//! # Usage
//! ```bash
//! ./simulation --hours 24 --seed 42 --out data/
//! ./loadscope analyze --power data/power.json --upper data/upper.json --lower data/lower.json
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use loadscope::acquisition::write_file;
use loadscope::synthetic::{generate, HouseholdProfile};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "simulation")]
#[command(about = "Synthetic household telemetry for loadscope testing")]
#[command(version)]
struct Args {
    /// Simulation duration in hours (1-168)
    #[arg(short = 'H', long, default_value = "24", value_parser = clap::value_parser!(u32).range(1..=168))]
    hours: u32,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Output directory for the JSON documents
    #[arg(short, long, default_value = ".")]
    out: PathBuf,

    /// Timestamp jitter in milliseconds (0 for a perfectly regular feed)
    #[arg(long, default_value = "3000")]
    jitter_ms: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(rand::random);

    let profile = HouseholdProfile {
        jitter_ms: i64::from(args.jitter_ms),
        ..HouseholdProfile::default()
    };
    let samples = args.hours * 60;

    info!("{}", "=".repeat(60));
    info!("HOUSEHOLD TELEMETRY SIMULATION");
    info!("{}", "=".repeat(60));
    info!("  Duration:      {} h ({} samples per series)", args.hours, samples);
    info!("  Seed:          {}", seed);
    info!("  Baseload:      {:.0} W", profile.baseload_watts);
    info!("  Refrigerator:  {:.0} W every {} min", profile.refrigerator.watts, profile.refrigerator.period_minutes);
    info!("  Furnace:       {:.0} W every {} min", profile.furnace.watts, profile.furnace.period_minutes);
    info!(
        "  Water heater:  upper {:.0} W / lower {:.0} W, draw every {} min",
        profile.water_heater.upper_watts,
        profile.water_heater.lower_watts,
        profile.water_heater.draw_period_minutes
    );

    let data = generate(&profile, samples, seed).context("invalid simulation profile")?;

    tokio::fs::create_dir_all(&args.out)
        .await
        .with_context(|| format!("creating {}", args.out.display()))?;

    for (file, name, series) in [
        ("power.json", "power-W", &data.power),
        ("upper.json", "upper-F", &data.upper_temp),
        ("lower.json", "lower-F", &data.lower_temp),
    ] {
        let path = args.out.join(file);
        write_file(&path, series, Some(name))
            .await
            .with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), samples = series.len(), "series written");
    }

    Ok(())
}
