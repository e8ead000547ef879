//! loadscope - cyclic load inference for home energy telemetry
//!
//! Infers the behavior of cyclic appliances (furnace, water-heater elements,
//! refrigerator) from a whole-house power feed and a few temperature
//! sensors, without instrumenting the appliances themselves.
//!
//! # Usage
//!
//! ```bash
//! # Full pipeline on local documents
//! loadscope analyze --power power.json --upper upper.json --lower lower.json
//!
//! # Straight from the logger
//! loadscope analyze --power http://logger.local/data/power-W/48
//!
//! # Water heater element diagnostics
//! loadscope health --power power.json --upper upper.json --lower lower.json
//! ```
//!
//! # Environment Variables
//!
//! - `LOADSCOPE_CONFIG`: Path to a TOML config (default: `./loadscope.toml`)
//! - `RUST_LOG`: Logging level (default: info)

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::{FixedOffset, Local};
use clap::Parser;
use tracing::info;

use loadscope::acquisition::{Loader, Source};
use loadscope::config::AnalysisConfig;
use loadscope::diagnostics::{
    cycle_intervals, element_health, hourly_profile, layering_bias, load_signatures,
    standard_scenarios,
};
use loadscope::pipeline::Pipeline;
use loadscope::processing::resample;
use loadscope::report;
use loadscope::types::Sample;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "loadscope")]
#[command(about = "Non-intrusive cyclic load inference for home energy telemetry")]
#[command(version)]
struct CliArgs {
    /// Path to a TOML analysis config
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Acquisition timeout in seconds (overrides the config)
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: SubCommand,
}

/// Every source argument accepts a file path or an `http(s)://` URL.
#[derive(clap::Subcommand, Debug)]
enum SubCommand {
    /// Run the full inference pipeline on a power feed
    Analyze {
        #[arg(long)]
        power: Option<String>,
        /// Upper tank temperature sensor
        #[arg(long)]
        upper: Option<String>,
        /// Lower tank temperature sensor
        #[arg(long)]
        lower: Option<String>,
        /// Print the report as JSON instead of tables
        #[arg(long)]
        json: bool,
    },

    /// Water heater element resistance and thermal efficiency
    Health {
        #[arg(long)]
        power: Option<String>,
        #[arg(long)]
        upper: Option<String>,
        #[arg(long)]
        lower: Option<String>,
    },

    /// Furnace cycle intervals against outdoor temperature
    Intervals {
        #[arg(long)]
        indoor: Option<String>,
        #[arg(long)]
        outdoor: Option<String>,
    },

    /// Hourly mean power profile
    Diurnal {
        #[arg(long)]
        power: Option<String>,
        /// Fixed offset from UTC in minutes (default: system local time)
        #[arg(long, allow_hyphen_values = true)]
        utc_offset_minutes: Option<i32>,
    },

    /// Load signatures before and after the largest temperature shift
    Signatures {
        #[arg(long)]
        power: Option<String>,
        /// Temperature series to locate the shift in (default: indoor source)
        #[arg(long)]
        temp: Option<String>,
    },

    /// Evaluate replacement water heater elements
    Upgrade {
        /// Measured wattage of the element being replaced
        #[arg(long)]
        watts: f64,
        /// Upper element wattage, for the layering assessment
        #[arg(long)]
        upper_watts: Option<f64>,
        /// Lower element wattage, for the layering assessment
        #[arg(long)]
        lower_watts: Option<f64>,
    },
}

// ============================================================================
// Sources
// ============================================================================

/// CLI argument first, then the `[sources]` config entry.
fn resolve(cli: Option<&String>, configured: Option<&String>, what: &str) -> Result<Source> {
    match cli.or(configured) {
        Some(s) => Ok(s.parse()?),
        None => bail!("no {what} source given (pass --{what} or set sources.{what} in the config)"),
    }
}

fn resolve_optional(cli: Option<&String>, configured: Option<&String>) -> Option<Source> {
    cli.or(configured).and_then(|s| s.parse().ok())
}

async fn load_named(loader: &Loader, sources: Vec<(&str, Option<Source>)>) -> Vec<(String, Vec<Sample>)> {
    let mut loaded = Vec::new();
    for (name, source) in sources {
        if let Some(source) = source {
            loaded.push((name.to_string(), loader.load_or_empty(&source).await));
        }
    }
    loaded
}

// ============================================================================
// Commands
// ============================================================================

async fn run(args: CliArgs, config: AnalysisConfig) -> Result<()> {
    let timeout = Duration::from_secs(args.timeout_secs.unwrap_or(config.sources.timeout_secs));
    let loader = Loader::new(timeout).context("creating HTTP client")?;
    let src = &config.sources;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match args.command {
        SubCommand::Analyze {
            power,
            upper,
            lower,
            json,
        } => {
            let power = resolve(power.as_ref(), src.power.as_ref(), "power")?;
            let sensors = vec![
                ("upper", resolve_optional(upper.as_ref(), src.upper_temp.as_ref())),
                ("lower", resolve_optional(lower.as_ref(), src.lower_temp.as_ref())),
            ];

            let power = loader.load_or_empty(&power).await;
            let sensors = load_named(&loader, sensors).await;

            let pipeline = Pipeline::new(config.clone());
            let report = tokio::task::spawn_blocking(move || pipeline.run(&power, &sensors))
                .await
                .context("analysis task failed")?;

            if json {
                serde_json::to_writer_pretty(&mut out, &report)?;
                writeln!(out)?;
            } else {
                report::write_pipeline(&mut out, &report)?;
            }
        }

        SubCommand::Health {
            power,
            upper,
            lower,
        } => {
            let power = resolve(power.as_ref(), src.power.as_ref(), "power")?;
            let upper = resolve(upper.as_ref(), src.upper_temp.as_ref(), "upper")?;
            let lower = resolve(lower.as_ref(), src.lower_temp.as_ref(), "lower")?;

            let interval = config.resample.interval_ms;
            let power = resample(&loader.load_or_empty(&power).await, interval);
            let upper = resample(&loader.load_or_empty(&upper).await, interval);
            let lower = resample(&loader.load_or_empty(&lower).await, interval);

            let health = element_health(
                &power.values,
                &upper.values,
                &lower.values,
                power.interval_minutes(),
                &config.health,
            );
            report::write_health(&mut out, &health)?;
        }

        SubCommand::Intervals { indoor, outdoor } => {
            let indoor = resolve(indoor.as_ref(), src.indoor_temp.as_ref(), "indoor")?;
            let outdoor = resolve(outdoor.as_ref(), src.outdoor_temp.as_ref(), "outdoor")?;

            let indoor = loader.load_or_empty(&indoor).await;
            let outdoor = loader.load_or_empty(&outdoor).await;
            let intervals = cycle_intervals(&indoor, &outdoor, &config.intervals);
            report::write_intervals(&mut out, &intervals)?;
        }

        SubCommand::Diurnal {
            power,
            utc_offset_minutes,
        } => {
            let power = resolve(power.as_ref(), src.power.as_ref(), "power")?;
            let power = loader.load_or_empty(&power).await;
            let profile = match utc_offset_minutes {
                Some(minutes) => {
                    let tz = FixedOffset::east_opt(minutes * 60)
                        .with_context(|| format!("invalid UTC offset: {minutes} min"))?;
                    hourly_profile(&power, &tz)
                }
                None => hourly_profile(&power, &Local),
            };
            report::write_hourly(&mut out, &profile)?;
        }

        SubCommand::Signatures { power, temp } => {
            let power = resolve(power.as_ref(), src.power.as_ref(), "power")?;
            let temp = resolve(temp.as_ref(), src.indoor_temp.as_ref(), "temp")?;

            let power = loader.load_or_empty(&power).await;
            let temps = loader.load_or_empty(&temp).await;
            match load_signatures(&power, &temps, &config.signatures) {
                Some(signatures) => report::write_signatures(&mut out, &signatures)?,
                None => writeln!(out, "No temperature data; regime shift not located")?,
            }
        }

        SubCommand::Upgrade {
            watts,
            upper_watts,
            lower_watts,
        } => {
            let scenarios = standard_scenarios(watts, &config.tank);
            if scenarios.is_empty() {
                bail!("no valid element wattage to simulate");
            }
            let bias = upper_watts
                .zip(lower_watts)
                .map(|(upper, lower)| layering_bias(upper, lower));
            report::write_upgrade(&mut out, &scenarios, bias)?;
        }
    }

    out.flush()?;
    Ok(())
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();

    let config = AnalysisConfig::load(args.config.as_deref());
    info!(
        interval_ms = config.resample.interval_ms,
        k = config.clustering.k,
        min_delta_watts = config.clustering.min_delta_watts,
        "analysis config ready"
    );

    run(args, config).await
}
