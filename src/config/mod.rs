//! Analysis Configuration Module
//!
//! Every analyzer threshold is loaded from TOML, with built-in defaults
//! matching the tuned heuristics.
//!
//! ## Loading Order
//!
//! 1. `--config <path>` on the command line
//! 2. `LOADSCOPE_CONFIG` environment variable (path to TOML file)
//! 3. `loadscope.toml` in the current working directory
//! 4. Built-in defaults
//!
//! ## Usage
//!
//! The configuration is loaded once by the driver and handed to the
//! pipeline; diagnostics take their own section by reference:
//!
//! ```ignore
//! let config = AnalysisConfig::load(args.config.as_deref());
//! let health = element_health(&power, &upper, &lower, 1.0, &config.health);
//! let report = Pipeline::new(config).run(&power_samples, &sensors);
//! ```

mod analysis_config;
pub mod defaults;
pub mod validation;

pub use analysis_config::*;
