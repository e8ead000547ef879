//! loadscope: non-intrusive cyclic load inference for home energy telemetry
//!
//! Recovers cycle periods, duty cycles and appliance signatures from a
//! whole-house power feed, and water-heater element health from two tank
//! sensors.
//!
//! ## Architecture
//!
//! - **Processing**: resampling, FFT, transition clustering, autocorrelation,
//!   thermal correlation (pure functions)
//! - **Pipeline**: one parameterized run over those analyzers
//! - **Diagnostics**: element health, cycle intervals, diurnal profile, load
//!   signatures, upgrade simulation
//! - **Acquisition**: logger JSON documents from disk or HTTP

pub mod acquisition;
pub mod config;
pub mod diagnostics;
pub mod pipeline;
pub mod processing;
pub mod report;
pub mod synthetic;
pub mod types;

// Re-export configuration
pub use config::{AnalysisConfig, ConfigError};

// Re-export commonly used types
pub use types::{
    Diagnostic, GroupLink, HealthReport, LoadGroup, PeriodicityCandidate, Sample, Severity,
    ThermalResponse, Transition, UniformSeries,
};

// Re-export the pipeline
pub use pipeline::{Pipeline, PipelineReport};

// Re-export error types
pub use acquisition::AcquisitionError;
pub use processing::DegenerateInput;
