//! Appliance diagnostics built on the inference core
//!
//! Each analysis is a pure function over already-acquired series with an
//! explicit config section:
//!
//! - `element_health`: water-heater element resistance and thermal efficiency
//! - `cycle_intervals`: furnace cycle spacing against outdoor temperature
//! - `diurnal`: hour-of-day load profile
//! - `signatures`: load levels before/after a regime shift
//! - `upgrade`: replacement element evaluation
//! - `correlation`: Pearson r with p-value, shared by the above

mod correlation;
pub mod cycle_intervals;
pub mod diurnal;
pub mod element_health;
pub mod signatures;
pub mod upgrade;

pub use correlation::CorrelationEngine;
pub use cycle_intervals::cycle_intervals;
pub use diurnal::hourly_profile;
pub use element_health::element_health;
pub use signatures::load_signatures;
pub use upgrade::{layering_bias, standard_scenarios};
