//! Shared data structures for cyclic load inference
//!
//! - `series`: raw `Sample`s and the resampler's `UniformSeries`
//! - `loads`: transitions, load groups, group links, periodicity candidates
//!   and thermal responses
//! - `diagnostics`: advisory messages and the results of the appliance
//!   diagnostics (element health, intervals, signatures, upgrades)

mod diagnostics;
mod loads;
mod series;

pub use diagnostics::*;
pub use loads::*;
pub use series::*;
