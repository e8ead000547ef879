//! Signal processing core: resampling, spectral analysis, transition
//! clustering, autocorrelation and thermal correlation.
//!
//! Every function here is pure: no I/O, no shared state. Degenerate inputs
//! (empty, constant, too short) come back as [`DegenerateInput`] or as an
//! empty result, never as a panic.

mod autocorrelation;
mod fft;
mod resample;
mod thermal;
mod transitions;

pub use autocorrelation::*;
pub use fft::*;
pub use resample::resample;
pub use thermal::*;
pub use transitions::*;

use thiserror::Error;

/// Input shapes an analyzer cannot produce a meaningful answer for.
///
/// These are advisory: callers turn them into an empty result plus a
/// diagnostic rather than aborting the run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DegenerateInput {
    #[error("empty input series")]
    Empty,

    #[error("constant signal (zero variance)")]
    ConstantSignal,

    #[error("insufficient data: need {needed}, have {available}")]
    InsufficientData { needed: usize, available: usize },

    #[error("invalid sample interval: {0}")]
    InvalidInterval(f64),

    #[error("transform length {0} is not a power of two")]
    NotPowerOfTwo(usize),

    #[error("buffer length {actual} does not match planned size {expected}")]
    LengthMismatch { expected: usize, actual: usize },
}
