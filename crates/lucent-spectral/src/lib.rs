#![warn(missing_docs)]

//! Spectral function abstraction for the lucent ray-tracing core.
//!
//! A spectral function maps wavelength (nanometres) to a scalar value —
//! an index of refraction, an emission curve, a filter response. Three
//! concrete forms share one sampling contract:
//!
//! - [`ConstantSf`] - a wavelength-independent constant
//! - [`InterpolatedSf`] - irregularly tabulated anchors, linearly
//!   interpolated and extrapolated
//! - [`SampledSf`] - regularly spaced bins sampled at bin centres
//!
//! The [`SpectralFunction`] enum dispatches between them. Sampling has a
//! slow mode (piecewise-linear bin averaging, the default) and a fast
//! mode (point lookup at the bin centre) selected per sampled data set.
//!
//! The [`Function1D`]/[`Function2D`] traits are the seams through which
//! materials consume scalar optical data without committing to a
//! concrete representation.

mod error;
mod function;
mod spectral;

pub use error::SpectralError;
pub use function::{FnFunction1D, FnFunction2D, Function1D, Function2D};
pub use spectral::{ConstantSf, InterpolatedSf, SampledSf, SpectralFunction};
