//! Error types for spectral data validation.

use thiserror::Error;

/// Errors raised when constructing or sampling spectral functions.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpectralError {
    /// Wavelength range is empty, inverted, or extends to non-positive values.
    #[error("invalid wavelength range: [{min}, {max}] nm")]
    InvalidRange {
        /// Lower bound of the offending range in nanometres.
        min: f64,
        /// Upper bound of the offending range in nanometres.
        max: f64,
    },

    /// A sample or bin count outside the permitted domain.
    #[error("invalid sample count: {0} (must be at least 1)")]
    InvalidSampleCount(usize),

    /// Malformed spectral data arrays.
    #[error("invalid spectral data: {0}")]
    InvalidData(String),
}
