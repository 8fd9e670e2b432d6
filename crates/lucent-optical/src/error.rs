//! Error types for ray tracing and material evaluation.

use lucent_spectral::SpectralError;
use thiserror::Error;

/// Errors raised while tracing rays and evaluating materials.
#[derive(Error, Debug)]
pub enum TraceError {
    /// Invalid spectral range, bin count, or mismatched spectra.
    #[error(transparent)]
    Spectral(#[from] SpectralError),

    /// A scene implementation failed to evaluate a ray.
    #[error("scene evaluation failed: {0}")]
    Scene(String),
}
