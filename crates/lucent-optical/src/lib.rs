#![warn(missing_docs)]

//! Spectral rays and surface materials for the lucent ray-tracing core.
//!
//! # Architecture
//!
//! - [`Spectrum`] - binned radiance carrier accumulated along a ray
//! - [`Ray`] - spectral ray with a per-ray refraction wavelength and a
//!   depth-limited recursive [`Ray::trace`]
//! - [`Scene`] - the seam a ray is traced against; the world container
//!   and its acceleration structure live behind it
//! - [`Material`] - surface/volume response trait
//! - [`Dielectric`] - smooth dielectric interface driven by Snell's law
//!   and unpolarised Fresnel coefficients, with [`Sellmeier`]
//!   dispersion for wavelength-dependent indices

mod dielectric;
mod error;
mod material;
mod ray;
mod spectrum;

pub use dielectric::{Dielectric, Sellmeier, DEFAULT_CUTOFF};
pub use error::TraceError;
pub use material::Material;
pub use ray::{Ray, Scene, DEFAULT_MAX_DEPTH};
pub use spectrum::Spectrum;
