//! Binned radiance spectra accumulated along rays.

use lucent_spectral::{SampledSf, SpectralError};
use serde::{Deserialize, Serialize};

/// A radiance spectrum: regularly spaced wavelength bins accumulated
/// while tracing a ray.
///
/// Bin `i` covers `[min + i·Δλ, min + (i+1)·Δλ]` and is attributed to
/// the bin-centre wavelength.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spectrum {
    min_wavelength: f64,
    max_wavelength: f64,
    delta_wavelength: f64,
    samples: Vec<f64>,
}

impl Spectrum {
    /// Create a zero-filled spectrum over `[min_wavelength, max_wavelength]`.
    pub fn new(min_wavelength: f64, max_wavelength: f64, bins: usize) -> Result<Self, SpectralError> {
        if !(min_wavelength > 0.0 && max_wavelength > min_wavelength) {
            return Err(SpectralError::InvalidRange {
                min: min_wavelength,
                max: max_wavelength,
            });
        }
        if bins < 1 {
            return Err(SpectralError::InvalidSampleCount(bins));
        }
        Ok(Self {
            min_wavelength,
            max_wavelength,
            delta_wavelength: (max_wavelength - min_wavelength) / bins as f64,
            samples: vec![0.0; bins],
        })
    }

    /// Lower bound of the spectral range in nanometres.
    pub fn min_wavelength(&self) -> f64 {
        self.min_wavelength
    }

    /// Upper bound of the spectral range in nanometres.
    pub fn max_wavelength(&self) -> f64 {
        self.max_wavelength
    }

    /// Number of bins.
    pub fn bins(&self) -> usize {
        self.samples.len()
    }

    /// Width of one bin in nanometres.
    pub fn delta_wavelength(&self) -> f64 {
        self.delta_wavelength
    }

    /// The bin values.
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    /// Mutable access to the bin values.
    pub fn samples_mut(&mut self) -> &mut [f64] {
        &mut self.samples
    }

    /// Centre wavelength of bin `bin`.
    pub fn wavelength(&self, bin: usize) -> f64 {
        self.min_wavelength + (bin as f64 + 0.5) * self.delta_wavelength
    }

    /// Scale every bin by `factor`.
    pub fn mul_scalar(&mut self, factor: f64) {
        for sample in &mut self.samples {
            *sample *= factor;
        }
    }

    /// Add `values` bin-wise into this spectrum.
    ///
    /// Fails unless `values` has exactly this spectrum's bin count.
    pub fn add_samples(&mut self, values: &[f64]) -> Result<(), SpectralError> {
        if values.len() != self.samples.len() {
            return Err(SpectralError::InvalidData(format!(
                "bin count mismatch: spectrum has {}, addend has {}",
                self.samples.len(),
                values.len()
            )));
        }
        for (sample, value) in self.samples.iter_mut().zip(values) {
            *sample += value;
        }
        Ok(())
    }

    /// True when every bin is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.samples.iter().all(|&s| s == 0.0)
    }

    /// View this spectrum as a spectral function with fast sampling.
    pub fn to_sampled_sf(&self) -> SampledSf {
        SampledSf::new(
            self.min_wavelength,
            self.max_wavelength,
            self.samples.clone(),
            true,
        )
        .expect("spectrum ranges are validated at construction")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_zero_filled() {
        let s = Spectrum::new(375.0, 740.0, 40).unwrap();
        assert_eq!(s.bins(), 40);
        assert!(s.is_zero());
        assert!((s.delta_wavelength() - 9.125).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_construction() {
        assert!(Spectrum::new(740.0, 375.0, 40).is_err());
        assert!(Spectrum::new(-1.0, 375.0, 40).is_err());
        assert!(Spectrum::new(375.0, 740.0, 0).is_err());
    }

    #[test]
    fn test_mul_scalar_and_add() {
        let mut s = Spectrum::new(400.0, 500.0, 4).unwrap();
        s.add_samples(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        s.mul_scalar(0.5);
        assert_eq!(s.samples(), &[0.5, 1.0, 1.5, 2.0]);
        assert!(!s.is_zero());
    }

    #[test]
    fn test_add_samples_bin_mismatch() {
        let mut s = Spectrum::new(400.0, 500.0, 4).unwrap();
        assert!(s.add_samples(&[1.0, 2.0]).is_err());
    }

    #[test]
    fn test_wavelength_centres() {
        let s = Spectrum::new(400.0, 500.0, 4).unwrap();
        assert!((s.wavelength(0) - 412.5).abs() < 1e-12);
        assert!((s.wavelength(3) - 487.5).abs() < 1e-12);
    }

    #[test]
    fn test_to_sampled_sf() {
        let mut s = Spectrum::new(400.0, 500.0, 2).unwrap();
        s.add_samples(&[1.0, 3.0]).unwrap();
        let sf = s.to_sampled_sf();
        assert!(sf.fast_sample());
        assert_eq!(sf.samples(), s.samples());
    }
}
