//! Wavelength→value spectral functions.
//!
//! Three concrete forms share one sampling contract: a single constant,
//! an irregularly tabulated curve with linear interpolation, and a
//! regularly binned sample array. All wavelengths are in nanometres.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::error::SpectralError;

/// A spectral function: a mapping from wavelength to a scalar value.
///
/// The enum dispatches sampling without virtual calls on the hot path.
/// Instances are cheap to clone and safe to share between threads.
#[derive(Debug, Clone)]
pub enum SpectralFunction {
    /// A wavelength-independent constant.
    Constant(ConstantSf),
    /// Linear interpolation over tabulated anchor points.
    Interpolated(InterpolatedSf),
    /// Regularly spaced pre-sampled bins.
    Sampled(Arc<SampledSf>),
}

impl SpectralFunction {
    /// Sample the function over the wavelength range `[min_wavelength, max_wavelength]`.
    ///
    /// For pre-sampled data flagged `fast_sample`, this is the value at
    /// the range centre; otherwise it is the mean over the range.
    pub fn sample(&self, min_wavelength: f64, max_wavelength: f64) -> Result<f64, SpectralError> {
        check_range(min_wavelength, max_wavelength)?;
        match self {
            SpectralFunction::Constant(sf) => Ok(sf.value()),
            SpectralFunction::Interpolated(sf) => Ok(sf.average(min_wavelength, max_wavelength)),
            SpectralFunction::Sampled(sf) => {
                if sf.fast_sample() {
                    Ok(sf.evaluate(0.5 * (min_wavelength + max_wavelength)))
                } else {
                    Ok(sf.average(min_wavelength, max_wavelength))
                }
            }
        }
    }

    /// Mean value of the function over `[min_wavelength, max_wavelength]`.
    pub fn average(&self, min_wavelength: f64, max_wavelength: f64) -> Result<f64, SpectralError> {
        check_range(min_wavelength, max_wavelength)?;
        match self {
            SpectralFunction::Constant(sf) => Ok(sf.value()),
            SpectralFunction::Interpolated(sf) => Ok(sf.average(min_wavelength, max_wavelength)),
            SpectralFunction::Sampled(sf) => Ok(sf.average(min_wavelength, max_wavelength)),
        }
    }

    /// Re-sample the function into `bins` regularly spaced bins over
    /// `[min_wavelength, max_wavelength]`.
    ///
    /// A pre-sampled function whose shape already matches the request
    /// returns itself; the constant function caches its most recently
    /// produced sampling and returns it on shape-identical requests.
    pub fn sample_multiple(
        &self,
        min_wavelength: f64,
        max_wavelength: f64,
        bins: usize,
    ) -> Result<Arc<SampledSf>, SpectralError> {
        check_range(min_wavelength, max_wavelength)?;
        if bins < 1 {
            return Err(SpectralError::InvalidSampleCount(bins));
        }
        match self {
            SpectralFunction::Constant(sf) => sf.sample_multiple(min_wavelength, max_wavelength, bins),
            SpectralFunction::Interpolated(sf) => {
                Ok(Arc::new(sf.sample_multiple(min_wavelength, max_wavelength, bins)))
            }
            SpectralFunction::Sampled(sf) => {
                if sf.matches(min_wavelength, max_wavelength, bins) {
                    Ok(sf.clone())
                } else {
                    Ok(Arc::new(sf.resample(min_wavelength, max_wavelength, bins)))
                }
            }
        }
    }
}

impl From<ConstantSf> for SpectralFunction {
    fn from(sf: ConstantSf) -> Self {
        SpectralFunction::Constant(sf)
    }
}

impl From<InterpolatedSf> for SpectralFunction {
    fn from(sf: InterpolatedSf) -> Self {
        SpectralFunction::Interpolated(sf)
    }
}

impl From<SampledSf> for SpectralFunction {
    fn from(sf: SampledSf) -> Self {
        SpectralFunction::Sampled(Arc::new(sf))
    }
}

fn check_range(min_wavelength: f64, max_wavelength: f64) -> Result<(), SpectralError> {
    if !(min_wavelength > 0.0 && max_wavelength > min_wavelength) {
        return Err(SpectralError::InvalidRange {
            min: min_wavelength,
            max: max_wavelength,
        });
    }
    Ok(())
}

// =============================================================================
// Constant
// =============================================================================

/// A wavelength-independent spectral constant.
///
/// Holds a one-slot cache of the most recently produced sampling so
/// repeated requests with the same shape (the common case when every
/// ray in a pass shares one spectral window) cost an `Arc` clone.
#[derive(Debug)]
pub struct ConstantSf {
    value: f64,
    cache: Mutex<Option<Arc<SampledSf>>>,
}

impl ConstantSf {
    /// Create a constant spectral function.
    pub fn new(value: f64) -> Self {
        Self {
            value,
            cache: Mutex::new(None),
        }
    }

    /// The constant value.
    pub fn value(&self) -> f64 {
        self.value
    }

    fn sample_multiple(
        &self,
        min_wavelength: f64,
        max_wavelength: f64,
        bins: usize,
    ) -> Result<Arc<SampledSf>, SpectralError> {
        let mut cache = self
            .cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(cached) = cache.as_ref() {
            if cached.matches(min_wavelength, max_wavelength, bins) {
                return Ok(cached.clone());
            }
        }
        let sampled = Arc::new(SampledSf::new(
            min_wavelength,
            max_wavelength,
            vec![self.value; bins],
            false,
        )?);
        *cache = Some(sampled.clone());
        Ok(sampled)
    }
}

impl Clone for ConstantSf {
    fn clone(&self) -> Self {
        // The cache is an optimisation, not state; clones start cold.
        Self::new(self.value)
    }
}

// =============================================================================
// Interpolated
// =============================================================================

/// A spectral function tabulated at strictly increasing wavelengths,
/// linearly interpolated between anchors and linearly extrapolated
/// outside them from the end segments.
#[derive(Debug, Clone)]
pub struct InterpolatedSf {
    wavelengths: Vec<f64>,
    samples: Vec<f64>,
}

impl InterpolatedSf {
    /// Create an interpolated spectral function from parallel anchor arrays.
    ///
    /// `wavelengths` must be strictly increasing, positive, and have the
    /// same length as `samples` (at least two anchors).
    pub fn new(wavelengths: Vec<f64>, samples: Vec<f64>) -> Result<Self, SpectralError> {
        if wavelengths.len() != samples.len() {
            return Err(SpectralError::InvalidData(format!(
                "anchor arrays have mismatched lengths ({} wavelengths, {} samples)",
                wavelengths.len(),
                samples.len()
            )));
        }
        if wavelengths.len() < 2 {
            return Err(SpectralError::InvalidData(
                "interpolation requires at least two anchor points".to_string(),
            ));
        }
        if wavelengths[0] <= 0.0 {
            return Err(SpectralError::InvalidData(
                "wavelengths must be positive".to_string(),
            ));
        }
        if wavelengths.windows(2).any(|w| w[0] >= w[1]) {
            return Err(SpectralError::InvalidData(
                "wavelengths must be strictly increasing".to_string(),
            ));
        }
        if wavelengths.iter().chain(samples.iter()).any(|v| !v.is_finite()) {
            return Err(SpectralError::InvalidData(
                "anchor values must be finite".to_string(),
            ));
        }
        Ok(Self {
            wavelengths,
            samples,
        })
    }

    /// Interpolated value at `wavelength`.
    pub fn evaluate(&self, wavelength: f64) -> f64 {
        interpolate(&self.wavelengths, &self.samples, wavelength)
    }

    /// Mean value over `[min_wavelength, max_wavelength]`.
    pub fn average(&self, min_wavelength: f64, max_wavelength: f64) -> f64 {
        integrate(&self.wavelengths, &self.samples, min_wavelength, max_wavelength)
            / (max_wavelength - min_wavelength)
    }

    fn sample_multiple(&self, min_wavelength: f64, max_wavelength: f64, bins: usize) -> SampledSf {
        let delta = (max_wavelength - min_wavelength) / bins as f64;
        let samples = (0..bins)
            .map(|i| {
                let lower = min_wavelength + i as f64 * delta;
                self.average(lower, lower + delta)
            })
            .collect();
        // Range and count were validated by the caller; rebuilding the
        // carrier cannot fail.
        SampledSf::new(min_wavelength, max_wavelength, samples, false)
            .expect("validated sampling request")
    }
}

// =============================================================================
// Sampled
// =============================================================================

/// A spectral function stored as regularly spaced bins.
///
/// Bin `i` holds the value attributed to the wavelength interval
/// `[min + i·Δλ, min + (i+1)·Δλ]`, sampled at the bin centre. With
/// `fast_sample` set, single-value sampling reads the interpolated
/// centre value instead of integrating over the request range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampledSf {
    min_wavelength: f64,
    max_wavelength: f64,
    delta_wavelength: f64,
    samples: Vec<f64>,
    fast_sample: bool,
}

impl SampledSf {
    /// Create a sampled spectral function over `[min_wavelength, max_wavelength]`.
    pub fn new(
        min_wavelength: f64,
        max_wavelength: f64,
        samples: Vec<f64>,
        fast_sample: bool,
    ) -> Result<Self, SpectralError> {
        check_range(min_wavelength, max_wavelength)?;
        if samples.is_empty() {
            return Err(SpectralError::InvalidSampleCount(0));
        }
        let delta_wavelength = (max_wavelength - min_wavelength) / samples.len() as f64;
        Ok(Self {
            min_wavelength,
            max_wavelength,
            delta_wavelength,
            samples,
            fast_sample,
        })
    }

    /// Lower bound of the sampled range in nanometres.
    pub fn min_wavelength(&self) -> f64 {
        self.min_wavelength
    }

    /// Upper bound of the sampled range in nanometres.
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

    /// Whether single-value sampling short-cuts to the centre value.
    pub fn fast_sample(&self) -> bool {
        self.fast_sample
    }

    /// Centre wavelength of bin `bin`.
    pub fn wavelength(&self, bin: usize) -> f64 {
        self.min_wavelength + (bin as f64 + 0.5) * self.delta_wavelength
    }

    /// Whether this sampling already has the requested shape.
    pub fn matches(&self, min_wavelength: f64, max_wavelength: f64, bins: usize) -> bool {
        self.min_wavelength == min_wavelength
            && self.max_wavelength == max_wavelength
            && self.samples.len() == bins
    }

    /// Value at `wavelength`, linearly interpolated between bin centres
    /// and extrapolated beyond the first/last centre.
    pub fn evaluate(&self, wavelength: f64) -> f64 {
        let n = self.samples.len();
        if n == 1 {
            return self.samples[0];
        }
        // Fractional position in bin-centre coordinates; clamping the
        // segment index extrapolates from the end segments.
        let u = (wavelength - self.min_wavelength) / self.delta_wavelength - 0.5;
        let segment = (u.floor() as isize).clamp(0, n as isize - 2) as usize;
        let frac = u - segment as f64;
        self.samples[segment] + (self.samples[segment + 1] - self.samples[segment]) * frac
    }

    /// Mean value over `[min_wavelength, max_wavelength]`, integrating the
    /// bin-centre polyline.
    pub fn average(&self, min_wavelength: f64, max_wavelength: f64) -> f64 {
        if self.samples.len() == 1 {
            return self.samples[0];
        }
        let centres = self.centres();
        integrate(&centres, &self.samples, min_wavelength, max_wavelength)
            / (max_wavelength - min_wavelength)
    }

    fn centres(&self) -> Vec<f64> {
        (0..self.samples.len()).map(|i| self.wavelength(i)).collect()
    }

    fn resample(&self, min_wavelength: f64, max_wavelength: f64, bins: usize) -> SampledSf {
        let delta = (max_wavelength - min_wavelength) / bins as f64;
        let samples = if self.fast_sample || self.samples.len() == 1 {
            (0..bins)
                .map(|i| self.evaluate(min_wavelength + (i as f64 + 0.5) * delta))
                .collect()
        } else {
            let centres = self.centres();
            (0..bins)
                .map(|i| {
                    let lower = min_wavelength + i as f64 * delta;
                    integrate(&centres, &self.samples, lower, lower + delta) / delta
                })
                .collect()
        };
        SampledSf::new(min_wavelength, max_wavelength, samples, self.fast_sample)
            .expect("validated sampling request")
    }
}

// =============================================================================
// Piecewise-linear helpers
// =============================================================================

/// Value of the polyline `(xs, ys)` at `x`, extrapolating from the end
/// segments outside the anchor range. `xs` is strictly increasing with
/// at least two entries.
fn interpolate(xs: &[f64], ys: &[f64], x: f64) -> f64 {
    debug_assert!(xs.len() >= 2 && xs.len() == ys.len());
    let segment = match xs.binary_search_by(|v| v.partial_cmp(&x).expect("finite anchor")) {
        Ok(i) => i,
        Err(i) => i.saturating_sub(1),
    }
    .min(xs.len() - 2);
    let (x0, x1) = (xs[segment], xs[segment + 1]);
    let (y0, y1) = (ys[segment], ys[segment + 1]);
    y0 + (y1 - y0) * (x - x0) / (x1 - x0)
}

/// Integral of the polyline `(xs, ys)` over `[a, b]` (with `a < b`),
/// extrapolating linearly outside the anchor range.
fn integrate(xs: &[f64], ys: &[f64], a: f64, b: f64) -> f64 {
    let mut total = 0.0;
    let mut prev_x = a;
    let mut prev_y = interpolate(xs, ys, a);
    for (&x, &y) in xs.iter().zip(ys.iter()) {
        if x <= a {
            continue;
        }
        if x >= b {
            break;
        }
        total += 0.5 * (prev_y + y) * (x - prev_x);
        prev_x = x;
        prev_y = y;
    }
    let end_y = interpolate(xs, ys, b);
    total + 0.5 * (prev_y + end_y) * (b - prev_x)
}
