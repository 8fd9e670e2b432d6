//! Spectral rays and the scene seam they are traced against.

use lucent_math::{Point3, Vec3};
use lucent_spectral::SpectralError;

use crate::error::TraceError;
use crate::spectrum::Spectrum;

/// Default bounce limit for freshly constructed rays.
pub const DEFAULT_MAX_DEPTH: u32 = 15;

/// Anything a ray can be traced against: typically the world container
/// holding the scene's primitives and their acceleration structure.
pub trait Scene: Send + Sync {
    /// Compute the spectral radiance arriving along `ray`.
    fn trace_ray(&self, ray: &Ray) -> Result<Spectrum, TraceError>;
}

/// A ray carrying a spectral window through the scene.
///
/// Besides origin and direction, a ray knows the wavelength band it
/// samples, the single wavelength dispersive materials refract it at,
/// and how many bounces deep it is. Daughter rays spawned at surface
/// interactions inherit the spectral state and increment the depth;
/// tracing past the depth limit yields a zero spectrum, which is what
/// terminates recursive material evaluation.
#[derive(Debug, Clone)]
pub struct Ray {
    origin: Point3,
    direction: Vec3,
    min_wavelength: f64,
    max_wavelength: f64,
    bins: usize,
    refraction_wavelength: f64,
    depth: u32,
    max_depth: u32,
}

impl Ray {
    /// Create a primary ray sampling `[min_wavelength, max_wavelength]`
    /// over `bins` bins.
    ///
    /// The direction is normalised; the refraction wavelength defaults
    /// to the centre of the spectral window.
    pub fn new(
        origin: Point3,
        direction: Vec3,
        min_wavelength: f64,
        max_wavelength: f64,
        bins: usize,
    ) -> Result<Self, SpectralError> {
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
            origin,
            direction: direction.normalize(),
            min_wavelength,
            max_wavelength,
            bins,
            refraction_wavelength: 0.5 * (min_wavelength + max_wavelength),
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        })
    }

    /// Replace the bounce limit.
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Replace the wavelength dispersive materials refract this ray at.
    ///
    /// Fails for non-positive wavelengths.
    pub fn with_refraction_wavelength(mut self, wavelength: f64) -> Result<Self, SpectralError> {
        if wavelength <= 0.0 {
            return Err(SpectralError::InvalidRange {
                min: wavelength,
                max: wavelength,
            });
        }
        self.refraction_wavelength = wavelength;
        Ok(self)
    }

    /// Origin point of the ray.
    pub fn origin(&self) -> Point3 {
        self.origin
    }

    /// Unit direction of the ray.
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Lower bound of the sampled band in nanometres.
    pub fn min_wavelength(&self) -> f64 {
        self.min_wavelength
    }

    /// Upper bound of the sampled band in nanometres.
    pub fn max_wavelength(&self) -> f64 {
        self.max_wavelength
    }

    /// Number of spectral bins.
    pub fn bins(&self) -> usize {
        self.bins
    }

    /// The single wavelength dispersive materials refract this ray at.
    pub fn refraction_wavelength(&self) -> f64 {
        self.refraction_wavelength
    }

    /// Bounce count: 0 for primary rays.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Bounce limit beyond which tracing returns a zero spectrum.
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// A zero spectrum matching this ray's spectral window.
    pub fn new_spectrum(&self) -> Spectrum {
        Spectrum::new(self.min_wavelength, self.max_wavelength, self.bins)
            .expect("ray spectral windows are validated at construction")
    }

    /// Spawn a child ray continuing this ray's spectral state one
    /// bounce deeper.
    pub fn spawn_daughter(&self, origin: Point3, direction: Vec3) -> Ray {
        Ray {
            origin,
            direction: direction.normalize(),
            min_wavelength: self.min_wavelength,
            max_wavelength: self.max_wavelength,
            bins: self.bins,
            refraction_wavelength: self.refraction_wavelength,
            depth: self.depth + 1,
            max_depth: self.max_depth,
        }
    }

    /// Trace this ray against a scene.
    ///
    /// Past the bounce limit this returns the zero spectrum without
    /// consulting the scene.
    pub fn trace(&self, scene: &dyn Scene) -> Result<Spectrum, TraceError> {
        if self.depth > self.max_depth {
            return Ok(self.new_spectrum());
        }
        scene.trace_ray(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_ray_defaults() {
        let ray = Ray::new(
            Point3::origin(),
            Vec3::new(0.0, 0.0, 2.0),
            375.0,
            740.0,
            40,
        )
        .unwrap();
        assert!((ray.direction().norm() - 1.0).abs() < 1e-12);
        assert!((ray.refraction_wavelength() - 557.5).abs() < 1e-12);
        assert_eq!(ray.depth(), 0);
        assert_eq!(ray.max_depth(), DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn test_invalid_window() {
        assert!(Ray::new(Point3::origin(), Vec3::z(), 740.0, 375.0, 40).is_err());
        assert!(Ray::new(Point3::origin(), Vec3::z(), 375.0, 740.0, 0).is_err());
        let ray = Ray::new(Point3::origin(), Vec3::z(), 375.0, 740.0, 40).unwrap();
        assert!(ray.with_refraction_wavelength(-500.0).is_err());
    }

    #[test]
    fn test_spawn_daughter_inherits_spectral_state() {
        let ray = Ray::new(Point3::origin(), Vec3::z(), 375.0, 740.0, 40)
            .unwrap()
            .with_refraction_wavelength(600.0)
            .unwrap()
            .with_max_depth(3);
        let daughter = ray.spawn_daughter(Point3::new(0.0, 0.0, 1.0), Vec3::x());
        assert_eq!(daughter.depth(), 1);
        assert_eq!(daughter.max_depth(), 3);
        assert_eq!(daughter.bins(), 40);
        assert_eq!(daughter.refraction_wavelength(), 600.0);
    }

    #[test]
    fn test_trace_terminates_at_depth_limit() {
        struct Unreachable;
        impl Scene for Unreachable {
            fn trace_ray(&self, _ray: &Ray) -> Result<Spectrum, TraceError> {
                panic!("scene must not be consulted past the depth limit");
            }
        }

        let ray = Ray::new(Point3::origin(), Vec3::z(), 375.0, 740.0, 40)
            .unwrap()
            .with_max_depth(0);
        let daughter = ray.spawn_daughter(Point3::origin(), Vec3::x());
        let spectrum = daughter.trace(&Unreachable).unwrap();
        assert!(spectrum.is_zero());
        assert_eq!(spectrum.bins(), 40);
    }
}
