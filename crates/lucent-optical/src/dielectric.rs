//! Dielectric interface material and the Sellmeier dispersion model.

use std::sync::Arc;

use lucent_math::{Point3, Transform, Vec3};
use lucent_spectral::{Function1D, Function2D};

use crate::error::TraceError;
use crate::material::Material;
use crate::ray::{Ray, Scene};
use crate::spectrum::Spectrum;

/// Reflection/transmission contributions weaker than this fraction of
/// the incident radiance are not traced.
pub const DEFAULT_CUTOFF: f64 = 1e-6;

/// Sellmeier dispersion: index of refraction as a function of
/// wavelength for transparent glasses, away from resonance regions.
///
/// `n(λ) = √(1 + Σᵢ bᵢ·w² / (w² − cᵢ))` with `w` the wavelength in
/// micrometres (`λ` is supplied in nanometres).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sellmeier {
    /// First oscillator strength.
    pub b1: f64,
    /// Second oscillator strength.
    pub b2: f64,
    /// Third oscillator strength.
    pub b3: f64,
    /// First resonance term in μm².
    pub c1: f64,
    /// Second resonance term in μm².
    pub c2: f64,
    /// Third resonance term in μm².
    pub c3: f64,
}

impl Sellmeier {
    /// Create a dispersion model from the six Sellmeier coefficients.
    pub const fn new(b1: f64, b2: f64, b3: f64, c1: f64, c2: f64, c3: f64) -> Self {
        Self {
            b1,
            b2,
            b3,
            c1,
            c2,
            c3,
        }
    }

    /// Schott N-BK7 borosilicate crown glass.
    pub const fn nbk7() -> Self {
        Self::new(
            1.03961212,
            0.231792344,
            1.01046945,
            6.00069867e-3,
            2.00179144e-2,
            103.560653,
        )
    }

    /// Fused silica (Malitson 1965).
    pub const fn fused_silica() -> Self {
        Self::new(
            0.6961663,
            0.4079426,
            0.8974794,
            4.679148e-3,
            1.3512063e-2,
            97.9340025,
        )
    }

    /// Index of refraction at `wavelength` nanometres.
    // TODO: the w² − cᵢ denominators cross zero at the resonance
    // wavelengths; inputs there are outside the calibrated range and
    // currently produce unguarded non-finite values.
    pub fn index(&self, wavelength: f64) -> f64 {
        let w2 = wavelength * wavelength * 1e-6;
        (1.0 + self.b1 * w2 / (w2 - self.c1)
            + self.b2 * w2 / (w2 - self.c2)
            + self.b3 * w2 / (w2 - self.c3))
            .sqrt()
    }
}

impl Function1D for Sellmeier {
    fn evaluate(&self, x: f64) -> f64 {
        self.index(x)
    }
}

/// A smooth dielectric interface: glass, water, gemstones.
///
/// At each surface hit the material splits the ray into a reflected and
/// a refracted daughter weighted by the unpolarised Fresnel
/// coefficients, evaluated at the ray's refraction wavelength. Total
/// internal reflection collapses the split into a single reflected ray.
/// The bulk `transmission` function is stored for volume attenuation
/// but not yet applied; `evaluate_volume` passes spectra through
/// unchanged.
pub struct Dielectric {
    index: Arc<dyn Function1D>,
    transmission: Arc<dyn Function2D>,
    cutoff: f64,
}

impl Dielectric {
    /// Create a dielectric from an index-of-refraction function and a
    /// bulk transmission function (reserved).
    pub fn new(
        index: impl Function1D + 'static,
        transmission: impl Function2D + 'static,
    ) -> Self {
        Self {
            index: Arc::new(index),
            transmission: Arc::new(transmission),
            cutoff: DEFAULT_CUTOFF,
        }
    }

    /// Replace the importance cutoff below which daughter rays are not
    /// traced.
    pub fn with_cutoff(mut self, cutoff: f64) -> Self {
        self.cutoff = cutoff;
        self
    }

    /// The index-of-refraction function.
    pub fn index(&self) -> &Arc<dyn Function1D> {
        &self.index
    }

    /// The reserved bulk transmission function.
    pub fn transmission(&self) -> &Arc<dyn Function2D> {
        &self.transmission
    }

    /// The importance cutoff.
    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }
}

impl Material for Dielectric {
    fn evaluate_surface(
        &self,
        scene: &dyn Scene,
        ray: &Ray,
        exiting: bool,
        inside_point: Point3,
        outside_point: Point3,
        normal: Vec3,
        world_to_local: &Transform,
        local_to_world: &Transform,
    ) -> Result<Spectrum, TraceError> {
        let incident = world_to_local.apply_vec(&ray.direction()).normalize();
        let normal = normal.normalize();

        // Cosine of the angle between the incident ray and the surface
        // normal. Negative when the normal faces away from the incoming
        // side; the signed square root below keeps the transmitted ray
        // on the far side of the surface either way.
        let c1 = -normal.dot(&incident);

        let internal_index = self.index.evaluate(ray.refraction_wavelength());
        let (n1, n2) = if exiting {
            (internal_index, 1.0)
        } else {
            (1.0, internal_index)
        };

        let gamma = n1 / n2;
        let c2_sqr = 1.0 - gamma * gamma * (1.0 - c1 * c1);

        if c2_sqr <= 0.0 {
            // Total internal reflection: all power reflects back into
            // the current medium.
            let reflected = local_to_world.apply_vec(&(incident + 2.0 * c1 * normal));
            let origin = if exiting { inside_point } else { outside_point };
            let origin = local_to_world.apply_point(&origin);
            return ray.spawn_daughter(origin, reflected).trace(scene);
        }

        let reflected = incident + 2.0 * c1 * normal;
        let c2 = if c1 >= 0.0 {
            c2_sqr.sqrt()
        } else {
            -c2_sqr.sqrt()
        };
        let transmitted = gamma * incident + (gamma * c1 - c2) * normal;

        // Unpolarised Fresnel reflectance; c2 equals −N·T.
        let rs = (n1 * c1 - n2 * c2) / (n1 * c1 + n2 * c2);
        let rp = (n1 * c2 - n2 * c1) / (n1 * c2 + n2 * c1);
        let reflectivity = 0.5 * (rs * rs + rp * rp);
        let transmissivity = 1.0 - reflectivity;

        let reflected = local_to_world.apply_vec(&reflected);
        let transmitted = local_to_world.apply_vec(&transmitted);
        let inside_point = local_to_world.apply_point(&inside_point);
        let outside_point = local_to_world.apply_point(&outside_point);

        // The reflected ray continues in the incident medium, the
        // transmitted ray starts on the other side of the surface.
        let (reflected_origin, transmitted_origin) = if exiting {
            (inside_point, outside_point)
        } else {
            (outside_point, inside_point)
        };

        let mut spectrum = if reflectivity > self.cutoff {
            let mut reflected_spectrum = ray
                .spawn_daughter(reflected_origin, reflected)
                .trace(scene)?;
            reflected_spectrum.mul_scalar(reflectivity);
            reflected_spectrum
        } else {
            ray.new_spectrum()
        };

        if transmissivity > self.cutoff {
            let mut transmitted_spectrum = ray
                .spawn_daughter(transmitted_origin, transmitted)
                .trace(scene)?;
            transmitted_spectrum.mul_scalar(transmissivity);
            spectrum.add_samples(transmitted_spectrum.samples())?;
        }

        Ok(spectrum)
    }
}
