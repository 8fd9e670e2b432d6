//! The material seam: how surfaces and volumes respond to rays.

use lucent_math::{Point3, Transform, Vec3};

use crate::error::TraceError;
use crate::ray::{Ray, Scene};
use crate::spectrum::Spectrum;

/// Surface and volume response of a primitive's material.
///
/// `evaluate_surface` runs in the primitive's local frame: the supplied
/// normal and hit-offset points are local, and the transform pair maps
/// between world and local space. Implementations spawn daughter rays
/// in world space and return the spectrum arriving along the incident
/// ray.
pub trait Material: Send + Sync {
    /// Evaluate the response of a surface hit.
    ///
    /// `exiting` is true when the ray leaves the material at this hit.
    /// `inside_point` and `outside_point` are offset from the geometric
    /// hit on either side of the surface so daughter rays do not
    /// immediately re-intersect it. `normal` points outward from the
    /// surface and need not be unit length.
    #[allow(clippy::too_many_arguments)]
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
    ) -> Result<Spectrum, TraceError>;

    /// Evaluate the passage of `spectrum` through the material's bulk
    /// between `entry_point` and `exit_point`.
    ///
    /// The default is a pass-through: the spectrum is returned
    /// unchanged.
    fn evaluate_volume(
        &self,
        spectrum: Spectrum,
        ray: &Ray,
        entry_point: Point3,
        exit_point: Point3,
    ) -> Result<Spectrum, TraceError> {
        let _ = (ray, entry_point, exit_point);
        Ok(spectrum)
    }
}
