//! Geometric ray used by spatial queries.

use lucent_math::{Point3, Vec3};

/// A ray in 3D space defined by origin and direction.
///
/// The direction is stored as given; the query parameter `t` is in
/// units of the direction's length. Reciprocal direction components and
/// their signs are precomputed for fast slab tests.
#[derive(Debug, Clone, Copy)]
pub struct Ray3 {
    origin: Point3,
    direction: Vec3,
    inv_direction: Vec3,
    sign: [usize; 3],
}

impl Ray3 {
    /// Create a new ray from origin and direction.
    pub fn new(origin: Point3, direction: Vec3) -> Self {
        let inv = Vec3::new(1.0 / direction.x, 1.0 / direction.y, 1.0 / direction.z);
        let sign = [
            if inv.x < 0.0 { 1 } else { 0 },
            if inv.y < 0.0 { 1 } else { 0 },
            if inv.z < 0.0 { 1 } else { 0 },
        ];
        Self {
            origin,
            direction,
            inv_direction: inv,
            sign,
        }
    }

    /// Origin point of the ray.
    pub fn origin(&self) -> Point3 {
        self.origin
    }

    /// Direction of the ray.
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Precomputed reciprocal of the direction components.
    ///
    /// Components are infinite where the direction is axis-parallel.
    pub fn inv_direction(&self) -> Vec3 {
        self.inv_direction
    }

    /// Sign of each direction component (0 if positive, 1 if negative).
    pub fn sign(&self) -> [usize; 3] {
        self.sign
    }

    /// Evaluate the ray at parameter `t`: `origin + t * direction`.
    #[inline]
    pub fn at(&self, t: f64) -> Point3 {
        self.origin + t * self.direction
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_at() {
        let ray = Ray3::new(Point3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        let p = ray.at(5.0);
        assert!((p.x - 5.0).abs() < 1e-12);
        assert!(p.y.abs() < 1e-12);
        assert!(p.z.abs() < 1e-12);
    }

    #[test]
    fn test_ray_sign_and_reciprocal() {
        let ray = Ray3::new(Point3::origin(), Vec3::new(-2.0, 0.0, 4.0));
        assert_eq!(ray.sign(), [1, 0, 0]);
        assert!((ray.inv_direction().x + 0.5).abs() < 1e-12);
        assert!(ray.inv_direction().y.is_infinite());
        assert!((ray.inv_direction().z - 0.25).abs() < 1e-12);
    }
}
