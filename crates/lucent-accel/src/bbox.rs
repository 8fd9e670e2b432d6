//! Axis-aligned bounding boxes.
//!
//! The box is both the broadphase filter the kd-tree partitions over
//! and the slab the traversal clips rays against.

use lucent_math::Point3;
use serde::{Deserialize, Serialize};

use crate::ray::Ray3;

/// Axis-aligned bounding box in 3D.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb3 {
    /// Minimum corner.
    pub min: Point3,
    /// Maximum corner.
    pub max: Point3,
}

impl Aabb3 {
    /// Create an AABB from min and max corners.
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// Create an empty (inverted) AABB suitable for expansion.
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Expand this AABB to include a point.
    pub fn include_point(&mut self, p: &Point3) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    /// Extend this AABB to include `other`.
    pub fn union(&mut self, other: &Aabb3) {
        self.include_point(&other.min);
        self.include_point(&other.max);
    }

    /// Surface area of the box; 0 for a degenerate (inverted) box.
    pub fn surface_area(&self) -> f64 {
        let dx = self.max.x - self.min.x;
        let dy = self.max.y - self.min.y;
        let dz = self.max.z - self.min.z;
        if dx < 0.0 || dy < 0.0 || dz < 0.0 {
            return 0.0;
        }
        2.0 * (dx * dy + dy * dz + dz * dx)
    }

    /// Axis (0/1/2) with the greatest extent; ties break to the lowest index.
    pub fn largest_axis(&self) -> usize {
        let extents = [
            self.max.x - self.min.x,
            self.max.y - self.min.y,
            self.max.z - self.min.z,
        ];
        let mut axis = 0;
        for i in 1..3 {
            if extents[i] > extents[axis] {
                axis = i;
            }
        }
        axis
    }

    /// Test if the point lies inside the box, inclusive on all faces.
    pub fn contains(&self, p: &Point3) -> bool {
        self.min.x <= p.x
            && p.x <= self.max.x
            && self.min.y <= p.y
            && p.y <= self.max.y
            && self.min.z <= p.z
            && p.z <= self.max.z
    }

    /// Lower bound along `axis`.
    #[inline]
    pub fn lower_index(&self, axis: usize) -> f64 {
        self.min[axis]
    }

    /// Upper bound along `axis`.
    #[inline]
    pub fn upper_index(&self, axis: usize) -> f64 {
        self.max[axis]
    }

    /// Set the lower bound along `axis`.
    #[inline]
    pub fn set_lower_index(&mut self, axis: usize, value: f64) {
        self.min[axis] = value;
    }

    /// Set the upper bound along `axis`.
    #[inline]
    pub fn set_upper_index(&mut self, axis: usize, value: f64) {
        self.max[axis] = value;
    }

    /// A copy of this box expanded by `padding` in all directions.
    pub fn padded(&self, padding: f64) -> Aabb3 {
        Aabb3 {
            min: Point3::new(
                self.min.x - padding,
                self.min.y - padding,
                self.min.z - padding,
            ),
            max: Point3::new(
                self.max.x + padding,
                self.max.y + padding,
                self.max.z + padding,
            ),
        }
    }

    /// Test ray-box intersection using the slab method.
    ///
    /// Returns `Some((t_min, t_max))` with the entry and exit parameters
    /// when the ray intersects the box. The entry distance may be
    /// negative when the ray origin lies inside the box.
    #[inline]
    pub fn full_intersection(&self, ray: &Ray3) -> Option<(f64, f64)> {
        let bounds = [self.min, self.max];
        let sign = ray.sign();
        let inv = ray.inv_direction();
        let origin = ray.origin();

        let tx1 = (bounds[sign[0]].x - origin.x) * inv.x;
        let tx2 = (bounds[1 - sign[0]].x - origin.x) * inv.x;

        let mut t_min = tx1;
        let mut t_max = tx2;

        let ty1 = (bounds[sign[1]].y - origin.y) * inv.y;
        let ty2 = (bounds[1 - sign[1]].y - origin.y) * inv.y;

        t_min = t_min.max(ty1);
        t_max = t_max.min(ty2);

        let tz1 = (bounds[sign[2]].z - origin.z) * inv.z;
        let tz2 = (bounds[1 - sign[2]].z - origin.z) * inv.z;

        t_min = t_min.max(tz1);
        t_max = t_max.min(tz2);

        if t_max >= t_min && t_max >= 0.0 {
            Some((t_min, t_max))
        } else {
            None
        }
    }
}
