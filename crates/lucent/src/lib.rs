#![warn(missing_docs)]

//! lucent — spectral ray-tracing core.
//!
//! The engine's two load-bearing pieces, plus the spectral machinery
//! they stand on:
//!
//! - a 3D kd-tree built with the surface area heuristic, answering
//!   first-hit ray queries and point containment over caller geometry
//! - a dielectric interface material computing reflection, refraction,
//!   and total internal reflection from wavelength-dependent indices
//!
//! # Example
//!
//! ```
//! use lucent::{Aabb3, Item, KdSettings, KdTree3, Point3};
//!
//! let items = vec![
//!     Item::new(0, Aabb3::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0))),
//!     Item::new(1, Aabb3::new(Point3::new(2.0, 0.0, 0.0), Point3::new(3.0, 1.0, 1.0))),
//! ];
//! let tree = KdTree3::build(items, KdSettings::default()).unwrap();
//! assert!(tree.bounds().contains(&Point3::new(2.5, 0.5, 0.5)));
//! ```

pub use lucent_accel;
pub use lucent_math;
pub use lucent_optical;
pub use lucent_spectral;

pub use lucent_accel::{
    Aabb3, FnVisitor, Item, ItemId, KdNode, KdSettings, KdTree3, KdTreeError, LeafVisitor, Ray3,
};
pub use lucent_math::{Dir3, Point3, Transform, Vec3};
pub use lucent_optical::{
    Dielectric, Material, Ray, Scene, Sellmeier, Spectrum, TraceError, DEFAULT_CUTOFF,
    DEFAULT_MAX_DEPTH,
};
pub use lucent_spectral::{
    ConstantSf, FnFunction1D, FnFunction2D, Function1D, Function2D, InterpolatedSf, SampledSf,
    SpectralError, SpectralFunction,
};
