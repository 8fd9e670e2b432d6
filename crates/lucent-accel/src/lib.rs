#![warn(missing_docs)]

//! Spatial acceleration for the lucent ray-tracing core.
//!
//! # Architecture
//!
//! - [`Aabb3`] - axis-aligned bounding box with the slab intersection
//!   test and the per-axis accessors the partitioner sweeps over
//! - [`Ray3`] - geometric ray with precomputed reciprocal direction
//! - [`KdTree3`] - kd-tree built with the surface area heuristic,
//!   answering first-hit ray queries and point containment through the
//!   [`LeafVisitor`] seam, persistable to binary or JSON
//!
//! The tree never touches real geometry: it partitions `(id, bounds)`
//! [`Item`]s and hands leaf id lists to the caller's visitor, which owns
//! the exact intersection logic.

mod bbox;
mod error;
mod kdtree;
mod ray;

pub use bbox::Aabb3;
pub use error::KdTreeError;
pub use kdtree::{FnVisitor, Item, ItemId, KdNode, KdSettings, KdTree3, LeafVisitor};
pub use ray::Ray3;
