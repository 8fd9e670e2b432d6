//! SAH-built kd-tree over items with finite extents.
//!
//! The tree indexes opaque `(id, bounds)` items; what an id means is the
//! caller's business. Queries dispatch into a [`LeafVisitor`] when they
//! reach a leaf, so intersection logic against the real geometry stays
//! outside the tree. Nodes live in one contiguous array filled
//! depth-first: a branch's lower child is always the next slot, only the
//! upper child index is stored.

use lucent_math::Point3;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::bbox::Aabb3;
use crate::error::KdTreeError;
use crate::ray::Ray3;

/// Identifier of an item indexed by the tree.
pub type ItemId = u32;

/// An indexable item: an id referring to external geometry, plus the
/// bounds of that geometry.
#[derive(Debug, Clone, Copy)]
pub struct Item {
    /// External identifier, stored in the leaves.
    pub id: ItemId,
    /// Finite extent of the item.
    pub bounds: Aabb3,
}

impl Item {
    /// Create a new item.
    pub fn new(id: ItemId, bounds: Aabb3) -> Self {
        Self { id, bounds }
    }
}

/// Build parameters for the surface area heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KdSettings {
    /// Maximum tree depth; 0 derives `ceil(8 + 1.3·ln N)` from the item count.
    pub max_depth: u32,
    /// Item count at or below which a node becomes a leaf (clamped to ≥ 1).
    pub min_items: u32,
    /// Relative cost of testing an item vs. traversing a node (clamped to ≥ 1).
    pub hit_cost: f64,
    /// Cost reduction for splits that cut off empty space, in `[0, 1]`.
    pub empty_bonus: f64,
}

impl Default for KdSettings {
    fn default() -> Self {
        Self {
            max_depth: 0,
            min_items: 1,
            hit_cost: 20.0,
            empty_bonus: 0.2,
        }
    }
}

/// A node of the packed tree array.
///
/// `Branch.axis` is the split axis index (0/1/2). The lower child of
/// `nodes[i]` is `nodes[i + 1]`; `upper` points at the upper child. The
/// split plane itself belongs to the upper child.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum KdNode {
    /// Leaf holding the ids of the items overlapping its region.
    Leaf {
        /// Item ids filtered into this leaf.
        items: Vec<ItemId>,
    },
    /// Interior node splitting space on an axis-aligned plane.
    Branch {
        /// Split axis: 0 = x, 1 = y, 2 = z.
        axis: u8,
        /// Coordinate of the splitting plane along `axis`.
        split: f64,
        /// Index of the upper child node.
        upper: u32,
    },
}

/// Leaf hooks invoked by tree queries.
///
/// Both hooks have default bodies that fail with
/// [`KdTreeError::NotImplemented`], so a visitor only answering one
/// query kind can leave the other out.
pub trait LeafVisitor {
    /// Test the leaf's items against a ray.
    ///
    /// `t_min`/`t_max` bound the ray parameter interval covered by the
    /// leaf's region (the entry distance may be negative when the ray
    /// starts inside it). Return `true` to report a hit and stop the
    /// traversal; an implementation must only report intersections
    /// within `t_max` for the first-hit guarantee to hold.
    fn hit_leaf(
        &mut self,
        leaf: u32,
        items: &[ItemId],
        ray: &Ray3,
        t_min: f64,
        t_max: f64,
    ) -> Result<bool, KdTreeError> {
        let _ = (leaf, items, ray, t_min, t_max);
        Err(KdTreeError::NotImplemented("hit_leaf"))
    }

    /// Return the subset of the leaf's items enclosing `point`.
    fn contains_leaf(
        &mut self,
        leaf: u32,
        items: &[ItemId],
        point: &Point3,
    ) -> Result<Vec<ItemId>, KdTreeError> {
        let _ = (leaf, items, point);
        Err(KdTreeError::NotImplemented("contains_leaf"))
    }
}

/// Adapter exposing the leaf hooks over a pair of plain closures.
pub struct FnVisitor<H, C>
where
    H: FnMut(&[ItemId], &Ray3, f64, f64) -> bool,
    C: FnMut(&[ItemId], &Point3) -> Vec<ItemId>,
{
    /// Ray hook; receives the leaf's item ids and the clip interval.
    pub hit: H,
    /// Point hook; returns the enclosing subset of the leaf's item ids.
    pub contains: C,
}

impl<H, C> LeafVisitor for FnVisitor<H, C>
where
    H: FnMut(&[ItemId], &Ray3, f64, f64) -> bool,
    C: FnMut(&[ItemId], &Point3) -> Vec<ItemId>,
{
    fn hit_leaf(
        &mut self,
        _leaf: u32,
        items: &[ItemId],
        ray: &Ray3,
        t_min: f64,
        t_max: f64,
    ) -> Result<bool, KdTreeError> {
        Ok((self.hit)(items, ray, t_min, t_max))
    }

    fn contains_leaf(
        &mut self,
        _leaf: u32,
        items: &[ItemId],
        point: &Point3,
    ) -> Result<Vec<ItemId>, KdTreeError> {
        Ok((self.contains)(items, point))
    }
}

/// A kd-tree over 3D items, built with the surface area heuristic.
///
/// Immutable once built; queries take the mutable state they need (the
/// visitor) as an argument, so one tree can serve many threads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KdTree3 {
    bounds: Aabb3,
    nodes: Vec<KdNode>,
    settings: KdSettings,
}

impl KdTree3 {
    /// Build a tree over `items`.
    ///
    /// Fails if `empty_bonus` is outside `[0, 1]`; `min_items` and
    /// `hit_cost` are clamped to their minima instead.
    pub fn build(items: Vec<Item>, settings: KdSettings) -> Result<Self, KdTreeError> {
        if !(0.0..=1.0).contains(&settings.empty_bonus) {
            return Err(KdTreeError::InvalidSettings(format!(
                "empty_bonus must be in [0, 1], got {}",
                settings.empty_bonus
            )));
        }
        let mut settings = settings;
        settings.min_items = settings.min_items.max(1);
        settings.hit_cost = settings.hit_cost.max(1.0);
        if settings.max_depth == 0 {
            settings.max_depth = auto_max_depth(items.len());
        }

        let mut bounds = Aabb3::empty();
        for item in &items {
            bounds.union(&item.bounds);
        }

        let item_count = items.len();
        let mut nodes = Vec::with_capacity(128);
        build_node(&mut nodes, items, bounds, 0, &settings);
        debug!(
            items = item_count,
            nodes = nodes.len(),
            max_depth = settings.max_depth,
            "kd-tree build complete"
        );

        Ok(Self {
            bounds,
            nodes,
            settings,
        })
    }

    /// Union of all item bounds supplied at construction.
    pub fn bounds(&self) -> &Aabb3 {
        &self.bounds
    }

    /// The resolved build parameters (auto depth and clamps applied).
    pub fn settings(&self) -> &KdSettings {
        &self.settings
    }

    /// The packed node array, root first.
    pub fn nodes(&self) -> &[KdNode] {
        &self.nodes
    }

    /// Trace a ray through the tree, dispatching each leaf along the ray
    /// to `visitor.hit_leaf` in front-to-back order.
    ///
    /// Returns `Ok(true)` as soon as a leaf reports a hit; leaves behind
    /// that one are never visited. Returns `Ok(false)` when the ray
    /// misses the tree bounds or no leaf reports a hit.
    pub fn trace<V: LeafVisitor>(&self, ray: &Ray3, visitor: &mut V) -> Result<bool, KdTreeError> {
        let Some((t_min, t_max)) = self.bounds.full_intersection(ray) else {
            return Ok(false);
        };
        self.trace_node(0, ray, t_min, t_max, visitor)
    }

    fn trace_node<V: LeafVisitor>(
        &self,
        id: u32,
        ray: &Ray3,
        t_min: f64,
        t_max: f64,
        visitor: &mut V,
    ) -> Result<bool, KdTreeError> {
        match &self.nodes[id as usize] {
            KdNode::Leaf { items } => visitor.hit_leaf(id, items, ray, t_min, t_max),
            KdNode::Branch { axis, split, upper } => {
                let axis = *axis as usize;
                let split = *split;
                let origin = ray.origin()[axis];
                let direction = ray.direction()[axis];
                let lower = id + 1;

                if direction == 0.0 {
                    // Ray parallel to the split plane: it stays on one side.
                    let child = if origin < split { lower } else { *upper };
                    return self.trace_node(child, ray, t_min, t_max, visitor);
                }

                let t_split = (split - origin) / direction;
                let below = origin < split || (origin == split && direction < 0.0);
                let (near, far) = if below { (lower, *upper) } else { (*upper, lower) };

                if t_split > t_max || t_split <= 0.0 {
                    // Plane crossing is outside the clip interval or behind
                    // the origin: only the near side matters.
                    self.trace_node(near, ray, t_min, t_max, visitor)
                } else if t_split < t_min {
                    self.trace_node(far, ray, t_min, t_max, visitor)
                } else {
                    // Near side first; the far side is only entered when
                    // the near side found nothing.
                    if self.trace_node(near, ray, t_min, t_split, visitor)? {
                        return Ok(true);
                    }
                    self.trace_node(far, ray, t_split, t_max, visitor)
                }
            }
        }
    }

    /// Find the items enclosing `point`.
    ///
    /// Descends to the leaf whose region contains the point and returns
    /// the union of the visited leaves' `contains_leaf` results. Ids may
    /// repeat if an item straddles partition planes; callers deduplicate
    /// if they need a set.
    pub fn items_containing<V: LeafVisitor>(
        &self,
        point: &Point3,
        visitor: &mut V,
    ) -> Result<Vec<ItemId>, KdTreeError> {
        if !self.bounds.contains(point) {
            return Ok(Vec::new());
        }
        let mut id = 0u32;
        loop {
            match &self.nodes[id as usize] {
                KdNode::Leaf { items } => {
                    return visitor.contains_leaf(id, items, point);
                }
                KdNode::Branch { axis, split, upper } => {
                    // The split plane belongs to the upper child.
                    id = if point[*axis as usize] < *split {
                        id + 1
                    } else {
                        *upper
                    };
                }
            }
        }
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Serialize the tree to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Restore a tree from its JSON form, revalidating the node array.
    pub fn from_json(json: &str) -> Result<Self, KdTreeError> {
        let tree: Self = serde_json::from_str(json)?;
        tree.validate()
    }

    /// Write the tree to `path` in its binary form.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), KdTreeError> {
        let path = path.as_ref();
        let data = bincode::serialize(self)?;
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, &data)?;
        fs::rename(tmp, path)?;
        debug!(bytes = data.len(), path = %path.display(), "kd-tree saved");
        Ok(())
    }

    /// Read a tree back from its binary form, revalidating the node array.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, KdTreeError> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let tree: Self = bincode::deserialize(&bytes)?;
        debug!(bytes = bytes.len(), path = %path.display(), "kd-tree loaded");
        tree.validate()
    }

    /// Check the structural invariants of a restored node array.
    fn validate(self) -> Result<Self, KdTreeError> {
        if self.nodes.is_empty() {
            return Err(KdTreeError::Corrupt("empty node array".to_string()));
        }
        let len = self.nodes.len() as u32;
        for (i, node) in self.nodes.iter().enumerate() {
            if let KdNode::Branch { axis, upper, .. } = node {
                let i = i as u32;
                if *axis > 2 {
                    return Err(KdTreeError::Corrupt(format!(
                        "node {i}: invalid axis {axis}"
                    )));
                }
                // The lower child sits at i + 1, so the upper child must
                // lie strictly beyond it.
                if *upper <= i + 1 || *upper >= len {
                    return Err(KdTreeError::Corrupt(format!(
                        "node {i}: upper child {upper} out of range"
                    )));
                }
            }
        }
        if !(0.0..=1.0).contains(&self.settings.empty_bonus) {
            return Err(KdTreeError::Corrupt(format!(
                "empty_bonus {} out of range",
                self.settings.empty_bonus
            )));
        }
        Ok(self)
    }
}

/// Depth heuristic for unbounded builds: `ceil(8 + 1.3·ln N)`.
fn auto_max_depth(item_count: usize) -> u32 {
    if item_count == 0 {
        return 8;
    }
    (8.0 + 1.3 * (item_count as f64).ln()).ceil() as u32
}

/// Candidate split position during the build sweep: the lower or upper
/// extent of one item's bounds projected onto the split axis.
#[derive(Debug, Clone, Copy)]
struct BoundEdge {
    value: f64,
    is_upper: bool,
}

/// Recursively emit the node for `(items, bounds, depth)` and its
/// subtree, returning the node's index.
///
/// Branch slots are filled with a placeholder and overwritten by index
/// only after both child subtrees are complete, so no reference into the
/// node array is held across the recursive calls that may grow it.
fn build_node(
    nodes: &mut Vec<KdNode>,
    items: Vec<Item>,
    bounds: Aabb3,
    depth: u32,
    settings: &KdSettings,
) -> u32 {
    if depth == settings.max_depth || items.len() as u32 <= settings.min_items {
        return push_leaf(nodes, items);
    }

    let Some((axis, split)) = best_split(&items, &bounds, settings) else {
        return push_leaf(nodes, items);
    };

    // Items straddling the plane go to both sides; an item touching the
    // plane with zero extent goes to neither.
    let mut lower_items = Vec::new();
    let mut upper_items = Vec::new();
    for item in &items {
        if item.bounds.lower_index(axis as usize) < split {
            lower_items.push(*item);
        }
        if item.bounds.upper_index(axis as usize) > split {
            upper_items.push(*item);
        }
    }

    let mut lower_bounds = bounds;
    lower_bounds.set_upper_index(axis as usize, split);
    let mut upper_bounds = bounds;
    upper_bounds.set_lower_index(axis as usize, split);

    let id = nodes.len() as u32;
    nodes.push(KdNode::Leaf { items: Vec::new() });

    let lower_id = build_node(nodes, lower_items, lower_bounds, depth + 1, settings);
    debug_assert_eq!(lower_id, id + 1);
    let upper_id = build_node(nodes, upper_items, upper_bounds, depth + 1, settings);

    nodes[id as usize] = KdNode::Branch {
        axis,
        split,
        upper: upper_id,
    };
    id
}

fn push_leaf(nodes: &mut Vec<KdNode>, items: Vec<Item>) -> u32 {
    let id = nodes.len() as u32;
    nodes.push(KdNode::Leaf {
        items: items.into_iter().map(|item| item.id).collect(),
    });
    id
}

/// Find the cheapest split, or `None` if a leaf is cheaper.
///
/// Axes are tried starting from the longest extent; the first axis whose
/// sweep produced any in-bounds candidate ends the search, whether or
/// not a candidate beat the leaf cost.
fn best_split(items: &[Item], bounds: &Aabb3, settings: &KdSettings) -> Option<(u8, f64)> {
    let total_area = bounds.surface_area();
    if total_area <= 0.0 {
        return None;
    }
    let recip_total_area = 1.0 / total_area;
    let leaf_cost = items.len() as f64 * settings.hit_cost;

    let mut best_cost = leaf_cost;
    let mut best = None;

    let longest = bounds.largest_axis();
    for attempt in 0..3 {
        let axis = (longest + attempt) % 3;
        let edges = build_edges(items, axis);

        let mut candidate_seen = false;
        let mut lower_count = 0usize;
        let mut upper_count = items.len();

        for edge in &edges {
            // An upper edge closes its interval before the plane is
            // evaluated; a lower edge opens its interval after.
            if edge.is_upper {
                upper_count -= 1;
            }

            if edge.value > bounds.lower_index(axis) && edge.value < bounds.upper_index(axis) {
                candidate_seen = true;

                let mut lower_half = *bounds;
                lower_half.set_upper_index(axis, edge.value);
                let mut upper_half = *bounds;
                upper_half.set_lower_index(axis, edge.value);

                let bonus = if lower_count == 0 || upper_count == 0 {
                    1.0 - settings.empty_bonus
                } else {
                    1.0
                };
                let cost = 1.0
                    + bonus
                        * (lower_half.surface_area() * lower_count as f64
                            + upper_half.surface_area() * upper_count as f64)
                        * recip_total_area
                        * settings.hit_cost;

                if cost < best_cost {
                    best_cost = cost;
                    best = Some((axis as u8, edge.value));
                }
            }

            if !edge.is_upper {
                lower_count += 1;
            }
        }

        if candidate_seen {
            break;
        }
    }

    best
}

/// Project every item's bounds onto `axis` and sort the resulting edges.
///
/// On value ties an upper edge orders before a lower edge, so the sweep
/// closes a straddling interval before opening an adjacent one.
fn build_edges(items: &[Item], axis: usize) -> Vec<BoundEdge> {
    let mut edges = Vec::with_capacity(2 * items.len());
    for item in items {
        edges.push(BoundEdge {
            value: item.bounds.lower_index(axis),
            is_upper: false,
        });
        edges.push(BoundEdge {
            value: item.bounds.upper_index(axis),
            is_upper: true,
        });
    }
    edges.sort_by(|a, b| {
        a.value
            .total_cmp(&b.value)
            .then(b.is_upper.cmp(&a.is_upper))
    });
    edges
}
