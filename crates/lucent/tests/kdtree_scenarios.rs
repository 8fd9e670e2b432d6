//! Cross-crate kd-tree scenarios: first-hit queries over real boxes,
//! point containment, determinism, and persistence round-trips.

use lucent::{Aabb3, Item, ItemId, KdSettings, KdTree3, KdTreeError, LeafVisitor, Point3, Ray3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Visitor resolving leaf hits against the actual item boxes: reports
/// the nearest in-range box intersection and answers containment by
/// box lookup.
struct BoxVisitor<'a> {
    boxes: &'a [Aabb3],
    found: Option<(ItemId, f64)>,
}

impl<'a> BoxVisitor<'a> {
    fn new(boxes: &'a [Aabb3]) -> Self {
        Self { boxes, found: None }
    }
}

impl LeafVisitor for BoxVisitor<'_> {
    fn hit_leaf(
        &mut self,
        _leaf: u32,
        items: &[ItemId],
        ray: &Ray3,
        _t_min: f64,
        t_max: f64,
    ) -> Result<bool, KdTreeError> {
        let mut best: Option<(ItemId, f64)> = None;
        for &id in items {
            if let Some((t0, t1)) = self.boxes[id as usize].full_intersection(ray) {
                let t_hit = t0.max(0.0);
                if t1 < 0.0 || t_hit > t_max + 1e-9 {
                    continue;
                }
                if best.map_or(true, |(_, t)| t_hit < t) {
                    best = Some((id, t_hit));
                }
            }
        }
        self.found = best;
        Ok(best.is_some())
    }

    fn contains_leaf(
        &mut self,
        _leaf: u32,
        items: &[ItemId],
        point: &Point3,
    ) -> Result<Vec<ItemId>, KdTreeError> {
        Ok(items
            .iter()
            .copied()
            .filter(|&id| self.boxes[id as usize].contains(point))
            .collect())
    }
}

fn three_boxes() -> Vec<Aabb3> {
    vec![
        Aabb3::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0)),
        Aabb3::new(Point3::new(2.0, 0.0, 0.0), Point3::new(3.0, 1.0, 1.0)),
        Aabb3::new(Point3::new(4.0, 0.0, 0.0), Point3::new(5.0, 1.0, 1.0)),
    ]
}

fn tree_over(boxes: &[Aabb3]) -> KdTree3 {
    let items = boxes
        .iter()
        .enumerate()
        .map(|(i, b)| Item::new(i as ItemId, *b))
        .collect();
    KdTree3::build(items, KdSettings::default()).unwrap()
}

#[test]
fn first_hit_is_nearest_item() {
    let boxes = three_boxes();
    let tree = tree_over(&boxes);
    let ray = Ray3::new(Point3::new(-1.0, 0.5, 0.5), lucent::Vec3::new(1.0, 0.0, 0.0));

    let mut visitor = BoxVisitor::new(&boxes);
    assert!(tree.trace(&ray, &mut visitor).unwrap());
    let (id, t) = visitor.found.unwrap();
    assert_eq!(id, 0);
    assert!((t - 1.0).abs() < 1e-12);
}

#[test]
fn containment_returns_enclosing_item() {
    let boxes = three_boxes();
    let tree = tree_over(&boxes);
    let mut visitor = BoxVisitor::new(&boxes);

    let found = tree
        .items_containing(&Point3::new(2.5, 0.5, 0.5), &mut visitor)
        .unwrap();
    assert_eq!(found, vec![1]);
}

fn random_items(rng: &mut StdRng, count: usize) -> (Vec<Aabb3>, Vec<Item>) {
    let boxes: Vec<Aabb3> = (0..count)
        .map(|_| {
            let corner = Point3::new(
                rng.gen_range(0.0..10.0),
                rng.gen_range(0.0..10.0),
                rng.gen_range(0.0..10.0),
            );
            Aabb3::new(
                corner,
                Point3::new(corner.x + 1.0, corner.y + 1.0, corner.z + 1.0),
            )
        })
        .collect();
    let items = boxes
        .iter()
        .enumerate()
        .map(|(i, b)| Item::new(i as ItemId, *b))
        .collect();
    (boxes, items)
}

fn random_ray(rng: &mut StdRng) -> Ray3 {
    let origin = Point3::new(
        rng.gen_range(-2.0..13.0),
        rng.gen_range(-2.0..13.0),
        rng.gen_range(-2.0..13.0),
    );
    let direction = loop {
        let d = lucent::Vec3::new(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
        );
        if d.norm() > 0.1 {
            break d;
        }
    };
    Ray3::new(origin, direction)
}

#[test]
fn build_is_deterministic() {
    let mut rng = StdRng::seed_from_u64(7);
    let (_, items) = random_items(&mut rng, 200);
    let a = KdTree3::build(items.clone(), KdSettings::default()).unwrap();
    let b = KdTree3::build(items, KdSettings::default()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn persistence_round_trip_preserves_behaviour() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let (boxes, items) = random_items(&mut rng, 1000);
    let tree = KdTree3::build(items, KdSettings::default()).unwrap();

    // Binary round trip through a file.
    let path = std::env::temp_dir().join("lucent_scenario_tree.bin");
    tree.save(&path).unwrap();
    let from_binary = KdTree3::load(&path).unwrap();
    let _ = std::fs::remove_file(&path);
    assert_eq!(from_binary.nodes(), tree.nodes());
    assert_eq!(from_binary.bounds(), tree.bounds());

    // JSON round trip.
    let from_json = KdTree3::from_json(&tree.to_json().unwrap()).unwrap();
    assert_eq!(from_json.nodes(), tree.nodes());

    // Identical first-hit behaviour over a large random ray batch.
    let mut hits = 0usize;
    for _ in 0..10_000 {
        let ray = random_ray(&mut rng);

        let mut original = BoxVisitor::new(&boxes);
        let hit_original = tree.trace(&ray, &mut original).unwrap();
        let mut restored = BoxVisitor::new(&boxes);
        let hit_restored = from_binary.trace(&ray, &mut restored).unwrap();

        assert_eq!(hit_original, hit_restored);
        assert_eq!(original.found, restored.found);
        if hit_original {
            hits += 1;
        }
    }
    // The batch must actually exercise the tree.
    assert!(hits > 1000, "only {hits} of 10000 rays hit");
}

#[test]
fn every_item_bound_is_inside_tree_bounds() {
    let mut rng = StdRng::seed_from_u64(42);
    let (boxes, items) = random_items(&mut rng, 300);
    let tree = KdTree3::build(items, KdSettings::default()).unwrap();
    for b in &boxes {
        assert!(tree.bounds().contains(&b.min));
        assert!(tree.bounds().contains(&b.max));
    }
}

#[test]
fn containment_complete_over_random_points() {
    // Every item whose box contains a probe point must be reported.
    let mut rng = StdRng::seed_from_u64(99);
    let (boxes, items) = random_items(&mut rng, 500);
    let tree = KdTree3::build(items, KdSettings::default()).unwrap();

    for _ in 0..2_000 {
        let point = Point3::new(
            rng.gen_range(0.0..11.0),
            rng.gen_range(0.0..11.0),
            rng.gen_range(0.0..11.0),
        );
        let mut visitor = BoxVisitor::new(&boxes);
        let mut found = tree.items_containing(&point, &mut visitor).unwrap();
        found.sort_unstable();
        found.dedup();

        let mut expected: Vec<ItemId> = boxes
            .iter()
            .enumerate()
            .filter(|(_, b)| b.contains(&point))
            .map(|(i, _)| i as ItemId)
            .collect();
        expected.sort_unstable();

        assert_eq!(found, expected);
    }
}
