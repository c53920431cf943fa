//! BSP tree container, construction and queries.

use std::ops::ControlFlow;

use log::{debug, trace};
use nalgebra::Point2;

use crate::error::GeometryError;
use crate::plane::{Classification, Plane, PlaneSide};
use crate::polygon::Polygon;
use crate::ray::{CastStats, Hit, Ray};
use crate::split::split_polygon;

use super::node::BspNode;
use super::selector::{select_plane, SplitStrategy};
use super::visitor::BspVisitor;

/// Recursion stops here even if leaves are still crowded.
pub const MAX_DEPTH: usize = 16;

/// Sets this small and below become leaves without further splitting.
pub const MIN_LEAF_POLYGONS: usize = 2;

/// Polygons with at least this many edges get a bounding-box test before
/// their edges are probed individually.
pub const AABB_TEST_MIN_EDGES: usize = 6;

/// A Binary Space Partitioning tree over wall-map polygons.
///
/// The tree recursively partitions the map plane with split lines chosen
/// by a [`SplitStrategy`]. Polygons straddling a split line are cut into
/// fragments during construction, so every stored polygon lies entirely
/// on one side of each ancestor's plane (or exactly on it, in the node's
/// coplanar set). That ordering is what makes front-to-back traversal and
/// pruned raycasts possible.
#[derive(Debug, Clone, Default)]
pub struct BspTree {
    root: BspNode,
}

impl BspTree {
    /// An empty tree.
    pub fn new() -> Self {
        Self {
            root: BspNode::Null,
        }
    }

    /// Builds a tree from a set of polygons.
    ///
    /// `strategy` proposes candidate split planes; the cheapest candidate
    /// per level wins. Straddling polygons are split, with both fragments
    /// keeping the parent's id. Fails if a required split degenerates.
    pub fn build<S: SplitStrategy>(
        polygons: Vec<Polygon>,
        strategy: &mut S,
    ) -> Result<Self, GeometryError> {
        debug!("building BSP tree from {} polygons", polygons.len());
        let root = Self::build_node(polygons, None, 0, strategy)?;
        debug!(
            "built BSP tree: {} polygons, depth {}",
            root.polygon_count(),
            root.depth()
        );
        Ok(Self { root })
    }

    fn build_node<S: SplitStrategy>(
        polygons: Vec<Polygon>,
        previous: Option<&Plane>,
        depth: usize,
        strategy: &mut S,
    ) -> Result<BspNode, GeometryError> {
        if polygons.is_empty() {
            return Ok(BspNode::Null);
        }
        if depth >= MAX_DEPTH || polygons.len() <= MIN_LEAF_POLYGONS {
            return Ok(BspNode::Leaf(polygons));
        }
        let Some(plane) = select_plane(&polygons, previous, depth, strategy) else {
            // Every candidate was skipped: stop splitting here.
            return Ok(BspNode::Leaf(polygons));
        };

        let mut coplanar = Vec::new();
        let mut front_set = Vec::new();
        let mut back_set = Vec::new();
        for polygon in polygons {
            match polygon.classify(&plane) {
                Classification::Coplanar => coplanar.push(polygon),
                Classification::Front => front_set.push(polygon),
                Classification::Back => back_set.push(polygon),
                Classification::Spanning => {
                    let (front, back) = split_polygon(&polygon, &plane)?;
                    front_set.push(front);
                    back_set.push(back);
                }
            }
        }
        trace!(
            "depth {depth}: split into {} front / {} back / {} coplanar",
            front_set.len(),
            back_set.len(),
            coplanar.len()
        );

        Ok(BspNode::Split {
            front: Box::new(Self::build_node(
                front_set,
                Some(&plane),
                depth + 1,
                strategy,
            )?),
            back: Box::new(Self::build_node(back_set, Some(&plane), depth + 1, strategy)?),
            plane,
            coplanar,
        })
    }

    #[inline]
    pub fn root(&self) -> &BspNode {
        &self.root
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_null()
    }

    pub fn polygon_count(&self) -> usize {
        self.root.polygon_count()
    }

    pub fn edge_count(&self) -> usize {
        self.root.edge_count()
    }

    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    /// All polygons stored in the tree, in no particular order.
    pub fn collect_polygons(&self) -> Vec<Polygon> {
        fn gather(node: &BspNode, out: &mut Vec<Polygon>) {
            match node {
                BspNode::Null => {}
                BspNode::Leaf(polygons) => out.extend(polygons.iter().cloned()),
                BspNode::Split {
                    coplanar,
                    front,
                    back,
                    ..
                } => {
                    out.extend(coplanar.iter().cloned());
                    gather(front, out);
                    gather(back, out);
                }
            }
        }
        let mut out = Vec::with_capacity(self.polygon_count());
        gather(&self.root, &mut out);
        out
    }

    /// The polygons of the leaf region containing `point`, or `None` when
    /// the point falls through to an empty subtree. Points exactly on a
    /// split plane descend to the front.
    pub fn leaf_for(&self, point: Point2<f32>) -> Option<&[Polygon]> {
        let mut node = &self.root;
        loop {
            match node {
                BspNode::Null => return None,
                BspNode::Leaf(polygons) => return Some(polygons),
                BspNode::Split {
                    plane, front, back, ..
                } => {
                    node = match plane.classify_point(point) {
                        PlaneSide::Back => back,
                        _ => front,
                    };
                }
            }
        }
    }

    /// The polygon whose interior contains `point`, if any in the
    /// point's leaf region does. Points in open space return `None` even
    /// when their region holds polygons.
    pub fn polygon_at(&self, point: Point2<f32>) -> Option<&Polygon> {
        self.leaf_for(point)?
            .iter()
            .find(|polygon| polygon.contains_point(point))
    }

    /// Casts a ray through the tree, accumulating every wall intersection
    /// in near-to-far region order.
    ///
    /// After each probed batch `until` sees the hits so far; returning
    /// `true` stops the cast before farther regions are searched. Because
    /// regions are visited front to back, every hit found after a stop
    /// would have been at least as far as the ones already collected.
    pub fn raycast(
        &self,
        ray: &Ray,
        mut until: impl FnMut(&[Hit]) -> bool,
    ) -> (Vec<Hit>, CastStats) {
        let mut hits = Vec::new();
        let mut stats = CastStats {
            polygons_total: self.polygon_count(),
            edges_total: self.edge_count(),
            ..CastStats::default()
        };
        Self::cast_node(&self.root, ray, &mut until, &mut hits, &mut stats);
        (hits, stats)
    }

    fn cast_node(
        node: &BspNode,
        ray: &Ray,
        until: &mut impl FnMut(&[Hit]) -> bool,
        hits: &mut Vec<Hit>,
        stats: &mut CastStats,
    ) -> ControlFlow<()> {
        match node {
            BspNode::Null => ControlFlow::Continue(()),
            BspNode::Leaf(polygons) => Self::probe(polygons, ray, until, hits, stats),
            BspNode::Split {
                plane,
                coplanar,
                front,
                back,
            } => {
                // An origin On the plane descends front first, the same
                // tie-break leaf_for and the front-to-back walk use.
                let (near, far) = match plane.classify_point(ray.origin()) {
                    PlaneSide::Back => (back, front),
                    _ => (front, back),
                };
                Self::cast_node(near, ray, until, hits, stats)?;
                Self::probe(coplanar, ray, until, hits, stats)?;

                // A ray lying exactly in the split plane can graze walls
                // on either side, so parallel rays search both subtrees.
                // Otherwise the far side only matters if the ray actually
                // crosses the plane ahead of its origin.
                let denom = plane.normal().dot(&ray.unit());
                if denom == 0.0 || ray.intersect_plane(plane).is_some() {
                    Self::cast_node(far, ray, until, hits, stats)?;
                }
                ControlFlow::Continue(())
            }
        }
    }

    fn probe(
        polygons: &[Polygon],
        ray: &Ray,
        until: &mut impl FnMut(&[Hit]) -> bool,
        hits: &mut Vec<Hit>,
        stats: &mut CastStats,
    ) -> ControlFlow<()> {
        for polygon in polygons {
            stats.polygons_tested += 1;
            if polygon.edge_count() >= AABB_TEST_MIN_EDGES && !ray.intersect_aabb(polygon.bounds())
            {
                continue;
            }
            for edge in polygon.edges() {
                stats.edges_tested += 1;
                if let Some(hit) = ray.intersect_edge(polygon.id(), edge) {
                    hits.push(hit);
                }
            }
        }
        if !polygons.is_empty() && until(hits) {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }

    /// Every intersection along the ray, nearest first.
    pub fn raycast_sorted(&self, ray: &Ray) -> (Vec<Hit>, CastStats) {
        let (mut hits, stats) = self.raycast(ray, |_| false);
        hits.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        (hits, stats)
    }

    /// The nearest wall intersection along the ray, if any.
    pub fn first_hit(&self, ray: &Ray) -> Option<Hit> {
        let (hits, _) = self.raycast(ray, |found| !found.is_empty());
        hits.into_iter().min_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    }

    /// Visits polygon batches in near-to-far order as seen from `eye`.
    ///
    /// Leaves yield their whole polygon set; split nodes yield their
    /// coplanar set between the near and far subtrees. The visitor can
    /// break to skip everything farther away.
    pub fn walk_front_to_back<V: BspVisitor>(
        &self,
        eye: Point2<f32>,
        visitor: &mut V,
    ) -> ControlFlow<()> {
        Self::walk_node(&self.root, eye, visitor)
    }

    fn walk_node<V: BspVisitor>(
        node: &BspNode,
        eye: Point2<f32>,
        visitor: &mut V,
    ) -> ControlFlow<()> {
        match node {
            BspNode::Null => ControlFlow::Continue(()),
            BspNode::Leaf(polygons) => visitor.visit(polygons),
            BspNode::Split {
                plane,
                coplanar,
                front,
                back,
            } => {
                let (near, far) = match plane.classify_point(eye) {
                    PlaneSide::Back => (back, front),
                    _ => (front, back),
                };
                Self::walk_node(near, eye, visitor)?;
                visitor.visit(coplanar)?;
                Self::walk_node(far, eye, visitor)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bsp::selector::{AlternatingAxis, RandomEdge};
    use crate::bsp::visitor::FnVisitor;
    use crate::camera::Camera;
    use crate::edge::Material;
    use crate::polygon::PolygonId;
    use approx::assert_relative_eq;
    use nalgebra::{Point2, Vector2};

    fn square(id: u64, x: f32, y: f32, size: f32) -> Polygon {
        Polygon::from_points(
            PolygonId(id),
            &[
                Point2::new(x, y),
                Point2::new(x + size, y),
                Point2::new(x + size, y + size),
                Point2::new(x, y + size),
            ],
        )
    }

    fn scattered_squares() -> Vec<Polygon> {
        vec![
            square(0, 0.0, 0.0, 10.0),
            square(1, 30.0, 5.0, 10.0),
            square(2, 5.0, 40.0, 10.0),
            square(3, 60.0, 60.0, 10.0),
            square(4, 25.0, 70.0, 10.0),
            square(5, 80.0, 10.0, 10.0),
        ]
    }

    #[test]
    fn empty_tree() {
        let tree = BspTree::new();
        assert!(tree.is_empty());
        assert_eq!(tree.polygon_count(), 0);
        assert!(tree.leaf_for(Point2::new(0.0, 0.0)).is_none());
        let ray = Ray::new(Point2::new(0.0, 0.0), Vector2::new(1.0, 0.0));
        assert!(tree.first_hit(&ray).is_none());
    }

    #[test]
    fn build_is_deterministic_for_a_fixed_seed() {
        let a = BspTree::build(scattered_squares(), &mut RandomEdge::seeded(7)).unwrap();
        let b = BspTree::build(scattered_squares(), &mut RandomEdge::seeded(7)).unwrap();
        assert_eq!(format!("{a:?}"), format!("{b:?}"));
    }

    #[test]
    fn build_preserves_polygon_ids_across_splits() {
        let tree = BspTree::build(scattered_squares(), &mut AlternatingAxis).unwrap();
        // Fragments keep their parent's id, so the id set is unchanged
        let mut ids: Vec<u64> = tree.collect_polygons().iter().map(|p| p.id().0).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids, vec![0, 1, 2, 3, 4, 5]);
        assert!(tree.polygon_count() >= 6);
    }

    #[test]
    fn depth_stays_bounded() {
        let mut polygons = Vec::new();
        for i in 0..64 {
            let x = (i % 8) as f32 * 15.0;
            let y = (i / 8) as f32 * 15.0;
            polygons.push(square(i, x, y, 10.0));
        }
        let tree = BspTree::build(polygons, &mut RandomEdge::seeded(1)).unwrap();
        assert!(tree.depth() <= MAX_DEPTH + 1);
    }

    #[test]
    fn raycast_finds_every_brute_force_hit() {
        let polygons = scattered_squares();
        let tree = BspTree::build(polygons.clone(), &mut RandomEdge::seeded(3)).unwrap();

        let rays = [
            Ray::new(Point2::new(-5.0, 5.0), Vector2::new(1.0, 0.1)),
            Ray::new(Point2::new(50.0, -5.0), Vector2::new(-0.3, 1.0)),
            Ray::new(Point2::new(95.0, 95.0), Vector2::new(-1.0, -1.0)),
        ];
        for ray in &rays {
            let mut brute: Vec<f32> = polygons
                .iter()
                .flat_map(|p| p.edges())
                .filter_map(|e| ray.intersect_segment(&e.segment()))
                .map(|(t, _)| t)
                .collect();
            brute.sort_by(|a, b| a.partial_cmp(b).unwrap());

            let (hits, stats) = tree.raycast_sorted(ray);
            for expected in &brute {
                assert!(
                    hits.iter().any(|h| (h.distance - expected).abs() < 1e-3),
                    "missing hit at distance {expected}"
                );
            }
            assert!(stats.polygons_total >= polygons.len());
        }
    }

    #[test]
    fn first_hit_is_the_nearest() {
        let tree = BspTree::build(scattered_squares(), &mut RandomEdge::seeded(3)).unwrap();
        let ray = Ray::new(Point2::new(-5.0, 5.0), Vector2::new(1.0, 0.0));
        let first = tree.first_hit(&ray).unwrap();
        let (all, _) = tree.raycast_sorted(&ray);
        assert_relative_eq!(first.distance, all[0].distance, epsilon = 1e-4);
        // The nearest wall on this ray is square 0's left edge at x = 0
        assert_relative_eq!(first.distance, 5.0, epsilon = 1e-4);
        assert_eq!(first.polygon, PolygonId(0));
    }

    #[test]
    fn camera_fan_through_a_square_room() {
        let room = square(0, 0.0, 0.0, 100.0).with_front_material(Material::solid("plaster"));
        let tree = BspTree::build(vec![room], &mut AlternatingAxis).unwrap();
        let camera = Camera::new(
            Point2::new(50.0, 50.0),
            Vector2::new(0.0, 10.0),
            Vector2::new(15.0, 0.0),
        );

        // The central column looks straight at the far wall
        let center = tree.first_hit(&camera.column_ray(5, 10)).unwrap();
        assert_relative_eq!(center.distance, 50.0, epsilon = 1e-3);
        assert_eq!(center.face, crate::edge::Face::Front);

        // Columns 2..=8 all see the far wall; incidence correction flattens
        // their distances to the same projection-plane depth.
        for column in 2..=8 {
            let hit = tree.first_hit(&camera.column_ray(column, 10)).unwrap();
            assert_relative_eq!(hit.distance, 50.0, epsilon = 1e-2);
            assert_relative_eq!(hit.point.y, 100.0, epsilon = 1e-3);
        }

        // The outermost columns strike the side walls instead
        let corner = tree.first_hit(&camera.column_ray(0, 10)).unwrap();
        assert_relative_eq!(corner.point.x, 0.0, epsilon = 1e-3);
        assert_relative_eq!(corner.distance, 100.0 / 3.0, epsilon = 1e-2);

        // Nothing in view: a free ray pointing away from the map
        let away = Ray::new(Point2::new(200.0, 200.0), Vector2::new(1.0, 0.0));
        let depth = tree.first_hit(&away).map_or(f32::INFINITY, |h| h.distance);
        assert_eq!(depth, f32::INFINITY);
    }

    #[test]
    fn parallel_ray_searches_both_sides_of_its_plane() {
        // Two squares meeting at x = 50, partitioned exactly there. A ray
        // running up the seam must report walls from both subtrees.
        let left = square(0, 40.0, 0.0, 10.0);
        let right = square(1, 50.0, 0.0, 10.0);
        let tree = BspTree {
            root: BspNode::Split {
                plane: Plane::new(Vector2::new(1.0, 0.0), 50.0),
                coplanar: Vec::new(),
                front: Box::new(BspNode::Leaf(vec![right])),
                back: Box::new(BspNode::Leaf(vec![left])),
            },
        };

        let seam = Ray::new(Point2::new(50.0, -5.0), Vector2::new(0.0, 1.0));
        let (hits, _) = tree.raycast(&seam, |_| false);
        let mut struck: Vec<u64> = hits.iter().map(|h| h.polygon.0).collect();
        struck.sort_unstable();
        struck.dedup();
        assert_eq!(struck, vec![0, 1]);
    }

    #[test]
    fn leaf_for_locates_regions() {
        let polygons = vec![square(0, 0.0, 0.0, 10.0), square(1, 50.0, 0.0, 10.0)];
        let tree = BspTree::build(polygons, &mut AlternatingAxis).unwrap();
        // Both squares fit in one leaf under the minimum-size cutoff
        let leaf = tree.leaf_for(Point2::new(5.0, 5.0)).unwrap();
        assert!(leaf.iter().any(|p| p.id() == PolygonId(0)));
    }

    #[test]
    fn on_plane_origin_probes_the_front_side_first() {
        // Same seam layout; the ray starts exactly on the split plane
        // but heads into the back half. The front subtree is still the
        // near side, so its hit comes first in traversal order.
        let left = square(0, 40.0, 0.0, 10.0);
        let right = square(1, 50.0, 0.0, 10.0);
        let tree = BspTree {
            root: BspNode::Split {
                plane: Plane::new(Vector2::new(1.0, 0.0), 50.0),
                coplanar: Vec::new(),
                front: Box::new(BspNode::Leaf(vec![right])),
                back: Box::new(BspNode::Leaf(vec![left])),
            },
        };

        let ray = Ray::new(Point2::new(50.0, 5.0), Vector2::new(-1.0, 0.0));
        let (hits, _) = tree.raycast(&ray, |_| false);
        assert_eq!(hits.first().map(|h| h.polygon), Some(PolygonId(1)));
        assert!(hits.iter().any(|h| h.polygon == PolygonId(0)));
    }

    #[test]
    fn polygon_at_checks_containment_within_the_leaf() {
        let polygons = vec![square(0, 0.0, 0.0, 10.0), square(1, 50.0, 0.0, 10.0)];
        let tree = BspTree::build(polygons, &mut AlternatingAxis).unwrap();

        let inside = tree.polygon_at(Point2::new(5.0, 5.0)).unwrap();
        assert_eq!(inside.id(), PolygonId(0));
        // Open space between the squares shares their leaf but matches
        // neither interior
        assert!(tree.polygon_at(Point2::new(30.0, 5.0)).is_none());
        assert!(BspTree::new().polygon_at(Point2::new(5.0, 5.0)).is_none());
    }

    #[test]
    fn walk_visits_near_side_first() {
        let left = square(0, 0.0, 0.0, 10.0);
        let right = square(1, 50.0, 0.0, 10.0);
        let tree = BspTree {
            root: BspNode::Split {
                plane: Plane::new(Vector2::new(1.0, 0.0), 30.0),
                coplanar: Vec::new(),
                front: Box::new(BspNode::Leaf(vec![right])),
                back: Box::new(BspNode::Leaf(vec![left])),
            },
        };

        let mut order = Vec::new();
        let mut visitor = FnVisitor::new(|polys: &[Polygon]| {
            order.extend(polys.iter().map(|p| p.id().0));
            ControlFlow::Continue(())
        });
        tree.walk_front_to_back(Point2::new(5.0, 5.0), &mut visitor);
        drop(visitor);
        assert_eq!(order, vec![0, 1]);

        let mut order = Vec::new();
        let mut visitor = FnVisitor::new(|polys: &[Polygon]| {
            order.extend(polys.iter().map(|p| p.id().0));
            ControlFlow::Continue(())
        });
        tree.walk_front_to_back(Point2::new(55.0, 5.0), &mut visitor);
        drop(visitor);
        assert_eq!(order, vec![1, 0]);
    }

    #[test]
    fn walk_can_break_early() {
        let tree = BspTree::build(scattered_squares(), &mut RandomEdge::seeded(9)).unwrap();
        let mut batches = 0;
        let mut visitor = FnVisitor::new(|_: &[Polygon]| {
            batches += 1;
            ControlFlow::Break(())
        });
        let flow = tree.walk_front_to_back(Point2::new(5.0, 5.0), &mut visitor);
        drop(visitor);
        assert_eq!(flow, ControlFlow::Break(()));
        assert_eq!(batches, 1);
    }
}
