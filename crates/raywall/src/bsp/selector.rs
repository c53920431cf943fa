//! Split-plane selection strategies for BSP tree construction.
//!
//! The choice of splitting plane affects tree balance and the number of
//! polygon splits during construction. Each strategy derives one candidate
//! plane from one polygon; [`select_plane`] scores every polygon's
//! candidate against the rest of the set and keeps the cheapest.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::plane::{Classification, Plane};
use crate::polygon::Polygon;

/// Weight of the straddle count in the candidate score. The remainder
/// weighs front/back imbalance, so fewer splits beat better balance.
pub const SPLIT_WEIGHT: f32 = 0.9;

/// Strategy for deriving a candidate split plane from a polygon.
///
/// Randomized strategies own an injected, seeded random source so tree
/// construction stays reproducible; nothing here touches a global
/// generator.
pub trait SplitStrategy {
    /// Derives one candidate plane from `polygon`, or `None` when the
    /// polygon offers no usable candidate (e.g. coincident vertices).
    fn candidate(&mut self, polygon: &Polygon, depth: usize) -> Option<Plane>;
}

/// Picks a random edge of the polygon and splits along it.
#[derive(Debug)]
pub struct RandomEdge {
    rng: StdRng,
}

impl RandomEdge {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl SplitStrategy for RandomEdge {
    fn candidate(&mut self, polygon: &Polygon, _depth: usize) -> Option<Plane> {
        let edges = polygon.edges();
        let edge = &edges[self.rng.random_range(0..edges.len())];
        if edge.length() <= f32::EPSILON {
            return None;
        }
        Some(Plane::from_segment(edge.start().point, edge.end().point))
    }
}

/// Splits along a random side of the polygon's bounding box.
#[derive(Debug)]
pub struct BoundsSide {
    rng: StdRng,
}

impl BoundsSide {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl SplitStrategy for BoundsSide {
    fn candidate(&mut self, polygon: &Polygon, _depth: usize) -> Option<Plane> {
        let bounds = polygon.bounds();
        if bounds.is_empty() {
            return None;
        }
        let normal_x = nalgebra::Vector2::new(1.0, 0.0);
        let normal_y = nalgebra::Vector2::new(0.0, 1.0);
        let plane = match self.rng.random_range(0..4) {
            0 => Plane::new(normal_x, bounds.min.x),
            1 => Plane::new(normal_x, bounds.max.x),
            2 => Plane::new(normal_y, bounds.min.y),
            _ => Plane::new(normal_y, bounds.max.y),
        };
        Some(plane)
    }
}

/// Splits through the two vertices nearest the polygon's centroid.
#[derive(Debug, Default)]
pub struct CentroidPair;

impl SplitStrategy for CentroidPair {
    fn candidate(&mut self, polygon: &Polygon, _depth: usize) -> Option<Plane> {
        let centroid = polygon.centroid();
        let mut vertices: Vec<_> = polygon.vertices().collect();
        vertices.sort_by(|a, b| {
            let da = (a.point - centroid).norm_squared();
            let db = (b.point - centroid).norm_squared();
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        });
        let first = vertices.first()?;
        let second = vertices
            .iter()
            .skip(1)
            .find(|v| (v.point - first.point).norm() > f32::EPSILON)?;
        Some(Plane::from_segment(first.point, second.point))
    }
}

/// Alternates by depth between horizontal and vertical edges, evening
/// out the partition's axes.
#[derive(Debug, Default)]
pub struct AlternatingAxis;

impl SplitStrategy for AlternatingAxis {
    fn candidate(&mut self, polygon: &Polygon, depth: usize) -> Option<Plane> {
        let want_horizontal = depth % 2 == 0;
        let edge = polygon
            .edges()
            .iter()
            .find(|e| {
                let d = e.direction();
                let horizontal = d.x.abs() >= d.y.abs();
                horizontal == want_horizontal && e.length() > f32::EPSILON
            })
            .or_else(|| polygon.edges().iter().find(|e| e.length() > f32::EPSILON))?;
        Some(Plane::from_segment(edge.start().point, edge.end().point))
    }
}

/// Splits through two random distinct vertices of the polygon.
#[derive(Debug)]
pub struct RandomPair {
    rng: StdRng,
}

impl RandomPair {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl SplitStrategy for RandomPair {
    fn candidate(&mut self, polygon: &Polygon, _depth: usize) -> Option<Plane> {
        let vertices: Vec<_> = polygon.vertices().collect();
        let n = vertices.len();
        let a = self.rng.random_range(0..n);
        let offset = self.rng.random_range(1..n);
        let b = (a + offset) % n;
        let (pa, pb) = (vertices[a].point, vertices[b].point);
        if (pb - pa).norm() <= f32::EPSILON {
            return None;
        }
        Some(Plane::from_segment(pa, pb))
    }
}

/// Searches the polygon set for the cheapest candidate split plane.
///
/// Each polygon contributes one candidate via `strategy`. A candidate
/// identical to `previous` is skipped outright, which prevents
/// zero-progress recursion when a plane fails to partition its set. Every
/// remaining candidate is scored against all *other* polygons:
///
/// `SPLIT_WEIGHT * straddles + (1 - SPLIT_WEIGHT) * |front - back|`
///
/// The minimum score wins; the first-seen candidate wins ties. Returns
/// `None` when every candidate was skipped.
pub fn select_plane<S: SplitStrategy>(
    polygons: &[Polygon],
    previous: Option<&Plane>,
    depth: usize,
    strategy: &mut S,
) -> Option<Plane> {
    let mut best: Option<(Plane, f32)> = None;

    for (i, polygon) in polygons.iter().enumerate() {
        let Some(candidate) = strategy.candidate(polygon, depth) else {
            continue;
        };
        if previous.is_some_and(|p| p.approx_eq(&candidate)) {
            continue;
        }

        let mut straddles = 0_usize;
        let mut front = 0_usize;
        let mut back = 0_usize;
        for (j, other) in polygons.iter().enumerate() {
            if j == i {
                continue;
            }
            match other.classify(&candidate) {
                Classification::Spanning => straddles += 1,
                Classification::Front => front += 1,
                Classification::Back => back += 1,
                Classification::Coplanar => {}
            }
        }

        let score = SPLIT_WEIGHT * straddles as f32
            + (1.0 - SPLIT_WEIGHT) * (front as f32 - back as f32).abs();
        if best.as_ref().is_none_or(|(_, cheapest)| score < *cheapest) {
            best = Some((candidate, score));
        }
    }

    best.map(|(plane, _)| plane)
}
