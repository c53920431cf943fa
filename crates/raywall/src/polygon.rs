//! Polygons: closed loops of wall edges.

use nalgebra::Point2;

use crate::bounds::Aabb;
use crate::edge::{Edge, EdgeId, Material};
use crate::plane::{Classification, Plane, PlaneSide};
use crate::vertex::{Vertex, VertexId};

/// Identity of a polygon within a geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PolygonId(pub u64);

impl std::fmt::Display for PolygonId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "p{}", self.0)
    }
}

/// A closed, ordered loop of edges.
///
/// Closure is by vertex *identity*: `edges[i].end` and `edges[i + 1].start`
/// are the same vertex, and the last edge ends where the first begins. The
/// vertex list is derived from edge starts.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    id: PolygonId,
    edges: Vec<Edge>,
    bounds: Aabb,
}

impl Polygon {
    /// Creates a polygon from an already-closed edge loop.
    ///
    /// # Panics (debug builds only)
    /// Panics if consecutive edges do not share vertex identity at their
    /// join. Use [`crate::store`] loading for untrusted input; it reports
    /// unclosed loops as errors instead.
    pub fn new(id: PolygonId, edges: Vec<Edge>) -> Self {
        debug_assert!(
            is_closed(&edges),
            "polygon edge loop must close by vertex identity"
        );
        let bounds = Aabb::from_points(edges.iter().map(|e| e.start().point));
        Self { id, edges, bounds }
    }

    /// Builds a closed polygon from an ordered point list, assigning
    /// sequential vertex and edge ids and sharing vertices at joins.
    ///
    /// # Panics (debug builds only)
    /// Panics if fewer than 3 points are provided.
    pub fn from_points(id: PolygonId, points: &[Point2<f32>]) -> Self {
        debug_assert!(points.len() >= 3, "polygon needs at least 3 points");
        let vertices: Vec<Vertex> = points
            .iter()
            .enumerate()
            .map(|(i, p)| Vertex::new(VertexId(i as u64), *p))
            .collect();
        let edges = vertices
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let next = vertices[(i + 1) % vertices.len()];
                Edge::new(EdgeId(i as u64), *v, next)
            })
            .collect();
        Self::new(id, edges)
    }

    /// Applies `material` to the front face of every edge.
    pub fn with_front_material(mut self, material: Material) -> Self {
        self.edges = self
            .edges
            .into_iter()
            .map(|e| e.with_front(material.clone()))
            .collect();
        self
    }

    /// Applies `material` to the back face of every edge.
    pub fn with_back_material(mut self, material: Material) -> Self {
        self.edges = self
            .edges
            .into_iter()
            .map(|e| e.with_back(material.clone()))
            .collect();
        self
    }

    /// Flags every edge as immaterial (visible but non-blocking).
    pub fn with_immaterial(mut self, immaterial: bool) -> Self {
        self.edges = self
            .edges
            .into_iter()
            .map(|e| e.with_immaterial(immaterial))
            .collect();
        self
    }

    #[inline]
    pub fn id(&self) -> PolygonId {
        self.id
    }

    #[inline]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    #[inline]
    pub fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    /// The vertex loop, derived from edge starts.
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.edges.iter().map(|e| e.start())
    }

    /// Centroid of the vertex loop.
    pub fn centroid(&self) -> Point2<f32> {
        let sum = self
            .vertices()
            .fold(nalgebra::Vector2::zeros(), |acc, v| acc + v.point.coords);
        Point2::from(sum / self.edges.len() as f32)
    }

    /// First id not yet used by a vertex of this polygon.
    pub(crate) fn next_vertex_id(&self) -> u64 {
        self.vertices().map(|v| v.id.0 + 1).max().unwrap_or(0)
    }

    /// First id not yet used by an edge of this polygon.
    pub(crate) fn next_edge_id(&self) -> u64 {
        self.edges.iter().map(|e| e.id().0 + 1).max().unwrap_or(0)
    }

    /// Classifies this polygon relative to a plane by tallying per-vertex
    /// classifications: Spanning iff vertices land strictly on both sides.
    pub fn classify(&self, plane: &Plane) -> Classification {
        let mut front = 0;
        let mut back = 0;

        for vertex in self.vertices() {
            match plane.classify_point(vertex.point) {
                PlaneSide::Front => front += 1,
                PlaneSide::Back => back += 1,
                PlaneSide::On => {}
            }
        }

        if front > 0 && back > 0 {
            Classification::Spanning
        } else if front > 0 {
            Classification::Front
        } else if back > 0 {
            Classification::Back
        } else {
            Classification::Coplanar
        }
    }

    /// Even-odd point-in-polygon test.
    pub fn contains_point(&self, point: Point2<f32>) -> bool {
        if !self.bounds.contains(point) {
            return false;
        }
        let mut inside = false;
        for edge in &self.edges {
            let a = edge.start().point;
            let b = edge.end().point;
            if (a.y > point.y) != (b.y > point.y) {
                let x_cross = a.x + (point.y - a.y) / (b.y - a.y) * (b.x - a.x);
                if point.x < x_cross {
                    inside = !inside;
                }
            }
        }
        inside
    }
}

fn is_closed(edges: &[Edge]) -> bool {
    edges.iter().enumerate().all(|(i, e)| {
        let next = &edges[(i + 1) % edges.len()];
        e.end().id == next.start().id
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rectangle(id: u64, min: (f32, f32), max: (f32, f32)) -> Polygon {
        Polygon::from_points(
            PolygonId(id),
            &[
                Point2::new(min.0, min.1),
                Point2::new(max.0, min.1),
                Point2::new(max.0, max.1),
                Point2::new(min.0, max.1),
            ],
        )
    }

    #[test]
    fn from_points_closes_loop() {
        let poly = rectangle(0, (0.0, 0.0), (100.0, 100.0));
        assert_eq!(poly.edge_count(), 4);
        for (i, edge) in poly.edges().iter().enumerate() {
            let next = &poly.edges()[(i + 1) % 4];
            assert_eq!(edge.end().id, next.start().id);
        }
    }

    #[test]
    fn bounds_and_centroid() {
        let poly = rectangle(0, (0.0, 0.0), (100.0, 50.0));
        assert_eq!(poly.bounds().min, Point2::new(0.0, 0.0));
        assert_eq!(poly.bounds().max, Point2::new(100.0, 50.0));
        let c = poly.centroid();
        assert_relative_eq!(c.x, 50.0);
        assert_relative_eq!(c.y, 25.0);
    }

    #[test]
    fn classify_sides() {
        let poly = rectangle(0, (0.0, 0.0), (10.0, 10.0));
        let left = Plane::new(nalgebra::Vector2::new(1.0, 0.0), -5.0);
        let right = Plane::new(nalgebra::Vector2::new(1.0, 0.0), 50.0);
        let through = Plane::new(nalgebra::Vector2::new(1.0, 0.0), 5.0);
        assert_eq!(poly.classify(&left), Classification::Front);
        assert_eq!(poly.classify(&right), Classification::Back);
        assert_eq!(poly.classify(&through), Classification::Spanning);
    }

    #[test]
    fn plane_along_own_edge_is_never_spanning() {
        let poly = rectangle(0, (0.0, 0.0), (10.0, 10.0));
        for edge in poly.edges() {
            let plane = Plane::from_segment(edge.start().point, edge.end().point);
            // The edge's endpoints are On, the rest of the loop falls on
            // one side, so the polygon never straddles its own edge.
            assert_eq!(
                plane.classify_point(edge.start().point),
                PlaneSide::On
            );
            assert_eq!(plane.classify_point(edge.end().point), PlaneSide::On);
            assert_ne!(poly.classify(&plane), Classification::Spanning);
        }
    }

    #[test]
    fn contains_point_even_odd() {
        let poly = rectangle(0, (0.0, 0.0), (10.0, 10.0));
        assert!(poly.contains_point(Point2::new(5.0, 5.0)));
        assert!(!poly.contains_point(Point2::new(15.0, 5.0)));
        assert!(!poly.contains_point(Point2::new(5.0, -1.0)));
    }
}
