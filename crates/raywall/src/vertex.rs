//! Vertices with identity.

use nalgebra::Point2;

/// Identity of a vertex within a geometry.
///
/// Consecutive edges of a polygon share vertex *identity* at their join,
/// not merely equal coordinates. Loop-closure checks compare ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId(pub u64);

impl std::fmt::Display for VertexId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// A map vertex: identity plus position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub id: VertexId,
    pub point: Point2<f32>,
}

impl Vertex {
    pub fn new(id: VertexId, point: Point2<f32>) -> Self {
        Self { id, point }
    }

    /// Returns a copy of this vertex moved to a new position.
    ///
    /// Identity is kept; frustum clipping uses this to slide an endpoint
    /// along its edge without breaking the edge's join bookkeeping.
    pub fn moved_to(&self, point: Point2<f32>) -> Self {
        Self { id: self.id, point }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moved_to_keeps_identity() {
        let v = Vertex::new(VertexId(3), Point2::new(1.0, 2.0));
        let moved = v.moved_to(Point2::new(5.0, 5.0));
        assert_eq!(moved.id, v.id);
        assert_eq!(moved.point, Point2::new(5.0, 5.0));
    }
}
