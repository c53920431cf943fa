//! Plane representation and half-space classification.

use nalgebra::{Point2, Vector2};

/// Default epsilon for plane classification.
/// Points within this distance of the plane are considered "on" the plane.
pub const PLANE_EPSILON: f32 = 1e-4;

/// Which side of a plane a point lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneSide {
    /// Point is in front of the plane (positive side of normal)
    Front,
    /// Point is behind the plane (negative side of normal)
    Back,
    /// Point lies on the plane (within epsilon tolerance)
    On,
}

/// Classification of a polygon relative to a plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// All vertices are in front of the plane
    Front,
    /// All vertices are behind the plane
    Back,
    /// All vertices are on the plane
    Coplanar,
    /// Vertices are on both sides (straddles the plane)
    Spanning,
}

/// A plane (an oriented line) in 2D space, represented as `normal · point = offset`.
///
/// Wall maps are flat, so the "planes" that partition them are oriented
/// lines: a unit normal plus a signed distance from the origin. The side
/// the normal points toward is the front half-space.
#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    normal: Vector2<f32>,
    offset: f32,
}

impl Plane {
    /// Creates a new plane from a normal vector and offset.
    /// The normal will be normalized automatically.
    ///
    /// # Panics
    /// Panics if the normal vector has zero length.
    pub fn new(normal: Vector2<f32>, offset: f32) -> Self {
        let norm = normal.norm();
        assert!(norm > f32::EPSILON, "Plane normal cannot be zero");
        Self {
            normal: normal / norm,
            offset: offset / norm,
        }
    }

    /// Creates a plane from a point on the plane and a normal vector.
    /// The normal will be normalized automatically.
    ///
    /// # Panics
    /// Panics if the normal vector has zero length.
    pub fn from_point_and_normal(point: Point2<f32>, normal: Vector2<f32>) -> Self {
        let norm = normal.norm();
        assert!(norm > f32::EPSILON, "Plane normal cannot be zero");
        let unit_normal = normal / norm;
        let offset = unit_normal.dot(&point.coords);
        Self {
            normal: unit_normal,
            offset,
        }
    }

    /// Creates a plane containing the segment from `a` to `b`.
    ///
    /// The normal is the counter-clockwise perpendicular of `b - a`, so the
    /// front half-space is the front-face side of an edge running `a -> b`.
    ///
    /// # Panics
    /// Panics if `a` and `b` coincide.
    pub fn from_segment(a: Point2<f32>, b: Point2<f32>) -> Self {
        let direction = b - a;
        let normal = Vector2::new(-direction.y, direction.x);
        Self::from_point_and_normal(a, normal)
    }

    /// Returns the unit normal vector of the plane.
    #[inline]
    pub fn normal(&self) -> Vector2<f32> {
        self.normal
    }

    /// Returns the signed distance from the origin to the plane along the normal.
    #[inline]
    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Computes the signed distance from a point to the plane.
    /// - Positive: point is in front (same side as normal)
    /// - Negative: point is behind (opposite side from normal)
    /// - Zero: point is on the plane
    #[inline]
    pub fn signed_distance(&self, point: Point2<f32>) -> f32 {
        self.normal.dot(&point.coords) - self.offset
    }

    /// Classifies which side of the plane a point lies on.
    /// Uses the default `PLANE_EPSILON` tolerance, never an exact-zero test.
    #[inline]
    pub fn classify_point(&self, point: Point2<f32>) -> PlaneSide {
        self.classify_point_with_epsilon(point, PLANE_EPSILON)
    }

    /// Classifies which side of the plane a point lies on, with a custom epsilon.
    pub fn classify_point_with_epsilon(&self, point: Point2<f32>, epsilon: f32) -> PlaneSide {
        let dist = self.signed_distance(point);
        if dist > epsilon {
            PlaneSide::Front
        } else if dist < -epsilon {
            PlaneSide::Back
        } else {
            PlaneSide::On
        }
    }

    /// Returns a new plane with the normal flipped (facing the opposite direction).
    #[inline]
    pub fn flipped(&self) -> Self {
        Self {
            normal: -self.normal,
            offset: -self.offset,
        }
    }

    /// Whether two planes coincide in both orientation and position,
    /// within `PLANE_EPSILON`.
    ///
    /// The split-plane search uses this to skip a candidate identical to
    /// the previous split plane, which would make no partitioning progress.
    pub fn approx_eq(&self, other: &Plane) -> bool {
        (self.normal - other.normal).norm() <= PLANE_EPSILON
            && (self.offset - other.offset).abs() <= PLANE_EPSILON
    }

    /// Computes the intersection of a line segment with the plane.
    ///
    /// Returns `Some((t, point))` where:
    /// - `t` is the interpolation parameter (0.0 = start, 1.0 = end)
    /// - `point` is the intersection point
    ///
    /// Returns `None` if the segment is parallel to the plane or doesn't intersect.
    pub fn intersect_segment(
        &self,
        start: Point2<f32>,
        end: Point2<f32>,
    ) -> Option<(f32, Point2<f32>)> {
        let direction = end - start;
        let denom = self.normal.dot(&direction);

        // Segment is parallel to plane
        if denom.abs() < f32::EPSILON {
            return None;
        }

        let t = (self.offset - self.normal.dot(&start.coords)) / denom;

        // Intersection is outside the segment
        if !(0.0..=1.0).contains(&t) {
            return None;
        }

        let point = start + direction * t;
        Some((t, point))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn new_normalizes() {
        let plane = Plane::new(Vector2::new(0.0, 2.0), 10.0);
        assert_relative_eq!(plane.normal().norm(), 1.0);
        assert_relative_eq!(plane.offset(), 5.0);
    }

    #[test]
    fn signed_distance_sides() {
        // Horizontal plane y = 3
        let plane = Plane::new(Vector2::new(0.0, 1.0), 3.0);
        assert_relative_eq!(plane.signed_distance(Point2::new(0.0, 5.0)), 2.0);
        assert_relative_eq!(plane.signed_distance(Point2::new(7.0, 1.0)), -2.0);
    }

    #[test]
    fn classify_uses_epsilon_band() {
        let plane = Plane::new(Vector2::new(1.0, 0.0), 2.0);
        assert_eq!(plane.classify_point(Point2::new(3.0, 0.0)), PlaneSide::Front);
        assert_eq!(plane.classify_point(Point2::new(1.0, 0.0)), PlaneSide::Back);
        assert_eq!(plane.classify_point(Point2::new(2.0, 9.0)), PlaneSide::On);
        // Within the epsilon thickness band still counts as On
        let nudged = Point2::new(2.0 + PLANE_EPSILON * 0.5, 0.0);
        assert_eq!(plane.classify_point(nudged), PlaneSide::On);
    }

    #[test]
    fn from_segment_front_is_left_of_direction() {
        // Segment along +X: the CCW perpendicular points up
        let plane = Plane::from_segment(Point2::new(0.0, 0.0), Point2::new(4.0, 0.0));
        assert_eq!(plane.classify_point(Point2::new(2.0, 1.0)), PlaneSide::Front);
        assert_eq!(plane.classify_point(Point2::new(2.0, -1.0)), PlaneSide::Back);
        assert_eq!(plane.classify_point(Point2::new(9.0, 0.0)), PlaneSide::On);
    }

    #[test]
    fn flipped_swaps_sides() {
        let plane = Plane::from_segment(Point2::new(0.0, 0.0), Point2::new(4.0, 0.0));
        let flipped = plane.flipped();
        assert_eq!(
            flipped.classify_point(Point2::new(2.0, 1.0)),
            PlaneSide::Back
        );
    }

    #[test]
    fn approx_eq_detects_identical_planes() {
        let a = Plane::from_segment(Point2::new(0.0, 0.0), Point2::new(4.0, 0.0));
        let b = Plane::from_segment(Point2::new(1.0, 0.0), Point2::new(2.0, 0.0));
        let c = Plane::from_segment(Point2::new(0.0, 1.0), Point2::new(4.0, 1.0));
        assert!(a.approx_eq(&b));
        assert!(!a.approx_eq(&c));
        // Opposite orientation is a different plane
        assert!(!a.approx_eq(&a.flipped()));
    }

    #[test]
    fn intersect_segment_crossing() {
        let plane = Plane::new(Vector2::new(1.0, 0.0), 5.0);
        let (t, point) = plane
            .intersect_segment(Point2::new(0.0, 2.0), Point2::new(10.0, 2.0))
            .unwrap();
        assert_relative_eq!(t, 0.5);
        assert_relative_eq!(point.x, 5.0);
        assert_relative_eq!(point.y, 2.0);
    }

    #[test]
    fn intersect_segment_parallel_is_none() {
        let plane = Plane::new(Vector2::new(0.0, 1.0), 5.0);
        assert!(plane
            .intersect_segment(Point2::new(0.0, 2.0), Point2::new(10.0, 2.0))
            .is_none());
    }

    #[test]
    fn intersect_segment_outside_is_none() {
        let plane = Plane::new(Vector2::new(1.0, 0.0), 50.0);
        assert!(plane
            .intersect_segment(Point2::new(0.0, 0.0), Point2::new(10.0, 0.0))
            .is_none());
    }
}
