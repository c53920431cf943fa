//! Camera and view frustum.

use nalgebra::{Point2, Vector2};

use crate::edge::{Edge, Segment};
use crate::plane::{Plane, PlaneSide};
use crate::ray::Ray;

/// A first-person viewpoint in the map plane.
///
/// `direction` points at the middle of the screen segment; `half_plane`
/// spans half the screen's width, so its length controls the field of
/// view.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    position: Point2<f32>,
    direction: Vector2<f32>,
    half_plane: Vector2<f32>,
}

impl Camera {
    pub fn new(position: Point2<f32>, direction: Vector2<f32>, half_plane: Vector2<f32>) -> Self {
        Self {
            position,
            direction,
            half_plane,
        }
    }

    #[inline]
    pub fn position(&self) -> Point2<f32> {
        self.position
    }

    #[inline]
    pub fn direction(&self) -> Vector2<f32> {
        self.direction
    }

    #[inline]
    pub fn half_plane(&self) -> Vector2<f32> {
        self.half_plane
    }

    /// The screen segment the world projects onto.
    pub fn screen(&self) -> Segment {
        let center = self.position + self.direction;
        Segment::new(center - self.half_plane, center + self.half_plane)
    }

    /// The view midline, from the camera through the screen center.
    pub fn midline(&self) -> Ray {
        Ray::new(self.position, self.direction)
    }

    /// The view cone's boundary rays, through the screen's endpoints.
    pub fn cone(&self) -> (Ray, Ray) {
        let screen = self.screen();
        (
            Ray::new(self.position, screen.start - self.position),
            Ray::new(self.position, screen.end - self.position),
        )
    }

    /// Derives the three clip planes (forward, left, right) plus the
    /// boundary rays used to clip partially-visible edges.
    pub fn frustum(&self) -> Frustum {
        let screen = self.screen();
        let center = self.position + self.direction;
        let inward = |plane: Plane| {
            if plane.classify_point(center) == PlaneSide::Back {
                plane.flipped()
            } else {
                plane
            }
        };
        Frustum {
            forward: Plane::from_point_and_normal(self.position, self.direction),
            left: inward(Plane::from_segment(self.position, screen.start)),
            right: inward(Plane::from_segment(self.position, screen.end)),
            cone: self.cone(),
        }
    }

    /// The fan ray through screen sample `column / resolution`.
    ///
    /// A resolution of 10 yields 11 rays, one per column 0..=10. Each ray
    /// carries its incidence against the view midline so reported
    /// distances are projection-plane depths.
    pub fn column_ray(&self, column: usize, resolution: usize) -> Ray {
        let t = column as f32 / resolution as f32;
        Ray::toward(self.position, self.screen().at(t), self.direction)
    }

    /// Projects a world point to its fractional screen parameter
    /// (0.0 at the screen start, 1.0 at its end, unclamped outside).
    ///
    /// `None` for points behind the screen plane's reach (no positive
    /// ray intersection) or coincident with the camera.
    pub fn project(&self, point: Point2<f32>) -> Option<f32> {
        let direction = point - self.position;
        if direction.norm() <= f32::EPSILON {
            return None;
        }
        let screen = self.screen();
        let screen_plane = Plane::from_segment(screen.start, screen.end);
        let ray = Ray::new(self.position, direction);
        let (_, on_screen) = ray.intersect_plane(&screen_plane)?;
        Some(screen.project_point(on_screen))
    }
}

/// The camera's field-of-view wedge: forward, left and right clip planes
/// with inward-facing normals, plus the cone's boundary rays.
#[derive(Debug, Clone, PartialEq)]
pub struct Frustum {
    forward: Plane,
    left: Plane,
    right: Plane,
    cone: (Ray, Ray),
}

impl Frustum {
    #[inline]
    pub fn forward(&self) -> &Plane {
        &self.forward
    }

    #[inline]
    pub fn left(&self) -> &Plane {
        &self.left
    }

    #[inline]
    pub fn right(&self) -> &Plane {
        &self.right
    }

    fn reject(&self, a: Point2<f32>, b: Point2<f32>) -> bool {
        let a_front = self.forward.classify_point(a) == PlaneSide::Front;
        let b_front = self.forward.classify_point(b) == PlaneSide::Front;
        if !a_front && !b_front {
            return true;
        }
        // Both endpoints in the same combined outside region
        (self.outside_left(a) && self.outside_left(b))
            || (self.outside_right(a) && self.outside_right(b))
    }

    fn outside_left(&self, p: Point2<f32>) -> bool {
        self.left.classify_point(p) == PlaneSide::Back
    }

    fn outside_right(&self, p: Point2<f32>) -> bool {
        self.right.classify_point(p) == PlaneSide::Back
    }

    /// Whether any part of the edge lies in view. Same classification as
    /// [`Frustum::clip_edge`] without computing intersections.
    pub fn contains_edge(&self, edge: &Edge) -> bool {
        !self.reject(edge.start().point, edge.end().point)
    }

    /// Clips an edge to the view wedge.
    ///
    /// Fully-outside edges return `None`; fully-inside edges come back
    /// unchanged. An endpoint outside a boundary is replaced with the
    /// edge's intersection against that boundary ray, falling back to the
    /// other boundary ray when the first yields no point. The clipped
    /// edge keeps the original's id, materials and immaterial flag.
    pub fn clip_edge(&self, edge: &Edge) -> Option<Edge> {
        let a = edge.start().point;
        let b = edge.end().point;
        if self.reject(a, b) {
            return None;
        }

        let segment = edge.segment();
        let mut start = *edge.start();
        let mut end = *edge.end();

        if self.outside_left(a) || self.outside_right(a) {
            let point = self.boundary_intersection(self.outside_left(a), &segment)?;
            start = start.moved_to(point);
        }
        if self.outside_left(b) || self.outside_right(b) {
            let point = self.boundary_intersection(self.outside_left(b), &segment)?;
            end = end.moved_to(point);
        }

        Some(edge.with_endpoints(start, end))
    }

    fn boundary_intersection(&self, left_first: bool, segment: &Segment) -> Option<Point2<f32>> {
        let (primary, fallback) = if left_first {
            (&self.cone.0, &self.cone.1)
        } else {
            (&self.cone.1, &self.cone.0)
        };
        primary
            .intersect_segment(segment)
            .or_else(|| fallback.intersect_segment(segment))
            .map(|(_, point)| point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::EdgeId;
    use crate::vertex::{Vertex, VertexId};
    use approx::assert_relative_eq;

    // The fixture camera from the renderer scenario: standing at the
    // center of a 100x100 room, looking up.
    fn camera() -> Camera {
        Camera::new(
            Point2::new(50.0, 50.0),
            Vector2::new(0.0, 10.0),
            Vector2::new(15.0, 0.0),
        )
    }

    fn edge(a: (f32, f32), b: (f32, f32)) -> Edge {
        Edge::new(
            EdgeId(0),
            Vertex::new(VertexId(0), Point2::new(a.0, a.1)),
            Vertex::new(VertexId(1), Point2::new(b.0, b.1)),
        )
    }

    #[test]
    fn screen_spans_half_planes() {
        let screen = camera().screen();
        assert_eq!(screen.start, Point2::new(35.0, 60.0));
        assert_eq!(screen.end, Point2::new(65.0, 60.0));
    }

    #[test]
    fn column_rays_fan_across_screen() {
        let cam = camera();
        let center = cam.column_ray(5, 10);
        assert_relative_eq!(center.cos_incidence(), 1.0, epsilon = 1e-6);
        assert_relative_eq!(center.unit().x, 0.0, epsilon = 1e-6);

        let leftmost = cam.column_ray(0, 10);
        let expect = (Point2::new(35.0, 60.0) - Point2::new(50.0, 50.0)).normalize();
        assert_relative_eq!(leftmost.unit().x, expect.x, epsilon = 1e-6);
        assert!(leftmost.cos_incidence() < 1.0);
    }

    #[test]
    fn project_maps_view_to_screen_params() {
        let cam = camera();
        assert_relative_eq!(cam.project(Point2::new(50.0, 100.0)).unwrap(), 0.5);
        assert_relative_eq!(cam.project(Point2::new(35.0, 60.0)).unwrap(), 0.0);
        assert_relative_eq!(cam.project(Point2::new(65.0, 60.0)).unwrap(), 1.0);
        // Behind the camera projects nowhere
        assert!(cam.project(Point2::new(50.0, 40.0)).is_none());
    }

    #[test]
    fn clip_edge_fully_inside_is_unchanged() {
        let frustum = camera().frustum();
        let e = edge((45.0, 80.0), (55.0, 80.0));
        let clipped = frustum.clip_edge(&e).unwrap();
        assert_eq!(clipped, e);
        assert!(frustum.contains_edge(&e));
    }

    #[test]
    fn clip_edge_fully_outside_is_none() {
        let frustum = camera().frustum();
        // Behind the camera
        assert!(frustum.clip_edge(&edge((40.0, 30.0), (60.0, 30.0))).is_none());
        // Far off to the left
        assert!(frustum
            .clip_edge(&edge((-100.0, 60.0), (-90.0, 60.0)))
            .is_none());
        assert!(!frustum.contains_edge(&edge((40.0, 30.0), (60.0, 30.0))));
    }

    #[test]
    fn clip_edge_straddling_is_shorter() {
        let frustum = camera().frustum();
        let e = edge((-100.0, 80.0), (200.0, 80.0));
        let clipped = frustum.clip_edge(&e).unwrap();
        assert!(clipped.length() < e.length());
        assert_eq!(clipped.id(), e.id());

        // Clipped endpoints sit on the cone's boundary rays
        let (left, right) = camera().cone();
        let start = clipped.start().point;
        let end = clipped.end().point;
        assert_relative_eq!(
            left.line().signed_distance(start).abs(),
            0.0,
            epsilon = 1e-3
        );
        assert_relative_eq!(
            right.line().signed_distance(end).abs(),
            0.0,
            epsilon = 1e-3
        );
    }

    #[test]
    fn clip_preserves_material_and_identity() {
        use crate::edge::Material;
        let frustum = camera().frustum();
        let e = edge((-100.0, 80.0), (200.0, 80.0))
            .with_front(Material::solid("brick"))
            .with_immaterial(true);
        let clipped = frustum.clip_edge(&e).unwrap();
        assert_eq!(clipped.id(), e.id());
        assert_eq!(clipped.front_material(), e.front_material());
        assert!(clipped.is_immaterial());
    }
}
