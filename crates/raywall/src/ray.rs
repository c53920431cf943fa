//! Rays and the intersection math behind collision probes and casting.

use nalgebra::{Point2, Vector2};

use crate::bounds::Aabb;
use crate::edge::{Edge, Face, Segment};
use crate::plane::Plane;
use crate::polygon::PolygonId;

/// A ray with the derived values the casting paths need.
///
/// `cos_incidence` is the cosine of the angle between the ray and the
/// camera's view midline. Distances reported by the ray are scaled by it,
/// so oblique rays in the same frustum column stay comparable to a flat
/// projection plane instead of bowing into fish-eye.
#[derive(Debug, Clone, PartialEq)]
pub struct Ray {
    origin: Point2<f32>,
    direction: Vector2<f32>,
    unit: Vector2<f32>,
    perp: Vector2<f32>,
    recip: Vector2<f32>,
    line: Plane,
    cos_incidence: f32,
}

impl Ray {
    /// A free ray: incidence correction is the identity.
    ///
    /// # Panics
    /// Panics if `direction` has zero length.
    pub fn new(origin: Point2<f32>, direction: Vector2<f32>) -> Self {
        Self::with_cos_incidence(origin, direction, 1.0)
    }

    /// A ray aimed from `origin` at `target`, measuring incidence against
    /// the given view midline.
    pub fn toward(origin: Point2<f32>, target: Point2<f32>, midline: Vector2<f32>) -> Self {
        let direction = target - origin;
        let cos = direction.normalize().dot(&midline.normalize());
        Self::with_cos_incidence(origin, direction, cos)
    }

    fn with_cos_incidence(
        origin: Point2<f32>,
        direction: Vector2<f32>,
        cos_incidence: f32,
    ) -> Self {
        let norm = direction.norm();
        assert!(norm > f32::EPSILON, "Ray direction cannot be zero");
        let unit = direction / norm;
        let perp = Vector2::new(-unit.y, unit.x);
        Self {
            origin,
            direction,
            unit,
            perp,
            recip: Vector2::new(1.0 / unit.x, 1.0 / unit.y),
            line: Plane::from_point_and_normal(origin, perp),
            cos_incidence,
        }
    }

    #[inline]
    pub fn origin(&self) -> Point2<f32> {
        self.origin
    }

    #[inline]
    pub fn direction(&self) -> Vector2<f32> {
        self.direction
    }

    /// Normalized direction; intersection parameters are distances along it.
    #[inline]
    pub fn unit(&self) -> Vector2<f32> {
        self.unit
    }

    /// Counter-clockwise perpendicular of the normalized direction.
    #[inline]
    pub fn perp(&self) -> Vector2<f32> {
        self.perp
    }

    /// The ray's carrier line in plane form.
    #[inline]
    pub fn line(&self) -> &Plane {
        &self.line
    }

    #[inline]
    pub fn cos_incidence(&self) -> f32 {
        self.cos_incidence
    }

    /// Converts a raw parameter along the ray into a reported distance,
    /// applying the incidence correction.
    #[inline]
    pub fn distance(&self, t: f32) -> f32 {
        t * self.cos_incidence
    }

    /// Point at raw parameter `t` along the ray.
    #[inline]
    pub fn at(&self, t: f32) -> Point2<f32> {
        self.origin + self.unit * t
    }

    /// Intersects the ray with a segment by solving the 2x2 system formed
    /// by the two parametrizations.
    ///
    /// Returns `Some((t, point))` with `t` the raw distance along the ray;
    /// accepts only a segment parameter in `[0, 1]` and `t >= 0`. `None`
    /// when the ray and segment are parallel.
    pub fn intersect_segment(&self, segment: &Segment) -> Option<(f32, Point2<f32>)> {
        let e = segment.direction();
        let denom = self.unit.perp(&e);
        if denom == 0.0 {
            return None;
        }

        let ao = segment.start - self.origin;
        let t = ao.perp(&e) / denom;
        let s = ao.perp(&self.unit) / denom;

        if !(0.0..=1.0).contains(&s) || t < 0.0 {
            return None;
        }
        Some((t, self.at(t)))
    }

    /// Intersects the ray with an edge, reporting which face was struck.
    pub fn intersect_edge(&self, polygon: PolygonId, edge: &Edge) -> Option<Hit> {
        let (t, point) = self.intersect_segment(&edge.segment())?;
        Some(Hit {
            polygon,
            edge: edge.clone(),
            point,
            face: edge.facing(self.origin),
            distance: self.distance(t),
        })
    }

    /// Intersects the ray with a plane.
    ///
    /// `None` when the denominator is exactly zero (ray parallel to the
    /// plane) or the solved parameter is negative.
    pub fn intersect_plane(&self, plane: &Plane) -> Option<(f32, Point2<f32>)> {
        let denom = plane.normal().dot(&self.unit);
        if denom == 0.0 {
            return None;
        }
        let t = (plane.offset() - plane.normal().dot(&self.origin.coords)) / denom;
        if t < 0.0 {
            return None;
        }
        Some((t, self.at(t)))
    }

    /// Per-axis slab test against an AABB using the reciprocal direction.
    ///
    /// An axis-parallel ray outside the box's span on that axis rejects
    /// immediately.
    pub fn intersect_aabb(&self, aabb: &Aabb) -> bool {
        let mut t_min = 0.0_f32;
        let mut t_max = f32::INFINITY;

        for axis in 0..2 {
            if self.unit[axis] == 0.0 {
                if self.origin[axis] < aabb.min[axis] || self.origin[axis] > aabb.max[axis] {
                    return false;
                }
                continue;
            }
            let mut t1 = (aabb.min[axis] - self.origin[axis]) * self.recip[axis];
            let mut t2 = (aabb.max[axis] - self.origin[axis]) * self.recip[axis];
            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
            }
            t_min = t_min.max(t1);
            t_max = t_max.min(t2);
            if t_min > t_max {
                return false;
            }
        }
        true
    }
}

/// A collision record: which wall a ray struck, where, on which face,
/// and how far away (incidence-corrected).
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    pub polygon: PolygonId,
    pub edge: Edge,
    pub point: Point2<f32>,
    pub face: Face,
    pub distance: f32,
}

/// Aggregate casting statistics: how much geometry a query actually
/// touched versus the total in the tree. Diagnostics only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CastStats {
    pub polygons_tested: usize,
    pub edges_tested: usize,
    pub polygons_total: usize,
    pub edges_total: usize,
}
