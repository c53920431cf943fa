//! Wall edges: the visible, collidable surfaces of a map.

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

use crate::vertex::Vertex;

/// Identity of an edge within a geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub u64);

impl std::fmt::Display for EdgeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// Which face of an edge a query sees.
///
/// An edge running `start -> end` has its front face on the left of the
/// direction of travel (the counter-clockwise perpendicular side).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Face {
    Front,
    Back,
}

impl Face {
    pub fn opposite(self) -> Self {
        match self {
            Face::Front => Face::Back,
            Face::Back => Face::Front,
        }
    }
}

/// Surface description for one face of an edge.
///
/// `opacity` drives the z-buffer compositor: 1.0 fills a column outright,
/// anything in (0, 1) lets farther spans show through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub texture: String,
    pub opacity: f32,
}

impl Material {
    /// A fully opaque material.
    pub fn solid(texture: impl Into<String>) -> Self {
        Self {
            texture: texture.into(),
            opacity: 1.0,
        }
    }

    /// A translucent material with the given opacity.
    pub fn translucent(texture: impl Into<String>, opacity: f32) -> Self {
        Self {
            texture: texture.into(),
            opacity,
        }
    }
}

/// A bare line segment between two points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Point2<f32>,
    pub end: Point2<f32>,
}

impl Segment {
    pub fn new(start: Point2<f32>, end: Point2<f32>) -> Self {
        Self { start, end }
    }

    #[inline]
    pub fn direction(&self) -> Vector2<f32> {
        self.end - self.start
    }

    #[inline]
    pub fn length(&self) -> f32 {
        self.direction().norm()
    }

    #[inline]
    pub fn midpoint(&self) -> Point2<f32> {
        nalgebra::center(&self.start, &self.end)
    }

    /// Parameter of the orthogonal projection of `point` onto the segment's
    /// carrier line: 0.0 at `start`, 1.0 at `end`, unclamped outside.
    pub fn project_point(&self, point: Point2<f32>) -> f32 {
        let direction = self.direction();
        let len_sq = direction.norm_squared();
        if len_sq <= f32::EPSILON {
            return 0.0;
        }
        (point - self.start).dot(&direction) / len_sq
    }

    /// Point at parameter `t` along the segment.
    pub fn at(&self, t: f32) -> Point2<f32> {
        self.start + self.direction() * t
    }
}

/// An ordered (start, end) pair of vertices with per-face materials.
///
/// Edges are two-sided: the `front` material faces the left of the
/// `start -> end` direction, `back` the right. An `immaterial` edge is
/// rendered but never blocks movement.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    id: EdgeId,
    start: Vertex,
    end: Vertex,
    front: Option<Material>,
    back: Option<Material>,
    immaterial: bool,
}

impl Edge {
    pub fn new(id: EdgeId, start: Vertex, end: Vertex) -> Self {
        Self {
            id,
            start,
            end,
            front: None,
            back: None,
            immaterial: false,
        }
    }

    pub fn with_front(mut self, material: Material) -> Self {
        self.front = Some(material);
        self
    }

    pub fn with_back(mut self, material: Material) -> Self {
        self.back = Some(material);
        self
    }

    pub fn with_immaterial(mut self, immaterial: bool) -> Self {
        self.immaterial = immaterial;
        self
    }

    /// Copy of this edge between different endpoints, keeping
    /// id/materials/immaterial. Frustum clipping and splitting rely on
    /// this to hand out partial edges that still identify the wall.
    pub fn with_endpoints(&self, start: Vertex, end: Vertex) -> Self {
        Self {
            id: self.id,
            start,
            end,
            front: self.front.clone(),
            back: self.back.clone(),
            immaterial: self.immaterial,
        }
    }

    #[inline]
    pub fn id(&self) -> EdgeId {
        self.id
    }

    #[inline]
    pub fn start(&self) -> &Vertex {
        &self.start
    }

    #[inline]
    pub fn end(&self) -> &Vertex {
        &self.end
    }

    #[inline]
    pub fn segment(&self) -> Segment {
        Segment::new(self.start.point, self.end.point)
    }

    #[inline]
    pub fn direction(&self) -> Vector2<f32> {
        self.end.point - self.start.point
    }

    #[inline]
    pub fn length(&self) -> f32 {
        self.direction().norm()
    }

    /// Slope dy/dx; ±infinity for a vertical edge.
    pub fn slope(&self) -> f32 {
        let d = self.direction();
        d.y / d.x
    }

    /// Directional shading weight: 0.4 for a horizontal edge rising to
    /// 1.0 for a vertical one.
    pub fn luminosity(&self) -> f32 {
        let d = self.direction();
        let len = d.norm();
        if len <= f32::EPSILON {
            return 0.4;
        }
        0.4 + 0.6 * (d.y.abs() / len)
    }

    /// Which face of this edge the given point sees.
    ///
    /// Sign of the 2D cross product between the edge direction and
    /// `point - start`; points on the carrier line count as Back.
    pub fn facing(&self, point: Point2<f32>) -> Face {
        let d = self.direction();
        if d.perp(&(point - self.start.point)) > 0.0 {
            Face::Front
        } else {
            Face::Back
        }
    }

    pub fn material(&self, face: Face) -> Option<&Material> {
        match face {
            Face::Front => self.front.as_ref(),
            Face::Back => self.back.as_ref(),
        }
    }

    pub fn front_material(&self) -> Option<&Material> {
        self.front.as_ref()
    }

    pub fn back_material(&self) -> Option<&Material> {
        self.back.as_ref()
    }

    /// True if either face carries a material.
    pub fn has_material(&self) -> bool {
        self.front.is_some() || self.back.is_some()
    }

    #[inline]
    pub fn is_immaterial(&self) -> bool {
        self.immaterial
    }

    /// The same wall walked the other way: endpoints and faces swap.
    pub fn reversed(&self) -> Self {
        Self {
            id: self.id,
            start: self.end,
            end: self.start,
            front: self.back.clone(),
            back: self.front.clone(),
            immaterial: self.immaterial,
        }
    }
}
