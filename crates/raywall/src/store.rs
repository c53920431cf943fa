//! Flat serialization mirrors for saving and loading wall maps.
//!
//! The stored form is a plain tree of structs with no geometry types in
//! it, so the on-disk schema survives math-library changes. Loading
//! validates loop closure and edge counts before any `Polygon` is built.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::edge::{Edge, EdgeId, Material};
use crate::error::GeometryError;
use crate::geometry::Geometry;
use crate::polygon::{Polygon, PolygonId};
use crate::vertex::{Vertex, VertexId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredVertex {
    pub id: u64,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredEdge {
    pub id: u64,
    pub start: StoredVertex,
    pub end: StoredVertex,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub front: Option<Material>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back: Option<Material>,
    #[serde(default)]
    pub immaterial: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredPolygon {
    pub id: u64,
    pub edges: Vec<StoredEdge>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredGeometry {
    pub polygons: Vec<StoredPolygon>,
}

impl From<&Vertex> for StoredVertex {
    fn from(vertex: &Vertex) -> Self {
        Self {
            id: vertex.id.0,
            x: vertex.point.x,
            y: vertex.point.y,
        }
    }
}

impl From<&StoredVertex> for Vertex {
    fn from(stored: &StoredVertex) -> Self {
        Vertex::new(VertexId(stored.id), Point2::new(stored.x, stored.y))
    }
}

impl From<&Edge> for StoredEdge {
    fn from(edge: &Edge) -> Self {
        Self {
            id: edge.id().0,
            start: edge.start().into(),
            end: edge.end().into(),
            front: edge.front_material().cloned(),
            back: edge.back_material().cloned(),
            immaterial: edge.is_immaterial(),
        }
    }
}

impl From<&StoredEdge> for Edge {
    fn from(stored: &StoredEdge) -> Self {
        let mut edge = Edge::new(
            EdgeId(stored.id),
            (&stored.start).into(),
            (&stored.end).into(),
        )
        .with_immaterial(stored.immaterial);
        if let Some(front) = &stored.front {
            edge = edge.with_front(front.clone());
        }
        if let Some(back) = &stored.back {
            edge = edge.with_back(back.clone());
        }
        edge
    }
}

impl StoredGeometry {
    pub fn from_geometry(geometry: &Geometry) -> Self {
        Self {
            polygons: geometry
                .polygons()
                .iter()
                .map(|polygon| StoredPolygon {
                    id: polygon.id().0,
                    edges: polygon.edges().iter().map(StoredEdge::from).collect(),
                })
                .collect(),
        }
    }

    /// Validates and rebuilds the live geometry. The tree is not stored;
    /// callers rebuild it after loading.
    pub fn into_geometry(self) -> Result<Geometry, GeometryError> {
        let mut polygons = Vec::with_capacity(self.polygons.len());
        for stored in &self.polygons {
            let id = PolygonId(stored.id);
            if stored.edges.len() < 3 {
                return Err(GeometryError::TooFewEdges {
                    polygon: id,
                    edges: stored.edges.len(),
                });
            }
            for (edge, next) in stored
                .edges
                .iter()
                .zip(stored.edges.iter().cycle().skip(1))
            {
                if edge.end.id != next.start.id {
                    return Err(GeometryError::OpenLoop { polygon: id });
                }
            }
            polygons.push(Polygon::new(
                id,
                stored.edges.iter().map(Edge::from).collect(),
            ));
        }
        Ok(Geometry::from_polygons(polygons))
    }
}
