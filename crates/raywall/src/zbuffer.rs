//! Column z-buffer and the scene compositor.
//!
//! Rendering casts one ray per screen column through the BSP tree and
//! records what each ray passes through as a stack of [`Span`]s, nearest
//! first. Translucent walls layer; the first opaque wall ends the stack.
//! Because the tree is walked front to back, the whole cast can stop as
//! soon as every column has reached an opaque wall.

use std::ops::ControlFlow;

use log::debug;

use crate::bsp::{BspTree, FnVisitor};
use crate::camera::Camera;
use crate::edge::{EdgeId, Face, Material};
use crate::polygon::Polygon;
use crate::ray::CastStats;

/// One wall crossing recorded in a column: how far away, what material,
/// which edge and face, and the edge's directional shading factor.
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub distance: f32,
    pub material: Material,
    pub edge: EdgeId,
    pub face: Face,
    pub luminosity: f32,
}

impl Span {
    #[inline]
    pub fn opacity(&self) -> f32 {
        self.material.opacity
    }
}

/// The span stack for one screen column, kept sorted nearest first.
///
/// Spans behind an opaque span are invisible and dropped on insert, so
/// the stack holds at most one opaque span, always last.
#[derive(Debug, Clone, Default)]
pub struct Column {
    spans: Vec<Span>,
}

impl Column {
    #[inline]
    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Whether an opaque wall has been reached; anything farther away can
    /// no longer change this column.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.spans.last().is_some_and(|s| s.opacity() >= 1.0)
    }

    /// Nearest recorded distance, or infinity for an open column.
    pub fn depth(&self) -> f32 {
        self.spans.first().map_or(f32::INFINITY, |s| s.distance)
    }

    /// Inserts a span in distance order, discarding everything behind the
    /// first opaque span.
    pub fn push(&mut self, span: Span) {
        let index = self
            .spans
            .partition_point(|s| s.distance <= span.distance);
        self.spans.insert(index, span);
        if let Some(opaque) = self.spans.iter().position(|s| s.opacity() >= 1.0) {
            self.spans.truncate(opaque + 1);
        }
    }

    /// Alpha-over blending weight of each span, front to back. Each span
    /// contributes its opacity times the transmittance of everything in
    /// front of it.
    pub fn weights(&self) -> Vec<f32> {
        let mut transmittance = 1.0;
        self.spans
            .iter()
            .map(|span| {
                let weight = transmittance * span.opacity();
                transmittance *= 1.0 - span.opacity();
                weight
            })
            .collect()
    }
}

/// The full screen's worth of columns. A resolution of `n` yields `n + 1`
/// columns, one per fan ray.
#[derive(Debug, Clone)]
pub struct ZBuffer {
    columns: Vec<Column>,
}

impl ZBuffer {
    pub fn new(resolution: usize) -> Self {
        Self {
            columns: vec![Column::default(); resolution + 1],
        }
    }

    #[inline]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    #[inline]
    pub fn column(&self, index: usize) -> &Column {
        &self.columns[index]
    }

    pub fn push(&mut self, index: usize, span: Span) {
        self.columns[index].push(span);
    }

    pub fn all_full(&self) -> bool {
        self.columns.iter().all(Column::is_full)
    }
}

/// Renders the scene into a fresh z-buffer.
///
/// Walks the tree front to back from the camera, and for each material
/// edge in view: clips it to the frustum, projects the clipped endpoints
/// to a screen column range, then casts the column rays against the
/// original edge. Edges showing the camera a faceless side are skipped.
/// The walk breaks off once every column is full.
pub fn cast_scene(tree: &BspTree, camera: &Camera, resolution: usize) -> (ZBuffer, CastStats) {
    let mut buffer = ZBuffer::new(resolution);
    let mut stats = CastStats {
        polygons_total: tree.polygon_count(),
        edges_total: tree.edge_count(),
        ..CastStats::default()
    };
    let frustum = camera.frustum();

    let mut visitor = FnVisitor::new(|polygons: &[Polygon]| {
        // Polygons within one batch carry no ordering guarantee, so
        // fullness pruning applies only to columns already full when the
        // batch started.
        let full_at_start: Vec<bool> = buffer.columns().iter().map(Column::is_full).collect();
        for polygon in polygons {
            stats.polygons_tested += 1;
            for edge in polygon.edges() {
                if !edge.has_material() {
                    continue;
                }
                stats.edges_tested += 1;
                let Some(clipped) = frustum.clip_edge(edge) else {
                    continue;
                };
                let face = edge.facing(camera.position());
                let Some(material) = edge.material(face) else {
                    continue;
                };
                if material.opacity <= 0.0 {
                    continue;
                }
                let (Some(a), Some(b)) = (
                    camera.project(clipped.start().point),
                    camera.project(clipped.end().point),
                ) else {
                    continue;
                };
                let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
                let first = (lo * resolution as f32).ceil().max(0.0) as usize;
                let last = ((hi * resolution as f32).floor() as isize).min(resolution as isize);
                if (first as isize) > last {
                    continue;
                }

                // Cast against the unclipped edge so boundary columns
                // don't slip past the clip points.
                let segment = edge.segment();
                let luminosity = edge.luminosity();
                for column in first..=last as usize {
                    if full_at_start[column] {
                        continue;
                    }
                    let ray = camera.column_ray(column, resolution);
                    if let Some((t, _)) = ray.intersect_segment(&segment) {
                        buffer.push(
                            column,
                            Span {
                                distance: ray.distance(t),
                                material: material.clone(),
                                edge: edge.id(),
                                face,
                                luminosity,
                            },
                        );
                    }
                }
            }
        }
        if buffer.all_full() {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    });
    tree.walk_front_to_back(camera.position(), &mut visitor);
    drop(visitor);

    debug!(
        "cast scene: probed {}/{} polygons, {}/{} edges",
        stats.polygons_tested, stats.polygons_total, stats.edges_tested, stats.edges_total
    );
    (buffer, stats)
}
