//! Polygon splitting along a plane.

use crate::edge::{Edge, EdgeId};
use crate::error::GeometryError;
use crate::plane::{Plane, PlaneSide};
use crate::polygon::Polygon;
use crate::vertex::{Vertex, VertexId};

/// How an output point was produced.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Source {
    /// An original vertex of the polygon.
    Corner,
    /// A computed segment/plane intersection.
    Cut,
}

/// A point emitted into a fragment's loop, tagged with the original edge
/// it lies on so the assembled fragment edges can inherit identity and
/// materials from the walls they came from.
#[derive(Debug, Clone, Copy)]
struct Emitted {
    vertex: Vertex,
    /// Index of the original edge whose run this point starts.
    edge_index: usize,
    source: Source,
}

/// Splits a polygon into a front and a back fragment along `plane`.
///
/// Walks the vertex loop in order, tracking the previous vertex's side.
/// On a Front/Back sign change the exact segment/plane intersection is
/// appended to **both** output loops before the current vertex joins its
/// own side. A vertex On the plane always joins the front loop, and also
/// the back loop when the previous vertex was Behind, which keeps the
/// back fragment closed when the boundary only touches the plane.
///
/// Fragment edges that lie on an original edge keep that edge's id and
/// materials; the synthesized closing edges along the cut carry none.
/// Both fragments keep the parent polygon's id.
///
/// Callers must classify first: invoking this on a non-spanning polygon
/// yields a degenerate fragment. An intersection point that fails to
/// re-classify as On its own plane indicates corrupted or degenerate
/// input and aborts with [`GeometryError::DegenerateSplit`].
pub fn split_polygon(
    polygon: &Polygon,
    plane: &Plane,
) -> Result<(Polygon, Polygon), GeometryError> {
    let vertices: Vec<Vertex> = polygon.vertices().copied().collect();
    let n = vertices.len();
    let sides: Vec<PlaneSide> = vertices
        .iter()
        .map(|v| plane.classify_point(v.point))
        .collect();

    let mut front: Vec<Emitted> = Vec::with_capacity(n + 1);
    let mut back: Vec<Emitted> = Vec::with_capacity(n + 1);
    let mut next_vertex = polygon.next_vertex_id();

    for i in 0..n {
        let prev = (i + n - 1) % n;

        let crosses = matches!(
            (sides[prev], sides[i]),
            (PlaneSide::Front, PlaneSide::Back) | (PlaneSide::Back, PlaneSide::Front)
        );
        if crosses {
            let cut_point = plane
                .intersect_segment(vertices[prev].point, vertices[i].point)
                .map(|(_, point)| point)
                .ok_or(GeometryError::DegenerateSplit {
                    x: vertices[i].point.x,
                    y: vertices[i].point.y,
                    distance: plane.signed_distance(vertices[i].point),
                })?;
            if plane.classify_point(cut_point) != PlaneSide::On {
                return Err(GeometryError::DegenerateSplit {
                    x: cut_point.x,
                    y: cut_point.y,
                    distance: plane.signed_distance(cut_point),
                });
            }
            let cut = Emitted {
                vertex: Vertex::new(VertexId(next_vertex), cut_point),
                edge_index: prev,
                source: Source::Cut,
            };
            next_vertex += 1;
            front.push(cut);
            back.push(cut);
        }

        let corner = Emitted {
            vertex: vertices[i],
            edge_index: i,
            source: Source::Corner,
        };
        match sides[i] {
            PlaneSide::Front => front.push(corner),
            PlaneSide::Back => back.push(corner),
            PlaneSide::On => {
                front.push(corner);
                if sides[prev] == PlaneSide::Back {
                    back.push(corner);
                }
            }
        }
    }

    let mut next_edge = polygon.next_edge_id();
    let front_poly = assemble(polygon, &front, &mut next_edge);
    let back_poly = assemble(polygon, &back, &mut next_edge);
    Ok((front_poly, back_poly))
}

/// Stitches an emitted point loop back into a polygon.
///
/// The run from one point to the next lies on the first point's source
/// edge exactly when the next point is a later cut on that same edge or
/// that edge's end vertex; such runs inherit the source edge. Everything
/// else is a fresh closing edge along the cut, with no material.
fn assemble(polygon: &Polygon, points: &[Emitted], next_edge: &mut u64) -> Polygon {
    let originals = polygon.edges();
    let n = points.len();
    let mut edges = Vec::with_capacity(n);

    for j in 0..n {
        let p = points[j];
        let q = points[(j + 1) % n];
        let source = &originals[p.edge_index];
        let on_source = match q.source {
            Source::Cut => q.edge_index == p.edge_index,
            Source::Corner => q.vertex.id == source.end().id,
        };
        if on_source {
            edges.push(source.with_endpoints(p.vertex, q.vertex));
        } else {
            edges.push(Edge::new(EdgeId(*next_edge), p.vertex, q.vertex));
            *next_edge += 1;
        }
    }

    Polygon::new(polygon.id(), edges)
}
