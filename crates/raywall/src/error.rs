//! Error types for the geometry core.

use thiserror::Error;

use crate::polygon::PolygonId;

/// Fatal geometry contract violations.
///
/// Recoverable conditions (a ray parallel to a plane, an edge outside the
/// frustum, a polygon entirely on one side of a candidate plane) are empty
/// results, not errors. These variants signal corrupted input that the
/// BSP and visibility layers cannot safely work around.
#[derive(Debug, Error)]
pub enum GeometryError {
    /// A split intersection point failed to re-classify as On its own
    /// splitting plane. Indicates degenerate geometry or an
    /// ill-conditioned plane; continuing would corrupt the tree.
    #[error(
        "split intersection ({x}, {y}) does not lie on its splitting plane \
         (signed distance {distance})"
    )]
    DegenerateSplit { x: f32, y: f32, distance: f32 },

    /// A stored polygon's edge chain does not close by vertex identity.
    /// All BSP and visibility logic assumes closed loops, so this must
    /// fail at load time.
    #[error("polygon {polygon} edge chain does not close")]
    OpenLoop { polygon: PolygonId },

    /// A stored polygon has too few edges to form a loop.
    #[error("polygon {polygon} has {edges} edges, need at least 3")]
    TooFewEdges { polygon: PolygonId, edges: usize },
}
