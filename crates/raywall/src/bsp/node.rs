//! BSP tree node implementation.

use crate::plane::Plane;
use crate::polygon::Polygon;

/// A node in the BSP tree.
///
/// The recursive structure is a plain tagged variant: each `Split` owns
/// its two subtrees outright, with no sharing and no cycles. Polygons
/// coplanar with a split plane live on the node itself, so traversal can
/// visit them between the near and far subtrees.
#[derive(Debug, Clone, Default)]
pub enum BspNode {
    /// Empty subtree.
    #[default]
    Null,
    /// Terminal node holding polygons that were not partitioned further.
    /// Leaf polygons never straddle any ancestor's split plane.
    Leaf(Vec<Polygon>),
    /// Interior node partitioning space by `plane`.
    Split {
        plane: Plane,
        /// Polygons lying exactly on the split plane.
        coplanar: Vec<Polygon>,
        /// Subtree on the positive side of the plane.
        front: Box<BspNode>,
        /// Subtree on the negative side of the plane.
        back: Box<BspNode>,
    },
}

impl BspNode {
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, BspNode::Null)
    }

    /// Total number of polygons in this subtree.
    pub fn polygon_count(&self) -> usize {
        match self {
            BspNode::Null => 0,
            BspNode::Leaf(polygons) => polygons.len(),
            BspNode::Split {
                coplanar,
                front,
                back,
                ..
            } => coplanar.len() + front.polygon_count() + back.polygon_count(),
        }
    }

    /// Total number of edges in this subtree.
    pub fn edge_count(&self) -> usize {
        match self {
            BspNode::Null => 0,
            BspNode::Leaf(polygons) => polygons.iter().map(Polygon::edge_count).sum(),
            BspNode::Split {
                coplanar,
                front,
                back,
                ..
            } => {
                coplanar.iter().map(Polygon::edge_count).sum::<usize>()
                    + front.edge_count()
                    + back.edge_count()
            }
        }
    }

    /// Depth of this subtree: 0 for `Null`, 1 for a leaf.
    pub fn depth(&self) -> usize {
        match self {
            BspNode::Null => 0,
            BspNode::Leaf(_) => 1,
            BspNode::Split { front, back, .. } => 1 + front.depth().max(back.depth()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polygon::PolygonId;
    use nalgebra::{Point2, Vector2};

    fn square(id: u64, x: f32) -> Polygon {
        Polygon::from_points(
            PolygonId(id),
            &[
                Point2::new(x, 0.0),
                Point2::new(x + 1.0, 0.0),
                Point2::new(x + 1.0, 1.0),
                Point2::new(x, 1.0),
            ],
        )
    }

    #[test]
    fn null_is_empty() {
        let node = BspNode::Null;
        assert!(node.is_null());
        assert_eq!(node.polygon_count(), 0);
        assert_eq!(node.edge_count(), 0);
        assert_eq!(node.depth(), 0);
    }

    #[test]
    fn counts_recurse() {
        let node = BspNode::Split {
            plane: Plane::new(Vector2::new(1.0, 0.0), 5.0),
            coplanar: vec![square(0, 0.0)],
            front: Box::new(BspNode::Leaf(vec![square(1, 10.0), square(2, 20.0)])),
            back: Box::new(BspNode::Null),
        };
        assert_eq!(node.polygon_count(), 3);
        assert_eq!(node.edge_count(), 12);
        assert_eq!(node.depth(), 2);
    }
}
