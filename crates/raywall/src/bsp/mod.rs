//! Binary Space Partitioning over the wall map.
//!
//! The tree recursively partitions the map plane with split lines chosen
//! by a pluggable [`SplitStrategy`], cutting straddling polygons into
//! fragments as it goes. Once built, the tree answers the queries the
//! renderer and collision code need:
//!
//! - Pruned raycasts with early stopping ([`BspTree::raycast`])
//! - Front-to-back traversal from a viewpoint ([`BspTree::walk_front_to_back`])
//! - Region lookup for a point ([`BspTree::leaf_for`])
//!
//! # Example
//!
//! ```ignore
//! use raywall::{BspTree, Polygon, RandomEdge};
//! use nalgebra::{Point2, Vector2};
//!
//! let polygons: Vec<Polygon> = /* the wall map */;
//! let tree = BspTree::build(polygons, &mut RandomEdge::seeded(42))?;
//!
//! let ray = raywall::Ray::new(Point2::new(0.0, 0.0), Vector2::new(1.0, 0.0));
//! if let Some(hit) = tree.first_hit(&ray) {
//!     println!("nearest wall at distance {}", hit.distance);
//! }
//! ```

mod node;
mod selector;
mod tree;
mod visitor;

pub use node::BspNode;
pub use selector::{
    select_plane, AlternatingAxis, BoundsSide, CentroidPair, RandomEdge, RandomPair,
    SplitStrategy, SPLIT_WEIGHT,
};
pub use tree::{BspTree, AABB_TEST_MIN_EDGES, MAX_DEPTH, MIN_LEAF_POLYGONS};
pub use visitor::{BspVisitor, CollectingVisitor, FnVisitor};
