//! Raycasting over a BSP-partitioned 2D wall map.
//!
//! A map is a set of closed polygon wall loops with per-face materials.
//! The crate partitions the map into a BSP tree, then answers the two
//! questions a software renderer in the Doom mould keeps asking: what
//! does a ray hit first (collision), and what does each screen column see
//! (rendering, via the z-buffer compositor).
//!
//! # Example
//!
//! ```ignore
//! use raywall::{cast_scene, BspTree, Camera, Material, Polygon, PolygonId, RandomEdge};
//! use nalgebra::{Point2, Vector2};
//!
//! let room = Polygon::from_points(
//!     PolygonId(0),
//!     &[
//!         Point2::new(0.0, 0.0),
//!         Point2::new(100.0, 0.0),
//!         Point2::new(100.0, 100.0),
//!         Point2::new(0.0, 100.0),
//!     ],
//! )
//! .with_front_material(Material::solid("plaster"));
//!
//! let tree = BspTree::build(vec![room], &mut RandomEdge::seeded(42))?;
//! let camera = Camera::new(
//!     Point2::new(50.0, 50.0),
//!     Vector2::new(0.0, 10.0),
//!     Vector2::new(15.0, 0.0),
//! );
//! let (buffer, stats) = cast_scene(&tree, &camera, 320);
//! ```

mod bounds;
pub mod bsp;
mod camera;
mod edge;
mod error;
mod geometry;
mod plane;
mod polygon;
mod ray;
mod split;
mod store;
mod vertex;
mod zbuffer;

pub use bounds::Aabb;
pub use bsp::{
    AlternatingAxis, BoundsSide, BspNode, BspTree, BspVisitor, CentroidPair, CollectingVisitor,
    FnVisitor, RandomEdge, RandomPair, SplitStrategy,
};
pub use camera::{Camera, Frustum};
pub use edge::{Edge, EdgeId, Face, Material, Segment};
pub use error::GeometryError;
pub use geometry::Geometry;
pub use plane::{Classification, Plane, PlaneSide, PLANE_EPSILON};
pub use polygon::{Polygon, PolygonId};
pub use ray::{CastStats, Hit, Ray};
pub use split::split_polygon;
pub use store::{StoredEdge, StoredGeometry, StoredPolygon, StoredVertex};
pub use vertex::{Vertex, VertexId};
pub use zbuffer::{cast_scene, Column, Span, ZBuffer};
