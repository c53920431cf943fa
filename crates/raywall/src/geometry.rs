//! The wall map: polygon set plus its (re)buildable BSP tree.

use log::debug;

use crate::bounds::Aabb;
use crate::bsp::{BspTree, SplitStrategy};
use crate::error::GeometryError;
use crate::polygon::Polygon;

/// A wall map and the spatial index derived from it.
///
/// The polygon set is the source of truth; the tree is a cache built on
/// demand. Editing the set invalidates the tree, and [`Geometry::rebuild`]
/// replaces it wholesale. There is no incremental maintenance: fragments
/// in the old tree don't correspond to edited polygons.
#[derive(Debug, Clone, Default)]
pub struct Geometry {
    polygons: Vec<Polygon>,
    bounds: Aabb,
    tree: Option<BspTree>,
}

impl Geometry {
    pub fn from_polygons(polygons: Vec<Polygon>) -> Self {
        let bounds = polygons
            .iter()
            .fold(Aabb::empty(), |acc, p| acc.union(p.bounds()));
        Self {
            polygons,
            bounds,
            tree: None,
        }
    }

    #[inline]
    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    #[inline]
    pub fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    pub fn polygon_count(&self) -> usize {
        self.polygons.len()
    }

    pub fn edge_count(&self) -> usize {
        self.polygons.iter().map(Polygon::edge_count).sum()
    }

    /// Adds a polygon, invalidating any built tree.
    pub fn add_polygon(&mut self, polygon: Polygon) {
        self.bounds = self.bounds.union(polygon.bounds());
        self.polygons.push(polygon);
        self.tree = None;
    }

    #[inline]
    pub fn is_built(&self) -> bool {
        self.tree.is_some()
    }

    /// The current tree, if one has been built since the last edit.
    #[inline]
    pub fn tree(&self) -> Option<&BspTree> {
        self.tree.as_ref()
    }

    /// Drops the built tree without touching the polygons.
    pub fn invalidate(&mut self) {
        self.tree = None;
    }

    /// Rebuilds the tree from scratch with the given strategy.
    pub fn rebuild<S: SplitStrategy>(
        &mut self,
        strategy: &mut S,
    ) -> Result<&BspTree, GeometryError> {
        debug!("rebuilding tree for {} polygons", self.polygons.len());
        let tree = BspTree::build(self.polygons.clone(), strategy)?;
        Ok(&*self.tree.insert(tree))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bsp::AlternatingAxis;
    use crate::polygon::PolygonId;
    use nalgebra::Point2;

    fn square(id: u64, x: f32, y: f32) -> Polygon {
        Polygon::from_points(
            PolygonId(id),
            &[
                Point2::new(x, y),
                Point2::new(x + 10.0, y),
                Point2::new(x + 10.0, y + 10.0),
                Point2::new(x, y + 10.0),
            ],
        )
    }

    #[test]
    fn default_geometry_is_empty() {
        let geometry = Geometry::default();
        assert_eq!(geometry.polygon_count(), 0);
        assert!(geometry.bounds().is_empty());
        assert!(!geometry.is_built());
    }

    #[test]
    fn bounds_cover_all_polygons() {
        let geometry = Geometry::from_polygons(vec![square(0, 0.0, 0.0), square(1, 50.0, 20.0)]);
        assert_eq!(geometry.bounds().min, Point2::new(0.0, 0.0));
        assert_eq!(geometry.bounds().max, Point2::new(60.0, 30.0));
        assert_eq!(geometry.edge_count(), 8);
    }

    #[test]
    fn editing_invalidates_the_tree() {
        let mut geometry = Geometry::from_polygons(vec![square(0, 0.0, 0.0)]);
        assert!(!geometry.is_built());

        geometry.rebuild(&mut AlternatingAxis).unwrap();
        assert!(geometry.is_built());
        assert_eq!(geometry.tree().unwrap().polygon_count(), 1);

        geometry.add_polygon(square(1, 50.0, 20.0));
        assert!(!geometry.is_built());
        assert!(geometry.tree().is_none());

        geometry.rebuild(&mut AlternatingAxis).unwrap();
        assert_eq!(geometry.tree().unwrap().polygon_count(), 2);
    }
}
