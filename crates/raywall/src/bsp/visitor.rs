//! Visitor pattern for front-to-back BSP traversal.
//!
//! Visitors allow custom processing of polygon batches during tree
//! traversal without coupling traversal logic to specific use cases. The
//! z-buffer compositor is the main consumer: it keeps visiting until
//! every screen column is full, then breaks the walk early.

use std::ops::ControlFlow;

use crate::polygon::Polygon;

/// Visitor for processing polygons during BSP tree traversal.
///
/// `visit` receives one batch per node: a leaf's polygons or a split
/// node's coplanar set. Returning [`ControlFlow::Break`] stops the walk;
/// nodes farther from the eye are never visited.
pub trait BspVisitor {
    fn visit(&mut self, polygons: &[Polygon]) -> ControlFlow<()>;
}

/// A simple visitor that collects all visited polygons.
#[derive(Debug, Default)]
pub struct CollectingVisitor {
    collected: Vec<Polygon>,
}

impl CollectingVisitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_polygons(self) -> Vec<Polygon> {
        self.collected
    }

    pub fn polygons(&self) -> &[Polygon] {
        &self.collected
    }
}

impl BspVisitor for CollectingVisitor {
    fn visit(&mut self, polygons: &[Polygon]) -> ControlFlow<()> {
        self.collected.extend(polygons.iter().cloned());
        ControlFlow::Continue(())
    }
}

/// A visitor that calls a closure for each polygon batch.
pub struct FnVisitor<F>
where
    F: FnMut(&[Polygon]) -> ControlFlow<()>,
{
    func: F,
}

impl<F> FnVisitor<F>
where
    F: FnMut(&[Polygon]) -> ControlFlow<()>,
{
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> BspVisitor for FnVisitor<F>
where
    F: FnMut(&[Polygon]) -> ControlFlow<()>,
{
    fn visit(&mut self, polygons: &[Polygon]) -> ControlFlow<()> {
        (self.func)(polygons)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polygon::PolygonId;
    use nalgebra::Point2;

    fn triangle(id: u64) -> Polygon {
        Polygon::from_points(
            PolygonId(id),
            &[
                Point2::new(0.0, 0.0),
                Point2::new(1.0, 0.0),
                Point2::new(0.0, 1.0),
            ],
        )
    }

    #[test]
    fn collecting_visitor_collects() {
        let mut visitor = CollectingVisitor::new();
        assert!(visitor.polygons().is_empty());

        visitor.visit(&[triangle(0)]);
        visitor.visit(&[triangle(1), triangle(2)]);

        let collected = visitor.into_polygons();
        assert_eq!(collected.len(), 3);
        assert_eq!(collected[0].id(), PolygonId(0));
    }

    #[test]
    fn fn_visitor_can_break() {
        let mut count = 0;
        let mut visitor = FnVisitor::new(|polys: &[Polygon]| {
            count += polys.len();
            if count >= 2 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });

        assert_eq!(visitor.visit(&[triangle(0)]), ControlFlow::Continue(()));
        assert_eq!(visitor.visit(&[triangle(1)]), ControlFlow::Break(()));
        drop(visitor);
        assert_eq!(count, 2);
    }
}
