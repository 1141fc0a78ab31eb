//! Deterministic grid for nodes the regular pipeline could not place.
//!
//! The grid starts below everything already placed at the root, so fallback
//! nodes never collide with positioned content. Cells are as large as the
//! largest fallback node and filled row by row in the order given.

use swimlane_core::geometry::{Bounds, Point, Size};

#[derive(Debug, Clone, Copy)]
pub struct FallbackGrid {
    spacing: f32,
}

impl FallbackGrid {
    pub fn new(spacing: f32) -> Self {
        Self { spacing }
    }

    /// Places `sizes` on a roughly square grid below `occupied`.
    pub fn place(&self, occupied: Option<Bounds>, sizes: &[Size]) -> Vec<Bounds> {
        if sizes.is_empty() {
            return Vec::new();
        }

        let origin = occupied.map_or(Point::default(), |bounds| {
            Point::new(bounds.min_x().min(0.0), bounds.max_y() + self.spacing)
        });
        let cell = sizes
            .iter()
            .fold(Size::default(), |cell, &size| cell.max(size));
        let columns = (sizes.len() as f32).sqrt().ceil().max(1.0) as usize;

        sizes
            .iter()
            .enumerate()
            .map(|(pos, &size)| {
                let column = (pos % columns) as f32;
                let row = (pos / columns) as f32;
                let top_left = Point::new(
                    origin.x() + column * (cell.width() + self.spacing),
                    origin.y() + row * (cell.height() + self.spacing),
                );
                Bounds::new_from_top_left(top_left, size)
            })
            .collect()
    }
}
