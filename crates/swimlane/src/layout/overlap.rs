//! Pairwise collision detection and displacement among siblings.
//!
//! Every pair of siblings is checked; on intersection the later node (higher
//! rank, then later declaration) is moved along the axis of least overlap,
//! away from the other node, by exactly the distance that clears it. Passes
//! repeat until one finds no collision or the pass budget is spent. Nodes
//! still colliding afterwards are reported as unresolved.
//!
//! Lane members and boundary events use [`Displacement::Forward`]: a node
//! slides along its lane or its host's edge but never out of it.

use indexmap::IndexSet;
use log::trace;

use swimlane_core::geometry::{Bounds, Point};

/// One node taking part in overlap resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sibling<K> {
    pub key: K,
    pub rank: usize,
    /// Declaration order, used to break rank ties.
    pub order: usize,
    pub bounds: Bounds,
}

impl<K> Sibling<K> {
    fn precedence(&self) -> (usize, usize) {
        (self.rank, self.order)
    }
}

/// Outcome of [`OverlapAvoidance::resolve_overlaps`].
#[derive(Debug, Clone, PartialEq)]
pub struct OverlapReport<K> {
    pub passes: usize,
    /// Keys of nodes moved at least once.
    pub displaced: Vec<K>,
    /// Keys of nodes still intersecting a sibling.
    pub unresolved: Vec<K>,
}

/// How a colliding node is moved clear of its sibling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Displacement {
    /// Along whichever axis needs the shorter move.
    #[default]
    LeastOverlap,
    /// Always to the right of the sibling, keeping the vertical position.
    Forward,
}

#[derive(Debug, Clone, Copy)]
pub struct OverlapAvoidance {
    max_passes: usize,
    displacement: Displacement,
}

impl OverlapAvoidance {
    pub fn new(max_passes: usize) -> Self {
        Self {
            max_passes,
            displacement: Displacement::default(),
        }
    }

    pub fn with_displacement(mut self, displacement: Displacement) -> Self {
        self.displacement = displacement;
        self
    }

    /// Separates intersecting `siblings` in place.
    ///
    /// ```
    /// # use swimlane::layout::{OverlapAvoidance, Sibling};
    /// # use swimlane_core::geometry::{Bounds, Point, Size};
    /// let task = |x: f32, rank| Sibling {
    ///     key: rank,
    ///     rank,
    ///     order: rank,
    ///     bounds: Bounds::new_from_top_left(Point::new(x, 0.0), Size::new(100.0, 80.0)),
    /// };
    /// let mut siblings = [task(0.0, 0), task(60.0, 1)];
    ///
    /// let report = OverlapAvoidance::new(3).resolve_overlaps(&mut siblings);
    ///
    /// assert_eq!(report.displaced, vec![1]);
    /// assert_eq!(siblings[1].bounds.min_x(), 100.0);
    /// ```
    pub fn resolve_overlaps<K>(&self, siblings: &mut [Sibling<K>]) -> OverlapReport<K>
    where
        K: Copy + Eq + std::hash::Hash,
    {
        let mut displaced = IndexSet::new();
        let mut passes = 0;

        while passes < self.max_passes {
            passes += 1;
            let mut moved = false;

            for first in 0..siblings.len() {
                for second in (first + 1)..siblings.len() {
                    if !siblings[first].bounds.intersects(&siblings[second].bounds) {
                        continue;
                    }
                    let (mover, anchor) =
                        if siblings[second].precedence() >= siblings[first].precedence() {
                            (second, first)
                        } else {
                            (first, second)
                        };
                    let anchor_bounds = siblings[anchor].bounds;
                    siblings[mover].bounds = match self.displacement {
                        Displacement::LeastOverlap => {
                            clear_of(siblings[mover].bounds, anchor_bounds)
                        }
                        Displacement::Forward => {
                            let bounds = siblings[mover].bounds;
                            bounds.with_min_point(Point::new(anchor_bounds.max_x(), bounds.min_y()))
                        }
                    };
                    displaced.insert(siblings[mover].key);
                    moved = true;
                }
            }

            if !moved {
                break;
            }
        }

        let mut unresolved = IndexSet::new();
        for first in 0..siblings.len() {
            for second in (first + 1)..siblings.len() {
                if siblings[first].bounds.intersects(&siblings[second].bounds) {
                    unresolved.insert(siblings[first].key);
                    unresolved.insert(siblings[second].key);
                }
            }
        }

        trace!(
            siblings = siblings.len(),
            passes = passes,
            displaced = displaced.len(),
            unresolved = unresolved.len();
            "Overlap resolution finished"
        );

        OverlapReport {
            passes,
            displaced: displaced.into_iter().collect(),
            unresolved: unresolved.into_iter().collect(),
        }
    }
}

/// Moves `mover` the minimum distance along the axis of least overlap so it
/// no longer intersects `anchor`.
fn clear_of(mover: Bounds, anchor: Bounds) -> Bounds {
    let overlap_x = mover.overlap_x(&anchor);
    let overlap_y = mover.overlap_y(&anchor);

    let top_left = if overlap_x <= overlap_y {
        let x = if mover.center().x() >= anchor.center().x() {
            anchor.max_x()
        } else {
            anchor.min_x() - mover.width()
        };
        Point::new(x, mover.min_y())
    } else {
        let y = if mover.center().y() >= anchor.center().y() {
            anchor.max_y()
        } else {
            anchor.min_y() - mover.height()
        };
        Point::new(mover.min_x(), y)
    };

    mover.with_min_point(top_left)
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;
    use swimlane_core::geometry::Size;

    use super::*;

    fn sibling(key: usize, rank: usize, x: f32, y: f32, w: f32, h: f32) -> Sibling<usize> {
        Sibling {
            key,
            rank,
            order: key,
            bounds: Bounds::new_from_top_left(Point::new(x, y), Size::new(w, h)),
        }
    }

    #[test]
    fn test_later_rank_moves_along_least_overlap() {
        // Overlap is 20 wide and 70 tall: move horizontally.
        let mut siblings = [
            sibling(0, 1, 0.0, 0.0, 100.0, 80.0),
            sibling(1, 0, 80.0, 10.0, 100.0, 80.0),
        ];

        let report = OverlapAvoidance::new(3).resolve_overlaps(&mut siblings);

        // Key 0 has the higher rank, so it is the one displaced, to the left.
        assert_eq!(report.displaced, vec![0]);
        assert_approx_eq!(f32, siblings[0].bounds.max_x(), 80.0, epsilon = 0.001);
        assert_eq!(siblings[1].bounds.min_x(), 80.0);
        assert!(report.unresolved.is_empty());
    }

    #[test]
    fn test_vertical_displacement() {
        let mut siblings = [
            sibling(0, 0, 0.0, 0.0, 100.0, 80.0),
            sibling(1, 0, 10.0, 70.0, 100.0, 80.0),
        ];

        OverlapAvoidance::new(3).resolve_overlaps(&mut siblings);

        assert_eq!(siblings[1].bounds.min_y(), 80.0);
        assert_eq!(siblings[1].bounds.min_x(), 10.0);
    }

    #[test]
    fn test_chain_reaction_resolved_over_passes() {
        let mut siblings = [
            sibling(0, 0, 0.0, 0.0, 100.0, 80.0),
            sibling(1, 1, 50.0, 0.0, 100.0, 80.0),
            sibling(2, 2, 120.0, 0.0, 100.0, 80.0),
        ];

        let report = OverlapAvoidance::new(3).resolve_overlaps(&mut siblings);

        assert!(report.unresolved.is_empty());
        assert!(report.passes >= 2);
        assert!(!siblings[0].bounds.intersects(&siblings[1].bounds));
        assert!(!siblings[1].bounds.intersects(&siblings[2].bounds));
    }

    #[test]
    fn test_forward_displacement_keeps_row() {
        // Least overlap would move vertically here.
        let mut siblings = [
            sibling(0, 0, 0.0, 0.0, 100.0, 80.0),
            sibling(1, 1, 10.0, 70.0, 100.0, 80.0),
            sibling(2, 1, 20.0, 0.0, 100.0, 80.0),
        ];

        let report = OverlapAvoidance::new(5)
            .with_displacement(Displacement::Forward)
            .resolve_overlaps(&mut siblings);

        assert!(report.unresolved.is_empty());
        assert_eq!(siblings[1].bounds.min_y(), 70.0);
        assert_eq!(siblings[2].bounds.min_y(), 0.0);
        assert!(siblings[1].bounds.min_x() >= 100.0);
        assert!(siblings[2].bounds.min_x() >= 100.0);
        assert!(!siblings[1].bounds.intersects(&siblings[2].bounds));
    }

    #[test]
    fn test_zero_passes_reports_unresolved() {
        let mut siblings = [
            sibling(0, 0, 0.0, 0.0, 100.0, 80.0),
            sibling(1, 1, 50.0, 0.0, 100.0, 80.0),
        ];

        let report = OverlapAvoidance::new(0).resolve_overlaps(&mut siblings);

        assert_eq!(report.passes, 0);
        assert_eq!(report.unresolved, vec![0, 1]);
    }

    #[test]
    fn test_touching_siblings_are_left_alone() {
        let mut siblings = [
            sibling(0, 0, 0.0, 0.0, 100.0, 80.0),
            sibling(1, 1, 100.0, 0.0, 100.0, 80.0),
        ];

        let report = OverlapAvoidance::new(3).resolve_overlaps(&mut siblings);

        assert_eq!(report.passes, 1);
        assert!(report.displaced.is_empty());
    }
}
