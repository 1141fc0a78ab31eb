//! Orthogonal edge routing.
//!
//! Routes run from the source's boundary to the target's boundary using only
//! horizontal and vertical segments:
//!
//! - forward flows leave the right side and enter the left side, bending
//!   twice at the midpoint between the two columns;
//! - backward flows leave and enter through the bottom and detour below
//!   both shapes;
//! - shapes sharing a column, and message flows, connect top to bottom;
//! - flows leaving a boundary event start at its bottom center and turn
//!   once towards the target.

use swimlane_core::{
    geometry::{Bounds, Point},
    model::EdgeKind,
};

/// Endpoints and flavor of one edge to route.
#[derive(Debug, Clone, Copy)]
pub struct RouteRequest {
    pub source: Bounds,
    pub target: Bounds,
    pub kind: EdgeKind,
    pub from_boundary: bool,
    pub self_loop: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct WaypointRouter {
    clearance: f32,
}

impl WaypointRouter {
    /// `clearance` is the distance detours keep from the shapes they avoid.
    pub fn new(clearance: f32) -> Self {
        Self { clearance }
    }

    pub fn route(&self, request: &RouteRequest) -> Vec<Point> {
        let RouteRequest { source, target, .. } = *request;

        if request.self_loop {
            return self.self_loop(source);
        }
        if request.from_boundary {
            return self.from_boundary(source, target);
        }
        if request.kind == EdgeKind::MessageFlow {
            return vertical(source, target);
        }

        if source.max_x() <= target.min_x() {
            forward(source, target)
        } else if target.max_x() <= source.min_x() {
            self.backward(source, target)
        } else {
            vertical(source, target)
        }
    }

    fn from_boundary(&self, source: Bounds, target: Bounds) -> Vec<Point> {
        let start = source.bottom_center();
        let end = if target.min_x() >= start.x() {
            target.left_center()
        } else if target.max_x() <= start.x() {
            target.right_center()
        } else if target.min_y() >= start.y() {
            return vec![start, Point::new(start.x(), target.min_y())];
        } else {
            let below = start.y() + self.clearance;
            return vec![
                start,
                Point::new(start.x(), below),
                Point::new(target.max_x() + self.clearance, below),
                Point::new(target.max_x() + self.clearance, target.center().y()),
                target.right_center(),
            ];
        };

        if end.y() == start.y() {
            vec![start, end]
        } else {
            vec![start, Point::new(start.x(), end.y()), end]
        }
    }

    fn backward(&self, source: Bounds, target: Bounds) -> Vec<Point> {
        let start = source.bottom_center();
        let end = target.bottom_center();
        let below = source.max_y().max(target.max_y()) + self.clearance;
        vec![
            start,
            Point::new(start.x(), below),
            Point::new(end.x(), below),
            end,
        ]
    }

    fn self_loop(&self, bounds: Bounds) -> Vec<Point> {
        let right = bounds.max_x() + self.clearance;
        let below = bounds.max_y() + self.clearance;
        vec![
            bounds.right_center(),
            Point::new(right, bounds.center().y()),
            Point::new(right, below),
            Point::new(bounds.center().x(), below),
            bounds.bottom_center(),
        ]
    }
}

fn forward(source: Bounds, target: Bounds) -> Vec<Point> {
    let start = source.right_center();
    let end = target.left_center();
    if start.y() == end.y() {
        return vec![start, end];
    }
    let mid_x = (start.x() + end.x()) / 2.0;
    vec![
        start,
        Point::new(mid_x, start.y()),
        Point::new(mid_x, end.y()),
        end,
    ]
}

fn vertical(source: Bounds, target: Bounds) -> Vec<Point> {
    let (start, end) = if source.center().y() <= target.center().y() {
        (source.bottom_center(), target.top_center())
    } else {
        (source.top_center(), target.bottom_center())
    };
    if start.x() == end.x() {
        return vec![start, end];
    }
    let mid_y = (start.y() + end.y()) / 2.0;
    vec![
        start,
        Point::new(start.x(), mid_y),
        Point::new(end.x(), mid_y),
        end,
    ]
}
