//! Lane bands and rank columns.
//!
//! The organizer turns `(column, lane)` assignments into geometry:
//!
//! ```text
//!  pool ┌────┬──────────┬──────────┬──────────┐  y_offset
//!       │ hdr│  col 0   │  col 1   │  col 2   │
//!       │    ├──────────┼──────────┼──────────┤  0      lane 0
//!       │    │  [A]     │          │  [C]     │
//!       │    ├──────────┼──────────┼──────────┤  h0     lane 1
//!       │    │          │  [B]     │          │
//!       └────┴──────────┴──────────┴──────────┘  h0+h1
//! ```
//!
//! Column widths are shared by every pool of the frame, lane heights are
//! computed per lane and `y_offset` restarts at 0 in every pool. Pools are
//! stacked vertically and all get the width of the widest content.
//!
//! Once nodes have been pinned or displaced, [`LaneOrganizer::refit`] grows
//! the bands around their members again and restacks lanes and pools.

use std::hash::Hash;

use indexmap::IndexMap;
use log::trace;

use swimlane_core::geometry::{Bounds, Point, Size};

use crate::config::LayoutConfig;

/// Computed band of one lane, relative to the frame origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaneBand {
    /// Offset of the lane's top edge from its pool's top edge.
    pub y_offset: f32,
    pub height: f32,
    pub bounds: Bounds,
}

/// Computed container of one pool, relative to the frame origin.
#[derive(Debug, Clone, PartialEq)]
pub struct PoolBand {
    pub bounds: Bounds,
    pub lanes: Vec<LaneBand>,
}

/// Result of organizing one frame.
#[derive(Debug, Clone)]
pub struct BandLayout<N: Hash + Eq> {
    pub nodes: IndexMap<N, Bounds>,
    pub pools: Vec<PoolBand>,
    /// Extent of all pools, measured from the frame origin.
    pub extent: Size,
}

/// A lane member as it stands after layout.
#[derive(Debug, Clone, Copy)]
pub struct Member<N> {
    pub key: N,
    pub bounds: Bounds,
    /// Pinned members keep their coordinates when the lane is restacked.
    pub pinned: bool,
}

/// Outcome of [`LaneOrganizer::refit`].
#[derive(Debug, Clone)]
pub struct Refit<N: Hash + Eq> {
    /// Vertical shift of every unpinned member that moved with its lane.
    pub shifts: IndexMap<N, f32>,
    /// Number of lanes that had to grow.
    pub grown: usize,
}

/// Where each node goes and how big it is.
pub struct Slotting<'a, N: Hash + Eq> {
    pub columns: &'a IndexMap<N, usize>,
    pub sizes: &'a IndexMap<N, Size>,
    /// Left edges proposed by an external layout, relative to the first
    /// column.
    pub x_hints: Option<&'a IndexMap<N, f32>>,
}

#[derive(Debug, Clone)]
pub struct LaneOrganizer {
    min_height: f32,
    padding: f32,
    node_spacing: f32,
    column_margin: f32,
    header_width: f32,
    pool_spacing: f32,
}

impl LaneOrganizer {
    /// Organizer for the root frame: pools with headers and lanes.
    pub fn new(config: &LayoutConfig) -> Self {
        Self {
            min_height: config.lane_min_height(),
            padding: config.lane_padding(),
            node_spacing: config.node_spacing(),
            column_margin: config.column_margin(),
            header_width: config.pool_header_width(),
            pool_spacing: config.pool_spacing(),
        }
    }

    /// Organizer for a subprocess interior: a single headerless band whose
    /// left inset and vertical padding are the subprocess padding.
    pub fn interior(config: &LayoutConfig) -> Self {
        Self {
            min_height: 0.0,
            padding: config.subprocess_padding(),
            node_spacing: config.node_spacing(),
            column_margin: config.column_margin(),
            header_width: config.subprocess_padding(),
            pool_spacing: 0.0,
        }
    }

    /// Lays out `pools`, each a list of lanes, each a list of member nodes.
    pub fn organize<N>(&self, pools: &[Vec<Vec<N>>], slotting: &Slotting<'_, N>) -> BandLayout<N>
    where
        N: Copy + Hash + Eq,
    {
        let size_of = |node: &N| slotting.sizes.get(node).copied().unwrap_or_default();
        let column_of = |node: &N| slotting.columns.get(node).copied().unwrap_or_default();

        let members = || pools.iter().flatten().flatten();

        let column_count = members().map(column_of).max().map_or(0, |max| max + 1);
        let mut column_widths = vec![0.0f32; column_count];
        for node in members() {
            let column = column_of(node);
            column_widths[column] = column_widths[column].max(size_of(node).width());
        }
        let column_widths: Vec<f32> = column_widths
            .into_iter()
            .map(|width| width + self.column_margin)
            .collect();
        let column_x: Vec<f32> = column_widths
            .iter()
            .scan(0.0, |x, width| {
                let start = *x;
                *x += width;
                Some(start)
            })
            .collect();

        let mut content_width: f32 = column_widths.iter().sum();
        if let Some(hints) = slotting.x_hints {
            for node in members() {
                if let Some(hint) = hints.get(node) {
                    let right = hint + size_of(node).width() + self.column_margin / 2.0;
                    content_width = content_width.max(right);
                }
            }
        }
        let pool_width = self.header_width + content_width;

        let mut nodes = IndexMap::new();
        let mut pool_bands = Vec::with_capacity(pools.len());
        let mut cursor_y = 0.0;

        for lanes in pools {
            let pool_top = cursor_y;
            let mut y_offset = 0.0;
            let mut lane_bands = Vec::with_capacity(lanes.len());

            for lane in lanes {
                let mut slots: IndexMap<usize, Vec<N>> = IndexMap::new();
                for &node in lane {
                    slots.entry(column_of(&node)).or_default().push(node);
                }

                let slot_height = |slot: &[N]| {
                    let heights: f32 = slot.iter().map(|node| size_of(node).height()).sum();
                    heights + self.node_spacing * slot.len().saturating_sub(1) as f32
                };
                let tallest = slots
                    .values()
                    .map(|slot| slot_height(slot))
                    .fold(0.0, f32::max);
                let height = self.min_height.max(tallest + 2.0 * self.padding);
                let lane_top = pool_top + y_offset;

                for (&column, slot) in &slots {
                    let mut y = lane_top + (height - slot_height(slot)) / 2.0;
                    for node in slot {
                        let size = size_of(node);
                        let left = match slotting.x_hints.and_then(|hints| hints.get(node)) {
                            Some(&hint) => hint,
                            None => column_x[column] + (column_widths[column] - size.width()) / 2.0,
                        };
                        let top_left = Point::new(self.header_width + left, y);
                        nodes.insert(*node, Bounds::new_from_top_left(top_left, size));
                        y += size.height() + self.node_spacing;
                    }
                }

                lane_bands.push(LaneBand {
                    y_offset,
                    height,
                    bounds: Bounds::new_from_top_left(
                        Point::new(self.header_width, lane_top),
                        Size::new(content_width, height),
                    ),
                });
                y_offset += height;
            }

            let pool_height = y_offset;
            trace!(
                lanes = lane_bands.len(),
                height = pool_height;
                "Pool band organized"
            );
            pool_bands.push(PoolBand {
                bounds: Bounds::new_from_top_left(
                    Point::new(0.0, pool_top),
                    Size::new(pool_width, pool_height),
                ),
                lanes: lane_bands,
            });
            cursor_y = pool_top + pool_height + self.pool_spacing;
        }

        let extent_height = (cursor_y - self.pool_spacing).max(0.0);

        BandLayout {
            nodes,
            pools: pool_bands,
            extent: Size::new(pool_width, extent_height),
        }
    }

    /// Grows `pools` so every band holds its `members` again.
    ///
    /// `members` mirrors the pool and lane structure of `pools`. Lanes only
    /// grow downward and to the right. Later lanes and pools are pushed
    /// down by the growth above them and take their unpinned members along.
    pub fn refit<N>(&self, pools: &mut [PoolBand], members: &[Vec<Vec<Member<N>>>]) -> Refit<N>
    where
        N: Copy + Hash + Eq,
    {
        let mut shifts = IndexMap::new();
        let mut grown = 0;

        let members_right = members
            .iter()
            .flatten()
            .flatten()
            .map(|member| member.bounds.max_x() + self.column_margin / 2.0);
        let right = pools
            .iter()
            .map(|pool| pool.bounds.max_x())
            .chain(members_right)
            .fold(0.0, f32::max);

        let mut cursor = pools.first().map(|pool| pool.bounds.min_y());
        for (pool, lanes) in pools.iter_mut().zip(members) {
            let left = pool.bounds.min_x();
            let top = cursor.map_or(pool.bounds.min_y(), |cursor| cursor.max(pool.bounds.min_y()));
            let mut y_offset = 0.0;

            for (band, lane) in pool.lanes.iter_mut().zip(lanes) {
                let lane_top = top + y_offset;
                let shift = lane_top - band.bounds.min_y();
                let mut bottom = lane_top + band.height;

                for member in lane {
                    let bounds = if member.pinned {
                        member.bounds
                    } else {
                        if shift != 0.0 {
                            shifts.insert(member.key, shift);
                        }
                        member.bounds.translate(Point::new(0.0, shift))
                    };
                    bottom = bottom.max(bounds.max_y() + self.padding);
                }

                let height = bottom - lane_top;
                if height > band.height {
                    grown += 1;
                }
                let lane_left = band.bounds.min_x();
                *band = LaneBand {
                    y_offset,
                    height,
                    bounds: Bounds::new_from_top_left(
                        Point::new(lane_left, lane_top),
                        Size::new(right - lane_left, height),
                    ),
                };
                y_offset += height;
            }

            pool.bounds =
                Bounds::new_from_top_left(Point::new(left, top), Size::new(right - left, y_offset));
            cursor = Some(top + y_offset + self.pool_spacing);
        }

        trace!(grown = grown, shifted = shifts.len(); "Lane bands refit");
        Refit { shifts, grown }
    }
}
