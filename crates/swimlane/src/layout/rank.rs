//! Breadth-first rank assignment.
//!
//! Ranks start at 0 on the roots (nodes without incoming flow) and are
//! corrected with a worklist: whenever `rank(source) + 1` exceeds the
//! recorded rank of a target, the target is raised and queued again so the
//! correction propagates downstream. Loops are cut first by dropping the back
//! edges a depth-first search from the roots reports, so every rank is the
//! longest acyclic path from a root.
//!
//! Nodes no root can reach keep rank 0 but are placed in an overflow column
//! one past the highest rank, in declaration order.

use std::{collections::VecDeque, hash::Hash};

use indexmap::{IndexMap, IndexSet};
use log::trace;
use petgraph::{
    Direction,
    graph::{DiGraph, NodeIndex},
    visit::{DfsEvent, depth_first_search},
};

/// Counters describing one rank assignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RankStats {
    pub nodes: usize,
    pub max_rank: usize,
    /// Number of times an already ranked node was raised.
    pub requeues: usize,
    /// Loop edges ignored while ranking.
    pub back_edges: usize,
    pub unreachable: usize,
}

/// Ranks and rank columns of one frame.
#[derive(Debug, Clone)]
pub struct Ranking<N: Hash + Eq> {
    ranks: IndexMap<N, usize>,
    columns: IndexMap<N, usize>,
    stats: RankStats,
}

impl<N: Copy + Hash + Eq> Ranking<N> {
    /// Rank of `node`, 0 for unknown nodes.
    pub fn rank(&self, node: N) -> usize {
        self.ranks.get(&node).copied().unwrap_or_default()
    }

    /// Column `node` is drawn in; differs from the rank only for
    /// unreachable nodes.
    pub fn column(&self, node: N) -> usize {
        self.columns.get(&node).copied().unwrap_or_default()
    }

    pub fn ranks(&self) -> &IndexMap<N, usize> {
        &self.ranks
    }

    pub fn columns(&self) -> &IndexMap<N, usize> {
        &self.columns
    }

    pub fn stats(&self) -> RankStats {
        self.stats
    }
}

#[derive(Debug, Default)]
pub struct RankAssigner;

impl RankAssigner {
    pub fn new() -> Self {
        Self
    }

    /// Assigns a rank to every node of `nodes`.
    ///
    /// Edges whose endpoints are not both listed in `nodes` are ignored.
    pub fn assign<N>(&self, nodes: &[N], edges: &[(N, N)]) -> Ranking<N>
    where
        N: Copy + Hash + Eq,
    {
        let mut graph = DiGraph::<N, ()>::with_capacity(nodes.len(), edges.len());
        let mut indices: IndexMap<N, NodeIndex> = IndexMap::new();
        for &node in nodes {
            indices.entry(node).or_insert_with(|| graph.add_node(node));
        }
        for (source, target) in edges {
            if let (Some(&source), Some(&target)) = (indices.get(source), indices.get(target)) {
                graph.add_edge(source, target, ());
            }
        }

        let roots: Vec<NodeIndex> = graph
            .node_indices()
            .filter(|&idx| {
                graph
                    .neighbors_directed(idx, Direction::Incoming)
                    .all(|source| source == idx)
            })
            .collect();

        let mut back_edges = IndexSet::new();
        depth_first_search(&graph, roots.iter().copied(), |event| {
            if let DfsEvent::BackEdge(source, target) = event {
                back_edges.insert((source, target));
            }
        });

        // Longest acyclic path never exceeds the node count; it doubles as a
        // hard cap on how far a rank can grow.
        let cap = graph.node_count();
        let mut ranks: Vec<Option<usize>> = vec![None; cap];
        let mut queued = vec![false; cap];
        let mut queue = VecDeque::new();
        let mut requeues = 0;

        for &root in &roots {
            ranks[root.index()] = Some(0);
            queued[root.index()] = true;
            queue.push_back(root);
        }

        while let Some(current) = queue.pop_front() {
            queued[current.index()] = false;
            let Some(current_rank) = ranks[current.index()] else {
                continue;
            };

            for target in graph.neighbors_directed(current, Direction::Outgoing) {
                if back_edges.contains(&(current, target)) {
                    continue;
                }
                let candidate = current_rank + 1;
                if candidate >= cap {
                    continue;
                }
                match ranks[target.index()] {
                    Some(existing) if existing >= candidate => continue,
                    Some(_) => requeues += 1,
                    None => {}
                }
                ranks[target.index()] = Some(candidate);
                if !queued[target.index()] {
                    queued[target.index()] = true;
                    queue.push_back(target);
                }
            }
        }

        let max_rank = ranks.iter().flatten().copied().max();
        let overflow_column = max_rank.map_or(0, |rank| rank + 1);

        let mut rank_map = IndexMap::with_capacity(cap);
        let mut column_map = IndexMap::with_capacity(cap);
        let mut unreachable = 0;
        for (&node, &idx) in &indices {
            match ranks[idx.index()] {
                Some(rank) => {
                    rank_map.insert(node, rank);
                    column_map.insert(node, rank);
                }
                None => {
                    unreachable += 1;
                    rank_map.insert(node, 0);
                    column_map.insert(node, overflow_column);
                }
            }
        }

        let stats = RankStats {
            nodes: cap,
            max_rank: max_rank.unwrap_or_default(),
            requeues,
            back_edges: back_edges.len(),
            unreachable,
        };
        trace!(stats:? = stats; "Ranks assigned");

        Ranking {
            ranks: rank_map,
            columns: column_map,
            stats,
        }
    }
}
