//! Bounded best-first expansion over the board
//!
//! A `SearchPolicy` decides node ordering, pruning and which nodes are
//! acceptable path ends. The search keeps the best accepted path for each
//! distance from the start, so one start tile can yield several arrival
//! times without enumerating every route.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap};

use ahash::AHashSet;

use crate::board::Board;
use crate::core::types::TileId;

/// Callbacks driving `bounded_best_first`
pub trait SearchPolicy {
    /// Expansion order; smaller pops first
    type Priority: Ord + Clone;
    /// Path-end quality; larger is better
    type Score: Ord + Clone;

    /// Priority of the start node, or `None` to refuse it
    fn seed(&self, board: &Board, start: TileId) -> Option<Self::Priority>;

    /// Priority after stepping `from` -> `to` at `depth` (depth of `to`).
    /// `None` prunes the step.
    fn step(
        &self,
        board: &Board,
        from: TileId,
        to: TileId,
        depth: u32,
        prev: &Self::Priority,
    ) -> Option<Self::Priority>;

    /// Score of `tile` as a path end, or `None` if it is not acceptable
    fn score(
        &self,
        board: &Board,
        tile: TileId,
        depth: u32,
        priority: &Self::Priority,
    ) -> Option<Self::Score>;
}

/// Best accepted path for one distance
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult<S> {
    /// Tiles from the search start outward to the accepted node
    pub tiles: Vec<TileId>,
    pub distance: u32,
    pub score: S,
}

#[derive(Debug, Clone)]
struct Node<P> {
    tile: TileId,
    depth: u32,
    parent: Option<usize>,
    priority: P,
}

/// Heap entry; ordering reversed so the smallest priority pops first
#[derive(Debug)]
struct QueueEntry<P> {
    priority: P,
    node: usize,
}

impl<P: Ord> PartialEq for QueueEntry<P> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<P: Ord> Eq for QueueEntry<P> {}

impl<P: Ord> Ord for QueueEntry<P> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap; older nodes win ties
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl<P: Ord> PartialOrd for QueueEntry<P> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn on_branch<P>(nodes: &[Node<P>], mut index: Option<usize>, tile: TileId) -> bool {
    while let Some(i) = index {
        if nodes[i].tile == tile {
            return true;
        }
        index = nodes[i].parent;
    }
    false
}

fn reconstruct<P>(nodes: &[Node<P>], mut index: usize) -> Vec<TileId> {
    let mut tiles = vec![nodes[index].tile];
    while let Some(parent) = nodes[index].parent {
        tiles.push(nodes[parent].tile);
        index = parent;
    }
    tiles.reverse();
    tiles
}

/// Expand from `start` up to `max_depth` moves, keeping at most
/// `max_results` distances. Each (tile, depth) pair is expanded once.
pub fn bounded_best_first<S: SearchPolicy>(
    board: &Board,
    start: TileId,
    max_depth: u32,
    policy: &S,
    max_results: usize,
) -> BTreeMap<u32, SearchResult<S::Score>> {
    let mut results: BTreeMap<u32, SearchResult<S::Score>> = BTreeMap::new();
    let Some(seed) = policy.seed(board, start) else {
        return results;
    };

    let mut nodes = vec![Node {
        tile: start,
        depth: 0,
        parent: None,
        priority: seed.clone(),
    }];
    let mut open = BinaryHeap::new();
    open.push(QueueEntry {
        priority: seed,
        node: 0,
    });
    let mut expanded: AHashSet<(TileId, u32)> = AHashSet::new();

    while let Some(entry) = open.pop() {
        let (tile, depth) = (nodes[entry.node].tile, nodes[entry.node].depth);
        if !expanded.insert((tile, depth)) {
            continue;
        }

        if let Some(score) = policy.score(board, tile, depth, &nodes[entry.node].priority) {
            let better = match results.get(&depth) {
                Some(existing) => score > existing.score,
                None => results.len() < max_results,
            };
            if better {
                results.insert(
                    depth,
                    SearchResult {
                        tiles: reconstruct(&nodes, entry.node),
                        distance: depth,
                        score,
                    },
                );
            }
        }

        if depth >= max_depth {
            continue;
        }

        for &next in board.neighbors(tile) {
            if expanded.contains(&(next, depth + 1)) || on_branch(&nodes, Some(entry.node), next) {
                continue;
            }
            let Some(priority) =
                policy.step(board, tile, next, depth + 1, &nodes[entry.node].priority)
            else {
                continue;
            };
            nodes.push(Node {
                tile: next,
                depth: depth + 1,
                parent: Some(entry.node),
                priority: priority.clone(),
            });
            open.push(QueueEntry {
                priority,
                node: nodes.len() - 1,
            });
        }
    }

    results
}
