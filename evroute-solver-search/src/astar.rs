//! Best-first shortest-path search between two nodes.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use evroute_core::DistanceMatrix;

/// Open-list entry. Lower priority pops first; equal priorities pop in
/// insertion order.
#[derive(Debug, Clone, Copy)]
struct Frontier {
    priority: f64,
    sequence: u64,
    node: usize,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap, so both keys are reversed.
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// Find the cheapest path from `start` to `goal` over direct edges.
///
/// Nodes are scored by accumulated cost plus the direct distance to `goal`.
/// The returned path includes both endpoints; it is empty when `goal` cannot
/// be reached and `[start]` when the endpoints coincide.
///
/// # Examples
/// ```
/// use evroute_core::DistanceMatrix;
/// use evroute_solver_search::shortest_path;
///
/// let mut matrix = DistanceMatrix::new(3);
/// matrix.set_symmetric(0, 1, 1.0);
/// matrix.set_symmetric(1, 2, 1.0);
/// matrix.set_symmetric(0, 2, 5.0);
/// assert_eq!(shortest_path(&matrix, 0, 2), vec![0, 1, 2]);
/// ```
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "path costs accumulate floating-point distances"
)]
pub fn shortest_path(distances: &DistanceMatrix, start: usize, goal: usize) -> Vec<usize> {
    if start >= distances.len() || goal >= distances.len() {
        return Vec::new();
    }

    let mut open = BinaryHeap::new();
    let mut closed = HashSet::new();
    let mut came_from: HashMap<usize, usize> = HashMap::new();
    let mut cost_so_far: HashMap<usize, f64> = HashMap::from([(start, 0.0)]);
    let mut sequence = 0_u64;

    open.push(Frontier {
        priority: 0.0,
        sequence,
        node: start,
    });

    while let Some(Frontier { node: current, .. }) = open.pop() {
        if current == goal {
            return reconstruct(&came_from, current);
        }
        if !closed.insert(current) {
            continue;
        }
        let current_cost = cost_so_far.get(&current).copied().unwrap_or(f64::INFINITY);

        for (neighbour, step) in distances.neighbours(current) {
            if closed.contains(&neighbour) {
                continue;
            }
            let tentative = current_cost + step;
            let improves = cost_so_far
                .get(&neighbour)
                .is_none_or(|&known| tentative < known);
            if improves {
                came_from.insert(neighbour, current);
                cost_so_far.insert(neighbour, tentative);
                sequence += 1;
                open.push(Frontier {
                    priority: tentative + distances.get(neighbour, goal),
                    sequence,
                    node: neighbour,
                });
            }
        }
    }

    Vec::new()
}

fn reconstruct(came_from: &HashMap<usize, usize>, goal: usize) -> Vec<usize> {
    let mut path = vec![goal];
    let mut current = goal;
    while let Some(&previous) = came_from.get(&current) {
        path.push(previous);
        current = previous;
    }
    path.reverse();
    path
}
