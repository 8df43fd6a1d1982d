//! Deterministic ordering of proposal segments.
//!
//! ```text
//! Start ─┬─ acyclic ─→ Kahn's algorithm ─→ Done
//!        └─ cyclic ──→ proposal order  ─→ Done
//! ```
//!
//! Ties among unconstrained segments are broken by proposal index: the FIFO
//! queue is seeded in ascending index order and successors are enqueued in
//! ascending index order as they become free.

use std::collections::VecDeque;

use super::builder::DependencyGraph;
use super::cycle::find_cycle;
use crate::types::OrderStrategy;

/// Result of ordering a proposal's segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ordering {
    permutation: Vec<usize>,
    strategy: OrderStrategy,
    cycle: Option<Vec<usize>>,
}

impl Ordering {
    fn topological(permutation: Vec<usize>) -> Self {
        Self {
            permutation,
            strategy: OrderStrategy::Topological,
            cycle: None,
        }
    }

    fn fallback(node_count: usize, cycle: Vec<usize>) -> Self {
        Self {
            cycle: Some(cycle),
            ..Self::proposal_order(node_count)
        }
    }

    /// The identity permutation over `node_count` segments.
    pub fn proposal_order(node_count: usize) -> Self {
        Self {
            permutation: (0..node_count).collect(),
            strategy: OrderStrategy::ProposalOrderFallback,
            cycle: None,
        }
    }

    /// Proposal indices in final order: `permutation()[order] == index`.
    pub fn permutation(&self) -> &[usize] {
        &self.permutation
    }

    /// Final order of every proposal index: `positions()[index] == order`.
    pub fn positions(&self) -> Vec<usize> {
        let mut positions = vec![0; self.permutation.len()];
        for (order, &index) in self.permutation.iter().enumerate() {
            positions[index] = order;
        }
        positions
    }

    /// How the order was obtained.
    pub fn strategy(&self) -> OrderStrategy {
        self.strategy
    }

    /// The cycle that forced the fallback, if any.
    pub fn cycle(&self) -> Option<&[usize]> {
        self.cycle.as_deref()
    }

    /// Whether the fallback was used.
    pub fn is_fallback(&self) -> bool {
        self.strategy == OrderStrategy::ProposalOrderFallback
    }

    /// Number of ordered segments.
    pub fn len(&self) -> usize {
        self.permutation.len()
    }

    /// Whether there is nothing to order.
    pub fn is_empty(&self) -> bool {
        self.permutation.is_empty()
    }
}

/// Kahn's algorithm with a FIFO queue.
///
/// Returns `None` if some node never reaches in-degree zero, i.e. the
/// graph has a cycle.
pub fn kahn_order(graph: &DependencyGraph) -> Option<Vec<usize>> {
    let node_count = graph.node_count();
    let mut in_degree = graph.in_degrees();

    let mut queue: VecDeque<usize> = (0..node_count).filter(|&n| in_degree[n] == 0).collect();
    let mut order = Vec::with_capacity(node_count);

    while let Some(node) = queue.pop_front() {
        order.push(node);
        for next in graph.successors(node) {
            in_degree[next] -= 1;
            if in_degree[next] == 0 {
                queue.push_back(next);
            }
        }
    }

    (order.len() == node_count).then_some(order)
}

/// Order a proposal's segments.
///
/// Runs Kahn's algorithm when the graph is acyclic. When a cycle exists the
/// identity permutation is returned instead and the event is logged; the
/// assembler then strips the prerequisite references the order violates.
pub fn order_segments(graph: &DependencyGraph) -> Ordering {
    let node_count = graph.node_count();

    if let Some(cycle) = find_cycle(graph) {
        tracing::warn!(
            segments = node_count,
            cycle = ?cycle,
            "Prerequisite cycle detected, falling back to proposal order"
        );
        return Ordering::fallback(node_count, cycle);
    }

    match kahn_order(graph) {
        Some(permutation) => Ordering::topological(permutation),
        None => Ordering::proposal_order(node_count),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(prerequisites: &[&[usize]]) -> DependencyGraph {
        DependencyGraph::from_prerequisites(prerequisites)
    }

    #[test]
    fn test_linear_chain() {
        let ordering = order_segments(&graph(&[&[], &[0], &[1]]));
        assert_eq!(ordering.permutation(), &[0, 1, 2]);
        assert_eq!(ordering.strategy(), OrderStrategy::Topological);
        assert!(ordering.cycle().is_none());
    }

    #[test]
    fn test_reversed_chain_is_reordered() {
        // 2 has no prerequisites, 1 depends on 2, 0 depends on 1
        let ordering = order_segments(&graph(&[&[1], &[2], &[]]));
        assert_eq!(ordering.permutation(), &[2, 1, 0]);
        assert_eq!(ordering.positions(), vec![2, 1, 0]);
    }

    #[test]
    fn test_unconstrained_segments_keep_proposal_order() {
        let ordering = order_segments(&graph(&[&[], &[], &[], &[]]));
        assert_eq!(ordering.permutation(), &[0, 1, 2, 3]);
    }

    #[test]
    fn test_fifo_tie_breaking() {
        // 0 and 3 are free; 1 depends on 3; 2 depends on 0.
        // Queue: [0, 3] -> pop 0, free 2 -> [3, 2] -> pop 3, free 1 -> [2, 1]
        let ordering = order_segments(&graph(&[&[], &[3], &[0], &[]]));
        assert_eq!(ordering.permutation(), &[0, 3, 2, 1]);
    }

    #[test]
    fn test_simultaneous_arrivals_ascending() {
        // 0 frees 3, 1 and 2 at once
        let ordering = order_segments(&graph(&[&[], &[0], &[0], &[0]]));
        assert_eq!(ordering.permutation(), &[0, 1, 2, 3]);
    }

    #[test]
    fn test_cycle_falls_back_to_identity() {
        let ordering = order_segments(&graph(&[&[], &[2], &[1], &[0]]));
        assert_eq!(ordering.permutation(), &[0, 1, 2, 3]);
        assert!(ordering.is_fallback());
        assert_eq!(ordering.cycle(), Some(&[1, 2][..]));
    }

    #[test]
    fn test_kahn_reports_cycle() {
        assert!(kahn_order(&graph(&[&[1], &[0]])).is_none());
        assert_eq!(kahn_order(&graph(&[])), Some(vec![]));
    }

    #[test]
    fn test_positions_inverts_permutation() {
        let ordering = order_segments(&graph(&[&[2], &[], &[1]]));
        let permutation = ordering.permutation().to_vec();
        let positions = ordering.positions();
        for (order, &index) in permutation.iter().enumerate() {
            assert_eq!(positions[index], order);
        }
    }
}
