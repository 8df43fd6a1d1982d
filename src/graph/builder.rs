//! Prerequisite dependency graph.

use std::collections::BTreeSet;

use crate::types::SegmentationProposal;

/// Directed graph over proposal-segment indices.
///
/// Edge `p -> i` means segment `i` depends on segment `p`. Nodes are the
/// indices `0..node_count`; every node is present even without edges.
/// Successor sets iterate in ascending index order, which is also the order
/// in which edges are inserted while walking the proposal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    successors: Vec<BTreeSet<usize>>,
}

impl DependencyGraph {
    /// Build the graph for a validated proposal.
    pub fn build(proposal: &SegmentationProposal) -> Self {
        let lists: Vec<&[usize]> = proposal
            .segments
            .iter()
            .map(|s| s.prerequisites.as_slice())
            .collect();
        Self::from_prerequisites(&lists)
    }

    /// Build a graph from per-node prerequisite lists.
    ///
    /// Out-of-range and self-referencing entries are skipped, so the result
    /// is well formed for any input.
    pub fn from_prerequisites<P: AsRef<[usize]>>(prerequisites: &[P]) -> Self {
        let node_count = prerequisites.len();
        let mut successors = vec![BTreeSet::new(); node_count];

        for (node, list) in prerequisites.iter().enumerate() {
            for &prerequisite in list.as_ref() {
                if prerequisite >= node_count || prerequisite == node {
                    tracing::debug!(
                        segment = node,
                        prerequisite,
                        node_count,
                        "Skipping invalid prerequisite edge"
                    );
                    continue;
                }
                successors[prerequisite].insert(node);
            }
        }

        Self { successors }
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.successors.len()
    }

    /// Number of distinct edges.
    pub fn edge_count(&self) -> usize {
        self.successors.iter().map(BTreeSet::len).sum()
    }

    /// Nodes that depend on `node`, ascending.
    pub fn successors(&self, node: usize) -> impl Iterator<Item = usize> + '_ {
        self.successors.get(node).into_iter().flatten().copied()
    }

    /// Whether the edge `from -> to` exists.
    pub fn has_edge(&self, from: usize, to: usize) -> bool {
        self.successors.get(from).is_some_and(|s| s.contains(&to))
    }

    /// Number of prerequisites of each node.
    pub fn in_degrees(&self) -> Vec<usize> {
        let mut in_degree = vec![0; self.node_count()];
        for set in &self.successors {
            for &to in set {
                in_degree[to] += 1;
            }
        }
        in_degree
    }
}
