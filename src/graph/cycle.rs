//! Cycle detection over the prerequisite graph.
//!
//! Depth-first search with an explicit stack, so deep chains never touch
//! the call-stack limit. Every node is used as a root once, which covers
//! disconnected graphs. `O(V + E)`.

use super::builder::DependencyGraph;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnStack,
    Done,
}

/// Find one cycle, returned as the node indices along it in edge order.
///
/// The first node of the returned path is the target of the back-edge that
/// closed the cycle; the last node has an edge back to it.
pub fn find_cycle(graph: &DependencyGraph) -> Option<Vec<usize>> {
    let node_count = graph.node_count();
    let mut marks = vec![Mark::Unvisited; node_count];

    for root in 0..node_count {
        if marks[root] != Mark::Unvisited {
            continue;
        }

        marks[root] = Mark::OnStack;
        let mut stack = vec![(root, graph.successors(root))];

        while let Some(top) = stack.last_mut() {
            let node = top.0;
            match top.1.next() {
                Some(next) => match marks[next] {
                    Mark::Unvisited => {
                        marks[next] = Mark::OnStack;
                        stack.push((next, graph.successors(next)));
                    }
                    Mark::OnStack => {
                        let start = stack.iter().position(|(n, _)| *n == next).unwrap_or(0);
                        return Some(stack[start..].iter().map(|(n, _)| *n).collect());
                    }
                    Mark::Done => {}
                },
                None => {
                    marks[node] = Mark::Done;
                    stack.pop();
                }
            }
        }
    }

    None
}

/// Whether the graph contains a cycle.
pub fn has_cycle(graph: &DependencyGraph) -> bool {
    find_cycle(graph).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(prerequisites: &[&[usize]]) -> DependencyGraph {
        DependencyGraph::from_prerequisites(prerequisites)
    }

    #[test]
    fn test_empty_graph() {
        assert!(!has_cycle(&graph(&[])));
    }

    #[test]
    fn test_chain_is_acyclic() {
        assert!(!has_cycle(&graph(&[&[], &[0], &[1], &[2]])));
    }

    #[test]
    fn test_diamond_is_acyclic() {
        // 0 -> 1, 0 -> 2, 1 -> 3, 2 -> 3
        assert!(!has_cycle(&graph(&[&[], &[0], &[0], &[1, 2]])));
    }

    #[test]
    fn test_two_cycle() {
        let cycle = find_cycle(&graph(&[&[1], &[0]])).unwrap();
        assert_eq!(cycle, vec![0, 1]);
    }

    #[test]
    fn test_cycle_in_disconnected_component() {
        // 0 -> 1 acyclic; 2 -> 3 -> 4 -> 2 cyclic
        let g = graph(&[&[], &[0], &[4], &[2], &[3]]);
        let cycle = find_cycle(&g).unwrap();
        assert_eq!(cycle, vec![2, 3, 4]);
        for window in cycle.windows(2) {
            assert!(g.has_edge(window[0], window[1]));
        }
        assert!(g.has_edge(*cycle.last().unwrap(), cycle[0]));
    }

    #[test]
    fn test_deep_chain_does_not_overflow() {
        let n = 200_000;
        let lists: Vec<Vec<usize>> = (0..n)
            .map(|i| if i == 0 { vec![] } else { vec![i - 1] })
            .collect();
        let mut g_lists = lists.clone();
        assert!(!has_cycle(&DependencyGraph::from_prerequisites(&lists)));

        g_lists[0] = vec![n - 1];
        assert!(has_cycle(&DependencyGraph::from_prerequisites(&g_lists)));
    }
}
