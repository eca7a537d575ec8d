// ABOUTME: Simple cycle enumeration for the dependency graph (Johnson's algorithm).
// ABOUTME: Any cycle makes the appstack undeployable and is reported by app name.

use std::collections::{BTreeSet, HashMap, HashSet};

use super::graph::DependencyGraph;
use crate::appstack::StackError;

/// Every elementary cycle of the graph.
///
/// Each cycle starts at its lowest node and follows dependency edges; cycles
/// come out ordered by that starting node. Self-dependencies are cycles of
/// one node.
pub fn simple_cycles(graph: &DependencyGraph) -> Vec<Vec<usize>> {
    let nodes: Vec<usize> = graph.nodes().collect();
    let mut cycles = Vec::new();

    for (position, &start) in nodes.iter().enumerate() {
        // Johnson: only look at the subgraph induced by `start` and later nodes,
        // restricted to the strong component containing `start`.
        let allowed: HashSet<usize> = nodes[position..].iter().copied().collect();
        let component = strong_component(graph, start, &allowed);
        if component.len() == 1 && !graph.dependencies(start).any(|d| d == start) {
            continue;
        }

        let mut search = CircuitSearch {
            graph,
            start,
            component: &component,
            blocked: HashSet::new(),
            blocked_by: HashMap::new(),
            path: Vec::new(),
            found: &mut cycles,
        };
        search.circuit(start);
    }

    cycles
}

/// Fail with a configuration error listing every cycle of the graph.
pub fn detect_cycles(graph: &DependencyGraph) -> Result<(), StackError> {
    let cycles = simple_cycles(graph);
    if cycles.is_empty() {
        return Ok(());
    }

    let cycles = cycles
        .into_iter()
        .map(|cycle| cycle.into_iter().map(|n| graph.name(n).clone()).collect())
        .collect();
    Err(StackError::Cycles { cycles })
}

/// Nodes of `allowed` that `start` reaches and that reach `start` back.
fn strong_component(
    graph: &DependencyGraph,
    start: usize,
    allowed: &HashSet<usize>,
) -> BTreeSet<usize> {
    let forward = reachable(start, allowed, |n| graph.dependencies(n).collect());
    let backward = reachable(start, allowed, |n| {
        allowed
            .iter()
            .copied()
            .filter(|&m| graph.dependencies(m).any(|d| d == n))
            .collect()
    });
    forward.intersection(&backward).copied().collect()
}

fn reachable<F>(start: usize, allowed: &HashSet<usize>, next: F) -> BTreeSet<usize>
where
    F: Fn(usize) -> Vec<usize>,
{
    let mut seen = BTreeSet::from([start]);
    let mut stack = vec![start];
    while let Some(node) = stack.pop() {
        for neighbour in next(node) {
            if allowed.contains(&neighbour) && seen.insert(neighbour) {
                stack.push(neighbour);
            }
        }
    }
    seen
}

struct CircuitSearch<'a> {
    graph: &'a DependencyGraph,
    start: usize,
    component: &'a BTreeSet<usize>,
    blocked: HashSet<usize>,
    blocked_by: HashMap<usize, BTreeSet<usize>>,
    path: Vec<usize>,
    found: &'a mut Vec<Vec<usize>>,
}

impl CircuitSearch<'_> {
    fn circuit(&mut self, node: usize) -> bool {
        let mut closed = false;
        self.path.push(node);
        self.blocked.insert(node);

        let next: Vec<usize> = self
            .graph
            .dependencies(node)
            .filter(|n| self.component.contains(n))
            .collect();

        for &neighbour in &next {
            if neighbour == self.start {
                self.found.push(self.path.clone());
                closed = true;
            } else if !self.blocked.contains(&neighbour) && self.circuit(neighbour) {
                closed = true;
            }
        }

        if closed {
            self.unblock(node);
        } else {
            for &neighbour in &next {
                self.blocked_by.entry(neighbour).or_default().insert(node);
            }
        }

        self.path.pop();
        closed
    }

    fn unblock(&mut self, node: usize) {
        self.blocked.remove(&node);
        if let Some(waiting) = self.blocked_by.remove(&node) {
            for other in waiting {
                if self.blocked.contains(&other) {
                    self.unblock(other);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AppName;

    fn graph(n: usize, edges: &[(usize, usize)]) -> DependencyGraph {
        let names = (0..n)
            .map(|i| AppName::new(&format!("app_{i}")).unwrap())
            .collect();
        DependencyGraph::from_edges(names, edges)
    }

    #[test]
    fn acyclic_graph_has_no_cycles() {
        let g = graph(4, &[(1, 0), (2, 0), (2, 1), (3, 2)]);
        assert!(simple_cycles(&g).is_empty());
        assert!(detect_cycles(&g).is_ok());
    }

    #[test]
    fn two_node_cycle() {
        let g = graph(2, &[(0, 1), (1, 0)]);
        assert_eq!(simple_cycles(&g), vec![vec![0, 1]]);
    }

    #[test]
    fn self_dependency_is_a_cycle() {
        let g = graph(2, &[(1, 1), (1, 0)]);
        assert_eq!(simple_cycles(&g), vec![vec![1]]);
    }

    #[test]
    fn finds_every_cycle_through_shared_nodes() {
        // 0 -> 1 -> 2 -> 0 and 0 -> 2 -> 0, plus a separate 3 <-> 4.
        let g = graph(5, &[(0, 1), (1, 2), (2, 0), (0, 2), (3, 4), (4, 3)]);
        let mut cycles = simple_cycles(&g);
        cycles.sort();
        assert_eq!(cycles, vec![vec![0, 1, 2], vec![0, 2], vec![3, 4]]);
    }

    #[test]
    fn complete_graph_cycle_count() {
        // K3 with all directed edges has 2 three-cycles and 3 two-cycles.
        let mut edges = Vec::new();
        for a in 0..3 {
            for b in 0..3 {
                if a != b {
                    edges.push((a, b));
                }
            }
        }
        assert_eq!(simple_cycles(&graph(3, &edges)).len(), 5);
    }

    #[test]
    fn detect_cycles_reports_names() {
        let g = graph(3, &[(0, 1), (1, 0), (2, 0)]);
        let err = detect_cycles(&g).unwrap_err();
        let members = err.cycle_members();
        let names: Vec<&str> = members.iter().map(|n| n.as_str()).collect();
        assert_eq!(names, vec!["app_0", "app_1"]);
    }
}
