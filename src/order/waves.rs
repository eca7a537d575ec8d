// ABOUTME: Splits an acyclic dependency graph into deployment waves.
// ABOUTME: Each wave only depends on applications of earlier waves.

use nonempty::NonEmpty;

use super::cycles::detect_cycles;
use super::graph::DependencyGraph;
use crate::appstack::StackError;

/// Nodes that can be deployed concurrently.
pub type Wave = NonEmpty<usize>;

/// Strip the graph's leaves until nothing is left.
///
/// Leaves are nodes without remaining dependencies; every pass collects them
/// (in node order) as the next wave and removes them. A graph that stops
/// shrinking has a cycle, reported like [`detect_cycles`] would.
pub fn deployment_waves(graph: &DependencyGraph) -> Result<Vec<Wave>, StackError> {
    let mut remaining = graph.clone();
    let mut waves = Vec::new();

    while !remaining.is_empty() {
        let leaves: Vec<usize> = remaining
            .nodes()
            .filter(|&node| remaining.out_degree(node) == 0)
            .collect();

        let Some(wave) = NonEmpty::from_vec(leaves) else {
            detect_cycles(&remaining)?;
            return Err(StackError::Cycles { cycles: Vec::new() });
        };

        for &node in wave.iter() {
            remaining.remove_node(node);
        }
        tracing::debug!(
            wave = waves.len(),
            apps = ?wave.iter().map(|&n| graph.name(n).as_str()).collect::<Vec<_>>(),
            "scheduled deployment wave"
        );
        waves.push(wave);
    }

    Ok(waves)
}

/// Waves flattened into one deployment sequence.
pub fn flatten(waves: &[Wave]) -> Vec<usize> {
    waves.iter().flat_map(|wave| wave.iter().copied()).collect()
}
