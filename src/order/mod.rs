// ABOUTME: Deployment ordering pipeline for an appstack.
// ABOUTME: Graph building, cycle detection, wave scheduling and fixed-order placement.

mod cycles;
mod dump;
mod graph;
mod reorder;
mod waves;

pub use cycles::{detect_cycles, simple_cycles};
pub use dump::{dump_graph, render_graphml};
pub use graph::DependencyGraph;
pub use reorder::apply_fixed_order;
pub use waves::{Wave, deployment_waves, flatten};

use nonempty::NonEmpty;

use crate::appstack::{AppStack, Manifests, StackError};
use crate::types::AppName;

/// Result of ordering an appstack.
#[derive(Debug, Clone, PartialEq)]
pub struct DeploymentPlan {
    /// Applications that may be deployed concurrently, wave by wave, before
    /// fixed positions are applied.
    pub waves: Vec<NonEmpty<AppName>>,

    /// The appstack with `apps` in final deployment order.
    pub stack: AppStack,
}

impl DeploymentPlan {
    /// Application names in final deployment order.
    pub fn order(&self) -> impl Iterator<Item = &AppName> {
        self.stack.apps.iter().map(|app| &app.name)
    }
}

/// Order an appstack for deployment.
///
/// The input is left untouched; the returned plan holds a new stack whose
/// applications come after everything they depend on, with fixed `order`
/// positions applied on top.
pub fn plan(stack: &AppStack) -> Result<DeploymentPlan, StackError> {
    let graph = DependencyGraph::build(stack)?;
    tracing::debug!(
        apps = graph.len(),
        dependencies = graph.edge_count(),
        "built dependency graph"
    );
    detect_cycles(&graph)?;

    let waves = deployment_waves(&graph)?;
    let sorted = flatten(&waves)
        .into_iter()
        .map(|node| stack.apps[node].clone())
        .collect();
    let apps = apply_fixed_order(sorted)?;

    let waves = waves
        .into_iter()
        .map(|wave| wave.map(|node| graph.name(node).clone()))
        .collect();

    Ok(DeploymentPlan {
        waves,
        stack: AppStack {
            apps,
            ..stack.clone()
        },
    })
}

/// A new appstack with applications in deployment order.
pub fn sort_appstack(stack: &AppStack) -> Result<AppStack, StackError> {
    plan(stack).map(|plan| plan.stack)
}

/// Merge manifests into the appstack and sort it: the expanded appstack.
pub fn expand(stack: &AppStack, manifests: &Manifests) -> Result<AppStack, StackError> {
    tracing::info!("expanding appstack with application manifests");
    let merged = stack.merge_manifests(manifests);
    sort_appstack(&merged)
}
