// ABOUTME: Dependency graph between appstack applications.
// ABOUTME: Edges go from an application to the applications providing its services.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::appstack::{AppStack, StackError};
use crate::types::AppName;

/// Directed graph of applications; an edge `a -> b` means `a` requires a
/// service `b` provides, so `b` has to be deployed first.
///
/// Nodes are identified by their position in the appstack's `apps` list and
/// iterate in that order, which keeps scheduling reproducible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyGraph {
    names: Vec<AppName>,
    edges: BTreeMap<usize, BTreeSet<usize>>,
}

/// Who makes a service instance available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Provider {
    /// Created along with the application at this index.
    App(usize),
    /// Global user-provided service or instance of a global broker; exists
    /// before any application is deployed.
    PreExisting,
}

impl DependencyGraph {
    /// Build the application graph of a stack.
    ///
    /// Every service name an application requires is resolved to the
    /// application providing it. Requirements on pre-existing services add no
    /// edge. Unknown or doubly defined services are configuration errors.
    pub fn build(stack: &AppStack) -> Result<Self, StackError> {
        let providers = service_providers(stack)?;

        let mut graph = DependencyGraph {
            names: stack.apps.iter().map(|app| app.name.clone()).collect(),
            edges: BTreeMap::new(),
        };

        for (index, app) in stack.apps.iter().enumerate() {
            tracing::debug!(app = %app.name, "adding app to dependency graph");
            let deps = graph.edges.entry(index).or_default();

            for service in app.required_services()? {
                match providers.get(service) {
                    Some(Provider::App(provider)) => {
                        tracing::debug!(
                            app = %app.name,
                            provider = %stack.apps[*provider].name,
                            service,
                            "marked dependency"
                        );
                        deps.insert(*provider);
                    }
                    Some(Provider::PreExisting) => {
                        tracing::debug!(app = %app.name, service, "service exists before deployment");
                    }
                    None => {
                        return Err(StackError::UndefinedService {
                            app: app.name.clone(),
                            service: service.to_string(),
                        });
                    }
                }
            }
        }

        Ok(graph)
    }

    /// Number of nodes still in the graph.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn contains(&self, node: usize) -> bool {
        self.edges.contains_key(&node)
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = usize> + '_ {
        self.edges.keys().copied()
    }

    /// Applications `node` depends on.
    pub fn dependencies(&self, node: usize) -> impl Iterator<Item = usize> + '_ {
        self.edges.get(&node).into_iter().flatten().copied()
    }

    pub fn out_degree(&self, node: usize) -> usize {
        self.edges.get(&node).map_or(0, BTreeSet::len)
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(BTreeSet::len).sum()
    }

    /// Remove a node together with every edge pointing at it.
    pub fn remove_node(&mut self, node: usize) {
        self.edges.remove(&node);
        for deps in self.edges.values_mut() {
            deps.remove(&node);
        }
    }

    /// Name of the application behind a node.
    pub fn name(&self, node: usize) -> &AppName {
        &self.names[node]
    }

    /// Build a graph directly from named nodes and `(from, to)` edges.
    pub fn from_edges(names: Vec<AppName>, edges: &[(usize, usize)]) -> Self {
        let mut adjacency: BTreeMap<usize, BTreeSet<usize>> =
            (0..names.len()).map(|i| (i, BTreeSet::new())).collect();
        for &(from, to) in edges {
            if from < names.len() && to < names.len() {
                adjacency.entry(from).or_default().insert(to);
            }
        }
        DependencyGraph {
            names,
            edges: adjacency,
        }
    }
}

/// Map every service instance name to its provider.
///
/// Service names share one namespace across applications, global
/// user-provided services and global brokers.
fn service_providers(stack: &AppStack) -> Result<HashMap<&str, Provider>, StackError> {
    let mut providers = HashMap::new();

    for (index, app) in stack.apps.iter().enumerate() {
        for service in app.provided_services() {
            tracing::debug!(app = %app.name, service, "marking app as service provider");
            claim(&mut providers, service, Provider::App(index))?;
        }
    }

    let global_upsis = stack.user_provided_services.iter().map(|s| s.name.as_str());
    let global_instances = stack
        .brokers
        .iter()
        .flat_map(|b| b.service_instances.iter().map(|i| i.name.as_str()));
    for service in global_upsis.chain(global_instances) {
        claim(&mut providers, service, Provider::PreExisting)?;
    }

    Ok(providers)
}

fn claim<'a>(
    providers: &mut HashMap<&'a str, Provider>,
    service: &'a str,
    provider: Provider,
) -> Result<(), StackError> {
    if providers.insert(service, provider).is_some() {
        return Err(StackError::DuplicateService {
            service: service.to_string(),
        });
    }
    Ok(())
}
