use crate::catalog::ModuleCatalog;
use crate::planner::{find_simple_cycles, PlanError};
use petgraph::graph::{Graph, NodeIndex};
use petgraph::Direction;
use std::collections::BTreeMap;
use tracing::debug;

/// Directed graph over module names. An edge dependency -> dependent means
/// the dependency must complete before the dependent starts.
///
/// Construction may pass through a cyclic intermediate state; the resolver
/// rejects cycles once the full graph is built, so a graph handed to the
/// planner is always acyclic.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    graph: Graph<String, ()>,
    indices: BTreeMap<String, NodeIndex>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, name: &str) -> NodeIndex {
        if let Some(index) = self.indices.get(name) {
            return *index;
        }
        let index = self.graph.add_node(name.to_string());
        self.indices.insert(name.to_string(), index);
        index
    }

    /// Adds the edge dependency -> dependent, creating either node as needed.
    pub fn add_dependency(&mut self, dependency: &str, dependent: &str) {
        let from = self.add_node(dependency);
        let to = self.add_node(dependent);
        self.graph.update_edge(from, to, ());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.indices.contains_key(name)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Node names in sorted order, for deterministic iteration.
    pub fn node_names(&self) -> Vec<String> {
        self.indices.keys().cloned().collect()
    }

    /// Modules that must complete before `name`, sorted.
    pub fn dependencies_of(&self, name: &str) -> Vec<String> {
        self.neighbors(name, Direction::Incoming)
    }

    /// Modules that wait on `name`, sorted.
    pub fn dependents_of(&self, name: &str) -> Vec<String> {
        self.neighbors(name, Direction::Outgoing)
    }

    fn neighbors(&self, name: &str, direction: Direction) -> Vec<String> {
        let Some(index) = self.indices.get(name) else {
            return Vec::new();
        };
        let mut neighbors: Vec<String> = self
            .graph
            .neighbors_directed(*index, direction)
            .map(|n| self.graph[n].clone())
            .collect();
        neighbors.sort();
        neighbors
    }
}

/// Expands a user's module selection into a closed, acyclic dependency graph.
pub struct DependencyResolver<'a> {
    catalog: &'a ModuleCatalog,
}

impl<'a> DependencyResolver<'a> {
    pub fn new(catalog: &'a ModuleCatalog) -> Self {
        Self { catalog }
    }

    /// Builds the full dependency graph for `selected`, pulling in every
    /// transitive dependency until a fixpoint is reached, then rejects the
    /// result if any cycle exists. Returns the graph together with the final
    /// selection (input order first, discovered dependencies appended in
    /// discovery order).
    pub fn resolve(
        &self,
        selected: &[String],
    ) -> Result<(DependencyGraph, Vec<String>), PlanError> {
        let mut selection: Vec<String> = Vec::new();
        for name in selected {
            if !selection.contains(name) {
                selection.push(name.clone());
            }
        }

        let mut graph = DependencyGraph::new();
        loop {
            let mut added = false;
            for name in selection.clone() {
                let spec = self.catalog.lookup(&name)?;
                graph.add_node(&name);
                for dependency in spec.effective_dependencies() {
                    graph.add_dependency(dependency, &name);
                    if !selection.iter().any(|s| s == dependency) {
                        debug!(module = %name, dependency, "selection expanded");
                        selection.push(dependency.to_string());
                        added = true;
                    }
                }
            }
            if !added {
                break;
            }
        }

        // Two-phase: the complete graph is built above, then checked once.
        let cycles = find_simple_cycles(&graph);
        if !cycles.is_empty() {
            return Err(PlanError::Cycle { cycles });
        }

        Ok((graph, selection))
    }
}
