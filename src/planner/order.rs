use crate::planner::DependencyGraph;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Topological sort of every node in the graph, dependencies first.
///
/// Kahn's algorithm over a sorted ready set, so the result is stable across
/// repeated calls and independent of node insertion order. Requires an
/// acyclic graph, which the resolver guarantees before a graph reaches the
/// planner.
pub fn deployment_order(graph: &DependencyGraph) -> Vec<String> {
    let mut in_degree: BTreeMap<String, usize> = graph
        .node_names()
        .into_iter()
        .map(|name| {
            let degree = graph.dependencies_of(&name).len();
            (name, degree)
        })
        .collect();

    let mut ready: BTreeSet<String> = in_degree
        .iter()
        .filter(|(_, degree)| **degree == 0)
        .map(|(name, _)| name.clone())
        .collect();

    let mut order = Vec::with_capacity(graph.node_count());
    while let Some(name) = ready.pop_first() {
        for dependent in graph.dependents_of(&name) {
            if let Some(degree) = in_degree.get_mut(&dependent) {
                *degree -= 1;
                if *degree == 0 {
                    ready.insert(dependent);
                }
            }
        }
        order.push(name);
    }

    debug_assert_eq!(order.len(), graph.node_count(), "graph must be acyclic");
    order
}

/// Orders a module list by its position in the deployment order. Entries
/// absent from the graph sort after all known nodes, preserving their
/// relative input order among themselves.
pub fn order_selection(graph: &DependencyGraph, selection: &[String]) -> Vec<String> {
    let positions: HashMap<String, usize> = deployment_order(graph)
        .into_iter()
        .enumerate()
        .map(|(i, name)| (name, i))
        .collect();

    let mut known: Vec<String> = selection
        .iter()
        .filter(|name| positions.contains_key(*name))
        .cloned()
        .collect();
    known.sort_by_key(|name| positions[name]);

    let unknown = selection
        .iter()
        .filter(|name| !positions.contains_key(*name))
        .cloned();
    known.extend(unknown);
    known
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(edges: &[(&str, &str)]) -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        for (from, to) in edges {
            graph.add_dependency(from, to);
        }
        graph
    }

    #[test]
    fn chain_orders_leaves_first() {
        // a depends on b, b depends on c
        let graph = graph(&[("b", "a"), ("c", "b")]);
        assert_eq!(deployment_order(&graph), vec!["c", "b", "a"]);
    }

    #[test]
    fn order_is_stable_across_calls() {
        let graph = graph(&[("base", "web"), ("base", "db"), ("db", "app"), ("web", "app")]);
        let first = deployment_order(&graph);
        assert_eq!(first, deployment_order(&graph));
        assert_eq!(first.len(), 4);
    }

    #[test]
    fn unknown_entries_sort_last_in_input_order() {
        let graph = graph(&[("b", "a")]);
        let ordered = order_selection(
            &graph,
            &[
                "a".to_string(),
                "zeta".to_string(),
                "b".to_string(),
                "alpha".to_string(),
            ],
        );
        assert_eq!(ordered, vec!["b", "a", "zeta", "alpha"]);
    }
}
