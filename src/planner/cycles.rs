use crate::planner::DependencyGraph;

/// Enumerates every simple cycle in the graph.
///
/// Path-based depth-first search rooted at each node in sorted order; a
/// search rooted at `start` only walks nodes that sort after `start`, so each
/// cycle is reported exactly once, beginning at its smallest member. Output
/// is deterministic for a given graph.
pub fn find_simple_cycles(graph: &DependencyGraph) -> Vec<Vec<String>> {
    let mut cycles = Vec::new();
    for start in graph.node_names() {
        let mut path = vec![start.clone()];
        walk(graph, &start, &mut path, &mut cycles);
    }
    cycles
}

fn walk(
    graph: &DependencyGraph,
    start: &str,
    path: &mut Vec<String>,
    cycles: &mut Vec<Vec<String>>,
) {
    let current = path
        .last()
        .cloned()
        .unwrap_or_else(|| start.to_string());
    for next in graph.dependents_of(&current) {
        if next == start {
            cycles.push(path.clone());
            continue;
        }
        if next.as_str() < start || path.contains(&next) {
            continue;
        }
        path.push(next);
        walk(graph, start, path, cycles);
        path.pop();
    }
}
