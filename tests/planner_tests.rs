use homelab_deploy::catalog::{ModuleCatalog, ModuleSpec};
use homelab_deploy::planner::{deployment_order, order_selection, DependencyResolver, PlanError};

fn spec(name: &str, dependencies: &[&str]) -> ModuleSpec {
    ModuleSpec {
        name: name.to_string(),
        description: String::new(),
        dependencies: dependencies.iter().map(|d| d.to_string()).collect(),
        required_variables: vec![],
    }
}

fn catalog(specs: &[(&str, &[&str])]) -> ModuleCatalog {
    ModuleCatalog::from_specs(specs.iter().map(|(name, deps)| spec(name, deps)))
}

#[test]
fn chain_is_ordered_leaves_first() {
    let catalog = catalog(&[("A", &["B"]), ("B", &["C"]), ("C", &[])]);
    let resolver = DependencyResolver::new(&catalog);
    let (graph, expanded) = resolver.resolve(&["A".to_string()]).unwrap();

    let order = order_selection(&graph, &expanded);
    assert_eq!(order, vec!["C", "B", "A"]);
}

#[test]
fn expansion_recurses_through_transitive_dependencies() {
    // Selecting only the top of the chain must still pull in C through B.
    let catalog = catalog(&[("A", &["B"]), ("B", &["C"]), ("C", &[])]);
    let resolver = DependencyResolver::new(&catalog);
    let (_, expanded) = resolver.resolve(&["A".to_string()]).unwrap();

    let mut names = expanded.clone();
    names.sort();
    assert_eq!(names, vec!["A", "B", "C"]);
}

#[test]
fn expansion_reaches_a_fixpoint() {
    let catalog = catalog(&[
        ("app", &["db", "web"]),
        ("db", &["base"]),
        ("web", &["base"]),
        ("base", &[]),
    ]);
    let resolver = DependencyResolver::new(&catalog);
    let (_, expanded) = resolver.resolve(&["app".to_string()]).unwrap();

    // Re-running expansion on its own output adds no new module.
    let (_, again) = resolver.resolve(&expanded).unwrap();
    let mut first = expanded.clone();
    let mut second = again.clone();
    first.sort();
    second.sort();
    assert_eq!(first, second);
}

#[test]
fn order_is_a_permutation_respecting_every_edge() {
    let catalog = catalog(&[
        ("app", &["db", "web"]),
        ("db", &["base"]),
        ("web", &["base"]),
        ("base", &[]),
    ]);
    let resolver = DependencyResolver::new(&catalog);
    let (graph, _) = resolver.resolve(&["app".to_string()]).unwrap();

    let order = deployment_order(&graph);
    let mut sorted = order.clone();
    sorted.sort();
    assert_eq!(sorted, graph.node_names());

    let position = |name: &str| order.iter().position(|n| n == name).unwrap();
    for node in graph.node_names() {
        for dependency in graph.dependencies_of(&node) {
            assert!(
                position(&dependency) < position(&node),
                "{dependency} must precede {node}"
            );
        }
    }
}

#[test]
fn two_module_cycle_fails_with_the_full_chain() {
    let catalog = catalog(&[("A", &["B"]), ("B", &["A"])]);
    let resolver = DependencyResolver::new(&catalog);

    let err = resolver.resolve(&["A".to_string()]).unwrap_err();
    match &err {
        PlanError::Cycle { cycles } => assert_eq!(cycles.len(), 1),
        other => panic!("expected a cycle error, got: {other:?}"),
    }
    assert!(err.to_string().contains("A -> B -> A"), "got: {err}");
}

#[test]
fn every_simple_cycle_is_listed() {
    let catalog = catalog(&[("A", &["B"]), ("B", &["A", "C"]), ("C", &["B"])]);
    let resolver = DependencyResolver::new(&catalog);

    let err = resolver.resolve(&["A".to_string()]).unwrap_err();
    let PlanError::Cycle { cycles } = &err else {
        panic!("expected a cycle error, got: {err:?}");
    };
    assert_eq!(cycles.len(), 2, "got: {cycles:?}");
    let rendered = err.to_string();
    assert!(rendered.contains("A -> B -> A"), "got: {rendered}");
    assert!(rendered.contains("B -> C -> B"), "got: {rendered}");
}

#[test]
fn sentinel_dependency_contributes_no_edges() {
    let catalog = catalog(&[("standalone", &["None"])]);
    let resolver = DependencyResolver::new(&catalog);
    let (graph, expanded) = resolver.resolve(&["standalone".to_string()]).unwrap();

    assert_eq!(expanded, vec!["standalone"]);
    assert_eq!(graph.node_count(), 1);
    assert!(graph.dependencies_of("standalone").is_empty());
}

#[test]
fn unknown_dependency_fails_during_planning() {
    let catalog = catalog(&[("A", &["ghost"])]);
    let resolver = DependencyResolver::new(&catalog);

    let err = resolver.resolve(&["A".to_string()]).unwrap_err();
    assert!(
        matches!(err, PlanError::Catalog(_)),
        "expected a catalog error, got: {err:?}"
    );
}

#[test]
fn cycle_failure_happens_before_an_order_is_computed() {
    let catalog = catalog(&[("A", &["B"]), ("B", &["A"])]);
    let resolver = DependencyResolver::new(&catalog);

    // resolve() is the only way to obtain a graph, so a cyclic input can
    // never reach deployment_order().
    assert!(resolver.resolve(&["A".to_string()]).is_err());
}
