use crate::catalog::CatalogError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlanError {
    /// The dependency graph contains one or more cycles. Carries every simple
    /// cycle found; no partial plan is usable.
    #[error("Dependency cycle detected: {}", render_cycles(.cycles))]
    Cycle { cycles: Vec<Vec<String>> },

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Renders each cycle as an ordered chain, e.g. `A -> B -> A`.
pub fn render_cycles(cycles: &[Vec<String>]) -> String {
    cycles
        .iter()
        .map(|cycle| {
            let mut chain = cycle.clone();
            if let Some(first) = cycle.first() {
                chain.push(first.clone());
            }
            chain.join(" -> ")
        })
        .collect::<Vec<_>>()
        .join("; ")
}
