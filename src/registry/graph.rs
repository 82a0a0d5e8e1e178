//! Declared dependency graph checks.
//!
//! Depth-first search with gray/black coloring. Independent of how
//! initializers call each other at runtime: a cycle in the declared
//! dependencies is found even if no initializer ever re-enters another.

use std::collections::{HashMap, HashSet};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("Dependency cycle: {}", .0.join(" -> "))]
    Cycle(Vec<String>),

    #[error("Component '{component}' depends on unregistered '{dependency}'")]
    UnknownDependency { component: String, dependency: String },
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Color {
    Gray,
    Black,
}

/// Order `nodes` so every component comes after its dependencies.
///
/// `nodes` is `(name, dependencies)` in registration order; ties keep that
/// order, so the result is deterministic.
pub fn topological_order(nodes: &[(String, Vec<String>)]) -> Result<Vec<String>, GraphError> {
    let graph: HashMap<&str, &[String]> = nodes
        .iter()
        .map(|(name, deps)| (name.as_str(), deps.as_slice()))
        .collect();

    let mut colors: HashMap<&str, Color> = HashMap::new();
    let mut stack: Vec<&str> = Vec::new();
    let mut order = Vec::with_capacity(nodes.len());

    for (name, _) in nodes {
        visit(name, &graph, &mut colors, &mut stack, &mut order)?;
    }
    Ok(order)
}

/// The part of `nodes` reachable from `roots` along declared dependencies,
/// in the original order. Unknown names are skipped here; ordering the result
/// reports a reachable node's unknown dependency.
pub fn reachable(nodes: &[(String, Vec<String>)], roots: &[String]) -> Vec<(String, Vec<String>)> {
    let graph: HashMap<&str, &[String]> = nodes
        .iter()
        .map(|(name, deps)| (name.as_str(), deps.as_slice()))
        .collect();

    let mut seen: HashSet<&str> = HashSet::new();
    let mut pending: Vec<&str> = roots.iter().map(String::as_str).collect();
    while let Some(name) = pending.pop() {
        let Some(deps) = graph.get(name) else {
            continue;
        };
        if seen.insert(name) {
            pending.extend(deps.iter().map(String::as_str));
        }
    }

    nodes
        .iter()
        .filter(|(name, _)| seen.contains(name.as_str()))
        .cloned()
        .collect()
}

fn visit<'a>(
    name: &'a str,
    graph: &HashMap<&'a str, &'a [String]>,
    colors: &mut HashMap<&'a str, Color>,
    stack: &mut Vec<&'a str>,
    order: &mut Vec<String>,
) -> Result<(), GraphError> {
    match colors.get(name) {
        Some(Color::Black) => return Ok(()),
        Some(Color::Gray) => {
            let start = stack.iter().position(|n| *n == name).unwrap_or(0);
            let mut cycle: Vec<String> = stack[start..].iter().map(|n| n.to_string()).collect();
            cycle.push(name.to_string());
            return Err(GraphError::Cycle(cycle));
        }
        None => {}
    }

    colors.insert(name, Color::Gray);
    stack.push(name);

    let deps = graph.get(name).copied().unwrap_or(&[]);
    for dep in deps {
        if !graph.contains_key(dep.as_str()) {
            return Err(GraphError::UnknownDependency {
                component: name.to_string(),
                dependency: dep.clone(),
            });
        }
        visit(dep.as_str(), graph, colors, stack, order)?;
    }

    stack.pop();
    colors.insert(name, Color::Black);
    order.push(name.to_string());
    Ok(())
}
