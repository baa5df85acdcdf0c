//! Import cycle detection over local modules.

use std::collections::{BTreeMap, VecDeque};

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use rustc_hash::{FxHashMap, FxHashSet};

use super::graph::Info;
use crate::error::CycleError;
use crate::module_name::ModuleName;

/// Fail on the first import cycle among `locals`, or return the modules in
/// build order (imports before importers).
///
/// Imports of names that are not keys of `locals` are ignored. A module that
/// imports itself is not a cycle.
pub fn check_cycles(locals: &BTreeMap<ModuleName, Info>) -> Result<Vec<ModuleName>, CycleError> {
    let mut graph: DiGraph<&ModuleName, ()> = DiGraph::with_capacity(locals.len(), locals.len());
    let mut index = FxHashMap::default();

    // Node i is the i-th key; sorted insertion makes the result deterministic.
    for name in locals.keys() {
        index.insert(name, graph.add_node(name));
    }

    for (i, info) in locals.values().enumerate() {
        let from = NodeIndex::new(i);
        for dep in &info.deps {
            if let Some(&to) = index.get(dep) {
                if from != to {
                    graph.update_edge(from, to, ());
                }
            }
        }
    }

    // Components come out in reverse topological order: imports first.
    let components = tarjan_scc(&graph);

    if let Some(component) = components.iter().find(|c| c.len() > 1) {
        return Err(CycleError {
            modules: cycle_path(&graph, component),
        });
    }

    Ok(components
        .into_iter()
        .flatten()
        .map(|node| graph[node].clone())
        .collect())
}

/// Shortest cycle through the smallest member of `component`.
fn cycle_path(graph: &DiGraph<&ModuleName, ()>, component: &[NodeIndex]) -> Vec<ModuleName> {
    let members: FxHashSet<NodeIndex> = component.iter().copied().collect();
    let Some(&start) = component.iter().min_by_key(|&&node| graph[node]) else {
        return Vec::new();
    };

    let mut parent: FxHashMap<NodeIndex, NodeIndex> = FxHashMap::default();
    let mut queue = VecDeque::from([start]);

    while let Some(node) = queue.pop_front() {
        let mut next: Vec<NodeIndex> = graph
            .neighbors(node)
            .filter(|n| members.contains(n))
            .collect();
        next.sort_by_key(|&n| graph[n]);

        for succ in next {
            if succ == start {
                let mut path = vec![node];
                let mut current = node;
                while let Some(&p) = parent.get(&current) {
                    path.push(p);
                    current = p;
                }
                path.reverse();
                return path.into_iter().map(|n| graph[n].clone()).collect();
            }
            if !parent.contains_key(&succ) {
                parent.insert(succ, node);
                queue.push_back(succ);
            }
        }
    }

    // unreachable for a real component
    let mut names: Vec<ModuleName> = component.iter().map(|&n| graph[n].clone()).collect();
    names.sort();
    names
}
