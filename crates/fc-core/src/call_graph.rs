//! Function call graph and recursion detection

use crate::program::Program;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet, VecDeque};

/// Directed graph of calls between the functions of one document.
///
/// Edges go from caller to callee. Calls to names not defined in the
/// document are recorded separately and have no node.
#[derive(Debug)]
pub struct CallGraph {
    /// The underlying graph
    graph: DiGraph<String, ()>,

    /// Map from function name to node index
    node_map: HashMap<String, NodeIndex>,

    /// Functions that take part in a cycle (including self-calls)
    recursive: HashSet<String>,

    /// Cyclic strongly connected component of each recursive node
    cycle_component: HashMap<NodeIndex, usize>,

    /// Callee names with no definition, per caller
    unresolved: HashMap<String, Vec<String>>,
}

impl CallGraph {
    /// Build the graph for every function in the document
    pub fn build(program: &Program) -> Self {
        let mut graph = DiGraph::new();
        let mut node_map = HashMap::new();

        for function in &program.functions {
            let idx = graph.add_node(function.name.clone());
            node_map.insert(function.name.clone(), idx);
        }

        let mut unresolved: HashMap<String, Vec<String>> = HashMap::new();
        for function in &program.functions {
            let Some(&caller) = node_map.get(&function.name) else {
                continue;
            };
            for callee in function.callees() {
                match node_map.get(callee) {
                    Some(&target) => {
                        graph.add_edge(caller, target, ());
                    }
                    None => unresolved
                        .entry(function.name.clone())
                        .or_default()
                        .push(callee.to_string()),
                }
            }
        }

        let mut recursive = HashSet::new();
        let mut cycle_component = HashMap::new();
        for (id, component) in tarjan_scc(&graph).into_iter().enumerate() {
            let is_cycle = component.len() > 1
                || component
                    .first()
                    .is_some_and(|&idx| graph.contains_edge(idx, idx));
            if is_cycle {
                for idx in component {
                    recursive.insert(graph[idx].clone());
                    cycle_component.insert(idx, id);
                }
            }
        }

        if !recursive.is_empty() {
            log::debug!("recursive functions: {:?}", recursive);
        }

        Self {
            graph,
            node_map,
            recursive,
            cycle_component,
            unresolved,
        }
    }

    /// Whether the function calls itself, directly or indirectly
    pub fn is_recursive(&self, function: &str) -> bool {
        self.recursive.contains(function)
    }

    /// Called names with no definition in the document
    pub fn unresolved_calls(&self, function: &str) -> &[String] {
        self.unresolved
            .get(function)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Shortest call path from `start` back to itself, for error reporting.
    ///
    /// The path stays inside the strongly connected component of `start`.
    pub fn cycle_path(&self, start: &str) -> Option<String> {
        let &start_idx = self.node_map.get(start)?;
        let &component = self.cycle_component.get(&start_idx)?;

        let mut parent: HashMap<NodeIndex, NodeIndex> = HashMap::new();
        let mut queue = VecDeque::from([start_idx]);
        while let Some(current) = queue.pop_front() {
            for target in self.graph.neighbors(current) {
                if self.cycle_component.get(&target) != Some(&component) {
                    continue;
                }
                if target == start_idx {
                    let mut trail = Vec::new();
                    let mut node = current;
                    while node != start_idx {
                        trail.push(node);
                        node = *parent.get(&node)?;
                    }
                    let mut path = vec![start.to_string()];
                    path.extend(trail.iter().rev().map(|&idx| self.graph[idx].clone()));
                    path.push(start.to_string());
                    return Some(path.join(" -> "));
                }
                if !parent.contains_key(&target) {
                    parent.insert(target, current);
                    queue.push_back(target);
                }
            }
        }
        None
    }
}

#[cfg(test)]
#[path = "call_graph_test.rs"]
mod tests;
