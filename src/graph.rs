//! Dependency graph between attributes.
//!
//! Derived attributes (combat power) depend on plain ones. The resolver
//! builds an [`AttrGraph`] from its transforms and resolves attributes in
//! topological order.

use crate::attr_id::AttrId;
use crate::error::StatError;
use petgraph::algo::{kosaraju_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

/// Directed acyclic graph of attribute dependencies.
///
/// An edge runs from a dependency to its dependent, so a topological sort
/// lists dependencies first.
///
/// # Examples
///
/// ```rust
/// use xianlu::graph::AttrGraph;
/// use xianlu::AttrId;
///
/// let atk = AttrId::from_str("攻击力");
/// let power = AttrId::from_str("战斗力");
///
/// let mut graph = AttrGraph::new();
/// graph.add_edge(power.clone(), atk.clone());
///
/// let order = graph.topological_sort().unwrap();
/// assert_eq!(order, vec![atk, power]);
/// ```
#[derive(Debug, Default)]
pub struct AttrGraph {
    graph: DiGraph<AttrId, ()>,
    node_map: HashMap<AttrId, NodeIndex>,
}

impl AttrGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node, returning the existing index if it is already present.
    pub fn add_node(&mut self, attr: AttrId) -> NodeIndex {
        if let Some(&idx) = self.node_map.get(&attr) {
            return idx;
        }
        let idx = self.graph.add_node(attr.clone());
        self.node_map.insert(attr, idx);
        idx
    }

    /// Record that `dependent` needs `dependency` resolved first.
    pub fn add_edge(&mut self, dependent: AttrId, dependency: AttrId) {
        let from = self.add_node(dependency);
        let to = self.add_node(dependent);
        self.graph.update_edge(from, to, ());
    }

    /// Whether `attr` is a node of the graph.
    pub fn contains(&self, attr: &AttrId) -> bool {
        self.node_map.contains_key(attr)
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// Whether the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Fail with the members of the first cycle found, if any.
    ///
    /// A self-loop counts as a cycle of length one.
    pub fn detect_cycles(&self) -> Result<(), StatError> {
        for component in kosaraju_scc(&self.graph) {
            let is_cycle = component.len() > 1
                || self.graph.find_edge(component[0], component[0]).is_some();
            if is_cycle {
                let mut path: Vec<AttrId> = component
                    .iter()
                    .map(|&idx| self.graph[idx].clone())
                    .collect();
                path.sort();
                path.push(path[0].clone());
                return Err(StatError::Cycle { path });
            }
        }
        Ok(())
    }

    /// Resolution order: every attribute after all of its dependencies.
    pub fn topological_sort(&self) -> Result<Vec<AttrId>, StatError> {
        self.detect_cycles()?;
        toposort(&self.graph, None)
            .map(|indices| {
                indices
                    .into_iter()
                    .map(|idx| self.graph[idx].clone())
                    .collect()
            })
            .map_err(|cycle| StatError::Cycle {
                path: vec![self.graph[cycle.node_id()].clone()],
            })
    }
}
