//! The Distance Graph.
//!
//! An undirected graph over entity keys whose edges mark "directly related"
//! pairs confirmed during one search. It is a witness structure: the
//! shortest path between the two endpoints is the distance being reported.

use data_loader::EntityKey;
use petgraph::algo::astar;
use petgraph::graph::{NodeIndex, UnGraph};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct DistanceGraph {
    graph: UnGraph<EntityKey, ()>,
    node_index: HashMap<EntityKey, NodeIndex>,
}

impl DistanceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: EntityKey) {
        self.index_of(&node);
    }

    /// Connect two nodes, adding them if needed. A self edge only registers the node.
    pub fn add_edge(&mut self, a: &EntityKey, b: &EntityKey) {
        let from = self.index_of(a);
        if a == b {
            return;
        }
        let to = self.index_of(b);
        self.graph.update_edge(from, to, ());
    }

    pub fn contains_node(&self, node: &EntityKey) -> bool {
        self.node_index.contains_key(node)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn neighbors(&self, node: &EntityKey) -> impl Iterator<Item = &EntityKey> {
        self.node_index
            .get(node)
            .into_iter()
            .flat_map(move |&idx| self.graph.neighbors(idx).map(move |n| &self.graph[n]))
    }

    /// Number of edges on the shortest path, `None` if the nodes are not connected
    pub fn shortest_path_len(&self, from: &EntityKey, to: &EntityKey) -> Option<u32> {
        self.search(from, to).map(|(cost, _)| cost)
    }

    /// Nodes along a shortest path from `from` to `to`, both included
    pub fn shortest_path(&self, from: &EntityKey, to: &EntityKey) -> Option<Vec<EntityKey>> {
        self.search(from, to)
            .map(|(_, path)| path.into_iter().map(|idx| self.graph[idx].clone()).collect())
    }

    /// Unit-weight A* with a zero heuristic
    fn search(&self, from: &EntityKey, to: &EntityKey) -> Option<(u32, Vec<NodeIndex>)> {
        let start = *self.node_index.get(from)?;
        let goal = *self.node_index.get(to)?;
        astar(&self.graph, start, |n| n == goal, |_| 1u32, |_| 0)
    }

    fn index_of(&mut self, node: &EntityKey) -> NodeIndex {
        if let Some(&idx) = self.node_index.get(node) {
            return idx;
        }
        let idx = self.graph.add_node(node.clone());
        self.node_index.insert(node.clone(), idx);
        idx
    }
}
