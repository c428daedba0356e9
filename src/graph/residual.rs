use crate::types::{Capacity, FlowNetwork, NodeId};
use std::collections::HashMap;

/// Residual capacities derived from the current flow of a `FlowNetwork`.
///
/// For an edge u->v with capacity c and flow f, the entry u->v holds c - f
/// and the entry v->u accumulates f. Neighbors keep insertion order: forward
/// neighbors in edge definition order, then reverse-only neighbors.
#[derive(Debug, Default, Clone)]
pub struct ResidualGraph {
    adjacencies: HashMap<NodeId, Vec<(NodeId, Capacity)>>,
}

impl ResidualGraph {
    pub fn new() -> Self {
        Default::default()
    }

    /// Builds the projection of `network` from scratch.
    pub fn from_network(network: &FlowNetwork) -> Self {
        let mut residual = ResidualGraph::new();
        residual.rebuild(network);
        residual
    }

    pub fn rebuild(&mut self, network: &FlowNetwork) {
        self.adjacencies = network
            .nodes()
            .iter()
            .map(|node| (node.clone(), Vec::new()))
            .collect();
        // A later parallel edge never shadows the first one, which is the
        // edge augmentation writes to.
        for edge in network.edges() {
            let forward = self.adjacencies.entry(edge.from.clone()).or_default();
            if !forward.iter().any(|(to, _)| *to == edge.to) {
                forward.push((edge.to.clone(), edge.residual_capacity()));
            }
        }
        for edge in network.edges() {
            let backward = self.adjacencies.entry(edge.to.clone()).or_default();
            match backward.iter_mut().find(|(to, _)| *to == edge.from) {
                Some((_, capacity)) => *capacity += edge.flow,
                None => backward.push((edge.from.clone(), edge.flow)),
            }
        }
    }

    pub fn clear(&mut self) {
        self.adjacencies.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.adjacencies.is_empty()
    }

    /// Residual capacity from `from` to `to`; zero for pairs with no entry.
    pub fn residual_of(&self, from: &NodeId, to: &NodeId) -> Capacity {
        self.adjacencies
            .get(from)
            .and_then(|out| out.iter().find(|(node, _)| node == to))
            .map(|(_, capacity)| *capacity)
            .unwrap_or_default()
    }

    /// All neighbor entries of `from` in iteration order, zero entries included.
    pub fn neighbors(&self, from: &NodeId) -> &[(NodeId, Capacity)] {
        self.adjacencies
            .get(from)
            .map(|out| out.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_adjacent(&self, from: &NodeId, to: &NodeId) -> bool {
        self.residual_of(from, to) > 0
    }
}
