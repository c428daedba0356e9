use std::collections::{HashMap, HashSet};

use crate::error::FlowError;
use crate::types::{Capacity, Edge, EdgeId, EdgeSpec, NodeId};

/// The capacitated graph and the current flow on each of its edges.
///
/// Nodes keep their load order: the first one is the source, the last one
/// the sink. Edge ids are indices into the edge sequence and stay valid until
/// the next `load`.
#[derive(Debug, Default, Clone)]
pub struct FlowNetwork {
    nodes: Vec<NodeId>,
    edges: Vec<Edge>,
    outgoing: HashMap<NodeId, Vec<EdgeId>>,
    incoming: HashMap<NodeId, Vec<EdgeId>>,
}

impl FlowNetwork {
    pub fn new() -> FlowNetwork {
        Default::default()
    }

    /// Replaces the contents of the network. Every flow starts at zero.
    ///
    /// Nothing is changed if the input is rejected.
    pub fn load(&mut self, nodes: Vec<NodeId>, edges: Vec<EdgeSpec>) -> Result<(), FlowError> {
        validate(&nodes, &edges)?;
        let edges = edges.iter().map(Edge::from).collect::<Vec<_>>();
        self.outgoing = outgoing_index(&edges);
        self.incoming = incoming_index(&edges);
        self.nodes = nodes;
        self.edges = edges;
        Ok(())
    }

    pub fn reset_flows(&mut self) {
        for edge in &mut self.edges {
            edge.flow = 0;
        }
    }

    /// First edge going exactly from `from` to `to`.
    pub fn find_edge(&self, from: &NodeId, to: &NodeId) -> Option<EdgeId> {
        self.outgoing.get(from).and_then(|out| {
            out.iter()
                .copied()
                .find(|i| self.edges[*i].connects(from, to))
        })
    }

    pub fn source(&self) -> Option<&NodeId> {
        self.nodes.first()
    }

    pub fn sink(&self) -> Option<&NodeId> {
        self.nodes.last()
    }

    pub fn nodes(&self) -> &Vec<NodeId> {
        &self.nodes
    }

    pub fn edges(&self) -> &Vec<Edge> {
        &self.edges
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id)
    }

    pub fn flow(&self, id: EdgeId) -> Option<Capacity> {
        self.edges.get(id).map(|e| e.flow)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains_node(&self, node: &NodeId) -> bool {
        self.nodes.contains(node)
    }

    pub fn inflow(&self, node: &NodeId) -> Capacity {
        self.incident(&self.incoming, node).map(|e| e.flow).sum()
    }

    pub fn outflow(&self, node: &NodeId) -> Capacity {
        self.incident(&self.outgoing, node).map(|e| e.flow).sum()
    }

    pub fn in_degree(&self, node: &NodeId) -> usize {
        self.incident(&self.incoming, node).count()
    }

    pub fn out_degree(&self, node: &NodeId) -> usize {
        self.incident(&self.outgoing, node).count()
    }

    /// Edge count as a percentage of the `V * (V - 1)` possible directed edges.
    pub fn density(&self) -> f64 {
        let n = self.nodes.len();
        if n < 2 {
            return 0.0;
        }
        self.edges.len() as f64 / (n * (n - 1)) as f64 * 100.0
    }

    pub(crate) fn add_flow(&mut self, id: EdgeId, amount: Capacity) {
        let edge = &mut self.edges[id];
        debug_assert!(edge.flow + amount <= edge.capacity);
        edge.flow += amount;
    }

    pub(crate) fn cancel_flow(&mut self, id: EdgeId, amount: Capacity) {
        let edge = &mut self.edges[id];
        debug_assert!(amount <= edge.flow);
        edge.flow -= amount;
    }

    fn incident<'a>(
        &'a self,
        index: &'a HashMap<NodeId, Vec<EdgeId>>,
        node: &NodeId,
    ) -> impl Iterator<Item = &'a Edge> + 'a {
        index
            .get(node)
            .into_iter()
            .flatten()
            .map(move |i| &self.edges[*i])
    }
}

fn validate(nodes: &[NodeId], edges: &[EdgeSpec]) -> Result<(), FlowError> {
    if nodes.len() < 2 {
        return Err(FlowError::InvalidGraph(format!(
            "Expected at least 2 nodes, but got {}",
            nodes.len()
        )));
    }
    let mut declared = HashSet::new();
    for node in nodes {
        if !declared.insert(node) {
            return Err(FlowError::InvalidGraph(format!(
                "Node {node} is declared more than once"
            )));
        }
    }
    // Every flow value, residual entry and node balance is bounded by this sum.
    let mut total: Capacity = 0;
    for EdgeSpec { from, to, capacity } in edges {
        for endpoint in [from, to] {
            if !declared.contains(endpoint) {
                return Err(FlowError::InvalidGraph(format!(
                    "Edge {from}->{to} references undeclared node {endpoint}"
                )));
            }
        }
        total = total.checked_add(*capacity).ok_or_else(|| {
            FlowError::InvalidGraph(format!(
                "Total capacity exceeds {} at edge {from}->{to}",
                Capacity::MAX
            ))
        })?;
    }
    Ok(())
}

fn outgoing_index(edges: &[Edge]) -> HashMap<NodeId, Vec<EdgeId>> {
    let mut index: HashMap<NodeId, Vec<EdgeId>> = HashMap::new();
    for (i, e) in edges.iter().enumerate() {
        index.entry(e.from.clone()).or_default().push(i)
    }
    index
}

fn incoming_index(edges: &[Edge]) -> HashMap<NodeId, Vec<EdgeId>> {
    let mut index: HashMap<NodeId, Vec<EdgeId>> = HashMap::new();
    for (i, e) in edges.iter().enumerate() {
        index.entry(e.to.clone()).or_default().push(i)
    }
    index
}
