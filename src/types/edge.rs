use crate::types::NodeId;

pub type Capacity = u64;
pub type EdgeId = usize;

/// Structural description of an edge, as handed to `FlowNetwork::load`.
#[derive(Clone, Debug, Hash, PartialEq, Eq, Ord, PartialOrd)]
pub struct EdgeSpec {
    pub from: NodeId,
    pub to: NodeId,
    pub capacity: Capacity,
}

impl EdgeSpec {
    pub fn new(from: impl Into<NodeId>, to: impl Into<NodeId>, capacity: Capacity) -> EdgeSpec {
        EdgeSpec {
            from: from.into(),
            to: to.into(),
            capacity,
        }
    }
}

#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
    pub capacity: Capacity,
    pub flow: Capacity,
}

impl Edge {
    pub fn connects(&self, from: &NodeId, to: &NodeId) -> bool {
        self.from == *from && self.to == *to
    }

    pub fn residual_capacity(&self) -> Capacity {
        self.capacity - self.flow
    }

    pub fn is_saturated(&self) -> bool {
        self.flow >= self.capacity
    }
}

impl From<&EdgeSpec> for Edge {
    fn from(spec: &EdgeSpec) -> Self {
        Edge {
            from: spec.from.clone(),
            to: spec.to.clone(),
            capacity: spec.capacity,
            flow: 0,
        }
    }
}

/// An unvalidated graph: the output of the notation parsers and presets.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GraphSpec {
    pub nodes: Vec<NodeId>,
    pub edges: Vec<EdgeSpec>,
}
