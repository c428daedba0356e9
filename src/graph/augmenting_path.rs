use crate::graph::residual::ResidualGraph;
use crate::types::{Capacity, NodeId};
use std::collections::{HashMap, HashSet, VecDeque};

/// Breadth-first search for a shortest source-sink path over edges with
/// positive residual capacity.
///
/// Returns `None` once the frontier is exhausted without reaching the sink.
/// Among several shortest paths, the one through the earliest neighbor
/// entries of `ResidualGraph::neighbors` wins.
pub fn augmenting_path(
    residual: &ResidualGraph,
    source: &NodeId,
    sink: &NodeId,
) -> Option<Vec<NodeId>> {
    if *source == *sink {
        return None;
    }
    let mut visited = HashSet::from([source.clone()]);
    let mut parent = HashMap::new();
    let mut queue = VecDeque::from([source.clone()]);
    while let Some(node) = queue.pop_front() {
        for (target, capacity) in residual.neighbors(&node) {
            if *capacity == 0 || visited.contains(target) {
                continue;
            }
            visited.insert(target.clone());
            parent.insert(target.clone(), node.clone());
            if target == sink {
                return Some(trace(&parent, source, sink));
            }
            queue.push_back(target.clone());
        }
    }
    None
}

/// Smallest residual capacity between consecutive nodes of `path`.
///
/// Panics on paths with fewer than two nodes.
pub fn bottleneck(residual: &ResidualGraph, path: &[NodeId]) -> Capacity {
    assert!(path.len() >= 2, "an augmenting path has at least two nodes");
    path.windows(2)
        .map(|pair| residual.residual_of(&pair[0], &pair[1]))
        .min()
        .unwrap_or_default()
}

fn trace(parent: &HashMap<NodeId, NodeId>, source: &NodeId, sink: &NodeId) -> Vec<NodeId> {
    let mut t = vec![sink.clone()];
    let mut node = sink;
    while node != source {
        node = &parent[node];
        t.push(node.clone());
    }
    t.reverse();
    t
}
