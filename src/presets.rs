use std::collections::HashSet;

use rand::Rng;

use crate::error::FlowError;
use crate::io::matrix_node_names;
use crate::types::{Capacity, EdgeSpec, GraphSpec, NodeId};

pub const PRESET_NAMES: [&str; 4] = ["simple", "medium", "complex", "dense"];

/// One of the built-in example graphs, by name.
pub fn preset(name: &str) -> Option<GraphSpec> {
    match name {
        "simple" => Some(build(
            &["s", "a", "b", "t"],
            &[("s", "a", 10), ("s", "b", 5), ("a", "t", 10), ("b", "t", 10)],
        )),
        "medium" => Some(build(
            &["s", "a", "b", "c", "d", "t"],
            &[
                ("s", "a", 16),
                ("s", "c", 13),
                ("a", "b", 12),
                ("b", "c", 9),
                ("b", "t", 20),
                ("c", "d", 14),
                ("d", "b", 7),
                ("d", "t", 4),
            ],
        )),
        "complex" => Some(build(
            &["s", "a", "b", "c", "d", "e", "f", "t"],
            &[
                ("s", "a", 10),
                ("s", "b", 10),
                ("a", "c", 4),
                ("a", "d", 8),
                ("b", "d", 9),
                ("c", "e", 6),
                ("d", "e", 10),
                ("d", "f", 10),
                ("e", "t", 10),
                ("f", "t", 10),
            ],
        )),
        "dense" => Some(build(
            &["s", "a", "b", "c", "d", "t"],
            &[
                ("s", "a", 7),
                ("s", "b", 4),
                ("s", "c", 5),
                ("a", "b", 3),
                ("a", "d", 8),
                ("b", "c", 2),
                ("b", "d", 5),
                ("c", "d", 6),
                ("c", "t", 9),
                ("d", "t", 12),
            ],
        )),
        _ => None,
    }
}

fn build(nodes: &[&str], edges: &[(&str, &str, Capacity)]) -> GraphSpec {
    GraphSpec {
        nodes: nodes.iter().map(|n| NodeId::from(*n)).collect(),
        edges: edges
            .iter()
            .map(|(u, v, c)| EdgeSpec::new(*u, *v, *c))
            .collect(),
    }
}

/// A random DAG on `node_count` nodes named like matrix input.
///
/// The chain `s -> a -> ... -> t` keeps the sink reachable. Further edges
/// only point forward in node order and are added until
/// `floor(n(n-1)/2 * density_percent / 100)` edges exist. Capacities are
/// drawn from 5..=19.
pub fn random_graph(
    node_count: usize,
    density_percent: u32,
    rng: &mut impl Rng,
) -> Result<GraphSpec, FlowError> {
    if node_count < 2 {
        return Err(FlowError::InvalidGraph(format!(
            "Expected at least 2 nodes, but got {node_count}"
        )));
    }
    if density_percent > 100 {
        return Err(FlowError::InvalidGraph(format!(
            "Density must be a percentage, but got {density_percent}"
        )));
    }
    let nodes = matrix_node_names(node_count);
    let max_edges = node_count * (node_count - 1) / 2;
    let target_edges = max_edges * density_percent as usize / 100;

    let mut pairs = (0..node_count - 1).map(|i| (i, i + 1)).collect::<Vec<_>>();
    let mut seen = pairs.iter().copied().collect::<HashSet<_>>();
    while pairs.len() < target_edges {
        let u = rng.gen_range(0..node_count - 1);
        let v = rng.gen_range(u + 1..node_count);
        if seen.insert((u, v)) {
            pairs.push((u, v));
        }
    }
    Ok(GraphSpec {
        edges: pairs
            .into_iter()
            .map(|(u, v)| EdgeSpec {
                from: nodes[u].clone(),
                to: nodes[v].clone(),
                capacity: rng.gen_range(5..=19),
            })
            .collect(),
        nodes,
    })
}
