use crate::graph::residual::ResidualGraph;
use crate::types::{FlowNetwork, NodeId};
use std::fmt::Write;

/// Which number an edge label shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    /// `flow/capacity`
    #[default]
    Flow,
    /// `r:<residual>` of the structural direction
    Residual,
}

impl View {
    pub fn from_name(name: &str) -> Option<View> {
        match name {
            "flow" => Some(View::Flow),
            "residual" => Some(View::Residual),
            _ => None,
        }
    }
}

pub fn network_to_dot(
    network: &FlowNetwork,
    residual: &ResidualGraph,
    view: View,
    highlighted_path: &[NodeId],
) -> String {
    let in_path = |from: &NodeId, to: &NodeId| {
        highlighted_path
            .windows(2)
            .any(|pair| pair[0] == *from && pair[1] == *to)
    };
    let mut out = String::from("digraph flow {\n    rankdir=LR;\n");
    let last = network.node_count().saturating_sub(1);
    for (i, node) in network.nodes().iter().enumerate() {
        let id = quoted(node);
        let mut attrs = vec![format!("label={id}")];
        if i == 0 || i == last {
            attrs.push("shape=doublecircle".to_string());
        }
        if highlighted_path.contains(node) {
            attrs.push("color=forestgreen".to_string());
        }
        // Writing into a String cannot fail.
        let _ = writeln!(out, "    {id} [{}];", attrs.join(","));
    }
    for edge in network.edges() {
        let label = match view {
            View::Flow => format!("{}/{}", edge.flow, edge.capacity),
            View::Residual => format!("r:{}", residual.residual_of(&edge.from, &edge.to)),
        };
        let style = if in_path(&edge.from, &edge.to) {
            ",color=forestgreen,penwidth=3"
        } else if edge.is_saturated() {
            ",color=slategray,fontcolor=slategray"
        } else {
            ""
        };
        let _ = writeln!(
            out,
            "    {} -> {} [label=\"{label}\"{style}];",
            quoted(&edge.from),
            quoted(&edge.to)
        );
    }
    out.push_str("}\n");
    out
}

/// A Graphviz double-quoted string for `node`.
fn quoted(node: &NodeId) -> String {
    format!(
        "\"{}\"",
        node.as_str().replace('\\', "\\\\").replace('"', "\\\"")
    )
}
