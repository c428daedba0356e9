use std::collections::{HashMap, HashSet};
use std::fs::read_to_string;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::graph::Session;
use crate::types::{Capacity, EdgeSpec, GraphSpec, NodeId};

#[derive(Debug, thiserror::Error)]
pub enum GraphInputError {
    #[error("Could not read graph: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid JSON graph: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Format(String),
}

/// Textual graph notations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphFormat {
    /// `s->a:10, a->t:5`
    Simple,
    /// `{"nodes": [...], "edges": [{"u": .., "v": .., "c": ..}]}`
    Json,
    /// Square capacity matrix, rows separated by newlines.
    Matrix,
}

impl GraphFormat {
    pub fn from_name(name: &str) -> Option<GraphFormat> {
        match name {
            "simple" => Some(GraphFormat::Simple),
            "json" => Some(GraphFormat::Json),
            "matrix" => Some(GraphFormat::Matrix),
            _ => None,
        }
    }

    /// Picks a notation from the file extension, falling back to the contents.
    pub fn guess(path: &Path, contents: &str) -> GraphFormat {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => GraphFormat::Json,
            Some("mat") | Some("matrix") => GraphFormat::Matrix,
            _ if contents.trim_start().starts_with('{') => GraphFormat::Json,
            _ if !contents.trim().is_empty()
                && contents
                    .chars()
                    .all(|c| c.is_ascii_digit() || c.is_whitespace()) =>
            {
                GraphFormat::Matrix
            }
            _ => GraphFormat::Simple,
        }
    }
}

pub fn read_graph_file(path: &str, format: Option<GraphFormat>) -> Result<GraphSpec, GraphInputError> {
    let contents = read_to_string(path)?;
    let format = format.unwrap_or_else(|| GraphFormat::guess(Path::new(path), &contents));
    parse_graph(&contents, format)
}

pub fn parse_graph(text: &str, format: GraphFormat) -> Result<GraphSpec, GraphInputError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(GraphInputError::Format(
            "Please enter graph data".to_string(),
        ));
    }
    match format {
        GraphFormat::Simple => parse_simple(text),
        GraphFormat::Json => parse_json(text),
        GraphFormat::Matrix => parse_matrix(text),
    }
}

fn simple_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(\w+)\s*->\s*(\w+)\s*:\s*(\d+)").expect("edge pattern is valid")
    })
}

pub fn parse_simple(text: &str) -> Result<GraphSpec, GraphInputError> {
    let re = simple_pattern();
    let mut edges = Vec::new();
    let mut nodes = Vec::new();
    let mut seen = HashSet::new();
    for part in text.split([',', '\n']).map(str::trim).filter(|p| !p.is_empty()) {
        let Some(captures) = re.captures(part) else {
            return Err(GraphInputError::Format(format!(
                "Invalid format: \"{part}\". Use format: u->v:capacity"
            )));
        };
        let capacity = parse_capacity(&captures[3])?;
        let (from, to) = (NodeId::from(&captures[1]), NodeId::from(&captures[2]));
        for node in [&from, &to] {
            if seen.insert(node.clone()) {
                nodes.push(node.clone());
            }
        }
        edges.push(EdgeSpec { from, to, capacity });
    }
    let (s, t) = (NodeId::from("s"), NodeId::from("t"));
    if seen.contains(&s) && seen.contains(&t) {
        nodes.sort_by(|a, b| {
            let rank = |n: &NodeId| match n.as_str() {
                "s" => 0,
                "t" => 2,
                _ => 1,
            };
            rank(a).cmp(&rank(b)).then_with(|| a.cmp(b))
        });
    }
    Ok(GraphSpec { nodes, edges })
}

#[derive(Deserialize, Serialize, Debug)]
struct JsonGraph {
    nodes: Vec<NodeId>,
    edges: Vec<JsonEdge>,
}

#[derive(Deserialize, Serialize, Debug)]
struct JsonEdge {
    u: NodeId,
    v: NodeId,
    #[serde(skip_serializing_if = "Option::is_none")]
    c: Option<Capacity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    capacity: Option<Capacity>,
}

pub fn parse_json(text: &str) -> Result<GraphSpec, GraphInputError> {
    let graph: JsonGraph = serde_json::from_str(text)?;
    let edges = graph
        .edges
        .into_iter()
        .map(|e| match e.c.or(e.capacity) {
            Some(capacity) => Ok(EdgeSpec {
                from: e.u,
                to: e.v,
                capacity,
            }),
            None => Err(GraphInputError::Format(format!(
                "Edge {}->{} has no capacity",
                e.u, e.v
            ))),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(GraphSpec {
        nodes: graph.nodes,
        edges,
    })
}

pub fn parse_matrix(text: &str) -> Result<GraphSpec, GraphInputError> {
    let matrix = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|line| {
            line.split_whitespace()
                .map(parse_capacity)
                .collect::<Result<Vec<_>, _>>()
        })
        .collect::<Result<Vec<_>, _>>()?;
    let n = matrix.len();
    if n < 2 {
        return Err(GraphInputError::Format(format!(
            "Expected at least a 2x2 matrix, but got {n} row(s)"
        )));
    }
    if let Some((i, row)) = matrix.iter().enumerate().find(|(_, row)| row.len() != n) {
        return Err(GraphInputError::Format(format!(
            "Row {} has {} entries, expected {n}",
            i + 1,
            row.len()
        )));
    }
    let nodes = matrix_node_names(n);
    let mut edges = Vec::new();
    for (i, row) in matrix.iter().enumerate() {
        for (j, capacity) in row.iter().enumerate() {
            if *capacity > 0 {
                edges.push(EdgeSpec {
                    from: nodes[i].clone(),
                    to: nodes[j].clone(),
                    capacity: *capacity,
                });
            }
        }
    }
    Ok(GraphSpec { nodes, edges })
}

/// `s`, then lowercase letters (skipping `s` and `t`), then `t`.
pub(crate) fn matrix_node_names(n: usize) -> Vec<NodeId> {
    let mut letters = ('a'..='z').filter(|c| *c != 's' && *c != 't');
    let mut nodes = vec![NodeId::from("s")];
    for i in 1..n - 1 {
        nodes.push(match letters.next() {
            Some(c) => NodeId::from(c.to_string()),
            None => NodeId::from(format!("n{i}")),
        });
    }
    nodes.push(NodeId::from("t"));
    nodes
}

fn parse_capacity(value: &str) -> Result<Capacity, GraphInputError> {
    value
        .parse::<Capacity>()
        .map_err(|e| GraphInputError::Format(format!("Invalid capacity \"{value}\": {e}")))
}

pub fn to_simple(graph: &GraphSpec) -> String {
    graph
        .edges
        .iter()
        .map(|e| format!("{}->{}:{}", e.from, e.to, e.capacity))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn to_json(graph: &GraphSpec) -> Result<String, GraphInputError> {
    let json = JsonGraph {
        nodes: graph.nodes.clone(),
        edges: graph
            .edges
            .iter()
            .map(|e| JsonEdge {
                u: e.from.clone(),
                v: e.to.clone(),
                c: Some(e.capacity),
                capacity: None,
            })
            .collect(),
    };
    Ok(serde_json::to_string_pretty(&json)?)
}

pub fn to_matrix(graph: &GraphSpec) -> String {
    let index: HashMap<&NodeId, usize> = graph
        .nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (n, i))
        .collect();
    let n = graph.nodes.len();
    let mut matrix = vec![vec![0; n]; n];
    for e in &graph.edges {
        if let (Some(i), Some(j)) = (index.get(&e.from), index.get(&e.to)) {
            matrix[*i][*j] = e.capacity;
        }
    }
    matrix
        .iter()
        .map(|row| {
            row.iter()
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Snapshot of a session: the graph with current flows plus the counters.
pub fn export_session(session: &Session) -> json::JsonValue {
    let network = session.network();
    let graph = json::object! {
        nodes: network.nodes().iter().map(|n| json::object! { id: n.as_str() }).collect::<Vec<_>>(),
        edges: network.edges().iter().enumerate().map(|(i, e)| json::object! {
            id: i,
            u: e.from.as_str(),
            v: e.to.as_str(),
            capacity: e.capacity,
            flow: e.flow,
        }).collect::<Vec<_>>(),
    };
    json::object! {
        graph: graph,
        maxFlow: session.max_flow_value(),
        pathCount: session.path_count(),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::presets::preset;

    #[test]
    fn simple_notation_orders_source_and_sink() {
        let graph = parse_simple("b->t:4, s->b:3\nt->a:1").unwrap();
        assert_eq!(
            graph.nodes,
            vec!["s", "a", "b", "t"]
                .into_iter()
                .map(NodeId::from)
                .collect::<Vec<_>>()
        );
        assert_eq!(graph.edges[0], EdgeSpec::new("b", "t", 4));
        assert_eq!(graph.edges.len(), 3);
    }

    #[test]
    fn simple_notation_keeps_first_seen_order_without_s_and_t() {
        let graph = parse_simple("x->y:1, y->z:2").unwrap();
        assert_eq!(
            graph.nodes,
            vec![NodeId::from("x"), NodeId::from("y"), NodeId::from("z")]
        );
    }

    #[test]
    fn simple_pattern_is_compiled_once() {
        assert!(std::ptr::eq(simple_pattern(), simple_pattern()));
        for _ in 0..3 {
            assert_eq!(parse_simple("s->t:1").unwrap().edges.len(), 1);
        }
    }

    #[test]
    fn simple_notation_rejects_garbage() {
        let err = parse_simple("s->a:1, s=>t").unwrap_err();
        assert!(err.to_string().contains("s=>t"));
    }

    #[test]
    fn json_notation_accepts_both_capacity_keys() {
        let graph = parse_json(
            r#"{"nodes": ["s", "t"], "edges": [{"u": "s", "v": "t", "capacity": 7}, {"u": "t", "v": "s", "c": 2}]}"#,
        )
        .unwrap();
        assert_eq!(
            graph.edges,
            vec![EdgeSpec::new("s", "t", 7), EdgeSpec::new("t", "s", 2)]
        );
        assert!(parse_json(r#"{"nodes": ["s", "t"], "edges": [{"u": "s", "v": "t"}]}"#).is_err());
    }

    #[test]
    fn matrix_notation() {
        let graph = parse_matrix("0 3 2\n0 0 4\n0 0 0").unwrap();
        assert_eq!(
            graph.nodes,
            vec![NodeId::from("s"), NodeId::from("a"), NodeId::from("t")]
        );
        assert_eq!(
            graph.edges,
            vec![
                EdgeSpec::new("s", "a", 3),
                EdgeSpec::new("s", "t", 2),
                EdgeSpec::new("a", "t", 4)
            ]
        );
        assert!(parse_matrix("0 1\n0").is_err());
        assert!(parse_matrix("0 x\n0 0").is_err());
    }

    #[test]
    fn large_matrix_names_do_not_collide() {
        let names = matrix_node_names(30);
        let unique = names.iter().collect::<HashSet<_>>();
        assert_eq!(unique.len(), 30);
        assert_eq!(names[0], NodeId::from("s"));
        assert_eq!(names[29], NodeId::from("t"));
    }

    #[test]
    fn writers_agree_with_parsers() {
        let graph = preset("medium").unwrap();
        assert_eq!(parse_simple(&to_simple(&graph)).unwrap().edges, graph.edges);
        assert_eq!(parse_json(&to_json(&graph).unwrap()).unwrap(), graph);
        assert_eq!(parse_matrix(&to_matrix(&graph)).unwrap().edges.len(), graph.edges.len());
    }

    #[test]
    fn guesses_format() {
        assert_eq!(GraphFormat::guess(Path::new("g.json"), ""), GraphFormat::Json);
        assert_eq!(GraphFormat::guess(Path::new("g"), "0 1\n0 0"), GraphFormat::Matrix);
        assert_eq!(GraphFormat::guess(Path::new("g"), " {\"nodes\": []}"), GraphFormat::Json);
        assert_eq!(GraphFormat::guess(Path::new("g.txt"), "s->t:1"), GraphFormat::Simple);
    }

    #[test]
    fn export_reports_flows_and_counters() {
        let mut session = Session::with_graph(preset("simple").unwrap()).unwrap();
        session.initialize().unwrap();
        session.run_to_completion(100).unwrap();
        let export = export_session(&session);
        assert_eq!(export["maxFlow"].as_u64(), Some(15));
        assert_eq!(export["pathCount"].as_usize(), Some(2));
        assert_eq!(export["graph"]["edges"][0]["flow"].as_u64(), Some(10));
        assert_eq!(export["graph"]["nodes"][3]["id"].as_str(), Some("t"));
    }
}
