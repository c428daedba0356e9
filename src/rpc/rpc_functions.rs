use crate::graph::{network_to_dot, Session, StepEvent, View};
use crate::io::{export_session, parse_graph, to_json, to_matrix, to_simple, GraphFormat};
use crate::presets::{preset, random_graph, PRESET_NAMES};
use crate::rpc::call_context::CallContext;
use crate::types::NodeId;
use json::JsonValue;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::sync::{Mutex, MutexGuard};

pub struct JsonRpcRequest {
    pub id: JsonValue,
    pub method: String,
    pub params: JsonValue,
}

/// Malformed request parameters; answered with "invalid params".
pub struct InputValidationError(String);

impl Error for InputValidationError {}

impl Debug for InputValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Error: {}", self.0)
    }
}

impl Display for InputValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Error: {}", self.0)
    }
}

fn invalid(message: String) -> Box<dyn Error> {
    Box::new(InputValidationError(message))
}

fn lock(session: &Mutex<Session>) -> Result<MutexGuard<'_, Session>, Box<dyn Error>> {
    session
        .lock()
        .map_err(|_| From::from("Session state is poisoned"))
}

pub fn load_graph(
    session: &Mutex<Session>,
    params: &JsonValue,
    call_context: &CallContext,
) -> Result<JsonValue, Box<dyn Error>> {
    let graph = if let Some(name) = params["preset"].as_str() {
        preset(name).ok_or_else(|| {
            invalid(format!(
                "Unknown preset {name}. Available: {}",
                PRESET_NAMES.join(", ")
            ))
        })?
    } else if params["random"].is_object() {
        let random = &params["random"];
        let nodes = random["nodes"]
            .as_usize()
            .ok_or_else(|| invalid("Expected numeric \"random.nodes\"".to_string()))?;
        let density = random["density"]
            .as_u32()
            .ok_or_else(|| invalid("Expected numeric \"random.density\"".to_string()))?;
        random_graph(nodes, density, &mut rand::thread_rng()).map_err(|e| invalid(e.to_string()))?
    } else {
        let text = params["text"]
            .as_str()
            .ok_or_else(|| invalid("Expected \"text\", \"preset\" or \"random\"".to_string()))?;
        let format_name = params["format"].as_str().unwrap_or("simple");
        let format = GraphFormat::from_name(format_name)
            .ok_or_else(|| invalid(format!("Unknown graph format: {format_name}")))?;
        parse_graph(text, format).map_err(|e| invalid(e.to_string()))?
    };
    let notations = json::object! {
        simple: to_simple(&graph),
        json: to_json(&graph)?,
        matrix: to_matrix(&graph),
    };
    let mut session = lock(session)?;
    session.load_spec(graph)?;
    let network = session.network();
    call_context.log_message(&format!(
        "Loaded {} nodes, {} edges",
        network.node_count(),
        network.edge_count()
    ));
    Ok(json::object! {
        nodes: network.node_count(),
        edges: network.edge_count(),
        notations: notations,
    })
}

pub fn initialize(
    session: &Mutex<Session>,
    call_context: &CallContext,
) -> Result<JsonValue, Box<dyn Error>> {
    let mut session = lock(session)?;
    let before = session.state();
    session.initialize()?;
    call_context.log_phase(before, session.state());
    Ok(state_json(&session))
}

/// One engine step, performed entirely while holding the session lock.
pub fn step(session: &Mutex<Session>, call_context: &CallContext) -> Result<JsonValue, Box<dyn Error>> {
    let mut session = lock(session)?;
    let before = session.state();
    let event = session.step()?;
    call_context.log_message(event.name());
    call_context.log_phase(before, session.state());
    Ok(event_json(&event))
}

pub fn reset(session: &Mutex<Session>, call_context: &CallContext) -> Result<JsonValue, Box<dyn Error>> {
    let mut session = lock(session)?;
    let before = session.state();
    session.reset();
    call_context.log_phase(before, session.state());
    Ok(state_json(&session))
}

pub fn state(session: &Mutex<Session>) -> Result<JsonValue, Box<dyn Error>> {
    Ok(state_json(&*lock(session)?))
}

pub fn residual(session: &Mutex<Session>, params: &JsonValue) -> Result<JsonValue, Box<dyn Error>> {
    let from = node_param(params, "from")?;
    let to = node_param(params, "to")?;
    Ok(lock(session)?.current_residual(&from, &to).into())
}

pub fn flow(session: &Mutex<Session>, params: &JsonValue) -> Result<JsonValue, Box<dyn Error>> {
    let edge = params["edge"]
        .as_usize()
        .ok_or_else(|| invalid("Expected numeric \"edge\"".to_string()))?;
    lock(session)?
        .current_flow(edge)
        .map(JsonValue::from)
        .ok_or_else(|| invalid(format!("Unknown edge: {edge}")))
}

pub fn export(session: &Mutex<Session>) -> Result<JsonValue, Box<dyn Error>> {
    Ok(export_session(&*lock(session)?))
}

pub fn dot(session: &Mutex<Session>, params: &JsonValue) -> Result<JsonValue, Box<dyn Error>> {
    let view_name = params["view"].as_str().unwrap_or("flow");
    let view =
        View::from_name(view_name).ok_or_else(|| invalid(format!("Unknown view: {view_name}")))?;
    let session = lock(session)?;
    Ok(network_to_dot(session.network(), session.residual(), view, session.current_path()).into())
}

fn node_param(params: &JsonValue, key: &str) -> Result<NodeId, Box<dyn Error>> {
    params[key]
        .as_str()
        .map(NodeId::from)
        .ok_or_else(|| invalid(format!("Expected node id \"{key}\"")))
}

fn path_json(path: &[NodeId]) -> JsonValue {
    path.iter()
        .map(|n| n.as_str())
        .collect::<Vec<_>>()
        .into()
}

pub fn event_json(event: &StepEvent) -> JsonValue {
    match event {
        StepEvent::PathFound { path, bottleneck } => json::object! {
            event: event.name(),
            path: path_json(path),
            bottleneck: *bottleneck,
        },
        StepEvent::Augmented {
            path,
            bottleneck,
            max_flow,
            path_count,
        } => json::object! {
            event: event.name(),
            path: path_json(path),
            bottleneck: *bottleneck,
            maxFlow: *max_flow,
            pathCount: *path_count,
        },
        StepEvent::Complete { max_flow } => json::object! {
            event: event.name(),
            maxFlow: *max_flow,
        },
    }
}

fn state_json(session: &Session) -> JsonValue {
    let metrics = session.metrics();
    let pending = match session.pending() {
        Some(p) => json::object! {
            path: path_json(&p.path),
            bottleneck: p.bottleneck,
        },
        None => JsonValue::Null,
    };
    json::object! {
        state: session.state().as_str(),
        maxFlow: metrics.max_flow,
        pathCount: metrics.path_count,
        runtimeMs: metrics.runtime_ms as u64,
        density: metrics.density,
        currentPath: path_json(session.current_path()),
        pending: pending,
        history: session.history().iter().map(|p| json::object! {
            path: path_json(&p.path),
            bottleneck: p.bottleneck,
        }).collect::<Vec<_>>(),
        flows: session.network().edges().iter().map(|e| e.flow).collect::<Vec<_>>(),
    }
}
