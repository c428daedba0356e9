use crate::error::FlowError;
use crate::graph::engine::{MaxFlowEngine, PendingAugmentation, Phase, StepEvent};
use crate::graph::residual::ResidualGraph;
use crate::types::{Capacity, EdgeId, EdgeSpec, FlowNetwork, GraphSpec, NodeId};
use log::info;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionMetrics {
    pub max_flow: Capacity,
    pub path_count: usize,
    pub runtime_ms: u128,
    pub density: f64,
}

/// One visualization session: a flow network, the engine stepping over it,
/// and the trail of augmentations applied so far.
#[derive(Debug, Default)]
pub struct Session {
    network: FlowNetwork,
    engine: MaxFlowEngine,
    history: Vec<PendingAugmentation>,
    current_path: Vec<NodeId>,
    started: Option<Instant>,
}

impl Session {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_graph(spec: GraphSpec) -> Result<Self, FlowError> {
        let mut session = Session::new();
        session.load_spec(spec)?;
        Ok(session)
    }

    /// Replaces the graph and puts the engine back to `Idle`.
    pub fn load(&mut self, nodes: Vec<NodeId>, edges: Vec<EdgeSpec>) -> Result<(), FlowError> {
        self.network.load(nodes, edges)?;
        self.reset();
        info!(
            "Graph loaded successfully ({} nodes, {} edges)",
            self.network.node_count(),
            self.network.edge_count()
        );
        Ok(())
    }

    pub fn load_spec(&mut self, spec: GraphSpec) -> Result<(), FlowError> {
        self.load(spec.nodes, spec.edges)
    }

    pub fn initialize(&mut self) -> Result<(), FlowError> {
        self.engine.initialize(&mut self.network)?;
        self.history.clear();
        self.current_path.clear();
        self.started = Some(Instant::now());
        Ok(())
    }

    pub fn step(&mut self) -> Result<StepEvent, FlowError> {
        let event = self.engine.step(&mut self.network)?;
        match &event {
            StepEvent::PathFound { path, .. } => self.current_path = path.clone(),
            StepEvent::Augmented {
                path, bottleneck, ..
            } => self.history.push(PendingAugmentation {
                path: path.clone(),
                bottleneck: *bottleneck,
            }),
            StepEvent::Complete { .. } => {}
        }
        Ok(event)
    }

    /// Steps until the engine reports completion, at most `max_steps` times.
    pub fn run_to_completion(&mut self, max_steps: usize) -> Result<Vec<StepEvent>, FlowError> {
        let mut events = Vec::new();
        for _ in 0..max_steps {
            let event = self.step()?;
            let done = matches!(event, StepEvent::Complete { .. });
            events.push(event);
            if done {
                break;
            }
        }
        Ok(events)
    }

    pub fn reset(&mut self) {
        self.engine.reset(&mut self.network);
        self.history.clear();
        self.current_path.clear();
        self.started = None;
    }

    pub fn current_residual(&self, from: &NodeId, to: &NodeId) -> Capacity {
        self.engine.current_residual(from, to)
    }

    pub fn current_flow(&self, edge: EdgeId) -> Option<Capacity> {
        self.network.flow(edge)
    }

    pub fn state(&self) -> Phase {
        self.engine.state()
    }

    pub fn max_flow_value(&self) -> Capacity {
        self.engine.max_flow_value()
    }

    pub fn path_count(&self) -> usize {
        self.engine.path_count()
    }

    pub fn network(&self) -> &FlowNetwork {
        &self.network
    }

    pub fn residual(&self) -> &ResidualGraph {
        self.engine.residual()
    }

    pub fn pending(&self) -> Option<&PendingAugmentation> {
        self.engine.pending()
    }

    pub fn history(&self) -> &[PendingAugmentation] {
        &self.history
    }

    pub fn current_path(&self) -> &[NodeId] {
        &self.current_path
    }

    pub fn metrics(&self) -> SessionMetrics {
        SessionMetrics {
            max_flow: self.max_flow_value(),
            path_count: self.path_count(),
            runtime_ms: self
                .started
                .map(|s| s.elapsed().as_millis())
                .unwrap_or_default(),
            density: self.network.density(),
        }
    }
}
