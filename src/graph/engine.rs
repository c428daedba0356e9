use crate::error::FlowError;
use crate::graph::augment::augment;
use crate::graph::augmenting_path::{augmenting_path, bottleneck};
use crate::graph::residual::ResidualGraph;
use crate::types::node::path_to_string;
use crate::types::{Capacity, FlowNetwork, NodeId};
use log::{debug, info};

/// A path found by the last search, waiting for the next `step` to apply it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAugmentation {
    pub path: Vec<NodeId>,
    pub bottleneck: Capacity,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StepState {
    #[default]
    Idle,
    Ready,
    PathFound(PendingAugmentation),
    Complete,
}

/// Observable phase of the engine, without the pending payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Idle,
    Ready,
    PathFound,
    Complete,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Ready => "ready",
            Phase::PathFound => "path-found",
            Phase::Complete => "complete",
        }
    }
}

/// What a single `step` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepEvent {
    PathFound {
        path: Vec<NodeId>,
        bottleneck: Capacity,
    },
    Augmented {
        path: Vec<NodeId>,
        bottleneck: Capacity,
        max_flow: Capacity,
        path_count: usize,
    },
    Complete {
        max_flow: Capacity,
    },
}

impl StepEvent {
    pub fn name(&self) -> &'static str {
        match self {
            StepEvent::PathFound { .. } => "path-found",
            StepEvent::Augmented { .. } => "augmented",
            StepEvent::Complete { .. } => "complete",
        }
    }
}

/// Edmonds-Karp, one unit of work per call.
///
/// A `step` either runs one breadth-first search (and stops at `PathFound`)
/// or applies the pending augmentation (and returns to `Ready`). The engine
/// owns the residual graph and the counters; flows live in the
/// `FlowNetwork` handed to each call.
#[derive(Debug, Default, Clone)]
pub struct MaxFlowEngine {
    residual: ResidualGraph,
    max_flow: Capacity,
    path_count: usize,
    state: StepState,
}

impl MaxFlowEngine {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn initialize(&mut self, network: &mut FlowNetwork) -> Result<(), FlowError> {
        if network.is_empty() {
            return Err(FlowError::NoGraphLoaded);
        }
        network.reset_flows();
        self.residual.rebuild(network);
        self.max_flow = 0;
        self.path_count = 0;
        self.state = StepState::Ready;
        info!("Algorithm initialized");
        Ok(())
    }

    pub fn step(&mut self, network: &mut FlowNetwork) -> Result<StepEvent, FlowError> {
        match std::mem::take(&mut self.state) {
            StepState::Idle => Err(FlowError::NotInitialized),
            StepState::Complete => {
                self.state = StepState::Complete;
                Ok(StepEvent::Complete {
                    max_flow: self.max_flow,
                })
            }
            StepState::PathFound(pending) => self.apply(network, pending),
            StepState::Ready => self.search(network),
        }
    }

    /// Back to `Idle` from any state, with zero flow and counters.
    pub fn reset(&mut self, network: &mut FlowNetwork) {
        network.reset_flows();
        self.residual.clear();
        self.max_flow = 0;
        self.path_count = 0;
        self.state = StepState::Idle;
        debug!("Engine reset");
    }

    pub fn residual(&self) -> &ResidualGraph {
        &self.residual
    }

    pub fn current_residual(&self, from: &NodeId, to: &NodeId) -> Capacity {
        self.residual.residual_of(from, to)
    }

    pub fn step_state(&self) -> &StepState {
        &self.state
    }

    pub fn state(&self) -> Phase {
        match self.state {
            StepState::Idle => Phase::Idle,
            StepState::Ready => Phase::Ready,
            StepState::PathFound(_) => Phase::PathFound,
            StepState::Complete => Phase::Complete,
        }
    }

    pub fn pending(&self) -> Option<&PendingAugmentation> {
        match &self.state {
            StepState::PathFound(pending) => Some(pending),
            _ => None,
        }
    }

    pub fn max_flow_value(&self) -> Capacity {
        self.max_flow
    }

    pub fn path_count(&self) -> usize {
        self.path_count
    }

    fn search(&mut self, network: &FlowNetwork) -> Result<StepEvent, FlowError> {
        info!("Searching for augmenting path...");
        let (Some(source), Some(sink)) = (network.source(), network.sink()) else {
            self.state = StepState::Ready;
            return Err(FlowError::NoGraphLoaded);
        };
        match augmenting_path(&self.residual, source, sink) {
            Some(path) => {
                let bottleneck = bottleneck(&self.residual, &path);
                info!(
                    "Path found: {} (bottleneck: {bottleneck})",
                    path_to_string(&path)
                );
                self.state = StepState::PathFound(PendingAugmentation {
                    path: path.clone(),
                    bottleneck,
                });
                Ok(StepEvent::PathFound { path, bottleneck })
            }
            None => {
                info!("Algorithm complete! Maximum flow: {}", self.max_flow);
                self.state = StepState::Complete;
                Ok(StepEvent::Complete {
                    max_flow: self.max_flow,
                })
            }
        }
    }

    fn apply(
        &mut self,
        network: &mut FlowNetwork,
        pending: PendingAugmentation,
    ) -> Result<StepEvent, FlowError> {
        let PendingAugmentation { path, bottleneck } = pending;
        info!(
            "Augmenting flow: {bottleneck} units along {}",
            path_to_string(&path)
        );
        if let Err(e) = augment(network, &mut self.residual, &path, bottleneck) {
            self.state = StepState::PathFound(PendingAugmentation { path, bottleneck });
            return Err(e);
        }
        self.max_flow += bottleneck;
        self.path_count += 1;
        self.state = StepState::Ready;
        Ok(StepEvent::Augmented {
            path,
            bottleneck,
            max_flow: self.max_flow,
            path_count: self.path_count,
        })
    }
}
