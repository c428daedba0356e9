mod augment;
mod augmenting_path;
mod dot;
mod engine;
mod residual;
mod session;

pub use crate::graph::augment::augment;
pub use crate::graph::augmenting_path::{augmenting_path, bottleneck};
pub use crate::graph::dot::{network_to_dot, View};
pub use crate::graph::engine::{MaxFlowEngine, PendingAugmentation, Phase, StepEvent, StepState};
pub use crate::graph::residual::ResidualGraph;
pub use crate::graph::session::{Session, SessionMetrics};
