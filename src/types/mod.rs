pub mod edge;
pub mod network;
pub mod node;

pub use edge::{Capacity, Edge, EdgeId, EdgeSpec, GraphSpec};
pub use network::FlowNetwork;
pub use node::NodeId;
