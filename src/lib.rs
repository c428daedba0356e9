pub mod error;
pub mod graph;
pub mod io;
pub mod presets;
pub mod rpc;
pub mod server;
pub mod types;

pub use error::FlowError;
