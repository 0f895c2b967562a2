//! Host runtime adapters.

pub mod node;

pub use node::NodeHost;
