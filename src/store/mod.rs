//! Columnar storage for the tensor computation graph and the model view
//! layered over it.

pub mod model;
pub mod registry;
pub mod types;

pub use model::Model;
pub use registry::Registry;
pub use types::{DistKind, Distribution, NodeId, NodeKind, NodeMetadata, Operation};
