//! DAG extraction: classification of named variables, orchestration of the
//! frontier resolution, and the descriptor output contract.

pub mod builder;
pub mod descriptor;
pub mod error;
pub mod index;

pub use builder::DagBuilder;
pub use descriptor::{DistDescriptor, DistSummary, ModelDag, ParentRef, VariableDescriptor};
pub use error::DagError;
pub use index::{Category, GraphIndex};
