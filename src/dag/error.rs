use crate::store::NodeId;
use thiserror::Error;

/// Fatal errors raised during DAG extraction.
///
/// Extraction is pure and deterministic, so none of these are retryable;
/// the whole build aborts with no partial output.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DagError {
    /// No self-consistent frontier exists for a variable's ancestor set
    /// within the candidate budget. Indicates a malformed graph or an
    /// untracked node type.
    #[error("could not traverse graph for '{var}' after {candidates} candidate frontiers (pass-through candidates: {pass_throughs:?})")]
    GraphTraversal {
        var: String,
        candidates: usize,
        pass_throughs: Vec<String>,
    },

    /// A frontier node could not be mapped to a named variable or a
    /// transform target.
    #[error("do not know what to do with node {node:?} while resolving parents of '{var}'")]
    UnrecognizedNode { node: NodeId, var: String },

    /// A node flagged as a zero-rank constant could not be evaluated.
    #[error("constant node {node:?} cannot be evaluated to a scalar")]
    ConstantEvaluation { node: NodeId },

    /// Defensive check: the model's node registry is inconsistent.
    #[error("malformed model: {0}")]
    MalformedModel(String),
}
