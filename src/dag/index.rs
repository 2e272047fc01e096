//! index.rs
//! Partitions a model's named variables into output categories and
//! separates pass-through nodes from terminal variables.

use crate::store::{Model, NodeId};
use serde::{Serialize, Deserialize};

/// Membership category of a named variable at build time.
///
/// Classification is an exclusive first-match chain in the declaration
/// order below; a node satisfying several membership predicates takes the
/// earliest one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Free,
    Observed,
    Deterministic,
    Potential,
    Imputed,
    /// Fallback; variables classified as unknown are excluded from output.
    Unknown,
}

/// Read-only classification index over a model's named variables.
pub struct GraphIndex<'a> {
    model: &'a Model,
}

impl<'a> GraphIndex<'a> {
    pub fn new(model: &'a Model) -> Self {
        Self { model }
    }

    /// Classifies a named variable. No side effects.
    pub fn classify(&self, var: NodeId) -> Category {
        let m = self.model;
        if m.free_vars.contains(&var) {
            Category::Free
        } else if m.observed_vars.contains(&var) {
            Category::Observed
        } else if m.deterministics.contains(&var) {
            Category::Deterministic
        } else if m.potentials.contains(&var) {
            Category::Potential
        } else if m.imputed_vars.contains(&var) {
            Category::Imputed
        } else {
            Category::Unknown
        }
    }

    /// A terminal variable carries either a transform-target relationship
    /// or an attached log-density; anything named lacking both is a
    /// deterministic pass-through.
    pub fn is_terminal(&self, var: NodeId) -> bool {
        self.model.transformed.contains_key(&var) || self.model.logp.contains_key(&var)
    }

    /// Named variables other than `var` that are pass-throughs, in
    /// registration order. These are the candidates that may have to be
    /// treated either as parents in their own right or as transparent hops.
    pub fn pass_throughs(&self, var: NodeId) -> Vec<NodeId> {
        self.model
            .named_vars
            .iter()
            .copied()
            .filter(|&v| v != var && !self.is_terminal(v))
            .collect()
    }
}
