//! model.rs
//! The probabilistic-model view over a `Registry`: which nodes are named
//! variables, how they partition into membership categories, and the
//! side relations (log-density nodes, transform targets, distributions,
//! coordinate metadata) the DAG extraction needs.

use super::registry::Registry;
use super::types::*;
use serde::{Serialize, Deserialize};
use std::collections::{HashMap, HashSet};

/// An immutable snapshot of a probabilistic program.
///
/// Passed by reference into every analysis component; there is no
/// process-wide "current model" registry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Model {
    pub registry: Registry,

    /// All named variables, in registration order. Includes transformed-space
    /// nodes, which are excluded again from the output iteration.
    pub named_vars: Vec<NodeId>,
    #[serde(skip)]
    named_set: HashSet<NodeId>,

    // Membership partition
    pub free_vars: HashSet<NodeId>,
    pub observed_vars: HashSet<NodeId>,
    pub deterministics: HashSet<NodeId>,
    pub potentials: HashSet<NodeId>,
    pub imputed_vars: HashSet<NodeId>,

    /// Variable -> its attached log-density node.
    pub logp: HashMap<NodeId, NodeId>,
    /// Variable -> its transformed-space (reparameterized) value node.
    pub transformed: HashMap<NodeId, NodeId>,
    /// Variable -> attached distribution description.
    pub distributions: HashMap<NodeId, Distribution>,

    /// Variable name -> indexing dimension names.
    pub dims: HashMap<String, Vec<String>>,
    /// Dimension name -> coordinate labels.
    pub coords: HashMap<String, Vec<String>>,
}

impl Model {
    pub fn new() -> Self { Self::default() }

    /// Rebuilds skipped caches after deserialization.
    pub fn rebuild_caches(&mut self) {
        self.registry.rebuild_name_cache();
        self.named_set = self.named_vars.iter().copied().collect();
    }

    // --- Raw graph construction ---

    pub fn add_scalar(&mut self, value: f64) -> NodeId {
        self.registry.add_constant(vec![value], vec![])
    }

    pub fn add_tensor(&mut self, data: Vec<f64>, shape: Vec<usize>) -> NodeId {
        self.registry.add_constant(data, shape)
    }

    /// Adds an anonymous operation node.
    pub fn add_op(&mut self, op: Operation, parents: &[NodeId]) -> NodeId {
        self.registry.add_node(NodeKind::Op(op), parents, NodeMetadata::default())
    }

    // --- Named variable construction ---

    /// Registers a latent random variable with a prior distribution.
    pub fn add_free(&mut self, name: &str, dist: Distribution, params: &[NodeId]) -> NodeId {
        let v = self.register_named(NodeKind::Variable, params, name);
        self.attach_logp(v, params);
        self.free_vars.insert(v);
        self.distributions.insert(v, dist);
        v
    }

    /// Registers a constrained latent variable together with its
    /// transformed-space value node (e.g. a log-reparameterized scale).
    ///
    /// The log-density attaches to the transformed node; the user-facing
    /// variable is a view over it.
    pub fn add_free_transformed(
        &mut self,
        name: &str,
        transform: &str,
        dist: Distribution,
        params: &[NodeId],
    ) -> NodeId {
        let tname = format!("{}_{}__", name, transform);
        let t = self.register_named(NodeKind::Variable, params, &tname);
        self.attach_logp(t, params);

        let v = self.register_named(NodeKind::Variable, &[t], name);
        self.transformed.insert(v, t);
        self.free_vars.insert(v);
        self.distributions.insert(v, dist);
        v
    }

    /// Registers a random variable fixed to observed data.
    pub fn add_observed(
        &mut self,
        name: &str,
        dist: Distribution,
        params: &[NodeId],
        data: Vec<f64>,
        shape: Vec<usize>,
    ) -> NodeId {
        let d = self.registry.add_constant(data, shape);
        let v = self.register_named(NodeKind::Variable, params, name);
        self.attach_logp_with_data(v, params, d);
        self.observed_vars.insert(v);
        self.distributions.insert(v, dist);
        v
    }

    /// Registers a partially observed variable (missing entries are NaN).
    pub fn add_imputed(
        &mut self,
        name: &str,
        dist: Distribution,
        params: &[NodeId],
        data: Vec<f64>,
        shape: Vec<usize>,
    ) -> NodeId {
        let d = self.registry.add_constant(data, shape);
        let v = self.register_named(NodeKind::Variable, params, name);
        self.attach_logp_with_data(v, params, d);
        self.imputed_vars.insert(v);
        self.distributions.insert(v, dist);
        v
    }

    /// Names an existing expression node as a deterministic pass-through.
    pub fn name_deterministic(&mut self, name: &str, node: NodeId) -> NodeId {
        self.assign_name(node, name);
        self.deterministics.insert(node);
        node
    }

    /// Names an existing expression node as a potential (a direct
    /// contribution to the model's log-density).
    pub fn name_potential(&mut self, name: &str, node: NodeId) -> NodeId {
        self.assign_name(node, name);
        self.potentials.insert(node);
        node
    }

    // --- Coordinate metadata ---

    pub fn set_dims(&mut self, var: &str, dims: &[&str]) {
        self.dims.insert(var.to_string(), dims.iter().map(|s| s.to_string()).collect());
    }

    pub fn set_coords(&mut self, dim: &str, labels: &[&str]) {
        self.coords.insert(dim.to_string(), labels.iter().map(|s| s.to_string()).collect());
    }

    // --- Lookups ---

    /// True if this node is a registered named variable.
    pub fn is_named(&self, node: NodeId) -> bool {
        self.named_set.contains(&node)
    }

    pub fn name_of(&self, node: NodeId) -> Option<&str> {
        self.registry.name(node)
    }

    pub fn node_named(&self, name: &str) -> Option<NodeId> {
        self.named_vars.iter().copied().find(|&v| self.registry.name(v) == Some(name))
    }

    /// Named variables that appear in the output, in registration order.
    /// Transformed-space nodes are internal and excluded.
    pub fn output_vars(&self) -> Vec<NodeId> {
        let targets: HashSet<NodeId> = self.transformed.values().copied().collect();
        self.named_vars.iter().copied().filter(|v| !targets.contains(v)).collect()
    }

    // --- Internals ---

    fn register_named(&mut self, kind: NodeKind, parents: &[NodeId], name: &str) -> NodeId {
        let v = self.registry.add_node(kind, parents, NodeMetadata::named(name));
        self.named_vars.push(v);
        self.named_set.insert(v);
        v
    }

    fn assign_name(&mut self, node: NodeId, name: &str) {
        // Uniqueness is enforced the same way as at node creation.
        let unique = self.registry.unique_name(name);
        self.registry.meta[node.index()].name = Some(unique);
        self.named_vars.push(node);
        self.named_set.insert(node);
    }

    fn attach_logp(&mut self, v: NodeId, params: &[NodeId]) {
        let mut inputs = vec![v];
        inputs.extend_from_slice(params);
        let lp = self.add_op(Operation::LogDensity, &inputs);
        self.logp.insert(v, lp);
    }

    fn attach_logp_with_data(&mut self, v: NodeId, params: &[NodeId], data: NodeId) {
        let mut inputs = vec![v, data];
        inputs.extend_from_slice(params);
        let lp = self.add_op(Operation::LogDensity, &inputs);
        self.logp.insert(v, lp);
    }
}
