//! frontier.rs
//! Resolves the direct named parents of a variable by finding the minimal
//! self-consistent blocking set over its ancestor graph.
//!
//! Named variables can be separated by chains of anonymous operations and
//! by deterministic pass-through nodes whose own inputs are sometimes
//! relevant (the deterministic appears only through an indirect path) and
//! sometimes not (the deterministic is itself the direct parent). The
//! minimal fixed-point frontier distinguishes the two without per-node
//! annotation: it is the unique cut that exactly reproduces itself when
//! used as the blocking set of an ancestor walk.

use crate::analysis::ancestry;
use crate::dag::error::DagError;
use crate::dag::index::GraphIndex;
use crate::store::{Model, NodeId};
use smallvec::SmallVec;
use std::collections::{BTreeSet, HashMap, HashSet};

/// Upper bound on blocking-set candidates examined per variable. The
/// subset search is exponential in the upstream set in the worst case;
/// the cap converts a pathological model into a fatal error instead of a
/// hang. Typical probabilistic models have single-digit fan-in.
pub const DEFAULT_CANDIDATE_CAP: usize = 1 << 20;

pub struct FrontierResolver<'a> {
    model: &'a Model,
    /// Transformed-space node -> name of the variable it reparameterizes.
    transform_map: HashMap<NodeId, String>,
    /// Names of variables that may appear as parents in the output.
    output_names: HashSet<String>,
    candidate_cap: usize,
}

impl<'a> FrontierResolver<'a> {
    pub fn new(model: &'a Model) -> Self {
        Self::with_cap(model, DEFAULT_CANDIDATE_CAP)
    }

    pub fn with_cap(model: &'a Model, candidate_cap: usize) -> Self {
        let transform_map = model
            .transformed
            .iter()
            .filter_map(|(&var, &t)| model.name_of(var).map(|n| (t, n.to_string())))
            .collect();
        let output_names = model
            .output_vars()
            .into_iter()
            .filter_map(|v| model.name_of(v).map(str::to_string))
            .collect();
        Self { model, transform_map, output_names, candidate_cap }
    }

    /// The node a variable is evaluated through: the log-density of its
    /// transformed-space node if one exists, else its own log-density,
    /// else the variable itself (deterministics and potentials).
    pub fn eval_node(&self, var: NodeId) -> NodeId {
        if let Some(&t) = self.model.transformed.get(&var) {
            self.model.logp.get(&t).copied().unwrap_or(t)
        } else if let Some(&lp) = self.model.logp.get(&var) {
            lp
        } else {
            var
        }
    }

    /// Ancestors of `func` that are named variables other than `var`.
    fn named_ancestors(
        &self,
        var: NodeId,
        func: NodeId,
        blockers: &HashSet<NodeId>,
    ) -> BTreeSet<NodeId> {
        ancestry::ancestors(&self.model.registry, &[func], blockers)
            .into_iter()
            .filter(|&j| j != var && self.model.is_named(j))
            .collect()
    }

    /// Computes the set of direct named-variable parents of `var`, as
    /// frontier nodes in the computation graph.
    pub fn direct_parents(&self, var: NodeId) -> Result<BTreeSet<NodeId>, DagError> {
        let func = self.eval_node(var);
        let upstream = self.named_ancestors(var, func, &HashSet::new());

        // Usual case: blocking at every found ancestor changes nothing, so
        // the unrestricted set is already the direct-parent frontier.
        let all_blocked: HashSet<NodeId> = upstream.iter().copied().collect();
        if self.named_ancestors(var, func, &all_blocked) == upstream {
            return Ok(upstream);
        }

        // Deterministic accounting: a pass-through transparently exposed
        // deeper ancestors. Search non-empty subsets of `upstream` from
        // smallest to largest cardinality (ties broken by registration
        // order) for the first exact fixed point.
        let pool: Vec<NodeId> = upstream.iter().copied().collect();
        let mut tried = 0usize;

        for r in 1..=pool.len() {
            let mut indices: SmallVec<[usize; 8]> = (0..r).collect();
            loop {
                tried += 1;
                if tried > self.candidate_cap {
                    return Err(self.traversal_error(var, tried));
                }

                let candidate: BTreeSet<NodeId> =
                    indices.iter().map(|&i| pool[i]).collect();
                let blockers: HashSet<NodeId> = candidate.iter().copied().collect();
                if self.named_ancestors(var, func, &blockers) == candidate {
                    return Ok(candidate);
                }

                if !advance_combination(&mut indices, pool.len()) {
                    break;
                }
            }
        }

        Err(self.traversal_error(var, tried))
    }

    /// Maps a resolved frontier to parent variable names.
    ///
    /// The variable itself is discarded; a transformed-space node maps to
    /// the variable it reparameterizes (unless that is `var`, the
    /// self-transform case); any node that is neither is an untracked node
    /// type and fails fatally rather than being silently dropped.
    pub fn parent_names(
        &self,
        var: NodeId,
        frontier: &BTreeSet<NodeId>,
    ) -> Result<BTreeSet<String>, DagError> {
        let var_name = self.model.name_of(var).unwrap_or_default();
        let mut keep = BTreeSet::new();

        for &p in frontier {
            if p == var {
                continue;
            }
            match self.model.name_of(p) {
                Some(name) if self.output_names.contains(name) => {
                    keep.insert(name.to_string());
                }
                _ => match self.transform_map.get(&p) {
                    Some(owner) => {
                        if owner != var_name {
                            keep.insert(owner.clone());
                        }
                    }
                    None => {
                        return Err(DagError::UnrecognizedNode {
                            node: p,
                            var: var_name.to_string(),
                        })
                    }
                },
            }
        }
        Ok(keep)
    }

    fn traversal_error(&self, var: NodeId, candidates: usize) -> DagError {
        let index = GraphIndex::new(self.model);
        let pass_throughs = index
            .pass_throughs(var)
            .into_iter()
            .filter_map(|v| self.model.name_of(v).map(str::to_string))
            .collect();
        DagError::GraphTraversal {
            var: self.model.name_of(var).unwrap_or_default().to_string(),
            candidates,
            pass_throughs,
        }
    }
}

/// Advances `indices` to the next r-combination of `0..n` in lexicographic
/// order. Returns false once exhausted.
fn advance_combination(indices: &mut [usize], n: usize) -> bool {
    let r = indices.len();
    let mut i = r;
    while i > 0 {
        i -= 1;
        if indices[i] < n - r + i {
            indices[i] += 1;
            for j in i + 1..r {
                indices[j] = indices[j - 1] + 1;
            }
            return true;
        }
    }
    false
}
