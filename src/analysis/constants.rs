//! constants.rs
//! Scans a variable's full ancestor graph for zero-rank constants and
//! reports their numeric values as implicit hyperparameter parents.
//!
//! There is little metadata to go on, so the scan is applied to the
//! unrestricted ancestor set and deliberately skips arrays (observed data)
//! and anything non-constant. Values are deduplicated numerically, which
//! collapses distinct constant nodes sharing a value; provenance is not
//! tracked.

use crate::analysis::ancestry;
use crate::dag::error::DagError;
use crate::store::{Model, NodeId, NodeKind};
use std::collections::HashSet;

/// Returns the sorted, deduplicated values of all scalar (zero-rank)
/// constants in the ancestor graph of `func`.
pub fn scalar_constants(model: &Model, func: NodeId) -> Result<Vec<f64>, DagError> {
    let registry = &model.registry;
    let mut values = Vec::new();

    for node in ancestry::ancestors(registry, &[func], &HashSet::new()) {
        match registry.kinds[node.index()] {
            NodeKind::Scalar(v) => values.push(v),
            NodeKind::Tensor(idx) => {
                // A rank-0 tensor slipped past scalar inlining; it must
                // still evaluate to exactly one value.
                if registry.constants_shape[idx as usize].is_empty() {
                    let data = &registry.constants_data[idx as usize];
                    match data.first() {
                        Some(&v) if data.len() == 1 => values.push(v),
                        _ => return Err(DagError::ConstantEvaluation { node }),
                    }
                }
            }
            _ => {}
        }
    }

    values.sort_by(f64::total_cmp);
    values.dedup();
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Distribution, Model, NodeMetadata, Operation};

    #[test]
    fn test_scalar_hyperparameters_are_collected() {
        let mut m = Model::new();
        let mu = m.add_scalar(0.0);
        let sd = m.add_scalar(0.5);
        let x = m.add_free("x", Distribution::continuous("Normal", vec![]), &[mu, sd]);

        let lp = m.logp[&x];
        assert_eq!(scalar_constants(&m, lp).unwrap(), vec![0.0, 0.5]);
    }

    #[test]
    fn test_arrays_are_not_constants() {
        let mut m = Model::new();
        let data = m.add_tensor(vec![1.0, 2.0, 3.0], vec![3]);
        let s = m.add_op(Operation::Sum, &[data]);
        assert!(scalar_constants(&m, s).unwrap().is_empty());
    }

    #[test]
    fn test_equal_values_collapse() {
        let mut m = Model::new();
        let a = m.add_scalar(1.0);
        let b = m.add_scalar(1.0);
        let s = m.add_op(Operation::Add, &[a, b]);
        assert_eq!(scalar_constants(&m, s).unwrap(), vec![1.0]);
    }

    #[test]
    fn test_unevaluable_rank_zero_constant_is_fatal() {
        let mut m = Model::new();
        // Inject a malformed rank-0 tensor directly into the registry.
        let idx = m.registry.constants_data.len() as u32;
        m.registry.constants_data.push(vec![]);
        m.registry.constants_shape.push(vec![]);
        let bad = m.registry.add_node(NodeKind::Tensor(idx), &[], NodeMetadata::default());

        let err = scalar_constants(&m, bad).unwrap_err();
        assert_eq!(err, DagError::ConstantEvaluation { node: bad });
    }
}
