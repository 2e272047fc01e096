//! builder.rs
//! Orchestrates classification, frontier resolution and constant
//! extraction across all named variables into the final descriptor map.

use super::descriptor::{DistDescriptor, DistSummary, ModelDag, ParentRef, VariableDescriptor};
use super::error::DagError;
use super::index::{Category, GraphIndex};
use crate::analysis::constants;
use crate::analysis::frontier::{FrontierResolver, DEFAULT_CANDIDATE_CAP};
use crate::store::{DistKind, Model};
use std::collections::BTreeMap;

pub struct DagBuilder<'a> {
    model: &'a Model,
    candidate_cap: usize,
}

impl<'a> DagBuilder<'a> {
    pub fn new(model: &'a Model) -> Self {
        Self { model, candidate_cap: DEFAULT_CANDIDATE_CAP }
    }

    /// Overrides the frontier-search candidate budget.
    pub fn with_cap(model: &'a Model, candidate_cap: usize) -> Self {
        Self { model, candidate_cap }
    }

    /// Builds the full variable-descriptor mapping.
    ///
    /// One synchronous pass in variable-registration order; any error
    /// aborts the whole build with no partial output.
    pub fn build(&self) -> Result<ModelDag, DagError> {
        let node_count = self.model.registry.count();
        for &v in &self.model.named_vars {
            if v.index() >= node_count {
                return Err(DagError::MalformedModel(format!(
                    "named variable {:?} is outside the registry (count {})",
                    v, node_count
                )));
            }
        }

        let resolver = FrontierResolver::with_cap(self.model, self.candidate_cap);
        let index = GraphIndex::new(self.model);
        let mut dag = ModelDag::default();

        for var in self.model.output_vars() {
            let category = index.classify(var);
            if category == Category::Unknown {
                continue;
            }
            let name = self.model.name_of(var).unwrap_or_default().to_string();

            // Direct named parents, then implicit constant parents.
            let frontier = resolver.direct_parents(var)?;
            let parent_vars = resolver.parent_names(var, &frontier)?;
            let constant_parents =
                constants::scalar_constants(self.model, resolver.eval_node(var))?;

            let mut parents: Vec<ParentRef> =
                parent_vars.into_iter().map(ParentRef::Var).collect();
            parents.extend(constant_parents.into_iter().map(ParentRef::Const));

            let dist = self.model.distributions.get(&var);
            // Only free variables report a size; everything else is zero.
            let size = match (category, dist) {
                (Category::Free, Some(d)) => d.size(),
                _ => 0,
            };

            let dims = self.model.dims.get(&name).cloned().unwrap_or_default();
            let mut coords = BTreeMap::new();
            for dim in &dims {
                if let Some(labels) = self.model.coords.get(dim) {
                    coords.insert(dim.clone(), labels.clone());
                }
            }

            let distribution = match dist {
                Some(d) => DistSummary::Known(DistDescriptor {
                    dist: d.dist.clone(),
                    type_tag: match d.kind {
                        Some(DistKind::Continuous) => "Continuous",
                        Some(DistKind::Discrete) => "Discrete",
                        None => "",
                    }
                    .to_string(),
                    shape: d.shape.clone(),
                }),
                None => DistSummary::Empty {},
            };

            dag.push(VariableDescriptor { name, category, parents, size, dims, coords, distribution });
        }

        Ok(dag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Distribution, NodeId, Operation};

    fn has_var(d: &VariableDescriptor, name: &str) -> bool {
        d.parents.iter().any(|p| matches!(p, ParentRef::Var(n) if n == name))
    }

    fn var_parents(d: &VariableDescriptor) -> Vec<&str> {
        let mut names: Vec<&str> = d
            .parents
            .iter()
            .filter_map(|p| match p {
                ParentRef::Var(n) => Some(n.as_str()),
                ParentRef::Const(_) => None,
            })
            .collect();
        names.sort_unstable();
        names
    }

    /// The switchpoint model: three free variables, one observed variable
    /// depending on two of them, a deterministic on the first, and a
    /// potential on the second.
    fn switchpoint_model() -> Model {
        let mut m = Model::new();

        let mu0 = m.add_scalar(0.0);
        let sd_slope = m.add_scalar(0.5);
        let sd_switch = m.add_scalar(100.0);

        let left = m.add_free("left_slope", Distribution::continuous("Normal", vec![]), &[mu0, sd_slope]);
        let right = m.add_free("right_slope", Distribution::continuous("Normal", vec![]), &[mu0, sd_slope]);
        let switch = m.add_free("switchpoint", Distribution::continuous("Normal", vec![]), &[mu0, sd_switch]);

        m.add_observed(
            "y_obs",
            Distribution::continuous("Normal", vec![10]),
            &[switch, left],
            vec![1.0; 10],
            vec![10],
        );

        let abs = m.add_op(Operation::Abs, &[left]);
        let log = m.add_op(Operation::Log, &[abs]);
        m.name_deterministic("rescaled", log);

        let pot = m.add_op(Operation::Sum, &[right]);
        m.name_potential("potential", pot);
        m
    }

    #[test]
    fn test_empty_model_yields_empty_map() {
        let m = Model::new();
        let dag = DagBuilder::new(&m).build().unwrap();
        assert!(dag.is_empty());
    }

    #[test]
    fn test_independent_free_variables() {
        let mut m = Model::new();
        for name in ["a", "b", "c"] {
            m.add_free(name, Distribution::continuous("Normal", vec![]), &[]);
        }
        let dag = DagBuilder::new(&m).build().unwrap();
        assert_eq!(dag.len(), 3);
        for name in ["a", "b", "c"] {
            let d = dag.get(name).unwrap();
            assert!(d.parents.is_empty());
            assert_eq!(d.category, Category::Free);
        }
    }

    #[test]
    fn test_switchpoint_model_parents() {
        let m = switchpoint_model();
        let dag = DagBuilder::new(&m).build().unwrap();
        assert_eq!(dag.len(), 6);

        let y = dag.get("y_obs").unwrap();
        assert_eq!(var_parents(y), vec!["left_slope", "switchpoint"]);
        assert!(!has_var(y, "right_slope"));

        assert_eq!(var_parents(dag.get("rescaled").unwrap()), vec!["left_slope"]);
        assert_eq!(var_parents(dag.get("potential").unwrap()), vec!["right_slope"]);
    }

    #[test]
    fn test_switchpoint_model_categories_and_distributions() {
        let m = switchpoint_model();
        let dag = DagBuilder::new(&m).build().unwrap();

        assert_eq!(dag.get("left_slope").unwrap().category, Category::Free);
        assert_eq!(dag.get("y_obs").unwrap().category, Category::Observed);
        assert_eq!(dag.get("potential").unwrap().category, Category::Potential);
        assert_eq!(dag.get("rescaled").unwrap().category, Category::Deterministic);

        for name in ["y_obs", "left_slope"] {
            match &dag.get(name).unwrap().distribution {
                DistSummary::Known(d) => assert_eq!(d.dist, "Normal"),
                DistSummary::Empty {} => panic!("{} should carry a distribution", name),
            }
        }
        assert_eq!(dag.get("rescaled").unwrap().distribution, DistSummary::Empty {});
    }

    #[test]
    fn test_scalar_hyperparameters_merge_into_parents() {
        let m = switchpoint_model();
        let dag = DagBuilder::new(&m).build().unwrap();
        let left = dag.get("left_slope").unwrap();
        assert!(left.parents.contains(&ParentRef::Const(0.0)));
        assert!(left.parents.contains(&ParentRef::Const(0.5)));
        assert!(var_parents(left).is_empty());
    }

    #[test]
    fn test_no_self_parents() {
        let m = switchpoint_model();
        let dag = DagBuilder::new(&m).build().unwrap();
        for d in dag.iter() {
            assert!(!has_var(d, &d.name), "{} lists itself as a parent", d.name);
        }
    }

    #[test]
    fn test_build_is_idempotent() {
        let m = switchpoint_model();
        let first = DagBuilder::new(&m).build().unwrap();
        let second = DagBuilder::new(&m).build().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unknown_variables_are_excluded() {
        let mut m = switchpoint_model();
        let n = m.add_op(Operation::Negate, &[NodeId::new(0)]);
        m.name_deterministic("orphan", n);
        m.deterministics.remove(&n);

        let dag = DagBuilder::new(&m).build().unwrap();
        assert!(dag.get("orphan").is_none());
        assert_eq!(dag.len(), 6);
    }

    #[test]
    fn test_imputed_variable_descriptor() {
        let mut m = Model::new();
        let mu = m.add_free("mu", Distribution::continuous("Normal", vec![]), &[]);
        m.add_imputed(
            "x",
            Distribution::continuous("Normal", vec![3]),
            &[mu],
            vec![1.0, f64::NAN, 3.0],
            vec![3],
        );

        let dag = DagBuilder::new(&m).build().unwrap();
        let d = dag.get("x").unwrap();
        assert_eq!(d.category, Category::Imputed);
        assert_eq!(var_parents(d), vec!["mu"]);
        assert_eq!(d.size, 0);

        let json = serde_json::to_value(&dag).unwrap();
        assert_eq!(json["x"]["type"], "imputed");
    }

    #[test]
    fn test_free_variable_size_is_shape_product() {
        let mut m = Model::new();
        m.add_free("theta", Distribution::continuous("Normal", vec![4, 50]), &[]);
        let dag = DagBuilder::new(&m).build().unwrap();
        assert_eq!(dag.get("theta").unwrap().size, 200);
    }

    #[test]
    fn test_observed_size_is_zero() {
        let mut m = Model::new();
        m.add_observed("y", Distribution::continuous("Normal", vec![3]), &[], vec![1.0; 3], vec![3]);
        let dag = DagBuilder::new(&m).build().unwrap();
        assert_eq!(dag.get("y").unwrap().size, 0);
    }

    #[test]
    fn test_dims_and_coords_attached() {
        let mut m = Model::new();
        m.add_free("rate", Distribution::continuous("Normal", vec![2]), &[]);
        m.set_dims("rate", &["city"]);
        m.set_coords("city", &["basel", "geneva"]);
        m.set_coords("year", &["2019", "2020"]);

        let dag = DagBuilder::new(&m).build().unwrap();
        let d = dag.get("rate").unwrap();
        assert_eq!(d.dims, vec!["city"]);
        assert_eq!(d.coords["city"], vec!["basel", "geneva"]);
        assert!(!d.coords.contains_key("year"));
    }

    #[test]
    fn test_deterministic_between_variables_collapses_to_it() {
        // a -> d (deterministic) -> b: b's parent is d, not a.
        let mut m = Model::new();
        let a = m.add_free("a", Distribution::continuous("Normal", vec![]), &[]);
        let e = m.add_op(Operation::Exp, &[a]);
        let d = m.name_deterministic("d", e);
        m.add_free("b", Distribution::continuous("Normal", vec![]), &[d]);

        let dag = DagBuilder::new(&m).build().unwrap();
        assert_eq!(var_parents(dag.get("b").unwrap()), vec!["d"]);
        assert_eq!(var_parents(dag.get("d").unwrap()), vec!["a"]);
    }

    #[test]
    fn test_malformed_registry_is_detected() {
        let mut m = switchpoint_model();
        m.named_vars.push(NodeId::new(9999));
        let err = DagBuilder::new(&m).build().unwrap_err();
        assert!(matches!(err, DagError::MalformedModel(_)));
    }
}
