//! header.rs
//! The JSON header document consumed by the client-side visualizer. The
//! header travels inside an archive next to the binary array payloads;
//! writing the payloads themselves is out of scope here, but the header
//! structure (and the DAG's place in it) is part of the produced contract.

use crate::dag::ModelDag;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;

/// Attribute key under which the model DAG is embedded in a group header.
pub const DAG_ATTR_KEY: &str = "graph";

/// Top-level key wrapping the per-group headers.
pub const ROOT_KEY: &str = "inference_data";

/// Array dtypes the client-side loader supports, in numpy dtype-string
/// notation (little-endian only).
pub const SUPPORTED_DTYPES: [&str; 7] = ["|u1", "|i1", "<u2", "<u4", "<i4", "<f4", "<f8"];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HeaderError {
    #[error("data type {0} is not supported; define a conversion if necessary")]
    UnsupportedDtype(String),
}

/// Remaps a dtype with a known conversion and rejects anything the loader
/// cannot read. Bools widen to i1, 64-bit integers fall back to f8.
pub fn normalize_dtype(dtype: &str) -> Result<&'static str, HeaderError> {
    let mapped = match dtype {
        "|b1" | "|b" | "|?" => "|i1",
        "<i8" => "<f8",
        "<u8" => "<f8",
        "?1" => "|u1",
        "|B1" => "|u1",
        other => other,
    };
    SUPPORTED_DTYPES
        .iter()
        .find(|&&d| d == mapped)
        .copied()
        .ok_or_else(|| HeaderError::UnsupportedDtype(dtype.to_string()))
}

/// Per-array metadata inside a group header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArrayHeader {
    pub dims: Vec<String>,
    pub attrs: Map<String, Value>,
    /// The *original* dtype, in case the payload had to be converted.
    pub dtype: String,
    pub shape: Vec<u64>,
    /// Storage name of the blob holding this array's payload.
    pub array_name: String,
}

/// Header for one group of arrays (e.g. posterior, sample stats).
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct GroupHeader {
    pub attrs: Map<String, Value>,
    pub dims: BTreeMap<String, u64>,
    pub coords: BTreeMap<String, Vec<String>>,
    pub vars: BTreeMap<String, ArrayHeader>,
    pub array_names: BTreeMap<String, String>,
}

impl GroupHeader {
    pub fn new() -> Self { Self::default() }

    /// Embeds the extracted DAG under the group's attributes.
    pub fn set_dag(&mut self, dag: &ModelDag) {
        self.attrs.insert(DAG_ATTR_KEY.to_string(), dag.to_value());
    }

    /// Registers an array, generating a storage name unique across the
    /// whole archive via the shared running index.
    pub fn add_array(
        &mut self,
        group: &str,
        var: &str,
        dims: Vec<String>,
        dtype: &str,
        shape: Vec<u64>,
        array_index: &mut usize,
    ) -> Result<String, HeaderError> {
        normalize_dtype(dtype)?;
        let array_name = format!("{}_{}_{}", group, var, *array_index);
        *array_index += 1;

        self.vars.insert(var.to_string(), ArrayHeader {
            dims,
            attrs: Map::new(),
            dtype: dtype.to_string(),
            shape,
            array_name: array_name.clone(),
        });
        self.array_names.insert(var.to_string(), array_name.clone());
        Ok(array_name)
    }
}

/// Wraps the per-group headers into the document the loader expects.
pub fn inference_header(groups: BTreeMap<String, GroupHeader>) -> Value {
    let mut root = Map::new();
    root.insert(ROOT_KEY.to_string(), serde_json::to_value(groups).unwrap_or(Value::Null));
    Value::Object(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dag::DagBuilder;
    use crate::store::{Distribution, Model};
    use rstest::rstest;

    #[rstest]
    #[case("|u1", "|u1")]
    #[case("<f8", "<f8")]
    #[case("|b1", "|i1")]
    #[case("|?", "|i1")]
    #[case("<i8", "<f8")]
    #[case("<u8", "<f8")]
    #[case("|B1", "|u1")]
    fn test_dtype_normalization(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize_dtype(input).unwrap(), expected);
    }

    #[test]
    fn test_unsupported_dtype_is_rejected() {
        assert_eq!(
            normalize_dtype(">f8"),
            Err(HeaderError::UnsupportedDtype(">f8".to_string()))
        );
    }

    #[test]
    fn test_array_names_are_unique_across_groups() {
        let mut index = 0;
        let mut g1 = GroupHeader::new();
        let mut g2 = GroupHeader::new();
        let a = g1.add_array("posterior", "mu", vec![], "<f8", vec![4, 100], &mut index).unwrap();
        let b = g2.add_array("sample_stats", "mu", vec![], "<f8", vec![4, 100], &mut index).unwrap();
        assert_eq!(a, "posterior_mu_0");
        assert_eq!(b, "sample_stats_mu_1");
    }

    #[test]
    fn test_dag_embeds_under_graph_attr() {
        let mut m = Model::new();
        m.add_free("mu", Distribution::continuous("Normal", vec![]), &[]);
        let dag = DagBuilder::new(&m).build().unwrap();

        let mut group = GroupHeader::new();
        group.set_dag(&dag);
        let doc = inference_header([("sample_stats".to_string(), group)].into_iter().collect());

        let embedded = &doc[ROOT_KEY]["sample_stats"]["attrs"][DAG_ATTR_KEY];
        assert_eq!(embedded["mu"]["type"], "free");
    }
}
