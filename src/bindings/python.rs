use crate::dag::DagBuilder;
use crate::store::{Distribution, DistKind, Model, NodeId, Operation};
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

fn parse_op(op_name: &str) -> PyResult<Operation> {
    Ok(match op_name {
        "add" => Operation::Add,
        "subtract" => Operation::Subtract,
        "multiply" => Operation::Multiply,
        "divide" => Operation::Divide,
        "negate" => Operation::Negate,
        "abs" => Operation::Abs,
        "log" => Operation::Log,
        "exp" => Operation::Exp,
        "sum" => Operation::Sum,
        "reshape" => Operation::Reshape,
        _ => return Err(PyValueError::new_err(format!("Invalid op '{}'", op_name))),
    })
}

fn parse_dist(dist: &str, kind: Option<&str>, shape: Vec<u64>) -> PyResult<Distribution> {
    let kind = match kind {
        Some("Continuous") => Some(DistKind::Continuous),
        Some("Discrete") => Some(DistKind::Discrete),
        None => None,
        Some(other) => return Err(PyValueError::new_err(format!("Invalid dist kind '{}'", other))),
    };
    Ok(Distribution { dist: dist.to_string(), kind, shape })
}

#[pyclass(name = "_Model")]
#[derive(Debug, Clone, Default)]
pub struct PyModel {
    inner: Model,
}

#[pymethods]
impl PyModel {
    #[new]
    pub fn new() -> Self { Self::default() }

    pub fn add_scalar(&mut self, value: f64) -> usize {
        self.inner.add_scalar(value).index()
    }

    pub fn add_tensor(&mut self, data: Vec<f64>, shape: Vec<usize>) -> usize {
        self.inner.add_tensor(data, shape).index()
    }

    pub fn add_op(&mut self, op_name: &str, parents: Vec<usize>) -> PyResult<usize> {
        let op = parse_op(op_name)?;
        let p_ids: Vec<NodeId> = parents.into_iter().map(NodeId::new).collect();
        Ok(self.inner.add_op(op, &p_ids).index())
    }

    #[pyo3(signature = (name, dist, kind, shape, params, transform=None))]
    pub fn add_free(
        &mut self,
        name: &str,
        dist: &str,
        kind: Option<&str>,
        shape: Vec<u64>,
        params: Vec<usize>,
        transform: Option<&str>,
    ) -> PyResult<usize> {
        let d = parse_dist(dist, kind, shape)?;
        let p_ids: Vec<NodeId> = params.into_iter().map(NodeId::new).collect();
        let v = match transform {
            Some(t) => self.inner.add_free_transformed(name, t, d, &p_ids),
            None => self.inner.add_free(name, d, &p_ids),
        };
        Ok(v.index())
    }

    #[pyo3(signature = (name, dist, kind, shape, params, data, data_shape, imputed=false))]
    #[allow(clippy::too_many_arguments)]
    pub fn add_observed(
        &mut self,
        name: &str,
        dist: &str,
        kind: Option<&str>,
        shape: Vec<u64>,
        params: Vec<usize>,
        data: Vec<f64>,
        data_shape: Vec<usize>,
        imputed: bool,
    ) -> PyResult<usize> {
        let d = parse_dist(dist, kind, shape)?;
        let p_ids: Vec<NodeId> = params.into_iter().map(NodeId::new).collect();
        let v = if imputed {
            self.inner.add_imputed(name, d, &p_ids, data, data_shape)
        } else {
            self.inner.add_observed(name, d, &p_ids, data, data_shape)
        };
        Ok(v.index())
    }

    pub fn add_deterministic(&mut self, name: &str, node: usize) -> PyResult<usize> {
        self.check_node(node)?;
        Ok(self.inner.name_deterministic(name, NodeId::new(node)).index())
    }

    pub fn add_potential(&mut self, name: &str, node: usize) -> PyResult<usize> {
        self.check_node(node)?;
        Ok(self.inner.name_potential(name, NodeId::new(node)).index())
    }

    pub fn set_dims(&mut self, var: &str, dims: Vec<String>) {
        let refs: Vec<&str> = dims.iter().map(String::as_str).collect();
        self.inner.set_dims(var, &refs);
    }

    pub fn set_coords(&mut self, dim: &str, labels: Vec<String>) {
        let refs: Vec<&str> = labels.iter().map(String::as_str).collect();
        self.inner.set_coords(dim, &refs);
    }

    /// Extracts the DAG and returns it as a JSON document.
    pub fn build_dag_json(&self) -> PyResult<String> {
        let dag = DagBuilder::new(&self.inner)
            .build()
            .map_err(|e| PyRuntimeError::new_err(e.to_string()))?;
        serde_json::to_string(&dag).map_err(|e| PyRuntimeError::new_err(e.to_string()))
    }
}

impl PyModel {
    fn check_node(&self, node: usize) -> PyResult<()> {
        if node < self.inner.registry.count() {
            Ok(())
        } else {
            Err(PyValueError::new_err("Invalid Node ID"))
        }
    }
}
