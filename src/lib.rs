//! Reconstructs the direct dependency graph among the named variables of a
//! probabilistic program from its full low-level tensor computation graph.
//!
//! The computation graph contains many anonymous intermediates between
//! named variables, and some named nodes are pass-through transforms
//! rather than random variables. The core algorithm finds, per variable,
//! the minimal self-consistent blocking frontier of its ancestor set; that
//! frontier is exactly the set of direct named parents. The result is a
//! JSON-compatible descriptor map a client visualizer can embed directly
//! into its archive header.

pub mod analysis;
pub mod dag;
pub mod export;
pub mod store;

#[cfg(feature = "python")]
mod bindings;

pub use analysis::FrontierResolver;
pub use dag::{Category, DagBuilder, DagError, ModelDag, VariableDescriptor};
pub use store::{Distribution, Model, NodeId, Registry};

// --- Python module definition (optional) ---
#[cfg(feature = "python")]
mod python_module {
    use super::bindings::python::PyModel;
    use pyo3::prelude::*;

    /// The `_core` extension module: model construction plus DAG
    /// extraction, compiled for Python via maturin.
    #[pymodule]
    fn _core(_py: Python, m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_class::<PyModel>()?;
        Ok(())
    }
}
