//! descriptor.rs
//! JSON-compatible output records. One descriptor per included named
//! variable; the whole build result is an insertion-ordered name -> record
//! map mirroring the model's variable-registration order.

use super::index::Category;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// A parent entry: either a named variable or a bare constant value
/// (implicit hyperparameter with no identity of its own).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParentRef {
    Var(String),
    Const(f64),
}

/// Distribution summary, or `{}` for variables without one.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DistSummary {
    Known(DistDescriptor),
    Empty {},
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistDescriptor {
    /// Distribution class name, e.g. "Normal".
    pub dist: String,
    /// "Continuous", "Discrete", or "" when unclassified.
    #[serde(rename = "type")]
    pub type_tag: String,
    pub shape: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub category: Category,
    /// Order-insensitive; names first, then constant values.
    pub parents: Vec<ParentRef>,
    /// Product of the shape for free variables, zero otherwise.
    pub size: u64,
    pub dims: Vec<String>,
    pub coords: BTreeMap<String, Vec<String>>,
    pub distribution: DistSummary,
}

/// The final variable-descriptor mapping, in registration order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModelDag {
    entries: Vec<VariableDescriptor>,
}

impl ModelDag {
    pub fn push(&mut self, descriptor: VariableDescriptor) {
        self.entries.push(descriptor);
    }

    pub fn get(&self, name: &str) -> Option<&VariableDescriptor> {
        self.entries.iter().find(|d| d.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &VariableDescriptor> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The JSON value a downstream visualizer embeds under its
    /// model-level attributes key.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl Serialize for ModelDag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for d in &self.entries {
            map.serialize_entry(&d.name, d)?;
        }
        map.end()
    }
}
