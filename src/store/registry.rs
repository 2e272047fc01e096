use super::types::*;
use serde::{Serialize, Deserialize};
use std::collections::HashSet;

/// Columnar store for the tensor computation graph.
///
/// The graph is append-only and read back by the analysis passes; nothing
/// in this crate mutates topology after construction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Registry {
    // Columnar Arrays
    pub kinds: Vec<NodeKind>,
    pub meta: Vec<NodeMetadata>,

    // Topology (CSR)
    pub parents_flat: Vec<NodeId>,
    pub parents_ranges: Vec<(u32, u32)>, // (start, count)

    // Data blobs for Tensor constants
    pub constants_data: Vec<Vec<f64>>,
    pub constants_shape: Vec<Vec<usize>>,

    // Ephemeral state for uniqueness checks (not serialized, rebuilt on load)
    #[serde(skip)]
    pub used_names: HashSet<String>,
}

impl Registry {
    pub fn new() -> Self { Self::default() }
    pub fn count(&self) -> usize { self.kinds.len() }

    /// Rebuilds the `used_names` set after deserialization.
    pub fn rebuild_name_cache(&mut self) {
        self.used_names = self.meta.iter().filter_map(|m| m.name.clone()).collect();
    }

    /// Reserves a unique variant of `name`, suffixing with a counter on
    /// collision.
    pub fn unique_name(&mut self, name: &str) -> String {
        let mut candidate_name = name.to_string();
        let mut counter = 1;

        while self.used_names.contains(&candidate_name) {
            candidate_name = format!("{}_{}", name, counter);
            counter += 1;
        }
        self.used_names.insert(candidate_name.clone());
        candidate_name
    }

    pub fn add_node(&mut self, kind: NodeKind, parents: &[NodeId], mut meta: NodeMetadata) -> NodeId {
        let id = NodeId(self.kinds.len() as u32);

        // --- Unique Name Enforcement ---
        if let Some(original_name) = meta.name.take() {
            meta.name = Some(self.unique_name(&original_name));
        }
        // -------------------------------

        // 1. Register Parents
        let start = self.parents_flat.len() as u32;
        let count = parents.len() as u32;
        self.parents_flat.extend_from_slice(parents);
        self.parents_ranges.push((start, count));

        // 2. Metadata
        self.kinds.push(kind);
        self.meta.push(meta);

        id
    }

    /// Adds a constant node. Zero-rank constants are inlined as `Scalar`;
    /// anything with a shape goes to the side storage as a `Tensor`.
    pub fn add_constant(&mut self, data: Vec<f64>, shape: Vec<usize>) -> NodeId {
        if shape.is_empty() && data.len() == 1 {
            self.add_node(NodeKind::Scalar(data[0]), &[], NodeMetadata::default())
        } else {
            let idx = self.constants_data.len() as u32;
            self.constants_data.push(data);
            self.constants_shape.push(shape);
            self.add_node(NodeKind::Tensor(idx), &[], NodeMetadata::default())
        }
    }

    /// Rank of a constant node; `None` for non-constants.
    pub fn constant_rank(&self, id: NodeId) -> Option<usize> {
        match self.kinds[id.index()] {
            NodeKind::Scalar(_) => Some(0),
            NodeKind::Tensor(idx) => Some(self.constants_shape[idx as usize].len()),
            _ => None,
        }
    }

    #[inline(always)]
    pub fn get_parents(&self, id: NodeId) -> &[NodeId] {
        let (start, count) = self.parents_ranges[id.index()];
        &self.parents_flat[start as usize..(start + count) as usize]
    }

    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.meta[id.index()].name.as_deref()
    }
}
