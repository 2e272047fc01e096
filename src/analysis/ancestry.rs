//! ancestry.rs
//! Backward (upstream) traversal over the computation graph, with support
//! for a blocking set at which expansion halts.

use crate::store::{NodeId, Registry};
use std::collections::{HashSet, VecDeque};

/// Walks input edges backward from `start_nodes` and returns every node
/// visited, including the start nodes themselves.
///
/// Members of `blockers` are reported when reached but their own parents
/// are not explored. With an empty blocking set this is the full ancestor
/// graph. Pure function of the graph; BFS order does not affect the result.
pub fn ancestors(
    registry: &Registry,
    start_nodes: &[NodeId],
    blockers: &HashSet<NodeId>,
) -> HashSet<NodeId> {
    let mut visited = HashSet::new();
    let mut queue = VecDeque::from(start_nodes.to_vec());

    while let Some(node) = queue.pop_front() {
        if visited.insert(node) && !blockers.contains(&node) {
            for &parent in registry.get_parents(node) {
                queue.push_back(parent);
            }
        }
    }
    visited
}
