//! Pure graph algorithms over an immutable model snapshot: ancestor
//! traversal, frontier resolution, and constant extraction.

pub mod ancestry;
pub mod constants;
pub mod frontier;

pub use frontier::{FrontierResolver, DEFAULT_CANDIDATE_CAP};
