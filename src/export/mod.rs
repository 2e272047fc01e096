//! Output contracts consumed by the downstream visualizer.

pub mod header;

pub use header::{GroupHeader, HeaderError, inference_header, normalize_dtype};
