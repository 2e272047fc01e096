use serde::{Serialize, Deserialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline(always)]
    pub fn index(&self) -> usize { self.0 as usize }
    pub fn new(idx: usize) -> Self { Self(idx as u32) }
}

/// The anonymous operation performed by an `Op` node.
///
/// These are the unnamed intermediates that sit between named variables in
/// the tensor graph. The exact arithmetic is irrelevant to ancestor
/// resolution; only the parent edges matter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
    Negate,
    Abs,
    Log,
    Exp,
    Sum,
    Reshape,
    /// The log-density of a variable given its value and parameters.
    /// Synthesized when a distribution is attached to a variable.
    LogDensity,
}

/// Whether a distribution has continuous or discrete support.
///
/// Carried as an explicit tag decided at construction time, instead of
/// being re-derived from a class hierarchy at each use site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DistKind {
    Continuous,
    Discrete,
}

/// Description of the distribution attached to a random variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    /// Distribution class name, e.g. "Normal".
    pub dist: String,
    /// `None` for distributions with no declared support kind.
    pub kind: Option<DistKind>,
    pub shape: Vec<u64>,
}

impl Distribution {
    pub fn continuous(dist: &str, shape: Vec<u64>) -> Self {
        Self { dist: dist.to_string(), kind: Some(DistKind::Continuous), shape }
    }

    pub fn discrete(dist: &str, shape: Vec<u64>) -> Self {
        Self { dist: dist.to_string(), kind: Some(DistKind::Discrete), shape }
    }

    /// Product of the shape. Empty shape means scalar, size 1.
    pub fn size(&self) -> u64 {
        self.shape.iter().product()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeMetadata {
    /// Stable identifier for named variables; `None` for anonymous
    /// intermediates.
    pub name: Option<String>,
}

impl NodeMetadata {
    pub fn named(name: &str) -> Self {
        Self { name: Some(name.to_string()) }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    /// Zero-rank constant, value stored inline.
    Scalar(f64),
    /// Constant array; index into `constants_data` / `constants_shape`.
    Tensor(u32),
    /// Anonymous operation over parent nodes.
    Op(Operation),
    /// A random-variable value node. Its parents are its distribution
    /// parameters (plus the transformed-space node, when one exists).
    Variable,
}
