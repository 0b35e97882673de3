//! Stream dictionary scanning.
//!
//! Two independent passes over a [`MetadataNode`](crate::model::MetadataNode):
//! [`resolve_level`] computes the decode level, [`render_dictionary`]
//! produces the diagnostic text shown next to each stream.

mod render;
mod resolve;

pub use render::render_dictionary;
pub use resolve::resolve_level;

/// Budget for a single dictionary walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanLimits {
    /// Maximum nesting depth of arrays and dictionaries
    pub max_depth: usize,

    /// Maximum number of values visited
    pub max_nodes: usize,
}

impl ScanLimits {
    /// Create limits with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum nesting depth.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set the maximum number of visited values.
    pub fn with_max_nodes(mut self, nodes: usize) -> Self {
        self.max_nodes = nodes;
        self
    }
}

impl Default for ScanLimits {
    fn default() -> Self {
        Self {
            max_depth: 64,
            max_nodes: 10_000,
        }
    }
}
