//! Construction-time graph flags.

/// Flags fixed when a [`Graph`](super::Graph) is created.
///
/// `multigraph` keeps edge names in the edge key, `compound` enables parent/child nesting and
/// `directed` (the default) distinguishes `v -> w` from `w -> v`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphOptions {
    pub multigraph: bool,
    pub compound: bool,
    pub directed: bool,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            multigraph: false,
            compound: false,
            directed: true,
        }
    }
}

impl GraphOptions {
    /// Directed, multi-edge, compound: the shape layout works on internally.
    pub fn layout() -> Self {
        Self {
            multigraph: true,
            compound: true,
            directed: true,
        }
    }
}
