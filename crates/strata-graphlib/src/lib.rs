//! Graph container used by the `strata` layout engine.
//!
//! The store is an explicit, owned collection: nodes and edges live in insertion-ordered vectors,
//! addressed by string id and by `(v, w, name)` key. Parent/child links and adjacency are index
//! structures maintained next to the data, never cross-referencing pointers.

mod error;
mod graph;

pub use error::{Error, Result};
pub use graph::{EdgeKey, Graph, GraphOptions, alg};
