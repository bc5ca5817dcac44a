//! Layered (Sugiyama-style) layout for directed, optionally nested graphs.
//!
//! [`layout`] takes a graph of sized nodes and weighted edges and assigns every node a center,
//! every edge a polyline and the graph an overall size. The phases run in order: cycle removal,
//! rank assignment (network simplex), crossing minimization (barycenter sweeps), coordinate
//! assignment (four-alignment averaging) and edge routing, with compound containers and rank
//! directions handled around them. Each phase is a public module so it can be driven and tested
//! on its own.

pub use strata_graphlib as graphlib;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod acyclic;
pub mod compound;
pub mod coordinate_system;
mod error;
mod model;
pub mod normalize;
pub mod order;
mod pipeline;
pub mod position;
pub mod rank;
pub mod route;
pub mod self_edges;
pub mod util;

pub use error::{Error, Result};
pub use model::{
    Acyclicer, Align, EdgeLabel, Extras, GraphLabel, LayoutGraph, NodeLabel, Point, RankDir,
    Ranker,
};
pub use pipeline::layout;
