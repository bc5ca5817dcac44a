//! Rank assignment: place every layout node on an integer level so that each edge `v -> w`
//! satisfies `rank(w) - rank(v) >= minlen`.
//!
//! Expects an acyclic graph without self loops. Containers are skipped.

pub mod network_simplex;
pub mod util;

use crate::util::RankBounds;
use crate::{LayoutGraph, Ranker};
use tracing::debug;

/// Ranks the graph with the configured ranker and normalizes ranks to start at 0.
///
/// Returns the rank bounds, or `None` for a graph without layout nodes.
pub fn rank(g: &mut LayoutGraph) -> Option<RankBounds> {
    let ranker = g.graph().ranker;
    match ranker {
        Ranker::NetworkSimplex => network_simplex::network_simplex(g),
        Ranker::TightTree => {
            util::longest_path(g);
            network_simplex::tight_tree(g);
        }
        Ranker::LongestPath => util::longest_path(g),
    }
    let bounds = crate::util::normalize_ranks(g);
    debug!(?ranker, ?bounds, "rank: assigned ranks");
    bounds
}
