//! Coordinate assignment in the canonical top-to-bottom frame.
//!
//! The rank axis is stacked: each rank is as tall as its tallest node and ranks are `ranksep`
//! apart. The packing axis comes from [`bk::position_x`]. Containers are not positioned here.

pub mod bk;

use crate::LayoutGraph;
use tracing::debug;

/// Rank-axis placement of every rank, in canonical (top-to-bottom) coordinates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankGeometry {
    /// Center line of each rank (index = rank).
    pub centers: Vec<f64>,
    /// Height of the tallest node in each rank (0 for empty ranks).
    pub heights: Vec<f64>,
}

impl RankGeometry {
    pub fn center(&self, rank: i32) -> Option<f64> {
        usize::try_from(rank)
            .ok()
            .and_then(|r| self.centers.get(r).copied())
    }
}

pub fn position(g: &mut LayoutGraph) -> RankGeometry {
    let layering = crate::util::build_layer_matrix(g);
    let geometry = position_y(g, &layering);
    let xs = bk::position_x(g, &layering);
    for (id, x) in xs {
        if let Some(node) = g.node_mut(&id) {
            node.x = Some(x);
        }
    }
    debug!(ranks = layering.len(), "position: coordinates assigned");
    geometry
}

fn position_y(g: &mut LayoutGraph, layering: &[Vec<String>]) -> RankGeometry {
    let rank_sep = g.graph().ranksep;
    let mut geometry = RankGeometry::default();
    let mut prev_y = 0.0;
    for layer in layering {
        let max_height = layer
            .iter()
            .filter_map(|id| g.node(id))
            .map(|n| n.height)
            .fold(0.0, f64::max);
        let center = prev_y + max_height / 2.0;
        for id in layer {
            if let Some(node) = g.node_mut(id) {
                node.y = Some(center);
            }
        }
        geometry.centers.push(center);
        geometry.heights.push(max_height);
        prev_y += max_height + rank_sep;
    }
    geometry
}
