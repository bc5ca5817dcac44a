//! Node ordering / crossing minimization.
//!
//! Long edges are first split into dummy chains so every edge joins adjacent ranks. Layers start
//! in insertion order and are then swept alternately downward and upward, re-sorting each layer
//! by the weighted barycenter of its neighbors in the layer just processed. The layering with
//! the fewest weighted crossings seen (the initial one included) wins, so the result never has
//! more crossings than the starting point.

mod cross_count;
mod init_order;
mod sweep;

pub use cross_count::cross_count;
pub use init_order::init_order;

use crate::{LayoutGraph, normalize};
use sweep::LayerGraph;
use tracing::{debug, trace};

/// Sweep passes, alternating downward and upward.
pub const SWEEP_ITERATIONS: usize = 24;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderStats {
    /// Weighted crossings of the initial layering (dummy chains included).
    pub initial_crossings: f64,
    /// Weighted crossings of the layering that was kept.
    pub crossings: f64,
    /// Dummy nodes used while ordering.
    pub dummies: usize,
}

/// Assigns a contiguous `order` to every layout node within its rank.
pub fn order(g: &mut LayoutGraph) -> OrderStats {
    let chains = normalize::run(g);
    let dummies = chains.iter().map(|c| c.dummies.len()).sum();

    let layering = init_order(g);
    let lg = LayerGraph::build(g, &layering);
    let mut current = lg.index_layering(&layering);

    let initial_crossings = lg.crossings(&current);
    let mut best = current.clone();
    let mut best_crossings = initial_crossings;
    for iteration in 0..SWEEP_ITERATIONS {
        let downward = iteration % 2 == 0;
        lg.sweep(&mut current, downward);
        let crossings = lg.crossings(&current);
        trace!(iteration, downward, crossings, "order: sweep");
        if crossings < best_crossings {
            best_crossings = crossings;
            best.clone_from(&current);
        }
    }

    for layer in &best {
        for (order, &v) in layer.iter().enumerate() {
            if let Some(node) = g.node_mut(lg.id(v)) {
                node.order = Some(order);
            }
        }
    }

    normalize::undo(g, chains);
    compact_orders(g);

    debug!(
        initial_crossings,
        crossings = best_crossings,
        dummies,
        "order: layers ordered"
    );
    OrderStats {
        initial_crossings,
        crossings: best_crossings,
        dummies,
    }
}

/// Renumbers orders `0..n` per rank, keeping relative order.
fn compact_orders(g: &mut LayoutGraph) {
    for layer in crate::util::build_layer_matrix(g) {
        for (order, id) in layer.iter().enumerate() {
            if let Some(node) = g.node_mut(id) {
                node.order = Some(order);
            }
        }
    }
}
