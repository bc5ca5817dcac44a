//! Self-loop extraction and reinsertion.
//!
//! A self loop can never satisfy `minlen`, so loops sit out ranking, ordering and positioning and
//! come back once their node has a position, drawn as a small loop on the node's right side.

use crate::graphlib::EdgeKey;
use crate::util::label_anchor;
use crate::{EdgeLabel, LayoutGraph, Point};
use tracing::debug;

/// Self loops removed from the graph, in edge insertion order.
#[derive(Debug, Clone, Default)]
pub struct RemovedLoops {
    pub edges: Vec<(EdgeKey, EdgeLabel)>,
}

impl RemovedLoops {
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

pub fn remove(g: &mut LayoutGraph) -> RemovedLoops {
    let mut removed = RemovedLoops::default();
    for key in g.edge_keys() {
        if !key.is_self_loop() {
            continue;
        }
        if let Some(label) = g.edge_by_key(&key).cloned() {
            g.remove_edge_key(&key);
            removed.edges.push((key, label));
        }
    }
    if !removed.is_empty() {
        debug!(loops = removed.len(), "self_edges: removed");
    }
    removed
}

/// Puts the loops back with their routes. The k-th loop on a node reaches `edgesep · (k + 1)` past
/// the node's right edge and spans half the node's height.
pub fn restore(g: &mut LayoutGraph, removed: RemovedLoops) {
    let edgesep = g.graph().edgesep;
    let mut per_node: rustc_hash::FxHashMap<String, usize> = Default::default();
    for (key, mut label) in removed.edges {
        let nth = per_node.entry(key.v.clone()).or_insert(0);
        let reach = edgesep * (*nth as f64 + 1.0);
        *nth += 1;

        if let Some((node, center)) = g.node(&key.v).and_then(|n| Some((n, n.center()?))) {
            let right = center.x + node.width / 2.0;
            let dy = node.height / 4.0;
            label.points = vec![
                Point::new(right, center.y - dy),
                Point::new(right + reach / 2.0, center.y - dy),
                Point::new(right + reach, center.y),
                Point::new(right + reach / 2.0, center.y + dy),
                Point::new(right, center.y + dy),
            ];
            let anchor = label_anchor(&label.points);
            label.x = anchor.map(|p| p.x);
            label.y = anchor.map(|p| p.y);
        }
        g.set_edge_key(key, label);
    }
}
