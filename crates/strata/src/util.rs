//! Small queries and transforms shared by the layout phases.

use crate::{LayoutGraph, Point};
use rustc_hash::FxHashMap as HashMap;

/// Tolerance for float tie-breaks and "coordinates differ" checks.
pub const EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankBounds {
    pub min: i32,
    pub max: i32,
}

impl RankBounds {
    pub fn len(&self) -> usize {
        (self.max - self.min + 1).max(0) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Whether `id` takes part in ranking, ordering and positioning.
///
/// Containers (nodes with children in a compound graph) are sized around their children
/// afterwards instead.
pub fn is_layout_node(g: &LayoutGraph, id: &str) -> bool {
    g.has_node(id) && !(g.is_compound() && g.has_children(id))
}

pub fn layout_node_ids(g: &LayoutGraph) -> Vec<String> {
    g.nodes()
        .filter(|id| is_layout_node(g, id))
        .map(str::to_string)
        .collect()
}

/// Min/max rank over ranked layout nodes, derived on demand.
pub fn rank_bounds(g: &LayoutGraph) -> Option<RankBounds> {
    let mut bounds: Option<RankBounds> = None;
    for (id, node) in g.node_entries() {
        let Some(rank) = node.rank else {
            continue;
        };
        if !is_layout_node(g, id) {
            continue;
        }
        bounds = Some(match bounds {
            Some(b) => RankBounds {
                min: b.min.min(rank),
                max: b.max.max(rank),
            },
            None => RankBounds {
                min: rank,
                max: rank,
            },
        });
    }
    bounds
}

/// Shifts ranks so the smallest is 0. Returns the bounds after shifting.
pub fn normalize_ranks(g: &mut LayoutGraph) -> Option<RankBounds> {
    let bounds = rank_bounds(g)?;
    if bounds.min != 0 {
        g.for_each_node_mut(|_id, n| {
            if let Some(rank) = n.rank.as_mut() {
                *rank = rank.saturating_sub(bounds.min);
            }
        });
    }
    Some(RankBounds {
        min: 0,
        max: bounds.max.saturating_sub(bounds.min),
    })
}

/// Layout nodes grouped by rank (index = rank), each layer sorted by `order`.
///
/// Nodes without an order keep insertion order after the ordered ones. Expects normalized ranks;
/// negative ranks are skipped.
pub fn build_layer_matrix(g: &LayoutGraph) -> Vec<Vec<String>> {
    let mut layers: Vec<Vec<(usize, usize, String)>> = Vec::new();
    for (ix, (id, node)) in g.node_entries().enumerate() {
        let Some(rank) = node.rank else {
            continue;
        };
        if rank < 0 || !is_layout_node(g, id) {
            continue;
        }
        let rank = rank as usize;
        if layers.len() <= rank {
            layers.resize_with(rank + 1, Vec::new);
        }
        layers[rank].push((node.order.unwrap_or(usize::MAX), ix, id.to_string()));
    }
    layers
        .into_iter()
        .map(|mut layer| {
            layer.sort_by_key(|(order, ix, _)| (*order, *ix));
            layer.into_iter().map(|(_, _, id)| id).collect()
        })
        .collect()
}

/// Picks an unused node id: `prefix`, then `prefix1`, `prefix2`, ...
///
/// `next` carries the counter between calls so repeated allocation stays linear.
pub fn unique_node_id(g: &LayoutGraph, prefix: &str, next: &mut usize) -> String {
    loop {
        let candidate = if *next == 0 {
            prefix.to_string()
        } else {
            format!("{prefix}{next}")
        };
        *next += 1;
        if !g.has_node(&candidate) {
            return candidate;
        }
    }
}

/// Label anchor of a polyline: the middle point, or the midpoint of the two middle points when
/// the count is even.
pub fn label_anchor(points: &[Point]) -> Option<Point> {
    match points.len() {
        0 => None,
        n if n % 2 == 1 => Some(points[n / 2]),
        n => {
            let a = points[n / 2 - 1];
            let b = points[n / 2];
            Some(Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0))
        }
    }
}

/// Moves the drawing so its bounding box starts at `(marginx, marginy)` and records the overall
/// size on the graph label.
///
/// The box covers node boxes, edge points and edge label anchors. An empty drawing gets a zero
/// size.
pub fn translate_graph(g: &mut LayoutGraph) {
    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    let mut extend = |x: f64, y: f64, half_w: f64, half_h: f64| {
        min_x = min_x.min(x - half_w);
        max_x = max_x.max(x + half_w);
        min_y = min_y.min(y - half_h);
        max_y = max_y.max(y + half_h);
    };

    for (_id, node) in g.node_entries() {
        if let Some(c) = node.center() {
            extend(c.x, c.y, node.width / 2.0, node.height / 2.0);
        }
    }
    for (_key, edge) in g.edge_entries() {
        for p in &edge.points {
            extend(p.x, p.y, 0.0, 0.0);
        }
        if let (Some(x), Some(y)) = (edge.x, edge.y) {
            extend(x, y, 0.0, 0.0);
        }
    }

    let (margin_x, margin_y) = (g.graph().marginx, g.graph().marginy);
    if !min_x.is_finite() || !min_y.is_finite() {
        let label = g.graph_mut();
        label.width = 0.0;
        label.height = 0.0;
        return;
    }

    let dx = margin_x - min_x;
    let dy = margin_y - min_y;
    g.for_each_node_mut(|_id, n| {
        if let (Some(x), Some(y)) = (n.x, n.y) {
            n.x = Some(x + dx);
            n.y = Some(y + dy);
        }
    });
    g.for_each_edge_mut(|_key, e| {
        for p in &mut e.points {
            p.x += dx;
            p.y += dy;
        }
        if let (Some(x), Some(y)) = (e.x, e.y) {
            e.x = Some(x + dx);
            e.y = Some(y + dy);
        }
    });

    let label = g.graph_mut();
    label.width = max_x - min_x + 2.0 * margin_x;
    label.height = max_y - min_y + 2.0 * margin_y;
}

/// Insertion index of every node, used as the deterministic tie-breaker.
pub fn insertion_index(g: &LayoutGraph) -> HashMap<String, usize> {
    g.nodes()
        .enumerate()
        .map(|(ix, id)| (id.to_string(), ix))
        .collect()
}
