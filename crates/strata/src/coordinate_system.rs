//! Rank-direction transforms.
//!
//! Every phase between `adjust` and `undo` works top-to-bottom. Horizontal directions swap node
//! boxes going in and swap axes coming out; reversed directions mirror the rank axis (the final
//! translation moves the drawing back into positive space).

use crate::LayoutGraph;

pub fn adjust(g: &mut LayoutGraph) {
    if g.graph().rankdir.is_horizontal() {
        swap_width_height(g);
    }
}

pub fn undo(g: &mut LayoutGraph) {
    let rankdir = g.graph().rankdir;
    if rankdir.is_reversed() {
        reverse_y(g);
    }
    if rankdir.is_horizontal() {
        swap_xy(g);
        swap_width_height(g);
    }
}

fn swap_width_height(g: &mut LayoutGraph) {
    g.for_each_node_mut(|_id, n| {
        (n.width, n.height) = (n.height, n.width);
    });
}

fn reverse_y(g: &mut LayoutGraph) {
    g.for_each_node_mut(|_id, n| {
        if let Some(y) = n.y {
            n.y = Some(-y);
        }
    });
    g.for_each_edge_mut(|_key, e| {
        for p in &mut e.points {
            p.y = -p.y;
        }
        if let Some(y) = e.y {
            e.y = Some(-y);
        }
    });
}

fn swap_xy(g: &mut LayoutGraph) {
    g.for_each_node_mut(|_id, n| {
        if let (Some(x), Some(y)) = (n.x, n.y) {
            n.x = Some(y);
            n.y = Some(x);
        }
    });
    g.for_each_edge_mut(|_key, e| {
        for p in &mut e.points {
            (p.x, p.y) = (p.y, p.x);
        }
        if let (Some(x), Some(y)) = (e.x, e.y) {
            e.x = Some(y);
            e.y = Some(x);
        }
    });
}
