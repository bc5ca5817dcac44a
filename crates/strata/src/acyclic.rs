//! Break cycles by reversing back edges found by depth-first search.
//!
//! The search starts from every unvisited node in insertion order and scans out-edges in
//! insertion order, so the reversed set is stable for a given construction order. Reversed
//! edges carry `reversed = true` and their original name so [`undo`] can restore them.

use crate::graphlib::EdgeKey;
use crate::{Acyclicer, LayoutGraph};
use tracing::debug;

/// Reverses every back edge in place and returns the reversed keys (as they now exist).
pub fn run(g: &mut LayoutGraph) -> Vec<EdgeKey> {
    let back_edges = match g.graph().acyclicer {
        Acyclicer::Greedy => dfs_back_edges(g),
    };

    let mut reversed: Vec<EdgeKey> = Vec::with_capacity(back_edges.len());
    for e in back_edges {
        let Some(mut label) = g.edge_by_key(&e).cloned() else {
            continue;
        };
        g.remove_edge_key(&e);

        label.reversed = true;
        label.forward_name = e.name.clone();
        let name = reversed_name(g, &e);
        g.set_edge_named(e.w.clone(), e.v.clone(), name.clone(), Some(label));
        reversed.push(EdgeKey {
            v: e.w,
            w: e.v,
            name,
        });
    }
    debug!(reversed = reversed.len(), "acyclic: reversed back edges");
    reversed
}

/// Flips every reversed edge back, restoring its name and reversing its route.
pub fn undo(g: &mut LayoutGraph) {
    for e in g.edge_keys() {
        let Some(label) = g.edge_by_key(&e) else {
            continue;
        };
        if !label.reversed {
            continue;
        }
        let mut label = label.clone();
        g.remove_edge_key(&e);

        label.reversed = false;
        label.points.reverse();
        let name = label.forward_name.take();
        g.set_edge_named(e.w, e.v, name, Some(label));
    }
}

/// Keeps the original name unless `w -> v` already uses it.
///
/// Simple graphs key edges by endpoints only, so there the reversed edge merges into an
/// existing `w -> v`.
fn reversed_name(g: &LayoutGraph, e: &EdgeKey) -> Option<String> {
    if !g.is_multigraph() || !g.has_edge(&e.w, &e.v, e.name.as_deref()) {
        return e.name.clone();
    }
    (1usize..)
        .map(|i| format!("rev{i}"))
        .find(|candidate| !g.has_edge(&e.w, &e.v, Some(candidate)))
}

const UNVISITED: u8 = 0;
const ON_STACK: u8 = 1;
const DONE: u8 = 2;

fn dfs_back_edges(g: &LayoutGraph) -> Vec<EdgeKey> {
    let ids: Vec<&str> = g.nodes().collect();
    let index = crate::util::insertion_index(g);
    let mut state: Vec<u8> = vec![UNVISITED; ids.len()];
    let mut back_edges: Vec<EdgeKey> = Vec::new();

    for root in 0..ids.len() {
        if state[root] != UNVISITED {
            continue;
        }
        state[root] = ON_STACK;
        let mut stack: Vec<(usize, std::vec::IntoIter<EdgeKey>)> =
            vec![(root, g.out_edges(ids[root], None).into_iter())];

        while let Some((v, pending)) = stack.last_mut() {
            let v = *v;
            let Some(e) = pending.next() else {
                state[v] = DONE;
                stack.pop();
                continue;
            };
            if e.is_self_loop() {
                continue;
            }
            let Some(&w) = index.get(e.w.as_str()) else {
                continue;
            };
            match state[w] {
                ON_STACK => back_edges.push(e),
                UNVISITED => {
                    state[w] = ON_STACK;
                    stack.push((w, g.out_edges(ids[w], None).into_iter()));
                }
                _ => {}
            }
        }
    }
    back_edges
}
