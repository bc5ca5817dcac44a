use crate::LayoutGraph;
use crate::graphlib::EdgeKey;
use rustc_hash::FxHashMap as HashMap;
use tracing::warn;

/// Longest-path ranking: every node starts at rank 0 and edges push their targets down until a
/// fixed point is reached.
///
/// On an acyclic graph the fixed point is reached within `node count` passes (no path has more
/// edges than that). The pass bound also stops the loop on a cyclic input, leaving whatever
/// ranks were reached.
pub fn longest_path(g: &mut LayoutGraph) {
    let ids = crate::util::layout_node_ids(g);
    let index: HashMap<&str, usize> = ids
        .iter()
        .enumerate()
        .map(|(i, id)| (id.as_str(), i))
        .collect();
    let edges: Vec<(usize, usize, i32)> = g
        .edge_entries()
        .filter_map(|(key, label)| {
            let v = *index.get(key.v.as_str())?;
            let w = *index.get(key.w.as_str())?;
            (v != w).then_some((v, w, i32::try_from(label.minlen).unwrap_or(i32::MAX)))
        })
        .collect();

    let mut ranks: Vec<i32> = vec![0; ids.len()];
    let mut settled = false;
    for _ in 0..=ids.len() {
        let mut changed = false;
        for &(v, w, minlen) in &edges {
            let candidate = ranks[v].saturating_add(minlen);
            if ranks[w] < candidate {
                ranks[w] = candidate;
                changed = true;
            }
        }
        if !changed {
            settled = true;
            break;
        }
    }
    if !settled {
        warn!("longest_path: no fixed point within the pass bound; graph is likely cyclic");
    }

    for (id, rank) in ids.iter().zip(ranks) {
        if let Some(node) = g.node_mut(id) {
            node.rank = Some(rank);
        }
    }
}

/// How much longer than required an edge is. Missing ranks count as 0.
pub fn slack(g: &LayoutGraph, e: &EdgeKey) -> i32 {
    let v_rank = g.node(&e.v).and_then(|n| n.rank).unwrap_or(0);
    let w_rank = g.node(&e.w).and_then(|n| n.rank).unwrap_or(0);
    let minlen = g
        .edge_by_key(e)
        .map_or(1, |l| i32::try_from(l.minlen).unwrap_or(i32::MAX));
    w_rank.saturating_sub(v_rank).saturating_sub(minlen)
}
