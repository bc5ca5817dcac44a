use crate::LayoutGraph;
use rustc_hash::FxHashMap as HashMap;

/// Weighted crossings of `layering`, summed over adjacent layer pairs.
///
/// Two edges cross when their north ends and south ends are in opposite order; a crossing costs
/// the product of the two edge weights.
pub fn cross_count(g: &LayoutGraph, layering: &[Vec<String>]) -> f64 {
    let mut total = 0.0;
    for pair in layering.windows(2) {
        let (north, south) = (&pair[0], &pair[1]);
        let south_pos: HashMap<&str, usize> = south
            .iter()
            .enumerate()
            .map(|(i, v)| (v.as_str(), i))
            .collect();

        let mut entries: Vec<(usize, f64)> = Vec::new();
        for v in north {
            let start = entries.len();
            for e in g.out_edges(v, None) {
                let Some(&pos) = south_pos.get(e.w.as_str()) else {
                    continue;
                };
                let weight = g.edge_by_key(&e).map(|l| l.weight).unwrap_or(0.0);
                entries.push((pos, weight));
            }
            entries[start..].sort_by_key(|&(pos, _)| pos);
        }
        total += bilayer_crossings(&entries, south.len());
    }
    total
}

/// Crossings between two layers (Barth, Jünger and Mutzel accumulator tree).
///
/// `entries` lists every edge as `(south position, weight)`, grouped by north node in north
/// order and sorted by south position within a group.
pub(super) fn bilayer_crossings(entries: &[(usize, f64)], south_len: usize) -> f64 {
    if south_len == 0 {
        return 0.0;
    }
    let mut first_leaf = 1usize;
    while first_leaf < south_len {
        first_leaf <<= 1;
    }
    let mut tree: Vec<f64> = vec![0.0; 2 * first_leaf - 1];
    first_leaf -= 1;

    let mut crossings = 0.0;
    for &(pos, weight) in entries {
        let mut index = pos + first_leaf;
        tree[index] += weight;
        let mut right_of = 0.0;
        while index > 0 {
            // Left children have odd indices; their right sibling holds later south positions.
            if index % 2 == 1 {
                right_of += tree[index + 1];
            }
            index = (index - 1) / 2;
            tree[index] += weight;
        }
        crossings += weight * right_of;
    }
    crossings
}
