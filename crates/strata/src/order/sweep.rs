//! Index-based barycenter sweeps.

use super::cross_count::bilayer_crossings;
use crate::LayoutGraph;
use crate::util::EPSILON;
use rustc_hash::FxHashMap as HashMap;

/// Adjacency between neighboring layers, with parallel edges merged (weights summed).
///
/// Node indices follow graph insertion order, which doubles as the tie-breaker.
pub(super) struct LayerGraph {
    ids: Vec<String>,
    index: HashMap<String, usize>,
    /// Neighbors in the layer above, with edge weight.
    up: Vec<Vec<(usize, f64)>>,
    /// Neighbors in the layer below, with edge weight.
    down: Vec<Vec<(usize, f64)>>,
}

impl LayerGraph {
    pub(super) fn build(g: &LayoutGraph, layering: &[Vec<String>]) -> Self {
        let mut rank_of: HashMap<&str, usize> = HashMap::default();
        for (rank, layer) in layering.iter().enumerate() {
            for v in layer {
                rank_of.insert(v.as_str(), rank);
            }
        }
        let ids: Vec<String> = g
            .nodes()
            .filter(|id| rank_of.contains_key(id))
            .map(str::to_string)
            .collect();
        let index: HashMap<String, usize> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect();

        let mut up: Vec<Vec<(usize, f64)>> = vec![Vec::new(); ids.len()];
        let mut down: Vec<Vec<(usize, f64)>> = vec![Vec::new(); ids.len()];
        for (key, label) in g.edge_entries() {
            let (Some(&rv), Some(&rw)) = (rank_of.get(key.v.as_str()), rank_of.get(key.w.as_str()))
            else {
                continue;
            };
            let (Some(&v), Some(&w)) = (index.get(key.v.as_str()), index.get(key.w.as_str()))
            else {
                continue;
            };
            let (upper, lower) = if rw == rv + 1 {
                (v, w)
            } else if rv == rw + 1 {
                (w, v)
            } else {
                continue;
            };
            add_weight(&mut down[upper], lower, label.weight);
            add_weight(&mut up[lower], upper, label.weight);
        }

        Self {
            ids,
            index,
            up,
            down,
        }
    }

    pub(super) fn id(&self, v: usize) -> &str {
        &self.ids[v]
    }

    pub(super) fn index_layering(&self, layering: &[Vec<String>]) -> Vec<Vec<usize>> {
        layering
            .iter()
            .map(|layer| {
                layer
                    .iter()
                    .filter_map(|v| self.index.get(v.as_str()).copied())
                    .collect()
            })
            .collect()
    }

    pub(super) fn crossings(&self, layering: &[Vec<usize>]) -> f64 {
        let mut pos = vec![0usize; self.ids.len()];
        for layer in layering {
            for (i, &v) in layer.iter().enumerate() {
                pos[v] = i;
            }
        }
        let mut total = 0.0;
        for pair in layering.windows(2) {
            let mut entries: Vec<(usize, f64)> = Vec::new();
            for &v in &pair[0] {
                let start = entries.len();
                entries.extend(self.down[v].iter().map(|&(w, weight)| (pos[w], weight)));
                entries[start..].sort_by_key(|&(p, _)| p);
            }
            total += bilayer_crossings(&entries, pair[1].len());
        }
        total
    }

    /// One pass over all layers. Downward passes sort each layer by its predecessors in the
    /// layer above; upward passes by successors in the layer below.
    pub(super) fn sweep(&self, layering: &mut [Vec<usize>], downward: bool) {
        let mut pos = vec![0usize; self.ids.len()];
        for layer in layering.iter() {
            for (i, &v) in layer.iter().enumerate() {
                pos[v] = i;
            }
        }

        let ranks: Vec<usize> = if downward {
            (1..layering.len()).collect()
        } else {
            (0..layering.len().saturating_sub(1)).rev().collect()
        };
        let neighbors = if downward { &self.up } else { &self.down };

        for r in ranks {
            let layer = &mut layering[r];
            let mut keyed: Vec<(i64, usize)> = layer
                .iter()
                .map(|&v| {
                    let bc = barycenter(&neighbors[v], &pos).unwrap_or(pos[v] as f64);
                    ((bc / EPSILON).round() as i64, v)
                })
                .collect();
            // Node index is insertion order: the tie-breaker.
            keyed.sort_unstable();
            for (i, (_, v)) in keyed.into_iter().enumerate() {
                layer[i] = v;
                pos[v] = i;
            }
        }
    }
}

/// Weighted mean position of `neighbors`, or `None` when there are none (or all weigh 0).
fn barycenter(neighbors: &[(usize, f64)], pos: &[usize]) -> Option<f64> {
    let (sum, weight) = neighbors
        .iter()
        .fold((0.0, 0.0), |(sum, weight), &(u, w)| {
            (sum + w * pos[u] as f64, weight + w)
        });
    (weight > 0.0).then(|| sum / weight)
}

fn add_weight(list: &mut Vec<(usize, f64)>, target: usize, weight: f64) {
    match list.iter_mut().find(|(t, _)| *t == target) {
        Some((_, w)) => *w += weight,
        None => list.push((target, weight)),
    }
}
