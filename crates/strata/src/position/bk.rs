//! Brandes-Köpf style packing coordinates.
//!
//! Every node is aligned with a median neighbor in the adjacent layer, aligned chains ("blocks")
//! are compacted against their left neighbors, and the four up/down × left/right variants are
//! averaged. Everything here works on dense indices into the layer matrix.

use crate::util::EPSILON;
use crate::{Align, LayoutGraph};
use rustc_hash::FxHashMap as HashMap;
use tracing::trace;

pub const ALIGNMENTS: [Align; 4] = [Align::UL, Align::UR, Align::DL, Align::DR];

/// Block membership produced by vertical alignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alignment {
    /// Topmost (first processed) node of each node's block.
    pub root: Vec<usize>,
    /// Next node in the block, cycling back to the root.
    pub align: Vec<usize>,
}

/// The layer matrix flattened into indices, with per-node widths and adjacent-layer neighbors.
struct Layers<'a> {
    ids: Vec<&'a str>,
    layering: Vec<Vec<usize>>,
    widths: Vec<f64>,
    /// Neighbors in the layer above.
    up: Vec<Vec<usize>>,
    /// Neighbors in the layer below.
    down: Vec<Vec<usize>>,
    nodesep: f64,
}

impl<'a> Layers<'a> {
    fn build(g: &LayoutGraph, layering: &'a [Vec<String>]) -> Self {
        let mut ids: Vec<&'a str> = Vec::new();
        let mut rank_of: Vec<usize> = Vec::new();
        let mut index: HashMap<&'a str, usize> = HashMap::default();
        let mut indexed: Vec<Vec<usize>> = Vec::with_capacity(layering.len());
        for (rank, layer) in layering.iter().enumerate() {
            let mut row = Vec::with_capacity(layer.len());
            for id in layer {
                let ix = ids.len();
                ids.push(id.as_str());
                rank_of.push(rank);
                index.insert(id.as_str(), ix);
                row.push(ix);
            }
            indexed.push(row);
        }

        let widths = ids
            .iter()
            .map(|id| g.node(id).map(|n| n.width).unwrap_or(0.0))
            .collect();

        let mut up = vec![Vec::new(); ids.len()];
        let mut down = vec![Vec::new(); ids.len()];
        for (v, id) in ids.iter().enumerate() {
            for n in g.neighbors(id) {
                let Some(&w) = index.get(n) else {
                    continue;
                };
                if rank_of[w] + 1 == rank_of[v] {
                    up[v].push(w);
                } else if rank_of[v] + 1 == rank_of[w] {
                    down[v].push(w);
                }
            }
        }

        Self {
            ids,
            layering: indexed,
            widths,
            up,
            down,
            nodesep: g.graph().nodesep,
        }
    }

    fn sep(&self, u: usize, v: usize) -> f64 {
        self.widths[u] / 2.0 + self.nodesep + self.widths[v] / 2.0
    }

    /// The layer matrix as seen by one alignment: bottom-up passes reverse the layers,
    /// right-biased passes reverse each layer.
    fn oriented(&self, align: Align) -> Vec<Vec<usize>> {
        let mut layering = self.layering.clone();
        if matches!(align, Align::DL | Align::DR) {
            layering.reverse();
        }
        if matches!(align, Align::UR | Align::DR) {
            for layer in &mut layering {
                layer.reverse();
            }
        }
        layering
    }

    fn single(&self, align: Align) -> Vec<f64> {
        let layering = self.oriented(align);
        let neighbors = if matches!(align, Align::UL | Align::UR) {
            &self.up
        } else {
            &self.down
        };
        let alignment = vertical_alignment(&layering, neighbors);
        let mut xs = self.horizontal_compaction(&layering, &alignment);
        if is_right(align) {
            for x in &mut xs {
                *x = -*x;
            }
        }
        xs
    }

    /// Places blocks left to right: longest path over the block graph, then each block is pulled
    /// right as far as its right neighbors allow.
    fn horizontal_compaction(&self, layering: &[Vec<usize>], alignment: &Alignment) -> Vec<f64> {
        let n = self.ids.len();
        let root = &alignment.root;

        // Block graph over roots; parallel constraints keep the widest separation.
        let mut seps: HashMap<(usize, usize), f64> = HashMap::default();
        let mut succs: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut preds: Vec<Vec<usize>> = vec![Vec::new(); n];
        for layer in layering {
            for pair in layer.windows(2) {
                let (u, v) = (pair[0], pair[1]);
                let sep = self.sep(u, v);
                let key = (root[u], root[v]);
                match seps.get_mut(&key) {
                    Some(existing) => *existing = existing.max(sep),
                    None => {
                        seps.insert(key, sep);
                        succs[key.0].push(key.1);
                        preds[key.1].push(key.0);
                    }
                }
            }
        }

        let roots: Vec<usize> = (0..n).filter(|&v| root[v] == v).collect();
        let topo = topological_order(&roots, &preds, &succs);

        let mut xs = vec![0.0; n];
        for &b in &topo {
            xs[b] = preds[b]
                .iter()
                .map(|&p| xs[p] + seps.get(&(p, b)).copied().unwrap_or(0.0))
                .fold(0.0, f64::max);
        }
        for &b in topo.iter().rev() {
            let limit = succs[b]
                .iter()
                .map(|&s| xs[s] - seps.get(&(b, s)).copied().unwrap_or(0.0))
                .fold(f64::INFINITY, f64::min);
            if limit.is_finite() {
                xs[b] = xs[b].max(limit);
            }
        }

        (0..n).map(|v| xs[root[v]]).collect()
    }
}

fn is_right(align: Align) -> bool {
    matches!(align, Align::UR | Align::DR)
}

/// Aligns each node with the median of its neighbors in the previously processed layer.
///
/// `layering` is already oriented: layers in processing order, each left to right for the bias
/// at hand. For an even neighbor count both medians are tried, left one first. An alignment is
/// only taken when it lies strictly right of the last one made in the same layer, so blocks never
/// cross.
pub fn vertical_alignment(layering: &[Vec<usize>], neighbors: &[Vec<usize>]) -> Alignment {
    let n = neighbors.len();
    let mut root: Vec<usize> = (0..n).collect();
    let mut align: Vec<usize> = (0..n).collect();
    let mut pos = vec![0usize; n];
    for layer in layering {
        for (i, &v) in layer.iter().enumerate() {
            pos[v] = i;
        }
    }

    let mut ws: Vec<usize> = Vec::new();
    for layer in layering {
        let mut prev_idx: Option<usize> = None;
        for &v in layer {
            ws.clear();
            ws.extend(neighbors[v].iter().copied());
            if ws.is_empty() {
                continue;
            }
            ws.sort_by_key(|&w| pos[w]);
            ws.dedup();

            let mid = (ws.len() - 1) as f64 / 2.0;
            let (lo, hi) = (mid.floor() as usize, mid.ceil() as usize);
            for &w in &ws[lo..=hi] {
                if align[v] == v && prev_idx.is_none_or(|p| p < pos[w]) {
                    align[w] = v;
                    root[v] = root[w];
                    align[v] = root[v];
                    prev_idx = Some(pos[w]);
                }
            }
        }
    }
    Alignment { root, align }
}

/// Kahn order over block roots; ties resolve by layer-matrix index. Should a cycle slip in, the
/// remaining roots follow in index order.
fn topological_order(roots: &[usize], preds: &[Vec<usize>], succs: &[Vec<usize>]) -> Vec<usize> {
    let mut indegree: Vec<usize> = preds.iter().map(Vec::len).collect();
    let mut ready: std::collections::BTreeSet<usize> =
        roots.iter().copied().filter(|&r| indegree[r] == 0).collect();
    let mut order = Vec::with_capacity(roots.len());
    let mut placed = vec![false; preds.len()];
    while let Some(b) = ready.pop_first() {
        order.push(b);
        placed[b] = true;
        for &s in &succs[b] {
            indegree[s] -= 1;
            if indegree[s] == 0 {
                ready.insert(s);
            }
        }
    }
    if order.len() < roots.len() {
        tracing::warn!(
            blocks = roots.len(),
            placed = order.len(),
            "position: block graph has a cycle"
        );
        order.extend(roots.iter().copied().filter(|&r| !placed[r]));
    }
    order
}

/// Packing coordinate of one alignment, before anchoring. Keys are node ids.
pub fn align_positions(
    g: &LayoutGraph,
    layering: &[Vec<String>],
    align: Align,
) -> HashMap<String, f64> {
    let layers = Layers::build(g, layering);
    let xs = layers.single(align);
    layers
        .ids
        .iter()
        .zip(xs)
        .map(|(id, x)| (id.to_string(), x))
        .collect()
}

/// Final packing coordinate of every node in `layering`: the four alignments, shifted onto the
/// configured anchor alignment and averaged.
pub fn position_x(g: &LayoutGraph, layering: &[Vec<String>]) -> HashMap<String, f64> {
    let layers = Layers::build(g, layering);
    if layers.ids.is_empty() {
        return HashMap::default();
    }

    let mut all: Vec<(Align, Vec<f64>)> = ALIGNMENTS
        .iter()
        .map(|&align| (align, layers.single(align)))
        .collect();

    let anchor = g.graph().align;
    let (anchor_min, anchor_max) = all
        .iter()
        .find(|(align, _)| *align == anchor)
        .map(|(_, xs)| bounds(xs))
        .unwrap_or((0.0, 0.0));
    for (align, xs) in &mut all {
        let (min, max) = bounds(xs);
        let delta = if is_right(*align) {
            anchor_max - max
        } else {
            anchor_min - min
        };
        if delta.abs() > EPSILON {
            for x in xs.iter_mut() {
                *x += delta;
            }
        }
        trace!(?align, min = min + delta, max = max + delta, "position: alignment");
    }

    let count = all.len() as f64;
    layers
        .ids
        .iter()
        .enumerate()
        .map(|(v, id)| {
            let sum: f64 = all.iter().map(|(_, xs)| xs[v]).sum();
            (id.to_string(), sum / count)
        })
        .collect()
}

fn bounds(xs: &[f64]) -> (f64, f64) {
    xs.iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), &x| {
            (min.min(x), max.max(x))
        })
}

