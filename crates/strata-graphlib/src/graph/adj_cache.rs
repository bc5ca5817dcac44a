//! Lazily rebuilt adjacency index used by [`Graph`](super::Graph).
//!
//! Layout phases query successors / predecessors / incident edges many times between mutations,
//! so edge indices are bucketed per node in compressed (offsets + flat list) form. The index is
//! tagged with the graph's structural generation and rebuilt on first query after a change.

#[derive(Debug, Clone)]
pub(in crate::graph) struct AdjCache {
    pub(in crate::graph) generation: u64,
    out_offsets: Vec<usize>,
    out_edges: Vec<usize>,
    in_offsets: Vec<usize>,
    in_edges: Vec<usize>,
}

impl AdjCache {
    /// Builds the index from `(v_ix, w_ix)` endpoint pairs listed in edge order.
    ///
    /// For undirected graphs every edge is listed as outgoing and incoming at both endpoints
    /// (a self loop only once).
    pub(in crate::graph) fn build(
        generation: u64,
        node_count: usize,
        endpoints: &[(usize, usize)],
        directed: bool,
    ) -> Self {
        let mut out_buckets: Vec<Vec<usize>> = vec![Vec::new(); node_count];
        let mut in_buckets: Vec<Vec<usize>> = vec![Vec::new(); node_count];
        for (edge_ix, &(v_ix, w_ix)) in endpoints.iter().enumerate() {
            out_buckets[v_ix].push(edge_ix);
            in_buckets[w_ix].push(edge_ix);
            if !directed && v_ix != w_ix {
                out_buckets[w_ix].push(edge_ix);
                in_buckets[v_ix].push(edge_ix);
            }
        }
        if !directed {
            // Keep incident lists in edge insertion order.
            for bucket in out_buckets.iter_mut().chain(in_buckets.iter_mut()) {
                bucket.sort_unstable();
            }
        }
        let (out_offsets, out_edges) = flatten(out_buckets);
        let (in_offsets, in_edges) = flatten(in_buckets);
        Self {
            generation,
            out_offsets,
            out_edges,
            in_offsets,
            in_edges,
        }
    }

    pub(in crate::graph) fn out_edges(&self, v_ix: usize) -> &[usize] {
        &self.out_edges[self.out_offsets[v_ix]..self.out_offsets[v_ix + 1]]
    }

    pub(in crate::graph) fn in_edges(&self, v_ix: usize) -> &[usize] {
        &self.in_edges[self.in_offsets[v_ix]..self.in_offsets[v_ix + 1]]
    }
}

fn flatten(buckets: Vec<Vec<usize>>) -> (Vec<usize>, Vec<usize>) {
    let mut offsets = Vec::with_capacity(buckets.len() + 1);
    let mut flat = Vec::with_capacity(buckets.iter().map(Vec::len).sum());
    offsets.push(0);
    for bucket in buckets {
        flat.extend(bucket);
        offsets.push(flat.len());
    }
    (offsets, flat)
}
