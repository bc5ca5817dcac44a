//! Network simplex ranking (Gansner et al., "A Technique for Drawing Directed Graphs").
//!
//! Each connected component is solved on its own index-based [`Simplex`] instance: parallel
//! edges are merged (weights summed, the largest `minlen` kept), a feasible tight spanning tree
//! is grown from longest-path ranks, and tree edges with negative cut values are exchanged for
//! the minimum-slack non-tree edge crossing the same cut until none remain.
//!
//! All scratch state (tree membership, `low`/`lim`, tree parents, cut values) lives on the
//! `Simplex` value; only final ranks are written back to the graph.

use crate::LayoutGraph;
use crate::graphlib::alg;
use rustc_hash::FxHashMap as HashMap;
use tracing::{trace, warn};

/// Cut values above this (negative) threshold are treated as optimal.
const CUT_EPSILON: f64 = 1e-6;

pub fn network_simplex(g: &mut LayoutGraph) {
    super::util::longest_path(g);
    for component in layout_components(g) {
        let mut simplex = Simplex::new(g, &component);
        simplex.run();
        simplex.write_ranks(g);
    }
}

/// Tightens longest-path ranks with a feasible tree without running the exchange loop.
pub fn tight_tree(g: &mut LayoutGraph) {
    for component in layout_components(g) {
        let mut simplex = Simplex::new(g, &component);
        if !simplex.feasible_tree() {
            warn!("tight_tree: component is not connected; keeping partial tree ranks");
        }
        simplex.write_ranks(g);
    }
}

fn layout_components(g: &LayoutGraph) -> Vec<Vec<String>> {
    alg::components(g)
        .into_iter()
        .map(|component| {
            component
                .into_iter()
                .filter(|id| crate::util::is_layout_node(g, id))
                .collect::<Vec<_>>()
        })
        .filter(|component| !component.is_empty())
        .collect()
}

#[derive(Debug, Clone, Copy)]
struct SimplexEdge {
    v: usize,
    w: usize,
    weight: f64,
    minlen: i32,
}

/// Network simplex state over one connected set of nodes.
#[derive(Debug, Clone)]
pub struct Simplex {
    ids: Vec<String>,
    index: HashMap<String, usize>,
    edges: Vec<SimplexEdge>,
    incident: Vec<Vec<usize>>,
    rank: Vec<i32>,

    in_tree: Vec<bool>,
    tree_edge: Vec<bool>,
    cutvalue: Vec<f64>,
    parent_edge: Vec<Option<usize>>,
    low: Vec<usize>,
    lim: Vec<usize>,
}

impl Simplex {
    /// Captures `ids` and the edges among them. Initial ranks come from the node labels
    /// (missing ranks count as 0) and must already be feasible.
    pub fn new(g: &LayoutGraph, ids: &[String]) -> Self {
        let index: HashMap<String, usize> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect();

        let mut edges: Vec<SimplexEdge> = Vec::new();
        let mut merged: HashMap<(usize, usize), usize> = HashMap::default();
        for (key, label) in g.edge_entries() {
            let (Some(&v), Some(&w)) = (index.get(key.v.as_str()), index.get(key.w.as_str()))
            else {
                continue;
            };
            if v == w {
                continue;
            }
            let minlen = i32::try_from(label.minlen).unwrap_or(i32::MAX);
            match merged.get(&(v, w)) {
                Some(&e) => {
                    edges[e].weight += label.weight;
                    edges[e].minlen = edges[e].minlen.max(minlen);
                }
                None => {
                    merged.insert((v, w), edges.len());
                    edges.push(SimplexEdge {
                        v,
                        w,
                        weight: label.weight,
                        minlen,
                    });
                }
            }
        }

        let mut incident: Vec<Vec<usize>> = vec![Vec::new(); ids.len()];
        for (e, edge) in edges.iter().enumerate() {
            incident[edge.v].push(e);
            incident[edge.w].push(e);
        }

        let rank = ids
            .iter()
            .map(|id| g.node(id).and_then(|n| n.rank).unwrap_or(0))
            .collect();

        let n = ids.len();
        let m = edges.len();
        Self {
            ids: ids.to_vec(),
            index,
            edges,
            incident,
            rank,
            in_tree: vec![false; n],
            tree_edge: vec![false; m],
            cutvalue: vec![0.0; m],
            parent_edge: vec![None; n],
            low: vec![0; n],
            lim: vec![0; n],
        }
    }

    /// Like [`new`](Self::new) but with a caller-chosen spanning tree given as endpoint pairs
    /// (either orientation). Low/lim values and cut values are initialized.
    pub fn with_tree(g: &LayoutGraph, ids: &[String], tree: &[(&str, &str)]) -> Self {
        let mut simplex = Self::new(g, ids);
        for &(a, b) in tree {
            if let Some(e) = simplex.edge_between(a, b) {
                simplex.tree_edge[e] = true;
                let SimplexEdge { v, w, .. } = simplex.edges[e];
                simplex.in_tree[v] = true;
                simplex.in_tree[w] = true;
            }
        }
        simplex.init_low_lim_values();
        simplex.init_cut_values();
        simplex
    }

    /// Full optimization: feasible tree, then exchanges until no cut value is negative.
    pub fn run(&mut self) {
        if !self.feasible_tree() {
            warn!("network_simplex: nodes are not connected; skipping exchanges");
            return;
        }
        self.init_low_lim_values();
        self.init_cut_values();

        let cap = 10 * (self.ids.len() + self.edges.len()) + 100;
        let mut exchanges = 0usize;
        while let Some(leave) = self.leave() {
            let Some(enter) = self.enter(leave) else {
                warn!("network_simplex: no entering edge for a negative cut value");
                break;
            };
            if exchanges == cap {
                warn!(cap, "network_simplex: exchange cap reached");
                break;
            }
            trace!(
                leave = %self.describe(leave),
                enter = %self.describe(enter),
                "network_simplex: exchange"
            );
            self.exchange(leave, enter);
            exchanges += 1;
        }
        trace!(
            exchanges,
            nodes = self.ids.len(),
            "network_simplex: component done"
        );
    }

    /// Grows a spanning tree of tight edges (slack 0), shifting the tree's ranks toward the
    /// closest outside node whenever growth stalls. Returns `false` if the nodes are not all
    /// connected.
    pub fn feasible_tree(&mut self) -> bool {
        let n = self.ids.len();
        self.in_tree.fill(false);
        self.tree_edge.fill(false);
        if n == 0 {
            return true;
        }
        self.in_tree[0] = true;
        let mut size = 1;
        loop {
            size += self.grow_tight_tree();
            if size >= n {
                return true;
            }
            let Some(e) = self.min_slack_crossing_edge() else {
                return false;
            };
            let slack = self.slack(e);
            let delta = if self.in_tree[self.edges[e].v] {
                slack
            } else {
                -slack
            };
            for v in 0..n {
                if self.in_tree[v] {
                    self.rank[v] = self.rank[v].saturating_add(delta);
                }
            }
        }
    }

    fn grow_tight_tree(&mut self) -> usize {
        let mut added = 0;
        let mut stack: Vec<usize> = (0..self.ids.len()).filter(|&v| self.in_tree[v]).collect();
        while let Some(v) = stack.pop() {
            for i in 0..self.incident[v].len() {
                let e = self.incident[v][i];
                let w = self.other(e, v);
                if !self.in_tree[w] && self.slack(e) == 0 {
                    self.in_tree[w] = true;
                    self.tree_edge[e] = true;
                    stack.push(w);
                    added += 1;
                }
            }
        }
        added
    }

    fn min_slack_crossing_edge(&self) -> Option<usize> {
        let mut best: Option<(i32, usize)> = None;
        for (e, edge) in self.edges.iter().enumerate() {
            if self.in_tree[edge.v] == self.in_tree[edge.w] {
                continue;
            }
            let slack = self.slack(e);
            if best.is_none_or(|(s, _)| slack < s) {
                best = Some((slack, e));
            }
        }
        best.map(|(_, e)| e)
    }

    /// Postorder numbering of the tree from node 0: `lim` is a node's postorder number and
    /// `low` the smallest number in its subtree, so `x` is below `v` iff
    /// `low[v] <= lim[x] <= lim[v]`.
    pub fn init_low_lim_values(&mut self) {
        let n = self.ids.len();
        self.parent_edge.fill(None);
        if n == 0 {
            return;
        }
        let mut visited = vec![false; n];
        let mut next_lim = 1usize;
        // (node, next incident edge to inspect, low)
        let mut stack: Vec<(usize, usize, usize)> = vec![(0, 0, next_lim)];
        visited[0] = true;
        while let Some(frame) = stack.last_mut() {
            let (v, cursor, low) = *frame;
            if let Some(&e) = self.incident[v].get(cursor) {
                frame.1 += 1;
                if !self.tree_edge[e] {
                    continue;
                }
                let w = self.other(e, v);
                if visited[w] {
                    continue;
                }
                visited[w] = true;
                self.parent_edge[w] = Some(e);
                stack.push((w, 0, next_lim));
            } else {
                self.low[v] = low;
                self.lim[v] = next_lim;
                next_lim += 1;
                stack.pop();
            }
        }
    }

    /// Computes every tree edge's cut value, children before parents.
    pub fn init_cut_values(&mut self) {
        let mut children: Vec<usize> = (0..self.ids.len())
            .filter(|&v| self.parent_edge[v].is_some())
            .collect();
        children.sort_by_key(|&v| self.lim[v]);
        for child in children {
            if let Some(e) = self.parent_edge[child] {
                self.cutvalue[e] = self.calc_cut_value(child);
            }
        }
    }

    /// Cut value of the tree edge joining `child` to its tree parent, given the cut values of
    /// the tree edges below `child`.
    fn calc_cut_value(&self, child: usize) -> f64 {
        let Some(tree_e) = self.parent_edge[child] else {
            return 0.0;
        };
        let parent = self.other(tree_e, child);
        let child_is_tail = self.edges[tree_e].v == child;

        let mut cut = self.edges[tree_e].weight;
        for &e in &self.incident[child] {
            let is_out = self.edges[e].v == child;
            let other = self.other(e, child);
            if other == parent {
                continue;
            }
            let points_to_head = is_out == child_is_tail;
            let weight = self.edges[e].weight;
            cut += if points_to_head { weight } else { -weight };
            if self.tree_edge[e] {
                let below = self.cutvalue[e];
                cut += if points_to_head { -below } else { below };
            }
        }
        cut
    }

    /// Tree edge with the most negative cut value.
    fn leave(&self) -> Option<usize> {
        let mut best: Option<usize> = None;
        for e in 0..self.edges.len() {
            if !self.tree_edge[e] || self.cutvalue[e] >= -CUT_EPSILON {
                continue;
            }
            if best.is_none_or(|b| self.cutvalue[e] < self.cutvalue[b]) {
                best = Some(e);
            }
        }
        best
    }

    /// Minimum-slack edge crossing the cut of `leave` in the opposite direction.
    fn enter(&self, leave: usize) -> Option<usize> {
        let SimplexEdge { v, w, .. } = self.edges[leave];
        // The tail side of the cut is the subtree hanging below the leaving edge. When the
        // root sits on the tail side the head/tail tests flip.
        let (subtree, flip) = if self.lim[v] > self.lim[w] {
            (w, true)
        } else {
            (v, false)
        };
        let is_below = |x: usize| {
            self.low[subtree] <= self.lim[x] && self.lim[x] <= self.lim[subtree]
        };

        let mut best: Option<(i32, usize)> = None;
        for (e, edge) in self.edges.iter().enumerate() {
            if flip != is_below(edge.v) || flip == is_below(edge.w) {
                continue;
            }
            let slack = self.slack(e);
            if best.is_none_or(|(s, _)| slack < s) {
                best = Some((slack, e));
            }
        }
        best.map(|(_, e)| e)
    }

    fn exchange(&mut self, leave: usize, enter: usize) {
        self.tree_edge[leave] = false;
        self.tree_edge[enter] = true;
        self.init_low_lim_values();
        self.init_cut_values();
        self.update_ranks();
    }

    /// Re-derives ranks from the root down so every tree edge is tight again.
    fn update_ranks(&mut self) {
        let mut nodes: Vec<usize> = (0..self.ids.len())
            .filter(|&v| self.parent_edge[v].is_some())
            .collect();
        // Parents have larger lim than their children.
        nodes.sort_by_key(|&v| std::cmp::Reverse(self.lim[v]));
        for v in nodes {
            let Some(e) = self.parent_edge[v] else {
                continue;
            };
            let edge = self.edges[e];
            self.rank[v] = if edge.v == v {
                self.rank[edge.w].saturating_sub(edge.minlen)
            } else {
                self.rank[edge.v].saturating_add(edge.minlen)
            };
        }
    }

    fn slack(&self, e: usize) -> i32 {
        let edge = &self.edges[e];
        self.rank[edge.w]
            .saturating_sub(self.rank[edge.v])
            .saturating_sub(edge.minlen)
    }

    fn other(&self, e: usize, v: usize) -> usize {
        let edge = &self.edges[e];
        if edge.v == v { edge.w } else { edge.v }
    }

    fn edge_between(&self, a: &str, b: &str) -> Option<usize> {
        let a = *self.index.get(a)?;
        let b = *self.index.get(b)?;
        self.incident[a]
            .iter()
            .copied()
            .find(|&e| self.other(e, a) == b)
    }

    fn describe(&self, e: usize) -> String {
        let edge = &self.edges[e];
        format!("{} -> {}", self.ids[edge.v], self.ids[edge.w])
    }

    fn endpoints(&self, e: usize) -> (String, String) {
        let edge = &self.edges[e];
        (self.ids[edge.v].clone(), self.ids[edge.w].clone())
    }

    /// Writes ranks back, shifted so this component starts at rank 0.
    pub fn write_ranks(&self, g: &mut LayoutGraph) {
        let min = self.rank.iter().copied().min().unwrap_or(0);
        for (id, &rank) in self.ids.iter().zip(&self.rank) {
            if let Some(node) = g.node_mut(id) {
                node.rank = Some(rank.saturating_sub(min));
            }
        }
    }

    // ---- inspection ------------------------------------------------------------------------

    pub fn rank(&self, v: &str) -> Option<i32> {
        self.index.get(v).map(|&i| self.rank[i])
    }

    /// Cut value of the tree edge between `a` and `b` (either orientation).
    pub fn cut_value(&self, a: &str, b: &str) -> Option<f64> {
        let e = self.edge_between(a, b)?;
        self.tree_edge[e].then_some(self.cutvalue[e])
    }

    /// Slack of the merged edge between `a` and `b` (either orientation) under current ranks.
    pub fn edge_slack(&self, a: &str, b: &str) -> Option<i32> {
        self.edge_between(a, b).map(|e| self.slack(e))
    }

    pub fn low_lim(&self, v: &str) -> Option<(usize, usize)> {
        self.index.get(v).map(|&i| (self.low[i], self.lim[i]))
    }

    pub fn tree_parent(&self, v: &str) -> Option<&str> {
        let i = *self.index.get(v)?;
        let e = self.parent_edge[i]?;
        Some(self.ids[self.other(e, i)].as_str())
    }

    /// Tree edges as graph-oriented `(v, w)` pairs.
    pub fn tree_edges(&self) -> Vec<(String, String)> {
        (0..self.edges.len())
            .filter(|&e| self.tree_edge[e])
            .map(|e| self.endpoints(e))
            .collect()
    }

    pub fn leave_edge(&self) -> Option<(String, String)> {
        self.leave().map(|e| self.endpoints(e))
    }

    /// Entering edge for the tree edge between `a` and `b`.
    pub fn enter_edge(&self, a: &str, b: &str) -> Option<(String, String)> {
        let leave = self.edge_between(a, b)?;
        self.enter(leave).map(|e| self.endpoints(e))
    }

    /// Swaps a tree edge for a non-tree edge and restores tree bookkeeping and tight ranks.
    /// Returns `false` if either edge is unknown or the roles don't match.
    pub fn exchange_edges(&mut self, leave: (&str, &str), enter: (&str, &str)) -> bool {
        let (Some(l), Some(e)) = (
            self.edge_between(leave.0, leave.1),
            self.edge_between(enter.0, enter.1),
        ) else {
            return false;
        };
        if !self.tree_edge[l] || self.tree_edge[e] {
            return false;
        }
        self.exchange(l, e);
        true
    }

    /// Sum of `weight * (rank(w) - rank(v))` over the merged edges.
    pub fn weighted_length(&self) -> f64 {
        self.edges
            .iter()
            .map(|e| e.weight * (f64::from(self.rank[e.w]) - f64::from(self.rank[e.v])))
            .sum()
    }
}
