//! The [`Graph`] store plus a few traversal helpers in [`alg`].

mod adj_cache;
pub mod alg;
mod edge_key;
mod entries;
mod options;

use crate::{Error, Result};
use adj_cache::AdjCache;
use edge_key::EdgeKeyRef;
use entries::{EdgeEntry, NodeEntry};
use rustc_hash::FxBuildHasher;
use std::cell::RefCell;

pub use edge_key::EdgeKey;
pub use options::GraphOptions;

type HashMap<K, V> = hashbrown::HashMap<K, V, FxBuildHasher>;
type HashSet<T> = hashbrown::HashSet<T, FxBuildHasher>;

/// Insertion-ordered graph with node labels `N`, edge labels `E` and a graph label `G`.
///
/// Iteration over nodes and edges always follows insertion order; hash maps are only used for
/// lookup. Queries never panic on unknown ids: they return `None`, an empty list or `false`.
///
/// Queries take `&self` but share a lazily rebuilt adjacency index behind a `RefCell`, so a
/// `Graph` is `Send` (it can be built on one thread and laid out on another) but not `Sync`.
pub struct Graph<N, E, G>
where
    N: Default + 'static,
    E: Default + 'static,
    G: Default,
{
    options: GraphOptions,

    label: G,
    default_node_label: Box<dyn Fn() -> N + Send + Sync>,
    default_edge_label: Box<dyn Fn() -> E + Send + Sync>,

    nodes: Vec<NodeEntry<N>>,
    node_index: HashMap<String, usize>,

    edges: Vec<EdgeEntry<E>>,
    edge_index: HashMap<EdgeKey, usize>,

    parent: HashMap<String, String>,
    children: HashMap<String, Vec<String>>,

    generation: u64,
    adj: RefCell<Option<AdjCache>>,
}

impl<N, E, G> Default for Graph<N, E, G>
where
    N: Default + 'static,
    E: Default + 'static,
    G: Default,
{
    fn default() -> Self {
        Self::new(GraphOptions::default())
    }
}

impl<N, E, G> Graph<N, E, G>
where
    N: Default + 'static,
    E: Default + 'static,
    G: Default,
{
    pub fn new(options: GraphOptions) -> Self {
        Self {
            options,
            label: G::default(),
            default_node_label: Box::new(N::default),
            default_edge_label: Box::new(E::default),
            nodes: Vec::new(),
            node_index: HashMap::default(),
            edges: Vec::new(),
            edge_index: HashMap::default(),
            parent: HashMap::default(),
            children: HashMap::default(),
            generation: 0,
            adj: RefCell::new(None),
        }
    }

    pub fn options(&self) -> GraphOptions {
        self.options
    }

    pub fn is_directed(&self) -> bool {
        self.options.directed
    }

    pub fn is_multigraph(&self) -> bool {
        self.options.multigraph
    }

    pub fn is_compound(&self) -> bool {
        self.options.compound
    }

    pub fn set_graph(&mut self, label: G) -> &mut Self {
        self.label = label;
        self
    }

    pub fn graph(&self) -> &G {
        &self.label
    }

    pub fn graph_mut(&mut self) -> &mut G {
        &mut self.label
    }

    /// Label factory used by [`ensure_node`](Self::ensure_node) and implicit endpoint creation.
    pub fn set_default_node_label<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn() -> N + Send + Sync + 'static,
    {
        self.default_node_label = Box::new(f);
        self
    }

    /// Label factory used when an edge is created without an explicit label.
    pub fn set_default_edge_label<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn() -> E + Send + Sync + 'static,
    {
        self.default_edge_label = Box::new(f);
        self
    }

    // ---- nodes -------------------------------------------------------------------------------

    pub fn has_node(&self, id: &str) -> bool {
        self.node_index.contains_key(id)
    }

    /// Inserts `id` or replaces its label, keeping its original insertion position.
    pub fn set_node(&mut self, id: impl Into<String>, label: N) -> &mut Self {
        let id = id.into();
        if let Some(&ix) = self.node_index.get(&id) {
            self.nodes[ix].label = label;
            return self;
        }
        self.bump_generation();
        self.node_index.insert(id.clone(), self.nodes.len());
        self.nodes.push(NodeEntry { id, label });
        self
    }

    /// Inserts `id` with the default node label unless it already exists.
    pub fn ensure_node(&mut self, id: impl Into<String>) -> &mut Self {
        let id = id.into();
        if self.has_node(&id) {
            return self;
        }
        let label = (self.default_node_label)();
        self.set_node(id, label)
    }

    pub fn node(&self, id: &str) -> Option<&N> {
        self.node_index.get(id).map(|&ix| &self.nodes[ix].label)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut N> {
        let ix = *self.node_index.get(id)?;
        Some(&mut self.nodes[ix].label)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.id.as_str())
    }

    pub fn node_ids(&self) -> Vec<String> {
        self.nodes.iter().map(|n| n.id.clone()).collect()
    }

    /// `(id, label)` pairs in insertion order.
    pub fn node_entries(&self) -> impl Iterator<Item = (&str, &N)> {
        self.nodes.iter().map(|n| (n.id.as_str(), &n.label))
    }

    pub fn for_each_node_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(&str, &mut N),
    {
        for n in &mut self.nodes {
            f(&n.id, &mut n.label);
        }
    }

    /// Removes a node, every edge touching it and its parent/child links.
    ///
    /// Children of a removed container become roots.
    pub fn remove_node(&mut self, id: &str) -> bool {
        self.remove_nodes([id]) > 0
    }

    /// Removes every listed node like [`remove_node`](Self::remove_node), compacting the node and
    /// edge stores once. Unknown ids are skipped; returns how many nodes were removed.
    pub fn remove_nodes<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) -> usize {
        let doomed: HashSet<String> = ids
            .into_iter()
            .filter(|id| self.node_index.contains_key(*id))
            .map(str::to_string)
            .collect();
        if doomed.is_empty() {
            return 0;
        }
        self.bump_generation();

        for id in &doomed {
            self.node_index.remove(id.as_str());
        }
        self.nodes.retain(|n| !doomed.contains(n.id.as_str()));
        for (i, n) in self.nodes.iter().enumerate() {
            if let Some(slot) = self.node_index.get_mut(n.id.as_str()) {
                *slot = i;
            }
        }

        let touches =
            |key: &EdgeKey| doomed.contains(key.v.as_str()) || doomed.contains(key.w.as_str());
        let before = self.edges.len();
        for e in &self.edges {
            if touches(&e.key) {
                self.edge_index.remove(&e.key);
            }
        }
        self.edges.retain(|e| !touches(&e.key));
        if self.edges.len() != before {
            self.reindex_edges();
        }

        for id in &doomed {
            if let Some(parent) = self.parent.remove(id.as_str()) {
                self.detach_child(&parent, id);
            }
            if let Some(children) = self.children.remove(id.as_str()) {
                for child in children {
                    self.parent.remove(&child);
                }
            }
        }
        doomed.len()
    }

    // ---- edges -------------------------------------------------------------------------------

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edges(&self) -> impl Iterator<Item = &EdgeKey> {
        self.edges.iter().map(|e| &e.key)
    }

    pub fn edge_keys(&self) -> Vec<EdgeKey> {
        self.edges.iter().map(|e| e.key.clone()).collect()
    }

    /// `(key, label)` pairs in insertion order.
    pub fn edge_entries(&self) -> impl Iterator<Item = (&EdgeKey, &E)> {
        self.edges.iter().map(|e| (&e.key, &e.label))
    }

    pub fn for_each_edge_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(&EdgeKey, &mut E),
    {
        for e in &mut self.edges {
            f(&e.key, &mut e.label);
        }
    }

    pub fn set_edge(&mut self, v: impl Into<String>, w: impl Into<String>) -> &mut Self {
        self.set_edge_named(v, w, None::<String>, None)
    }

    pub fn set_edge_with_label(
        &mut self,
        v: impl Into<String>,
        w: impl Into<String>,
        label: E,
    ) -> &mut Self {
        self.set_edge_named(v, w, None::<String>, Some(label))
    }

    /// Creates or updates the edge `(v, w, name)`.
    ///
    /// Missing endpoints are created with the default node label. For non-multigraphs the name is
    /// dropped, so repeated calls on the same pair address the same edge. An existing edge keeps
    /// its label when `label` is `None`.
    pub fn set_edge_named(
        &mut self,
        v: impl Into<String>,
        w: impl Into<String>,
        name: Option<impl Into<String>>,
        label: Option<E>,
    ) -> &mut Self {
        let key = self.canonical_key(EdgeKey {
            v: v.into(),
            w: w.into(),
            name: name.map(Into::into),
        });
        if let Some(&ix) = self.edge_index.get(&key) {
            if let Some(label) = label {
                self.edges[ix].label = label;
            }
            return self;
        }

        self.ensure_node(key.v.clone());
        self.ensure_node(key.w.clone());
        self.bump_generation();
        let label = label.unwrap_or_else(|| (self.default_edge_label)());
        self.edge_index.insert(key.clone(), self.edges.len());
        self.edges.push(EdgeEntry { key, label });
        self
    }

    pub fn set_edge_key(&mut self, key: EdgeKey, label: E) -> &mut Self {
        self.set_edge_named(key.v, key.w, key.name, Some(label))
    }

    /// Adds unnamed edges between consecutive ids.
    pub fn set_path(&mut self, ids: &[&str]) -> &mut Self {
        for pair in ids.windows(2) {
            self.set_edge(pair[0], pair[1]);
        }
        self
    }

    pub fn has_edge(&self, v: &str, w: &str, name: Option<&str>) -> bool {
        self.edge_ix(v, w, name).is_some()
    }

    pub fn edge(&self, v: &str, w: &str, name: Option<&str>) -> Option<&E> {
        let ix = self.edge_ix(v, w, name)?;
        Some(&self.edges[ix].label)
    }

    pub fn edge_mut(&mut self, v: &str, w: &str, name: Option<&str>) -> Option<&mut E> {
        let ix = self.edge_ix(v, w, name)?;
        Some(&mut self.edges[ix].label)
    }

    pub fn edge_by_key(&self, key: &EdgeKey) -> Option<&E> {
        self.edge(&key.v, &key.w, key.name.as_deref())
    }

    pub fn edge_mut_by_key(&mut self, key: &EdgeKey) -> Option<&mut E> {
        self.edge_mut(&key.v, &key.w, key.name.as_deref())
    }

    pub fn remove_edge(&mut self, v: &str, w: &str, name: Option<&str>) -> bool {
        let Some(ix) = self.edge_ix(v, w, name) else {
            return false;
        };
        self.bump_generation();
        let entry = self.edges.remove(ix);
        self.edge_index.remove(&entry.key);
        for (i, e) in self.edges.iter().enumerate().skip(ix) {
            if let Some(slot) = self.edge_index.get_mut(&e.key) {
                *slot = i;
            }
        }
        true
    }

    pub fn remove_edge_key(&mut self, key: &EdgeKey) -> bool {
        self.remove_edge(&key.v, &key.w, key.name.as_deref())
    }

    /// Edges leaving `v` (optionally only those ending at `w`), in insertion order.
    ///
    /// For undirected graphs every incident edge counts as outgoing.
    pub fn out_edges(&self, v: &str, w: Option<&str>) -> Vec<EdgeKey> {
        let Some(&v_ix) = self.node_index.get(v) else {
            return Vec::new();
        };
        self.with_adj(|adj| {
            adj.out_edges(v_ix)
                .iter()
                .map(|&ix| &self.edges[ix].key)
                .filter(|k| w.is_none_or(|w| opposite(k, v) == w))
                .cloned()
                .collect()
        })
    }

    /// Edges entering `v` (optionally only those starting at `u`), in insertion order.
    pub fn in_edges(&self, v: &str, u: Option<&str>) -> Vec<EdgeKey> {
        let Some(&v_ix) = self.node_index.get(v) else {
            return Vec::new();
        };
        self.with_adj(|adj| {
            adj.in_edges(v_ix)
                .iter()
                .map(|&ix| &self.edges[ix].key)
                .filter(|k| u.is_none_or(|u| opposite(k, v) == u))
                .cloned()
                .collect()
        })
    }

    /// Every edge touching `v` once, in insertion order.
    pub fn node_edges(&self, v: &str) -> Vec<EdgeKey> {
        let Some(&v_ix) = self.node_index.get(v) else {
            return Vec::new();
        };
        self.with_adj(|adj| {
            let mut ixs: Vec<usize> = adj
                .out_edges(v_ix)
                .iter()
                .chain(adj.in_edges(v_ix))
                .copied()
                .collect();
            ixs.sort_unstable();
            ixs.dedup();
            ixs.into_iter().map(|ix| self.edges[ix].key.clone()).collect()
        })
    }

    /// Distinct targets of `v`'s outgoing edges, in first-seen order.
    pub fn successors(&self, v: &str) -> Vec<&str> {
        let Some(&v_ix) = self.node_index.get(v) else {
            return Vec::new();
        };
        self.with_adj(|adj| {
            unique(
                adj.out_edges(v_ix)
                    .iter()
                    .map(|&ix| opposite(&self.edges[ix].key, v)),
            )
        })
    }

    /// Distinct sources of `v`'s incoming edges, in first-seen order.
    pub fn predecessors(&self, v: &str) -> Vec<&str> {
        let Some(&v_ix) = self.node_index.get(v) else {
            return Vec::new();
        };
        self.with_adj(|adj| {
            unique(
                adj.in_edges(v_ix)
                    .iter()
                    .map(|&ix| opposite(&self.edges[ix].key, v)),
            )
        })
    }

    /// Successors followed by predecessors, without duplicates.
    pub fn neighbors(&self, v: &str) -> Vec<&str> {
        let mut out = self.successors(v);
        out.extend(self.predecessors(v));
        unique(out)
    }

    /// Nodes without incoming edges.
    pub fn sources(&self) -> Vec<&str> {
        self.with_adj(|adj| {
            self.nodes
                .iter()
                .enumerate()
                .filter(|(ix, _)| adj.in_edges(*ix).is_empty())
                .map(|(_, n)| n.id.as_str())
                .collect()
        })
    }

    /// Nodes without outgoing edges.
    pub fn sinks(&self) -> Vec<&str> {
        self.with_adj(|adj| {
            self.nodes
                .iter()
                .enumerate()
                .filter(|(ix, _)| adj.out_edges(*ix).is_empty())
                .map(|(_, n)| n.id.as_str())
                .collect()
        })
    }

    // ---- nesting -----------------------------------------------------------------------------

    /// Nests `child` under `parent`, creating either node if missing.
    ///
    /// A child already nested elsewhere is detached from its previous parent first.
    pub fn set_parent(
        &mut self,
        child: impl Into<String>,
        parent: impl Into<String>,
    ) -> Result<&mut Self> {
        let child = child.into();
        let parent = parent.into();
        if !self.options.compound {
            return Err(Error::NotCompound { child, parent });
        }
        let mut cursor = Some(parent.as_str());
        while let Some(ancestor) = cursor {
            if ancestor == child {
                return Err(Error::NestingCycle { child, parent });
            }
            cursor = self.parent(ancestor);
        }

        self.ensure_node(child.clone());
        self.ensure_node(parent.clone());
        if let Some(prev) = self.parent.insert(child.clone(), parent.clone()) {
            self.detach_child(&prev, &child);
        }
        let siblings = self.children.entry(parent).or_default();
        if !siblings.contains(&child) {
            siblings.push(child);
        }
        Ok(self)
    }

    /// Moves `child` back to the root. A no-op for roots and non-compound graphs.
    pub fn clear_parent(&mut self, child: &str) -> &mut Self {
        if let Some(prev) = self.parent.remove(child) {
            self.detach_child(&prev, child);
        }
        self
    }

    pub fn parent(&self, child: &str) -> Option<&str> {
        self.parent.get(child).map(String::as_str)
    }

    /// Direct children of `parent` in nesting order.
    pub fn children(&self, parent: &str) -> Vec<&str> {
        self.children
            .get(parent)
            .map(|c| c.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn has_children(&self, id: &str) -> bool {
        self.children.get(id).is_some_and(|c| !c.is_empty())
    }

    /// Nodes without a parent, in insertion order.
    pub fn children_root(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|n| !self.parent.contains_key(n.id.as_str()))
            .map(|n| n.id.as_str())
            .collect()
    }

    // ---- internals ---------------------------------------------------------------------------

    fn bump_generation(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        *self.adj.get_mut() = None;
    }

    fn with_adj<R>(&self, f: impl FnOnce(&AdjCache) -> R) -> R {
        let mut slot = self.adj.borrow_mut();
        if slot
            .as_ref()
            .is_none_or(|cache| cache.generation != self.generation)
        {
            *slot = None;
        }
        let cache = slot.get_or_insert_with(|| {
            let endpoints: Vec<(usize, usize)> = self
                .edges
                .iter()
                .filter_map(|e| {
                    let v_ix = *self.node_index.get(e.key.v.as_str())?;
                    let w_ix = *self.node_index.get(e.key.w.as_str())?;
                    Some((v_ix, w_ix))
                })
                .collect();
            AdjCache::build(
                self.generation,
                self.nodes.len(),
                &endpoints,
                self.options.directed,
            )
        });
        f(cache)
    }

    fn canonical_key(&self, mut key: EdgeKey) -> EdgeKey {
        if !self.options.directed && key.v > key.w {
            std::mem::swap(&mut key.v, &mut key.w);
        }
        if !self.options.multigraph {
            key.name = None;
        }
        key
    }

    fn edge_ix(&self, v: &str, w: &str, name: Option<&str>) -> Option<usize> {
        let (v, w) = if !self.options.directed && v > w {
            (w, v)
        } else {
            (v, w)
        };
        let name = if self.options.multigraph { name } else { None };
        self.edge_index.get(&EdgeKeyRef { v, w, name }).copied()
    }

    /// Points surviving index entries at their compacted slots.
    fn reindex_edges(&mut self) {
        for (i, e) in self.edges.iter().enumerate() {
            if let Some(slot) = self.edge_index.get_mut(&e.key) {
                *slot = i;
            }
        }
    }

    fn detach_child(&mut self, parent: &str, child: &str) {
        if let Some(siblings) = self.children.get_mut(parent) {
            siblings.retain(|c| c != child);
            if siblings.is_empty() {
                self.children.remove(parent);
            }
        }
    }
}

/// The endpoint of `key` that is not `v` (or `v` itself for a self loop).
fn opposite<'a>(key: &'a EdgeKey, v: &str) -> &'a str {
    if key.v == v {
        key.w.as_str()
    } else {
        key.v.as_str()
    }
}

fn unique<'a>(ids: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen: HashSet<&str> = HashSet::default();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}
