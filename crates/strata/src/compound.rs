//! Nested containers.
//!
//! Containers never take part in ranking, ordering or positioning. Edges touching a container are
//! moved onto a border descendant before layout and moved back afterwards, and each container is
//! finally stretched around its children.

use crate::graphlib::EdgeKey;
use crate::LayoutGraph;
use tracing::debug;

/// An edge moved off a container endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    /// The caller-visible key.
    pub original: EdgeKey,
    /// The key used during layout.
    pub redirected: EdgeKey,
}

fn is_container(g: &LayoutGraph, id: &str) -> bool {
    g.is_compound() && g.has_children(id)
}

/// Containers ordered parents before children (preorder over the nesting tree, siblings in
/// insertion order).
fn containers_top_down(g: &LayoutGraph) -> Vec<String> {
    let mut out = Vec::new();
    let mut stack: Vec<String> = g
        .children_root()
        .into_iter()
        .rev()
        .map(str::to_string)
        .collect();
    while let Some(v) = stack.pop() {
        let children = g.children(&v);
        if children.is_empty() {
            continue;
        }
        stack.extend(children.into_iter().rev().map(str::to_string));
        out.push(v);
    }
    out
}

/// Gives every container at least the room its children need side by side, bottom-up.
pub fn infer_container_sizes(g: &mut LayoutGraph) {
    let padding = g.graph().compound_padding;
    let nodesep = g.graph().nodesep;
    for id in containers_top_down(g).into_iter().rev() {
        let (mut width, mut height, mut count) = (0.0, 0.0f64, 0usize);
        for child in g.children(&id) {
            if let Some(n) = g.node(child) {
                width += n.width;
                height = height.max(n.height);
                count += 1;
            }
        }
        width += count.saturating_sub(1) as f64 * nodesep + 2.0 * padding;
        height += 2.0 * padding;
        if let Some(node) = g.node_mut(&id) {
            node.width = node.width.max(width);
            node.height = node.height.max(height);
        }
    }
}

/// Descendant used where an edge leaves `id`: the last child, followed down to a layout node.
fn bottom_border(g: &LayoutGraph, id: &str) -> String {
    let mut current = id.to_string();
    while let Some(last) = g.children(&current).last() {
        current = last.to_string();
    }
    current
}

/// Descendant used where an edge enters `id`: the first child, followed down to a layout node.
fn top_border(g: &LayoutGraph, id: &str) -> String {
    let mut current = id.to_string();
    while let Some(first) = g.children(&current).first() {
        current = first.to_string();
    }
    current
}

/// Moves every edge with a container endpoint onto that container's border descendants.
pub fn redirect_edges(g: &mut LayoutGraph) -> Vec<Redirect> {
    if !g.is_compound() {
        return Vec::new();
    }
    let mut redirects = Vec::new();
    for key in g.edge_keys() {
        let source_is_container = is_container(g, &key.v);
        let target_is_container = is_container(g, &key.w);
        if !source_is_container && !target_is_container {
            continue;
        }

        let v = if source_is_container {
            let border = bottom_border(g, &key.v);
            if let Some(container) = g.node_mut(&key.v) {
                container.border_bottom = Some(border.clone());
            }
            border
        } else {
            key.v.clone()
        };
        let w = if target_is_container {
            let border = top_border(g, &key.w);
            if let Some(container) = g.node_mut(&key.w) {
                container.border_top = Some(border.clone());
            }
            border
        } else {
            key.w.clone()
        };

        let Some(mut label) = g.edge_by_key(&key).cloned() else {
            continue;
        };
        g.remove_edge_key(&key);
        label.redirected = Some((key.v.clone(), key.w.clone()));
        let redirected = EdgeKey::new(v, w, key.name.clone());
        g.set_edge_key(redirected.clone(), label);
        redirects.push(Redirect {
            original: key,
            redirected,
        });
    }
    if !redirects.is_empty() {
        debug!(redirected = redirects.len(), "compound: edges moved to border nodes");
    }
    redirects
}

/// Re-keys redirected edges to their original endpoints. Routes are kept as computed.
pub fn restore_edges(g: &mut LayoutGraph, redirects: Vec<Redirect>) {
    for r in redirects {
        let Some(mut label) = g.edge_by_key(&r.redirected).cloned() else {
            continue;
        };
        g.remove_edge_key(&r.redirected);
        label.redirected = None;
        g.set_edge_key(r.original, label);
    }
}

/// Sets every container to the padded bounding box of its children, innermost first.
///
/// The size a container already carries (its declared size, raised by
/// [`infer_container_sizes`]) is kept as a floor; a larger box stays centered on its children.
pub fn fit_containers(g: &mut LayoutGraph) {
    let padding = g.graph().compound_padding;
    let containers = containers_top_down(g);
    let count = containers.len();
    for id in containers.into_iter().rev() {
        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for child in g.children(&id) {
            let Some((n, c)) = g.node(child).and_then(|n| Some((n, n.center()?))) else {
                continue;
            };
            min_x = min_x.min(c.x - n.width / 2.0);
            max_x = max_x.max(c.x + n.width / 2.0);
            min_y = min_y.min(c.y - n.height / 2.0);
            max_y = max_y.max(c.y + n.height / 2.0);
        }
        if !min_x.is_finite() || !min_y.is_finite() {
            continue;
        }
        if let Some(node) = g.node_mut(&id) {
            let width = (max_x - min_x + 2.0 * padding).max(node.width);
            let height = (max_y - min_y + 2.0 * padding).max(node.height);
            node.x = Some((min_x + max_x) / 2.0);
            node.y = Some((min_y + max_y) / 2.0);
            node.width = width;
            node.height = height;
        }
    }
    debug!(containers = count, "compound: containers fitted");
}
