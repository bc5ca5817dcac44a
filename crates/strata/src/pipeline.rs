//! The layout pipeline.
//!
//! Layout runs on a private copy of the caller's graph so internal edge names, dummy nodes and
//! reversed edges never leak. Only coordinates, ranks, orders, container boxes, routes and the
//! overall size are written back.

use crate::graphlib::{EdgeKey, GraphOptions};
use crate::{
    EdgeLabel, Error, GraphLabel, LayoutGraph, NodeLabel, Result, acyclic, compound,
    coordinate_system, order, position, rank, route, self_edges, util,
};
use tracing::debug;

/// Lays out `g` in place.
///
/// Every node gets `x`/`y` (its center), `rank` and `order`; containers of a compound graph get
/// `x`/`y`/`width`/`height` enclosing their children; every edge gets `points` and a label anchor
/// (`x`/`y`); the graph label gets the overall `width`/`height`. Fails only when a numeric option
/// is negative or not finite, in which case `g` is left untouched.
pub fn layout(g: &mut LayoutGraph) -> Result<()> {
    validate(g.graph())?;
    let _span = tracing::debug_span!(
        "layout",
        nodes = g.node_count(),
        edges = g.edge_count()
    )
    .entered();

    let mut lg = build_layout_graph(g)?;
    run_layout(&mut lg);
    update_input_graph(g, &lg);
    Ok(())
}

fn validate(label: &GraphLabel) -> Result<()> {
    let checks: [(&'static str, f64); 6] = [
        ("nodesep", label.nodesep),
        ("edgesep", label.edgesep),
        ("ranksep", label.ranksep),
        ("marginx", label.marginx),
        ("marginy", label.marginy),
        ("compound_padding", label.compound_padding),
    ];
    for (name, value) in checks {
        if !value.is_finite() || value < 0.0 {
            return Err(Error::InvalidOption { name, value });
        }
    }
    Ok(())
}

fn build_layout_graph(input: &LayoutGraph) -> Result<LayoutGraph> {
    let mut g = LayoutGraph::new(GraphOptions {
        compound: input.is_compound(),
        ..GraphOptions::layout()
    });
    g.set_graph(input.graph().clone());

    for (id, node) in input.node_entries() {
        g.set_node(id, NodeLabel::sized(node.width, node.height));
    }
    if input.is_compound() {
        for id in input.nodes() {
            for child in input.children(id) {
                g.set_parent(child, id)?;
            }
        }
    }
    for (i, (key, label)) in input.edge_entries().enumerate() {
        g.set_edge_named(
            key.v.clone(),
            key.w.clone(),
            Some(format!("e{i}")),
            Some(EdgeLabel {
                minlen: label.minlen,
                weight: label.weight,
                origin: Some(key.clone()),
                ..Default::default()
            }),
        );
    }
    Ok(g)
}

fn run_layout(g: &mut LayoutGraph) {
    coordinate_system::adjust(g);
    let redirects = if g.is_compound() {
        compound::infer_container_sizes(g);
        compound::redirect_edges(g)
    } else {
        Vec::new()
    };
    let loops = self_edges::remove(g);
    acyclic::run(g);

    rank::rank(g);
    order::order(g);
    let geometry = position::position(g);
    route::route_edges(g, &geometry);
    self_edges::restore(g, loops);

    coordinate_system::undo(g);
    acyclic::undo(g);
    if g.is_compound() {
        compound::restore_edges(g, redirects);
        compound::fit_containers(g);
    }
    util::translate_graph(g);
    debug!(
        width = g.graph().width,
        height = g.graph().height,
        "layout: finished"
    );
}

fn update_input_graph(input: &mut LayoutGraph, lg: &LayoutGraph) {
    input.for_each_node_mut(|id, node| {
        let Some(laid_out) = lg.node(id) else {
            return;
        };
        node.x = laid_out.x;
        node.y = laid_out.y;
        node.rank = laid_out.rank;
        node.order = laid_out.order;
        if lg.is_compound() && lg.has_children(id) {
            node.width = laid_out.width;
            node.height = laid_out.height;
        }
    });

    let mut routed: rustc_hash::FxHashMap<&EdgeKey, &EdgeLabel> = Default::default();
    for (_key, label) in lg.edge_entries() {
        if let Some(origin) = label.origin.as_ref() {
            routed.insert(origin, label);
        }
    }
    input.for_each_edge_mut(|key, edge| {
        let Some(laid_out) = routed.get(key) else {
            return;
        };
        edge.points.clone_from(&laid_out.points);
        edge.x = laid_out.x;
        edge.y = laid_out.y;
    });

    let label = input.graph_mut();
    label.width = lg.graph().width;
    label.height = lg.graph().height;
}
