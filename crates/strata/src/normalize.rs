//! Split edges spanning several ranks into chains of unit-length edges through zero-size dummy
//! nodes, and collapse the chains again.
//!
//! Chains only exist while ordering runs: `run` hands back the removed edges and `undo` puts them
//! back with their original keys and labels.

use crate::graphlib::EdgeKey;
use crate::util::unique_node_id;
use crate::{EdgeLabel, LayoutGraph, NodeLabel};

/// One long edge replaced by a dummy chain.
#[derive(Debug, Clone)]
pub struct DummyChain {
    pub edge: EdgeKey,
    pub label: EdgeLabel,
    /// Dummy ids from the source side to the target side.
    pub dummies: Vec<String>,
}

pub fn run(g: &mut LayoutGraph) -> Vec<DummyChain> {
    let mut chains: Vec<DummyChain> = Vec::new();
    let mut next_id = 0usize;
    for e in g.edge_keys() {
        let v_rank = g.node(&e.v).and_then(|n| n.rank);
        let w_rank = g.node(&e.w).and_then(|n| n.rank);
        let (Some(v_rank), Some(w_rank)) = (v_rank, w_rank) else {
            continue;
        };
        if w_rank - v_rank <= 1 {
            continue;
        }
        let Some(label) = g.edge_by_key(&e).cloned() else {
            continue;
        };
        g.remove_edge_key(&e);

        let mut dummies: Vec<String> = Vec::with_capacity((w_rank - v_rank - 1) as usize);
        let mut prev = e.v.clone();
        for rank in (v_rank + 1)..w_rank {
            let id = unique_node_id(g, "_d", &mut next_id);
            g.set_node(
                id.clone(),
                NodeLabel {
                    rank: Some(rank),
                    dummy: true,
                    edge_obj: Some(e.clone()),
                    ..Default::default()
                },
            );
            g.set_edge_with_label(prev, id.clone(), EdgeLabel::weighted(label.weight, 1));
            prev = id.clone();
            dummies.push(id);
        }
        g.set_edge_with_label(prev, e.w.clone(), EdgeLabel::weighted(label.weight, 1));

        chains.push(DummyChain {
            edge: e,
            label,
            dummies,
        });
    }
    chains
}

/// Removes the dummy chains and re-inserts the original edges.
pub fn undo(g: &mut LayoutGraph, chains: Vec<DummyChain>) {
    g.remove_nodes(
        chains
            .iter()
            .flat_map(|chain| chain.dummies.iter().map(String::as_str)),
    );
    for chain in chains {
        g.set_edge_key(chain.edge, chain.label);
    }
}
