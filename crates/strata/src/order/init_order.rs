use crate::LayoutGraph;

/// Groups ranked layout nodes into layers (index = rank), each in node insertion order.
///
/// Dummy nodes are inserted after the real nodes, so within a layer they follow them.
pub fn init_order(g: &LayoutGraph) -> Vec<Vec<String>> {
    let mut layers: Vec<Vec<String>> = Vec::new();
    for (id, node) in g.node_entries() {
        let Some(rank) = node.rank else {
            continue;
        };
        if rank < 0 || !crate::util::is_layout_node(g, id) {
            continue;
        }
        let rank = rank as usize;
        if layers.len() <= rank {
            layers.resize_with(rank + 1, Vec::new);
        }
        layers[rank].push(id.to_string());
    }
    layers
}
