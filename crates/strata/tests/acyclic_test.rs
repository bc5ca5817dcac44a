use strata::graphlib::{EdgeKey, Graph, GraphOptions, alg};
use strata::{EdgeLabel, GraphLabel, LayoutGraph, NodeLabel, Point, acyclic};

fn new_graph() -> LayoutGraph {
    let mut g: LayoutGraph = Graph::new(GraphOptions {
        multigraph: true,
        ..Default::default()
    });
    g.set_graph(GraphLabel::default());
    g.set_default_node_label(NodeLabel::default);
    g.set_default_edge_label(EdgeLabel::default);
    g
}

fn sorted_keys(g: &LayoutGraph) -> Vec<EdgeKey> {
    let mut keys = g.edge_keys();
    keys.sort();
    keys
}

#[test]
fn does_not_change_an_acyclic_graph() {
    let mut g = new_graph();
    g.set_path(&["a", "b", "d"]);
    g.set_path(&["a", "c", "d"]);
    let before = sorted_keys(&g);

    assert!(acyclic::run(&mut g).is_empty());
    assert_eq!(sorted_keys(&g), before);
}

#[test]
fn breaks_simple_and_nested_cycles() {
    let mut g = new_graph();
    g.set_path(&["a", "b", "c", "a"]);
    g.set_path(&["c", "d", "b"]);
    g.set_path(&["x", "y", "x"]);

    let reversed = acyclic::run(&mut g);
    assert!(alg::is_acyclic(&g));
    assert_eq!(reversed.len(), 3);
    for key in &reversed {
        assert!(g.edge_by_key(key).unwrap().reversed);
    }
}

#[test]
fn reverses_the_back_edge_found_first_in_insertion_order() {
    let mut g = new_graph();
    g.set_path(&["a", "b", "a"]);

    let reversed = acyclic::run(&mut g);
    assert_eq!(reversed.len(), 1);
    assert_eq!((reversed[0].v.as_str(), reversed[0].w.as_str()), ("a", "b"));
    // `a -> b` already exists unnamed, so the flipped edge gets a fresh name.
    assert_eq!(reversed[0].name.as_deref(), Some("rev1"));
    assert_eq!(g.edge_count(), 2);
    assert_eq!(g.out_edges("a", None).len(), 2);
}

#[test]
fn leaves_self_loops_alone() {
    let mut g = new_graph();
    g.set_path(&["a", "a"]);
    g.set_path(&["a", "b"]);

    assert!(acyclic::run(&mut g).is_empty());
    assert!(g.has_edge("a", "a", None));
}

#[test]
fn undo_restores_keys_names_and_labels() {
    let mut g = new_graph();
    g.set_edge_named("a", "b", Some("ab"), Some(EdgeLabel::weighted(2.0, 1)));
    g.set_edge_named("b", "a", Some("ba"), Some(EdgeLabel::weighted(3.0, 2)));
    let before = sorted_keys(&g);

    let reversed = acyclic::run(&mut g);
    assert_eq!(reversed.len(), 1);
    assert!(alg::is_acyclic(&g));

    acyclic::undo(&mut g);
    assert_eq!(sorted_keys(&g), before);
    let ba = g.edge("b", "a", Some("ba")).unwrap();
    assert_eq!(ba.weight, 3.0);
    assert_eq!(ba.minlen, 2);
    assert!(!ba.reversed);
}

#[test]
fn undo_reverses_routed_points() {
    let mut g = new_graph();
    g.set_path(&["a", "b", "a"]);
    let reversed = acyclic::run(&mut g);
    let key = reversed[0].clone();
    g.edge_mut_by_key(&key).unwrap().points = vec![Point::new(0.0, 0.0), Point::new(0.0, 10.0)];

    acyclic::undo(&mut g);
    let restored = g.edge("b", "a", None).unwrap();
    assert_eq!(
        restored.points,
        vec![Point::new(0.0, 10.0), Point::new(0.0, 0.0)]
    );
}

#[test]
fn reversed_edges_do_not_collide_with_existing_names() {
    let mut g = new_graph();
    g.set_edge_named("a", "b", Some("n"), None);
    g.set_edge_named("b", "a", Some("n"), None);

    acyclic::run(&mut g);
    assert_eq!(g.edge_count(), 2);
    assert!(alg::is_acyclic(&g));

    acyclic::undo(&mut g);
    assert!(g.has_edge("a", "b", Some("n")));
    assert!(g.has_edge("b", "a", Some("n")));
}
