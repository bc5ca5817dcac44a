use strata::graphlib::{Graph, GraphOptions};
use strata::{
    EdgeLabel, Error, GraphLabel, LayoutGraph, NodeLabel, Point, RankDir, Ranker, layout,
};

fn new_graph(options: GraphOptions) -> LayoutGraph {
    let mut g: LayoutGraph = Graph::new(options);
    g.set_graph(GraphLabel::default());
    g.set_default_node_label(NodeLabel::default);
    g.set_default_edge_label(EdgeLabel::default);
    g
}

fn simple() -> LayoutGraph {
    new_graph(GraphOptions::default())
}

fn multi() -> LayoutGraph {
    new_graph(GraphOptions {
        multigraph: true,
        ..Default::default()
    })
}

fn center(g: &LayoutGraph, v: &str) -> Point {
    g.node(v)
        .and_then(NodeLabel::center)
        .unwrap_or_else(|| panic!("{v} has no position"))
}

fn inside_box(g: &LayoutGraph, v: &str, p: Point) -> bool {
    let n = g.node(v).unwrap();
    let c = center(g, v);
    (p.x - c.x).abs() <= n.width / 2.0 + 1e-9 && (p.y - c.y).abs() <= n.height / 2.0 + 1e-9
}

fn assert_non_negative(g: &LayoutGraph) {
    for (id, n) in g.node_entries() {
        let c = center(g, id);
        assert!(c.x - n.width / 2.0 >= -1e-9, "{id} left edge {}", c.x - n.width / 2.0);
        assert!(c.y - n.height / 2.0 >= -1e-9, "{id} top edge {}", c.y - n.height / 2.0);
    }
    for (key, e) in g.edge_entries() {
        for p in &e.points {
            assert!(p.x >= -1e-9 && p.y >= -1e-9, "{key} point {p:?}");
        }
    }
}

fn assert_no_overlap_within_ranks(g: &LayoutGraph) {
    let nodesep = g.graph().nodesep;
    let ids: Vec<&str> = g.nodes().collect();
    for (i, a) in ids.iter().enumerate() {
        for b in &ids[i + 1..] {
            let (na, nb) = (g.node(a).unwrap(), g.node(b).unwrap());
            if na.rank != nb.rank {
                continue;
            }
            let gap = (center(g, a).x - center(g, b).x).abs();
            let needed = na.width / 2.0 + nodesep + nb.width / 2.0;
            assert!(gap >= needed - 1e-6, "{a} and {b}: {gap} < {needed}");
        }
    }
}

#[test]
fn chain_of_three_stacks_vertically_in_one_column() {
    let mut g = simple();
    for v in ["a", "b", "c"] {
        g.set_node(v, NodeLabel::sized(100.0, 50.0));
    }
    g.set_path(&["a", "b", "c"]);
    layout(&mut g).unwrap();

    assert_eq!(
        ["a", "b", "c"].map(|v| g.node(v).unwrap().rank),
        [Some(0), Some(1), Some(2)]
    );
    let (a, b, c) = (center(&g, "a"), center(&g, "b"), center(&g, "c"));
    assert_eq!(a.x, b.x);
    assert_eq!(b.x, c.x);
    assert_eq!(b.y - a.y, 50.0 + 50.0);
    assert_eq!(c.y - b.y, 50.0 + 50.0);

    let points = &g.edge("a", "b", None).unwrap().points;
    assert!(inside_box(&g, "a", points[0]));
    assert!(inside_box(&g, "b", *points.last().unwrap()));
}

#[test]
fn two_cycle_keeps_both_edge_directions() {
    let mut g = simple();
    g.set_node("a", NodeLabel::sized(40.0, 20.0));
    g.set_node("b", NodeLabel::sized(40.0, 20.0));
    g.set_edge("a", "b");
    g.set_edge("b", "a");
    layout(&mut g).unwrap();

    assert_eq!(g.edge_count(), 2);
    assert!(g.has_edge("a", "b", None));
    assert!(g.has_edge("b", "a", None));
    let (ra, rb) = (g.node("a").unwrap().rank, g.node("b").unwrap().rank);
    assert_ne!(ra, rb);

    let ab = &g.edge("a", "b", None).unwrap().points;
    let ba = &g.edge("b", "a", None).unwrap().points;
    assert!(inside_box(&g, "a", ab[0]));
    assert!(inside_box(&g, "b", *ab.last().unwrap()));
    assert!(inside_box(&g, "b", ba[0]));
    assert!(inside_box(&g, "a", *ba.last().unwrap()));
    assert_ne!(ab, ba);
}

#[test]
fn parallel_edges_get_distinct_routes() {
    let mut g = multi();
    g.set_node("a", NodeLabel::sized(60.0, 30.0));
    g.set_node("b", NodeLabel::sized(60.0, 30.0));
    g.set_edge_named("a", "b", Some("first"), None);
    g.set_edge_named("a", "b", Some("second"), None);
    layout(&mut g).unwrap();

    let first = &g.edge("a", "b", Some("first")).unwrap().points;
    let second = &g.edge("a", "b", Some("second")).unwrap().points;
    assert_ne!(first, second);
    for points in [first, second] {
        assert!(inside_box(&g, "a", points[0]));
        assert!(inside_box(&g, "b", *points.last().unwrap()));
    }
}

#[test]
fn single_node_sits_at_its_half_size() {
    let mut g = simple();
    g.set_node("a", NodeLabel::sized(50.0, 100.0));
    layout(&mut g).unwrap();

    assert_eq!(center(&g, "a"), Point::new(25.0, 50.0));
    assert_eq!((g.graph().width, g.graph().height), (50.0, 100.0));
}

#[test]
fn margins_shift_the_drawing_and_grow_the_size() {
    let mut g = simple();
    g.graph_mut().marginx = 10.0;
    g.graph_mut().marginy = 20.0;
    g.set_node("a", NodeLabel::sized(50.0, 100.0));
    layout(&mut g).unwrap();

    assert_eq!(center(&g, "a"), Point::new(35.0, 70.0));
    assert_eq!((g.graph().width, g.graph().height), (70.0, 140.0));
}

#[test]
fn empty_graph_has_zero_size() {
    let mut g = simple();
    layout(&mut g).unwrap();
    assert_eq!((g.graph().width, g.graph().height), (0.0, 0.0));
}

#[test]
fn rank_separation_is_configurable() {
    let mut g = simple();
    g.graph_mut().ranksep = 300.0;
    g.set_node("a", NodeLabel::sized(50.0, 50.0));
    g.set_node("b", NodeLabel::sized(50.0, 50.0));
    g.set_edge("a", "b");
    layout(&mut g).unwrap();

    assert_eq!(center(&g, "b").y - center(&g, "a").y, 350.0);
}

#[test]
fn rank_direction_controls_the_flow_axis() {
    let run = |rankdir| {
        let mut g = simple();
        g.graph_mut().rankdir = rankdir;
        g.set_node("a", NodeLabel::sized(100.0, 40.0));
        g.set_node("b", NodeLabel::sized(100.0, 40.0));
        g.set_edge("a", "b");
        layout(&mut g).unwrap();
        (center(&g, "a"), center(&g, "b"), g)
    };

    let (a, b, _) = run(RankDir::TB);
    assert_eq!(a.x, b.x);
    assert_eq!(b.y - a.y, 40.0 + 50.0);

    let (a, b, _) = run(RankDir::BT);
    assert_eq!(a.x, b.x);
    assert_eq!(a.y - b.y, 40.0 + 50.0);

    let (a, b, g) = run(RankDir::LR);
    assert_eq!(a.y, b.y);
    assert_eq!(b.x - a.x, 100.0 + 50.0);
    let a_label = g.node("a").unwrap();
    assert_eq!((a_label.width, a_label.height), (100.0, 40.0));
    assert_eq!((g.graph().width, g.graph().height), (250.0, 40.0));

    let (a, b, _) = run(RankDir::RL);
    assert_eq!(a.y, b.y);
    assert_eq!(a.x - b.x, 100.0 + 50.0);
}

#[test]
fn self_loops_are_routed_beside_their_node() {
    let mut g = simple();
    g.set_node("a", NodeLabel::sized(40.0, 40.0));
    g.set_edge("a", "a");
    g.set_edge("a", "b");
    layout(&mut g).unwrap();

    let a = center(&g, "a");
    let points = &g.edge("a", "a", None).unwrap().points;
    assert_eq!(points.len(), 5);
    assert!(points.iter().all(|p| p.x >= a.x + 20.0 - 1e-9));
    assert!(g.node("b").unwrap().rank > g.node("a").unwrap().rank);
}

#[test]
fn compound_containers_enclose_three_levels() {
    let mut g = new_graph(GraphOptions::layout());
    for v in ["a", "b", "c", "d"] {
        g.set_node(v, NodeLabel::sized(40.0, 30.0));
    }
    g.set_parent("a", "inner").unwrap();
    g.set_parent("b", "inner").unwrap();
    g.set_parent("inner", "middle").unwrap();
    g.set_parent("c", "middle").unwrap();
    g.set_parent("middle", "outer").unwrap();
    g.set_edge("a", "b");
    g.set_edge("c", "inner");
    g.set_edge("outer", "d");
    layout(&mut g).unwrap();

    let padding = g.graph().compound_padding;
    let nesting = [
        ("inner", ["a", "b"].as_slice()),
        ("middle", ["inner", "c"].as_slice()),
        ("outer", ["middle"].as_slice()),
    ];
    for (container, children) in nesting {
        let outer = g.node(container).unwrap();
        let oc = center(&g, container);
        for &child in children {
            let inner = g.node(child).unwrap();
            let ic = center(&g, child);
            assert!(ic.x - inner.width / 2.0 >= oc.x - outer.width / 2.0 + padding - 1e-9);
            assert!(ic.x + inner.width / 2.0 <= oc.x + outer.width / 2.0 - padding + 1e-9);
            assert!(ic.y - inner.height / 2.0 >= oc.y - outer.height / 2.0 + padding - 1e-9);
            assert!(ic.y + inner.height / 2.0 <= oc.y + outer.height / 2.0 - padding + 1e-9);
        }
    }

    assert!(g.node("outer").unwrap().rank.is_none());
    assert!(!g.edge("c", "inner", None).unwrap().points.is_empty());
    assert!(!g.edge("outer", "d", None).unwrap().points.is_empty());
    assert_non_negative(&g);
}

fn busy_graph() -> LayoutGraph {
    let mut g = multi();
    let sizes = [
        ("a", 80.0, 30.0),
        ("b", 20.0, 60.0),
        ("c", 45.0, 45.0),
        ("d", 120.0, 20.0),
        ("e", 10.0, 10.0),
        ("f", 70.0, 35.0),
        ("g", 35.0, 50.0),
        ("h", 55.0, 25.0),
    ];
    for (v, w, h) in sizes {
        g.set_node(v, NodeLabel::sized(w, h));
    }
    g.set_path(&["a", "b", "c", "d", "a"]);
    g.set_path(&["a", "e", "f", "h"]);
    g.set_path(&["b", "g", "h"]);
    g.set_path(&["c", "c"]);
    g.set_edge_named("e", "f", Some("again"), Some(EdgeLabel::weighted(3.0, 2)));
    g.set_path(&["h", "e"]);
    g
}

#[test]
fn output_is_non_negative_and_separated_for_every_direction() {
    for rankdir in [RankDir::TB, RankDir::BT, RankDir::LR, RankDir::RL] {
        let mut g = busy_graph();
        g.graph_mut().rankdir = rankdir;
        layout(&mut g).unwrap();
        assert_non_negative(&g);
        if !rankdir.is_horizontal() {
            assert_no_overlap_within_ranks(&g);
        }
        for e in g.edges() {
            assert!(!g.edge_by_key(e).unwrap().points.is_empty(), "{e} not routed");
        }
    }
}

#[test]
fn every_ranker_produces_feasible_ranks() {
    for ranker in [Ranker::NetworkSimplex, Ranker::TightTree, Ranker::LongestPath] {
        let mut g = multi();
        g.graph_mut().ranker = ranker;
        g.set_path(&["a", "b", "c", "d"]);
        g.set_edge_with_label("a", "d", EdgeLabel::weighted(1.0, 4));
        layout(&mut g).unwrap();
        let rank = |v: &str| g.node(v).unwrap().rank.unwrap();
        assert!(rank("d") - rank("a") >= 4, "{ranker:?}");
        assert!(rank("b") > rank("a") && rank("c") > rank("b"));
    }
}

#[test]
fn layout_is_deterministic() {
    let snapshot = |g: &LayoutGraph| {
        let nodes: Vec<(String, u64, u64)> = g
            .node_entries()
            .map(|(id, n)| {
                let c = center(g, id);
                (id.to_string(), c.x.to_bits(), c.y.to_bits())
            })
            .collect();
        let edges: Vec<Vec<(u64, u64)>> = g
            .edge_entries()
            .map(|(_, e)| e.points.iter().map(|p| (p.x.to_bits(), p.y.to_bits())).collect())
            .collect();
        (nodes, edges)
    };

    let mut first = busy_graph();
    let mut second = busy_graph();
    layout(&mut first).unwrap();
    layout(&mut second).unwrap();
    assert_eq!(snapshot(&first), snapshot(&second));
}

#[test]
fn invalid_options_are_rejected_before_any_change() {
    let mut g = simple();
    g.graph_mut().nodesep = -1.0;
    g.set_node("a", NodeLabel::sized(10.0, 10.0));

    assert_eq!(
        layout(&mut g),
        Err(Error::InvalidOption {
            name: "nodesep",
            value: -1.0
        })
    );
    assert!(g.node("a").unwrap().x.is_none());

    let mut g = simple();
    g.graph_mut().ranksep = f64::NAN;
    assert!(matches!(
        layout(&mut g),
        Err(Error::InvalidOption { name: "ranksep", .. })
    ));
}

#[test]
fn options_load_from_partial_json() {
    let label: GraphLabel = serde_json::from_str(
        r#"{ "rankdir": "LR", "nodesep": 10, "ranker": "longest-path", "align": "DR" }"#,
    )
    .unwrap();
    assert_eq!(label.rankdir, RankDir::LR);
    assert_eq!(label.nodesep, 10.0);
    assert_eq!(label.ranker, Ranker::LongestPath);
    assert_eq!(label.align, strata::Align::DR);
    assert_eq!(label.ranksep, 50.0);
    assert_eq!(label.edgesep, 20.0);

    let mut g = simple();
    g.set_graph(label);
    g.set_edge("a", "b");
    layout(&mut g).unwrap();
    assert_eq!(center(&g, "a").y, center(&g, "b").y);
}

#[test]
fn extras_pass_through_untouched() {
    let mut g = simple();
    let mut node = NodeLabel::sized(10.0, 10.0);
    node.extras
        .insert("shape".to_string(), serde_json::json!("circle"));
    g.set_node("a", node);
    layout(&mut g).unwrap();

    assert_eq!(
        g.node("a").unwrap().extras.get("shape"),
        Some(&serde_json::json!("circle"))
    );
    let json = serde_json::to_value(g.node("a").unwrap()).unwrap();
    assert_eq!(json["shape"], serde_json::Value::Null);
    assert_eq!(json["extras"]["shape"], "circle");
}

#[test]
fn graphs_can_be_laid_out_on_a_worker_thread() {
    let mut g = simple();
    g.set_node("a", NodeLabel::sized(30.0, 30.0));
    g.set_edge("a", "b");
    let handle = std::thread::spawn(move || layout(&mut g).map(|()| g));
    let g = handle.join().unwrap().unwrap();
    assert!(center(&g, "b").y > center(&g, "a").y);
}
