use strata::graphlib::{Graph, GraphOptions};
use strata::rank::network_simplex::Simplex;
use strata::rank::{self, util::longest_path};
use strata::{EdgeLabel, GraphLabel, LayoutGraph, NodeLabel};

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

fn gansner_graph() -> LayoutGraph {
    let mut g = new_graph();
    g.set_path(&["a", "b", "c", "d", "h"]);
    g.set_path(&["a", "e", "g", "h"]);
    g.set_path(&["a", "f", "g"]);
    g
}

fn ids(g: &LayoutGraph) -> Vec<String> {
    g.node_ids()
}

/// The spanning tree from Gansner et al., figure 2-2(a).
const GANSNER_TREE: [(&str, &str); 7] = [
    ("a", "b"),
    ("b", "c"),
    ("c", "d"),
    ("d", "h"),
    ("h", "g"),
    ("g", "e"),
    ("g", "f"),
];

#[test]
fn cut_values_of_the_gansner_tree() {
    let mut g = gansner_graph();
    longest_path(&mut g);
    let simplex = Simplex::with_tree(&g, &ids(&g), &GANSNER_TREE);

    assert_eq!(simplex.cut_value("a", "b"), Some(3.0));
    assert_eq!(simplex.cut_value("b", "c"), Some(3.0));
    assert_eq!(simplex.cut_value("c", "d"), Some(3.0));
    assert_eq!(simplex.cut_value("d", "h"), Some(3.0));
    assert_eq!(simplex.cut_value("g", "h"), Some(-1.0));
    assert_eq!(simplex.cut_value("e", "g"), Some(0.0));
    assert_eq!(simplex.cut_value("f", "g"), Some(0.0));
    // Non-tree edges have no cut value.
    assert_eq!(simplex.cut_value("a", "e"), None);
}

#[test]
fn leave_edge_picks_the_negative_cut_value() {
    let mut g = gansner_graph();
    longest_path(&mut g);
    let simplex = Simplex::with_tree(&g, &ids(&g), &GANSNER_TREE);

    assert_eq!(
        simplex.leave_edge(),
        Some(("g".to_string(), "h".to_string()))
    );
    let enter = simplex.enter_edge("g", "h").unwrap();
    assert!(
        enter == ("a".to_string(), "e".to_string()) || enter == ("a".to_string(), "f".to_string()),
        "unexpected entering edge {enter:?}"
    );
}

#[test]
fn exchange_keeps_ranks_feasible_and_clears_negative_cut_values() {
    let mut g = gansner_graph();
    longest_path(&mut g);
    let mut simplex = Simplex::with_tree(&g, &ids(&g), &GANSNER_TREE);
    let (ev, ew) = simplex.enter_edge("g", "h").unwrap();

    assert!(simplex.exchange_edges(("g", "h"), (&ev, &ew)));
    assert_eq!(simplex.cut_value("g", "h"), None);
    assert!(simplex.cut_value(&ev, &ew).is_some());
    assert_eq!(simplex.leave_edge(), None);

    for e in g.edges() {
        let rv = simplex.rank(&e.v).unwrap();
        let rw = simplex.rank(&e.w).unwrap();
        assert!(rw - rv >= 1, "edge {e} is infeasible");
    }
}

#[test]
fn exchange_rejects_role_mismatches() {
    let mut g = gansner_graph();
    longest_path(&mut g);
    let mut simplex = Simplex::with_tree(&g, &ids(&g), &GANSNER_TREE);
    // (a, e) is not a tree edge, so it cannot leave.
    assert!(!simplex.exchange_edges(("a", "e"), ("a", "f")));
    assert!(!simplex.exchange_edges(("a", "b"), ("zzz", "a")));
}

#[test]
fn low_lim_values_nest_along_the_tree() {
    let mut g = gansner_graph();
    longest_path(&mut g);
    let simplex = Simplex::with_tree(&g, &ids(&g), &GANSNER_TREE);

    for v in g.nodes() {
        let Some(parent) = simplex.tree_parent(v) else {
            continue;
        };
        let (low, lim) = simplex.low_lim(v).unwrap();
        let (parent_low, parent_lim) = simplex.low_lim(parent).unwrap();
        assert!(low <= lim);
        assert!(parent_low <= low, "{v} low outside {parent}");
        assert!(lim < parent_lim, "{v} lim outside {parent}");
    }
    let roots = g
        .nodes()
        .filter(|v| simplex.tree_parent(v).is_none())
        .count();
    assert_eq!(roots, 1);
}

#[test]
fn feasible_tree_is_tight_and_spanning() {
    let mut g = gansner_graph();
    longest_path(&mut g);
    let mut simplex = Simplex::new(&g, &ids(&g));
    assert!(simplex.feasible_tree());

    let tree = simplex.tree_edges();
    assert_eq!(tree.len(), g.node_count() - 1);
    for (v, w) in &tree {
        let slack = simplex.rank(w).unwrap() - simplex.rank(v).unwrap() - 1;
        assert_eq!(slack, 0, "tree edge {v} -> {w} is not tight");
    }
}

#[test]
fn weighted_length_never_exceeds_longest_path() {
    let graphs = {
        let mut weighted = gansner_graph();
        weighted.set_edge_named("a", "h", Some("heavy"), Some(EdgeLabel::weighted(5.0, 1)));
        let mut fan = new_graph();
        fan.set_path(&["r", "a", "b", "c", "d"]);
        fan.set_path(&["x", "d"]);
        fan.set_path(&["y", "c"]);
        fan.set_path(&["r", "z"]);
        vec![gansner_graph(), weighted, fan]
    };

    for mut g in graphs {
        longest_path(&mut g);
        let mut simplex = Simplex::new(&g, &ids(&g));
        let before = simplex.weighted_length();
        simplex.run();
        let after = simplex.weighted_length();
        assert!(after <= before, "{after} > {before}");
        assert_eq!(simplex.leave_edge(), None);
    }
}

#[test]
fn network_simplex_writes_normalized_ranks_per_component() {
    let mut g = gansner_graph();
    g.set_path(&["p", "q"]);
    rank::network_simplex::network_simplex(&mut g);
    assert_eq!(g.node("a").unwrap().rank, Some(0));
    assert_eq!(g.node("p").unwrap().rank, Some(0));
    assert_eq!(g.node("q").unwrap().rank, Some(1));
}

/// Ranks under which every edge of `GANSNER_TREE` is tight (figure 2-2(a)).
const GANSNER_TREE_RANKS: [(&str, i32); 8] = [
    ("a", 0),
    ("b", 1),
    ("c", 2),
    ("d", 3),
    ("h", 4),
    ("g", 3),
    ("e", 2),
    ("f", 2),
];

#[test]
fn every_exchange_shortens_the_weighted_length() {
    let mut weighted = gansner_graph();
    weighted.set_edge_with_label("a", "e", EdgeLabel::weighted(3.0, 1));
    let cases = [(gansner_graph(), 10.0), (weighted, 12.0)];

    for (mut g, optimum) in cases {
        for (v, rank) in GANSNER_TREE_RANKS {
            g.node_mut(v).unwrap().rank = Some(rank);
        }
        let mut simplex = Simplex::with_tree(&g, &ids(&g), &GANSNER_TREE);

        let mut exchanges = 0;
        let mut shortened = 0;
        while let Some((lv, lw)) = simplex.leave_edge() {
            let (ev, ew) = simplex.enter_edge(&lv, &lw).unwrap();
            let slack = simplex.edge_slack(&ev, &ew).unwrap();
            let before = simplex.weighted_length();
            assert!(simplex.exchange_edges((&lv, &lw), (&ev, &ew)));
            let after = simplex.weighted_length();

            if slack > 0 {
                assert!(after < before, "{lv}->{lw} / {ev}->{ew}: {after} >= {before}");
                shortened += 1;
            } else {
                assert_eq!(after, before);
            }
            exchanges += 1;
            assert!(exchanges <= 20, "exchanges did not terminate");
        }

        assert!(shortened > 0);
        assert_eq!(simplex.weighted_length(), optimum);
    }
}
