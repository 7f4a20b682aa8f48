//! End-to-end behavior of the analytics over small, hand-built graphs.

use semgraph_core::{Edge, EdgeCategory, EntityPosition, Node, Proximity};
use semgraph_graph::{HolePriority, KnowledgeGraph};
use std::collections::BTreeSet;

fn build(nodes: &[&str], edges: &[(&str, &str)]) -> KnowledgeGraph {
    let mut graph = KnowledgeGraph::new();
    for id in nodes {
        graph.add_node(Node::new(*id, format!("Term {id}"), "concept"));
    }
    for (i, (source, target)) in edges.iter().enumerate() {
        graph
            .add_edge(Edge::new(format!("e{i}"), *source, *target, "related_to"))
            .unwrap();
    }
    graph
}

#[test]
fn identical_terms_are_fully_similar() {
    let graph = build(&["a", "b"], &[("a", "b")]);
    assert_eq!(graph.semantic_similarity("Term a", "Term a"), 1.0);
    assert_eq!(graph.semantic_similarity("term b", "TERM B"), 1.0);
}

#[test]
fn empty_graph_yields_empty_analytics() {
    let graph = KnowledgeGraph::new();
    assert!(graph.calculate_betweenness_centrality().is_empty());
    assert!(graph.identify_structural_holes().is_empty());
    assert!(graph.identify_knowledge_gaps().is_empty());
    assert!(graph.find_bridge_entities(0.3).is_empty());
    assert!(graph.identify_cannibalization_risks().is_empty());
}

#[test]
fn star_center_is_the_only_bridge() {
    let graph = build(&["c", "l1", "l2", "l3"], &[("c", "l1"), ("c", "l2"), ("c", "l3")]);
    let scores = graph.calculate_betweenness_centrality();

    assert_eq!(scores.get("c"), 1.0);
    for leaf in ["l1", "l2", "l3"] {
        assert_eq!(scores.get(leaf), 0.0);
    }

    let bridges = graph.find_bridge_entities(0.3);
    assert_eq!(bridges.len(), 1);
    assert_eq!(bridges[0].id, "c");
}

#[test]
fn disjoint_triangles_form_one_critical_hole() {
    let graph = build(
        &["a", "b", "c", "d", "e", "f"],
        &[("a", "b"), ("b", "c"), ("c", "a"), ("d", "e"), ("e", "f"), ("f", "d")],
    );

    let holes = graph.identify_structural_holes();
    assert_eq!(holes.len(), 1);

    let hole = &holes[0];
    assert_eq!(hole.connection_strength, 0.0);
    assert_eq!(hole.priority, HolePriority::Critical);

    let clusters: BTreeSet<BTreeSet<&str>> = [&hole.cluster_a, &hole.cluster_b]
        .into_iter()
        .map(|cluster| cluster.iter().map(String::as_str).collect())
        .collect();
    let expected: BTreeSet<BTreeSet<&str>> = [
        BTreeSet::from(["a", "b", "c"]),
        BTreeSet::from(["d", "e", "f"]),
    ]
    .into_iter()
    .collect();
    assert_eq!(clusters, expected);
}

#[test]
fn repeated_sentence_co_occurrence_beats_single_page() {
    let mut graph = KnowledgeGraph::new();
    graph.add_co_occurrence("x", "y", "p1", Proximity::SameSentence);
    graph.add_co_occurrence("x", "y", "p1", Proximity::SameSentence);
    graph.add_co_occurrence("u", "v", "p1", Proximity::SamePage);

    let strong = graph.get_co_occurrence_score("x", "y");
    let weak = graph.get_co_occurrence_score("u", "v");
    assert!(strong > 0.5 && strong <= 1.0);
    assert!(strong > weak);
}

#[test]
fn isolated_node_drifts_entities_only() {
    let mut graph = build(&["a", "b"], &[("a", "b")]);
    let baseline = graph.create_snapshot();

    graph.add_node(Node::new("lonely", "Lonely", "concept"));
    let report = graph.detect_drift(&baseline);

    assert_eq!(report.added_entities.len(), 1);
    assert_eq!(report.edge_drift, 0.0);
    assert!(report.entity_drift > 0.0);
    assert!(report.orphaned_entities.iter().any(|e| e.id == "lonely"));
    // entity Jaccard distance 1/3, halved
    assert_eq!(report.drift_score, 17);
}

#[test]
fn json_round_trip_preserves_graph_and_similarity() {
    let mut graph = build(
        &["a", "b", "c", "d", "e"],
        &[("a", "b"), ("b", "c"), ("c", "d")],
    );
    graph.add_node(Node::new("e", "Term e", "product").with_importance(0.8));
    graph
        .add_edge(Edge::new("cat", "d", "a", "supports").with_category(EdgeCategory::Unique))
        .unwrap();
    graph.add_co_occurrence("Term a", "Term c", "/guide", Proximity::SameSection);
    graph.add_entity_context("Term a", EntityPosition::H2, "/guide");

    let restored = KnowledgeGraph::from_json(&graph.to_json().unwrap()).unwrap();

    let ids = |g: &KnowledgeGraph| g.nodes().map(|n| n.id.clone()).collect::<BTreeSet<_>>();
    let keys = |g: &KnowledgeGraph| g.edges().map(|e| e.key()).collect::<BTreeSet<_>>();
    assert_eq!(ids(&restored), ids(&graph));
    assert_eq!(keys(&restored), keys(&graph));

    let nodes: Vec<String> = graph.nodes().map(|n| n.id.clone()).collect();
    for a in &nodes {
        for b in &nodes {
            assert_eq!(
                restored.semantic_similarity(a, b),
                graph.semantic_similarity(a, b),
                "{a} vs {b}"
            );
        }
    }
    assert_eq!(
        restored.calculate_semantic_distance("Term a", "Term c"),
        graph.calculate_semantic_distance("Term a", "Term c")
    );
}

#[test]
fn should_link_matches_distance_band() {
    let mut graph = build(
        &["a", "b", "c", "d", "e", "f"],
        &[("a", "b"), ("b", "c"), ("c", "d"), ("a", "e")],
    );
    for (i, term) in ["Term a", "Term b", "Term c"].iter().enumerate() {
        graph.add_entity_context(term, EntityPosition::H1, "/p");
        for _ in 0..=i * 4 {
            graph.add_co_occurrence(term, "Term e", "/p", Proximity::SameSentence);
        }
    }

    let nodes: Vec<String> = graph.nodes().map(|n| n.term.clone()).collect();
    for a in &nodes {
        for b in &nodes {
            let d = graph.calculate_semantic_distance(a, b);
            assert_eq!(d.should_link, (0.3..=0.7).contains(&d.distance), "{a} vs {b}");
        }
    }
}
