//! Betweenness centrality.
//!
//! Scores are computed with Brandes' algorithm over the undirected simple
//! graph: one BFS plus a dependency-accumulation pass per source node,
//! O(V·E) overall. Raw scores are normalized by the largest one so the
//! most central entity scores 1.0.
//!
//! The result is cached on the graph and dropped by every structural
//! mutation.

use crate::graph::{Adjacency, KnowledgeGraph};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::time::Instant;
use tracing::debug;

/// Default minimum centrality for [`KnowledgeGraph::find_bridge_entities`].
pub const DEFAULT_BRIDGE_THRESHOLD: f64 = 0.3;

/// Normalized centrality scores keyed by node ID.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CentralityScores {
    scores: HashMap<String, f64>,
}

impl CentralityScores {
    /// Gets the score for a node ID, 0.0 if unknown.
    pub fn get(&self, id: &str) -> f64 {
        self.scores.get(id).copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &f64)> {
        self.scores.iter()
    }

    pub fn into_map(self) -> HashMap<String, f64> {
        self.scores
    }
}

/// A node ranked by how often it sits on shortest paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeEntity {
    pub id: String,
    pub term: String,
    pub centrality: f64,
}

/// Raw (unnormalized) betweenness for every position in `adj`.
pub(crate) fn brandes(adj: &Adjacency) -> Vec<f64> {
    let n = adj.len();
    let mut betweenness = vec![0.0; n];

    for source in 0..n {
        let mut stack = Vec::with_capacity(n);
        let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut sigma = vec![0.0f64; n];
        let mut distance: Vec<Option<usize>> = vec![None; n];
        let mut queue = VecDeque::new();

        sigma[source] = 1.0;
        distance[source] = Some(0);
        queue.push_back(source);

        while let Some(v) = queue.pop_front() {
            stack.push(v);
            let next = distance[v].map_or(0, |d| d + 1);
            for &w in &adj.neighbors[v] {
                if distance[w].is_none() {
                    distance[w] = Some(next);
                    queue.push_back(w);
                }
                if distance[w] == Some(next) {
                    sigma[w] += sigma[v];
                    predecessors[w].push(v);
                }
            }
        }

        let mut delta = vec![0.0f64; n];
        while let Some(w) = stack.pop() {
            for &v in &predecessors[w] {
                delta[v] += (sigma[v] / sigma[w]) * (1.0 + delta[w]);
            }
            if w != source {
                betweenness[w] += delta[w];
            }
        }
    }

    betweenness
}

impl KnowledgeGraph {
    /// Computes (or returns the cached) normalized betweenness centrality.
    ///
    /// An empty graph yields an empty mapping; a graph without any paths
    /// scores every node 0.
    pub fn calculate_betweenness_centrality(&self) -> &CentralityScores {
        self.centrality.get_or_init(|| {
            let start = Instant::now();
            let adj = self.adjacency();
            let raw = brandes(&adj);
            let max = raw.iter().copied().fold(0.0f64, f64::max);

            let scores = adj
                .nodes
                .iter()
                .zip(raw)
                .map(|(&index, score)| {
                    let normalized = if max > 0.0 { score / max } else { 0.0 };
                    (self.graph[index].id.clone(), normalized)
                })
                .collect();

            debug!(
                nodes = adj.len(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "computed betweenness centrality"
            );
            CentralityScores { scores }
        })
    }

    /// Gets the centrality of a node by ID or term; 0.0 if absent.
    pub fn get_centrality_score(&self, term_or_id: &str) -> f64 {
        match self.get_node(term_or_id) {
            Some(node) => self.calculate_betweenness_centrality().get(&node.id),
            None => 0.0,
        }
    }

    /// Nodes whose centrality is at least `threshold`, most central first.
    pub fn find_bridge_entities(&self, threshold: f64) -> Vec<BridgeEntity> {
        let scores = self.calculate_betweenness_centrality();
        let mut bridges: Vec<BridgeEntity> = self
            .nodes()
            .filter_map(|node| {
                let centrality = scores.get(&node.id);
                (centrality >= threshold).then(|| BridgeEntity {
                    id: node.id.clone(),
                    term: node.term.clone(),
                    centrality,
                })
            })
            .collect();
        bridges.sort_by(|a, b| b.centrality.total_cmp(&a.centrality));
        bridges
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use semgraph_core::{Edge, Node};

    fn graph_with(nodes: &[&str], edges: &[(&str, &str)]) -> KnowledgeGraph {
        let mut graph = KnowledgeGraph::new();
        for id in nodes {
            graph.add_node(Node::new(*id, *id, "concept"));
        }
        for (i, (s, t)) in edges.iter().enumerate() {
            graph
                .add_edge(Edge::new(format!("e{i}"), *s, *t, "related_to"))
                .unwrap();
        }
        graph
    }

    #[test]
    fn test_empty_graph() {
        let graph = KnowledgeGraph::new();
        assert!(graph.calculate_betweenness_centrality().is_empty());
        assert!(graph.find_bridge_entities(DEFAULT_BRIDGE_THRESHOLD).is_empty());
    }

    #[test]
    fn test_no_paths_scores_zero() {
        let graph = graph_with(&["a", "b"], &[]);
        let scores = graph.calculate_betweenness_centrality();
        assert_eq!(scores.len(), 2);
        assert_eq!(scores.get("a"), 0.0);
    }

    #[test]
    fn test_path_graph() {
        // a - b - c - d: b and c carry equal traffic
        let graph = graph_with(&["a", "b", "c", "d"], &[("a", "b"), ("b", "c"), ("c", "d")]);
        assert_eq!(graph.get_centrality_score("b"), 1.0);
        assert_eq!(graph.get_centrality_score("c"), 1.0);
        assert_eq!(graph.get_centrality_score("a"), 0.0);
        assert_eq!(graph.get_centrality_score("missing"), 0.0);
    }

    #[test]
    fn test_parallel_edges_do_not_double_count() {
        let graph = graph_with(
            &["a", "b", "c", "d"],
            &[("a", "b"), ("b", "a"), ("a", "c"), ("c", "d"), ("b", "d")],
        );
        // Square a-b-d-c-a: symmetric, every node equally central.
        let scores = graph.calculate_betweenness_centrality();
        for id in ["a", "b", "c", "d"] {
            assert!((scores.get(id) - 1.0).abs() < 1e-9, "{id}");
        }
    }

    #[test]
    fn test_cache_invalidated_on_mutation() {
        let mut graph = graph_with(&["a", "b", "c"], &[("a", "b")]);
        assert_eq!(graph.get_centrality_score("b"), 0.0);

        graph.add_edge(Edge::new("late", "b", "c", "related_to")).unwrap();
        assert_eq!(graph.get_centrality_score("b"), 1.0);

        graph.add_node(Node::new("d", "d", "concept"));
        assert_eq!(graph.calculate_betweenness_centrality().len(), 4);
    }

    #[test]
    fn test_bridge_entities_sorted() {
        // a - b - c - d - e: c is most central, b and d next
        let graph = graph_with(
            &["a", "b", "c", "d", "e"],
            &[("a", "b"), ("b", "c"), ("c", "d"), ("d", "e")],
        );
        let bridges = graph.find_bridge_entities(0.3);
        let ids: Vec<&str> = bridges.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids[0], "c");
        assert_eq!(ids.len(), 3);
        assert!(bridges.windows(2).all(|w| w[0].centrality >= w[1].centrality));
    }
}
