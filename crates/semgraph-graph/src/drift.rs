//! Point-in-time snapshots and drift detection.
//!
//! A snapshot records which entities and relationships existed at a moment.
//! Comparing the live graph against it yields the added/removed sets and a
//! 0-100 drift score: the mean of the entity and edge Jaccard distances.

use crate::graph::KnowledgeGraph;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Immutable capture of the graph's identity sets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphSnapshot {
    pub timestamp: DateTime<Utc>,
    pub entity_ids: BTreeSet<String>,
    /// Node ID → term, so removed entities can still be named.
    pub entity_terms: BTreeMap<String, String>,
    /// `source::target::relation` keys.
    pub edge_keys: BTreeSet<String>,
    pub edge_ids: BTreeSet<String>,
    pub node_count: usize,
    pub edge_count: usize,
}

impl GraphSnapshot {
    /// Captures the current state of `graph`.
    pub fn capture(graph: &KnowledgeGraph) -> Self {
        Self {
            timestamp: Utc::now(),
            entity_ids: graph.nodes().map(|n| n.id.clone()).collect(),
            entity_terms: graph
                .nodes()
                .map(|n| (n.id.clone(), n.term.clone()))
                .collect(),
            edge_keys: graph.edges().map(|e| e.key()).collect(),
            edge_ids: graph.edges().map(|e| e.id.clone()).collect(),
            node_count: graph.node_count(),
            edge_count: graph.edge_count(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriftEntity {
    pub id: String,
    pub term: String,
}

/// Changes between a baseline snapshot and the live graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftReport {
    pub baseline_timestamp: DateTime<Utc>,
    pub detected_at: DateTime<Utc>,
    pub added_entities: Vec<DriftEntity>,
    pub removed_entities: Vec<DriftEntity>,
    pub added_edges: Vec<String>,
    pub removed_edges: Vec<String>,
    /// Current entities without any relationship.
    pub orphaned_entities: Vec<DriftEntity>,
    /// Jaccard distance between baseline and current entity IDs.
    pub entity_drift: f64,
    /// Jaccard distance between baseline and current edge keys.
    pub edge_drift: f64,
    /// Combined drift, 0 (unchanged) to 100 (nothing in common).
    pub drift_score: u32,
}

impl DriftReport {
    /// Returns a summary suitable for CLI output.
    pub fn summary(&self) -> String {
        format!(
            "Drift: {}/100 (entities +{} -{}, edges +{} -{}, orphaned: {})",
            self.drift_score,
            self.added_entities.len(),
            self.removed_entities.len(),
            self.added_edges.len(),
            self.removed_edges.len(),
            self.orphaned_entities.len()
        )
    }
}

/// `1 - |A ∩ B| / |A ∪ B|`, or 0 when both sets are empty.
fn jaccard_distance(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    1.0 - a.intersection(b).count() as f64 / union as f64
}

impl KnowledgeGraph {
    /// Captures a drift baseline.
    pub fn create_snapshot(&self) -> GraphSnapshot {
        GraphSnapshot::capture(self)
    }

    /// Compares the live graph against `baseline`.
    pub fn detect_drift(&self, baseline: &GraphSnapshot) -> DriftReport {
        let current = GraphSnapshot::capture(self);

        let added_entities = current
            .entity_ids
            .difference(&baseline.entity_ids)
            .map(|id| DriftEntity {
                id: id.clone(),
                term: current.entity_terms.get(id).cloned().unwrap_or_default(),
            })
            .collect();
        let removed_entities = baseline
            .entity_ids
            .difference(&current.entity_ids)
            .map(|id| DriftEntity {
                id: id.clone(),
                term: baseline.entity_terms.get(id).cloned().unwrap_or_default(),
            })
            .collect();
        let added_edges = current
            .edge_keys
            .difference(&baseline.edge_keys)
            .cloned()
            .collect();
        let removed_edges = baseline
            .edge_keys
            .difference(&current.edge_keys)
            .cloned()
            .collect();

        let orphaned_entities = self
            .nodes()
            .filter(|node| !self.edges().any(|edge| edge.touches(&node.id)))
            .map(|node| DriftEntity {
                id: node.id.clone(),
                term: node.term.clone(),
            })
            .collect();

        let entity_drift = jaccard_distance(&baseline.entity_ids, &current.entity_ids);
        let edge_drift = jaccard_distance(&baseline.edge_keys, &current.edge_keys);
        let drift_score = (100.0 * (entity_drift * 0.5 + edge_drift * 0.5))
            .round()
            .clamp(0.0, 100.0) as u32;

        DriftReport {
            baseline_timestamp: baseline.timestamp,
            detected_at: current.timestamp,
            added_entities,
            removed_entities,
            added_edges,
            removed_edges,
            orphaned_entities,
            entity_drift,
            edge_drift,
            drift_score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use semgraph_core::{Edge, Node};

    fn graph() -> KnowledgeGraph {
        let mut graph = KnowledgeGraph::new();
        graph.add_node(Node::new("a", "Alpha", "concept"));
        graph.add_node(Node::new("b", "Beta", "concept"));
        graph.add_edge(Edge::new("e1", "a", "b", "related_to")).unwrap();
        graph
    }

    #[test]
    fn test_no_change() {
        let graph = graph();
        let baseline = graph.create_snapshot();
        let report = graph.detect_drift(&baseline);
        assert_eq!(report.drift_score, 0);
        assert!(report.added_entities.is_empty());
        assert!(report.orphaned_entities.is_empty());
    }

    #[test]
    fn test_empty_graphs_do_not_drift() {
        let graph = KnowledgeGraph::new();
        let report = graph.detect_drift(&graph.create_snapshot());
        assert_eq!(report.entity_drift, 0.0);
        assert_eq!(report.edge_drift, 0.0);
        assert_eq!(report.drift_score, 0);
    }

    #[test]
    fn test_snapshot_captures_keys() {
        let snapshot = graph().create_snapshot();
        assert_eq!(snapshot.node_count, 2);
        assert!(snapshot.edge_keys.contains("a::b::related_to"));
        assert_eq!(snapshot.entity_terms["b"], "Beta");
    }

    #[test]
    fn test_removed_after_clear() {
        let mut graph = graph();
        let baseline = graph.create_snapshot();
        graph.clear();
        graph.add_node(Node::new("c", "Gamma", "concept"));

        let report = graph.detect_drift(&baseline);
        assert_eq!(report.removed_entities.len(), 2);
        assert_eq!(report.removed_entities[0].term, "Alpha");
        assert_eq!(report.removed_edges, vec!["a::b::related_to"]);
        assert_eq!(report.entity_drift, 1.0);
        assert_eq!(report.edge_drift, 1.0);
        assert_eq!(report.drift_score, 100);
    }

    #[test]
    fn test_relation_change_is_edge_drift() {
        let mut graph = graph();
        let baseline = graph.create_snapshot();
        graph.add_edge(Edge::new("e1", "a", "b", "part_of")).unwrap();

        let report = graph.detect_drift(&baseline);
        assert_eq!(report.added_edges, vec!["a::b::part_of"]);
        assert_eq!(report.removed_edges, vec!["a::b::related_to"]);
        assert_eq!(report.entity_drift, 0.0);
        assert_eq!(report.drift_score, 50);
        assert!(report.summary().starts_with("Drift: 50/100"));
    }
}
