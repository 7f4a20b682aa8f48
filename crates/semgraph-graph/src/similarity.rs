//! Semantic similarity and linking distance.
//!
//! Similarity is structural: identical entities score 1.0, direct
//! neighbors 0.9, and otherwise the Jaccard overlap of the two neighbor
//! sets is scaled into `[0.3, 0.8]`. Entities with no neighbors at all
//! fall back to a type comparison.
//!
//! Distance folds in the contextual signals:
//!
//! ```text
//! combined = similarity × context_weight × co_occurrence
//! distance = 1 − combined
//! ```
//!
//! Pairs whose distance lies in `[0.3, 0.7]` are worth an internal link.

use crate::graph::KnowledgeGraph;
use petgraph::stable_graph::NodeIndex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Inclusive distance band in which two entities should be linked.
pub const LINK_MIN_DISTANCE: f64 = 0.3;
pub const LINK_MAX_DISTANCE: f64 = 0.7;

/// Center of the linking band; candidates closest to it rank first.
const LINK_SWEET_SPOT: f64 = 0.5;

const SAME_ENTITY: f64 = 1.0;
const DIRECTLY_CONNECTED: f64 = 0.9;
const JACCARD_FLOOR: f64 = 0.3;
const JACCARD_SPAN: f64 = 0.5;
const SAME_TYPE: f64 = 0.2;
const UNRELATED: f64 = 0.1;

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// How two entities relate, derived from their distance.
///
/// Never construct directly, use `from_distance()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relationship {
    /// distance < 0.2
    CannibalizationRisk,
    /// distance < 0.3
    CloselyRelated,
    /// distance < 0.5
    StronglyRelated,
    /// distance < 0.7
    ModeratelyRelated,
    /// distance < 0.85
    LooselyRelated,
    TooDifferent,
}

impl Relationship {
    pub fn from_distance(distance: f64) -> Self {
        if distance < 0.2 {
            Relationship::CannibalizationRisk
        } else if distance < 0.3 {
            Relationship::CloselyRelated
        } else if distance < 0.5 {
            Relationship::StronglyRelated
        } else if distance < 0.7 {
            Relationship::ModeratelyRelated
        } else if distance < 0.85 {
            Relationship::LooselyRelated
        } else {
            Relationship::TooDifferent
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Relationship::CannibalizationRisk => "cannibalization_risk",
            Relationship::CloselyRelated => "closely_related",
            Relationship::StronglyRelated => "strongly_related",
            Relationship::ModeratelyRelated => "moderately_related",
            Relationship::LooselyRelated => "loosely_related",
            Relationship::TooDifferent => "too_different",
        }
    }

    /// Editorial guidance shown alongside the classification.
    pub fn recommendation(&self) -> &'static str {
        match self {
            Relationship::CannibalizationRisk => {
                "Cannibalization risk: these entities compete for the same intent. Merge them or differentiate their focus."
            }
            Relationship::CloselyRelated => {
                "Closely related: link sparingly, too many links between near-duplicates dilute topical focus."
            }
            Relationship::StronglyRelated => {
                "Strongly related: ideal internal linking candidates."
            }
            Relationship::ModeratelyRelated => {
                "Moderately related: good supporting links."
            }
            Relationship::LooselyRelated => {
                "Loosely related: link only where the surrounding context justifies it."
            }
            Relationship::TooDifferent => "Too different: avoid linking.",
        }
    }
}

impl std::fmt::Display for Relationship {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Full breakdown of the distance between two entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticDistance {
    pub entity_a: String,
    pub entity_b: String,
    pub cosine_similarity: f64,
    pub context_weight: f64,
    pub co_occurrence_score: f64,
    pub combined_similarity: f64,
    pub distance: f64,
    pub should_link: bool,
    pub relationship: Relationship,
    pub recommendation: String,
}

/// Dense pairwise distances over every node, in insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceMatrix {
    pub ids: Vec<String>,
    pub terms: Vec<String>,
    pub distances: Vec<Vec<f64>>,
    pub should_link: Vec<Vec<bool>>,
}

impl DistanceMatrix {
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl KnowledgeGraph {
    /// Structural similarity of two entities (by ID or term), in `[0, 1]`.
    ///
    /// Returns 0.0 if either entity is unknown.
    pub fn semantic_similarity(&self, a: &str, b: &str) -> f64 {
        match (self.node_index(a), self.node_index(b)) {
            (Some(a), Some(b)) => self.similarity_between(a, b),
            _ => 0.0,
        }
    }

    pub(crate) fn similarity_between(&self, a: NodeIndex, b: NodeIndex) -> f64 {
        if a == b || self.graph[a].matches_term(&self.graph[b].term) {
            return SAME_ENTITY;
        }
        if self.graph.find_edge_undirected(a, b).is_some() {
            return DIRECTLY_CONNECTED;
        }

        let neighbors_a: HashSet<NodeIndex> = self.neighbor_indices(a).into_iter().collect();
        let neighbors_b: HashSet<NodeIndex> = self.neighbor_indices(b).into_iter().collect();
        if !neighbors_a.is_empty() || !neighbors_b.is_empty() {
            let shared = neighbors_a.intersection(&neighbors_b).count() as f64;
            let union = neighbors_a.union(&neighbors_b).count() as f64;
            return JACCARD_FLOOR + JACCARD_SPAN * shared / union;
        }

        if self.graph[a].kind.to_lowercase() == self.graph[b].kind.to_lowercase() {
            SAME_TYPE
        } else {
            UNRELATED
        }
    }

    /// Computes the linking distance between two entities.
    ///
    /// Known entities are resolved to their node so contextual signals are
    /// looked up by term; unknown labels are used as given.
    pub fn calculate_semantic_distance(&self, a: &str, b: &str) -> SemanticDistance {
        let index_a = self.node_index(a);
        let index_b = self.node_index(b);
        let label_a = index_a.map_or(a, |i| self.graph[i].term.as_str());
        let label_b = index_b.map_or(b, |i| self.graph[i].term.as_str());

        let similarity = match (index_a, index_b) {
            (Some(a), Some(b)) => self.similarity_between(a, b),
            _ => 0.0,
        };
        self.distance_breakdown(label_a, label_b, similarity)
    }

    fn distance_between(&self, a: NodeIndex, b: NodeIndex) -> SemanticDistance {
        let similarity = self.similarity_between(a, b);
        self.distance_breakdown(&self.graph[a].term, &self.graph[b].term, similarity)
    }

    fn distance_breakdown(&self, a: &str, b: &str, similarity: f64) -> SemanticDistance {
        let context_weight = self.get_combined_context_weight(a, b);
        let co_occurrence_score = self.get_co_occurrence_score(a, b);
        let combined = similarity * context_weight * co_occurrence_score;

        let distance = round2(1.0 - combined);
        let relationship = Relationship::from_distance(distance);

        SemanticDistance {
            entity_a: a.to_string(),
            entity_b: b.to_string(),
            cosine_similarity: round2(similarity),
            context_weight: round2(context_weight),
            co_occurrence_score: round2(co_occurrence_score),
            combined_similarity: round2(combined),
            distance,
            should_link: (LINK_MIN_DISTANCE..=LINK_MAX_DISTANCE).contains(&distance),
            relationship,
            recommendation: relationship.recommendation().to_string(),
        }
    }

    /// Every other node worth linking from `entity`, closest to the
    /// middle of the linking band first.
    pub fn find_linking_candidates(&self, entity: &str) -> Vec<SemanticDistance> {
        let Some(origin) = self.node_index(entity) else {
            return Vec::new();
        };

        let mut candidates: Vec<SemanticDistance> = self
            .graph
            .node_indices()
            .filter(|&other| other != origin)
            .map(|other| self.distance_between(origin, other))
            .filter(|d| d.should_link)
            .collect();

        candidates.sort_by(|x, y| {
            (x.distance - LINK_SWEET_SPOT)
                .abs()
                .total_cmp(&(y.distance - LINK_SWEET_SPOT).abs())
        });
        candidates
    }

    /// Unordered node pairs so close they likely compete for the same intent.
    pub fn identify_cannibalization_risks(&self) -> Vec<SemanticDistance> {
        let nodes: Vec<NodeIndex> = self.graph.node_indices().collect();
        let mut risks = Vec::new();

        for (i, &a) in nodes.iter().enumerate() {
            for &b in &nodes[i + 1..] {
                let distance = self.distance_between(a, b);
                if distance.relationship == Relationship::CannibalizationRisk {
                    risks.push(distance);
                }
            }
        }

        risks.sort_by(|x, y| x.distance.total_cmp(&y.distance));
        risks
    }

    /// Builds the full N×N distance matrix.
    ///
    /// This is quadratic in the node count; callers bound the graph size.
    pub fn build_distance_matrix(&self) -> DistanceMatrix {
        let nodes: Vec<NodeIndex> = self.graph.node_indices().collect();
        let n = nodes.len();
        let mut distances = vec![vec![0.0; n]; n];
        let mut should_link = vec![vec![false; n]; n];

        for i in 0..n {
            for j in (i + 1)..n {
                let d = self.distance_between(nodes[i], nodes[j]);
                distances[i][j] = d.distance;
                distances[j][i] = d.distance;
                should_link[i][j] = d.should_link;
                should_link[j][i] = d.should_link;
            }
        }

        DistanceMatrix {
            ids: nodes.iter().map(|&i| self.graph[i].id.clone()).collect(),
            terms: nodes.iter().map(|&i| self.graph[i].term.clone()).collect(),
            distances,
            should_link,
        }
    }
}
