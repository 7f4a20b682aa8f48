//! Knowledge gaps: entities the graph knows about but has not tied in.

use crate::graph::KnowledgeGraph;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapKind {
    /// An entity with no relationships in an otherwise connected graph.
    IsolatedEntity,
    /// Two entities observed together in content with no edge between them.
    MissingRelationship,
}

/// A missing piece of the knowledge graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeGap {
    pub kind: GapKind,
    /// Terms of the entities involved.
    pub entities: Vec<String>,
    /// How much closing the gap matters, in `[0, 1]`.
    pub severity: f64,
    pub description: String,
}

impl KnowledgeGraph {
    /// Finds isolated entities and co-occurring but unlinked pairs.
    ///
    /// Graphs with fewer than two nodes or no edges yield nothing.
    pub fn identify_knowledge_gaps(&self) -> Vec<KnowledgeGap> {
        if self.node_count() < 2 || self.edge_count() == 0 {
            return Vec::new();
        }

        let mut gaps: Vec<KnowledgeGap> = self
            .nodes()
            .filter(|node| self.get_edges_for_node(&node.id).is_empty())
            .map(|node| KnowledgeGap {
                kind: GapKind::IsolatedEntity,
                entities: vec![node.term.clone()],
                severity: node.metadata.importance.clamp(0.0, 1.0),
                description: format!("\"{}\" has no relationships to other entities", node.term),
            })
            .collect();

        for record in self.co_occurrences() {
            let (Some(a), Some(b)) = (
                self.get_node_by_term(&record.entity_a),
                self.get_node_by_term(&record.entity_b),
            ) else {
                continue;
            };
            if a.id == b.id || self.are_connected(&a.id, &b.id) {
                continue;
            }
            gaps.push(KnowledgeGap {
                kind: GapKind::MissingRelationship,
                entities: vec![a.term.clone(), b.term.clone()],
                severity: self.get_co_occurrence_score(&record.entity_a, &record.entity_b),
                description: format!(
                    "\"{}\" and \"{}\" appear together {} time(s) but are not related",
                    a.term, b.term, record.count
                ),
            });
        }

        gaps.sort_by(|x, y| {
            y.severity
                .total_cmp(&x.severity)
                .then_with(|| x.entities.cmp(&y.entities))
        });
        gaps
    }
}
