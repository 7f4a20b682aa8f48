//! JSON-shaped export/import and inputs for downstream report producers.
//!
//! The export is a plain structure, separate from the live graph, meant to
//! be stored in a single JSON column. Loading replays every record through
//! the normal mutation methods, so key normalization and cache invalidation
//! hold after a restore and loading the same export twice changes nothing.

use crate::error::GraphError;
use crate::graph::KnowledgeGraph;
use semgraph_core::{CoOccurrence, Edge, EntityContext, Node};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Recorded contexts for one entity label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityContextGroup {
    pub entity: String,
    #[serde(default)]
    pub contexts: Vec<EntityContext>,
}

/// Serializable form of a knowledge graph. Every section is optional on input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GraphExport {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub co_occurrences: Vec<CoOccurrence>,
    pub entity_contexts: Vec<EntityContextGroup>,
}

/// Directed edge handed to the link-ranking simulator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkEdge {
    pub from: String,
    pub to: String,
}

/// Subject-predicate-object triple handed to the cross-entity traversal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Triple {
    pub subject: String,
    pub predicate: String,
    pub object: String,
}

impl KnowledgeGraph {
    /// Exports every node, edge, co-occurrence and context.
    pub fn to_export(&self) -> GraphExport {
        GraphExport {
            nodes: self.nodes().cloned().collect(),
            edges: self.edges().cloned().collect(),
            co_occurrences: self.co_occurrences().cloned().collect(),
            entity_contexts: self
                .entity_contexts()
                .map(|(entity, contexts)| EntityContextGroup {
                    entity: entity.clone(),
                    contexts: contexts.clone(),
                })
                .collect(),
        }
    }

    /// Builds a fresh graph from an export.
    pub fn from_export(export: &GraphExport) -> Self {
        let mut graph = Self::new();
        graph.load_export(export);
        graph
    }

    /// Replays an export into this graph.
    ///
    /// Edges whose endpoints are missing are skipped with a warning.
    /// Returns how many were skipped.
    pub fn load_export(&mut self, export: &GraphExport) -> usize {
        for node in &export.nodes {
            self.add_node(node.clone());
        }

        let mut skipped = 0usize;
        for edge in &export.edges {
            if let Err(e) = self.add_edge(edge.clone()) {
                warn!("skipping edge on import: {}", e);
                skipped += 1;
            }
        }

        for record in &export.co_occurrences {
            self.merge_co_occurrence(record);
        }

        for group in &export.entity_contexts {
            for context in &group.contexts {
                self.add_entity_context(&group.entity, context.position, &context.page_url);
            }
        }

        debug!(
            nodes = export.nodes.len(),
            edges = export.edges.len() - skipped,
            skipped,
            "loaded graph export"
        );
        skipped
    }

    /// Serializes the export to a JSON string.
    pub fn to_json(&self) -> Result<String, GraphError> {
        Ok(serde_json::to_string(&self.to_export())?)
    }

    /// Builds a graph from a JSON export.
    ///
    /// Malformed JSON is an error; absent sections are not.
    pub fn from_json(data: &str) -> Result<Self, GraphError> {
        let export: GraphExport = serde_json::from_str(data)?;
        Ok(Self::from_export(&export))
    }

    /// Current edges as `{from, to}` node ID pairs, in insertion order.
    pub fn link_graph_edges(&self) -> Vec<LinkEdge> {
        self.edges()
            .map(|edge| LinkEdge {
                from: edge.source.clone(),
                to: edge.target.clone(),
            })
            .collect()
    }

    /// Current edges as term-level triples.
    pub fn triples(&self) -> Vec<Triple> {
        self.edges()
            .filter_map(|edge| {
                let subject = self.get_node(&edge.source)?;
                let object = self.get_node(&edge.target)?;
                Some(Triple {
                    subject: subject.term.clone(),
                    predicate: edge.relation.clone(),
                    object: object.term.clone(),
                })
            })
            .collect()
    }
}
