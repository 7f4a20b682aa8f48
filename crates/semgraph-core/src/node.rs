//! Entity nodes.

use serde::{Deserialize, Serialize};

/// Free-form metadata attached to an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeMetadata {
    /// Relative importance of the entity, usually in `[0, 1]`.
    #[serde(default = "default_importance")]
    pub importance: f64,

    /// Where the entity was extracted from (a URL, a model name, ...).
    #[serde(default)]
    pub source: String,
}

fn default_importance() -> f64 {
    0.5
}

impl Default for NodeMetadata {
    fn default() -> Self {
        Self {
            importance: default_importance(),
            source: String::new(),
        }
    }
}

/// An entity in the knowledge graph.
///
/// Identity is the `id`. The `term` is the human-facing label and doubles
/// as a case-insensitive lookup key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,

    pub term: String,

    /// Entity type, e.g. "concept", "product", "person".
    #[serde(rename = "type", default)]
    pub kind: String,

    #[serde(default)]
    pub definition: String,

    #[serde(default)]
    pub metadata: NodeMetadata,
}

impl Node {
    /// Creates a node with empty definition and default metadata.
    pub fn new(id: impl Into<String>, term: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            term: term.into(),
            kind: kind.into(),
            definition: String::new(),
            metadata: NodeMetadata::default(),
        }
    }

    pub fn with_definition(mut self, definition: impl Into<String>) -> Self {
        self.definition = definition.into();
        self
    }

    pub fn with_importance(mut self, importance: f64) -> Self {
        self.metadata.importance = importance;
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.metadata.source = source.into();
        self
    }

    /// Returns true if `term` names this node, ignoring case.
    pub fn matches_term(&self, term: &str) -> bool {
        self.term.to_lowercase() == term.to_lowercase()
    }
}
