//! Relationship edges.
//!
//! Edges are stored with a direction (source → target) but every analytic
//! in Semgraph treats them as undirected. The optional category tags how
//! an attribute relates to its entity.

use crate::error::ParseError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Attribute category of a relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EdgeCategory {
    /// Defining attribute every instance has.
    Root,
    /// Attribute that distinguishes the entity from its peers.
    Unique,
    /// Attribute only some instances carry.
    Rare,
    /// Attribute shared broadly across the domain.
    Common,
}

impl EdgeCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeCategory::Root => "ROOT",
            EdgeCategory::Unique => "UNIQUE",
            EdgeCategory::Rare => "RARE",
            EdgeCategory::Common => "COMMON",
        }
    }
}

impl std::fmt::Display for EdgeCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EdgeCategory {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ROOT" => Ok(EdgeCategory::Root),
            "UNIQUE" => Ok(EdgeCategory::Unique),
            "RARE" => Ok(EdgeCategory::Rare),
            "COMMON" => Ok(EdgeCategory::Common),
            _ => Err(ParseError::Category(s.to_string())),
        }
    }
}

/// Grouping key for edges by category, with an explicit bucket for
/// edges that carry none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CategoryBucket {
    Root,
    Unique,
    Rare,
    Common,
    Uncategorized,
}

impl From<Option<EdgeCategory>> for CategoryBucket {
    fn from(category: Option<EdgeCategory>) -> Self {
        match category {
            Some(EdgeCategory::Root) => CategoryBucket::Root,
            Some(EdgeCategory::Unique) => CategoryBucket::Unique,
            Some(EdgeCategory::Rare) => CategoryBucket::Rare,
            Some(EdgeCategory::Common) => CategoryBucket::Common,
            None => CategoryBucket::Uncategorized,
        }
    }
}

impl std::fmt::Display for CategoryBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CategoryBucket::Root => "ROOT",
            CategoryBucket::Unique => "UNIQUE",
            CategoryBucket::Rare => "RARE",
            CategoryBucket::Common => "COMMON",
            CategoryBucket::Uncategorized => "UNCATEGORIZED",
        };
        write!(f, "{}", s)
    }
}

/// Metadata carried by an edge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<EdgeCategory>,
}

/// A relationship between two entities, referenced by node ID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub relation: String,
    #[serde(default)]
    pub metadata: EdgeMetadata,
}

impl Edge {
    /// Creates an uncategorized edge.
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
        relation: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            relation: relation.into(),
            metadata: EdgeMetadata::default(),
        }
    }

    pub fn with_category(mut self, category: EdgeCategory) -> Self {
        self.metadata.category = Some(category);
        self
    }

    /// Composite key used for drift comparison: `source::target::relation`.
    pub fn key(&self) -> String {
        format!("{}::{}::{}", self.source, self.target, self.relation)
    }

    pub fn bucket(&self) -> CategoryBucket {
        self.metadata.category.into()
    }

    /// Returns true if this edge touches `node_id` at either end.
    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }
}
