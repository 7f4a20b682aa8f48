//! Semgraph Core - Knowledge graph records
//!
//! This crate defines the plain data records that flow through Semgraph:
//! entities (nodes), relationships (edges), and the contextual signals
//! (co-occurrences and positional contexts) that feed the analytics in
//! `semgraph-graph`.
//!
//! Nothing here knows about graph algorithms. The records are serde-friendly
//! so the same types serve the in-memory store and the JSON export.
//!
//! # Example
//!
//! ```
//! use semgraph_core::{Edge, EdgeCategory, Node};
//!
//! let seo = Node::new("n1", "SEO", "concept").with_importance(0.9);
//! let serp = Node::new("n2", "SERP", "concept");
//! let edge = Edge::new("e1", "n1", "n2", "ranks_in").with_category(EdgeCategory::Root);
//!
//! assert_eq!(edge.key(), "n1::n2::ranks_in");
//! assert_eq!(seo.metadata.importance, 0.9);
//! assert_eq!(serp.kind, "concept");
//! ```

mod context;
mod edge;
mod error;
mod node;

pub use context::{normalize_label, CoOccurrence, EntityContext, EntityPosition, Proximity};
pub use edge::{CategoryBucket, Edge, EdgeCategory, EdgeMetadata};
pub use error::ParseError;
pub use node::{Node, NodeMetadata};
