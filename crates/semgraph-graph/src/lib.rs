//! Semgraph Graph - Knowledge graph analytics
//!
//! This crate owns the in-memory knowledge graph and the analytics that run
//! over it: co-occurrence and context weighting, semantic similarity and
//! linking distance, betweenness centrality, structural holes, knowledge
//! gaps, and drift against a snapshot.
//!
//! # Architecture
//!
//! `KnowledgeGraph` wraps a petgraph arena keyed by string IDs. Analytics
//! read it lazily; the only derived state kept on the graph is the
//! centrality cache, which every structural mutation drops.
//!
//! The graph is a single-owner, synchronous structure. Hosts that share it
//! across threads wrap it in their own lock.
//!
//! # Example
//!
//! ```
//! use semgraph_core::{Edge, Node, Proximity};
//! use semgraph_graph::KnowledgeGraph;
//!
//! let mut graph = KnowledgeGraph::new();
//! graph.add_node(Node::new("n1", "SEO", "concept"));
//! graph.add_node(Node::new("n2", "Backlinks", "concept"));
//! graph.add_edge(Edge::new("e1", "n1", "n2", "uses")).unwrap();
//! graph.add_co_occurrence("SEO", "Backlinks", "https://example.com", Proximity::SameSentence);
//!
//! assert_eq!(graph.semantic_similarity("seo", "backlinks"), 0.9);
//! let distance = graph.calculate_semantic_distance("SEO", "Backlinks");
//! assert!(distance.distance > 0.0);
//! ```

mod config;
mod drift;
mod error;
mod export;
mod gaps;
mod graph;
mod holes;
mod ranking;
mod similarity;
mod store;
mod tracker;

pub use config::{AnalyticsConfig, ConfigError};
pub use drift::{DriftEntity, DriftReport, GraphSnapshot};
pub use error::GraphError;
pub use export::{EntityContextGroup, GraphExport, LinkEdge, Triple};
pub use gaps::{GapKind, KnowledgeGap};
pub use graph::{GraphStats, KnowledgeGraph};
pub use holes::{HolePriority, StructuralHole, DEFAULT_HOLE_THRESHOLD};
pub use ranking::{BridgeEntity, CentralityScores, DEFAULT_BRIDGE_THRESHOLD};
pub use similarity::{
    DistanceMatrix, Relationship, SemanticDistance, LINK_MAX_DISTANCE, LINK_MIN_DISTANCE,
};
pub use store::{GraphStore, StoreError};
pub use tracker::{NEUTRAL_CONTEXT_WEIGHT, NEUTRAL_CO_OCCURRENCE};
