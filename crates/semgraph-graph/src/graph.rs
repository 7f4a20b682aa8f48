//! Core graph data structure.
//!
//! `KnowledgeGraph` wraps a petgraph arena and adds ID indexes for fast
//! lookups. It owns the entity/relationship data, the contextual signals
//! recorded against entity labels, and the derived centrality cache.

use crate::ranking::CentralityScores;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use semgraph_core::{CategoryBucket, CoOccurrence, Edge, EntityContext, Node};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::OnceLock;
use tracing::debug;

use crate::error::GraphError;

/// The knowledge graph.
///
/// Nodes and edges are upserted by their string IDs. Every structural
/// mutation drops the cached centrality scores before returning, so a
/// reader never sees scores computed against a different graph.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeGraph {
    /// Node/edge arena. Indexes stay valid across edge removal.
    pub(crate) graph: StableDiGraph<Node, Edge>,

    /// Maps node IDs to arena indexes.
    id_index: HashMap<String, NodeIndex>,

    /// Maps edge IDs to arena indexes.
    edge_index: HashMap<String, EdgeIndex>,

    /// Co-occurrence records keyed by the ordered pair of normalized labels.
    pub(crate) co_occurrences: BTreeMap<(String, String), CoOccurrence>,

    /// Positional contexts keyed by normalized entity label.
    pub(crate) contexts: BTreeMap<String, Vec<EntityContext>>,

    /// Betweenness centrality, computed on first read.
    pub(crate) centrality: OnceLock<CentralityScores>,
}

impl KnowledgeGraph {
    /// Creates a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a node, or overwrites the node with the same ID.
    pub fn add_node(&mut self, node: Node) {
        match self.id_index.get(&node.id) {
            Some(&index) => {
                debug!(id = %node.id, "replacing node");
                self.graph[index] = node;
            }
            None => {
                let id = node.id.clone();
                let index = self.graph.add_node(node);
                self.id_index.insert(id, index);
            }
        }
        self.invalidate_centrality();
    }

    /// Inserts an edge, or overwrites the edge with the same ID.
    ///
    /// Both endpoints must already be present as node IDs.
    pub fn add_edge(&mut self, edge: Edge) -> Result<(), GraphError> {
        let from = self.endpoint(&edge, &edge.source)?;
        let to = self.endpoint(&edge, &edge.target)?;

        if let Some(&existing) = self.edge_index.get(&edge.id) {
            if self.graph.edge_endpoints(existing) == Some((from, to)) {
                self.graph[existing] = edge;
                self.invalidate_centrality();
                return Ok(());
            }
            debug!(id = %edge.id, "re-pointing edge");
            self.graph.remove_edge(existing);
        }

        let id = edge.id.clone();
        let index = self.graph.add_edge(from, to, edge);
        self.edge_index.insert(id, index);
        self.invalidate_centrality();
        Ok(())
    }

    fn endpoint(&self, edge: &Edge, node_id: &str) -> Result<NodeIndex, GraphError> {
        self.id_index
            .get(node_id)
            .copied()
            .ok_or_else(|| GraphError::DanglingEdge {
                edge_id: edge.id.clone(),
                endpoint: node_id.to_string(),
            })
    }

    /// Drops all nodes, edges, contextual signals, and cached scores.
    pub fn clear(&mut self) {
        self.graph.clear();
        self.id_index.clear();
        self.edge_index.clear();
        self.co_occurrences.clear();
        self.contexts.clear();
        self.invalidate_centrality();
    }

    pub(crate) fn invalidate_centrality(&mut self) {
        self.centrality.take();
    }

    /// Resolves an ID, or failing that a case-insensitive term, to an index.
    pub(crate) fn node_index(&self, term_or_id: &str) -> Option<NodeIndex> {
        if let Some(&index) = self.id_index.get(term_or_id) {
            return Some(index);
        }
        self.term_index(term_or_id)
    }

    /// Resolves a term (ignoring case) to an index, never matching IDs.
    pub(crate) fn term_index(&self, term: &str) -> Option<NodeIndex> {
        self.graph
            .node_indices()
            .find(|&index| self.graph[index].matches_term(term))
    }

    /// Looks up a node by term only, ignoring case.
    pub fn get_node_by_term(&self, term: &str) -> Option<&Node> {
        let index = self.term_index(term)?;
        self.graph.node_weight(index)
    }

    /// Looks up a node by ID first, then by term (ignoring case).
    pub fn get_node(&self, term_or_id: &str) -> Option<&Node> {
        let index = self.node_index(term_or_id)?;
        self.graph.node_weight(index)
    }

    /// Gets an edge by its ID.
    pub fn get_edge(&self, id: &str) -> Option<&Edge> {
        let index = self.edge_index.get(id)?;
        self.graph.edge_weight(*index)
    }

    /// Distinct undirected neighbors of a node, excluding itself, in
    /// arena order.
    pub(crate) fn neighbor_indices(&self, index: NodeIndex) -> Vec<NodeIndex> {
        let mut seen = HashSet::new();
        let mut neighbors: Vec<NodeIndex> = self
            .graph
            .neighbors_undirected(index)
            .filter(|&n| n != index && seen.insert(n))
            .collect();
        neighbors.sort();
        neighbors
    }

    /// Gets the nodes sharing an edge with the given node, in either direction.
    pub fn get_neighbors(&self, term_or_id: &str) -> Vec<&Node> {
        match self.node_index(term_or_id) {
            Some(index) => self
                .neighbor_indices(index)
                .into_iter()
                .filter_map(|n| self.graph.node_weight(n))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Gets every edge touching the given node.
    pub fn get_edges_for_node(&self, term_or_id: &str) -> Vec<&Edge> {
        match self.get_node(term_or_id) {
            Some(node) => self.edges().filter(|edge| edge.touches(&node.id)).collect(),
            None => Vec::new(),
        }
    }

    /// Groups edges by category; uncategorized edges land in their own bucket.
    pub fn get_edges_by_category(&self) -> BTreeMap<CategoryBucket, Vec<&Edge>> {
        let mut groups: BTreeMap<CategoryBucket, Vec<&Edge>> = BTreeMap::new();
        for edge in self.edges() {
            groups.entry(edge.bucket()).or_default().push(edge);
        }
        groups
    }

    /// Returns true if any edge joins the two node IDs, in either direction.
    pub fn are_connected(&self, a: &str, b: &str) -> bool {
        match (self.id_index.get(a), self.id_index.get(b)) {
            (Some(&a), Some(&b)) => self.graph.find_edge_undirected(a, b).is_some(),
            _ => false,
        }
    }

    /// Returns the number of nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Returns true if the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Iterates over all nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.graph
            .node_indices()
            .filter_map(move |index| self.graph.node_weight(index))
    }

    /// Iterates over all edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.graph
            .edge_indices()
            .filter_map(move |index| self.graph.edge_weight(index))
    }

    /// Builds the undirected simple adjacency used by the analytics.
    pub(crate) fn adjacency(&self) -> Adjacency {
        let nodes: Vec<NodeIndex> = self.graph.node_indices().collect();
        let position: HashMap<NodeIndex, usize> =
            nodes.iter().enumerate().map(|(i, &n)| (n, i)).collect();

        let neighbors = nodes
            .iter()
            .map(|&n| {
                self.neighbor_indices(n)
                    .into_iter()
                    .filter_map(|m| position.get(&m).copied())
                    .collect()
            })
            .collect();

        let edge_pairs = self
            .graph
            .edge_indices()
            .filter_map(|e| self.graph.edge_endpoints(e))
            .filter_map(|(s, t)| Some((*position.get(&s)?, *position.get(&t)?)))
            .collect();

        Adjacency {
            nodes,
            neighbors,
            edge_pairs,
        }
    }

    /// Returns graph statistics.
    pub fn stats(&self) -> GraphStats {
        GraphStats {
            node_count: self.node_count(),
            edge_count: self.edge_count(),
            co_occurrence_count: self.co_occurrences.len(),
            context_entity_count: self.contexts.len(),
            component_count: self.connected_components().len(),
        }
    }
}

/// Dense undirected view of the graph.
///
/// Positions are indexes into `nodes`. Neighbor lists are deduplicated
/// and sorted; `edge_pairs` keeps one entry per stored edge.
#[derive(Debug)]
pub(crate) struct Adjacency {
    pub nodes: Vec<NodeIndex>,
    pub neighbors: Vec<Vec<usize>>,
    pub edge_pairs: Vec<(usize, usize)>,
}

impl Adjacency {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }
}

/// Graph statistics for the status command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub co_occurrence_count: usize,
    pub context_entity_count: usize,
    pub component_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use semgraph_core::EdgeCategory;

    fn sample() -> KnowledgeGraph {
        let mut graph = KnowledgeGraph::new();
        graph.add_node(Node::new("n1", "SEO", "concept"));
        graph.add_node(Node::new("n2", "Backlinks", "concept"));
        graph.add_node(Node::new("n3", "Anchor Text", "concept"));
        graph
            .add_edge(Edge::new("e1", "n1", "n2", "uses").with_category(EdgeCategory::Root))
            .unwrap();
        graph.add_edge(Edge::new("e2", "n3", "n2", "part_of")).unwrap();
        graph
    }

    #[test]
    fn test_get_node_by_id_then_term() {
        let graph = sample();
        assert_eq!(graph.get_node("n2").unwrap().term, "Backlinks");
        assert_eq!(graph.get_node("anchor text").unwrap().id, "n3");
        assert!(graph.get_node("missing").is_none());
    }

    #[test]
    fn test_get_node_by_term_ignores_ids() {
        let mut graph = sample();
        graph.add_node(Node::new("n4", "n1", "concept"));

        assert_eq!(graph.get_node("n1").unwrap().term, "SEO");
        assert_eq!(graph.get_node_by_term("N1").unwrap().id, "n4");
        assert!(graph.get_node_by_term("n2").is_none());
    }

    #[test]
    fn test_upsert_node_keeps_identity() {
        let mut graph = sample();
        graph.add_node(Node::new("n1", "Search Engine Optimization", "concept"));

        assert_eq!(graph.node_count(), 3);
        assert!(graph.get_node("seo").is_none());
        assert!(graph.are_connected("n1", "n2"));
    }

    #[test]
    fn test_upsert_edge_repoints() {
        let mut graph = sample();
        graph.add_edge(Edge::new("e1", "n1", "n3", "uses")).unwrap();

        assert_eq!(graph.edge_count(), 2);
        assert!(!graph.are_connected("n1", "n2"));
        assert!(graph.are_connected("n3", "n1"));
        assert_eq!(graph.get_edge("e1").unwrap().target, "n3");
    }

    #[test]
    fn test_dangling_edge_rejected() {
        let mut graph = sample();
        let err = graph.add_edge(Edge::new("e9", "n1", "ghost", "x")).unwrap_err();
        assert!(matches!(
            err,
            GraphError::DanglingEdge { ref endpoint, .. } if endpoint == "ghost"
        ));
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_neighbors_are_undirected() {
        let graph = sample();
        let terms: Vec<&str> = graph
            .get_neighbors("Backlinks")
            .iter()
            .map(|n| n.term.as_str())
            .collect();
        assert_eq!(terms, vec!["SEO", "Anchor Text"]);
        assert!(graph.get_neighbors("missing").is_empty());
    }

    #[test]
    fn test_edges_for_node() {
        let graph = sample();
        assert_eq!(graph.get_edges_for_node("n2").len(), 2);
        assert_eq!(graph.get_edges_for_node("SEO").len(), 1);
        assert!(graph.get_edges_for_node("missing").is_empty());
    }

    #[test]
    fn test_edges_by_category() {
        let graph = sample();
        let groups = graph.get_edges_by_category();
        assert_eq!(groups[&CategoryBucket::Root].len(), 1);
        assert_eq!(groups[&CategoryBucket::Uncategorized][0].id, "e2");
        assert!(!groups.contains_key(&CategoryBucket::Rare));
    }

    #[test]
    fn test_clear() {
        let mut graph = sample();
        graph.add_co_occurrence("seo", "backlinks", "p1", Default::default());
        graph.clear();

        assert!(graph.is_empty());
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.stats().co_occurrence_count, 0);
    }

    #[test]
    fn test_stats() {
        let mut graph = sample();
        graph.add_node(Node::new("n4", "Crawl Budget", "concept"));
        let stats = graph.stats();
        assert_eq!(stats.node_count, 4);
        assert_eq!(stats.edge_count, 2);
        assert_eq!(stats.component_count, 2);
    }
}
