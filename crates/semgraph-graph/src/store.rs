//! On-disk storage for hosts that keep graphs between sessions.
//!
//! Each graph is stored as its JSON export under an external map ID, with
//! an optional drift baseline alongside it.

use crate::drift::GraphSnapshot;
use crate::export::GraphExport;
use crate::graph::KnowledgeGraph;
use sled::{Db, Tree};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sled(#[from] sled::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub struct GraphStore {
    db: Db,
    graphs: Tree,
    snapshots: Tree,
}

impl GraphStore {
    /// Opens or creates a graph store at the specified path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db = sled::open(path)?;
        let graphs = db.open_tree("graphs")?;
        let snapshots = db.open_tree("snapshots")?;
        Ok(Self {
            db,
            graphs,
            snapshots,
        })
    }

    /// Saves a graph under `map_id`, replacing any previous version.
    pub fn save_graph(&self, map_id: &str, graph: &KnowledgeGraph) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(&graph.to_export())?;
        self.graphs.insert(map_id, bytes)?;
        self.db.flush()?;
        Ok(())
    }

    /// Loads the graph stored under `map_id`.
    pub fn load_graph(&self, map_id: &str) -> Result<Option<KnowledgeGraph>, StoreError> {
        match self.graphs.get(map_id)? {
            Some(bytes) => {
                let export: GraphExport = serde_json::from_slice(&bytes)?;
                Ok(Some(KnowledgeGraph::from_export(&export)))
            }
            None => Ok(None),
        }
    }

    /// Saves the drift baseline for `map_id`.
    pub fn save_snapshot(&self, map_id: &str, snapshot: &GraphSnapshot) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(snapshot)?;
        self.snapshots.insert(map_id, bytes)?;
        self.db.flush()?;
        Ok(())
    }

    /// Loads the drift baseline for `map_id`.
    pub fn load_snapshot(&self, map_id: &str) -> Result<Option<GraphSnapshot>, StoreError> {
        match self.snapshots.get(map_id)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Removes the graph and baseline stored under `map_id`.
    pub fn remove(&self, map_id: &str) -> Result<(), StoreError> {
        self.graphs.remove(map_id)?;
        self.snapshots.remove(map_id)?;
        self.db.flush()?;
        Ok(())
    }

    /// Lists the map IDs that have a stored graph.
    pub fn map_ids(&self) -> Result<Vec<String>, StoreError> {
        self.graphs
            .iter()
            .keys()
            .map(|key| -> Result<String, StoreError> {
                Ok(String::from_utf8_lossy(&key?).into_owned())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use semgraph_core::{Edge, Node, Proximity};
    use tempfile::tempdir;

    #[test]
    fn test_save_load_graph() {
        let dir = tempdir().unwrap();
        let store = GraphStore::open(dir.path()).unwrap();

        let mut graph = KnowledgeGraph::new();
        graph.add_node(Node::new("a", "Alpha", "concept"));
        graph.add_node(Node::new("b", "Beta", "concept"));
        graph.add_edge(Edge::new("e1", "a", "b", "related_to")).unwrap();
        graph.add_co_occurrence("alpha", "beta", "/p", Proximity::SameSentence);

        store.save_graph("map-1", &graph).unwrap();

        let loaded = store.load_graph("map-1").unwrap().unwrap();
        assert_eq!(loaded.node_count(), 2);
        assert_eq!(loaded.edge_count(), 1);
        assert_eq!(loaded.get_co_occurrence("alpha", "beta").unwrap().count, 1);
        assert!(store.load_graph("map-2").unwrap().is_none());
        assert_eq!(store.map_ids().unwrap(), vec!["map-1"]);
    }

    #[test]
    fn test_snapshot_and_remove() {
        let dir = tempdir().unwrap();
        let store = GraphStore::open(dir.path()).unwrap();

        let graph = KnowledgeGraph::new();
        store.save_graph("m", &graph).unwrap();
        let snapshot = graph.create_snapshot();
        store.save_snapshot("m", &snapshot).unwrap();
        assert_eq!(store.load_snapshot("m").unwrap(), Some(snapshot));

        store.remove("m").unwrap();
        assert!(store.load_graph("m").unwrap().is_none());
        assert!(store.load_snapshot("m").unwrap().is_none());
    }
}
