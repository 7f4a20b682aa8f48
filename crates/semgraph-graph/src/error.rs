use thiserror::Error;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Edge {edge_id} references unknown node {endpoint}")]
    DanglingEdge { edge_id: String, endpoint: String },
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
