use crate::node::NodeId;

#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    #[error("cycle detected in parent chain reachable from node {id}")]
    CycleDetected { id: NodeId },
}

pub type Result<T> = std::result::Result<T, TreeError>;
