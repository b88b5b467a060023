use crate::ir::NodeId;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    #[error("node '{0}' is declared more than once")]
    DuplicateNode(NodeId),
    #[error("node '{parent}' lists child '{child}', which is not part of the graph")]
    DanglingChild { parent: NodeId, child: NodeId },
    #[error("invalid layout configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, LayoutError>;
