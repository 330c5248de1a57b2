//! Page store abstraction.
//!
//! The node codec never resolves page ids itself. Whatever owns the codec is
//! handed a [`PageStore`] at construction time, so production code can use a
//! real file or mmap layer and tests can use [`MemoryPageStore`].

mod memory;

pub use memory::MemoryPageStore;

use crate::node::{Node, NodeError};
use crate::page::PageId;

/// Resolves, persists and frees pages holding nodes.
pub trait PageStore {
    /// Read the node stored under `page_id`.
    fn fetch(&self, page_id: PageId) -> Result<Node, StoreError>;

    /// Persist a newly built node and return its id. Nodes that do not fit in
    /// a page are rejected.
    fn allocate(&mut self, node: Node) -> Result<PageId, StoreError>;

    /// Mark `page_id` free for reuse.
    fn release(&mut self, page_id: PageId) -> Result<(), StoreError>;
}

/// Errors that can occur during page store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Page 0 is the null pointer and never holds a node.
    NullPage,
    /// No node is stored under this id.
    PageNotFound(PageId),
    /// The page was already free.
    DoubleRelease(PageId),
    /// The node itself is not persistable.
    Node(NodeError),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NullPage => write!(f, "page 0 is the null page"),
            Self::PageNotFound(page_id) => write!(f, "page {page_id} not found"),
            Self::DoubleRelease(page_id) => write!(f, "page {page_id} is already free"),
            Self::Node(e) => write!(f, "node error: {e}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Node(e) => Some(e),
            _ => None,
        }
    }
}

impl From<NodeError> for StoreError {
    fn from(e: NodeError) -> Self {
        Self::Node(e)
    }
}
