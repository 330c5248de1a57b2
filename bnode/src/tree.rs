//! Read-side B+tree handle.
//!
//! [`BTree`] owns the root page id and the [`PageStore`] it was given. It can
//! create an empty tree and navigate an existing one; building new nodes on
//! insert or delete is left to the layer above.
//!
//! Internal nodes hold one record per child: the record's key is the smallest
//! key reachable through that child and its pointer is the child's page id.

use crate::node::{Node, NodeError, NodeKind};
use crate::page::PageId;
use crate::store::{PageStore, StoreError};

/// Deepest descent `get` will follow before assuming the pages form a cycle.
pub const MAX_DEPTH: usize = 64;

/// A B+tree over an injected page store.
#[derive(Debug)]
pub struct BTree<S> {
    store: S,
    root_page: PageId,
}

impl<S: PageStore> BTree<S> {
    /// Create a new tree whose root is an empty leaf.
    pub fn create(mut store: S) -> Result<Self, BTreeError> {
        let root_page = store.allocate(Node::empty(NodeKind::Leaf))?;
        tracing::debug!(root_page, "created empty tree");
        Ok(Self { store, root_page })
    }

    /// Open an existing tree rooted at `root_page`.
    pub const fn open(store: S, root_page: PageId) -> Self {
        Self { store, root_page }
    }

    /// Get the root page ID.
    #[must_use]
    pub const fn root_page(&self) -> PageId {
        self.root_page
    }

    /// Point the tree at a new root, e.g. after a copy-on-write update.
    pub fn set_root_page(&mut self, root_page: PageId) {
        tracing::debug!(old = self.root_page, new = root_page, "root page changed");
        self.root_page = root_page;
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    #[allow(clippy::missing_const_for_fn)] // mutable references can't be const
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    #[must_use]
    pub fn into_store(self) -> S {
        self.store
    }

    pub fn fetch_root(&self) -> Result<Node, BTreeError> {
        Ok(self.store.fetch(self.root_page)?)
    }

    /// Find the leaf that would hold `key`, or `None` if `key` sorts before
    /// everything in the tree.
    pub fn find_leaf(&self, key: &[u8]) -> Result<Option<Node>, BTreeError> {
        let mut node = self.fetch_root()?;
        for _ in 0..MAX_DEPTH {
            match node.kind()? {
                NodeKind::Leaf => return Ok(Some(node)),
                NodeKind::Internal => {
                    let Some(idx) = node.lookup_le(key)? else {
                        return Ok(None);
                    };
                    let child = node.try_pointer(idx)?;
                    node = self.store.fetch(child)?;
                }
            }
        }
        Err(BTreeError::TooDeep)
    }

    /// Look up a value by key.
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, BTreeError> {
        let Some(leaf) = self.find_leaf(key)? else {
            return Ok(None);
        };
        let Some(idx) = leaf.lookup_le(key)? else {
            return Ok(None);
        };
        if leaf.try_key(idx)? != key {
            return Ok(None);
        }
        Ok(Some(leaf.try_value(idx)?.to_vec()))
    }
}

/// Errors that can occur during B-tree operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BTreeError {
    /// Page store error.
    Store(StoreError),
    /// Node error.
    Node(NodeError),
    /// Descent went deeper than `MAX_DEPTH`.
    TooDeep,
}

impl std::fmt::Display for BTreeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(e) => write!(f, "store error: {e}"),
            Self::Node(e) => write!(f, "node error: {e}"),
            Self::TooDeep => write!(f, "tree deeper than {MAX_DEPTH} levels"),
        }
    }
}

impl std::error::Error for BTreeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Store(e) => Some(e),
            Self::Node(e) => Some(e),
            Self::TooDeep => None,
        }
    }
}

impl From<StoreError> for BTreeError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

impl From<NodeError> for BTreeError {
    fn from(e: NodeError) -> Self {
        Self::Node(e)
    }
}
