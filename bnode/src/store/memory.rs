//! In-memory page store.

use std::collections::HashMap;

use crate::node::Node;
use crate::page::{Page, PageId};
use crate::store::{PageStore, StoreError};

/// A [`PageStore`] that keeps every page in a map.
///
/// Ids start at 1. Released ids go on a free list and are handed out again
/// most-recent first.
#[derive(Debug)]
pub struct MemoryPageStore {
    pages: HashMap<PageId, Page>,
    free: Vec<PageId>,
    next_id: PageId,
}

impl MemoryPageStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
            free: Vec::new(),
            next_id: 1,
        }
    }

    /// Number of live pages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Whether a node is stored under `page_id`.
    #[must_use]
    pub fn contains(&self, page_id: PageId) -> bool {
        self.pages.contains_key(&page_id)
    }
}

impl Default for MemoryPageStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PageStore for MemoryPageStore {
    fn fetch(&self, page_id: PageId) -> Result<Node, StoreError> {
        if page_id == 0 {
            return Err(StoreError::NullPage);
        }
        self.pages
            .get(&page_id)
            .map(|page| Node::from_page(page.clone()))
            .ok_or(StoreError::PageNotFound(page_id))
    }

    fn allocate(&mut self, node: Node) -> Result<PageId, StoreError> {
        let size = node.check_fits()?;
        let page_id = self.free.pop().unwrap_or_else(|| {
            let id = self.next_id;
            self.next_id += 1;
            id
        });
        self.pages.insert(page_id, node.into_page());
        tracing::debug!(page_id, size, "allocated page");
        Ok(page_id)
    }

    fn release(&mut self, page_id: PageId) -> Result<(), StoreError> {
        if page_id == 0 {
            return Err(StoreError::NullPage);
        }
        if self.pages.remove(&page_id).is_none() {
            tracing::warn!(page_id, "release of a page that is not allocated");
            return Err(StoreError::DoubleRelease(page_id));
        }
        self.free.push(page_id);
        tracing::debug!(page_id, "released page");
        Ok(())
    }
}
