//! Node construction.
//!
//! [`NodeBuilder`] is the only place key and value length limits are enforced.
//! It collects borrowed records, then lays them out header first, pointers and
//! offsets next, and the KV region last.

use crate::node::codec::{Node, NodeError};
use crate::node::layout::{
    MAX_KEY_LEN, MAX_VALUE_LEN, NodeKind, OFFSET_SIZE, POINTER_SIZE, kv_region_start, record_size,
};
use crate::page::{PAGE_SIZE, Page, PageId};

/// Collects records for a new node.
#[derive(Debug, Clone)]
pub struct NodeBuilder<'a> {
    kind: NodeKind,
    records: Vec<(PageId, &'a [u8], &'a [u8])>,
    /// Encoded size of all records pushed so far, excluding the header.
    body_size: usize,
}

impl<'a> NodeBuilder<'a> {
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Vec::new() is not const-stable
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            records: Vec::new(),
            body_size: 0,
        }
    }

    /// Append a record. `pointer` is ignored by readers of leaf nodes; pass 0.
    pub fn push(
        &mut self,
        pointer: PageId,
        key: &'a [u8],
        value: &'a [u8],
    ) -> Result<(), NodeError> {
        if key.len() > MAX_KEY_LEN {
            return Err(NodeError::KeyTooLarge(key.len()));
        }
        if value.len() > MAX_VALUE_LEN {
            return Err(NodeError::ValueTooLarge(value.len()));
        }
        if self.records.len() >= usize::from(u16::MAX) {
            return Err(NodeError::TooManyRecords);
        }
        self.body_size += POINTER_SIZE + OFFSET_SIZE + record_size(key.len(), value.len());
        self.records.push((pointer, key, value));
        Ok(())
    }

    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Vec::len() is not const-stable
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Vec::is_empty() is not const-stable
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Size the built node will occupy.
    #[must_use]
    pub const fn encoded_size(&self) -> usize {
        kv_region_start(0) + self.body_size
    }

    /// Whether the built node will fit in a page.
    #[must_use]
    pub const fn fits(&self) -> bool {
        self.encoded_size() <= PAGE_SIZE
    }

    /// Encode the collected records into a fresh page.
    ///
    /// Fails with [`NodeError::Overflow`] when the records do not fit; the
    /// caller has to split them across nodes.
    pub fn build(&self) -> Result<Node, NodeError> {
        let size = self.encoded_size();
        if size > PAGE_SIZE {
            return Err(NodeError::Overflow { size });
        }
        let count = u16::try_from(self.records.len()).map_err(|_| NodeError::TooManyRecords)?;

        let mut node = Node::from_page(Page::new());
        node.set_header(self.kind, count);
        for (idx, (pointer, key, value)) in (0..count).zip(&self.records) {
            node.try_set_pointer(idx, *pointer)?;
            node.write_record(idx, key, value)?;
        }

        let written = node.check_fits()?;
        debug_assert_eq!(written, size);
        Ok(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_internal() {
        let mut builder = NodeBuilder::new(NodeKind::Internal);
        builder.push(7, b"", b"").expect("should push");
        builder.push(8, b"m", b"").expect("should push");
        assert_eq!(builder.len(), 2);
        assert_eq!(builder.encoded_size(), 4 + 20 + 4 + 5);

        let node = builder.build().expect("should build");
        assert_eq!(node.kind(), Ok(NodeKind::Internal));
        assert_eq!(node.pointer(0), 7);
        assert_eq!(node.pointer(1), 8);
        assert_eq!(node.key(0), b"");
        assert_eq!(node.key(1), b"m");
        assert_eq!(node.value(1), b"");
        assert_eq!(node.node_bytes(), builder.encoded_size());
    }

    #[test]
    fn test_build_empty() {
        let builder = NodeBuilder::new(NodeKind::Leaf);
        assert!(builder.is_empty());

        let node = builder.build().expect("should build");
        assert_eq!(node, Node::empty(NodeKind::Leaf));
        assert_eq!(node.node_bytes(), 4);
    }

    #[test]
    fn test_length_limits() {
        let key = vec![0u8; MAX_KEY_LEN + 1];
        let value = vec![0u8; MAX_VALUE_LEN + 1];
        let mut builder = NodeBuilder::new(NodeKind::Leaf);

        assert_eq!(
            builder.push(0, &key, b""),
            Err(NodeError::KeyTooLarge(MAX_KEY_LEN + 1))
        );
        assert_eq!(
            builder.push(0, b"k", &value),
            Err(NodeError::ValueTooLarge(MAX_VALUE_LEN + 1))
        );
        assert!(builder.is_empty());

        builder
            .push(0, &key[..MAX_KEY_LEN], &value[..MAX_VALUE_LEN])
            .expect("maximal record should be accepted");
        assert!(builder.fits());
    }

    #[test]
    fn test_overflow_is_reported_not_truncated() {
        let value = vec![b'v'; MAX_VALUE_LEN];
        let mut builder = NodeBuilder::new(NodeKind::Leaf);
        builder.push(0, b"a", &value).expect("should push");
        builder.push(0, b"b", &value).expect("should push");

        assert!(!builder.fits());
        let size = builder.encoded_size();
        assert_eq!(size, 4 + 2 * (10 + 4 + 1 + MAX_VALUE_LEN));
        assert_eq!(builder.build(), Err(NodeError::Overflow { size }));
    }

    #[test]
    fn test_exactly_full_page() {
        // 4018 bytes for the maximal record, 78 for the second one.
        let big_key = vec![b'k'; MAX_KEY_LEN];
        let big_value = vec![b'v'; MAX_VALUE_LEN];
        let small = [b's'; 32];
        let mut builder = NodeBuilder::new(NodeKind::Leaf);
        builder.push(0, &big_key, &big_value).expect("should push");
        builder.push(0, &small, &small).expect("should push");
        assert_eq!(builder.encoded_size(), PAGE_SIZE);

        let node = builder.build().expect("should build");
        assert_eq!(node.node_bytes(), PAGE_SIZE);
        assert_eq!(node.value(0), big_value.as_slice());
        assert_eq!(node.value(1), small.as_slice());
    }
}
