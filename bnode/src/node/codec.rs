//! Node accessors over a page buffer.
//!
//! A [`Node`] owns exactly one [`Page`] and decodes fields in place. The header's
//! record count sizes everything else, so every position below is derived from
//! it on each call. Decoding trusts that the page was produced by a builder:
//! only index bounds (and the page's own bounds) are checked, never content.
//!
//! Accessors come in two flavors. The plain ones (`pointer`, `key`, ...) treat
//! an out-of-range index as a bug in the caller and panic. The `try_` ones
//! return [`NodeError::IndexOutOfRange`] instead.

use crate::node::layout::{
    HEADER_SIZE, KV_HEADER_SIZE, NodeKind, kv_region_start, offset_pos, pointer_pos, record_size,
};
use crate::page::{PAGE_SIZE, Page, PageError, PageId};

/// Decoded view of one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    page: Page,
}

/// One record as stored in a node. Borrows from the node's page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record<'a> {
    pub pointer: PageId,
    pub key: &'a [u8],
    pub value: &'a [u8],
}

impl Node {
    /// Create a node with no records.
    #[must_use]
    pub fn empty(kind: NodeKind) -> Self {
        let mut node = Self::from_page(Page::new());
        node.set_header(kind, 0);
        node
    }

    /// Wrap an existing page. Nothing is validated.
    #[must_use]
    pub const fn from_page(page: Page) -> Self {
        Self { page }
    }

    /// Give back the underlying page.
    #[must_use]
    pub fn into_page(self) -> Page {
        self.page
    }

    /// Borrow the underlying page.
    #[must_use]
    pub const fn as_page(&self) -> &Page {
        &self.page
    }

    // header

    /// Raw kind tag. Unknown tags are returned as-is.
    #[must_use]
    pub fn kind_tag(&self) -> u16 {
        let bytes = self.page.as_bytes();
        u16::from_le_bytes([bytes[0], bytes[1]])
    }

    /// Kind tag converted to a [`NodeKind`].
    pub fn kind(&self) -> Result<NodeKind, NodeError> {
        NodeKind::try_from(self.kind_tag()).map_err(NodeError::UnknownKind)
    }

    #[must_use]
    pub fn record_count(&self) -> u16 {
        let bytes = self.page.as_bytes();
        u16::from_le_bytes([bytes[2], bytes[3]])
    }

    /// Overwrite kind and record count. Must come before any other write,
    /// since every other position is derived from `count`.
    pub fn set_header(&mut self, kind: NodeKind, count: u16) {
        let bytes = self.page.as_bytes_mut();
        bytes[0..2].copy_from_slice(&(kind as u16).to_le_bytes());
        bytes[2..HEADER_SIZE].copy_from_slice(&count.to_le_bytes());
    }

    // pointers

    #[must_use]
    pub fn pointer(&self, idx: u16) -> PageId {
        self.try_pointer(idx).unwrap_or_else(|e| misuse(&e))
    }

    pub fn try_pointer(&self, idx: u16) -> Result<PageId, NodeError> {
        self.check_record_index(idx)?;
        Ok(self.page.read_u64(pointer_pos(usize::from(idx)))?)
    }

    pub fn set_pointer(&mut self, idx: u16, page_id: PageId) {
        self.try_set_pointer(idx, page_id).unwrap_or_else(|e| misuse(&e));
    }

    pub fn try_set_pointer(&mut self, idx: u16, page_id: PageId) -> Result<(), NodeError> {
        self.check_record_index(idx)?;
        Ok(self.page.write_u64(pointer_pos(usize::from(idx)), page_id)?)
    }

    // offsets

    /// Cumulative end of record `idx - 1` within the KV region. Valid for
    /// `0..=record_count()`; `offset(0)` is always 0.
    #[must_use]
    pub fn offset(&self, idx: u16) -> u16 {
        self.try_offset(idx).unwrap_or_else(|e| misuse(&e))
    }

    pub fn try_offset(&self, idx: u16) -> Result<u16, NodeError> {
        if idx == 0 {
            return Ok(0);
        }
        let count = self.check_offset_index(idx)?;
        Ok(self.page.read_u16(offset_pos(count, usize::from(idx)))?)
    }

    pub fn set_offset(&mut self, idx: u16, value: u16) {
        self.try_set_offset(idx, value).unwrap_or_else(|e| misuse(&e));
    }

    pub fn try_set_offset(&mut self, idx: u16, value: u16) -> Result<(), NodeError> {
        if idx == 0 {
            return Err(NodeError::ImplicitOffset);
        }
        let count = self.check_offset_index(idx)?;
        Ok(self.page.write_u16(offset_pos(count, usize::from(idx)), value)?)
    }

    /// Byte position where record `idx` starts. `record_start(record_count())`
    /// is the end of the node.
    #[must_use]
    pub fn record_start(&self, idx: u16) -> usize {
        self.try_record_start(idx).unwrap_or_else(|e| misuse(&e))
    }

    pub fn try_record_start(&self, idx: u16) -> Result<usize, NodeError> {
        let offset = self.try_offset(idx)?;
        Ok(kv_region_start(usize::from(self.record_count())) + usize::from(offset))
    }

    // key-values

    #[must_use]
    pub fn key_len(&self, idx: u16) -> u16 {
        self.try_key_len(idx).unwrap_or_else(|e| misuse(&e))
    }

    pub fn try_key_len(&self, idx: u16) -> Result<u16, NodeError> {
        self.check_record_index(idx)?;
        let pos = self.try_record_start(idx)?;
        Ok(self.page.read_u16(pos)?)
    }

    #[must_use]
    pub fn value_len(&self, idx: u16) -> u16 {
        self.try_value_len(idx).unwrap_or_else(|e| misuse(&e))
    }

    pub fn try_value_len(&self, idx: u16) -> Result<u16, NodeError> {
        self.check_record_index(idx)?;
        let pos = self.try_record_start(idx)?;
        Ok(self.page.read_u16(pos + 2)?)
    }

    #[must_use]
    pub fn key(&self, idx: u16) -> &[u8] {
        self.try_key(idx).unwrap_or_else(|e| misuse(&e))
    }

    pub fn try_key(&self, idx: u16) -> Result<&[u8], NodeError> {
        let pos = self.try_record_start(idx)?;
        let key_len = self.try_key_len(idx)?;
        Ok(self.page.read_bytes(pos + KV_HEADER_SIZE, usize::from(key_len))?)
    }

    #[must_use]
    pub fn value(&self, idx: u16) -> &[u8] {
        self.try_value(idx).unwrap_or_else(|e| misuse(&e))
    }

    pub fn try_value(&self, idx: u16) -> Result<&[u8], NodeError> {
        let pos = self.try_record_start(idx)?;
        let key_len = usize::from(self.try_key_len(idx)?);
        let value_len = self.try_value_len(idx)?;
        Ok(self
            .page
            .read_bytes(pos + KV_HEADER_SIZE + key_len, usize::from(value_len))?)
    }

    pub fn try_record(&self, idx: u16) -> Result<Record<'_>, NodeError> {
        Ok(Record {
            pointer: self.try_pointer(idx)?,
            key: self.try_key(idx)?,
            value: self.try_value(idx)?,
        })
    }

    /// Iterate over all records in order.
    ///
    /// # Panics
    ///
    /// Assumes a well-formed node, like the other plain accessors. Use
    /// [`Node::try_record`] on pages that have not been checked.
    pub fn records(&self) -> impl Iterator<Item = Record<'_>> + '_ {
        (0..self.record_count()).map(|idx| self.try_record(idx).unwrap_or_else(|e| misuse(&e)))
    }

    /// Write record `idx` at the current end of the KV region and advance
    /// `offset(idx + 1)` past it. Records must be written in index order.
    pub(super) fn write_record(
        &mut self,
        idx: u16,
        key: &[u8],
        value: &[u8],
    ) -> Result<(), NodeError> {
        self.check_record_index(idx)?;
        let key_len = u16::try_from(key.len()).map_err(|_| NodeError::KeyTooLarge(key.len()))?;
        let value_len =
            u16::try_from(value.len()).map_err(|_| NodeError::ValueTooLarge(value.len()))?;

        let pos = self.try_record_start(idx)?;
        let end = usize::from(self.try_offset(idx)?) + record_size(key.len(), value.len());
        let end = u16::try_from(end).map_err(|_| NodeError::Overflow {
            size: pos + record_size(key.len(), value.len()),
        })?;

        self.page.write_u16(pos, key_len)?;
        self.page.write_u16(pos + 2, value_len)?;
        self.page.write_bytes(pos + KV_HEADER_SIZE, key)?;
        self.page.write_bytes(pos + KV_HEADER_SIZE + key.len(), value)?;
        self.try_set_offset(idx + 1, end)
    }

    // size

    /// Total bytes occupied by the node.
    #[must_use]
    pub fn node_bytes(&self) -> usize {
        self.try_node_bytes().unwrap_or_else(|e| misuse(&e))
    }

    pub fn try_node_bytes(&self) -> Result<usize, NodeError> {
        self.try_record_start(self.record_count())
    }

    /// Check that the node fits in a page, returning its size. An overflow
    /// means the node has to be split before it can be persisted.
    pub fn check_fits(&self) -> Result<usize, NodeError> {
        let size = self.try_node_bytes()?;
        if size > PAGE_SIZE {
            return Err(NodeError::Overflow { size });
        }
        Ok(size)
    }

    /// Full structural check: the node fits, offsets never decrease, and every
    /// record's length prefix accounts for exactly the bytes between its offsets.
    pub fn check_invariants(&self) -> Result<usize, NodeError> {
        let size = self.check_fits()?;
        for idx in 0..self.record_count() {
            let start = self.try_offset(idx)?;
            let end = self.try_offset(idx + 1)?;
            if end < start {
                return Err(NodeError::UnorderedOffsets { index: idx + 1 });
            }
            let stored = record_size(
                usize::from(self.try_key_len(idx)?),
                usize::from(self.try_value_len(idx)?),
            );
            if stored != usize::from(end - start) {
                return Err(NodeError::RecordLengthMismatch { index: idx });
            }
        }
        Ok(size)
    }

    /// Index of the last record whose key is `<= key`, or `None` if every key
    /// is greater. Keys must be sorted. A key that cannot be decoded is
    /// returned as an error.
    pub fn lookup_le(&self, key: &[u8]) -> Result<Option<u16>, NodeError> {
        let mut lo = 0u16;
        let mut hi = self.record_count();
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if self.try_key(mid)? <= key {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        Ok(lo.checked_sub(1))
    }

    fn check_record_index(&self, idx: u16) -> Result<(), NodeError> {
        let count = self.record_count();
        if idx >= count {
            return Err(NodeError::IndexOutOfRange {
                index: usize::from(idx),
                len: usize::from(count),
            });
        }
        Ok(())
    }

    /// Offsets are addressable for `0..=count`. Returns the record count.
    fn check_offset_index(&self, idx: u16) -> Result<usize, NodeError> {
        let count = usize::from(self.record_count());
        if usize::from(idx) > count {
            return Err(NodeError::IndexOutOfRange {
                index: usize::from(idx),
                len: count + 1,
            });
        }
        Ok(count)
    }
}

#[cold]
#[track_caller]
fn misuse(err: &NodeError) -> ! {
    panic!("node accessor misuse: {err}")
}

/// Errors that can occur when working with nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeError {
    /// Accessor called with an index outside `0..len`. Always a caller bug.
    IndexOutOfRange { index: usize, len: usize },
    /// Offset 0 is implicit and cannot be written.
    ImplicitOffset,
    /// Kind tag is neither leaf nor internal.
    UnknownKind(u16),
    /// Key longer than `MAX_KEY_LEN`.
    KeyTooLarge(usize),
    /// Value longer than `MAX_VALUE_LEN`.
    ValueTooLarge(usize),
    /// More records than a u16 count can describe.
    TooManyRecords,
    /// Encoded node does not fit in a page and must be split.
    Overflow { size: usize },
    /// Offset `index` is smaller than the one before it.
    UnorderedOffsets { index: u16 },
    /// Record `index` has length prefixes that disagree with its offsets.
    RecordLengthMismatch { index: u16 },
    /// The worst-case single-record node does not fit in a page.
    InvariantViolation { required: usize, page_size: usize },
    /// A field lies outside the page.
    Page(PageError),
}

impl NodeError {
    /// True for errors that can only come from calling an accessor wrongly,
    /// as opposed to errors about the data itself.
    #[must_use]
    pub const fn is_programmer_error(&self) -> bool {
        matches!(self, Self::IndexOutOfRange { .. } | Self::ImplicitOffset)
    }
}

impl std::fmt::Display for NodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IndexOutOfRange { index, len } => {
                write!(f, "index {index} out of range for {len} slots")
            }
            Self::ImplicitOffset => write!(f, "offset 0 is implicit and cannot be written"),
            Self::UnknownKind(tag) => write!(f, "unknown node kind: {tag}"),
            Self::KeyTooLarge(size) => write!(
                f,
                "key too large: {size} bytes (max {})",
                crate::node::layout::MAX_KEY_LEN
            ),
            Self::ValueTooLarge(size) => write!(
                f,
                "value too large: {size} bytes (max {})",
                crate::node::layout::MAX_VALUE_LEN
            ),
            Self::TooManyRecords => write!(f, "too many records for one node"),
            Self::Overflow { size } => {
                write!(f, "node is {size} bytes, exceeds page size {PAGE_SIZE}")
            }
            Self::UnorderedOffsets { index } => {
                write!(f, "offset {index} is smaller than the previous offset")
            }
            Self::RecordLengthMismatch { index } => {
                write!(f, "record {index} length prefixes disagree with its offsets")
            }
            Self::InvariantViolation {
                required,
                page_size,
            } => write!(
                f,
                "worst-case node needs {required} bytes but a page holds {page_size}"
            ),
            Self::Page(e) => write!(f, "page error: {e}"),
        }
    }
}

impl std::error::Error for NodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Page(e) => Some(e),
            _ => None,
        }
    }
}

impl From<PageError> for NodeError {
    fn from(e: PageError) -> Self {
        Self::Page(e)
    }
}
