//! Node layout constants and the sizing check that ties them together.
//!
//! ```text
//! | kind | count |  pointers   |   offsets   | key-values
//! |  2B  |  2B   | count * 8B  | count * 2B  | ...
//!
//! | key_len | value_len | key | value |
//! |   2B    |    2B     | ... |  ...  |
//! ```

use crate::node::codec::NodeError;
use crate::page::PAGE_SIZE;

/// Size of the node header: kind (2 bytes) + record count (2 bytes).
pub const HEADER_SIZE: usize = 4;

/// Size of one pointer slot.
pub const POINTER_SIZE: usize = 8;

/// Size of one stored offset.
pub const OFFSET_SIZE: usize = 2;

/// Size of the key length + value length prefix of a record.
pub const KV_HEADER_SIZE: usize = 4;

/// Largest key the construction path accepts.
pub const MAX_KEY_LEN: usize = 1000;

/// Largest value the construction path accepts.
pub const MAX_VALUE_LEN: usize = 3000;

/// Node kind tag stored in the first two bytes of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum NodeKind {
    /// Stores key-value pairs; pointer slots are unused.
    Leaf = 1,
    /// Stores keys with child page pointers.
    Internal = 2,
}

impl TryFrom<u16> for NodeKind {
    type Error = u16;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Leaf),
            2 => Ok(Self::Internal),
            _ => Err(value),
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Leaf => write!(f, "leaf"),
            Self::Internal => write!(f, "internal"),
        }
    }
}

/// Byte position of pointer slot `idx`.
#[must_use]
pub const fn pointer_pos(idx: usize) -> usize {
    HEADER_SIZE + POINTER_SIZE * idx
}

/// Byte position of stored offset `idx` (1-based; offset 0 is never stored).
#[must_use]
pub const fn offset_pos(count: usize, idx: usize) -> usize {
    HEADER_SIZE + POINTER_SIZE * count + OFFSET_SIZE * (idx - 1)
}

/// Byte position where the KV region starts for a node with `count` records.
#[must_use]
pub const fn kv_region_start(count: usize) -> usize {
    HEADER_SIZE + (POINTER_SIZE + OFFSET_SIZE) * count
}

/// Encoded size of one record including its length prefix.
#[must_use]
pub const fn record_size(key_len: usize, value_len: usize) -> usize {
    KV_HEADER_SIZE + key_len + value_len
}

/// Sizing constants checked by [`verify_layout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutLimits {
    pub page_size: usize,
    pub max_key_len: usize,
    pub max_value_len: usize,
}

impl LayoutLimits {
    /// The limits this crate encodes nodes with.
    pub const DEFAULT: Self = Self {
        page_size: PAGE_SIZE,
        max_key_len: MAX_KEY_LEN,
        max_value_len: MAX_VALUE_LEN,
    };

    /// Size of a node holding a single record of maximal key and value.
    #[must_use]
    pub const fn worst_case_node_size(&self) -> usize {
        kv_region_start(1) + record_size(self.max_key_len, self.max_value_len)
    }

    /// Check that a single maximal record always fits in one page, so that
    /// splitting can always make progress.
    pub const fn verify(&self) -> Result<(), NodeError> {
        let required = self.worst_case_node_size();
        if required > self.page_size {
            return Err(NodeError::InvariantViolation {
                required,
                page_size: self.page_size,
            });
        }
        Ok(())
    }
}

/// Startup check of the crate's sizing constants.
///
/// Call once during initialization; an error here means the constants are
/// inconsistent and no node of maximal size could ever be stored.
pub const fn verify_layout() -> Result<(), NodeError> {
    LayoutLimits::DEFAULT.verify()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_layout() {
        assert!(verify_layout().is_ok());
        assert_eq!(LayoutLimits::DEFAULT.worst_case_node_size(), 4018);
    }

    #[test]
    fn test_verify_layout_rejects_oversized_limits() {
        let limits = LayoutLimits {
            max_value_len: 4000,
            ..LayoutLimits::DEFAULT
        };
        assert_eq!(
            limits.verify(),
            Err(NodeError::InvariantViolation {
                required: 5018,
                page_size: PAGE_SIZE
            })
        );
    }

    #[test]
    fn test_node_kind_conversion() {
        assert_eq!(NodeKind::try_from(1), Ok(NodeKind::Leaf));
        assert_eq!(NodeKind::try_from(2), Ok(NodeKind::Internal));
        assert_eq!(NodeKind::try_from(0), Err(0));
        assert_eq!(NodeKind::try_from(7), Err(7));
    }

    #[test]
    fn test_positions() {
        assert_eq!(pointer_pos(0), 4);
        assert_eq!(pointer_pos(3), 28);
        assert_eq!(offset_pos(2, 1), 20);
        assert_eq!(offset_pos(2, 2), 22);
        assert_eq!(kv_region_start(0), 4);
        assert_eq!(kv_region_start(2), 24);
    }
}
