//! Page buffer and constants.
//!
//! A page is the fixed-size unit every node is encoded into. All reads and
//! writes are bounds-checked against the page; nothing here does raw pointer
//! arithmetic.

/// Page size in bytes (4KB).
pub const PAGE_SIZE: usize = 4096;

/// A logical page identifier. Page 0 is never handed out and doubles as the
/// null pointer.
pub type PageId = u64;

/// A raw page buffer.
#[derive(Clone, PartialEq, Eq)]
pub struct Page {
    data: Box<[u8; PAGE_SIZE]>,
}

impl Page {
    /// Create a new zeroed page.
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: Box::new([0u8; PAGE_SIZE]),
        }
    }

    /// Create a page from a byte slice that must be exactly one page long.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, PageError> {
        let data: [u8; PAGE_SIZE] = bytes.try_into().map_err(|_| PageError::WrongLength {
            actual: bytes.len(),
        })?;
        Ok(Self {
            data: Box::new(data),
        })
    }

    /// Get the raw page data.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; PAGE_SIZE] {
        &self.data
    }

    /// Get mutable access to the raw page data.
    pub fn as_bytes_mut(&mut self) -> &mut [u8; PAGE_SIZE] {
        &mut self.data
    }

    /// Read `len` bytes at `offset`.
    pub fn read_bytes(&self, offset: usize, len: usize) -> Result<&[u8], PageError> {
        let end = checked_end(offset, len)?;
        Ok(&self.data[offset..end])
    }

    /// Write bytes at `offset`.
    pub fn write_bytes(&mut self, offset: usize, bytes: &[u8]) -> Result<(), PageError> {
        let end = checked_end(offset, bytes.len())?;
        self.data[offset..end].copy_from_slice(bytes);
        Ok(())
    }

    /// Read a u16 (little-endian) at the given offset.
    pub fn read_u16(&self, offset: usize) -> Result<u16, PageError> {
        let mut buf = [0u8; 2];
        buf.copy_from_slice(self.read_bytes(offset, 2)?);
        Ok(u16::from_le_bytes(buf))
    }

    /// Write a u16 (little-endian) at the given offset.
    pub fn write_u16(&mut self, offset: usize, value: u16) -> Result<(), PageError> {
        self.write_bytes(offset, &value.to_le_bytes())
    }

    /// Read a u64 (little-endian) at the given offset.
    pub fn read_u64(&self, offset: usize) -> Result<u64, PageError> {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(self.read_bytes(offset, 8)?);
        Ok(u64::from_le_bytes(buf))
    }

    /// Write a u64 (little-endian) at the given offset.
    pub fn write_u64(&mut self, offset: usize, value: u64) -> Result<(), PageError> {
        self.write_bytes(offset, &value.to_le_bytes())
    }
}

/// End of the range `offset..offset + len`, if it lies inside a page.
const fn checked_end(offset: usize, len: usize) -> Result<usize, PageError> {
    match offset.checked_add(len) {
        Some(end) if end <= PAGE_SIZE => Ok(end),
        _ => Err(PageError::OutOfBounds { offset, len }),
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page")
            .field("first_16_bytes", &&self.data[..16])
            .finish_non_exhaustive()
    }
}

/// Errors related to page operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageError {
    /// A read or write would run past the end of the page.
    OutOfBounds { offset: usize, len: usize },
    /// Source bytes are not exactly one page long.
    WrongLength { actual: usize },
}

impl std::fmt::Display for PageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutOfBounds { offset, len } => write!(
                f,
                "range {offset}..{} exceeds page size {PAGE_SIZE}",
                offset.saturating_add(*len)
            ),
            Self::WrongLength { actual } => {
                write!(f, "expected {PAGE_SIZE} bytes for a page, got {actual}")
            }
        }
    }
}

impl std::error::Error for PageError {}
