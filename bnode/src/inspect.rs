//! Page file inspection.
//!
//! Decodes a file of concatenated pages into per-page summaries. Unlike the
//! tree, the inspector does not trust what it reads: every field goes through
//! the `try_` accessors and structural problems are reported per page.

use std::path::Path;

use crate::node::{Node, NodeError, NodeKind};
use crate::page::{PAGE_SIZE, Page, PageId};

/// What was found in one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSummary {
    pub page_id: PageId,
    pub detail: PageDetail,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageDetail {
    /// All-zero page.
    Unused,
    /// A well-formed node. `records` holds at most the requested number.
    Node {
        kind: NodeKind,
        record_count: u16,
        bytes: usize,
        records: Vec<RecordSummary>,
    },
    /// The page could not be decoded as a node.
    Invalid(NodeError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSummary {
    pub pointer: PageId,
    pub key: Vec<u8>,
    pub value_len: usize,
}

/// Summarize a single page, listing at most `max_records` records.
#[must_use]
pub fn summarize_page(page_id: PageId, page: Page, max_records: usize) -> NodeSummary {
    let detail = if page.as_bytes().iter().all(|b| *b == 0) {
        PageDetail::Unused
    } else {
        describe(&Node::from_page(page), max_records).unwrap_or_else(PageDetail::Invalid)
    };
    NodeSummary { page_id, detail }
}

fn describe(node: &Node, max_records: usize) -> Result<PageDetail, NodeError> {
    let kind = node.kind()?;
    let bytes = node.check_invariants()?;
    let record_count = node.record_count();

    let mut records = Vec::with_capacity(max_records.min(usize::from(record_count)));
    for idx in (0..record_count).take(max_records) {
        let record = node.try_record(idx)?;
        records.push(RecordSummary {
            pointer: record.pointer,
            key: record.key.to_vec(),
            value_len: record.value.len(),
        });
    }

    Ok(PageDetail::Node {
        kind,
        record_count,
        bytes,
        records,
    })
}

/// Read a page file and summarize every page in it.
pub fn summarize_file(path: &Path, max_records: usize) -> Result<Vec<NodeSummary>, InspectError> {
    let data = std::fs::read(path).map_err(InspectError::Io)?;
    if data.len() % PAGE_SIZE != 0 {
        return Err(InspectError::PartialPage { len: data.len() });
    }
    tracing::debug!(
        path = %path.display(),
        pages = data.len() / PAGE_SIZE,
        "read page file"
    );

    data.chunks_exact(PAGE_SIZE)
        .zip(0..)
        .map(|(chunk, page_id)| -> Result<NodeSummary, InspectError> {
            let page = Page::from_slice(chunk).map_err(|e| InspectError::Node(e.into()))?;
            Ok(summarize_page(page_id, page, max_records))
        })
        .collect()
}

impl std::fmt::Display for NodeSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "page {}: ", self.page_id)?;
        match &self.detail {
            PageDetail::Unused => write!(f, "unused"),
            PageDetail::Invalid(e) => write!(f, "invalid ({e})"),
            PageDetail::Node {
                kind,
                record_count,
                bytes,
                records,
            } => {
                write!(f, "{kind}, {record_count} records, {bytes} bytes")?;
                for (idx, record) in records.iter().enumerate() {
                    write!(
                        f,
                        "\n  [{idx}] key=\"{}\" value_len={}",
                        record.key.escape_ascii(),
                        record.value_len
                    )?;
                    if *kind == NodeKind::Internal {
                        write!(f, " child={}", record.pointer)?;
                    }
                }
                if records.len() < usize::from(*record_count) {
                    write!(f, "\n  ... {} more", usize::from(*record_count) - records.len())?;
                }
                Ok(())
            }
        }
    }
}

/// Errors that can occur while inspecting a page file.
#[derive(Debug)]
pub enum InspectError {
    /// I/O error.
    Io(std::io::Error),
    /// File length is not a whole number of pages.
    PartialPage { len: usize },
    /// Node error.
    Node(NodeError),
}

impl std::fmt::Display for InspectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::PartialPage { len } => write!(
                f,
                "file is {len} bytes, not a multiple of the page size {PAGE_SIZE}"
            ),
            Self::Node(e) => write!(f, "node error: {e}"),
        }
    }
}

impl std::error::Error for InspectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Node(e) => Some(e),
            Self::PartialPage { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::node::NodeBuilder;

    fn leaf_page() -> Page {
        let mut builder = NodeBuilder::new(NodeKind::Leaf);
        builder.push(0, b"cat", b"meow").expect("should push");
        builder.push(0, b"dog", b"woof").expect("should push");
        builder.build().expect("should build").into_page()
    }

    fn internal_page() -> Page {
        let mut builder = NodeBuilder::new(NodeKind::Internal);
        builder.push(2, b"", b"").expect("should push");
        builder.push(3, b"m", b"").expect("should push");
        builder.build().expect("should build").into_page()
    }

    #[test]
    fn test_summarize_page() {
        let summary = summarize_page(1, leaf_page(), 1);

        assert_eq!(
            summary.detail,
            PageDetail::Node {
                kind: NodeKind::Leaf,
                record_count: 2,
                bytes: 46,
                records: vec![RecordSummary {
                    pointer: 0,
                    key: b"cat".to_vec(),
                    value_len: 4,
                }],
            }
        );
        assert_eq!(
            summary.to_string(),
            "page 1: leaf, 2 records, 46 bytes\n  [0] key=\"cat\" value_len=4\n  ... 1 more"
        );
    }

    #[test]
    fn test_summarize_internal_page() {
        let summary = summarize_page(4, internal_page(), 16);
        assert_eq!(
            summary.to_string(),
            "page 4: internal, 2 records, 33 bytes\n  [0] key=\"\" value_len=0 child=2\n  [1] key=\"m\" value_len=0 child=3"
        );
    }

    #[test]
    fn test_summarize_bad_pages() {
        assert_eq!(summarize_page(0, Page::new(), 4).detail, PageDetail::Unused);

        let mut page = Page::new();
        page.write_u16(0, 9).expect("should write");
        assert_eq!(
            summarize_page(0, page, 4).detail,
            PageDetail::Invalid(NodeError::UnknownKind(9))
        );

        let mut page = leaf_page();
        page.write_u16(22, 3).expect("should write");
        assert_eq!(
            summarize_page(0, page, 4).detail,
            PageDetail::Invalid(NodeError::UnorderedOffsets { index: 2 })
        );
    }

    #[test]
    fn test_summarize_file() {
        let mut file = tempfile::NamedTempFile::new().expect("should create temp file");
        file.write_all(Page::new().as_bytes()).expect("should write");
        file.write_all(leaf_page().as_bytes()).expect("should write");
        file.write_all(internal_page().as_bytes()).expect("should write");
        file.flush().expect("should flush");

        let summaries = summarize_file(file.path(), 8).expect("should summarize");
        assert_eq!(summaries.len(), 3);
        assert_eq!(summaries[0].detail, PageDetail::Unused);
        assert_eq!(summaries[1].page_id, 1);
        assert!(matches!(
            summaries[1].detail,
            PageDetail::Node {
                kind: NodeKind::Leaf,
                record_count: 2,
                ..
            }
        ));
        assert!(matches!(
            summaries[2].detail,
            PageDetail::Node {
                kind: NodeKind::Internal,
                ..
            }
        ));
    }

    #[test]
    fn test_summarize_partial_file() {
        let mut file = tempfile::NamedTempFile::new().expect("should create temp file");
        file.write_all(&[1u8; 100]).expect("should write");
        file.flush().expect("should flush");

        let err = summarize_file(file.path(), 8).expect_err("should reject");
        assert!(matches!(err, InspectError::PartialPage { len: 100 }));
    }

    #[test]
    fn test_summarize_missing_file() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let err = summarize_file(&dir.path().join("absent.db"), 8).expect_err("should fail");
        assert!(matches!(err, InspectError::Io(_)));
    }
}
