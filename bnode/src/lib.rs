// Node encoding for a copy-on-write B+tree key-value store.
//
// Layers, bottom up:
//  - page: owned, bounds-checked 4KB buffer
//  - node: header / pointer / offset / KV codec plus the builder
//  - store: fetch / allocate / release collaborator, in-memory implementation
//  - tree: root handle over an injected store, read-only navigation
//  - inspect + config: support for the `bnode-inspect` binary

pub mod config;
pub mod inspect;
pub mod node;
pub mod page;
pub mod store;
pub mod tree;

pub use node::{Node, NodeBuilder, NodeError, NodeKind, verify_layout};
pub use page::{PAGE_SIZE, Page, PageError, PageId};
pub use store::{MemoryPageStore, PageStore, StoreError};
pub use tree::{BTree, BTreeError};
