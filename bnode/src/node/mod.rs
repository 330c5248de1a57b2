//! B+tree node format.
//!
//! Every node occupies exactly one 4KB page:
//!
//! ```text
//! | kind | count |  pointers   |   offsets   | key-values
//! |  2B  |  2B   | count * 8B  | count * 2B  | ...
//! ```
//!
//! Leaf and internal nodes share the layout. Leaves keep zeroed pointer slots
//! so that the tree layer can move records between kinds without re-encoding.
//!
//! # Usage
//!
//! ```
//! use bnode::node::{NodeBuilder, NodeKind};
//!
//! let mut builder = NodeBuilder::new(NodeKind::Leaf);
//! builder.push(0, b"cat", b"meow").unwrap();
//! builder.push(0, b"dog", b"woof").unwrap();
//! let node = builder.build().unwrap();
//!
//! assert_eq!(node.node_bytes(), 46);
//! assert_eq!(node.key(0), b"cat");
//! assert_eq!(node.value(1), b"woof");
//! ```

mod builder;
mod codec;
mod layout;

pub use builder::NodeBuilder;
pub use codec::{Node, NodeError, Record};
pub use layout::{
    HEADER_SIZE, KV_HEADER_SIZE, LayoutLimits, MAX_KEY_LEN, MAX_VALUE_LEN, NodeKind, OFFSET_SIZE,
    POINTER_SIZE, verify_layout,
};
