//! Rich document tree
//!
//! An owned tree of [`Node`]s under a root [`ElementNode`]. Mutations go through
//! [`ElementNode::append`] and friends, which refuse structurally invalid placements
//! (a text run directly under the root, a paragraph inside a list, ...).

mod document;
mod nodes;
mod schema;

pub use document::{Document, Selection};
pub use nodes::{
    normalize_inline, types, ElementKind, ElementNode, ListType, Node, TextFormat, TextNode,
};
pub use schema::NodeSchema;
