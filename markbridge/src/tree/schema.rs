//! The set of node types a document is configured with

use super::nodes::types;
use std::collections::BTreeSet;

/// Node types registered for a document.
///
/// Transformers declare the node types they create; conversion refuses to run a
/// transformer whose dependencies are not registered here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSchema {
    types: BTreeSet<String>,
}

impl NodeSchema {
    /// Only the node types every document needs
    pub fn minimal() -> Self {
        let types = [types::ROOT, types::PARAGRAPH, types::TEXT, types::LINE_BREAK]
            .into_iter()
            .map(String::from)
            .collect();
        NodeSchema { types }
    }

    /// Every built-in node type
    pub fn standard() -> Self {
        let mut schema = Self::minimal();
        for node_type in [
            types::HEADING,
            types::QUOTE,
            types::LIST,
            types::LIST_ITEM,
            types::CODE,
            types::LINK,
            types::HORIZONTAL_RULE,
        ] {
            schema.register(node_type);
        }
        schema
    }

    pub fn register(&mut self, node_type: impl Into<String>) {
        self.types.insert(node_type.into());
    }

    pub fn with(mut self, node_type: impl Into<String>) -> Self {
        self.register(node_type);
        self
    }

    pub fn contains(&self, node_type: &str) -> bool {
        self.types.contains(node_type)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.types.iter().map(String::as_str)
    }
}

impl Default for NodeSchema {
    fn default() -> Self {
        Self::standard()
    }
}
