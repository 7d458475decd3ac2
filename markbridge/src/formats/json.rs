//! JSON format implementation
//!
//! Serializes the document tree with serde, so it can be stored or handed to other tools
//! and read back without going through markdown. The shape follows the tree types:
//!
//! ```json
//!     {"kind": {"type": "root"}, "children": [
//!         {"node": "element", "kind": {"type": "heading", "level": 1}, "children": [
//!             {"node": "text", "text": "Title"}
//!         ]}
//!     ]}
//! ```
//!
//! Import validates the tree structure. Custom node types found in the input are
//! registered in the resulting document's schema next to the standard ones.

use crate::error::FormatError;
use crate::format::{Direction, Format, FormatParams};
use crate::tree::{Document, ElementNode, Node, NodeSchema};

/// Format implementation for the JSON tree dump
#[derive(Debug, Clone, Default)]
pub struct JsonFormat {
    pretty: bool,
}

impl JsonFormat {
    pub fn new(pretty: bool) -> Self {
        JsonFormat { pretty }
    }

    fn render(&self, doc: &Document, pretty: bool) -> Result<String, FormatError> {
        let result = if pretty {
            serde_json::to_string_pretty(doc.root())
        } else {
            serde_json::to_string(doc.root())
        };
        result.map_err(|err| FormatError::SerializationError(err.to_string()))
    }
}

impl Format for JsonFormat {
    fn name(&self) -> &str {
        "json"
    }

    fn description(&self) -> &str {
        "Document tree as JSON"
    }

    fn file_extensions(&self) -> &[&str] {
        &["json"]
    }

    fn directions(&self) -> &[Direction] {
        &[Direction::Import, Direction::Export]
    }

    /// `pretty`: indent the output
    fn parameters(&self) -> &[&str] {
        &["pretty"]
    }

    fn import(&self, source: &str) -> Result<Document, FormatError> {
        let root: ElementNode =
            serde_json::from_str(source).map_err(|err| FormatError::ParseError(err.to_string()))?;
        let mut schema = NodeSchema::standard();
        register_types(&root, &mut schema);
        Document::from_root(root, schema).map_err(|err| FormatError::ParseError(err.to_string()))
    }

    fn export(&self, doc: &Document, params: &FormatParams) -> Result<String, FormatError> {
        self.render(doc, params.flag("pretty", self.pretty)?)
    }
}

fn register_types(element: &ElementNode, schema: &mut NodeSchema) {
    if !schema.contains(element.node_type()) {
        schema.register(element.node_type());
    }
    for child in element.children() {
        if let Node::Element(child) = child {
            register_types(child, schema);
        }
    }
}
