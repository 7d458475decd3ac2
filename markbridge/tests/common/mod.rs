//! Helpers shared by the integration tests

#![allow(dead_code)]

use markbridge::{
    export_markdown, import_markdown, ConversionOptions, Document, Node, TransformerSet,
};

/// Import with the built-in rules
pub fn import(md: &str) -> Document {
    import_with(md, &TransformerSet::builtin(), &ConversionOptions::default())
}

pub fn import_with(md: &str, transformers: &TransformerSet, options: &ConversionOptions) -> Document {
    let mut doc = Document::default();
    import_markdown(md, transformers, &mut doc, options).expect("markdown should import");
    doc
}

/// Export with the built-in rules
pub fn export(doc: &Document) -> String {
    export_with(doc, &TransformerSet::builtin(), &ConversionOptions::default())
}

pub fn export_with(doc: &Document, transformers: &TransformerSet, options: &ConversionOptions) -> String {
    export_markdown(transformers, doc, options).expect("document should export")
}

/// Import then export with the built-in rules and the same options
pub fn round_trip(md: &str, options: &ConversionOptions) -> String {
    let set = TransformerSet::builtin();
    export_with(&import_with(md, &set, options), &set, options)
}

/// The root's children, as elements
pub fn blocks(doc: &Document) -> Vec<&markbridge::ElementNode> {
    doc.root()
        .children()
        .iter()
        .map(|node| node.as_element().expect("root children are elements"))
        .collect()
}

/// Text runs of an element's direct children, with their format names
pub fn runs(nodes: &[Node]) -> Vec<(String, String)> {
    nodes
        .iter()
        .filter_map(Node::as_text)
        .map(|text| (text.text().to_string(), text.format().to_string()))
        .collect()
}
