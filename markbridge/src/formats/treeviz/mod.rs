//! Treeviz formatter for document trees
//!
//! Treeviz is a visual, line based representation of the document tree, meant for
//! inspecting what an import produced.
//!
//! It encodes the node structure as indentation, with 2 columns per level of nesting.
//!
//! So the format is :
//! <indentation>(per level) <connector> <icon><space><label> (truncated to 30 characters)
//!
//! Example:
//!
//! ```text
//!     ⧉ Document (2 blocks)
//!     ├─ § h1 Title
//!     │ └─ ◦ Title
//!     └─ ¶ Bold tail
//!       ├─ ◦ Bold [bold]
//!       └─ ◦  tail
//! ```
//!
//! Format flags on text runs are shown in brackets unless the `show-formats` parameter
//! is set to `false`. Icons live in ../icons.rs.

use super::icons::get_icon;
use crate::error::FormatError;
use crate::format::{Direction, Format, FormatParams};
use crate::tree::{types, Document, ElementKind, ElementNode, ListType, Node};

const MAX_LABEL: usize = 30;

fn truncate(text: &str) -> String {
    let flat = text.replace('\n', " ");
    if flat.chars().count() > MAX_LABEL {
        let cut: String = flat.chars().take(MAX_LABEL - 1).collect();
        format!("{cut}…")
    } else {
        flat
    }
}

fn element_label(element: &ElementNode) -> String {
    let text = truncate(&element.text_content());
    match element.kind() {
        ElementKind::Heading { level } => format!("h{level} {text}"),
        ElementKind::List { list_type, start } => {
            let kind = match list_type {
                ListType::Bullet => "bullet",
                ListType::Number => "number",
                ListType::Check => "check",
            };
            let items = element.len();
            if *list_type == ListType::Number && *start != 1 {
                format!("{kind} list from {start}, {items} items")
            } else {
                format!("{kind} list, {items} items")
            }
        }
        ElementKind::ListItem {
            checked: Some(checked),
        } => {
            let mark = if *checked { "[x]" } else { "[ ]" };
            format!("{mark} {text}")
        }
        ElementKind::Code { language } => match language {
            Some(language) => format!("{language}: {text}"),
            None => text,
        },
        ElementKind::Link { url, .. } => format!("{text} → {}", truncate(url)),
        ElementKind::HorizontalRule => "rule".to_string(),
        ElementKind::Custom { name, .. } => format!("<{name}> {text}"),
        _ => text,
    }
}

fn node_label(node: &Node, show_formats: bool) -> String {
    match node {
        Node::Element(element) => element_label(element),
        Node::Text(text) => {
            let label = truncate(text.text());
            if show_formats && !text.format().is_empty() {
                format!("{label} [{}]", text.format())
            } else {
                label
            }
        }
        Node::LineBreak => "line break".to_string(),
    }
}

fn format_node(
    node: &Node,
    prefix: &str,
    child_index: usize,
    child_count: usize,
    show_formats: bool,
) -> String {
    let is_last = child_index == child_count - 1;
    let connector = if is_last { "└─" } else { "├─" };
    let icon = get_icon(node.node_type());
    let mut output = format!(
        "{prefix}{connector} {icon} {}\n",
        node_label(node, show_formats)
    );

    if let Node::Element(element) = node {
        let child_prefix = format!("{}{}", prefix, if is_last { "  " } else { "│ " });
        output.push_str(&format_children(
            element.children(),
            &child_prefix,
            show_formats,
        ));
    }
    output
}

fn format_children(children: &[Node], prefix: &str, show_formats: bool) -> String {
    let mut output = String::new();
    let child_count = children.len();
    for (i, child) in children.iter().enumerate() {
        output.push_str(&format_node(child, prefix, i, child_count, show_formats));
    }
    output
}

pub fn to_treeviz_str(doc: &Document, show_formats: bool) -> String {
    let output = format!(
        "{} Document ({} blocks)\n",
        get_icon(types::ROOT),
        doc.root().len()
    );
    output + &format_children(doc.root().children(), "", show_formats)
}

/// Format implementation for treeviz format
#[derive(Debug, Clone)]
pub struct TreevizFormat {
    show_formats: bool,
}

impl TreevizFormat {
    pub fn new(show_formats: bool) -> Self {
        TreevizFormat { show_formats }
    }
}

impl Default for TreevizFormat {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Format for TreevizFormat {
    fn name(&self) -> &str {
        "treeviz"
    }

    fn description(&self) -> &str {
        "Visual tree representation with indentation and Unicode icons"
    }

    fn file_extensions(&self) -> &[&str] {
        &["tree", "treeviz"]
    }

    fn directions(&self) -> &[Direction] {
        &[Direction::Export]
    }

    fn parameters(&self) -> &[&str] {
        &["show-formats"]
    }

    fn export(&self, doc: &Document, params: &FormatParams) -> Result<String, FormatError> {
        let show_formats = params.flag("show-formats", self.show_formats)?;
        Ok(to_treeviz_str(doc, show_formats))
    }
}
