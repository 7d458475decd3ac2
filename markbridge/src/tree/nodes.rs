//! Core data structures for the document tree.

use crate::error::TreeError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Node type names, as referenced by transformer dependencies and [`NodeSchema`].
///
/// [`NodeSchema`]: super::NodeSchema
pub mod types {
    pub const ROOT: &str = "root";
    pub const PARAGRAPH: &str = "paragraph";
    pub const HEADING: &str = "heading";
    pub const QUOTE: &str = "quote";
    pub const LIST: &str = "list";
    pub const LIST_ITEM: &str = "listitem";
    pub const CODE: &str = "code";
    pub const LINK: &str = "link";
    pub const HORIZONTAL_RULE: &str = "horizontalrule";
    pub const TEXT: &str = "text";
    pub const LINE_BREAK: &str = "linebreak";
}

/// Character formatting flags carried by a text run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TextFormat(u16);

impl TextFormat {
    pub const PLAIN: TextFormat = TextFormat(0);
    pub const BOLD: TextFormat = TextFormat(1);
    pub const ITALIC: TextFormat = TextFormat(1 << 1);
    pub const STRIKETHROUGH: TextFormat = TextFormat(1 << 2);
    pub const UNDERLINE: TextFormat = TextFormat(1 << 3);
    pub const CODE: TextFormat = TextFormat(1 << 4);
    pub const SUBSCRIPT: TextFormat = TextFormat(1 << 5);
    pub const SUPERSCRIPT: TextFormat = TextFormat(1 << 6);
    pub const HIGHLIGHT: TextFormat = TextFormat(1 << 7);

    const NAMED: [(TextFormat, &'static str); 8] = [
        (TextFormat::BOLD, "bold"),
        (TextFormat::ITALIC, "italic"),
        (TextFormat::STRIKETHROUGH, "strikethrough"),
        (TextFormat::UNDERLINE, "underline"),
        (TextFormat::CODE, "code"),
        (TextFormat::SUBSCRIPT, "subscript"),
        (TextFormat::SUPERSCRIPT, "superscript"),
        (TextFormat::HIGHLIGHT, "highlight"),
    ];

    pub const fn bits(self) -> u16 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True when every flag of `other` is set. An empty `other` is never contained.
    pub const fn contains(self, other: TextFormat) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    pub const fn union(self, other: TextFormat) -> TextFormat {
        TextFormat(self.0 | other.0)
    }

    pub fn insert(&mut self, other: TextFormat) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: TextFormat) {
        self.0 &= !other.0;
    }

    pub fn toggle(&mut self, other: TextFormat) {
        self.0 ^= other.0;
    }

    /// Number of individual flags set
    pub const fn len(self) -> u32 {
        self.0.count_ones()
    }

    /// Iterate the single flags set on this format, in declaration order
    pub fn flags(self) -> impl Iterator<Item = TextFormat> {
        Self::NAMED
            .into_iter()
            .map(|(flag, _)| flag)
            .filter(move |flag| self.contains(*flag))
    }

    /// Look up a single flag by its name (`"bold"`, `"highlight"`, ...)
    pub fn from_name(name: &str) -> Option<TextFormat> {
        Self::NAMED
            .iter()
            .find(|(_, n)| n.eq_ignore_ascii_case(name))
            .map(|(flag, _)| *flag)
    }

    /// Names of the flags set on this format
    pub fn names(self) -> Vec<&'static str> {
        Self::NAMED
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect()
    }
}

impl BitOr for TextFormat {
    type Output = TextFormat;

    fn bitor(self, rhs: TextFormat) -> TextFormat {
        self.union(rhs)
    }
}

impl BitOrAssign for TextFormat {
    fn bitor_assign(&mut self, rhs: TextFormat) {
        self.insert(rhs);
    }
}

impl fmt::Display for TextFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("plain");
        }
        f.write_str(&self.names().join("+"))
    }
}

/// Kind of list a [`ElementKind::List`] renders as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListType {
    Bullet,
    Number,
    Check,
}

/// The structural role of an element node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ElementKind {
    Root,
    Paragraph,
    Heading {
        level: u8,
    },
    Quote,
    List {
        list_type: ListType,
        start: u32,
    },
    #[serde(rename = "listitem")]
    ListItem {
        checked: Option<bool>,
    },
    Code {
        language: Option<String>,
    },
    Link {
        url: String,
        title: Option<String>,
    },
    #[serde(rename = "horizontalrule")]
    HorizontalRule,
    Custom {
        name: String,
        #[serde(default)]
        attributes: BTreeMap<String, String>,
        #[serde(default)]
        inline: bool,
    },
}

impl ElementKind {
    /// Node type name used by schemas and transformer dependencies
    pub fn node_type(&self) -> &str {
        match self {
            ElementKind::Root => types::ROOT,
            ElementKind::Paragraph => types::PARAGRAPH,
            ElementKind::Heading { .. } => types::HEADING,
            ElementKind::Quote => types::QUOTE,
            ElementKind::List { .. } => types::LIST,
            ElementKind::ListItem { .. } => types::LIST_ITEM,
            ElementKind::Code { .. } => types::CODE,
            ElementKind::Link { .. } => types::LINK,
            ElementKind::HorizontalRule => types::HORIZONTAL_RULE,
            ElementKind::Custom { name, .. } => name,
        }
    }

    /// Inline elements live among text runs rather than as blocks
    pub fn is_inline(&self) -> bool {
        matches!(
            self,
            ElementKind::Link { .. } | ElementKind::Custom { inline: true, .. }
        )
    }
}

/// A run of text sharing one set of format flags.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TextNode {
    text: String,
    #[serde(default)]
    format: TextFormat,
}

impl TextNode {
    pub fn new(text: impl Into<String>) -> Self {
        TextNode {
            text: text.into(),
            format: TextFormat::PLAIN,
        }
    }

    pub fn with_format(text: impl Into<String>, format: TextFormat) -> Self {
        TextNode {
            text: text.into(),
            format,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn format(&self) -> TextFormat {
        self.format
    }

    pub fn set_format(&mut self, format: TextFormat) {
        self.format = format;
    }

    pub fn has_format(&self, format: TextFormat) -> bool {
        self.format.contains(format)
    }

    pub fn toggle_format(&mut self, format: TextFormat) {
        self.format.toggle(format);
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// A node of the document tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "lowercase")]
pub enum Node {
    Element(ElementNode),
    Text(TextNode),
    #[serde(rename = "linebreak")]
    LineBreak,
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(TextNode::new(text))
    }

    pub fn formatted(text: impl Into<String>, format: TextFormat) -> Self {
        Node::Text(TextNode::with_format(text, format))
    }

    pub fn node_type(&self) -> &str {
        match self {
            Node::Element(element) => element.node_type(),
            Node::Text(_) => types::TEXT,
            Node::LineBreak => types::LINE_BREAK,
        }
    }

    /// Text runs, line breaks and inline elements
    pub fn is_inline(&self) -> bool {
        match self {
            Node::Element(element) => element.kind.is_inline(),
            Node::Text(_) | Node::LineBreak => true,
        }
    }

    pub fn as_element(&self) -> Option<&ElementNode> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut ElementNode> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextNode> {
        match self {
            Node::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn text_content(&self) -> String {
        let mut output = String::new();
        self.collect_text(&mut output);
        output
    }

    fn collect_text(&self, output: &mut String) {
        match self {
            Node::Element(element) => {
                for child in &element.children {
                    child.collect_text(output);
                }
            }
            Node::Text(text) => output.push_str(&text.text),
            Node::LineBreak => output.push('\n'),
        }
    }
}

impl From<ElementNode> for Node {
    fn from(element: ElementNode) -> Self {
        Node::Element(element)
    }
}

impl From<TextNode> for Node {
    fn from(text: TextNode) -> Self {
        Node::Text(text)
    }
}

/// A node that owns children: blocks, containers and inline elements such as links.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementNode {
    kind: ElementKind,
    #[serde(default)]
    children: Vec<Node>,
}

impl ElementNode {
    pub fn new(kind: ElementKind) -> Self {
        ElementNode {
            kind,
            children: Vec::new(),
        }
    }

    pub fn root() -> Self {
        Self::new(ElementKind::Root)
    }

    pub fn paragraph() -> Self {
        Self::new(ElementKind::Paragraph)
    }

    /// Heading levels are clamped to 1..=6
    pub fn heading(level: u8) -> Self {
        Self::new(ElementKind::Heading {
            level: level.clamp(1, 6),
        })
    }

    pub fn quote() -> Self {
        Self::new(ElementKind::Quote)
    }

    pub fn list(list_type: ListType, start: u32) -> Self {
        Self::new(ElementKind::List { list_type, start })
    }

    pub fn list_item(checked: Option<bool>) -> Self {
        Self::new(ElementKind::ListItem { checked })
    }

    pub fn code(language: Option<String>) -> Self {
        Self::new(ElementKind::Code { language })
    }

    pub fn link(url: impl Into<String>, title: Option<String>) -> Self {
        Self::new(ElementKind::Link {
            url: url.into(),
            title,
        })
    }

    pub fn horizontal_rule() -> Self {
        Self::new(ElementKind::HorizontalRule)
    }

    pub fn custom(name: impl Into<String>, inline: bool) -> Self {
        Self::new(ElementKind::Custom {
            name: name.into(),
            attributes: BTreeMap::new(),
            inline,
        })
    }

    /// Builder-style append for constructing trees in code and tests
    pub fn with_child(mut self, child: impl Into<Node>) -> Result<Self, TreeError> {
        self.append(child.into())?;
        Ok(self)
    }

    pub fn kind(&self) -> &ElementKind {
        &self.kind
    }

    pub fn node_type(&self) -> &str {
        self.kind.node_type()
    }

    pub fn is_inline(&self) -> bool {
        self.kind.is_inline()
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn child_mut(&mut self, index: usize) -> Option<&mut Node> {
        self.children.get_mut(index)
    }

    pub fn last_child(&self) -> Option<&Node> {
        self.children.last()
    }

    /// The last child, when it is an element
    pub fn last_element_mut(&mut self) -> Option<&mut ElementNode> {
        self.children.last_mut().and_then(Node::as_element_mut)
    }

    /// Whether `child` may be placed directly under this element
    pub fn accepts(&self, child: &Node) -> bool {
        if let Node::Element(element) = child {
            if matches!(element.kind, ElementKind::Root) {
                return false;
            }
            if matches!(element.kind, ElementKind::ListItem { .. }) {
                return matches!(self.kind, ElementKind::List { .. });
            }
        }
        match &self.kind {
            ElementKind::Root => !child.is_inline(),
            ElementKind::List { .. } => false,
            ElementKind::ListItem { .. } => {
                child.is_inline() || matches!(child, Node::Element(e) if matches!(e.kind, ElementKind::List { .. }))
            }
            ElementKind::Paragraph | ElementKind::Heading { .. } | ElementKind::Quote => {
                child.is_inline()
            }
            ElementKind::Link { .. } => {
                child.is_inline()
                    && !matches!(child, Node::Element(e) if matches!(e.kind, ElementKind::Link { .. }))
            }
            ElementKind::Code { .. } => matches!(child, Node::Text(_) | Node::LineBreak),
            ElementKind::HorizontalRule => false,
            ElementKind::Custom { inline: true, .. } => child.is_inline(),
            ElementKind::Custom { inline: false, .. } => true,
        }
    }

    fn check_child(&self, child: &Node) -> Result<(), TreeError> {
        if self.accepts(child) {
            Ok(())
        } else {
            Err(TreeError::InvalidChild {
                parent: self.node_type().to_string(),
                child: child.node_type().to_string(),
            })
        }
    }

    pub fn append(&mut self, child: Node) -> Result<(), TreeError> {
        self.check_child(&child)?;
        self.children.push(child);
        Ok(())
    }

    pub fn append_all(&mut self, children: impl IntoIterator<Item = Node>) -> Result<(), TreeError> {
        for child in children {
            self.append(child)?;
        }
        Ok(())
    }

    pub fn insert(&mut self, index: usize, child: Node) -> Result<(), TreeError> {
        if index > self.children.len() {
            return Err(TreeError::IndexOutOfBounds {
                index,
                len: self.children.len(),
            });
        }
        self.check_child(&child)?;
        self.children.insert(index, child);
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Result<Node, TreeError> {
        if index >= self.children.len() {
            return Err(TreeError::IndexOutOfBounds {
                index,
                len: self.children.len(),
            });
        }
        Ok(self.children.remove(index))
    }

    /// Detach and return every child from `index` on
    pub fn split_off(&mut self, index: usize) -> Result<Vec<Node>, TreeError> {
        if index > self.children.len() {
            return Err(TreeError::IndexOutOfBounds {
                index,
                len: self.children.len(),
            });
        }
        Ok(self.children.split_off(index))
    }

    pub fn retain(&mut self, keep: impl FnMut(&Node) -> bool) {
        self.children.retain(keep);
    }

    pub fn clear(&mut self) {
        self.children.clear();
    }

    pub fn into_children(self) -> Vec<Node> {
        self.children
    }

    pub fn text_content(&self) -> String {
        let mut output = String::new();
        for child in &self.children {
            child.collect_text(&mut output);
        }
        output
    }

    /// True when a child is a block element (used to pick block or inline rendering)
    pub fn has_block_children(&self) -> bool {
        self.children.iter().any(|child| !child.is_inline())
    }

    pub fn heading_level(&self) -> Option<u8> {
        match self.kind {
            ElementKind::Heading { level } => Some(level),
            _ => None,
        }
    }

    pub fn list_type(&self) -> Option<ListType> {
        match self.kind {
            ElementKind::List { list_type, .. } => Some(list_type),
            _ => None,
        }
    }

    pub fn list_start(&self) -> Option<u32> {
        match self.kind {
            ElementKind::List { start, .. } => Some(start),
            _ => None,
        }
    }

    pub fn checked(&self) -> Option<bool> {
        match self.kind {
            ElementKind::ListItem { checked } => checked,
            _ => None,
        }
    }

    pub fn language(&self) -> Option<&str> {
        match &self.kind {
            ElementKind::Code { language } => language.as_deref(),
            _ => None,
        }
    }

    /// The nested list of a list item whose only child is a list
    pub fn nested_list(&self) -> Option<&ElementNode> {
        match (&self.kind, self.children.as_slice()) {
            (ElementKind::ListItem { .. }, [Node::Element(list)])
                if matches!(list.kind, ElementKind::List { .. }) =>
            {
                Some(list)
            }
            _ => None,
        }
    }

    pub fn nested_list_mut(&mut self) -> Option<&mut ElementNode> {
        if self.nested_list().is_none() {
            return None;
        }
        self.children.first_mut().and_then(Node::as_element_mut)
    }

    pub fn url(&self) -> Option<&str> {
        match &self.kind {
            ElementKind::Link { url, .. } => Some(url),
            _ => None,
        }
    }

    pub fn set_url(&mut self, new_url: impl Into<String>) -> Result<(), TreeError> {
        match &mut self.kind {
            ElementKind::Link { url, .. } => {
                *url = new_url.into();
                Ok(())
            }
            other => Err(TreeError::UnsupportedAttribute {
                node_type: other.node_type().to_string(),
                attribute: "url",
            }),
        }
    }

    pub fn title(&self) -> Option<&str> {
        match &self.kind {
            ElementKind::Link { title, .. } => title.as_deref(),
            _ => None,
        }
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        match &self.kind {
            ElementKind::Custom { attributes, .. } => attributes.get(key).map(String::as_str),
            _ => None,
        }
    }

    pub fn set_attribute(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), TreeError> {
        match &mut self.kind {
            ElementKind::Custom { attributes, .. } => {
                attributes.insert(key.into(), value.into());
                Ok(())
            }
            other => Err(TreeError::UnsupportedAttribute {
                node_type: other.node_type().to_string(),
                attribute: "attributes",
            }),
        }
    }

    /// Check every parent/child pair below this element.
    ///
    /// Trees built through [`ElementNode::append`] are valid by construction; trees
    /// deserialized from JSON are not, and go through this before use.
    pub fn validate(&self) -> Result<(), TreeError> {
        for child in &self.children {
            self.check_child(child)?;
            if let Node::Element(element) = child {
                element.validate()?;
            }
        }
        Ok(())
    }
}

/// Merge adjacent text runs sharing a format and drop empty runs.
pub fn normalize_inline(nodes: Vec<Node>) -> Vec<Node> {
    let mut output: Vec<Node> = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            Node::Text(text) if text.is_empty() => {}
            Node::Text(text) => match output.last_mut() {
                Some(Node::Text(previous)) if previous.format == text.format => {
                    previous.text.push_str(&text.text);
                }
                _ => output.push(Node::Text(text)),
            },
            other => output.push(other),
        }
    }
    output
}
