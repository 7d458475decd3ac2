//! The document: a root element, its schema, and a selection

use super::nodes::{ElementNode, Node};
use super::schema::NodeSchema;
use crate::error::TreeError;

/// A caret position: the child-index path to a node plus an offset inside it.
///
/// For text nodes the offset counts characters; for elements it counts children.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selection {
    pub path: Vec<usize>,
    pub offset: usize,
}

impl Selection {
    pub fn new(path: Vec<usize>, offset: usize) -> Self {
        Selection { path, offset }
    }
}

/// A rich document tree plus the node types it was configured with.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: ElementNode,
    schema: NodeSchema,
    selection: Option<Selection>,
}

impl Document {
    pub fn new(schema: NodeSchema) -> Self {
        Document {
            root: ElementNode::root(),
            schema,
            selection: None,
        }
    }

    /// Wrap an existing root, checking its structure first
    pub fn from_root(root: ElementNode, schema: NodeSchema) -> Result<Self, TreeError> {
        if !matches!(root.kind(), super::ElementKind::Root) {
            return Err(TreeError::InvalidChild {
                parent: "document".to_string(),
                child: root.node_type().to_string(),
            });
        }
        root.validate()?;
        Ok(Document {
            root,
            schema,
            selection: None,
        })
    }

    pub fn root(&self) -> &ElementNode {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut ElementNode {
        &mut self.root
    }

    pub fn into_root(self) -> ElementNode {
        self.root
    }

    pub fn schema(&self) -> &NodeSchema {
        &self.schema
    }

    pub fn schema_mut(&mut self) -> &mut NodeSchema {
        &mut self.schema
    }

    /// Remove every block and drop the selection
    pub fn clear(&mut self) {
        self.root.clear();
        self.selection = None;
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn set_selection(&mut self, selection: Option<Selection>) -> Result<(), TreeError> {
        if let Some(selection) = &selection {
            if !selection.path.is_empty() {
                self.node_at(&selection.path)?;
            }
        }
        self.selection = selection;
        Ok(())
    }

    /// Place the caret at the start of the first text node, or at the root start
    pub fn select_start(&mut self) {
        let path = first_text_path(&self.root, Vec::new()).unwrap_or_default();
        self.selection = Some(Selection::new(path, 0));
    }

    /// Resolve a child-index path from the root
    pub fn node_at(&self, path: &[usize]) -> Result<&Node, TreeError> {
        let (first, rest) = path
            .split_first()
            .ok_or_else(|| TreeError::InvalidPath(path.to_vec()))?;
        let mut node = self
            .root
            .children()
            .get(*first)
            .ok_or_else(|| TreeError::InvalidPath(path.to_vec()))?;
        for index in rest {
            node = node
                .as_element()
                .and_then(|element| element.children().get(*index))
                .ok_or_else(|| TreeError::InvalidPath(path.to_vec()))?;
        }
        Ok(node)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new(NodeSchema::standard())
    }
}

fn first_text_path(element: &ElementNode, prefix: Vec<usize>) -> Option<Vec<usize>> {
    for (index, child) in element.children().iter().enumerate() {
        let mut path = prefix.clone();
        path.push(index);
        match child {
            Node::Text(_) => return Some(path),
            Node::Element(inner) => {
                if let Some(found) = first_text_path(inner, path) {
                    return Some(found);
                }
            }
            Node::LineBreak => {}
        }
    }
    None
}
