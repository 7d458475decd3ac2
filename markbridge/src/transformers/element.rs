use super::{collect_dependencies, Outcome};
use crate::error::ConversionError;
use crate::formats::markdown::ExportContext;
use crate::matcher::{MatchResult, Matcher};
use crate::tree::{ElementNode, Node};
use std::fmt;
use std::sync::Arc;

/// `replace(parent, children, match, is_import)`.
///
/// `parent` is the container the new block goes into; its last child is the previous
/// sibling block. `children` holds the inline nodes imported from the rest of the line.
/// Returning anything but [`Outcome::Handled`] requires leaving `parent` untouched.
pub type ElementReplaceFn = Arc<
    dyn Fn(&mut ElementNode, Vec<Node>, &MatchResult, bool) -> Result<Outcome, ConversionError>
        + Send
        + Sync,
>;

/// Renders a block node to text, or `None` when the node is not this rule's.
pub type ElementExportFn = Arc<
    dyn Fn(&ElementNode, &ExportContext<'_>) -> Result<Option<String>, ConversionError>
        + Send
        + Sync,
>;

/// A single-line block rule, matched at the start of a line.
#[derive(Clone)]
pub struct ElementTransformer {
    name: String,
    dependencies: Vec<String>,
    regexp: Arc<dyn Matcher>,
    replace: ElementReplaceFn,
    export: Option<ElementExportFn>,
}

impl ElementTransformer {
    pub fn new<M, F>(name: impl Into<String>, regexp: M, replace: F) -> Self
    where
        M: Matcher + 'static,
        F: Fn(&mut ElementNode, Vec<Node>, &MatchResult, bool) -> Result<Outcome, ConversionError>
            + Send
            + Sync
            + 'static,
    {
        ElementTransformer {
            name: name.into(),
            dependencies: Vec::new(),
            regexp: Arc::new(regexp),
            replace: Arc::new(replace),
            export: None,
        }
    }

    pub fn with_export<F>(mut self, export: F) -> Self
    where
        F: Fn(&ElementNode, &ExportContext<'_>) -> Result<Option<String>, ConversionError>
            + Send
            + Sync
            + 'static,
    {
        self.export = Some(Arc::new(export));
        self
    }

    pub fn with_dependencies<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = collect_dependencies(dependencies);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    pub fn regexp(&self) -> &dyn Matcher {
        self.regexp.as_ref()
    }

    pub fn replace(
        &self,
        parent: &mut ElementNode,
        children: Vec<Node>,
        matched: &MatchResult,
        is_import: bool,
    ) -> Result<Outcome, ConversionError> {
        (self.replace)(parent, children, matched, is_import)
    }

    pub fn export(
        &self,
        node: &ElementNode,
        ctx: &ExportContext<'_>,
    ) -> Result<Option<String>, ConversionError> {
        match &self.export {
            Some(export) => export(node, ctx),
            None => Ok(None),
        }
    }
}

impl fmt::Debug for ElementTransformer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementTransformer")
            .field("name", &self.name)
            .field("dependencies", &self.dependencies)
            .field("regexp", &self.regexp)
            .field("has_export", &self.export.is_some())
            .finish()
    }
}
