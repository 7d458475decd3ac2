use super::collect_dependencies;
use crate::error::ConversionError;
use crate::formats::markdown::{ExportContext, InlineImporter};
use crate::matcher::{MatchResult, Matcher};
use crate::tree::{ElementNode, Node, TextNode};
use std::fmt;
use std::sync::Arc;

/// `replace(text, match, importer)`.
///
/// `text` holds the unescaped matched text and the format in effect where it was found.
/// Returns the nodes standing in for the match, or `None` to leave it to the next rule.
pub type TextMatchReplaceFn = Arc<
    dyn Fn(TextNode, &MatchResult, &InlineImporter<'_>) -> Result<Option<Vec<Node>>, ConversionError>
        + Send
        + Sync,
>;

/// Renders an inline element, or `None` when it is not this rule's.
pub type TextMatchExportFn = Arc<
    dyn Fn(&ElementNode, &ExportContext<'_>) -> Result<Option<String>, ConversionError>
        + Send
        + Sync,
>;

/// A pattern mapped to an inline node.
#[derive(Clone)]
pub struct TextMatchTransformer {
    name: String,
    dependencies: Vec<String>,
    import_regexp: Option<Arc<dyn Matcher>>,
    regexp_end: Option<Arc<dyn Matcher>>,
    trigger: Option<String>,
    replace: Option<TextMatchReplaceFn>,
    export: Option<TextMatchExportFn>,
}

impl TextMatchTransformer {
    pub fn new(name: impl Into<String>) -> Self {
        TextMatchTransformer {
            name: name.into(),
            dependencies: Vec::new(),
            import_regexp: None,
            regexp_end: None,
            trigger: None,
            replace: None,
            export: None,
        }
    }

    /// Pattern and callback used when importing text
    pub fn with_import<M, F>(mut self, import_regexp: M, replace: F) -> Self
    where
        M: Matcher + 'static,
        F: Fn(TextNode, &MatchResult, &InlineImporter<'_>) -> Result<Option<Vec<Node>>, ConversionError>
            + Send
            + Sync
            + 'static,
    {
        self.import_regexp = Some(Arc::new(import_regexp));
        self.replace = Some(Arc::new(replace));
        self
    }

    /// Pattern anchored at the end of typed text, used by typing shortcuts
    pub fn with_regexp_end<M: Matcher + 'static>(mut self, regexp_end: M) -> Self {
        self.regexp_end = Some(Arc::new(regexp_end));
        self
    }

    /// Lines without the trigger are not scanned by this rule
    pub fn with_trigger(mut self, trigger: impl Into<String>) -> Self {
        self.trigger = Some(trigger.into());
        self
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

    pub fn import_regexp(&self) -> Option<&dyn Matcher> {
        self.import_regexp.as_deref()
    }

    pub fn regexp_end(&self) -> Option<&dyn Matcher> {
        self.regexp_end.as_deref()
    }

    pub fn trigger(&self) -> Option<&str> {
        self.trigger.as_deref()
    }

    /// True when `text` could contain a match at all
    pub fn is_triggered_by(&self, text: &str) -> bool {
        self.trigger
            .as_deref()
            .map_or(true, |trigger| text.contains(trigger))
    }

    pub fn replace(
        &self,
        text: TextNode,
        matched: &MatchResult,
        importer: &InlineImporter<'_>,
    ) -> Result<Option<Vec<Node>>, ConversionError> {
        match &self.replace {
            Some(replace) => replace(text, matched, importer),
            None => Ok(None),
        }
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

impl fmt::Debug for TextMatchTransformer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextMatchTransformer")
            .field("name", &self.name)
            .field("dependencies", &self.dependencies)
            .field("import_regexp", &self.import_regexp)
            .field("regexp_end", &self.regexp_end)
            .field("trigger", &self.trigger)
            .field("has_replace", &self.replace.is_some())
            .field("has_export", &self.export.is_some())
            .finish()
    }
}
