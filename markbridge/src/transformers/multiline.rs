use super::element::ElementExportFn;
use super::{collect_dependencies, Outcome};
use crate::error::ConversionError;
use crate::formats::markdown::{ExportContext, LineImporter};
use crate::matcher::{MatchResult, Matcher};
use crate::tree::ElementNode;
use std::fmt;
use std::sync::Arc;

/// `replace(parent, start, end, lines_in_between, importer)`.
///
/// `lines_in_between` holds the text after the start match on the first line, every
/// full line in between, and the text before the end match on the last line. For a
/// rule without an end pattern it is empty and `end` is `None`.
///
/// [`Outcome::Declined`] is not a legal answer for this family.
pub type MultilineReplaceFn = Arc<
    dyn Fn(
            &mut ElementNode,
            &MatchResult,
            Option<&MatchResult>,
            &[String],
            &LineImporter<'_>,
        ) -> Result<Outcome, ConversionError>
        + Send
        + Sync,
>;

/// A block spanning a start line, an end line and the lines in between.
#[derive(Clone)]
pub struct MultilineElementTransformer {
    name: String,
    dependencies: Vec<String>,
    regexp_start: Arc<dyn Matcher>,
    regexp_end: Option<Arc<dyn Matcher>>,
    replace: MultilineReplaceFn,
    export: Option<ElementExportFn>,
}

impl MultilineElementTransformer {
    pub fn new<M, F>(name: impl Into<String>, regexp_start: M, replace: F) -> Self
    where
        M: Matcher + 'static,
        F: Fn(
                &mut ElementNode,
                &MatchResult,
                Option<&MatchResult>,
                &[String],
                &LineImporter<'_>,
            ) -> Result<Outcome, ConversionError>
            + Send
            + Sync
            + 'static,
    {
        MultilineElementTransformer {
            name: name.into(),
            dependencies: Vec::new(),
            regexp_start: Arc::new(regexp_start),
            regexp_end: None,
            replace: Arc::new(replace),
            export: None,
        }
    }

    /// Without an end pattern the rule is self-terminating on its start line
    pub fn with_end<M: Matcher + 'static>(mut self, regexp_end: M) -> Self {
        self.regexp_end = Some(Arc::new(regexp_end));
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

    pub fn regexp_start(&self) -> &dyn Matcher {
        self.regexp_start.as_ref()
    }

    pub fn regexp_end(&self) -> Option<&dyn Matcher> {
        self.regexp_end.as_deref()
    }

    pub fn replace(
        &self,
        parent: &mut ElementNode,
        start: &MatchResult,
        end: Option<&MatchResult>,
        lines: &[String],
        importer: &LineImporter<'_>,
    ) -> Result<Outcome, ConversionError> {
        (self.replace)(parent, start, end, lines, importer)
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

impl fmt::Debug for MultilineElementTransformer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultilineElementTransformer")
            .field("name", &self.name)
            .field("dependencies", &self.dependencies)
            .field("regexp_start", &self.regexp_start)
            .field("regexp_end", &self.regexp_end)
            .field("has_export", &self.export.is_some())
            .finish()
    }
}
