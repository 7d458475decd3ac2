//! Markdown format implementation
//!
//! This module implements bidirectional conversion between the document tree and markdown
//! text. Nothing here knows about headings or bold text: every construct comes from the
//! ordered [`TransformerSet`] the format is built with, and the pipelines only decide which
//! family of rules gets to look at which piece of text.
//!
//! # Import
//!
//! ```text
//!     Text is split into lines. At each line the pipeline tries, in order:
//!         1. multiline rules whose start pattern matches at the start of the line, with the
//!            body running to the first line their end pattern matches (or to the end of the
//!            line for rules without one),
//!         2. element rules whose pattern matches at the start of the line,
//!         3. a paragraph, merged with the previous one unless `preserve_new_lines` is set.
//!     Text inside blocks goes through the inline importer: escapes, text-format spans and
//!     text-match rules.
//! ```
//!
//! # Export
//!
//! ```text
//!     Blocks are handed to the multiline rules, then the element rules. Inline content is
//!     written with the fewest tag changes between neighbouring runs, and text outside of
//!     code is escaped.
//! ```
//!
//! # Lossy Conversions
//!
//! The following constructs do not survive a round trip unchanged:
//! - Alternative markers (`__bold__`, `+ item`, `***` rules) come back in the first form
//!   the rules export (`**bold**`, `- item`, `---`)
//! - Runs of blank lines collapse to one separator unless `preserve_new_lines` is set
//! - Ordered list numbers are renumbered from the list's start
//! - Node types no rule exports lose their markup and keep only their text
//! - A code run holding both single and double backtick runs gets a ``` fence, which
//!   reads as a code block when it starts a line
//! - Link destinations and titles with line breaks do not come back as links
//!
//! # Typing Shortcuts
//!
//! ```text
//!     See [`shortcuts`] for applying single rules to text as it is being typed.
//! ```

mod inline;
mod parser;
mod serializer;
pub mod shortcuts;

pub use inline::InlineImporter;
pub use parser::{import_markdown, is_empty_paragraph, LineImporter};
pub use serializer::{export_markdown, ExportContext};

use crate::error::FormatError;
use crate::format::{Direction, Format, FormatParams};
use crate::options::ConversionOptions;
use crate::transformers::TransformerSet;
use crate::tree::{Document, NodeSchema};

/// Format implementation for Markdown
#[derive(Debug, Clone)]
pub struct MarkdownFormat {
    transformers: TransformerSet,
    options: ConversionOptions,
    schema: NodeSchema,
}

impl MarkdownFormat {
    pub fn new(transformers: TransformerSet, options: ConversionOptions) -> Self {
        MarkdownFormat {
            transformers,
            options,
            schema: NodeSchema::standard(),
        }
    }

    /// Import into documents configured with `schema` instead of the standard node types
    pub fn with_schema(mut self, schema: NodeSchema) -> Self {
        self.schema = schema;
        self
    }

    pub fn transformers(&self) -> &TransformerSet {
        &self.transformers
    }

    pub fn options(&self) -> &ConversionOptions {
        &self.options
    }

    pub fn schema(&self) -> &NodeSchema {
        &self.schema
    }
}

impl Default for MarkdownFormat {
    fn default() -> Self {
        Self::new(TransformerSet::builtin(), ConversionOptions::default())
    }
}

impl Format for MarkdownFormat {
    fn name(&self) -> &str {
        "markdown"
    }

    fn description(&self) -> &str {
        "Markdown through the configured transformer set"
    }

    fn file_extensions(&self) -> &[&str] {
        &["md", "markdown"]
    }

    fn directions(&self) -> &[Direction] {
        &[Direction::Import, Direction::Export]
    }

    fn parameters(&self) -> &[&str] {
        &["preserve-new-lines"]
    }

    fn import(&self, source: &str) -> Result<Document, FormatError> {
        let mut document = Document::new(self.schema.clone());
        import_markdown(source, &self.transformers, &mut document, &self.options)
            .map_err(|err| FormatError::ParseError(err.to_string()))?;
        Ok(document)
    }

    fn export(&self, doc: &Document, params: &FormatParams) -> Result<String, FormatError> {
        let options = ConversionOptions {
            preserve_new_lines: params
                .flag("preserve-new-lines", self.options.preserve_new_lines)?,
        };
        export_markdown(&self.transformers, doc, &options)
            .map_err(|err| FormatError::SerializationError(err.to_string()))
    }
}
