//! Conversion rules between markdown text and the document tree
//!
//! ```text
//!     A transformer is a plain data record describing one construct in both directions.
//!     There are four families, and each family is consulted at a different stage of the
//!     pipelines:
//!
//!     - element: one line, one block (headings, quotes, list items, thematic breaks)
//!     - multiline element: a start line and an end line with verbatim lines in between
//!     - text format: a delimiter pair mapped to character format flags
//!     - text match: a pattern mapped to an inline node (links)
//!
//!     Rules are collected into a [`TransformerSet`], which keeps one ordered list per
//!     family. Within a family the first rule to claim a construct wins, so callers
//!     override built-ins by placing their own rules first (see [`TransformerSet::with_custom`]).
//!
//!     Import callbacks report an [`Outcome`]. Export callbacks return `Ok(None)` when the
//!     rule does not apply, and must not have touched anything when they do.
//! ```

mod element;
mod multiline;
pub mod standard;
mod set;
mod text_format;
mod text_match;

pub use element::{ElementExportFn, ElementReplaceFn, ElementTransformer};
pub use multiline::{MultilineElementTransformer, MultilineReplaceFn};
pub use set::TransformerSet;
pub use text_format::TextFormatTransformer;
pub use text_match::{TextMatchExportFn, TextMatchReplaceFn, TextMatchTransformer};

use std::fmt;

/// Answer of an import callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The construct was converted and the nodes inserted
    Handled,
    /// Recognized, but another rule of the same family should handle it
    Defer,
    /// Not this rule's construct after all (element rules only)
    Declined,
}

/// The four transformer families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransformerKind {
    Element,
    MultilineElement,
    TextFormat,
    TextMatch,
}

impl fmt::Display for TransformerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransformerKind::Element => "element",
            TransformerKind::MultilineElement => "multiline-element",
            TransformerKind::TextFormat => "text-format",
            TransformerKind::TextMatch => "text-match",
        };
        f.write_str(name)
    }
}

/// A conversion rule of any family.
#[derive(Debug, Clone)]
pub enum Transformer {
    Element(ElementTransformer),
    MultilineElement(MultilineElementTransformer),
    TextFormat(TextFormatTransformer),
    TextMatch(TextMatchTransformer),
}

impl Transformer {
    pub fn name(&self) -> &str {
        match self {
            Transformer::Element(t) => t.name(),
            Transformer::MultilineElement(t) => t.name(),
            Transformer::TextFormat(t) => t.name(),
            Transformer::TextMatch(t) => t.name(),
        }
    }

    pub fn kind(&self) -> TransformerKind {
        match self {
            Transformer::Element(_) => TransformerKind::Element,
            Transformer::MultilineElement(_) => TransformerKind::MultilineElement,
            Transformer::TextFormat(_) => TransformerKind::TextFormat,
            Transformer::TextMatch(_) => TransformerKind::TextMatch,
        }
    }

    /// Node types this rule creates, which the document schema must register
    pub fn dependencies(&self) -> &[String] {
        match self {
            Transformer::Element(t) => t.dependencies(),
            Transformer::MultilineElement(t) => t.dependencies(),
            Transformer::TextFormat(_) => &[],
            Transformer::TextMatch(t) => t.dependencies(),
        }
    }
}

impl From<ElementTransformer> for Transformer {
    fn from(t: ElementTransformer) -> Self {
        Transformer::Element(t)
    }
}

impl From<MultilineElementTransformer> for Transformer {
    fn from(t: MultilineElementTransformer) -> Self {
        Transformer::MultilineElement(t)
    }
}

impl From<TextFormatTransformer> for Transformer {
    fn from(t: TextFormatTransformer) -> Self {
        Transformer::TextFormat(t)
    }
}

impl From<TextMatchTransformer> for Transformer {
    fn from(t: TextMatchTransformer) -> Self {
        Transformer::TextMatch(t)
    }
}

pub(crate) fn collect_dependencies<I, S>(dependencies: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    dependencies.into_iter().map(Into::into).collect()
}
