//! Bidirectional conversion between rich document trees and markdown
//!
//! ```text
//!     This crate converts markdown text into a document tree (the node model an editor
//!     works on) and back. It does not hard-code any markdown construct: headings, lists,
//!     bold text and links are all transformers, small data records describing one
//!     construct in both directions, and a conversion is only as rich as the set of
//!     transformers it is given.
//!
//!     This is a pure lib, that is, it powers markbridge-cli but is shell agnostic: no code
//!     should be written that supposes a shell environment, be it to std print, env vars etc.
//!
//!     The file structure :
//!     .
//!     ├── error.rs
//!     ├── escape.rs               # Backslash escaping, derived from the active tags
//!     ├── matcher.rs              # Matcher trait, implemented by regex::Regex
//!     ├── options.rs              # ConversionOptions and Extensions
//!     ├── tree                    # Document, nodes, node schema
//!     ├── transformers            # The four families, the ordered set, built-in rules
//!     ├── format.rs               # Format trait, directions and export parameters
//!     ├── registry.rs             # FormatRegistry: lookup, extension index, convert
//!     ├── formats
//!     │   ├── markdown
//!     │   │   ├── parser.rs       # Line level import
//!     │   │   ├── inline.rs       # Inline import
//!     │   │   ├── serializer.rs   # Export
//!     │   │   ├── shortcuts.rs    # Single rules applied while typing
//!     │   │   └── mod.rs
//!     │   ├── json.rs             # serde dump of the tree
//!     │   └── treeviz             # Visual tree for inspection
//!     └── lib.rs
//! ```
//!
//! Testing
//! ```text
//!     tests
//!     └── markdown
//!         ├── import.rs
//!         ├── export.rs
//!         ├── roundtrip.rs
//!         └── custom.rs
//!
//!     Note that rust does not by default discover tests in subdirectories, so we need to include these
//!     in the mod.
//! ```
//!
//! Core Algorithms
//!
//! ```text
//!     Import walks the text line by line. Multiline rules get the first look at a line,
//!     then element rules, and whatever no rule claims becomes paragraph text. Inline
//!     text is scanned left to right for escapes, format delimiters and text-match
//!     patterns. Export walks the tree, asking the same rules to render each block, and
//!     writes inline runs with the fewest format tag changes.
//!
//!     A rule can answer [`transformers::Outcome::Defer`] to let the next rule of its
//!     family try, which is how several rules share one opening pattern.
//! ```
//!
//! Formats
//!
//! ```text
//!     Markdown, json and treeviz implement the Format trait, each declaring the
//!     directions it supports and the export parameters it reads. The registry owns the
//!     markdown transformer set and options, maps file extensions to formats and runs
//!     conversions between any two of them. See [`format::Format`] and
//!     [`registry::FormatRegistry`].
//! ```

pub mod error;
pub mod escape;
pub mod format;
pub mod formats;
pub mod matcher;
pub mod options;
pub mod registry;
pub mod transformers;
pub mod tree;

pub use error::{ConversionError, FormatError, TreeError};
pub use escape::Escaper;
pub use format::{Direction, Format, FormatParams};
pub use formats::markdown::{export_markdown, import_markdown};
pub use matcher::{MatchResult, Matcher};
pub use options::{ConversionOptions, Extensions};
pub use registry::FormatRegistry;
pub use transformers::{Outcome, Transformer, TransformerSet};
pub use tree::{Document, ElementNode, Node, NodeSchema, TextFormat, TextNode};

/// Replace the content of `document` with the blocks parsed from `markdown`.
///
/// Uses the built-in rules with `custom` rules ahead of them, so a custom rule wins over
/// a built-in one claiming the same construct.
pub fn convert_from_markdown(
    markdown: &str,
    custom: impl IntoIterator<Item = Transformer>,
    document: &mut Document,
    options: &ConversionOptions,
) -> Result<(), ConversionError> {
    let transformers = TransformerSet::with_custom(custom);
    import_markdown(markdown, &transformers, document, options)
}

/// Render `document` as markdown with the built-in rules and `custom` rules ahead of them.
pub fn convert_to_markdown(
    document: &Document,
    custom: impl IntoIterator<Item = Transformer>,
    options: &ConversionOptions,
) -> Result<String, ConversionError> {
    let transformers = TransformerSet::with_custom(custom);
    export_markdown(&transformers, document, options)
}
