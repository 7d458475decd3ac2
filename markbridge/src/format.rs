//! Text forms a document can be imported from or exported to
//!
//! A [`Format`] moves documents between the tree and one text form. Markdown does it
//! through its transformer set, json and treeviz render the tree itself. A format lists
//! the [`Direction`]s it offers and the export parameters it reads; the
//! [`crate::registry::FormatRegistry`] checks both before handing work to it.
//!
//! Export parameters arrive as [`FormatParams`], the `--extra-<name> <value>` pairs of
//! the command line. Every value is a string; formats read the ones they declare through
//! typed accessors such as [`FormatParams::flag`].

use crate::error::FormatError;
use crate::tree::Document;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Which way a conversion goes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Text into a document tree
    Import,
    /// A document tree into text
    Export,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Import => f.write_str("import"),
            Direction::Export => f.write_str("export"),
        }
    }
}

/// A text form of documents
///
/// ```ignore
/// struct PlainText;
///
/// impl Format for PlainText {
///     fn name(&self) -> &str {
///         "plain"
///     }
///
///     fn directions(&self) -> &[Direction] {
///         &[Direction::Export]
///     }
///
///     fn export(&self, doc: &Document, _params: &FormatParams) -> Result<String, FormatError> {
///         Ok(doc.root().text_content())
///     }
/// }
/// ```
pub trait Format: Send + Sync {
    /// Name the format is registered and selected by
    fn name(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    /// Extensions without the leading dot, used to detect the format of a file
    fn file_extensions(&self) -> &[&str] {
        &[]
    }

    /// Directions the format implements
    fn directions(&self) -> &[Direction];

    /// Names of the export parameters the format reads
    fn parameters(&self) -> &[&str] {
        &[]
    }

    fn supports(&self, direction: Direction) -> bool {
        self.directions().contains(&direction)
    }

    /// Read `source` into a new document
    fn import(&self, _source: &str) -> Result<Document, FormatError> {
        Err(FormatError::unsupported(self.name(), Direction::Import))
    }

    /// Render `doc`, with `params` overriding the format's configured settings
    fn export(&self, _doc: &Document, _params: &FormatParams) -> Result<String, FormatError> {
        Err(FormatError::unsupported(self.name(), Direction::Export))
    }
}

/// Export parameters given for one conversion
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatParams {
    values: BTreeMap<String, String>,
}

impl FormatParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Read a boolean parameter, accepting `true`/`false`/`1`/`0`/`yes`/`no`
    pub fn flag(&self, key: &str, default: bool) -> Result<bool, FormatError> {
        let Some(value) = self.get(key) else {
            return Ok(default);
        };
        match value.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            _ => Err(FormatError::InvalidParameter {
                key: key.to_string(),
                value: value.to_string(),
            }),
        }
    }

    /// Fail on the first key `format` does not list in [`Format::parameters`]
    pub fn check(&self, format: &dyn Format) -> Result<(), FormatError> {
        match self
            .values
            .keys()
            .find(|key| !format.parameters().contains(&key.as_str()))
        {
            Some(key) => Err(FormatError::UnknownParameter {
                format: format.name().to_string(),
                key: key.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl From<HashMap<String, String>> for FormatParams {
    fn from(values: HashMap<String, String>) -> Self {
        FormatParams {
            values: values.into_iter().collect(),
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormatParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        FormatParams {
            values: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}
