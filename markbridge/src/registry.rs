//! Registry of the formats a conversion can go through
//!
//! Formats are kept in registration order and looked up by name, or by file extension
//! when the caller only has a path. Each extension belongs to one format, compared
//! without regard to case:
//!
//! ```text
//!     - registering a format that claims an extension another format holds fails with
//!       [`FormatError::ExtensionConflict`] and leaves the registry unchanged,
//!     - registering under a name already present replaces that format in place and
//!       releases the extensions it held.
//! ```
//!
//! [`FormatRegistry::standard`] builds the usual set: markdown driven by the given
//! transformers and options, then json and treeviz. [`FormatRegistry::convert`] checks
//! both ends of a conversion before any text is read, so a bad target or parameter
//! fails without doing the import.

use crate::error::FormatError;
use crate::format::{Direction, Format, FormatParams};
use crate::formats::{JsonFormat, MarkdownFormat, TreevizFormat};
use crate::options::ConversionOptions;
use crate::transformers::TransformerSet;
use crate::tree::Document;
use log::{debug, warn};
use std::collections::HashMap;
use std::path::Path;

/// Formats by name, with an index of the file extensions they claim
pub struct FormatRegistry {
    formats: Vec<Box<dyn Format>>,
    extensions: HashMap<String, String>,
}

impl FormatRegistry {
    /// A registry without formats
    pub fn new() -> Self {
        FormatRegistry {
            formats: Vec::new(),
            extensions: HashMap::new(),
        }
    }

    /// Markdown through `transformers` and `options`, plus json and treeviz with their
    /// default settings
    pub fn standard(transformers: TransformerSet, options: ConversionOptions) -> Self {
        let mut registry = FormatRegistry::new();
        let formats: [Box<dyn Format>; 3] = [
            Box::new(MarkdownFormat::new(transformers, options)),
            Box::new(JsonFormat::default()),
            Box::new(TreevizFormat::default()),
        ];
        for format in formats {
            if let Err(err) = registry.insert(format) {
                warn!("Skipping format: {err}");
            }
        }
        registry
    }

    /// Add `format`, replacing a registered format of the same name
    pub fn register(&mut self, format: impl Format + 'static) -> Result<(), FormatError> {
        self.insert(Box::new(format))
    }

    fn insert(&mut self, format: Box<dyn Format>) -> Result<(), FormatError> {
        let name = format.name().to_string();
        let claimed: Vec<String> = format
            .file_extensions()
            .iter()
            .map(|extension| extension.to_ascii_lowercase())
            .collect();

        for extension in &claimed {
            if let Some(owner) = self.extensions.get(extension) {
                if *owner != name {
                    return Err(FormatError::ExtensionConflict {
                        extension: extension.clone(),
                        registered: owner.clone(),
                        rejected: name,
                    });
                }
            }
        }

        self.extensions.retain(|_, owner| *owner != name);
        for extension in claimed {
            self.extensions.insert(extension, name.clone());
        }
        match self.formats.iter().position(|known| known.name() == name) {
            Some(index) => {
                debug!("Replacing format '{name}'");
                self.formats[index] = format;
            }
            None => self.formats.push(format),
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&dyn Format, FormatError> {
        self.formats
            .iter()
            .find(|format| format.name() == name)
            .map(|format| format.as_ref())
            .ok_or_else(|| FormatError::FormatNotFound(name.to_string()))
    }

    /// Registered format names, in registration order
    pub fn names(&self) -> Vec<&str> {
        self.formats.iter().map(|format| format.name()).collect()
    }

    pub fn formats(&self) -> impl Iterator<Item = &dyn Format> {
        self.formats.iter().map(|format| format.as_ref())
    }

    /// The format claiming the extension of `path`, if any
    pub fn detect(&self, path: impl AsRef<Path>) -> Option<&dyn Format> {
        let extension = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        let name = self.extensions.get(&extension)?;
        self.get(name).ok()
    }

    /// Read `source` with the format called `name`
    pub fn import(&self, source: &str, name: &str) -> Result<Document, FormatError> {
        let format = self.get(name)?;
        if !format.supports(Direction::Import) {
            return Err(FormatError::unsupported(name, Direction::Import));
        }
        format.import(source)
    }

    /// Render `doc` with the format called `name`, rejecting parameters it does not read
    pub fn export(
        &self,
        doc: &Document,
        name: &str,
        params: &FormatParams,
    ) -> Result<String, FormatError> {
        let format = self.exporter(name, params)?;
        format.export(doc, params)
    }

    /// Import `source` as `from` and export the document as `to`
    pub fn convert(
        &self,
        source: &str,
        from: &str,
        to: &str,
        params: &FormatParams,
    ) -> Result<String, FormatError> {
        let target = self.exporter(to, params)?;
        debug!("Converting {} bytes from {from} to {to}", source.len());
        let doc = self.import(source, from)?;
        target.export(&doc, params)
    }

    fn exporter(&self, name: &str, params: &FormatParams) -> Result<&dyn Format, FormatError> {
        let format = self.get(name)?;
        if !format.supports(Direction::Export) {
            return Err(FormatError::unsupported(name, Direction::Export));
        }
        params.check(format)?;
        Ok(format)
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::standard(TransformerSet::builtin(), ConversionOptions::default())
    }
}
