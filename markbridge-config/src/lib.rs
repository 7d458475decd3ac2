//! Shared configuration loader for the markbridge toolchain.
//!
//! `defaults/markbridge.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on top
//! of those defaults via [`Loader`] before deserializing into [`MarkbridgeConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use markbridge::formats::{JsonFormat, TreevizFormat};
use markbridge::{ConversionOptions, Extensions};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/markbridge.default.toml");

/// Top-level configuration consumed by markbridge applications.
#[derive(Debug, Clone, Deserialize)]
pub struct MarkbridgeConfig {
    pub markdown: MarkdownConfig,
    pub inspect: InspectConfig,
    pub convert: ConvertConfig,
}

/// Markdown import and export behavior.
#[derive(Debug, Clone, Deserialize)]
pub struct MarkdownConfig {
    pub preserve_new_lines: bool,
    pub extensions: ExtensionsConfig,
}

/// Which optional built-in rules are active.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ExtensionsConfig {
    pub highlight: bool,
    pub strikethrough: bool,
    pub check_lists: bool,
    pub horizontal_rule: bool,
}

impl From<&MarkdownConfig> for ConversionOptions {
    fn from(config: &MarkdownConfig) -> Self {
        ConversionOptions {
            preserve_new_lines: config.preserve_new_lines,
        }
    }
}

impl From<ExtensionsConfig> for Extensions {
    fn from(config: ExtensionsConfig) -> Self {
        Extensions {
            highlight: config.highlight,
            strikethrough: config.strikethrough,
            check_lists: config.check_lists,
            horizontal_rule: config.horizontal_rule,
        }
    }
}

/// Controls inspect output.
#[derive(Debug, Clone, Deserialize)]
pub struct InspectConfig {
    pub treeviz: TreevizConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TreevizConfig {
    pub show_formats: bool,
}

impl From<&TreevizConfig> for TreevizFormat {
    fn from(config: &TreevizConfig) -> Self {
        TreevizFormat::new(config.show_formats)
    }
}

/// Format-specific conversion knobs.
#[derive(Debug, Clone, Deserialize)]
pub struct ConvertConfig {
    pub json: JsonConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JsonConfig {
    pub pretty: bool,
}

impl From<&JsonConfig> for JsonFormat {
    fn from(config: &JsonConfig) -> Self {
        JsonFormat::new(config.pretty)
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<MarkbridgeConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<MarkbridgeConfig, ConfigError> {
    Loader::new().build()
}
