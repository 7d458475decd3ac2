//! Conversion options and optional rule groups

use serde::{Deserialize, Serialize};

/// Per-call options shared by import and export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionOptions {
    /// Keep every source line as its own block instead of merging soft-wrapped lines
    /// into paragraphs. Blank lines become empty paragraphs and export joins blocks
    /// with a single newline.
    pub preserve_new_lines: bool,
}

impl ConversionOptions {
    pub fn preserving_new_lines() -> Self {
        ConversionOptions {
            preserve_new_lines: true,
        }
    }
}

/// Built-in rules that can be switched off when building the standard set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Extensions {
    /// `==highlight==`
    pub highlight: bool,
    /// `~~strikethrough~~`
    pub strikethrough: bool,
    /// `- [ ]` / `- [x]` list items
    pub check_lists: bool,
    /// `---`, `***` and `___` thematic breaks
    pub horizontal_rule: bool,
}

impl Default for Extensions {
    fn default() -> Self {
        Extensions {
            highlight: true,
            strikethrough: true,
            check_lists: true,
            horizontal_rule: true,
        }
    }
}
