//! Icon mapping for the tree visualization
//!
//! Keyed by node type, so custom node types fall back to the generic icon.

use crate::tree::types;

/// Get the Unicode icon for a given node type
pub fn get_icon(node_type: &str) -> &'static str {
    match node_type {
        types::ROOT => "⧉",
        types::PARAGRAPH => "¶",
        types::HEADING => "§",
        types::QUOTE => "❝",
        types::LIST => "☰",
        types::LIST_ITEM => "•",
        types::CODE => "𝒱",
        types::LINK => "⊕",
        types::HORIZONTAL_RULE => "⎯",
        types::TEXT => "◦",
        types::LINE_BREAK => "↵",
        _ => "○",
    }
}
