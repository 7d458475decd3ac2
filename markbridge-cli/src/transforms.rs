//! Inspect views
//!
//! Each view imports a markdown source and renders the resulting document tree in a form
//! meant for reading, not for round-tripping:
//!
//! - `treeviz`: Tree visualization with Unicode icons (default)
//! - `json`: The serde dump of the tree
//!
//! Views are formats of the registry, so the markdown rules and the view settings come
//! from the same configuration as `convert`.
//!
//! ## Extra Parameters
//!
//! Views accept the parameters of the format that renders them via `--extra-<name> [value]`:
//!
//! - `show-formats` (treeviz): append the text formats to each run
//! - `pretty` (json): indent the output
//!
//! Example: `markbridge inspect notes.md json --extra-pretty false`

use markbridge::{FormatParams, FormatRegistry};

/// All available inspect views
pub const AVAILABLE_TRANSFORMS: &[&str] = &["treeviz", "json"];

/// Import `source` as markdown and render it with the named view
pub fn execute_transform(
    source: &str,
    transform_name: &str,
    registry: &FormatRegistry,
    extra_params: &FormatParams,
) -> Result<String, String> {
    if !AVAILABLE_TRANSFORMS.contains(&transform_name) {
        return Err(format!("Unknown transform: {transform_name}"));
    }
    registry
        .convert(source, "markdown", transform_name, extra_params)
        .map_err(|e| format!("Transform failed: {e}"))
}
