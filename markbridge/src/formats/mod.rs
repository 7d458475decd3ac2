//! Format implementations
//!
//! This module contains the format implementations that convert between the document
//! tree and text representations. Markdown is the only format driven by transformers;
//! json and treeviz are views of the tree itself.

pub mod icons;
pub mod json;
pub mod markdown;
pub mod treeviz;

pub use json::JsonFormat;
pub use markdown::MarkdownFormat;
pub use treeviz::TreevizFormat;
