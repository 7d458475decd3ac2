//! Markdown format tests
//!
//! Tests for bidirectional Markdown ↔ document tree conversion.

mod custom;
mod export;
mod import;
mod roundtrip;
