//! Pattern matching abstraction used by transformers
//!
//! Transformers hold their patterns as `Arc<dyn Matcher>`. [`regex::Regex`] implements
//! the trait, and custom matchers (hand-written scanners, parsers) can be plugged in
//! as long as they report byte offsets and capture groups the same way.

use regex::Regex;
use std::fmt::Debug;

/// A single match: byte range in the searched text and its capture groups.
///
/// `groups[0]` is the full match; unmatched optional groups are `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    start: usize,
    end: usize,
    groups: Vec<Option<String>>,
}

impl MatchResult {
    pub fn new(start: usize, end: usize, groups: Vec<Option<String>>) -> Self {
        MatchResult { start, end, groups }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn as_str(&self) -> &str {
        self.get(0).unwrap_or("")
    }

    /// Capture group `index`, if it participated in the match
    pub fn get(&self, index: usize) -> Option<&str> {
        self.groups.get(index).and_then(|group| group.as_deref())
    }

    pub fn groups(&self) -> &[Option<String>] {
        &self.groups
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

pub trait Matcher: Debug + Send + Sync {
    /// First match starting at or after byte offset `pos`.
    ///
    /// Anchors such as `^` keep their meaning relative to the whole text.
    fn match_from(&self, text: &str, pos: usize) -> Option<MatchResult>;

    /// A match beginning exactly at `pos`
    fn match_at(&self, text: &str, pos: usize) -> Option<MatchResult> {
        self.match_from(text, pos).filter(|m| m.start() == pos)
    }

    fn match_at_start(&self, text: &str) -> Option<MatchResult> {
        self.match_at(text, 0)
    }

    fn find_in(&self, text: &str) -> Option<MatchResult> {
        self.match_from(text, 0)
    }
}

impl Matcher for Regex {
    fn match_from(&self, text: &str, pos: usize) -> Option<MatchResult> {
        if pos > text.len() || !text.is_char_boundary(pos) {
            return None;
        }
        let captures = self.captures_at(text, pos)?;
        let whole = captures.get(0)?;
        let groups = captures
            .iter()
            .map(|group| group.map(|m| m.as_str().to_string()))
            .collect();
        Some(MatchResult::new(whole.start(), whole.end(), groups))
    }
}
