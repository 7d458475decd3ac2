//! Inline import: text of one line to text runs and inline elements
//!
//! ```text
//!     The scanner walks the text once, left to right. At every position it tries, in
//!     order: a backslash escape, the closing delimiter of the span it is inside, the
//!     text-match rules (anchored at the position), the text-format opening delimiters
//!     (longest first), and finally takes the character literally.
//!
//!     An opening delimiter starts a nested span that must find its closing delimiter
//!     before the end of the text; otherwise the opener is remembered as failed for that
//!     position and the delimiter becomes literal text. Delimiter flanking follows the
//!     usual markdown rules: an opener is followed by a non-space character, a closer is
//!     preceded by one, and tags that may not sit inside words (`_`, `__`) require a
//!     non-alphanumeric character on their outer side.
//!
//!     Code tags made of a single character behave like markdown backtick strings: an
//!     opening run of n characters is closed by the next run of exactly n, and one
//!     space of padding on each side of the content is dropped.
//!
//!     Work per line stays close to linear. The positions where each tag could close
//!     are collected once, so an opener with no closer ahead fails without scanning.
//!     A span that does reach the end of the line marks every position it walked as
//!     dead for its tag: another span of the same tag arriving at one of them would
//!     walk the same path, so it gives up there.
//! ```

use crate::error::ConversionError;
use crate::matcher::MatchResult;
use crate::transformers::{TextFormatTransformer, TextMatchTransformer, TransformerSet};
use crate::tree::{normalize_inline, Node, TextFormat, TextNode};
use log::trace;
use std::collections::{HashMap, HashSet};

/// Deeper openers are taken literally
const MAX_NESTING: usize = 32;

/// Imports inline markdown with the text-format and text-match rules of a set.
///
/// Handed to text-match callbacks so they can import nested content (link labels).
#[derive(Debug, Clone, Copy)]
pub struct InlineImporter<'a> {
    transformers: &'a TransformerSet,
}

impl<'a> InlineImporter<'a> {
    pub fn new(transformers: &'a TransformerSet) -> Self {
        InlineImporter { transformers }
    }

    pub fn transformers(&self) -> &'a TransformerSet {
        self.transformers
    }

    pub fn import(&self, text: &str) -> Result<Vec<Node>, ConversionError> {
        self.import_with_format(text, TextFormat::PLAIN)
    }

    /// Import `text` with `format` applied to every produced run
    pub fn import_with_format(
        &self,
        text: &str,
        format: TextFormat,
    ) -> Result<Vec<Node>, ConversionError> {
        if text.is_empty() {
            return Ok(Vec::new());
        }
        let mut scanner = Scanner::new(*self, text);
        let nodes = scanner
            .parse_span(0, format, None, 0)?
            .map(|(nodes, _)| nodes)
            .unwrap_or_default();
        Ok(normalize_inline(nodes))
    }

    pub fn unescape(&self, text: &str) -> String {
        self.transformers.escaper().unescape(text)
    }
}

struct CachedMatch {
    searched_from: usize,
    found: Option<MatchResult>,
}

struct Closer<'s> {
    /// Text-format index
    index: usize,
    tag: &'s str,
    intraword: bool,
}

impl<'s> Closer<'s> {
    fn of(index: usize, transformer: &'s TextFormatTransformer) -> Self {
        Closer {
            index,
            tag: transformer.close_tag(),
            intraword: transformer.intraword(),
        }
    }
}

type Span = (Vec<Node>, usize);

struct Scanner<'s, 't> {
    importer: InlineImporter<'s>,
    text: &'t str,
    matchers: Vec<&'s TextMatchTransformer>,
    cache: Vec<Option<CachedMatch>>,
    /// (position, text-format index) pairs whose span never closed
    failed: HashSet<(usize, usize)>,
    /// (text-format index, position, nesting allowed) from which a span never closes
    dead: HashSet<(usize, usize, bool)>,
    /// Positions where each text-format tag can close, filled on first use
    closers: Vec<Option<Vec<usize>>>,
    /// Start positions of maximal runs of a code fence character, by run length
    runs: HashMap<char, HashMap<usize, Vec<usize>>>,
}

impl<'s, 't> Scanner<'s, 't> {
    fn new(importer: InlineImporter<'s>, text: &'t str) -> Self {
        let matchers: Vec<&'s TextMatchTransformer> = importer
            .transformers()
            .text_match()
            .iter()
            .filter(|t| t.import_regexp().is_some() && t.is_triggered_by(text))
            .collect();
        let cache = matchers.iter().map(|_| None).collect();
        let closers = importer
            .transformers()
            .text_format()
            .iter()
            .map(|_| None)
            .collect();
        Scanner {
            importer,
            text,
            matchers,
            cache,
            failed: HashSet::new(),
            dead: HashSet::new(),
            closers,
            runs: HashMap::new(),
        }
    }

    /// Parse from `start` until `closer` (or the end of the text when there is none).
    ///
    /// Returns the nodes and the position after the closing delimiter, or `None` when
    /// the closer was never found.
    fn parse_span(
        &mut self,
        start: usize,
        format: TextFormat,
        closer: Option<Closer<'s>>,
        depth: usize,
    ) -> Result<Option<Span>, ConversionError> {
        let text = self.text;
        let nesting = depth < MAX_NESTING;
        let mut nodes = Vec::new();
        let mut literal = String::new();
        let mut walked = Vec::new();
        let mut pos = start;

        while pos < text.len() {
            let rest = &text[pos..];

            if let Some(escaped) = rest.strip_prefix('\\').and_then(|r| r.chars().next()) {
                if self.importer.transformers().escaper().is_escape(&text[..pos], escaped) {
                    literal.push(escaped);
                    pos += 1 + escaped.len_utf8();
                    continue;
                }
            }

            if let Some(closer) = &closer {
                if pos > start && rest.starts_with(closer.tag) && self.can_close(pos, closer) {
                    flush(&mut nodes, &mut literal, format);
                    return Ok(Some((nodes, pos + closer.tag.len())));
                }
                if self.dead.contains(&(closer.index, pos, nesting)) {
                    break;
                }
                walked.push(pos);
            }

            if let Some((replacement, end)) = self.try_text_match(pos, format)? {
                flush(&mut nodes, &mut literal, format);
                nodes.extend(replacement);
                pos = end;
                continue;
            }

            if nesting {
                if let Some((inner, end)) = self.try_open(pos, format, depth)? {
                    flush(&mut nodes, &mut literal, format);
                    nodes.extend(inner);
                    pos = end;
                    continue;
                }
            }

            let Some(c) = rest.chars().next() else {
                break;
            };
            literal.push(c);
            pos += c.len_utf8();
        }

        if let Some(closer) = &closer {
            self.dead
                .extend(walked.into_iter().map(|walked| (closer.index, walked, nesting)));
            return Ok(None);
        }
        flush(&mut nodes, &mut literal, format);
        Ok(Some((nodes, pos)))
    }

    fn try_text_match(
        &mut self,
        pos: usize,
        format: TextFormat,
    ) -> Result<Option<Span>, ConversionError> {
        for index in 0..self.matchers.len() {
            let Some(found) = self.match_at(index, pos) else {
                continue;
            };
            if found.end() <= pos {
                continue;
            }
            let transformer = self.matchers[index];
            let matched = self.importer.unescape(&self.text[found.start()..found.end()]);
            let node = TextNode::with_format(matched, format);
            if let Some(replacement) = transformer.replace(node, &found, &self.importer)? {
                trace!("text match '{}' at {pos}", transformer.name());
                return Ok(Some((replacement, found.end())));
            }
        }
        Ok(None)
    }

    /// Match of text-match rule `index` starting exactly at `pos`.
    ///
    /// The first match at or after a position is cached; it stays valid for any later
    /// position up to its start.
    fn match_at(&mut self, index: usize, pos: usize) -> Option<MatchResult> {
        let valid = self.cache[index].as_ref().is_some_and(|cached| {
            cached.searched_from <= pos && cached.found.as_ref().map_or(true, |m| m.start() >= pos)
        });
        if !valid {
            let regexp = self.matchers[index].import_regexp()?;
            let found = regexp.match_from(self.text, pos);
            self.cache[index] = Some(CachedMatch {
                searched_from: pos,
                found,
            });
        }
        self.cache[index]
            .as_ref()
            .and_then(|cached| cached.found.as_ref())
            .filter(|m| m.start() == pos)
            .cloned()
    }

    fn try_open(
        &mut self,
        pos: usize,
        format: TextFormat,
        depth: usize,
    ) -> Result<Option<Span>, ConversionError> {
        let text = self.text;
        let rest = &text[pos..];
        let transformers = self.importer.transformers();
        for (index, transformer) in transformers.import_formats() {
            let open = transformer.open_tag();
            if open.is_empty() || !rest.starts_with(open) || self.failed.contains(&(pos, index)) {
                continue;
            }
            let inner_start = pos + open.len();
            let span = if transformer.is_code() {
                self.code_span(pos, transformer).map(|(content, end)| {
                    (vec![Node::formatted(content, format | transformer.format())], end)
                })
            } else if self.can_open(pos, transformer) && self.closes_after(index, inner_start) {
                let closer = Closer::of(index, transformer);
                self.parse_span(inner_start, format | transformer.format(), Some(closer), depth + 1)?
            } else {
                None
            };
            match span {
                Some(span) => {
                    trace!("format '{}' at {pos}", transformer.name());
                    return Ok(Some(span));
                }
                None => {
                    self.failed.insert((pos, index));
                }
            }
        }
        Ok(None)
    }

    /// Whether text-format `index` can close anywhere after `inner_start`
    fn closes_after(&mut self, index: usize, inner_start: usize) -> bool {
        if self.closers[index].is_none() {
            let transformer = &self.importer.transformers().text_format()[index];
            let closer = Closer::of(index, transformer);
            let positions = self
                .text
                .char_indices()
                .map(|(pos, _)| pos)
                .filter(|&pos| self.text[pos..].starts_with(closer.tag) && self.can_close(pos, &closer))
                .collect();
            self.closers[index] = Some(positions);
        }
        self.closers[index]
            .as_ref()
            .is_some_and(|positions| positions.partition_point(|&pos| pos <= inner_start) < positions.len())
    }

    /// Code spans take everything up to their closing tag verbatim
    fn code_span(&mut self, pos: usize, transformer: &TextFormatTransformer) -> Option<(String, usize)> {
        let (open, close) = (transformer.open_tag(), transformer.close_tag());
        if let Some(fence) = fence_char(open, close) {
            return self.fenced_code_span(pos, fence);
        }
        if close.is_empty() {
            return None;
        }
        let inner_start = pos + open.len();
        let offset = self.text[inner_start..].find(close)?;
        if offset == 0 {
            return None;
        }
        let end = inner_start + offset;
        Some((self.text[inner_start..end].to_string(), end + close.len()))
    }

    fn fenced_code_span(&mut self, pos: usize, fence: char) -> Option<(String, usize)> {
        let text = self.text;
        if continues_run(&text[..pos], fence) {
            return None;
        }
        let width = text[pos..].chars().take_while(|&c| c == fence).count();
        let inner_start = pos + width * fence.len_utf8();
        let starts = self
            .runs
            .entry(fence)
            .or_insert_with(|| fence_runs(text, fence))
            .get(&width)?;
        let close = *starts.get(starts.partition_point(|&start| start < inner_start))?;
        let content = &text[inner_start..close];
        if content.is_empty() {
            return None;
        }
        Some((strip_padding(content).to_string(), close + width * fence.len_utf8()))
    }

    fn can_open(&self, pos: usize, transformer: &TextFormatTransformer) -> bool {
        let after = self.text[pos + transformer.open_tag().len()..].chars().next();
        if !after.is_some_and(|c| !c.is_whitespace()) {
            return false;
        }
        if !transformer.intraword() {
            let before = self.text[..pos].chars().next_back();
            if before.is_some_and(char::is_alphanumeric) {
                return false;
            }
        }
        true
    }

    fn can_close(&self, pos: usize, closer: &Closer<'_>) -> bool {
        let before = self.text[..pos].chars().next_back();
        if !before.is_some_and(|c| !c.is_whitespace()) {
            return false;
        }
        if !closer.intraword {
            let after = self.text[pos + closer.tag.len()..].chars().next();
            if after.is_some_and(char::is_alphanumeric) {
                return false;
            }
        }
        true
    }
}

fn flush(nodes: &mut Vec<Node>, literal: &mut String, format: TextFormat) {
    if !literal.is_empty() {
        nodes.push(Node::formatted(std::mem::take(literal), format));
    }
}

/// The fence character of a code tag written as one repeatable character
pub(crate) fn fence_char(open: &str, close: &str) -> Option<char> {
    let mut chars = open.chars();
    match (chars.next(), chars.next()) {
        (Some(fence), None) if open == close => Some(fence),
        _ => None,
    }
}

/// Whether `before` ends with an unescaped `fence`, making the next one part of its run
fn continues_run(before: &str, fence: char) -> bool {
    let Some(before) = before.strip_suffix(fence) else {
        return false;
    };
    let backslashes = before.len() - before.trim_end_matches('\\').len();
    backslashes % 2 == 0
}

fn fence_runs(text: &str, fence: char) -> HashMap<usize, Vec<usize>> {
    let mut runs: HashMap<usize, Vec<usize>> = HashMap::new();
    let mut chars = text.char_indices().peekable();
    while let Some((start, c)) = chars.next() {
        if c != fence {
            continue;
        }
        let mut width = 1;
        while chars.next_if(|&(_, next)| next == fence).is_some() {
            width += 1;
        }
        runs.entry(width).or_default().push(start);
    }
    runs
}

/// Drop one space on each side when both are there and the content is not all spaces
fn strip_padding(content: &str) -> &str {
    let padded = content.len() > 2
        && content.starts_with(' ')
        && content.ends_with(' ')
        && !content.trim().is_empty();
    if padded {
        &content[1..content.len() - 1]
    } else {
        content
    }
}
