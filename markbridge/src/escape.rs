//! Backslash escaping of markdown-significant characters.
//!
//! The set of significant characters is not fixed: it is the core set (`\`, `[`, `]`)
//! plus the first character of every text-format tag the active transformers use, so
//! a registry with a `==` highlight format escapes `=` and one without it does not.
//!
//! [`Escaper::unescape`] is a left inverse of [`Escaper::escape`]: a backslash is
//! escaped only when the character after it would otherwise be consumed as an
//! escape (or ends the text), so `unescape(escape(s)) == s` for any `s` and `a\-b`
//! stays as written.
//!
//! Block markers (`#`, `>`, `-`, `+` and the `.` of `1.`) are only significant as the
//! first thing on a line, so they are escaped there and nowhere else:
//! [`Escaper::escape_line_start`] writes them and [`Escaper::is_escape`] reads them.

use std::collections::BTreeSet;

/// Characters escaped regardless of the registered transformers
pub const CORE_ESCAPABLE: [char; 3] = ['\\', '[', ']'];

/// Characters that start a block when they open a line
pub const LINE_START_MARKERS: [char; 4] = ['#', '>', '-', '+'];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Escaper {
    chars: BTreeSet<char>,
}

impl Escaper {
    /// Build an escaper for the core set plus the leading characters of `tags`
    pub fn new<'a>(tags: impl IntoIterator<Item = &'a str>) -> Self {
        let mut chars: BTreeSet<char> = CORE_ESCAPABLE.into_iter().collect();
        chars.extend(tags.into_iter().filter_map(|tag| tag.chars().next()));
        Escaper { chars }
    }

    pub fn is_escapable(&self, c: char) -> bool {
        self.chars.contains(&c)
    }

    pub fn chars(&self) -> impl Iterator<Item = char> + '_ {
        self.chars.iter().copied()
    }

    /// Backslash every significant character.
    ///
    /// A backslash is itself escaped only when it ends the text or is followed by
    /// an escapable character (another backslash included). Before anything else it
    /// is kept bare since [`Escaper::unescape`] leaves it alone.
    pub fn escape(&self, text: &str) -> String {
        let mut result = String::with_capacity(text.len() + text.len() / 8);
        let mut chars = text.chars().peekable();
        while let Some(c) = chars.next() {
            let needs_escape = if c == '\\' {
                chars.peek().map_or(true, |&next| self.is_escapable(next))
            } else {
                self.is_escapable(c)
            };
            if needs_escape {
                result.push('\\');
            }
            result.push(c);
        }
        result
    }

    /// Like [`Escaper::escape`], for text that opens a line.
    ///
    /// A leading block marker gets a backslash, as does the `.` after a leading number
    /// when whitespace or the end of the text follows it. A backslash already sitting
    /// in front of such a marker is doubled so it does not read as an escape.
    pub fn escape_line_start(&self, text: &str) -> String {
        let digits = text.len() - text.trim_start_matches(|c: char| c.is_ascii_digit()).len();
        let (number, rest) = text.split_at(digits);
        let is_marker = |c: char| {
            if digits > 0 {
                c == '.'
            } else {
                LINE_START_MARKERS.contains(&c)
            }
        };
        let mut chars = rest.chars();
        let first = chars.next();
        let second = chars.next();

        let mut result = self.escape(number);
        match first {
            Some(c) if is_marker(c) && (digits == 0 || second.map_or(true, char::is_whitespace)) => {
                result.push('\\');
                result.push(c);
                result.push_str(&self.escape(&rest[c.len_utf8()..]));
            }
            Some('\\') if second.is_some_and(is_marker) => {
                result.push_str("\\\\");
                result.push_str(&self.escape(&rest[1..]));
            }
            _ => result.push_str(&self.escape(rest)),
        }
        result
    }

    /// Whether a backslash followed by `c` is an escape.
    ///
    /// `line_before` is the text of the line in front of the backslash; block markers
    /// are only escapes when it is blank (or, for `.`, a number).
    pub fn is_escape(&self, line_before: &str, c: char) -> bool {
        if self.is_escapable(c) {
            return true;
        }
        let indented = line_before.trim_start();
        if LINE_START_MARKERS.contains(&c) {
            return indented.is_empty();
        }
        c == '.' && !indented.is_empty() && indented.chars().all(|d| d.is_ascii_digit())
    }

    /// Drop the backslash in front of every escapable character.
    ///
    /// A backslash before any other character is kept as written.
    pub fn unescape(&self, text: &str) -> String {
        let mut result = String::with_capacity(text.len());
        let mut chars = text.chars().peekable();
        while let Some(c) = chars.next() {
            if c == '\\' {
                if let Some(&next) = chars.peek() {
                    if self.is_escapable(next) {
                        result.push(next);
                        chars.next();
                        continue;
                    }
                }
            }
            result.push(c);
        }
        result
    }
}

impl Default for Escaper {
    fn default() -> Self {
        Escaper::new(std::iter::empty())
    }
}
