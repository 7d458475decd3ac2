//! Markdown import: text to document tree
//!
//! ```text
//!     The text is split into lines and each line is offered to the rule families in
//!     a fixed order:
//!
//!     1. multiline element rules, whose start pattern must match at the line start;
//!     2. element rules, whose pattern must match at the line start;
//!     3. the paragraph fallback.
//!
//!     A multiline rule therefore always outranks an element rule on the same line,
//!     whatever the order the two were registered in.
//!
//!     A multiline start without an end before the end of input is not a block: the
//!     rule is skipped and the line continues down the list. The same happens when
//!     a rule answers [`Outcome::Defer`], so a later multiline rule (or, failing that,
//!     the element rules) sees the exact same span.
//! ```

use super::inline::InlineImporter;
use crate::error::ConversionError;
use crate::matcher::MatchResult;
use crate::options::ConversionOptions;
use crate::transformers::{MultilineElementTransformer, Outcome, TransformerSet};
use crate::tree::{Document, ElementKind, ElementNode, Node};
use log::{debug, trace};

/// Imports lines of markdown into a container element.
///
/// Handed to multiline callbacks so they can import the lines they enclose as
/// nested blocks.
#[derive(Debug, Clone, Copy)]
pub struct LineImporter<'a> {
    transformers: &'a TransformerSet,
    options: &'a ConversionOptions,
}

impl<'a> LineImporter<'a> {
    pub fn new(transformers: &'a TransformerSet, options: &'a ConversionOptions) -> Self {
        LineImporter {
            transformers,
            options,
        }
    }

    pub fn transformers(&self) -> &'a TransformerSet {
        self.transformers
    }

    pub fn options(&self) -> &'a ConversionOptions {
        self.options
    }

    pub fn inline(&self) -> InlineImporter<'a> {
        InlineImporter::new(self.transformers)
    }

    pub fn import_inline(&self, text: &str) -> Result<Vec<Node>, ConversionError> {
        self.inline().import(text)
    }

    /// Import `lines` as blocks appended to `container`
    pub fn import_lines(
        &self,
        lines: &[String],
        container: &mut ElementNode,
    ) -> Result<(), ConversionError> {
        let mut index = 0;
        while index < lines.len() {
            if let Some(next) = self.import_multiline(lines, index, container)? {
                index = next;
                continue;
            }
            self.import_line(&lines[index], container)?;
            index += 1;
        }
        if !self.options.preserve_new_lines {
            container.retain(|node| !is_empty_paragraph(node));
        }
        Ok(())
    }

    /// Try the multiline rules on the line at `index`; returns the index after the span
    fn import_multiline(
        &self,
        lines: &[String],
        index: usize,
        container: &mut ElementNode,
    ) -> Result<Option<usize>, ConversionError> {
        for transformer in self.transformers.multiline() {
            let Some(start) = transformer.regexp_start().match_at_start(&lines[index]) else {
                continue;
            };
            let Some(span) = find_span(transformer, lines, index, start) else {
                trace!("'{}' start on line {index} is never closed", transformer.name());
                continue;
            };
            let outcome = transformer.replace(
                container,
                &span.start,
                span.end.as_ref(),
                &span.lines,
                self,
            )?;
            match outcome {
                Outcome::Handled => {
                    trace!(
                        "'{}' handled lines {index}..={}",
                        transformer.name(),
                        span.last_line
                    );
                    return Ok(Some(span.last_line + 1));
                }
                Outcome::Defer => {
                    trace!("'{}' deferred line {index}", transformer.name());
                }
                Outcome::Declined => {
                    return Err(ConversionError::UnexpectedOutcome {
                        transformer: transformer.name().to_string(),
                        outcome,
                    });
                }
            }
        }
        Ok(None)
    }

    fn import_line(&self, line: &str, container: &mut ElementNode) -> Result<(), ConversionError> {
        for transformer in self.transformers.element() {
            let Some(matched) = transformer.regexp().match_at_start(line) else {
                continue;
            };
            let children = self.import_inline(&line[matched.end()..])?;
            match transformer.replace(container, children, &matched, true)? {
                Outcome::Handled => return Ok(()),
                outcome => trace!("'{}' answered {outcome:?}", transformer.name()),
            }
        }

        let children = self.import_inline(line)?;
        if !self.options.preserve_new_lines && !line.trim().is_empty() {
            if let Some(target) = merge_target(container) {
                target.append(Node::LineBreak)?;
                target.append_all(children)?;
                return Ok(());
            }
        }
        let mut paragraph = ElementNode::paragraph();
        paragraph.append_all(children)?;
        container.append(paragraph.into())?;
        Ok(())
    }
}

struct Span {
    start: MatchResult,
    end: Option<MatchResult>,
    lines: Vec<String>,
    last_line: usize,
}

/// Locate the end of a multiline block starting on line `index`.
///
/// The end pattern is searched on the start line after the start match first, then
/// anywhere in each following line.
fn find_span(
    transformer: &MultilineElementTransformer,
    lines: &[String],
    index: usize,
    start: MatchResult,
) -> Option<Span> {
    let Some(regexp_end) = transformer.regexp_end() else {
        return Some(Span {
            start,
            end: None,
            lines: Vec::new(),
            last_line: index,
        });
    };
    let first = &lines[index];
    let rest = &first[start.end()..];
    if let Some(end) = regexp_end.match_from(first, start.end()) {
        let between = first[start.end()..end.start()].to_string();
        return Some(Span {
            start,
            end: Some(end),
            lines: vec![between],
            last_line: index,
        });
    }
    for (offset, line) in lines[index + 1..].iter().enumerate() {
        let Some(end) = regexp_end.find_in(line) else {
            continue;
        };
        let last_line = index + 1 + offset;
        let mut between = Vec::with_capacity(offset + 2);
        between.push(rest.to_string());
        between.extend(lines[index + 1..last_line].iter().cloned());
        between.push(line[..end.start()].to_string());
        return Some(Span {
            start,
            end: Some(end),
            lines: between,
            last_line,
        });
    }
    None
}

/// The block a plain line continues: the last paragraph or quote, or the deepest last
/// item of a trailing list, when it already has text.
fn merge_target(container: &mut ElementNode) -> Option<&mut ElementNode> {
    let last = container.last_element_mut()?;
    let is_list = matches!(last.kind(), ElementKind::List { .. });
    let is_text_block = matches!(last.kind(), ElementKind::Paragraph | ElementKind::Quote);
    let target = if is_list {
        last_list_item(last)?
    } else if is_text_block {
        last
    } else {
        return None;
    };
    if target.text_content().is_empty() {
        None
    } else {
        Some(target)
    }
}

fn last_list_item(list: &mut ElementNode) -> Option<&mut ElementNode> {
    let item = list.last_element_mut()?;
    if item.nested_list().is_some() {
        let nested = item.nested_list_mut()?;
        return last_list_item(nested);
    }
    Some(item)
}

/// Paragraphs whose text is empty or whitespace
pub fn is_empty_paragraph(node: &Node) -> bool {
    match node {
        Node::Element(element) if matches!(element.kind(), ElementKind::Paragraph) => {
            element.text_content().trim().is_empty()
        }
        _ => false,
    }
}

/// Replace the content of `document` with the blocks parsed from `text`.
///
/// The document is cleared first. Afterwards the selection sits at the start of the
/// document. On error the document holds whatever was imported so far.
pub fn import_markdown(
    text: &str,
    transformers: &TransformerSet,
    document: &mut Document,
    options: &ConversionOptions,
) -> Result<(), ConversionError> {
    transformers.validate(document.schema())?;
    let normalized = text.replace("\r\n", "\n");
    let lines: Vec<String> = normalized.split('\n').map(String::from).collect();
    debug!(
        "importing {} lines with {} transformers (preserve_new_lines: {})",
        lines.len(),
        transformers.len(),
        options.preserve_new_lines
    );

    document.clear();
    LineImporter::new(transformers, options).import_lines(&lines, document.root_mut())?;
    document.select_start();
    debug!("imported {} blocks", document.root().len());
    Ok(())
}
