//! Markdown export: document tree to text
//!
//! ```text
//!     Blocks are rendered by the first multiline rule, then the first element rule,
//!     whose export answers. A block no rule claims is rendered from its children:
//!     as blocks when it has block children, inline otherwise.
//!
//!     Inline content is written run by run while tracking the stack of open format
//!     tags. Moving to the next run closes only the tags the run does not share, so
//!     `**a *b***` comes out instead of `**a****b***`. Whitespace at the edges of a run
//!     is held back until the tags around it are settled and then written outside of
//!     them, and inline code is always the innermost tag with its content written as is.
//!
//!     A code run is fenced with a run of backticks no run inside it matches, and
//!     text that opens an output line has its leading block marker escaped, so neither
//!     reads back as something else.
//! ```

use super::inline::fence_char;
use super::parser::is_empty_paragraph;
use crate::error::ConversionError;
use crate::options::ConversionOptions;
use crate::transformers::{TextFormatTransformer, TransformerSet};
use crate::tree::{Document, Node, TextFormat, TextNode};
use log::debug;

/// Rendering state shared with export callbacks.
#[derive(Debug, Clone, Copy)]
pub struct ExportContext<'a> {
    transformers: &'a TransformerSet,
    options: &'a ConversionOptions,
}

impl<'a> ExportContext<'a> {
    pub fn new(transformers: &'a TransformerSet, options: &'a ConversionOptions) -> Self {
        ExportContext {
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

    pub fn escape(&self, text: &str) -> String {
        self.transformers.escaper().escape(text)
    }

    /// Render sibling blocks with the separator the options call for
    pub fn export_blocks(&self, nodes: &[Node]) -> Result<String, ConversionError> {
        let mut output = Vec::with_capacity(nodes.len());
        for (index, node) in nodes.iter().enumerate() {
            let text = self.export_block(node)?;
            let separated = !self.options.preserve_new_lines
                && index > 0
                && !is_empty_paragraph(node)
                && !is_empty_paragraph(&nodes[index - 1]);
            if separated {
                output.push(format!("\n{text}"));
            } else {
                output.push(text);
            }
        }
        Ok(output.join("\n"))
    }

    pub fn export_block(&self, node: &Node) -> Result<String, ConversionError> {
        let Node::Element(element) = node else {
            return self.export_inline(std::slice::from_ref(node));
        };
        for transformer in self.transformers.multiline() {
            if let Some(text) = transformer.export(element, self)? {
                return Ok(text);
            }
        }
        for transformer in self.transformers.element() {
            if let Some(text) = transformer.export(element, self)? {
                return Ok(text);
            }
        }
        if element.has_block_children() {
            self.export_blocks(element.children())
        } else {
            self.export_inline(element.children())
        }
    }

    /// Render inline content: text runs, line breaks and inline elements
    pub fn export_inline(&self, nodes: &[Node]) -> Result<String, ConversionError> {
        let mut writer = InlineWriter::new(self);
        for node in nodes {
            match node {
                Node::Text(text) => writer.text(text),
                Node::LineBreak => {
                    writer.close_all();
                    writer.out.push('\n');
                }
                Node::Element(element) if element.is_inline() => {
                    writer.close_all();
                    let mut rendered = None;
                    for transformer in self.transformers.text_match() {
                        rendered = transformer.export(element, self)?;
                        if rendered.is_some() {
                            break;
                        }
                    }
                    let text = match rendered {
                        Some(text) => text,
                        None => self.export_inline(element.children())?,
                    };
                    writer.out.push_str(&text);
                }
                Node::Element(_) => {
                    writer.close_all();
                    let text = self.export_block(node)?;
                    writer.out.push_str(&text);
                }
            }
        }
        Ok(writer.finish())
    }
}

struct InlineWriter<'c, 'a> {
    ctx: &'c ExportContext<'a>,
    out: String,
    /// Text-format indices of the tags currently open, outermost first
    open: Vec<usize>,
    /// Whitespace not yet written
    pending: String,
}

impl<'c, 'a> InlineWriter<'c, 'a> {
    fn new(ctx: &'c ExportContext<'a>) -> Self {
        InlineWriter {
            ctx,
            out: String::new(),
            open: Vec::new(),
            pending: String::new(),
        }
    }

    fn text(&mut self, node: &TextNode) {
        let wanted = self.ctx.transformers.export_tags(node.format());
        let text = node.text();
        if node.has_format(TextFormat::CODE) {
            let formats = self.ctx.transformers.text_format();
            let (code, outer): (Vec<usize>, Vec<usize>) =
                wanted.iter().copied().partition(|&index| formats[index].is_code());
            self.transition(&outer);
            match code.first() {
                Some(&index) => self.out.push_str(&code_span(&formats[index], text)),
                None => self.out.push_str(text),
            }
            return;
        }
        let core_start = text.len() - text.trim_start().len();
        let core_end = text.trim_end().len();
        if core_start >= core_end {
            self.pending.push_str(text);
            return;
        }
        self.pending.push_str(&text[..core_start]);
        self.transition(&wanted);
        let core = &text[core_start..core_end];
        let escaped = if self.at_line_start() {
            self.ctx.transformers.escaper().escape_line_start(core)
        } else {
            self.ctx.escape(core)
        };
        self.out.push_str(&escaped);
        self.pending.push_str(&text[core_end..]);
    }

    /// Close the tags `wanted` does not share, write held whitespace, open the rest
    fn transition(&mut self, wanted: &[usize]) {
        let formats = self.ctx.transformers.text_format();
        let keep = self
            .open
            .iter()
            .zip(wanted)
            .take_while(|(open, want)| open == want)
            .count();
        while self.open.len() > keep {
            if let Some(index) = self.open.pop() {
                self.out.push_str(formats[index].close_tag());
            }
        }
        self.out.push_str(&std::mem::take(&mut self.pending));
        for &index in &wanted[keep..] {
            self.out.push_str(formats[index].open_tag());
            self.open.push(index);
        }
    }

    /// Nothing but indentation written on the current output line
    fn at_line_start(&self) -> bool {
        self.out
            .chars()
            .rev()
            .find(|&c| c == '\n' || !c.is_whitespace())
            .map_or(true, |c| c == '\n')
    }

    fn close_all(&mut self) {
        self.transition(&[]);
    }

    fn finish(mut self) -> String {
        self.close_all();
        self.out
    }
}

/// Wrap `content` in a code tag.
///
/// Single-character tags get the shortest fence whose length matches no run of the
/// tag character inside the content, with a space of padding when the content starts
/// or ends with that character, or with spaces on both sides.
fn code_span(tag: &TextFormatTransformer, content: &str) -> String {
    let (open, close) = (tag.open_tag(), tag.close_tag());
    let Some(marker) = fence_char(open, close) else {
        return format!("{open}{content}{close}");
    };
    let mut lengths = Vec::new();
    let mut run = 0;
    for c in content.chars().chain(std::iter::once('\n')) {
        if c == marker {
            run += 1;
        } else if run > 0 {
            lengths.push(run);
            run = 0;
        }
    }
    let width = (1..).find(|width| !lengths.contains(width)).unwrap_or(1);
    let fence = marker.to_string().repeat(width);
    let padded = content.starts_with(marker)
        || content.ends_with(marker)
        || (content.starts_with(' ') && content.ends_with(' ') && !content.trim().is_empty());
    if padded {
        format!("{fence} {content} {fence}")
    } else {
        format!("{fence}{content}{fence}")
    }
}

/// Render the whole document as markdown
pub fn export_markdown(
    transformers: &TransformerSet,
    document: &Document,
    options: &ConversionOptions,
) -> Result<String, ConversionError> {
    transformers.validate(document.schema())?;
    debug!(
        "exporting {} blocks with {} transformers (preserve_new_lines: {})",
        document.root().len(),
        transformers.len(),
        options.preserve_new_lines
    );
    ExportContext::new(transformers, options).export_blocks(document.root().children())
}
