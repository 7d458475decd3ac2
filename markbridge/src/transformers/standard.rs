//! The built-in markdown rules
//!
//! ```text
//!     | Family     | Rule                       | Markdown                         |
//!     |------------|----------------------------|----------------------------------|
//!     | element    | heading                    | `# ` .. `###### `                |
//!     | element    | quote                      | `> `                             |
//!     | element    | check_list                 | `- [ ] `, `- [x] `               |
//!     | element    | unordered_list             | `- `, `* `, `+ `                 |
//!     | element    | ordered_list               | `1. `                            |
//!     | element    | horizontal_rule            | `---`, `***`, `___`              |
//!     | multiline  | code                       | ```` ```lang ```` .. ```` ``` ```` |
//!     | textFormat | inline_code                | `` `code` ``                     |
//!     | textFormat | highlight                  | `==text==`                       |
//!     | textFormat | bold_italic_star/underscore| `***text***`, `___text___`       |
//!     | textFormat | bold_star/underscore       | `**text**`, `__text__`           |
//!     | textFormat | strikethrough              | `~~text~~`                       |
//!     | textFormat | italic_star/underscore     | `*text*`, `_text_`               |
//!     | textMatch  | link                       | `[text](url "title")`            |
//!
//!     Every rule is a plain constructor so callers can assemble their own set from a
//!     subset of them.
//! ```

use super::{
    ElementTransformer, MultilineElementTransformer, Outcome, TextFormatTransformer,
    TextMatchTransformer, Transformer,
};
use crate::error::{ConversionError, TreeError};
use crate::formats::markdown::{ExportContext, InlineImporter, LineImporter};
use crate::matcher::MatchResult;
use crate::options::Extensions;
use crate::tree::{types, ElementKind, ElementNode, ListType, Node, TextFormat, TextNode};
use once_cell::sync::Lazy;
use regex::Regex;

/// Spaces per nesting level of a list, on import and export
pub const LIST_INDENT_SIZE: usize = 4;

static HEADING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(#{1,6})\s").expect("heading pattern is valid"));
static QUOTE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^>\s").expect("quote pattern is valid"));
static CHECK_LIST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(\s*)(?:-\s)?\s?(\[(\s|x)?\])\s").expect("check list pattern is valid")
});
static UNORDERED_LIST_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\s*)[-*+]\s").expect("unordered list pattern is valid"));
static ORDERED_LIST_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\s*)(\d{1,})\.\s").expect("ordered list pattern is valid"));
static HORIZONTAL_RULE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:---|\*\*\*|___)\s?$").expect("horizontal rule pattern is valid")
});
static CODE_START_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[ \t]*```(\w+)?").expect("code start pattern is valid"));
static CODE_END_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t]*```$").expect("code end pattern is valid"));

/// `[label](url "title")`; the url may be written `<url>` when it has spaces or parens
const LINK_PATTERN: &str = r#"(?:\[((?:\\.|[^\[\\])+)\])(?:\((?:<((?:\\.|[^<>\\\n])*)>|([^()\s]+))(?:\s"((?:\\.|[^"\\])*)"\s*)?\))"#;
static LINK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(LINK_PATTERN).expect("link pattern is valid"));
static LINK_END_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!("{LINK_PATTERN}$")).expect("link end pattern is valid")
});

/// The standard set in precedence order, minus disabled extensions
pub fn transformers(extensions: &Extensions) -> Vec<Transformer> {
    let mut rules: Vec<Transformer> = vec![heading().into(), quote().into()];
    if extensions.check_lists {
        rules.push(check_list().into());
    }
    rules.push(unordered_list().into());
    rules.push(ordered_list().into());
    if extensions.horizontal_rule {
        rules.push(horizontal_rule().into());
    }

    rules.push(code().into());

    rules.push(inline_code().into());
    if extensions.highlight {
        rules.push(highlight().into());
    }
    rules.push(bold_italic_star().into());
    rules.push(bold_italic_underscore().into());
    rules.push(bold_star().into());
    rules.push(bold_underscore().into());
    if extensions.strikethrough {
        rules.push(strikethrough().into());
    }
    rules.push(italic_star().into());
    rules.push(italic_underscore().into());

    rules.push(link().into());
    rules
}

// Element rules

pub fn heading() -> ElementTransformer {
    ElementTransformer::new("heading", HEADING_RE.clone(), import_heading)
        .with_export(export_heading)
        .with_dependencies([types::HEADING])
}

pub fn quote() -> ElementTransformer {
    ElementTransformer::new("quote", QUOTE_RE.clone(), import_quote)
        .with_export(export_quote)
        .with_dependencies([types::QUOTE])
}

pub fn check_list() -> ElementTransformer {
    ElementTransformer::new("check_list", CHECK_LIST_RE.clone(), import_check_item)
        .with_export(|node, ctx| export_list_of(ListType::Check, node, ctx))
        .with_dependencies([types::LIST, types::LIST_ITEM])
}

pub fn unordered_list() -> ElementTransformer {
    ElementTransformer::new("unordered_list", UNORDERED_LIST_RE.clone(), import_bullet_item)
        .with_export(|node, ctx| export_list_of(ListType::Bullet, node, ctx))
        .with_dependencies([types::LIST, types::LIST_ITEM])
}

pub fn ordered_list() -> ElementTransformer {
    ElementTransformer::new("ordered_list", ORDERED_LIST_RE.clone(), import_number_item)
        .with_export(|node, ctx| export_list_of(ListType::Number, node, ctx))
        .with_dependencies([types::LIST, types::LIST_ITEM])
}

pub fn horizontal_rule() -> ElementTransformer {
    ElementTransformer::new(
        "horizontal_rule",
        HORIZONTAL_RULE_RE.clone(),
        |parent: &mut ElementNode, _children: Vec<Node>, _m: &MatchResult, _is_import: bool| {
            parent.append(ElementNode::horizontal_rule().into())?;
            Ok(Outcome::Handled)
        },
    )
    .with_export(|node: &ElementNode, _ctx: &ExportContext<'_>| {
        Ok(matches!(node.kind(), ElementKind::HorizontalRule).then(|| "---".to_string()))
    })
    .with_dependencies([types::HORIZONTAL_RULE])
}

fn element_with(
    mut element: ElementNode,
    children: Vec<Node>,
) -> Result<ElementNode, TreeError> {
    element.append_all(children)?;
    Ok(element)
}

fn import_heading(
    parent: &mut ElementNode,
    children: Vec<Node>,
    matched: &MatchResult,
    _is_import: bool,
) -> Result<Outcome, ConversionError> {
    let level = matched.get(1).map_or(1, str::len) as u8;
    parent.append(element_with(ElementNode::heading(level), children)?.into())?;
    Ok(Outcome::Handled)
}

fn export_heading(
    node: &ElementNode,
    ctx: &ExportContext<'_>,
) -> Result<Option<String>, ConversionError> {
    let Some(level) = node.heading_level() else {
        return Ok(None);
    };
    let content = ctx.export_inline(node.children())?;
    Ok(Some(format!("{} {content}", "#".repeat(level as usize))))
}

fn import_quote(
    parent: &mut ElementNode,
    children: Vec<Node>,
    _matched: &MatchResult,
    is_import: bool,
) -> Result<Outcome, ConversionError> {
    if is_import {
        let previous = parent
            .last_element_mut()
            .filter(|element| matches!(element.kind(), ElementKind::Quote));
        if let Some(previous) = previous {
            previous.append(Node::LineBreak)?;
            previous.append_all(children)?;
            return Ok(Outcome::Handled);
        }
    }
    parent.append(element_with(ElementNode::quote(), children)?.into())?;
    Ok(Outcome::Handled)
}

fn export_quote(
    node: &ElementNode,
    ctx: &ExportContext<'_>,
) -> Result<Option<String>, ConversionError> {
    if !matches!(node.kind(), ElementKind::Quote) {
        return Ok(None);
    }
    let content = ctx.export_inline(node.children())?;
    let lines: Vec<String> = content.split('\n').map(|line| format!("> {line}")).collect();
    Ok(Some(lines.join("\n")))
}

/// Nesting depth of a list line: one level per tab, one per four spaces
fn indent_level(whitespace: &str) -> usize {
    let tabs = whitespace.chars().filter(|c| *c == '\t').count();
    let spaces = whitespace.chars().filter(|c| *c == ' ').count();
    tabs + spaces / LIST_INDENT_SIZE
}

fn import_check_item(
    parent: &mut ElementNode,
    children: Vec<Node>,
    matched: &MatchResult,
    _is_import: bool,
) -> Result<Outcome, ConversionError> {
    let checked = matched.get(3).is_some_and(|mark| mark.eq_ignore_ascii_case("x"));
    let item = element_with(ElementNode::list_item(Some(checked)), children)?;
    insert_list_item(parent, ListType::Check, 1, indent_level(matched.get(1).unwrap_or("")), item)?;
    Ok(Outcome::Handled)
}

fn import_bullet_item(
    parent: &mut ElementNode,
    children: Vec<Node>,
    matched: &MatchResult,
    _is_import: bool,
) -> Result<Outcome, ConversionError> {
    let item = element_with(ElementNode::list_item(None), children)?;
    insert_list_item(parent, ListType::Bullet, 1, indent_level(matched.get(1).unwrap_or("")), item)?;
    Ok(Outcome::Handled)
}

fn import_number_item(
    parent: &mut ElementNode,
    children: Vec<Node>,
    matched: &MatchResult,
    _is_import: bool,
) -> Result<Outcome, ConversionError> {
    let start = matched
        .get(2)
        .and_then(|digits| digits.parse::<u32>().ok())
        .unwrap_or(1);
    let item = element_with(ElementNode::list_item(None), children)?;
    insert_list_item(parent, ListType::Number, start, indent_level(matched.get(1).unwrap_or("")), item)?;
    Ok(Outcome::Handled)
}

/// Add an item to the list ending `parent`, or start a new list.
///
/// A top-level item only continues a previous sibling list of the same type; an indented
/// item continues any previous list. Deeper items go into the nested list of the last
/// wrapper item, creating wrappers as needed.
fn insert_list_item(
    parent: &mut ElementNode,
    list_type: ListType,
    start: u32,
    depth: usize,
    item: ElementNode,
) -> Result<(), TreeError> {
    let continues = parent
        .last_child()
        .and_then(Node::as_element)
        .and_then(ElementNode::list_type)
        .is_some_and(|previous| depth > 0 || previous == list_type);
    if continues {
        if let Some(list) = parent.last_element_mut() {
            return place_item(list, list_type, start, depth, item);
        }
    }
    let mut list = ElementNode::list(list_type, if depth == 0 { start } else { 1 });
    place_item(&mut list, list_type, start, depth, item)?;
    parent.append(list.into())
}

fn place_item(
    list: &mut ElementNode,
    list_type: ListType,
    start: u32,
    depth: usize,
    item: ElementNode,
) -> Result<(), TreeError> {
    if depth == 0 {
        return list.append(item.into());
    }
    let reusable = list
        .last_child()
        .and_then(Node::as_element)
        .and_then(ElementNode::nested_list)
        .is_some_and(|nested| depth > 1 || nested.list_type() == Some(list_type));
    if reusable {
        if let Some(nested) = list.last_element_mut().and_then(ElementNode::nested_list_mut) {
            return place_item(nested, list_type, start, depth - 1, item);
        }
    }
    let mut nested = ElementNode::list(list_type, if depth == 1 { start } else { 1 });
    place_item(&mut nested, list_type, start, depth - 1, item)?;
    list.append(ElementNode::list_item(None).with_child(nested)?.into())
}

fn export_list_of(
    list_type: ListType,
    node: &ElementNode,
    ctx: &ExportContext<'_>,
) -> Result<Option<String>, ConversionError> {
    if node.list_type() != Some(list_type) {
        return Ok(None);
    }
    export_list(node, ctx, 0).map(Some)
}

fn export_list(
    list: &ElementNode,
    ctx: &ExportContext<'_>,
    depth: usize,
) -> Result<String, ConversionError> {
    let list_type = list.list_type().unwrap_or(ListType::Bullet);
    let start = list.list_start().unwrap_or(1);
    let indent = " ".repeat(depth * LIST_INDENT_SIZE);
    let mut lines = Vec::new();
    let mut index: u32 = 0;
    for item in list.children().iter().filter_map(Node::as_element) {
        if let Some(nested) = item.nested_list() {
            lines.push(export_list(nested, ctx, depth + 1)?);
            continue;
        }
        let prefix = match list_type {
            ListType::Number => format!("{}. ", start.saturating_add(index)),
            ListType::Check if item.checked() == Some(true) => "- [x] ".to_string(),
            ListType::Check => "- [ ] ".to_string(),
            ListType::Bullet => "- ".to_string(),
        };
        let content = if item.has_block_children() {
            let inline: Vec<Node> = item
                .children()
                .iter()
                .filter(|child| child.is_inline())
                .cloned()
                .collect();
            ctx.export_inline(&inline)?
        } else {
            ctx.export_inline(item.children())?
        };
        lines.push(format!("{indent}{prefix}{content}"));
        for nested in item
            .children()
            .iter()
            .filter_map(Node::as_element)
            .filter(|child| child.list_type().is_some())
        {
            lines.push(export_list(nested, ctx, depth + 1)?);
        }
        index += 1;
    }
    Ok(lines.join("\n"))
}

// Multiline rules

pub fn code() -> MultilineElementTransformer {
    MultilineElementTransformer::new("code", CODE_START_RE.clone(), import_code)
        .with_end(CODE_END_RE.clone())
        .with_export(export_code)
        .with_dependencies([types::CODE])
}

fn import_code(
    parent: &mut ElementNode,
    start: &MatchResult,
    end: Option<&MatchResult>,
    lines: &[String],
    _importer: &LineImporter<'_>,
) -> Result<Outcome, ConversionError> {
    if end.is_none() {
        return Ok(Outcome::Defer);
    }
    let (language, code) = if lines.len() == 1 {
        // ```text``` on one line
        (None, format!("{}{}", start.get(1).unwrap_or(""), lines[0]))
    } else {
        let mut body: Vec<&str> = lines.iter().map(String::as_str).collect();
        if body.first().is_some_and(|line| line.trim().is_empty()) {
            body.remove(0);
        } else if let Some(first) = body.first_mut() {
            *first = first.trim_start();
        }
        while body.last().is_some_and(|line| line.is_empty()) {
            body.pop();
        }
        (start.get(1).map(String::from), body.join("\n"))
    };
    let mut block = ElementNode::code(language);
    if !code.is_empty() {
        block.append(Node::text(code))?;
    }
    parent.append(block.into())?;
    Ok(Outcome::Handled)
}

fn export_code(
    node: &ElementNode,
    _ctx: &ExportContext<'_>,
) -> Result<Option<String>, ConversionError> {
    let ElementKind::Code { language } = node.kind() else {
        return Ok(None);
    };
    let language = language.as_deref().unwrap_or("");
    let text = node.text_content();
    if text.is_empty() {
        Ok(Some(format!("```{language}\n```")))
    } else {
        Ok(Some(format!("```{language}\n{text}\n```")))
    }
}

// Text format rules

pub fn inline_code() -> TextFormatTransformer {
    TextFormatTransformer::new("inline_code", TextFormat::CODE, "`")
}

pub fn highlight() -> TextFormatTransformer {
    TextFormatTransformer::new("highlight", TextFormat::HIGHLIGHT, "==")
}

pub fn bold_italic_star() -> TextFormatTransformer {
    TextFormatTransformer::new("bold_italic_star", TextFormat::BOLD | TextFormat::ITALIC, "***")
}

pub fn bold_italic_underscore() -> TextFormatTransformer {
    TextFormatTransformer::new(
        "bold_italic_underscore",
        TextFormat::BOLD | TextFormat::ITALIC,
        "___",
    )
    .with_intraword(false)
}

pub fn bold_star() -> TextFormatTransformer {
    TextFormatTransformer::new("bold_star", TextFormat::BOLD, "**")
}

pub fn bold_underscore() -> TextFormatTransformer {
    TextFormatTransformer::new("bold_underscore", TextFormat::BOLD, "__").with_intraword(false)
}

pub fn strikethrough() -> TextFormatTransformer {
    TextFormatTransformer::new("strikethrough", TextFormat::STRIKETHROUGH, "~~")
}

pub fn italic_star() -> TextFormatTransformer {
    TextFormatTransformer::new("italic_star", TextFormat::ITALIC, "*")
}

pub fn italic_underscore() -> TextFormatTransformer {
    TextFormatTransformer::new("italic_underscore", TextFormat::ITALIC, "_").with_intraword(false)
}

// Text match rules

pub fn link() -> TextMatchTransformer {
    TextMatchTransformer::new("link")
        .with_import(LINK_RE.clone(), import_link)
        .with_regexp_end(LINK_END_RE.clone())
        .with_trigger(")")
        .with_export(export_link)
        .with_dependencies([types::LINK])
}

fn import_link(
    text: TextNode,
    matched: &MatchResult,
    importer: &InlineImporter<'_>,
) -> Result<Option<Vec<Node>>, ConversionError> {
    let Some(label) = matched.get(1) else {
        return Ok(None);
    };
    let url = match (matched.get(2), matched.get(3)) {
        (Some(bracketed), _) => unescape_link_part(bracketed),
        (None, Some(bare)) => bare.to_string(),
        (None, None) => return Ok(None),
    };
    let title = matched.get(4).map(unescape_link_part);
    let mut link = ElementNode::link(url, title);
    link.append_all(importer.import_with_format(label, text.format())?)?;
    Ok(Some(vec![link.into()]))
}

fn export_link(
    node: &ElementNode,
    ctx: &ExportContext<'_>,
) -> Result<Option<String>, ConversionError> {
    let Some(url) = node.url() else {
        return Ok(None);
    };
    let content = ctx.export_inline(node.children())?;
    let bracketed = url.is_empty()
        || url.starts_with('<')
        || url.contains(|c: char| c.is_whitespace() || c == '(' || c == ')');
    let destination = if bracketed {
        format!("<{}>", escape_link_part(url, &['<', '>']))
    } else {
        url.to_string()
    };
    Ok(Some(match node.title() {
        Some(title) => format!("[{content}]({destination} \"{}\")", escape_link_part(title, &['"'])),
        None => format!("[{content}]({destination})"),
    }))
}

/// Backslash `special` characters and backslashes
fn escape_link_part(text: &str, special: &[char]) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        if c == '\\' || special.contains(&c) {
            result.push('\\');
        }
        result.push(c);
    }
    result
}

/// Drop the backslash of every `\x` pair
fn unescape_link_part(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => result.extend(chars.next()),
            c => result.push(c),
        }
    }
    result
}
