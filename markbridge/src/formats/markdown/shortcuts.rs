//! Typing shortcuts
//!
//! Editors convert markdown as it is typed: `# ` at the start of a paragraph turns it
//! into a heading, a closing `**` turns the span before it bold, and a closing `)`
//! turns `[text](url)` into a link. These functions apply the same rules the import
//! pipeline uses, one construct at a time, to text that has just been typed.

use super::inline::InlineImporter;
use crate::error::ConversionError;
use crate::transformers::{Outcome, TransformerSet};
use crate::tree::{Document, ElementKind, Node, Selection, TextNode};
use log::trace;

/// Turn the paragraph at `block_index` into the block its leading marker calls for.
///
/// Returns `true` when an element rule handled it; the paragraph is left as it was
/// otherwise. The selection moves to the start of the converted block.
pub fn apply_element_shortcut(
    document: &mut Document,
    block_index: usize,
    transformers: &TransformerSet,
) -> Result<bool, ConversionError> {
    let Some(Node::Element(paragraph)) = document.root().children().get(block_index) else {
        return Ok(false);
    };
    if !matches!(paragraph.kind(), ElementKind::Paragraph) {
        return Ok(false);
    }
    let Some(Node::Text(first)) = paragraph.children().first() else {
        return Ok(false);
    };
    let first_text = first.text().to_string();
    let first_format = first.format();
    let rest: Vec<Node> = paragraph.children()[1..].to_vec();

    for transformer in transformers.element() {
        let Some(matched) = transformer.regexp().match_at_start(&first_text) else {
            continue;
        };
        let mut children = Vec::with_capacity(rest.len() + 1);
        let remainder = &first_text[matched.end()..];
        if !remainder.is_empty() {
            children.push(Node::formatted(remainder, first_format));
        }
        children.extend(rest.iter().cloned());

        let root = document.root_mut();
        let mut tail = root.split_off(block_index)?;
        let following = tail.split_off(1);
        match transformer.replace(root, children, &matched, false)? {
            Outcome::Handled => {
                root.append_all(following)?;
                let converted = block_index.min(root.len().saturating_sub(1));
                document.set_selection(Some(Selection::new(vec![converted], 0)))?;
                trace!("'{}' shortcut on block {block_index}", transformer.name());
                return Ok(true);
            }
            _ => {
                root.append_all(tail)?;
                root.append_all(following)?;
            }
        }
    }
    Ok(false)
}

/// Replace a text-match construct that the last typed character completed.
///
/// Only rules whose trigger ends `text` are tried, with their end-anchored pattern.
/// Returns the nodes replacing `text` (any text before the match stays a plain run of
/// the same format).
pub fn apply_text_match_shortcut(
    text: &TextNode,
    transformers: &TransformerSet,
) -> Result<Option<Vec<Node>>, ConversionError> {
    let content = text.text();
    let importer = InlineImporter::new(transformers);
    for transformer in transformers.text_match() {
        let (Some(trigger), Some(regexp_end)) = (transformer.trigger(), transformer.regexp_end())
        else {
            continue;
        };
        if trigger.is_empty() || !content.ends_with(trigger) {
            continue;
        }
        let Some(matched) = regexp_end.find_in(content) else {
            continue;
        };
        if matched.end() != content.len() {
            continue;
        }
        let node = TextNode::with_format(matched.as_str(), text.format());
        if let Some(replacement) = transformer.replace(node, &matched, &importer)? {
            let mut nodes = Vec::with_capacity(replacement.len() + 1);
            if matched.start() > 0 {
                nodes.push(Node::formatted(&content[..matched.start()], text.format()));
            }
            nodes.extend(replacement);
            return Ok(Some(nodes));
        }
    }
    Ok(None)
}

/// Apply a text format when `text` ends with a closing tag that has a matching opener.
pub fn apply_text_format_shortcut(text: &TextNode, transformers: &TransformerSet) -> Option<Vec<Node>> {
    let content = text.text();
    for (_, transformer) in transformers.import_formats() {
        let open = transformer.open_tag();
        let close = transformer.close_tag();
        if open.is_empty() || close.is_empty() || !content.ends_with(close) {
            continue;
        }
        let head = &content[..content.len() - close.len()];
        if !head.chars().next_back().is_some_and(|c| !c.is_whitespace()) {
            continue;
        }
        let Some(open_start) = head.rfind(open) else {
            continue;
        };
        let before = &head[..open_start];
        let inner = &head[open_start + open.len()..];
        if inner.is_empty() || inner.starts_with(char::is_whitespace) {
            continue;
        }
        // part of a longer run of the same delimiter
        if open.chars().next_back().is_some_and(|c| before.ends_with(c)) {
            continue;
        }
        if !transformer.intraword() && before.chars().next_back().is_some_and(char::is_alphanumeric) {
            continue;
        }
        let mut nodes = Vec::with_capacity(2);
        if !before.is_empty() {
            nodes.push(Node::formatted(before, text.format()));
        }
        nodes.push(Node::formatted(inner, text.format() | transformer.format()));
        return Some(nodes);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{ElementNode, ListType, TextFormat};

    fn document_with(text: &str) -> Document {
        let mut document = Document::default();
        let paragraph = ElementNode::paragraph().with_child(Node::text(text)).unwrap();
        document.root_mut().append(paragraph.into()).unwrap();
        document
    }

    #[test]
    fn heading_shortcut() {
        let mut document = document_with("## Title");
        let applied =
            apply_element_shortcut(&mut document, 0, &TransformerSet::builtin()).unwrap();
        assert!(applied);
        let heading = document.root().children()[0].as_element().unwrap();
        assert_eq!(heading.heading_level(), Some(2));
        assert_eq!(heading.text_content(), "Title");
        assert_eq!(document.selection(), Some(&Selection::new(vec![0], 0)));
    }

    #[test]
    fn list_shortcut_keeps_following_blocks() {
        let mut document = document_with("- item");
        let after = ElementNode::paragraph().with_child(Node::text("after")).unwrap();
        document.root_mut().append(after.into()).unwrap();
        assert!(apply_element_shortcut(&mut document, 0, &TransformerSet::builtin()).unwrap());
        let root = document.root();
        assert_eq!(root.len(), 2);
        assert_eq!(root.children()[0].as_element().unwrap().list_type(), Some(ListType::Bullet));
        assert_eq!(root.children()[1].text_content(), "after");
    }

    #[test]
    fn plain_paragraph_is_untouched() {
        let mut document = document_with("just text");
        let before = document.clone();
        assert!(!apply_element_shortcut(&mut document, 0, &TransformerSet::builtin()).unwrap());
        assert_eq!(document, before);
    }

    #[test]
    fn link_shortcut() {
        let typed = TextNode::new("see [docs](https://example.com)");
        let nodes = apply_text_match_shortcut(&typed, &TransformerSet::builtin())
            .unwrap()
            .unwrap();
        assert_eq!(nodes[0], Node::text("see "));
        assert_eq!(nodes[1].as_element().unwrap().url(), Some("https://example.com"));
    }

    #[test]
    fn bold_shortcut() {
        let typed = TextNode::new("make **this**");
        let nodes = apply_text_format_shortcut(&typed, &TransformerSet::builtin()).unwrap();
        assert_eq!(
            nodes,
            vec![Node::text("make "), Node::formatted("this", TextFormat::BOLD)]
        );
    }

    #[test]
    fn format_shortcut_needs_flanking() {
        let set = TransformerSet::builtin();
        assert!(apply_text_format_shortcut(&TextNode::new("a * b*"), &set).is_none());
        assert!(apply_text_format_shortcut(&TextNode::new("a *b *"), &set).is_none());
    }
}
