//! Export tests for Markdown format (document tree → Markdown)
//!
//! Trees are built directly and exported. The comrak tests parse the output with a
//! CommonMark implementation to check it means what the tree meant.

use crate::common::{export, export_with, import};
use comrak::nodes::NodeValue;
use comrak::{parse_document, Arena, ComrakOptions};
use markbridge::tree::ListType;
use markbridge::{ConversionOptions, Document, ElementNode, Node, TextFormat, TransformerSet};
use std::collections::HashSet;

fn doc_with(blocks: Vec<ElementNode>) -> Document {
    let mut doc = Document::default();
    for block in blocks {
        doc.root_mut().append(block.into()).unwrap();
    }
    doc
}

fn paragraph(children: Vec<Node>) -> ElementNode {
    let mut paragraph = ElementNode::paragraph();
    paragraph.append_all(children).unwrap();
    paragraph
}

/// Helper to recursively collect node types from a Comrak AST
fn collect_node_types<'a>(node: &'a comrak::nodes::AstNode<'a>, types: &mut HashSet<String>) {
    let value = &node.data.borrow().value;
    let type_name = match value {
        NodeValue::Document => "Document",
        NodeValue::Paragraph => "Paragraph",
        NodeValue::Heading(_) => "Heading",
        NodeValue::BlockQuote => "BlockQuote",
        NodeValue::List(_) => "List",
        NodeValue::Item(_) => "Item",
        NodeValue::CodeBlock(_) => "CodeBlock",
        NodeValue::ThematicBreak => "ThematicBreak",
        NodeValue::Strong => "Strong",
        NodeValue::Emph => "Emph",
        NodeValue::Code(_) => "Code",
        NodeValue::Link(_) => "Link",
        _ => "Other",
    };
    types.insert(type_name.to_string());
    for child in node.children() {
        collect_node_types(child, types);
    }
}

#[test]
fn test_heading_hello_world() {
    let heading = ElementNode::heading(1)
        .with_child(Node::text("Hello world"))
        .unwrap();
    assert_eq!(export(&doc_with(vec![heading])), "# Hello world");
}

#[test]
fn test_block_separators() {
    let doc = doc_with(vec![
        paragraph(vec![Node::text("a")]),
        paragraph(vec![Node::text("b")]),
    ]);
    assert_eq!(export(&doc), "a\n\nb");
    assert_eq!(
        export_with(
            &doc,
            &TransformerSet::builtin(),
            &ConversionOptions::preserving_new_lines()
        ),
        "a\nb"
    );
}

#[test]
fn test_empty_paragraph_is_a_blank_line() {
    let doc = doc_with(vec![
        paragraph(vec![Node::text("a")]),
        paragraph(vec![]),
        paragraph(vec![Node::text("b")]),
    ]);
    assert_eq!(export(&doc), "a\n\nb");
    assert_eq!(
        export_with(
            &doc,
            &TransformerSet::builtin(),
            &ConversionOptions::preserving_new_lines()
        ),
        "a\n\nb"
    );
}

#[test]
fn test_lists() {
    let item = |text: &str| ElementNode::list_item(None).with_child(Node::text(text)).unwrap();
    let nested = ElementNode::list(ListType::Bullet, 1).with_child(item("inner")).unwrap();
    let bullets = ElementNode::list(ListType::Bullet, 1)
        .with_child(item("outer"))
        .unwrap()
        .with_child(ElementNode::list_item(None).with_child(nested).unwrap())
        .unwrap()
        .with_child(item("last"))
        .unwrap();
    let numbers = ElementNode::list(ListType::Number, 7)
        .with_child(item("seven"))
        .unwrap()
        .with_child(item("eight"))
        .unwrap();
    let checks = ElementNode::list(ListType::Check, 1)
        .with_child(
            ElementNode::list_item(Some(true))
                .with_child(Node::text("done"))
                .unwrap(),
        )
        .unwrap()
        .with_child(
            ElementNode::list_item(Some(false))
                .with_child(Node::text("todo"))
                .unwrap(),
        )
        .unwrap();

    assert_eq!(
        export(&doc_with(vec![bullets, numbers, checks])),
        "- outer\n    - inner\n- last\n\n7. seven\n8. eight\n\n- [x] done\n- [ ] todo"
    );
}

#[test]
fn test_quote_and_code() {
    let quote = ElementNode::quote()
        .with_child(Node::text("first"))
        .unwrap()
        .with_child(Node::LineBreak)
        .unwrap()
        .with_child(Node::text("second"))
        .unwrap();
    let code = ElementNode::code(Some("rust".to_string()))
        .with_child(Node::text("let x = *y;"))
        .unwrap();
    let empty_code = ElementNode::code(None);
    assert_eq!(
        export(&doc_with(vec![quote, code, empty_code])),
        "> first\n> second\n\n```rust\nlet x = *y;\n```\n\n```\n```"
    );
}

#[test]
fn test_horizontal_rule() {
    let doc = doc_with(vec![
        paragraph(vec![Node::text("a")]),
        ElementNode::horizontal_rule(),
        paragraph(vec![Node::text("b")]),
    ]);
    assert_eq!(export(&doc), "a\n\n---\n\nb");
}

#[test]
fn test_literal_characters_are_escaped() {
    let doc = doc_with(vec![paragraph(vec![Node::text(r"2*3 = 6, a_b, [x] \ ==")])]);
    assert_eq!(export(&doc), r"2\*3 \= 6, a\_b, \[x\] \ \=\=");
}

#[test]
fn test_escape_set_follows_transformers() {
    let doc = doc_with(vec![paragraph(vec![Node::text("a == b ~~ c")])]);
    let extensions = markbridge::Extensions {
        highlight: false,
        strikethrough: false,
        ..Default::default()
    };
    assert_eq!(
        export_with(
            &doc,
            &TransformerSet::standard(&extensions),
            &ConversionOptions::default()
        ),
        "a == b ~~ c"
    );
}

#[test]
fn test_adjacent_runs_share_tags() {
    let doc = doc_with(vec![paragraph(vec![
        Node::formatted("bold ", TextFormat::BOLD),
        Node::formatted("both", TextFormat::BOLD | TextFormat::ITALIC),
        Node::text(" plain "),
        Node::formatted("struck", TextFormat::STRIKETHROUGH),
    ])]);
    assert_eq!(export(&doc), "**bold *both*** plain ~~struck~~");
}

#[test]
fn test_unsupported_formats_export_as_text() {
    let doc = doc_with(vec![paragraph(vec![Node::formatted(
        "under",
        TextFormat::UNDERLINE,
    )])]);
    assert_eq!(export(&doc), "under");
}

#[test]
fn test_exported_markdown_is_commonmark() {
    let md = "# Title\n\nSome **bold** and *it* with `code` and [link](https://example.com)\n\n> quoted\n\n- one\n- two\n\n---\n\n```rust\nlet x = 1;\n```";
    let exported = export(&import(md));
    assert_eq!(exported, md);

    let arena = Arena::new();
    let root = parse_document(&arena, &exported, &ComrakOptions::default());
    let mut types = HashSet::new();
    collect_node_types(root, &mut types);
    for expected in [
        "Heading",
        "Paragraph",
        "Strong",
        "Emph",
        "Code",
        "Link",
        "BlockQuote",
        "List",
        "Item",
        "ThematicBreak",
        "CodeBlock",
    ] {
        assert!(types.contains(expected), "missing {expected} in {types:?}");
    }
}

#[test]
fn test_escaped_text_is_not_emphasis_in_commonmark() {
    let doc = doc_with(vec![paragraph(vec![Node::text("*not emphasis*")])]);
    let exported = export(&doc);

    let arena = Arena::new();
    let root = parse_document(&arena, &exported, &ComrakOptions::default());
    let mut types = HashSet::new();
    collect_node_types(root, &mut types);
    assert!(!types.contains("Emph"));
}

fn collect_link_urls<'a>(node: &'a comrak::nodes::AstNode<'a>, urls: &mut Vec<String>) {
    if let NodeValue::Link(link) = &node.data.borrow().value {
        urls.push(link.url.clone());
    }
    for child in node.children() {
        collect_link_urls(child, urls);
    }
}

#[test]
fn test_leading_block_markers_are_escaped() {
    let doc = doc_with(vec![
        paragraph(vec![Node::text("# not heading")]),
        paragraph(vec![Node::text("a"), Node::LineBreak, Node::text("- b")]),
        paragraph(vec![Node::text("2. x")]),
    ]);
    let exported = export(&doc);
    assert_eq!(exported, "\\# not heading\n\na\n\\- b\n\n2\\. x");

    let arena = Arena::new();
    let root = parse_document(&arena, &exported, &ComrakOptions::default());
    let mut types = HashSet::new();
    collect_node_types(root, &mut types);
    assert!(!types.contains("Heading") && !types.contains("List"), "{types:?}");

    let back = import(&exported);
    assert_eq!(back.root().len(), 3);
    assert_eq!(back.root().text_content(), doc.root().text_content());
}

#[test]
fn test_code_with_backticks_gets_a_longer_fence() {
    let doc = doc_with(vec![paragraph(vec![
        Node::formatted("a`b", TextFormat::CODE),
        Node::text(" and "),
        Node::formatted("`", TextFormat::CODE),
    ])]);
    let exported = export(&doc);
    assert_eq!(exported, "``a`b`` and `` ` ``");
    assert_eq!(import(&exported).root(), doc.root());
}

#[test]
fn test_link_destinations_that_need_brackets() {
    let link = |url: &str| {
        ElementNode::link(url, None)
            .with_child(Node::text("go"))
            .unwrap()
    };
    let doc = doc_with(vec![paragraph(vec![
        link("a file.md").into(),
        Node::text(" "),
        link("https://example.com/a_(b)").into(),
        Node::text(" "),
        link("plain").into(),
    ])]);
    let exported = export(&doc);
    assert_eq!(
        exported,
        "[go](<a file.md>) [go](<https://example.com/a_(b)>) [go](plain)"
    );
    assert_eq!(import(&exported).root(), doc.root());

    let arena = Arena::new();
    let root = parse_document(&arena, &exported, &ComrakOptions::default());
    let mut urls = Vec::new();
    collect_link_urls(root, &mut urls);
    assert_eq!(urls, vec!["a file.md", "https://example.com/a_(b)", "plain"]);
}

#[test]
fn test_link_title_and_label_escapes() {
    let link = ElementNode::link("", Some(r#"a "b" \c"#.to_string()))
        .with_child(Node::text("x[y"))
        .unwrap();
    let doc = doc_with(vec![paragraph(vec![link.into()])]);
    let exported = export(&doc);
    assert_eq!(exported, r#"[x\[y](<> "a \"b\" \\c")"#);
    assert_eq!(import(&exported).root(), doc.root());
}
