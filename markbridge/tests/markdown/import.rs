//! Import tests for Markdown format (Markdown → document tree)
//!
//! These tests verify that Markdown documents are correctly converted by checking the
//! resulting tree structure.

use crate::common::{blocks, import, import_with, runs};
use markbridge::tree::{ElementKind, ListType, Selection};
use markbridge::{
    import_markdown, ConversionError, ConversionOptions, Document, Node, NodeSchema, TextFormat,
    TransformerSet,
};

#[test]
fn test_heading_hello_world() {
    let doc = import("# Hello world");
    let blocks = blocks(&doc);
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].heading_level(), Some(1));
    assert_eq!(blocks[0].children(), &[Node::text("Hello world")]);
}

#[test]
fn test_heading_levels() {
    let doc = import("###### six\n####### seven");
    let blocks = blocks(&doc);
    assert_eq!(blocks[0].heading_level(), Some(6));
    // seven hashes is not a heading
    assert!(matches!(blocks[1].kind(), ElementKind::Paragraph));
}

#[test]
fn test_soft_wrapped_lines_merge() {
    let doc = import("one\ntwo\n\nthree");
    let blocks = blocks(&doc);
    assert_eq!(blocks.len(), 2);
    assert_eq!(
        blocks[0].children(),
        &[Node::text("one"), Node::LineBreak, Node::text("two")]
    );
    assert_eq!(blocks[1].text_content(), "three");
}

#[test]
fn test_preserve_new_lines_keeps_every_line() {
    let doc = import_with(
        "one\n\ntwo",
        &TransformerSet::builtin(),
        &ConversionOptions::preserving_new_lines(),
    );
    let blocks = blocks(&doc);
    assert_eq!(blocks.len(), 3);
    assert!(blocks[1].is_empty());
    assert_eq!(blocks[2].text_content(), "two");
}

#[test]
fn test_trailing_newline_and_crlf() {
    assert_eq!(import("text\n").root().len(), 1);

    let doc = import("# a\r\nb\r\n");
    let blocks = blocks(&doc);
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0].text_content(), "a");
    assert_eq!(blocks[1].text_content(), "b");
}

#[test]
fn test_quote_lines_merge() {
    let doc = import("> first\n> second");
    let blocks = blocks(&doc);
    assert_eq!(blocks.len(), 1);
    assert!(matches!(blocks[0].kind(), ElementKind::Quote));
    assert_eq!(
        blocks[0].children(),
        &[Node::text("first"), Node::LineBreak, Node::text("second")]
    );
}

#[test]
fn test_nested_bullet_list() {
    let doc = import("- a\n    - b\n- c");
    let blocks = blocks(&doc);
    assert_eq!(blocks.len(), 1);
    let list = blocks[0];
    assert_eq!(list.list_type(), Some(ListType::Bullet));
    assert_eq!(list.len(), 3);

    let wrapper = list.children()[1].as_element().unwrap();
    let nested = wrapper.nested_list().expect("wrapper item holds the nested list");
    assert_eq!(nested.text_content(), "b");
    assert_eq!(list.children()[2].text_content(), "c");
}

#[test]
fn test_tab_indented_list() {
    let doc = import("- a\n\t- b");
    let list = blocks(&doc)[0];
    assert_eq!(list.len(), 2);
    assert!(list.children()[1].as_element().unwrap().nested_list().is_some());
}

#[test]
fn test_ordered_list_keeps_start() {
    let doc = import("3. three\n4. four");
    let list = blocks(&doc)[0];
    assert_eq!(list.list_type(), Some(ListType::Number));
    assert_eq!(list.list_start(), Some(3));
    assert_eq!(list.len(), 2);
}

#[test]
fn test_list_type_change_starts_new_list() {
    let doc = import("- a\n1. b");
    let blocks = blocks(&doc);
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0].list_type(), Some(ListType::Bullet));
    assert_eq!(blocks[1].list_type(), Some(ListType::Number));
}

#[test]
fn test_check_list() {
    let doc = import("- [x] done\n- [ ] todo");
    let list = blocks(&doc)[0];
    assert_eq!(list.list_type(), Some(ListType::Check));
    let items: Vec<_> = list
        .children()
        .iter()
        .map(|item| item.as_element().unwrap().checked())
        .collect();
    assert_eq!(items, vec![Some(true), Some(false)]);
    assert_eq!(list.children()[0].text_content(), "done");
}

#[test]
fn test_list_item_continuation_line() {
    let doc = import("- item\ncontinued");
    let list = blocks(&doc)[0];
    assert_eq!(list.len(), 1);
    assert_eq!(
        list.children()[0].as_element().unwrap().children(),
        &[Node::text("item"), Node::LineBreak, Node::text("continued")]
    );
}

#[test]
fn test_fenced_code_block() {
    let doc = import("```rust\nfn main() {\n    *x = 1;\n}\n```");
    let blocks = blocks(&doc);
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].language(), Some("rust"));
    // no inline rules inside code
    assert_eq!(blocks[0].text_content(), "fn main() {\n    *x = 1;\n}");
}

#[test]
fn test_unterminated_fence_is_text() {
    let doc = import("```\nnot code");
    for block in blocks(&doc) {
        assert!(matches!(block.kind(), ElementKind::Paragraph));
    }
    assert!(doc.root().text_content().contains("not code"));
}

#[test]
fn test_horizontal_rule() {
    let doc = import("above\n\n---\n\nbelow");
    let kinds: Vec<_> = blocks(&doc).iter().map(|b| b.node_type().to_string()).collect();
    assert_eq!(kinds, vec!["paragraph", "horizontalrule", "paragraph"]);
}

#[test]
fn test_inline_formats() {
    let doc = import("**bold** and *italic* and `a*b` and ~~gone~~ and ==marked==");
    assert_eq!(
        runs(blocks(&doc)[0].children()),
        vec![
            ("bold".to_string(), "bold".to_string()),
            (" and ".to_string(), "plain".to_string()),
            ("italic".to_string(), "italic".to_string()),
            (" and ".to_string(), "plain".to_string()),
            ("a*b".to_string(), "code".to_string()),
            (" and ".to_string(), "plain".to_string()),
            ("gone".to_string(), "strikethrough".to_string()),
            (" and ".to_string(), "plain".to_string()),
            ("marked".to_string(), "highlight".to_string()),
        ]
    );
}

#[test]
fn test_underscore_inside_words_is_literal() {
    let doc = import("snake_case_name and _italic_");
    assert_eq!(
        runs(blocks(&doc)[0].children()),
        vec![
            ("snake_case_name and ".to_string(), "plain".to_string()),
            ("italic".to_string(), "italic".to_string()),
        ]
    );
}

#[test]
fn test_link_with_formatted_label() {
    let doc = import(r#"see [the **docs**](https://example.com "Docs") now"#);
    let paragraph = blocks(&doc)[0];
    assert_eq!(paragraph.len(), 3);
    let link = paragraph.children()[1].as_element().unwrap();
    assert_eq!(link.url(), Some("https://example.com"));
    assert_eq!(link.title(), Some("Docs"));
    assert_eq!(
        link.children(),
        &[Node::text("the "), Node::formatted("docs", TextFormat::BOLD)]
    );
}

#[test]
fn test_escaped_characters_are_literal() {
    let doc = import(r"2\*3\*4 and \[not a link\]");
    assert_eq!(
        blocks(&doc)[0].children(),
        &[Node::text("2*3*4 and [not a link]")]
    );
}

#[test]
fn test_selection_is_placed_at_start() {
    let doc = import("# Title\n\nbody");
    assert_eq!(doc.selection(), Some(&Selection::new(vec![0, 0], 0)));

    let empty = import("");
    assert_eq!(empty.root().len(), 0);
    assert_eq!(empty.selection(), Some(&Selection::new(vec![], 0)));
}

#[test]
fn test_missing_dependency_is_reported() {
    let mut doc = Document::new(NodeSchema::minimal());
    let err = import_markdown(
        "# title",
        &TransformerSet::builtin(),
        &mut doc,
        &ConversionOptions::default(),
    )
    .unwrap_err();
    match err {
        ConversionError::MissingDependency {
            transformer,
            node_type,
        } => {
            assert_eq!(transformer, "heading");
            assert_eq!(node_type, "heading");
        }
        other => panic!("Expected MissingDependency, got {other:?}"),
    }
}
