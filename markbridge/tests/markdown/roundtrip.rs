//! Round-trip tests: Markdown → tree → Markdown
//!
//! Inputs written in the form the built-in rules export come back unchanged. The
//! property tests generate such inputs, plus arbitrary text for the escape law.

use crate::common::{export, import, round_trip};
use markbridge::{ConversionOptions, Document, ElementNode, Node, TransformerSet};
use proptest::prelude::*;

#[test]
fn test_canonical_inputs_round_trip() {
    let cases = [
        "# Hello world",
        "###### Deep heading with `code`",
        "Hello **world**!",
        "Soft\nwrapped\nlines",
        "**bold *both***",
        "***both***",
        "x ==mark== y ~~gone~~",
        r"a \* b \_ c \[d\]",
        "- a\n    - b\n        - c\n- d",
        "1. one\n2. two\n\n- other",
        "5. five\n6. six",
        "- [ ] open\n- [x] closed",
        "> quoted\n> twice",
        "```js\nconsole.log(1);\n\nreturn;\n```",
        "[text](https://lexical.dev \"Title\")",
        "before [**bold link**](https://example.com) after",
        "a\n\n---\n\nb",
        r"a\-b",
        r"\# not heading",
        r"1\. not a list",
        "3.14 is not a list",
        "a\n\\- not an item\n\\> not a quote",
        r"\\# backslash first",
        "``a`b`` and `` `tick` ``",
        r"[a\[b](https://example.com)",
        "[spaced](<a file.md> \"Its \\\"title\\\"\")",
        "[parens](<https://example.com/a_(b)>)",
    ];
    for md in cases {
        assert_eq!(round_trip(md, &ConversionOptions::default()), md, "input: {md:?}");
    }
}

#[test]
fn test_preserve_new_lines_round_trip() {
    let options = ConversionOptions::preserving_new_lines();
    for md in ["a\n\nb", "a\nb\n\n\nc", "# title\ntext\n- item"] {
        assert_eq!(round_trip(md, &options), md, "input: {md:?}");
    }
}

#[test]
fn test_alternative_markers_normalize() {
    assert_eq!(
        round_trip("__bold__ _it_ + item", &ConversionOptions::default()),
        "**bold** *it* + item"
    );
    assert_eq!(
        round_trip("* one\n+ two\n\n***", &ConversionOptions::default()),
        "- one\n- two\n\n---"
    );
}

#[test]
fn test_export_is_idempotent() {
    let md = "Text *with **nested** formats* and a\nbreak\n\n\n\n- list\n  continued";
    let once = export(&import(md));
    let twice = export(&import(&once));
    assert_eq!(once, twice);
}

fn word() -> impl Strategy<Value = String> {
    "[a-z]{1,8}"
}

fn styled_word() -> impl Strategy<Value = String> {
    (word(), prop::sample::select(vec!["**", "*", "`", "~~", "=="]))
        .prop_map(|(word, tag)| format!("{tag}{word}{tag}"))
}

/// Plain words with styled words between them, never at the edges
fn inline_text() -> impl Strategy<Value = String> {
    (word(), prop::collection::vec((styled_word(), word()), 0..4)).prop_map(|(first, rest)| {
        let mut text = first;
        for (styled, plain) in rest {
            text.push(' ');
            text.push_str(&styled);
            text.push(' ');
            text.push_str(&plain);
        }
        text
    })
}

fn block() -> impl Strategy<Value = String> {
    prop_oneof![
        inline_text(),
        (1usize..=6, inline_text()).prop_map(|(level, text)| format!("{} {text}", "#".repeat(level))),
        prop::collection::vec(inline_text(), 1..4).prop_map(|items| {
            items
                .iter()
                .map(|item| format!("- {item}"))
                .collect::<Vec<_>>()
                .join("\n")
        }),
        inline_text().prop_map(|text| format!("> {text}")),
    ]
}

proptest! {
    #[test]
    fn escape_then_unescape_is_identity(text in ".*") {
        let set = TransformerSet::builtin();
        let escaper = set.escaper();
        prop_assert_eq!(escaper.unescape(&escaper.escape(&text)), text);
    }

    #[test]
    fn escaped_text_imports_as_one_plain_run(text in "[a-z*_`~=\\[\\]\\\\ ]{1,20}") {
        prop_assume!(!text.starts_with(char::is_whitespace) && !text.ends_with(char::is_whitespace));
        let set = TransformerSet::builtin();
        let escaped = set.escaper().escape(&text);
        let doc = import(&escaped);
        prop_assert_eq!(doc.root().text_content(), text);
    }

    #[test]
    fn paragraph_text_survives_export(text in r"[a-z\\\-#* ]{1,24}") {
        prop_assume!(!text.trim().is_empty() && text.trim() == text);
        let mut doc = Document::default();
        let paragraph = ElementNode::paragraph().with_child(Node::text(text.clone())).unwrap();
        doc.root_mut().append(paragraph.into()).unwrap();
        let md = export(&doc);
        prop_assert_eq!(import(&md).root().text_content(), text, "exported as {:?}", md);
    }

    #[test]
    fn canonical_documents_round_trip(blocks in prop::collection::vec(block(), 1..5)) {
        let md = blocks.join("\n\n");
        prop_assert_eq!(round_trip(&md, &ConversionOptions::default()), md);
    }
}
