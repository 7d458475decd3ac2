//! Custom transformer tests
//!
//! Caller-defined rules placed ahead of the built-ins: precedence, deferral between
//! multiline rules, inline custom nodes and error propagation.

use crate::common::{blocks, import_with, runs};
use markbridge::formats::markdown::{ExportContext, InlineImporter, LineImporter};
use markbridge::transformers::{
    ElementTransformer, MultilineElementTransformer, TextMatchTransformer,
};
use markbridge::tree::ElementKind;
use markbridge::{
    convert_from_markdown, convert_to_markdown, export_markdown, import_markdown,
    ConversionError, ConversionOptions, Document, ElementNode, MatchResult, Node, NodeSchema,
    Outcome, TextFormat, TextNode, Transformer, TransformerSet,
};
use regex::Regex;

fn regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap()
}

/// Matches html within an mdx file, claiming only `<MyComponent>`
fn mdx_html() -> MultilineElementTransformer {
    MultilineElementTransformer::new(
        "mdx_html",
        regex(r"<(\w+)[^>]*>"),
        |parent: &mut ElementNode,
         start: &MatchResult,
         _end: Option<&MatchResult>,
         lines: &[String],
         _importer: &LineImporter<'_>| {
            if start.get(1) != Some("MyComponent") {
                return Ok(Outcome::Defer);
            }
            let code = ElementNode::code(start.get(1).map(String::from))
                .with_child(Node::text(format!("From HTML: {}", lines.join("\n"))))?;
            parent.append(code.into())?;
            Ok(Outcome::Handled)
        },
    )
    .with_end(regex(r"<\/(\w+)\s*>"))
    .with_export(|node: &ElementNode, _ctx: &ExportContext<'_>| {
        let text = node.text_content();
        if !matches!(node.kind(), ElementKind::Code { .. }) || !text.starts_with("From HTML:") {
            return Ok(None);
        }
        Ok(Some(format!(
            "<MyComponent>{}</MyComponent>",
            text.replacen("From HTML: ", "", 1)
        )))
    })
    .with_dependencies(["code"])
}

/// Claims any tag the mdx rule deferred
fn embed() -> MultilineElementTransformer {
    MultilineElementTransformer::new(
        "embed",
        regex(r"<(\w+)[^>]*>"),
        |parent: &mut ElementNode,
         start: &MatchResult,
         _end: Option<&MatchResult>,
         lines: &[String],
         _importer: &LineImporter<'_>| {
            let mut embed = ElementNode::custom("embed", false);
            embed.set_attribute("tag", start.get(1).unwrap_or_default())?;
            embed.append(Node::text(lines.join("\n")))?;
            parent.append(embed.into())?;
            Ok(Outcome::Handled)
        },
    )
    .with_end(regex(r"<\/(\w+)\s*>"))
    .with_dependencies(["embed"])
}

/// `$text$` marks text as highlighted, with no trigger character
fn dollar_highlight() -> TextMatchTransformer {
    TextMatchTransformer::new("dollar_highlight").with_import(
        regex(r"\$([^$]+?)\$"),
        |text: TextNode, matched: &MatchResult, _importer: &InlineImporter<'_>| {
            let mut text = text;
            text.set_text(matched.get(1).unwrap_or_default());
            text.toggle_format(TextFormat::HIGHLIGHT);
            Ok(Some(vec![text.into()]))
        },
    )
}

/// `@name` becomes an inline mention node
fn mention() -> TextMatchTransformer {
    TextMatchTransformer::new("mention")
        .with_import(
            regex(r"@(\w+)"),
            |_text: TextNode, matched: &MatchResult, _importer: &InlineImporter<'_>| {
                let name = matched.get(1).unwrap_or_default();
                let mut mention = ElementNode::custom("mention", true);
                mention.set_attribute("name", name)?;
                mention.append(Node::text(name))?;
                Ok(Some(vec![mention.into()]))
            },
        )
        .with_trigger("@")
        .with_export(|node: &ElementNode, _ctx: &ExportContext<'_>| {
            if node.node_type() != "mention" {
                return Ok(None);
            }
            Ok(node.attribute("name").map(|name| format!("@{name}")))
        })
        .with_dependencies(["mention"])
}

/// `:::kind` .. `:::` fences whose body is imported as nested blocks
fn callout() -> MultilineElementTransformer {
    MultilineElementTransformer::new(
        "callout",
        regex(r"^:::(\w+)"),
        |parent: &mut ElementNode,
         start: &MatchResult,
         _end: Option<&MatchResult>,
         lines: &[String],
         importer: &LineImporter<'_>| {
            let mut callout = ElementNode::custom("callout", false);
            callout.set_attribute("kind", start.get(1).unwrap_or("note"))?;
            importer.import_lines(lines, &mut callout)?;
            parent.append(callout.into())?;
            Ok(Outcome::Handled)
        },
    )
    .with_end(regex(r"^:::$"))
    .with_export(|node: &ElementNode, ctx: &ExportContext<'_>| {
        if node.node_type() != "callout" {
            return Ok(None);
        }
        let kind = node.attribute("kind").unwrap_or("note");
        let body = ctx.export_blocks(node.children())?;
        Ok(Some(format!(":::{kind}\n{body}\n:::")))
    })
    .with_dependencies(["callout"])
}

fn document(extra_types: &[&str]) -> Document {
    let mut schema = NodeSchema::standard();
    for node_type in extra_types {
        schema.register(*node_type);
    }
    Document::new(schema)
}

fn import_custom(md: &str, custom: Vec<Transformer>, extra_types: &[&str]) -> Document {
    let mut doc = document(extra_types);
    convert_from_markdown(md, custom, &mut doc, &ConversionOptions::default()).unwrap();
    doc
}

#[test]
fn test_earlier_element_rule_wins() {
    let title = ElementTransformer::new(
        "title",
        regex(r"^(#{1,6})\s"),
        |parent: &mut ElementNode, children: Vec<Node>, _m: &MatchResult, _is_import: bool| {
            let mut title = ElementNode::custom("title", false);
            title.append_all(children)?;
            parent.append(title.into())?;
            Ok(Outcome::Handled)
        },
    )
    .with_dependencies(["title"]);

    let doc = import_custom("# Hello", vec![title.clone().into()], &["title"]);
    assert_eq!(blocks(&doc)[0].node_type(), "title");
    assert_eq!(blocks(&doc)[0].text_content(), "Hello");

    // registered behind the built-ins, the heading rule claims the line first
    let mut set = TransformerSet::builtin();
    set.extend([Transformer::from(title)]);
    let doc = import_with("# Hello", &set, &ConversionOptions::default());
    assert_eq!(blocks(&doc)[0].heading_level(), Some(1));
}

#[test]
fn test_declined_element_rule_falls_through() {
    let picky = ElementTransformer::new(
        "picky",
        regex(r"^#\s"),
        |_parent: &mut ElementNode, _children: Vec<Node>, _m: &MatchResult, _is_import: bool| {
            Ok(Outcome::Declined)
        },
    );
    let doc = import_custom("# Hello", vec![picky.into()], &[]);
    assert_eq!(blocks(&doc)[0].heading_level(), Some(1));
}

#[test]
fn test_text_match_without_trigger() {
    let doc = import_custom("a $b$ c", vec![dollar_highlight().into()], &[]);
    assert_eq!(
        runs(blocks(&doc)[0].children()),
        vec![
            ("a ".to_string(), "plain".to_string()),
            ("b".to_string(), "highlight".to_string()),
            (" c".to_string(), "plain".to_string()),
        ]
    );
}

#[test]
fn test_mdx_component_round_trip() {
    let custom = || vec![Transformer::from(mdx_html())];
    let doc = import_custom("<MyComponent>Hello</MyComponent>", custom(), &[]);
    let code = blocks(&doc)[0];
    assert_eq!(code.language(), Some("MyComponent"));
    assert_eq!(code.text_content(), "From HTML: Hello");

    let md = convert_to_markdown(&doc, custom(), &ConversionOptions::default()).unwrap();
    assert_eq!(md, "<MyComponent>Hello</MyComponent>");
}

#[test]
fn test_mdx_component_spanning_lines() {
    let doc = import_custom(
        "<MyComponent>\nfirst\nsecond\n</MyComponent>\n\nafter",
        vec![mdx_html().into()],
        &[],
    );
    let blocks = blocks(&doc);
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0].text_content(), "From HTML: \nfirst\nsecond\n");
    assert_eq!(blocks[1].text_content(), "after");
}

#[test]
fn test_deferred_span_is_offered_to_the_next_multiline_rule() {
    let doc = import_custom(
        "<Foo>inside</Foo>",
        vec![mdx_html().into(), embed().into()],
        &["embed"],
    );
    let block = blocks(&doc)[0];
    assert_eq!(block.node_type(), "embed");
    assert_eq!(block.attribute("tag"), Some("Foo"));
    assert_eq!(block.text_content(), "inside");
}

#[test]
fn test_deferred_span_without_taker_is_text() {
    let doc = import_custom("<Foo>inside</Foo>", vec![mdx_html().into()], &[]);
    let block = blocks(&doc)[0];
    assert!(matches!(block.kind(), ElementKind::Paragraph));
    assert_eq!(block.text_content(), "<Foo>inside</Foo>");
}

#[test]
fn test_multiline_rule_outranks_element_rules() {
    // a list marker line that is also a multiline start
    let rule = MultilineElementTransformer::new(
        "dash_block",
        regex(r"^- BEGIN"),
        |parent: &mut ElementNode,
         _start: &MatchResult,
         _end: Option<&MatchResult>,
         lines: &[String],
         _importer: &LineImporter<'_>| {
            let block = ElementNode::code(None).with_child(Node::text(lines.join("|")))?;
            parent.append(block.into())?;
            Ok(Outcome::Handled)
        },
    )
    .with_end(regex(r"^- END"));

    let mut set = TransformerSet::builtin();
    set.extend([Transformer::from(rule)]);
    let doc = import_with("- BEGIN\nbody\n- END", &set, &ConversionOptions::default());
    let blocks = blocks(&doc);
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].text_content(), "|body|");
}

#[test]
fn test_callout_imports_nested_blocks() {
    let md = ":::note\nSome **text**\n\n- item\n:::";
    let doc = import_custom(md, vec![callout().into()], &["callout"]);
    let callout_block = blocks(&doc)[0];
    assert_eq!(callout_block.attribute("kind"), Some("note"));
    let inner: Vec<_> = callout_block
        .children()
        .iter()
        .map(|node| node.node_type().to_string())
        .collect();
    assert_eq!(inner, vec!["paragraph", "list"]);

    let exported =
        convert_to_markdown(&doc, vec![callout().into()], &ConversionOptions::default()).unwrap();
    assert_eq!(exported, md);
}

#[test]
fn test_inline_custom_node_round_trip() {
    let set = TransformerSet::with_custom([Transformer::from(mention())]);
    let mut doc = document(&["mention"]);
    let options = ConversionOptions::default();
    import_markdown("hi @alice, meet **bob**!", &set, &mut doc, &options).unwrap();

    let paragraph = blocks(&doc)[0];
    let mentions: Vec<_> = paragraph
        .children()
        .iter()
        .filter_map(Node::as_element)
        .filter_map(|node| node.attribute("name"))
        .collect();
    assert_eq!(mentions, vec!["alice"]);

    assert_eq!(
        export_markdown(&set, &doc, &options).unwrap(),
        "hi @alice, meet **bob**!"
    );
}

#[test]
fn test_declined_multiline_outcome_is_an_error() {
    let broken = MultilineElementTransformer::new(
        "broken",
        regex(r"^%%"),
        |_parent: &mut ElementNode,
         _start: &MatchResult,
         _end: Option<&MatchResult>,
         _lines: &[String],
         _importer: &LineImporter<'_>| Ok(Outcome::Declined),
    );
    let mut doc = Document::default();
    let err = convert_from_markdown(
        "%% note",
        [Transformer::from(broken)],
        &mut doc,
        &ConversionOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        ConversionError::UnexpectedOutcome { transformer, outcome: Outcome::Declined } if transformer == "broken"
    ));
}

#[test]
fn test_transformer_errors_propagate() {
    let failing = ElementTransformer::new(
        "failing",
        regex(r"^!!"),
        |_parent: &mut ElementNode, _children: Vec<Node>, _m: &MatchResult, _is_import: bool| {
            Err(ConversionError::transformer("failing", "refused"))
        },
    );
    let mut doc = Document::default();
    let err = convert_from_markdown(
        "fine\n!! not fine",
        [Transformer::from(failing)],
        &mut doc,
        &ConversionOptions::default(),
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "transformer 'failing' failed: refused");
}

#[test]
fn test_custom_dependency_must_be_registered() {
    let mut doc = Document::default();
    let err = convert_from_markdown(
        "text",
        [Transformer::from(callout())],
        &mut doc,
        &ConversionOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        ConversionError::MissingDependency { node_type, .. } if node_type == "callout"
    ));
}
