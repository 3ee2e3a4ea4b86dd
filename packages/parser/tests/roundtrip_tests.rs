//! Serializer/parser agreement on realistic trees

use drafter_document::{
    Binding, BindingContext, Component, Content, Element, ElementKind, Ownership, Prop,
    PropValue, RefKind, StateFlag, Style,
};
use drafter_parser::{parse, serialize, serialize_module, ParseError, ParsedTree};
use serde_json::json;
use std::collections::HashMap;

fn context() -> BindingContext {
    let component = Component::new("cmp-card", "Card")
        .with_prop(
            Prop::new("prop-title", "title", "string", json!("Card title"))
                .with_value(PropValue::new("pv-1", json!("Welcome")).as_default()),
        )
        .with_prop(Prop::new("prop-width", "width", "number", json!(320)));

    BindingContext::from_component(&component).with_target(
        RefKind::Token,
        "tok-primary",
        "primary",
        Some("#3366ff".to_string()),
    )
}

fn card_tree() -> HashMap<String, Element> {
    let elements = vec![
        Element::new("card", "div", Ownership::component("cmp-card"))
            .with_kind(ElementKind::Component)
            .with_name("Card")
            .with_style(
                Style::new()
                    .with_literal("padding", 16.0)
                    .with_literal("display", "flex")
                    .with_binding("width", Binding::prop("prop-width"))
                    .with_binding("background", Binding::new(RefKind::Token, "tok-primary")),
            )
            .with_children(["title", "body", "cta", "logo"]),
        Element::new("title", "h2", Ownership::element("card"))
            .with_content(Content::bound(Binding::prop("prop-title"))),
        Element::new("body", "p", Ownership::element("card"))
            .with_text("Lorem ipsum dolor")
            .with_state("isVisible", StateFlag::Bool(true)),
        Element::new("cta", "button", Ownership::element("card"))
            .with_text("  Go  ")
            .with_attribute("type", "button")
            .with_event("onClick", "() => navigate(\"/next\")")
            .with_state("variant", StateFlag::Text("primary".into())),
        Element::new("logo", "img", Ownership::element("card"))
            .with_attribute("src", "/logo.svg")
            .with_style(Style::new().with_literal("height", "24")),
    ];
    elements.into_iter().map(|e| (e.id.clone(), e)).collect()
}

fn single(element: Element) -> HashMap<String, Element> {
    HashMap::from([(element.id.clone(), element)])
}

fn to_lookup(tree: ParsedTree) -> HashMap<String, Element> {
    tree.elements.into_iter().map(|e| (e.id.clone(), e)).collect()
}

#[test]
fn test_roundtrip_law_bare_jsx() {
    let ctx = context();
    let first = serialize(&card_tree(), "card", &ctx);

    let parsed = parse(&first, &ctx).unwrap();
    assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
    let second = serialize(&to_lookup(parsed), "card", &ctx);

    assert_eq!(first, second);
}

#[test]
fn test_roundtrip_law_module() {
    let ctx = context();
    let first = serialize_module(&card_tree(), "card", "Card", &ctx);
    assert!(first.starts_with("import { props } from \"./props\";"));
    assert!(first.contains("export default function Card() {"));

    let parsed = parse(&first, &ctx).unwrap();
    let second = serialize_module(&to_lookup(parsed), "card", "Card", &ctx);
    assert_eq!(first, second);
}

#[test]
fn test_parsed_tree_preserves_semantics() {
    let ctx = context();
    let source = serialize(&card_tree(), "card", &ctx);
    let tree = parse(&source, &ctx).unwrap();

    assert_eq!(
        tree.ids().collect::<Vec<_>>(),
        ["card", "title", "body", "cta", "logo"]
    );

    let card = tree.element("card").unwrap();
    assert_eq!(card.ownership, Ownership::component("cmp-card"));
    assert_eq!(card.properties.style.binding_for("width").unwrap().ref_id, "prop-width");
    assert_eq!(
        card.properties.style.binding_for("background").unwrap().ref_kind,
        RefKind::Token
    );

    let title = tree.element("title").unwrap();
    let binding = title.properties.content.binding.as_ref().unwrap();
    assert_eq!(binding.path.as_deref(), Some("props.title"));
    assert_eq!(binding.fallback.as_deref(), Some("Welcome"));

    let cta = tree.element("cta").unwrap();
    assert_eq!(cta.properties.content.text.as_deref(), Some("  Go  "));
    assert_eq!(
        cta.properties.events.get("onClick").map(String::as_str),
        Some("() => navigate(\"/next\")")
    );

    let logo = tree.element("logo").unwrap();
    assert_eq!(
        logo.properties.style.literal("height").map(|l| l.to_string()),
        Some("24px".to_string())
    );
}

#[test]
fn test_free_text_prop_names_roundtrip() {
    let ctx = BindingContext::from_component(
        &Component::new("cmp-btn", "Button")
            .with_prop(Prop::new("prop-label", "Button Label", "string", json!("Click"))),
    );
    let tree = single(
        Element::new("btn", "button", Ownership::component("cmp-btn"))
            .with_kind(ElementKind::Component)
            .with_style(Style::new().with_binding("color", Binding::prop("prop-label")))
            .with_content(Content::bound(Binding::prop("prop-label"))),
    );

    let first = serialize(&tree, "btn", &ctx);
    assert!(first.contains(r#"style={{ color: props["Button Label"] }}"#));
    assert!(first.contains(r#"{props["Button Label"]}"#));

    let parsed = parse(&first, &ctx).unwrap();
    assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
    let btn = parsed.element("btn").unwrap();
    assert_eq!(btn.properties.style.binding_for("color").unwrap().ref_id, "prop-label");
    assert_eq!(btn.properties.content.binding.as_ref().unwrap().ref_id, "prop-label");

    assert_eq!(first, serialize(&to_lookup(parsed), "btn", &ctx));
}

#[test]
fn test_handlers_and_quoted_values_roundtrip() {
    let ctx = context();
    let title = "say \"hi\"\nC:\\temp & more";
    let tree = single(
        Element::new("cta", "button", Ownership::screen("S1"))
            .with_text("Go")
            .with_attribute("title", title)
            .with_event("onClick", "\"go\"")
            .with_event("onHover", "")
            .with_state("hint", StateFlag::Text("a \"quoted\" hint".into())),
    );

    let first = serialize(&tree, "cta", &ctx);
    assert!(!first.contains(r"\n"));
    assert!(!first.contains(r#"\""#));

    let parsed = parse(&first, &ctx).unwrap();
    assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
    let cta = parsed.element("cta").unwrap();
    assert_eq!(cta.properties.attributes.get("title").map(String::as_str), Some(title));
    assert_eq!(cta.properties.attributes.len(), 1);
    assert_eq!(cta.properties.events.get("onClick").map(String::as_str), Some("\"go\""));
    assert_eq!(cta.properties.events.get("onHover").map(String::as_str), Some(""));
    assert_eq!(
        cta.properties.state.get("hint"),
        Some(&StateFlag::Text("a \"quoted\" hint".into()))
    );

    assert_eq!(first, serialize(&to_lookup(parsed), "cta", &ctx));
}

#[test]
fn test_unresolvable_prop_parses_without_binding() {
    let ctx = context();
    let source = r#"<div id="a" kind="element" ownership-type="screen" owner-id="S1" style={{ width: props.unknownProp }}>
  {/* has-bindings */}
</div>"#;

    let tree = parse(source, &ctx).unwrap();
    let element = tree.root().unwrap();
    assert!(element.properties.style.binding.is_none());
    assert!(element.properties.style.literal("width").is_none());
    assert!(element.properties.content.is_empty());
}

#[test]
fn test_hand_edited_source_is_accepted() {
    let ctx = context();
    let source = r#"
// edited in the live editor
import { props } from "./props";

export default function Card() {
  const unused = `template ${1}`;
  return (
    <div id="card" kind="component" ownership-type="component" component-id="cmp-card">
      <h2 id="title">
        {props.title}
      </h2>
      <p id="new">
        Freshly typed
        across lines
      </p>
    </div>
  );
}
"#;

    let tree = parse(source, &ctx).unwrap();
    assert_eq!(tree.root().unwrap().children(), ["title", "new"]);
    let fresh = tree.element("new").unwrap();
    assert_eq!(fresh.ownership, Ownership::element("card"));
    assert_eq!(
        fresh.properties.content.text.as_deref(),
        Some("Freshly typed across lines")
    );
}

#[test]
fn test_broken_source_is_an_error() {
    let ctx = context();
    let cases = [
        "export default function X() { return (<div id=\"a\" ownership-type=\"screen\" owner-id=\"S\">); }",
        "<div id=\"a\" kind=\"widget\" ownership-type=\"screen\" owner-id=\"S\" />",
        "<div id=\"a\" ownership-type=\"planet\" owner-id=\"S\" />",
        "const x = 1;",
    ];

    for source in cases {
        assert!(parse(source, &ctx).is_err(), "expected failure for {}", source);
    }
    assert_eq!(parse("const x = 1;", &ctx).unwrap_err(), ParseError::MissingRoot);
}
