//! Rebuild store elements from a parsed JSX tree

use crate::ast::{AttrValue, JsxAttribute, JsxChild, JsxElement, JsxExpression};
use crate::diagnostic::{rules, Diagnostic};
use crate::error::{ParseError, ParseResult};
use crate::expression::Expression;
use crate::id_generator::IDGenerator;
use crate::markup::*;
use drafter_document::{
    member_expression, reconcile_properties, Binding, BindingContext, BindingTarget, Content,
    Element, ElementId, ElementKind, ElementLookup, Literal, OwnerType, Ownership, RefKind,
    StateFlag, Style,
};
use std::collections::{HashMap, HashSet};

/// Elements recovered from one source text, in pre-order
#[derive(Debug, Clone)]
pub struct ParsedTree {
    pub root_id: ElementId,
    pub elements: Vec<Element>,
    pub diagnostics: Vec<Diagnostic>,
    index: HashMap<ElementId, usize>,
}

impl ParsedTree {
    pub fn root(&self) -> Option<&Element> {
        self.element(&self.root_id)
    }

    pub fn element(&self, id: &str) -> Option<&Element> {
        self.index.get(id).and_then(|i| self.elements.get(*i))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().map(|e| e.id.as_str())
    }

    pub fn into_elements(self) -> Vec<Element> {
        self.elements
    }
}

impl ElementLookup for ParsedTree {
    fn element(&self, id: &str) -> Option<&Element> {
        ParsedTree::element(self, id)
    }
}

pub struct Reconstructor<'ctx> {
    ctx: &'ctx BindingContext,
    id_generator: IDGenerator,
    seen: HashSet<ElementId>,
    elements: Vec<Element>,
    diagnostics: Vec<Diagnostic>,
}

impl<'ctx> Reconstructor<'ctx> {
    pub fn new(ctx: &'ctx BindingContext, id_generator: IDGenerator) -> Self {
        Self {
            ctx,
            id_generator,
            seen: HashSet::new(),
            elements: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn reconstruct(mut self, root: &JsxElement) -> ParseResult<ParsedTree> {
        let root_id = self.build(root, None)?;
        let index = self
            .elements
            .iter()
            .enumerate()
            .map(|(i, e)| (e.id.clone(), i))
            .collect();

        Ok(ParsedTree {
            root_id,
            elements: self.elements,
            diagnostics: self.diagnostics,
            index,
        })
    }

    fn build(&mut self, node: &JsxElement, parent: Option<&str>) -> ParseResult<ElementId> {
        let id = match node.attribute(ATTR_ID) {
            Some(attr) => string_attr(attr)?,
            None => {
                let id = self.id_generator.new_id();
                self.diagnostics.push(
                    Diagnostic::info(
                        rules::GENERATED_ID,
                        format!("<{}> has no id, generated '{}'", node.tag, id),
                    )
                    .with_span(node.span.clone())
                    .for_element(&id),
                );
                id
            }
        };
        if !self.seen.insert(id.clone()) {
            return Err(ParseError::invalid_syntax(
                node.span.clone(),
                format!("duplicate element id '{}'", id),
            ));
        }

        let kind = match node.attribute(ATTR_KIND) {
            Some(attr) => {
                let value = string_attr(attr)?;
                ElementKind::parse(&value).ok_or_else(|| {
                    ParseError::invalid_syntax(attr.span.clone(), format!("unknown kind '{}'", value))
                })?
            }
            None => ElementKind::Element,
        };

        let mut element =
            Element::new(id.clone(), node.tag.clone(), ownership(node, parent)?).with_kind(kind);
        if let Some(attr) = node.attribute(ATTR_NAME) {
            element.name = Some(string_attr(attr)?);
        }
        if let Some(attr) = node.attribute(ATTR_INSTANCE_REF) {
            element.instance_ref = Some(string_attr(attr)?);
        }

        for attr in &node.attributes {
            self.apply_attribute(&mut element, attr)?;
        }

        let index = self.elements.len();
        self.elements.push(element);

        let mut child_ids = Vec::new();
        let mut text = Vec::new();
        let mut content = Content::default();
        for child in &node.children {
            match child {
                JsxChild::Element(child) => child_ids.push(self.build(child, Some(&id))?),
                JsxChild::Text { value, .. } => text.push(value.clone()),
                JsxChild::Expression(expr) => {
                    self.apply_child_expression(&id, expr, &mut text, &mut content)
                }
            }
        }
        if !text.is_empty() {
            content.text = Some(text.join(" "));
        }

        let element = &mut self.elements[index];
        element.properties.children = child_ids;
        element.properties.content = content;
        reconcile_properties(&mut element.properties);

        Ok(id)
    }

    fn apply_attribute(&mut self, element: &mut Element, attr: &JsxAttribute) -> ParseResult<()> {
        if is_metadata_attr(&attr.name) {
            return Ok(());
        }
        if attr.name == ATTR_STYLE {
            element.properties.style = self.parse_style(&element.id, attr)?;
            return Ok(());
        }

        if let Some(flag) = attr.name.strip_prefix(STATE_PREFIX) {
            let value = match &attr.value {
                AttrValue::Implicit => Some(StateFlag::Bool(true)),
                AttrValue::Str(s) => Some(StateFlag::Text(s.clone())),
                AttrValue::Expr(expr) => match &expr.expr {
                    Expression::Bool(b) => Some(StateFlag::Bool(*b)),
                    Expression::Str(s) => Some(StateFlag::Text(s.clone())),
                    _ => None,
                },
            };
            match value {
                Some(value) => {
                    element.properties.state.insert(flag.to_string(), value);
                }
                None => self.diagnostics.push(
                    Diagnostic::warning(
                        rules::UNSUPPORTED_STATE,
                        format!("state flag '{}' must be a boolean or string", flag),
                    )
                    .with_span(attr.span.clone())
                    .for_element(&element.id),
                ),
            }
            return Ok(());
        }

        let properties = &mut element.properties;
        match &attr.value {
            AttrValue::Implicit => {
                properties.attributes.insert(attr.name.clone(), "true".to_string());
            }
            AttrValue::Str(s) => {
                properties.attributes.insert(attr.name.clone(), s.clone());
            }
            // Attributes are always written as strings, so any braced value is a handler
            AttrValue::Expr(expr) => {
                properties
                    .events
                    .insert(attr.name.clone(), expr.raw.trim().to_string());
            }
        }
        Ok(())
    }

    fn parse_style(&mut self, element_id: &str, attr: &JsxAttribute) -> ParseResult<Style> {
        let entries = match &attr.value {
            AttrValue::Expr(JsxExpression {
                expr: Expression::Object(entries),
                ..
            }) => entries,
            _ => {
                return Err(ParseError::invalid_syntax(
                    attr.span.clone(),
                    "style must be an object literal",
                ))
            }
        };

        let mut style = Style::new();
        for (key, value) in entries {
            match value {
                Expression::Str(s) => {
                    style.values.insert(key.clone(), Literal::Text(s.clone()));
                }
                Expression::Number(n) => {
                    style.values.insert(key.clone(), Literal::Number(*n));
                }
                Expression::Member(path) => match self.resolve(path) {
                    Some(target) => {
                        let binding = Binding::new(target.kind, target.id.clone())
                            .with_path(path_text(path));
                        style
                            .binding
                            .get_or_insert_with(Default::default)
                            .insert(key.clone(), binding);
                    }
                    None => self.unresolved(element_id, path, attr.span.clone()),
                },
                _ => {
                    return Err(ParseError::invalid_syntax(
                        attr.span.clone(),
                        format!("unsupported value for style property '{}'", key),
                    ))
                }
            }
        }
        Ok(style)
    }

    fn apply_child_expression(
        &mut self,
        element_id: &str,
        expr: &JsxExpression,
        text: &mut Vec<String>,
        content: &mut Content,
    ) {
        if expr.raw.trim() == BINDINGS_MARKER {
            return;
        }

        match &expr.expr {
            Expression::Empty => {}
            Expression::Str(s) => text.push(s.clone()),
            Expression::Member(path) => match self.resolve(path) {
                Some(target) => {
                    let mut binding =
                        Binding::new(target.kind, target.id.clone()).with_path(path_text(path));
                    binding.fallback = target.default_display.clone();
                    content.binding = Some(binding);
                }
                None => self.unresolved(element_id, path, expr.span.clone()),
            },
            _ => content.expression = Some(expr.raw.trim().to_string()),
        }
    }

    /// `<namespace>.<name>` against the binding context
    fn resolve(&self, path: &[String]) -> Option<&'ctx BindingTarget> {
        let [namespace, name] = path else {
            return None;
        };
        let kind = RefKind::from_namespace(namespace)?;
        self.ctx.by_name(kind, name)
    }

    fn unresolved(&mut self, element_id: &str, path: &[String], span: std::ops::Range<usize>) {
        self.diagnostics.push(
            Diagnostic::warning(
                rules::UNRESOLVED_BINDING,
                format!("'{}' does not resolve to a known binding target", path_text(path)),
            )
            .with_span(span)
            .for_element(element_id),
        );
    }
}

/// Source text of a member path, in the form the serializer writes it
fn path_text(path: &[String]) -> String {
    match path {
        [namespace, name] => member_expression(namespace, name),
        _ => path.join("."),
    }
}

fn string_attr(attr: &JsxAttribute) -> ParseResult<String> {
    attr.value.as_str().map(str::to_string).ok_or_else(|| {
        ParseError::invalid_syntax(
            attr.span.clone(),
            format!("attribute '{}' must be a string", attr.name),
        )
    })
}

fn ownership(node: &JsxElement, parent: Option<&str>) -> ParseResult<Ownership> {
    let owner_type = match node.attribute(ATTR_OWNERSHIP_TYPE) {
        Some(attr) => {
            let value = string_attr(attr)?;
            Some(OwnerType::parse(&value).ok_or_else(|| {
                ParseError::invalid_syntax(
                    attr.span.clone(),
                    format!("unknown ownership type '{}'", value),
                )
            })?)
        }
        None => None,
    };
    let component_id = node.attribute(ATTR_COMPONENT_ID).map(string_attr).transpose()?;
    let owner_id = node.attribute(ATTR_OWNER_ID).map(string_attr).transpose()?;

    match owner_type {
        Some(OwnerType::Component) => component_id
            .or(owner_id)
            .map(Ownership::component)
            .ok_or_else(|| {
                ParseError::invalid_syntax(
                    node.span.clone(),
                    "component-owned element requires component-id",
                )
            }),
        Some(owner_type) => owner_id
            .or_else(|| parent.map(str::to_string))
            .map(|id| Ownership::new(owner_type, id))
            .ok_or_else(|| {
                ParseError::invalid_syntax(
                    node.span.clone(),
                    format!("{}-owned element requires owner-id", owner_type.as_str()),
                )
            }),
        None => parent.map(Ownership::element).ok_or_else(|| {
            ParseError::invalid_syntax(node.span.clone(), "root element requires ownership-type")
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use drafter_document::{Component, Prop};
    use serde_json::json;

    fn context() -> BindingContext {
        BindingContext::from_component(
            &Component::new("cmp-1", "Card")
                .with_prop(Prop::new("prop-label", "label", "string", json!("Untitled")))
                .with_prop(Prop::new("prop-width", "width", "number", json!(120))),
        )
    }

    fn rebuild(source: &str) -> ParseResult<ParsedTree> {
        let ctx = context();
        let root = Parser::new(source).parse_document()?;
        Reconstructor::new(&ctx, IDGenerator::new("/test.jsx")).reconstruct(&root)
    }

    #[test]
    fn test_metadata_and_default_ownership() {
        let tree = rebuild(
            r#"<div id="root" kind="component" name="Card" ownership-type="component" component-id="cmp-1">
  <span id="label">Hi</span>
</div>"#,
        )
        .unwrap();

        let root = tree.root().unwrap();
        assert_eq!(root.kind, ElementKind::Component);
        assert_eq!(root.name.as_deref(), Some("Card"));
        assert_eq!(root.ownership, Ownership::component("cmp-1"));
        assert_eq!(root.children(), ["label"]);

        let label = tree.element("label").unwrap();
        assert_eq!(label.ownership, Ownership::element("root"));
        assert_eq!(label.properties.content.text.as_deref(), Some("Hi"));
    }

    #[test]
    fn test_style_bindings_resolve_by_name() {
        let tree = rebuild(
            r#"<div id="a" ownership-type="screen" owner-id="S1" style={{ width: props.width, color: "red" }} />"#,
        )
        .unwrap();

        let style = &tree.root().unwrap().properties.style;
        let binding = style.binding_for("width").unwrap();
        assert_eq!(binding.ref_id, "prop-width");
        assert_eq!(binding.path.as_deref(), Some("props.width"));
        assert!(style.literal("width").is_none());
        assert_eq!(style.literal("color"), Some(&Literal::text("red")));
    }

    #[test]
    fn test_unresolved_binding_is_dropped_with_warning() {
        let tree = rebuild(
            r#"<div id="a" ownership-type="screen" owner-id="S1" style={{ width: props.unknownProp }} />"#,
        )
        .unwrap();

        assert!(tree.root().unwrap().properties.style.is_empty());
        assert_eq!(tree.diagnostics.len(), 1);
        assert_eq!(tree.diagnostics[0].rule, rules::UNRESOLVED_BINDING);
    }

    #[test]
    fn test_content_binding_records_fallback() {
        let tree = rebuild(
            r#"<p id="a" ownership-type="screen" owner-id="S1">{/* has-bindings */}{props.label}</p>"#,
        )
        .unwrap();

        let binding = tree.root().unwrap().properties.content.binding.clone().unwrap();
        assert_eq!(binding.ref_id, "prop-label");
        assert_eq!(binding.fallback.as_deref(), Some("Untitled"));
    }

    #[test]
    fn test_opaque_content_and_events() {
        let tree = rebuild(
            r#"<button id="b" ownership-type="screen" owner-id="S1" onClick={handleClick} type="submit" data-state-disabled={false}>{count + 1}</button>"#,
        )
        .unwrap();

        let props = &tree.root().unwrap().properties;
        assert_eq!(props.events.get("onClick").map(String::as_str), Some("handleClick"));
        assert_eq!(props.attributes.get("type").map(String::as_str), Some("submit"));
        assert_eq!(props.state.get("disabled"), Some(&StateFlag::Bool(false)));
        assert_eq!(props.content.expression.as_deref(), Some("count + 1"));
    }

    #[test]
    fn test_braced_values_are_handlers() {
        let tree = rebuild(
            r#"<button id="b" ownership-type="screen" owner-id="S1" onClick={"go"} onHover={} tabIndex={0}>Go</button>"#,
        )
        .unwrap();

        let props = &tree.root().unwrap().properties;
        assert_eq!(props.events.get("onClick").map(String::as_str), Some(r#""go""#));
        assert_eq!(props.events.get("onHover").map(String::as_str), Some(""));
        assert_eq!(props.events.get("tabIndex").map(String::as_str), Some("0"));
        assert!(props.attributes.is_empty());
        assert!(tree.diagnostics.is_empty());
    }

    #[test]
    fn test_computed_member_binding() {
        let ctx = BindingContext::from_component(
            &Component::new("cmp-1", "Card")
                .with_prop(Prop::new("prop-label", "Button Label", "string", json!("Untitled"))),
        );
        let root = Parser::new(
            r#"<p id="a" ownership-type="screen" owner-id="S1" style={{ color: props["Button Label"] }}>{props["Button Label"]}</p>"#,
        )
        .parse_document()
        .unwrap();
        let tree = Reconstructor::new(&ctx, IDGenerator::new("/test.jsx"))
            .reconstruct(&root)
            .unwrap();

        let props = &tree.root().unwrap().properties;
        let binding = props.content.binding.clone().unwrap();
        assert_eq!(binding.ref_id, "prop-label");
        assert_eq!(binding.path.as_deref(), Some(r#"props["Button Label"]"#));
        let style_binding = &props.style.binding.as_ref().unwrap()["color"];
        assert_eq!(style_binding.ref_id, "prop-label");
    }

    #[test]
    fn test_missing_id_is_generated() {
        let tree = rebuild(r#"<div id="a" ownership-type="screen" owner-id="S1"><span /></div>"#)
            .unwrap();
        let child = &tree.root().unwrap().children()[0];
        assert!(child.starts_with(&crate::id_generator::get_document_id("/test.jsx")));
        assert!(tree.contains(child));
    }

    #[test]
    fn test_duplicate_id_is_error() {
        let err = rebuild(
            r#"<div id="a" ownership-type="screen" owner-id="S1"><span id="a" /></div>"#,
        )
        .unwrap_err();
        assert!(matches!(err, ParseError::InvalidSyntax { .. }));
    }

    #[test]
    fn test_invalid_style_shape_is_error() {
        assert!(rebuild(r#"<div id="a" ownership-type="screen" owner-id="S1" style="color: red" />"#).is_err());
        assert!(rebuild(r#"<div id="a" ownership-type="screen" owner-id="S1" style={{ width: a + b }} />"#).is_err());
    }

    #[test]
    fn test_root_requires_ownership() {
        assert!(rebuild(r#"<div id="a" />"#).is_err());
    }
}
