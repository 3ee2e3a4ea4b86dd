//! # Binding Resolver
//!
//! Keeps every style key and the content slot either literal or bound, never
//! both. [`reconcile`] is the single rule applied before any element is
//! committed to the store or returned from the parser:
//!
//! 1. a key that has both a literal and a binding keeps the literal
//! 2. a key that is still bound loses its literal
//! 3. an empty binding map is removed
//!
//! Merging a patch first clears the opposite side of whatever the patch writes,
//! so the most recent write wins and [`reconcile`] only has to settle
//! collisions inside a single patch.

use crate::component::{Component, Prop};
use crate::model::{Content, Properties, Style};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// What a binding points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefKind {
    Prop,
    Token,
    Data,
}

impl RefKind {
    /// Object name used for member expressions in source (`props.label`)
    pub fn namespace(&self) -> &'static str {
        match self {
            RefKind::Prop => "props",
            RefKind::Token => "tokens",
            RefKind::Data => "data",
        }
    }

    pub fn from_namespace(namespace: &str) -> Option<Self> {
        match namespace {
            "props" => Some(RefKind::Prop),
            "tokens" => Some(RefKind::Token),
            "data" => Some(RefKind::Data),
            _ => None,
        }
    }
}

impl fmt::Display for RefKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.namespace())
    }
}

/// Reference from a property to an external value source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Binding {
    pub ref_kind: RefKind,
    pub ref_id: String,

    /// Member expression last emitted for this binding
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Display text shown while the bound value is unavailable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<String>,
}

impl Binding {
    pub fn new(ref_kind: RefKind, ref_id: impl Into<String>) -> Self {
        Self {
            ref_kind,
            ref_id: ref_id.into(),
            path: None,
            fallback: None,
        }
    }

    pub fn prop(ref_id: impl Into<String>) -> Self {
        Self::new(RefKind::Prop, ref_id)
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = Some(fallback.into());
        self
    }

    /// Same target, ignoring the traced path and fallback text
    pub fn same_target(&self, other: &Binding) -> bool {
        self.ref_kind == other.ref_kind && self.ref_id == other.ref_id
    }
}

/// Where a binding lives on an element
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BindingSlot {
    Style(String),
    Content,
}

/// Member expression emitted for one binding during serialization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracedPath {
    pub element_id: String,
    pub slot: BindingSlot,
    pub path: String,

    /// Current default of the target, recorded for bound content
    pub fallback: Option<String>,
}

/// Enforce literal/binding exclusivity on a style map
pub fn reconcile(mut style: Style) -> Style {
    reconcile_style(&mut style);
    style
}

pub fn reconcile_style(style: &mut Style) {
    if let Some(bound) = &mut style.binding {
        let values = &style.values;
        bound.retain(|key, _| !values.contains_key(key));

        for key in bound.keys() {
            style.values.remove(key);
        }
    }
    style.prune();
}

pub fn reconcile_content(content: &mut Content) {
    if content.binding.is_some() && content.has_literal() {
        content.binding = None;
    }
    if content.binding.is_some() {
        content.text = None;
        content.expression = None;
    }
}

pub fn reconcile_properties(properties: &mut Properties) {
    reconcile_style(&mut properties.style);
    reconcile_content(&mut properties.content);
}

impl Style {
    /// Merge `patch` into this style; the patch's writes replace the opposite
    /// side of the same key.
    pub fn merge(&mut self, patch: &Style) {
        for (key, value) in &patch.values {
            if let Some(bound) = &mut self.binding {
                bound.remove(key);
            }
            self.values.insert(key.clone(), value.clone());
        }

        if let Some(patch_bound) = &patch.binding {
            for (key, binding) in patch_bound {
                if !patch.values.contains_key(key) {
                    self.values.remove(key);
                }
                self.binding
                    .get_or_insert_with(Default::default)
                    .insert(key.clone(), binding.clone());
            }
        }

        reconcile_style(self);
    }
}

impl Content {
    pub fn merge(&mut self, patch: &Content) {
        if patch.text.is_some() {
            self.text = patch.text.clone();
            self.expression = None;
            self.binding = None;
        }
        if patch.expression.is_some() {
            self.expression = patch.expression.clone();
            self.text = None;
            self.binding = None;
        }
        if patch.binding.is_some() {
            self.binding = patch.binding.clone();
            if !patch.has_literal() {
                self.text = None;
                self.expression = None;
            }
        }
        reconcile_content(self);
    }
}

/// Something a member expression in source can resolve to
#[derive(Debug, Clone, PartialEq)]
pub struct BindingTarget {
    pub kind: RefKind,
    pub id: String,
    pub name: String,
    pub default_display: Option<String>,
}

/// Name and id lookup shared by the serializer and the parser
#[derive(Debug, Clone, Default)]
pub struct BindingContext {
    targets: Vec<BindingTarget>,
}

impl BindingContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context exposing every prop of `component` under `props.<name>`
    pub fn from_component(component: &Component) -> Self {
        let mut ctx = Self::new();
        for prop in &component.props {
            ctx.add_prop(prop);
        }
        ctx
    }

    pub fn add_prop(&mut self, prop: &Prop) {
        self.targets.push(BindingTarget {
            kind: RefKind::Prop,
            id: prop.id.clone(),
            name: prop.name.clone(),
            default_display: display_value(prop.current_default()),
        });
    }

    pub fn add_target(&mut self, target: BindingTarget) {
        self.targets.push(target);
    }

    pub fn with_target(
        mut self,
        kind: RefKind,
        id: impl Into<String>,
        name: impl Into<String>,
        default_display: Option<String>,
    ) -> Self {
        self.add_target(BindingTarget {
            kind,
            id: id.into(),
            name: name.into(),
            default_display,
        });
        self
    }

    pub fn by_name(&self, kind: RefKind, name: &str) -> Option<&BindingTarget> {
        self.targets.iter().find(|t| t.kind == kind && t.name == name)
    }

    pub fn by_id(&self, kind: RefKind, id: &str) -> Option<&BindingTarget> {
        self.targets.iter().find(|t| t.kind == kind && t.id == id)
    }

    /// Member expression for a binding, e.g. `props.label`
    pub fn reference_for(&self, binding: &Binding) -> Option<String> {
        self.by_id(binding.ref_kind, &binding.ref_id)
            .map(|target| member_expression(binding.ref_kind.namespace(), &target.name))
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// `props.label`, or `props["Button Label"]` when the name is not an identifier
pub fn member_expression(namespace: &str, name: &str) -> String {
    if is_identifier(name) {
        return format!("{}.{}", namespace, name);
    }
    let quoted = serde_json::to_string(name).unwrap_or_else(|_| format!("\"{}\"", name));
    format!("{}[{}]", namespace, quoted)
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Render a JSON value as display text (`null` has none)
pub fn display_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::PropValue;
    use serde_json::json;

    #[test]
    fn test_literal_wins_on_collision() {
        let style = Style::new()
            .with_literal("width", "10px")
            .with_binding("width", Binding::prop("propA"));

        let style = reconcile(style);
        assert_eq!(style.literal("width"), Some(&"10px".into()));
        assert!(style.binding.is_none());
    }

    #[test]
    fn test_binding_strips_nothing_without_collision() {
        let style = Style::new()
            .with_literal("color", "red")
            .with_binding("width", Binding::prop("propA"));

        let style = reconcile(style);
        assert_eq!(style.literal("color"), Some(&"red".into()));
        assert!(style.binding_for("width").is_some());
    }

    #[test]
    fn test_empty_binding_map_pruned() {
        let mut style = Style::new();
        style.binding = Some(Default::default());
        assert!(reconcile(style).binding.is_none());
    }

    #[test]
    fn test_merge_binding_replaces_base_literal() {
        let mut style = Style::new().with_literal("width", "10px");
        style.merge(&Style::new().with_binding("width", Binding::prop("propA")));

        assert!(style.literal("width").is_none());
        assert_eq!(style.binding_for("width").unwrap().ref_id, "propA");
    }

    #[test]
    fn test_merge_literal_replaces_base_binding() {
        let mut style = Style::new().with_binding("width", Binding::prop("propA"));
        style.merge(&Style::new().with_literal("width", "10px"));

        assert_eq!(style.literal("width"), Some(&"10px".into()));
        assert!(style.binding.is_none());
    }

    #[test]
    fn test_merge_patch_with_both_keeps_literal() {
        let mut style = Style::new();
        style.merge(
            &Style::new()
                .with_literal("width", "10px")
                .with_binding("width", Binding::prop("propA")),
        );
        assert_eq!(style.literal("width"), Some(&"10px".into()));
        assert!(style.binding.is_none());
    }

    #[test]
    fn test_content_exclusivity() {
        let mut content = Content {
            text: Some("Hi".to_string()),
            binding: Some(Binding::prop("label")),
            expression: None,
        };
        reconcile_content(&mut content);
        assert_eq!(content.text.as_deref(), Some("Hi"));
        assert!(content.binding.is_none());

        let mut content = Content::text("Hi");
        content.merge(&Content::bound(Binding::prop("label")));
        assert!(content.text.is_none());
        assert!(content.binding.is_some());
    }

    #[test]
    fn test_context_lookup_and_reference() {
        let component = Component::new("cmp-1", "Card").with_prop(
            Prop::new("prop-1", "label", "string", json!("Untitled"))
                .with_value(PropValue::new("pv-1", json!("Hello")).as_default()),
        );

        let ctx = BindingContext::from_component(&component);
        let target = ctx.by_name(RefKind::Prop, "label").unwrap();
        assert_eq!(target.id, "prop-1");
        assert_eq!(target.default_display.as_deref(), Some("Hello"));

        let reference = ctx.reference_for(&Binding::prop("prop-1"));
        assert_eq!(reference.as_deref(), Some("props.label"));
        assert!(ctx.reference_for(&Binding::prop("missing")).is_none());
    }

    #[test]
    fn test_member_expression_quotes_free_text_names() {
        assert_eq!(member_expression("props", "label"), "props.label");
        assert_eq!(member_expression("props", "Button Label"), r#"props["Button Label"]"#);
        assert_eq!(member_expression("tokens", "font-size"), r#"tokens["font-size"]"#);
        assert_eq!(member_expression("data", "2nd"), r#"data["2nd"]"#);
    }
}
