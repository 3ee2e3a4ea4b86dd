//! Element data model
//!
//! Elements are stored flat: `properties.children` holds ids, never nested
//! elements, so the store can index and patch every node independently.

use crate::binding::Binding;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub type ElementId = String;
pub type ComponentId = String;

/// What an element renders as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    #[default]
    Element,
    Instance,
    Component,
}

impl ElementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementKind::Element => "element",
            ElementKind::Instance => "instance",
            ElementKind::Component => "component",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "element" => Some(ElementKind::Element),
            "instance" => Some(ElementKind::Instance),
            "component" => Some(ElementKind::Component),
            _ => None,
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of context that owns an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OwnerType {
    Screen,
    Component,
    Element,
}

impl OwnerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OwnerType::Screen => "screen",
            OwnerType::Component => "component",
            OwnerType::Element => "element",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "screen" => Some(OwnerType::Screen),
            "component" => Some(OwnerType::Component),
            "element" => Some(OwnerType::Element),
            _ => None,
        }
    }
}

impl fmt::Display for OwnerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single structural owner of an element
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ownership {
    #[serde(rename = "type")]
    pub owner_type: OwnerType,
    pub owner_id: String,
}

impl Ownership {
    pub fn new(owner_type: OwnerType, owner_id: impl Into<String>) -> Self {
        Self {
            owner_type,
            owner_id: owner_id.into(),
        }
    }

    pub fn screen(owner_id: impl Into<String>) -> Self {
        Self::new(OwnerType::Screen, owner_id)
    }

    pub fn component(owner_id: impl Into<String>) -> Self {
        Self::new(OwnerType::Component, owner_id)
    }

    pub fn element(owner_id: impl Into<String>) -> Self {
        Self::new(OwnerType::Element, owner_id)
    }
}

/// A directly authored style value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    Number(f64),
    Text(String),
}

impl Literal {
    pub fn text(value: impl Into<String>) -> Self {
        Literal::Text(value.into())
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Number(n) => f.write_str(&format_number(*n)),
            Literal::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Literal::Text(value.to_string())
    }
}

impl From<String> for Literal {
    fn from(value: String) -> Self {
        Literal::Text(value)
    }
}

impl From<f64> for Literal {
    fn from(value: f64) -> Self {
        Literal::Number(value)
    }
}

/// Format a number without a trailing `.0` for integral values
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Style map: literal entries plus the bound subset under `binding`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Style {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binding: Option<BTreeMap<String, Binding>>,

    #[serde(flatten)]
    pub values: BTreeMap<String, Literal>,
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_literal(mut self, key: impl Into<String>, value: impl Into<Literal>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn with_binding(mut self, key: impl Into<String>, binding: Binding) -> Self {
        self.binding
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), binding);
        self
    }

    pub fn literal(&self, key: &str) -> Option<&Literal> {
        self.values.get(key)
    }

    pub fn binding_for(&self, key: &str) -> Option<&Binding> {
        self.binding.as_ref().and_then(|b| b.get(key))
    }

    pub fn has_bindings(&self) -> bool {
        self.binding.as_ref().map(|b| !b.is_empty()).unwrap_or(false)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && !self.has_bindings()
    }

    /// Every key that has either a literal or a binding, in sorted order
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.values.keys().map(|k| k.as_str()).collect();
        if let Some(bound) = &self.binding {
            keys.extend(bound.keys().map(|k| k.as_str()));
        }
        keys.sort_unstable();
        keys.dedup();
        keys
    }

    /// Remove literals and bindings for the given keys
    pub fn remove_keys<S: AsRef<str>>(&mut self, keys: &[S]) {
        for key in keys {
            self.values.remove(key.as_ref());
            if let Some(bound) = &mut self.binding {
                bound.remove(key.as_ref());
            }
        }
        self.prune();
    }

    pub(crate) fn prune(&mut self) {
        if self.binding.as_ref().map(|b| b.is_empty()).unwrap_or(false) {
            self.binding = None;
        }
    }
}

/// Text content of an element
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binding: Option<Binding>,

    /// Source expression kept verbatim when it is neither text nor a reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
}

impl Content {
    pub fn text(value: impl Into<String>) -> Self {
        Self {
            text: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn bound(binding: Binding) -> Self {
        Self {
            binding: Some(binding),
            ..Self::default()
        }
    }

    pub fn expression(value: impl Into<String>) -> Self {
        Self {
            expression: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn has_literal(&self) -> bool {
        self.text.is_some() || self.expression.is_some()
    }

    pub fn is_empty(&self) -> bool {
        !self.has_literal() && self.binding.is_none()
    }
}

/// State flag value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StateFlag {
    Bool(bool),
    Text(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Properties {
    #[serde(default)]
    pub style: Style,

    #[serde(default)]
    pub content: Content,

    #[serde(default)]
    pub attributes: BTreeMap<String, String>,

    #[serde(default)]
    pub events: BTreeMap<String, String>,

    #[serde(default)]
    pub state: BTreeMap<String, StateFlag>,

    #[serde(default)]
    pub children: Vec<ElementId>,
}

impl Properties {
    pub fn has_bindings(&self) -> bool {
        self.style.has_bindings() || self.content.binding.is_some()
    }
}

/// Design element (plain element, component instance, or component root)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub id: ElementId,
    pub tag: String,

    #[serde(default)]
    pub kind: ElementKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub ownership: Ownership,

    #[serde(default)]
    pub properties: Properties,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_ref: Option<ComponentId>,
}

impl Element {
    pub fn new(id: impl Into<String>, tag: impl Into<String>, ownership: Ownership) -> Self {
        Self {
            id: id.into(),
            tag: tag.into(),
            kind: ElementKind::Element,
            name: None,
            ownership,
            properties: Properties::default(),
            instance_ref: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Mark as an instance of `component_id`
    pub fn instance_of(mut self, component_id: impl Into<String>) -> Self {
        self.kind = ElementKind::Instance;
        self.instance_ref = Some(component_id.into());
        self
    }

    pub fn with_kind(mut self, kind: ElementKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.properties.style = style;
        self
    }

    pub fn with_content(mut self, content: Content) -> Self {
        self.properties.content = content;
        self
    }

    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_content(Content::text(text))
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_event(mut self, name: impl Into<String>, handler: impl Into<String>) -> Self {
        self.properties.events.insert(name.into(), handler.into());
        self
    }

    pub fn with_state(mut self, name: impl Into<String>, flag: StateFlag) -> Self {
        self.properties.state.insert(name.into(), flag);
        self
    }

    pub fn with_children<I, S>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.properties.children = children.into_iter().map(Into::into).collect();
        self
    }

    pub fn children(&self) -> &[ElementId] {
        &self.properties.children
    }

    pub fn is_void(&self) -> bool {
        is_void_tag(&self.tag)
    }
}

/// Tags that never receive children, content, or markers
pub fn is_void_tag(tag: &str) -> bool {
    matches!(tag, "img" | "input")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::RefKind;

    #[test]
    fn test_style_serde_shape() {
        let style = Style::new()
            .with_literal("color", "red")
            .with_literal("opacity", 0.5)
            .with_binding("width", Binding::new(RefKind::Prop, "prop-1"));

        let json = serde_json::to_value(&style).unwrap();
        assert_eq!(json["color"], "red");
        assert_eq!(json["opacity"], 0.5);
        assert_eq!(json["binding"]["width"]["refId"], "prop-1");

        let back: Style = serde_json::from_value(json).unwrap();
        assert_eq!(back, style);
    }

    #[test]
    fn test_empty_binding_map_not_serialized() {
        let style = Style::new().with_literal("color", "red");
        let json = serde_json::to_string(&style).unwrap();
        assert!(!json.contains("binding"));
    }

    #[test]
    fn test_element_deserializes_with_defaults() {
        let json = r#"{
            "id": "el-1",
            "tag": "div",
            "ownership": { "type": "screen", "ownerId": "S1" }
        }"#;

        let element: Element = serde_json::from_str(json).unwrap();
        assert_eq!(element.kind, ElementKind::Element);
        assert_eq!(element.ownership, Ownership::screen("S1"));
        assert!(element.properties.children.is_empty());
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(10.0), "10");
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(-3.0), "-3");
    }

    #[test]
    fn test_style_keys_union() {
        let style = Style::new()
            .with_literal("color", "red")
            .with_binding("width", Binding::new(RefKind::Prop, "p"));
        assert_eq!(style.keys(), vec!["color", "width"]);
    }
}
