//! Partial element updates
//!
//! `None` leaves a field untouched. Map fields merge key by key; `children`
//! replaces the whole list because sibling order is meaningful.

use crate::binding::{reconcile_properties, Binding};
use crate::model::{ComponentId, Content, Element, ElementId, ElementKind, Ownership, StateFlag, Style};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ElementKind>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ownership: Option<Ownership>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_ref: Option<ComponentId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<PropertiesPatch>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertiesPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<Style>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<BTreeMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events: Option<BTreeMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<BTreeMap<String, StateFlag>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<ElementId>>,
}

impl ElementPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ownership(mut self, ownership: Ownership) -> Self {
        self.ownership = Some(ownership);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn style(mut self, style: Style) -> Self {
        self.properties.get_or_insert_with(Default::default).style = Some(style);
        self
    }

    pub fn content(mut self, content: Content) -> Self {
        self.properties.get_or_insert_with(Default::default).content = Some(content);
        self
    }

    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties
            .get_or_insert_with(Default::default)
            .attributes
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn children<I, S>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.properties.get_or_insert_with(Default::default).children =
            Some(children.into_iter().map(Into::into).collect());
        self
    }

    /// Deep-merge this patch into `element` and reconcile the result
    pub fn apply_to(&self, element: &mut Element) {
        if let Some(tag) = &self.tag {
            element.tag = tag.clone();
        }
        if let Some(kind) = self.kind {
            element.kind = kind;
        }
        if let Some(name) = &self.name {
            element.name = Some(name.clone());
        }
        if let Some(ownership) = &self.ownership {
            element.ownership = ownership.clone();
        }
        if let Some(instance_ref) = &self.instance_ref {
            element.instance_ref = Some(instance_ref.clone());
        }

        if let Some(props) = &self.properties {
            let target = &mut element.properties;
            if let Some(style) = &props.style {
                target.style.merge(style);
            }
            if let Some(content) = &props.content {
                target.content.merge(content);
            }
            if let Some(attributes) = &props.attributes {
                target.attributes.extend(attributes.clone());
            }
            if let Some(events) = &props.events {
                target.events.extend(events.clone());
            }
            if let Some(state) = &props.state {
                target.state.extend(state.clone());
            }
            if let Some(children) = &props.children {
                target.children = children.clone();
            }
        }

        reconcile_properties(&mut element.properties);
    }
}

impl From<&Element> for ElementPatch {
    /// Patch that deep-merges every field of `element`
    fn from(element: &Element) -> Self {
        let props = &element.properties;
        Self {
            tag: Some(element.tag.clone()),
            kind: Some(element.kind),
            name: element.name.clone(),
            ownership: Some(element.ownership.clone()),
            instance_ref: element.instance_ref.clone(),
            properties: Some(PropertiesPatch {
                style: Some(props.style.clone()),
                content: (!props.content.is_empty()).then(|| props.content.clone()),
                attributes: Some(props.attributes.clone()),
                events: Some(props.events.clone()),
                state: Some(props.state.clone()),
                children: Some(props.children.clone()),
            }),
        }
    }
}

/// Wholesale replacement of an element's bindings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementBindings {
    #[serde(default)]
    pub style: BTreeMap<String, Binding>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Binding>,
}

impl ElementBindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn style(mut self, key: impl Into<String>, binding: Binding) -> Self {
        self.style.insert(key.into(), binding);
        self
    }

    pub fn content(mut self, binding: Binding) -> Self {
        self.content = Some(binding);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Literal;

    #[test]
    fn test_deep_merge_keeps_untouched_keys() {
        let mut element = Element::new("a", "div", Ownership::screen("S1"))
            .with_style(Style::new().with_literal("color", "red"))
            .with_attribute("class", "card");

        ElementPatch::new()
            .style(Style::new().with_literal("width", "10px"))
            .attribute("role", "button")
            .apply_to(&mut element);

        let props = &element.properties;
        assert_eq!(props.style.literal("color"), Some(&Literal::text("red")));
        assert_eq!(props.style.literal("width"), Some(&Literal::text("10px")));
        assert_eq!(props.attributes.len(), 2);
    }

    #[test]
    fn test_patch_binding_clears_existing_literal() {
        let mut element = Element::new("a", "div", Ownership::screen("S1"))
            .with_style(Style::new().with_literal("width", "10px"));

        ElementPatch::new()
            .style(Style::new().with_binding("width", Binding::prop("propA")))
            .apply_to(&mut element);

        let style = &element.properties.style;
        assert!(style.literal("width").is_none());
        assert!(style.binding_for("width").is_some());
    }
}
