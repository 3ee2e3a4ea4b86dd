//! Components, their props, and per-instance overrides

use crate::model::{ComponentId, ElementId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub type PropId = String;

/// Component definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    pub id: ComponentId,
    pub name: String,

    #[serde(default)]
    pub props: Vec<Prop>,
}

impl Component {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            props: Vec::new(),
        }
    }

    pub fn with_prop(mut self, prop: Prop) -> Self {
        self.props.push(prop);
        self
    }

    pub fn prop(&self, prop_id: &str) -> Option<&Prop> {
        self.props.iter().find(|p| p.id == prop_id)
    }

    pub fn prop_mut(&mut self, prop_id: &str) -> Option<&mut Prop> {
        self.props.iter_mut().find(|p| p.id == prop_id)
    }

    /// Demote every `isDefault` value after the first in each prop.
    /// Returns the number of values demoted.
    pub fn normalize_defaults(&mut self) -> usize {
        self.props.iter_mut().map(Prop::normalize_defaults).sum()
    }
}

/// Component prop definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prop {
    pub id: PropId,
    pub name: String,

    #[serde(rename = "type")]
    pub prop_type: String,

    #[serde(default)]
    pub default_value: Value,

    #[serde(default)]
    pub values: Vec<PropValue>,
}

impl Prop {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        prop_type: impl Into<String>,
        default_value: Value,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            prop_type: prop_type.into(),
            default_value,
            values: Vec::new(),
        }
    }

    pub fn with_value(mut self, value: PropValue) -> Self {
        self.values.push(value);
        self
    }

    pub fn value(&self, value_id: &str) -> Option<&PropValue> {
        self.values.iter().find(|v| v.id == value_id)
    }

    pub fn designated_default(&self) -> Option<&PropValue> {
        self.values.iter().find(|v| v.is_default)
    }

    /// Value used when no override applies: the designated default value,
    /// then the first value, then `defaultValue`.
    pub fn current_default(&self) -> &Value {
        self.designated_default()
            .or_else(|| self.values.first())
            .map(|v| &v.value)
            .unwrap_or(&self.default_value)
    }

    fn normalize_defaults(&mut self) -> usize {
        let mut seen = false;
        let mut demoted = 0;
        for value in &mut self.values {
            if value.is_default {
                if seen {
                    value.is_default = false;
                    demoted += 1;
                }
                seen = true;
            }
        }
        demoted
    }
}

/// Named value a prop can take
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropValue {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub value: Value,

    #[serde(default)]
    pub is_default: bool,
}

impl PropValue {
    pub fn new(id: impl Into<String>, value: Value) -> Self {
        Self {
            id: id.into(),
            name: None,
            value,
            is_default: false,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }
}

/// Per-instance value for a prop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OverrideValue {
    /// Literal value authored on the instance
    Direct { value: Value },

    /// Reference to one of the prop's named values
    Named {
        #[serde(rename = "propValueId")]
        prop_value_id: String,
    },
}

impl OverrideValue {
    pub fn value(value: Value) -> Self {
        OverrideValue::Direct { value }
    }

    pub fn named(prop_value_id: impl Into<String>) -> Self {
        OverrideValue::Named {
            prop_value_id: prop_value_id.into(),
        }
    }
}

/// Flat override record, as found in document snapshots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceOverride {
    pub instance_id: ElementId,
    pub prop_id: PropId,

    #[serde(flatten)]
    pub value: OverrideValue,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_current_default_precedence() {
        let bare = Prop::new("p", "label", "string", json!("raw"));
        assert_eq!(bare.current_default(), &json!("raw"));

        let with_values = bare
            .clone()
            .with_value(PropValue::new("v1", json!("first")))
            .with_value(PropValue::new("v2", json!("second")));
        assert_eq!(with_values.current_default(), &json!("first"));

        let with_default = bare
            .with_value(PropValue::new("v1", json!("first")))
            .with_value(PropValue::new("v2", json!("second")).as_default());
        assert_eq!(with_default.current_default(), &json!("second"));
    }

    #[test]
    fn test_normalize_defaults_keeps_first() {
        let mut component = Component::new("c", "Card").with_prop(
            Prop::new("p", "size", "string", json!("md"))
                .with_value(PropValue::new("a", json!("sm")).as_default())
                .with_value(PropValue::new("b", json!("lg")).as_default()),
        );

        assert_eq!(component.normalize_defaults(), 1);
        let prop = component.prop("p").unwrap();
        assert_eq!(prop.designated_default().unwrap().id, "a");
        assert!(!prop.value("b").unwrap().is_default);
    }

    #[test]
    fn test_override_serde_forms() {
        let direct: InstanceOverride =
            serde_json::from_str(r#"{"instanceId":"i1","propId":"p1","value":"Hi"}"#).unwrap();
        assert_eq!(direct.value, OverrideValue::value(json!("Hi")));

        let named: InstanceOverride =
            serde_json::from_str(r#"{"instanceId":"i1","propId":"p1","propValueId":"v2"}"#)
                .unwrap();
        assert_eq!(named.value, OverrideValue::named("v2"));
    }
}
