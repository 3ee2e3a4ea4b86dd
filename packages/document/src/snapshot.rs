//! Serializable document state used to seed a session

use crate::component::{Component, InstanceOverride};
use crate::errors::DocumentError;
use crate::model::Element;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentSnapshot {
    #[serde(default)]
    pub elements: Vec<Element>,

    #[serde(default)]
    pub components: Vec<Component>,

    #[serde(default)]
    pub overrides: Vec<InstanceOverride>,
}

impl DocumentSnapshot {
    pub fn from_json(source: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(source)?)
    }

    pub fn to_json(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_from_json() {
        let json = r#"{
            "components": [
                { "id": "cmp-1", "name": "Card", "props": [
                    { "id": "p1", "name": "label", "type": "string", "defaultValue": "Card" }
                ] }
            ],
            "elements": [
                { "id": "root", "tag": "div", "kind": "component",
                  "ownership": { "type": "component", "ownerId": "cmp-1" },
                  "properties": { "style": { "padding": 16 } } }
            ],
            "overrides": [
                { "instanceId": "inst-1", "propId": "p1", "value": "Custom" }
            ]
        }"#;

        let snapshot = DocumentSnapshot::from_json(json).unwrap();
        assert_eq!(snapshot.components[0].props[0].name, "label");
        assert_eq!(snapshot.elements[0].properties.style.values.len(), 1);
        assert_eq!(snapshot.overrides.len(), 1);
    }

    #[test]
    fn test_invalid_snapshot_is_error() {
        let result = DocumentSnapshot::from_json("{ \"elements\": 3 }");
        assert!(matches!(result, Err(DocumentError::Snapshot(_))));
    }
}
