use crate::error::PropsError;
use crate::projector::PropsMap;
use drafter_document::{Component, Prop, PropValue};
use serde::Serialize;
use serde_json::Value;

/// Public shape of a prop in the artifact
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropDefinition {
    pub id: String,
    pub name: String,

    #[serde(rename = "type")]
    pub prop_type: String,

    pub default_value: Value,
    pub values: Vec<PropValue>,
}

impl From<&Prop> for PropDefinition {
    fn from(prop: &Prop) -> Self {
        Self {
            id: prop.id.clone(),
            name: prop.name.clone(),
            prop_type: prop.prop_type.clone(),
            default_value: prop.default_value.clone(),
            values: prop.values.clone(),
        }
    }
}

/// Module consumed by the live preview: `propDefinitions` and `props`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropsArtifact {
    pub definitions: Vec<PropDefinition>,
    pub values: PropsMap,
}

impl PropsArtifact {
    pub fn new(component: &Component, values: PropsMap) -> Self {
        Self {
            definitions: component.props.iter().map(PropDefinition::from).collect(),
            values,
        }
    }

    pub fn render(&self) -> Result<String, PropsError> {
        Ok(format!(
            "export const propDefinitions = {};\n\nexport const props = {};\n",
            serde_json::to_string_pretty(&self.definitions)?,
            serde_json::to_string_pretty(&self.values)?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_empty() {
        let rendered = PropsArtifact::default().render().unwrap();
        assert_eq!(
            rendered,
            "export const propDefinitions = [];\n\nexport const props = {};\n"
        );
    }

    #[test]
    fn test_render_definitions_and_values() {
        let component = Component::new("cmp", "Badge")
            .with_prop(Prop::new("p-text", "text", "string", json!("New")));
        let mut values = PropsMap::new();
        values.insert("text".to_string(), json!("New"));

        let rendered = PropsArtifact::new(&component, values).render().unwrap();
        assert!(rendered.contains("\"type\": \"string\""));
        assert!(rendered.contains("\"defaultValue\": \"New\""));
        assert!(rendered.contains("export const props = {\n  \"text\": \"New\"\n};"));
    }
}
