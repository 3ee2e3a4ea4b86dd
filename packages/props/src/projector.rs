//! Flattened prop values for a component or one of its instances

use crate::artifact::PropsArtifact;
use crate::error::PropsError;
use drafter_document::{
    Component, DocumentStore, ElementKind, OverrideValue, Prop, PropId,
};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

/// Prop name → effective value
pub type PropsMap = BTreeMap<String, Value>;

/// What the props artifact is computed for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropsScope {
    /// Screens have no props; the artifact is empty
    None,
    /// A component's own defaults
    Component(String),
    /// An instance: the component it renders plus its overrides
    Instance(String),
}

/// Effective value of one prop.
///
/// Precedence: direct override, named override (resolved by value id), the
/// designated default value, the first value, the raw `defaultValue`.
pub fn resolve_prop<'a>(prop: &'a Prop, override_value: Option<&'a OverrideValue>) -> &'a Value {
    match override_value {
        Some(OverrideValue::Direct { value }) => return value,
        Some(OverrideValue::Named { prop_value_id }) => match prop.value(prop_value_id) {
            Some(named) => return &named.value,
            None => warn!(
                prop = %prop.name,
                prop_value_id = %prop_value_id,
                "override references a missing prop value, using the default"
            ),
        },
        None => {}
    }
    prop.current_default()
}

/// Flatten every prop of `component`, applying `overrides` when given
pub fn project(
    component: &Component,
    overrides: Option<&BTreeMap<PropId, OverrideValue>>,
) -> PropsMap {
    component
        .props
        .iter()
        .map(|prop| {
            let override_value = overrides.and_then(|o| o.get(&prop.id));
            (prop.name.clone(), resolve_prop(prop, override_value).clone())
        })
        .collect()
}

/// Compute the artifact for `scope` from the store
pub fn project_scope(store: &DocumentStore, scope: &PropsScope) -> Result<PropsArtifact, PropsError> {
    match scope {
        PropsScope::None => Ok(PropsArtifact::default()),
        PropsScope::Component(component_id) => {
            let component = store
                .component(component_id)
                .ok_or_else(|| PropsError::UnknownComponent(component_id.clone()))?;
            Ok(PropsArtifact::new(component, project(component, None)))
        }
        PropsScope::Instance(instance_id) => {
            let instance = store
                .element(instance_id)
                .ok_or_else(|| PropsError::UnknownElement(instance_id.clone()))?;
            let component_id = match (&instance.kind, &instance.instance_ref) {
                (ElementKind::Instance, Some(component_id)) => component_id,
                _ => return Err(PropsError::NotAnInstance(instance_id.clone())),
            };
            let component = store
                .component(component_id)
                .ok_or_else(|| PropsError::UnknownComponent(component_id.clone()))?;

            let values = project(component, store.instance_overrides(instance_id));
            Ok(PropsArtifact::new(component, values))
        }
    }
}

/// Last artifact text written to the buffer.
///
/// Comparison is on the rendered text; maps are key-ordered so equal maps
/// always render identically.
#[derive(Debug, Clone, Default)]
pub struct ProjectorState {
    last_written: Option<String>,
}

impl ProjectorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rendered artifact if it differs from what was last written
    pub fn pending(&self, artifact: &PropsArtifact) -> Result<Option<String>, PropsError> {
        let rendered = artifact.render()?;
        if self.last_written.as_deref() == Some(rendered.as_str()) {
            return Ok(None);
        }
        Ok(Some(rendered))
    }

    /// Record a successful write
    pub fn mark_written(&mut self, rendered: String) {
        self.last_written = Some(rendered);
    }

    pub fn last_written(&self) -> Option<&str> {
        self.last_written.as_deref()
    }

    /// Forget the last write so the next refresh always produces output
    pub fn reset(&mut self) {
        self.last_written = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drafter_document::PropValue;
    use serde_json::json;

    fn label_prop() -> Prop {
        Prop::new("p-label", "label", "string", json!("Raw default"))
            .with_value(PropValue::new("pv-first", json!("First")))
            .with_value(PropValue::new("pv-designated", json!("Designated")).as_default())
            .with_value(PropValue::new("pv-named", json!("Named")).named("Alt"))
    }

    #[test]
    fn test_direct_override_wins() {
        let prop = label_prop();
        let direct = OverrideValue::value(json!("Override"));
        assert_eq!(resolve_prop(&prop, Some(&direct)), &json!("Override"));
    }

    #[test]
    fn test_named_override_resolves_by_id() {
        let prop = label_prop();
        let named = OverrideValue::named("pv-named");
        assert_eq!(resolve_prop(&prop, Some(&named)), &json!("Named"));
    }

    #[test]
    fn test_missing_named_value_falls_back() {
        let prop = label_prop();
        let named = OverrideValue::named("pv-gone");
        assert_eq!(resolve_prop(&prop, Some(&named)), &json!("Designated"));
    }

    #[test]
    fn test_default_chain() {
        let designated = label_prop();
        assert_eq!(resolve_prop(&designated, None), &json!("Designated"));

        let first_only = Prop::new("p", "label", "string", json!("Raw"))
            .with_value(PropValue::new("pv-1", json!("First")));
        assert_eq!(resolve_prop(&first_only, None), &json!("First"));

        let raw = Prop::new("p", "label", "string", json!("Raw"));
        assert_eq!(resolve_prop(&raw, None), &json!("Raw"));
    }

    #[test]
    fn test_project_flattens_by_name() {
        let component = Component::new("cmp", "Button")
            .with_prop(label_prop())
            .with_prop(Prop::new("p-size", "size", "number", json!(12)));

        let mut overrides = BTreeMap::new();
        overrides.insert("p-size".to_string(), OverrideValue::value(json!(16)));

        let values = project(&component, Some(&overrides));
        assert_eq!(values["label"], json!("Designated"));
        assert_eq!(values["size"], json!(16));
    }

    #[test]
    fn test_state_only_reports_changes() {
        let component = Component::new("cmp", "Button").with_prop(label_prop());
        let artifact = PropsArtifact::new(&component, project(&component, None));

        let mut state = ProjectorState::new();
        let first = state.pending(&artifact).unwrap().unwrap();
        state.mark_written(first);
        assert!(state.pending(&artifact).unwrap().is_none());

        let changed = PropsArtifact::new(&component, PropsMap::new());
        assert!(state.pending(&changed).unwrap().is_some());
    }
}
