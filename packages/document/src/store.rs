//! # Document Store
//!
//! Normalized element/component storage plus the ownership index.
//!
//! Every element mutation runs as a small transaction:
//!
//! ```text
//! clone entity → apply change → reconcile → compare → commit
//! ```
//!
//! Nothing is committed if the draft equals the current entity, and the
//! revision counter only moves on an effective change. Mutations that target
//! an unknown id are silent no-ops.

use crate::binding::{reconcile_properties, BindingSlot, TracedPath};
use crate::component::{Component, InstanceOverride, OverrideValue, PropId, PropValue};
use crate::errors::DocumentError;
use crate::model::{ComponentId, Content, Element, ElementId, OwnerType, Style};
use crate::ownership::OwnershipIndex;
use crate::patch::{ElementBindings, ElementPatch};
use crate::snapshot::DocumentSnapshot;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, warn};

/// Read access to elements by id
pub trait ElementLookup {
    fn element(&self, id: &str) -> Option<&Element>;
}

impl ElementLookup for HashMap<ElementId, Element> {
    fn element(&self, id: &str) -> Option<&Element> {
        self.get(id)
    }
}

impl ElementLookup for BTreeMap<ElementId, Element> {
    fn element(&self, id: &str) -> Option<&Element> {
        self.get(id)
    }
}

#[derive(Debug, Clone, Default)]
pub struct DocumentStore {
    elements: HashMap<ElementId, Element>,
    ids: Vec<ElementId>,
    ownership: OwnershipIndex,
    components: BTreeMap<ComponentId, Component>,
    overrides: BTreeMap<ElementId, BTreeMap<PropId, OverrideValue>>,
    revision: u64,
}

impl ElementLookup for DocumentStore {
    fn element(&self, id: &str) -> Option<&Element> {
        DocumentStore::element(self, id)
    }
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: DocumentSnapshot) -> Self {
        let mut store = Self::new();
        for component in snapshot.components {
            store.add_component(component);
        }
        store.add_elements(snapshot.elements);
        for record in snapshot.overrides {
            store.set_instance_override(&record.instance_id, &record.prop_id, record.value);
        }
        store
    }

    pub fn snapshot(&self) -> DocumentSnapshot {
        DocumentSnapshot {
            elements: self.elements().cloned().collect(),
            components: self.components.values().cloned().collect(),
            overrides: self
                .overrides
                .iter()
                .flat_map(|(instance_id, props)| {
                    props.iter().map(move |(prop_id, value)| InstanceOverride {
                        instance_id: instance_id.clone(),
                        prop_id: prop_id.clone(),
                        value: value.clone(),
                    })
                })
                .collect(),
        }
    }

    /// Monotonic counter bumped on every effective mutation
    pub fn revision(&self) -> u64 {
        self.revision
    }

    // ---- element queries ----

    pub fn element(&self, id: &str) -> Option<&Element> {
        self.elements.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.elements.contains_key(id)
    }

    /// Elements in insertion order
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.ids.iter().filter_map(|id| self.elements.get(id))
    }

    pub fn ids(&self) -> &[ElementId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn ownership_index(&self) -> &OwnershipIndex {
        &self.ownership
    }

    /// Ids indexed under an owner (empty when the owner is unknown)
    pub fn owned_by(&self, owner_type: OwnerType, owner_id: &str) -> &[ElementId] {
        self.ownership.bucket(owner_type, owner_id).unwrap_or(&[])
    }

    /// `root` and every element reachable through `children`, pre-order
    pub fn subtree_ids(&self, root: &str) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        let mut stack = vec![root.to_string()];

        while let Some(id) = stack.pop() {
            let Some(element) = self.elements.get(&id) else {
                continue;
            };
            if !seen.insert(id.clone()) {
                continue;
            }
            stack.extend(element.properties.children.iter().rev().cloned());
            out.push(id);
        }

        out
    }

    // ---- element actions ----

    /// Insert an element, deep-merging when the id already exists
    pub fn add_element(&mut self, element: Element) -> bool {
        if self.elements.contains_key(&element.id) {
            let patch = ElementPatch::from(&element);
            return self.transact(&element.id, |draft| patch.apply_to(draft));
        }

        let mut element = element;
        reconcile_properties(&mut element.properties);
        self.commit(element);
        true
    }

    pub fn add_elements(&mut self, elements: impl IntoIterator<Item = Element>) -> usize {
        elements
            .into_iter()
            .map(|element| self.add_element(element))
            .filter(|changed| *changed)
            .count()
    }

    /// Deep-merge `patch`; ownership changes move the index entry
    pub fn update_element(&mut self, id: &str, patch: &ElementPatch) -> bool {
        self.transact(id, |draft| patch.apply_to(draft))
    }

    /// Replace an element wholesale, inserting it when absent
    pub fn replace_element(&mut self, element: Element) -> bool {
        let mut element = element;
        reconcile_properties(&mut element.properties);

        if self.elements.get(&element.id) == Some(&element) {
            return false;
        }
        self.commit(element);
        true
    }

    pub fn update_element_style(&mut self, id: &str, delta: &Style) -> bool {
        self.transact(id, |draft| draft.properties.style.merge(delta))
    }

    /// Remove style keys together with any bindings on them
    pub fn remove_element_style<S: AsRef<str>>(&mut self, id: &str, keys: &[S]) -> bool {
        self.transact(id, |draft| draft.properties.style.remove_keys(keys))
    }

    pub fn update_element_attributes(&mut self, id: &str, attributes: &BTreeMap<String, String>) -> bool {
        self.transact(id, |draft| {
            draft.properties.attributes.extend(attributes.clone());
        })
    }

    pub fn remove_element_attributes<S: AsRef<str>>(&mut self, id: &str, names: &[S]) -> bool {
        self.transact(id, |draft| {
            for name in names {
                draft.properties.attributes.remove(name.as_ref());
            }
        })
    }

    pub fn update_element_content(&mut self, id: &str, content: &Content) -> bool {
        self.transact(id, |draft| draft.properties.content.merge(content))
    }

    pub fn remove_element_content(&mut self, id: &str) -> bool {
        self.transact(id, |draft| draft.properties.content = Content::default())
    }

    /// Replace all style and content bindings; bound keys lose their literals
    pub fn update_element_bindings(&mut self, id: &str, bindings: &ElementBindings) -> bool {
        self.transact(id, |draft| {
            let style = &mut draft.properties.style;
            for key in bindings.style.keys() {
                style.values.remove(key);
            }
            style.binding = Some(bindings.style.clone());

            let content = &mut draft.properties.content;
            content.binding = bindings.content.clone();
            if content.binding.is_some() {
                content.text = None;
                content.expression = None;
            }
        })
    }

    pub fn remove_element_bindings(&mut self, id: &str) -> bool {
        self.transact(id, |draft| {
            draft.properties.style.binding = None;
            draft.properties.content.binding = None;
        })
    }

    /// Delete an element and drop every reference to its id
    pub fn remove_element(&mut self, id: &str) -> bool {
        let Some(removed) = self.elements.remove(id) else {
            debug!("remove_element: unknown id {}", id);
            return false;
        };

        self.ids.retain(|existing| existing != id);
        self.ownership.remove(&removed.ownership, id);
        self.overrides.remove(id);

        for element in self.elements.values_mut() {
            element.properties.children.retain(|child| child != id);
        }

        self.revision += 1;
        true
    }

    /// Clear everything element-related, then add `elements`
    pub fn set_elements(&mut self, elements: impl IntoIterator<Item = Element>) {
        self.elements.clear();
        self.ids.clear();
        self.ownership.clear();
        self.revision += 1;
        self.add_elements(elements);
    }

    /// Write traced member-expression paths (and content fallbacks) back into
    /// bindings.
    ///
    /// Paths are bookkeeping only, so the revision does not move.
    pub fn record_binding_paths(&mut self, traced: &[TracedPath]) -> usize {
        let mut updated = 0;
        for entry in traced {
            let Some(element) = self.elements.get_mut(&entry.element_id) else {
                continue;
            };
            let binding = match &entry.slot {
                BindingSlot::Style(key) => element
                    .properties
                    .style
                    .binding
                    .as_mut()
                    .and_then(|b| b.get_mut(key)),
                BindingSlot::Content => element.properties.content.binding.as_mut(),
            };
            let Some(binding) = binding else {
                continue;
            };
            let fallback = match entry.slot {
                BindingSlot::Content => entry.fallback.clone(),
                BindingSlot::Style(_) => binding.fallback.clone(),
            };
            if binding.path.as_deref() != Some(entry.path.as_str()) || binding.fallback != fallback {
                binding.path = Some(entry.path.clone());
                binding.fallback = fallback;
                updated += 1;
            }
        }
        updated
    }

    // ---- components and instances ----

    pub fn component(&self, id: &str) -> Option<&Component> {
        self.components.get(id)
    }

    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.components.values()
    }

    pub fn add_component(&mut self, mut component: Component) -> bool {
        let demoted = component.normalize_defaults();
        if demoted > 0 {
            warn!(
                "component {} declared multiple default values; demoted {}",
                component.id, demoted
            );
        }
        if self.components.get(&component.id) == Some(&component) {
            return false;
        }
        self.components.insert(component.id.clone(), component);
        self.revision += 1;
        true
    }

    pub fn remove_component(&mut self, id: &str) -> bool {
        if self.components.remove(id).is_none() {
            debug!("remove_component: unknown id {}", id);
            return false;
        }
        self.revision += 1;
        true
    }

    /// Replace the named values of one prop
    pub fn set_prop_values(&mut self, component_id: &str, prop_id: &str, values: Vec<PropValue>) -> bool {
        let Some(component) = self.components.get(component_id) else {
            debug!("set_prop_values: unknown component {}", component_id);
            return false;
        };
        let mut draft = component.clone();
        let Some(prop) = draft.prop_mut(prop_id) else {
            debug!("set_prop_values: unknown prop {} on {}", prop_id, component_id);
            return false;
        };
        prop.values = values;
        self.add_component(draft)
    }

    pub fn set_instance_override(&mut self, instance_id: &str, prop_id: &str, value: OverrideValue) -> bool {
        let slot = self.overrides.entry(instance_id.to_string()).or_default();
        if slot.get(prop_id) == Some(&value) {
            return false;
        }
        slot.insert(prop_id.to_string(), value);
        self.revision += 1;
        true
    }

    pub fn clear_instance_override(&mut self, instance_id: &str, prop_id: &str) -> bool {
        let removed = self
            .overrides
            .get_mut(instance_id)
            .and_then(|props| props.remove(prop_id))
            .is_some();
        if removed {
            self.revision += 1;
        }
        removed
    }

    pub fn instance_overrides(&self, instance_id: &str) -> Option<&BTreeMap<PropId, OverrideValue>> {
        self.overrides.get(instance_id)
    }

    // ---- invariants ----

    /// Verify index consistency and literal/binding exclusivity
    pub fn check_invariants(&self) -> Result<(), DocumentError> {
        if self.ids.len() != self.elements.len() {
            return Err(DocumentError::ElementList(format!(
                "{} ids for {} elements",
                self.ids.len(),
                self.elements.len()
            )));
        }

        for (owner, id) in self.ownership.entries() {
            match self.elements.get(id) {
                Some(element) if element.ownership == owner => {}
                Some(_) => {
                    return Err(DocumentError::OwnershipIndex {
                        element_id: id.to_string(),
                        message: format!("indexed under foreign owner {}:{}", owner.owner_type, owner.owner_id),
                    })
                }
                None => {
                    return Err(DocumentError::OwnershipIndex {
                        element_id: id.to_string(),
                        message: "indexed but not stored".to_string(),
                    })
                }
            }
        }

        for element in self.elements.values() {
            let bucket = self.owned_by(element.ownership.owner_type, &element.ownership.owner_id);
            let occurrences = bucket.iter().filter(|id| **id == element.id).count();
            if occurrences != 1 {
                return Err(DocumentError::OwnershipIndex {
                    element_id: element.id.clone(),
                    message: format!("found {} times in its bucket", occurrences),
                });
            }

            let style = &element.properties.style;
            if let Some(bound) = &style.binding {
                if bound.is_empty() {
                    return Err(DocumentError::EmptyBindingMap(element.id.clone()));
                }
                if let Some(key) = bound.keys().find(|key| style.values.contains_key(*key)) {
                    return Err(DocumentError::BindingConflict {
                        element_id: element.id.clone(),
                        property: key.clone(),
                    });
                }
            }

            let content = &element.properties.content;
            if content.binding.is_some() && content.has_literal() {
                return Err(DocumentError::BindingConflict {
                    element_id: element.id.clone(),
                    property: "content".to_string(),
                });
            }
        }

        Ok(())
    }

    // ---- internals ----

    fn transact<F>(&mut self, id: &str, apply: F) -> bool
    where
        F: FnOnce(&mut Element),
    {
        let Some(current) = self.elements.get(id) else {
            debug!("mutation on unknown element {}", id);
            return false;
        };

        let mut draft = current.clone();
        apply(&mut draft);
        draft.id = current.id.clone();
        reconcile_properties(&mut draft.properties);

        if &draft == current {
            return false;
        }

        self.commit(draft);
        true
    }

    fn commit(&mut self, element: Element) {
        match self.elements.get(&element.id) {
            Some(previous) => {
                self.ownership
                    .relocate(&previous.ownership, &element.ownership, &element.id);
            }
            None => {
                self.ids.push(element.id.clone());
                self.ownership.add(&element.ownership, &element.id);
            }
        }
        self.elements.insert(element.id.clone(), element);
        self.revision += 1;
    }
}
