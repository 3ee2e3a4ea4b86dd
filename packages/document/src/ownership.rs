//! # Ownership Index
//!
//! Derived `owner type → owner id → [element id]` lookup. The store keeps it in
//! step with every element's `ownership` field; it is never edited directly by
//! callers.
//!
//! Buckets are retained when they become empty, and removing an id from an
//! owner that was never indexed is a no-op.

use crate::model::{ElementId, OwnerType, Ownership};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OwnershipIndex {
    buckets: BTreeMap<OwnerType, BTreeMap<String, Vec<ElementId>>>,
}

impl OwnershipIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `id` under `owner`; duplicates are ignored
    pub fn add(&mut self, owner: &Ownership, id: &str) {
        let bucket = self
            .buckets
            .entry(owner.owner_type)
            .or_default()
            .entry(owner.owner_id.clone())
            .or_default();

        if !bucket.iter().any(|existing| existing == id) {
            bucket.push(id.to_string());
        }
    }

    /// Remove `id` from `owner`'s bucket, keeping the bucket even when empty
    pub fn remove(&mut self, owner: &Ownership, id: &str) {
        let Some(bucket) = self
            .buckets
            .get_mut(&owner.owner_type)
            .and_then(|owners| owners.get_mut(&owner.owner_id))
        else {
            return;
        };
        bucket.retain(|existing| existing != id);
    }

    /// Move `id` between buckets
    pub fn relocate(&mut self, from: &Ownership, to: &Ownership, id: &str) {
        if from == to {
            return;
        }
        self.remove(from, id);
        self.add(to, id);
    }

    pub fn clear(&mut self) {
        self.buckets.clear();
    }

    /// Element ids owned by `owner_id`, in insertion order
    pub fn bucket(&self, owner_type: OwnerType, owner_id: &str) -> Option<&[ElementId]> {
        self.buckets
            .get(&owner_type)
            .and_then(|owners| owners.get(owner_id))
            .map(|ids| ids.as_slice())
    }

    /// Every `(owner, id)` pair in the index
    pub fn entries(&self) -> impl Iterator<Item = (Ownership, &str)> {
        self.buckets.iter().flat_map(|(owner_type, owners)| {
            owners.iter().flat_map(move |(owner_id, ids)| {
                ids.iter()
                    .map(move |id| (Ownership::new(*owner_type, owner_id.clone()), id.as_str()))
            })
        })
    }

    pub fn len(&self) -> usize {
        self.buckets
            .values()
            .flat_map(|owners| owners.values())
            .map(|ids| ids.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
