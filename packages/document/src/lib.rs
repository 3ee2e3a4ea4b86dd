//! # Drafter Document
//!
//! In-memory design document: elements, components, instance overrides, and
//! the ownership index that ties elements to their owners.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ store: DocumentStore action surface         │
//! │  - draft → reconcile → commit transactions  │
//! │  - ownership index kept in step             │
//! │  - revision counter for change observation  │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ binding: literal XOR binding per property   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! The store is the single source of truth. Source text and the props
//! artifact are derived from it by `drafter-parser` and `drafter-props`.

pub mod binding;
pub mod component;
mod errors;
pub mod model;
pub mod ownership;
pub mod patch;
pub mod snapshot;
pub mod store;

pub use binding::{
    display_value, member_expression, reconcile, reconcile_content, reconcile_properties,
    Binding, BindingContext, BindingSlot, BindingTarget, RefKind, TracedPath,
};
pub use component::{Component, InstanceOverride, OverrideValue, Prop, PropId, PropValue};
pub use errors::DocumentError;
pub use model::{
    format_number, is_void_tag, ComponentId, Content, Element, ElementId, ElementKind, Literal,
    OwnerType, Ownership, Properties, StateFlag, Style,
};
pub use ownership::OwnershipIndex;
pub use patch::{ElementBindings, ElementPatch, PropertiesPatch};
pub use snapshot::DocumentSnapshot;
pub use store::{DocumentStore, ElementLookup};
