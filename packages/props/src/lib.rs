//! # Drafter Props
//!
//! Projects component props and instance overrides into the flattened map
//! the live preview imports, and renders it as the props artifact module.

pub mod artifact;
mod error;
pub mod projector;

pub use artifact::{PropDefinition, PropsArtifact};
pub use error::PropsError;
pub use projector::{project, project_scope, resolve_prop, ProjectorState, PropsMap, PropsScope};
