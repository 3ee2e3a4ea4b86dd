//! # Drafter Sync
//!
//! Keeps the in-memory document and an external editor buffer in step.
//!
//! ```text
//!  DocumentStore ──serialize──▶ App.jsx ─┐
//!        ▲         project ───▶ props.js │  ExternalBuffer
//!        └──────── parse ◀───────────────┘  (polled)
//! ```
//!
//! [`SyncCoordinator`] holds the state machine and runs one step at a time.
//! [`DocumentSession`] owns the store and drives the coordinator from a tokio
//! task: pushes on every store change, pulls on every poll tick.

pub mod buffer;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod session;

pub use buffer::{BufferSnapshot, DirectoryBuffer, ExternalBuffer, FileDiff, MemoryBuffer};
pub use config::SyncConfig;
pub use coordinator::{
    normalize_source, PullOutcome, PushOutcome, SyncCoordinator, SyncPhase, SyncTarget,
};
pub use error::{BufferError, SyncError, SyncResult};
pub use session::DocumentSession;
