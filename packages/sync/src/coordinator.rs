//! # Sync Coordinator
//!
//! Moves changes between the document store and the external buffer without
//! feedback loops.
//!
//! ```text
//!          push_outbound                    pull_inbound
//! Idle ──▶ PushingOut ──▶ Idle      Idle ──▶ PullingIn ──▶ Idle
//! ```
//!
//! A push records the pushed text as last observed, so the buffer echoing it
//! back never triggers a pull. An inbound apply records the re-serialized
//! store as last pushed and remembers the store revision it produced, so it
//! never triggers a push.

use crate::buffer::{ExternalBuffer, FileDiff};
use crate::config::SyncConfig;
use crate::error::SyncResult;
use drafter_document::{BindingContext, BindingTarget, DocumentStore, ElementId};
use drafter_parser::diagnostic::rules;
use drafter_parser::{parse_with_path, Diagnostic, ParseError, Serializer};
use drafter_props::{project_scope, PropsArtifact, PropsScope, ProjectorState};
use std::collections::HashSet;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncPhase {
    #[default]
    Idle,
    PushingOut,
    PullingIn,
}

/// Which tree is mirrored into the buffer, and what its bindings can see
#[derive(Debug, Clone)]
pub struct SyncTarget {
    pub root_id: ElementId,
    pub module_name: String,
    pub scope: PropsScope,

    /// Token and data targets visible to bindings in addition to props
    pub targets: Vec<BindingTarget>,
}

impl SyncTarget {
    pub fn screen(root_id: impl Into<String>, module_name: impl Into<String>) -> Self {
        Self {
            root_id: root_id.into(),
            module_name: module_name.into(),
            scope: PropsScope::None,
            targets: Vec::new(),
        }
    }

    pub fn component(
        root_id: impl Into<String>,
        module_name: impl Into<String>,
        component_id: impl Into<String>,
    ) -> Self {
        Self {
            scope: PropsScope::Component(component_id.into()),
            ..Self::screen(root_id, module_name)
        }
    }

    pub fn with_scope(mut self, scope: PropsScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_target(mut self, target: BindingTarget) -> Self {
        self.targets.push(target);
        self
    }

    pub fn binding_context(&self, store: &DocumentStore) -> BindingContext {
        let component = match &self.scope {
            PropsScope::None => None,
            PropsScope::Component(id) => store.component(id),
            PropsScope::Instance(id) => store
                .element(id)
                .and_then(|e| e.instance_ref.as_deref())
                .and_then(|component_id| store.component(component_id)),
        };

        let mut ctx = component
            .map(BindingContext::from_component)
            .unwrap_or_default();
        for target in &self.targets {
            ctx.add_target(target.clone());
        }
        ctx
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    /// Buffer not initialized yet
    NotInitialized,
    /// An inbound edit is being applied or is waiting to be pulled
    Deferred,
    /// The store is exactly what the last inbound apply produced
    Echo,
    Unchanged,
    Pushed { source: bool, props: bool },
}

#[derive(Debug, Clone, PartialEq)]
pub enum PullOutcome {
    NotInitialized,
    Unchanged,
    Applied { updated: usize, removed: usize },
    /// The source failed to parse; the store was left untouched
    Rejected(ParseError),
}

pub struct SyncCoordinator<B: ExternalBuffer> {
    buffer: B,
    config: SyncConfig,
    target: SyncTarget,
    phase: SyncPhase,
    last_pushed: Option<String>,
    last_observed: Option<String>,
    inbound_revision: Option<u64>,
    props: ProjectorState,
    diagnostics: Vec<Diagnostic>,
}

impl<B: ExternalBuffer> SyncCoordinator<B> {
    pub fn new(buffer: B, config: SyncConfig, target: SyncTarget) -> Self {
        Self {
            buffer,
            config,
            target,
            phase: SyncPhase::Idle,
            last_pushed: None,
            last_observed: None,
            inbound_revision: None,
            props: ProjectorState::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn phase(&self) -> SyncPhase {
        self.phase
    }

    /// Whether the buffer has held source this coordinator wrote or applied
    pub fn has_synced(&self) -> bool {
        self.last_pushed.is_some()
    }

    pub fn target(&self) -> &SyncTarget {
        &self.target
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn buffer(&self) -> &B {
        &self.buffer
    }

    pub fn into_buffer(self) -> B {
        self.buffer
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Serialize the store and write source and props if they changed
    pub fn push_outbound(&mut self, store: &mut DocumentStore) -> SyncResult<PushOutcome> {
        if self.phase == SyncPhase::PullingIn {
            debug!("outbound push deferred: inbound apply in progress");
            return Ok(PushOutcome::Deferred);
        }
        if self.inbound_revision == Some(store.revision()) {
            return Ok(PushOutcome::Echo);
        }

        let Some(snapshot) = self.buffer.read_snapshot()? else {
            return Ok(PushOutcome::NotInitialized);
        };
        if let (Some(observed), Some(current)) =
            (&self.last_observed, snapshot.get(&self.config.source_path))
        {
            if current != observed {
                debug!("outbound push deferred: unpulled edit in buffer");
                return Ok(PushOutcome::Deferred);
            }
        }

        let ctx = self.target.binding_context(store);
        let mut serializer = Serializer::new(&ctx);
        let source =
            serializer.serialize_module(&*store, &self.target.root_id, &self.target.module_name);
        let traced = serializer.take_traced();
        self.report(serializer.take_diagnostics());

        let normalized = normalize_source(&source);
        let source_changed = self.last_pushed.as_deref() != Some(normalized.as_str());

        let pending_props = match self.project(store) {
            Some(artifact) => self.props.pending(&artifact)?,
            None => None,
        };
        if !source_changed && pending_props.is_none() {
            return Ok(PushOutcome::Unchanged);
        }

        // A source write always carries the props artifact alongside it
        let props = match (&pending_props, source_changed) {
            (Some(pending), _) => Some(pending.clone()),
            (None, true) => self.props.last_written().map(str::to_string),
            (None, false) => None,
        };

        let mut diff = FileDiff::new();
        if source_changed {
            diff = diff.create(self.config.source_path.clone(), source.clone());
        }
        if let Some(props) = &props {
            diff = diff.create(self.config.props_path.clone(), props.clone());
        }

        self.phase = SyncPhase::PushingOut;
        let written = self.buffer.write_diff(&diff);
        self.phase = SyncPhase::Idle;
        written?;

        if source_changed {
            self.last_pushed = Some(normalized);
            self.last_observed = Some(source);
        }
        if let Some(props) = pending_props {
            self.props.mark_written(props);
        }
        store.record_binding_paths(&traced);

        info!(
            root = %self.target.root_id,
            revision = store.revision(),
            source = source_changed,
            props = props.is_some(),
            "pushed document to buffer"
        );
        Ok(PushOutcome::Pushed {
            source: source_changed,
            props: props.is_some(),
        })
    }

    /// Poll once and apply the buffer source if it changed
    pub fn pull_inbound(&mut self, store: &mut DocumentStore) -> SyncResult<PullOutcome> {
        if self.buffer.read_snapshot()?.is_none() {
            return Ok(PullOutcome::NotInitialized);
        }
        match self.observe_inbound()? {
            Some(source) => Ok(self.apply_inbound(store, source)),
            None => Ok(PullOutcome::Unchanged),
        }
    }

    /// Read the buffer source; when it differs from what was last observed,
    /// enter `PullingIn` and return it.
    pub fn observe_inbound(&mut self) -> SyncResult<Option<String>> {
        let Some(source) = self.current_source()? else {
            return Ok(None);
        };
        if self.last_observed.as_deref() == Some(source.as_str()) {
            return Ok(None);
        }
        self.phase = SyncPhase::PullingIn;
        Ok(Some(source))
    }

    /// Current buffer source without touching sync state
    pub fn current_source(&self) -> SyncResult<Option<String>> {
        Ok(self.buffer.read_file(&self.config.source_path)?)
    }

    /// Parse `source` and dispatch the result into the store.
    ///
    /// Parse failure leaves the store untouched. Either way the source is
    /// recorded as observed so the same text is not parsed twice.
    pub fn apply_inbound(&mut self, store: &mut DocumentStore, source: String) -> PullOutcome {
        self.phase = SyncPhase::PullingIn;
        let outcome = self.dispatch(store, &source);
        self.last_observed = Some(source);
        self.phase = SyncPhase::Idle;
        outcome
    }

    fn dispatch(&mut self, store: &mut DocumentStore, source: &str) -> PullOutcome {
        let ctx = self.target.binding_context(store);
        let tree = match parse_with_path(source, &self.config.source_path, &ctx) {
            Ok(tree) => tree,
            Err(error) => {
                warn!("discarding unparsable buffer source: {}", error);
                let mut diagnostic = Diagnostic::error(rules::PARSE_FAILURE, error.to_string());
                if let Some(span) = error.span() {
                    diagnostic = diagnostic.with_span(span);
                }
                self.diagnostics.push(diagnostic);
                return PullOutcome::Rejected(error);
            }
        };

        let old_ids = store.subtree_ids(&self.target.root_id);
        let new_root = tree.root_id.clone();
        let parsed: HashSet<String> = tree.ids().map(str::to_string).collect();
        self.report(tree.diagnostics.clone());

        let mut updated = 0;
        for element in tree.into_elements() {
            if store.replace_element(element) {
                updated += 1;
            }
        }
        let mut removed = 0;
        for id in old_ids.iter().filter(|id| !parsed.contains(*id)) {
            if store.remove_element(id) {
                removed += 1;
            }
        }
        if new_root != self.target.root_id {
            info!(from = %self.target.root_id, to = %new_root, "buffer edit renamed the root element");
            self.target.root_id = new_root;
        }

        self.inbound_revision = Some(store.revision());

        let ctx = self.target.binding_context(store);
        let mut serializer = Serializer::new(&ctx);
        let canonical =
            serializer.serialize_module(&*store, &self.target.root_id, &self.target.module_name);
        self.last_pushed = Some(normalize_source(&canonical));
        store.record_binding_paths(&serializer.take_traced());

        self.refresh_props(store);

        info!(updated, removed, revision = store.revision(), "applied buffer edit");
        PullOutcome::Applied { updated, removed }
    }

    /// Re-project props after an inbound apply; write failures are retried
    /// on the next push.
    fn refresh_props(&mut self, store: &DocumentStore) {
        let Some(artifact) = self.project(store) else {
            return;
        };
        let pending = match self.props.pending(&artifact) {
            Ok(Some(pending)) => pending,
            Ok(None) => return,
            Err(e) => {
                warn!("failed to render props artifact: {}", e);
                return;
            }
        };

        let diff = FileDiff::new().create(self.config.props_path.clone(), pending.clone());
        match self.buffer.write_diff(&diff) {
            Ok(()) => self.props.mark_written(pending),
            Err(e) => warn!("failed to write props artifact: {}", e),
        }
    }

    fn project(&self, store: &DocumentStore) -> Option<PropsArtifact> {
        match project_scope(store, &self.target.scope) {
            Ok(artifact) => Some(artifact),
            Err(e) => {
                warn!("props projection skipped: {}", e);
                None
            }
        }
    }

    fn report(&mut self, diagnostics: Vec<Diagnostic>) {
        for diagnostic in &diagnostics {
            warn!(rule = %diagnostic.rule, element = ?diagnostic.element_id, "{}", diagnostic.message);
        }
        self.diagnostics.extend(diagnostics);
    }
}

/// Collapse whitespace runs so formatting-only differences compare equal
pub fn normalize_source(source: &str) -> String {
    source.split_whitespace().collect::<Vec<_>>().join(" ")
}
