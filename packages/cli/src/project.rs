//! Snapshot loading and sync target selection shared by the commands

use crate::config::Config;
use anyhow::{anyhow, Context, Result};
use clap::Args;
use drafter_document::{DocumentSnapshot, DocumentStore, ElementKind};
use drafter_parser::module_name;
use drafter_props::PropsScope;
use drafter_sync::SyncTarget;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Which tree a command works on
#[derive(Debug, Args, Clone, Default)]
pub struct TargetArgs {
    /// Root element id (defaults to the first top-level element)
    #[arg(short, long)]
    pub root: Option<String>,

    /// Name of the generated module function
    #[arg(short, long)]
    pub module: Option<String>,

    /// Expose the props of this component to bindings
    #[arg(long, conflicts_with = "instance")]
    pub component: Option<String>,

    /// Expose the props of the component this instance renders
    #[arg(long)]
    pub instance: Option<String>,
}

pub fn snapshot_path(arg: Option<&PathBuf>, config: &Config, cwd: &str) -> PathBuf {
    match arg {
        Some(path) => path.clone(),
        None => config.get_snapshot_path(cwd),
    }
}

pub fn load_store(path: &Path) -> Result<DocumentStore> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read snapshot {}", path.display()))?;
    let snapshot = DocumentSnapshot::from_json(&content)
        .with_context(|| format!("Invalid snapshot {}", path.display()))?;
    Ok(DocumentStore::from_snapshot(snapshot))
}

/// Elements that are nobody's child, in document order
pub fn top_level_ids(store: &DocumentStore) -> Vec<String> {
    let children: HashSet<&str> = store
        .elements()
        .flat_map(|e| e.children().iter().map(String::as_str))
        .collect();
    store
        .ids()
        .iter()
        .filter(|id| !children.contains(id.as_str()))
        .cloned()
        .collect()
}

pub fn resolve_target(store: &DocumentStore, args: &TargetArgs, config: &Config) -> Result<SyncTarget> {
    let root_id = match &args.root {
        Some(root) => root.clone(),
        None => top_level_ids(store)
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("Snapshot has no elements"))?,
    };
    let root = store
        .element(&root_id)
        .ok_or_else(|| anyhow!("Unknown root element: {}", root_id))?;

    let scope = match (&args.component, &args.instance) {
        (Some(component), _) => PropsScope::Component(component.clone()),
        (None, Some(instance)) => PropsScope::Instance(instance.clone()),
        // A component root exposes its own props
        (None, None) if root.kind == ElementKind::Component => {
            PropsScope::Component(root.ownership.owner_id.clone())
        }
        (None, None) => PropsScope::None,
    };

    let name = args
        .module
        .clone()
        .or_else(|| root.name.clone())
        .unwrap_or_else(|| root_id.clone());

    let mut target = SyncTarget::screen(root_id, module_name(&name)).with_scope(scope);
    for binding_target in config.binding_targets() {
        target = target.with_target(binding_target);
    }
    Ok(target)
}
