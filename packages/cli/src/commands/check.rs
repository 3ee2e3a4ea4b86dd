use crate::commands::parse::print_diagnostics;
use crate::config::Config;
use crate::project::{load_store, resolve_target, snapshot_path, top_level_ids, TargetArgs};
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use drafter_document::DocumentStore;
use drafter_parser::{parse_with_path, serialize_module};
use drafter_sync::SyncTarget;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Snapshot file (defaults to the configured snapshot)
    pub snapshot: Option<PathBuf>,

    /// Check only this root element
    #[arg(short, long)]
    pub root: Option<String>,

    /// Show parser diagnostics for each tree
    #[arg(short, long)]
    pub verbose: bool,
}

/// Outcome of serializing, parsing and re-serializing one tree
#[derive(Debug, PartialEq)]
pub enum RoundTrip {
    Stable,
    Diverged { line: usize, expected: String, actual: String },
    Unparsable(String),
}

pub fn check(args: CheckArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let path = snapshot_path(args.snapshot.as_ref(), &config, cwd);
    let store = load_store(&path)?;

    println!("🔍 {} {}", "Checking".green().bold(), path.display());
    println!();

    if let Err(e) = store.check_invariants() {
        return Err(anyhow!("Snapshot violates document invariants: {}", e));
    }

    let roots = match &args.root {
        Some(root) => vec![root.clone()],
        None => top_level_ids(&store),
    };

    let mut failures = 0;
    for root in &roots {
        let target_args = TargetArgs {
            root: Some(root.clone()),
            ..TargetArgs::default()
        };
        let target = resolve_target(&store, &target_args, &config)?;

        match round_trip(&store, &target, &config.sync.source_path, args.verbose) {
            RoundTrip::Stable => println!("  {} {}", "✓".green(), root),
            RoundTrip::Diverged { line, expected, actual } => {
                failures += 1;
                println!("  {} {} - differs at line {}", "✗".red(), root, line);
                println!("      {} {}", "-".red(), expected);
                println!("      {} {}", "+".green(), actual);
            }
            RoundTrip::Unparsable(message) => {
                failures += 1;
                println!("  {} {} - {}", "✗".red(), root, message.red());
            }
        }
    }

    println!();
    if failures > 0 {
        return Err(anyhow!("{} of {} trees failed the round trip", failures, roots.len()));
    }
    println!("{} {} trees round-trip cleanly", "✅".green(), roots.len());
    Ok(())
}

pub fn round_trip(store: &DocumentStore, target: &SyncTarget, path: &str, verbose: bool) -> RoundTrip {
    let ctx = target.binding_context(store);
    let first = serialize_module(store, &target.root_id, &target.module_name, &ctx);

    let tree = match parse_with_path(&first, path, &ctx) {
        Ok(tree) => tree,
        Err(e) => return RoundTrip::Unparsable(e.to_string()),
    };
    print_diagnostics(&tree.diagnostics, verbose);

    let second = serialize_module(&tree, &target.root_id, &target.module_name, &ctx);
    if first == second {
        return RoundTrip::Stable;
    }

    let mut expected = first.lines();
    let mut actual = second.lines();
    let mut line = 1;
    loop {
        match (expected.next(), actual.next()) {
            (Some(a), Some(b)) if a == b => line += 1,
            (a, b) => {
                return RoundTrip::Diverged {
                    line,
                    expected: a.unwrap_or_default().to_string(),
                    actual: b.unwrap_or_default().to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drafter_document::{Element, Ownership, Style};

    #[test]
    fn test_round_trip_is_stable() {
        let mut store = DocumentStore::new();
        store.add_elements([
            Element::new("home", "main", Ownership::screen("S1"))
                .with_style(Style::new().with_literal("padding", 24.0))
                .with_children(["heading"]),
            Element::new("heading", "h1", Ownership::element("home")).with_text("Welcome back"),
        ]);

        let target = SyncTarget::screen("home", "Home");
        assert_eq!(round_trip(&store, &target, "App.jsx", false), RoundTrip::Stable);
    }
}
