use crate::config::Config;
use crate::project::{load_store, resolve_target, snapshot_path, TargetArgs};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use drafter_sync::{DirectoryBuffer, DocumentSession};
use std::fs;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Args)]
pub struct SyncArgs {
    /// Snapshot file (defaults to the configured snapshot)
    pub snapshot: Option<PathBuf>,

    #[command(flatten)]
    pub target: TargetArgs,

    /// Buffer directory (overrides config)
    #[arg(short, long)]
    pub dir: Option<PathBuf>,

    /// Poll interval in milliseconds (overrides config)
    #[arg(long)]
    pub poll_ms: Option<u64>,

    /// Write the document back to the snapshot on exit
    #[arg(long)]
    pub save: bool,
}

pub async fn sync(args: SyncArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let path = snapshot_path(args.snapshot.as_ref(), &config, cwd);
    let store = load_store(&path)?;
    let target = resolve_target(&store, &args.target, &config)?;

    let mut sync_config = config.sync.clone();
    if let Some(poll_ms) = args.poll_ms {
        sync_config.poll_interval_ms = poll_ms;
    }

    let buffer_dir = args.dir.clone().unwrap_or_else(|| config.get_buffer_dir(cwd));
    if !buffer_dir.exists() {
        println!(
            "{} {} does not exist yet, waiting for it to be created",
            "⚠️".yellow(),
            buffer_dir.display()
        );
    }

    println!("🔄 {} {}", "Syncing".green().bold(), target.root_id);
    println!("   Snapshot: {}", path.display());
    println!("   Buffer:   {}", buffer_dir.join(&sync_config.source_path).display());
    println!("   {}", "Press Ctrl+C to stop".dimmed());
    println!();

    let session = DocumentSession::init(
        store,
        DirectoryBuffer::new(&buffer_dir),
        sync_config,
        target,
    );

    tokio::signal::ctrl_c().await?;
    info!("stopping sync session");

    let store = session.dispose().await?;
    if args.save {
        fs::write(&path, store.snapshot().to_json()?)?;
        println!("  {} Saved {}", "✓".green(), path.display());
    }

    println!("✨ {} Sync stopped", "Done".green().bold());
    Ok(())
}
