use crate::config::Config;
use crate::project::{load_store, resolve_target, snapshot_path, TargetArgs};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use drafter_parser::Serializer;
use drafter_props::project_scope;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct SerializeArgs {
    /// Snapshot file (defaults to the configured snapshot)
    pub snapshot: Option<PathBuf>,

    #[command(flatten)]
    pub target: TargetArgs,

    /// Emit bare JSX instead of a complete module
    #[arg(long)]
    pub bare: bool,

    /// Write source and props files into this directory instead of stdout
    #[arg(short, long)]
    pub out_dir: Option<PathBuf>,
}

pub fn serialize(args: SerializeArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let path = snapshot_path(args.snapshot.as_ref(), &config, cwd);
    let store = load_store(&path)?;
    let target = resolve_target(&store, &args.target, &config)?;

    let ctx = target.binding_context(&store);
    let mut serializer = Serializer::new(&ctx);
    let source = if args.bare {
        serializer.serialize(&store, &target.root_id)
    } else {
        serializer.serialize_module(&store, &target.root_id, &target.module_name)
    };

    for diagnostic in serializer.diagnostics() {
        eprintln!(
            "  {} [{}] {}",
            "warning".yellow().bold(),
            diagnostic.rule,
            diagnostic.message
        );
    }

    let Some(out_dir) = args.out_dir else {
        print!("{}", source);
        return Ok(());
    };

    let artifact = project_scope(&store, &target.scope)?;
    let props = artifact.render()?;

    fs::create_dir_all(&out_dir)?;
    let source_file = out_dir.join(&config.sync.source_path);
    let props_file = out_dir.join(&config.sync.props_path);
    fs::write(&source_file, source)?;
    fs::write(&props_file, props)?;

    println!(
        "  {} {} → {}",
        "✓".green(),
        target.root_id,
        source_file.display()
    );
    println!("  {} props → {}", "✓".green(), props_file.display());

    Ok(())
}
