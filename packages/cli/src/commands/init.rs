use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Snapshot file to create
    #[arg(short, long, default_value = "document.json")]
    pub snapshot: String,

    /// Directory mirrored by `drafter sync`
    #[arg(short, long, default_value = "buffer")]
    pub buffer_dir: String,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

const EXAMPLE_SNAPSHOT: &str = r##"{
  "components": [
    {
      "id": "cmp-button",
      "name": "Button",
      "props": [
        { "id": "prop-label", "name": "label", "type": "string", "defaultValue": "Click me" }
      ]
    }
  ],
  "elements": [
    {
      "id": "button-root",
      "tag": "button",
      "kind": "component",
      "name": "Button",
      "ownership": { "type": "component", "ownerId": "cmp-button" },
      "properties": {
        "attributes": { "type": "button" },
        "style": { "padding": "8px 16px", "background": "#3366FF", "color": "white" },
        "content": { "binding": { "refKind": "prop", "refId": "prop-label" } }
      }
    }
  ]
}
"##;

pub fn init(args: InitArgs, cwd: &str) -> Result<()> {
    let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

    // Check if config already exists
    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing Drafter project...".bright_blue().bold());

    let snapshot_file = PathBuf::from(cwd).join(&args.snapshot);
    if !snapshot_file.exists() {
        if let Some(parent) = snapshot_file.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&snapshot_file, EXAMPLE_SNAPSHOT)?;
        println!("  {} Created {}", "✓".green(), args.snapshot);
    }

    let buffer_dir = PathBuf::from(cwd).join(&args.buffer_dir);
    if !buffer_dir.exists() {
        fs::create_dir_all(&buffer_dir)?;
        println!("  {} Created {}/", "✓".green(), args.buffer_dir);
    }

    let config = Config {
        snapshot: args.snapshot.clone(),
        buffer_dir: args.buffer_dir.clone(),
        ..Config::default()
    };

    // Write config file
    let config_json = serde_json::to_string_pretty(&config)?;
    fs::write(&config_path, config_json)?;

    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    println!();
    println!("{}", "✅ Project initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Run: drafter check");
    println!("  2. Run: drafter sync");
    println!("  3. Edit {}/{}", args.buffer_dir, config.sync.source_path);

    Ok(())
}
