use crate::config::Config;
use crate::project::{load_store, resolve_target, TargetArgs};
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use drafter_document::{BindingContext, DocumentSnapshot, Element};
use drafter_parser::{format_error, parse_with_path, Diagnostic, DiagnosticLevel, ParsedTree};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ParseArgs {
    /// Source file to parse
    pub input: PathBuf,

    /// Snapshot that supplies components for resolving `props.*` bindings
    #[arg(short, long)]
    pub snapshot: Option<PathBuf>,

    #[command(flatten)]
    pub target: TargetArgs,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    pub format: String,

    /// Show info-level diagnostics too
    #[arg(short, long)]
    pub verbose: bool,
}

pub fn parse(args: ParseArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let source = fs::read_to_string(&args.input)?;
    let file_name = args.input.to_string_lossy();

    let ctx = match &args.snapshot {
        Some(path) => {
            let store = load_store(path)?;
            resolve_target(&store, &args.target, &config)?.binding_context(&store)
        }
        None => {
            let mut ctx = BindingContext::new();
            for target in config.binding_targets() {
                ctx.add_target(target);
            }
            ctx
        }
    };

    let tree = parse_with_path(&source, &file_name, &ctx)
        .map_err(|e| anyhow!("\n{}", format_error(&source, &file_name, &e)))?;

    match args.format.as_str() {
        "json" => {
            let snapshot = DocumentSnapshot {
                elements: tree.elements.clone(),
                ..DocumentSnapshot::default()
            };
            println!("{}", snapshot.to_json()?);
        }
        "text" => print_tree(&tree),
        other => return Err(anyhow!("Unknown format: {}", other)),
    }

    print_diagnostics(&tree.diagnostics, args.verbose);
    Ok(())
}

fn print_tree(tree: &ParsedTree) {
    fn visit(tree: &ParsedTree, element: &Element, depth: usize) {
        let mut line = format!(
            "{}{} {}",
            "  ".repeat(depth),
            element.tag.bright_white(),
            format!("#{}", element.id).dimmed()
        );
        if let Some(text) = &element.properties.content.text {
            line.push_str(&format!(" {:?}", text));
        }
        if let Some(binding) = &element.properties.content.binding {
            let path = binding.path.as_deref().unwrap_or(&binding.ref_id);
            line.push_str(&format!(" {{{}}}", path).cyan().to_string());
        }
        println!("{}", line);

        for child in element.children() {
            if let Some(child) = tree.element(child) {
                visit(tree, child, depth + 1);
            }
        }
    }

    if let Some(root) = tree.root() {
        visit(tree, root, 0);
    }
}

pub fn print_diagnostics(diagnostics: &[Diagnostic], verbose: bool) {
    for diagnostic in diagnostics {
        let level_str = match diagnostic.level {
            DiagnosticLevel::Error => "error".red().bold(),
            DiagnosticLevel::Warning => "warning".yellow().bold(),
            DiagnosticLevel::Info => "info".blue().bold(),
        };

        if !verbose && matches!(diagnostic.level, DiagnosticLevel::Info) {
            continue;
        }

        eprintln!("  {} [{}] {}", level_str, diagnostic.rule, diagnostic.message);
    }
}
