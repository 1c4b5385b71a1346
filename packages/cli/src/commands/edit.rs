use super::{mount, open_host, StdinConfirm};
use crate::config::Config;
use anyhow::{anyhow, bail, Context, Result};
use clap::Args;
use colored::Colorize;
use pagecraft_editor::{
    AutoConfirm, Confirm, Confirmation, Editor, EditorError, ExportStatus, ROOT_ID,
};
use pagecraft_parser::format_error;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct EditArgs {
    /// Insert a catalog block, optionally at an index: `pricing@2`
    #[arg(short, long = "insert", value_name = "BLOCK[@INDEX]")]
    pub inserts: Vec<String>,

    /// Insert raw markup from a file at the end of the parent
    #[arg(short, long, value_name = "FILE")]
    pub markup: Option<PathBuf>,

    /// Parent for insertions
    #[arg(short, long, default_value = ROOT_ID)]
    pub parent: String,

    /// Remove a component and its subtree
    #[arg(long = "remove", value_name = "ID")]
    pub removals: Vec<String>,

    /// Device to edit styles for
    #[arg(short, long)]
    pub device: Option<String>,

    /// Component to edit styles and traits of
    #[arg(short, long, value_name = "ID")]
    pub select: Option<String>,

    /// Style edit on the selection: `typography.color=#333`
    #[arg(long = "style", value_name = "SECTOR.PROPERTY=VALUE")]
    pub styles: Vec<String>,

    /// Trait edit on the selection: `href=/pricing`
    #[arg(short, long = "trait", value_name = "NAME=VALUE")]
    pub traits: Vec<String>,

    /// Export the site to storage when done
    #[arg(short, long)]
    pub export: bool,

    /// Confirm the export without asking
    #[arg(short, long)]
    pub yes: bool,
}

pub async fn edit(args: EditArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let mut host = open_host(&config, cwd);
    mount(&mut host, &config).await?;

    println!("{}", "✏️  Editing site...".bright_blue().bold());
    apply_edits(host.editor_mut()?, &args, cwd)?;

    let editor = host.editor()?;
    println!(
        "  {} {} components, version {}",
        "•".dimmed(),
        editor.document().len() - 1,
        editor.document().version()
    );

    if !args.export {
        println!();
        println!(
            "{}",
            "Changes were not exported and have been discarded. Pass --export to save them."
                .yellow()
        );
        return Ok(());
    }

    let mut confirm: Box<dyn Confirm> = if args.yes {
        Box::new(AutoConfirm(Confirmation::Confirmed))
    } else {
        Box::new(StdinConfirm)
    };

    match host.export(confirm.as_mut()).await? {
        ExportStatus::Saved { bytes } => {
            println!();
            println!(
                "{} Exported {} bytes to {}",
                "✅".green(),
                bytes,
                config
                    .get_storage_dir(cwd)
                    .join(format!("{}.html", config.storage_key))
                    .display()
            );
        }
        ExportStatus::Declined => {
            println!("{}", "Export cancelled; nothing was saved.".yellow());
        }
    }

    Ok(())
}

fn apply_edits(editor: &mut Editor, args: &EditArgs, cwd: &str) -> Result<()> {
    for id in &args.removals {
        editor.remove(id)?;
        println!("  {} Removed {}", "✓".green(), id);
    }

    for spec in &args.inserts {
        let (block, index) = parse_insert(spec)?;
        let index = match index {
            Some(index) => index,
            None => editor.document().children(&args.parent)?.len(),
        };
        let id = editor.insert_block(block, &args.parent, index)?;
        println!(
            "  {} Inserted {} at {} → {}",
            "✓".green(),
            block.bright_white(),
            index,
            id
        );
    }

    if let Some(path) = &args.markup {
        let path = PathBuf::from(cwd).join(path);
        let source = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read {}", path.display()))?;
        let index = editor.document().children(&args.parent)?.len();

        match editor.insert(&args.parent, index, source.as_str()) {
            Ok(id) => println!("  {} Inserted {} → {}", "✓".green(), path.display(), id),
            Err(EditorError::Parse(err)) => {
                eprintln!("{}", format_error(&source, &path.display().to_string(), &err));
                bail!("{} is not valid markup", path.display());
            }
            Err(err) => return Err(err.into()),
        }
    }

    if let Some(device) = &args.device {
        let mut confirm = AutoConfirm(Confirmation::Declined);
        editor.switch_device(device, &mut confirm)?;
        println!("  {} Device: {}", "✓".green(), device);
    }

    if let Some(id) = &args.select {
        editor.select(id)?;
    } else if !args.styles.is_empty() || !args.traits.is_empty() {
        bail!("--style and --trait need a component; pass --select <ID>");
    }

    for spec in &args.styles {
        let (sector, property, value) = parse_style(spec)?;
        editor.set_style_property(sector, property, value)?;
        println!("  {} {}: {}", "✓".green(), property, value);
    }

    for spec in &args.traits {
        let (name, value) = parse_assignment(spec)?;
        editor.set_trait(name, value)?;
        println!("  {} {}=\"{}\"", "✓".green(), name, value);
    }

    Ok(())
}

/// `pricing@2` → (`pricing`, Some(2))
fn parse_insert(spec: &str) -> Result<(&str, Option<usize>)> {
    match spec.split_once('@') {
        None => Ok((spec, None)),
        Some((block, index)) => {
            let index = index
                .parse()
                .map_err(|_| anyhow!("Invalid index in {:?}", spec))?;
            Ok((block, Some(index)))
        }
    }
}

/// `typography.color=red` → (`typography`, `color`, `red`)
fn parse_style(spec: &str) -> Result<(&str, &str, &str)> {
    let (path, value) = parse_assignment(spec)?;
    let (sector, property) = path
        .split_once('.')
        .ok_or_else(|| anyhow!("Expected SECTOR.PROPERTY=VALUE, got {:?}", spec))?;
    Ok((sector, property, value))
}

fn parse_assignment(spec: &str) -> Result<(&str, &str)> {
    spec.split_once('=')
        .map(|(name, value)| (name.trim(), value.trim()))
        .filter(|(name, _)| !name.is_empty())
        .ok_or_else(|| anyhow!("Expected NAME=VALUE, got {:?}", spec))
}
