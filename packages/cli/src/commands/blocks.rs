use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use pagecraft_editor::{default_blocks, Block, BlockContent, BlockRegistry, RegisterPolicy};

#[derive(Debug, Args)]
pub struct BlocksArgs {
    /// Only list this category
    #[arg(short, long)]
    pub category: Option<String>,

    /// Print the catalog as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn blocks(args: BlocksArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let registry = catalog(&config)?;

    let selected: Vec<&Block> = registry
        .list()
        .filter(|b| {
            args.category
                .as_deref()
                .map_or(true, |c| b.category.eq_ignore_ascii_case(c))
        })
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&selected)?);
        return Ok(());
    }

    if selected.is_empty() {
        println!("{}", "⚠️  No blocks found".yellow());
        return Ok(());
    }

    println!("{}", "📦 Block catalog".bright_blue().bold());
    let mut current: Option<&str> = None;
    for block in selected {
        if current != Some(block.category.as_str()) {
            println!();
            println!("{}", block.category.bold());
            current = Some(block.category.as_str());
        }
        let kind = match &block.content {
            BlockContent::Markup(_) => "markup",
            BlockContent::Tree(_) => "tree",
        };
        println!(
            "  {:<18} {} {}",
            block.id.bright_white(),
            block.label,
            format!("({})", kind).dimmed()
        );
    }

    Ok(())
}

/// Default catalog plus the config file's blocks
fn catalog(config: &Config) -> Result<BlockRegistry> {
    let mut registry = BlockRegistry::with_blocks(default_blocks())?;
    for block in &config.blocks {
        registry.register_with(block.clone(), RegisterPolicy::Overwrite)?;
    }
    Ok(registry)
}
