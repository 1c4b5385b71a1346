mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    blocks, edit, export, outline, preview, BlocksArgs, EditArgs, ExportArgs, OutlineArgs,
    PreviewArgs,
};
use tracing_subscriber::EnvFilter;

/// Pagecraft CLI - Visual page composition from prebuilt blocks
#[derive(Parser, Debug)]
#[command(name = "pagecraft")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open the editor: insert blocks, edit styles and traits, then export
    Edit(EditArgs),

    /// Show the last exported page
    Preview(PreviewArgs),

    /// Export the current site to storage
    Export(ExportArgs),

    /// List the block catalog
    Blocks(BlocksArgs),

    /// Print the layer tree of the site
    Outline(OutlineArgs),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match std::env::current_dir() {
        Ok(cwd) => run(cli.command, &cwd.display().to_string()).await,
        Err(err) => Err(anyhow::anyhow!("Cannot get current directory: {}", err)),
    };

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}

async fn run(command: Command, cwd: &str) -> anyhow::Result<()> {
    match command {
        Command::Edit(args) => edit(args, cwd).await,
        Command::Preview(args) => preview(args, cwd).await,
        Command::Export(args) => export(args, cwd).await,
        Command::Blocks(args) => blocks(args, cwd),
        Command::Outline(args) => outline(args, cwd).await,
    }
}
