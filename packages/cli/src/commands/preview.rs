use super::open_host;
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use pagecraft_editor::{PreviewState, EMPTY_PREVIEW_MESSAGE};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct PreviewArgs {
    /// Write the page to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Show the last exported page. Never mounts the editor.
pub async fn preview(args: PreviewArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let host = open_host(&config, cwd);

    let page = match host.preview().await? {
        PreviewState::Document(page) => page,
        PreviewState::Empty => {
            println!("{}", EMPTY_PREVIEW_MESSAGE.yellow());
            return Ok(());
        }
    };

    match args.output {
        Some(output) => {
            let output = PathBuf::from(cwd).join(output);
            fs::write(&output, &page)?;
            println!("{} Preview written to {}", "✓".green(), output.display());
        }
        None => println!("{}", page),
    }

    Ok(())
}
