use super::{mount, open_host, StdinConfirm};
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use pagecraft_editor::{AutoConfirm, Confirm, Confirmation, ExportStatus, PreviewState};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Also write the exported page to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Confirm without asking
    #[arg(short, long)]
    pub yes: bool,
}

/// Save the current site (stored or starter) through the export command
pub async fn export(args: ExportArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let mut host = open_host(&config, cwd);
    mount(&mut host, &config).await?;

    let mut confirm: Box<dyn Confirm> = if args.yes {
        Box::new(AutoConfirm(Confirmation::Confirmed))
    } else {
        Box::new(StdinConfirm)
    };

    let bytes = match host.export(confirm.as_mut()).await? {
        ExportStatus::Saved { bytes } => bytes,
        ExportStatus::Declined => {
            println!("{}", "Export cancelled; nothing was saved.".yellow());
            return Ok(());
        }
    };
    println!("{} Website exported ({} bytes)", "✅".green(), bytes);

    if let Some(output) = args.output {
        let output = PathBuf::from(cwd).join(output);
        if let PreviewState::Document(page) = host.preview().await? {
            if let Some(parent) = output.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&output, page)?;
            println!("  {} Wrote {}", "✓".green(), output.display());
        }
    }

    Ok(())
}
