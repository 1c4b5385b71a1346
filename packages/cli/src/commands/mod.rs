pub mod blocks;
pub mod edit;
pub mod export;
pub mod outline;
pub mod preview;

pub use blocks::{blocks, BlocksArgs};
pub use edit::{edit, EditArgs};
pub use export::{export, ExportArgs};
pub use outline::{outline, OutlineArgs};
pub use preview::{preview, PreviewArgs};

use crate::config::Config;
use anyhow::Result;
use colored::Colorize;
use pagecraft_editor::{
    Confirm, Confirmation, EditorHost, FileStorage, MountStatus, RegisterPolicy,
};
use std::io::{self, BufRead, Write};
use tracing::debug;

/// Host over the configured file storage, not yet mounted
pub fn open_host(config: &Config, cwd: &str) -> EditorHost<FileStorage> {
    let storage = FileStorage::new(config.get_storage_dir(cwd));
    debug!(dir = %storage.root().display(), key = %config.storage_key, "Opening storage");
    EditorHost::new(storage, config.editor_config())
}

/// Mount the editor and register blocks from the config file
pub async fn mount(host: &mut EditorHost<FileStorage>, config: &Config) -> Result<()> {
    if let MountStatus::Mounted {
        warning: Some(warning),
    } = host.mount().await?
    {
        println!(
            "{} Stored site could not be loaded, starting from the starter page",
            "⚠️".yellow()
        );
        println!("   {}", warning.dimmed());
    }

    let editor = host.editor_mut()?;
    for block in &config.blocks {
        editor
            .blocks_mut()
            .register_with(block.clone(), RegisterPolicy::Overwrite)?;
    }
    Ok(())
}

/// Asks on stdin; anything other than "y" / "yes" declines
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, message: &str) -> Confirmation {
        print!("{} {} ", message.bright_white(), "[y/N]".dimmed());
        if io::stdout().flush().is_err() {
            return Confirmation::Declined;
        }

        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) if is_yes(&answer) => Confirmation::Confirmed,
            _ => Confirmation::Declined,
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_yes() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes(""));
        assert!(!is_yes("no"));
    }
}
