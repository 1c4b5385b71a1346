use super::{mount, open_host};
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use pagecraft_editor::{AutoConfirm, Confirmation, Document, OutlineEntry};

#[derive(Debug, Args)]
pub struct OutlineArgs {
    /// Show computed styles for this device
    #[arg(short, long)]
    pub device: Option<String>,

    /// Include computed styles of each element
    #[arg(short, long)]
    pub styles: bool,
}

/// Print the layer tree of the stored site (or the starter page)
pub async fn outline(args: OutlineArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let mut host = open_host(&config, cwd);
    mount(&mut host, &config).await?;

    let editor = host.editor_mut()?;
    if let Some(device) = &args.device {
        editor.switch_device(device, &mut AutoConfirm(Confirmation::Declined))?;
    }

    let doc = editor.document();
    println!(
        "{} {}",
        "🌲 Layers".bright_blue().bold(),
        format!("({})", doc.active_device().label).dimmed()
    );
    for entry in doc.outline() {
        println!("{}", format_entry(doc, &entry, args.styles)?);
    }

    Ok(())
}

fn format_entry(doc: &Document, entry: &OutlineEntry, styles: bool) -> Result<String> {
    let indent = "  ".repeat(entry.depth + 1);
    let node = doc.node(&entry.id)?;

    if let Some(text) = node.text_content() {
        return Ok(format!("{}{}", indent, format!("\"{}\"", preview_text(text)).dimmed()));
    }

    let mut line = format!("{}{} {}", indent, entry.label.bright_white(), format!("#{}", entry.id).cyan());
    if styles {
        let computed = doc.computed_style(&entry.id)?;
        if !computed.is_empty() {
            let decls: Vec<String> = computed
                .iter()
                .map(|(property, value)| format!("{}:{}", property, value))
                .collect();
            line.push_str(&format!(" {}", decls.join("; ").dimmed()));
        }
    }
    Ok(line)
}

fn preview_text(text: &str) -> String {
    const MAX: usize = 40;
    let trimmed = text.trim();
    if trimmed.chars().count() <= MAX {
        return trimmed.to_string();
    }
    let cut: String = trimmed.chars().take(MAX).collect();
    format!("{}…", cut)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_text() {
        assert_eq!(preview_text("  Hello  "), "Hello");
        let long = "x".repeat(50);
        assert_eq!(preview_text(&long).chars().count(), 41);
    }
}
