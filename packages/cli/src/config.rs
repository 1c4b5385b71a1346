use pagecraft_editor::{Block, Device, EditorConfig, DEFAULT_STORAGE_KEY};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_CONFIG_NAME: &str = "pagecraft.config.json";

/// Pagecraft configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Directory holding stored pages
    #[serde(default = "default_storage_dir")]
    pub storage_dir: String,

    /// Key the site is stored under
    #[serde(default = "default_storage_key")]
    pub storage_key: String,

    /// Replaces the default Desktop / Tablet / Mobile devices
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub devices: Option<Vec<Device>>,

    /// Extra blocks; an id already in the catalog replaces that block
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocks: Vec<Block>,
}

fn default_storage_dir() -> String {
    ".pagecraft".to_string()
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }

    /// Get absolute path to the storage directory
    pub fn get_storage_dir(&self, cwd: &str) -> PathBuf {
        PathBuf::from(cwd).join(&self.storage_dir)
    }

    pub fn editor_config(&self) -> EditorConfig {
        let mut config = EditorConfig {
            storage_key: self.storage_key.clone(),
            ..EditorConfig::default()
        };
        if let Some(devices) = &self.devices {
            config.devices = devices.clone();
        }
        config
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_dir: default_storage_dir(),
            storage_key: default_storage_key(),
            devices: None,
            blocks: vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagecraft_editor::BlockContent;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "storageDir": "site-data",
            "storageKey": "landing",
            "devices": [
                { "id": "desktop", "label": "Desktop", "width": "" },
                { "id": "phone", "label": "Phone", "width": "390px" }
            ],
            "blocks": [
                {
                    "id": "divider",
                    "label": "Divider",
                    "category": "Basic",
                    "content": { "kind": "markup", "value": "<hr/>" }
                }
            ]
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.storage_dir, "site-data");
        assert_eq!(config.storage_key, "landing");

        let editor = config.editor_config();
        assert_eq!(editor.storage_key, "landing");
        assert_eq!(editor.devices.len(), 2);
        assert_eq!(editor.devices[1].width, Some(390));
        assert_eq!(
            config.blocks[0].content,
            BlockContent::Markup("<hr/>".to_string())
        );
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.storage_dir, ".pagecraft");
        assert_eq!(config.storage_key, "pagecraft-site");
        assert!(config.devices.is_none());
        assert_eq!(config.editor_config().devices.len(), 3);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{ "storageKey": "blog" }"#).unwrap();
        assert_eq!(config.storage_dir, ".pagecraft");
        assert_eq!(config.storage_key, "blog");
        assert!(config.blocks.is_empty());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().display().to_string()).unwrap();
        assert_eq!(config.storage_key, "pagecraft-site");
        assert_eq!(
            config.get_storage_dir("/srv/site"),
            PathBuf::from("/srv/site/.pagecraft")
        );
    }
}
