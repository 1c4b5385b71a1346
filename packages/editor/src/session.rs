//! # Edit Session
//!
//! An [`Editor`] is one mounted editing session: the document plus the
//! managers that act on it (blocks, styles, traits, commands) and the
//! current selection.

use crate::blocks::BlockRegistry;
use crate::catalog::default_blocks;
use crate::commands::{CommandBus, CommandContext, CommandOutcome, Confirm};
use crate::devices::{default_devices, Device, DeviceManager};
use crate::document::Document;
use crate::mutations::{Mutation, MutationResult, Template};
use crate::observer::DocumentChange;
use crate::style_manager::{StyleManager, StyleSchema};
use crate::traits::{TraitManager, TraitValue};
use crate::EditorError;
use tracing::debug;

/// Storage key used when none is configured
pub const DEFAULT_STORAGE_KEY: &str = "pagecraft-site";

#[derive(Debug, Clone)]
pub struct EditorConfig {
    /// Key the site is stored under
    pub storage_key: String,
    /// Registration order is cascade order
    pub devices: Vec<Device>,
    pub style_schema: StyleSchema,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            devices: default_devices(),
            style_schema: StyleSchema::default(),
        }
    }
}

impl EditorConfig {
    pub fn device_manager(&self) -> Result<DeviceManager, EditorError> {
        DeviceManager::new(self.devices.clone())
    }
}

/// One editing session over an exclusively owned document
#[derive(Debug)]
pub struct Editor {
    document: Document,
    blocks: BlockRegistry,
    styles: StyleManager,
    traits: TraitManager,
    commands: CommandBus,
}

impl Editor {
    /// Session with the default block catalog
    pub fn new(document: Document, config: &EditorConfig) -> Result<Self, EditorError> {
        Self::with_blocks(document, config, BlockRegistry::with_blocks(default_blocks())?)
    }

    pub fn with_blocks(
        document: Document,
        config: &EditorConfig,
        blocks: BlockRegistry,
    ) -> Result<Self, EditorError> {
        let commands = CommandBus::with_defaults(document.devices())?;

        Ok(Self {
            document,
            blocks,
            styles: StyleManager::new(config.style_schema.clone()),
            traits: TraitManager::default(),
            commands,
        })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Apply a mutation to the document. The selection follows renames and
    /// is cleared when its node is removed.
    pub fn apply(&mut self, mutation: Mutation) -> Result<MutationResult, EditorError> {
        let result = self.document.apply(mutation)?;

        match &result.change {
            DocumentChange::Renamed { old_id, new_id } => {
                self.styles.retarget(old_id, new_id);
                self.traits.retarget(old_id, new_id);
            }
            DocumentChange::Removed { removed, .. } => {
                if self
                    .selected()
                    .map_or(false, |selected| removed.iter().any(|id| id == selected))
                {
                    self.deselect();
                }
            }
            _ => {}
        }
        Ok(result)
    }

    /// Insert a template under `parent_id`; returns the first inserted id
    pub fn insert(
        &mut self,
        parent_id: &str,
        index: usize,
        template: impl Into<Template>,
    ) -> Result<String, EditorError> {
        self.document.insert(parent_id, index, template)
    }

    pub fn blocks(&self) -> &BlockRegistry {
        &self.blocks
    }

    pub fn blocks_mut(&mut self) -> &mut BlockRegistry {
        &mut self.blocks
    }

    pub fn style_manager(&self) -> &StyleManager {
        &self.styles
    }

    pub fn trait_manager(&self) -> &TraitManager {
        &self.traits
    }

    pub fn commands(&self) -> &CommandBus {
        &self.commands
    }

    pub fn insert_block(
        &mut self,
        block_id: &str,
        parent_id: &str,
        index: usize,
    ) -> Result<String, EditorError> {
        self.blocks
            .instantiate(block_id, &mut self.document, parent_id, index)
    }

    /// Remove a node, clearing the selection if it was inside the subtree
    pub fn remove(&mut self, node_id: &str) -> Result<(), EditorError> {
        self.apply(Mutation::RemoveNode {
            node_id: node_id.to_string(),
        })
        .map(drop)
    }

    /// Select a component for style and trait editing
    pub fn select(&mut self, node_id: &str) -> Result<(), EditorError> {
        self.styles.bind(&self.document, node_id)?;
        self.traits.bind(&self.document, node_id)?;
        debug!(node = node_id, "Selected component");
        Ok(())
    }

    pub fn deselect(&mut self) {
        self.styles.unbind();
        self.traits.unbind();
    }

    pub fn selected(&self) -> Option<&str> {
        self.styles.selected()
    }

    pub fn set_style_property(
        &mut self,
        sector: &str,
        property: &str,
        value: &str,
    ) -> Result<(), EditorError> {
        self.styles
            .set_property(&mut self.document, sector, property, value)
            .map(drop)
    }

    pub fn style_property(&self, sector: &str, property: &str) -> Result<Option<String>, EditorError> {
        self.styles.property_value(&self.document, sector, property)
    }

    /// Write a trait of the selection. Renaming through the `id` trait keeps
    /// the component selected under its new id.
    pub fn set_trait(&mut self, name: &str, value: &str) -> Result<(), EditorError> {
        let before = self.traits.selected().map(str::to_string);
        self.traits.set_trait(&mut self.document, name, value)?;

        if let (Some(old), Some(new)) = (before.as_deref(), self.traits.selected()) {
            if old != new {
                self.styles.retarget(old, new);
            }
        }
        Ok(())
    }

    pub fn traits(&self) -> Result<Vec<TraitValue>, EditorError> {
        self.traits.traits(&self.document)
    }

    /// Activate a device through its command
    pub fn switch_device(
        &mut self,
        device_id: &str,
        confirm: &mut dyn Confirm,
    ) -> Result<bool, EditorError> {
        let command = crate::commands::device_command_id(device_id);
        if !self.commands.contains(&command) {
            return Err(EditorError::not_found("device", device_id));
        }
        match self.execute(&command, confirm)? {
            CommandOutcome::DeviceActivated { changed, .. } => Ok(changed),
            _ => Ok(false),
        }
    }

    pub fn execute(
        &mut self,
        command_id: &str,
        confirm: &mut dyn Confirm,
    ) -> Result<CommandOutcome, EditorError> {
        let mut ctx = CommandContext::new(confirm);
        self.commands
            .execute(command_id, &mut self.document, &mut ctx)
    }
}
