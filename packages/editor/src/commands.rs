//! # Command Bus
//!
//! Named, synchronous actions invoked by the host UI. The built-ins are one
//! `set-device-<id>` command per device and `export-website`.
//!
//! Handlers never perform I/O. Export only asks for confirmation and
//! composes the page; the caller writes the returned page to storage.

use crate::devices::DeviceManager;
use crate::document::Document;
use crate::persistence::page_for;
use crate::EditorError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, instrument};

pub const EXPORT_COMMAND: &str = "export-website";

pub const EXPORT_PROMPT: &str = "Export website and save to storage?";

/// Id of the command that activates `device_id`
pub fn device_command_id(device_id: &str) -> String {
    format!("set-device-{}", device_id)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
}

/// Asks the user a yes/no question
pub trait Confirm {
    fn confirm(&mut self, message: &str) -> Confirmation;
}

impl<F> Confirm for F
where
    F: FnMut(&str) -> Confirmation,
{
    fn confirm(&mut self, message: &str) -> Confirmation {
        self(message)
    }
}

/// Confirmation that always answers the same way
#[derive(Debug, Clone, Copy)]
pub struct AutoConfirm(pub Confirmation);

impl Confirm for AutoConfirm {
    fn confirm(&mut self, _message: &str) -> Confirmation {
        self.0
    }
}

/// Capabilities available to a running command
pub struct CommandContext<'a> {
    pub confirm: &'a mut dyn Confirm,
}

impl<'a> CommandContext<'a> {
    pub fn new(confirm: &'a mut dyn Confirm) -> Self {
        Self { confirm }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Active device after the command; `changed` is false when it was
    /// already active
    DeviceActivated { device_id: String, changed: bool },
    /// Page ready to be written to storage
    Export { page: String },
    /// The user declined; nothing happened
    Declined,
    Done,
}

pub type CommandHandler =
    Box<dyn Fn(&mut Document, &mut CommandContext<'_>) -> Result<CommandOutcome, EditorError>>;

/// Toolbar button for a command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelButton {
    pub panel: String,
    pub label: String,
    #[serde(default)]
    pub active: bool,
}

pub struct Command {
    pub id: String,
    pub button: Option<PanelButton>,
    handler: CommandHandler,
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("id", &self.id)
            .field("button", &self.button)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
pub struct CommandBus {
    commands: IndexMap<String, Command>,
}

impl CommandBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Device commands for every registered device plus export
    pub fn with_defaults(devices: &DeviceManager) -> Result<Self, EditorError> {
        let mut bus = Self::new();
        let active = devices.active().id.clone();

        for device in devices.devices() {
            let device_id = device.id.clone();
            bus.register_with_button(
                &device_command_id(&device.id),
                PanelButton {
                    panel: "devices".to_string(),
                    label: device.label.clone(),
                    active: device.id == active,
                },
                move |doc, _ctx| {
                    let changed = doc.switch_device(&device_id)?;
                    Ok(CommandOutcome::DeviceActivated {
                        device_id: device_id.clone(),
                        changed,
                    })
                },
            )?;
        }

        bus.register_with_button(
            EXPORT_COMMAND,
            PanelButton {
                panel: "options".to_string(),
                label: "Export".to_string(),
                active: false,
            },
            export_website,
        )?;

        Ok(bus)
    }

    pub fn register<F>(&mut self, id: &str, handler: F) -> Result<(), EditorError>
    where
        F: Fn(&mut Document, &mut CommandContext<'_>) -> Result<CommandOutcome, EditorError>
            + 'static,
    {
        self.insert(id, None, Box::new(handler))
    }

    pub fn register_with_button<F>(
        &mut self,
        id: &str,
        button: PanelButton,
        handler: F,
    ) -> Result<(), EditorError>
    where
        F: Fn(&mut Document, &mut CommandContext<'_>) -> Result<CommandOutcome, EditorError>
            + 'static,
    {
        self.insert(id, Some(button), Box::new(handler))
    }

    fn insert(
        &mut self,
        id: &str,
        button: Option<PanelButton>,
        handler: CommandHandler,
    ) -> Result<(), EditorError> {
        if self.commands.contains_key(id) {
            return Err(EditorError::duplicate("command", id));
        }
        debug!(command = id, "Registering command");
        self.commands.insert(
            id.to_string(),
            Command {
                id: id.to_string(),
                button,
                handler,
            },
        );
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Command> {
        self.commands.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.commands.contains_key(id)
    }

    /// Commands in registration order
    pub fn list(&self) -> impl Iterator<Item = &Command> {
        self.commands.values()
    }

    /// Buttons shown in a panel, in registration order
    pub fn panel(&self, panel: &str) -> Vec<(&str, &PanelButton)> {
        self.commands
            .values()
            .filter_map(|c| c.button.as_ref().map(|b| (c.id.as_str(), b)))
            .filter(|(_, b)| b.panel == panel)
            .collect()
    }

    #[instrument(skip(self, doc, ctx))]
    pub fn execute(
        &mut self,
        id: &str,
        doc: &mut Document,
        ctx: &mut CommandContext<'_>,
    ) -> Result<CommandOutcome, EditorError> {
        let command = self
            .commands
            .get(id)
            .ok_or_else(|| EditorError::not_found("command", id))?;

        let outcome = (command.handler)(doc, ctx)?;
        info!(command = id, ?outcome, "Executed command");

        if let CommandOutcome::DeviceActivated { device_id, .. } = &outcome {
            self.mark_active(&device_command_id(device_id));
        }
        Ok(outcome)
    }

    /// Make `id` the only active button of its panel
    fn mark_active(&mut self, id: &str) {
        let Some(panel) = self
            .commands
            .get(id)
            .and_then(|c| c.button.as_ref())
            .map(|b| b.panel.clone())
        else {
            return;
        };

        for command in self.commands.values_mut() {
            if let Some(button) = command.button.as_mut().filter(|b| b.panel == panel) {
                button.active = command.id == id;
            }
        }
    }
}

fn export_website(
    doc: &mut Document,
    ctx: &mut CommandContext<'_>,
) -> Result<CommandOutcome, EditorError> {
    match ctx.confirm.confirm(EXPORT_PROMPT) {
        Confirmation::Declined => Ok(CommandOutcome::Declined),
        Confirmation::Confirmed => Ok(CommandOutcome::Export {
            page: page_for(doc),
        }),
    }
}
