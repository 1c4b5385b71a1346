//! # Editor Host
//!
//! Owns the optional editor instance and the storage it persists to.
//!
//! ```text
//! unmounted ──mount──▶ mounted ──unmount──▶ unmounted
//!     ▲                  │ export (confirmed) → storage write
//!     └──── preview reads storage, never the live document
//! ```
//!
//! Mount hydrates from storage or falls back to the starter page. Nothing
//! is written until an export is confirmed.

use crate::commands::{CommandOutcome, Confirm, EXPORT_COMMAND};
use crate::persistence::{Hydrated, PersistenceAdapter};
use crate::session::{Editor, EditorConfig};
use crate::storage::Storage;
use crate::EditorError;
use std::future::Future;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Shown by the preview surface when nothing has been exported
pub const EMPTY_PREVIEW_MESSAGE: &str =
    "Nothing to preview yet. Export your site from the editor first.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MountStatus {
    /// `warning` is set when the stored page was unusable and the starter
    /// page was loaded instead
    Mounted { warning: Option<String> },
    AlreadyMounted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportStatus {
    Saved { bytes: usize },
    Declined,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewState {
    Empty,
    Document(String),
}

impl PreviewState {
    pub fn message(&self) -> Option<&'static str> {
        match self {
            PreviewState::Empty => Some(EMPTY_PREVIEW_MESSAGE),
            PreviewState::Document(_) => None,
        }
    }
}

#[derive(Debug)]
pub struct EditorHost<S> {
    config: EditorConfig,
    persistence: PersistenceAdapter<S>,
    editor: Option<Editor>,
}

impl<S: Storage + 'static> EditorHost<S> {
    pub fn new(storage: S, config: EditorConfig) -> Self {
        Self::shared(Arc::new(storage), config)
    }

    pub fn shared(storage: Arc<S>, config: EditorConfig) -> Self {
        Self {
            config,
            persistence: PersistenceAdapter::shared(storage),
            editor: None,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn storage(&self) -> &Arc<S> {
        self.persistence.storage()
    }

    pub fn is_mounted(&self) -> bool {
        self.editor.is_some()
    }

    /// Create the editor. A second mount is a no-op.
    #[instrument(skip(self), fields(key = %self.config.storage_key))]
    pub async fn mount(&mut self) -> Result<MountStatus, EditorError> {
        if self.editor.is_some() {
            return Ok(MountStatus::AlreadyMounted);
        }

        let devices = self.config.device_manager()?;
        let Hydrated { document, warning } = self
            .persistence
            .load_or_starter(&self.config.storage_key, devices)
            .await?;

        if let Some(warning) = &warning {
            warn!(%warning, "Mounted with starter page");
        }
        info!(nodes = document.len(), "Editor mounted");

        self.editor = Some(Editor::new(document, &self.config)?);
        Ok(MountStatus::Mounted { warning })
    }

    /// Drop the editor and its unsaved changes. Returns whether one was
    /// mounted.
    pub fn unmount(&mut self) -> bool {
        let was_mounted = self.editor.take().is_some();
        if was_mounted {
            info!("Editor unmounted");
        }
        was_mounted
    }

    pub fn editor(&self) -> Result<&Editor, EditorError> {
        self.editor.as_ref().ok_or(EditorError::NotMounted)
    }

    pub fn editor_mut(&mut self) -> Result<&mut Editor, EditorError> {
        self.editor.as_mut().ok_or(EditorError::NotMounted)
    }

    /// Run the export command and, when confirmed, return the pending write.
    ///
    /// The page is composed before this returns and the future borrows
    /// nothing, so the editor stays usable while the write is in flight.
    /// `None` means the export was declined.
    pub fn begin_export(
        &mut self,
        confirm: &mut dyn Confirm,
    ) -> Result<Option<impl Future<Output = Result<usize, EditorError>> + Send + 'static>, EditorError>
    {
        let editor = self.editor.as_mut().ok_or(EditorError::NotMounted)?;

        let page = match editor.execute(EXPORT_COMMAND, confirm)? {
            CommandOutcome::Export { page } => page,
            CommandOutcome::Declined => return Ok(None),
            other => {
                return Err(EditorError::invalid_operation(format!(
                    "Export command returned {:?}",
                    other
                )))
            }
        };

        let key = self.config.storage_key.clone();
        let pending = self.persistence.save_page(&key, page);
        Ok(Some(async move {
            let bytes = pending.await?;
            info!(key = %key, bytes, "Website exported");
            Ok(bytes)
        }))
    }

    /// Export and wait for the write.
    ///
    /// On a storage failure the previously stored page is untouched and the
    /// in-memory document is kept.
    pub async fn export(&mut self, confirm: &mut dyn Confirm) -> Result<ExportStatus, EditorError> {
        match self.begin_export(confirm)? {
            Some(pending) => Ok(ExportStatus::Saved {
                bytes: pending.await?,
            }),
            None => Ok(ExportStatus::Declined),
        }
    }

    /// What the preview surface shows: the last exported page
    pub async fn preview(&self) -> Result<PreviewState, EditorError> {
        Ok(
            match self.persistence.read_page(&self.config.storage_key).await? {
                Some(page) if !page.trim().is_empty() => PreviewState::Document(page),
                _ => PreviewState::Empty,
            },
        )
    }
}
