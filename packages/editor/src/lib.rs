//! # Pagecraft Editor
//!
//! Visual page composition engine.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ parser: markup / stylesheet → ComponentTree │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: Document + managers                 │
//! │  - BlockRegistry inserts fragments          │
//! │  - StyleManager / TraitManager edit the     │
//! │    selected component                       │
//! │  - DeviceManager scopes style rules         │
//! │  - CommandBus runs device + export actions  │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ persistence: page string ⇄ Storage          │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Registry is source of truth**: markup and stylesheet are derived views
//! 2. **Validate, then apply**: a failed mutation changes nothing
//! 3. **Explicit persistence**: nothing is written until an export is confirmed
//! 4. **I/O never borrows the document**: pages are composed before the write
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pagecraft_editor::{AutoConfirm, Confirmation, EditorConfig, EditorHost, MemoryStorage};
//!
//! let mut host = EditorHost::new(MemoryStorage::new(), EditorConfig::default());
//! host.mount().await?;
//!
//! let editor = host.editor_mut()?;
//! editor.insert_block("pricing", "wrapper", 2)?;
//! editor.select("home")?;
//! editor.set_style_property("typography", "color", "white")?;
//!
//! host.export(&mut AutoConfirm(Confirmation::Confirmed)).await?;
//! ```

mod blocks;
mod catalog;
mod commands;
mod devices;
mod document;
mod errors;
mod host;
mod mutations;
mod observer;
mod persistence;
mod serializer;
mod session;
mod storage;
mod style_manager;
mod styles;
mod traits;

pub use blocks::{Block, BlockContent, BlockRegistry, RegisterPolicy};
pub use catalog::{default_blocks, STARTER_MARKUP};
pub use commands::{
    device_command_id, AutoConfirm, Command, CommandBus, CommandContext, CommandHandler,
    CommandOutcome, Confirm, Confirmation, PanelButton, EXPORT_COMMAND, EXPORT_PROMPT,
};
pub use devices::{default_devices, parse_width, Device, DeviceManager};
pub use document::{Document, Node, NodeKind, OutlineEntry, ROOT_ID, ROOT_TAG};
pub use errors::{EditorError, StorageError};
pub use host::{EditorHost, ExportStatus, MountStatus, PreviewState, EMPTY_PREVIEW_MESSAGE};
pub use mutations::{is_valid_node_id, Mutation, MutationResult, Template};
pub use observer::{DocumentChange, DocumentObserver, ObserverId};
pub use persistence::{compose_page, document_from_page, page_for, Hydrated, PersistenceAdapter};
pub use serializer::SerializedDocument;
pub use session::{Editor, EditorConfig, DEFAULT_STORAGE_KEY};
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use style_manager::{PropertyDef, Sector, StyleManager, StyleSchema, ValueDomain};
pub use styles::{ScopedRules, StyleRules, StyleTarget};
pub use traits::{TraitDef, TraitKind, TraitManager, TraitValue};

// Re-export parser types that appear in the public API
pub use pagecraft_parser::{ComponentTree, Declarations, NodeSpec, ParseError};
