//! Change notifications
//!
//! Observers (typically the rendering surface) are told which subtree a
//! successful mutation touched so they can re-render just that part.

use crate::styles::StyleTarget;
use serde::{Deserialize, Serialize};

/// Description of one applied change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DocumentChange {
    /// Top-level nodes of an inserted template, in order
    Inserted {
        parent_id: String,
        index: usize,
        node_ids: Vec<String>,
    },
    /// `removed` lists every id in the removed subtree
    Removed {
        parent_id: String,
        node_id: String,
        removed: Vec<String>,
    },
    Moved {
        node_id: String,
        old_parent_id: String,
        new_parent_id: String,
        index: usize,
    },
    StyleChanged {
        target: StyleTarget,
        device_id: Option<String>,
        property: String,
    },
    AttributeChanged {
        node_id: String,
        name: String,
    },
    /// The node's id attribute changed
    Renamed {
        old_id: String,
        new_id: String,
    },
    TextChanged {
        node_id: String,
    },
    /// Active device changed; active style rules must be recomputed
    DeviceSwitched {
        device_id: String,
    },
}

pub trait DocumentObserver {
    fn on_change(&mut self, change: &DocumentChange);
}

impl<F> DocumentObserver for F
where
    F: FnMut(&DocumentChange),
{
    fn on_change(&mut self, change: &DocumentChange) {
        self(change)
    }
}

/// Handle returned by [`crate::Document::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(pub(crate) u64);

#[derive(Default)]
pub(crate) struct Observers {
    next_id: u64,
    entries: Vec<(ObserverId, Box<dyn DocumentObserver>)>,
}

impl Observers {
    pub(crate) fn add(&mut self, observer: Box<dyn DocumentObserver>) -> ObserverId {
        self.next_id += 1;
        let id = ObserverId(self.next_id);
        self.entries.push((id, observer));
        id
    }

    pub(crate) fn remove(&mut self, id: ObserverId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    pub(crate) fn notify(&mut self, change: &DocumentChange) {
        for (_, observer) in &mut self.entries {
            observer.on_change(change);
        }
    }
}

impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("count", &self.entries.len())
            .finish()
    }
}
