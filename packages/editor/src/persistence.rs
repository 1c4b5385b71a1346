//! # Persistence
//!
//! A document is stored as one complete page: the stylesheet inside
//! `<head><style>` and the component markup as the children of `<body>`.
//! Loading parses the page back and rebuilds nodes and rules, so
//! save → load → save produces identical bytes.

use crate::devices::DeviceManager;
use crate::document::{Document, ROOT_ID, ROOT_TAG};
use crate::storage::Storage;
use crate::EditorError;
use pagecraft_parser::{parse_page, parse_stylesheet, Declarations};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Wrap serialized markup and stylesheet in a standalone page
pub fn compose_page(markup: &str, stylesheet: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\" />\n<style>{}</style>\n</head>\n<body>{}</body>\n</html>",
        stylesheet, markup
    )
}

/// The page a document persists as
pub fn page_for(doc: &Document) -> String {
    let serialized = doc.serialize_markup();
    compose_page(&serialized.markup, &serialized.stylesheet)
}

/// Rebuild a document from page source.
///
/// Rules whose selector is not `body`, `#id` or `.class`, and media blocks
/// that match no registered device width, are dropped with a warning.
/// Any parse failure is reported as `CorruptState`.
pub fn document_from_page(source: &str, devices: DeviceManager) -> Result<Document, EditorError> {
    let page = parse_page(source).map_err(|e| EditorError::CorruptState(e.to_string()))?;
    let sheet =
        parse_stylesheet(&page.stylesheet).map_err(|e| EditorError::CorruptState(e.to_string()))?;

    let mut doc = Document::new(devices);
    if !page.body.is_empty() {
        doc.insert(ROOT_ID, 0, page.body)
            .map_err(|e| EditorError::CorruptState(e.to_string()))?;
    }

    for rule in &sheet.rules {
        apply_rule(&mut doc, None, &rule.selector, &rule.declarations)?;
    }

    for block in &sheet.media {
        let device = block
            .max_width()
            .and_then(|width| doc.devices().by_width(width))
            .map(|device| device.id.clone());

        let Some(device) = device else {
            warn!(query = %block.query, "No device matches media query; dropping block");
            continue;
        };
        for rule in &block.rules {
            apply_rule(&mut doc, Some(&device), &rule.selector, &rule.declarations)?;
        }
    }

    doc.version = 0;
    Ok(doc)
}

fn apply_rule(
    doc: &mut Document,
    device: Option<&str>,
    selector: &str,
    declarations: &Declarations,
) -> Result<(), EditorError> {
    let selector = selector.trim();

    for (property, value) in declarations {
        let result = if selector == ROOT_TAG {
            doc.set_style(ROOT_ID, device, property, value)
        } else if let Some(id) = selector.strip_prefix('#') {
            if !doc.contains(id) {
                warn!(selector, "Rule targets a missing node; dropping it");
                return Ok(());
            }
            doc.set_style(id, device, property, value)
        } else if let Some(class) = selector.strip_prefix('.') {
            doc.set_class_style(class, device, property, value)
        } else {
            warn!(selector, "Unsupported selector; dropping rule");
            return Ok(());
        };

        match result {
            Ok(()) => {}
            Err(EditorError::InvalidValue { property, value }) => {
                warn!(selector, %property, %value, "Dropping invalid declaration");
            }
            Err(EditorError::InvalidOperation(message)) => {
                warn!(selector, %message, "Dropping rule");
                return Ok(());
            }
            Err(e) => return Err(e),
        }
    }

    Ok(())
}

/// Result of loading with a starter fallback
#[derive(Debug)]
pub struct Hydrated {
    pub document: Document,
    /// Set when the stored page could not be used
    pub warning: Option<String>,
}

/// Reads and writes one site's page under a storage key
#[derive(Debug)]
pub struct PersistenceAdapter<S> {
    storage: Arc<S>,
}

impl<S> Clone for PersistenceAdapter<S> {
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
        }
    }
}

impl<S: Storage + 'static> PersistenceAdapter<S> {
    pub fn new(storage: S) -> Self {
        Self::shared(Arc::new(storage))
    }

    pub fn shared(storage: Arc<S>) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }

    /// Raw page stored under `key`
    pub async fn read_page(&self, key: &str) -> Result<Option<String>, EditorError> {
        Ok(self.storage.read(key).await?)
    }

    pub async fn write_page(&self, key: &str, page: String) -> Result<(), EditorError> {
        Ok(self.storage.write(key, page).await?)
    }

    /// Load the stored document.
    ///
    /// Fails with `NotFound` when nothing is stored and `CorruptState` when
    /// the stored page cannot be parsed.
    #[instrument(skip(self, devices))]
    pub async fn load(&self, key: &str, devices: DeviceManager) -> Result<Document, EditorError> {
        let source = self
            .read_page(key)
            .await?
            .ok_or_else(|| EditorError::not_found("stored page", key))?;

        let doc = document_from_page(&source, devices)?;
        info!(nodes = doc.len(), bytes = source.len(), "Loaded stored page");
        Ok(doc)
    }

    /// Load the stored document, falling back to the starter page when
    /// nothing usable is stored
    #[instrument(skip(self, devices))]
    pub async fn load_or_starter(
        &self,
        key: &str,
        devices: DeviceManager,
    ) -> Result<Hydrated, EditorError> {
        match self.load(key, devices.clone()).await {
            Ok(document) => Ok(Hydrated {
                document,
                warning: None,
            }),
            Err(EditorError::NotFound { .. }) => {
                debug!("Nothing stored yet; using starter page");
                Ok(Hydrated {
                    document: Document::starter(devices)?,
                    warning: None,
                })
            }
            Err(e @ (EditorError::CorruptState(_) | EditorError::StorageFailure(_))) => {
                warn!(error = %e, "Stored page unusable; using starter page");
                Ok(Hydrated {
                    document: Document::starter(devices)?,
                    warning: Some(e.to_string()),
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Serialize `doc` now and return a future that writes it.
    ///
    /// The future owns the page, so the document can keep changing while
    /// the write is in flight; the write reflects the document as it was
    /// when `save` was called. It resolves to the number of bytes written.
    pub fn save(
        &self,
        key: &str,
        doc: &Document,
    ) -> impl Future<Output = Result<usize, EditorError>> + Send + 'static {
        debug!(key, version = doc.version(), "Saving document");
        self.save_page(key, page_for(doc))
    }

    /// Write an already composed page; the future owns everything it needs
    pub fn save_page(
        &self,
        key: &str,
        page: String,
    ) -> impl Future<Output = Result<usize, EditorError>> + Send + 'static {
        let storage = self.storage.clone();
        let key = key.to_string();

        async move {
            let bytes = page.len();
            storage.write(&key, page).await?;
            info!(key = %key, bytes, "Saved page");
            Ok(bytes)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use pagecraft_parser::NodeSpec;

    fn devices() -> DeviceManager {
        DeviceManager::default()
    }

    #[test]
    fn test_compose_page_envelope() {
        let page = compose_page("<p>x</p>", "body{margin:0;}");
        assert!(page.starts_with("<!DOCTYPE html>\n<html>\n<head>"));
        assert!(page.contains("<style>body{margin:0;}</style>"));
        assert!(page.ends_with("<body><p>x</p></body>\n</html>"));
        assert!(page.find("<style>").unwrap() < page.find("<body>").unwrap());
    }

    #[test]
    fn test_round_trip_is_byte_identical() {
        let mut doc = Document::starter(devices()).unwrap();
        let hero = doc.children(ROOT_ID).unwrap()[1].clone();
        doc.set_style(&hero, Some("mobile"), "padding", "40px 10px").unwrap();
        doc.set_class_style("cta", Some("tablet"), "font-size", "14px").unwrap();
        doc.set_style(ROOT_ID, None, "margin", "0").unwrap();

        let first = page_for(&doc);
        let reloaded = document_from_page(&first, devices()).unwrap();
        let second = page_for(&reloaded);

        assert_eq!(first, second);
        assert_eq!(reloaded.version(), 0);
        reloaded.validate_tree().unwrap();
    }

    #[test]
    fn test_script_content_round_trips() {
        let mut doc = Document::new(devices());
        let script = NodeSpec::element("script")
            .with_child(NodeSpec::text("if (a<b) { el.innerHTML = '</p>'; }"));
        doc.insert(ROOT_ID, 0, script).unwrap();

        let bad = NodeSpec::element("script")
            .with_child(NodeSpec::text("a = '</script><p>x</p>'"));
        assert!(doc.insert(ROOT_ID, 1, bad).is_err());

        let page = page_for(&doc);
        let reloaded = document_from_page(&page, devices()).unwrap();
        assert_eq!(page_for(&reloaded), page);
    }

    #[test]
    fn test_empty_document_round_trips() {
        let doc = Document::new(devices());
        let page = page_for(&doc);
        let reloaded = document_from_page(&page, devices()).unwrap();
        assert_eq!(reloaded.len(), 1);
        assert_eq!(page_for(&reloaded), page);
    }

    #[test]
    fn test_unknown_rules_are_dropped() {
        let page = compose_page(
            r#"<p id="a">x</p>"#,
            "#a{color:red;}div p{color:blue;}#ghost{color:green;}@media (max-width: 999px){#a{color:pink;}}",
        );
        let doc = document_from_page(&page, devices()).unwrap();

        assert_eq!(doc.node("a").unwrap().styles["color"], "red");
        assert!(doc.rules().scoped.is_empty());
        assert!(!doc.contains("ghost"));
    }

    #[test]
    fn test_unparseable_page_is_corrupt() {
        for source in ["<html><body><div></body></html>", "<p>no body</p>"] {
            assert!(matches!(
                document_from_page(source, devices()),
                Err(EditorError::CorruptState(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_load_missing_and_corrupt() {
        let adapter = PersistenceAdapter::new(MemoryStorage::new());
        assert!(matches!(
            adapter.load("site", devices()).await,
            Err(EditorError::NotFound { .. })
        ));

        adapter.write_page("site", "<div>".to_string()).await.unwrap();
        assert!(matches!(
            adapter.load("site", devices()).await,
            Err(EditorError::CorruptState(_))
        ));

        let hydrated = adapter.load_or_starter("site", devices()).await.unwrap();
        assert!(hydrated.warning.is_some());
        assert!(hydrated.document.contains("home"));
    }

    #[tokio::test]
    async fn test_save_snapshot_ignores_later_edits() {
        let adapter = PersistenceAdapter::new(MemoryStorage::new());
        let mut doc = Document::new(devices());
        doc.insert(ROOT_ID, 0, "<p>before</p>").unwrap();

        let pending = adapter.save("site", &doc);
        doc.insert(ROOT_ID, 1, "<p>after</p>").unwrap();
        let bytes = pending.await.unwrap();

        let stored = adapter.read_page("site").await.unwrap().unwrap();
        assert_eq!(stored.len(), bytes);
        assert!(stored.contains("before"));
        assert!(!stored.contains("after"));
    }
}
