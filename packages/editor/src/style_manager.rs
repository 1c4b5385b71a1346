//! # Style Manager
//!
//! Edits the selected component's styles through a declarative schema:
//! sectors hold ordered properties, each property has a value domain.
//! The schema is built once (or loaded from JSON) and only read afterwards.
//!
//! Writes are scoped to the document's active device, so editing while
//! "mobile" is active produces mobile-only rules.

use crate::document::Document;
use crate::mutations::MutationResult;
use crate::styles::StyleTarget;
use crate::{EditorError, Mutation};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Accepted by every property
const GLOBAL_KEYWORDS: &[&str] = &["inherit", "initial", "unset"];

const LENGTH_UNITS: &[&str] = &[
    "px", "em", "rem", "%", "vw", "vh", "vmin", "vmax", "ch", "ex", "pt", "pc", "cm", "mm", "in",
    "fr",
];

const CSS_FUNCTIONS: &[&str] = &["calc(", "clamp(", "min(", "max(", "var("];

const NAMED_COLORS: &[&str] = &[
    "transparent", "currentcolor", "black", "white", "red", "green", "blue", "yellow", "orange",
    "purple", "pink", "gray", "grey", "silver", "maroon", "olive", "lime", "aqua", "teal", "navy",
    "fuchsia", "brown", "gold", "indigo", "violet", "crimson", "coral", "salmon", "tomato",
    "khaki", "beige", "ivory", "lavender", "turquoise", "tan", "chocolate", "darkgray",
    "lightgray", "whitesmoke", "cyan", "magenta",
];

/// Allowed values for a property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ValueDomain {
    /// A single length, e.g. `12px`, `50%`, `0`
    #[serde(rename_all = "camelCase")]
    Length {
        #[serde(default)]
        keywords: Vec<String>,
        /// Accept bare numbers such as `1.5`
        #[serde(default)]
        unitless: bool,
    },
    /// One to four lengths, e.g. `10px 20px`
    Lengths {
        #[serde(default)]
        keywords: Vec<String>,
    },
    Color,
    Keyword { options: Vec<String> },
    Number {
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
        #[serde(default)]
        keywords: Vec<String>,
    },
    /// Anything the document accepts
    Text,
}

impl ValueDomain {
    pub fn accepts(&self, value: &str) -> bool {
        let value = value.trim();
        if value.is_empty() || GLOBAL_KEYWORDS.iter().any(|k| value.eq_ignore_ascii_case(k)) {
            return true;
        }

        match self {
            ValueDomain::Length { keywords, unitless } => {
                has_keyword(keywords, value) || is_length(value, *unitless)
            }
            ValueDomain::Lengths { keywords } => {
                let parts = split_top_level(value);
                (1..=4).contains(&parts.len())
                    && parts
                        .iter()
                        .all(|part| has_keyword(keywords, part) || is_length(part, false))
            }
            ValueDomain::Color => is_color(value),
            ValueDomain::Keyword { options } => has_keyword(options, value),
            ValueDomain::Number { min, max, keywords } => {
                if has_keyword(keywords, value) {
                    return true;
                }
                match value.parse::<f64>() {
                    Ok(n) if n.is_finite() => {
                        min.map_or(true, |min| n >= min) && max.map_or(true, |max| n <= max)
                    }
                    _ => false,
                }
            }
            ValueDomain::Text => true,
        }
    }

    fn length(keywords: &[&str]) -> Self {
        ValueDomain::Length {
            keywords: owned(keywords),
            unitless: false,
        }
    }

    fn lengths(keywords: &[&str]) -> Self {
        ValueDomain::Lengths {
            keywords: owned(keywords),
        }
    }

    fn keyword(options: &[&str]) -> Self {
        ValueDomain::Keyword {
            options: owned(options),
        }
    }
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn has_keyword(keywords: &[String], value: &str) -> bool {
    keywords.iter().any(|k| k.eq_ignore_ascii_case(value))
}

fn is_function(value: &str, names: &[&str]) -> bool {
    let lower = value.to_ascii_lowercase();
    names.iter().any(|f| lower.starts_with(f)) && lower.ends_with(')')
}

fn is_length(value: &str, unitless: bool) -> bool {
    if is_function(value, CSS_FUNCTIONS) {
        return true;
    }

    let split = value
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-' || c == '+'))
        .unwrap_or(value.len());
    let (number, unit) = value.split_at(split);

    let Ok(n) = number.parse::<f64>() else {
        return false;
    };
    if unit.is_empty() {
        return n == 0.0 || unitless;
    }
    LENGTH_UNITS.iter().any(|u| unit.eq_ignore_ascii_case(u))
}

fn is_color(value: &str) -> bool {
    if let Some(hex) = value.strip_prefix('#') {
        return matches!(hex.len(), 3 | 4 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit());
    }
    is_function(value, &["rgb(", "rgba(", "hsl(", "hsla(", "var("])
        || NAMED_COLORS.iter().any(|c| value.eq_ignore_ascii_case(c))
}

/// Split on whitespace outside parentheses
fn split_top_level(value: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = None;

    for (i, c) in value.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            c if c.is_ascii_whitespace() && depth == 0 => {
                if let Some(s) = start.take() {
                    parts.push(&value[s..i]);
                }
                continue;
            }
            _ => {}
        }
        if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        parts.push(&value[s..]);
    }
    parts
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDef {
    pub property: String,
    pub domain: ValueDomain,
}

impl PropertyDef {
    fn new(property: &str, domain: ValueDomain) -> Self {
        Self {
            property: property.to_string(),
            domain,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sector {
    pub id: String,
    pub name: String,
    /// Expanded by default in the host UI
    #[serde(default)]
    pub open: bool,
    pub properties: Vec<PropertyDef>,
}

impl Sector {
    pub fn property(&self, property: &str) -> Option<&PropertyDef> {
        self.properties
            .iter()
            .find(|p| p.property.eq_ignore_ascii_case(property))
    }
}

/// Sector → ordered properties → value domain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleSchema {
    pub sectors: Vec<Sector>,
}

impl StyleSchema {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Look a sector up by id or display name
    pub fn sector(&self, sector: &str) -> Option<&Sector> {
        self.sectors
            .iter()
            .find(|s| s.id.eq_ignore_ascii_case(sector) || s.name.eq_ignore_ascii_case(sector))
    }

    fn property(&self, sector: &str, property: &str) -> Result<&PropertyDef, EditorError> {
        self.sector(sector)
            .ok_or_else(|| EditorError::not_found("sector", sector))?
            .property(property)
            .ok_or_else(|| EditorError::not_found("property", format!("{}.{}", sector, property)))
    }
}

impl Default for StyleSchema {
    /// General, Flex, Dimension, Typography and Decorations
    fn default() -> Self {
        use ValueDomain::*;

        let offsets = || ValueDomain::length(&["auto"]);
        let sector = |id: &str, name: &str, open: bool, properties: Vec<PropertyDef>| Sector {
            id: id.to_string(),
            name: name.to_string(),
            open,
            properties,
        };

        Self {
            sectors: vec![
                sector(
                    "general",
                    "General",
                    true,
                    vec![
                        PropertyDef::new(
                            "display",
                            ValueDomain::keyword(&[
                                "block", "inline", "inline-block", "flex", "inline-flex", "grid",
                                "inline-grid", "none",
                            ]),
                        ),
                        PropertyDef::new(
                            "position",
                            ValueDomain::keyword(&["static", "relative", "absolute", "fixed", "sticky"]),
                        ),
                        PropertyDef::new("top", offsets()),
                        PropertyDef::new("right", offsets()),
                        PropertyDef::new("left", offsets()),
                        PropertyDef::new("bottom", offsets()),
                    ],
                ),
                sector(
                    "flex",
                    "Flex",
                    false,
                    vec![
                        PropertyDef::new(
                            "flex-direction",
                            ValueDomain::keyword(&["row", "row-reverse", "column", "column-reverse"]),
                        ),
                        PropertyDef::new(
                            "justify-content",
                            ValueDomain::keyword(&[
                                "flex-start", "flex-end", "center", "space-between", "space-around",
                                "space-evenly", "start", "end",
                            ]),
                        ),
                        PropertyDef::new(
                            "align-items",
                            ValueDomain::keyword(&[
                                "flex-start", "flex-end", "center", "baseline", "stretch", "start",
                                "end",
                            ]),
                        ),
                        PropertyDef::new(
                            "flex-wrap",
                            ValueDomain::keyword(&["nowrap", "wrap", "wrap-reverse"]),
                        ),
                    ],
                ),
                sector(
                    "dimension",
                    "Dimension",
                    false,
                    vec![
                        PropertyDef::new("width", ValueDomain::length(&["auto", "fit-content"])),
                        PropertyDef::new("max-width", ValueDomain::length(&["none"])),
                        PropertyDef::new("height", ValueDomain::length(&["auto", "fit-content"])),
                        PropertyDef::new("padding", ValueDomain::lengths(&[])),
                        PropertyDef::new("margin", ValueDomain::lengths(&["auto"])),
                    ],
                ),
                sector(
                    "typography",
                    "Typography",
                    false,
                    vec![
                        PropertyDef::new("font-family", Text),
                        PropertyDef::new(
                            "font-size",
                            ValueDomain::length(&[
                                "xx-small", "x-small", "small", "medium", "large", "x-large",
                                "xx-large", "smaller", "larger",
                            ]),
                        ),
                        PropertyDef::new(
                            "font-weight",
                            Number {
                                min: Some(1.0),
                                max: Some(1000.0),
                                keywords: owned(&["normal", "bold", "lighter", "bolder"]),
                            },
                        ),
                        PropertyDef::new("color", Color),
                        PropertyDef::new(
                            "line-height",
                            Length {
                                keywords: owned(&["normal"]),
                                unitless: true,
                            },
                        ),
                        PropertyDef::new(
                            "text-align",
                            ValueDomain::keyword(&["left", "right", "center", "justify", "start", "end"]),
                        ),
                    ],
                ),
                sector(
                    "decorations",
                    "Decorations",
                    false,
                    vec![
                        PropertyDef::new("background-color", Color),
                        PropertyDef::new("border-radius", ValueDomain::lengths(&[])),
                        PropertyDef::new("border", Text),
                        PropertyDef::new("box-shadow", Text),
                        PropertyDef::new("background", Text),
                        PropertyDef::new("color", Color),
                    ],
                ),
            ],
        }
    }
}

/// Selection-scoped style editing
#[derive(Debug, Clone, Default)]
pub struct StyleManager {
    schema: StyleSchema,
    selected: Option<String>,
}

impl StyleManager {
    pub fn new(schema: StyleSchema) -> Self {
        Self {
            schema,
            selected: None,
        }
    }

    pub fn schema(&self) -> &StyleSchema {
        &self.schema
    }

    pub fn sectors(&self) -> &[Sector] {
        &self.schema.sectors
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Make `node_id` the edit target. Text nodes cannot be styled.
    pub fn bind(&mut self, doc: &Document, node_id: &str) -> Result<(), EditorError> {
        if doc.node(node_id)?.is_text() {
            return Err(EditorError::invalid_operation(format!(
                "{} is a text node and has no styles",
                node_id
            )));
        }
        self.selected = Some(node_id.to_string());
        Ok(())
    }

    pub fn unbind(&mut self) {
        self.selected = None;
    }

    /// Follow the selection through an id change
    pub(crate) fn retarget(&mut self, old_id: &str, new_id: &str) {
        if self.selected.as_deref() == Some(old_id) {
            self.selected = Some(new_id.to_string());
        }
    }

    /// Validate `value` against the property's domain and write it for the
    /// active device. An empty value clears the declaration.
    pub fn set_property(
        &self,
        doc: &mut Document,
        sector: &str,
        property: &str,
        value: &str,
    ) -> Result<MutationResult, EditorError> {
        let node_id = self.selected.as_deref().ok_or(EditorError::NoSelection)?;
        let def = self.schema.property(sector, property)?;

        if !def.domain.accepts(value) {
            return Err(EditorError::invalid_value(&def.property, value));
        }

        let device = doc.active_device().id.clone();
        debug!(node = node_id, property = %def.property, value, device = %device, "Setting style property");

        doc.apply(Mutation::SetStyle {
            target: StyleTarget::Node(node_id.to_string()),
            device_id: Some(device),
            property: def.property.clone(),
            value: value.to_string(),
        })
    }

    /// Computed value of a property for the active device
    pub fn property_value(
        &self,
        doc: &Document,
        sector: &str,
        property: &str,
    ) -> Result<Option<String>, EditorError> {
        let node_id = self.selected.as_deref().ok_or(EditorError::NoSelection)?;
        let def = self.schema.property(sector, property)?;
        Ok(doc.computed_style(node_id)?.get(&def.property).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::DeviceManager;
    use crate::document::ROOT_ID;

    fn setup() -> (Document, StyleManager, String) {
        let mut doc = Document::new(DeviceManager::default());
        let id = doc.insert(ROOT_ID, 0, "<p>Hello</p>").unwrap();
        (doc, StyleManager::default(), id)
    }

    #[test]
    fn test_default_sectors() {
        let schema = StyleSchema::default();
        let names: Vec<_> = schema.sectors.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["General", "Flex", "Dimension", "Typography", "Decorations"]
        );
        assert!(schema.sector("typography").unwrap().property("color").is_some());
        assert!(schema.sector("Decorations").unwrap().property("color").is_some());
    }

    #[test]
    fn test_domains() {
        let length = ValueDomain::length(&["auto"]);
        assert!(length.accepts("12px"));
        assert!(length.accepts("-1.5em"));
        assert!(length.accepts("0"));
        assert!(length.accepts("auto"));
        assert!(length.accepts("calc(100% - 20px)"));
        assert!(!length.accepts("12"));
        assert!(!length.accepts("big"));

        let lengths = ValueDomain::lengths(&["auto"]);
        assert!(lengths.accepts("24px auto"));
        assert!(lengths.accepts("1px 2px 3px 4px"));
        assert!(!lengths.accepts("1px 2px 3px 4px 5px"));

        assert!(ValueDomain::Color.accepts("#f472b6"));
        assert!(ValueDomain::Color.accepts("rgba(0, 0, 0, .5)"));
        assert!(ValueDomain::Color.accepts("White"));
        assert!(!ValueDomain::Color.accepts("#12"));
        assert!(!ValueDomain::Color.accepts("12px"));

        let weight = StyleSchema::default()
            .property("typography", "font-weight")
            .unwrap()
            .domain
            .clone();
        assert!(weight.accepts("700"));
        assert!(weight.accepts("bold"));
        assert!(!weight.accepts("1200"));

        for domain in [ValueDomain::Color, ValueDomain::keyword(&["flex"])] {
            assert!(domain.accepts("inherit"));
            assert!(domain.accepts(""));
        }
    }

    #[test]
    fn test_edit_requires_selection() {
        let (mut doc, manager, _) = setup();
        assert!(matches!(
            manager.set_property(&mut doc, "typography", "color", "red"),
            Err(EditorError::NoSelection)
        ));
    }

    #[test]
    fn test_bind_rejects_text_and_unknown_nodes() {
        let (doc, mut manager, id) = setup();
        let text = doc.children(&id).unwrap()[0].clone();

        assert!(matches!(
            manager.bind(&doc, &text),
            Err(EditorError::InvalidOperation(_))
        ));
        assert!(matches!(
            manager.bind(&doc, "missing"),
            Err(EditorError::NotFound { .. })
        ));
        assert_eq!(manager.selected(), None);
    }

    #[test]
    fn test_set_property_scoped_to_active_device() {
        let (mut doc, mut manager, id) = setup();
        manager.bind(&doc, &id).unwrap();

        manager
            .set_property(&mut doc, "typography", "color", "black")
            .unwrap();
        doc.switch_device("mobile").unwrap();
        manager
            .set_property(&mut doc, "Typography", "color", "red")
            .unwrap();

        assert_eq!(doc.node(&id).unwrap().styles["color"], "black");
        assert_eq!(
            manager.property_value(&doc, "typography", "color").unwrap(),
            Some("red".to_string())
        );
        doc.switch_device("desktop").unwrap();
        assert_eq!(
            manager.property_value(&doc, "typography", "color").unwrap(),
            Some("black".to_string())
        );
    }

    #[test]
    fn test_invalid_values_and_unknown_properties() {
        let (mut doc, mut manager, id) = setup();
        manager.bind(&doc, &id).unwrap();

        assert!(matches!(
            manager.set_property(&mut doc, "general", "display", "sideways"),
            Err(EditorError::InvalidValue { .. })
        ));
        assert!(matches!(
            manager.set_property(&mut doc, "general", "z-index", "2"),
            Err(EditorError::NotFound { .. })
        ));
        assert!(matches!(
            manager.set_property(&mut doc, "effects", "opacity", "1"),
            Err(EditorError::NotFound { .. })
        ));
        assert_eq!(doc.version(), 1);
    }

    #[test]
    fn test_empty_value_clears() {
        let (mut doc, mut manager, id) = setup();
        manager.bind(&doc, &id).unwrap();
        manager
            .set_property(&mut doc, "dimension", "padding", "10px 20px")
            .unwrap();
        manager.set_property(&mut doc, "dimension", "padding", "").unwrap();

        assert!(doc.node(&id).unwrap().styles.is_empty());
    }

    #[test]
    fn test_schema_from_json() {
        let schema = StyleSchema::from_json(
            r#"{"sectors":[{"id":"spacing","name":"Spacing","properties":[
                {"property":"gap","domain":{"type":"length","keywords":["normal"]}}
            ]}]}"#,
        )
        .unwrap();

        let gap = &schema.sector("spacing").unwrap().properties[0];
        assert!(gap.domain.accepts("normal"));
        assert!(gap.domain.accepts("8px"));
        assert!(!schema.sectors[0].open);
    }
}
