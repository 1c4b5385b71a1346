//! # Devices
//!
//! Named viewport breakpoints. Registration order is cascade precedence:
//! when several device-scoped rules apply, later devices win.
//!
//! ## Activation
//!
//! A rule scoped to a constrained device `D` applies while the active device
//! `A` is `D` itself, or `A` is constrained and no wider than `D` (the usual
//! `max-width` media query semantics). Unconstrained devices never own
//! scoped rules; writes against them go to the base styles.

use crate::EditorError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One viewport breakpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: String,
    pub label: String,

    /// Viewport width in pixels; `None` is unconstrained.
    /// Serialized as `"555px"` or `""`.
    #[serde(
        default,
        serialize_with = "serialize_width",
        deserialize_with = "deserialize_width"
    )]
    pub width: Option<u32>,
}

impl Device {
    /// Create a device from a width string such as `"375px"` (empty = unconstrained)
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        width: &str,
    ) -> Result<Self, EditorError> {
        Ok(Self {
            id: id.into(),
            label: label.into(),
            width: parse_width(width)?,
        })
    }

    pub fn unconstrained(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            width: None,
        }
    }

    pub fn constrained(id: impl Into<String>, label: impl Into<String>, width: u32) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            width: Some(width),
        }
    }

    pub fn is_constrained(&self) -> bool {
        self.width.is_some()
    }

    /// The `@media` query for this device's scoped rules
    pub fn media_query(&self) -> Option<String> {
        self.width.map(|w| format!("(max-width: {}px)", w))
    }
}

/// Parse `"555px"`, `"555"` or `""`
pub fn parse_width(width: &str) -> Result<Option<u32>, EditorError> {
    let trimmed = width.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let digits = trimmed.strip_suffix("px").unwrap_or(trimmed);
    match digits.parse::<u32>() {
        Ok(0) | Err(_) => Err(EditorError::invalid_value("width", width)),
        Ok(px) => Ok(Some(px)),
    }
}

fn serialize_width<S: Serializer>(width: &Option<u32>, serializer: S) -> Result<S::Ok, S::Error> {
    match width {
        Some(px) => serializer.serialize_str(&format!("{}px", px)),
        None => serializer.serialize_str(""),
    }
}

fn deserialize_width<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_width(&raw).map_err(serde::de::Error::custom)
}

/// Ordered device set plus the active device
#[derive(Debug, Clone)]
pub struct DeviceManager {
    devices: Vec<Device>,
    active: usize,
}

impl DeviceManager {
    /// Build from devices in cascade order; the first one starts active
    pub fn new(devices: Vec<Device>) -> Result<Self, EditorError> {
        if devices.is_empty() {
            return Err(EditorError::invalid_operation(
                "At least one device must be registered",
            ));
        }

        for (i, device) in devices.iter().enumerate() {
            if devices[..i].iter().any(|d| d.id == device.id) {
                return Err(EditorError::duplicate("device", &device.id));
            }
        }

        Ok(Self { devices, active: 0 })
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn get(&self, id: &str) -> Option<&Device> {
        self.devices.iter().find(|d| d.id == id)
    }

    pub fn active(&self) -> &Device {
        &self.devices[self.active]
    }

    /// Constrained devices in registration order
    pub fn constrained(&self) -> impl Iterator<Item = &Device> {
        self.devices.iter().filter(|d| d.is_constrained())
    }

    /// First constrained device with exactly this width
    pub fn by_width(&self, width: u32) -> Option<&Device> {
        self.devices.iter().find(|d| d.width == Some(width))
    }

    /// Make `id` the active device. Returns whether the active device changed.
    pub fn switch_to(&mut self, id: &str) -> Result<bool, EditorError> {
        let index = self
            .devices
            .iter()
            .position(|d| d.id == id)
            .ok_or_else(|| EditorError::not_found("device", id))?;

        let changed = index != self.active;
        self.active = index;
        Ok(changed)
    }

    /// Whether rules scoped to `device_id` apply under the active device
    pub fn applies(&self, device_id: &str) -> bool {
        let scoped = match self.get(device_id) {
            Some(Device {
                width: Some(width), ..
            }) => *width,
            _ => return false,
        };

        let active = self.active();
        active.id == device_id || active.width.map_or(false, |w| w <= scoped)
    }
}

impl Default for DeviceManager {
    fn default() -> Self {
        Self {
            devices: default_devices(),
            active: 0,
        }
    }
}

/// Desktop, Tablet (555px) and Mobile (375px)
pub fn default_devices() -> Vec<Device> {
    vec![
        Device::unconstrained("desktop", "Desktop"),
        Device::constrained("tablet", "Tablet", 555),
        Device::constrained("mobile", "Mobile", 375),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_width() {
        assert_eq!(parse_width("").unwrap(), None);
        assert_eq!(parse_width("555px").unwrap(), Some(555));
        assert_eq!(parse_width(" 375 ").unwrap(), Some(375));
        assert!(parse_width("40em").is_err());
        assert!(parse_width("0px").is_err());
    }

    #[test]
    fn test_initial_device_is_first() {
        let devices = DeviceManager::default();
        assert_eq!(devices.active().id, "desktop");
        assert_eq!(devices.constrained().count(), 2);
    }

    #[test]
    fn test_switch_reports_change() {
        let mut devices = DeviceManager::default();

        assert!(devices.switch_to("mobile").unwrap());
        assert!(!devices.switch_to("mobile").unwrap());
        assert_eq!(devices.active().id, "mobile");
        assert!(matches!(
            devices.switch_to("watch"),
            Err(EditorError::NotFound { .. })
        ));
        assert_eq!(devices.active().id, "mobile");
    }

    #[test]
    fn test_rule_activation() {
        let mut devices = DeviceManager::default();
        assert!(!devices.applies("tablet"));
        assert!(!devices.applies("mobile"));
        assert!(!devices.applies("desktop"));

        devices.switch_to("tablet").unwrap();
        assert!(devices.applies("tablet"));
        assert!(!devices.applies("mobile"));

        devices.switch_to("mobile").unwrap();
        assert!(devices.applies("tablet"));
        assert!(devices.applies("mobile"));
    }

    #[test]
    fn test_rejects_duplicates_and_empty_sets() {
        let result = DeviceManager::new(vec![
            Device::unconstrained("desktop", "Desktop"),
            Device::constrained("desktop", "Other", 300),
        ]);
        assert!(matches!(result, Err(EditorError::DuplicateId { .. })));
        assert!(matches!(
            DeviceManager::new(vec![]),
            Err(EditorError::InvalidOperation(_))
        ));
    }

    #[test]
    fn test_device_json() {
        let device: Device =
            serde_json::from_str(r#"{"id":"phone","label":"Phone","width":"320px"}"#).unwrap();
        assert_eq!(device.width, Some(320));
        assert_eq!(
            serde_json::to_string(&Device::unconstrained("d", "D")).unwrap(),
            r#"{"id":"d","label":"D","width":""}"#
        );
    }
}
