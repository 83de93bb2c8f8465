//! Data models for AgriPulse entities.
//!
//! This module defines the core data structures:
//! - `Field` - A crop plot or livestock facility with a geographic boundary
//! - `Task` - Farm work items tied to a field
//! - `InventoryItem` - Stock items with a reorder threshold
//! - `MarketplaceListing` - Input/produce adverts with seller contact details
//! - `AuthSession` - The signed-in user
//! - `Theme` - Dashboard colour scheme
//!
//! Field names serialize in camelCase so blobs written by earlier releases
//! of the dashboard stay readable.

pub mod seed;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of farm operation a field represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    Crop,
    Livestock,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Crop => write!(f, "Crop"),
            FieldType::Livestock => write!(f, "Livestock"),
        }
    }
}

/// A managed farm operation unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Unique identifier (e.g., "maize-field-1")
    pub id: String,

    /// Display name
    pub name: String,

    /// Crop or livestock
    #[serde(rename = "type")]
    pub field_type: FieldType,

    /// Crop variety or animal class (e.g., "Maize", "Broilers")
    pub subtype: String,

    /// Free-form status label (e.g., "Growing", "Active")
    pub status: String,

    /// Latitude of the field centre
    pub lat: f64,

    /// Longitude of the field centre
    pub lon: f64,

    /// Boundary polygon as ordered `[lat, lon]` pairs
    #[serde(default)]
    pub boundary: Vec<[f64; 2]>,
}

impl Field {
    /// Label used by the context selector, e.g. "Maize Field 1 (Maize)".
    pub fn selector_label(&self) -> String {
        format!("{} ({})", self.name, self.subtype)
    }

    /// Whether the centre coordinates can be put on a map.
    pub fn has_valid_coordinates(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

/// Task priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "high" | "h" => Ok(Priority::High),
            "medium" | "med" | "m" => Ok(Priority::Medium),
            "low" | "l" => Ok(Priority::Low),
            _ => Err(format!(
                "Invalid priority: {}. Valid values: high, medium, low",
                s
            )),
        }
    }
}

/// A piece of farm work tied to a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique, monotonically increasing identifier
    pub id: u64,

    /// Field this task belongs to
    pub field_id: String,

    /// Task title
    pub title: String,

    /// Due date, `YYYY-MM-DD`
    pub date: String,

    #[serde(default)]
    pub priority: Priority,

    #[serde(default)]
    pub completed: bool,

    /// Suggested by the system rather than entered by the user
    #[serde(default)]
    pub recommended: bool,
}

/// A stock item tracked in the farm inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: u64,
    pub name: String,
    pub category: String,
    pub quantity: f64,
    pub unit: String,
    pub unit_cost: f64,
    pub critical_level: f64,
}

impl InventoryItem {
    /// An item is critical when stock is at or below its critical level.
    pub fn is_critical(&self) -> bool {
        self.quantity <= self.critical_level
    }

    /// Value of the stock on hand.
    pub fn stock_value(&self) -> f64 {
        self.quantity * self.unit_cost
    }
}

/// A marketplace advert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketplaceListing {
    /// Unique identifier (e.g., "list-1")
    pub id: String,
    pub title: String,
    pub category: String,
    pub price: u64,
    pub description: String,
    pub seller: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whatsapp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Image reference (URL)
    #[serde(default)]
    pub img: String,
}

/// The signed-in user. No credentials are ever stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub logged_in: bool,
    pub user_name: String,
    pub user_email: String,
}

/// Dashboard colour scheme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Theme {
    #[default]
    #[serde(rename = "theme-green")]
    Green,
    #[serde(rename = "theme-blue")]
    Blue,
    #[serde(rename = "theme-earth")]
    Earth,
}

impl Theme {
    pub fn all() -> &'static [Theme] {
        &[Theme::Green, Theme::Blue, Theme::Earth]
    }

    /// Class token applied to the document root.
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Green => "theme-green",
            Theme::Blue => "theme-blue",
            Theme::Earth => "theme-earth",
        }
    }

    /// Parse a theme name, accepting both "theme-blue" and "blue".
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();
        let name = s.strip_prefix("theme-").unwrap_or(&s);
        match name {
            "green" => Some(Theme::Green),
            "blue" => Some(Theme::Blue),
            "earth" => Some(Theme::Earth),
            _ => None,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_uses_camel_case_keys() {
        let task = Task {
            id: 7,
            field_id: "maize-field-1".to_string(),
            title: "Irrigation Check".to_string(),
            date: "2025-10-15".to_string(),
            priority: Priority::High,
            completed: false,
            recommended: true,
        };
        let json = serde_json::to_string(&task).unwrap();
        assert!(json.contains("\"fieldId\":\"maize-field-1\""));
        assert!(json.contains("\"priority\":\"high\""));
    }

    #[test]
    fn test_task_missing_flags_default_to_false() {
        let json = r#"{"id":1,"fieldId":"f","title":"t","date":"2025-01-01"}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert!(!task.completed);
        assert!(!task.recommended);
        assert_eq!(task.priority, Priority::Medium);
    }

    #[test]
    fn test_field_type_serializes_capitalized() {
        let json = serde_json::to_string(&FieldType::Livestock).unwrap();
        assert_eq!(json, "\"Livestock\"");
    }

    #[test]
    fn test_inventory_critical_is_inclusive() {
        let mut item = seed::default_inventory().remove(0);
        item.quantity = 10.0;
        item.critical_level = 10.0;
        assert!(item.is_critical());
        item.quantity = 10.5;
        assert!(!item.is_critical());
    }

    #[test]
    fn test_priority_from_str() {
        assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!("m".parse::<Priority>().unwrap(), Priority::Medium);
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn test_theme_parse_accepts_short_and_full_names() {
        assert_eq!(Theme::parse("theme-earth"), Some(Theme::Earth));
        assert_eq!(Theme::parse("Blue"), Some(Theme::Blue));
        assert_eq!(Theme::parse("purple"), None);
    }

    #[test]
    fn test_theme_serializes_as_class_token() {
        assert_eq!(serde_json::to_string(&Theme::Blue).unwrap(), "\"theme-blue\"");
    }

    #[test]
    fn test_listing_without_contacts_skips_them() {
        let mut listing = seed::default_listings().remove(0);
        listing.whatsapp = None;
        listing.phone = None;
        let json = serde_json::to_string(&listing).unwrap();
        assert!(!json.contains("whatsapp"));
        assert!(!json.contains("phone"));
    }

    #[test]
    fn test_field_coordinates_validation() {
        let mut field = seed::default_fields().remove(0);
        assert!(field.has_valid_coordinates());
        field.lat = f64::NAN;
        assert!(!field.has_valid_coordinates());
        field.lat = 91.0;
        assert!(!field.has_valid_coordinates());
    }
}
