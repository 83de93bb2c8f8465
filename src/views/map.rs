//! Field map specification.

use crate::models::Field;
use serde::Serialize;

/// Zoom level the field map opens at.
pub const DEFAULT_ZOOM: u8 = 14;

/// Shown in place of the map when a field has unusable coordinates.
pub const INVALID_COORDINATES_MESSAGE: &str = "Error: Invalid map coordinates for this field.";

/// Shown when the moisture layer is selected.
pub const MOISTURE_LAYER_NOTICE: &str = "Layer switched to simulated Soil Moisture Zone view (Blue=Wet, Red=Dry - currently showing a uniform layer).";

/// Boundary overlay selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MapLayer {
    #[default]
    Default,
    Moisture,
}

impl MapLayer {
    pub fn as_str(&self) -> &'static str {
        match self {
            MapLayer::Default => "default",
            MapLayer::Moisture => "moisture",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            MapLayer::Default => MapLayer::Moisture,
            MapLayer::Moisture => MapLayer::Default,
        }
    }

    /// Boundary style for this layer.
    pub fn style(&self) -> BoundaryStyle {
        match self {
            MapLayer::Default => BoundaryStyle {
                color: "primary".to_string(),
                fill_opacity: 0.2,
            },
            MapLayer::Moisture => BoundaryStyle {
                color: "#3B82F6".to_string(),
                fill_opacity: 0.5,
            },
        }
    }
}

impl std::str::FromStr for MapLayer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "default" => Ok(MapLayer::Default),
            "moisture" => Ok(MapLayer::Moisture),
            _ => Err(format!("Invalid map layer: {}. Valid values: default, moisture", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundaryStyle {
    /// Colour token; "primary" follows the active theme
    pub color: String,
    pub fill_opacity: f64,
}

/// A map centred on a field with its boundary overlay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapSpec {
    pub id: String,
    pub center: [f64; 2],
    pub zoom: u8,
    pub marker_popup: String,
    pub boundary: Vec<[f64; 2]>,
    pub layer: MapLayer,
    pub style: BoundaryStyle,
    /// Centre formatted to four decimals, e.g. "-1.2864, 36.8172"
    pub coords_label: String,
}

/// Either a drawable map or the message shown instead.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MapView {
    Ready(MapSpec),
    Invalid { message: String },
}

impl MapView {
    pub fn spec(&self) -> Option<&MapSpec> {
        match self {
            MapView::Ready(spec) => Some(spec),
            MapView::Invalid { .. } => None,
        }
    }
}

/// Build the map for a field.
pub fn field_map(field: &Field, layer: MapLayer) -> MapView {
    if !field.has_valid_coordinates() {
        tracing::warn!("Field {} has invalid coordinates, map not rendered", field.id);
        return MapView::Invalid {
            message: INVALID_COORDINATES_MESSAGE.to_string(),
        };
    }
    MapView::Ready(MapSpec {
        id: "map-container".to_string(),
        center: [field.lat, field.lon],
        zoom: DEFAULT_ZOOM,
        marker_popup: format!("{}\nField Center.", field.name),
        boundary: field.boundary.clone(),
        layer,
        style: layer.style(),
        coords_label: format!("{:.4}, {:.4}", field.lat, field.lon),
    })
}
