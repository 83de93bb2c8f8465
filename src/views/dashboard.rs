//! Dashboard page: field header, KPI and alert cards, map and trend charts.

use super::charts::{AxisPosition, ChartKind, ChartSpec, Dataset, render_text};
use super::map::{MapLayer, MapView, field_map};
use super::tasks::{InventoryCard, inventory_overview};
use super::{ViewContext, WidgetRef};
use crate::commands::Output;
use crate::models::{Field, FieldType};
use crate::state::AppState;
use crate::views::widgets::WidgetKind;
use serde::Serialize;

const WEEKS: [&str; 5] = ["Week 1", "Week 2", "Week 3", "Week 4", "Week 5"];
const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

pub const NO_DATA_TITLE: &str = "No Field Data Available";
pub const NO_DATA_MESSAGE: &str = "Please select a valid farm operation from the dropdown menu above or check your data setup.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiCard {
    pub title: String,
    pub value: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertCard {
    pub count: u32,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldHeader {
    pub id: String,
    pub name: String,
    /// e.g. "Crop (Maize)"
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDashboard {
    pub field: FieldHeader,
    pub kpi: KpiCard,
    pub alerts: AlertCard,
    pub map: MapView,
    pub yield_chart: ChartSpec,
    pub moisture_chart: ChartSpec,
    pub inventory: Vec<InventoryCard>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DashboardView {
    /// No current field: nothing field-specific is drawn
    NoData { title: String, message: String },
    Field(Box<FieldDashboard>),
}

impl DashboardView {
    pub fn widgets(&self) -> Vec<WidgetRef> {
        match self {
            DashboardView::NoData { .. } => Vec::new(),
            DashboardView::Field(d) => {
                let mut widgets = Vec::new();
                if let Some(map) = d.map.spec() {
                    widgets.push(WidgetRef::new(&map.id, WidgetKind::Map));
                }
                widgets.push(WidgetRef::new(&d.yield_chart.id, WidgetKind::Chart));
                widgets.push(WidgetRef::new(&d.moisture_chart.id, WidgetKind::Chart));
                widgets
            }
        }
    }
}

pub fn render(state: &AppState, ctx: &ViewContext) -> DashboardView {
    match state.current_field() {
        None => DashboardView::NoData {
            title: NO_DATA_TITLE.to_string(),
            message: NO_DATA_MESSAGE.to_string(),
        },
        Some(field) => DashboardView::Field(Box::new(render_field(state, field, ctx.map_layer))),
    }
}

fn render_field(state: &AppState, field: &Field, layer: MapLayer) -> FieldDashboard {
    FieldDashboard {
        field: FieldHeader {
            id: field.id.clone(),
            name: field.name.clone(),
            kind: format!("{} ({})", field.field_type, field.subtype),
        },
        kpi: kpi_card(field.field_type),
        alerts: AlertCard {
            count: 3,
            detail: "Low Moisture & Fungus Risk".to_string(),
        },
        map: field_map(field, layer),
        yield_chart: yield_chart(field.field_type),
        moisture_chart: moisture_chart(field.field_type),
        inventory: inventory_overview(&state.inventory),
    }
}

pub fn kpi_card(field_type: FieldType) -> KpiCard {
    let (title, value, description) = match field_type {
        FieldType::Crop => (
            "Yield Forecast (Tons/Ha)",
            "7.8 tons/ha",
            "Projected yield based on current conditions",
        ),
        FieldType::Livestock => (
            "Milk/Meat Output (Kg/day)",
            "150 kg/day",
            "Total collective output (Simulated)",
        ),
    };
    KpiCard {
        title: title.to_string(),
        value: value.to_string(),
        description: description.to_string(),
    }
}

pub fn yield_chart(field_type: FieldType) -> ChartSpec {
    let data = match field_type {
        FieldType::Crop => vec![7.0, 7.2, 7.5, 7.8, 7.6],
        FieldType::Livestock => vec![140.0, 145.0, 150.0, 155.0, 150.0],
    };
    ChartSpec::new(
        "yield-forecast-chart",
        "Yield Forecast Trend",
        ChartKind::Line,
        &WEEKS,
    )
    .dataset(Dataset::new("Yield/Output", data, "primary"))
}

pub fn moisture_chart(field_type: FieldType) -> ChartSpec {
    let (moisture, rainfall) = match field_type {
        FieldType::Crop => (
            vec![35.0, 30.0, 27.0, 26.0, 28.0, 31.0, 30.0],
            vec![5.0, 10.0, 0.0, 0.0, 3.0, 12.0, 5.0],
        ),
        FieldType::Livestock => (vec![0.0; 7], vec![0.0; 7]),
    };
    ChartSpec::new(
        "moisture-rainfall-chart",
        "Soil Moisture & Rainfall (Last 7 Days)",
        ChartKind::Bar,
        &WEEKDAYS,
    )
    .dataset(
        Dataset::new("Soil Moisture (%)", moisture, "#3B82F6")
            .with_kind(ChartKind::Line)
            .on_axis("y"),
    )
    .dataset(
        Dataset::new("Rainfall (mm)", rainfall, "#34D399")
            .with_kind(ChartKind::Bar)
            .on_axis("y1"),
    )
    .axis("y", AxisPosition::Left, None, None)
    .axis("y1", AxisPosition::Right, None, None)
}

impl Output for DashboardView {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        match self {
            DashboardView::NoData { title, message } => format!("{}\n{}", title, message),
            DashboardView::Field(d) => {
                let mut lines = vec![
                    format!("{} - {}", d.field.name, d.field.kind),
                    String::new(),
                    format!("{}: {}", d.kpi.title, d.kpi.value),
                    format!("  {}", d.kpi.description),
                    format!("Critical Alerts: {}", d.alerts.count),
                    format!("  {}", d.alerts.detail),
                    String::new(),
                ];
                match &d.map {
                    MapView::Ready(map) => lines.push(format!(
                        "Map: {} (zoom {}, {} layer, {} boundary points)",
                        map.coords_label,
                        map.zoom,
                        map.layer.as_str(),
                        map.boundary.len()
                    )),
                    MapView::Invalid { message } => lines.push(format!("Map: {}", message)),
                }
                lines.push(String::new());
                lines.push(render_text(&d.yield_chart));
                lines.push(render_text(&d.moisture_chart));
                lines.push("Inventory:".to_string());
                for card in &d.inventory {
                    lines.push(format!("  {}", card.to_line()));
                }
                lines.join("\n")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Field;

    fn ctx() -> ViewContext {
        ViewContext::default()
    }

    #[test]
    fn test_crop_dashboard_kpi() {
        let state = AppState::default();
        let DashboardView::Field(d) = render(&state, &ctx()) else {
            panic!("expected field dashboard");
        };
        assert_eq!(d.kpi.title, "Yield Forecast (Tons/Ha)");
        assert_eq!(d.kpi.value, "7.8 tons/ha");
        assert_eq!(d.field.kind, "Crop (Maize)");
        assert_eq!(d.yield_chart.datasets[0].data, vec![7.0, 7.2, 7.5, 7.8, 7.6]);
    }

    #[test]
    fn test_livestock_dashboard_kpi_and_flat_moisture() {
        let mut state = AppState::default();
        state.current_field_id = "poultry-coop-1".to_string();
        let DashboardView::Field(d) = render(&state, &ctx()) else {
            panic!("expected field dashboard");
        };
        assert_eq!(d.kpi.title, "Milk/Meat Output (Kg/day)");
        assert_eq!(d.kpi.value, "150 kg/day");
        assert!(
            d.moisture_chart
                .datasets
                .iter()
                .all(|ds| ds.data.iter().all(|v| *v == 0.0))
        );
    }

    #[test]
    fn test_no_field_renders_fallback_without_widgets() {
        let mut state = AppState::default();
        state.fields = Vec::<Field>::new();
        state.current_field_id = String::new();
        let view = render(&state, &ctx());
        assert!(matches!(view, DashboardView::NoData { .. }));
        assert!(view.widgets().is_empty());
        assert!(view.to_human().contains(NO_DATA_TITLE));
    }

    #[test]
    fn test_invalid_coordinates_skip_map_widget() {
        let mut state = AppState::default();
        state.fields[0].lat = f64::NAN;
        let view = render(&state, &ctx());
        let ids: Vec<String> = view.widgets().into_iter().map(|w| w.id).collect();
        assert!(!ids.contains(&"map-container".to_string()));
        assert_eq!(ids.len(), 2);
    }

    #[test]
    fn test_dashboard_inventory_shows_three() {
        let state = AppState::default();
        let DashboardView::Field(d) = render(&state, &ctx()) else {
            panic!("expected field dashboard");
        };
        assert_eq!(d.inventory.len(), 3);
    }
}
