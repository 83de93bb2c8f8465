//! Scenario planner page.

use super::charts::{AxisPosition, ChartKind, ChartSpec, Dataset, render_text};
use super::widgets::WidgetKind;
use super::{ViewContext, WidgetRef};
use crate::commands::Output;
use crate::scenario::{MAX_YIELD, MIN_YIELD, ScenarioReport};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanningView {
    pub report: ScenarioReport,
    /// e.g. "70 mm"
    pub rainfall_label: String,
    /// e.g. "2 (Risk)"
    pub pest_label: String,
    pub projected_label: String,
    pub summary: String,
    pub chart: ChartSpec,
}

impl PlanningView {
    pub fn widgets(&self) -> Vec<WidgetRef> {
        vec![WidgetRef::new(&self.chart.id, WidgetKind::Chart)]
    }
}

pub fn render(ctx: &ViewContext) -> PlanningView {
    let report = ScenarioReport::new(ctx.scenario);
    PlanningView {
        rainfall_label: format!("{} mm", report.inputs.rainfall),
        pest_label: format!("{} (Risk)", report.inputs.pest_pressure),
        projected_label: format!("{:.1} tons/ha", report.projected),
        summary: report.summary(),
        chart: scenario_chart(&report),
        report,
    }
}

pub fn scenario_chart(report: &ScenarioReport) -> ChartSpec {
    ChartSpec::new(
        "scenario-chart",
        "Yield Scenario",
        ChartKind::Bar,
        &["Current Baseline", "New Scenario"],
    )
    .dataset(Dataset::new(
        "Yield (tons/ha)",
        vec![report.baseline, report.projected],
        "primary",
    ))
    .axis("y", AxisPosition::Left, Some(MIN_YIELD), Some(MAX_YIELD))
}

impl Output for PlanningView {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        [
            format!(
                "Rainfall: {}  Fertilizer: {}  Pest pressure: {}",
                self.rainfall_label, self.report.inputs.fertilizer, self.pest_label
            ),
            format!("Projected yield: {}", self.projected_label),
            self.summary.clone(),
            String::new(),
            render_text(&self.chart),
        ]
        .join("\n")
    }
}
