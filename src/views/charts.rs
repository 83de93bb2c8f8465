//! Declarative chart specifications.
//!
//! Views describe charts as data (labels, series, axes); whoever draws them
//! (the CLI text renderer or the terminal dashboard) owns the rendering.

use serde::Serialize;

/// Chart or series type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Bar,
    Doughnut,
}

/// A y axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub id: String,
    pub position: AxisPosition,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisPosition {
    Left,
    Right,
}

/// One data series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    pub label: String,
    pub data: Vec<f64>,
    /// Overrides the chart kind for mixed charts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ChartKind>,
    pub color: String,
    /// Axis id this series is plotted against
    #[serde(skip_serializing_if = "Option::is_none")]
    pub axis: Option<String>,
}

impl Dataset {
    pub fn new(label: &str, data: Vec<f64>, color: &str) -> Self {
        Self {
            label: label.to_string(),
            data,
            kind: None,
            color: color.to_string(),
            axis: None,
        }
    }

    pub fn with_kind(mut self, kind: ChartKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn on_axis(mut self, axis: &str) -> Self {
        self.axis = Some(axis.to_string());
        self
    }
}

/// A complete chart description.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    /// Stable widget id, e.g. "yield-forecast-chart"
    pub id: String,
    pub title: String,
    pub kind: ChartKind,
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub axes: Vec<Axis>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub stacked: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub hide_legend: bool,
}

impl ChartSpec {
    pub fn new(id: &str, title: &str, kind: ChartKind, labels: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            kind,
            labels: labels.iter().map(|l| l.to_string()).collect(),
            datasets: Vec::new(),
            axes: Vec::new(),
            stacked: false,
            hide_legend: false,
        }
    }

    pub fn dataset(mut self, dataset: Dataset) -> Self {
        self.datasets.push(dataset);
        self
    }

    pub fn axis(mut self, id: &str, position: AxisPosition, min: Option<f64>, max: Option<f64>) -> Self {
        self.axes.push(Axis {
            id: id.to_string(),
            position,
            min,
            max,
        });
        self
    }

    pub fn stacked(mut self) -> Self {
        self.stacked = true;
        self
    }

    pub fn without_legend(mut self) -> Self {
        self.hide_legend = true;
        self
    }

    /// Largest value across all series (0 when empty).
    pub fn max_value(&self) -> f64 {
        self.datasets
            .iter()
            .flat_map(|d| d.data.iter().copied())
            .fold(0.0, f64::max)
    }
}

/// Width of the bar area in text charts.
const TEXT_BAR_WIDTH: usize = 24;

/// Render a chart as plain text, one bar per label and series.
pub fn render_text(spec: &ChartSpec) -> String {
    let mut out = format!("{} [{}]\n", spec.title, kind_name(spec.kind));
    let label_width = spec.labels.iter().map(|l| l.len()).max().unwrap_or(0);
    let max = spec.max_value();

    for dataset in &spec.datasets {
        if spec.datasets.len() > 1 || !spec.hide_legend {
            out.push_str(&format!("  {}\n", dataset.label));
        }
        for (label, value) in spec.labels.iter().zip(dataset.data.iter()) {
            let filled = if max > 0.0 {
                ((value / max) * TEXT_BAR_WIDTH as f64).round() as usize
            } else {
                0
            };
            out.push_str(&format!(
                "    {:<width$} {:<bar$} {}\n",
                label,
                "█".repeat(filled.min(TEXT_BAR_WIDTH)),
                format_value(*value),
                width = label_width,
                bar = TEXT_BAR_WIDTH
            ));
        }
    }
    out
}

fn kind_name(kind: ChartKind) -> &'static str {
    match kind {
        ChartKind::Line => "line",
        ChartKind::Bar => "bar",
        ChartKind::Doughnut => "doughnut",
    }
}

fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{}", value)
    }
}
