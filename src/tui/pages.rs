//! Drawing of rendered pages with ratatui widgets.
//!
//! Every function here takes an already rendered view from
//! [`crate::views`] and only decides layout and styling.

use ratatui::{
    prelude::*,
    symbols,
    widgets::{
        Axis as TuiAxis, Bar, BarChart, BarGroup, Block, Borders, Cell, Chart, Dataset as TuiDataset,
        GraphType, List, ListItem, ListState, Paragraph, Row, Table, Wrap,
        canvas::{Canvas, Line as CanvasLine},
    },
};

use crate::models::Theme;
use crate::views::charts::{ChartKind, ChartSpec};
use crate::views::dashboard::FieldDashboard;
use crate::views::map::{MapLayer, MapView};
use crate::views::tasks::TaskBadge;
use crate::views::{
    AuthView, DashboardView, DiagnosisView, FinancialsView, MarketplaceView, PageView,
    PlanningView, TasksView,
};

pub fn theme_color(theme: Theme) -> Color {
    match theme {
        Theme::Green => Color::Green,
        Theme::Blue => Color::Blue,
        Theme::Earth => Color::Rgb(160, 110, 60),
    }
}

fn series_color(color: &str, accent: Color) -> Color {
    match color {
        "primary" => accent,
        c if c.starts_with('#') && c.len() == 7 => {
            let channel = |i: usize| u8::from_str_radix(&c[i..i + 2], 16).unwrap_or(128);
            Color::Rgb(channel(1), channel(3), channel(5))
        }
        _ => Color::Gray,
    }
}

fn titled(title: &str) -> Block<'static> {
    Block::default().borders(Borders::ALL).title(format!(" {} ", title))
}

/// Draw the active page into `area`.
pub fn render_view(
    frame: &mut Frame,
    area: Rect,
    view: &PageView,
    accent: Color,
    selection: &mut ListState,
) {
    match view {
        PageView::Auth(v) => render_auth(frame, area, v),
        PageView::Dashboard(v) => render_dashboard(frame, area, v, accent),
        PageView::Financials(v) => render_financials(frame, area, v, accent),
        PageView::Marketplace(v) => render_marketplace(frame, area, v, accent, selection),
        PageView::Tasks(v) => render_tasks(frame, area, v, accent, selection),
        PageView::Planning(v) => render_planning(frame, area, v, accent),
        PageView::Diagnosis(v) => render_diagnosis(frame, area, v, accent),
    }
}

fn render_auth(frame: &mut Frame, area: Rect, view: &AuthView) {
    let mut lines = vec![
        Line::from(Span::styled(
            view.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(view.message.clone()),
        Line::from(""),
        Line::from("Sign in from the shell with: ap login --email <email> --password <password>"),
    ];
    if let Some(email) = &view.remembered_email {
        lines.push(Line::from(format!("Last signed in as {}", email)));
    }
    frame.render_widget(
        Paragraph::new(lines).block(titled("AgriPulse")).wrap(Wrap { trim: true }),
        area,
    );
}

// === Dashboard ===

fn render_dashboard(frame: &mut Frame, area: Rect, view: &DashboardView, accent: Color) {
    let dashboard = match view {
        DashboardView::NoData { title, message } => {
            frame.render_widget(
                Paragraph::new(message.clone())
                    .block(titled(title))
                    .wrap(Wrap { trim: true }),
                area,
            );
            return;
        }
        DashboardView::Field(d) => d,
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(8)])
        .split(area);
    render_cards(frame, rows[0], dashboard, accent);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(rows[1]);
    render_map(frame, body[0], &dashboard.map, accent);

    let charts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(body[1]);
    render_chart(frame, charts[0], &dashboard.yield_chart, accent);
    render_chart(frame, charts[1], &dashboard.moisture_chart, accent);
}

fn render_cards(frame: &mut Frame, area: Rect, dashboard: &FieldDashboard, accent: Color) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(30),
            Constraint::Percentage(30),
            Constraint::Percentage(40),
        ])
        .split(area);

    let kpi = Paragraph::new(vec![
        Line::from(Span::styled(
            dashboard.kpi.value.clone(),
            Style::default().fg(accent).add_modifier(Modifier::BOLD),
        )),
        Line::from(dashboard.kpi.description.clone()),
    ])
    .block(titled(&dashboard.kpi.title));
    frame.render_widget(kpi, cols[0]);

    let alerts = Paragraph::new(vec![
        Line::from(Span::styled(
            dashboard.alerts.count.to_string(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(dashboard.alerts.detail.clone()),
    ])
    .block(titled("Active Alerts"));
    frame.render_widget(alerts, cols[1]);

    let items: Vec<Line> = dashboard
        .inventory
        .iter()
        .map(|card| {
            let style = if card.critical {
                Style::default().fg(Color::Red)
            } else {
                Style::default()
            };
            Line::from(Span::styled(card.to_line(), style))
        })
        .collect();
    frame.render_widget(Paragraph::new(items).block(titled("Inventory")), cols[2]);
}

fn render_map(frame: &mut Frame, area: Rect, map: &MapView, accent: Color) {
    let spec = match map {
        MapView::Invalid { message } => {
            frame.render_widget(
                Paragraph::new(message.clone())
                    .style(Style::default().fg(Color::Red))
                    .block(titled("Field Map")),
                area,
            );
            return;
        }
        MapView::Ready(spec) => spec,
    };

    let lats = spec.boundary.iter().map(|p| p[0]).chain([spec.center[0]]);
    let lons = spec.boundary.iter().map(|p| p[1]).chain([spec.center[1]]);
    let (min_lat, max_lat) = bounds(lats);
    let (min_lon, max_lon) = bounds(lons);
    let pad_lat = ((max_lat - min_lat) * 0.2).max(0.001);
    let pad_lon = ((max_lon - min_lon) * 0.2).max(0.001);

    let color = match spec.layer {
        MapLayer::Default => accent,
        MapLayer::Moisture => series_color(&spec.style.color, accent),
    };
    let title = format!("Field Map ({}) {}", spec.layer.as_str(), spec.coords_label);

    let canvas = Canvas::default()
        .block(titled(&title))
        .x_bounds([min_lon - pad_lon, max_lon + pad_lon])
        .y_bounds([min_lat - pad_lat, max_lat + pad_lat])
        .paint(|ctx| {
            for pair in spec.boundary.windows(2) {
                ctx.draw(&CanvasLine {
                    x1: pair[0][1],
                    y1: pair[0][0],
                    x2: pair[1][1],
                    y2: pair[1][0],
                    color,
                });
            }
            if let (Some(first), Some(last)) = (spec.boundary.first(), spec.boundary.last()) {
                ctx.draw(&CanvasLine {
                    x1: last[1],
                    y1: last[0],
                    x2: first[1],
                    y2: first[0],
                    color,
                });
            }
            ctx.print(spec.center[1], spec.center[0], "x");
        });
    frame.render_widget(canvas, area);
}

fn bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::MAX, f64::MIN), |(lo, hi), v| (lo.min(v), hi.max(v)))
}

// === Charts ===

/// Line charts become a ratatui `Chart`; bar and doughnut charts plot the
/// first series as bars.
pub fn render_chart(frame: &mut Frame, area: Rect, spec: &ChartSpec, accent: Color) {
    match spec.kind {
        ChartKind::Line => render_line_chart(frame, area, spec, accent),
        ChartKind::Bar | ChartKind::Doughnut => render_bar_chart(frame, area, spec, accent),
    }
}

fn render_line_chart(frame: &mut Frame, area: Rect, spec: &ChartSpec, accent: Color) {
    let points: Vec<Vec<(f64, f64)>> = spec
        .datasets
        .iter()
        .map(|d| {
            d.data
                .iter()
                .enumerate()
                .map(|(i, v)| (i as f64, *v))
                .collect()
        })
        .collect();
    let datasets: Vec<TuiDataset> = spec
        .datasets
        .iter()
        .zip(&points)
        .map(|(d, data)| {
            TuiDataset::default()
                .name(d.label.clone())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(series_color(&d.color, accent)))
                .data(data)
        })
        .collect();

    let left = spec.axes.first();
    let y_min = left.and_then(|a| a.min).unwrap_or(0.0);
    let y_max = left.and_then(|a| a.max).unwrap_or_else(|| spec.max_value() * 1.1);
    let x_max = spec.labels.len().saturating_sub(1).max(1) as f64;
    let x_labels: Vec<Span> = [spec.labels.first(), spec.labels.last()]
        .into_iter()
        .flatten()
        .map(|l| Span::raw(l.clone()))
        .collect();

    let chart = Chart::new(datasets)
        .block(titled(&spec.title))
        .x_axis(TuiAxis::default().bounds([0.0, x_max]).labels(x_labels))
        .y_axis(
            TuiAxis::default()
                .bounds([y_min, y_max])
                .labels(vec![
                    Span::raw(format!("{:.0}", y_min)),
                    Span::raw(format!("{:.0}", y_max)),
                ]),
        );
    frame.render_widget(chart, area);
}

fn render_bar_chart(frame: &mut Frame, area: Rect, spec: &ChartSpec, accent: Color) {
    let Some(series) = spec.datasets.first() else {
        frame.render_widget(titled(&spec.title), area);
        return;
    };
    let color = series_color(&series.color, accent);
    let bars: Vec<Bar> = spec
        .labels
        .iter()
        .zip(&series.data)
        .map(|(label, value)| {
            Bar::default()
                .value((value * 10.0).round().max(0.0) as u64)
                .text_value(format!("{}", value))
                .label(Line::from(label.chars().take(6).collect::<String>()))
                .style(Style::default().fg(color))
        })
        .collect();
    let chart = BarChart::default()
        .block(titled(&spec.title))
        .bar_width(6)
        .bar_gap(1)
        .data(BarGroup::default().bars(&bars));
    frame.render_widget(chart, area);
}

// === Financials ===

fn render_financials(frame: &mut Frame, area: Rect, view: &FinancialsView, accent: Color) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(8)])
        .split(area);

    let s = &view.summary;
    let summary = Paragraph::new(format!(
        "Income {:.1}M  Expenses {:.1}M  Net {:.1}M  Inventory Ksh {:.0}",
        s.total_income, s.total_expenses, s.net, s.inventory_value
    ))
    .block(titled("Summary"));
    frame.render_widget(summary, rows[0]);

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Percentage(30),
            Constraint::Percentage(30),
        ])
        .split(rows[1]);
    render_chart(frame, cols[0], &view.cash_flow, accent);
    render_chart(frame, cols[1], &view.cost_breakdown, accent);
    render_chart(frame, cols[2], &view.revenue, accent);
}

// === Marketplace ===

fn render_marketplace(
    frame: &mut Frame,
    area: Rect,
    view: &MarketplaceView,
    accent: Color,
    selection: &mut ListState,
) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    let title = format!(
        "Listings [{}]{}",
        view.query.category,
        if view.query.search.is_empty() {
            String::new()
        } else {
            format!(" \"{}\"", view.query.search)
        }
    );

    if let Some(message) = &view.empty_message {
        frame.render_widget(Paragraph::new(message.clone()).block(titled(&title)), cols[0]);
    } else {
        let items: Vec<ListItem> = view
            .listings
            .iter()
            .map(|l| {
                let mut spans = vec![
                    Span::styled(
                        format!("{:<10}", l.price_label),
                        Style::default().fg(accent),
                    ),
                    Span::raw(format!(" {} ({})", l.title, l.seller)),
                ];
                if l.recommended {
                    spans.push(Span::styled(
                        " [Recommended]",
                        Style::default().fg(Color::Yellow),
                    ));
                }
                ListItem::new(Line::from(spans))
            })
            .collect();
        let list = List::new(items)
            .block(titled(&title))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
        frame.render_stateful_widget(list, cols[0], selection);
    }

    render_chart(frame, cols[1], &view.price_chart, accent);
}

// === Tasks ===

fn render_tasks(
    frame: &mut Frame,
    area: Rect,
    view: &TasksView,
    accent: Color,
    selection: &mut ListState,
) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let title = format!(
        "Tasks for {}",
        view.field_name.as_deref().unwrap_or("N/A")
    );
    let rows: Vec<Row> = view
        .tasks
        .iter()
        .map(|t| {
            let badge_style = match t.badge {
                TaskBadge::Done => Style::default().fg(Color::DarkGray),
                TaskBadge::Overdue => Style::default().fg(Color::Red),
                TaskBadge::Priority(_) => Style::default().fg(accent),
            };
            let title_style = if t.completed {
                Style::default().add_modifier(Modifier::CROSSED_OUT)
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(if t.completed { "[x]" } else { "[ ]" }),
                Cell::from(t.title.clone()).style(title_style),
                Cell::from(t.date.clone()),
                Cell::from(t.badge.label()).style(badge_style),
            ])
        })
        .collect();
    let table = Table::new(
        rows,
        [
            Constraint::Length(3),
            Constraint::Min(20),
            Constraint::Length(10),
            Constraint::Length(16),
        ],
    )
    .block(titled(&title))
    .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut table_state = ratatui::widgets::TableState::default();
    table_state.select(selection.selected());
    frame.render_stateful_widget(table, cols[0], &mut table_state);

    let items: Vec<ListItem> = view
        .inventory
        .iter()
        .map(|card| {
            let style = if card.critical {
                Style::default().fg(Color::Red)
            } else {
                Style::default()
            };
            ListItem::new(Span::styled(card.to_line(), style))
        })
        .collect();
    frame.render_widget(List::new(items).block(titled("Inventory")), cols[1]);
}

// === Planner ===

fn render_planning(frame: &mut Frame, area: Rect, view: &PlanningView, accent: Color) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(7), Constraint::Min(8)])
        .split(area);

    let inputs = Paragraph::new(vec![
        Line::from(format!("Rainfall:       {}", view.rainfall_label)),
        Line::from(format!("Fertilizer:     {}", view.report.inputs.fertilizer)),
        Line::from(format!("Pest pressure:  {}", view.pest_label)),
        Line::from(Span::styled(
            format!("Projected:      {}", view.projected_label),
            Style::default().fg(accent).add_modifier(Modifier::BOLD),
        )),
        Line::from(view.summary.clone()),
    ])
    .wrap(Wrap { trim: true })
    .block(titled("Scenario"));
    frame.render_widget(inputs, rows[0]);
    render_chart(frame, rows[1], &view.chart, accent);
}

// === Crop doctor ===

fn render_diagnosis(frame: &mut Frame, area: Rect, view: &DiagnosisView, accent: Color) {
    let lines = match view {
        DiagnosisView::Idle { message } => vec![
            Line::from(message.clone()),
            Line::from(""),
            Line::from("Run `ap diagnose <image>` to analyse a photo."),
        ],
        DiagnosisView::Analyzing => vec![Line::from(Span::styled(
            "Analyzing image...",
            Style::default().fg(Color::Yellow),
        ))],
        DiagnosisView::Result(report) => {
            let mut lines = vec![
                Line::from(Span::styled(
                    report.disease.clone(),
                    Style::default().fg(accent).add_modifier(Modifier::BOLD),
                )),
                Line::from(format!("Likelihood: {}", report.likelihood)),
                Line::from(report.cause.clone()),
                Line::from(format!("Treatment: {}", report.treatment)),
            ];
            if let Some(source) = report.source_line() {
                lines.push(Line::from(source));
            }
            lines
        }
    };
    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(titled("Crop Doctor")),
        area,
    );
}
