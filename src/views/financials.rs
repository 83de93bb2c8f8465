//! Financials page.

use super::WidgetRef;
use super::charts::{ChartKind, ChartSpec, Dataset, render_text};
use super::widgets::WidgetKind;
use crate::commands::Output;
use crate::scenario::round1;
use crate::state::AppState;
use serde::Serialize;

const MONTHS: [&str; 7] = ["Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul"];
const INCOME: [f64; 7] = [1.5, 1.8, 1.2, 2.0, 1.9, 2.5, 3.0];
const EXPENSES: [f64; 7] = [0.8, 1.0, 0.9, 1.1, 1.2, 1.3, 1.5];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialSummary {
    /// KSh millions over the charted period
    pub total_income: f64,
    pub total_expenses: f64,
    pub net: f64,
    /// KSh, value of stock on hand
    pub inventory_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialsView {
    pub summary: FinancialSummary,
    pub cash_flow: ChartSpec,
    pub cost_breakdown: ChartSpec,
    pub revenue: ChartSpec,
}

impl FinancialsView {
    pub fn widgets(&self) -> Vec<WidgetRef> {
        [&self.cash_flow, &self.cost_breakdown, &self.revenue]
            .iter()
            .map(|c| WidgetRef::new(&c.id, WidgetKind::Chart))
            .collect()
    }
}

pub fn render(state: &AppState) -> FinancialsView {
    let total_income: f64 = INCOME.iter().sum();
    let total_expenses: f64 = EXPENSES.iter().sum();
    FinancialsView {
        summary: FinancialSummary {
            total_income: round1(total_income),
            total_expenses: round1(total_expenses),
            net: round1(total_income - total_expenses),
            inventory_value: state.inventory.iter().map(|i| i.stock_value()).sum(),
        },
        cash_flow: cash_flow_chart(),
        cost_breakdown: cost_breakdown_chart(),
        revenue: revenue_chart(),
    }
}

pub fn cash_flow_chart() -> ChartSpec {
    ChartSpec::new(
        "cash-flow-chart",
        "Monthly Cash Flow",
        ChartKind::Bar,
        &MONTHS,
    )
    .dataset(Dataset::new("Income (KSh M)", INCOME.to_vec(), "primary"))
    .dataset(Dataset::new("Expenses (KSh M)", EXPENSES.to_vec(), "#EF4444"))
    .stacked()
}

pub fn cost_breakdown_chart() -> ChartSpec {
    ChartSpec::new(
        "cost-breakdown-chart",
        "Cost Breakdown (%)",
        ChartKind::Doughnut,
        &["Seeds", "Fertilizer", "Labour", "Fuel", "Veterinary"],
    )
    .dataset(Dataset::new(
        "Share of Expenses",
        vec![18.0, 32.0, 27.0, 11.0, 12.0],
        "primary",
    ))
}

pub fn revenue_chart() -> ChartSpec {
    ChartSpec::new("revenue-chart", "Revenue by Enterprise", ChartKind::Line, &MONTHS)
        .dataset(Dataset::new(
            "Maize (KSh M)",
            vec![0.9, 1.1, 0.6, 1.2, 1.1, 1.6, 2.0],
            "primary",
        ))
        .dataset(Dataset::new(
            "Poultry (KSh M)",
            vec![0.6, 0.7, 0.6, 0.8, 0.8, 0.9, 1.0],
            "#F59E0B",
        ))
}

impl Output for FinancialsView {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        let s = &self.summary;
        [
            format!(
                "Income KSh {:.1}M, expenses KSh {:.1}M, net KSh {:.1}M",
                s.total_income, s.total_expenses, s.net
            ),
            format!("Inventory on hand: KSh {:.0}", s.inventory_value),
            String::new(),
            render_text(&self.cash_flow),
            render_text(&self.cost_breakdown),
            render_text(&self.revenue),
        ]
        .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_totals() {
        let view = render(&AppState::default());
        assert_eq!(view.summary.total_income, 13.9);
        assert_eq!(view.summary.total_expenses, 7.8);
        assert_eq!(view.summary.net, 6.1);
    }

    #[test]
    fn test_inventory_value_from_state() {
        let view = render(&AppState::default());
        // 50*7800 + 5*4500 + 150*185 + 20*3200
        assert_eq!(view.summary.inventory_value, 504_250.0);
    }

    #[test]
    fn test_cash_flow_is_stacked() {
        assert!(cash_flow_chart().stacked);
        assert_eq!(render(&AppState::default()).widgets().len(), 3);
    }
}
