//! Task planner and inventory views.

use super::ViewContext;
use crate::commands::Output;
use crate::models::{InventoryItem, Priority, Task};
use crate::state::AppState;
use chrono::NaiveDate;
use serde::Serialize;

/// Number of inventory items shown in overview cards.
pub const OVERVIEW_LIMIT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskBadge {
    Done,
    Overdue,
    Priority(Priority),
}

impl TaskBadge {
    pub fn label(&self) -> String {
        match self {
            TaskBadge::Done => "Done".to_string(),
            TaskBadge::Overdue => "OVERDUE".to_string(),
            TaskBadge::Priority(p) => format!("{} Priority", p.label()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskRow {
    pub id: u64,
    pub title: String,
    pub date: String,
    pub priority: Priority,
    pub completed: bool,
    pub recommended: bool,
    pub badge: TaskBadge,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryCard {
    pub id: u64,
    pub name: String,
    pub category: String,
    pub quantity: f64,
    pub unit: String,
    pub critical: bool,
}

impl InventoryCard {
    pub fn to_line(&self) -> String {
        format!(
            "{} {} ({}) {} {}",
            if self.critical { "!" } else { " " },
            self.name,
            self.category,
            fmt_qty(self.quantity),
            self.unit
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryRow {
    pub id: u64,
    pub name: String,
    pub category: String,
    pub quantity: f64,
    pub unit: String,
    pub critical_level: f64,
    pub unit_cost: f64,
    pub stock_value: f64,
    pub critical: bool,
    /// "CRITICAL LOW" or "OK"
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TasksView {
    pub field_id: String,
    pub field_name: Option<String>,
    pub tasks: Vec<TaskRow>,
    pub inventory: Vec<InventoryCard>,
}

/// The full inventory table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryTable {
    pub rows: Vec<InventoryRow>,
    pub critical_count: usize,
    pub total_value: f64,
}

/// Tasks of one field: incomplete before complete, then by ascending due
/// date. Equal keys keep their stored order.
pub fn sorted_tasks<'a>(tasks: &'a [Task], field_id: &str) -> Vec<&'a Task> {
    let mut filtered: Vec<&Task> = tasks.iter().filter(|t| t.field_id == field_id).collect();
    filtered.sort_by_key(|t| (t.completed, due_date(t)));
    filtered
}

// Unparseable dates sort last.
fn due_date(task: &Task) -> NaiveDate {
    NaiveDate::parse_from_str(&task.date, "%Y-%m-%d").unwrap_or(NaiveDate::MAX)
}

fn badge(task: &Task, today: NaiveDate) -> TaskBadge {
    if task.completed {
        TaskBadge::Done
    } else if due_date(task) < today {
        TaskBadge::Overdue
    } else {
        TaskBadge::Priority(task.priority)
    }
}

/// Top inventory items, critical ones first.
pub fn inventory_overview(items: &[InventoryItem]) -> Vec<InventoryCard> {
    let mut sorted: Vec<&InventoryItem> = items.iter().collect();
    sorted.sort_by_key(|i| !i.is_critical());
    sorted
        .into_iter()
        .take(OVERVIEW_LIMIT)
        .map(|i| InventoryCard {
            id: i.id,
            name: i.name.clone(),
            category: i.category.clone(),
            quantity: i.quantity,
            unit: i.unit.clone(),
            critical: i.is_critical(),
        })
        .collect()
}

/// Every inventory item in stored order.
pub fn inventory_table(items: &[InventoryItem]) -> InventoryTable {
    let rows: Vec<InventoryRow> = items
        .iter()
        .map(|i| InventoryRow {
            id: i.id,
            name: i.name.clone(),
            category: i.category.clone(),
            quantity: i.quantity,
            unit: i.unit.clone(),
            critical_level: i.critical_level,
            unit_cost: i.unit_cost,
            stock_value: i.stock_value(),
            critical: i.is_critical(),
            status: if i.is_critical() { "CRITICAL LOW" } else { "OK" }.to_string(),
        })
        .collect();
    InventoryTable {
        critical_count: rows.iter().filter(|r| r.critical).count(),
        total_value: rows.iter().map(|r| r.stock_value).sum(),
        rows,
    }
}

pub fn render(state: &AppState, ctx: &ViewContext) -> TasksView {
    let field_id = state.current_field_id.clone();
    TasksView {
        field_name: state.current_field().map(|f| f.name.clone()),
        tasks: sorted_tasks(&state.tasks, &field_id)
            .into_iter()
            .map(|t| TaskRow {
                id: t.id,
                title: t.title.clone(),
                date: t.date.clone(),
                priority: t.priority,
                completed: t.completed,
                recommended: t.recommended,
                badge: badge(t, ctx.today),
            })
            .collect(),
        inventory: inventory_overview(&state.inventory),
        field_id,
    }
}

fn fmt_qty(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

impl Output for TasksView {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        let mut lines = vec![format!(
            "Tasks for {}",
            self.field_name.as_deref().unwrap_or("N/A")
        )];
        if self.tasks.is_empty() {
            lines.push("  No tasks.".to_string());
        }
        for task in &self.tasks {
            lines.push(format!(
                "  [{}] {:>13}  {}{}  due {}  {}",
                if task.completed { "x" } else { " " },
                task.id,
                task.title,
                if task.recommended { " (AI)" } else { "" },
                task.date,
                task.badge.label()
            ));
        }
        lines.push(String::new());
        lines.push("Inventory:".to_string());
        for card in &self.inventory {
            lines.push(format!("  {}", card.to_line()));
        }
        lines.join("\n")
    }
}

impl Output for InventoryTable {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        let mut lines = vec![format!(
            "{:<20} {:<12} {:>12} {:>14}  {}",
            "Name", "Category", "Qty on Hand", "Critical Level", "Status"
        )];
        for row in &self.rows {
            lines.push(format!(
                "{:<20} {:<12} {:>12} {:>14}  {}",
                row.name,
                row.category,
                format!("{} {}", fmt_qty(row.quantity), row.unit),
                format!("{} {}", fmt_qty(row.critical_level), row.unit),
                row.status
            ));
        }
        lines.push(String::new());
        lines.push(format!(
            "{} item(s), {} critical, stock value KSh {:.0}",
            self.rows.len(),
            self.critical_count,
            self.total_value
        ));
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::seed;

    fn task(id: u64, date: &str, completed: bool) -> Task {
        Task {
            id,
            field_id: "f".to_string(),
            title: format!("t{}", id),
            date: date.to_string(),
            priority: Priority::Medium,
            completed,
            recommended: false,
        }
    }

    fn ids(tasks: &[&Task]) -> Vec<u64> {
        tasks.iter().map(|t| t.id).collect()
    }

    #[test]
    fn test_incomplete_first_then_by_date() {
        let tasks = vec![
            task(1, "2025-10-20", true),
            task(2, "2025-10-25", false),
            task(3, "2025-10-10", false),
            task(4, "2025-10-01", true),
        ];
        assert_eq!(ids(&sorted_tasks(&tasks, "f")), vec![3, 2, 4, 1]);
    }

    #[test]
    fn test_equal_keys_keep_insertion_order() {
        let tasks = vec![
            task(9, "2025-10-20", false),
            task(5, "2025-10-20", false),
            task(7, "2025-10-20", false),
        ];
        assert_eq!(ids(&sorted_tasks(&tasks, "f")), vec![9, 5, 7]);
    }

    #[test]
    fn test_tasks_filtered_by_field() {
        let tasks = seed::default_tasks();
        let listed = sorted_tasks(&tasks, "maize-field-1");
        assert!(listed.iter().all(|t| t.field_id == "maize-field-1"));
        assert_eq!(listed.len(), 2);
    }

    #[test]
    fn test_badges() {
        let today = NaiveDate::from_ymd_opt(2025, 10, 16).unwrap();
        assert_eq!(badge(&task(1, "2025-10-15", false), today), TaskBadge::Overdue);
        assert_eq!(badge(&task(1, "2025-10-15", true), today), TaskBadge::Done);
        assert_eq!(
            badge(&task(1, "2025-10-16", false), today),
            TaskBadge::Priority(Priority::Medium)
        );
    }

    #[test]
    fn test_overview_puts_critical_first_stably() {
        let mut items = seed::default_inventory();
        items[1].quantity = 1.0;
        items[3].quantity = 0.0;
        let overview = inventory_overview(&items);
        let names: Vec<&str> = overview.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Maize Seed (25kg)", "Chicken Feed", "Urea (50kg)"]);
        assert!(overview[0].critical && overview[1].critical && !overview[2].critical);
    }

    #[test]
    fn test_table_is_unfiltered_in_stored_order() {
        let mut items = seed::default_inventory();
        items[2].quantity = 50.0;
        let table = inventory_table(&items);
        assert_eq!(table.rows.len(), 4);
        assert_eq!(table.rows[2].status, "CRITICAL LOW");
        assert_eq!(table.rows[0].status, "OK");
        assert_eq!(table.critical_count, 1);
        assert!(table.to_human().contains("CRITICAL LOW"));
    }
}
