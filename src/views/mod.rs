//! Pure view renderers.
//!
//! Every renderer maps `&AppState` plus the transient UI inputs in
//! [`ViewContext`] to a serializable view model. Renderers never touch
//! storage; drawing (CLI text or terminal widgets) happens elsewhere.

pub mod charts;
pub mod dashboard;
pub mod diagnosis;
pub mod financials;
pub mod map;
pub mod marketplace;
pub mod planning;
pub mod tasks;
pub mod widgets;

use crate::commands::Output;
use crate::controller::Page;
use crate::models::Theme;
use crate::scenario::ScenarioInputs;
use crate::state::{AppState, MANAGE_FIELDS_ID};
use chrono::{Local, NaiveDate};
use serde::Serialize;

pub use dashboard::DashboardView;
pub use diagnosis::{DiagnosisReport, DiagnosisView};
pub use financials::FinancialsView;
pub use map::MapLayer;
pub use marketplace::{MarketplaceQuery, MarketplaceView};
pub use planning::PlanningView;
pub use tasks::{InventoryTable, TasksView};
pub use widgets::{WidgetKind, WidgetRegistry};

/// Transient inputs that shape a page but are not persisted.
#[derive(Debug, Clone)]
pub struct ViewContext {
    pub today: NaiveDate,
    pub map_layer: MapLayer,
    pub market_query: MarketplaceQuery,
    pub scenario: ScenarioInputs,
    pub diagnosis: Option<DiagnosisReport>,
    pub diagnosis_pending: bool,
    /// Listing flagged as recommended after a diagnosis
    pub suggested_vendor_id: Option<String>,
}

impl Default for ViewContext {
    fn default() -> Self {
        Self {
            today: Local::now().date_naive(),
            map_layer: MapLayer::default(),
            market_query: MarketplaceQuery::default(),
            scenario: ScenarioInputs::default(),
            diagnosis: None,
            diagnosis_pending: false,
            suggested_vendor_id: None,
        }
    }
}

/// A widget a view wants mounted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WidgetRef {
    pub id: String,
    pub kind: WidgetKind,
}

impl WidgetRef {
    pub fn new(id: &str, kind: WidgetKind) -> Self {
        Self {
            id: id.to_string(),
            kind,
        }
    }
}

/// The sign-in landing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthView {
    pub title: String,
    pub message: String,
    /// Email of the last session, pre-filled in the form
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remembered_email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "page", content = "view", rename_all = "snake_case")]
pub enum PageView {
    Auth(AuthView),
    Dashboard(DashboardView),
    Financials(FinancialsView),
    Marketplace(MarketplaceView),
    Tasks(TasksView),
    Planning(PlanningView),
    Diagnosis(DiagnosisView),
}

impl PageView {
    /// Charts and maps this view mounts.
    pub fn widgets(&self) -> Vec<WidgetRef> {
        match self {
            PageView::Dashboard(v) => v.widgets(),
            PageView::Financials(v) => v.widgets(),
            PageView::Marketplace(v) => v.widgets(),
            PageView::Planning(v) => v.widgets(),
            PageView::Auth(_) | PageView::Tasks(_) | PageView::Diagnosis(_) => Vec::new(),
        }
    }
}

pub fn render_auth(state: &AppState) -> AuthView {
    AuthView {
        title: "Sign In to your account".to_string(),
        message: "Please sign in to access the dashboard.".to_string(),
        remembered_email: Some(state.session.user_email.clone()).filter(|e| !e.is_empty()),
    }
}

/// Render one page.
pub fn render_page(page: Page, state: &AppState, ctx: &ViewContext) -> PageView {
    match page {
        Page::Dashboard => PageView::Dashboard(dashboard::render(state, ctx)),
        Page::Financials => PageView::Financials(financials::render(state)),
        Page::Marketplace => PageView::Marketplace(marketplace::render(state, ctx)),
        Page::Tasks => PageView::Tasks(tasks::render(state, ctx)),
        Page::Planning => PageView::Planning(planning::render(ctx)),
        Page::Diagnosis => PageView::Diagnosis(diagnosis::render(ctx)),
    }
}

/// One entry of the field context selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectorOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// Field options followed by the "manage" entry.
pub fn context_selector(state: &AppState) -> Vec<SelectorOption> {
    let mut options: Vec<SelectorOption> = state
        .fields
        .iter()
        .map(|f| SelectorOption {
            value: f.id.clone(),
            label: f.selector_label(),
            selected: f.id == state.current_field_id,
        })
        .collect();
    options.push(SelectorOption {
        value: MANAGE_FIELDS_ID.to_string(),
        label: "-- Manage Operations --".to_string(),
        selected: false,
    });
    options
}

/// Everything on screen: chrome plus the active page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Screen {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<Page>,
    pub theme: Theme,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserBadge>,
    pub context: Vec<SelectorOption>,
    #[serde(flatten)]
    pub view: PageView,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserBadge {
    pub name: String,
    pub email: String,
}

impl Screen {
    pub fn new(active: Option<Page>, state: &AppState, view: PageView) -> Self {
        let session = &state.session;
        Self {
            active,
            theme: state.theme,
            user: session.logged_in.then(|| UserBadge {
                name: session.user_name.clone(),
                email: session.user_email.clone(),
            }),
            context: context_selector(state),
            view,
        }
    }
}

impl Output for AuthView {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        format!("{}\n{}", self.title, self.message)
    }
}

impl Output for PageView {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        match self {
            PageView::Auth(v) => v.to_human(),
            PageView::Dashboard(v) => v.to_human(),
            PageView::Financials(v) => v.to_human(),
            PageView::Marketplace(v) => v.to_human(),
            PageView::Tasks(v) => v.to_human(),
            PageView::Planning(v) => v.to_human(),
            PageView::Diagnosis(v) => v.to_human(),
        }
    }
}

impl Output for Screen {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        let mut lines = Vec::new();
        if let Some(page) = self.active {
            let field = self
                .context
                .iter()
                .find(|o| o.selected)
                .map(|o| o.label.as_str())
                .unwrap_or("N/A");
            let user = self
                .user
                .as_ref()
                .map(|u| format!("{} <{}>", u.name, u.email))
                .unwrap_or_default();
            lines.push(format!("== {} == {}  {}", page.title(), field, user));
            lines.push(String::new());
        }
        lines.push(self.view.to_human());
        lines.join("\n")
    }
}
