//! Page controller.
//!
//! Owns the [`Store`], the active page and every transient UI input, and is
//! the only place that mounts or tears down widgets. Navigation:
//!
//! 1. refuses when nobody is signed in
//! 2. destroys every live chart and map
//! 3. advances the navigation epoch, cancelling pending flows
//! 4. renders the target page and mounts its widgets
//!
//! Mutations go through the store and then re-render the active page.

use crate::chat::{ChatExchange, ChatSession, respond};
use crate::flows::{FlowKind, FlowResult, ImageUpload, Latency, Navigator, PendingFlow};
use crate::models::{MarketplaceListing, Task, Theme};
use crate::scenario::ScenarioInputs;
use crate::state::{AppState, FieldSwitch, MIN_PASSWORD_LEN, Mutation, NewListing, NewTask, Store};
use crate::views::diagnosis::DiagnosisReport;
use crate::views::map::MOISTURE_LAYER_NOTICE;
use crate::views::{
    MapLayer, MarketplaceQuery, PageView, Screen, ViewContext, WidgetRegistry, render_auth,
    render_page,
};
use crate::{Error, Result};
use serde::Serialize;
use std::fmt;

/// Dashboard pages, in sidebar order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Page {
    Dashboard,
    Financials,
    Marketplace,
    Tasks,
    Planning,
    Diagnosis,
}

impl Page {
    pub fn all() -> &'static [Page] {
        &[
            Page::Dashboard,
            Page::Financials,
            Page::Marketplace,
            Page::Tasks,
            Page::Planning,
            Page::Diagnosis,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Page::Dashboard => "dashboard",
            Page::Financials => "financials",
            Page::Marketplace => "marketplace",
            Page::Tasks => "tasks",
            Page::Planning => "planning",
            Page::Diagnosis => "diagnosis",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Page::Dashboard => "Dashboard",
            Page::Financials => "Financials",
            Page::Marketplace => "Marketplace",
            Page::Tasks => "Tasks & Inventory",
            Page::Planning => "Scenario Planner",
            Page::Diagnosis => "Crop Doctor",
        }
    }

    pub fn index(&self) -> usize {
        Page::all().iter().position(|p| p == self).unwrap_or(0)
    }

    pub fn next(&self) -> Page {
        Page::all()[(self.index() + 1) % Page::all().len()]
    }

    pub fn previous(&self) -> Page {
        let len = Page::all().len();
        Page::all()[(self.index() + len - 1) % len]
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Page {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Page::all()
            .iter()
            .copied()
            .find(|p| p.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| {
                format!(
                    "Invalid page: {}. Valid values: dashboard, financials, marketplace, tasks, planning, diagnosis",
                    s
                )
            })
    }
}

/// Sign-in form contents that passed validation.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Result of a completed diagnosis.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosisOutcome {
    pub image: ImageUpload,
    pub report: DiagnosisReport,
    /// Task added to the planner
    pub task: Task,
    pub notice: String,
}

/// A diagnosis waiting out its delay.
#[derive(Debug)]
pub struct DiagnosisRequest {
    pub image: ImageUpload,
    pub report: DiagnosisReport,
}

pub struct PageController {
    store: Store,
    active: Option<Page>,
    ctx: ViewContext,
    widgets: WidgetRegistry,
    navigator: Navigator,
    latency: Latency,
    chat: ChatSession,
}

impl fmt::Debug for PageController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageController")
            .field("active", &self.active)
            .field("epoch", &self.navigator.epoch())
            .field("live_widgets", &self.widgets.live_count())
            .finish()
    }
}

impl PageController {
    /// Start on the dashboard when a complete session is stored, otherwise
    /// on the sign-in landing.
    pub fn new(store: Store, latency: Latency) -> Self {
        let mut controller = Self {
            store,
            active: None,
            ctx: ViewContext::default(),
            widgets: WidgetRegistry::new(),
            navigator: Navigator::new(),
            latency,
            chat: ChatSession::default(),
        };
        if controller.state().session.logged_in {
            controller.show(Page::Dashboard);
        }
        controller
    }

    pub fn state(&self) -> &AppState {
        self.store.state()
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn into_store(self) -> Store {
        self.store
    }

    /// Active page, `None` on the sign-in landing.
    pub fn active(&self) -> Option<Page> {
        self.active
    }

    pub fn context(&self) -> &ViewContext {
        &self.ctx
    }

    pub fn widgets(&self) -> &WidgetRegistry {
        &self.widgets
    }

    pub fn epoch(&self) -> u64 {
        self.navigator.epoch()
    }

    pub fn chat(&self) -> &ChatSession {
        &self.chat
    }

    pub fn latency(&self) -> Latency {
        self.latency
    }

    fn require_session(&self) -> Result<()> {
        if self.state().session.logged_in {
            Ok(())
        } else {
            Err(Error::NotLoggedIn)
        }
    }

    // === Rendering ===

    /// Render what is currently on screen.
    pub fn screen(&self) -> Screen {
        let view = match self.active {
            Some(page) => render_page(page, self.state(), &self.ctx),
            None => PageView::Auth(render_auth(self.state())),
        };
        Screen::new(self.active, self.state(), view)
    }

    /// Switch to `page`.
    pub fn navigate(&mut self, page: Page) -> Result<Screen> {
        self.require_session()?;
        self.show(page);
        Ok(self.screen())
    }

    fn show(&mut self, page: Page) {
        let destroyed = self.widgets.teardown();
        self.navigator.advance();
        self.ctx.diagnosis = None;
        self.ctx.diagnosis_pending = false;
        self.chat.abandon_reply();
        self.active = Some(page);
        tracing::debug!("Navigated to {} ({} widgets destroyed)", page, destroyed);
        self.mount_active();
    }

    /// Re-render the active page after a change, without cancelling flows.
    fn refresh(&mut self) {
        if self.active.is_some() {
            self.widgets.teardown();
            self.mount_active();
        }
    }

    fn mount_active(&mut self) {
        if let Some(page) = self.active {
            let view = render_page(page, self.store.state(), &self.ctx);
            for widget in view.widgets() {
                self.widgets.mount(&widget.id, widget.kind);
            }
        }
    }

    fn leave_to_auth(&mut self) {
        self.widgets.teardown();
        self.navigator.advance();
        self.ctx = ViewContext::default();
        self.chat = ChatSession::default();
        self.active = None;
    }

    // === Session ===

    /// Validate the sign-in form. The session is written when the
    /// transition completes.
    pub fn start_login(
        &mut self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<PendingFlow<Credentials>> {
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(Error::InvalidInput(format!(
                "Password must be at least {} characters long.",
                MIN_PASSWORD_LEN
            )));
        }
        if email.trim().is_empty() {
            return Err(Error::InvalidInput("Email address is required".to_string()));
        }
        Ok(PendingFlow::new(
            FlowKind::Login,
            self.latency.login,
            self.navigator.token(),
            Credentials {
                name: name.to_string(),
                email: email.to_string(),
                password: password.to_string(),
            },
        ))
    }

    pub fn finish_login(&mut self, result: FlowResult<Credentials>) -> Result<Option<Screen>> {
        let Some(creds) = result.into_current() else {
            return Ok(None);
        };
        self.store.log_in(&creds.name, &creds.email, &creds.password)?;
        self.show(Page::Dashboard);
        Ok(Some(self.screen()))
    }

    pub fn log_out(&mut self) -> Result<Mutation> {
        let mutation = self.store.log_out()?;
        self.leave_to_auth();
        Ok(mutation)
    }

    // === Context ===

    /// Change the current field and redraw the active page.
    pub fn switch_field(&mut self, id: &str) -> Result<FieldSwitch> {
        self.require_session()?;
        let switch = self.store.switch_field(id)?;
        if let Some(page) = self.active {
            self.show(page);
        }
        Ok(switch)
    }

    pub fn set_theme(&mut self, theme: Theme) -> Result<Mutation> {
        self.store.set_theme(theme)
    }

    /// Change the map overlay. Returns the notice shown for the moisture layer.
    pub fn set_map_layer(&mut self, layer: MapLayer) -> Option<&'static str> {
        self.ctx.map_layer = layer;
        self.refresh();
        (layer == MapLayer::Moisture).then_some(MOISTURE_LAYER_NOTICE)
    }

    pub fn set_scenario(&mut self, inputs: ScenarioInputs) {
        self.ctx.scenario = inputs.clamped();
        self.refresh();
    }

    // === Tasks ===

    pub fn toggle_task(&mut self, id: u64) -> Result<Mutation> {
        self.require_session()?;
        let mutation = self.store.toggle_task(id)?;
        self.refresh();
        Ok(mutation)
    }

    pub fn delete_task(&mut self, id: u64) -> Result<Mutation> {
        self.require_session()?;
        let mutation = self.store.delete_task(id)?;
        self.refresh();
        Ok(mutation)
    }

    pub fn add_task(&mut self, new: NewTask) -> Result<Task> {
        self.require_session()?;
        let (task, _) = self.store.add_task(new)?;
        self.refresh();
        Ok(task)
    }

    // === Marketplace ===

    pub fn post_listing(&mut self, new: NewListing) -> Result<MarketplaceListing> {
        self.require_session()?;
        let (listing, _) = self.store.post_listing(new)?;
        self.refresh();
        Ok(listing)
    }

    /// Begin loading marketplace results for `query`.
    pub fn start_marketplace_search(
        &mut self,
        query: MarketplaceQuery,
    ) -> Result<PendingFlow<MarketplaceQuery>> {
        self.require_session()?;
        Ok(PendingFlow::new(
            FlowKind::MarketplaceSearch,
            self.latency.marketplace,
            self.navigator.token(),
            query,
        ))
    }

    pub fn finish_marketplace_search(&mut self, result: FlowResult<MarketplaceQuery>) -> bool {
        match result.into_current() {
            Some(query) => {
                self.ctx.market_query = query;
                self.refresh();
                true
            }
            None => false,
        }
    }

    // === Crop doctor ===

    /// Accept an uploaded image and start the diagnosis. Non-images are
    /// rejected without touching state.
    pub fn start_diagnosis(&mut self, image: ImageUpload) -> Result<PendingFlow<DiagnosisRequest>> {
        self.require_session()?;
        let report = DiagnosisReport::simulated(&self.state().listings);
        self.ctx.diagnosis_pending = true;
        tracing::info!("Diagnosing {} ({})", image.name, image.format.mime());
        Ok(PendingFlow::new(
            FlowKind::Diagnosis,
            self.latency.diagnosis,
            self.navigator.token(),
            DiagnosisRequest { image, report },
        ))
    }

    /// Apply a finished diagnosis: show the report and add the recommended
    /// task. Returns `None` when the flow was cancelled or went stale.
    pub fn finish_diagnosis(
        &mut self,
        result: FlowResult<DiagnosisRequest>,
    ) -> Result<Option<DiagnosisOutcome>> {
        let Some(request) = result.into_current() else {
            return Ok(None);
        };
        self.ctx.diagnosis_pending = false;
        let new_task = request.report.recommended_task(self.ctx.today);
        let (task, _) = self.store.add_recommended_task(new_task)?;
        self.ctx.suggested_vendor_id = request.report.vendor.as_ref().map(|v| v.listing_id.clone());
        self.ctx.diagnosis = Some(request.report.clone());
        self.refresh();
        Ok(Some(DiagnosisOutcome {
            image: request.image,
            report: request.report,
            notice: format!(
                "AI automatically added an \"{}\" task to your planner!",
                task.title
            ),
            task,
        }))
    }

    // === Chat ===

    pub fn start_chat(&mut self, message: &str) -> Result<PendingFlow<ChatExchange>> {
        self.require_session()?;
        let question = message.trim();
        if question.is_empty() {
            return Err(Error::InvalidInput("Message cannot be empty".to_string()));
        }
        self.chat.push_user(question);
        let field = self.state().current_field();
        let exchange = ChatExchange {
            field: field.map(|f| f.name.clone()),
            question: question.to_string(),
            reply: Some(respond(question, field)),
        };
        Ok(PendingFlow::new(
            FlowKind::Chat,
            self.latency.chat,
            self.navigator.token(),
            exchange,
        ))
    }

    pub fn finish_chat(&mut self, result: FlowResult<ChatExchange>) -> Option<ChatExchange> {
        let exchange = result.into_current()?;
        if let Some(reply) = &exchange.reply {
            self.chat.push_reply(reply);
        }
        Some(exchange)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Priority;
    use crate::test_utils::TestEnv;
    use crate::views::{DashboardView, DiagnosisView, WidgetKind};

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    fn controller(env: &TestEnv) -> PageController {
        PageController::new(env.logged_in_store(), Latency::none())
    }

    fn png() -> ImageUpload {
        ImageUpload::from_bytes("leaf.png", PNG).unwrap()
    }

    #[test]
    fn test_page_from_str() {
        assert_eq!("Tasks".parse::<Page>().unwrap(), Page::Tasks);
        assert!("settings".parse::<Page>().is_err());
        assert_eq!(Page::Diagnosis.next(), Page::Dashboard);
        assert_eq!(Page::Dashboard.previous(), Page::Diagnosis);
    }

    #[test]
    fn test_landing_without_session_is_auth() {
        let env = TestEnv::new();
        let ctl = PageController::new(env.store(), Latency::none());
        assert_eq!(ctl.active(), None);
        assert!(matches!(ctl.screen().view, PageView::Auth(_)));
    }

    #[test]
    fn test_landing_with_session_is_dashboard() {
        let env = TestEnv::new();
        let ctl = controller(&env);
        assert_eq!(ctl.active(), Some(Page::Dashboard));
        assert!(ctl.widgets().is_live("map-container"));
    }

    #[test]
    fn test_navigation_requires_session() {
        let env = TestEnv::new();
        let mut ctl = PageController::new(env.store(), Latency::none());
        assert!(matches!(ctl.navigate(Page::Tasks), Err(Error::NotLoggedIn)));
        assert_eq!(ctl.active(), None);
    }

    #[test]
    fn test_navigation_replaces_widgets() {
        let env = TestEnv::new();
        let mut ctl = controller(&env);
        assert_eq!(ctl.widgets().live_count(), 3);
        ctl.navigate(Page::Financials).unwrap();
        assert!(!ctl.widgets().is_live("map-container"));
        assert!(ctl.widgets().is_live("cash-flow-chart"));
        assert!(ctl.widgets().live().all(|w| w.kind == WidgetKind::Chart));
        ctl.navigate(Page::Tasks).unwrap();
        assert_eq!(ctl.widgets().live_count(), 0);
    }

    #[test]
    fn test_context_switch_rerenders_active_page() {
        let env = TestEnv::new();
        let mut ctl = controller(&env);
        ctl.navigate(Page::Tasks).unwrap();
        let epoch = ctl.epoch();
        ctl.switch_field("poultry-coop-1").unwrap();
        assert_eq!(ctl.active(), Some(Page::Tasks));
        assert!(ctl.epoch() > epoch);
        let PageView::Tasks(view) = ctl.screen().view else {
            panic!("expected tasks page");
        };
        assert!(view.tasks.iter().all(|t| t.title == "Vaccinate Broilers"));
    }

    #[test]
    fn test_mutation_rerenders_without_cancelling() {
        let env = TestEnv::new();
        let mut ctl = controller(&env);
        ctl.navigate(Page::Tasks).unwrap();
        let epoch = ctl.epoch();
        ctl.toggle_task(1).unwrap();
        assert_eq!(ctl.epoch(), epoch);
        assert!(ctl.state().task(1).unwrap().completed);
    }

    #[test]
    fn test_log_out_returns_to_auth() {
        let env = TestEnv::new();
        let mut ctl = controller(&env);
        ctl.log_out().unwrap();
        assert_eq!(ctl.active(), None);
        assert_eq!(ctl.widgets().live_count(), 0);
        assert!(ctl.navigate(Page::Dashboard).is_err());
    }

    #[test]
    fn test_login_validation_happens_up_front() {
        let env = TestEnv::new();
        let mut ctl = PageController::new(env.store(), Latency::none());
        assert!(ctl.start_login("Jane", "jane@farm.com", "short").is_err());
        assert!(ctl.start_login("Jane", " ", "long-enough").is_err());
    }

    #[tokio::test]
    async fn test_login_lands_on_dashboard() {
        let env = TestEnv::new();
        let mut ctl = PageController::new(env.store(), Latency::none());
        let flow = ctl.start_login("", "jane@farm.com", "123456").unwrap();
        let screen = ctl.finish_login(flow.run().await).unwrap().unwrap();
        assert_eq!(screen.active, Some(Page::Dashboard));
        assert_eq!(ctl.state().session.user_name, "New User");
        assert!(matches!(screen.view, PageView::Dashboard(DashboardView::Field(_))));
    }

    #[tokio::test]
    async fn test_diagnosis_adds_recommended_task() {
        let env = TestEnv::new();
        let mut ctl = controller(&env);
        ctl.navigate(Page::Diagnosis).unwrap();
        let before = ctl.state().tasks.len();

        let flow = ctl.start_diagnosis(png()).unwrap();
        assert!(matches!(
            ctl.screen().view,
            PageView::Diagnosis(DiagnosisView::Analyzing)
        ));
        let outcome = ctl.finish_diagnosis(flow.run().await).unwrap().unwrap();

        assert_eq!(ctl.state().tasks.len(), before + 1);
        assert!(outcome.task.recommended);
        assert_eq!(outcome.task.priority, Priority::High);
        assert_eq!(outcome.task.field_id, "maize-field-1");
        assert!(matches!(
            ctl.screen().view,
            PageView::Diagnosis(DiagnosisView::Result(_))
        ));
        assert_eq!(ctl.context().suggested_vendor_id.as_deref(), Some("list-1"));
    }

    #[tokio::test]
    async fn test_navigation_cancels_pending_diagnosis() {
        let env = TestEnv::new();
        let mut ctl = controller(&env);
        ctl.navigate(Page::Diagnosis).unwrap();
        let before = ctl.state().tasks.len();

        let flow = ctl.start_diagnosis(png()).unwrap();
        ctl.navigate(Page::Dashboard).unwrap();
        let result = flow.run().await;
        assert!(matches!(result, FlowResult::Cancelled(FlowKind::Diagnosis)));
        assert!(ctl.finish_diagnosis(result).unwrap().is_none());
        assert_eq!(ctl.state().tasks.len(), before);
    }

    #[tokio::test]
    async fn test_stale_completion_is_discarded() {
        let env = TestEnv::new();
        let mut ctl = controller(&env);
        ctl.navigate(Page::Diagnosis).unwrap();
        let before = ctl.state().tasks.len();

        let flow = ctl.start_diagnosis(png()).unwrap();
        let result = flow.run().await;
        ctl.navigate(Page::Tasks).unwrap();
        assert!(ctl.finish_diagnosis(result).unwrap().is_none());
        assert_eq!(ctl.state().tasks.len(), before);
    }

    #[tokio::test]
    async fn test_chat_round_trip() {
        let env = TestEnv::new();
        let mut ctl = controller(&env);
        let flow = ctl.start_chat("when should I water?").unwrap();
        assert!(ctl.chat().typing);
        let exchange = ctl.finish_chat(flow.run().await).unwrap();
        assert!(exchange.reply.unwrap().contains("Maize Field 1"));
        assert_eq!(ctl.chat().messages.len(), 2);
        assert!(ctl.start_chat("   ").is_err());
    }

    #[tokio::test]
    async fn test_marketplace_search_applies_query() {
        let env = TestEnv::new();
        let mut ctl = controller(&env);
        ctl.navigate(Page::Marketplace).unwrap();
        let flow = ctl
            .start_marketplace_search(MarketplaceQuery::new(Some("fertilizer"), None))
            .unwrap();
        assert!(ctl.finish_marketplace_search(flow.run().await));
        let PageView::Marketplace(view) = ctl.screen().view else {
            panic!("expected marketplace page");
        };
        assert_eq!(view.listings.len(), 1);
        assert_eq!(view.listings[0].id, "list-2");
    }

    #[test]
    fn test_moisture_layer_notice() {
        let env = TestEnv::new();
        let mut ctl = controller(&env);
        assert!(ctl.set_map_layer(MapLayer::Moisture).is_some());
        assert!(ctl.set_map_layer(MapLayer::Default).is_none());
        assert!(ctl.widgets().is_live("map-container"));
    }
}
