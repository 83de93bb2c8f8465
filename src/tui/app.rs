//! TUI Application - main event loop and terminal management
//!
//! The dashboard is a [`PageController`] driven by the keyboard. Every key
//! maps onto a controller operation, after which the active page is
//! re-rendered. Marketplace searches wait out their simulated delay while
//! the event loop keeps handling keys; navigating away cancels them.

use std::future::Future;
use std::io::{self, stdout};
use std::pin::Pin;
use std::time::Duration;

use crossterm::{
    ExecutableCommand,
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, ListState, Paragraph, Tabs},
};

use super::notifications::NotificationManager;
use super::pages::{render_view, theme_color};
use crate::controller::{Page, PageController};
use crate::flows::FlowResult;
use crate::models::Theme;
use crate::scenario::ScenarioInputs;
use crate::views::marketplace::contact_card;
use crate::views::{MarketplaceQuery, PageView, Screen};

const TICK: Duration = Duration::from_millis(100);

const RAINFALL_STEP: f64 = 5.0;
const PEST_STEP: f64 = 1.0;

type SearchFlow = Pin<Box<dyn Future<Output = FlowResult<MarketplaceQuery>>>>;

pub struct TuiApp {
    controller: PageController,
    /// Last rendered screen
    screen: Screen,
    notifications: NotificationManager,
    /// Selected row on list pages
    selection: ListState,
    pending_search: Option<SearchFlow>,
    should_quit: bool,
}

impl TuiApp {
    pub fn new(controller: PageController) -> Self {
        let screen = controller.screen();
        let mut selection = ListState::default();
        selection.select(Some(0));
        let mut notifications = NotificationManager::new();
        let critical = controller.state().critical_inventory();
        if !critical.is_empty() {
            let names: Vec<&str> = critical.iter().map(|i| i.name.as_str()).collect();
            notifications.warning(format!("Critical stock: {}", names.join(", ")));
        }
        Self {
            controller,
            screen,
            notifications,
            selection,
            pending_search: None,
            should_quit: false,
        }
    }

    fn refresh(&mut self) {
        self.screen = self.controller.screen();
        let len = self.row_count();
        let selected = self.selection.selected().unwrap_or(0);
        self.selection
            .select(if len == 0 { None } else { Some(selected.min(len - 1)) });
    }

    fn row_count(&self) -> usize {
        match &self.screen.view {
            PageView::Tasks(v) => v.tasks.len(),
            PageView::Marketplace(v) => v.listings.len(),
            _ => 0,
        }
    }

    fn report<T>(&mut self, result: crate::Result<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.notifications.error(e.to_string());
                None
            }
        }
    }

    fn navigate(&mut self, page: Page) {
        if self.pending_search.take().is_some() {
            tracing::debug!("Dropping marketplace search on navigation");
        }
        let result = self.controller.navigate(page);
        if self.report(result).is_some() {
            self.selection.select(Some(0));
        }
        self.refresh();
    }

    fn select_next(&mut self) {
        let len = self.row_count();
        if len > 0 {
            let i = self.selection.selected().map_or(0, |i| (i + 1).min(len - 1));
            self.selection.select(Some(i));
        }
    }

    fn select_previous(&mut self) {
        let i = self.selection.selected().unwrap_or(0).saturating_sub(1);
        self.selection.select(Some(i));
    }

    /// Move to the next field in the context selector.
    fn next_field(&mut self) {
        let fields = &self.controller.state().fields;
        if fields.is_empty() {
            return;
        }
        let current = &self.controller.state().current_field_id;
        let index = fields.iter().position(|f| &f.id == current).unwrap_or(0);
        let next = fields[(index + 1) % fields.len()].id.clone();
        let result = self.controller.switch_field(&next);
        if let Some(switch) = self.report(result) {
            self.notifications
                .info(format!("Context: {}", switch.current_field_id));
        }
        self.refresh();
    }

    fn next_theme(&mut self) {
        let themes = Theme::all();
        let current = self.controller.state().theme;
        let index = themes.iter().position(|t| *t == current).unwrap_or(0);
        let result = self.controller.set_theme(themes[(index + 1) % themes.len()]);
        self.report(result);
        self.refresh();
    }

    fn selected_task_id(&self) -> Option<u64> {
        match &self.screen.view {
            PageView::Tasks(v) => self.selection.selected().and_then(|i| v.tasks.get(i)).map(|t| t.id),
            _ => None,
        }
    }

    fn toggle_selected_task(&mut self) {
        if let Some(id) = self.selected_task_id() {
            let result = self.controller.toggle_task(id);
            self.report(result);
            self.refresh();
        }
    }

    fn delete_selected_task(&mut self) {
        if let Some(id) = self.selected_task_id() {
            let result = self.controller.delete_task(id);
            if self.report(result).is_some() {
                self.notifications.success(format!("Deleted task {}", id));
            }
            self.refresh();
        }
    }

    fn toggle_map_layer(&mut self) {
        let layer = self.controller.context().map_layer.toggled();
        if let Some(notice) = self.controller.set_map_layer(layer) {
            self.notifications.info(notice);
        }
        self.refresh();
    }

    /// Start a search with the next category in the listing set.
    fn next_category(&mut self) {
        let mut categories: Vec<String> = vec!["all".to_string()];
        for listing in &self.controller.state().listings {
            if !categories.contains(&listing.category) {
                categories.push(listing.category.clone());
            }
        }
        let current = &self.controller.context().market_query.category;
        let index = categories.iter().position(|c| c == current).unwrap_or(0);
        let next = categories[(index + 1) % categories.len()].clone();
        let search = self.controller.context().market_query.search.clone();
        let query = MarketplaceQuery::new(Some(next.as_str()), Some(search.as_str()));

        let result = self.controller.start_marketplace_search(query);
        if let Some(flow) = self.report(result) {
            self.notifications.info(format!("Searching {}...", next));
            self.pending_search = Some(Box::pin(flow.run()));
        }
    }

    fn finish_search(&mut self, result: FlowResult<MarketplaceQuery>) {
        if self.controller.finish_marketplace_search(result) {
            self.selection.select(Some(0));
        }
        self.refresh();
    }

    fn show_selected_contact(&mut self) {
        let PageView::Marketplace(view) = &self.screen.view else {
            return;
        };
        let Some(id) = self
            .selection
            .selected()
            .and_then(|i| view.listings.get(i))
            .map(|l| l.id.clone())
        else {
            return;
        };
        if let Some(listing) = self.controller.state().listing(&id) {
            let card = contact_card(listing);
            let mut parts = vec![card.email.clone()];
            parts.extend(card.phone.or(card.no_phone_message));
            parts.extend(card.whatsapp_link);
            self.notifications
                .info(format!("{}: {}", card.seller, parts.join(" | ")));
        }
    }

    fn adjust_scenario(&mut self, change: impl FnOnce(&mut ScenarioInputs)) {
        let mut inputs = self.controller.context().scenario;
        change(&mut inputs);
        self.controller.set_scenario(inputs);
        self.refresh();
    }

    /// Handle keyboard events
    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
                return;
            }
            KeyCode::Char('x') => {
                self.notifications.dismiss_all();
                return;
            }
            _ => {}
        }

        let Some(active) = self.controller.active() else {
            return;
        };

        match key {
            KeyCode::Char(c @ '1'..='6') => {
                let index = c as usize - '1' as usize;
                self.navigate(Page::all()[index]);
            }
            KeyCode::Tab => self.navigate(active.next()),
            KeyCode::BackTab => self.navigate(active.previous()),
            KeyCode::Char('n') => self.next_field(),
            KeyCode::Char('t') => self.next_theme(),
            _ => self.handle_page_key(active, key),
        }
    }

    fn handle_page_key(&mut self, page: Page, key: KeyCode) {
        match (page, key) {
            (Page::Dashboard, KeyCode::Char('m')) => self.toggle_map_layer(),

            (Page::Tasks | Page::Marketplace, KeyCode::Char('j') | KeyCode::Down) => {
                self.select_next()
            }
            (Page::Tasks | Page::Marketplace, KeyCode::Char('k') | KeyCode::Up) => {
                self.select_previous()
            }

            (Page::Tasks, KeyCode::Char(' ') | KeyCode::Enter) => self.toggle_selected_task(),
            (Page::Tasks, KeyCode::Char('d')) => self.delete_selected_task(),

            (Page::Marketplace, KeyCode::Char('c')) => self.next_category(),
            (Page::Marketplace, KeyCode::Enter) => self.show_selected_contact(),

            (Page::Planning, KeyCode::Right) => {
                self.adjust_scenario(|s| s.rainfall += RAINFALL_STEP)
            }
            (Page::Planning, KeyCode::Left) => {
                self.adjust_scenario(|s| s.rainfall -= RAINFALL_STEP)
            }
            (Page::Planning, KeyCode::Up) => {
                self.adjust_scenario(|s| s.pest_pressure += PEST_STEP)
            }
            (Page::Planning, KeyCode::Down) => {
                self.adjust_scenario(|s| s.pest_pressure -= PEST_STEP)
            }
            (Page::Planning, KeyCode::Char('f')) => {
                self.adjust_scenario(|s| s.fertilizer = s.fertilizer.step_up())
            }
            (Page::Planning, KeyCode::Char('F')) => {
                self.adjust_scenario(|s| s.fertilizer = s.fertilizer.step_down())
            }

            _ => {}
        }
    }

    /// Render the UI
    fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let accent = theme_color(self.screen.theme);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Title bar
                Constraint::Min(5),    // Main content
                Constraint::Length(3), // Status bar
            ])
            .split(area);

        self.render_title_bar(frame, chunks[0], accent);
        render_view(frame, chunks[1], &self.screen.view, accent, &mut self.selection);
        self.render_status_bar(frame, chunks[2]);
        self.notifications.render(frame, chunks[1]);
    }

    /// Render the page tabs with the current field and user
    fn render_title_bar(&self, frame: &mut Frame, area: Rect, accent: Color) {
        let field = self
            .screen
            .context
            .iter()
            .find(|o| o.selected)
            .map(|o| o.label.clone())
            .unwrap_or_else(|| "N/A".to_string());
        let user = self
            .screen
            .user
            .as_ref()
            .map(|u| u.name.clone())
            .unwrap_or_else(|| "signed out".to_string());

        let titles: Vec<String> = Page::all()
            .iter()
            .enumerate()
            .map(|(i, p)| format!("[{}] {}", i + 1, p.title()))
            .collect();
        let tabs = Tabs::new(titles)
            .select(self.screen.active.map(|p| p.index()).unwrap_or(0))
            .highlight_style(Style::default().fg(accent).add_modifier(Modifier::BOLD))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" AgriPulse | {} | {} ", field, user)),
            );
        frame.render_widget(tabs, area);
    }

    /// Render the status bar with keybindings
    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let page_keys = match self.screen.active {
            Some(Page::Dashboard) => "m:Map Layer",
            Some(Page::Tasks) => "j/k:Select  Space:Toggle  d:Delete",
            Some(Page::Marketplace) => "j/k:Select  c:Category  Enter:Contact",
            Some(Page::Planning) => "←/→:Rainfall  ↑/↓:Pests  f/F:Fertilizer",
            Some(Page::Financials) | Some(Page::Diagnosis) => "",
            None => "Sign in with `ap login` first",
        };
        let mut text = format!(" Tab/1-6:Page  n:Field  t:Theme  {}  q:Quit", page_keys);
        if self.pending_search.is_some() {
            text.push_str("  (searching...)");
        }
        let overflow = self.notifications.overflow_count();
        if overflow > 0 {
            text.push_str(&format!("  +{} notices (x:dismiss)", overflow));
        }
        let status = Paragraph::new(text)
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(status, area);
    }
}

/// Resolve once the pending search finishes, or never when there is none.
async fn next_search(pending: &mut Option<SearchFlow>) -> FlowResult<MarketplaceQuery> {
    match pending.as_mut() {
        Some(flow) => flow.await,
        None => std::future::pending().await,
    }
}

/// Setup the terminal for TUI mode
fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout());
    Terminal::new(backend)
}

/// Restore the terminal to normal mode
fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

async fn event_loop(
    app: &mut TuiApp,
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
) -> io::Result<()> {
    loop {
        app.notifications.tick();
        terminal.draw(|f| app.render(f))?;

        tokio::select! {
            _ = tokio::time::sleep(TICK) => {
                if event::poll(Duration::from_millis(0))? {
                    if let Event::Key(key) = event::read()? {
                        if key.kind == KeyEventKind::Press {
                            app.handle_key(key.code);
                        }
                    }
                }
            }
            result = next_search(&mut app.pending_search) => {
                app.pending_search = None;
                app.finish_search(result);
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

/// Run the terminal dashboard until the user quits.
pub fn run_tui(controller: PageController) -> crate::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    let mut app = TuiApp::new(controller);

    let mut terminal = setup_terminal()?;
    let result = runtime.block_on(event_loop(&mut app, &mut terminal));
    restore_terminal()?;
    result?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flows::Latency;
    use crate::state::Store;
    use crate::tui::notifications::NotificationLevel;
    use crate::storage::Storage;

    fn app() -> TuiApp {
        let mut store = Store::open(Storage::in_memory());
        store
            .log_in("John Farmer", "john@agrifarm.com", "secret-pass")
            .unwrap();
        TuiApp::new(PageController::new(store, Latency::none()))
    }

    #[test]
    fn test_number_keys_switch_pages() {
        let mut app = app();
        app.handle_key(KeyCode::Char('4'));
        assert_eq!(app.screen.active, Some(Page::Tasks));
        app.handle_key(KeyCode::Tab);
        assert_eq!(app.screen.active, Some(Page::Planning));
    }

    #[test]
    fn test_space_toggles_selected_task() {
        let mut app = app();
        app.handle_key(KeyCode::Char('4'));
        let id = app.selected_task_id().unwrap();
        app.handle_key(KeyCode::Char(' '));
        assert!(app.controller.state().task(id).unwrap().completed);
    }

    #[test]
    fn test_planner_keys_adjust_inputs() {
        let mut app = app();
        app.handle_key(KeyCode::Char('5'));
        let before = app.controller.context().scenario.rainfall;
        app.handle_key(KeyCode::Right);
        assert_eq!(app.controller.context().scenario.rainfall, before + RAINFALL_STEP);
    }

    #[test]
    fn test_navigation_drops_pending_search() {
        let mut app = app();
        app.handle_key(KeyCode::Char('3'));
        app.handle_key(KeyCode::Char('c'));
        assert!(app.pending_search.is_some());
        app.handle_key(KeyCode::Char('1'));
        assert!(app.pending_search.is_none());
    }

    #[test]
    fn test_signed_out_ignores_page_keys() {
        let controller = PageController::new(Store::open(Storage::in_memory()), Latency::none());
        let mut app = TuiApp::new(controller);
        app.handle_key(KeyCode::Char('2'));
        assert_eq!(app.screen.active, None);
        app.handle_key(KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn test_startup_warns_about_critical_stock() {
        let mut storage = Storage::in_memory();
        let mut inventory = crate::models::seed::default_inventory();
        inventory[2].quantity = 10.0;
        storage
            .save(crate::storage::StorageKey::FarmInventory, &inventory)
            .unwrap();
        let app = TuiApp::new(PageController::new(Store::open(storage), Latency::none()));
        let toast = app.notifications.visible().next().unwrap();
        assert_eq!(toast.level, NotificationLevel::Warning);
        assert!(toast.message.contains("Diesel"));
    }

    #[test]
    fn test_healthy_stock_starts_quietly() {
        let app = app();
        assert_eq!(app.notifications.visible().count(), 0);
    }
}
