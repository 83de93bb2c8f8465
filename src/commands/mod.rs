//! Command implementations for the AgriPulse CLI.
//!
//! Each command drives a [`PageController`] (or the config file) and
//! returns a result type implementing [`Output`], so `main` can print it as
//! JSON or as human-readable text. Commands that wait on a simulated flow
//! are `async` and run on the caller's runtime.

use crate::chat::ChatExchange;
use crate::config::{
    self, AgriConfig, ConfigKey, ConfigOverrides, OutputFormat, ValueSource, resolve_config,
};
use crate::controller::{DiagnosisOutcome, Page, PageController};
use crate::flows::ImageUpload;
use crate::models::{MarketplaceListing, Priority, Task, Theme};
use crate::scenario::{FertilizerTier, ScenarioInputs};
use crate::state::{FieldSwitch, NewListing, NewTask};
use crate::views::diagnosis::{ShareReceipt, ShareTarget, share};
use crate::views::marketplace::{ContactCard, contact_card};
use crate::views::tasks::{InventoryCard, InventoryTable, inventory_overview, inventory_table};
use crate::views::{
    MapLayer, MarketplaceQuery, MarketplaceView, PageView, PlanningView, Screen, SelectorOption,
    TasksView, context_selector,
};
use crate::{Error, Result};
use serde::Serialize;
use std::path::Path;

/// Command results that can be serialized to JSON or formatted for humans.
pub trait Output {
    /// Serialize to JSON string.
    fn to_json(&self) -> String;

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}

// === Session ===

#[derive(Serialize)]
pub struct LoginResult {
    pub user_name: String,
    pub user_email: String,
    pub landing: Page,
}

impl Output for LoginResult {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        format!(
            "Signed in as {} <{}>. Opened the {}.",
            self.user_name,
            self.user_email,
            self.landing.title()
        )
    }
}

/// Sign in and land on the dashboard.
pub async fn login(
    ctl: &mut PageController,
    name: &str,
    email: &str,
    password: &str,
) -> Result<LoginResult> {
    let flow = ctl.start_login(name, email, password)?;
    let screen = ctl
        .finish_login(flow.run().await)?
        .ok_or_else(|| Error::Cancelled("sign-in".to_string()))?;
    let session = &ctl.state().session;
    Ok(LoginResult {
        user_name: session.user_name.clone(),
        user_email: session.user_email.clone(),
        landing: screen.active.unwrap_or(Page::Dashboard),
    })
}

#[derive(Serialize)]
pub struct LogoutResult {
    pub logged_out: bool,
    /// Email kept to prefill the next sign-in
    pub remembered_email: String,
}

impl Output for LogoutResult {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        "Signed out.".to_string()
    }
}

pub fn logout(ctl: &mut PageController) -> Result<LogoutResult> {
    ctl.log_out()?;
    Ok(LogoutResult {
        logged_out: true,
        remembered_email: ctl.state().session.user_email.clone(),
    })
}

#[derive(Serialize)]
pub struct WhoamiResult {
    pub logged_in: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
    pub current_field_id: String,
    pub theme: Theme,
}

impl Output for WhoamiResult {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        match (&self.user_name, &self.user_email) {
            (Some(name), Some(email)) if self.logged_in => format!(
                "{} <{}>\nField: {}\nTheme: {}",
                name, email, self.current_field_id, self.theme
            ),
            _ => "Not signed in.".to_string(),
        }
    }
}

pub fn whoami(ctl: &PageController) -> WhoamiResult {
    let state = ctl.state();
    let session = &state.session;
    WhoamiResult {
        logged_in: session.logged_in,
        user_name: session.logged_in.then(|| session.user_name.clone()),
        user_email: session.logged_in.then(|| session.user_email.clone()),
        current_field_id: state.current_field_id.clone(),
        theme: state.theme,
    }
}

// === Pages ===

#[derive(Serialize)]
pub struct OpenResult {
    #[serde(flatten)]
    pub screen: Screen,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

impl Output for OpenResult {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        match &self.notice {
            Some(notice) => format!("{}\n\n{}", notice, self.screen.to_human()),
            None => self.screen.to_human(),
        }
    }
}

/// Navigate to `page`, optionally switching the dashboard map overlay.
pub fn open(ctl: &mut PageController, page: Page, layer: Option<MapLayer>) -> Result<OpenResult> {
    ctl.navigate(page)?;
    let notice = layer
        .and_then(|layer| ctl.set_map_layer(layer))
        .map(str::to_string);
    Ok(OpenResult {
        screen: ctl.screen(),
        notice,
    })
}

// === Field context ===

#[derive(Serialize)]
pub struct FieldList {
    pub current_field_id: String,
    pub options: Vec<SelectorOption>,
}

impl Output for FieldList {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        self.options
            .iter()
            .map(|o| {
                format!(
                    "{} {:<16} {}",
                    if o.selected { "*" } else { " " },
                    o.value,
                    o.label
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub fn field_list(ctl: &PageController) -> FieldList {
    FieldList {
        current_field_id: ctl.state().current_field_id.clone(),
        options: context_selector(ctl.state()),
    }
}

#[derive(Serialize)]
pub struct FieldSwitched {
    #[serde(flatten)]
    pub switch: FieldSwitch,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_name: Option<String>,
}

impl Output for FieldSwitched {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        let name = self.field_name.as_deref().unwrap_or("no field");
        if self.switch.fell_back {
            format!(
                "Field {} not found. Switched to {} ({})",
                self.switch.requested, self.switch.current_field_id, name
            )
        } else {
            format!("Switched to {} ({})", self.switch.current_field_id, name)
        }
    }
}

pub fn field_switch(ctl: &mut PageController, id: &str) -> Result<FieldSwitched> {
    let switch = ctl.switch_field(id)?;
    Ok(FieldSwitched {
        field_name: ctl.state().current_field().map(|f| f.name.clone()),
        switch,
    })
}

// === Tasks ===

fn tasks_view(ctl: &PageController) -> Result<TasksView> {
    match ctl.screen().view {
        PageView::Tasks(view) => Ok(view),
        _ => Err(Error::Other("Tasks page did not render".to_string())),
    }
}

/// Tasks for the current field.
pub fn task_list(ctl: &mut PageController) -> Result<TasksView> {
    ctl.navigate(Page::Tasks)?;
    tasks_view(ctl)
}

#[derive(Serialize)]
pub struct TaskAdded {
    #[serde(flatten)]
    pub task: Task,
}

impl Output for TaskAdded {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        format!(
            "Added task {}: {} (due {}, {} priority)",
            self.task.id,
            self.task.title,
            self.task.date,
            self.task.priority.label()
        )
    }
}

pub fn task_add(
    ctl: &mut PageController,
    title: &str,
    date: &str,
    priority: Priority,
) -> Result<TaskAdded> {
    let task = ctl.add_task(NewTask {
        title: title.to_string(),
        date: date.to_string(),
        priority,
    })?;
    Ok(TaskAdded { task })
}

#[derive(Serialize)]
pub struct TaskToggled {
    pub id: u64,
    pub title: String,
    pub completed: bool,
}

impl Output for TaskToggled {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        let state = if self.completed { "done" } else { "open" };
        format!("Task {} ({}) is now {}", self.id, self.title, state)
    }
}

pub fn task_toggle(ctl: &mut PageController, id: u64) -> Result<TaskToggled> {
    ctl.toggle_task(id)?;
    let task = ctl
        .state()
        .task(id)
        .ok_or_else(|| Error::NotFound(format!("Task not found: {}", id)))?;
    Ok(TaskToggled {
        id,
        title: task.title.clone(),
        completed: task.completed,
    })
}

#[derive(Serialize)]
pub struct TaskDeleted {
    pub id: u64,
    pub deleted: bool,
}

impl Output for TaskDeleted {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        format!("Deleted task {}", self.id)
    }
}

pub fn task_delete(ctl: &mut PageController, id: u64) -> Result<TaskDeleted> {
    ctl.delete_task(id)?;
    Ok(TaskDeleted { id, deleted: true })
}

// === Inventory ===

#[derive(Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum InventoryResult {
    Overview { items: Vec<InventoryCard> },
    Table(InventoryTable),
}

impl Output for InventoryResult {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        match self {
            InventoryResult::Overview { items } => items
                .iter()
                .map(InventoryCard::to_line)
                .collect::<Vec<_>>()
                .join("\n"),
            InventoryResult::Table(table) => table.to_human(),
        }
    }
}

pub fn inventory(ctl: &mut PageController, all: bool) -> Result<InventoryResult> {
    ctl.navigate(Page::Tasks)?;
    let items = &ctl.state().inventory;
    Ok(if all {
        InventoryResult::Table(inventory_table(items))
    } else {
        InventoryResult::Overview {
            items: inventory_overview(items),
        }
    })
}

// === Marketplace ===

/// Browse the marketplace with a filter, waiting out the search delay.
pub async fn market_list(
    ctl: &mut PageController,
    category: Option<&str>,
    search: Option<&str>,
) -> Result<MarketplaceView> {
    ctl.navigate(Page::Marketplace)?;
    let flow = ctl.start_marketplace_search(MarketplaceQuery::new(category, search))?;
    if !ctl.finish_marketplace_search(flow.run().await) {
        return Err(Error::Cancelled("marketplace search".to_string()));
    }
    match ctl.screen().view {
        PageView::Marketplace(view) => Ok(view),
        _ => Err(Error::Other("Marketplace page did not render".to_string())),
    }
}

#[derive(Serialize)]
pub struct ListingPosted {
    #[serde(flatten)]
    pub listing: MarketplaceListing,
}

impl Output for ListingPosted {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        format!(
            "Your listing \"{}\" has been posted successfully! (id {})",
            self.listing.title, self.listing.id
        )
    }
}

pub fn market_post(
    ctl: &mut PageController,
    title: &str,
    price: u64,
    category: &str,
    description: &str,
) -> Result<ListingPosted> {
    let listing = ctl.post_listing(NewListing {
        title: title.to_string(),
        price,
        category: category.to_string(),
        description: description.to_string(),
    })?;
    Ok(ListingPosted { listing })
}

pub fn market_contact(ctl: &mut PageController, id: &str) -> Result<ContactCard> {
    ctl.navigate(Page::Marketplace)?;
    let listing = ctl
        .state()
        .listing(id)
        .ok_or_else(|| Error::NotFound(format!("Listing not found: {}", id)))?;
    Ok(contact_card(listing))
}

// === Planner ===

pub fn plan(
    ctl: &mut PageController,
    rainfall: f64,
    fertilizer: FertilizerTier,
    pest_pressure: f64,
) -> Result<PlanningView> {
    ctl.navigate(Page::Planning)?;
    ctl.set_scenario(ScenarioInputs {
        rainfall,
        fertilizer,
        pest_pressure,
    });
    match ctl.screen().view {
        PageView::Planning(view) => Ok(view),
        _ => Err(Error::Other("Planner page did not render".to_string())),
    }
}

// === Crop doctor ===

#[derive(Serialize)]
pub struct DiagnosisResult {
    #[serde(flatten)]
    pub outcome: DiagnosisOutcome,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub shares: Vec<ShareReceipt>,
}

impl Output for DiagnosisResult {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        let mut lines = vec![
            format!(
                "Analyzed {} ({})",
                self.outcome.image.name,
                self.outcome.image.format.mime()
            ),
            self.outcome.report.to_human(),
            String::new(),
            self.outcome.notice.clone(),
        ];
        for receipt in &self.shares {
            lines.push(receipt.to_human());
        }
        lines.join("\n")
    }
}

/// Upload `image`, wait for the diagnosis and optionally share the report.
pub async fn diagnose(
    ctl: &mut PageController,
    image: &Path,
    share_email: Option<&str>,
    share_whatsapp: Option<&str>,
) -> Result<DiagnosisResult> {
    let upload = ImageUpload::from_path(image)?;
    ctl.navigate(Page::Diagnosis)?;
    let flow = ctl.start_diagnosis(upload)?;
    let outcome = ctl
        .finish_diagnosis(flow.run().await)?
        .ok_or_else(|| Error::Cancelled("diagnosis".to_string()))?;

    let mut targets = Vec::new();
    if let Some(address) = share_email {
        targets.push(ShareTarget::Email(address.to_string()));
    }
    if let Some(number) = share_whatsapp {
        targets.push(ShareTarget::WhatsApp(number.to_string()));
    }
    let shares = targets
        .iter()
        .map(|target| share(&outcome.report, target))
        .collect();

    Ok(DiagnosisResult { outcome, shares })
}

// === Chat ===

pub async fn chat(ctl: &mut PageController, message: &str) -> Result<ChatExchange> {
    let flow = ctl.start_chat(message)?;
    ctl.finish_chat(flow.run().await)
        .ok_or_else(|| Error::Cancelled("chat".to_string()))
}

// === Theme ===

#[derive(Serialize)]
pub struct ThemeResult {
    pub theme: Theme,
    pub changed: bool,
}

impl Output for ThemeResult {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        if self.changed {
            format!("Theme set to {}", self.theme)
        } else {
            format!("Theme: {}", self.theme)
        }
    }
}

pub fn theme_show(ctl: &PageController) -> ThemeResult {
    ThemeResult {
        theme: ctl.state().theme,
        changed: false,
    }
}

pub fn theme_set(ctl: &mut PageController, name: &str) -> Result<ThemeResult> {
    let theme = Theme::parse(name).ok_or_else(|| {
        Error::InvalidInput(format!(
            "Invalid theme: {}. Valid values: green, blue, earth",
            name
        ))
    })?;
    ctl.set_theme(theme)?;
    Ok(ThemeResult {
        theme,
        changed: true,
    })
}

// === Config ===

#[derive(Serialize)]
pub struct ConfigValue {
    pub key: String,
    pub value: Option<String>,
    pub source: ValueSource,
}

impl Output for ConfigValue {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        format!(
            "{} = {} ({})",
            self.key,
            self.value.as_deref().unwrap_or("(unset)"),
            self.source
        )
    }
}

#[derive(Serialize)]
pub struct ConfigList {
    pub path: String,
    pub values: Vec<ConfigValue>,
}

impl Output for ConfigList {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        let mut lines = vec![format!("# {}", self.path)];
        lines.extend(self.values.iter().map(ConfigValue::to_human));
        lines.join("\n")
    }
}

fn parse_key(key: &str) -> Result<ConfigKey> {
    ConfigKey::parse(key).ok_or_else(|| {
        let valid: Vec<&str> = ConfigKey::all().iter().map(|k| k.as_str()).collect();
        Error::InvalidInput(format!(
            "Unknown config key: {}. Valid keys: {}",
            key,
            valid.join(", ")
        ))
    })
}

/// Effective value of `key` after applying overrides to the config file.
fn effective(file: &AgriConfig, overrides: &ConfigOverrides, key: ConfigKey) -> ConfigValue {
    let resolved = resolve_config(file, overrides);
    let (value, source) = match key {
        ConfigKey::DefaultTheme => (
            Some(resolved.default_theme.value.as_str().to_string()),
            resolved.default_theme.source,
        ),
        ConfigKey::OutputFormat => (
            Some(resolved.output_format.value.as_str().to_string()),
            resolved.output_format.source,
        ),
        ConfigKey::LatencyMs => (
            resolved.latency_ms.value.map(|ms| ms.to_string()),
            resolved.latency_ms.source,
        ),
    };
    ConfigValue {
        key: key.as_str().to_string(),
        value,
        source,
    }
}

pub fn config_get(data_dir: &Path, overrides: &ConfigOverrides, key: &str) -> Result<ConfigValue> {
    let key = parse_key(key)?;
    let file = config::load_config(data_dir)?;
    Ok(effective(&file, overrides, key))
}

pub fn config_set(data_dir: &Path, key: &str, value: &str) -> Result<ConfigValue> {
    let key = parse_key(key)?;
    let mut file = config::load_config(data_dir)?;
    file.set(key, value).map_err(Error::InvalidInput)?;
    config::save_config(data_dir, &file)?;
    Ok(ConfigValue {
        key: key.as_str().to_string(),
        value: file.get(key),
        source: ValueSource::Config,
    })
}

pub fn config_unset(data_dir: &Path, key: &str) -> Result<ConfigValue> {
    let key = parse_key(key)?;
    let mut file = config::load_config(data_dir)?;
    file.unset(key);
    config::save_config(data_dir, &file)?;
    Ok(effective(&file, &ConfigOverrides::new(), key))
}

pub fn config_list(data_dir: &Path, overrides: &ConfigOverrides) -> Result<ConfigList> {
    let file = config::load_config(data_dir)?;
    Ok(ConfigList {
        path: config::config_path(data_dir).display().to_string(),
        values: ConfigKey::all()
            .iter()
            .map(|key| effective(&file, overrides, *key))
            .collect(),
    })
}

/// CLI overrides derived from global flags.
pub fn overrides_from_flags(human: bool, latency_ms: Option<u64>) -> ConfigOverrides {
    let mut overrides = ConfigOverrides::new();
    if human {
        overrides = overrides.with_output_format(OutputFormat::Human);
    }
    if let Some(ms) = latency_ms {
        overrides = overrides.with_latency_ms(ms);
    }
    overrides
}

// === Maintenance ===

#[derive(Serialize)]
pub struct ResetResult {
    pub reset: bool,
    pub location: String,
}

impl Output for ResetResult {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        format!("Reset all data in {} to the seed state.", self.location)
    }
}

/// Restore seed data. Refuses unless `force` is set.
pub fn reset(ctl: PageController, force: bool) -> Result<(ResetResult, PageController)> {
    if !force {
        return Err(Error::InvalidInput(
            "Refusing to reset without --force".to_string(),
        ));
    }
    let latency = ctl.latency();
    let mut store = ctl.into_store();
    store.reset()?;
    let location = store.storage().location();
    Ok((
        ResetResult {
            reset: true,
            location,
        },
        PageController::new(store, latency),
    ))
}
