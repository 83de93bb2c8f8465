//! Application state and its mutation API.
//!
//! `AppState` is the in-memory mirror of the persisted slots. It is never
//! mutated directly by callers: every change goes through [`Store`], which
//! applies the change, writes the affected slots back to [`Storage`] and
//! reports which slices changed so the page controller can re-render.

use crate::models::{
    AuthSession, Field, InventoryItem, MarketplaceListing, Priority, Task, Theme, seed,
};
use crate::storage::{Storage, StorageKey, generate_id};
use crate::{Error, Result};
use chrono::{NaiveDate, Utc};
use serde::Serialize;

/// Minimum password length accepted by the sign-in form.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Name used when the sign-up form leaves it blank.
pub const DEFAULT_USER_NAME: &str = "New User";

/// Pseudo field id the context selector uses for its "manage" entry.
pub const MANAGE_FIELDS_ID: &str = "manage-fields";

/// Contact details attached to listings posted from this dashboard.
const POSTER_WHATSAPP: &str = "+254701234567";
const POSTER_PHONE: &str = "0712345678";
const POSTER_IMAGE: &str = "https://via.placeholder.com/400x200?text=New+Listing";

/// A persisted slice of application state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Slice {
    Fields,
    CurrentField,
    Listings,
    Tasks,
    Inventory,
    Session,
    Theme,
}

/// Report of a completed mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Mutation {
    /// Slices that were changed and persisted
    pub slices: Vec<Slice>,
}

impl Mutation {
    fn of(slices: &[Slice]) -> Self {
        Self {
            slices: slices.to_vec(),
        }
    }

    pub fn touches(&self, slice: Slice) -> bool {
        self.slices.contains(&slice)
    }
}

/// In-memory application state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppState {
    pub fields: Vec<Field>,
    pub current_field_id: String,
    pub tasks: Vec<Task>,
    pub inventory: Vec<InventoryItem>,
    pub listings: Vec<MarketplaceListing>,
    pub session: AuthSession,
    pub theme: Theme,
}

impl Default for AppState {
    fn default() -> Self {
        let fields = seed::default_fields();
        let current_field_id = fields.first().map(|f| f.id.clone()).unwrap_or_default();
        Self {
            fields,
            current_field_id,
            tasks: seed::default_tasks(),
            inventory: seed::default_inventory(),
            listings: seed::default_listings(),
            session: AuthSession::default(),
            theme: Theme::default(),
        }
    }
}

impl AppState {
    /// Restore every slice from storage, using seed data for absent slots.
    pub fn load(storage: &mut Storage, default_theme: Theme) -> Self {
        let fields: Vec<Field> = storage.load(StorageKey::UserFields, seed::default_fields());
        let tasks: Vec<Task> = storage.load(StorageKey::FarmTasks, seed::default_tasks());
        let inventory: Vec<InventoryItem> =
            storage.load(StorageKey::FarmInventory, seed::default_inventory());
        let listings: Vec<MarketplaceListing> =
            storage.load(StorageKey::MarketplaceListings, seed::default_listings());

        let stored_field_id = storage
            .load_string(StorageKey::CurrentFieldId)
            .filter(|id| !id.trim().is_empty());

        let logged_in_flag = storage
            .load_string(StorageKey::LoggedIn)
            .is_some_and(|v| v.trim() == "true");
        let user_name = storage
            .load_string(StorageKey::UserName)
            .unwrap_or_default();
        let user_email = storage
            .load_string(StorageKey::UserEmail)
            .unwrap_or_default();

        let theme = match storage.load_string(StorageKey::Theme) {
            Some(raw) => Theme::parse(&raw).unwrap_or_else(|| {
                tracing::warn!("Unknown stored theme {:?}, using {}", raw, default_theme);
                default_theme
            }),
            None => default_theme,
        };

        let mut state = Self {
            fields,
            current_field_id: stored_field_id.unwrap_or_default(),
            tasks,
            inventory,
            listings,
            session: AuthSession {
                logged_in: logged_in_flag && !user_name.is_empty() && !user_email.is_empty(),
                user_name,
                user_email,
            },
            theme,
        };
        state.sanitize_current_field();
        state
    }

    /// Id of the first field, or empty when there are no fields.
    pub fn first_field_id(&self) -> String {
        self.fields.first().map(|f| f.id.clone()).unwrap_or_default()
    }

    pub fn field(&self, id: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// The field the dashboard is currently showing.
    pub fn current_field(&self) -> Option<&Field> {
        self.field(&self.current_field_id)
    }

    /// Inventory items at or below their critical level, in stored order.
    pub fn critical_inventory(&self) -> Vec<&InventoryItem> {
        self.inventory.iter().filter(|i| i.is_critical()).collect()
    }

    pub fn task(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn listing(&self, id: &str) -> Option<&MarketplaceListing> {
        self.listings.iter().find(|l| l.id == id)
    }

    /// Ensure `current_field_id` references an existing field.
    ///
    /// Returns true when the id had to be reset.
    fn sanitize_current_field(&mut self) -> bool {
        if self.field(&self.current_field_id).is_some() {
            return false;
        }
        let first = self.first_field_id();
        if self.current_field_id != first {
            if !self.current_field_id.is_empty() {
                tracing::warn!(
                    "Stored field ID {} not found. Resetting to first field: {}",
                    self.current_field_id,
                    first
                );
            }
            self.current_field_id = first;
            return true;
        }
        false
    }

    /// Next task id: the creation timestamp in milliseconds, bumped past any
    /// existing id so ids stay unique and increasing.
    fn next_task_id(&self) -> u64 {
        let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
        let max = self.tasks.iter().map(|t| t.id).max().unwrap_or(0);
        now.max(max + 1)
    }
}

/// Input for a user-created task.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub date: String,
    pub priority: Priority,
}

/// Input for a new marketplace listing.
#[derive(Debug, Clone)]
pub struct NewListing {
    pub title: String,
    pub price: u64,
    pub category: String,
    pub description: String,
}

/// Outcome of a context switch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSwitch {
    pub requested: String,
    pub current_field_id: String,
    /// True when the requested id did not exist and the first field was used
    pub fell_back: bool,
    #[serde(flatten)]
    pub mutation: Mutation,
}

/// Owner of the application state and its persistence.
#[derive(Debug)]
pub struct Store {
    state: AppState,
    storage: Storage,
}

impl Store {
    /// Load state from `storage` with the default theme.
    pub fn open(storage: Storage) -> Self {
        Self::open_with_theme(storage, Theme::default())
    }

    /// Load state from `storage`, using `default_theme` when none is stored.
    pub fn open_with_theme(mut storage: Storage, default_theme: Theme) -> Self {
        let state = AppState::load(&mut storage, default_theme);
        Self { state, storage }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Give back the storage, e.g. to reopen it.
    pub fn into_storage(self) -> Storage {
        self.storage
    }

    /// Write the given slices to storage.
    pub fn persist(&mut self, slices: &[Slice]) -> Result<()> {
        write_slices(&mut self.storage, &self.state, slices)
    }

    /// Apply `change` to a copy of the state and persist `slices` from it.
    /// The copy replaces the live state only once every write succeeded, so
    /// a failed write leaves memory exactly as it was.
    fn transact<T>(
        &mut self,
        slices: &[Slice],
        change: impl FnOnce(&mut AppState) -> Result<T>,
    ) -> Result<(T, Mutation)> {
        let mut next = self.state.clone();
        let value = change(&mut next)?;
        if let Err(e) = write_slices(&mut self.storage, &next, slices) {
            tracing::warn!("Discarding change to {:?}: {}", slices, e);
            return Err(e);
        }
        self.state = next;
        Ok((value, Mutation::of(slices)))
    }

    // === Tasks ===

    /// Flip a task between complete and incomplete.
    pub fn toggle_task(&mut self, id: u64) -> Result<Mutation> {
        let (completed, mutation) = self.transact(&[Slice::Tasks], |state| {
            let task = state
                .tasks
                .iter_mut()
                .find(|t| t.id == id)
                .ok_or_else(|| Error::NotFound(format!("Task not found: {}", id)))?;
            task.completed = !task.completed;
            Ok(task.completed)
        })?;
        tracing::info!("Task {} completed={}", id, completed);
        Ok(mutation)
    }

    /// Remove a task.
    pub fn delete_task(&mut self, id: u64) -> Result<Mutation> {
        let ((), mutation) = self.transact(&[Slice::Tasks], |state| {
            let before = state.tasks.len();
            state.tasks.retain(|t| t.id != id);
            if state.tasks.len() == before {
                return Err(Error::NotFound(format!("Task not found: {}", id)));
            }
            Ok(())
        })?;
        tracing::info!("Task {} deleted", id);
        Ok(mutation)
    }

    /// Create a task for the current field.
    pub fn add_task(&mut self, new: NewTask) -> Result<(Task, Mutation)> {
        self.push_task(new, false)
    }

    /// Create a system-suggested task for the current field.
    pub fn add_recommended_task(&mut self, new: NewTask) -> Result<(Task, Mutation)> {
        self.push_task(new, true)
    }

    fn push_task(&mut self, new: NewTask, recommended: bool) -> Result<(Task, Mutation)> {
        let title = new.title.trim();
        if title.is_empty() {
            return Err(Error::InvalidInput("Task title cannot be empty".to_string()));
        }
        validate_date(&new.date)?;

        let (task, mutation) = self.transact(&[Slice::Tasks], |state| {
            let field_id = state
                .current_field()
                .map(|f| f.id.clone())
                .ok_or_else(|| Error::NotFound("No field selected".to_string()))?;
            let task = Task {
                id: state.next_task_id(),
                field_id,
                title: title.to_string(),
                date: new.date.clone(),
                priority: new.priority,
                completed: false,
                recommended,
            };
            state.tasks.push(task.clone());
            Ok(task)
        })?;
        tracing::info!("Task {} created for {}", task.id, task.field_id);
        Ok((task, mutation))
    }

    // === Marketplace ===

    /// Post a listing as the signed-in user. New listings go first.
    pub fn post_listing(&mut self, new: NewListing) -> Result<(MarketplaceListing, Mutation)> {
        let title = new.title.trim();
        if title.is_empty() {
            return Err(Error::InvalidInput(
                "Listing title cannot be empty".to_string(),
            ));
        }
        let category = new.category.trim().to_lowercase();
        if category.is_empty() || category == "all" {
            return Err(Error::InvalidInput(format!(
                "Invalid listing category: {:?}",
                new.category
            )));
        }

        let (listing, mutation) = self.transact(&[Slice::Listings], |state| {
            let listing = MarketplaceListing {
                id: generate_id("list", title),
                title: title.to_string(),
                category,
                price: new.price,
                description: new.description.trim().to_string(),
                seller: state.session.user_name.clone(),
                email: state.session.user_email.clone(),
                whatsapp: Some(POSTER_WHATSAPP.to_string()),
                phone: Some(POSTER_PHONE.to_string()),
                img: POSTER_IMAGE.to_string(),
            };
            state.listings.insert(0, listing.clone());
            Ok(listing)
        })?;
        tracing::info!("Listing {} posted by {}", listing.id, listing.seller);
        Ok((listing, mutation))
    }

    // === Context ===

    /// Change the current field. Unknown ids fall back to the first field.
    pub fn switch_field(&mut self, id: &str) -> Result<FieldSwitch> {
        if id == MANAGE_FIELDS_ID {
            return Err(Error::InvalidInput(
                "Managing fields is disabled in this release".to_string(),
            ));
        }
        let (fell_back, mutation) = self.transact(&[Slice::CurrentField], |state| {
            state.current_field_id = id.to_string();
            Ok(state.sanitize_current_field())
        })?;
        tracing::info!("Switched context to {}", self.state.current_field_id);
        Ok(FieldSwitch {
            requested: id.to_string(),
            current_field_id: self.state.current_field_id.clone(),
            fell_back,
            mutation,
        })
    }

    // === Settings ===

    pub fn set_theme(&mut self, theme: Theme) -> Result<Mutation> {
        let ((), mutation) = self.transact(&[Slice::Theme], |state| {
            state.theme = theme;
            Ok(())
        })?;
        Ok(mutation)
    }

    // === Session ===

    /// Sign in. Credentials are not verified; the password only has to pass
    /// the form's length check.
    pub fn log_in(&mut self, name: &str, email: &str, password: &str) -> Result<Mutation> {
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(Error::InvalidInput(format!(
                "Password must be at least {} characters long.",
                MIN_PASSWORD_LEN
            )));
        }
        let email = email.trim();
        if email.is_empty() {
            return Err(Error::InvalidInput("Email address is required".to_string()));
        }
        let name = match name.trim() {
            "" => DEFAULT_USER_NAME,
            n => n,
        };

        let ((), mutation) = self.transact(&[Slice::Session], |state| {
            state.session = AuthSession {
                logged_in: true,
                user_name: name.to_string(),
                user_email: email.to_string(),
            };
            Ok(())
        })?;
        tracing::info!("Signed in as {}", email);
        Ok(mutation)
    }

    /// Sign out. Name and email stay stored for the next sign-in form.
    pub fn log_out(&mut self) -> Result<Mutation> {
        let ((), mutation) = self.transact(&[Slice::Session], |state| {
            state.session.logged_in = false;
            Ok(())
        })?;
        tracing::info!("Signed out");
        Ok(mutation)
    }

    /// Reset every slot back to seed data.
    pub fn reset(&mut self) -> Result<()> {
        let theme = self.state.theme;
        self.storage.clear()?;
        self.state = AppState::load(&mut self.storage, theme);
        Ok(())
    }
}

/// Write `slices` of `state` to `storage`.
fn write_slices(storage: &mut Storage, state: &AppState, slices: &[Slice]) -> Result<()> {
    for slice in slices {
        match slice {
            Slice::Fields => storage.save(StorageKey::UserFields, &state.fields)?,
            Slice::CurrentField => {
                storage.save_string(StorageKey::CurrentFieldId, &state.current_field_id)?
            }
            Slice::Listings => storage.save(StorageKey::MarketplaceListings, &state.listings)?,
            Slice::Tasks => storage.save(StorageKey::FarmTasks, &state.tasks)?,
            Slice::Inventory => storage.save(StorageKey::FarmInventory, &state.inventory)?,
            Slice::Session => {
                let session = &state.session;
                let flag = if session.logged_in { "true" } else { "false" };
                storage.save_string(StorageKey::LoggedIn, flag)?;
                if session.logged_in {
                    storage.save_string(StorageKey::UserName, &session.user_name)?;
                    storage.save_string(StorageKey::UserEmail, &session.user_email)?;
                }
            }
            Slice::Theme => storage.save_string(StorageKey::Theme, state.theme.as_str())?,
        }
    }
    Ok(())
}

/// Validate a `YYYY-MM-DD` due date.
pub fn validate_date(date: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| Error::InvalidInput(format!("Invalid date (expected YYYY-MM-DD): {}", date)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestEnv;

    fn new_task(title: &str, date: &str) -> NewTask {
        NewTask {
            title: title.to_string(),
            date: date.to_string(),
            priority: Priority::Low,
        }
    }

    #[test]
    fn test_fresh_store_uses_seed_data() {
        let env = TestEnv::new();
        let store = env.store();
        let state = store.state();
        assert_eq!(state.fields.len(), 2);
        assert_eq!(state.current_field_id, "maize-field-1");
        assert_eq!(state.tasks.len(), 3);
        assert!(!state.session.logged_in);
        assert_eq!(state.theme, Theme::Green);
    }

    #[test]
    fn test_unknown_stored_field_resets_to_first() {
        let env = TestEnv::new();
        let mut storage = env.storage();
        storage
            .save_string(StorageKey::CurrentFieldId, "deleted-field")
            .unwrap();
        let store = Store::open(storage);
        assert_eq!(store.state().current_field_id, "maize-field-1");
    }

    #[test]
    fn test_empty_field_list_yields_empty_current_id() {
        let env = TestEnv::new();
        let mut storage = env.storage();
        storage
            .save(StorageKey::UserFields, &Vec::<Field>::new())
            .unwrap();
        let store = Store::open(storage);
        assert_eq!(store.state().current_field_id, "");
        assert!(store.state().current_field().is_none());
    }

    #[test]
    fn test_switch_field_to_unknown_falls_back_to_first() {
        let env = TestEnv::new();
        let mut store = env.store();
        store.switch_field("poultry-coop-1").unwrap();
        let switch = store.switch_field("no-such-field").unwrap();
        assert!(switch.fell_back);
        assert_eq!(switch.current_field_id, "maize-field-1");
        assert_eq!(store.state().current_field_id, "maize-field-1");
    }

    #[test]
    fn test_switch_field_persists() {
        let env = TestEnv::new();
        let mut store = env.store();
        let switch = store.switch_field("poultry-coop-1").unwrap();
        assert!(!switch.fell_back);
        assert!(switch.mutation.touches(Slice::CurrentField));

        let reopened = env.store();
        assert_eq!(reopened.state().current_field_id, "poultry-coop-1");
    }

    #[test]
    fn test_manage_fields_is_rejected_without_change() {
        let env = TestEnv::new();
        let mut store = env.store();
        assert!(store.switch_field(MANAGE_FIELDS_ID).is_err());
        assert_eq!(store.state().current_field_id, "maize-field-1");
    }

    #[test]
    fn test_toggle_task_flips_and_persists() {
        let env = TestEnv::new();
        let mut store = env.store();
        store.toggle_task(1).unwrap();
        assert!(store.state().task(1).unwrap().completed);

        let reopened = env.store();
        assert!(reopened.state().task(1).unwrap().completed);
    }

    #[test]
    fn test_toggle_unknown_task_is_not_found() {
        let env = TestEnv::new();
        let mut store = env.store();
        assert!(matches!(store.toggle_task(999), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_delete_task() {
        let env = TestEnv::new();
        let mut store = env.store();
        let mutation = store.delete_task(2).unwrap();
        assert!(mutation.touches(Slice::Tasks));
        assert!(store.state().task(2).is_none());
        assert!(store.delete_task(2).is_err());
    }

    #[test]
    fn test_add_task_attaches_to_current_field() {
        let env = TestEnv::new();
        let mut store = env.store();
        store.switch_field("poultry-coop-1").unwrap();
        let (task, _) = store.add_task(new_task("Clean coop", "2025-11-01")).unwrap();
        assert_eq!(task.field_id, "poultry-coop-1");
        assert!(!task.completed);
        assert!(!task.recommended);
        assert!(task.id > 3);
    }

    #[test]
    fn test_task_ids_are_unique_and_increasing() {
        let env = TestEnv::new();
        let mut store = env.store();
        let (a, _) = store.add_task(new_task("A", "2025-11-01")).unwrap();
        let (b, _) = store.add_task(new_task("B", "2025-11-01")).unwrap();
        assert!(b.id > a.id);
    }

    #[test]
    fn test_add_task_rejects_bad_input() {
        let env = TestEnv::new();
        let mut store = env.store();
        assert!(store.add_task(new_task("  ", "2025-11-01")).is_err());
        assert!(store.add_task(new_task("Spray", "11/01/2025")).is_err());
        assert_eq!(store.state().tasks.len(), 3);
    }

    #[test]
    fn test_recommended_task_is_flagged() {
        let env = TestEnv::new();
        let mut store = env.store();
        let (task, _) = store
            .add_recommended_task(new_task("Apply Fungicide", "2025-11-01"))
            .unwrap();
        assert!(task.recommended);
    }

    #[test]
    fn test_post_listing_prepends_and_persists_order() {
        let env = TestEnv::new();
        let mut store = env.logged_in_store();
        let (listing, _) = store
            .post_listing(NewListing {
                title: "Fresh Eggs (Tray)".to_string(),
                price: 450,
                category: "Produce".to_string(),
                description: "Free range".to_string(),
            })
            .unwrap();
        assert_eq!(store.state().listings[0].id, listing.id);
        assert_eq!(listing.seller, "John Farmer");
        assert_eq!(listing.category, "produce");

        let before: Vec<String> = store.state().listings.iter().map(|l| l.id.clone()).collect();
        let reopened = env.store();
        let after: Vec<String> = reopened
            .state()
            .listings
            .iter()
            .map(|l| l.id.clone())
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_log_in_requires_password_length() {
        let env = TestEnv::new();
        let mut store = env.store();
        assert!(store.log_in("Jane", "jane@farm.com", "12345").is_err());
        assert!(!store.state().session.logged_in);
    }

    #[test]
    fn test_log_in_blank_name_defaults() {
        let env = TestEnv::new();
        let mut store = env.store();
        store.log_in("", "jane@farm.com", "123456").unwrap();
        assert_eq!(store.state().session.user_name, DEFAULT_USER_NAME);
    }

    #[test]
    fn test_session_survives_reload_and_log_out() {
        let env = TestEnv::new();
        {
            let _store = env.logged_in_store();
        }
        let mut store = env.store();
        assert!(store.state().session.logged_in);
        assert_eq!(store.state().session.user_email, "john@agrifarm.com");

        store.log_out().unwrap();
        let reopened = env.store();
        assert!(!reopened.state().session.logged_in);
    }

    #[test]
    fn test_logged_in_flag_without_email_is_not_a_session() {
        let env = TestEnv::new();
        let mut storage = env.storage();
        storage.save_string(StorageKey::LoggedIn, "true").unwrap();
        storage.save_string(StorageKey::UserName, "Ghost").unwrap();
        let store = Store::open(storage);
        assert!(!store.state().session.logged_in);
    }

    #[test]
    fn test_theme_persists() {
        let env = TestEnv::new();
        let mut store = env.store();
        store.set_theme(Theme::Earth).unwrap();
        assert_eq!(env.store().state().theme, Theme::Earth);
    }

    #[test]
    fn test_critical_inventory_matches_comparison() {
        let env = TestEnv::new();
        let store = env.store();
        let critical = store.state().critical_inventory();
        for item in &store.state().inventory {
            let listed = critical.iter().any(|c| c.id == item.id);
            assert_eq!(listed, item.quantity <= item.critical_level);
        }
    }

    #[test]
    fn test_reset_restores_seed() {
        let env = TestEnv::new();
        let mut store = env.store();
        store.delete_task(1).unwrap();
        store.reset().unwrap();
        assert_eq!(store.state().tasks.len(), 3);
    }

    /// Backend that reads nothing and refuses every write.
    struct ReadOnlyBackend;

    impl crate::storage::StorageBackend for ReadOnlyBackend {
        fn read(&self, _key: &str) -> Result<Option<String>> {
            Ok(None)
        }

        fn write(&mut self, key: &str, _value: &str) -> Result<()> {
            Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                format!("{} is read-only", key),
            )))
        }

        fn remove(&mut self, _key: &str) -> Result<()> {
            Ok(())
        }

        fn quarantine(&mut self, _key: &str) -> Result<Option<String>> {
            Ok(None)
        }

        fn location(&self) -> String {
            "read-only".to_string()
        }

        fn backend_type(&self) -> &'static str {
            "read-only"
        }
    }

    fn read_only_store() -> Store {
        Store::open(Storage::new(Box::new(ReadOnlyBackend)))
    }

    #[test]
    fn test_failed_write_leaves_state_untouched() {
        let mut store = read_only_store();
        let before = store.state().clone();

        assert!(matches!(store.toggle_task(1), Err(Error::Io(_))));
        assert!(store.delete_task(2).is_err());
        assert!(store.add_task(new_task("Weed rows", "2025-11-02")).is_err());
        assert!(store.add_recommended_task(new_task("Spray", "2025-11-03")).is_err());
        assert!(store
            .post_listing(NewListing {
                title: "Hay bales".to_string(),
                price: 300,
                category: "feed".to_string(),
                description: String::new(),
            })
            .is_err());
        assert!(store.switch_field("poultry-coop-1").is_err());
        assert!(store.set_theme(Theme::Earth).is_err());
        assert!(store.log_in("Jane", "jane@farm.com", "123456").is_err());
        assert!(store.log_out().is_err());

        assert_eq!(store.state(), &before);
    }

    #[test]
    fn test_validation_errors_win_over_write_errors() {
        let mut store = read_only_store();
        assert!(matches!(store.toggle_task(999), Err(Error::NotFound(_))));
        assert!(matches!(
            store.add_task(new_task("Weed rows", "tomorrow")),
            Err(Error::InvalidInput(_))
        ));
    }
}
