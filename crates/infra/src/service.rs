//! Pantry application service.
//!
//! `PantryService` is the only writer of the item repository and the only source
//! of caller-facing errors. It composes three injected collaborators:
//!
//! ```text
//! caller ─▶ PantryService ─┬─▶ ItemRepository          (durable items)
//!                          ├─▶ NotificationDispatcher  (expiration warnings)
//!                          └─▶ EventBus<PantryEvent>   (observers)
//! ```
//!
//! Item creation:
//!
//! ```text
//! Pending ─┬─▶ Rejected(invalid)      nothing persisted
//!          ├─▶ Rejected(duplicate)    nothing persisted
//!          └─▶ Persisted ─┬─▶ NotificationScheduled
//!                         ├─▶ NotificationFailed   (item stays persisted)
//!                         └─▶ NotificationSkipped
//! ```
//!
//! Every repository or dispatcher fault is converted into a [`PantryError`]
//! before it is returned, and the latest one is kept in an expiring slot for the
//! presentation layer.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use chrono::{NaiveDate, Utc};
use tokio::sync::Notify;

use pantry_core::{Clock, ItemId, SystemClock};
use pantry_events::EventBus;
use pantry_inventory::{
    ErrorRaised, Item, ItemAdded, ItemUpdated, ItemsDeleted, NewItem, NotificationScheduled,
    PantryError, PantryEvent, SuggestionEngine, SuggestionEntry, SuggestionsUpdated,
};

use crate::config::PantryConfig;
use crate::expiring::ExpiringValue;
use crate::notification::{
    AuthorizationFlag, DispatchError, NotificationAuthorization, NotificationDispatcher,
    NotificationRequest,
};
use crate::repository::{ItemRepository, RepositoryError};

impl From<RepositoryError> for PantryError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::NotFound(id) => PantryError::InvalidItem(format!("no item with id {id}")),
            other => PantryError::InvalidItem(other.to_string()),
        }
    }
}

impl From<DispatchError> for PantryError {
    fn from(value: DispatchError) -> Self {
        PantryError::NotificationFailure(value.to_string())
    }
}

/// Why no expiration warning was scheduled for a new item.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NoExpiration,
    Disabled,
    /// Delivery is not authorized; this is not an error.
    NotPermitted,
    AlreadyExpired,
}

/// What happened to a persisted item's expiration warning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationOutcome {
    Scheduled(NotificationRequest),
    Skipped(SkipReason),
    Failed(PantryError),
}

/// Result of a successful `add_item`: the item is persisted regardless of
/// how notification scheduling went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddItemOutcome {
    pub item: Item,
    pub notification: NotificationOutcome,
}

impl AddItemOutcome {
    /// The notification-scheduling error, if any.
    pub fn error(&self) -> Option<&PantryError> {
        match &self.notification {
            NotificationOutcome::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// Request handle for a debounced suggestion refresh.
///
/// While a refresher is attached, requests only wake it; otherwise the service
/// recomputes inline.
#[derive(Debug, Clone, Default)]
pub struct RefreshSignal {
    notify: Arc<Notify>,
    attached: Arc<AtomicBool>,
}

impl RefreshSignal {
    pub fn request(&self) {
        self.notify.notify_one();
    }

    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::SeqCst)
    }

    pub(crate) fn attach(&self) {
        self.attached.store(true, Ordering::SeqCst);
    }

    pub(crate) fn detach(&self) {
        self.attached.store(false, Ordering::SeqCst);
    }

    pub(crate) async fn requested(&self) {
        self.notify.notified().await;
    }
}

/// Pantry orchestration over an item repository, a notification dispatcher and
/// an event bus.
pub struct PantryService<R, N, B>
where
    R: ItemRepository,
    N: NotificationDispatcher,
    B: EventBus<PantryEvent>,
{
    repository: R,
    dispatcher: N,
    bus: B,
    authorization: Arc<dyn NotificationAuthorization>,
    clock: Arc<dyn Clock>,
    engine: SuggestionEngine,
    suggestions: RwLock<Vec<SuggestionEntry>>,
    last_error: ExpiringValue<PantryError>,
    refresh: RefreshSignal,
    config: PantryConfig,
    /// Serializes the duplicate-name check with the create that follows it.
    add_guard: Mutex<()>,
}

impl<R, N, B> PantryService<R, N, B>
where
    R: ItemRepository,
    N: NotificationDispatcher,
    B: EventBus<PantryEvent>,
{
    pub fn new(repository: R, dispatcher: N, bus: B) -> Self {
        let config = PantryConfig::default();
        Self {
            repository,
            dispatcher,
            bus,
            authorization: Arc::new(AuthorizationFlag::granted()),
            clock: Arc::new(SystemClock),
            engine: SuggestionEngine::default(),
            suggestions: RwLock::new(Vec::new()),
            last_error: ExpiringValue::new(config.error_ttl),
            refresh: RefreshSignal::default(),
            config,
            add_guard: Mutex::new(()),
        }
    }

    pub fn with_config(mut self, config: PantryConfig) -> Self {
        self.last_error = ExpiringValue::new(config.error_ttl);
        self.config = config;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_authorization(mut self, authorization: Arc<dyn NotificationAuthorization>) -> Self {
        self.authorization = authorization;
        self
    }

    pub fn with_engine(mut self, engine: SuggestionEngine) -> Self {
        self.engine = engine;
        self
    }

    /// Finish construction: compute the initial suggestions and share the service.
    ///
    /// Until a [`SuggestionRefresher`](crate::SuggestionRefresher) is started on
    /// the returned service, every item change recomputes suggestions inline and
    /// bursts are not coalesced.
    pub fn start(self) -> Arc<Self> {
        tracing::info!("pantry service starting");
        self.recompute_suggestions();
        Arc::new(self)
    }

    pub fn config(&self) -> &PantryConfig {
        &self.config
    }

    pub fn refresh_signal(&self) -> &RefreshSignal {
        &self.refresh
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Create an item unless one with exactly the same name exists.
    ///
    /// On success the item is persisted; a notification failure is reported in
    /// the outcome (and as the latest error) but never undoes the creation.
    pub fn add_item(&self, candidate: NewItem) -> Result<AddItemOutcome, PantryError> {
        match self.try_add_item(candidate) {
            Ok(outcome) => {
                if let Some(err) = outcome.error() {
                    self.raise(err.clone());
                }
                self.request_refresh();
                Ok(outcome)
            }
            Err(err) => {
                self.raise(err.clone());
                Err(err)
            }
        }
    }

    fn try_add_item(&self, candidate: NewItem) -> Result<AddItemOutcome, PantryError> {
        candidate.validate()?;

        let guard = self.add_guard.lock().unwrap_or_else(PoisonError::into_inner);
        let existing = self.repository.find_by_name(&candidate.name)?;
        if !existing.is_empty() {
            tracing::debug!("rejecting duplicate item name {:?}", candidate.name);
            return Err(PantryError::duplicate(candidate.name));
        }

        let today = self.clock.today();
        let item = Item::create(ItemId::new(), candidate, today)?;
        self.repository.create(item.clone())?;
        drop(guard);

        tracing::info!(item_id = %item.id_typed(), "added item {:?}", item.name());
        self.publish(PantryEvent::ItemAdded(ItemAdded {
            item_id: item.id_typed(),
            name: item.name().to_string(),
            quantity: item.quantity(),
            expiration_date: item.expiration_date(),
            occurred_at: Utc::now(),
        }));

        let notification = self.schedule_expiration(&item, today);
        Ok(AddItemOutcome { item, notification })
    }

    fn schedule_expiration(&self, item: &Item, today: NaiveDate) -> NotificationOutcome {
        let Some(trigger) = item.notification_trigger_date() else {
            return NotificationOutcome::Skipped(SkipReason::NoExpiration);
        };
        if !item.notifications_enabled() {
            return NotificationOutcome::Skipped(SkipReason::Disabled);
        }
        if item.is_expired(today) {
            return NotificationOutcome::Skipped(SkipReason::AlreadyExpired);
        }
        if !self.authorization.is_permitted() {
            tracing::debug!("notification delivery not permitted; skipping {:?}", item.name());
            return NotificationOutcome::Skipped(SkipReason::NotPermitted);
        }

        // Inside the lead window the warning fires today rather than in the past.
        let fire_date = trigger.max(today);
        let Some(request) = NotificationRequest::expiration_warning(item, fire_date) else {
            return NotificationOutcome::Skipped(SkipReason::NoExpiration);
        };

        match self.dispatcher.schedule(&request) {
            Ok(()) => {
                tracing::info!(
                    item_id = %item.id_typed(),
                    "scheduled {} for {}",
                    request.identifier,
                    request.fire_date
                );
                self.publish(PantryEvent::NotificationScheduled(NotificationScheduled {
                    item_id: item.id_typed(),
                    identifier: request.identifier.clone(),
                    fire_date: request.fire_date,
                    occurred_at: Utc::now(),
                }));
                NotificationOutcome::Scheduled(request)
            }
            Err(e) => {
                tracing::warn!(item_id = %item.id_typed(), "failed to schedule {}: {}", request.identifier, e);
                NotificationOutcome::Failed(e.into())
            }
        }
    }

    /// Record a purchase made today.
    pub fn record_purchase(&self, id: ItemId) -> Result<Item, PantryError> {
        let today = self.clock.today();
        self.mutate(id, |item| item.record_purchase(today))
    }

    /// Record one unit used today.
    pub fn record_usage(&self, id: ItemId) -> Result<Item, PantryError> {
        let today = self.clock.today();
        self.mutate(id, |item| item.record_usage(today))
    }

    fn mutate(&self, id: ItemId, change: impl FnOnce(&mut Item)) -> Result<Item, PantryError> {
        match self.apply_change(id, change) {
            Ok(item) => {
                tracing::debug!(item_id = %id, "updated item {:?} (quantity={})", item.name(), item.quantity());
                self.publish(PantryEvent::ItemUpdated(ItemUpdated {
                    item_id: id,
                    name: item.name().to_string(),
                    quantity: item.quantity(),
                    occurred_at: Utc::now(),
                }));
                self.request_refresh();
                Ok(item)
            }
            Err(err) => {
                self.raise(err.clone());
                Err(err)
            }
        }
    }

    fn apply_change(&self, id: ItemId, change: impl FnOnce(&mut Item)) -> Result<Item, PantryError> {
        let mut item = self
            .repository
            .get(id)?
            .ok_or_else(|| PantryError::invalid(format!("no item with id {id}")))?;
        change(&mut item);
        self.repository.update(item.clone())?;
        Ok(item)
    }

    /// Remove the selected items; ids that are already gone are ignored.
    ///
    /// Returns how many items were actually removed. The expiration warning of a
    /// name is cancelled once no item with that name remains.
    pub fn delete_items(&self, selection: &[ItemId]) -> Result<usize, PantryError> {
        let mut deleted = Vec::with_capacity(selection.len());

        for &id in selection {
            let item = match self.repository.get(id) {
                Ok(Some(item)) => item,
                Ok(None) => {
                    tracing::debug!(item_id = %id, "delete skipped; item already gone");
                    continue;
                }
                Err(e) => return Err(self.fail_delete(e.into(), &deleted)),
            };

            match self.repository.delete(id) {
                Ok(()) => deleted.push(item),
                Err(RepositoryError::NotFound(_)) => continue,
                Err(e) => return Err(self.fail_delete(e.into(), &deleted)),
            }
        }

        self.finish_delete(&deleted);
        Ok(deleted.len())
    }

    fn fail_delete(&self, err: PantryError, deleted: &[Item]) -> PantryError {
        self.finish_delete(deleted);
        self.raise(err.clone());
        err
    }

    fn finish_delete(&self, deleted: &[Item]) {
        if deleted.is_empty() {
            return;
        }

        for item in deleted {
            self.cancel_expiration(item);
        }

        tracing::info!("deleted {} item(s)", deleted.len());
        self.publish(PantryEvent::ItemsDeleted(ItemsDeleted {
            item_ids: deleted.iter().map(|i| i.id_typed()).collect(),
            occurred_at: Utc::now(),
        }));
        self.request_refresh();
    }

    fn cancel_expiration(&self, item: &Item) {
        if item.expiration_date().is_none() {
            return;
        }
        // Identifiers are per name; keep the alert while a same-named item remains.
        match self.repository.find_by_name(item.name()) {
            Ok(remaining) if remaining.is_empty() => {}
            Ok(_) => return,
            Err(e) => {
                tracing::warn!("could not check remaining items named {:?}: {}", item.name(), e);
                return;
            }
        }

        let identifier = NotificationRequest::identifier_for(item.name());
        if let Err(e) = self.dispatcher.cancel(&identifier) {
            tracing::warn!("failed to cancel {}: {}", identifier, e);
            self.raise(e.into());
        }
    }

    /// Recompute suggestions from a fresh repository snapshot.
    ///
    /// A failed snapshot read keeps the previous list and raises an error.
    pub fn recompute_suggestions(&self) -> Vec<String> {
        let items = match self.repository.list() {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!("suggestion recompute skipped: {}", e);
                self.raise(e.into());
                return self.suggestions();
            }
        };

        let entries = self.engine.evaluate(&items, self.clock.today());
        let names: Vec<String> = entries.iter().map(|e| e.name.clone()).collect();

        tracing::debug!("recomputed suggestions over {} item(s): {:?}", items.len(), names);
        if let Ok(mut slot) = self.suggestions.write() {
            *slot = entries;
        }

        self.publish(PantryEvent::SuggestionsUpdated(SuggestionsUpdated {
            names: names.clone(),
            occurred_at: Utc::now(),
        }));
        names
    }

    /// Current restock suggestions (sorted names).
    pub fn suggestions(&self) -> Vec<String> {
        self.suggestion_entries().into_iter().map(|e| e.name).collect()
    }

    /// Current restock suggestions with their qualifying metrics.
    pub fn suggestion_entries(&self) -> Vec<SuggestionEntry> {
        self.suggestions.read().map(|s| s.clone()).unwrap_or_default()
    }

    /// Items ordered by name.
    pub fn items(&self) -> Result<Vec<Item>, PantryError> {
        self.repository.list().map_err(|e| {
            let err = PantryError::from(e);
            self.raise(err.clone());
            err
        })
    }

    /// Most recent error, until it expires.
    pub fn last_error(&self) -> Option<PantryError> {
        self.last_error.get()
    }

    pub fn clear_error(&self) {
        self.last_error.clear();
    }

    pub(crate) fn request_refresh(&self) {
        if self.refresh.is_attached() {
            self.refresh.request();
        } else {
            self.recompute_suggestions();
        }
    }

    fn raise(&self, err: PantryError) {
        tracing::debug!(code = err.code(), "pantry error: {}", err);
        self.last_error.set(err.clone());
        self.publish(PantryEvent::ErrorRaised(ErrorRaised {
            error: err,
            occurred_at: Utc::now(),
        }));
    }

    fn publish(&self, event: PantryEvent) {
        if let Err(e) = self.bus.publish(event) {
            tracing::warn!("failed to publish pantry event: {:?}", e);
        }
    }
}
