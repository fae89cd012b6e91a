//! End-to-end pantry scenarios through the public service API.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Days, NaiveDate};

use pantry_core::FixedClock;
use pantry_events::{Event, EventBus, InMemoryEventBus};
use pantry_infra::{
    DispatchError, InMemoryItemRepository, ItemRepository, NotificationOutcome, PantryConfig,
    PantryService, RecordingDispatcher, SuggestionRefresher,
};
use pantry_inventory::{NewItem, PantryError, PantryEvent};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
}

struct Pantry {
    repo: Arc<InMemoryItemRepository>,
    dispatcher: Arc<RecordingDispatcher>,
    bus: Arc<InMemoryEventBus<PantryEvent>>,
}

impl Pantry {
    fn new() -> Self {
        pantry_observability::init();
        Self {
            repo: Arc::new(InMemoryItemRepository::new()),
            dispatcher: Arc::new(RecordingDispatcher::new()),
            bus: Arc::new(InMemoryEventBus::new()),
        }
    }

    fn service_on(
        &self,
        day: NaiveDate,
    ) -> Arc<PantryService<Arc<InMemoryItemRepository>, Arc<RecordingDispatcher>, Arc<InMemoryEventBus<PantryEvent>>>>
    {
        PantryService::new(self.repo.clone(), self.dispatcher.clone(), self.bus.clone())
            .with_clock(Arc::new(FixedClock(day)))
            .with_config(PantryConfig::default().with_error_ttl(None))
            .start()
    }
}

#[test]
fn milk_becomes_a_restock_candidate_and_eggs_do_not() {
    let pantry = Pantry::new();
    let three_weeks_ago = today() - Days::new(21);

    let then = pantry.service_on(three_weeks_ago);
    let milk = then.add_item(NewItem::new("Milk", 2)).unwrap().item;
    then.record_purchase(milk.id_typed()).unwrap();
    then.record_purchase(milk.id_typed()).unwrap();
    then.add_item(NewItem::new("Eggs", 12)).unwrap();

    let now = pantry.service_on(today());
    assert_eq!(now.suggestions(), vec!["Milk".to_string()]);

    // Buying milk again today takes it off the list.
    now.record_purchase(milk.id_typed()).unwrap();
    assert!(now.suggestions().is_empty());
}

#[test]
fn second_milk_is_a_duplicate() {
    let pantry = Pantry::new();
    let service = pantry.service_on(today());

    service.add_item(NewItem::new("Milk", 2)).unwrap();
    let err = service.add_item(NewItem::new("Milk", 2)).unwrap_err();

    assert_eq!(err, PantryError::DuplicateItem("Milk".to_string()));
    assert_eq!(pantry.repo.find_by_name("Milk").unwrap().len(), 1);
}

#[test]
fn expiring_item_is_warned_seven_days_ahead_of_a_ten_day_expiry() {
    let pantry = Pantry::new();
    let service = pantry.service_on(today());

    let outcome = service
        .add_item(NewItem::new("Yogurt", 4).with_expiration(today() + Days::new(10)))
        .unwrap();

    assert_eq!(outcome.item.days_until_expiration(today()), Some(10));
    match outcome.notification {
        NotificationOutcome::Scheduled(req) => assert_eq!(req.fire_date, today() + Days::new(7)),
        other => panic!("Expected Scheduled, got {other:?}"),
    }
}

#[test]
fn failed_notification_surfaces_without_losing_the_item() {
    let pantry = Pantry::new();
    pantry
        .dispatcher
        .fail_with(Some(DispatchError::Rejected("quota exceeded".to_string())));
    let service = pantry.service_on(today());
    let sub = pantry.bus.subscribe();

    let outcome = service
        .add_item(NewItem::new("Salmon", 1).with_expiration(today() + Days::new(5)))
        .unwrap();

    assert!(matches!(outcome.notification, NotificationOutcome::Failed(PantryError::NotificationFailure(_))));
    assert_eq!(pantry.repo.find_by_name("Salmon").unwrap().len(), 1);

    let types: Vec<&'static str> = sub.drain().iter().map(|e| e.event_type()).collect();
    assert!(types.contains(&"pantry.item.added"));
    assert!(types.contains(&"pantry.error.raised"));
    assert!(!types.contains(&"pantry.notification.scheduled"));

    // A retry is not blocked by the earlier failure.
    pantry.dispatcher.fail_with(None);
    service
        .add_item(NewItem::new("Trout", 1).with_expiration(today() + Days::new(5)))
        .unwrap();
    assert!(pantry.dispatcher.get("expiration-Trout").is_some());
}

#[tokio::test(start_paused = true)]
async fn refresher_picks_up_changes_after_the_debounce_window() {
    let pantry = Pantry::new();
    let service = pantry.service_on(today());
    let sub = pantry.bus.subscribe();
    let handle = SuggestionRefresher::new(service.clone())
        .with_debounce(Duration::from_millis(500))
        .start();

    service.add_item(NewItem::new("Pasta", 3)).unwrap();
    service.add_item(NewItem::new("Sauce", 2)).unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;

    let refreshes = sub
        .drain()
        .into_iter()
        .filter(|e| matches!(e, PantryEvent::SuggestionsUpdated(_)))
        .count();
    assert_eq!(refreshes, 1);

    handle.shutdown().await;
}
