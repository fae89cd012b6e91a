use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use pantry_core::{DomainError, DomainResult, Entity, ItemId};

/// Days before expiration at which the warning fires.
pub const EXPIRATION_LEAD_DAYS: u64 = 3;

/// Candidate for a new pantry item, as entered by a user.
///
/// Unvalidated input; a negative quantity is rejected by [`NewItem::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewItem {
    pub name: String,
    pub quantity: i64,
    pub expiration_date: Option<NaiveDate>,
    /// Explicit override; `None` means "on iff an expiration date is set".
    pub notifications_enabled: Option<bool>,
}

impl NewItem {
    pub fn new(name: impl Into<String>, quantity: i64) -> Self {
        Self {
            name: name.into(),
            quantity,
            expiration_date: None,
            notifications_enabled: None,
        }
    }

    pub fn with_expiration(mut self, date: NaiveDate) -> Self {
        self.expiration_date = Some(date);
        self
    }

    pub fn with_notifications(mut self, enabled: bool) -> Self {
        self.notifications_enabled = Some(enabled);
        self
    }

    /// Check the candidate without constructing an item.
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if self.quantity < 0 {
            return Err(DomainError::validation("quantity cannot be negative"));
        }
        if u32::try_from(self.quantity).is_err() {
            return Err(DomainError::validation("quantity is out of range"));
        }
        Ok(())
    }
}

/// A tracked pantry item and its purchase/usage trail.
///
/// State only changes through [`Item::record_purchase`] and [`Item::record_usage`];
/// both histories are append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ItemRecord", into = "ItemRecord")]
pub struct Item {
    id: ItemId,
    name: String,
    quantity: u32,
    expiration_date: Option<NaiveDate>,
    last_purchased: NaiveDate,
    notifications_enabled: bool,
    purchase_history: Vec<NaiveDate>,
    usage_history: Vec<NaiveDate>,
}

/// Flat, storage-facing form of an [`Item`].
///
/// Repositories persist this shape; [`Item::rehydrate`] re-checks the invariants
/// when loading it back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub id: ItemId,
    pub name: String,
    pub quantity: u32,
    pub expiration_date: Option<NaiveDate>,
    pub last_purchased: NaiveDate,
    pub notifications_enabled: bool,
    pub purchase_history: Vec<NaiveDate>,
    #[serde(default)]
    pub usage_history: Vec<NaiveDate>,
}

impl Item {
    /// Create an item from a validated candidate. Creation counts as the first purchase.
    pub fn create(id: ItemId, candidate: NewItem, today: NaiveDate) -> DomainResult<Self> {
        candidate.validate()?;

        let quantity = u32::try_from(candidate.quantity)
            .map_err(|_| DomainError::validation("quantity is out of range"))?;
        let notifications_enabled = candidate
            .notifications_enabled
            .unwrap_or(candidate.expiration_date.is_some());

        Ok(Self {
            id,
            name: candidate.name,
            quantity,
            expiration_date: candidate.expiration_date,
            last_purchased: today,
            notifications_enabled,
            purchase_history: vec![today],
            usage_history: Vec::new(),
        })
    }

    /// Rebuild an item from its stored form.
    pub fn rehydrate(record: ItemRecord) -> DomainResult<Self> {
        if record.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        match record.purchase_history.last() {
            None => {
                return Err(DomainError::invariant(
                    "purchase history must contain the creation purchase",
                ));
            }
            Some(&latest) if latest != record.last_purchased => {
                return Err(DomainError::invariant(
                    "last purchase date must match the latest purchase history entry",
                ));
            }
            Some(_) => {}
        }

        Ok(Self {
            id: record.id,
            name: record.name,
            quantity: record.quantity,
            expiration_date: record.expiration_date,
            last_purchased: record.last_purchased,
            notifications_enabled: record.notifications_enabled,
            purchase_history: record.purchase_history,
            usage_history: record.usage_history,
        })
    }

    pub fn id_typed(&self) -> ItemId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn expiration_date(&self) -> Option<NaiveDate> {
        self.expiration_date
    }

    pub fn last_purchased(&self) -> NaiveDate {
        self.last_purchased
    }

    pub fn notifications_enabled(&self) -> bool {
        self.notifications_enabled
    }

    pub fn purchase_history(&self) -> &[NaiveDate] {
        &self.purchase_history
    }

    pub fn usage_history(&self) -> &[NaiveDate] {
        &self.usage_history
    }

    pub fn purchase_count(&self) -> usize {
        self.purchase_history.len()
    }

    pub fn is_out_of_stock(&self) -> bool {
        self.quantity == 0
    }

    /// Record a purchase made on `today`.
    ///
    /// Same-day purchases are kept as separate entries.
    pub fn record_purchase(&mut self, today: NaiveDate) {
        self.last_purchased = today;
        self.purchase_history.push(today);
    }

    /// Record one unit used on `today`.
    ///
    /// Quantity floors at zero, but the usage entry is appended either way: demand
    /// is still signalled when stock is already exhausted.
    pub fn record_usage(&mut self, today: NaiveDate) {
        self.quantity = self.quantity.saturating_sub(1);
        self.usage_history.push(today);
    }

    /// Whole calendar days from `today` until expiration; negative once expired.
    pub fn days_until_expiration(&self, today: NaiveDate) -> Option<i64> {
        self.expiration_date
            .map(|expires| expires.signed_duration_since(today).num_days())
    }

    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.days_until_expiration(today).is_some_and(|d| d < 0)
    }

    /// Day on which the expiration warning should fire.
    pub fn notification_trigger_date(&self) -> Option<NaiveDate> {
        self.expiration_date
            .and_then(|expires| expires.checked_sub_days(Days::new(EXPIRATION_LEAD_DAYS)))
    }

    pub fn days_since_last_purchase(&self, today: NaiveDate) -> i64 {
        today.signed_duration_since(self.last_purchased).num_days()
    }

    pub fn to_record(&self) -> ItemRecord {
        self.clone().into()
    }
}

impl Entity for Item {
    type Id = ItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl From<Item> for ItemRecord {
    fn from(item: Item) -> Self {
        Self {
            id: item.id,
            name: item.name,
            quantity: item.quantity,
            expiration_date: item.expiration_date,
            last_purchased: item.last_purchased,
            notifications_enabled: item.notifications_enabled,
            purchase_history: item.purchase_history,
            usage_history: item.usage_history,
        }
    }
}

impl TryFrom<ItemRecord> for Item {
    type Error = DomainError;

    fn try_from(record: ItemRecord) -> Result<Self, Self::Error> {
        Item::rehydrate(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        day(2024, 3, 10)
    }

    fn milk(quantity: i64) -> Item {
        Item::create(ItemId::new(), NewItem::new("Milk", quantity), today()).unwrap()
    }

    #[test]
    fn creation_counts_as_a_purchase() {
        let item = milk(2);
        assert_eq!(item.purchase_history(), &[today()]);
        assert_eq!(item.last_purchased(), today());
        assert!(item.usage_history().is_empty());
        assert_eq!(Entity::id(&item), &item.id_typed());
    }

    #[test]
    fn notifications_default_to_whether_an_expiration_was_given() {
        let plain = milk(1);
        assert!(!plain.notifications_enabled());

        let dated = Item::create(
            ItemId::new(),
            NewItem::new("Yogurt", 1).with_expiration(day(2024, 3, 20)),
            today(),
        )
        .unwrap();
        assert!(dated.notifications_enabled());

        let muted = Item::create(
            ItemId::new(),
            NewItem::new("Cheese", 1)
                .with_expiration(day(2024, 3, 20))
                .with_notifications(false),
            today(),
        )
        .unwrap();
        assert!(!muted.notifications_enabled());
    }

    #[test]
    fn create_rejects_blank_name() {
        let err = Item::create(ItemId::new(), NewItem::new("   ", 1), today()).unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            _ => panic!("Expected Validation error for empty name"),
        }
    }

    #[test]
    fn create_rejects_negative_quantity() {
        let err = Item::create(ItemId::new(), NewItem::new("Milk", -1), today()).unwrap_err();
        assert_eq!(err, DomainError::validation("quantity cannot be negative"));
    }

    #[test]
    fn record_usage_floors_at_zero_but_still_tracks_demand() {
        let mut item = milk(1);

        item.record_usage(today());
        assert_eq!(item.quantity(), 0);
        assert!(item.is_out_of_stock());

        item.record_usage(day(2024, 3, 11));
        assert_eq!(item.quantity(), 0);
        assert_eq!(item.usage_history(), &[today(), day(2024, 3, 11)]);
    }

    #[test]
    fn same_day_purchases_are_not_collapsed() {
        let mut item = milk(1);
        item.record_purchase(today());
        item.record_purchase(today());
        assert_eq!(item.purchase_count(), 3);
    }

    #[test]
    fn record_purchase_moves_last_purchased() {
        let mut item = milk(1);
        let later = day(2024, 4, 1);
        item.record_purchase(later);
        assert_eq!(item.last_purchased(), later);
        assert_eq!(item.purchase_history().last(), Some(&later));
    }

    #[test]
    fn days_until_expiration_is_signed() {
        let item = Item::create(
            ItemId::new(),
            NewItem::new("Bread", 1).with_expiration(day(2024, 3, 12)),
            today(),
        )
        .unwrap();

        assert_eq!(item.days_until_expiration(today()), Some(2));
        assert_eq!(item.days_until_expiration(day(2024, 3, 15)), Some(-3));
        assert!(item.is_expired(day(2024, 3, 13)));
        assert!(!item.is_expired(day(2024, 3, 12)));
        assert_eq!(milk(1).days_until_expiration(today()), None);
    }

    #[test]
    fn trigger_date_is_three_days_before_expiration() {
        let item = Item::create(
            ItemId::new(),
            NewItem::new("Yogurt", 1).with_expiration(day(2024, 3, 20)),
            today(),
        )
        .unwrap();
        assert_eq!(item.notification_trigger_date(), Some(day(2024, 3, 17)));
        assert_eq!(milk(1).notification_trigger_date(), None);
    }

    #[test]
    fn rehydrate_rejects_empty_purchase_history() {
        let mut record = milk(1).to_record();
        record.purchase_history.clear();
        let err = Item::rehydrate(record).unwrap_err();
        match err {
            DomainError::InvariantViolation(_) => {}
            _ => panic!("Expected InvariantViolation for missing creation purchase"),
        }
    }

    #[test]
    fn rehydrate_rejects_last_purchased_out_of_step_with_history() {
        let mut item = milk(1);
        item.record_purchase(day(2024, 3, 12));
        let mut record = item.to_record();
        record.last_purchased = day(2024, 3, 10);

        let err = Item::rehydrate(record).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));

        let json = serde_json::to_string(&item.to_record())
            .unwrap()
            .replace("\"last_purchased\":\"2024-03-12\"", "\"last_purchased\":\"2024-01-01\"");
        assert!(serde_json::from_str::<Item>(&json).is_err());
    }

    #[test]
    fn json_keeps_history_dates_exactly() {
        let mut item = milk(3);
        item.record_purchase(day(2024, 2, 29));
        item.record_usage(day(2024, 12, 31));

        let json = serde_json::to_string(&item).unwrap();
        assert!(json.contains("\"2024-02-29\""));

        let back: Item = serde_json::from_str(&json).unwrap();
        assert_eq!(back, item);
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: usage yields max(0, q - 1) and appends exactly one entry.
            #[test]
            fn usage_decrements_with_floor(q in 0i64..1_000, offset in 0u64..400) {
                let mut item = Item::create(ItemId::new(), NewItem::new("Rice", q), today()).unwrap();
                let used_on = today() + Days::new(offset);
                let before = item.usage_history().len();

                item.record_usage(used_on);

                prop_assert_eq!(i64::from(item.quantity()), (q - 1).max(0));
                prop_assert_eq!(item.usage_history().len(), before + 1);
                prop_assert_eq!(item.usage_history().last(), Some(&used_on));
            }

            /// Property: every purchase grows history by exactly one entry.
            #[test]
            fn purchases_always_grow_history(calls in 1usize..20) {
                let mut item = milk(1);
                for n in 0..calls {
                    item.record_purchase(today());
                    prop_assert_eq!(item.purchase_count(), n + 2);
                    prop_assert_eq!(item.last_purchased(), today());
                }
            }

            /// Property: days until expiration equals the calendar difference.
            #[test]
            fn countdown_matches_calendar_difference(ahead in -365i64..365) {
                let expires = today() + chrono::Duration::days(ahead);
                let item = Item::create(
                    ItemId::new(),
                    NewItem::new("Beans", 1).with_expiration(expires),
                    today(),
                ).unwrap();
                prop_assert_eq!(item.days_until_expiration(today()), Some(ahead));
            }
        }
    }
}
