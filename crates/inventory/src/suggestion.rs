use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use pantry_core::ValueObject;

use crate::item::Item;

/// Purchases needed before a name counts as a buying pattern.
pub const MIN_PURCHASES: usize = 3;

/// Days since the last purchase before a name is suggested again.
pub const MIN_DAYS_SINCE_PURCHASE: i64 = 14;

/// A restock candidate and the metrics that qualified it.
///
/// Derived on demand; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionEntry {
    pub name: String,
    pub purchase_count: usize,
    pub days_since_last_purchase: i64,
}

impl ValueObject for SuggestionEntry {}

/// Restock suggestion computation over an item snapshot.
///
/// Model:
/// - Group records by exact name (history for one name may span several records).
/// - Per name, keep the most recently purchased record; ties go to the one with
///   the longer purchase history.
/// - Suggest the name iff that record has `>= min_purchases` purchases and was last
///   bought `>= min_days_since` days ago.
///
/// Pure: the same snapshot and day always produce the same list.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SuggestionEngine {
    min_purchases: usize,
    min_days_since: i64,
}

impl Default for SuggestionEngine {
    fn default() -> Self {
        Self {
            min_purchases: MIN_PURCHASES,
            min_days_since: MIN_DAYS_SINCE_PURCHASE,
        }
    }
}

impl SuggestionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min_purchases(mut self, min_purchases: usize) -> Self {
        self.min_purchases = min_purchases;
        self
    }

    pub fn with_min_days_since(mut self, min_days_since: i64) -> Self {
        self.min_days_since = min_days_since;
        self
    }

    /// Qualifying entries, sorted by name.
    pub fn evaluate<'a, I>(&self, items: I, today: NaiveDate) -> Vec<SuggestionEntry>
    where
        I: IntoIterator<Item = &'a Item>,
    {
        let mut by_name: BTreeMap<&str, &Item> = BTreeMap::new();

        for item in items {
            by_name
                .entry(item.name())
                .and_modify(|current| {
                    if is_more_relevant(item, current) {
                        *current = item;
                    }
                })
                .or_insert(item);
        }

        by_name
            .into_iter()
            .filter_map(|(name, item)| {
                let purchase_count = item.purchase_count();
                let days_since_last_purchase = item.days_since_last_purchase(today);

                if purchase_count >= self.min_purchases && days_since_last_purchase >= self.min_days_since {
                    Some(SuggestionEntry {
                        name: name.to_string(),
                        purchase_count,
                        days_since_last_purchase,
                    })
                } else {
                    None
                }
            })
            .collect()
    }

    /// Qualifying names, lexicographically sorted and deduplicated.
    pub fn suggest<'a, I>(&self, items: I, today: NaiveDate) -> Vec<String>
    where
        I: IntoIterator<Item = &'a Item>,
    {
        self.evaluate(items, today).into_iter().map(|e| e.name).collect()
    }
}

fn is_more_relevant(candidate: &Item, current: &Item) -> bool {
    (candidate.last_purchased(), candidate.purchase_count())
        > (current.last_purchased(), current.purchase_count())
}
