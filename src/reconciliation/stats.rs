//! Statistics, filtering and ordering of closings for review screens

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;

use super::classifier::{classify, Severity};
use crate::types::{ClosingRecord, ValidationStatus};

/// Counts of closings per severity bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosingStatistics {
    pub total: usize,
    pub correct: usize,
    pub minor_differences: usize,
    pub severe_differences: usize,
    /// Sum of the absolute grand difference totals
    pub absolute_difference_total: BigDecimal,
}

impl Default for ClosingStatistics {
    fn default() -> Self {
        Self {
            total: 0,
            correct: 0,
            minor_differences: 0,
            severe_differences: 0,
            absolute_difference_total: BigDecimal::from(0),
        }
    }
}

impl ClosingStatistics {
    /// Tally a set of closings
    pub fn from_closings<'a, I>(closings: I) -> Self
    where
        I: IntoIterator<Item = &'a ClosingRecord>,
    {
        let mut stats = Self::default();
        for closing in closings {
            stats.record(closing);
        }
        stats
    }

    fn record(&mut self, closing: &ClosingRecord) {
        self.total += 1;
        match classify(&closing.grand_difference_total) {
            Severity::Correct => self.correct += 1,
            Severity::MinorDifference => self.minor_differences += 1,
            Severity::SevereDifference => self.severe_differences += 1,
        }
        self.absolute_difference_total += closing.grand_difference_total.abs();
    }

    /// Count for a single bucket
    pub fn count(&self, severity: Severity) -> usize {
        match severity {
            Severity::Correct => self.correct,
            Severity::MinorDifference => self.minor_differences,
            Severity::SevereDifference => self.severe_differences,
        }
    }
}

/// Per-store roll-up used by the monthly control view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreSummary {
    pub store: String,
    pub total_closings: usize,
    /// Closings classified as minor or severe
    pub closings_with_differences: usize,
    /// Signed sum of grand difference totals
    pub difference_total: BigDecimal,
}

/// Summarize closings per store.
///
/// Every store in `stores` appears in the result, in the given order, even if
/// it has no closings.
pub fn summarize_by_store(stores: &[String], closings: &[ClosingRecord]) -> Vec<StoreSummary> {
    stores
        .iter()
        .map(|store| {
            let mut summary = StoreSummary {
                store: store.clone(),
                total_closings: 0,
                closings_with_differences: 0,
                difference_total: BigDecimal::from(0),
            };
            for closing in closings.iter().filter(|c| &c.store == store) {
                summary.total_closings += 1;
                if classify(&closing.grand_difference_total).has_difference() {
                    summary.closings_with_differences += 1;
                }
                summary.difference_total += &closing.grand_difference_total;
            }
            summary
        })
        .collect()
}

/// Criteria for narrowing a list of closings. Empty criteria match everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClosingFilter {
    /// Earliest date, inclusive
    pub from: Option<NaiveDate>,
    /// Latest date, inclusive
    pub to: Option<NaiveDate>,
    pub store: Option<String>,
    pub user: Option<String>,
    /// Keep closings with at least one justification for this reason
    pub reason: Option<String>,
    /// Case-insensitive search over user and store
    pub search: Option<String>,
    /// Buckets to keep; `None` keeps every bucket
    pub severities: Option<HashSet<Severity>>,
    pub validation: Option<ValidationStatus>,
}

impl ClosingFilter {
    /// Filter that matches everything
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to an inclusive date range
    pub fn between(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.from = Some(from);
        self.to = Some(to);
        self
    }

    /// Restrict to a store
    pub fn store(mut self, store: &str) -> Self {
        self.store = Some(store.to_string());
        self
    }

    /// Restrict to an employee
    pub fn user(mut self, user: &str) -> Self {
        self.user = Some(user.to_string());
        self
    }

    /// Restrict to closings justified with a reason
    pub fn reason(mut self, reason: &str) -> Self {
        self.reason = Some(reason.to_string());
        self
    }

    /// Free-text search over user and store
    pub fn search(mut self, text: &str) -> Self {
        self.search = Some(text.to_string());
        self
    }

    /// Keep only the given severity buckets
    pub fn severities<I: IntoIterator<Item = Severity>>(mut self, severities: I) -> Self {
        self.severities = Some(severities.into_iter().collect());
        self
    }

    /// Restrict to a review state
    pub fn validation(mut self, status: ValidationStatus) -> Self {
        self.validation = Some(status);
        self
    }

    /// Whether a closing satisfies every criterion
    pub fn matches(&self, closing: &ClosingRecord) -> bool {
        if self.from.is_some_and(|from| closing.date < from) {
            return false;
        }
        if self.to.is_some_and(|to| closing.date > to) {
            return false;
        }
        if self
            .store
            .as_ref()
            .is_some_and(|store| &closing.store != store)
        {
            return false;
        }
        if self.user.as_ref().is_some_and(|user| &closing.user != user) {
            return false;
        }
        if let Some(reason) = &self.reason {
            if !closing.justifications.iter().any(|j| &j.reason == reason) {
                return false;
            }
        }
        if let Some(search) = &self.search {
            let needle = search.trim().to_lowercase();
            if !needle.is_empty()
                && !closing.user.to_lowercase().contains(&needle)
                && !closing.store.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        if let Some(severities) = &self.severities {
            if !severities.contains(&classify(&closing.grand_difference_total)) {
                return false;
            }
        }
        if self
            .validation
            .is_some_and(|status| closing.validated != status)
        {
            return false;
        }
        true
    }

    /// Closings that match, in their original order
    pub fn apply<'a>(&self, closings: &'a [ClosingRecord]) -> Vec<&'a ClosingRecord> {
        closings.iter().filter(|c| self.matches(c)).collect()
    }
}

/// Column a list of closings can be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Date,
    Store,
    User,
    Severity,
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// Sort closings in place. The sort is stable, so ties keep their order.
pub fn sort_closings(closings: &mut [ClosingRecord], key: SortKey, direction: SortDirection) {
    closings.sort_by(|a, b| {
        let ordering = compare_by(a, b, key);
        match direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
}

fn compare_by(a: &ClosingRecord, b: &ClosingRecord, key: SortKey) -> Ordering {
    match key {
        SortKey::Date => a.date.cmp(&b.date),
        SortKey::Store => a.store.cmp(&b.store),
        SortKey::User => a.user.cmp(&b.user),
        SortKey::Severity => classify(&a.grand_difference_total)
            .cmp(&classify(&b.grand_difference_total))
            .then_with(|| {
                a.grand_difference_total
                    .abs()
                    .cmp(&b.grand_difference_total.abs())
            }),
    }
}
