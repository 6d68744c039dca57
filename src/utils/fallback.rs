//! Storage that tries several backends in order
//!
//! Stores reach the closing backend through whichever address answers first
//! (local machine, LAN address, hosted instance). Each call goes to the first
//! backend and moves on to the next only when the backend itself fails.
//! Domain errors such as a missing closing are answers, not failures, and are
//! returned as-is.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::traits::*;
use crate::types::*;

/// A named backend
struct Candidate {
    name: String,
    storage: Box<dyn ClosingStorage>,
}

/// Ordered list of storage backends
#[derive(Default)]
pub struct FallbackStorage {
    candidates: Vec<Candidate>,
}

impl FallbackStorage {
    /// Create an empty fallback chain
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a backend; earlier backends are preferred
    pub fn with_backend(
        mut self,
        name: impl Into<String>,
        storage: impl ClosingStorage + 'static,
    ) -> Self {
        self.candidates.push(Candidate {
            name: name.into(),
            storage: Box::new(storage),
        });
        self
    }

    /// Names of the backends, in the order they are tried
    pub fn backend_names(&self) -> Vec<&str> {
        self.candidates.iter().map(|c| c.name.as_str()).collect()
    }

    /// Number of backends
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Whether there are no backends
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

macro_rules! try_in_order {
    ($candidates:expr, $candidate:ident => $call:expr) => {{
        let mut failures = Vec::new();
        for $candidate in $candidates {
            match $call {
                Err(err) if err.is_backend_failure() => {
                    tracing::warn!(
                        backend = %$candidate.name,
                        error = %err,
                        "storage backend failed, trying next"
                    );
                    failures.push(format!("{}: {}", $candidate.name, err));
                }
                result => return result,
            }
        }
        if failures.is_empty() {
            failures.push("no backends configured".to_string());
        }
        tracing::error!(attempts = failures.len(), "every storage backend failed");
        Err(ClosingError::Unavailable(failures.join("; ")))
    }};
}

#[async_trait]
impl ClosingStorage for FallbackStorage {
    async fn save_closing(&mut self, closing: &ClosingRecord) -> ClosingResult<()> {
        try_in_order!(
            self.candidates.iter_mut(),
            candidate => candidate.storage.save_closing(closing).await
        )
    }

    async fn get_closing(&self, closing_id: &str) -> ClosingResult<Option<ClosingRecord>> {
        try_in_order!(
            self.candidates.iter(),
            candidate => candidate.storage.get_closing(closing_id).await
        )
    }

    async fn find_closing(
        &self,
        store: &str,
        user: &str,
        date: NaiveDate,
    ) -> ClosingResult<Option<ClosingRecord>> {
        try_in_order!(
            self.candidates.iter(),
            candidate => candidate.storage.find_closing(store, user, date).await
        )
    }

    async fn list_closings(
        &self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> ClosingResult<Vec<ClosingRecord>> {
        try_in_order!(
            self.candidates.iter(),
            candidate => candidate.storage.list_closings(start_date, end_date).await
        )
    }

    async fn update_closing(&mut self, closing: &ClosingRecord) -> ClosingResult<()> {
        try_in_order!(
            self.candidates.iter_mut(),
            candidate => candidate.storage.update_closing(closing).await
        )
    }

    async fn delete_closing(&mut self, closing_id: &str) -> ClosingResult<()> {
        try_in_order!(
            self.candidates.iter_mut(),
            candidate => candidate.storage.delete_closing(closing_id).await
        )
    }
}
