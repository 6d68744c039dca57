//! In-memory storage implementation for testing

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::traits::*;
use crate::types::*;

type ClosingMap = HashMap<String, ClosingRecord>;

/// In-memory storage implementation for testing and development
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    closings: Arc<RwLock<ClosingMap>>,
}

impl MemoryStorage {
    /// Create a new memory storage instance
    pub fn new() -> Self {
        Self {
            closings: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Number of stored closings
    pub fn len(&self) -> usize {
        self.read().map(|closings| closings.len()).unwrap_or(0)
    }

    /// Whether nothing is stored
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clear all data (useful for testing)
    pub fn clear(&self) -> ClosingResult<()> {
        self.write()?.clear();
        Ok(())
    }

    fn read(&self) -> ClosingResult<RwLockReadGuard<'_, ClosingMap>> {
        self.closings
            .read()
            .map_err(|_| ClosingError::Storage("closing store lock poisoned".to_string()))
    }

    fn write(&self) -> ClosingResult<RwLockWriteGuard<'_, ClosingMap>> {
        self.closings
            .write()
            .map_err(|_| ClosingError::Storage("closing store lock poisoned".to_string()))
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ClosingStorage for MemoryStorage {
    async fn save_closing(&mut self, closing: &ClosingRecord) -> ClosingResult<()> {
        let mut closings = self.write()?;
        if closings.contains_key(&closing.id) {
            return Err(ClosingError::ClosingExists(closing.id.clone()));
        }
        closings.insert(closing.id.clone(), closing.clone());
        Ok(())
    }

    async fn get_closing(&self, closing_id: &str) -> ClosingResult<Option<ClosingRecord>> {
        Ok(self.read()?.get(closing_id).cloned())
    }

    async fn find_closing(
        &self,
        store: &str,
        user: &str,
        date: NaiveDate,
    ) -> ClosingResult<Option<ClosingRecord>> {
        Ok(self
            .read()?
            .values()
            .find(|c| c.store == store && c.user == user && c.date == date)
            .cloned())
    }

    async fn list_closings(
        &self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> ClosingResult<Vec<ClosingRecord>> {
        let closings = self.read()?;
        let mut filtered: Vec<ClosingRecord> = closings
            .values()
            .filter(|closing| {
                if let Some(start) = start_date {
                    if closing.date < start {
                        return false;
                    }
                }
                if let Some(end) = end_date {
                    if closing.date > end {
                        return false;
                    }
                }
                true
            })
            .cloned()
            .collect();
        filtered.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
        Ok(filtered)
    }

    async fn update_closing(&mut self, closing: &ClosingRecord) -> ClosingResult<()> {
        let mut closings = self.write()?;
        match closings.get_mut(&closing.id) {
            Some(existing) => {
                *existing = closing.clone();
                Ok(())
            }
            None => Err(ClosingError::ClosingNotFound(closing.id.clone())),
        }
    }

    async fn delete_closing(&mut self, closing_id: &str) -> ClosingResult<()> {
        if self.write()?.remove(closing_id).is_some() {
            Ok(())
        } else {
            Err(ClosingError::ClosingNotFound(closing_id.to_string()))
        }
    }
}
