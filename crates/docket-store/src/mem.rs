//! In-memory store.
//!
//! The dependency-injected stand-in for the real datastore: tests build
//! their fixtures on it, and demos run against it without touching disk.

use std::sync::Mutex;

use async_trait::async_trait;
use docket_core::rows::{ContractRow, ResearchRow};
use tokio::sync::broadcast;

use crate::StoreError;
use crate::store::{ChangeEvent, ChangeFeed, DocumentStore, StoreTable};

#[derive(Default)]
pub struct MemStore {
    contracts: Mutex<Vec<ContractRow>>,
    research: Mutex<Vec<ResearchRow>>,
    feed: ChangeFeed,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_contract(&self, row: ContractRow) {
        self.contracts
            .lock()
            .expect("contract rows lock poisoned")
            .push(row);
        self.feed.notify(StoreTable::ContractAnalysis);
    }

    pub fn insert_research(&self, row: ResearchRow) {
        self.research
            .lock()
            .expect("research rows lock poisoned")
            .push(row);
        self.feed.notify(StoreTable::LegalResearch);
    }
}

#[async_trait]
impl DocumentStore for MemStore {
    async fn contract_rows(&self) -> Result<Vec<ContractRow>, StoreError> {
        let mut rows = self
            .contracts
            .lock()
            .expect("contract rows lock poisoned")
            .clone();
        // ISO 8601 strings sort chronologically; newest first.
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn research_rows(&self) -> Result<Vec<ResearchRow>, StoreError> {
        let mut rows = self
            .research
            .lock()
            .expect("research rows lock poisoned")
            .clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn delete(&self, table: StoreTable, id: &str) -> Result<(), StoreError> {
        let removed = match table {
            StoreTable::ContractAnalysis => {
                let mut rows = self.contracts.lock().expect("contract rows lock poisoned");
                let before = rows.len();
                rows.retain(|row| row.id != id);
                rows.len() < before
            }
            StoreTable::LegalResearch => {
                let mut rows = self.research.lock().expect("research rows lock poisoned");
                let before = rows.len();
                rows.retain(|row| row.id.to_string() != id);
                rows.len() < before
            }
        };
        if !removed {
            return Err(StoreError::NotFound(id.to_string()));
        }
        self.feed.notify(table);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.feed.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contract(id: &str, created_at: &str) -> ContractRow {
        ContractRow {
            id: id.to_string(),
            created_at: Some(created_at.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn rows_come_back_newest_first() {
        let store = MemStore::new();
        store.insert_contract(contract("older", "2026-01-01T00:00:00Z"));
        store.insert_contract(contract("newer", "2026-02-01T00:00:00Z"));

        let rows = store.contract_rows().await.unwrap();
        assert_eq!(rows[0].id, "newer");
        assert_eq!(rows[1].id, "older");
    }

    #[tokio::test]
    async fn delete_removes_and_notifies() {
        let store = MemStore::new();
        store.insert_contract(contract("a", "2026-01-01T00:00:00Z"));
        let mut rx = store.subscribe();

        store
            .delete(StoreTable::ContractAnalysis, "a")
            .await
            .unwrap();
        assert!(store.contract_rows().await.unwrap().is_empty());
        assert_eq!(
            rx.recv().await.unwrap().table,
            StoreTable::ContractAnalysis
        );
    }

    #[tokio::test]
    async fn delete_missing_row_errors() {
        let store = MemStore::new();
        let result = store.delete(StoreTable::LegalResearch, "999").await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn research_rows_delete_by_stringified_id() {
        let store = MemStore::new();
        store.insert_research(ResearchRow {
            id: 7,
            created_at: "2026-01-01T00:00:00Z".to_string(),
            ..Default::default()
        });
        store.delete(StoreTable::LegalResearch, "7").await.unwrap();
        assert!(store.research_rows().await.unwrap().is_empty());
    }
}
