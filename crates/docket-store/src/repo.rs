//! Repository: merged, decoded view over both backing tables.

use std::sync::Arc;

use docket_core::model::{Document, DocumentType};
use docket_core::{decode_contract_row, decode_research_row};
use tracing::{info, warn};

use crate::StoreError;
use crate::store::{DocumentStore, StoreTable};

/// Fetches, decodes, merges, and deletes persisted analysis records.
///
/// Holds no cache: every fetch decodes fresh rows, and after a delete the
/// caller is expected to re-fetch rather than patch in place.
pub struct DocumentRepository {
    store: Arc<dyn DocumentStore>,
}

impl DocumentRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Fetch and decode every document from both tables, newest first.
    ///
    /// A failing table is logged and contributes zero rows; the fetch as a
    /// whole fails only when both tables fail. The two source orderings are
    /// independent queries, so the union is defensively re-sorted.
    pub async fn fetch_all(&self) -> Result<Vec<Document>, StoreError> {
        let mut failures: Vec<StoreError> = Vec::new();

        let contracts = match self.store.contract_rows().await {
            Ok(rows) => rows,
            Err(err) => {
                warn!(error = %err, table = StoreTable::ContractAnalysis.as_str(),
                    "fetch failed, treating as empty");
                failures.push(err);
                Vec::new()
            }
        };
        let research = match self.store.research_rows().await {
            Ok(rows) => rows,
            Err(err) => {
                warn!(error = %err, table = StoreTable::LegalResearch.as_str(),
                    "fetch failed, treating as empty");
                failures.push(err);
                Vec::new()
            }
        };

        if failures.len() == 2
            && let Some(err) = failures.pop()
        {
            return Err(err);
        }

        let mut documents: Vec<Document> = contracts
            .iter()
            .map(decode_contract_row)
            .chain(research.iter().map(decode_research_row))
            .collect();
        documents.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        info!(count = documents.len(), "fetched documents");
        Ok(documents)
    }

    /// Delete one document's backing row from the table matching its type.
    pub async fn delete(&self, id: &str, document_type: DocumentType) -> Result<(), StoreError> {
        self.store
            .delete(StoreTable::for_document_type(document_type), id)
            .await
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemStore;
    use crate::store::ChangeEvent;
    use async_trait::async_trait;
    use docket_core::rows::{ContractRow, ResearchRow};
    use tokio::sync::broadcast;

    /// Store whose tables can be made to fail independently.
    struct FlakyStore {
        inner: MemStore,
        fail_contracts: bool,
        fail_research: bool,
    }

    #[async_trait]
    impl DocumentStore for FlakyStore {
        async fn contract_rows(&self) -> Result<Vec<ContractRow>, StoreError> {
            if self.fail_contracts {
                return Err(StoreError::Other("contracts unavailable".to_string()));
            }
            self.inner.contract_rows().await
        }

        async fn research_rows(&self) -> Result<Vec<ResearchRow>, StoreError> {
            if self.fail_research {
                return Err(StoreError::Other("research unavailable".to_string()));
            }
            self.inner.research_rows().await
        }

        async fn delete(&self, table: StoreTable, id: &str) -> Result<(), StoreError> {
            self.inner.delete(table, id).await
        }

        fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
            self.inner.subscribe()
        }
    }

    fn seeded_mem_store() -> MemStore {
        let store = MemStore::new();
        store.insert_contract(ContractRow {
            id: "c-1".to_string(),
            created_at: Some("2026-01-10T00:00:00Z".to_string()),
            ..Default::default()
        });
        store.insert_research(ResearchRow {
            id: 5,
            created_at: "2026-01-20T00:00:00Z".to_string(),
            ..Default::default()
        });
        store.insert_contract(ContractRow {
            id: "c-2".to_string(),
            created_at: Some("2026-01-30T00:00:00Z".to_string()),
            ..Default::default()
        });
        store
    }

    #[tokio::test]
    async fn merges_both_tables_sorted_by_created_at_desc() {
        let repo = DocumentRepository::new(Arc::new(seeded_mem_store()));
        let docs = repo.fetch_all().await.unwrap();

        let ids: Vec<&str> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["c-2", "5", "c-1"]);
        assert_eq!(docs[1].document_type, DocumentType::CaseLaw);
    }

    #[tokio::test]
    async fn one_failing_table_degrades_to_partial_results() {
        let repo = DocumentRepository::new(Arc::new(FlakyStore {
            inner: seeded_mem_store(),
            fail_contracts: true,
            fail_research: false,
        }));
        let docs = repo.fetch_all().await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, "5");
    }

    #[tokio::test]
    async fn both_failing_tables_surface_an_error() {
        let repo = DocumentRepository::new(Arc::new(FlakyStore {
            inner: seeded_mem_store(),
            fail_contracts: true,
            fail_research: true,
        }));
        assert!(repo.fetch_all().await.is_err());
    }

    #[tokio::test]
    async fn delete_routes_by_document_type() {
        let store = Arc::new(seeded_mem_store());
        let repo = DocumentRepository::new(store.clone());

        repo.delete("5", DocumentType::CaseLaw).await.unwrap();
        repo.delete("c-1", DocumentType::Contract).await.unwrap();

        let docs = repo.fetch_all().await.unwrap();
        let ids: Vec<&str> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["c-2"]);

        // Wrong table for the id: nothing deleted, error propagated.
        assert!(repo.delete("c-2", DocumentType::CaseLaw).await.is_err());
    }
}
