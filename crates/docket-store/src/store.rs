//! Store abstraction: two row tables and a change feed.
//!
//! The datastore is injected into the repository as a trait object so tests
//! can substitute a fake without any process-level state.

use async_trait::async_trait;
use docket_core::DocumentType;
use docket_core::rows::{CONTRACT_TABLE, ContractRow, RESEARCH_TABLE, ResearchRow};
use tokio::sync::broadcast;

use crate::StoreError;

/// Which backing table an event or operation refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreTable {
    ContractAnalysis,
    LegalResearch,
}

impl StoreTable {
    pub fn for_document_type(document_type: DocumentType) -> Self {
        match document_type {
            DocumentType::Contract => Self::ContractAnalysis,
            DocumentType::CaseLaw => Self::LegalResearch,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ContractAnalysis => CONTRACT_TABLE,
            Self::LegalResearch => RESEARCH_TABLE,
        }
    }
}

/// A row-level change in one of the backing tables.
///
/// Carries no row payload: subscribers use events purely as a refresh
/// trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeEvent {
    pub table: StoreTable,
}

/// Broadcast fan-out for change events.
///
/// A subscriber that falls behind observes `Lagged`, which costs nothing
/// more than an extra refresh.
#[derive(Debug, Clone)]
pub struct ChangeFeed {
    tx: broadcast::Sender<ChangeEvent>,
}

impl ChangeFeed {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(64);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.tx.subscribe()
    }

    pub fn notify(&self, table: StoreTable) {
        // No subscribers is not an error for a fire-and-forget trigger.
        let _ = self.tx.send(ChangeEvent { table });
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}

/// Row-oriented datastore holding the two analysis tables.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// All contract-analysis rows, newest created first.
    async fn contract_rows(&self) -> Result<Vec<ContractRow>, StoreError>;

    /// All legal-research rows, newest created first.
    async fn research_rows(&self) -> Result<Vec<ResearchRow>, StoreError>;

    /// Delete one row by id from the given table.
    async fn delete(&self, table: StoreTable, id: &str) -> Result<(), StoreError>;

    /// Subscribe to row change events (any event, any column).
    fn subscribe(&self) -> broadcast::Receiver<ChangeEvent>;
}
