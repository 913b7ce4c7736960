//! Replace-whole-list owner of the decoded document list.
//!
//! Fetches are idempotent reads and are deliberately not serialized: a
//! change-triggered refresh may overlap a manual one. Each refresh takes a
//! monotonically increasing token, and a completing fetch is applied only
//! if its token is still the latest issued, so a stale, slower fetch can
//! never overwrite fresher data.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use docket_core::model::Document;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::repo::DocumentRepository;

/// State of the feed after the most recent applied refresh.
#[derive(Debug, Clone, Default)]
pub struct FeedSnapshot {
    pub documents: Vec<Document>,
    /// Banner text when the last applied refresh failed outright.
    pub error: Option<String>,
}

pub struct DocumentFeed {
    repo: Arc<DocumentRepository>,
    issued: AtomicU64,
    state: Mutex<FeedSnapshot>,
}

impl DocumentFeed {
    pub fn new(repo: Arc<DocumentRepository>) -> Self {
        Self {
            repo,
            issued: AtomicU64::new(0),
            state: Mutex::new(FeedSnapshot::default()),
        }
    }

    /// Run one full refresh. Returns whether the outcome was applied.
    ///
    /// The latest-issued check happens under the state lock, so an older
    /// fetch observing a newer token is discarded before it can clobber the
    /// newer fetch's list.
    pub async fn refresh(&self) -> bool {
        let token = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let outcome = self.repo.fetch_all().await;

        let mut state = self.state.lock().expect("feed state lock poisoned");
        let latest = self.issued.load(Ordering::SeqCst);
        if token != latest {
            debug!(token, latest, "discarding stale refresh");
            return false;
        }
        match outcome {
            Ok(documents) => {
                *state = FeedSnapshot {
                    documents,
                    error: None,
                };
            }
            Err(err) => {
                warn!(error = %err, "refresh failed");
                *state = FeedSnapshot {
                    documents: Vec::new(),
                    error: Some("Failed to load documents".to_string()),
                };
            }
        }
        true
    }

    /// Clone of the current document list and error banner.
    pub fn snapshot(&self) -> FeedSnapshot {
        self.state.lock().expect("feed state lock poisoned").clone()
    }

    pub fn repository(&self) -> &Arc<DocumentRepository> {
        &self.repo
    }

    /// Spawn a task that re-runs a full refresh on every change event.
    ///
    /// No incremental merge is attempted; write volume is low and a full
    /// re-fetch keeps the ownership story trivial. Abort the returned handle
    /// on teardown.
    pub fn spawn_watcher(self: &Arc<Self>) -> JoinHandle<()> {
        let feed = Arc::clone(self);
        let mut events = feed.repo.store().subscribe();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => {
                        debug!(table = event.table.as_str(), "change event, refreshing");
                        feed.refresh().await;
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "change feed lagged, refreshing once");
                        feed.refresh().await;
                    }
                    Err(RecvError::Closed) => {
                        debug!("change feed closed, watcher exiting");
                        break;
                    }
                }
            }
        })
    }
}
