//! Storage layer: the two analysis tables behind a dependency-injected
//! store trait, plus the repository and refresh feed built on top.

mod error;
pub use error::StoreError;

pub mod store;
pub use store::{ChangeEvent, ChangeFeed, DocumentStore, StoreTable};

mod mem;
pub use mem::MemStore;

#[cfg(feature = "duckdb")]
mod duck;
#[cfg(feature = "duckdb")]
pub use duck::DuckStore;

mod repo;
pub use repo::DocumentRepository;

mod feed;
pub use feed::{DocumentFeed, FeedSnapshot};
