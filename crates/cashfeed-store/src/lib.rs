//! Record store contract
//!
//! The remote paginated store is an external collaborator. This crate fixes
//! the contract the feed engine consumes and ships an in-memory
//! implementation used by the CLI and by tests.

use async_trait::async_trait;
use std::sync::Arc;

pub mod error;
pub mod memory;
pub mod types;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use types::{Fixture, ForecastDoc, RecordQuery, StartAfter, TransactionDoc};

/// Store reference type
pub type StoreRef = Arc<dyn RecordStore>;

/// Trait for the paginated record store and forecast persistence
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Run a feed query: owner filter, `date desc, id desc`, exclusive start, limit
    async fn query_records(&self, query: &RecordQuery) -> Result<Vec<TransactionDoc>, StoreError>;

    /// All forecasts of a user, newest date first
    async fn query_forecasts(&self, user_id: &str) -> Result<Vec<ForecastDoc>, StoreError>;

    /// Persist a forecast and return the id the store assigned
    async fn insert_forecast(&self, forecast: ForecastDoc) -> Result<String, StoreError>;
}
