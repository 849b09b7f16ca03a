//! Store doubles shared by the unit tests

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Notify;

use cashfeed_store::{ForecastDoc, MemoryStore, RecordQuery, RecordStore, StoreError, TransactionDoc};

pub fn doc(id: &str, user: &str, date: &str) -> TransactionDoc {
    TransactionDoc {
        id: id.to_string(),
        user_id: user.to_string(),
        amount: Decimal::new(1000, 2),
        date: date.to_string(),
        counterparty_name: Some(format!("Payee {}", id)),
        name: None,
        merchant_name: None,
        merchant_entity_id: None,
        logo_url: None,
    }
}

/// `count` rows for `user`, two per calendar day starting 2024-01-01
pub fn docs(user: &str, count: usize) -> Vec<TransactionDoc> {
    (0..count)
        .map(|i| doc(&format!("t{:03}", i), user, &format!("2024-01-{:02}", 1 + i / 2)))
        .collect()
}

/// Memory store that can hold, fail, and count calls
#[derive(Default)]
pub struct ScriptedStore {
    inner: MemoryStore,
    query_calls: AtomicUsize,
    failing_queries: AtomicUsize,
    failing_saves: AtomicBool,
    held: AtomicBool,
    gate: Notify,
}

impl ScriptedStore {
    pub fn new(rows: Vec<TransactionDoc>) -> Self {
        Self {
            inner: MemoryStore::with_documents(rows, vec![]),
            ..Default::default()
        }
    }

    pub fn query_calls(&self) -> usize {
        self.query_calls.load(Ordering::SeqCst)
    }

    /// Every following query waits for `release_one`
    pub fn hold_queries(&self) {
        self.held.store(true, Ordering::SeqCst);
    }

    pub fn release_one(&self) {
        self.gate.notify_one();
    }

    pub fn fail_next_queries(&self, count: usize) {
        self.failing_queries.store(count, Ordering::SeqCst);
    }

    pub fn fail_saves(&self, fail: bool) {
        self.failing_saves.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl RecordStore for ScriptedStore {
    async fn query_records(&self, query: &RecordQuery) -> Result<Vec<TransactionDoc>, StoreError> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        if self.held.load(Ordering::SeqCst) {
            self.gate.notified().await;
        }
        let failing = self.failing_queries.load(Ordering::SeqCst);
        if failing > 0 {
            self.failing_queries.store(failing - 1, Ordering::SeqCst);
            return Err(StoreError::Unavailable {
                message: "scripted outage".to_string(),
            });
        }
        self.inner.query_records(query).await
    }

    async fn query_forecasts(&self, user_id: &str) -> Result<Vec<ForecastDoc>, StoreError> {
        self.inner.query_forecasts(user_id).await
    }

    async fn insert_forecast(&self, forecast: ForecastDoc) -> Result<String, StoreError> {
        if self.failing_saves.load(Ordering::SeqCst) {
            return Err(StoreError::Rejected {
                message: "scripted rejection".to_string(),
            });
        }
        self.inner.insert_forecast(forecast).await
    }
}
