//! In-memory record store

use async_trait::async_trait;
use std::cmp::Ordering;
use std::path::Path;
use std::sync::RwLock;

use crate::error::StoreError;
use crate::types::{Fixture, ForecastDoc, RecordQuery, TransactionDoc};
use crate::RecordStore;

#[derive(Debug, Default)]
struct MemoryData {
    transactions: Vec<TransactionDoc>,
    forecasts: Vec<ForecastDoc>,
}

/// Process-local store with the same query semantics as the remote one
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<MemoryData>,
}

fn poisoned() -> StoreError {
    StoreError::Unavailable {
        message: "store lock poisoned".to_string(),
    }
}

/// Feed order: date descending, then id descending
fn feed_order(a: &TransactionDoc, b: &TransactionDoc) -> Ordering {
    b.sort_key().cmp(&a.sort_key())
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from already-decoded documents
    pub fn with_documents(transactions: Vec<TransactionDoc>, forecasts: Vec<ForecastDoc>) -> Self {
        Self {
            data: RwLock::new(MemoryData {
                transactions,
                forecasts,
            }),
        }
    }

    /// Seed a store from a JSON fixture on disk
    pub async fn from_fixture(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let content = tokio::fs::read_to_string(path.as_ref()).await?;
        let fixture: Fixture = serde_json::from_str(&content)?;
        log::info!(
            "Store fixture loaded: {} transactions, {} forecasts",
            fixture.transactions.len(),
            fixture.forecasts.len()
        );
        Ok(Self::with_documents(fixture.transactions, fixture.forecasts))
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn query_records(&self, query: &RecordQuery) -> Result<Vec<TransactionDoc>, StoreError> {
        let data = self.data.read().map_err(|_| poisoned())?;

        let mut rows: Vec<&TransactionDoc> = data
            .transactions
            .iter()
            .filter(|t| t.user_id == query.owner)
            .filter(|t| match &query.start_after {
                Some(start) => t.sort_key() < (start.date.as_str(), start.id.as_str()),
                None => true,
            })
            .collect();
        rows.sort_by(|a, b| feed_order(a, b));

        Ok(rows.into_iter().take(query.limit).cloned().collect())
    }

    async fn query_forecasts(&self, user_id: &str) -> Result<Vec<ForecastDoc>, StoreError> {
        let data = self.data.read().map_err(|_| poisoned())?;

        let mut rows: Vec<ForecastDoc> = data
            .forecasts
            .iter()
            .filter(|f| f.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.date.cmp(&a.date));

        Ok(rows)
    }

    async fn insert_forecast(&self, mut forecast: ForecastDoc) -> Result<String, StoreError> {
        if forecast.user_id.is_empty() {
            return Err(StoreError::Rejected {
                message: "forecast has no owner".to_string(),
            });
        }

        let id = cashfeed_utils::generate_id("fc");
        forecast.id = Some(id.clone());

        let mut data = self.data.write().map_err(|_| poisoned())?;
        data.forecasts.push(forecast);
        log::debug!("Forecast stored: {}", id);

        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn txn(id: &str, user: &str, date: &str) -> TransactionDoc {
        TransactionDoc {
            id: id.to_string(),
            user_id: user.to_string(),
            amount: Decimal::new(1250, 2),
            date: date.to_string(),
            counterparty_name: Some("Shop".to_string()),
            name: None,
            merchant_name: None,
            merchant_entity_id: None,
            logo_url: None,
        }
    }

    fn store() -> MemoryStore {
        MemoryStore::with_documents(
            vec![
                txn("a", "u1", "2024-01-01"),
                txn("c", "u1", "2024-01-03"),
                txn("b", "u1", "2024-01-03"),
                txn("z", "u2", "2024-01-05"),
                txn("d", "u1", "2024-01-02"),
            ],
            vec![],
        )
    }

    #[tokio::test]
    async fn test_query_orders_by_date_then_id_desc() {
        let rows = store()
            .query_records(&RecordQuery::first_page("u1", 10))
            .await
            .unwrap();
        let ids: Vec<_> = rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "d", "a"]);
    }

    #[tokio::test]
    async fn test_query_start_after_is_exclusive() {
        let query = RecordQuery::first_page("u1", 2).after("2024-01-03", "c");
        let rows = store().query_records(&query).await.unwrap();
        let ids: Vec<_> = rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "d"]);
    }

    #[tokio::test]
    async fn test_query_filters_owner() {
        let rows = store()
            .query_records(&RecordQuery::first_page("u2", 10))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, "z");
    }

    #[tokio::test]
    async fn test_insert_forecast_assigns_id() {
        let store = MemoryStore::new();
        let id = store
            .insert_forecast(ForecastDoc {
                id: None,
                user_id: "u1".to_string(),
                amount: Decimal::new(-50, 0),
                date: "2024-01-01".to_string(),
                counterparty_name: "Rent".to_string(),
                merchant_name: None,
                merchant_entity_id: None,
                logo_url: None,
            })
            .await
            .unwrap();

        let forecasts = store.query_forecasts("u1").await.unwrap();
        assert_eq!(forecasts.len(), 1);
        assert_eq!(forecasts[0].id.as_deref(), Some(id.as_str()));
        assert!(store.query_forecasts("u2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_insert_forecast_without_owner_rejected() {
        let store = MemoryStore::new();
        let err = store
            .insert_forecast(ForecastDoc {
                id: None,
                user_id: String::new(),
                amount: Decimal::new(-1, 0),
                date: "2024-01-01".to_string(),
                counterparty_name: "Gym".to_string(),
                merchant_name: None,
                merchant_entity_id: None,
                logo_url: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Rejected { .. }));
    }

    #[tokio::test]
    async fn test_fixture_missing_file() {
        let err = MemoryStore::from_fixture("/nonexistent/feed.json").await.unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
        assert!(err.to_string().starts_with("IO error: "));
        assert!(err.to_string().len() > "IO error: ".len());
    }

    #[test]
    fn test_fixture_decodes_numeric_amounts() {
        let fixture: Fixture = serde_json::from_str(
            r#"{"transactions":[{"id":"t1","user_id":"u1","amount":12.5,"date":"2024-02-01","name":"Cafe"}]}"#,
        )
        .unwrap();
        assert_eq!(fixture.transactions[0].amount, Decimal::new(125, 1));
        assert!(fixture.forecasts.is_empty());
        assert_eq!(fixture.transactions[0].name.as_deref(), Some("Cafe"));
    }
}
