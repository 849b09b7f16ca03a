//! Stored document shapes

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A transaction row as kept by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionDoc {
    pub id: String,
    pub user_id: String,
    /// Native sign: debits positive
    pub amount: Decimal,
    /// ISO date, `YYYY-MM-DD` optionally followed by a time
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counterparty_name: Option<String>,
    /// Legacy display name written by older importers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_entity_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
}

impl TransactionDoc {
    /// Ordering key used by feed queries
    pub fn sort_key(&self) -> (&str, &str) {
        (self.date.as_str(), self.id.as_str())
    }
}

/// A forecast row as kept by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDoc {
    /// Assigned on insert
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub user_id: String,
    pub amount: Decimal,
    pub date: String,
    pub counterparty_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_entity_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
}

/// Exclusive start position of a feed query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartAfter {
    pub date: String,
    pub id: String,
}

/// Owner-filtered, `date desc, id desc` ordered, limited query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordQuery {
    pub owner: String,
    pub start_after: Option<StartAfter>,
    pub limit: usize,
}

impl RecordQuery {
    pub fn first_page(owner: impl Into<String>, limit: usize) -> Self {
        Self {
            owner: owner.into(),
            start_after: None,
            limit,
        }
    }

    pub fn after(mut self, date: impl Into<String>, id: impl Into<String>) -> Self {
        self.start_after = Some(StartAfter {
            date: date.into(),
            id: id.into(),
        });
        self
    }
}

/// On-disk fixture layout
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub transactions: Vec<TransactionDoc>,
    #[serde(default)]
    pub forecasts: Vec<ForecastDoc>,
}
