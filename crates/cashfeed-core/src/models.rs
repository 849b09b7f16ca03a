//! Feed data models

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use cashfeed_store::{ForecastDoc, TransactionDoc};

use crate::cursor::Cursor;

/// Parse the calendar day at the start of an ISO date or timestamp
pub fn calendar_date(date: &str) -> Option<NaiveDate> {
    let day = date.get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// A fetched transaction, immutable once in the feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Unique within the store
    pub id: String,
    /// Store sign convention (debits positive)
    pub amount: Decimal,
    /// ISO date string
    pub date: String,
    pub counterparty_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant_entity_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
}

impl Record {
    pub fn calendar_date(&self) -> Option<NaiveDate> {
        calendar_date(&self.date)
    }

    /// Position of this record in feed order
    pub fn cursor(&self) -> Cursor {
        Cursor::new(&self.date, &self.id)
    }
}

impl From<TransactionDoc> for Record {
    fn from(doc: TransactionDoc) -> Self {
        let counterparty_name = doc
            .counterparty_name
            .filter(|n| !n.is_empty())
            .or(doc.name.filter(|n| !n.is_empty()))
            .unwrap_or_else(|| "Unknown".to_string());

        Self {
            id: doc.id,
            amount: doc.amount,
            date: doc.date,
            counterparty_name,
            merchant_name: doc.merchant_name,
            merchant_entity_id: doc.merchant_entity_id,
            logo_url: doc.logo_url,
        }
    }
}

/// A user-entered projected transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRecord {
    /// Assigned by the store on persistence
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub user_id: String,
    pub amount: Decimal,
    pub date: String,
    pub counterparty_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant_entity_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
}

impl ForecastRecord {
    pub fn calendar_date(&self) -> Option<NaiveDate> {
        calendar_date(&self.date)
    }
}

impl From<ForecastDoc> for ForecastRecord {
    fn from(doc: ForecastDoc) -> Self {
        Self {
            id: doc.id,
            user_id: doc.user_id,
            amount: doc.amount,
            date: doc.date,
            counterparty_name: doc.counterparty_name,
            merchant_name: doc.merchant_name,
            merchant_entity_id: doc.merchant_entity_id,
            logo_url: doc.logo_url,
        }
    }
}

/// One page of the feed as returned by the page fetcher
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub items: Vec<Record>,
    /// Last item's position, or the request cursor when the page is empty
    pub next_cursor: Option<Cursor>,
    /// The page came back exactly full
    pub has_more: bool,
}

/// Merged feed entry, tagged with where it came from. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum DisplayItem {
    Record(Record),
    Forecast(ForecastRecord),
}

impl DisplayItem {
    pub fn is_forecast(&self) -> bool {
        matches!(self, DisplayItem::Forecast(_))
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            DisplayItem::Record(r) => Some(r.id.as_str()),
            DisplayItem::Forecast(f) => f.id.as_deref(),
        }
    }

    pub fn date(&self) -> &str {
        match self {
            DisplayItem::Record(r) => &r.date,
            DisplayItem::Forecast(f) => &f.date,
        }
    }

    pub fn calendar_date(&self) -> Option<NaiveDate> {
        calendar_date(self.date())
    }

    /// Stored amount, before display sign inversion
    pub fn amount(&self) -> Decimal {
        match self {
            DisplayItem::Record(r) => r.amount,
            DisplayItem::Forecast(f) => f.amount,
        }
    }

    pub fn counterparty_name(&self) -> &str {
        match self {
            DisplayItem::Record(r) => &r.counterparty_name,
            DisplayItem::Forecast(f) => &f.counterparty_name,
        }
    }

    pub fn merchant_name(&self) -> Option<&str> {
        match self {
            DisplayItem::Record(r) => r.merchant_name.as_deref(),
            DisplayItem::Forecast(f) => f.merchant_name.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(counterparty: Option<&str>, name: Option<&str>) -> TransactionDoc {
        TransactionDoc {
            id: "t1".to_string(),
            user_id: "u1".to_string(),
            amount: Decimal::new(999, 2),
            date: "2024-03-05".to_string(),
            counterparty_name: counterparty.map(str::to_string),
            name: name.map(str::to_string),
            merchant_name: Some("Corner Cafe".to_string()),
            merchant_entity_id: None,
            logo_url: None,
        }
    }

    #[test]
    fn test_counterparty_fallbacks() {
        assert_eq!(Record::from(doc(Some("Acme"), Some("Old"))).counterparty_name, "Acme");
        assert_eq!(Record::from(doc(None, Some("Old"))).counterparty_name, "Old");
        assert_eq!(Record::from(doc(Some(""), None)).counterparty_name, "Unknown");
        assert_eq!(Record::from(doc(None, None)).counterparty_name, "Unknown");
    }

    #[test]
    fn test_calendar_date_ignores_time_of_day() {
        assert_eq!(
            calendar_date("2024-03-05T23:59:00Z"),
            NaiveDate::from_ymd_opt(2024, 3, 5)
        );
        assert_eq!(calendar_date("2024-03-05"), NaiveDate::from_ymd_opt(2024, 3, 5));
        assert_eq!(calendar_date("yesterday"), None);
        assert_eq!(calendar_date(""), None);
    }

    #[test]
    fn test_record_cursor() {
        let record = Record::from(doc(Some("Acme"), None));
        let cursor = record.cursor();
        assert_eq!(cursor.date, "2024-03-05");
        assert_eq!(cursor.id, "t1");
    }

    #[test]
    fn test_display_item_accessors() {
        let item = DisplayItem::Record(Record::from(doc(Some("Acme"), None)));
        assert!(!item.is_forecast());
        assert_eq!(item.id(), Some("t1"));
        assert_eq!(item.merchant_name(), Some("Corner Cafe"));

        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["source"], "record");
        assert_eq!(json["counterparty_name"], "Acme");
    }
}
