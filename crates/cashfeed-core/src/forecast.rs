//! Forecast entry and the per-user forecast set

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use cashfeed_store::{ForecastDoc, StoreRef};

use crate::error::{CoreError, CoreResult, DefaultErrorLogger, ErrorContext, ErrorLogger};
use crate::models::ForecastRecord;

/// What the user typed into the forecast form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDraft {
    /// Positive magnitude; stored negated
    pub amount: Decimal,
    pub date: String,
    pub counterparty_name: String,
    #[serde(default)]
    pub merchant_name: Option<String>,
    #[serde(default)]
    pub merchant_entity_id: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
}

impl ForecastDraft {
    pub fn new(amount: Decimal, date: &str, counterparty_name: &str) -> Self {
        Self {
            amount,
            date: date.to_string(),
            counterparty_name: counterparty_name.to_string(),
            merchant_name: None,
            merchant_entity_id: None,
            logo_url: None,
        }
    }

    /// Read an amount field as entered ("50", "12.99")
    pub fn parse_amount(input: &str) -> CoreResult<Decimal> {
        Decimal::from_str(input.trim())
            .map_err(|_| CoreError::validation("amount", "is not a number"))
    }

    /// Reject the draft before anything is written
    pub fn validate(&self) -> CoreResult<()> {
        if self.amount <= Decimal::ZERO {
            return Err(CoreError::validation("amount", "must be greater than 0"));
        }
        let date = self.date.trim();
        if date.is_empty() {
            return Err(CoreError::validation("date", "is required"));
        }
        if NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err() {
            return Err(CoreError::validation("date", "must be YYYY-MM-DD"));
        }
        if self.counterparty_name.trim().is_empty() {
            return Err(CoreError::validation("counterparty_name", "is required"));
        }
        Ok(())
    }

    /// Store document for `user_id`, amount negated into an outflow
    pub fn into_doc(self, user_id: &str) -> ForecastDoc {
        ForecastDoc {
            id: None,
            user_id: user_id.to_string(),
            amount: -self.amount,
            date: self.date.trim().to_string(),
            counterparty_name: self.counterparty_name.trim().to_string(),
            merchant_name: self.merchant_name,
            merchant_entity_id: self.merchant_entity_id,
            logo_url: self.logo_url,
        }
    }
}

/// The signed-in user's forecasts, always fetched in full
pub struct ForecastBook {
    store: StoreRef,
    forecasts: Vec<ForecastRecord>,
    logger: DefaultErrorLogger,
}

impl ForecastBook {
    pub fn new(store: StoreRef) -> Self {
        Self {
            store,
            forecasts: Vec::new(),
            logger: DefaultErrorLogger,
        }
    }

    pub fn forecasts(&self) -> &[ForecastRecord] {
        &self.forecasts
    }

    pub fn clear(&mut self) {
        self.forecasts.clear();
    }

    /// Replace the held set with the store's current one
    pub async fn refresh(&mut self, user_id: &str) -> CoreResult<&[ForecastRecord]> {
        let docs = match self.store.query_forecasts(user_id).await {
            Ok(docs) => docs,
            Err(e) => {
                let error = CoreError::fetch(e);
                self.logger
                    .log_error(&error, &ErrorContext::new("refresh_forecasts").with_user_id(user_id));
                return Err(error);
            }
        };

        self.forecasts = docs.into_iter().map(ForecastRecord::from).collect();
        log::debug!("Loaded {} forecasts for {}", self.forecasts.len(), user_id);
        Ok(&self.forecasts)
    }

    /// Validate, negate, persist, then re-read the whole set
    ///
    /// If the save succeeds but the re-read fails, the new forecast is added
    /// locally so it still shows up.
    pub async fn create(&mut self, user_id: &str, draft: ForecastDraft) -> CoreResult<String> {
        draft.validate()?;

        let doc = draft.into_doc(user_id);
        let id = match self.store.insert_forecast(doc.clone()).await {
            Ok(id) => id,
            Err(e) => {
                let error = CoreError::save(e);
                self.logger
                    .log_error(&error, &ErrorContext::new("save_forecast").with_user_id(user_id));
                return Err(error);
            }
        };
        log::info!("Forecast {} saved for {}", id, user_id);

        if self.refresh(user_id).await.is_err() {
            self.logger.log_warning(
                "forecast saved but re-read failed; showing local copy",
                &ErrorContext::new("save_forecast").with_user_id(user_id),
            );
            let mut record = ForecastRecord::from(doc);
            record.id = Some(id.clone());
            self.forecasts.push(record);
        }

        Ok(id)
    }
}
