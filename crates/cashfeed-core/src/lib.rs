//! Feed pagination and forecast overlay engine
//!
//! Loads a user's transactions page by page from a [`RecordStore`], keeps a
//! stable cursor between pages, lets visibility events request more, and
//! overlays the user's forecasts onto the loaded feed in date order.
//!
//! [`RecordStore`]: cashfeed_store::RecordStore

pub mod coordinator;
pub mod cursor;
pub mod error;
pub mod fetcher;
pub mod forecast;
pub mod merge;
pub mod models;
pub mod session;
pub mod trigger;
pub mod types;

#[cfg(test)]
mod test_support;

use std::sync::Arc;
use std::time::Duration;

use cashfeed_config::Config;
use cashfeed_store::StoreRef;

pub use coordinator::{FeedSnapshot, LoadCoordinator};
pub use cursor::Cursor;
pub use error::{CoreError, CoreResult, ErrorCode, ErrorDetails, ErrorSeverity};
pub use fetcher::{PageFetcher, DEFAULT_PAGE_SIZE};
pub use forecast::{ForecastBook, ForecastDraft};
pub use merge::{display_amount, invert, merge, AmountFormatter};
pub use models::{DisplayItem, ForecastRecord, Page, Record};
pub use session::{SessionProvider, SessionRef, StaticSession};
pub use trigger::{ChannelObserver, SentinelHandle, ViewportObserver, VisibilityEvent, VisibilityTrigger};
pub use types::{LoadOutcome, LoadPhase, SkipReason};

/// One open feed screen: paged records, forecasts, and their merged view
///
/// Created when the user's session starts and dropped (or closed) when the
/// screen goes away. Nothing here outlives the process.
pub struct FeedView {
    config: Config,
    session: SessionRef,
    coordinator: Arc<LoadCoordinator>,
    forecasts: ForecastBook,
}

impl FeedView {
    pub fn new(config: Config, store: StoreRef, session: SessionRef) -> Self {
        let coordinator = LoadCoordinator::new(
            PageFetcher::new(store.clone()),
            session.clone(),
            config.feed.page_size,
        )
        .with_fetch_timeout(config.feed.fetch_timeout_ms.map(Duration::from_millis));

        Self {
            config,
            session,
            coordinator: Arc::new(coordinator),
            forecasts: ForecastBook::new(store),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn coordinator(&self) -> Arc<LoadCoordinator> {
        self.coordinator.clone()
    }

    /// Initial page plus the forecast set
    ///
    /// A forecast fetch failure is logged and leaves the overlay empty; only
    /// the page load decides the result.
    pub async fn open(&mut self) -> CoreResult<LoadOutcome> {
        let outcome = self.coordinator.load_initial().await?;

        if self.config.forecast.enabled {
            if let Some(user_id) = self.session.current_user_id() {
                if let Err(e) = self.forecasts.refresh(&user_id).await {
                    log::warn!("Feed opened without forecasts: {}", e);
                }
            }
        }

        Ok(outcome)
    }

    pub async fn load_more(&self) -> CoreResult<LoadOutcome> {
        self.coordinator.load_more().await
    }

    /// Trigger bound to this view's coordinator
    pub fn visibility_trigger(&self, observer: Arc<dyn ViewportObserver>) -> VisibilityTrigger {
        VisibilityTrigger::new(observer, self.coordinator.clone())
    }

    /// Validate and persist a forecast for the signed-in user
    pub async fn add_forecast(&mut self, draft: ForecastDraft) -> CoreResult<String> {
        draft.validate()?;
        let user_id = self.session.current_user_id().ok_or(CoreError::AuthMissing)?;
        self.forecasts.create(&user_id, draft).await
    }

    pub fn forecasts(&self) -> &[ForecastRecord] {
        self.forecasts.forecasts()
    }

    /// Records and forecasts merged newest-first
    pub fn display_items(&self) -> Vec<DisplayItem> {
        let records = self.coordinator.records();
        if self.config.forecast.enabled {
            merge(&records, self.forecasts.forecasts())
        } else {
            merge(&records, &[])
        }
    }

    pub fn formatter(&self) -> AmountFormatter<'_> {
        AmountFormatter::new(&self.config.currency)
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        self.coordinator.snapshot()
    }

    /// Tear the view down; late page results are discarded
    pub fn close(&mut self) {
        self.coordinator.close();
        self.forecasts.clear();
    }
}

// ==================== Tests ====================
