//! Page fetcher over the record store

use cashfeed_store::{RecordQuery, StoreRef};

use crate::cursor::Cursor;
use crate::error::{CoreError, CoreResult};
use crate::models::{Page, Record};

/// Default records per page
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Turns cursor-based page requests into store queries
#[derive(Clone)]
pub struct PageFetcher {
    store: StoreRef,
}

impl PageFetcher {
    pub fn new(store: StoreRef) -> Self {
        Self { store }
    }

    /// Fetch the page that follows `cursor` (or the first page for `None`)
    ///
    /// `has_more` is true iff the page came back exactly full, so a feed whose
    /// length is a multiple of `page_size` costs one trailing empty fetch.
    pub async fn fetch_page(
        &self,
        user_id: &str,
        cursor: Option<&Cursor>,
        page_size: usize,
    ) -> CoreResult<Page> {
        if user_id.is_empty() {
            return Err(CoreError::validation("user_id", "must not be empty"));
        }
        if page_size == 0 {
            return Err(CoreError::validation("page_size", "must be greater than 0"));
        }

        let mut query = RecordQuery::first_page(user_id, page_size);
        query.start_after = cursor.map(Cursor::start_after);

        let docs = self
            .store
            .query_records(&query)
            .await
            .map_err(CoreError::fetch)?;

        let has_more = docs.len() == page_size;
        let items: Vec<Record> = docs.into_iter().map(Record::from).collect();
        let next_cursor = match items.last() {
            Some(last) => Some(last.cursor()),
            None => cursor.cloned(),
        };

        log::debug!(
            "Fetched page for {} after {:?}: {} items, has_more={}",
            user_id,
            cursor.map(|c| c.to_string()),
            items.len(),
            has_more
        );

        Ok(Page {
            items,
            next_cursor,
            has_more,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cashfeed_store::{MemoryStore, TransactionDoc};
    use rust_decimal::Decimal;
    use std::sync::Arc;

    fn seeded(count: usize) -> PageFetcher {
        let docs = (0..count)
            .map(|i| TransactionDoc {
                id: format!("t{:03}", i),
                user_id: "u1".to_string(),
                amount: Decimal::new(i as i64, 0),
                date: format!("2024-01-{:02}", 1 + i % 28),
                counterparty_name: Some(format!("Payee {}", i)),
                name: None,
                merchant_name: None,
                merchant_entity_id: None,
                logo_url: None,
            })
            .collect();
        PageFetcher::new(Arc::new(MemoryStore::with_documents(docs, vec![])))
    }

    #[tokio::test]
    async fn test_full_page_reports_more() {
        let page = seeded(25).fetch_page("u1", None, 20).await.unwrap();
        assert_eq!(page.items.len(), 20);
        assert!(page.has_more);
        assert_eq!(page.next_cursor, Some(page.items[19].cursor()));
    }

    #[tokio::test]
    async fn test_short_page_reports_end() {
        let fetcher = seeded(25);
        let first = fetcher.fetch_page("u1", None, 20).await.unwrap();
        let second = fetcher
            .fetch_page("u1", first.next_cursor.as_ref(), 20)
            .await
            .unwrap();
        assert_eq!(second.items.len(), 5);
        assert!(!second.has_more);
    }

    #[tokio::test]
    async fn test_empty_page_keeps_cursor() {
        let cursor = Cursor::new("2000-01-01", "t000");
        let page = seeded(3).fetch_page("u1", Some(&cursor), 20).await.unwrap();
        assert!(page.items.is_empty());
        assert!(!page.has_more);
        assert_eq!(page.next_cursor, Some(cursor));
    }

    #[tokio::test]
    async fn test_input_validation() {
        let fetcher = seeded(1);
        assert!(matches!(
            fetcher.fetch_page("", None, 20).await,
            Err(CoreError::Validation { .. })
        ));
        assert!(matches!(
            fetcher.fetch_page("u1", None, 0).await,
            Err(CoreError::Validation { .. })
        ));
    }
}
