//! Load coordinator
//!
//! Owns the feed state and drives the initial-load / load-more state
//! machine. At most one fetch runs at a time: the in-flight flag is set under
//! the state lock before the fetch is awaited, and any request that finds it
//! set is dropped. The lock is never held across an await.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use serde::Serialize;

use crate::cursor::Cursor;
use crate::error::{CoreError, CoreResult, DefaultErrorLogger, ErrorContext, ErrorDetails, ErrorLogger};
use crate::fetcher::PageFetcher;
use crate::models::{Page, Record};
use crate::session::SessionRef;
use crate::types::{LoadOutcome, LoadPhase, SkipReason};

/// Mutable feed state, only ever touched by the coordinator
#[derive(Debug)]
struct FeedState {
    records: Vec<Record>,
    seen: HashSet<String>,
    cursor: Option<Cursor>,
    has_more: bool,
    load_in_flight: bool,
    initial_load_complete: bool,
    phase: LoadPhase,
    last_error: Option<ErrorDetails>,
    /// Bumped on close; fetches started under an older value are discarded
    generation: u64,
}

impl FeedState {
    fn new(generation: u64) -> Self {
        Self {
            records: Vec::new(),
            seen: HashSet::new(),
            cursor: None,
            has_more: true,
            load_in_flight: false,
            initial_load_complete: false,
            phase: LoadPhase::Idle,
            last_error: None,
            generation,
        }
    }

    /// Append records not already in the feed; returns how many were kept
    fn append(&mut self, items: Vec<Record>) -> usize {
        let mut appended = 0;
        for record in items {
            if self.seen.insert(record.id.clone()) {
                self.records.push(record);
                appended += 1;
            } else {
                log::warn!("Dropping duplicate record {} from page", record.id);
            }
        }
        appended
    }

    /// Move the cursor forward; a page that would move it back is ignored
    fn advance_cursor(&mut self, next: Option<Cursor>) {
        let Some(next) = next else { return };
        let moves_forward = match &self.cursor {
            None => true,
            Some(current) if next.is_past(current) => true,
            Some(current) => {
                if &next != current {
                    log::warn!("Out-of-order page: cursor {} kept over {}", current, next);
                }
                false
            }
        };
        if moves_forward {
            self.cursor = Some(next);
        }
    }

    fn finish(&mut self, has_more: bool) {
        self.has_more = self.has_more && has_more;
        self.load_in_flight = false;
        self.last_error = None;
        self.phase = if self.has_more {
            LoadPhase::Idle
        } else {
            LoadPhase::Exhausted
        };
    }
}

/// Read-only view of the feed state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedSnapshot {
    pub records: Vec<Record>,
    pub cursor: Option<Cursor>,
    pub has_more: bool,
    pub load_in_flight: bool,
    pub initial_load_complete: bool,
    pub phase: LoadPhase,
    pub last_error: Option<ErrorDetails>,
}

/// Single-flight page loading for one feed view
pub struct LoadCoordinator {
    fetcher: PageFetcher,
    session: SessionRef,
    page_size: usize,
    fetch_timeout: Option<Duration>,
    state: Mutex<FeedState>,
    logger: DefaultErrorLogger,
}

impl LoadCoordinator {
    pub fn new(fetcher: PageFetcher, session: SessionRef, page_size: usize) -> Self {
        Self {
            fetcher,
            session,
            page_size,
            fetch_timeout: None,
            state: Mutex::new(FeedState::new(0)),
            logger: DefaultErrorLogger,
        }
    }

    /// Treat a fetch that takes longer than `timeout` as failed
    pub fn with_fetch_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    fn state(&self) -> MutexGuard<'_, FeedState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Load the first page. Allowed once, or again after a failed attempt.
    pub async fn load_initial(&self) -> CoreResult<LoadOutcome> {
        let (user_id, generation) = {
            let mut state = self.state();
            if state.load_in_flight {
                return Ok(LoadOutcome::Skipped(SkipReason::InFlight));
            }
            if state.initial_load_complete {
                return Ok(LoadOutcome::Skipped(SkipReason::AlreadyLoaded));
            }

            let Some(user_id) = self.session.current_user_id() else {
                // Nothing to retry without a user: settle on an empty feed
                state.records.clear();
                state.seen.clear();
                state.has_more = false;
                state.initial_load_complete = true;
                state.phase = LoadPhase::Exhausted;
                state.last_error = Some(CoreError::AuthMissing.to_details());
                drop(state);
                self.report(&CoreError::AuthMissing, "load_initial", None);
                return Err(CoreError::AuthMissing);
            };

            state.load_in_flight = true;
            state.phase = LoadPhase::LoadingInitial;
            log::debug!("Feed phase -> {} for {}", state.phase, user_id);
            (user_id, state.generation)
        };

        let result = self.fetch(&user_id, None).await;

        let still_active = self.is_active_user(&user_id);
        let mut state = self.state();
        if state.generation != generation {
            log::debug!("Discarding initial page for closed feed of {}", user_id);
            return Ok(LoadOutcome::Stale);
        }
        if !still_active {
            state.load_in_flight = false;
            state.phase = LoadPhase::Idle;
            log::debug!("Discarding initial page: {} is no longer signed in", user_id);
            return Ok(LoadOutcome::Stale);
        }

        match result {
            Ok(page) => {
                let appended = state.append(page.items);
                state.cursor = page.next_cursor;
                state.initial_load_complete = true;
                state.finish(page.has_more);
                log::debug!(
                    "Initial page applied: {} records, phase {}",
                    appended,
                    state.phase
                );
                Ok(LoadOutcome::Loaded {
                    appended,
                    exhausted: !state.has_more,
                })
            }
            Err(e) => {
                state.load_in_flight = false;
                state.phase = LoadPhase::FailedInitial;
                state.last_error = Some(e.to_details());
                drop(state);
                self.report(&e, "load_initial", Some(&user_id));
                Err(e)
            }
        }
    }

    /// Load the page after the cursor. Dropped while another load runs.
    pub async fn load_more(&self) -> CoreResult<LoadOutcome> {
        let (user_id, cursor, generation) = {
            let mut state = self.state();
            if state.load_in_flight {
                log::debug!("Load-more dropped: fetch already in flight");
                return Ok(LoadOutcome::Skipped(SkipReason::InFlight));
            }
            if state.phase == LoadPhase::Exhausted || !state.has_more {
                return Ok(LoadOutcome::Skipped(SkipReason::Exhausted));
            }
            if !state.initial_load_complete {
                return Ok(LoadOutcome::Skipped(SkipReason::NotReady));
            }

            let Some(user_id) = self.session.current_user_id() else {
                state.last_error = Some(CoreError::AuthMissing.to_details());
                drop(state);
                self.report(&CoreError::AuthMissing, "load_more", None);
                return Err(CoreError::AuthMissing);
            };

            state.load_in_flight = true;
            state.phase = LoadPhase::LoadingMore;
            (user_id, state.cursor.clone(), state.generation)
        };

        let result = self.fetch(&user_id, cursor.as_ref()).await;

        let still_active = self.is_active_user(&user_id);
        let mut state = self.state();
        if state.generation != generation {
            log::debug!("Discarding page for closed feed of {}", user_id);
            return Ok(LoadOutcome::Stale);
        }
        if !still_active {
            state.load_in_flight = false;
            state.phase = LoadPhase::Idle;
            log::debug!("Discarding page: {} is no longer signed in", user_id);
            return Ok(LoadOutcome::Stale);
        }

        match result {
            Ok(page) if page.items.is_empty() => {
                state.finish(false);
                log::debug!("Empty page for {}: feed exhausted", user_id);
                Ok(LoadOutcome::Loaded {
                    appended: 0,
                    exhausted: true,
                })
            }
            Ok(page) => {
                let appended = state.append(page.items);
                state.advance_cursor(page.next_cursor);
                state.finish(page.has_more);
                log::debug!(
                    "Page applied: +{} records ({} total), phase {}",
                    appended,
                    state.records.len(),
                    state.phase
                );
                Ok(LoadOutcome::Loaded {
                    appended,
                    exhausted: !state.has_more,
                })
            }
            Err(e) => {
                state.load_in_flight = false;
                state.phase = LoadPhase::Idle;
                state.last_error = Some(e.to_details());
                drop(state);
                self.report(&e, "load_more", Some(&user_id));
                Err(e)
            }
        }
    }

    async fn fetch(&self, user_id: &str, cursor: Option<&Cursor>) -> CoreResult<Page> {
        let request = self.fetcher.fetch_page(user_id, cursor, self.page_size);
        match self.fetch_timeout {
            Some(limit) => tokio::time::timeout(limit, request)
                .await
                .map_err(|_| CoreError::Fetch {
                    message: format!("no response within {}ms", limit.as_millis()),
                })?,
            None => request.await,
        }
    }

    /// Whether `user_id` is still the session's user
    fn is_active_user(&self, user_id: &str) -> bool {
        self.session.current_user_id().as_deref() == Some(user_id)
    }

    fn report(&self, error: &CoreError, operation: &str, user_id: Option<&str>) {
        let mut context = ErrorContext::new(operation)
            .with_data("page_size", serde_json::json!(self.page_size));
        if let Some(user_id) = user_id {
            context = context.with_user_id(user_id);
        }
        self.logger.log_error(error, &context);
    }

    /// Tear the feed down: state is cleared and running fetches become stale
    pub fn close(&self) {
        let mut state = self.state();
        let generation = state.generation + 1;
        *state = FeedState::new(generation);
        log::debug!("Feed closed (generation {})", generation);
    }

    /// Visible + more pages + nothing running
    pub fn can_load_more(&self) -> bool {
        let state = self.state();
        state.initial_load_complete
            && state.has_more
            && !state.load_in_flight
            && state.phase == LoadPhase::Idle
    }

    pub fn phase(&self) -> LoadPhase {
        self.state().phase
    }

    pub fn record_count(&self) -> usize {
        self.state().records.len()
    }

    pub fn records(&self) -> Vec<Record> {
        self.state().records.clone()
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        let state = self.state();
        FeedSnapshot {
            records: state.records.clone(),
            cursor: state.cursor.clone(),
            has_more: state.has_more,
            load_in_flight: state.load_in_flight,
            initial_load_complete: state.initial_load_complete,
            phase: state.phase,
            last_error: state.last_error.clone(),
        }
    }
}
