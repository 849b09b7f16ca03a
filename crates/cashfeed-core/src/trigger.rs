//! Visibility trigger
//!
//! Watches a sentinel placed after the last rendered record and turns
//! "sentinel became visible" events into load-more requests. The trigger does
//! no debouncing of its own; repeated events while a page is loading are
//! absorbed by the coordinator's single-flight guard.

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::coordinator::LoadCoordinator;
use crate::types::{LoadOutcome, LoadPhase};

/// Sentinel placed after the `position`-th rendered record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SentinelHandle {
    pub position: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityEvent {
    pub sentinel: SentinelHandle,
}

/// Source of viewport-intersection events
pub trait ViewportObserver: Send + Sync {
    /// Start watching `sentinel`; events arrive on the returned stream
    fn observe(&self, sentinel: SentinelHandle) -> UnboundedReceiver<VisibilityEvent>;

    /// Stop watching `sentinel` and release what was held for it
    fn unobserve(&self, sentinel: SentinelHandle);
}

/// In-process observer fed by the render surface
#[derive(Debug, Default)]
pub struct ChannelObserver {
    watched: Mutex<Option<(SentinelHandle, UnboundedSender<VisibilityEvent>)>>,
}

impl ChannelObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// The item at `position` scrolled into view. Returns whether it was
    /// the observed sentinel.
    pub fn report_visible(&self, position: usize) -> bool {
        let watched = self.watched.lock().unwrap_or_else(|p| p.into_inner());
        match watched.as_ref() {
            Some((sentinel, tx)) if sentinel.position == position => {
                tx.send(VisibilityEvent { sentinel: *sentinel }).is_ok()
            }
            _ => false,
        }
    }

    /// Report the currently observed sentinel as visible, whatever its position
    pub fn report_sentinel(&self) -> bool {
        let position = self.observed().map(|s| s.position);
        position.is_some_and(|p| self.report_visible(p))
    }

    pub fn observed(&self) -> Option<SentinelHandle> {
        let watched = self.watched.lock().unwrap_or_else(|p| p.into_inner());
        watched.as_ref().map(|(sentinel, _)| *sentinel)
    }
}

impl ViewportObserver for ChannelObserver {
    fn observe(&self, sentinel: SentinelHandle) -> UnboundedReceiver<VisibilityEvent> {
        let (tx, rx) = unbounded_channel();
        let mut watched = self.watched.lock().unwrap_or_else(|p| p.into_inner());
        *watched = Some((sentinel, tx));
        rx
    }

    fn unobserve(&self, sentinel: SentinelHandle) {
        let mut watched = self.watched.lock().unwrap_or_else(|p| p.into_inner());
        if watched.as_ref().is_some_and(|(s, _)| *s == sentinel) {
            *watched = None;
        }
    }
}

/// Couples a viewport observer to a load coordinator for one feed view
pub struct VisibilityTrigger {
    observer: Arc<dyn ViewportObserver>,
    coordinator: Arc<LoadCoordinator>,
    armed: Option<(SentinelHandle, UnboundedReceiver<VisibilityEvent>)>,
}

impl VisibilityTrigger {
    pub fn new(observer: Arc<dyn ViewportObserver>, coordinator: Arc<LoadCoordinator>) -> Self {
        Self {
            observer,
            coordinator,
            armed: None,
        }
    }

    /// Move the sentinel after the last record if the list length changed
    pub fn arm(&mut self) -> SentinelHandle {
        let sentinel = SentinelHandle {
            position: self.coordinator.record_count(),
        };
        if let Some((current, _)) = &self.armed {
            if *current == sentinel {
                return sentinel;
            }
            self.observer.unobserve(*current);
        }
        let events = self.observer.observe(sentinel);
        self.armed = Some((sentinel, events));
        log::debug!("Sentinel armed at {}", sentinel.position);
        sentinel
    }

    /// Wait for a visibility event that should become a load-more
    ///
    /// Returns `None` once the feed can never load more (exhausted, or the
    /// initial load failed) or the event stream ended.
    pub async fn next_request(&mut self) -> Option<VisibilityEvent> {
        loop {
            if matches!(
                self.coordinator.phase(),
                LoadPhase::Exhausted | LoadPhase::FailedInitial
            ) {
                return None;
            }
            let (_, events) = self.armed.as_mut()?;
            let event = events.recv().await?;
            if self.coordinator.can_load_more() {
                return Some(event);
            }
            log::debug!("Sentinel visible but no load allowed; ignoring");
        }
    }

    /// Drive load-mores from visibility events until the feed is exhausted
    /// or events stop. Failed pages are logged and the trigger stays armed.
    /// Returns the number of pages applied.
    pub async fn run(&mut self) -> usize {
        let mut pages = 0;
        self.arm();
        while self.next_request().await.is_some() {
            match self.coordinator.load_more().await {
                Ok(LoadOutcome::Loaded { .. }) => pages += 1,
                Ok(_) => {}
                Err(e) => log::warn!("Load-more failed, waiting for next visibility event: {}", e),
            }
            self.arm();
        }
        self.dispose();
        pages
    }

    /// Stop observing. Called automatically when the trigger is dropped.
    pub fn dispose(&mut self) {
        if let Some((sentinel, _)) = self.armed.take() {
            self.observer.unobserve(sentinel);
            log::debug!("Sentinel at {} released", sentinel.position);
        }
    }
}

impl Drop for VisibilityTrigger {
    fn drop(&mut self) {
        self.dispose();
    }
}
