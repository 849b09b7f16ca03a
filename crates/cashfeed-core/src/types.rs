//! Basic types for the feed engine

use serde::{Deserialize, Serialize};

/// Load coordinator state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadPhase {
    /// No fetch running; ready for the initial load, or for more when pages remain
    Idle,
    /// First page in flight
    LoadingInitial,
    /// Follow-up page in flight
    LoadingMore,
    /// A short or empty page was seen; terminal
    Exhausted,
    /// The first page failed; data untouched, initial load may be retried
    FailedInitial,
}

impl Default for LoadPhase {
    fn default() -> Self {
        LoadPhase::Idle
    }
}

impl std::fmt::Display for LoadPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadPhase::Idle => write!(f, "idle"),
            LoadPhase::LoadingInitial => write!(f, "loading_initial"),
            LoadPhase::LoadingMore => write!(f, "loading_more"),
            LoadPhase::Exhausted => write!(f, "exhausted"),
            LoadPhase::FailedInitial => write!(f, "failed_initial"),
        }
    }
}

/// Why a load request did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Another fetch is running
    InFlight,
    /// No pages remain
    Exhausted,
    /// Load-more before the initial load completed
    NotReady,
    /// Initial load requested twice
    AlreadyLoaded,
}

/// Result of a load request that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadOutcome {
    /// A page was applied
    Loaded { appended: usize, exhausted: bool },
    /// Dropped without calling the store
    Skipped(SkipReason),
    /// The view was closed or the user changed while the fetch was running;
    /// result discarded
    Stale,
}

impl LoadOutcome {
    pub fn appended(&self) -> usize {
        match self {
            LoadOutcome::Loaded { appended, .. } => *appended,
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_display() {
        assert_eq!(LoadPhase::LoadingMore.to_string(), "loading_more");
        assert_eq!(LoadPhase::FailedInitial.to_string(), "failed_initial");
    }

    #[test]
    fn test_outcome_appended() {
        let loaded = LoadOutcome::Loaded { appended: 3, exhausted: false };
        assert_eq!(loaded.appended(), 3);
        assert_eq!(LoadOutcome::Skipped(SkipReason::InFlight).appended(), 0);
    }
}
