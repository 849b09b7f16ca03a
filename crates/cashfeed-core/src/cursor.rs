//! Feed position marker

use serde::{Deserialize, Serialize};

use cashfeed_store::StartAfter;

/// Last-seen ordering key of the primary feed
///
/// `None` in place of a cursor means "start of feed". Records sharing a date
/// are told apart by id, descending like the feed itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cursor {
    pub date: String,
    pub id: String,
}

impl Cursor {
    pub fn new(date: &str, id: &str) -> Self {
        Self {
            date: date.to_string(),
            id: id.to_string(),
        }
    }

    fn key(&self) -> (&str, &str) {
        (self.date.as_str(), self.id.as_str())
    }

    /// Whether `self` lies strictly further down the feed than `other`
    pub fn is_past(&self, other: &Cursor) -> bool {
        self.key() < other.key()
    }

    /// Exclusive start position for the next store query
    pub fn start_after(&self) -> StartAfter {
        StartAfter {
            date: self.date.clone(),
            id: self.id.clone(),
        }
    }
}

impl std::fmt::Display for Cursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.date, self.id)
    }
}
