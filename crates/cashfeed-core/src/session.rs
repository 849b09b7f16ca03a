//! Signed-in user resolution

use std::sync::{Arc, RwLock};

/// Session reference type
pub type SessionRef = Arc<dyn SessionProvider>;

/// Source of the current user; `None` means every fetch must be suppressed
pub trait SessionProvider: Send + Sync {
    fn current_user_id(&self) -> Option<String>;
}

/// Session whose user is set by the host application
#[derive(Debug, Default)]
pub struct StaticSession {
    user_id: RwLock<Option<String>>,
}

impl StaticSession {
    pub fn signed_in(user_id: &str) -> Self {
        Self {
            user_id: RwLock::new(Some(user_id.to_string())),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn sign_in(&self, user_id: &str) {
        if let Ok(mut guard) = self.user_id.write() {
            *guard = Some(user_id.to_string());
        }
    }

    pub fn sign_out(&self) {
        if let Ok(mut guard) = self.user_id.write() {
            *guard = None;
        }
    }
}

impl SessionProvider for StaticSession {
    fn current_user_id(&self) -> Option<String> {
        self.user_id
            .read()
            .ok()
            .and_then(|guard| guard.clone())
            .filter(|id| !id.is_empty())
    }
}
