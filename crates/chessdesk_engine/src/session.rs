use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;
use tracing::info;

/// The staff member currently logged in to the console.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionUser {
    pub id: String,
    pub username: String,
    pub role: String,
}

/// Shared login state of the console.
///
/// The console has a single session: whoever logged in last is the current
/// user for every request until they log out.
#[derive(Debug, Clone, Default)]
pub struct SessionHandle(Arc<RwLock<Option<SessionUser>>>);

impl SessionHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn login(&self, user: SessionUser) {
        info!(username = %user.username, "logged in");
        *self.0.write() = Some(user);
    }

    /// End the session; returns the user that was logged in, if any.
    pub fn logout(&self) -> Option<SessionUser> {
        let user = self.0.write().take();
        if let Some(user) = &user {
            info!(username = %user.username, "logged out");
        }
        user
    }

    pub fn current(&self) -> Option<SessionUser> {
        self.0.read().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.0.read().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_logout() {
        let session = SessionHandle::new();
        assert!(!session.is_authenticated());

        let user = SessionUser {
            id: "users-0001".to_string(),
            username: "admin".to_string(),
            role: "admin".to_string(),
        };
        session.clone().login(user.clone());
        assert!(session.is_authenticated());
        assert_eq!(session.current(), Some(user.clone()));

        assert_eq!(session.logout(), Some(user));
        assert_eq!(session.logout(), None);
    }
}
