#[cfg(test)]
#[path = "user_store_test.rs"]
mod tests;

use std::sync::Arc;

use tokio::sync::watch;

use crate::domain::models::UserProfile;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserState {
    pub token: String,
    pub profile: Option<UserProfile>,
}

#[derive(Clone)]
pub struct UserStore {
    tx: Arc<watch::Sender<UserState>>,
}

impl Default for UserStore {
    fn default() -> UserStore {
        let (tx, _rx) = watch::channel(UserState::default());
        return UserStore { tx: Arc::new(tx) };
    }
}

impl UserStore {
    pub fn init(&self, token: &str) {
        self.tx.send_replace(UserState {
            token: token.to_string(),
            profile: None,
        });
    }

    pub fn login(&self, token: &str, profile: UserProfile) {
        self.tx.send_replace(UserState {
            token: token.to_string(),
            profile: Some(profile),
        });
    }

    pub fn set_profile(&self, profile: UserProfile) {
        self.tx.send_modify(|state| {
            state.profile = Some(profile);
        });
    }

    /// Drops the token and profile. Returns false when nobody was logged in.
    pub fn logout(&self) -> bool {
        return self.tx.send_if_modified(|state| {
            if state.token.is_empty() && state.profile.is_none() {
                return false;
            }

            *state = UserState::default();
            return true;
        });
    }

    pub fn token(&self) -> String {
        return self.tx.borrow().token.to_string();
    }

    pub fn profile(&self) -> Option<UserProfile> {
        return self.tx.borrow().profile.clone();
    }

    pub fn is_logged_in(&self) -> bool {
        return !self.tx.borrow().token.is_empty();
    }
}
