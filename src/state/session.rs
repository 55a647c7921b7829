use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, info};

use crate::api::AccountSource;
use crate::error::{MealError, Result};
use crate::models::User;

/// Explicit "who is signed in" context handed to every flow that needs it.
///
/// Nothing is fetched implicitly: call [`init`](Self::init) once at start-up,
/// [`refresh`](Self::refresh) after the account may have changed, and
/// [`clear`](Self::clear) on sign-out.
pub struct SessionContext {
    account: Arc<dyn AccountSource>,
    user: RwLock<Option<User>>,
}

impl SessionContext {
    pub fn new(account: Arc<dyn AccountSource>) -> Self {
        Self {
            account,
            user: RwLock::new(None),
        }
    }

    /// First load of the current user.
    pub async fn init(&self) -> Result<Option<User>> {
        self.refresh().await
    }

    /// Ask the backend who is signed in and store the answer.
    pub async fn refresh(&self) -> Result<Option<User>> {
        let user = self.account.current_user().await?;
        match &user {
            Some(u) => info!(username = %u.username, "signed in"),
            None => debug!("no signed-in user"),
        }
        *self.user.write().unwrap_or_else(PoisonError::into_inner) = user.clone();
        Ok(user)
    }

    pub fn clear(&self) {
        *self.user.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn current_user(&self) -> Option<User> {
        self.user
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_signed_in(&self) -> bool {
        self.user
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// The signed-in user, or [`MealError::AuthRequired`].
    pub fn require_user(&self) -> Result<User> {
        self.current_user().ok_or(MealError::AuthRequired)
    }
}
