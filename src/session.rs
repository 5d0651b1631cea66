use std::sync::Arc;

use tracing::{debug, info};

use crate::db::CredentialStore;
use crate::error::AuthError;
use crate::models::{Claims, UserView};

/// Re-checks validated claims against the current users table.
///
/// A token carries the password column as it was at login. Once the stored
/// value changes every earlier token stops matching, which is the only
/// revocation mechanism there is.
pub struct SessionGuard {
    store: Arc<dyn CredentialStore>,
}

impl SessionGuard {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    pub async fn authorize(&self, claims: &Claims) -> Result<UserView, AuthError> {
        match self.store.fetch_user_by_username(&claims.username).await? {
            Some(user) if user.password != claims.password => {
                info!(username = %claims.username, "stale session rejected");
                return Err(AuthError::Unauthorized);
            }
            Some(_) => {}
            // A vanished user is let through.
            None => debug!(username = %claims.username, "session user not in store"),
        }

        Ok(UserView {
            username: claims.username.clone(),
            email: None,
        })
    }

    pub async fn update_email(&self, claims: &Claims, email: &str) -> Result<UserView, AuthError> {
        let view = self.authorize(claims).await?;
        self.store.update_user_email(&view.username, email).await?;
        info!(username = %view.username, "profile email updated");

        Ok(UserView {
            email: Some(email.to_string()),
            ..view
        })
    }
}
