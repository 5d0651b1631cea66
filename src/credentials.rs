use std::sync::Arc;

use bcrypt::verify;
use chrono::{Duration, Utc};
use tracing::{info, warn};

use crate::config::OperatingMode;
use crate::db::CredentialStore;
use crate::error::AuthError;
use crate::models::Claims;

/// Checks submitted credentials and produces the claims for a new session.
pub struct CredentialVerifier {
    mode: OperatingMode,
    store: Arc<dyn CredentialStore>,
    ttl: Duration,
}

impl CredentialVerifier {
    pub fn new(mode: OperatingMode, store: Arc<dyn CredentialStore>, ttl: Duration) -> Self {
        Self { mode, store, ttl }
    }

    pub async fn verify(&self, username: &str, password: &str) -> Result<Claims, AuthError> {
        let stored_password = match self.mode {
            OperatingMode::Safe => self.verify_hashed(username, password).await?,
            OperatingMode::Unsafe => self.verify_raw_query(username, password).await?,
        };

        let Some(stored_password) = stored_password else {
            info!(mode = %self.mode, "login rejected");
            return Err(AuthError::AuthFailed);
        };

        Ok(Claims {
            username: username.to_string(),
            password: stored_password,
            exp: (Utc::now() + self.ttl).timestamp(),
        })
    }

    /// Exact-key lookup plus bcrypt check. Yields the stored hash on success.
    async fn verify_hashed(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<String>, AuthError> {
        let Some(user) = self.store.fetch_user_by_username(username).await? else {
            return Ok(None);
        };

        let matches = verify(password, &user.password).unwrap_or_else(|e| {
            warn!(username, "stored password is not a valid bcrypt hash: {e}");
            false
        });
        Ok(matches.then_some(user.password))
    }

    // Deliberately injectable: user input is spliced straight into the query.
    async fn verify_raw_query(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<String>, AuthError> {
        let query =
            format!("SELECT * FROM users WHERE username = '{username}' AND password = '{password}'");
        let rows = self.store.query_users(&query).await?;
        Ok(rows.into_iter().next().map(|user| user.password))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::SqliteStore;
    use crate::models::User;
    use bcrypt::hash;

    async fn store_with(users: &[(&str, &str)], mode: OperatingMode) -> Arc<SqliteStore> {
        let store = Arc::new(SqliteStore::in_memory().await.unwrap());
        for (username, password) in users {
            let password = match mode {
                OperatingMode::Safe => hash(password, 4).unwrap(),
                OperatingMode::Unsafe => password.to_string(),
            };
            store
                .insert_user(&User {
                    username: username.to_string(),
                    password,
                    email: None,
                })
                .await
                .unwrap();
        }
        store
    }

    fn verifier(mode: OperatingMode, store: Arc<SqliteStore>) -> CredentialVerifier {
        CredentialVerifier::new(mode, store, Duration::minutes(30))
    }

    #[tokio::test]
    async fn safe_login_embeds_stored_hash() {
        let store = store_with(&[("alice", "correct")], OperatingMode::Safe).await;
        let stored = store.fetch_user_by_username("alice").await.unwrap().unwrap();

        let claims = verifier(OperatingMode::Safe, store)
            .verify("alice", "correct")
            .await
            .unwrap();
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.password, stored.password);
        assert_ne!(claims.password, "correct");
    }

    #[tokio::test]
    async fn expiry_is_now_plus_ttl() {
        let store = store_with(&[("alice", "correct")], OperatingMode::Safe).await;
        let before = (Utc::now() + Duration::minutes(30)).timestamp();
        let claims = verifier(OperatingMode::Safe, store)
            .verify("alice", "correct")
            .await
            .unwrap();
        let after = (Utc::now() + Duration::minutes(30)).timestamp();
        assert!((before..=after).contains(&claims.exp));
    }

    #[tokio::test]
    async fn safe_failures_share_one_message() {
        let store = store_with(&[("alice", "correct")], OperatingMode::Safe).await;
        let verifier = verifier(OperatingMode::Safe, store);

        let wrong_password = verifier.verify("alice", "nope").await.unwrap_err();
        let unknown_user = verifier.verify("bob", "correct").await.unwrap_err();
        assert!(matches!(wrong_password, AuthError::AuthFailed));
        assert!(matches!(unknown_user, AuthError::AuthFailed));
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
        assert_eq!(
            unknown_user.to_string(),
            "Login failed. Invalid username or password."
        );
    }

    #[tokio::test]
    async fn safe_login_resists_injection() {
        let store = store_with(&[("alice", "correct")], OperatingMode::Safe).await;
        let verifier = verifier(OperatingMode::Safe, store);

        for username in ["' OR '1'='1", "' OR '1'='1' --", "alice' --"] {
            let err = verifier.verify(username, "anything").await.unwrap_err();
            assert!(matches!(err, AuthError::AuthFailed), "{username} got in");
        }
    }

    #[tokio::test]
    async fn unsafe_login_with_plain_credentials() {
        let store = store_with(&[("alice", "correct")], OperatingMode::Unsafe).await;
        let verifier = verifier(OperatingMode::Unsafe, store);

        let claims = verifier.verify("alice", "correct").await.unwrap();
        assert_eq!(claims.password, "correct");
        assert!(matches!(
            verifier.verify("alice", "nope").await,
            Err(AuthError::AuthFailed)
        ));
    }

    #[tokio::test]
    async fn unsafe_tautology_logs_in_as_first_row() {
        let store = store_with(
            &[("admin", "s3cret"), ("alice", "correct")],
            OperatingMode::Unsafe,
        )
        .await;
        let verifier = verifier(OperatingMode::Unsafe, store);

        let claims = verifier
            .verify("' OR '1'='1' --", "whatever")
            .await
            .unwrap();
        assert_eq!(claims.password, "s3cret");
        assert_eq!(claims.username, "' OR '1'='1' --");
    }

    #[tokio::test]
    async fn unsafe_login_accepts_any_sqlite_tautology() {
        let store = store_with(
            &[("admin", "s3cret"), ("alice", "correct")],
            OperatingMode::Unsafe,
        )
        .await;
        let verifier = verifier(OperatingMode::Unsafe, store);

        for username in [
            "' OR 1=1 LIMIT 1 --",
            "' OR 2>1 --",
            "' OR 'a' LIKE 'a' --",
            "' OR 1.0 --",
            "' OR username IS NOT NULL /*",
        ] {
            let claims = verifier.verify(username, "x").await.unwrap();
            assert_eq!(claims.password, "s3cret", "{username}");
        }
    }

    #[tokio::test]
    async fn unsafe_malformed_query_is_a_store_fault() {
        let store = store_with(&[("alice", "correct")], OperatingMode::Unsafe).await;
        let err = verifier(OperatingMode::Unsafe, store)
            .verify("o'brien", "x")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Store(_)));
    }
}
