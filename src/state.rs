use std::sync::Arc;

use chrono::Duration;

use crate::auth::{TokenExtractor, TokenKeys};
use crate::config::Config;
use crate::credentials::CredentialVerifier;
use crate::db::CredentialStore;
use crate::models::Venue;
use crate::session::SessionGuard;

/// Everything the handlers share. Built once at startup and never mutated;
/// the store does its own locking.
pub struct AppState {
    pub tokens: TokenKeys,
    pub extractor: TokenExtractor,
    pub verifier: CredentialVerifier,
    pub guard: SessionGuard,
    pub venues: Vec<Venue>,
}

impl AppState {
    pub fn new(config: &Config, store: Arc<dyn CredentialStore>, venues: Vec<Venue>) -> Self {
        let ttl = Duration::minutes(config.token_ttl_minutes);

        Self {
            tokens: TokenKeys::from_secret(&config.jwt_secret),
            extractor: TokenExtractor::new(config.mode),
            verifier: CredentialVerifier::new(config.mode, store.clone(), ttl),
            guard: SessionGuard::new(store),
            venues,
        }
    }
}
