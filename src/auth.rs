use actix_web::{
    http::header::{Header, AUTHORIZATION},
    HttpRequest,
};
use actix_web_httpauth::headers::authorization::{Authorization, Bearer};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header as JwtHeader,
    Validation,
};
use tracing::debug;

use crate::config::OperatingMode;
use crate::error::AuthError;
use crate::models::Claims;

/// Cookie carrying the session token on guarded calls.
pub const AUTH_COOKIE: &str = "auth_token";

/// Signs and verifies session tokens with a single HMAC secret.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenKeys {
    pub fn from_secret(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn issue(&self, claims: &Claims) -> Result<String, AuthError> {
        Ok(encode(
            &JwtHeader::new(Algorithm::HS256),
            claims,
            &self.encoding,
        )?)
    }

    /// Signature is checked before expiry, so only a genuine token can come
    /// back as `Expired`.
    pub fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => {
                    debug!("rejecting token: {e}");
                    AuthError::InvalidToken
                }
            })
    }
}

/// Finds the candidate session token on an incoming request.
#[derive(Debug, Clone, Copy)]
pub struct TokenExtractor {
    mode: OperatingMode,
}

impl TokenExtractor {
    pub fn new(mode: OperatingMode) -> Self {
        Self { mode }
    }

    /// `Ok(None)` means no token was presented at all.
    pub fn extract(&self, req: &HttpRequest) -> Result<Option<String>, AuthError> {
        if self.mode.is_safe() && req.headers().contains_key(AUTHORIZATION) {
            let auth =
                Authorization::<Bearer>::parse(req).map_err(|_| AuthError::HeaderMalformed)?;
            return Ok(Some(auth.into_scheme().token().to_string()));
        }

        Ok(req
            .cookie(AUTH_COOKIE)
            .map(|c| c.value().to_string())
            .filter(|v| !v.is_empty()))
    }
}
