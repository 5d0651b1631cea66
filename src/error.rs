use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;
use tracing::error;

use crate::db::StoreError;
use crate::models::{ErrorResponse, STATUS_ERROR};

/// Every way a login or guarded request can be turned away.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid authorization header. Expected 'Bearer <token>'.")]
    HeaderMalformed,

    #[error("Unauthorized. No token provided.")]
    TokenMissing,

    #[error("Invalid token. Please login again.")]
    InvalidToken,

    #[error("Token has expired. Please login again.")]
    Expired,

    // Shared by unknown user and wrong password.
    #[error("Login failed. Invalid username or password.")]
    AuthFailed,

    #[error("Invalid username or password. Please login again.")]
    Unauthorized,

    #[error("{0}")]
    BadRequest(&'static str),

    #[error("Failed to sign session token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AuthError::Signing(_) | AuthError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let msg = match self {
            AuthError::Signing(_) | AuthError::Store(_) => {
                error!("request failed: {self}");
                "Internal server error.".to_string()
            }
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            status: STATUS_ERROR,
            msg,
        })
    }
}
