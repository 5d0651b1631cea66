use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const STATUS_OK: &str = "ok";
pub const STATUS_ERROR: &str = "error";
pub const STATUS_SUCCESS: &str = "success";

/// A row of the users table. `password` holds a bcrypt hash in safe mode and
/// the plaintext in unsafe mode.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct User {
    pub username: String,
    pub password: String,
    pub email: Option<String>,
}

/// Session token claims. `password` is the stored password column at issuance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub username: String,
    pub password: String,
    pub exp: i64,
}

fn unknown_username() -> String {
    "Unknown".to_string()
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default = "unknown_username")]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserView {
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserData {
    pub user: UserView,
}

#[derive(Debug, Serialize)]
pub struct LoginData {
    pub user: UserView,
    pub token: String,
}

/// The `{status, msg, data}` envelope every endpoint answers with.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(status: &'static str, msg: impl Into<String>, data: T) -> Self {
        Self {
            status,
            msg: Some(msg.into()),
            data: Some(data),
        }
    }

    pub fn data(status: &'static str, data: T) -> Self {
        Self {
            status,
            msg: None,
            data: Some(data),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status: &'static str,
    pub msg: String,
}

/// A listed venue row, columns passed through as they are stored.
pub type Venue = serde_json::Map<String, serde_json::Value>;
