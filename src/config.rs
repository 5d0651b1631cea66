use std::{env, fmt, str::FromStr};

use thiserror::Error;
use tracing::{info, warn};

const DEV_JWT_SECRET: &str = "secret";

/// Which credential check and token transport the process runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatingMode {
    Safe,
    Unsafe,
}

impl OperatingMode {
    pub fn is_safe(self) -> bool {
        self == OperatingMode::Safe
    }
}

impl FromStr for OperatingMode {
    type Err = std::convert::Infallible;

    // Anything other than "safe" runs the vulnerable variant.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim().to_lowercase();
        match value.as_str() {
            "safe" => Ok(OperatingMode::Safe),
            "unsafe" => Ok(OperatingMode::Unsafe),
            other => {
                warn!("Unrecognised MODE {other:?}, falling back to unsafe");
                Ok(OperatingMode::Unsafe)
            }
        }
    }
}

impl fmt::Display for OperatingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperatingMode::Safe => f.write_str("safe"),
            OperatingMode::Unsafe => f.write_str("unsafe"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub mode: OperatingMode,
    pub jwt_secret: String,
    pub token_ttl_minutes: i64,
    pub bcrypt_cost: u32,
    pub database_url: String,
    pub users_file: String,
    pub venues_file: String,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            warn!("JWT_SECRET not set, using the development secret");
            DEV_JWT_SECRET.to_string()
        });

        let token_ttl_minutes: i64 = try_load("TOKEN_TTL_MINUTES", "30")?;
        if token_ttl_minutes <= 0 {
            return Err(ConfigError::Invalid {
                key: "TOKEN_TTL_MINUTES",
                reason: "must be positive".to_string(),
            });
        }

        Ok(Self {
            port: try_load("PORT", "8000")?,
            mode: try_load("MODE", "safe")?,
            jwt_secret,
            token_ttl_minutes,
            bcrypt_cost: try_load("BCRYPT_COST", &bcrypt::DEFAULT_COST.to_string())?,
            database_url: try_load("DATABASE_URL", "sqlite://users.db")?,
            users_file: try_load("USERS_FILE", "data/users.json")?,
            venues_file: try_load("VENUES_FILE", "data/venues.json")?,
        })
    }
}

fn try_load<T: FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T::Err: fmt::Display,
{
    env::var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        })
}
