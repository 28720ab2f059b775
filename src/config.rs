//! Configuration for Taskgate
//!
//! CLI arguments and environment variable handling using clap.

use clap::Parser;
use jsonwebtoken::Algorithm;
use std::net::SocketAddr;
use std::str::FromStr;

/// Taskgate - multi-tenant task management API
#[derive(Parser, Debug, Clone)]
#[command(name = "taskgate")]
#[command(about = "Task management API with JWT authentication")]
pub struct Args {
    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:8080")]
    pub listen: SocketAddr,

    /// SQLite database URL
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://taskgate.db?mode=rwc")]
    pub database_url: String,

    /// Secret for token signing (required in production)
    #[arg(long, env = "SECRET_KEY")]
    pub secret_key: Option<String>,

    /// Token signing algorithm
    #[arg(long, env = "ALGORITHM", default_value = "HS256")]
    pub algorithm: String,

    /// Access token lifetime in minutes
    #[arg(long, env = "ACCESS_TOKEN_EXPIRE_MINUTES", default_value = "30")]
    pub access_token_expire_minutes: i64,

    /// Enable development mode (allows a built-in insecure signing secret)
    #[arg(long, env = "DEV_MODE", default_value = "false")]
    pub dev_mode: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

/// Immutable token-signing configuration, built once at startup and passed
/// into the token service at construction time. Request handling never reads
/// ambient environment state.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub algorithm: Algorithm,
    pub token_ttl: chrono::Duration,
}

impl Args {
    /// Effective signing secret (uses a fixed insecure value in dev mode)
    pub fn secret_key(&self) -> Result<String, String> {
        match &self.secret_key {
            Some(secret) => Ok(secret.clone()),
            None if self.dev_mode => Ok("dev-only-insecure-secret".to_string()),
            None => Err("SECRET_KEY is required in production mode".to_string()),
        }
    }

    /// Build the auth configuration from the parsed arguments
    pub fn auth_config(&self) -> Result<AuthConfig, String> {
        let secret = self.secret_key()?;
        let algorithm = Algorithm::from_str(&self.algorithm)
            .map_err(|_| format!("Unsupported signing algorithm: {}", self.algorithm))?;

        Ok(AuthConfig {
            secret,
            algorithm,
            token_ttl: chrono::Duration::minutes(self.access_token_expire_minutes),
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.dev_mode && self.secret_key.is_none() {
            return Err("SECRET_KEY is required in production mode".to_string());
        }

        if self.access_token_expire_minutes <= 0 {
            return Err("ACCESS_TOKEN_EXPIRE_MINUTES must be positive".to_string());
        }

        Algorithm::from_str(&self.algorithm)
            .map_err(|_| format!("Unsupported signing algorithm: {}", self.algorithm))?;

        Ok(())
    }
}
