//! Configuration Module
//!
//! Centralized configuration management for the inspection service. All
//! settings are read from environment variables (loaded from `.env` in
//! development) with sensible defaults for everything except secrets.

/// Environment variable helpers
pub mod env {
    use std::env;

    /// Get environment variable as string with default
    pub fn get_string(key: &str, default: &str) -> String {
        env::var(key).unwrap_or_else(|_| default.to_string())
    }

    /// Get environment variable as u16 with default
    pub fn get_u16(key: &str, default: u16) -> u16 {
        env::var(key)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Get environment variable as u32 with default
    pub fn get_u32(key: &str, default: u32) -> u32 {
        env::var(key)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Get environment variable as u64 with default
    pub fn get_u64(key: &str, default: u64) -> u64 {
        env::var(key)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Get environment variable as i64 with default
    pub fn get_i64(key: &str, default: i64) -> i64 {
        env::var(key)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Check if environment variable is set
    pub fn is_set(key: &str) -> bool {
        env::var(key).is_ok()
    }

    /// Get required environment variable or panic
    pub fn get_required(key: &str) -> String {
        env::var(key).unwrap_or_else(|_| panic!("Required environment variable {} is not set", key))
    }
}

/// Application configuration combining all service configurations
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,

    /// JWT configuration
    pub jwt: JwtConfig,

    /// Upload storage configuration
    pub storage: StorageConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub cors_origins: Vec<String>,
}

/// JWT configuration.
///
/// The signing secret has no default; a missing `JWT_SECRET` is a fatal
/// startup error rather than a silently insecure fallback.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub expiration_minutes: i64,
}

/// Upload storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Root directory served as static content; uploads land beneath it
    pub content_root: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: env::get_string("SERVER_HOST", "0.0.0.0"),
            port: env::get_u16("SERVER_PORT", 3000),
            log_level: env::get_string("LOG_LEVEL", "info"),
            cors_origins: env::get_string("CORS_ORIGINS", "*")
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
        }
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: env::get_required("JWT_SECRET"),
            issuer: env::get_string("JWT_ISSUER", "AgroScan"),
            audience: env::get_string("JWT_AUDIENCE", "AgroScanClients"),
            expiration_minutes: env::get_i64("JWT_EXPIRATION_MINUTES", 60),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            content_root: env::get_string("CONTENT_ROOT", "content"),
        }
    }
}

impl AppConfig {
    /// Load complete application configuration from environment
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let config = Self {
            server: ServerConfig::default(),
            jwt: JwtConfig::default(),
            storage: StorageConfig::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the complete configuration
    pub fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        if self.server.port == 0 {
            return Err("Server port must be greater than 0".into());
        }

        if self.jwt.secret.len() < 16 {
            return Err("JWT secret must be at least 16 characters".into());
        }

        if self.jwt.expiration_minutes <= 0 {
            return Err("JWT expiration must be greater than 0 minutes".into());
        }

        Ok(())
    }
}
