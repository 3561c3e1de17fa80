//! Runtime configuration read from `COURSE_HUB_*` environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::api::auth::DEFAULT_TOKEN_TTL;
use crate::error::{Result, ServerError};

/// Server configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory holding the SQLite database
    pub data_dir: PathBuf,
    /// SeaORM connection URL
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub token_ttl: Duration,
    /// When set, an `admin` account with this password is created at startup
    pub admin_password: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let data_dir = std::env::temp_dir().join("course-hub");
        Self {
            database_url: sqlite_url(&data_dir),
            data_dir,
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            token_ttl: DEFAULT_TOKEN_TTL,
            admin_password: None,
        }
    }
}

fn sqlite_url(data_dir: &std::path::Path) -> String {
    format!("sqlite:{}?mode=rwc", data_dir.join("course-hub.db").display())
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup; unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(dir) = lookup("COURSE_HUB_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
            config.database_url = sqlite_url(&config.data_dir);
        }
        if let Some(url) = lookup("COURSE_HUB_DATABASE_URL") {
            config.database_url = url;
        }
        if let Some(addr) = lookup("COURSE_HUB_ADDR") {
            config.bind_addr = addr
                .parse()
                .map_err(|e| ServerError::Validation(format!("invalid COURSE_HUB_ADDR '{}': {}", addr, e)))?;
        }
        if let Some(ttl) = lookup("COURSE_HUB_TOKEN_TTL_SECS") {
            let secs: u64 = ttl.parse().map_err(|e| {
                ServerError::Validation(format!("invalid COURSE_HUB_TOKEN_TTL_SECS '{}': {}", ttl, e))
            })?;
            config.token_ttl = Duration::from_secs(secs);
        }
        config.admin_password = lookup("COURSE_HUB_ADMIN_PASSWORD").filter(|p| !p.is_empty());

        Ok(config)
    }
}
