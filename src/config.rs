use crate::app_env;
use anyhow::Context;
use std::env;
use std::time::Duration;

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_SESSION_TTL_SECONDS: u64 = 7 * 24 * 60 * 60;

/// Immutable application configuration, resolved once at startup and handed
/// to the components that need it. Nothing reads the environment after this
/// is constructed.
#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub listen_addr: String,
    pub session_signing_key: String,
    pub session_ttl: Duration,
}

impl AppConfig {
    /// Reads configuration from the environment. [app_env] lists the variable names.
    pub fn from_env() -> Result<AppConfig, anyhow::Error> {
        let database_url = env::var(app_env::DB_URL)
            .with_context(|| format!("{} must be set", app_env::DB_URL))?;
        let session_signing_key = env::var(app_env::SESSION_SIGNING_KEY)
            .with_context(|| format!("{} must be set", app_env::SESSION_SIGNING_KEY))?;
        let listen_addr =
            env::var(app_env::LISTEN_ADDR).unwrap_or_else(|_| DEFAULT_LISTEN_ADDR.to_owned());
        let session_ttl_seconds = match env::var(app_env::SESSION_TTL_SECONDS) {
            Ok(raw_ttl) => raw_ttl.parse().with_context(|| {
                format!(
                    "{} must be a whole number of seconds",
                    app_env::SESSION_TTL_SECONDS
                )
            })?,
            Err(_) => DEFAULT_SESSION_TTL_SECONDS,
        };

        Ok(AppConfig {
            database_url,
            listen_addr,
            session_signing_key,
            session_ttl: Duration::from_secs(session_ttl_seconds),
        })
    }
}
