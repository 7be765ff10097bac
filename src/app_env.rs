/// URL for accessing the PostgreSQL database (should contain a schema name in the path)
pub const DB_URL: &str = "DATABASE_URL";
/// Log level configuration for the application. Accepts the directive syntax of
/// [tracing_subscriber::EnvFilter].
pub const LOG_LEVEL: &str = "LOG_LEVEL";

/// Address and port the HTTP server binds to, e.g. `0.0.0.0:8080`
pub const LISTEN_ADDR: &str = "LISTEN_ADDR";

/// Secret used to sign session tokens. Sessions are invalidated across the
/// board if this value changes between deployments.
pub const SESSION_SIGNING_KEY: &str = "SESSION_SIGNING_KEY";
/// Lifetime of an issued session token, in seconds
pub const SESSION_TTL_SECONDS: &str = "SESSION_TTL_SECONDS";
