/// Configuration management for the API server
///
/// All settings come from environment variables; a `.env` file is loaded
/// first when present.
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `CORS_ORIGINS`: Comma-separated allowed origins (default: `*`)
/// - `PRODUCTION`: Enables HSTS and `Secure` cookies (default: false)
/// - `DATABASE_URL`: PostgreSQL connection string (optional; the in-memory
///   store is used without it)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `SESSION_SECRET`: Secret for signing session cookies (required, >= 32 chars)
/// - `SESSION_TTL_HOURS`: Session lifetime (default: 24)
/// - `RESET_TOKEN_TTL_SECS`: Password reset token lifetime (default: 3600)
/// - `UPLOAD_DIR`: Where profile pictures are written (default: `uploads`)
/// - `BROADCAST_CAPACITY`: Buffered payment events per dashboard (default: 100)
/// - `LOG_FORMAT`: `pretty` or `json` (default: pretty)
/// - `RUST_LOG`: Log filter
///
/// # Example
///
/// ```no_run
/// use rentease_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use rentease_shared::auth::reset_token::DEFAULT_RESET_TOKEN_TTL_SECS;
use rentease_shared::auth::session::DEFAULT_SESSION_TTL_HOURS;
use rentease_shared::notifications::DEFAULT_BROADCAST_CAPACITY;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Shortest accepted session secret
pub const MIN_SESSION_SECRET_LEN: usize = 32;

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,

    /// `None` runs on the in-memory store
    pub database: Option<DatabaseConfig>,

    pub session: SessionConfig,

    pub uploads: UploadConfig,

    pub realtime: RealtimeConfig,

    pub log_format: LogFormat,
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,

    pub port: u16,

    /// `*` means permissive CORS
    pub cors_origins: Vec<String>,

    /// Turns on HSTS and `Secure` cookies
    pub production: bool,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,

    pub max_connections: u32,
}

/// Session and reset-token configuration
#[derive(Clone)]
pub struct SessionConfig {
    /// HS256 signing secret
    ///
    /// Generate with: `openssl rand -hex 32`
    pub secret: String,

    pub ttl_hours: i64,

    pub reset_token_ttl_secs: i64,
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("secret", &"<redacted>")
            .field("ttl_hours", &self.ttl_hours)
            .field("reset_token_ttl_secs", &self.reset_token_ttl_secs)
            .finish()
    }
}

/// Profile picture storage
#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub dir: PathBuf,
}

/// Dashboard broadcast configuration
#[derive(Debug, Clone)]
pub struct RealtimeConfig {
    pub broadcast_capacity: usize,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => anyhow::bail!("Unknown LOG_FORMAT: {}", other),
        }
    }
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if `SESSION_SECRET` is missing or too short, or if a
    /// numeric variable does not parse.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = get("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_or(get("API_PORT"), "API_PORT", 8080u16)?;

        let cors_origins = get("CORS_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_else(|| vec!["*".to_string()]);

        let production = get("PRODUCTION")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let database = match get("DATABASE_URL") {
            Some(url) => Some(DatabaseConfig {
                url,
                max_connections: parse_or(
                    get("DATABASE_MAX_CONNECTIONS"),
                    "DATABASE_MAX_CONNECTIONS",
                    10u32,
                )?,
            }),
            None => None,
        };

        let secret = get("SESSION_SECRET")
            .ok_or_else(|| anyhow::anyhow!("SESSION_SECRET environment variable is required"))?;
        if secret.len() < MIN_SESSION_SECRET_LEN {
            anyhow::bail!(
                "SESSION_SECRET must be at least {} characters long",
                MIN_SESSION_SECRET_LEN
            );
        }

        let ttl_hours = parse_or(get("SESSION_TTL_HOURS"), "SESSION_TTL_HOURS", DEFAULT_SESSION_TTL_HOURS)?;
        let reset_token_ttl_secs = parse_or(
            get("RESET_TOKEN_TTL_SECS"),
            "RESET_TOKEN_TTL_SECS",
            DEFAULT_RESET_TOKEN_TTL_SECS,
        )?;
        if ttl_hours <= 0 || reset_token_ttl_secs <= 0 {
            anyhow::bail!("SESSION_TTL_HOURS and RESET_TOKEN_TTL_SECS must be positive");
        }

        let upload_dir = get("UPLOAD_DIR").unwrap_or_else(|| "uploads".to_string());
        let broadcast_capacity = parse_or(
            get("BROADCAST_CAPACITY"),
            "BROADCAST_CAPACITY",
            DEFAULT_BROADCAST_CAPACITY,
        )?;

        let log_format = match get("LOG_FORMAT") {
            Some(v) => v.parse()?,
            None => LogFormat::default(),
        };

        Ok(Self {
            api: ApiConfig {
                host,
                port,
                cors_origins,
                production,
            },
            database,
            session: SessionConfig {
                secret,
                ttl_hours,
                reset_token_ttl_secs,
            },
            uploads: UploadConfig {
                dir: PathBuf::from(upload_dir),
            },
            realtime: RealtimeConfig { broadcast_capacity },
            log_format,
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.session.ttl_hours)
    }

    pub fn reset_token_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.session.reset_token_ttl_secs)
    }
}

fn parse_or<T>(value: Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(v) => v
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid {}: {}", key, e)),
        None => Ok(default),
    }
}
