/// Configuration management for the API server
///
/// Configuration is loaded once at startup from environment variables and
/// handed to the rest of the application through `AppState`.
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (takes precedence)
/// - `POSTGRES_USER`, `POSTGRES_PASSWORD`, `POSTGRES_DB`, `POSTGRES_SERVER`,
///   `POSTGRES_PORT` (default: 5432): used when `DATABASE_URL` is not set
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8000)
/// - `CORS_ORIGINS`: Comma separated allowed origins (default: *)
/// - `RUN_MIGRATIONS`: Apply migrations at startup (default: true)
/// - `LOG_FORMAT`: `json` for JSON log lines, anything else for text
/// - `RUST_LOG`: Log filter (default: info)
///
/// # Example
///
/// ```no_run
/// use familyhub_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use familyhub_shared::db::pool::DatabaseConfig as PoolConfig;
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgConnectOptions;
use std::env;
use std::fmt;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseSettings,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins; `*` allows any
    pub cors_origins: Vec<String>,

    /// Whether to apply pending migrations at startup
    pub run_migrations: bool,
}

/// Database connection settings
///
/// The URL and password may carry credentials; neither is serialized and
/// `Debug` redacts both.
#[derive(Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// Full connection URL, if given
    #[serde(skip_serializing)]
    pub url: Option<String>,

    pub user: Option<String>,

    #[serde(skip_serializing)]
    pub password: Option<String>,

    pub name: Option<String>,

    pub server: Option<String>,

    pub port: u16,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Emit JSON log lines
    pub json: bool,
}

fn parse_bool(value: &str) -> anyhow::Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("invalid boolean value: {}", other),
    }
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// A `.env` file in the working directory is read first, if present.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable has an invalid value or no database
    /// location is configured
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_host = lookup("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let api_port = lookup("API_PORT")
            .unwrap_or_else(|| "8000".to_string())
            .parse::<u16>()?;

        let cors_origins: Vec<String> = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let run_migrations = match lookup("RUN_MIGRATIONS") {
            Some(value) => parse_bool(&value)?,
            None => true,
        };

        let max_connections = lookup("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|| "10".to_string())
            .parse::<u32>()?;

        let port = lookup("POSTGRES_PORT")
            .unwrap_or_else(|| "5432".to_string())
            .parse::<u16>()?;

        let database = DatabaseSettings {
            url: lookup("DATABASE_URL"),
            user: lookup("POSTGRES_USER"),
            password: lookup("POSTGRES_PASSWORD"),
            name: lookup("POSTGRES_DB"),
            server: lookup("POSTGRES_SERVER"),
            port,
            max_connections,
        };

        if database.url.is_none() && (database.server.is_none() || database.name.is_none()) {
            anyhow::bail!(
                "DATABASE_URL or POSTGRES_SERVER and POSTGRES_DB environment variables are required"
            );
        }

        let json = lookup("LOG_FORMAT")
            .map(|format| format.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
                cors_origins,
                run_migrations,
            },
            database,
            logging: LoggingConfig { json },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Whether any origin is allowed
    pub fn cors_allows_any(&self) -> bool {
        self.api.cors_origins.iter().any(|origin| origin == "*")
    }
}

fn redacted(value: &Option<String>) -> Option<&'static str> {
    value.as_ref().map(|_| "<redacted>")
}

impl fmt::Debug for DatabaseSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseSettings")
            .field("url", &redacted(&self.url))
            .field("user", &self.user)
            .field("password", &redacted(&self.password))
            .field("name", &self.name)
            .field("server", &self.server)
            .field("port", &self.port)
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

impl DatabaseSettings {
    /// Connection options for the configured database
    ///
    /// Individual settings are applied field by field, so passwords never
    /// need URL escaping.
    pub fn connect_options(&self) -> anyhow::Result<PgConnectOptions> {
        if let Some(url) = &self.url {
            return Ok(url.parse::<PgConnectOptions>()?);
        }

        let mut options = PgConnectOptions::new().port(self.port);
        if let Some(server) = &self.server {
            options = options.host(server);
        }
        if let Some(user) = &self.user {
            options = options.username(user);
        }
        if let Some(password) = &self.password {
            options = options.password(password);
        }
        if let Some(name) = &self.name {
            options = options.database(name);
        }

        Ok(options)
    }

    /// Pool configuration for these settings
    pub fn pool_config(&self) -> anyhow::Result<PoolConfig> {
        Ok(PoolConfig {
            connect_options: self.connect_options()?,
            max_connections: self.max_connections,
            min_connections: self.max_connections.min(2),
            ..Default::default()
        })
    }
}
