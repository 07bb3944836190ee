//! Configuration handling for the NL2SQL server.
//!
//! Configuration comes from CLI arguments with environment fallbacks.
//! Database credentials are never configured here; they arrive with each
//! request and are discarded when the request completes.

use clap::Parser;
use std::time::Duration;

pub const DEFAULT_HTTP_HOST: &str = "127.0.0.1";
pub const DEFAULT_HTTP_PORT: u16 = 8080;
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_ORACLE_TIMEOUT_SECS: u64 = 60;

/// Configuration for the NL2SQL server.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "nl2sql-server",
    about = "HTTP service that turns natural-language questions into SQL against MySQL/MariaDB",
    version,
    author
)]
pub struct Config {
    /// HTTP host to bind to
    #[arg(long, default_value = DEFAULT_HTTP_HOST, env = "NL2SQL_HTTP_HOST")]
    pub http_host: String,

    /// HTTP port to bind to
    #[arg(long, default_value_t = DEFAULT_HTTP_PORT, env = "NL2SQL_HTTP_PORT")]
    pub http_port: u16,

    /// API key for the language-model service
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: String,

    /// Chat-completion model used for SQL generation and dump analysis
    #[arg(long, default_value = DEFAULT_MODEL, env = "NL2SQL_MODEL")]
    pub model: String,

    /// Base URL of the OpenAI-compatible API
    #[arg(long, default_value = DEFAULT_OPENAI_BASE_URL, env = "NL2SQL_OPENAI_BASE_URL")]
    pub openai_base_url: String,

    /// Timeout for a single language-model call, in seconds
    #[arg(long, default_value_t = DEFAULT_ORACLE_TIMEOUT_SECS, env = "NL2SQL_ORACLE_TIMEOUT")]
    pub oracle_timeout: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "NL2SQL_LOG_LEVEL")]
    pub log_level: String,

    /// Enable JSON logging format
    #[arg(long, env = "NL2SQL_JSON_LOGS")]
    pub json_logs: bool,
}

impl Config {
    /// Create a default configuration (useful for testing).
    pub fn default_config() -> Self {
        Self {
            http_host: DEFAULT_HTTP_HOST.to_string(),
            http_port: DEFAULT_HTTP_PORT,
            openai_api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            oracle_timeout: DEFAULT_ORACLE_TIMEOUT_SECS,
            log_level: "info".to_string(),
            json_logs: false,
        }
    }

    /// Get the HTTP bind address.
    pub fn http_bind_addr(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }

    /// Get the oracle call timeout as a Duration.
    pub fn oracle_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.oracle_timeout)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}
