//! Application configuration management.

use std::path::PathBuf;

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// PDF rendering configuration.
    #[serde(default)]
    pub pdf: PdfConfig,
    /// Currency rate lookup configuration.
    #[serde(default)]
    pub rates: RatesConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Base URL the headless browser uses to reach this server.
    ///
    /// Defaults to loopback on the configured port.
    pub public_url: Option<String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            public_url: None,
        }
    }
}

impl ServerConfig {
    /// Returns the base URL for loopback requests, without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> String {
        if let Some(url) = &self.public_url {
            return url.trim_end_matches('/').to_string();
        }
        let host = match self.host.as_str() {
            "0.0.0.0" | "::" | "[::]" => "127.0.0.1",
            other => other,
        };
        format!("http://{host}:{}", self.port)
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path of the SQLite database file.
    #[serde(default = "default_database_path")]
    pub path: PathBuf,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_path() -> PathBuf {
    PathBuf::from("data/invoices.db")
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            max_connections: default_max_connections(),
        }
    }
}

/// PDF rendering configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PdfConfig {
    /// Explicit Chrome/Chromium executable. Searched on `PATH` when unset.
    pub chrome_path: Option<PathBuf>,
    /// Seconds before a browser run is killed.
    #[serde(default = "default_pdf_timeout")]
    pub timeout_secs: u64,
    /// Maximum browser processes running at once.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
}

fn default_pdf_timeout() -> u64 {
    60
}

fn default_max_concurrent() -> usize {
    2
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            chrome_path: None,
            timeout_secs: default_pdf_timeout(),
            max_concurrent: default_max_concurrent(),
        }
    }
}

/// Currency rate lookup configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RatesConfig {
    /// JSON endpoint returning today's CME rates.
    #[serde(default = "default_rates_api_url")]
    pub api_url: String,
    /// CME home page, scraped when the JSON endpoint has no rates.
    #[serde(default = "default_rates_page_url")]
    pub page_url: String,
    /// Request timeout in seconds.
    #[serde(default = "default_rates_timeout")]
    pub timeout_secs: u64,
}

fn default_rates_api_url() -> String {
    "https://www.cme.sr/Home/GetTodaysExchangeRates/?BusinessDate=2016-07-25".to_string()
}

fn default_rates_page_url() -> String {
    "https://www.cme.sr/".to_string()
}

fn default_rates_timeout() -> u64 {
    10
}

impl Default for RatesConfig {
    fn default() -> Self {
        Self {
            api_url: default_rates_api_url(),
            page_url: default_rates_page_url(),
            timeout_secs: default_rates_timeout(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("INVOICER").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
