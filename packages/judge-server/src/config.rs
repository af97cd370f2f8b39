use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use worker::WorkerConfig;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_origins: Vec::new(),
            max_age: 3600,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DatabaseConfig {
    /// Postgres URL. Empty runs on in-memory stores.
    #[serde(default)]
    pub url: String,
    /// JSON seed for the in-memory stores.
    #[serde(default)]
    pub seed_file: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

/// Submission intake limits.
#[derive(Debug, Deserialize, Clone)]
pub struct SubmissionConfig {
    /// Maximum source size in bytes. Default: 64 KiB.
    #[serde(default = "default_max_code_size")]
    pub max_code_size: usize,
    /// Judge requests per student per minute; 0 disables. Default: 10.
    #[serde(default = "default_rate_limit_per_minute")]
    pub rate_limit_per_minute: u32,
    /// Time limit for ad-hoc runs without a question. Default: 5000.
    #[serde(default = "default_ad_hoc_time_limit_ms")]
    pub ad_hoc_time_limit_ms: u64,
}

fn default_max_code_size() -> usize {
    64 * 1024
}
fn default_rate_limit_per_minute() -> u32 {
    10
}
fn default_ad_hoc_time_limit_ms() -> u64 {
    5_000
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            max_code_size: default_max_code_size(),
            rate_limit_per_minute: default_rate_limit_per_minute(),
            ad_hoc_time_limit_ms: default_ad_hoc_time_limit_ms(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub submission: SubmissionConfig,
    #[serde(default)]
    pub worker: WorkerConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("JUDGE_CONFIG").unwrap_or_else(|_| "config/config".to_string());

        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("database.url", "")?
            .add_source(File::with_name(&config_path).required(false))
            // Override from environment (e.g., JUDGE__AUTH__JWT_SECRET)
            .add_source(Environment::with_prefix("JUDGE").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
