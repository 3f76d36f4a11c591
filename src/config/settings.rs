use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub db: DbConfig,
    #[serde(default)]
    pub probe: ProbeConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Database connection settings, sourced from `DB_HOST`, `DB_NAME`,
/// `DB_USER` and `DB_PASS`. All four are required for a probe to succeed,
/// but none is required for the process to start.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DbConfig {
    pub host: Option<String>,
    pub name: Option<String>,
    pub user: Option<String>,
    pub pass: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProbeConfig {
    /// Maximum connection attempts per probe
    #[serde(default = "default_probe_attempts")]
    pub attempts: u32,
    /// Fixed delay between attempts, in seconds
    #[serde(default = "default_probe_delay")]
    pub delay: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_probe_attempts() -> u32 {
    5
}

fn default_probe_delay() -> u64 {
    5
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        // Load .env file if exists
        let _ = dotenvy::dotenv();

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = Config::builder()
            // Start with default values
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("probe.attempts", 5)?
            .set_default("probe.delay", 5)?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Load from environment variables
            // SERVER_HOST, SERVER_PORT, DB_HOST, DB_NAME, DB_USER, DB_PASS, etc.
            .add_source(Environment::default().separator("_").try_parsing(true));

        builder.build()?.try_deserialize()
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl DbConfig {
    /// Environment variable names for settings that are currently unset.
    pub fn missing_variables(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.host.is_none() {
            missing.push("DB_HOST");
        }
        if self.name.is_none() {
            missing.push("DB_NAME");
        }
        if self.user.is_none() {
            missing.push("DB_USER");
        }
        if self.pass.is_none() {
            missing.push("DB_PASS");
        }
        missing
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            db: DbConfig::default(),
            probe: ProbeConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            attempts: default_probe_attempts(),
            delay: default_probe_delay(),
        }
    }
}
