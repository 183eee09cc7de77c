use serde::{Deserialize, Serialize};

/// Environment variable naming an optional override file
pub const CONFIG_PATH_ENV: &str = "PAWSIGHT_CONFIG";

const DEFAULT_CONFIG_PATH: &str = "config/pawsight.toml";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Model artifact locations
    #[serde(default)]
    pub models: ModelsConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        Self::builder(&config_path)
            // Override with environment variables (prefix: PAWSIGHT__)
            .add_source(
                config::Environment::with_prefix("PAWSIGHT")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Load configuration from the defaults and one optional file only
    pub fn from_file(path: &str) -> Result<Self, config::ConfigError> {
        Self::builder(path).build()?.try_deserialize()
    }

    fn builder(path: &str) -> config::ConfigBuilder<config::builder::DefaultState> {
        config::Config::builder()
            // Start with default values
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            // Override with config file if it exists
            .add_source(config::File::with_name(path).required(false))
    }

    /// Socket address the HTTP server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsConfig {
    /// Priority classifier artifact
    #[serde(default = "default_priority_model_path")]
    pub priority_model_path: String,

    /// Severity regressor artifact
    #[serde(default = "default_severity_model_path")]
    pub severity_model_path: String,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            priority_model_path: default_priority_model_path(),
            severity_model_path: default_severity_model_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub json_logs: bool,

    /// Service name
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Enable Prometheus metrics
    #[serde(default = "default_true")]
    pub prometheus_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logs: false,
            service_name: default_service_name(),
            prometheus_enabled: true,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_priority_model_path() -> String {
    "models/priority_model_tirana_v2.json".to_string()
}

fn default_severity_model_path() -> String {
    "models/severity_model_tirana_v2.json".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_service_name() -> String {
    "pawsight".to_string()
}

fn default_true() -> bool {
    true
}
