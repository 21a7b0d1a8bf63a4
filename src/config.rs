use crate::logic::ScriptLimits;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub script: ScriptConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Bounds for the case script runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptConfig {
    pub timeout_ms: u64,
    pub max_operations: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3100,
        }
    }
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 1000,
            max_operations: 1_000_000,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and config file
    pub fn load() -> anyhow::Result<Self> {
        let mut config = config::Config::builder();

        // Add default configuration
        config = config.add_source(config::Config::try_from(&AppConfig::default())?);

        // Add config file if it exists
        config = config.add_source(config::File::with_name("config").required(false));

        // Add environment variables with prefix "CASEBENCH_"
        config = config.add_source(
            config::Environment::with_prefix("CASEBENCH")
                .separator("_")
                .prefix_separator("_"),
        );

        let config = config.build()?;
        let app_config: AppConfig = config.try_deserialize()?;

        Ok(app_config)
    }

    /// Get the server bind address
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn script_limits(&self) -> ScriptLimits {
        ScriptLimits {
            timeout: Duration::from_millis(self.script.timeout_ms),
            max_operations: self.script.max_operations,
        }
    }
}
