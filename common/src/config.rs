// Configuration management with layered configuration (file, env)

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main settings structure containing all configuration options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub database: DatabaseConfig,
    pub notifier: NotifierConfig,
    pub dispatcher: DispatcherConfig,
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_seconds: u64,
}

/// Settings for the outbound notification gateway adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierConfig {
    pub endpoint: String,
    #[serde(default)]
    pub token: Option<String>,
    pub from_address: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatcherConfig {
    /// How often to scan for due reminders (in seconds)
    pub scan_interval_seconds: u64,
    /// Maximum concurrent notification attempts per batch
    pub chunk_size: usize,
    /// How far ahead of a task's due time its reminder fires. Policy value
    /// consumed by reminder producers.
    pub lead_interval_minutes: i64,
}

impl DispatcherConfig {
    pub fn lead_interval(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.lead_interval_minutes)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    pub log_level: String,
}

impl Settings {
    /// Load configuration with layered precedence: defaults → file → env
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path("config")
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Start with default configuration
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Add local configuration (not committed to git)
            .add_source(File::from(config_dir.join("local.toml")).required(false))
            // Add environment-specific configuration
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), String> {
        // Validate database config
        if self.database.url.is_empty() {
            return Err("Database URL cannot be empty".to_string());
        }
        if self.database.max_connections == 0 {
            return Err("Database max_connections must be greater than 0".to_string());
        }

        // Validate notifier config
        if self.notifier.endpoint.is_empty() {
            return Err("Notifier endpoint cannot be empty".to_string());
        }
        if self.notifier.from_address.is_empty() {
            return Err("Notifier from_address cannot be empty".to_string());
        }
        if self.notifier.timeout_seconds == 0 {
            return Err("Notifier timeout_seconds must be greater than 0".to_string());
        }

        // Validate dispatcher config
        if self.dispatcher.scan_interval_seconds == 0 {
            return Err("Dispatcher scan_interval_seconds must be greater than 0".to_string());
        }
        if self.dispatcher.chunk_size == 0 {
            return Err("Dispatcher chunk_size must be greater than 0".to_string());
        }
        if self.dispatcher.lead_interval_minutes <= 0 {
            return Err("Dispatcher lead_interval_minutes must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "postgresql://localhost/taskhub".to_string(),
                max_connections: 10,
                min_connections: 2,
                connect_timeout_seconds: 30,
            },
            notifier: NotifierConfig {
                endpoint: "http://localhost:8025/api/notifications".to_string(),
                token: None,
                from_address: "reminders@taskhub.local".to_string(),
                timeout_seconds: 30,
            },
            dispatcher: DispatcherConfig {
                scan_interval_seconds: 120,
                chunk_size: 50,
                lead_interval_minutes: 60,
            },
            observability: ObservabilityConfig {
                log_level: "info".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_validation_catches_empty_database_url() {
        let mut settings = Settings::default();
        settings.database.url = String::new();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validation_catches_zero_scan_interval() {
        let mut settings = Settings::default();
        settings.dispatcher.scan_interval_seconds = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validation_catches_zero_chunk_size() {
        let mut settings = Settings::default();
        settings.dispatcher.chunk_size = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validation_catches_empty_notifier_endpoint() {
        let mut settings = Settings::default();
        settings.notifier.endpoint = String::new();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_lead_interval_conversion() {
        let settings = Settings::default();
        assert_eq!(
            settings.dispatcher.lead_interval(),
            chrono::Duration::minutes(60)
        );
    }
}
