//! SIP gateway notifier configuration.
//!
//! Configuration is loaded from environment variables with defaults for
//! everything except the scenario path, which only the replay binary needs.

use std::collections::HashMap;
use std::env;
use thiserror::Error;

/// Default auto-dismiss delay for the "invite pending" notification.
pub const DEFAULT_PENDING_AUTO_DISMISS_MS: u64 = 2000;

/// Default `serviceName` argument for the "service unavailable" notification.
pub const DEFAULT_SERVICE_NAME: &str = "$t(videoSIPGW.serviceName)";

/// Default notifier command mailbox size.
pub const DEFAULT_COMMAND_CHANNEL_BUFFER: usize = 100;

/// Notifier configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Auto-dismiss delay for pending notifications in milliseconds (default: 2000).
    pub pending_auto_dismiss_ms: u64,

    /// Localized service name passed to the "service unavailable" description.
    pub service_name: String,

    /// Capacity of the notifier command mailbox (default: 100).
    ///
    /// Only handle commands are queued; engine events are mapped on arrival.
    pub command_channel_buffer: usize,

    /// Scenario file replayed by the `sipgw-notifier` binary.
    pub scenario_path: Option<String>,

    /// Print Prometheus metrics to stderr after a replay.
    pub print_metrics: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pending_auto_dismiss_ms: DEFAULT_PENDING_AUTO_DISMISS_MS,
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            command_channel_buffer: DEFAULT_COMMAND_CHANNEL_BUFFER,
            scenario_path: None,
            print_metrics: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a `HashMap` (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let pending_auto_dismiss_ms = vars
            .get("SIPGW_PENDING_AUTO_DISMISS_MS")
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_PENDING_AUTO_DISMISS_MS);

        let service_name = vars
            .get("SIPGW_SERVICE_NAME")
            .cloned()
            .unwrap_or_else(|| DEFAULT_SERVICE_NAME.to_string());

        let command_channel_buffer = vars
            .get("SIPGW_COMMAND_CHANNEL_BUFFER")
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_COMMAND_CHANNEL_BUFFER);

        // tokio::sync::mpsc::channel panics on a zero capacity
        if command_channel_buffer == 0 {
            return Err(ConfigError::InvalidValue(
                "SIPGW_COMMAND_CHANNEL_BUFFER must be greater than 0".to_string(),
            ));
        }

        let scenario_path = vars
            .get("SIPGW_SCENARIO_PATH")
            .filter(|s| !s.is_empty())
            .cloned();

        let print_metrics = vars
            .get("SIPGW_PRINT_METRICS")
            .is_some_and(|s| matches!(s.as_str(), "1" | "true" | "yes"));

        Ok(Config {
            pending_auto_dismiss_ms,
            service_name,
            command_channel_buffer,
            scenario_path,
            print_metrics,
        })
    }
}
