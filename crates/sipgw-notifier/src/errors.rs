//! SIP gateway notifier error types.
//!
//! Engine failures during session creation are modelled as a closed set of
//! codes. Crate-level errors only surface from configuration, scenario
//! loading and actor mailbox failures; invite failures are never raised.

use crate::config::ConfigError;
use thiserror::Error;

/// Wire code reported by the engine when no gateway connection exists.
pub const NO_CONNECTION_CODE: &str = "no-connection";

/// Wire code reported by the engine when the room already has a session.
pub const SESSION_EXISTS_CODE: &str = "session-exists";

/// Notifier error type.
#[derive(Debug, Error)]
pub enum SipGwError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Actor mailbox or response channel failed.
    #[error("Channel error: {0}")]
    Channel(String),

    /// Replay scenario could not be loaded.
    #[error("Scenario error: {0}")]
    Scenario(String),
}

/// Failure returned by the conferencing engine when creating a gateway session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionCreateError {
    /// The gateway has no connection to the conference.
    #[error("No connection")]
    NoConnection,

    /// A session for the same address is already running.
    #[error("Session already exists")]
    SessionExists,

    /// Anything the engine reports that has no dedicated notification.
    #[error("Session creation failed: {0}")]
    Other(String),
}

impl SessionCreateError {
    /// Parse an engine error code.
    ///
    /// Unrecognized codes are kept verbatim in [`SessionCreateError::Other`].
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code {
            NO_CONNECTION_CODE => SessionCreateError::NoConnection,
            SESSION_EXISTS_CODE => SessionCreateError::SessionExists,
            other => SessionCreateError::Other(other.to_string()),
        }
    }

    /// Returns the engine wire code for this error.
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            SessionCreateError::NoConnection => NO_CONNECTION_CODE,
            SessionCreateError::SessionExists => SESSION_EXISTS_CODE,
            SessionCreateError::Other(code) => code,
        }
    }

    /// Bounded label for the `outcome` metric dimension.
    #[must_use]
    pub const fn outcome_label(&self) -> &'static str {
        match self {
            SessionCreateError::NoConnection => "no_connection",
            SessionCreateError::SessionExists => "session_exists",
            SessionCreateError::Other(_) => "engine_error",
        }
    }
}
