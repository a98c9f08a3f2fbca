//! Notification values and the fixed gateway templates.
//!
//! A [`Notification`] carries localization keys and arguments only. Rendering,
//! translation and the auto-dismiss timer belong to the UI side.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Title key for the "invite pending" notification.
pub const PENDING_TITLE_KEY: &str = "videoSIPGW.pending";
/// Title key for the "invite failed" notification.
pub const INVITE_FAILED_TITLE_KEY: &str = "videoSIPGW.errorInviteFailedTitle";
/// Description key for the "invite failed" notification.
pub const INVITE_FAILED_DESCRIPTION_KEY: &str = "videoSIPGW.errorInviteFailed";
/// Title key for the "service unavailable" notification.
pub const UNAVAILABLE_TITLE_KEY: &str = "videoSIPGW.unavailableTitle";
/// Description key for the "service unavailable" notification.
pub const UNAVAILABLE_DESCRIPTION_KEY: &str = "recording.unavailable";
/// Title key for the "gateway busy" notification.
pub const BUSY_TITLE_KEY: &str = "videoSIPGW.busyTitle";
/// Description key for the "gateway busy" notification.
pub const BUSY_DESCRIPTION_KEY: &str = "videoSIPGW.busy";
/// Title key for the "no connection" notification.
pub const INVITE_ERROR_TITLE_KEY: &str = "videoSIPGW.errorInviteTitle";
/// Description key for the "no connection" notification.
pub const INVITE_ERROR_DESCRIPTION_KEY: &str = "videoSIPGW.errorInvite";
/// Title key for the "already invited" notification.
pub const ALREADY_INVITED_TITLE_KEY: &str = "videoSIPGW.errorAlreadyInvited";

/// Notification severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    /// Returns the severity as a string for metric labels.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

/// A user-facing notification request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub severity: Severity,
    pub title_key: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub title_arguments: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_key: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub description_arguments: BTreeMap<String, String>,
    /// Milliseconds until the renderer hides the notification on its own.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_dismiss_ms: Option<u64>,
}

impl Notification {
    #[must_use]
    pub fn new(severity: Severity, title_key: impl Into<String>) -> Self {
        Self {
            severity,
            title_key: title_key.into(),
            title_arguments: BTreeMap::new(),
            description_key: None,
            description_arguments: BTreeMap::new(),
            auto_dismiss_ms: None,
        }
    }

    #[must_use]
    pub fn with_title_argument(mut self, name: &str, value: impl Into<String>) -> Self {
        self.title_arguments.insert(name.to_string(), value.into());
        self
    }

    #[must_use]
    pub fn with_description(mut self, key: impl Into<String>) -> Self {
        self.description_key = Some(key.into());
        self
    }

    #[must_use]
    pub fn with_description_argument(mut self, name: &str, value: impl Into<String>) -> Self {
        self.description_arguments
            .insert(name.to_string(), value.into());
        self
    }

    #[must_use]
    pub fn with_auto_dismiss_ms(mut self, millis: u64) -> Self {
        self.auto_dismiss_ms = Some(millis);
        self
    }

    /// The `displayName` title argument, if the template carries one.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.title_arguments.get("displayName").map(String::as_str)
    }
}

/// Info notification shown while a room invite is being set up.
#[must_use]
pub fn invite_pending(display_name: &str, auto_dismiss_ms: u64) -> Notification {
    Notification::new(Severity::Info, PENDING_TITLE_KEY)
        .with_title_argument("displayName", display_name)
        .with_auto_dismiss_ms(auto_dismiss_ms)
}

/// Error notification for a session the engine reported as failed.
#[must_use]
pub fn invite_failed(display_name: &str) -> Notification {
    Notification::new(Severity::Error, INVITE_FAILED_TITLE_KEY)
        .with_title_argument("displayName", display_name)
        .with_description(INVITE_FAILED_DESCRIPTION_KEY)
}

/// Error notification when no gateway has reported availability.
#[must_use]
pub fn service_unavailable(service_name: &str) -> Notification {
    Notification::new(Severity::Error, UNAVAILABLE_TITLE_KEY)
        .with_description(UNAVAILABLE_DESCRIPTION_KEY)
        .with_description_argument("serviceName", service_name)
}

/// Warning notification when every gateway is busy.
#[must_use]
pub fn service_busy() -> Notification {
    Notification::new(Severity::Warning, BUSY_TITLE_KEY).with_description(BUSY_DESCRIPTION_KEY)
}

/// Error notification when the engine has no gateway connection.
#[must_use]
pub fn invite_error() -> Notification {
    Notification::new(Severity::Error, INVITE_ERROR_TITLE_KEY)
        .with_description(INVITE_ERROR_DESCRIPTION_KEY)
}

/// Warning notification when the room already has a session.
#[must_use]
pub fn already_invited(display_name: &str) -> Notification {
    Notification::new(Severity::Warning, ALREADY_INVITED_TITLE_KEY)
        .with_title_argument("displayName", display_name)
}
