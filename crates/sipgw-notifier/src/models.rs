//! Gateway domain types shared between the engine seam, the mapper and replay.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Availability of the SIP gateway service for the current conference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayStatus {
    /// No gateway has reported in yet.
    #[default]
    Undefined,
    /// Every gateway instance is in use.
    Busy,
    /// A gateway can take a new session.
    Available,
}

impl GatewayStatus {
    /// Returns the wire name of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            GatewayStatus::Undefined => "undefined",
            GatewayStatus::Busy => "busy",
            GatewayStatus::Available => "available",
        }
    }
}

impl fmt::Display for GatewayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of a single gateway session as reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    On,
    Off,
    Pending,
    Retrying,
    Failed,
}

impl SessionState {
    /// Returns the wire name of the state.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            SessionState::On => "on",
            SessionState::Off => "off",
            SessionState::Pending => "pending",
            SessionState::Retrying => "retrying",
            SessionState::Failed => "failed",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of a session-state-changed event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStateEvent {
    /// SIP address of the room the session bridges.
    pub address: String,
    /// Display name of the room.
    pub display_name: String,
    /// Previous state, absent for the first transition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_state: Option<SessionState>,
    pub new_state: SessionState,
    /// Engine-provided reason, usually set with `Failed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

impl SessionStateEvent {
    #[must_use]
    pub fn new(
        address: impl Into<String>,
        display_name: impl Into<String>,
        new_state: SessionState,
    ) -> Self {
        Self {
            address: address.into(),
            display_name: display_name.into(),
            old_state: None,
            new_state,
            failure_reason: None,
        }
    }
}

/// Events a conference emits for its SIP gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GatewayEvent {
    AvailabilityChanged { status: GatewayStatus },
    SessionStateChanged(SessionStateEvent),
}

impl GatewayEvent {
    /// Which listener kind receives this event.
    #[must_use]
    pub const fn kind(&self) -> GatewayEventKind {
        match self {
            GatewayEvent::AvailabilityChanged { .. } => GatewayEventKind::AvailabilityChanged,
            GatewayEvent::SessionStateChanged(_) => GatewayEventKind::SessionStateChanged,
        }
    }
}

/// Listener registration key on a conference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayEventKind {
    AvailabilityChanged,
    SessionStateChanged,
}

impl GatewayEventKind {
    /// Returns the event kind as a string for metric labels.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            GatewayEventKind::AvailabilityChanged => "availability_changed",
            GatewayEventKind::SessionStateChanged => "session_state_changed",
        }
    }
}

/// A room the user asked to invite into the conference.
///
/// Serialized as `{"id": <sip address>, "name": <display name>}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Room {
    #[serde(rename = "id", default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(rename = "name", default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl Room {
    #[must_use]
    pub fn new(address: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            address: Some(address.into()),
            display_name: Some(display_name.into()),
        }
    }

    /// Returns `(address, display_name)` when both are present and non-empty.
    #[must_use]
    pub fn target(&self) -> Option<(&str, &str)> {
        let address = self.address.as_deref().filter(|s| !s.is_empty())?;
        let display_name = self.display_name.as_deref().filter(|s| !s.is_empty())?;
        Some((address, display_name))
    }
}
