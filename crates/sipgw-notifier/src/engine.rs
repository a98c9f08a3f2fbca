//! Seam to the conferencing engine.
//!
//! The engine owns conferences and gateway sessions. The notifier only
//! registers listeners, requests sessions and starts them.

use crate::errors::SessionCreateError;
use crate::models::{GatewayEvent, GatewayEventKind};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Callback invoked by the engine for every event of the registered kind.
///
/// Called on the engine's thread; implementations must not block.
pub type EventListener = Arc<dyn Fn(GatewayEvent) + Send + Sync>;

/// Identifies one listener registration on a conference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(Uuid);

impl ListenerId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ListenerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A gateway session created by the engine for one room.
pub trait GatewaySession: Send {
    fn address(&self) -> &str;

    fn display_name(&self) -> &str;

    /// Ask the engine to dial the room. Progress arrives as session-state events.
    fn start(&self);
}

/// A conference handle exposing the SIP gateway API.
pub trait Conference: Send + Sync {
    type Session: GatewaySession;

    /// Register a listener for one event kind.
    fn add_listener(&self, kind: GatewayEventKind, listener: EventListener) -> ListenerId;

    /// Remove a listener. Returns `false` if the id was not registered.
    fn remove_listener(&self, id: ListenerId) -> bool;

    /// Create (but do not start) a session for a room.
    fn create_session(
        &self,
        address: &str,
        display_name: &str,
    ) -> Result<Self::Session, SessionCreateError>;
}
