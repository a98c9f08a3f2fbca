//! Scripted engine, recording dispatcher and replay scenarios.
//!
//! [`ScriptedConference`] is an in-memory [`Conference`]: it records every
//! engine call, fails session creation for scripted addresses and fans
//! emitted events out to registered listeners. Together with
//! [`RecordingDispatcher`] it lets a [`Scenario`] run end to end without a
//! real conferencing engine.
//!
//! # Scenario format
//!
//! ```json
//! {
//!   "failures": { "sip:lobby@example.com": "session-exists" },
//!   "emit_pending_on_start": true,
//!   "steps": [
//!     { "step": "availability_changed", "status": "available" },
//!     { "step": "invite_rooms", "rooms": [{ "id": "sip:a@example.com", "name": "Alice" }] },
//!     { "step": "session_state_changed", "address": "sip:a@example.com",
//!       "display_name": "Alice", "new_state": "failed" }
//!   ]
//! }
//! ```

use crate::actions::{Action, ActionDispatcher};
use crate::actors::GatewayNotifierHandle;
use crate::engine::{Conference, EventListener, GatewaySession, ListenerId};
use crate::errors::{SessionCreateError, SipGwError};
use crate::mapper::InviteOutcome;
use crate::models::{
    GatewayEvent, GatewayEventKind, GatewayStatus, Room, SessionState, SessionStateEvent,
};
use crate::notifications::Notification;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// A call the notifier made into the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    CreateSession {
        address: String,
        display_name: String,
    },
    StartSession {
        address: String,
    },
}

/// In-memory conference with scripted session-creation results.
#[derive(Clone, Default)]
pub struct ScriptedConference {
    inner: Arc<Mutex<ScriptedInner>>,
}

#[derive(Default)]
struct ScriptedInner {
    listeners: Vec<(ListenerId, GatewayEventKind, EventListener)>,
    failures: HashMap<String, SessionCreateError>,
    calls: Vec<EngineCall>,
    emit_pending_on_start: bool,
}

impl ScriptedConference {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail session creation for `address` with `error`.
    #[must_use]
    pub fn with_failure(self, address: &str, error: SessionCreateError) -> Self {
        self.lock().failures.insert(address.to_string(), error);
        self
    }

    /// Emit a `pending` session-state event whenever a session is started.
    #[must_use]
    pub fn with_pending_on_start(self) -> Self {
        self.lock().emit_pending_on_start = true;
        self
    }

    /// Engine calls made so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<EngineCall> {
        self.lock().calls.clone()
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }

    /// Deliver `event` to every listener registered for its kind.
    pub fn emit(&self, event: &GatewayEvent) {
        let kind = event.kind();
        // Listeners run outside the lock so they may call back into the conference
        let matching: Vec<EventListener> = self
            .lock()
            .listeners
            .iter()
            .filter(|(_, listener_kind, _)| *listener_kind == kind)
            .map(|(_, _, listener)| Arc::clone(listener))
            .collect();

        for listener in matching {
            listener(event.clone());
        }
    }

    fn lock(&self) -> MutexGuard<'_, ScriptedInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for ScriptedConference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.lock();
        f.debug_struct("ScriptedConference")
            .field("listeners", &inner.listeners.len())
            .field("failures", &inner.failures)
            .field("calls", &inner.calls)
            .field("emit_pending_on_start", &inner.emit_pending_on_start)
            .finish()
    }
}

impl Conference for ScriptedConference {
    type Session = ScriptedSession;

    fn add_listener(&self, kind: GatewayEventKind, listener: EventListener) -> ListenerId {
        let id = ListenerId::new();
        self.lock().listeners.push((id, kind, listener));
        id
    }

    fn remove_listener(&self, id: ListenerId) -> bool {
        let mut inner = self.lock();
        let before = inner.listeners.len();
        inner.listeners.retain(|(listener_id, _, _)| *listener_id != id);
        inner.listeners.len() != before
    }

    fn create_session(
        &self,
        address: &str,
        display_name: &str,
    ) -> Result<ScriptedSession, SessionCreateError> {
        let mut inner = self.lock();
        inner.calls.push(EngineCall::CreateSession {
            address: address.to_string(),
            display_name: display_name.to_string(),
        });

        if let Some(error) = inner.failures.get(address) {
            return Err(error.clone());
        }

        Ok(ScriptedSession {
            address: address.to_string(),
            display_name: display_name.to_string(),
            conference: self.clone(),
        })
    }
}

/// Session handed out by [`ScriptedConference`].
#[derive(Debug)]
pub struct ScriptedSession {
    address: String,
    display_name: String,
    conference: ScriptedConference,
}

impl GatewaySession for ScriptedSession {
    fn address(&self) -> &str {
        &self.address
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn start(&self) {
        let emit_pending = {
            let mut inner = self.conference.lock();
            inner.calls.push(EngineCall::StartSession {
                address: self.address.clone(),
            });
            inner.emit_pending_on_start
        };

        if emit_pending {
            let mut event =
                SessionStateEvent::new(&self.address, &self.display_name, SessionState::Pending);
            event.old_state = Some(SessionState::Off);
            self.conference
                .emit(&GatewayEvent::SessionStateChanged(event));
        }
    }
}

/// Dispatcher that keeps every action in arrival order.
#[derive(Debug, Default)]
pub struct RecordingDispatcher {
    actions: Mutex<Vec<Action>>,
}

impl RecordingDispatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All actions dispatched so far.
    #[must_use]
    pub fn actions(&self) -> Vec<Action> {
        self.lock().clone()
    }

    /// Notifications dispatched so far, in order.
    #[must_use]
    pub fn notifications(&self) -> Vec<Notification> {
        self.lock()
            .iter()
            .filter_map(Action::notification)
            .cloned()
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Action>> {
        self.actions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ActionDispatcher for RecordingDispatcher {
    fn dispatch(&self, action: Action) {
        self.lock().push(action);
    }
}

/// One replay step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum ScenarioStep {
    AvailabilityChanged { status: GatewayStatus },
    SessionStateChanged(SessionStateEvent),
    InviteRooms { rooms: Vec<Room> },
}

impl ScenarioStep {
    /// The engine event for event steps, `None` for commands.
    #[must_use]
    pub fn as_event(&self) -> Option<GatewayEvent> {
        match self {
            ScenarioStep::AvailabilityChanged { status } => {
                Some(GatewayEvent::AvailabilityChanged { status: *status })
            }
            ScenarioStep::SessionStateChanged(event) => {
                Some(GatewayEvent::SessionStateChanged(event.clone()))
            }
            ScenarioStep::InviteRooms { .. } => None,
        }
    }
}

/// A scripted conference session to replay through the notifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Engine error code per room address.
    #[serde(default)]
    pub failures: BTreeMap<String, String>,
    #[serde(default)]
    pub emit_pending_on_start: bool,
    #[serde(default)]
    pub steps: Vec<ScenarioStep>,
}

impl Scenario {
    /// Parse a scenario from JSON text.
    pub fn from_json(json: &str) -> Result<Self, SipGwError> {
        serde_json::from_str(json).map_err(|e| SipGwError::Scenario(format!("invalid JSON: {e}")))
    }

    /// Read and parse a scenario file.
    pub fn load(path: &Path) -> Result<Self, SipGwError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            SipGwError::Scenario(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_json(&json)
    }

    /// Build the scripted conference described by this scenario.
    #[must_use]
    pub fn conference(&self) -> ScriptedConference {
        let conference = self
            .failures
            .iter()
            .fold(ScriptedConference::new(), |conference, (address, code)| {
                conference.with_failure(address, SessionCreateError::from_code(code))
            });

        if self.emit_pending_on_start {
            conference.with_pending_on_start()
        } else {
            conference
        }
    }

    /// Run every step against `conference` and the notifier behind `handle`.
    ///
    /// Events are emitted through the conference so they take the same path as
    /// live engine events. Returns the outcome of each invite step.
    pub async fn run(
        &self,
        conference: &ScriptedConference,
        handle: &GatewayNotifierHandle,
    ) -> Result<Vec<InviteOutcome>, SipGwError> {
        let mut outcomes = Vec::new();

        for (index, step) in self.steps.iter().enumerate() {
            debug!(target: "sipgw.replay", step = index, "Replaying step");

            if let Some(event) = step.as_event() {
                conference.emit(&event);
            } else if let ScenarioStep::InviteRooms { rooms } = step {
                outcomes.push(handle.invite_rooms(rooms.clone()).await?);
            }
        }

        Ok(outcomes)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_scripted_conference_records_calls() {
        let conference =
            ScriptedConference::new().with_failure("sip:b", SessionCreateError::NoConnection);

        let session = conference.create_session("sip:a", "Alice").unwrap();
        session.start();
        let err = conference.create_session("sip:b", "Bob").unwrap_err();

        assert_eq!(err, SessionCreateError::NoConnection);
        assert_eq!(
            conference.calls(),
            vec![
                EngineCall::CreateSession {
                    address: "sip:a".to_string(),
                    display_name: "Alice".to_string()
                },
                EngineCall::StartSession {
                    address: "sip:a".to_string()
                },
                EngineCall::CreateSession {
                    address: "sip:b".to_string(),
                    display_name: "Bob".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_start_emits_pending_when_configured() {
        let conference = ScriptedConference::new().with_pending_on_start();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        conference.add_listener(
            GatewayEventKind::SessionStateChanged,
            Arc::new(move |event: GatewayEvent| seen_clone.lock().unwrap().push(event)),
        );

        conference.create_session("sip:a", "Alice").unwrap().start();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let GatewayEvent::SessionStateChanged(event) = &seen[0] else {
            unreachable!("only session state listeners are registered");
        };
        assert_eq!(event.new_state, SessionState::Pending);
        assert_eq!(event.display_name, "Alice");
    }

    #[test]
    fn test_remove_unknown_listener() {
        let conference = ScriptedConference::new();
        assert!(!conference.remove_listener(ListenerId::new()));

        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = Arc::clone(&counter);
        let id = conference.add_listener(
            GatewayEventKind::AvailabilityChanged,
            Arc::new(move |_: GatewayEvent| {
                counter_clone.fetch_add(1, Ordering::SeqCst);
            }),
        );
        assert!(conference.remove_listener(id));
        assert!(!conference.remove_listener(id));
    }

    #[test]
    fn test_scenario_parsing() {
        let scenario = Scenario::from_json(
            r#"{
                "failures": { "sip:lobby": "session-exists", "sip:x": "weird" },
                "emit_pending_on_start": true,
                "steps": [
                    { "step": "availability_changed", "status": "available" },
                    { "step": "invite_rooms", "rooms": [{ "id": "sip:a", "name": "Alice" }, { "name": "NoAddress" }] },
                    { "step": "session_state_changed", "address": "sip:a", "display_name": "Alice", "new_state": "on" }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(scenario.steps.len(), 3);
        assert!(scenario.emit_pending_on_start);
        assert_eq!(
            scenario.steps[0].as_event(),
            Some(GatewayEvent::AvailabilityChanged {
                status: GatewayStatus::Available
            })
        );
        assert!(scenario.steps[1].as_event().is_none());

        let conference = scenario.conference();
        assert_eq!(
            conference.create_session("sip:lobby", "Lobby").unwrap_err(),
            SessionCreateError::SessionExists
        );
        assert_eq!(
            conference.create_session("sip:x", "X").unwrap_err(),
            SessionCreateError::Other("weird".to_string())
        );
    }

    #[test]
    fn test_scenario_invalid_json() {
        let result = Scenario::from_json(r#"{"steps": [{"step": "dance"}]}"#);
        assert!(matches!(result, Err(SipGwError::Scenario(_))));
    }

    #[test]
    fn test_scenario_missing_file() {
        let result = Scenario::load(Path::new("/nonexistent/sipgw-scenario.json"));
        assert!(matches!(result, Err(SipGwError::Scenario(msg)) if msg.contains("failed to read")));
    }
}
