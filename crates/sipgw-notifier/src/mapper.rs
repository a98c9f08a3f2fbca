//! Gateway event and invite mapping.
//!
//! [`NotificationMapper`] turns engine events into actions and drives session
//! creation for room invites. It holds only configuration: the availability
//! status is passed in by the caller for every invite, and no session or
//! event outlives the call that received it.
//!
//! # Invite semantics
//!
//! | Status      | Result                                           |
//! |-------------|--------------------------------------------------|
//! | `undefined` | one error notification, no sessions created      |
//! | `busy`      | one warning notification, no sessions created    |
//! | `available` | rooms processed in order, see below              |
//!
//! A room without an address or display name is logged and skipped. The first
//! engine error ends the whole invite; rooms after it are not attempted.

use crate::actions::{self, Action, ActionDispatcher};
use crate::config::Config;
use crate::engine::{Conference, GatewaySession};
use crate::errors::SessionCreateError;
use crate::models::{GatewayEvent, GatewayStatus, Room, SessionState, SessionStateEvent};
use crate::notifications;
use crate::observability::metrics;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Result of one invite command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InviteOutcome {
    /// No gateway has reported availability; nothing was attempted.
    ServiceUnavailable,
    /// All gateways are busy; nothing was attempted.
    ServiceBusy,
    /// Every room was either started or skipped.
    Finished { started: usize, skipped: usize },
    /// Session creation failed for `address`; later rooms were not attempted.
    Stopped {
        started: usize,
        skipped: usize,
        address: String,
        error: SessionCreateError,
    },
}

impl InviteOutcome {
    /// Bounded label for the `outcome` metric dimension.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            InviteOutcome::ServiceUnavailable => "service_unavailable",
            InviteOutcome::ServiceBusy => "service_busy",
            InviteOutcome::Finished { .. } => "finished",
            InviteOutcome::Stopped { error, .. } => error.outcome_label(),
        }
    }

    /// Number of sessions started.
    #[must_use]
    pub const fn started(&self) -> usize {
        match self {
            InviteOutcome::ServiceUnavailable | InviteOutcome::ServiceBusy => 0,
            InviteOutcome::Finished { started, .. } | InviteOutcome::Stopped { started, .. } => {
                *started
            }
        }
    }
}

/// Maps gateway events and invite commands to actions.
#[derive(Debug, Clone)]
pub struct NotificationMapper {
    pending_auto_dismiss_ms: u64,
    service_name: String,
}

impl Default for NotificationMapper {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl NotificationMapper {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            pending_auto_dismiss_ms: config.pending_auto_dismiss_ms,
            service_name: config.service_name.clone(),
        }
    }

    /// Map any gateway event.
    #[must_use]
    pub fn handle_event(&self, event: &GatewayEvent) -> Option<Action> {
        match event {
            GatewayEvent::AvailabilityChanged { status } => {
                Some(self.availability_changed(*status))
            }
            GatewayEvent::SessionStateChanged(event) => self.session_state_changed(event),
        }
    }

    /// Availability changes are forwarded unchanged as a state update.
    #[must_use]
    pub fn availability_changed(&self, status: GatewayStatus) -> Action {
        debug!(
            target: "sipgw.mapper",
            status = %status,
            "Gateway availability changed"
        );
        Action::AvailabilityChanged { status }
    }

    /// Only `pending` and `failed` transitions are shown to the user.
    #[must_use]
    pub fn session_state_changed(&self, event: &SessionStateEvent) -> Option<Action> {
        debug!(
            target: "sipgw.mapper",
            address = %event.address,
            old_state = ?event.old_state,
            new_state = %event.new_state,
            "Gateway session state changed"
        );

        match event.new_state {
            SessionState::Pending => Some(Action::ShowNotification(
                notifications::invite_pending(&event.display_name, self.pending_auto_dismiss_ms),
            )),
            SessionState::Failed => {
                warn!(
                    target: "sipgw.mapper",
                    address = %event.address,
                    failure_reason = ?event.failure_reason,
                    "Gateway session failed"
                );
                Some(Action::ShowNotification(notifications::invite_failed(
                    &event.display_name,
                )))
            }
            SessionState::On | SessionState::Off | SessionState::Retrying => None,
        }
    }

    /// Invite `rooms` into the conference through the SIP gateway.
    ///
    /// Notifications go straight to `dispatcher`. Failures are reported there
    /// or in the log, never returned as errors.
    pub fn invite_rooms<C, D>(
        &self,
        rooms: &[Room],
        status: GatewayStatus,
        conference: &C,
        dispatcher: &D,
    ) -> InviteOutcome
    where
        C: Conference + ?Sized,
        D: ActionDispatcher + ?Sized,
    {
        let start = Instant::now();

        let outcome = match status {
            GatewayStatus::Undefined => {
                actions::notify(
                    dispatcher,
                    notifications::service_unavailable(&self.service_name),
                );
                InviteOutcome::ServiceUnavailable
            }
            GatewayStatus::Busy => {
                actions::notify(dispatcher, notifications::service_busy());
                InviteOutcome::ServiceBusy
            }
            GatewayStatus::Available => Self::invite_available(rooms, conference, dispatcher),
        };

        metrics::record_invite(outcome.label(), start.elapsed());
        info!(
            target: "sipgw.mapper",
            status = %status,
            rooms = rooms.len(),
            outcome = outcome.label(),
            started = outcome.started(),
            "Room invite processed"
        );

        outcome
    }

    fn invite_available<C, D>(rooms: &[Room], conference: &C, dispatcher: &D) -> InviteOutcome
    where
        C: Conference + ?Sized,
        D: ActionDispatcher + ?Sized,
    {
        let mut started = 0;
        let mut skipped = 0;

        for room in rooms {
            let Some((address, display_name)) = room.target() else {
                error!(
                    target: "sipgw.mapper",
                    address = ?room.address,
                    display_name = ?room.display_name,
                    "Room is missing an address or display name, skipping"
                );
                metrics::record_room_skipped();
                skipped += 1;
                continue;
            };

            match conference.create_session(address, display_name) {
                Ok(session) => {
                    session.start();
                    metrics::record_session_started();
                    started += 1;
                    debug!(
                        target: "sipgw.mapper",
                        address = %session.address(),
                        display_name = %session.display_name(),
                        "Gateway session started"
                    );
                }
                Err(error) => {
                    match &error {
                        SessionCreateError::NoConnection => {
                            warn!(
                                target: "sipgw.mapper",
                                address = %address,
                                "Gateway has no connection"
                            );
                            actions::notify(dispatcher, notifications::invite_error());
                        }
                        SessionCreateError::SessionExists => {
                            warn!(
                                target: "sipgw.mapper",
                                address = %address,
                                "Room already has a gateway session"
                            );
                            actions::notify(
                                dispatcher,
                                notifications::already_invited(display_name),
                            );
                        }
                        SessionCreateError::Other(_) => {
                            error!(
                                target: "sipgw.mapper",
                                address = %address,
                                code = error.code(),
                                "Unrecognized error creating gateway session"
                            );
                        }
                    }

                    debug!(
                        target: "sipgw.mapper",
                        code = error.code(),
                        remaining = rooms.len().saturating_sub(started + skipped + 1),
                        "Invite stopped on engine error"
                    );

                    return InviteOutcome::Stopped {
                        started,
                        skipped,
                        address: address.to_string(),
                        error,
                    };
                }
            }
        }

        InviteOutcome::Finished { started, skipped }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::notifications::Severity;
    use crate::replay::{EngineCall, RecordingDispatcher, ScriptedConference};
    use metrics_util::debugging::{DebugValue, DebuggingRecorder};

    fn alice_and_bob() -> Vec<Room> {
        vec![Room::new("sip:a", "Alice"), Room::new("sip:b", "Bob")]
    }

    fn create(address: &str, display_name: &str) -> EngineCall {
        EngineCall::CreateSession {
            address: address.to_string(),
            display_name: display_name.to_string(),
        }
    }

    fn start(address: &str) -> EngineCall {
        EngineCall::StartSession {
            address: address.to_string(),
        }
    }

    #[test]
    fn test_availability_changed_forwards_every_status() {
        let mapper = NotificationMapper::default();
        for status in [
            GatewayStatus::Undefined,
            GatewayStatus::Busy,
            GatewayStatus::Available,
        ] {
            assert_eq!(
                mapper.handle_event(&GatewayEvent::AvailabilityChanged { status }),
                Some(Action::AvailabilityChanged { status })
            );
        }
    }

    #[test]
    fn test_pending_state_shows_info_with_dismiss_timer() {
        let mapper = NotificationMapper::default();
        let event = SessionStateEvent::new("sip:a", "Alice", SessionState::Pending);

        let action = mapper.session_state_changed(&event).unwrap();
        let notification = action.notification().unwrap();
        assert_eq!(notification.severity, Severity::Info);
        assert_eq!(notification.display_name(), Some("Alice"));
        assert_eq!(notification.auto_dismiss_ms, Some(2000));
    }

    #[test]
    fn test_pending_dismiss_follows_config() {
        let config = Config {
            pending_auto_dismiss_ms: 750,
            ..Config::default()
        };
        let mapper = NotificationMapper::new(&config);
        let event = SessionStateEvent::new("sip:a", "Alice", SessionState::Pending);

        let action = mapper.session_state_changed(&event).unwrap();
        assert_eq!(action.notification().unwrap().auto_dismiss_ms, Some(750));
    }

    #[test]
    fn test_failed_state_shows_error() {
        let mapper = NotificationMapper::default();
        let event = SessionStateEvent::new("sip:b", "Bob", SessionState::Failed);

        let action = mapper.session_state_changed(&event).unwrap();
        let notification = action.notification().unwrap();
        assert_eq!(notification.severity, Severity::Error);
        assert_eq!(notification.display_name(), Some("Bob"));
        assert!(notification.auto_dismiss_ms.is_none());
    }

    #[test]
    fn test_other_states_are_ignored() {
        let mapper = NotificationMapper::default();
        for state in [SessionState::On, SessionState::Off, SessionState::Retrying] {
            let event = SessionStateEvent::new("sip:a", "Alice", state);
            assert_eq!(mapper.session_state_changed(&event), None);
        }
    }

    #[test]
    fn test_invite_with_undefined_status() {
        let mapper = NotificationMapper::default();
        let conference = ScriptedConference::new();
        let dispatcher = RecordingDispatcher::new();

        let outcome = mapper.invite_rooms(
            &alice_and_bob(),
            GatewayStatus::Undefined,
            &conference,
            &dispatcher,
        );

        assert_eq!(outcome, InviteOutcome::ServiceUnavailable);
        assert!(conference.calls().is_empty());
        let notifications = dispatcher.notifications();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].severity, Severity::Error);
        assert_eq!(
            notifications[0].title_key,
            notifications::UNAVAILABLE_TITLE_KEY
        );
    }

    #[test]
    fn test_invite_with_busy_status() {
        let mapper = NotificationMapper::default();
        let conference = ScriptedConference::new();
        let dispatcher = RecordingDispatcher::new();

        let outcome =
            mapper.invite_rooms(&alice_and_bob(), GatewayStatus::Busy, &conference, &dispatcher);

        assert_eq!(outcome, InviteOutcome::ServiceBusy);
        assert!(conference.calls().is_empty());
        let notifications = dispatcher.notifications();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].severity, Severity::Warning);
        assert_eq!(notifications[0].title_key, notifications::BUSY_TITLE_KEY);
    }

    #[test]
    fn test_invite_all_rooms_started_in_order() {
        let mapper = NotificationMapper::default();
        let conference = ScriptedConference::new();
        let dispatcher = RecordingDispatcher::new();

        let outcome = mapper.invite_rooms(
            &alice_and_bob(),
            GatewayStatus::Available,
            &conference,
            &dispatcher,
        );

        assert_eq!(
            outcome,
            InviteOutcome::Finished {
                started: 2,
                skipped: 0
            }
        );
        assert_eq!(
            conference.calls(),
            vec![
                create("sip:a", "Alice"),
                start("sip:a"),
                create("sip:b", "Bob"),
                start("sip:b"),
            ]
        );
        assert!(dispatcher.actions().is_empty());
    }

    #[test]
    fn test_invite_skips_room_without_address() {
        let mapper = NotificationMapper::default();
        let conference = ScriptedConference::new();
        let dispatcher = RecordingDispatcher::new();
        let rooms = vec![
            Room {
                address: None,
                display_name: Some("Nowhere".to_string()),
            },
            Room::new("sip:b", "Bob"),
        ];

        let outcome =
            mapper.invite_rooms(&rooms, GatewayStatus::Available, &conference, &dispatcher);

        assert_eq!(
            outcome,
            InviteOutcome::Finished {
                started: 1,
                skipped: 1
            }
        );
        assert_eq!(
            conference.calls(),
            vec![create("sip:b", "Bob"), start("sip:b")]
        );
        assert!(dispatcher.actions().is_empty());
    }

    #[test]
    fn test_invite_stops_on_session_exists() {
        let mapper = NotificationMapper::default();
        let conference =
            ScriptedConference::new().with_failure("sip:a", SessionCreateError::SessionExists);
        let dispatcher = RecordingDispatcher::new();

        let outcome = mapper.invite_rooms(
            &alice_and_bob(),
            GatewayStatus::Available,
            &conference,
            &dispatcher,
        );

        assert_eq!(
            outcome,
            InviteOutcome::Stopped {
                started: 0,
                skipped: 0,
                address: "sip:a".to_string(),
                error: SessionCreateError::SessionExists,
            }
        );
        // Bob is never attempted
        assert_eq!(conference.calls(), vec![create("sip:a", "Alice")]);
        let notifications = dispatcher.notifications();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].severity, Severity::Warning);
        assert_eq!(notifications[0].display_name(), Some("Alice"));
    }

    #[test]
    fn test_invite_stops_on_no_connection() {
        let mapper = NotificationMapper::default();
        let conference =
            ScriptedConference::new().with_failure("sip:b", SessionCreateError::NoConnection);
        let dispatcher = RecordingDispatcher::new();
        let rooms = vec![
            Room::new("sip:a", "Alice"),
            Room::new("sip:b", "Bob"),
            Room::new("sip:c", "Carol"),
        ];

        let outcome =
            mapper.invite_rooms(&rooms, GatewayStatus::Available, &conference, &dispatcher);

        assert_eq!(outcome.label(), "no_connection");
        assert_eq!(outcome.started(), 1);
        assert_eq!(
            conference.calls(),
            vec![
                create("sip:a", "Alice"),
                start("sip:a"),
                create("sip:b", "Bob")
            ]
        );
        let notifications = dispatcher.notifications();
        assert_eq!(notifications.len(), 1);
        assert_eq!(
            notifications[0].title_key,
            notifications::INVITE_ERROR_TITLE_KEY
        );
    }

    #[test]
    fn test_invite_unrecognized_error_is_silent_and_stops() {
        let mapper = NotificationMapper::default();
        let conference = ScriptedConference::new()
            .with_failure("sip:a", SessionCreateError::from_code("quota-exceeded"));
        let dispatcher = RecordingDispatcher::new();

        let outcome = mapper.invite_rooms(
            &alice_and_bob(),
            GatewayStatus::Available,
            &conference,
            &dispatcher,
        );

        assert_eq!(outcome.label(), "engine_error");
        assert_eq!(conference.calls(), vec![create("sip:a", "Alice")]);
        assert!(dispatcher.actions().is_empty());
    }

    #[test]
    fn test_invite_with_no_rooms() {
        let mapper = NotificationMapper::default();
        let conference = ScriptedConference::new();
        let dispatcher = RecordingDispatcher::new();

        let outcome = mapper.invite_rooms(&[], GatewayStatus::Available, &conference, &dispatcher);

        assert_eq!(
            outcome,
            InviteOutcome::Finished {
                started: 0,
                skipped: 0
            }
        );
        assert!(dispatcher.actions().is_empty());
    }

    #[test]
    fn test_invite_records_outcome_and_room_metrics() {
        let recorder = DebuggingRecorder::new();
        let snapshotter = recorder.snapshotter();
        let mapper = NotificationMapper::default();
        let conference =
            ScriptedConference::new().with_failure("sip:c", SessionCreateError::SessionExists);
        let dispatcher = RecordingDispatcher::new();
        let rooms = vec![
            Room {
                address: None,
                display_name: Some("Nowhere".to_string()),
            },
            Room::new("sip:b", "Bob"),
        ];

        ::metrics::with_local_recorder(&recorder, || {
            mapper.invite_rooms(&rooms, GatewayStatus::Available, &conference, &dispatcher);
            mapper.invite_rooms(&rooms, GatewayStatus::Busy, &conference, &dispatcher);
            mapper.invite_rooms(
                &[Room::new("sip:c", "Carol")],
                GatewayStatus::Available,
                &conference,
                &dispatcher,
            );
        });

        let snapshot = snapshotter.snapshot().into_vec();
        let counter = |name: &str, label: Option<(&str, &str)>| {
            snapshot.iter().find_map(|(key, _, _, value)| {
                let key = key.key();
                let labels_match = label.map_or(true, |(k, v)| {
                    key.labels().any(|l| l.key() == k && l.value() == v)
                });
                match value {
                    DebugValue::Counter(n) if key.name() == name && labels_match => Some(*n),
                    _ => None,
                }
            })
        };

        for outcome in ["finished", "service_busy", "session_exists"] {
            assert_eq!(
                counter("sipgw_invites_total", Some(("outcome", outcome))),
                Some(1),
                "outcome {outcome}"
            );
        }
        assert_eq!(counter("sipgw_rooms_skipped_total", None), Some(1));
        assert_eq!(counter("sipgw_sessions_started_total", None), Some(1));
        // Busy notice plus the already-invited warning for Carol
        assert_eq!(
            counter("sipgw_notifications_total", Some(("severity", "warning"))),
            Some(2)
        );
        assert!(snapshot
            .iter()
            .any(|(key, _, _, _)| key.key().name() == "sipgw_invite_duration_seconds"));
    }
}
