//! Outbound actions, the dispatch seam and the gateway state reducer.

use crate::models::GatewayStatus;
use crate::notifications::Notification;
use crate::observability::metrics;
use serde::{Deserialize, Serialize};

/// An action handed to the UI state container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Store a new gateway availability status.
    AvailabilityChanged { status: GatewayStatus },
    /// Show a notification to the user.
    ShowNotification(Notification),
}

impl Action {
    /// Returns the notification carried by this action, if any.
    #[must_use]
    pub fn notification(&self) -> Option<&Notification> {
        match self {
            Action::ShowNotification(notification) => Some(notification),
            Action::AvailabilityChanged { .. } => None,
        }
    }
}

/// Receives actions produced by the notifier.
///
/// Implementations must not call back into the notifier synchronously.
pub trait ActionDispatcher: Send + Sync {
    fn dispatch(&self, action: Action);
}

/// Hand an action to the dispatcher, counting notifications by severity.
pub fn dispatch<D: ActionDispatcher + ?Sized>(dispatcher: &D, action: Action) {
    if let Some(notification) = action.notification() {
        metrics::record_notification(notification.severity.as_str());
    }
    dispatcher.dispatch(action);
}

/// Dispatch a notification action.
pub fn notify<D: ActionDispatcher + ?Sized>(dispatcher: &D, notification: Notification) {
    dispatch(dispatcher, Action::ShowNotification(notification));
}

/// Gateway slice of the UI state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GatewayState {
    pub status: GatewayStatus,
}

impl GatewayState {
    /// Apply an action to the state.
    pub fn reduce(&mut self, action: &Action) {
        if let Action::AvailabilityChanged { status } = action {
            self.status = *status;
        }
    }

    /// Whether room invites can currently be attempted.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.status == GatewayStatus::Available
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::notifications;

    #[test]
    fn test_reduce_availability_changed() {
        let mut state = GatewayState::default();
        assert_eq!(state.status, GatewayStatus::Undefined);
        assert!(!state.is_available());

        state.reduce(&Action::AvailabilityChanged {
            status: GatewayStatus::Available,
        });
        assert!(state.is_available());

        state.reduce(&Action::AvailabilityChanged {
            status: GatewayStatus::Busy,
        });
        assert_eq!(state.status, GatewayStatus::Busy);
    }

    #[test]
    fn test_reduce_ignores_notifications() {
        let mut state = GatewayState {
            status: GatewayStatus::Available,
        };
        state.reduce(&Action::ShowNotification(notifications::service_busy()));
        assert_eq!(state.status, GatewayStatus::Available);
    }

    #[test]
    fn test_action_serialization() {
        let json = serde_json::to_value(Action::AvailabilityChanged {
            status: GatewayStatus::Busy,
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "availability_changed", "status": "busy"})
        );

        let action = Action::ShowNotification(notifications::invite_error());
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["type"], "show_notification");
        assert_eq!(json["severity"], "error");
        assert!(action.notification().is_some());
    }
}
