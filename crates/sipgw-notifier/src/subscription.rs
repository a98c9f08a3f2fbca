//! Listener registrations tied to a conference's lifetime.

use crate::engine::{Conference, EventListener, ListenerId};
use crate::models::GatewayEventKind;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Event kinds the notifier listens to on every conference.
pub const SUBSCRIBED_KINDS: [GatewayEventKind; 2] = [
    GatewayEventKind::AvailabilityChanged,
    GatewayEventKind::SessionStateChanged,
];

/// Owns the gateway listeners registered on one conference.
///
/// The listeners are removed by [`ConferenceSubscription::release`] or when
/// the subscription is dropped, whichever happens first.
pub struct ConferenceSubscription<C: Conference> {
    conference: Arc<C>,
    listener_ids: Vec<ListenerId>,
}

impl<C: Conference> ConferenceSubscription<C> {
    /// Register `listener` for availability and session-state events.
    pub fn subscribe(conference: Arc<C>, listener: EventListener) -> Self {
        let listener_ids: Vec<ListenerId> = SUBSCRIBED_KINDS
            .iter()
            .map(|kind| conference.add_listener(*kind, Arc::clone(&listener)))
            .collect();

        debug!(
            target: "sipgw.subscription",
            listeners = listener_ids.len(),
            "Subscribed to conference gateway events"
        );

        Self {
            conference,
            listener_ids,
        }
    }

    /// Remove the listeners from the conference.
    pub fn release(mut self) {
        self.release_listeners();
    }

    fn release_listeners(&mut self) {
        if self.listener_ids.is_empty() {
            return;
        }

        for id in self.listener_ids.drain(..) {
            if !self.conference.remove_listener(id) {
                warn!(
                    target: "sipgw.subscription",
                    listener_id = %id,
                    "Listener was already removed from conference"
                );
            }
        }

        debug!(
            target: "sipgw.subscription",
            "Released conference gateway listeners"
        );
    }
}

impl<C: Conference> Drop for ConferenceSubscription<C> {
    fn drop(&mut self) {
        self.release_listeners();
    }
}

impl<C: Conference> fmt::Debug for ConferenceSubscription<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConferenceSubscription")
            .field("listener_ids", &self.listener_ids)
            .finish_non_exhaustive()
    }
}
