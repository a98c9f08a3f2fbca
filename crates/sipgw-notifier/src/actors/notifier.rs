//! `GatewayNotifierActor` - per-conference gateway notifier.
//!
//! Each `GatewayNotifierActor`:
//! - Subscribes to one conference's gateway events when spawned
//! - Maps every engine event on the listener, in the order the engine raised it
//! - Runs room invites from its command mailbox, one at a time
//!
//! # Lifecycle
//!
//! 1. Spawned when the conference becomes active
//! 2. Runs until cancelled (conference teardown)
//! 3. Releases the conference listeners on exit

use crate::actions::{self, Action, ActionDispatcher, GatewayState};
use crate::config::Config;
use crate::engine::{Conference, EventListener};
use crate::errors::SipGwError;
use crate::mapper::{InviteOutcome, NotificationMapper};
use crate::models::{GatewayEvent, GatewayStatus, Room};
use crate::observability::metrics;
use crate::subscription::ConferenceSubscription;

use super::mailbox::MailboxMonitor;
use super::messages::NotifierMessage;

use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

/// Handle to a `GatewayNotifierActor`.
#[derive(Clone, Debug)]
pub struct GatewayNotifierHandle {
    sender: mpsc::Sender<NotifierMessage>,
    cancel_token: CancellationToken,
    mailbox: Arc<MailboxMonitor>,
    state: watch::Receiver<GatewayState>,
    conference_id: String,
}

impl GatewayNotifierHandle {
    /// Get the conference ID.
    #[must_use]
    pub fn conference_id(&self) -> &str {
        &self.conference_id
    }

    /// Invite rooms into the conference.
    ///
    /// Only mailbox failures are returned as errors; gateway failures are
    /// reported through notifications and the returned outcome.
    pub async fn invite_rooms(&self, rooms: Vec<Room>) -> Result<InviteOutcome, SipGwError> {
        let (tx, rx) = oneshot::channel();

        self.mailbox.command_queued();
        if let Err(e) = self
            .sender
            .send(NotifierMessage::InviteRooms {
                rooms,
                respond_to: tx,
            })
            .await
        {
            self.mailbox.command_withdrawn();
            return Err(SipGwError::Channel(format!("channel send failed: {e}")));
        }

        rx.await
            .map_err(|e| SipGwError::Channel(format!("response receive failed: {e}")))
    }

    /// Latest availability status reported by the engine.
    #[must_use]
    pub fn status(&self) -> GatewayStatus {
        self.state.borrow().status
    }

    /// Mailbox statistics for this actor.
    #[must_use]
    pub fn mailbox(&self) -> &MailboxMonitor {
        &self.mailbox
    }

    /// Cancel the actor (conference teardown).
    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    /// Check if the actor is cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }
}

/// Maps engine events on the thread that raised them.
///
/// Shared by the conference listener and the actor. The gateway state lives in
/// a watch channel so invites read the status from the last event the engine
/// raised, never a queued copy of it.
struct EventSink<D: ActionDispatcher + ?Sized> {
    mapper: NotificationMapper,
    state: watch::Sender<GatewayState>,
    dispatcher: Arc<D>,
    mailbox: Arc<MailboxMonitor>,
}

impl<D: ActionDispatcher + ?Sized> EventSink<D> {
    fn handle_event(&self, event: &GatewayEvent) {
        metrics::record_event(event.kind().as_str());
        if let Some(action) = self.mapper.handle_event(event) {
            self.apply(action);
        }
        self.mailbox.event_handled();
    }

    /// Reduce an action into the shared state, then dispatch it.
    fn apply(&self, action: Action) {
        if matches!(action, Action::AvailabilityChanged { .. }) {
            self.state.send_if_modified(|state| {
                let before = *state;
                state.reduce(&action);
                *state != before
            });
            metrics::set_gateway_available(self.state.borrow().is_available());
        }
        actions::dispatch(self.dispatcher.as_ref(), action);
    }

    fn status(&self) -> GatewayStatus {
        self.state.borrow().status
    }
}

/// The `GatewayNotifierActor` implementation.
pub struct GatewayNotifierActor<C, D>
where
    C: Conference + 'static,
    D: ActionDispatcher + ?Sized + 'static,
{
    /// Conference ID.
    conference_id: String,
    /// Conference the sessions are created on.
    conference: Arc<C>,
    /// Event mapping and gateway state, shared with the listener.
    sink: Arc<EventSink<D>>,
    /// Listener registrations; released when the actor stops.
    subscription: Option<ConferenceSubscription<C>>,
    /// Command receiver.
    receiver: mpsc::Receiver<NotifierMessage>,
    /// Cancellation token (conference lifetime).
    cancel_token: CancellationToken,
    /// Mailbox monitor, shared with handles and the listener.
    mailbox: Arc<MailboxMonitor>,
}

impl<C, D> GatewayNotifierActor<C, D>
where
    C: Conference + 'static,
    D: ActionDispatcher + ?Sized + 'static,
{
    /// Spawn a notifier for `conference` and subscribe it to gateway events.
    ///
    /// Returns a handle and the task join handle.
    pub fn spawn(
        conference_id: impl Into<String>,
        conference: Arc<C>,
        dispatcher: Arc<D>,
        config: &Config,
        cancel_token: CancellationToken,
    ) -> (GatewayNotifierHandle, JoinHandle<()>) {
        let conference_id = conference_id.into();
        // tokio::sync::mpsc::channel panics on a zero capacity
        let capacity = config.command_channel_buffer.max(1);
        let (sender, receiver) = mpsc::channel(capacity);
        let mailbox = Arc::new(MailboxMonitor::new(conference_id.clone(), capacity));
        let (state_tx, state_rx) = watch::channel(GatewayState::default());

        let sink = Arc::new(EventSink {
            mapper: NotificationMapper::new(config),
            state: state_tx,
            dispatcher,
            mailbox: Arc::clone(&mailbox),
        });

        let listener: EventListener = {
            let sink = Arc::clone(&sink);
            Arc::new(move |event: GatewayEvent| sink.handle_event(&event))
        };
        let subscription = ConferenceSubscription::subscribe(Arc::clone(&conference), listener);

        let actor = Self {
            conference_id: conference_id.clone(),
            conference,
            sink,
            subscription: Some(subscription),
            receiver,
            cancel_token: cancel_token.clone(),
            mailbox: Arc::clone(&mailbox),
        };

        let task_handle = tokio::spawn(actor.run());

        let handle = GatewayNotifierHandle {
            sender,
            cancel_token,
            mailbox,
            state: state_rx,
            conference_id,
        };

        (handle, task_handle)
    }

    /// Run the actor message loop.
    #[instrument(
        skip_all,
        name = "sipgw.actor.notifier",
        fields(conference_id = %self.conference_id)
    )]
    async fn run(mut self) {
        debug!(
            target: "sipgw.actor",
            conference_id = %self.conference_id,
            "GatewayNotifierActor started"
        );

        loop {
            tokio::select! {
                // Handle cancellation
                () = self.cancel_token.cancelled() => {
                    debug!(
                        target: "sipgw.actor",
                        conference_id = %self.conference_id,
                        "GatewayNotifierActor received cancellation signal"
                    );
                    break;
                }

                // Handle commands
                msg = self.receiver.recv() => {
                    match msg {
                        Some(message) => self.handle_message(message),
                        None => {
                            debug!(
                                target: "sipgw.actor",
                                conference_id = %self.conference_id,
                                "GatewayNotifierActor channel closed, exiting"
                            );
                            break;
                        }
                    }
                }
            }
        }

        if let Some(subscription) = self.subscription.take() {
            subscription.release();
        }

        let stats = self.mailbox.stats();
        info!(
            target: "sipgw.actor",
            conference_id = %self.conference_id,
            events_handled = stats.events_handled,
            commands_handled = stats.commands_handled,
            peak_backlog = stats.peak_backlog,
            capacity = self.mailbox.capacity(),
            final_status = %self.sink.status(),
            "GatewayNotifierActor stopped"
        );
    }

    /// Handle a single command.
    fn handle_message(&self, message: NotifierMessage) {
        match message {
            NotifierMessage::InviteRooms { rooms, respond_to } => {
                // Events the engine raises while sessions start are mapped
                // on the listener as they happen, ahead of later invite
                // notifications
                let outcome = self.sink.mapper.invite_rooms(
                    &rooms,
                    self.sink.status(),
                    self.conference.as_ref(),
                    self.sink.dispatcher.as_ref(),
                );
                self.mailbox.command_handled();
                let _ = respond_to.send(outcome);
            }
        }
    }
}
