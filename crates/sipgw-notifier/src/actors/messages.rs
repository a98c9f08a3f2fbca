//! Message types for the notifier actor.
//!
//! Only application commands go through the mailbox; engine events are
//! mapped on the conference listener. Replies use `tokio::sync::oneshot`.

use crate::mapper::InviteOutcome;
use crate::models::Room;
use tokio::sync::oneshot;

/// Messages sent to `GatewayNotifierActor`.
#[derive(Debug)]
pub enum NotifierMessage {
    /// Invite rooms into the conference through the SIP gateway.
    InviteRooms {
        rooms: Vec<Room>,
        /// Response channel for the invite summary.
        respond_to: oneshot::Sender<InviteOutcome>,
    },
}
