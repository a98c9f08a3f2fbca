//! Actor hosting for the notification mapper.
//!
//! One `GatewayNotifierActor` runs per active conference:
//!
//! ```text
//! Conference (engine)
//! ├── availability listener ──┐
//! └── session-state listener ─┴─> EventSink ─> NotificationMapper ─> ActionDispatcher
//!                                    │                ^
//!                          watch<GatewayState>        │
//!                                    v                │
//! GatewayNotifierHandle ── InviteRooms ─> mpsc ─> GatewayNotifierActor
//! ```
//!
//! Engine events are mapped on the listener itself, synchronously and in the
//! order the engine raised them. Nothing is queued or dropped. Session events
//! raised while an invite starts a session therefore reach the dispatcher
//! before any later notification from that invite.
//!
//! The mailbox only carries invite commands. An invite reads the status from
//! the watch channel when the actor picks it up, which is always the status
//! of the last availability event the engine raised.
//!
//! # Modules
//!
//! - [`notifier`] - `GatewayNotifierActor` and its handle
//! - [`messages`] - Command types for the actor mailbox
//! - [`mailbox`] - Command backlog monitoring

pub mod mailbox;
pub mod messages;
pub mod notifier;

pub use mailbox::{MailboxLevel, MailboxMonitor, MailboxStats};
pub use messages::NotifierMessage;
pub use notifier::{GatewayNotifierActor, GatewayNotifierHandle};
