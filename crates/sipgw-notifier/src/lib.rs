//! SIP Gateway Notifier Library
//!
//! Bridges a conferencing engine's SIP gateway to the client UI:
//!
//! - Forwards gateway availability changes as state updates
//! - Turns session state changes into user notifications
//! - Invites rooms by creating and starting one gateway session per room,
//!   reporting engine errors as notifications
//!
//! # Architecture
//!
//! ```text
//! Conference ──events──> GatewayNotifierActor ──> NotificationMapper ──> ActionDispatcher
//!     ^                         │
//!     └──── create_session ─────┘
//! ```
//!
//! The mapper is synchronous and keeps no per-session state. Engine events are
//! mapped on the listener as they arrive; the actor owns the listener
//! subscription and runs invites against the latest availability status.
//!
//! # Modules
//!
//! - [`actors`] - Per-conference notifier actor
//! - [`mapper`] - Event and invite mapping
//! - [`engine`] - Conference and session traits
//! - [`subscription`] - Listener lifetime handle
//! - [`actions`] - Outbound actions, dispatcher seam and state reducer
//! - [`notifications`] - Notification values and templates
//! - [`models`] - Gateway status, session state, events and rooms
//! - [`replay`] - Scripted conference and replay scenarios
//! - [`config`] - Configuration from environment
//! - [`errors`] - Error types

#![warn(clippy::pedantic)]

pub mod actions;
pub mod actors;
pub mod config;
pub mod engine;
pub mod errors;
pub mod mapper;
pub mod models;
pub mod notifications;
pub mod observability;
pub mod replay;
pub mod subscription;

pub use actions::{Action, ActionDispatcher, GatewayState};
pub use config::Config;
pub use engine::{Conference, GatewaySession};
pub use errors::{SessionCreateError, SipGwError};
pub use mapper::{InviteOutcome, NotificationMapper};
pub use models::{GatewayEvent, GatewayStatus, Room, SessionState, SessionStateEvent};
