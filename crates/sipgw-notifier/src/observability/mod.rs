//! Observability module for the SIP gateway notifier.
//!
//! # Metrics
//!
//! | Metric | Type | Labels | Purpose |
//! |--------|------|--------|---------|
//! | `sipgw_events_total` | Counter | `event_type` | Gateway events received |
//! | `sipgw_gateway_available` | Gauge | none | Latest availability (0/1) |
//! | `sipgw_notifications_total` | Counter | `severity` | Notifications dispatched |
//! | `sipgw_invites_total` | Counter | `outcome` | Invite commands processed |
//! | `sipgw_invite_duration_seconds` | Histogram | `outcome` | Invite processing time |
//! | `sipgw_sessions_started_total` | Counter | none | Gateway sessions started |
//! | `sipgw_rooms_skipped_total` | Counter | none | Rooms missing address or name |

pub mod metrics;

pub use self::metrics::{
    init_metrics_recorder, record_event, record_invite, record_notification, record_room_skipped,
    record_session_started, set_gateway_available,
};
