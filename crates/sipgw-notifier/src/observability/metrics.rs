//! Metrics definitions for the SIP gateway notifier.
//!
//! All metrics follow Prometheus naming conventions:
//! - `sipgw_` prefix
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded by closed enums:
//! - `event_type`: 2 values (availability_changed, session_state_changed)
//! - `severity`: 3 values (info, warning, error)
//! - `outcome`: 6 values (service_unavailable, service_busy, finished,
//!   no_connection, session_exists, engine_error)

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Initialize Prometheus metrics recorder and return the handle
/// for rendering metrics.
///
/// Must be called before any metrics are recorded.
///
/// # Errors
///
/// Returns error if Prometheus recorder fails to install (e.g., already installed).
pub fn init_metrics_recorder() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        // Invites are synchronous engine calls; anything past 100ms is suspect
        .set_buckets_for_metric(
            Matcher::Prefix("sipgw_invite".to_string()),
            &[
                0.0005, 0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 1.000,
            ],
        )
        .map_err(|e| format!("Failed to set invite duration buckets: {e}"))?
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus metrics recorder: {e}"))
}

// ============================================================================
// Event Metrics
// ============================================================================

/// Record a gateway event received from a conference.
///
/// Metric: `sipgw_events_total`
/// Labels: `event_type`
pub fn record_event(event_type: &str) {
    counter!("sipgw_events_total", "event_type" => event_type.to_string()).increment(1);
}

/// Record the latest gateway availability.
///
/// Metric: `sipgw_gateway_available`
/// Labels: none
///
/// 1 when the gateway reports `available`, 0 otherwise.
pub fn set_gateway_available(available: bool) {
    gauge!("sipgw_gateway_available").set(if available { 1.0 } else { 0.0 });
}

// ============================================================================
// Notification Metrics
// ============================================================================

/// Record a notification handed to the dispatcher.
///
/// Metric: `sipgw_notifications_total`
/// Labels: `severity`
pub fn record_notification(severity: &str) {
    counter!("sipgw_notifications_total", "severity" => severity.to_string()).increment(1);
}

// ============================================================================
// Invite Metrics
// ============================================================================

/// Record a processed invite command.
///
/// Metrics: `sipgw_invites_total`, `sipgw_invite_duration_seconds`
/// Labels: `outcome`
pub fn record_invite(outcome: &str, duration: Duration) {
    counter!("sipgw_invites_total", "outcome" => outcome.to_string()).increment(1);
    histogram!("sipgw_invite_duration_seconds", "outcome" => outcome.to_string())
        .record(duration.as_secs_f64());
}

/// Record a gateway session started for a room.
///
/// Metric: `sipgw_sessions_started_total`
pub fn record_session_started() {
    counter!("sipgw_sessions_started_total").increment(1);
}

/// Record a room skipped for missing an address or display name.
///
/// Metric: `sipgw_rooms_skipped_total`
pub fn record_room_skipped() {
    counter!("sipgw_rooms_skipped_total").increment(1);
}
