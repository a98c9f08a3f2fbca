//! SIP Gateway Notifier replay
//!
//! Runs a recorded conference scenario through the notifier against a
//! scripted engine and prints every dispatched action as JSON on stdout.
//! Logs go to stderr.
//!
//! # Usage
//!
//! ```text
//! sipgw-notifier [scenario.json]
//! ```
//!
//! The scenario path falls back to `SIPGW_SCENARIO_PATH`.
//!
//! # Flow
//!
//! 1. Load configuration from environment
//! 2. Initialize Prometheus metrics recorder (when `SIPGW_PRINT_METRICS` is set)
//! 3. Load the scenario and build the scripted conference
//! 4. Spawn the notifier actor for the conference
//! 5. Replay every step, then tear the conference down

#![warn(clippy::pedantic)]

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use sipgw_notifier::actors::GatewayNotifierActor;
use sipgw_notifier::config::{Config, ConfigError};
use sipgw_notifier::observability::init_metrics_recorder;
use sipgw_notifier::replay::{RecordingDispatcher, Scenario};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sipgw_notifier=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting SIP gateway notifier replay");

    // Load configuration
    let config = Config::from_env().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    let scenario_path = std::env::args()
        .nth(1)
        .or_else(|| config.scenario_path.clone())
        .ok_or_else(|| ConfigError::MissingEnvVar("SIPGW_SCENARIO_PATH".to_string()))?;

    info!(
        scenario_path = %scenario_path,
        pending_auto_dismiss_ms = config.pending_auto_dismiss_ms,
        command_channel_buffer = config.command_channel_buffer,
        "Configuration loaded successfully"
    );

    let prometheus_handle = if config.print_metrics {
        let handle = init_metrics_recorder().map_err(|e| {
            error!(error = %e, "Failed to install Prometheus metrics recorder");
            anyhow::anyhow!(e)
        })?;
        Some(handle)
    } else {
        None
    };

    let scenario = Scenario::load(Path::new(&scenario_path))?;
    info!(
        steps = scenario.steps.len(),
        scripted_failures = scenario.failures.len(),
        "Scenario loaded"
    );

    let conference = Arc::new(scenario.conference());
    let dispatcher = Arc::new(RecordingDispatcher::new());
    let cancel_token = CancellationToken::new();
    let conference_id = format!("replay-{}", Uuid::new_v4());

    let (handle, task) = GatewayNotifierActor::spawn(
        conference_id,
        Arc::clone(&conference),
        Arc::clone(&dispatcher),
        &config,
        cancel_token.clone(),
    );

    let outcomes = scenario.run(&conference, &handle).await?;
    info!(
        status = %handle.status(),
        events_handled = handle.mailbox().stats().events_handled,
        "Scenario replayed"
    );

    // Conference teardown
    cancel_token.cancel();
    task.await.context("notifier task panicked")?;

    for outcome in &outcomes {
        info!(
            outcome = outcome.label(),
            started = outcome.started(),
            "Invite finished"
        );
    }

    let actions = serde_json::to_string_pretty(&dispatcher.actions())
        .context("failed to serialize dispatched actions")?;
    println!("{actions}");

    if let Some(handle) = prometheus_handle {
        eprintln!("{}", handle.render());
    }

    info!("Replay complete");
    Ok(())
}
