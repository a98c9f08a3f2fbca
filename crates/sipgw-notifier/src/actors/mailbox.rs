//! Backlog tracking for the notifier command mailbox.
//!
//! Engine events never enter the mailbox; they are mapped on the listener
//! and only counted here. Handle commands wait for capacity instead of being
//! dropped, so the backlog tells how far invites lag behind their callers.
//!
//! | Level    | Backlog               |
//! |----------|-----------------------|
//! | Normal   | up to 50% of capacity |
//! | Warning  | up to 90% of capacity |
//! | Critical | above 90% of capacity |

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use tracing::{debug, warn};

/// Backlog level relative to mailbox capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MailboxLevel {
    Normal,
    Warning,
    Critical,
}

impl MailboxLevel {
    /// Classify `backlog` against `capacity`.
    #[must_use]
    pub fn for_backlog(backlog: usize, capacity: usize) -> Self {
        // Compare in tenths to avoid float math: backlog/capacity > 9/10
        let scaled = backlog.saturating_mul(10);
        if scaled > capacity.saturating_mul(9) {
            MailboxLevel::Critical
        } else if scaled > capacity.saturating_mul(5) {
            MailboxLevel::Warning
        } else {
            MailboxLevel::Normal
        }
    }
}

/// Point-in-time copy of the monitor counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MailboxStats {
    /// Commands sent but not yet handled.
    pub backlog: usize,
    pub peak_backlog: usize,
    pub commands_handled: u64,
    /// Engine events mapped by the conference listener.
    pub events_handled: u64,
}

/// Shared between the actor, its handles and the conference listener.
#[derive(Debug)]
pub struct MailboxMonitor {
    conference_id: String,
    capacity: usize,
    backlog: AtomicUsize,
    peak_backlog: AtomicUsize,
    commands_handled: AtomicU64,
    events_handled: AtomicU64,
}

impl MailboxMonitor {
    /// `capacity` must be the capacity the mailbox channel was created with.
    #[must_use]
    pub fn new(conference_id: impl Into<String>, capacity: usize) -> Self {
        Self {
            conference_id: conference_id.into(),
            capacity,
            backlog: AtomicUsize::new(0),
            peak_backlog: AtomicUsize::new(0),
            commands_handled: AtomicU64::new(0),
            events_handled: AtomicU64::new(0),
        }
    }

    /// A handle is about to send a command.
    pub fn command_queued(&self) {
        let previous = self.backlog.fetch_add(1, Ordering::Relaxed);
        let backlog = previous + 1;
        self.peak_backlog.fetch_max(backlog, Ordering::Relaxed);

        let before = MailboxLevel::for_backlog(previous, self.capacity);
        let after = MailboxLevel::for_backlog(backlog, self.capacity);
        if after <= before {
            return;
        }

        match after {
            MailboxLevel::Critical => warn!(
                target: "sipgw.actor.mailbox",
                conference_id = %self.conference_id,
                backlog,
                capacity = self.capacity,
                "Notifier command backlog critical"
            ),
            MailboxLevel::Warning => debug!(
                target: "sipgw.actor.mailbox",
                conference_id = %self.conference_id,
                backlog,
                capacity = self.capacity,
                "Notifier command backlog elevated"
            ),
            MailboxLevel::Normal => {}
        }
    }

    /// A queued command never reached the actor.
    pub fn command_withdrawn(&self) {
        self.shrink_backlog();
    }

    /// The actor finished handling a command.
    pub fn command_handled(&self) {
        self.shrink_backlog();
        self.commands_handled.fetch_add(1, Ordering::Relaxed);
    }

    /// The listener mapped an engine event.
    pub fn event_handled(&self) {
        self.events_handled.fetch_add(1, Ordering::Relaxed);
    }

    /// Capacity of the mailbox channel.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn stats(&self) -> MailboxStats {
        MailboxStats {
            backlog: self.backlog.load(Ordering::Relaxed),
            peak_backlog: self.peak_backlog.load(Ordering::Relaxed),
            commands_handled: self.commands_handled.load(Ordering::Relaxed),
            events_handled: self.events_handled.load(Ordering::Relaxed),
        }
    }

    fn shrink_backlog(&self) {
        let _ = self
            .backlog
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |b| {
                Some(b.saturating_sub(1))
            });
    }
}
