//! Fire-and-forget notification dispatch.
//!
//! # Invariants
//! - `dispatch` returns before delivery completes.
//! - Delivery errors and worker panics are logged, never propagated.

use super::template::EmailMessage;
use super::Notifier;
use log::{error, info, warn};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

/// Detached delivery handle.
///
/// Dropping it detaches the worker. Callers that need to observe completion
/// (tests, shutdown paths) can `wait()`.
#[derive(Debug)]
pub struct NotificationHandle {
    worker: JoinHandle<bool>,
}

impl NotificationHandle {
    /// Blocks until delivery finished. Returns whether it succeeded.
    pub fn wait(self) -> bool {
        self.worker.join().unwrap_or(false)
    }
}

/// Runs a `Notifier` on short-lived worker threads.
#[derive(Clone)]
pub struct NotificationDispatcher {
    notifier: Arc<dyn Notifier>,
    enabled: bool,
}

impl NotificationDispatcher {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            notifier,
            enabled: true,
        }
    }

    /// Dispatcher that drops every message.
    pub fn disabled(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            notifier,
            enabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Sends `message` on a detached worker thread.
    ///
    /// Returns `None` when dispatch is disabled or the worker could not be
    /// spawned; both cases are logged.
    pub fn dispatch(&self, message: EmailMessage) -> Option<NotificationHandle> {
        if !self.enabled {
            info!("event=notify_dispatch module=notify status=skipped reason=disabled");
            return None;
        }

        let notifier = Arc::clone(&self.notifier);
        let spawned = thread::Builder::new()
            .name("academievent-notify".to_string())
            .spawn(move || deliver(notifier.as_ref(), &message));

        match spawned {
            Ok(worker) => Some(NotificationHandle { worker }),
            Err(err) => {
                error!(
                    "event=notify_dispatch module=notify status=error error_code=spawn_failed error={err}"
                );
                None
            }
        }
    }
}

fn deliver(notifier: &dyn Notifier, message: &EmailMessage) -> bool {
    let started_at = Instant::now();
    let sent = notifier.send_with_text(
        &message.to,
        &message.subject,
        &message.rendered_html(),
        &message.plain_text(),
    );
    match sent {
        Ok(()) => {
            info!(
                "event=notify_send module=notify status=ok duration_ms={}",
                started_at.elapsed().as_millis()
            );
            true
        }
        Err(err) => {
            warn!(
                "event=notify_send module=notify status=error duration_ms={} error={err}",
                started_at.elapsed().as_millis()
            );
            false
        }
    }
}
