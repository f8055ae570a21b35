//! Outbound notifications.
//!
//! # Responsibility
//! - Define the `Notifier` contract consumed by registration flows.
//! - Build email content and dispatch it without blocking callers.
//!
//! # Invariants
//! - A notification failure never changes an already decided use-case
//!   outcome; it is logged and dropped.

use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod dispatch;
pub mod template;

pub use dispatch::{NotificationDispatcher, NotificationHandle};
pub use template::{registration_confirmation, wrap_html, EmailMessage};

/// Delivery failure reported by a `Notifier`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyError {
    InvalidRecipient(String),
    Rejected(String),
    Transport(String),
}

impl Display for NotifyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRecipient(to) => write!(f, "invalid recipient address `{to}`"),
            Self::Rejected(reason) => write!(f, "message rejected: {reason}"),
            Self::Transport(reason) => write!(f, "transport failure: {reason}"),
        }
    }
}

impl Error for NotifyError {}

/// Email delivery contract.
///
/// Implementations may block; callers run them off the use-case path via
/// [`NotificationDispatcher`].
pub trait Notifier: Send + Sync {
    fn send(&self, to: &str, subject: &str, body_html: &str) -> Result<(), NotifyError>;

    /// Sends `body_html` with a plain-text alternative part.
    ///
    /// Transports without multipart support keep the default, which drops
    /// the text part and calls [`Notifier::send`].
    fn send_with_text(
        &self,
        to: &str,
        subject: &str,
        body_html: &str,
        _body_text: &str,
    ) -> Result<(), NotifyError> {
        self.send(to, subject, body_html)
    }
}

/// Notifier that only writes metadata to the core log.
///
/// Used by the CLI and local-only sessions where no mail transport exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send(&self, to: &str, subject: &str, body_html: &str) -> Result<(), NotifyError> {
        self.send_with_text(to, subject, body_html, "")
    }

    fn send_with_text(
        &self,
        to: &str,
        subject: &str,
        body_html: &str,
        body_text: &str,
    ) -> Result<(), NotifyError> {
        if !to.contains('@') {
            return Err(NotifyError::InvalidRecipient(to.to_string()));
        }
        info!(
            "event=notify_send module=notify status=ok transport=log subject_chars={} html_chars={} text_chars={}",
            subject.chars().count(),
            body_html.chars().count(),
            body_text.chars().count()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_notifier_rejects_address_without_at_sign() {
        assert_eq!(
            LogNotifier.send("dana", "hi", "<p>hi</p>"),
            Err(NotifyError::InvalidRecipient("dana".to_string()))
        );
        assert!(LogNotifier
            .send_with_text("dana@uni.edu", "hi", "<p>hi</p>", "hi")
            .is_ok());
    }
}
