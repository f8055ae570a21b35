//! Registration conflict resolver.
//!
//! # Responsibility
//! - Decide whether a candidate event can join the acting user's schedule.
//! - Offer a one-hour reschedule of a movable conflicting event.
//! - Commit: marketplace registration, schedule upsert, confirmation email.
//!
//! # Invariants
//! - The snapshot is read once; the resolver never re-reads the store before
//!   committing.
//! - Blocked and cancelled outcomes perform no writes.
//! - The reschedule shift is applied once; a collision at the shifted slot is
//!   not checked.
//! - Registration-store failures never prevent the schedule upsert; a failed
//!   schedule upsert fails the whole attempt.
//! - Notification dispatch happens after the outcome is decided and cannot
//!   change it.

use crate::model::event::{format_time, Event};
use crate::model::registration::Registration;
use crate::model::user::ActingUser;
use crate::notify::{registration_confirmation, NotificationDispatcher, NotificationHandle};
use crate::repo::event_repo::{EventStore, StoreError};
use crate::repo::registration_repo::{RegistrationStore, RegistrationStoreError};
use crate::schedule::conflict::{shift_one_hour, Conflict, ConflictPolicy};
use crate::schedule::prompt::ConfirmationPrompt;
use chrono::NaiveTime;
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ResolveResult<T> = Result<T, ResolveError>;

/// Fatal resolver failure. No outcome was reached.
#[derive(Debug)]
pub enum ResolveError {
    /// Persisting the moved conflicting event failed; nothing was committed.
    Reschedule(StoreError),
    /// Persisting the candidate event failed.
    Commit(StoreError),
}

impl Display for ResolveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reschedule(err) => write!(f, "failed to reschedule conflicting event: {err}"),
            Self::Commit(err) => write!(f, "failed to save event: {err}"),
        }
    }
}

impl Error for ResolveError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Reschedule(err) | Self::Commit(err) => Some(err),
        }
    }
}

/// Non-fatal signal attached to a committed outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationNotice {
    /// The registration already existed; the schedule entry was still saved.
    AlreadyRegistered,
    /// The registration store failed; the schedule entry was still saved.
    RegistrationWarning(String),
}

/// Conflicting event moved to make room for the candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reschedule {
    pub event_id: String,
    pub title: String,
    pub from: NaiveTime,
    pub to: NaiveTime,
}

/// Result of a successful commit.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitReport {
    /// Candidate as persisted under the acting user.
    pub event: Event,
    pub rescheduled: Option<Reschedule>,
    pub registration: Option<Registration>,
    pub notices: Vec<RegistrationNotice>,
}

impl CommitReport {
    pub fn already_registered(&self) -> bool {
        self.notices.contains(&RegistrationNotice::AlreadyRegistered)
    }
}

/// Decided outcome of one registration attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum RegistrationOutcome {
    Committed(CommitReport),
    /// An academic event occupies the slot.
    SchedulingBlocked {
        candidate_title: String,
        blocked_by: String,
    },
    /// The user declined the reschedule offer.
    Cancelled,
}

impl RegistrationOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Committed(_) => "committed",
            Self::SchedulingBlocked { .. } => "scheduling_blocked",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn committed(&self) -> Option<&CommitReport> {
        match self {
            Self::Committed(report) => Some(report),
            _ => None,
        }
    }
}

/// Outcome plus the detached confirmation email, if one was sent.
#[derive(Debug)]
pub struct Resolution {
    pub outcome: RegistrationOutcome,
    pub notification: Option<NotificationHandle>,
}

impl Resolution {
    fn without_notification(outcome: RegistrationOutcome) -> Self {
        Self {
            outcome,
            notification: None,
        }
    }
}

/// Conflict resolver over borrowed collaborators.
pub struct ConflictResolver<'a, E: EventStore, R: RegistrationStore> {
    events: &'a E,
    registrations: &'a R,
    dispatcher: &'a NotificationDispatcher,
    policy: ConflictPolicy,
}

impl<'a, E: EventStore, R: RegistrationStore> ConflictResolver<'a, E, R> {
    pub fn new(events: &'a E, registrations: &'a R, dispatcher: &'a NotificationDispatcher) -> Self {
        Self {
            events,
            registrations,
            dispatcher,
            policy: ConflictPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ConflictPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Resolves one registration attempt of `candidate` into `snapshot`.
    ///
    /// `snapshot` must be the acting user's schedule as read at the start of
    /// the attempt. `prompt` is consulted only for a movable conflict.
    ///
    /// # Errors
    /// - `ResolveError::Reschedule` when moving the conflicting event fails.
    /// - `ResolveError::Commit` when saving the candidate fails.
    pub fn register(
        &self,
        candidate: &Event,
        snapshot: &[Event],
        actor: &ActingUser,
        prompt: &mut dyn ConfirmationPrompt,
    ) -> ResolveResult<Resolution> {
        info!(
            "event=register_resolve module=schedule status=start category={} snapshot_len={}",
            candidate.category,
            snapshot.len()
        );

        let Some(conflict) = self.policy.find_conflict(candidate, snapshot) else {
            return self.commit(candidate, actor, None);
        };

        if conflict.is_blocking() {
            info!(
                "event=register_resolve module=schedule status=blocked conflict_category={}",
                conflict.existing.category
            );
            return Ok(Resolution::without_notification(
                RegistrationOutcome::SchedulingBlocked {
                    candidate_title: candidate.title.clone(),
                    blocked_by: conflict.existing.title.clone(),
                },
            ));
        }

        let new_time = shift_one_hour(conflict.existing.time);
        if !prompt.ask(&reschedule_question(&conflict, new_time, candidate)) {
            info!("event=register_resolve module=schedule status=cancelled");
            return Ok(Resolution::without_notification(
                RegistrationOutcome::Cancelled,
            ));
        }

        let rescheduled = self.reschedule(conflict.existing, new_time)?;
        self.commit(candidate, actor, Some(rescheduled))
    }

    fn reschedule(&self, existing: &Event, new_time: NaiveTime) -> ResolveResult<Reschedule> {
        let mut moved = existing.clone();
        moved.time = new_time;
        self.events.upsert(&moved).map_err(|err| {
            error!(
                "event=register_reschedule module=schedule status=error error={err}"
            );
            ResolveError::Reschedule(err)
        })?;

        info!(
            "event=register_reschedule module=schedule status=ok from={} to={}",
            format_time(existing.time),
            format_time(new_time)
        );
        Ok(Reschedule {
            event_id: existing.id.clone(),
            title: existing.title.clone(),
            from: existing.time,
            to: new_time,
        })
    }

    fn commit(
        &self,
        candidate: &Event,
        actor: &ActingUser,
        rescheduled: Option<Reschedule>,
    ) -> ResolveResult<Resolution> {
        let mut notices = Vec::new();
        let mut registration = None;

        if candidate.is_marketplace() && actor.is_authenticated() {
            match self.registrations.insert(&candidate.id, actor.id()) {
                Ok(created) => registration = Some(created),
                Err(RegistrationStoreError::Duplicate { .. }) => {
                    info!("event=register_commit module=schedule status=already_registered");
                    notices.push(RegistrationNotice::AlreadyRegistered);
                }
                Err(err) => {
                    warn!(
                        "event=register_commit module=schedule status=registration_warning error={err}"
                    );
                    notices.push(RegistrationNotice::RegistrationWarning(err.to_string()));
                }
            }
        }

        let mut owned = candidate.clone();
        owned.owner_id = actor.id().to_string();
        let event = self.events.upsert(&owned).map_err(|err| {
            error!("event=register_commit module=schedule status=error error={err}");
            ResolveError::Commit(err)
        })?;

        let notification = actor.email().and_then(|to| {
            let message = registration_confirmation(to, Some(actor.user.name.as_str()), &event);
            self.dispatcher.dispatch(message)
        });

        info!(
            "event=register_resolve module=schedule status=committed rescheduled={} notices={} notified={}",
            rescheduled.is_some(),
            notices.len(),
            notification.is_some()
        );
        Ok(Resolution {
            outcome: RegistrationOutcome::Committed(CommitReport {
                event,
                rescheduled,
                registration,
                notices,
            }),
            notification,
        })
    }
}

fn reschedule_question(conflict: &Conflict<'_>, new_time: NaiveTime, candidate: &Event) -> String {
    format!(
        "You have a conflict with \"{existing}\". Would you like to reschedule \"{existing}\" to {} and register for \"{}\"?",
        format_time(new_time),
        candidate.title,
        existing = conflict.existing.title,
    )
}
