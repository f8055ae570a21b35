//! Personal schedule use-case service.
//!
//! # Responsibility
//! - Provide save/delete/list entry points for the acting user's schedule.
//! - Import parsed timetables in bulk with category normalization.
//! - Run registration attempts through the conflict resolver.
//!
//! # Invariants
//! - Every write is scoped to the acting user; callers cannot write into
//!   another user's schedule through this service.
//! - Registration reads the schedule snapshot exactly once per attempt.

use crate::model::event::{new_record_id, Event, EventId};
use crate::model::user::ActingUser;
use crate::notify::NotificationDispatcher;
use crate::repo::event_repo::{EventStore, StoreError};
use crate::repo::registration_repo::RegistrationStore;
use crate::schedule::conflict::ConflictPolicy;
use crate::schedule::prompt::ConfirmationPrompt;
use crate::schedule::resolver::{ConflictResolver, ResolveError, Resolution};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for schedule use-cases.
#[derive(Debug)]
pub enum EventServiceError {
    /// Target event does not exist in the acting user's schedule.
    EventNotFound(EventId),
    Store(StoreError),
    Resolve(ResolveError),
}

impl Display for EventServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EventNotFound(id) => write!(f, "event not found: {id}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Resolve(err) => write!(f, "{err}"),
        }
    }
}

impl Error for EventServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::EventNotFound(_) => None,
            Self::Store(err) => Some(err),
            Self::Resolve(err) => Some(err),
        }
    }
}

impl From<StoreError> for EventServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound { event_id, .. } => Self::EventNotFound(event_id),
            other => Self::Store(other),
        }
    }
}

impl From<ResolveError> for EventServiceError {
    fn from(value: ResolveError) -> Self {
        Self::Resolve(value)
    }
}

/// Schedule service facade over store implementations.
pub struct EventService<E: EventStore, R: RegistrationStore> {
    events: E,
    registrations: R,
    dispatcher: NotificationDispatcher,
    policy: ConflictPolicy,
}

impl<E: EventStore, R: RegistrationStore> EventService<E, R> {
    pub fn new(events: E, registrations: R, dispatcher: NotificationDispatcher) -> Self {
        Self {
            events,
            registrations,
            dispatcher,
            policy: ConflictPolicy::default(),
        }
    }

    /// Creates or updates one event in the acting user's schedule.
    pub fn save_event(&self, actor: &ActingUser, event: &Event) -> Result<Event, EventServiceError> {
        let mut owned = event.clone();
        owned.owner_id = actor.id().to_string();
        Ok(self.events.upsert(&owned)?)
    }

    pub fn get_event(
        &self,
        actor: &ActingUser,
        event_id: &str,
    ) -> Result<Option<Event>, EventServiceError> {
        Ok(self.events.get(actor.id(), event_id)?)
    }

    pub fn delete_event(&self, actor: &ActingUser, event_id: &str) -> Result<(), EventServiceError> {
        self.events.delete(actor.id(), event_id)?;
        info!("event=event_delete module=service status=ok");
        Ok(())
    }

    /// Lists the acting user's schedule in chronological order.
    pub fn list_events(&self, actor: &ActingUser) -> Result<Vec<Event>, EventServiceError> {
        Ok(self.events.list_by_user(actor.id())?)
    }

    /// Saves parsed timetable entries as new events.
    ///
    /// # Contract
    /// - Each entry gets a fresh id; incoming ids are ignored.
    /// - Categories outside Academic/Social/Personal/Work become Personal.
    /// - Entries are not conflict-checked; imports describe fixed timetables.
    /// - All-or-nothing: one invalid entry rejects the whole batch.
    pub fn import_events(
        &self,
        actor: &ActingUser,
        entries: Vec<Event>,
    ) -> Result<Vec<Event>, EventServiceError> {
        let prepared: Vec<Event> = entries
            .into_iter()
            .map(|mut entry| {
                entry.id = new_record_id();
                entry.owner_id = actor.id().to_string();
                entry.category = entry.category.normalize_for_import();
                entry
            })
            .collect();

        let saved = self.events.upsert_many(&prepared)?;
        info!(
            "event=event_import module=service status=ok count={}",
            saved.len()
        );
        Ok(saved)
    }

    /// Registers `candidate` into the acting user's schedule.
    ///
    /// Reads the current schedule once as the conflict snapshot, then hands
    /// off to [`ConflictResolver::register`].
    pub fn register_event(
        &self,
        actor: &ActingUser,
        candidate: &Event,
        prompt: &mut dyn ConfirmationPrompt,
    ) -> Result<Resolution, EventServiceError> {
        let snapshot = self.events.list_by_user(actor.id())?;
        let resolver = ConflictResolver::new(&self.events, &self.registrations, &self.dispatcher)
            .with_policy(self.policy);
        Ok(resolver.register(candidate, &snapshot, actor, prompt)?)
    }
}
