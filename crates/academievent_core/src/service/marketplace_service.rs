//! Marketplace use-case service.
//!
//! # Responsibility
//! - Let organizers publish public events.
//! - Browse listings with search.
//! - Expose attendee lists and attendance updates to organizers/admins.
//!
//! # Invariants
//! - Only `Organizer`/`Admin` roles publish or manage attendance.
//! - Organizers only see and update attendees of listings they published.

use crate::model::event::{Event, EventCategory};
use crate::model::registration::{Registration, RegistrationStatus};
use crate::model::user::{ActingUser, Role};
use crate::repo::event_repo::{EventStore, MarketplaceQuery, StoreError};
use crate::repo::registration_repo::{RegistrationStore, RegistrationStoreError};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum MarketplaceError {
    Forbidden { role: Role, action: &'static str },
    ListingNotFound(String),
    Store(StoreError),
    Registration(RegistrationStoreError),
}

impl Display for MarketplaceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Forbidden { role, action } => {
                write!(f, "role `{}` may not {action}", role.as_str())
            }
            Self::ListingNotFound(id) => write!(f, "marketplace listing not found: {id}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Registration(err) => write!(f, "{err}"),
        }
    }
}

impl Error for MarketplaceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Registration(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for MarketplaceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<RegistrationStoreError> for MarketplaceError {
    fn from(value: RegistrationStoreError) -> Self {
        Self::Registration(value)
    }
}

pub struct MarketplaceService<E: EventStore, R: RegistrationStore> {
    events: E,
    registrations: R,
}

impl<E: EventStore, R: RegistrationStore> MarketplaceService<E, R> {
    pub fn new(events: E, registrations: R) -> Self {
        Self {
            events,
            registrations,
        }
    }

    /// Publishes `event` as an organizer listing owned by the actor.
    ///
    /// Forces the `Organizer` category and fills a missing organizer name
    /// from the actor profile.
    pub fn publish(&self, actor: &ActingUser, event: &Event) -> Result<Event, MarketplaceError> {
        ensure_manager(actor, "publish marketplace events")?;

        let mut listing = event.clone();
        listing.owner_id = actor.id().to_string();
        listing.category = EventCategory::Organizer;
        if listing
            .organizer_name
            .as_deref()
            .map_or(true, |name| name.trim().is_empty())
        {
            listing.organizer_name = Some(actor.user.name.clone());
        }

        let stored = self.events.publish(&listing)?;
        info!("event=marketplace_publish module=service status=ok");
        Ok(stored)
    }

    /// Lists published events matching `query`.
    pub fn browse(&self, query: &MarketplaceQuery) -> Result<Vec<Event>, MarketplaceError> {
        Ok(self.events.list_marketplace(query)?)
    }

    /// Looks up one published listing by id.
    pub fn listing(&self, event_id: &str) -> Result<Event, MarketplaceError> {
        self.events
            .get_listing(event_id)?
            .ok_or_else(|| MarketplaceError::ListingNotFound(event_id.to_string()))
    }

    /// Returns registrations for one listing.
    pub fn attendees(
        &self,
        actor: &ActingUser,
        event_id: &str,
    ) -> Result<Vec<Registration>, MarketplaceError> {
        ensure_manager(actor, "view attendees")?;
        self.ensure_listing_access(actor, event_id)?;
        Ok(self.registrations.list_by_event(event_id)?)
    }

    /// Updates attendance for one registration.
    pub fn update_attendance(
        &self,
        actor: &ActingUser,
        registration_id: &str,
        status: RegistrationStatus,
    ) -> Result<Registration, MarketplaceError> {
        ensure_manager(actor, "update attendance")?;
        let registration = self.registrations.get(registration_id)?;
        self.ensure_listing_access(actor, &registration.event_id)?;

        let updated = self.registrations.update_status(registration_id, status)?;
        info!(
            "event=attendance_update module=service status=ok attendance={}",
            status.as_str()
        );
        Ok(updated)
    }

    // Organizers only reach listings they published; a personal copy of
    // someone else's listing does not count.
    fn ensure_listing_access(
        &self,
        actor: &ActingUser,
        event_id: &str,
    ) -> Result<(), MarketplaceError> {
        let listing = self.listing(event_id)?;
        if actor.user.role == Role::Organizer && listing.owner_id != actor.id() {
            return Err(MarketplaceError::ListingNotFound(event_id.to_string()));
        }
        Ok(())
    }
}

fn ensure_manager(actor: &ActingUser, action: &'static str) -> Result<(), MarketplaceError> {
    if actor.user.role.can_manage_marketplace() {
        Ok(())
    } else {
        Err(MarketplaceError::Forbidden {
            role: actor.user.role,
            action,
        })
    }
}
