//! Slot conflict detection and the one-hour reschedule shift.

use crate::model::event::{Event, EventCategory};
use chrono::{Duration, NaiveTime};

/// How two events are compared for a conflict.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConflictPolicy {
    /// Same date and identical start time. Durations are not modelled.
    #[default]
    ExactStart,
}

/// A snapshot event occupying the candidate's slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Conflict<'a> {
    pub existing: &'a Event,
}

impl Conflict<'_> {
    /// Academic events are immovable.
    pub fn is_blocking(&self) -> bool {
        self.existing.category == EventCategory::Academic
    }
}

impl ConflictPolicy {
    pub fn conflicts(self, candidate: &Event, existing: &Event) -> bool {
        match self {
            Self::ExactStart => candidate.same_slot(existing),
        }
    }

    /// Returns the first snapshot event that conflicts with `candidate`.
    ///
    /// An entry with the candidate's own id is the same event and is skipped.
    pub fn find_conflict<'a>(self, candidate: &Event, snapshot: &'a [Event]) -> Option<Conflict<'a>> {
        snapshot
            .iter()
            .filter(|existing| existing.id != candidate.id)
            .find(|existing| self.conflicts(candidate, existing))
            .map(|existing| Conflict { existing })
    }
}

/// Advances `time` by one hour on a 24-hour clock; minutes are unchanged.
///
/// The date is not carried: 23:30 becomes 00:30 on the same calendar date.
pub fn shift_one_hour(time: NaiveTime) -> NaiveTime {
    let (shifted, _wrapped_days) = time.overflowing_add_signed(Duration::hours(1));
    shifted
}
