//! Event domain model.
//!
//! # Responsibility
//! - Define the canonical schedule record shared by personal and marketplace
//!   views, plus its task and budget sub-records.
//! - Normalize loosely typed category input at the boundary.
//!
//! # Invariants
//! - `date`/`time` are wall-clock values without timezone; `time` carries
//!   minute precision only.
//! - When `budget_items` is non-empty, `total_budget`/`total_spent` equal the
//!   sums of item estimated/actual costs.
//! - Costs and totals are finite and non-negative.

use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Opaque event identifier.
///
/// Marketplace events keep the organizer-assigned id when copied into a
/// personal schedule, so the same id may exist under several owners.
pub type EventId = String;

/// Opaque user identifier issued by the auth backend.
pub type UserId = String;

/// Canonical date text form.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Canonical time text form.
pub const TIME_FORMAT: &str = "%H:%M";

/// Generates a fresh opaque id for events, tasks and budget items.
pub fn new_record_id() -> String {
    Uuid::new_v4().to_string()
}

/// Closed event category set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    /// Lecture, lab, exam. Never moved by rescheduling.
    Academic,
    Personal,
    Social,
    Work,
    /// Public marketplace event posted by an organizer.
    Organizer,
}

impl EventCategory {
    /// Categories accepted from bulk schedule imports.
    pub const IMPORTABLE: [EventCategory; 4] = [
        EventCategory::Academic,
        EventCategory::Social,
        EventCategory::Personal,
        EventCategory::Work,
    ];

    /// Stable name used in storage and display.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Academic => "Academic",
            Self::Personal => "Personal",
            Self::Social => "Social",
            Self::Work => "Work",
            Self::Organizer => "Organizer",
        }
    }

    /// Parses a category name case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "academic" => Some(Self::Academic),
            "personal" => Some(Self::Personal),
            "social" => Some(Self::Social),
            "work" => Some(Self::Work),
            "organizer" => Some(Self::Organizer),
            _ => None,
        }
    }

    /// Parses optional raw input, falling back to `Personal`.
    ///
    /// The fallback is non-academic so an unknown category can never make an
    /// event immovable.
    pub fn normalize(value: Option<&str>) -> Self {
        value.and_then(Self::parse).unwrap_or(Self::Personal)
    }

    /// Normalizes a category for the bulk import path.
    ///
    /// Anything outside [`EventCategory::IMPORTABLE`] becomes `Personal`.
    pub fn normalize_for_import(self) -> Self {
        if Self::IMPORTABLE.contains(&self) {
            self
        } else {
            Self::Personal
        }
    }

    pub fn is_academic(self) -> bool {
        self == Self::Academic
    }
}

impl Display for EventCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event priority shown on dashboards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }
}

/// Task lifecycle state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().replace(' ', "_").as_str() {
            "pending" => Some(Self::Pending),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

/// Preparation task attached to an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub status: TaskStatus,
    pub deadline: Option<NaiveDate>,
}

impl Task {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: new_record_id(),
            title: title.into(),
            status: TaskStatus::Pending,
            deadline: None,
        }
    }
}

/// Budget line attached to an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetItem {
    pub id: String,
    pub description: String,
    pub estimated_cost: f64,
    pub actual_cost: f64,
    pub paid: Option<bool>,
}

impl BudgetItem {
    pub fn new(description: impl Into<String>, estimated_cost: f64, actual_cost: f64) -> Self {
        Self {
            id: new_record_id(),
            description: description.into(),
            estimated_cost,
            actual_cost,
            paid: None,
        }
    }
}

/// Validation failures for event writes.
#[derive(Debug, Clone, PartialEq)]
pub enum EventValidationError {
    EmptyId,
    EmptyOwner,
    EmptyTitle,
    NegativeAmount { field: &'static str, value: f64 },
}

impl Display for EventValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId => write!(f, "event id must not be blank"),
            Self::EmptyOwner => write!(f, "event owner must not be blank"),
            Self::EmptyTitle => write!(f, "event title must not be blank"),
            Self::NegativeAmount { field, value } => {
                write!(f, "{field} must be a finite non-negative amount, got {value}")
            }
        }
    }
}

impl Error for EventValidationError {}

/// Canonical schedule record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    /// User whose schedule holds this record.
    pub owner_id: UserId,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub category: EventCategory,
    pub priority: Priority,
    pub title: String,
    pub location: String,
    pub description: String,
    /// Set for marketplace listings.
    pub organizer_name: Option<String>,
    pub tasks: Vec<Task>,
    pub budget_items: Vec<BudgetItem>,
    pub total_budget: f64,
    pub total_spent: f64,
}

impl Event {
    /// Creates an event with a generated id and empty sub-records.
    ///
    /// `time` is truncated to minute precision.
    pub fn new(
        owner_id: impl Into<UserId>,
        title: impl Into<String>,
        date: NaiveDate,
        time: NaiveTime,
        category: EventCategory,
    ) -> Self {
        Self {
            id: new_record_id(),
            owner_id: owner_id.into(),
            date,
            time: truncate_to_minute(time),
            category,
            priority: Priority::default(),
            title: title.into(),
            location: String::new(),
            description: String::new(),
            organizer_name: None,
            tasks: Vec::new(),
            budget_items: Vec::new(),
            total_budget: 0.0,
            total_spent: 0.0,
        }
    }

    /// Builder-style location setter.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Returns whether this event is a public marketplace listing.
    pub fn is_marketplace(&self) -> bool {
        self.category == EventCategory::Organizer
    }

    /// Returns whether both events occupy the same `(date, time)` slot.
    pub fn same_slot(&self, other: &Event) -> bool {
        self.date == other.date && self.time == other.time
    }

    /// Recomputes totals from budget items when any exist.
    ///
    /// Events without items keep their manually entered totals.
    pub fn recompute_totals(&mut self) {
        if self.budget_items.is_empty() {
            return;
        }
        self.total_budget = self.budget_items.iter().map(|item| item.estimated_cost).sum();
        self.total_spent = self.budget_items.iter().map(|item| item.actual_cost).sum();
    }

    /// Remaining budget; negative when overspent.
    pub fn variance(&self) -> f64 {
        self.total_budget - self.total_spent
    }

    pub fn is_over_budget(&self) -> bool {
        self.total_spent > self.total_budget
    }

    /// Validates write-time invariants.
    pub fn validate(&self) -> Result<(), EventValidationError> {
        if self.id.trim().is_empty() {
            return Err(EventValidationError::EmptyId);
        }
        if self.owner_id.trim().is_empty() {
            return Err(EventValidationError::EmptyOwner);
        }
        if self.title.trim().is_empty() {
            return Err(EventValidationError::EmptyTitle);
        }
        ensure_amount("total_budget", self.total_budget)?;
        ensure_amount("total_spent", self.total_spent)?;
        for item in &self.budget_items {
            ensure_amount("estimated_cost", item.estimated_cost)?;
            ensure_amount("actual_cost", item.actual_cost)?;
        }
        Ok(())
    }
}

fn ensure_amount(field: &'static str, value: f64) -> Result<(), EventValidationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(EventValidationError::NegativeAmount { field, value })
    }
}

/// Drops seconds and sub-seconds.
pub fn truncate_to_minute(time: NaiveTime) -> NaiveTime {
    NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time)
}

/// Parses `HH:MM` (seconds tolerated and dropped).
pub fn parse_time(value: &str) -> Option<NaiveTime> {
    let trimmed = value.trim();
    NaiveTime::parse_from_str(trimmed, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .ok()
        .map(truncate_to_minute)
}

/// Parses `YYYY-MM-DD`.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

pub fn format_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(value: &str) -> NaiveDate {
        parse_date(value).expect("valid date")
    }

    fn time(value: &str) -> NaiveTime {
        parse_time(value).expect("valid time")
    }

    #[test]
    fn category_parse_is_case_insensitive() {
        assert_eq!(EventCategory::parse("ACADEMIC"), Some(EventCategory::Academic));
        assert_eq!(EventCategory::parse(" social "), Some(EventCategory::Social));
        assert_eq!(EventCategory::parse("Career"), None);
    }

    #[test]
    fn category_normalize_defaults_to_non_academic() {
        assert_eq!(EventCategory::normalize(None), EventCategory::Personal);
        assert_eq!(
            EventCategory::normalize(Some("Technology")),
            EventCategory::Personal
        );
        assert!(!EventCategory::normalize(Some("")).is_academic());
    }

    #[test]
    fn import_normalization_rejects_organizer() {
        assert_eq!(
            EventCategory::Organizer.normalize_for_import(),
            EventCategory::Personal
        );
        assert_eq!(
            EventCategory::Work.normalize_for_import(),
            EventCategory::Work
        );
    }

    #[test]
    fn recompute_totals_sums_items_and_keeps_manual_totals_without_items() {
        let mut event = Event::new("u1", "Gala", date("2026-03-10"), time("18:00"), EventCategory::Social);
        event.total_budget = 500.0;
        event.recompute_totals();
        assert_eq!(event.total_budget, 500.0);

        event.budget_items.push(BudgetItem::new("venue", 300.0, 250.0));
        event.budget_items.push(BudgetItem::new("food", 200.0, 260.0));
        event.recompute_totals();
        assert_eq!(event.total_budget, 500.0);
        assert_eq!(event.total_spent, 510.0);
        assert!(event.is_over_budget());
        assert_eq!(event.variance(), -10.0);
    }

    #[test]
    fn validate_rejects_blank_title_and_negative_costs() {
        let mut event = Event::new("u1", "  ", date("2026-03-10"), time("09:00"), EventCategory::Work);
        assert_eq!(event.validate(), Err(EventValidationError::EmptyTitle));

        event.title = "Shift".to_string();
        event.budget_items.push(BudgetItem::new("bus", -1.0, 0.0));
        assert!(matches!(
            event.validate(),
            Err(EventValidationError::NegativeAmount {
                field: "estimated_cost",
                ..
            })
        ));
    }

    #[test]
    fn parse_time_drops_seconds() {
        assert_eq!(format_time(time("07:45:59")), "07:45");
        assert!(parse_time("25:00").is_none());
    }

    #[test]
    fn task_status_accepts_display_form() {
        assert_eq!(TaskStatus::parse("In Progress"), Some(TaskStatus::InProgress));
        assert_eq!(TaskStatus::parse("completed"), Some(TaskStatus::Completed));
    }
}
