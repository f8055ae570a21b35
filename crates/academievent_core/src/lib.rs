//! Core domain logic for AcademiEvent.
//! This crate is the single source of truth for scheduling invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod notify;
pub mod repo;
pub mod schedule;
pub mod service;

pub use config::{ConfigError, CoreConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::event::{
    BudgetItem, Event, EventCategory, EventId, EventValidationError, Priority, Task, TaskStatus,
    UserId,
};
pub use model::registration::{Registration, RegistrationStatus};
pub use model::user::{ActingUser, Role, SessionState, User};
pub use notify::{
    EmailMessage, LogNotifier, NotificationDispatcher, NotificationHandle, Notifier, NotifyError,
};
pub use repo::event_repo::{
    EventStore, MarketplaceQuery, SqliteEventStore, StoreError, StoreResult,
};
pub use repo::registration_repo::{
    RegistrationResult, RegistrationStore, RegistrationStoreError, SqliteRegistrationStore,
};
pub use schedule::conflict::{shift_one_hour, Conflict, ConflictPolicy};
pub use schedule::prompt::{ConfirmationPrompt, FixedAnswer, LinePrompt};
pub use schedule::resolver::{
    CommitReport, ConflictResolver, RegistrationNotice, RegistrationOutcome, Reschedule,
    ResolveError, ResolveResult, Resolution,
};
pub use service::analytics::{budget_summary, chronological, dashboard_stats, BudgetSummary, DashboardStats};
pub use service::event_service::{EventService, EventServiceError};
pub use service::marketplace_service::{MarketplaceError, MarketplaceService};
