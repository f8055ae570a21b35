//! Command-line front end for the AcademiEvent core.
//!
//! # Responsibility
//! - Wire configuration, storage and notification into the core services.
//! - Register one event through the conflict resolver, asking on the
//!   terminal before moving a conflicting event.
//! - With `--listing`, register for a published marketplace listing.
//! - Without either, print the acting user's schedule and dashboard.

mod cli;

use std::error::Error;
use std::io;
use std::process;
use std::sync::Arc;

use academievent_core::model::event::{format_date, format_time};
use academievent_core::{
    chronological, dashboard_stats, init_logging, ActingUser, ConfirmationPrompt, CoreConfig,
    Event, EventService, FixedAnswer, LinePrompt, LogNotifier, MarketplaceService,
    NotificationDispatcher,
    RegistrationNotice, RegistrationOutcome, Role, SqliteEventStore, SqliteRegistrationStore,
    User,
};
use log::info;

fn main() {
    let args = cli::parse(std::env::args().skip(1).collect());
    if let Err(err) = run(args) {
        eprintln!("error: {err}");
        process::exit(1);
    }
}

fn run(args: cli::Args) -> Result<(), Box<dyn Error>> {
    let mut config = CoreConfig::from_env()?;
    if let Some(db_path) = args.db_path.clone() {
        config.db_path = db_path;
    }
    if let Some(log_dir) = &config.log_dir {
        init_logging(&config.log_level, &log_dir.to_string_lossy())?;
    }

    let conn = academievent_core::db::open_db(&config.db_path)?;
    let notifier = Arc::new(LogNotifier);
    let dispatcher = if config.notifications_enabled {
        NotificationDispatcher::new(notifier)
    } else {
        NotificationDispatcher::disabled(notifier)
    };
    let service = EventService::new(
        SqliteEventStore::try_new(&conn)?,
        SqliteRegistrationStore::new(&conn),
        dispatcher,
    );

    let user = User {
        id: args.user_id.clone(),
        name: args.name.clone(),
        email: args.email.clone(),
        role: Role::Student,
    };
    let actor = if args.local_only {
        ActingUser::local_only(user)
    } else {
        ActingUser::authenticated(user)
    };

    let event = match args.action {
        cli::Action::ListSchedule => {
            let events = service.list_events(&actor)?;
            print_schedule(&events);
            return Ok(());
        }
        cli::Action::Register(candidate) => {
            let mut event = Event::new(
                actor.id(),
                candidate.title,
                candidate.date,
                candidate.time,
                candidate.category,
            )
            .with_location(candidate.location);
            event.organizer_name = candidate.organizer;
            event
        }
        cli::Action::RegisterListing(event_id) => {
            let market = MarketplaceService::new(
                SqliteEventStore::try_new(&conn)?,
                SqliteRegistrationStore::new(&conn),
            );
            market.listing(&event_id)?
        }
    };

    let stdin = io::stdin();
    let mut prompt: Box<dyn ConfirmationPrompt> = if args.assume_yes {
        Box::new(FixedAnswer(true))
    } else {
        Box::new(LinePrompt::new(stdin.lock(), io::stdout()))
    };

    let resolution = service.register_event(&actor, &event, prompt.as_mut())?;
    info!(
        "event=cli_register module=cli status=ok outcome={}",
        resolution.outcome.as_str()
    );
    print_outcome(&resolution.outcome);

    // The process exits right after; wait so the confirmation is not dropped.
    if let Some(handle) = resolution.notification {
        if !handle.wait() {
            eprintln!("warning: confirmation email could not be sent");
        }
    }
    Ok(())
}

fn print_outcome(outcome: &RegistrationOutcome) {
    match outcome {
        RegistrationOutcome::Committed(report) => {
            if let Some(moved) = &report.rescheduled {
                println!(
                    "Rescheduled \"{}\" from {} to {}",
                    moved.title,
                    format_time(moved.from),
                    format_time(moved.to)
                );
            }
            for notice in &report.notices {
                match notice {
                    RegistrationNotice::AlreadyRegistered => {
                        println!("You are already registered for this event.")
                    }
                    RegistrationNotice::RegistrationWarning(reason) => {
                        println!("Registration could not be recorded: {reason}")
                    }
                }
            }
            println!(
                "Registered for \"{}\" on {} at {}",
                report.event.title,
                format_date(report.event.date),
                format_time(report.event.time)
            );
        }
        RegistrationOutcome::SchedulingBlocked {
            candidate_title,
            blocked_by,
        } => println!(
            "Cannot register for \"{candidate_title}\": it conflicts with the academic event \"{blocked_by}\"."
        ),
        RegistrationOutcome::Cancelled => println!("Registration cancelled."),
    }
}

fn print_schedule(events: &[Event]) {
    for event in chronological(events) {
        println!(
            "{} {}  [{}] {}",
            format_date(event.date),
            format_time(event.time),
            event.category,
            event.title
        );
    }

    let stats = dashboard_stats(events, chrono::Local::now().naive_local());
    println!(
        "{} events, {} upcoming, {} high priority, budget {:.2}, spent {:.2}",
        stats.total_events,
        stats.upcoming_events,
        stats.high_priority,
        stats.total_budget,
        stats.total_spent
    );
}
