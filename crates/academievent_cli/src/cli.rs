use std::env;
use std::path::PathBuf;
use std::process;

use academievent_core::model::event::{parse_date, parse_time};
use academievent_core::EventCategory;
use chrono::{NaiveDate, NaiveTime};
use getopts::{Matches, Options};

/// Event to register from the command line.
pub struct Candidate {
    pub title: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub category: EventCategory,
    pub location: String,
    pub organizer: Option<String>,
}

/// What the invocation does after wiring up storage.
pub enum Action {
    ListSchedule,
    Register(Candidate),
    /// Register for a published marketplace listing by event id.
    RegisterListing(String),
}

pub struct Args {
    pub db_path: Option<PathBuf>,
    pub user_id: String,
    pub name: String,
    pub email: Option<String>,
    pub local_only: bool,
    pub assume_yes: bool,
    pub action: Action,
}

fn opts() -> Options {
    let mut opts = Options::new();
    opts.optflag(
        "h",
        "help",
        concat!("Print the help output of ", env!("CARGO_PKG_NAME")),
    );
    opts.optopt(
        "d",
        "db",
        "Schedule database file [Default: ACADEMIEVENT_DB_PATH or academievent.sqlite3]",
        "PATH",
    );
    opts.optopt("u", "user", "Acting user id [Default: local]", "USER_ID");
    opts.optopt("n", "name", "Display name used in emails", "NAME");
    opts.optopt("e", "email", "Address for confirmation emails", "EMAIL");
    opts.optflag(
        "",
        "local",
        "Run without a signed-in session; marketplace registrations are skipped",
    );
    opts.optflag("y", "yes", "Accept reschedule offers without asking");
    opts.optopt(
        "",
        "listing",
        "Register for the marketplace listing with this event id",
        "EVENT_ID",
    );
    opts.optopt("t", "title", "Title of the event to register", "TITLE");
    opts.optopt("", "date", "Event date", "YYYY-MM-DD");
    opts.optopt("", "time", "Event start time", "HH:MM");
    opts.optopt(
        "c",
        "category",
        "Academic, Personal, Social, Work or Organizer [Default: Personal]",
        "CATEGORY",
    );
    opts.optopt("l", "location", "Event location", "LOCATION");
    opts.optopt("o", "organizer", "Organizer name for marketplace events", "NAME");
    opts
}

pub fn parse(args: Vec<String>) -> Args {
    let opts = opts();

    let matches = match opts.parse(args) {
        Ok(matches) => matches,
        Err(fail) => {
            eprintln!("{fail}");
            process::exit(1);
        }
    };

    if matches.opt_present("help") {
        println!("{}", opts.usage(&opts.short_usage(env!("CARGO_PKG_NAME"))));
        process::exit(0);
    }

    let user_id = matches
        .opt_str("user")
        .unwrap_or_else(|| "local".to_string());
    let name = matches.opt_str("name").unwrap_or_else(|| user_id.clone());

    Args {
        db_path: matches.opt_str("db").map(PathBuf::from),
        user_id,
        name,
        email: matches.opt_str("email"),
        local_only: matches.opt_present("local"),
        assume_yes: matches.opt_present("yes"),
        action: parse_action(&matches),
    }
}

fn parse_action(matches: &Matches) -> Action {
    match (matches.opt_str("listing"), parse_candidate(matches)) {
        (Some(_), Some(_)) => invalid("listing", "cannot be combined with --title"),
        (Some(event_id), None) => Action::RegisterListing(event_id),
        (None, Some(candidate)) => Action::Register(candidate),
        (None, None) => Action::ListSchedule,
    }
}

fn parse_candidate(matches: &Matches) -> Option<Candidate> {
    let title = matches.opt_str("title")?;

    let date = match matches.opt_str("date").as_deref().map(parse_date) {
        Some(Some(date)) => date,
        Some(None) => invalid("date", "expected YYYY-MM-DD"),
        None => invalid("date", "required together with --title"),
    };

    let time = match matches.opt_str("time").as_deref().map(parse_time) {
        Some(Some(time)) => time,
        Some(None) => invalid("time", "expected HH:MM"),
        None => invalid("time", "required together with --title"),
    };

    Some(Candidate {
        title,
        date,
        time,
        category: EventCategory::normalize(matches.opt_str("category").as_deref()),
        location: matches.opt_str("location").unwrap_or_default(),
        organizer: matches.opt_str("organizer"),
    })
}

fn invalid(option: &str, reason: &str) -> ! {
    eprintln!("Provided value for option '{option}' is invalid: {reason}");
    process::exit(1);
}
