//! Dashboard and budget aggregates over a schedule.

use crate::model::event::{Event, Priority};
use chrono::NaiveDateTime;

/// Headline counters for the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardStats {
    pub total_events: usize,
    /// Events starting strictly after `now`.
    pub upcoming_events: usize,
    pub high_priority: usize,
    pub total_budget: f64,
    pub total_spent: f64,
}

pub fn dashboard_stats(events: &[Event], now: NaiveDateTime) -> DashboardStats {
    DashboardStats {
        total_events: events.len(),
        upcoming_events: events
            .iter()
            .filter(|event| event.date.and_time(event.time) > now)
            .count(),
        high_priority: events
            .iter()
            .filter(|event| event.priority == Priority::High)
            .count(),
        total_budget: events.iter().map(|event| event.total_budget).sum(),
        total_spent: events.iter().map(|event| event.total_spent).sum(),
    }
}

/// Budget overview across all events.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetSummary<'a> {
    pub total_budget: f64,
    pub total_spent: f64,
    /// Budget minus spend; negative when overspent.
    pub variance: f64,
    /// Spend as a percentage of budget; 0 when nothing is budgeted.
    pub percent_spent: f64,
    pub highest_spending: Option<&'a Event>,
    pub over_budget: Vec<&'a Event>,
}

pub fn budget_summary(events: &[Event]) -> BudgetSummary<'_> {
    let total_budget: f64 = events.iter().map(|event| event.total_budget).sum();
    let total_spent: f64 = events.iter().map(|event| event.total_spent).sum();
    let percent_spent = if total_budget > 0.0 {
        total_spent / total_budget * 100.0
    } else {
        0.0
    };

    // First event wins ties so the result is stable for equal spend.
    let highest_spending = events.iter().fold(None, |best: Option<&Event>, event| match best {
        Some(current) if current.total_spent >= event.total_spent => Some(current),
        _ => Some(event),
    });

    BudgetSummary {
        total_budget,
        total_spent,
        variance: total_budget - total_spent,
        percent_spent,
        highest_spending,
        over_budget: events.iter().filter(|event| event.is_over_budget()).collect(),
    }
}

/// Events sorted by start, stable for equal slots.
pub fn chronological(events: &[Event]) -> Vec<&Event> {
    let mut sorted: Vec<&Event> = events.iter().collect();
    sorted.sort_by_key(|event| (event.date, event.time));
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::event::{parse_date, parse_time, EventCategory};

    fn event(title: &str, date: &str, time: &str, budget: f64, spent: f64) -> Event {
        let mut event = Event::new(
            "u1",
            title,
            parse_date(date).expect("date"),
            parse_time(time).expect("time"),
            EventCategory::Social,
        );
        event.total_budget = budget;
        event.total_spent = spent;
        event
    }

    #[test]
    fn dashboard_counts_upcoming_relative_to_now() {
        let mut events = vec![
            event("past", "2026-01-01", "10:00", 100.0, 50.0),
            event("later", "2026-12-01", "10:00", 200.0, 10.0),
        ];
        events[1].priority = Priority::High;
        let now = parse_date("2026-06-01")
            .expect("date")
            .and_hms_opt(0, 0, 0)
            .expect("midnight");

        let stats = dashboard_stats(&events, now);
        assert_eq!(stats.total_events, 2);
        assert_eq!(stats.upcoming_events, 1);
        assert_eq!(stats.high_priority, 1);
        assert_eq!(stats.total_budget, 300.0);
        assert_eq!(stats.total_spent, 60.0);
    }

    #[test]
    fn budget_summary_reports_variance_and_overspend() {
        let events = vec![
            event("a", "2026-01-01", "10:00", 100.0, 150.0),
            event("b", "2026-01-02", "10:00", 300.0, 50.0),
        ];
        let summary = budget_summary(&events);
        assert_eq!(summary.variance, 200.0);
        assert_eq!(summary.percent_spent, 50.0);
        assert_eq!(summary.highest_spending.map(|e| e.title.as_str()), Some("a"));
        assert_eq!(summary.over_budget.len(), 1);
    }

    #[test]
    fn budget_summary_handles_empty_schedule() {
        let summary = budget_summary(&[]);
        assert_eq!(summary.percent_spent, 0.0);
        assert!(summary.highest_spending.is_none());
    }

    #[test]
    fn chronological_orders_by_date_then_time() {
        let events = vec![
            event("c", "2026-01-02", "08:00", 0.0, 0.0),
            event("b", "2026-01-01", "12:00", 0.0, 0.0),
            event("a", "2026-01-01", "09:00", 0.0, 0.0),
        ];
        let titles: Vec<_> = chronological(&events).iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b", "c"]);
    }
}
