//! Weekly-recurrence projection and calendar materialization.
//!
//! A section's meeting pattern plus a term produce one recurring placement
//! per meeting weekday, bounded to the term's three-month window. Committed
//! plan events are materialized into renderable calendar events: course rows
//! re-expand into weekly recurrences (day and time-of-day read from the
//! stored occurrence instant, not recomputed from the section), unavailable
//! blocks pass through as one-off entries.

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

use crate::schedule::conflicts::{CommittedSchedule, ConflictReport};
use crate::schedule::term::Term;
use crate::schedule::time::{minutes_since_midnight, weekday_index};
use crate::schedule::types::{PlanEventKind, Section};

/// One weekly-recurring calendar placement for a single meeting weekday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecurrencePlacement {
    /// Day-of-week number, Sunday = 0.
    pub day_of_week: u32,
    /// First occurrence on/after the term anchor.
    pub first: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    /// Exclusive end of the recurrence window.
    pub recur_until: NaiveDate,
}

impl RecurrencePlacement {
    /// Concrete occurrence dates, weekly from `first` up to (excluding)
    /// `recur_until`.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        std::iter::successors(Some(self.first), |date| {
            date.checked_add_days(Days::new(7))
        })
        .take_while(|date| *date < self.recur_until)
    }
}

/// Projects a section's meeting pattern onto a term's calendar window.
///
/// Returns `None` for sections with no meeting pattern (asynchronous/TBA);
/// otherwise one placement per meeting weekday. Pure: identical input gives
/// identical output.
pub fn project_occurrences(section: &Section, term: Term) -> Option<Vec<RecurrencePlacement>> {
    let (days, start, end) = section.meeting()?;
    let (anchor, until) = term.window();
    let start_time = time_of_day(start);
    let end_time = time_of_day(end);

    Some(
        days.iter()
            .map(|&day| RecurrencePlacement {
                day_of_week: weekday_index(day),
                first: first_on_or_after(anchor, weekday_index(day)),
                start_time,
                end_time,
                recur_until: until,
            })
            .collect(),
    )
}

fn time_of_day(time: &str) -> NaiveTime {
    let minutes = minutes_since_midnight(time);
    NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0).expect("minutes already range-checked")
}

/// First date on/after `from` falling on the given day-of-week.
fn first_on_or_after(from: NaiveDate, day_of_week: u32) -> NaiveDate {
    let offset = (day_of_week + 7 - from.weekday().num_days_from_sunday()) % 7;
    from.checked_add_days(Days::new(u64::from(offset)))
        .expect("offset below one week")
}

/// A renderable calendar entry handed to the UI layer.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CalendarEvent {
    /// A course meeting, recurring weekly within the term window.
    Recurring {
        id: i64,
        title: String,
        crn: String,
        /// Day-of-week number, Sunday = 0.
        day_of_week: u32,
        start_time: NaiveTime,
        end_time: NaiveTime,
        recur_from: NaiveDate,
        recur_until: NaiveDate,
        /// Whether the owning course is referenced by any conflict record.
        conflicted: bool,
    },
    /// A one-off unavailable block.
    OneOff {
        id: i64,
        title: String,
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
}

/// Turns the committed snapshot into renderable calendar events carrying
/// conflict-highlighting metadata.
pub fn materialize_calendar(
    committed: &CommittedSchedule,
    term: Term,
    report: &ConflictReport,
) -> Vec<CalendarEvent> {
    let (recur_from, recur_until) = term.window();
    committed
        .events()
        .iter()
        .map(|event| match &event.kind {
            PlanEventKind::Course { crn } => CalendarEvent::Recurring {
                id: event.id,
                title: event.title.clone(),
                crn: crn.clone(),
                day_of_week: weekday_index(event.start.weekday()),
                start_time: event.start.time(),
                end_time: event.end.time(),
                recur_from,
                recur_until,
                conflicted: committed
                    .section(crn)
                    .is_some_and(|section| report.has_conflict(&section.course_id)),
            },
            PlanEventKind::Unavailable => CalendarEvent::OneOff {
                id: event.id,
                title: event.title.clone(),
                start: event.start,
                end: event.end,
            },
        })
        .collect()
}
