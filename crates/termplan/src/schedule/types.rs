//! Data model for the schedule core: catalog sections, committed plan
//! events, and conflict reports.

use chrono::{NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::schedule::time::weekday_names;

/// An instructor assigned to a section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instructor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// One schedulable offering of a course in a specific term, sourced
/// read-only from the section catalog.
///
/// `start_time` and `end_time` are `HH:MM[:SS]` local time-of-day strings;
/// both are present iff `days` is non-empty. Sections with no meeting
/// pattern (asynchronous/TBA) are valid but cannot be placed on a calendar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    pub crn: String,
    pub course_id: String,
    /// Human-readable course code, e.g. "CS 260".
    pub course: String,
    pub title: String,
    pub credits: f32,
    pub instruction_method: String,
    pub instruction_type: String,
    /// Numeric `YYYYTT` term code.
    pub term: String,
    #[serde(default, with = "weekday_names")]
    pub days: Vec<Weekday>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default)]
    pub instructors: Vec<Instructor>,
}

impl Section {
    /// The section's weekly meeting pattern, or `None` for sections that
    /// cannot be placed on a calendar.
    pub fn meeting(&self) -> Option<(&[Weekday], &str, &str)> {
        if self.days.is_empty() {
            return None;
        }
        match (&self.start_time, &self.end_time) {
            (Some(start), Some(end)) => Some((&self.days, start, end)),
            _ => None,
        }
    }

    pub fn meets_on(&self, day: Weekday) -> bool {
        self.days.contains(&day)
    }
}

/// A calendar-visible commitment: either one weekday row of a planned
/// course or a user-declared one-off unavailable block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanEvent {
    pub id: i64,
    pub term_id: i64,
    pub title: String,
    #[serde(flatten)]
    pub kind: PlanEventKind,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// The two event kinds, tagged so downstream code can match exhaustively.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlanEventKind {
    /// One meeting-weekday row of a planned course. All rows sharing a CRN
    /// form a single schedulable unit for deletion and conflict purposes.
    Course { crn: String },
    /// A one-off user-declared block; directly movable and resizable.
    Unavailable,
}

impl PlanEvent {
    pub fn crn(&self) -> Option<&str> {
        match &self.kind {
            PlanEventKind::Course { crn } => Some(crn),
            PlanEventKind::Unavailable => None,
        }
    }

    pub fn is_course(&self) -> bool {
        matches!(self.kind, PlanEventKind::Course { .. })
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self.kind, PlanEventKind::Unavailable)
    }
}

/// A course referenced by id and display name, used for corequisite
/// metadata and conflict details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseRef {
    pub id: String,
    pub name: String,
}

/// The kinds of conflict the classifier reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictType {
    /// The section's CRN is already committed for the term.
    Duplicate,
    /// Course-vs-course meeting time overlap on a shared weekday.
    Overlap,
    /// Course meeting overlaps a user-declared unavailable block.
    UnavailableOverlap,
    /// None of the course's declared corequisites is committed.
    MissingCorequisite,
}

/// One side of a conflict: a CRN, an unavailable-block event id, or a
/// missing corequisite course, with a display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictParty {
    pub id: String,
    pub name: String,
}

/// The classifier's verdict for one conflict type on one course. Not
/// persisted; recomputed on demand from the committed snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictRecord {
    #[serde(rename = "type")]
    pub conflict_type: ConflictType,
    pub course_id: String,
    pub course_name: String,
    /// All counterparts of this conflict type, aggregated.
    pub details: Vec<ConflictParty>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn timed_section() -> Section {
        serde_json::from_value(serde_json::json!({
            "crn": "12345",
            "course_id": "CS260",
            "course": "CS 260",
            "title": "Data Structures",
            "credits": 4.0,
            "instruction_method": "Face To Face",
            "instruction_type": "Lecture",
            "term": "202515",
            "days": ["Monday", "Wednesday"],
            "start_time": "10:00",
            "end_time": "11:20",
            "instructors": [{"name": "B. Char"}]
        }))
        .unwrap()
    }

    #[test]
    fn test_section_meeting_shape() {
        let section = timed_section();
        let (days, start, end) = section.meeting().unwrap();
        assert_eq!(days, [Weekday::Mon, Weekday::Wed]);
        assert_eq!((start, end), ("10:00", "11:20"));
        assert!(section.meets_on(Weekday::Wed));
        assert!(!section.meets_on(Weekday::Fri));
    }

    #[test]
    fn test_async_section_has_no_meeting() {
        let mut section = timed_section();
        section.days.clear();
        assert!(section.meeting().is_none());

        let mut no_times = timed_section();
        no_times.start_time = None;
        no_times.end_time = None;
        assert!(no_times.meeting().is_none());
    }

    #[test]
    fn test_unknown_weekday_name_is_rejected() {
        let result: Result<Section, _> = serde_json::from_value(serde_json::json!({
            "crn": "1",
            "course_id": "X",
            "course": "X 1",
            "title": "t",
            "credits": 1.0,
            "instruction_method": "m",
            "instruction_type": "t",
            "term": "202515",
            "days": ["Noday"]
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_plan_event_kind_tagging() {
        let event = PlanEvent {
            id: 7,
            term_id: 1,
            title: "CS 260".into(),
            kind: PlanEventKind::Course { crn: "12345".into() },
            start: "2025-09-01T10:00:00".parse().unwrap(),
            end: "2025-09-01T11:20:00".parse().unwrap(),
        };
        assert_eq!(event.crn(), Some("12345"));
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "course");
        assert_eq!(json["crn"], "12345");
    }
}
