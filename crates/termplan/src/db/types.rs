/// Row types for the committed plan store

use chrono::NaiveDateTime;

use crate::schedule::{PlanEvent, PlanEventKind};

#[derive(Debug, Clone)]
pub struct DbPlanEvent {
    pub event_id: i64,
    pub term_id: i64,
    pub event_type: String,
    pub crn: Option<String>,
    pub title: String,
    pub start_at: NaiveDateTime,
    pub end_at: NaiveDateTime,
}

impl DbPlanEvent {
    /// Converts the row into the core's tagged event type. Returns `None`
    /// for rows whose type/crn combination is malformed so one bad row
    /// cannot poison conflict detection.
    pub fn into_plan_event(self) -> Option<PlanEvent> {
        let kind = match (self.event_type.as_str(), self.crn) {
            ("course", Some(crn)) => PlanEventKind::Course { crn },
            ("unavailable", None) => PlanEventKind::Unavailable,
            _ => return None,
        };
        Some(PlanEvent {
            id: self.event_id,
            term_id: self.term_id,
            title: self.title,
            kind,
            start: self.start_at,
            end: self.end_at,
        })
    }
}

#[derive(Debug, Clone)]
pub struct DbSectionStatus {
    pub term_id: i64,
    pub crn: String,
    pub status: String,
    pub liked: bool,
}
