//! Conflict detection for a term plan.
//!
//! Four independent rules are evaluated per section: duplicate CRN,
//! course-vs-course time overlap, course-vs-unavailable-block overlap, and
//! missing corequisites. All detection is pure and synchronous over a
//! snapshot of the committed set; callers re-run it whenever the committed
//! set changes.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{Datelike, NaiveDateTime, Timelike};

use crate::schedule::time::time_ranges_overlap;
use crate::schedule::types::{
    ConflictParty, ConflictRecord, ConflictType, CourseRef, PlanEvent, Section,
};

/// Supplies the corequisite courses a course declares. Queried per course,
/// not per section.
pub trait CorequisiteSource {
    fn corequisites_for(&self, course_id: &str) -> Vec<CourseRef>;
}

impl CorequisiteSource for HashMap<String, Vec<CourseRef>> {
    fn corequisites_for(&self, course_id: &str) -> Vec<CourseRef> {
        self.get(course_id).cloned().unwrap_or_default()
    }
}

/// An immutable snapshot of everything committed to a term: the plan events
/// plus section data for every committed CRN.
///
/// Sections are keyed and iterated in CRN order so that classification and
/// aggregation are deterministic for a given committed set.
#[derive(Debug, Clone, Default)]
pub struct CommittedSchedule {
    events: Vec<PlanEvent>,
    sections: BTreeMap<String, Section>,
    crns: BTreeSet<String>,
}

impl CommittedSchedule {
    pub fn new(events: Vec<PlanEvent>, sections: impl IntoIterator<Item = Section>) -> Self {
        let crns = events
            .iter()
            .filter_map(|event| event.crn().map(str::to_owned))
            .collect();
        let sections = sections
            .into_iter()
            .map(|section| (section.crn.clone(), section))
            .collect();
        Self {
            events,
            sections,
            crns,
        }
    }

    pub fn events(&self) -> &[PlanEvent] {
        &self.events
    }

    pub fn unavailable_events(&self) -> impl Iterator<Item = &PlanEvent> {
        self.events.iter().filter(|event| event.is_unavailable())
    }

    pub fn course_events(&self) -> impl Iterator<Item = &PlanEvent> {
        self.events.iter().filter(|event| event.is_course())
    }

    /// Whether any committed course event carries this CRN.
    pub fn has_crn(&self, crn: &str) -> bool {
        self.crns.contains(crn)
    }

    pub fn section(&self, crn: &str) -> Option<&Section> {
        self.sections.get(crn)
    }

    /// Sections with at least one committed event, in CRN order.
    pub fn committed_sections(&self) -> impl Iterator<Item = &Section> {
        self.sections
            .values()
            .filter(|section| self.crns.contains(&section.crn))
    }

    /// Whether any committed section belongs to the given course.
    pub fn has_course_id(&self, course_id: &str) -> bool {
        self.committed_sections()
            .any(|section| section.course_id == course_id)
    }

    /// A copy of this snapshot with every event and section for one CRN
    /// removed; used to evaluate a committed section against "the rest".
    pub fn excluding_crn(&self, crn: &str) -> CommittedSchedule {
        let events = self
            .events
            .iter()
            .filter(|event| event.crn() != Some(crn))
            .cloned()
            .collect();
        let sections = self
            .sections
            .values()
            .filter(|section| section.crn != crn)
            .cloned();
        CommittedSchedule::new(events, sections)
    }
}

/// Derives the weekday and `HH:MM` time-of-day pair of a stored instant,
/// for matching one-off blocks against weekly meeting patterns.
fn instant_day_and_time(instant: NaiveDateTime) -> (chrono::Weekday, String) {
    let time = format!("{:02}:{:02}", instant.hour(), instant.minute());
    (instant.weekday(), time)
}

/// Classifies one section against a committed snapshot.
///
/// All four rules are evaluated independently; a section can report several
/// conflict types at once, one record per type with every counterpart
/// aggregated into `details`. Sections without a meeting pattern never
/// participate in the two time-based rules. Total over well-formed input.
pub fn classify_section(
    section: &Section,
    committed: &CommittedSchedule,
    corequisites: &[CourseRef],
) -> Vec<ConflictRecord> {
    let mut records = Vec::new();

    if committed.has_crn(&section.crn) {
        records.push(ConflictRecord {
            conflict_type: ConflictType::Duplicate,
            course_id: section.course_id.clone(),
            course_name: section.course.clone(),
            details: vec![ConflictParty {
                id: section.crn.clone(),
                name: section.course.clone(),
            }],
        });
    }

    if let Some((days, start, end)) = section.meeting() {
        let mut overlapping = Vec::new();
        for other in committed.committed_sections() {
            if other.crn == section.crn {
                continue;
            }
            let Some((other_days, other_start, other_end)) = other.meeting() else {
                continue;
            };
            let shares_day = days.iter().any(|day| other_days.contains(day));
            if shares_day && time_ranges_overlap(start, end, other_start, other_end) {
                overlapping.push(ConflictParty {
                    id: other.crn.clone(),
                    name: other.course.clone(),
                });
            }
        }
        if !overlapping.is_empty() {
            records.push(ConflictRecord {
                conflict_type: ConflictType::Overlap,
                course_id: section.course_id.clone(),
                course_name: section.course.clone(),
                details: overlapping,
            });
        }

        let mut blocked = Vec::new();
        for event in committed.unavailable_events() {
            let (day, block_start) = instant_day_and_time(event.start);
            let (_, block_end) = instant_day_and_time(event.end);
            if days.contains(&day) && time_ranges_overlap(start, end, &block_start, &block_end) {
                blocked.push(ConflictParty {
                    id: event.id.to_string(),
                    name: event.title.clone(),
                });
            }
        }
        if !blocked.is_empty() {
            records.push(ConflictRecord {
                conflict_type: ConflictType::UnavailableOverlap,
                course_id: section.course_id.clone(),
                course_name: section.course.clone(),
                details: blocked,
            });
        }
    }

    if !corequisites.is_empty() {
        let any_met = corequisites
            .iter()
            .any(|coreq| committed.has_course_id(&coreq.id));
        if !any_met {
            records.push(ConflictRecord {
                conflict_type: ConflictType::MissingCorequisite,
                course_id: section.course_id.clone(),
                course_name: section.course.clone(),
                details: corequisites
                    .iter()
                    .map(|coreq| ConflictParty {
                        id: coreq.id.clone(),
                        name: coreq.name.clone(),
                    })
                    .collect(),
            });
        }
    }

    records
}

/// The aggregated conflict state of a whole term plan.
#[derive(Debug, Clone, Default)]
pub struct ConflictReport {
    records: Vec<ConflictRecord>,
    flagged: BTreeSet<String>,
}

impl ConflictReport {
    pub fn records(&self) -> &[ConflictRecord] {
        &self.records
    }

    /// True iff any conflict record references the course, on either side
    /// of a deduplicated overlap. Used for calendar tinting.
    pub fn has_conflict(&self, course_id: &str) -> bool {
        self.flagged.contains(course_id)
    }

    /// Course ids referenced by at least one record.
    pub fn flagged_courses(&self) -> impl Iterator<Item = &str> {
        self.flagged.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Runs the classifier across every committed course and merges the
/// verdicts into one report.
///
/// Each course is evaluated against the committed set minus its own rows.
/// Pairwise overlaps are reported once per unordered pair, attributed to
/// the side whose CRN sorts first lexicographically; the counterpart still
/// shows up in `details` and in `has_conflict`. Output is deterministic for
/// a given snapshot.
pub fn compute_conflicts(
    committed: &CommittedSchedule,
    corequisites: &impl CorequisiteSource,
) -> ConflictReport {
    let mut records = Vec::new();
    let mut flagged = BTreeSet::new();

    // A CRN committed twice duplicates its per-weekday rows, so two course
    // events sharing a start instant mark a duplicate commitment.
    let mut occurrence_counts: HashMap<(&str, NaiveDateTime), u32> = HashMap::new();
    for event in committed.course_events() {
        if let Some(crn) = event.crn() {
            *occurrence_counts.entry((crn, event.start)).or_default() += 1;
        }
    }
    let duplicated: BTreeSet<&str> = occurrence_counts
        .iter()
        .filter(|(_, count)| **count > 1)
        .map(|((crn, _), _)| *crn)
        .collect();
    for crn in duplicated {
        let (course_id, course_name) = committed
            .section(crn)
            .map(|section| (section.course_id.clone(), section.course.clone()))
            .unwrap_or_else(|| (crn.to_owned(), crn.to_owned()));
        flagged.insert(course_id.clone());
        records.push(ConflictRecord {
            conflict_type: ConflictType::Duplicate,
            course_id,
            course_name: course_name.clone(),
            details: vec![ConflictParty {
                id: crn.to_owned(),
                name: course_name,
            }],
        });
    }

    for section in committed.committed_sections() {
        let rest = committed.excluding_crn(&section.crn);
        let coreq_list = corequisites.corequisites_for(&section.course_id);
        for mut record in classify_section(section, &rest, &coreq_list) {
            if record.conflict_type == ConflictType::Overlap {
                // Keep the pair only on its lexicographically-first side.
                record.details.retain(|party| {
                    if party.id.as_str() > section.crn.as_str() {
                        if let Some(other) = committed.section(&party.id) {
                            flagged.insert(other.course_id.clone());
                        }
                        true
                    } else {
                        false
                    }
                });
                if record.details.is_empty() {
                    continue;
                }
            }
            flagged.insert(record.course_id.clone());
            records.push(record);
        }
    }

    ConflictReport { records, flagged }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::types::PlanEventKind;
    use chrono::{NaiveDate, Weekday};
    use std::collections::HashMap;

    fn section(crn: &str, course: &str, days: &[Weekday], start: &str, end: &str) -> Section {
        Section {
            crn: crn.into(),
            course_id: course.replace(' ', ""),
            course: course.into(),
            title: format!("{course} title"),
            credits: 3.0,
            instruction_method: "Face To Face".into(),
            instruction_type: "Lecture".into(),
            term: "202515".into(),
            days: days.to_vec(),
            start_time: Some(start.into()),
            end_time: Some(end.into()),
            instructors: Vec::new(),
        }
    }

    fn async_section(crn: &str, course: &str) -> Section {
        Section {
            days: Vec::new(),
            start_time: None,
            end_time: None,
            ..section(crn, course, &[Weekday::Mon], "09:00", "10:00")
        }
    }

    fn course_events(next_id: &mut i64, section: &Section, term: crate::schedule::Term) -> Vec<PlanEvent> {
        crate::schedule::project_occurrences(section, term)
            .expect("timed section")
            .into_iter()
            .map(|placement| {
                let id = *next_id;
                *next_id += 1;
                PlanEvent {
                    id,
                    term_id: 1,
                    title: section.course.clone(),
                    kind: PlanEventKind::Course {
                        crn: section.crn.clone(),
                    },
                    start: placement.first.and_time(placement.start_time),
                    end: placement.first.and_time(placement.end_time),
                }
            })
            .collect()
    }

    fn unavailable(id: i64, title: &str, date: NaiveDate, start: &str, end: &str) -> PlanEvent {
        PlanEvent {
            id,
            term_id: 1,
            title: title.into(),
            kind: PlanEventKind::Unavailable,
            start: date.and_time(start.parse().unwrap()),
            end: date.and_time(end.parse().unwrap()),
        }
    }

    fn fall25() -> crate::schedule::Term {
        crate::schedule::Term::new(crate::schedule::Season::Fall, 2025)
    }

    fn snapshot(sections: &[&Section]) -> CommittedSchedule {
        let mut next_id = 1;
        let mut events = Vec::new();
        for section in sections {
            events.extend(course_events(&mut next_id, section, fall25()));
        }
        CommittedSchedule::new(events, sections.iter().map(|s| (*s).clone()))
    }

    fn no_coreqs() -> HashMap<String, Vec<CourseRef>> {
        HashMap::new()
    }

    #[test]
    fn test_candidate_duplicate_detection() {
        let committed = section("12345", "CS 260", &[Weekday::Mon], "09:00", "10:20");
        let snap = snapshot(&[&committed]);
        let records = classify_section(&committed, &snap, &[]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].conflict_type, ConflictType::Duplicate);
        assert_eq!(records[0].details[0].id, "12345");
    }

    #[test]
    fn test_double_add_reports_duplicate() {
        let cs = section("12345", "CS 260", &[Weekday::Mon], "09:00", "10:20");
        let mut next_id = 1;
        let mut events = course_events(&mut next_id, &cs, fall25());
        events.extend(course_events(&mut next_id, &cs, fall25()));
        let snap = CommittedSchedule::new(events, [cs]);

        let report = compute_conflicts(&snap, &no_coreqs());
        let dup: Vec<_> = report
            .records()
            .iter()
            .filter(|r| r.conflict_type == ConflictType::Duplicate)
            .collect();
        assert_eq!(dup.len(), 1);
        assert_eq!(dup[0].details[0].id, "12345");
    }

    #[test]
    fn test_course_course_overlap_scenario() {
        let a = section("1001", "CS 260", &[Weekday::Mon], "09:00", "10:20");
        let b = section("1002", "MATH 201", &[Weekday::Mon], "10:00", "11:15");
        let snap = snapshot(&[&a, &b]);

        let report = compute_conflicts(&snap, &no_coreqs());
        let overlaps: Vec<_> = report
            .records()
            .iter()
            .filter(|r| r.conflict_type == ConflictType::Overlap)
            .collect();
        // One record per unordered pair, attributed to the smaller CRN.
        assert_eq!(overlaps.len(), 1);
        assert_eq!(overlaps[0].course_id, "CS260");
        assert_eq!(overlaps[0].details[0].id, "1002");
        assert!(report.has_conflict("CS260"));
        assert!(report.has_conflict("MATH201"));
    }

    #[test]
    fn test_disjoint_days_never_overlap() {
        let a = section("1001", "CS 260", &[Weekday::Mon], "09:00", "10:20");
        let b = section("1002", "MATH 201", &[Weekday::Tue], "09:00", "10:20");
        let snap = snapshot(&[&a, &b]);
        assert!(compute_conflicts(&snap, &no_coreqs()).is_empty());
    }

    #[test]
    fn test_back_to_back_sections_do_not_conflict() {
        let a = section("1001", "CS 260", &[Weekday::Mon], "09:00", "10:00");
        let b = section("1002", "MATH 201", &[Weekday::Mon], "10:00", "11:00");
        let snap = snapshot(&[&a, &b]);
        assert!(compute_conflicts(&snap, &no_coreqs()).is_empty());
    }

    #[test]
    fn test_async_sections_skip_time_rules() {
        let a = async_section("1001", "CS 501");
        let b = section("1002", "MATH 201", &[Weekday::Mon], "09:00", "10:20");
        let mut next_id = 10;
        let mut events = course_events(&mut next_id, &b, fall25());
        // Async sections still occupy a status slot but have no event rows;
        // give it one row anyway to confirm the meeting() gate, not days.
        events.push(PlanEvent {
            id: 99,
            term_id: 1,
            title: a.course.clone(),
            kind: PlanEventKind::Course { crn: a.crn.clone() },
            start: "2025-09-01T00:00:00".parse().unwrap(),
            end: "2025-09-01T00:00:00".parse().unwrap(),
        });
        let snap = CommittedSchedule::new(events, [a, b]);
        assert!(compute_conflicts(&snap, &no_coreqs()).is_empty());
    }

    #[test]
    fn test_unavailable_overlap_scenario() {
        // Wednesday block 14:00-16:00 vs a Wednesday 15:00-16:00 course.
        let cs = section("1001", "CS 260", &[Weekday::Wed], "15:00", "16:00");
        let mut next_id = 1;
        let mut events = course_events(&mut next_id, &cs, fall25());
        let wednesday = NaiveDate::from_ymd_opt(2025, 9, 3).unwrap();
        events.push(unavailable(50, "Work shift", wednesday, "14:00:00", "16:00:00"));
        let snap = CommittedSchedule::new(events, [cs]);

        let report = compute_conflicts(&snap, &no_coreqs());
        assert_eq!(report.len(), 1);
        let record = &report.records()[0];
        assert_eq!(record.conflict_type, ConflictType::UnavailableOverlap);
        assert_eq!(record.course_id, "CS260");
        assert_eq!(record.details[0].id, "50");
        assert_eq!(record.details[0].name, "Work shift");
    }

    #[test]
    fn test_unavailable_on_other_weekday_ignored() {
        let cs = section("1001", "CS 260", &[Weekday::Wed], "15:00", "16:00");
        let mut next_id = 1;
        let mut events = course_events(&mut next_id, &cs, fall25());
        let thursday = NaiveDate::from_ymd_opt(2025, 9, 4).unwrap();
        events.push(unavailable(50, "Work shift", thursday, "14:00:00", "16:00:00"));
        let snap = CommittedSchedule::new(events, [cs]);
        assert!(compute_conflicts(&snap, &no_coreqs()).is_empty());
    }

    #[test]
    fn test_missing_corequisite_scenario() {
        let lecture = section("2001", "CHEM 101", &[Weekday::Tue], "09:00", "10:20");
        let lab = section("2002", "CHEM 101L", &[Weekday::Thu], "14:00", "16:00");
        let mut coreqs = HashMap::new();
        coreqs.insert(
            "CHEM101".to_string(),
            vec![CourseRef {
                id: "CHEM101L".into(),
                name: "CHEM 101 Lab".into(),
            }],
        );

        let snap = snapshot(&[&lecture]);
        let report = compute_conflicts(&snap, &coreqs);
        assert_eq!(report.len(), 1);
        let record = &report.records()[0];
        assert_eq!(record.conflict_type, ConflictType::MissingCorequisite);
        assert_eq!(record.course_id, "CHEM101");
        assert_eq!(
            record.details,
            vec![ConflictParty {
                id: "CHEM101L".into(),
                name: "CHEM 101 Lab".into()
            }]
        );

        // Committing the lab clears the record on recomputation.
        let snap = snapshot(&[&lecture, &lab]);
        assert!(compute_conflicts(&snap, &coreqs).is_empty());
    }

    #[test]
    fn test_simultaneous_conflict_types() {
        // A section overlapping both a course and an unavailable block
        // reports both types independently.
        let a = section("1001", "CS 260", &[Weekday::Mon], "09:00", "10:20");
        let b = section("1002", "MATH 201", &[Weekday::Mon], "10:00", "11:15");
        let mut next_id = 1;
        let mut events = course_events(&mut next_id, &a, fall25());
        events.extend(course_events(&mut next_id, &b, fall25()));
        let monday = NaiveDate::from_ymd_opt(2025, 9, 1).unwrap();
        events.push(unavailable(70, "Practice", monday, "09:30:00", "10:00:00"));
        let snap = CommittedSchedule::new(events, [a, b]);

        let report = compute_conflicts(&snap, &no_coreqs());
        let types: Vec<_> = report
            .records()
            .iter()
            .map(|record| record.conflict_type)
            .collect();
        assert!(types.contains(&ConflictType::Overlap));
        assert!(types.contains(&ConflictType::UnavailableOverlap));
    }

    #[test]
    fn test_report_is_stable_across_calls() {
        let a = section("1001", "CS 260", &[Weekday::Mon], "09:00", "10:20");
        let b = section("1002", "MATH 201", &[Weekday::Mon], "10:00", "11:15");
        let snap = snapshot(&[&a, &b]);
        let first = compute_conflicts(&snap, &no_coreqs());
        let second = compute_conflicts(&snap, &no_coreqs());
        assert_eq!(
            serde_json::to_value(first.records()).unwrap(),
            serde_json::to_value(second.records()).unwrap()
        );
    }
}
