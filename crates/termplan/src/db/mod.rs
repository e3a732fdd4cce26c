/// Store for committed plan state: terms, plan events, section statuses

mod types;

pub use types::{DbPlanEvent, DbSectionStatus};

use chrono::NaiveDateTime;
use rusqlite::{Connection, Result};
use std::sync::Mutex;

use crate::schedule::{Season, Section};

const SCHEMA_SQL: &str = include_str!("../../../../sql/init_planner.sql");

pub struct PlannerDb {
    db: Mutex<Connection>,
}

impl PlannerDb {
    /// Creates a new PlannerDb and initializes the database schema
    pub fn new(db_path: &str) -> Self {
        let conn = Connection::open(db_path).expect("Failed to open database");
        Self::init(conn)
    }

    /// An in-memory store, used by tests
    pub fn in_memory() -> Self {
        let conn = Connection::open_in_memory().expect("Failed to open in-memory database");
        Self::init(conn)
    }

    fn init(conn: Connection) -> Self {
        conn.execute_batch(SCHEMA_SQL)
            .expect("Failed to initialize database schema");
        Self {
            db: Mutex::new(conn),
        }
    }

    /// Looks up a term row, returning its id if it exists
    pub fn find_term(&self, season: Season, year: i32) -> Result<Option<i64>> {
        let db = self.db.lock().unwrap();
        let mut stmt = db.prepare("SELECT term_id FROM terms WHERE season = ? AND year = ?")?;
        let mut rows = stmt.query((season.as_str(), year))?;
        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    /// Finds or creates the term row for a season/year pair
    pub fn find_or_create_term(&self, season: Season, year: i32) -> Result<i64> {
        if let Some(term_id) = self.find_term(season, year)? {
            return Ok(term_id);
        }
        let db = self.db.lock().unwrap();
        db.execute(
            "INSERT OR IGNORE INTO terms (season, year, created_at) VALUES (?1, ?2, datetime('now'))",
            (season.as_str(), year),
        )?;
        db.query_row(
            "SELECT term_id FROM terms WHERE season = ? AND year = ?",
            (season.as_str(), year),
            |row| row.get(0),
        )
    }

    /// Gets all plan events for a term, in insertion order
    pub fn list_events_for_term(&self, term_id: i64) -> Result<Vec<DbPlanEvent>> {
        let db = self.db.lock().unwrap();
        let mut stmt = db.prepare(
            "SELECT event_id, term_id, event_type, crn, title, start_at, end_at
             FROM plan_events
             WHERE term_id = ?
             ORDER BY event_id",
        )?;

        let events = stmt.query_map([term_id], |row| {
            Ok(DbPlanEvent {
                event_id: row.get(0)?,
                term_id: row.get(1)?,
                event_type: row.get(2)?,
                crn: row.get(3)?,
                title: row.get(4)?,
                start_at: row.get(5)?,
                end_at: row.get(6)?,
            })
        })?;

        events.collect()
    }

    /// Gets the section membership rows for a term
    pub fn list_section_statuses(&self, term_id: i64) -> Result<Vec<DbSectionStatus>> {
        let db = self.db.lock().unwrap();
        let mut stmt = db.prepare(
            "SELECT term_id, crn, status, liked FROM term_sections WHERE term_id = ? ORDER BY crn",
        )?;

        let statuses = stmt.query_map([term_id], |row| {
            Ok(DbSectionStatus {
                term_id: row.get(0)?,
                crn: row.get(1)?,
                status: row.get(2)?,
                liked: row.get(3)?,
            })
        })?;

        statuses.collect()
    }

    /// Checks whether a CRN is already planned for a term. Used as the
    /// duplicate-add precondition before any mutation.
    pub fn crn_is_planned(&self, term_id: i64, crn: &str) -> bool {
        let db = self.db.lock().unwrap();
        let mut stmt = db
            .prepare(
                "SELECT COUNT(*) FROM term_sections
                 WHERE term_id = ? AND crn = ? AND status = 'planned'",
            )
            .unwrap();
        let count: i64 = stmt
            .query_row((term_id, crn), |row| row.get(0))
            .unwrap_or(0);
        count > 0
    }

    /// Commits a course to the plan: one event row per meeting weekday plus
    /// the planned status row, atomically. Downstream readers see either
    /// every row for the CRN or none.
    pub fn add_course(
        &self,
        term_id: i64,
        section: &Section,
        occurrences: &[(NaiveDateTime, NaiveDateTime)],
    ) -> Result<()> {
        let mut db = self.db.lock().unwrap();
        let tx = db.transaction()?;

        for (start, end) in occurrences {
            tx.execute(
                "INSERT INTO plan_events (term_id, event_type, crn, title, start_at, end_at, created_at)
                 VALUES (?1, 'course', ?2, ?3, ?4, ?5, datetime('now'))",
                (term_id, &section.crn, &section.course, start, end),
            )?;
        }

        tx.execute(
            "INSERT INTO term_sections (term_id, crn, status, created_at)
             VALUES (?1, ?2, 'planned', datetime('now'))
             ON CONFLICT(term_id, crn) DO UPDATE SET status = 'planned'",
            (term_id, &section.crn),
        )?;

        tx.commit()
    }

    /// Removes a course as a unit: every event row sharing the CRN plus the
    /// status row, atomically. Returns whether anything was removed.
    pub fn remove_course(&self, term_id: i64, crn: &str) -> Result<bool> {
        let mut db = self.db.lock().unwrap();
        let tx = db.transaction()?;

        let removed = tx.execute(
            "DELETE FROM plan_events WHERE term_id = ?1 AND crn = ?2",
            (term_id, crn),
        )?;
        tx.execute(
            "DELETE FROM term_sections WHERE term_id = ?1 AND crn = ?2",
            (term_id, crn),
        )?;

        tx.commit()?;
        Ok(removed > 0)
    }

    /// Adds a one-off unavailable block, returning its event id
    pub fn add_unavailable(
        &self,
        term_id: i64,
        title: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<i64> {
        let db = self.db.lock().unwrap();
        db.execute(
            "INSERT INTO plan_events (term_id, event_type, crn, title, start_at, end_at, created_at)
             VALUES (?1, 'unavailable', NULL, ?2, ?3, ?4, datetime('now'))",
            (term_id, title, start, end),
        )?;
        Ok(db.last_insert_rowid())
    }

    /// Moves/resizes an unavailable block. Course rows are never touched.
    /// Returns whether the event existed.
    pub fn update_unavailable(
        &self,
        term_id: i64,
        event_id: i64,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<bool> {
        let db = self.db.lock().unwrap();
        let updated = db.execute(
            "UPDATE plan_events SET start_at = ?1, end_at = ?2
             WHERE term_id = ?3 AND event_id = ?4 AND event_type = 'unavailable'",
            (start, end, term_id, event_id),
        )?;
        Ok(updated > 0)
    }

    /// Removes an unavailable block. Returns whether the event existed.
    pub fn remove_unavailable(&self, term_id: i64, event_id: i64) -> Result<bool> {
        let db = self.db.lock().unwrap();
        let removed = db.execute(
            "DELETE FROM plan_events
             WHERE term_id = ?1 AND event_id = ?2 AND event_type = 'unavailable'",
            (term_id, event_id),
        )?;
        Ok(removed > 0)
    }

    /// Sets the liked flag on a section membership row
    pub fn set_liked(&self, term_id: i64, crn: &str, liked: bool) -> Result<bool> {
        let db = self.db.lock().unwrap();
        let updated = db.execute(
            "UPDATE term_sections SET liked = ?1 WHERE term_id = ?2 AND crn = ?3",
            (liked, term_id, crn),
        )?;
        Ok(updated > 0)
    }
}
