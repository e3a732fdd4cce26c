//! Term schedule planner: conflict detection and recurring-calendar
//! projection for course sections.
//!
//! The `schedule` module is the pure core: time-interval utilities, the
//! term-code mapping, the recurrence projector, and the conflict
//! classifier/aggregator. The `db` and `catalog` modules are its data
//! sources (committed plan state and the read-only section catalog), and
//! `server` exposes the whole thing over HTTP.

pub mod catalog;
pub mod db;
pub mod schedule;
pub mod server;
pub mod types;
