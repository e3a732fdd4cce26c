//! Shared application state handed to every endpoint handler.

use crate::catalog::CatalogIndex;
use crate::db::PlannerDb;
use crate::server::cache::ConflictCache;

pub struct AppState {
    /// Committed plan state (terms, plan events, section statuses)
    pub db: PlannerDb,
    /// Read-only section and corequisite source
    pub catalog: CatalogIndex,
    /// Per-term conflict reports, invalidated on every plan mutation
    pub conflict_cache: ConflictCache,
}
