// src/core/migrations/completion_flag.rs

//! Moves `Data_entry_completion_status` out of instrument documents and into the
//! `Required_elements_completed` flag column.
//!
//! `Complete` becomes `Y`, `Incomplete` becomes `N`. Any other value sets no flag,
//! but the legacy key is still removed from the document.

use crate::core::ToolkitError;
use crate::core::storage::RecordStore;
use crate::core::toolkit::accessor;
use crate::core::value::CompletionFlag;
use serde::Serialize;
use tracing::{debug, info};

pub const LEGACY_STATUS_FIELD: &str = "Data_entry_completion_status";

/// Counters describing what a migration run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    pub records_scanned: u64,
    pub flags_set: u64,
    pub documents_updated: u64,
}

/// Runs the migration over every instrument in `store`.
///
/// Safe to re-run: records without the legacy field are left untouched.
pub fn migrate_completion_flag<S: RecordStore>(store: &S) -> Result<MigrationReport, ToolkitError> {
    let mut report = MigrationReport::default();

    for instrument in store.instruments()? {
        for record in store.fetch_all(&instrument)? {
            report.records_scanned += 1;
            let Some(status) = accessor::get(&record.document, LEGACY_STATUS_FIELD) else {
                continue;
            };

            if let Some(flag) = CompletionFlag::from_legacy_status(status)
                && store.set_completion_flag(&instrument, &record.comment_id, flag)?
            {
                debug!(instrument = %instrument, comment_id = %record.comment_id, %flag, "flag set");
                report.flags_set += 1;
            }

            if let Some(document) = accessor::drop(&record.document, LEGACY_STATUS_FIELD)
                && store.update_record(&instrument, &record.comment_id, &document)?
            {
                report.documents_updated += 1;
            }
        }
    }

    info!(
        records_scanned = report.records_scanned,
        flags_set = report.flags_set,
        documents_updated = report.documents_updated,
        "completion flag migration finished"
    );
    Ok(report)
}
