//! The write path: fetch the workbook, add one row in memory, re-upload the whole file.
//!
//! The upload is a single full-content replacement, so a failure anywhere leaves the remote file
//! in its prior state. There is no cross-session locking; two sessions appending concurrently race
//! and the later upload wins at whole-file granularity.

use crate::api::WorkbookStore;
use crate::model::Record;
use crate::{workbook, Result};
use anyhow::Context;
use tracing::{debug, info};

/// Appends exactly one row built from `record` to `sheet_name` of the store's workbook.
///
/// Validation happens against the in-memory copy before anything is written back: a missing sheet
/// or an unknown column aborts with the workbook untouched. On success the store has invalidated
/// its memoized copy, so the session's next fetch observes the new row.
pub async fn append_record(
    store: &mut (dyn WorkbookStore + Send),
    sheet_name: &str,
    record: &Record,
) -> Result<()> {
    anyhow::ensure!(!record.is_empty(), "Refusing to append an empty record");

    debug!("Fetching workbook from {}", store.describe());
    let bytes = store
        .fetch()
        .await
        .context("Unable to fetch the workbook for appending")?;

    let modified = workbook::append_row(&bytes, sheet_name, record)?;

    store
        .upload(&modified)
        .await
        .context("Unable to upload the modified workbook")?;
    info!(
        "Appended 1 row to sheet '{sheet_name}' of {}",
        store.describe()
    );
    Ok(())
}
