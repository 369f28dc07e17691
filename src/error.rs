//! Error types for the finapp CLI.
//!
//! Most functions propagate `anyhow::Error` with context. The conditions that callers need to
//! distinguish programmatically are typed and can be recovered with `Error::downcast_ref`.

use std::fmt;
use std::fmt::{Display, Formatter};

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// A structural problem with the target sheet of an append. Both variants are raised before any
/// cell has been written, so the workbook is never left partially modified.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum WorkbookError {
    /// The named sheet does not exist in the workbook.
    SheetNotFound { sheet: String },
    /// A record key has no matching cell in the sheet's header row.
    ColumnNotFound { sheet: String, column: String },
}

impl Display for WorkbookError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            WorkbookError::SheetNotFound { sheet } => {
                write!(f, "The workbook has no sheet named '{sheet}'")
            }
            WorkbookError::ColumnNotFound { sheet, column } => {
                write!(
                    f,
                    "The header row of sheet '{sheet}' has no column named '{column}'"
                )
            }
        }
    }
}

impl std::error::Error for WorkbookError {}
