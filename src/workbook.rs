//! In-memory workbook codec.
//!
//! The store layer deals in opaque byte blobs; this module is the only place that knows those
//! bytes are an xlsx package. Reading extracts one `RawTable` per sheet. Appending opens the
//! package, adds a single row to one sheet and reserializes the whole thing, leaving every other
//! sheet untouched.

use crate::error::WorkbookError;
use crate::model::{RawTable, Record};
use crate::Result;
use anyhow::Context;
use calamine::{Data, Reader, Xlsx};
use chrono::NaiveDate;
use std::io::Cursor;
use umya_spreadsheet::{reader, writer};

/// Extracts every sheet of the workbook as a raw table, in workbook sheet order. The first row of
/// each sheet is taken as its header row; a sheet with no rows yields an empty table.
pub fn read_tables(bytes: &[u8]) -> Result<Vec<RawTable>> {
    let mut workbook: Xlsx<_> =
        Xlsx::new(Cursor::new(bytes)).context("Unable to open the workbook bytes as xlsx")?;
    let names = workbook.sheet_names().to_owned();
    let mut tables = Vec::with_capacity(names.len());
    for name in names {
        let range = workbook
            .worksheet_range(&name)
            .with_context(|| format!("Unable to read sheet '{name}'"))?;
        let mut rows = range.rows();
        let headers: Vec<String> = match rows.next() {
            Some(header_row) => header_row.iter().map(render_cell).collect(),
            None => Vec::new(),
        };
        let data: Vec<Vec<String>> = rows
            .map(|row| row.iter().map(render_cell).collect())
            .collect();
        tables.push(RawTable::new(name, headers, data));
    }
    Ok(tables)
}

/// Extracts a single sheet by name.
pub fn read_table(bytes: &[u8], sheet_name: &str) -> Result<RawTable> {
    read_tables(bytes)?
        .into_iter()
        .find(|t| t.name() == sheet_name)
        .ok_or_else(|| {
            WorkbookError::SheetNotFound {
                sheet: sheet_name.to_string(),
            }
            .into()
        })
}

/// Renders a cell as text. Date cells come back as ISO dates; integral floats lose the trailing
/// `.0` so that an identifying column coerces to clean text.
fn render_cell(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 && f.abs() < 1e15 {
                format!("{}", *f as i64)
            } else {
                f.to_string()
            }
        }
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => match excel_serial_to_date(dt.as_f64()) {
            Some(date) => date.format("%Y-%m-%d").to_string(),
            None => dt.as_f64().to_string(),
        },
        Data::DateTimeIso(s) => s.to_string(),
        Data::DurationIso(s) => s.to_string(),
        Data::Error(e) => format!("{e:?}"),
    }
}

/// Excel stores dates as serial day counts from the 1899-12-30 epoch.
fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    base.checked_add_signed(chrono::Duration::days(serial as i64))
}

/// Appends `record` as one new row to `sheet_name` and returns the reserialized workbook bytes.
///
/// Every record key is resolved against the sheet's header row (row 1) before the first cell is
/// written, so a bad key aborts with `ColumnNotFound` and no partial row. The next row index is
/// the sheet's current highest row plus one; columns the record does not name stay blank.
pub fn append_row(bytes: &[u8], sheet_name: &str, record: &Record) -> Result<Vec<u8>> {
    let mut book = reader::xlsx::read_reader(Cursor::new(bytes), true)
        .context("Unable to open the workbook bytes as xlsx")?;
    let sheet = book
        .get_sheet_by_name_mut(sheet_name)
        .ok_or_else(|| WorkbookError::SheetNotFound {
            sheet: sheet_name.to_string(),
        })?;

    let header_count = sheet.get_highest_column();
    let mut placements: Vec<(u32, &str)> = Vec::with_capacity(record.len());
    for (key, value) in record.fields() {
        let column = (1..=header_count)
            .find(|&col| sheet.get_value((col, 1)) == key)
            .ok_or_else(|| WorkbookError::ColumnNotFound {
                sheet: sheet_name.to_string(),
                column: key.to_string(),
            })?;
        placements.push((column, value));
    }

    let next_row = sheet.get_highest_row() + 1;
    for (column, value) in placements {
        let cell = sheet.get_cell_mut((column, next_row));
        // Numeric cells stay numeric so the sheet's own formulas keep working.
        match value.parse::<f64>() {
            Ok(number) => {
                cell.set_value_number(number);
            }
            Err(_) => {
                cell.set_value(value);
            }
        }
    }

    let mut out = Cursor::new(Vec::new());
    writer::xlsx::write_writer(&book, &mut out).context("Unable to serialize the workbook")?;
    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::workbook_fixture;

    #[test]
    fn test_read_tables_all_sheets() {
        let bytes = workbook_fixture();
        let tables = read_tables(&bytes).unwrap();
        let names: Vec<&str> = tables.iter().map(|t| t.name()).collect();
        assert!(names.contains(&"Movimientos"));
        assert!(names.contains(&"Registro"));
    }

    #[test]
    fn test_read_table_headers_and_rows() {
        let bytes = workbook_fixture();
        let table = read_table(&bytes, "Movimientos").unwrap();
        assert_eq!(
            table.headers(),
            &["Fecha", "Concepto", "Categoría", "Descripción", "Monto"]
        );
        assert_eq!(table.rows().len(), 3);
        assert_eq!(table.cell(0, 1), "Ingreso");
        // numeric cell renders without a trailing .0
        assert_eq!(table.cell(0, 4), "1000");
    }

    #[test]
    fn test_read_table_missing_sheet() {
        let bytes = workbook_fixture();
        let err = read_table(&bytes, "NoExiste").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<WorkbookError>(),
            Some(WorkbookError::SheetNotFound { .. })
        ));
    }

    #[test]
    fn test_append_row_adds_exactly_one_row() {
        let bytes = workbook_fixture();
        let before = read_table(&bytes, "Registro").unwrap();
        let record: Record = [
            ("Fecha", "05/03/2024"),
            ("Categoría", "Comida"),
            ("Descripción", "Tacos"),
            ("Monto", "150"),
        ]
        .into_iter()
        .collect();

        let new_bytes = append_row(&bytes, "Registro", &record).unwrap();
        let after = read_table(&new_bytes, "Registro").unwrap();

        assert_eq!(after.rows().len(), before.rows().len() + 1);
        // prior rows are unchanged
        for (ix, row) in before.rows().iter().enumerate() {
            assert_eq!(row, &after.rows()[ix]);
        }
        let new_row = after.rows().last().unwrap();
        assert_eq!(new_row[0], "05/03/2024");
        assert_eq!(new_row[1], "Comida");
        assert_eq!(new_row[2], "Tacos");
        assert_eq!(new_row[3], "150");
    }

    #[test]
    fn test_append_row_leaves_unnamed_columns_blank() {
        let bytes = workbook_fixture();
        let record: Record = [("Fecha", "05/03/2024")].into_iter().collect();
        let new_bytes = append_row(&bytes, "Registro", &record).unwrap();
        let after = read_table(&new_bytes, "Registro").unwrap();
        let new_row = after.rows().last().unwrap();
        assert_eq!(new_row[0], "05/03/2024");
        assert!(new_row.iter().skip(1).all(|c| c.is_empty()));
    }

    #[test]
    fn test_append_row_unknown_column_aborts_before_write() {
        let bytes = workbook_fixture();
        let record: Record = [("Fecha", "05/03/2024"), ("Impuesto", "16")]
            .into_iter()
            .collect();
        let err = append_row(&bytes, "Registro", &record).unwrap_err();
        match err.downcast_ref::<WorkbookError>() {
            Some(WorkbookError::ColumnNotFound { column, .. }) => {
                assert_eq!(column, "Impuesto")
            }
            other => panic!("expected ColumnNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_append_row_missing_sheet() {
        let bytes = workbook_fixture();
        let record: Record = [("Fecha", "05/03/2024")].into_iter().collect();
        let err = append_row(&bytes, "NoExiste", &record).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<WorkbookError>(),
            Some(WorkbookError::SheetNotFound { .. })
        ));
    }

    #[test]
    fn test_append_does_not_disturb_other_sheets() {
        let bytes = workbook_fixture();
        let tracking_before = read_table(&bytes, "Movimientos").unwrap();
        let record: Record = [("Fecha", "05/03/2024")].into_iter().collect();
        let new_bytes = append_row(&bytes, "Registro", &record).unwrap();
        let tracking_after = read_table(&new_bytes, "Movimientos").unwrap();
        assert_eq!(tracking_before, tracking_after);
    }
}
