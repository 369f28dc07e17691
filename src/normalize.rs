//! Consolidation of raw sheet extracts into the single table all aggregation runs on.
//!
//! Upstream exports vary week to week: stray empty-header columns, noise columns, sheets that do
//! not belong to the period at all. The normalizer flattens that into one predictable table.

use crate::model::RawTable;
use tracing::debug;

/// Column-name prefix a spreadsheet export produces for an empty header cell.
const UNNAMED_PREFIX: &str = "Unnamed";

/// Noise columns that are dropped whenever they appear.
const DROP_COLUMNS: &[&str] = &["Metrics"];

/// Consolidates raw tables into one, keyed on an identifying column.
///
/// A table that lacks the identifying column is skipped entirely; that means "not applicable this
/// period", not an error. Within kept tables, unnamed-placeholder columns and known-noise columns
/// are stripped, and the identifying column is coerced to trimmed text. Row order in the output is
/// the concatenation order of the inputs. No dedup, no sort.
#[derive(Debug, Clone)]
pub struct Normalizer {
    id_column: String,
}

impl Default for Normalizer {
    fn default() -> Self {
        // The accounting-week marker of the weekly exports.
        Self::new("Semana Contable")
    }
}

impl Normalizer {
    pub fn new(id_column: impl Into<String>) -> Self {
        Self {
            id_column: id_column.into(),
        }
    }

    pub fn id_column(&self) -> &str {
        &self.id_column
    }

    /// Pure transform: raw extracts in, one consolidated table out.
    pub fn consolidate(&self, tables: &[RawTable]) -> RawTable {
        let mut headers: Vec<String> = Vec::new();
        let mut stripped: Vec<RawTable> = Vec::new();

        for table in tables {
            if !table.has_column(&self.id_column) {
                debug!(
                    "Skipping sheet '{}': no '{}' column",
                    table.name(),
                    self.id_column
                );
                continue;
            }
            let cleaned = self.strip(table.clone());
            for header in cleaned.headers() {
                if !headers.contains(header) {
                    headers.push(header.clone());
                }
            }
            stripped.push(cleaned);
        }

        // Align every kept row to the unioned header list; a table that lacks one of the unioned
        // columns contributes blank cells there.
        let mut out = RawTable::new("consolidated", headers.clone(), Vec::new());
        for table in &stripped {
            let positions: Vec<Option<usize>> = headers
                .iter()
                .map(|h| table.column_index(h))
                .collect();
            for row_ix in 0..table.rows().len() {
                let row: Vec<String> = positions
                    .iter()
                    .map(|pos| match pos {
                        Some(col) => table.cell(row_ix, *col).to_string(),
                        None => String::new(),
                    })
                    .collect();
                out.push_row(row);
            }
        }
        out
    }

    fn strip(&self, mut table: RawTable) -> RawTable {
        loop {
            let doomed = table.headers().iter().position(|h| {
                h.starts_with(UNNAMED_PREFIX) || DROP_COLUMNS.contains(&h.as_str())
            });
            match doomed {
                Some(ix) => table.remove_column(ix),
                None => break,
            }
        }
        if let Some(id_ix) = table.column_index(&self.id_column) {
            table.map_column(id_ix, |cell| cell.trim().to_string());
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weekly(name: &str, headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable::new(
            name,
            headers.iter().copied(),
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect::<Vec<Vec<String>>>(),
        )
    }

    #[test]
    fn test_table_without_id_column_is_skipped() {
        let with_id = weekly(
            "S1",
            &["Semana Contable", "Monto"],
            &[&["W1", "10"], &["W2", "20"]],
        );
        let without_id = weekly("S2", &["Monto"], &[&["999"]]);

        let out = Normalizer::default().consolidate(&[with_id, without_id]);
        assert_eq!(out.rows().len(), 2);
        assert_eq!(out.cell(0, 1), "10");
        assert_eq!(out.cell(1, 1), "20");
    }

    #[test]
    fn test_unnamed_columns_never_survive() {
        let table = weekly(
            "S1",
            &["Unnamed: 0", "Semana Contable", "Monto", "Unnamed: 3"],
            &[&["x", "W1", "10", "y"]],
        );
        let out = Normalizer::default().consolidate(&[table]);
        assert_eq!(out.headers(), &["Semana Contable", "Monto"]);
        assert_eq!(out.rows()[0], vec!["W1".to_string(), "10".to_string()]);
    }

    #[test]
    fn test_noise_columns_dropped() {
        let table = weekly(
            "S1",
            &["Semana Contable", "Metrics", "Monto"],
            &[&["W1", "noise", "10"]],
        );
        let out = Normalizer::default().consolidate(&[table]);
        assert_eq!(out.headers(), &["Semana Contable", "Monto"]);
    }

    #[test]
    fn test_row_order_is_concatenation_order() {
        let a = weekly("A", &["Semana Contable"], &[&["1"], &["2"]]);
        let b = weekly("B", &["Semana Contable"], &[&["3"]]);
        let out = Normalizer::default().consolidate(&[a, b]);
        let col: Vec<&str> = (0..3).map(|r| out.cell(r, 0)).collect();
        assert_eq!(col, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_id_column_coerced_to_trimmed_text() {
        let table = weekly("S1", &["Semana Contable"], &[&["  W1  "]]);
        let out = Normalizer::default().consolidate(&[table]);
        assert_eq!(out.cell(0, 0), "W1");
    }

    #[test]
    fn test_varying_columns_are_unioned() {
        let a = weekly(
            "A",
            &["Semana Contable", "Monto"],
            &[&["W1", "10"]],
        );
        let b = weekly(
            "B",
            &["Semana Contable", "Categoría"],
            &[&["W2", "Renta"]],
        );
        let out = Normalizer::default().consolidate(&[a, b]);
        assert_eq!(out.headers(), &["Semana Contable", "Monto", "Categoría"]);
        assert_eq!(out.cell(0, 2), "");
        assert_eq!(out.cell(1, 1), "");
        assert_eq!(out.cell(1, 2), "Renta");
    }

    #[test]
    fn test_custom_id_column() {
        let tracking = weekly(
            "Movimientos",
            &["Fecha", "Monto"],
            &[&["05/01/2024", "10"]],
        );
        let registro = weekly("Registro", &["Descripción"], &[&["ignored"]]);
        let out = Normalizer::new("Fecha").consolidate(&[tracking, registro]);
        assert_eq!(out.rows().len(), 1);
        assert_eq!(out.cell(0, 0), "05/01/2024");
    }

    #[test]
    fn test_empty_input() {
        let out = Normalizer::default().consolidate(&[]);
        assert!(out.is_empty());
        assert!(out.headers().is_empty());
    }
}
