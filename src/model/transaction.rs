use crate::model::{Amount, Concepto, RawTable};
use crate::Result;
use anyhow::Context;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use std::str::FromStr;

pub(crate) const FECHA_STR: &str = "Fecha";
pub(crate) const CONCEPTO_STR: &str = "Concepto";
pub(crate) const CATEGORIA_STR: &str = "Categoría";
pub(crate) const DESCRIPCION_STR: &str = "Descripción";
pub(crate) const MONTO_STR: &str = "Monto";

/// Represents a single row from the consolidated transaction table.
///
/// `fecha` is `None` when the cell could not be parsed as a day-first date. Such rows still count
/// toward the scalar KPIs but are excluded from the time-indexed aggregates.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize)]
pub struct Transaction {
    pub(crate) fecha: Option<NaiveDate>,
    pub(crate) concepto: Concepto,
    pub(crate) categoria: String,
    pub(crate) descripcion: String,
    pub(crate) monto: Amount,
    /// Columns the tracking sheet carries that this tool does not interpret.
    pub(crate) other_fields: BTreeMap<String, String>,
}

impl Transaction {
    pub fn new(
        fecha: Option<NaiveDate>,
        concepto: Concepto,
        categoria: impl Into<String>,
        descripcion: impl Into<String>,
        monto: Amount,
    ) -> Self {
        Self {
            fecha,
            concepto,
            categoria: categoria.into(),
            descripcion: descripcion.into(),
            monto,
            other_fields: BTreeMap::new(),
        }
    }

    pub fn fecha(&self) -> Option<NaiveDate> {
        self.fecha
    }

    pub fn concepto(&self) -> &Concepto {
        &self.concepto
    }

    pub fn categoria(&self) -> &str {
        &self.categoria
    }

    pub fn monto(&self) -> Amount {
        self.monto
    }

    /// Parses every row of a consolidated table. Row order is preserved.
    ///
    /// Unparseable dates become the `None` sentinel rather than an error; a malformed amount is an
    /// error, because a sum over silently-dropped amounts would be wrong without any sign of it.
    pub fn from_table(table: &RawTable) -> Result<Vec<Transaction>> {
        let headers = table.headers();
        table
            .rows()
            .iter()
            .enumerate()
            .map(|(row_ix, row)| {
                Self::from_row(headers, row)
                    .with_context(|| format!("Failed to parse transaction row {}", row_ix + 2))
            })
            .collect()
    }

    /// Builds one transaction from a data row, mapping cells to fields by header name.
    pub fn from_row<S1, S2>(headers: &[S1], row: &[S2]) -> Result<Transaction>
    where
        S1: AsRef<str>,
        S2: AsRef<str>,
    {
        let mut transaction = Transaction::default();
        for (ix, header) in headers.iter().enumerate() {
            let value = row.get(ix).map(|v| v.as_ref()).unwrap_or("");
            transaction.set_with_header(header.as_ref(), value)?;
        }
        Ok(transaction)
    }

    fn set_with_header(&mut self, header: &str, value: &str) -> Result<()> {
        match header {
            FECHA_STR => self.fecha = parse_dayfirst(value),
            CONCEPTO_STR => self.concepto = Concepto::from(value),
            CATEGORIA_STR => self.categoria = value.to_string(),
            DESCRIPCION_STR => self.descripcion = value.to_string(),
            MONTO_STR => {
                self.monto = Amount::from_str(value)
                    .map_err(|e| anyhow::anyhow!("Invalid amount '{value}': {e}"))?
            }
            other => {
                let _ = self
                    .other_fields
                    .insert(other.to_string(), value.to_string());
            }
        }
        Ok(())
    }
}

/// Parses a date cell the way the tracking sheet writes them: day first.
///
/// ISO dates are also accepted because that is how date cells come back out of the workbook
/// reader. Anything else is `None` -- the row is kept, only its date is unusable.
pub fn parse_dayfirst(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    // A datetime cell renders with a time suffix; the date part is all we keep.
    let date_part = s.split_whitespace().next().unwrap_or(s);
    const FORMATS: &[&str] = &["%d/%m/%Y", "%d-%m-%Y", "%d/%m/%y", "%Y-%m-%d"];
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
}
