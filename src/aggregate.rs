//! Scalar KPIs and grouped aggregates over the consolidated transaction table.
//!
//! Everything here is derived and recomputed on every refresh; nothing is persisted. Sums are
//! exact `Decimal` arithmetic, so `balance == total_ingresos - total_gastos` holds without
//! rounding drift.

use crate::model::{Amount, Concepto, Transaction};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

/// Optional row filters, applied before any aggregation. Both default to "no filter" and compose
/// with AND semantics.
#[derive(Debug, Default, Clone)]
pub struct FilterSpec {
    category: Option<String>,
    /// First-of-month date; rows whose date falls in this calendar month match. A row with an
    /// unparseable date can never match a month filter.
    month: Option<NaiveDate>,
}

impl FilterSpec {
    pub fn new(category: Option<String>, month: Option<NaiveDate>) -> Self {
        Self {
            category,
            month: month.map(month_of),
        }
    }

    fn matches(&self, transaction: &Transaction) -> bool {
        if let Some(category) = &self.category {
            if transaction.categoria() != category {
                return false;
            }
        }
        if let Some(month) = self.month {
            match transaction.fecha() {
                Some(fecha) if month_of(fecha) == month => {}
                _ => return false,
            }
        }
        true
    }
}

/// The three headline scalars.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize)]
pub struct KpiSet {
    pub total_ingresos: Amount,
    pub total_gastos: Amount,
    pub balance: Amount,
}

/// One point of the (date, concept) daily series.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct DailyPoint {
    pub fecha: NaiveDate,
    pub concepto: Concepto,
    pub monto: Amount,
}

/// One point of a month-keyed series. `mes` is rendered `YYYY-MM`.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct MonthlyPoint {
    pub mes: String,
    pub clave: String,
    pub monto: Amount,
}

/// One row of the per-category totals view.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub categoria: String,
    pub monto: Amount,
}

/// Everything the dashboard renders, computed in one pass over the filtered rows.
#[derive(Debug, Default, Clone, Serialize)]
pub struct Summary {
    pub kpis: KpiSet,
    pub daily: Vec<DailyPoint>,
    pub monthly_by_categoria: Vec<MonthlyPoint>,
    pub monthly_by_concepto: Vec<MonthlyPoint>,
    pub by_categoria: Vec<CategoryTotal>,
}

impl Summary {
    pub fn compute(transactions: &[Transaction], filter: &FilterSpec) -> Summary {
        let rows: Vec<&Transaction> = transactions
            .iter()
            .filter(|t| filter.matches(t))
            .collect();
        Summary {
            kpis: kpis(&rows),
            daily: daily_series(&rows),
            monthly_by_categoria: monthly_by_categoria(&rows),
            monthly_by_concepto: monthly_by_concepto(&rows),
            by_categoria: by_categoria_total(&rows, false),
        }
    }
}

/// Calendar-month truncation.
pub fn month_of(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}

fn kpis(rows: &[&Transaction]) -> KpiSet {
    let total_ingresos: Amount = rows
        .iter()
        .filter(|t| t.concepto().is_ingreso())
        .map(|t| t.monto())
        .sum();
    let total_gastos: Amount = rows
        .iter()
        .filter(|t| t.concepto().is_gasto())
        .map(|t| t.monto())
        .sum();
    KpiSet {
        total_ingresos,
        total_gastos,
        balance: total_ingresos - total_gastos,
    }
}

/// Sum by (date, concept). Rows with the unparseable-date sentinel are left out of the series; the
/// scalar KPIs above still counted them.
fn daily_series(rows: &[&Transaction]) -> Vec<DailyPoint> {
    let mut grouped: BTreeMap<(NaiveDate, Concepto), Amount> = BTreeMap::new();
    for t in rows {
        if !t.concepto().is_tracked() {
            continue;
        }
        let Some(fecha) = t.fecha() else { continue };
        *grouped
            .entry((fecha, t.concepto().clone()))
            .or_default() += t.monto();
    }
    grouped
        .into_iter()
        .map(|((fecha, concepto), monto)| DailyPoint {
            fecha,
            concepto,
            monto,
        })
        .collect()
}

/// Expense rows summed by (month, category).
fn monthly_by_categoria(rows: &[&Transaction]) -> Vec<MonthlyPoint> {
    let mut grouped: BTreeMap<(NaiveDate, String), Amount> = BTreeMap::new();
    for t in rows {
        if !t.concepto().is_gasto() {
            continue;
        }
        let Some(fecha) = t.fecha() else { continue };
        *grouped
            .entry((month_of(fecha), t.categoria().to_string()))
            .or_default() += t.monto();
    }
    monthly_points(grouped)
}

/// Income and expense rows summed by (month, concept).
fn monthly_by_concepto(rows: &[&Transaction]) -> Vec<MonthlyPoint> {
    let mut grouped: BTreeMap<(NaiveDate, String), Amount> = BTreeMap::new();
    for t in rows {
        if !t.concepto().is_tracked() {
            continue;
        }
        let Some(fecha) = t.fecha() else { continue };
        *grouped
            .entry((month_of(fecha), t.concepto().to_string()))
            .or_default() += t.monto();
    }
    monthly_points(grouped)
}

/// Totals per category. With `solo_gasto` the view is restricted to expense rows; otherwise every
/// row participates, including concepts outside Ingreso/Gasto.
pub fn by_categoria_total(rows: &[&Transaction], solo_gasto: bool) -> Vec<CategoryTotal> {
    let mut grouped: BTreeMap<String, Amount> = BTreeMap::new();
    for t in rows {
        if solo_gasto && !t.concepto().is_gasto() {
            continue;
        }
        *grouped.entry(t.categoria().to_string()).or_default() += t.monto();
    }
    grouped
        .into_iter()
        .map(|(categoria, monto)| CategoryTotal { categoria, monto })
        .collect()
}

fn monthly_points(grouped: BTreeMap<(NaiveDate, String), Amount>) -> Vec<MonthlyPoint> {
    grouped
        .into_iter()
        .map(|((mes, clave), monto)| MonthlyPoint {
            mes: mes.format("%Y-%m").to_string(),
            clave,
            monto,
        })
        .collect()
}
