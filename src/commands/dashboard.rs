//! Dashboard command handler: the fetch -> normalize -> aggregate pipeline.

use crate::aggregate::{FilterSpec, Summary};
use crate::args::DashboardArgs;
use crate::commands::Out;
use crate::model::{RawTable, Transaction, FECHA_STR};
use crate::normalize::Normalizer;
use crate::{api, workbook, Config, Result};
use anyhow::Context;
use chrono::NaiveDate;
use tracing::{debug, warn};

/// Handles the `finapp dashboard` command.
///
/// The consolidated table is rebuilt from the workbook on every invocation; nothing derived is
/// persisted. Filters arrive as CLI flags and are applied before any aggregation.
pub async fn dashboard(config: Config, args: DashboardArgs) -> Result<Out<Summary>> {
    let month = args.month().map(parse_month).transpose()?;
    let filter = FilterSpec::new(args.category().map(str::to_string), month);

    let mut store = api::store(&config).await?;
    let bytes = store.fetch().await?;
    let tables = workbook::read_tables(&bytes)?;
    debug!("Workbook has {} sheets", tables.len());

    // Every sheet except the append target is a candidate extract; the normalizer keeps the ones
    // that carry the date column.
    let extracts: Vec<RawTable> = tables
        .into_iter()
        .filter(|t| t.name() != config.append_sheet())
        .collect();
    if !extracts.iter().any(|t| t.name() == config.tracking_sheet()) {
        warn!(
            "The tracking sheet '{}' was not found in the workbook",
            config.tracking_sheet()
        );
    }
    let consolidated = Normalizer::new(FECHA_STR).consolidate(&extracts);
    let transactions = Transaction::from_table(&consolidated)?;
    let summary = Summary::compute(&transactions, &filter);

    let message = format!(
        "{} transactions from {} | Ingresos {} | Gastos {} | Balance {}",
        transactions.len(),
        store.describe(),
        summary.kpis.total_ingresos,
        summary.kpis.total_gastos,
        summary.kpis.balance,
    );
    Ok(Out::new(message, summary))
}

fn parse_month(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d")
        .with_context(|| format!("Invalid month '{s}', expected YYYY-MM"))
}
