//! Append command handler.

use crate::args::AppendArgs;
use crate::commands::Out;
use crate::model::{
    parse_dayfirst, Amount, Record, CATEGORIA_STR, DESCRIPCION_STR, FECHA_STR, MONTO_STR,
};
use crate::{api, Config, Result};
use anyhow::anyhow;
use std::str::FromStr;

/// Handles the `finapp append` command.
///
/// The date and amount flags are validated before any network call, so a typo never costs a
/// download. On success the remote workbook has exactly one additional row in the target sheet.
pub async fn append(config: Config, args: AppendArgs) -> Result<Out<Record>> {
    let fecha = parse_dayfirst(args.fecha())
        .ok_or_else(|| anyhow!("Invalid date '{}': expected dd/mm/yyyy", args.fecha()))?;
    let monto = Amount::from_str(args.monto())
        .map_err(|e| anyhow!("Invalid amount '{}': {e}", args.monto()))?;

    let mut record = Record::new();
    record.push(FECHA_STR, fecha.format("%d/%m/%Y").to_string());
    record.push(CATEGORIA_STR, args.categoria());
    record.push(DESCRIPCION_STR, args.descripcion());
    record.push(MONTO_STR, monto.value().to_string());

    let sheet = args.sheet().unwrap_or(config.append_sheet()).to_string();
    let mut store = api::store(&config).await?;
    crate::append::append_record(store.as_mut(), &sheet, &record).await?;

    Ok(Out::new(format!("Appended 1 row to sheet '{sheet}'"), record))
}
