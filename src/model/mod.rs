//! Data types shared across the fetch, aggregation and append paths.

mod amount;
mod concepto;
mod record;
mod table;
mod transaction;

pub use amount::Amount;
pub use concepto::Concepto;
pub use record::Record;
pub use table::RawTable;
pub use transaction::{parse_dayfirst, Transaction};

pub(crate) use transaction::{CATEGORIA_STR, DESCRIPCION_STR, FECHA_STR, MONTO_STR};
