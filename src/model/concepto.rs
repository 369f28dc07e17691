use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// The transaction type column of the tracking sheet.
///
/// The sheet uses the labels `Ingreso` (income) and `Gasto` (expense). Anything else is carried
/// through as `Otro` so that category-only views still see the row, while the concept-keyed
/// aggregates ignore it.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Concepto {
    Ingreso,
    Gasto,
    Otro(String),
}

impl Concepto {
    pub fn is_ingreso(&self) -> bool {
        matches!(self, Concepto::Ingreso)
    }

    pub fn is_gasto(&self) -> bool {
        matches!(self, Concepto::Gasto)
    }

    /// True for the two labels that participate in concept-keyed aggregates.
    pub fn is_tracked(&self) -> bool {
        !matches!(self, Concepto::Otro(_))
    }
}

impl Default for Concepto {
    fn default() -> Self {
        Concepto::Otro(String::new())
    }
}

const INGRESO_STR: &str = "Ingreso";
const GASTO_STR: &str = "Gasto";

impl From<&str> for Concepto {
    fn from(s: &str) -> Self {
        match s.trim() {
            INGRESO_STR => Concepto::Ingreso,
            GASTO_STR => Concepto::Gasto,
            other => Concepto::Otro(other.to_string()),
        }
    }
}

impl FromStr for Concepto {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.into())
    }
}

impl Display for Concepto {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Concepto::Ingreso => f.write_str(INGRESO_STR),
            Concepto::Gasto => f.write_str(GASTO_STR),
            Concepto::Otro(label) => f.write_str(label),
        }
    }
}

impl Serialize for Concepto {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Concepto {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(s.as_str().into())
    }
}
