use serde::Serialize;

/// A new row to be appended to a sheet, as ordered (column name, value) pairs.
///
/// The keys must be a subset of the target sheet's header row; the append writer verifies this
/// before writing anything. Columns the record does not mention are left blank.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a (column, value) pair. Order is kept; a repeated column simply appears twice and the
    /// later value wins when written.
    pub fn push(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.fields.push((column.into(), value.into()));
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(c, v)| (c.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }
}

impl<C, V> FromIterator<(C, V)> for Record
where
    C: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (C, V)>>(iter: T) -> Self {
        let mut record = Record::new();
        for (c, v) in iter {
            record.push(c, v);
        }
        record
    }
}
