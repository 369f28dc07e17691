use serde::Serialize;

/// One tabular extract: a header row plus data rows of cell strings.
///
/// This is the raw shape a sheet comes out of the workbook in, before normalization. Rows are not
/// required to be as long as the header; short rows read as empty cells on the right.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize)]
pub struct RawTable {
    /// The sheet name the table was extracted from.
    name: String,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new<S, H, R>(name: S, headers: H, rows: R) -> Self
    where
        S: Into<String>,
        H: IntoIterator,
        H::Item: Into<String>,
        R: IntoIterator<Item = Vec<String>>,
    {
        Self {
            name: name.into(),
            headers: headers.into_iter().map(|h| h.into()).collect(),
            rows: rows.into_iter().collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the column with the given header name, if present.
    pub fn column_index(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    pub fn has_column(&self, header: &str) -> bool {
        self.column_index(header).is_some()
    }

    /// The cell at `(row, col)`, empty string if the row is shorter than the header.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(|s| s.as_str())
            .unwrap_or("")
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    /// Removes the column at `index` from the header and every row. Rows shorter than the header
    /// are left alone where the index is beyond their length.
    pub fn remove_column(&mut self, index: usize) {
        if index >= self.headers.len() {
            return;
        }
        self.headers.remove(index);
        for row in &mut self.rows {
            if index < row.len() {
                row.remove(index);
            }
        }
    }

    /// Replaces every cell of the column at `index` using `f`. Rows that do not reach the column
    /// are unchanged.
    pub fn map_column(&mut self, index: usize, f: impl Fn(&str) -> String) {
        for row in &mut self.rows {
            if let Some(cell) = row.get_mut(index) {
                *cell = f(cell);
            }
        }
    }
}
