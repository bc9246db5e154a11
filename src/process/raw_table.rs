use thiserror::Error;

/// A table as found on a document page. Row 0 is the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    rows: Vec<Vec<String>>,
}

/// A table reduced to its date label and the names listed under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReshapedTable {
    pub date_label: String,
    pub names: Vec<String>,
}

/// Table shapes `reshape` refuses to guess about.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("table has no rows")]
    Empty,
    #[error("table header has no leading date cell")]
    BlankHeader,
}

impl RawTable {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn header(&self) -> Option<&[String]> {
        self.rows.first().map(Vec::as_slice)
    }

    pub fn body(&self) -> &[Vec<String>] {
        self.rows.get(1..).unwrap_or(&[])
    }

    /// Widest row in the body.
    pub fn width(&self) -> usize {
        self.body().iter().map(Vec::len).max().unwrap_or(0)
    }
}

/// Take header column 0 as the date label and read the body column-major,
/// dropping blank or missing cells.
pub fn reshape(table: &RawTable) -> Result<ReshapedTable, LayoutError> {
    let header = table.header().ok_or(LayoutError::Empty)?;
    let date_label = header
        .first()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .ok_or(LayoutError::BlankHeader)?
        .to_string();

    let body = table.body();
    let mut names = Vec::new();
    for col in 0..table.width() {
        for row in body {
            match row.get(col).map(|c| c.trim()) {
                Some(cell) if !cell.is_empty() => names.push(cell.to_string()),
                _ => {}
            }
        }
    }

    Ok(ReshapedTable { date_label, names })
}
