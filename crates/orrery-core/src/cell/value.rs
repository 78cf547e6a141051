//! Cell value types

/// The raw imported value of a cell
///
/// Snapshots carry only the shapes the import step produces: empty cells,
/// numbers, and text. Richer spreadsheet types (booleans, dates, error
/// codes) do not survive the export and have no representation here.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    /// No imported value
    #[default]
    Empty,
    /// Numeric value
    Number(f64),
    /// Text value
    Text(String),
}

impl CellValue {
    /// Check whether the cell has no value
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Numeric coercion
    ///
    /// Numbers pass through; text that parses as a float coerces (imports
    /// sometimes stringify numerics); everything else is non-numeric.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => s.trim().parse().ok(),
            CellValue::Empty => None,
        }
    }
}
