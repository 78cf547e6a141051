//! Immutable workbook snapshot
//!
//! A [`Snapshot`] is the static image of a workbook produced by the
//! external import step: sheets, raw cell values, and formula text. It is
//! loaded once and never mutated; calculation sessions borrow it read-only
//! for their whole lifetime. Picking up new workbook data means loading a
//! new snapshot and starting a new session.
//!
//! The wire shape is JSON:
//!
//! ```json
//! {
//!   "Earth": {
//!     "cells": {
//!       "A1": { "value": 124.48 },
//!       "B2": { "value": "label text" },
//!       "C3": { "formula": "=SUM(A1:A2)" }
//!     }
//!   }
//! }
//! ```

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Deserialize;

use crate::cell::{CellAddress, CellValue};
use crate::error::Result;

/// A single cell: imported raw value plus optional formula text
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    /// Raw value captured by the import step
    pub value: CellValue,
    /// Formula text when the cell carries one, with or without the
    /// leading `=` (exports produce both forms)
    pub formula: Option<String>,
}

impl Cell {
    /// Check whether this cell carries a formula
    pub fn has_formula(&self) -> bool {
        self.formula.is_some()
    }
}

/// A named sheet holding sparse cells keyed by (row, col)
#[derive(Debug, Clone)]
pub struct Sheet {
    name: String,
    cells: HashMap<(u32, u16), Cell>,
}

impl Sheet {
    /// Get the sheet name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get a cell by 0-based row and column indices
    pub fn cell_at(&self, row: u32, col: u16) -> Option<&Cell> {
        self.cells.get(&(row, col))
    }

    /// Get a cell by A1 reference
    pub fn cell(&self, reference: &str) -> Result<Option<&Cell>> {
        let addr = CellAddress::parse(reference)?;
        Ok(self.cell_at(addr.row, addr.col))
    }

    /// Number of populated cells
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Iterate populated cells in no particular order
    pub fn cells(&self) -> impl Iterator<Item = (CellAddress, &Cell)> + '_ {
        self.cells
            .iter()
            .map(|(&(row, col), cell)| (CellAddress::new(row, col), cell))
    }
}

/// An immutable, ordered collection of sheets with by-name lookup
///
/// Sheets are ordered by name so indices are stable across loads of the
/// same snapshot.
#[derive(Debug, Clone)]
pub struct Snapshot {
    sheets: Vec<Sheet>,
    index: HashMap<String, usize>,
}

impl Snapshot {
    /// Load a snapshot from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: HashMap<String, RawSheet> = serde_json::from_str(json)?;
        Self::build(raw)
    }

    /// Load a snapshot from a reader
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let raw: HashMap<String, RawSheet> = serde_json::from_reader(reader)?;
        Self::build(raw)
    }

    /// Load a snapshot from a file path
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    fn build(raw: HashMap<String, RawSheet>) -> Result<Self> {
        let mut names: Vec<String> = raw.keys().cloned().collect();
        names.sort();

        let mut sheets = Vec::with_capacity(names.len());
        let mut index = HashMap::with_capacity(names.len());

        for name in names {
            let raw_sheet = &raw[&name];
            let mut cells = HashMap::with_capacity(raw_sheet.cells.len());
            for (reference, raw_cell) in &raw_sheet.cells {
                let addr = CellAddress::parse(reference)?;
                let value = match &raw_cell.value {
                    Some(RawScalar::Number(n)) => CellValue::Number(*n),
                    Some(RawScalar::Text(s)) => CellValue::Text(s.clone()),
                    None => CellValue::Empty,
                };
                cells.insert(
                    (addr.row, addr.col),
                    Cell {
                        value,
                        formula: raw_cell.formula.clone(),
                    },
                );
            }
            index.insert(name.clone(), sheets.len());
            sheets.push(Sheet { name, cells });
        }

        Ok(Self { sheets, index })
    }

    /// Get a sheet by index
    pub fn sheet(&self, index: usize) -> Option<&Sheet> {
        self.sheets.get(index)
    }

    /// Get a sheet by name
    pub fn sheet_by_name(&self, name: &str) -> Option<&Sheet> {
        self.sheet_index(name).and_then(|i| self.sheets.get(i))
    }

    /// Get the index of a sheet by name
    pub fn sheet_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Number of sheets
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Iterate sheets in index order
    pub fn sheets(&self) -> impl Iterator<Item = &Sheet> {
        self.sheets.iter()
    }
}

#[derive(Debug, Deserialize)]
struct RawSheet {
    #[serde(default)]
    cells: HashMap<String, RawCell>,
}

#[derive(Debug, Deserialize)]
struct RawCell {
    value: Option<RawScalar>,
    formula: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawScalar {
    Number(f64),
    Text(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellValue;
    use crate::error::Error;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    const FIXTURE: &str = r#"{
        "Mars": {
            "cells": {
                "A1": { "value": 0.745 },
                "B2": { "value": "colony", "formula": "=A1*2" },
                "C3": { "formula": "=SUM(A1:A2)" },
                "D4": {},
                "E5": { "value": null }
            }
        },
        "Earth": {
            "cells": {
                "A1": { "value": 124.48 }
            }
        }
    }"#;

    #[test]
    fn loads_documented_shape() {
        let snapshot = Snapshot::from_json_str(FIXTURE).unwrap();
        assert_eq!(snapshot.sheet_count(), 2);

        // Name-sorted so indices are stable
        assert_eq!(snapshot.sheet(0).unwrap().name(), "Earth");
        assert_eq!(snapshot.sheet(1).unwrap().name(), "Mars");
        assert_eq!(snapshot.sheet_index("Mars"), Some(1));
        assert_eq!(snapshot.sheet_index("Venus"), None);

        let mars = snapshot.sheet_by_name("Mars").unwrap();
        assert_eq!(mars.cell_count(), 5);
        assert_eq!(
            mars.cell("A1").unwrap().unwrap().value,
            CellValue::Number(0.745)
        );

        let b2 = mars.cell_at(1, 1).unwrap();
        assert_eq!(b2.value, CellValue::Text("colony".into()));
        assert_eq!(b2.formula.as_deref(), Some("=A1*2"));

        let c3 = mars.cell("C3").unwrap().unwrap();
        assert!(c3.has_formula());
        assert_eq!(c3.value, CellValue::Empty);

        // Bare object and explicit null both load as empty cells
        assert_eq!(mars.cell("D4").unwrap().unwrap().value, CellValue::Empty);
        assert_eq!(mars.cell("E5").unwrap().unwrap().value, CellValue::Empty);
    }

    #[test]
    fn missing_cells_key_is_an_empty_sheet() {
        let snapshot = Snapshot::from_json_str(r#"{ "Summary": {} }"#).unwrap();
        let sheet = snapshot.sheet_by_name("Summary").unwrap();
        assert_eq!(sheet.cell_count(), 0);
        assert_eq!(sheet.cell("A1").unwrap(), None);
    }

    #[test]
    fn rejects_bad_cell_keys() {
        let err = Snapshot::from_json_str(r#"{ "S": { "cells": { "1A": {} } } }"#).unwrap_err();
        assert!(matches!(err, Error::InvalidAddress(_)));
    }

    #[test]
    fn rejects_non_scalar_values() {
        let result = Snapshot::from_json_str(r#"{ "S": { "cells": { "A1": { "value": [1] } } } }"#);
        assert!(matches!(result, Err(Error::Json(_))));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            Snapshot::from_json_str("not json"),
            Err(Error::Json(_))
        ));
    }

    #[test]
    fn loads_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(FIXTURE.as_bytes()).unwrap();

        let snapshot = Snapshot::from_path(file.path()).unwrap();
        assert_eq!(snapshot.sheet_count(), 2);
        assert!(snapshot.sheet_by_name("Earth").is_some());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = Snapshot::from_path(dir.path().join("absent.json"));
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
