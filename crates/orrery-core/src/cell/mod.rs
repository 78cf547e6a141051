//! Cell-related types
//!
//! - [`CellValue`] - The raw imported value of a cell
//! - [`CellAddress`] - A cell's location (e.g., "A1")
//! - [`CellRange`] - A rectangular block of cells (e.g., "A1:B10")

mod address;
mod value;

pub use address::{CellAddress, CellRange, CellRangeIterator};
pub use value::CellValue;
