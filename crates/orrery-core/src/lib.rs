//! # orrery-core
//!
//! Core data structures for the orrery valuation engine.
//!
//! This crate provides the fundamental types shared by the formula and
//! valuation layers:
//! - [`Snapshot`], [`Sheet`], [`Cell`] - the immutable workbook image
//! - [`CellAddress`] and [`CellRange`] - A1 addressing and ranges
//! - [`CellValue`] - raw imported cell values
//!
//! ## Example
//!
//! ```rust
//! use orrery_core::{CellValue, Snapshot};
//!
//! let snapshot = Snapshot::from_json_str(
//!     r#"{ "Model": { "cells": {
//!         "A1": { "value": 42.0 },
//!         "A2": { "formula": "=A1*2" }
//!     } } }"#,
//! )
//! .unwrap();
//!
//! let sheet = snapshot.sheet_by_name("Model").unwrap();
//! assert_eq!(sheet.cell("A1").unwrap().unwrap().value, CellValue::Number(42.0));
//! assert!(sheet.cell("A2").unwrap().unwrap().has_formula());
//! ```

pub mod cell;
pub mod error;
pub mod snapshot;

// Re-exports for convenience
pub use cell::{CellAddress, CellRange, CellValue};
pub use error::{Error, Result};
pub use snapshot::{Cell, Sheet, Snapshot};

/// Maximum number of rows in a sheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a sheet (Excel limit)
pub const MAX_COLS: u16 = 16_384;
