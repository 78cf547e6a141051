//! # orrery
//!
//! A Rust library for evaluating exported spreadsheet models and running
//! what-if valuations against them.
//!
//! Orrery loads an immutable JSON snapshot of a financial workbook and
//! offers two valuation paths over it.
//!
//! ## Features
//!
//! - Load workbook snapshots from JSON (strings, readers, or files)
//! - Parse the stored formulas into a typed AST; formulas outside the
//!   supported grammar degrade to empty cells instead of failing
//! - Evaluate any cell on demand through a memoizing, cycle-detecting
//!   dependency walk
//! - Price scenarios instantly with a calibrated closed-form surrogate
//!   anchored to the snapshot's headline outputs
//! - Verify surrogate-versus-graph consistency at the anchor cells
//!
//! ## Example
//!
//! ```rust
//! use orrery::prelude::*;
//!
//! // A snapshot export with the summary anchors
//! let snapshot = Snapshot::from_json_str(
//!     r#"{"Summary": {"cells": {
//!         "B2": {"value": 124.48},
//!         "B3": {"value": 0.745},
//!         "B4": {"formula": "=B5+B3"},
//!         "B5": {"formula": "=B2*18"}
//!     }}}"#,
//! )?;
//!
//! let mut session = ValuationSession::new(&snapshot);
//!
//! // Graph path: evaluate a formula cell
//! let total = session.get_cell_value("Summary", "B4")?;
//! assert!((total.unwrap() - 2241.385).abs() < 1e-9);
//!
//! // Surrogate path: anchor a model and sweep a scenario
//! let model = session.surrogate()?;
//! let upside = ValuationInputs {
//!     earth: EarthInputs {
//!         starlink_penetration: 0.30,
//!         ..EarthInputs::default()
//!     },
//!     ..ValuationInputs::default()
//! };
//! assert!(model.calculate_earth_valuation(&upside) > model.baselines().earth_value);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod prelude;
pub mod session;

// Re-export the session type
pub use session::ValuationSession;

// Re-export core types
pub use orrery_core::{
    Cell,
    CellAddress,
    CellRange,
    // Cell types
    CellValue,
    // Error types
    Error,
    Result,
    Sheet,
    // Main types
    Snapshot,

    MAX_COLS,
    // Constants
    MAX_ROWS,
};

// Re-export formula types
pub use orrery_formula::{
    extract_references, parse_formula, BinaryOperator, CellKey, CellRef, DependencyGraph,
    Evaluator, FormulaError, FormulaExpr, FormulaResult, FunctionName, RangeRef, UnsupportedReason,
};

// Re-export valuation types
pub use orrery_valuation::{
    fit, verify, AnchorCell, AnchorCells, BaselineOutputs, CalibrationTable, ConsistencyCheck,
    ConsistencyReport, EarthInputs, FinancialInputs, GainTarget, KeyOutputs, MarsInputs,
    MarsOptionAnchors, ScenarioAnchor, SurrogateModel, ValuationError, ValuationInputs,
    ValuationResult,
};
