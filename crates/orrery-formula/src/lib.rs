//! Formula parsing and evaluation for orrery snapshots
//!
//! This crate turns the formula strings stored in an
//! [`orrery_core::Snapshot`] into values. The deliberately small grammar
//! covers what the financial models actually use: literals, cell and
//! range references (optionally sheet-qualified), a single arithmetic
//! operation, and one layer of calls into the builtin function library
//! (SUM, MAX, MIN, IF, IFERROR, LOG, EXP, RRI).
//!
//! Formulas outside the grammar are not an error at evaluation time;
//! they degrade to empty cells with a typed [`UnsupportedReason`]
//! available from the parser for callers that want to audit coverage.
//!
//! ```rust
//! use orrery_core::Snapshot;
//! use orrery_formula::{DependencyGraph, Evaluator};
//!
//! let snapshot = Snapshot::from_json_str(
//!     r#"{"Summary": {"cells": {
//!         "B2": {"value": 124.48},
//!         "B3": {"formula": "=B2*1000"}
//!     }}}"#,
//! )?;
//!
//! // Reject cyclic models up front
//! DependencyGraph::from_snapshot(&snapshot).ensure_acyclic(&snapshot)?;
//!
//! let mut evaluator = Evaluator::new(&snapshot);
//! assert_eq!(evaluator.get_cell_value("Summary", "B3")?, Some(124480.0));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod ast;
pub mod dependency;
pub mod error;
pub mod evaluator;
pub mod functions;
pub mod parser;

pub use ast::{BinaryOperator, CellRef, FormulaExpr, FunctionName, RangeRef};
pub use dependency::{extract_references, CellKey, DependencyGraph};
pub use error::{FormulaError, FormulaResult, UnsupportedReason};
pub use evaluator::Evaluator;
pub use parser::parse_formula;
