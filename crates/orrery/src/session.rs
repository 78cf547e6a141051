//! Valuation session
//!
//! Ties one immutable snapshot to everything a caller does with it: an
//! evaluator with its per-session cache, the anchor-cell layout, and
//! surrogate construction from captured ground truth. Dropping the
//! session drops the cache; reloading data means loading a new
//! [`Snapshot`] and opening a new session on it.

use orrery_core::Snapshot;
use orrery_formula::{DependencyGraph, Evaluator, FormulaResult};
use orrery_valuation::{
    consistency, AnchorCells, BaselineOutputs, CalibrationTable, ConsistencyReport, KeyOutputs,
    SurrogateModel,
};

/// One calculation session over one snapshot
///
/// # Example
/// ```rust
/// use orrery::prelude::*;
///
/// let snapshot = Snapshot::from_json_str(
///     r#"{"Summary": {"cells": {
///         "B2": {"value": 124.48},
///         "B5": {"formula": "=B2*18"}
///     }}}"#,
/// )?;
///
/// let mut session = ValuationSession::new(&snapshot);
/// assert_eq!(session.get_cell_value("Summary", "B5")?, Some(2240.64));
///
/// // Surrogate anchored to whatever the snapshot provides; this export
/// // only carries the earth value, the rest fall back to built-ins
/// let model = session.surrogate()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct ValuationSession<'s> {
    evaluator: Evaluator<'s>,
    anchor_cells: AnchorCells,
}

impl<'s> ValuationSession<'s> {
    /// Open a session with the default anchor layout
    pub fn new(snapshot: &'s Snapshot) -> Self {
        Self::with_anchor_cells(snapshot, AnchorCells::default())
    }

    /// Open a session against a custom anchor layout
    pub fn with_anchor_cells(snapshot: &'s Snapshot, anchor_cells: AnchorCells) -> Self {
        Self {
            evaluator: Evaluator::new(snapshot),
            anchor_cells,
        }
    }

    pub fn snapshot(&self) -> &'s Snapshot {
        self.evaluator.snapshot()
    }

    pub fn anchor_cells(&self) -> &AnchorCells {
        &self.anchor_cells
    }

    /// Resolve one cell through the memoizing evaluator
    pub fn get_cell_value(&mut self, sheet: &str, reference: &str) -> FormulaResult<Option<f64>> {
        self.evaluator.get_cell_value(sheet, reference)
    }

    /// Build the full dependency graph and fail on the first cycle
    ///
    /// Evaluation detects cycles on its own; this is for callers that
    /// want to reject a corrupt snapshot up front instead of on the
    /// first unlucky lookup.
    pub fn ensure_acyclic(&self) -> FormulaResult<()> {
        let snapshot = self.evaluator.snapshot();
        DependencyGraph::from_snapshot(snapshot).ensure_acyclic(snapshot)
    }

    /// Capture the headline outputs from the anchor cells
    pub fn key_outputs(&mut self) -> FormulaResult<KeyOutputs> {
        KeyOutputs::capture(&mut self.evaluator, &self.anchor_cells)
    }

    /// Build a surrogate anchored to this snapshot, with the shipped
    /// calibration table
    pub fn surrogate(&mut self) -> FormulaResult<SurrogateModel> {
        self.surrogate_with_calibration(CalibrationTable::default())
    }

    /// Build a surrogate anchored to this snapshot
    pub fn surrogate_with_calibration(
        &mut self,
        calibration: CalibrationTable,
    ) -> FormulaResult<SurrogateModel> {
        let outputs = self.key_outputs()?;
        Ok(SurrogateModel::new(
            BaselineOutputs::from_key_outputs(&outputs),
            calibration,
        ))
    }

    /// Run the consistency harness against this snapshot's anchors
    pub fn verify_consistency(
        &mut self,
        model: &SurrogateModel,
        tolerance: f64,
    ) -> FormulaResult<ConsistencyReport> {
        consistency::verify(model, &mut self.evaluator, &self.anchor_cells, tolerance)
    }
}
