//! Prelude module - common imports for orrery users
//!
//! ```rust
//! use orrery::prelude::*;
//! ```

pub use crate::{
    // Anchor types
    AnchorCell,
    AnchorCells,
    BaselineOutputs,
    // Calibration types
    CalibrationTable,
    CellAddress,
    CellRange,
    // Cell types
    CellValue,
    // Consistency types
    ConsistencyCheck,
    ConsistencyReport,
    DependencyGraph,
    // Input types
    EarthInputs,
    // Error types
    Error,
    // Evaluation types
    Evaluator,
    FinancialInputs,
    FormulaError,
    FormulaResult,
    GainTarget,
    KeyOutputs,
    MarsInputs,
    Result,
    ScenarioAnchor,
    Sheet,
    // Main types
    Snapshot,
    SurrogateModel,
    ValuationError,
    ValuationInputs,
    ValuationResult,
    // Session types
    ValuationSession,
};
