//! Calibrated closed-form surrogate for orrery snapshot valuations
//!
//! The dependency-walking evaluator in `orrery-formula` gives exact
//! answers but needs the whole snapshot. This crate reproduces the
//! headline outputs (Earth, Mars, Mars option, combined enterprise
//! value) from a small [`ValuationInputs`] vector: ground truth is
//! captured once from anchor cells ([`anchors`]), every tunable
//! constant lives in a versioned [`CalibrationTable`] with a gain
//! [`fit`] routine ([`calibration`]), and the [`consistency`] harness
//! keeps the two paths honest on every test run.
//!
//! ```rust
//! use orrery_valuation::{SurrogateModel, ValuationInputs};
//!
//! let model = SurrogateModel::default();
//! let mut scenario = ValuationInputs::default();
//! scenario.earth.starlink_penetration = 0.25;
//!
//! let optimistic = model.calculate_earth_valuation(&scenario);
//! let baseline = model.calculate_earth_valuation(&ValuationInputs::default());
//! assert!(optimistic > baseline);
//! ```

pub mod anchors;
pub mod calibration;
pub mod consistency;
pub mod error;
pub mod inputs;
pub mod model;

pub use anchors::{AnchorCell, AnchorCells, BaselineOutputs, KeyOutputs, MarsOptionAnchors};
pub use calibration::{fit, CalibrationTable, GainTarget, ScenarioAnchor};
pub use consistency::{verify, ConsistencyCheck, ConsistencyReport};
pub use error::{ValuationError, ValuationResult};
pub use inputs::{EarthInputs, FinancialInputs, MarsInputs, ValuationInputs};
pub use model::SurrogateModel;
