//! Surrogate-versus-graph consistency harness
//!
//! [`verify`] evaluates the anchor cells through the dependency-walking
//! evaluator and compares them against the surrogate's outputs at the
//! baseline input vector. The façade's test suite runs this on its
//! fixture snapshot, so drift between the two valuation paths fails a
//! test run instead of surfacing in production numbers.

use std::fmt;

use orrery_formula::{Evaluator, FormulaResult};

use crate::anchors::{AnchorCells, KeyOutputs};
use crate::inputs::ValuationInputs;
use crate::model::SurrogateModel;

/// One output compared across the two paths
#[derive(Debug, Clone, PartialEq)]
pub struct ConsistencyCheck {
    pub name: &'static str,
    pub surrogate: f64,
    /// Graph-evaluated value; `None` when the anchor cell is absent
    pub graph: Option<f64>,
    pub tolerance: f64,
}

impl ConsistencyCheck {
    /// No graph value to compare against
    pub fn is_skipped(&self) -> bool {
        self.graph.is_none()
    }

    /// Within tolerance, or skipped
    ///
    /// Tolerance is relative, scaled by the graph value's magnitude and
    /// floored at 1 so near-zero outputs compare absolutely.
    pub fn passed(&self) -> bool {
        match self.graph {
            None => true,
            Some(graph) => {
                (self.surrogate - graph).abs() <= self.tolerance * graph.abs().max(1.0)
            }
        }
    }
}

impl fmt::Display for ConsistencyCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.graph {
            None => write!(f, "{}: skipped (no anchor value)", self.name),
            Some(graph) => write!(
                f,
                "{}: surrogate {:.6} vs graph {:.6} ({})",
                self.name,
                self.surrogate,
                graph,
                if self.passed() { "ok" } else { "MISMATCH" }
            ),
        }
    }
}

/// Outcome of one harness run
#[derive(Debug, Clone, PartialEq)]
pub struct ConsistencyReport {
    pub checks: Vec<ConsistencyCheck>,
}

impl ConsistencyReport {
    /// Every non-skipped check within tolerance
    pub fn passed(&self) -> bool {
        self.checks.iter().all(ConsistencyCheck::passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &ConsistencyCheck> {
        self.checks.iter().filter(|check| !check.passed())
    }

    pub fn skipped_count(&self) -> usize {
        self.checks.iter().filter(|check| check.is_skipped()).count()
    }

    pub fn compared_count(&self) -> usize {
        self.checks.len() - self.skipped_count()
    }
}

impl fmt::Display for ConsistencyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for check in &self.checks {
            writeln!(f, "{check}")?;
        }
        Ok(())
    }
}

/// Compare the surrogate against the graph at the baseline anchors
///
/// `tolerance` is relative (see [`ConsistencyCheck::passed`]). The only
/// error is a reference cycle under an anchor cell.
pub fn verify(
    model: &SurrogateModel,
    evaluator: &mut Evaluator<'_>,
    anchors: &AnchorCells,
    tolerance: f64,
) -> FormulaResult<ConsistencyReport> {
    let outputs = KeyOutputs::capture(evaluator, anchors)?;
    let baseline = ValuationInputs::default();

    // All three Mars option components must be present to compare; the
    // resolver would otherwise fold fallbacks into the graph side
    let graph_option_value = match (
        outputs.mars_cumulative_value,
        outputs.mars_cumulative_revenue,
        outputs.mars_cumulative_cost,
    ) {
        (Some(value), Some(revenue), Some(cost)) => Some(value + revenue - cost),
        _ => None,
    };

    let checks = vec![
        ConsistencyCheck {
            name: "earth value",
            surrogate: model.calculate_earth_valuation(&baseline),
            graph: outputs.earth_value,
            tolerance,
        },
        ConsistencyCheck {
            name: "mars value",
            surrogate: model.calculate_mars_valuation(&baseline),
            graph: outputs.mars_value,
            tolerance,
        },
        ConsistencyCheck {
            name: "mars option value",
            surrogate: model.calculate_mars_option_value(&baseline),
            graph: graph_option_value,
            tolerance,
        },
        ConsistencyCheck {
            name: "total enterprise value",
            surrogate: model.calculate_total_enterprise_value(&baseline),
            graph: outputs.total_value,
            tolerance,
        },
    ];

    Ok(ConsistencyReport { checks })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchors::BaselineOutputs;
    use crate::calibration::CalibrationTable;
    use orrery_core::Snapshot;
    use pretty_assertions::assert_eq;

    fn consistent_snapshot() -> Snapshot {
        Snapshot::from_json_str(
            r#"{
                "Summary": {"cells": {
                    "B2": {"value": 124.48},
                    "B3": {"value": 0.745},
                    "B4": {"formula": "=B5+B3"},
                    "B5": {"formula": "=B2*18"}
                }},
                "Earth": {"cells": {
                    "B10": {"value": 488},
                    "B11": {"value": 195},
                    "B12": {"value": 102}
                }},
                "Mars": {"cells": {
                    "B10": {"value": 0.52},
                    "B11": {"value": 0.31},
                    "B12": {"value": 0.085}
                }}
            }"#,
        )
        .unwrap()
    }

    fn model_from(snapshot: &Snapshot) -> SurrogateModel {
        let mut evaluator = Evaluator::new(snapshot);
        let outputs = KeyOutputs::capture(&mut evaluator, &AnchorCells::default()).unwrap();
        SurrogateModel::new(
            BaselineOutputs::from_key_outputs(&outputs),
            CalibrationTable::default(),
        )
    }

    #[test]
    fn consistent_snapshot_passes() {
        let snapshot = consistent_snapshot();
        let model = model_from(&snapshot);
        let mut evaluator = Evaluator::new(&snapshot);

        let report = verify(&model, &mut evaluator, &AnchorCells::default(), 1e-6).unwrap();

        assert!(report.passed(), "{report}");
        assert_eq!(report.skipped_count(), 0);
        assert_eq!(report.compared_count(), 4);
    }

    #[test]
    fn drifted_anchor_fails_the_report() {
        // Model anchored to the built-in baselines, snapshot claiming a
        // different earth value
        let snapshot = Snapshot::from_json_str(
            r#"{"Summary": {"cells": {"B2": {"value": 200.0}}}}"#,
        )
        .unwrap();
        let model = SurrogateModel::default();
        let mut evaluator = Evaluator::new(&snapshot);

        let report = verify(&model, &mut evaluator, &AnchorCells::default(), 1e-6).unwrap();

        assert!(!report.passed());
        let failures: Vec<&str> = report.failures().map(|check| check.name).collect();
        assert_eq!(failures, vec!["earth value"]);
    }

    #[test]
    fn absent_anchors_are_skipped_not_failed() {
        let snapshot = Snapshot::from_json_str(
            r#"{"Summary": {"cells": {"B2": {"value": 124.48}}}}"#,
        )
        .unwrap();
        let model = SurrogateModel::default();
        let mut evaluator = Evaluator::new(&snapshot);

        let report = verify(&model, &mut evaluator, &AnchorCells::default(), 1e-6).unwrap();

        assert!(report.passed(), "{report}");
        assert_eq!(report.compared_count(), 1);
        assert_eq!(report.skipped_count(), 3);
    }
}
