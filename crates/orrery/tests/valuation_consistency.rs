//! Tests for the surrogate valuation path and its consistency with the
//! formula graph

use std::io::Write;

use orrery::fit;
use orrery::prelude::*;

/// Snapshot export carrying the full anchor layout
///
/// The headline cells hold the published baseline outputs: Earth at
/// 124.48, Mars at 0.745, summed into the total on the Summary sheet.
fn anchored_snapshot_json() -> &'static str {
    r#"{
        "Summary": {"cells": {
            "B2": {"formula": "=Earth!B20"},
            "B3": {"formula": "=Mars!B14"},
            "B4": {"formula": "=B5+B3"},
            "B5": {"formula": "=B2*18"}
        }},
        "Earth": {"cells": {
            "A1": {"value": 80},
            "A2": {"value": 95},
            "A3": {"value": 105},
            "A4": {"value": 98},
            "A5": {"value": 110},
            "C1": {"value": 90},
            "C2": {"value": 60},
            "C3": {"value": 45},
            "B10": {"formula": "=SUM(A1:A5)"},
            "B11": {"formula": "=SUM(C1:C3)"},
            "B12": {"value": 102},
            "B20": {"value": 124.48}
        }},
        "Mars": {"cells": {
            "B10": {"value": 0.52},
            "B11": {"value": 0.31},
            "B12": {"value": 0.085},
            "B13": {"formula": "=B10+B11"},
            "B14": {"formula": "=B13-B12"}
        }}
    }"#
}

/// Test that the surrogate reproduces the graph at every anchor
#[test]
fn test_surrogate_matches_graph_at_anchors() {
    let snapshot = Snapshot::from_json_str(anchored_snapshot_json()).unwrap();
    let mut session = ValuationSession::new(&snapshot);

    let model = session.surrogate().unwrap();
    let report = session.verify_consistency(&model, 1e-9).unwrap();

    assert!(report.passed(), "{report}");
    assert_eq!(report.compared_count(), 4);
    assert_eq!(report.skipped_count(), 0);
}

/// Test that what-if scenarios move each output the right way
#[test]
fn test_what_if_scenarios_move_the_right_way() {
    let snapshot = Snapshot::from_json_str(anchored_snapshot_json()).unwrap();
    let mut session = ValuationSession::new(&snapshot);
    let model = session.surrogate().unwrap();

    let baseline = ValuationInputs::default();
    let earth_base = model.calculate_earth_valuation(&baseline);
    let mars_base = model.calculate_mars_valuation(&baseline);

    // Higher penetration lifts the Earth value
    let upside = ValuationInputs {
        earth: EarthInputs {
            starlink_penetration: 0.30,
            ..EarthInputs::default()
        },
        ..ValuationInputs::default()
    };
    assert!(model.calculate_earth_valuation(&upside) > earth_base);

    // A steeper discount rate compresses it
    let expensive_capital = ValuationInputs {
        financial: FinancialInputs {
            discount_rate: 0.15,
            ..FinancialInputs::default()
        },
        ..ValuationInputs::default()
    };
    assert!(model.calculate_earth_valuation(&expensive_capital) < earth_base);

    // No industrial bootstrap costs Mars an order of magnitude
    let no_bootstrap = ValuationInputs {
        mars: MarsInputs {
            industrial_bootstrap: false,
            ..MarsInputs::default()
        },
        ..ValuationInputs::default()
    };
    let crippled = model.calculate_mars_valuation(&no_bootstrap);
    assert!((crippled - mars_base / 10.0).abs() < 1e-12);

    // Every year of colony delay compounds the decay
    let delayed = ValuationInputs {
        mars: MarsInputs {
            first_colony_year: 2035.0,
            ..MarsInputs::default()
        },
        ..ValuationInputs::default()
    };
    let decayed = model.calculate_mars_valuation(&delayed);
    assert!((decayed / mars_base - 0.9_f64.powf(5.0)).abs() < 1e-9);
}

/// Test the total against its published composition
#[test]
fn test_total_enterprise_composition() {
    let model = SurrogateModel::default();
    let scenario = ValuationInputs {
        earth: EarthInputs {
            starlink_penetration: 0.25,
            launch_volume: 220.0,
            ..EarthInputs::default()
        },
        ..ValuationInputs::default()
    };

    let total = model.calculate_total_enterprise_value(&scenario);
    let composed = (model.calculate_earth_valuation(&scenario)
        * model.calibration().dilution_multiplier
        + model.calculate_mars_valuation(&scenario))
        / model.calibration().normalization_divisor;

    assert!((total - composed).abs() < 1e-9);
}

/// Test fitting a gain to observed field data through the public API
#[test]
fn test_calibration_fit_recovers_field_data() {
    let scenario_inputs = ValuationInputs {
        earth: EarthInputs {
            starlink_penetration: 0.20,
            ..EarthInputs::default()
        },
        ..ValuationInputs::default()
    };

    // Field data generated by a model whose revenue gain is 0.7
    let field_model = SurrogateModel::new(
        BaselineOutputs::default(),
        CalibrationTable {
            revenue_gain: 0.7,
            ..CalibrationTable::default()
        },
    );
    let observed = field_model.calculate_earth_valuation(&scenario_inputs);

    let fitted = fit(
        &CalibrationTable::default(),
        &BaselineOutputs::default(),
        &[ScenarioAnchor {
            target: GainTarget::EarthRevenue,
            inputs: scenario_inputs.clone(),
            observed,
        }],
    )
    .unwrap();

    assert!((fitted.revenue_gain - 0.7).abs() < 1e-6);
    assert_eq!(fitted.version, 2);

    // The refit model reproduces the observation and keeps the baseline
    let refit = SurrogateModel::new(BaselineOutputs::default(), fitted);
    assert!((refit.calculate_earth_valuation(&scenario_inputs) - observed).abs() < 1e-6);
    assert!((refit.calculate_earth_valuation(&ValuationInputs::default()) - 124.48).abs() < 1e-9);
}

/// Test the whole pipeline from a snapshot file on disk
#[test]
fn test_snapshot_file_round_trip() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(anchored_snapshot_json().as_bytes()).unwrap();

    let snapshot = Snapshot::from_path(file.path()).unwrap();
    let mut session = ValuationSession::new(&snapshot);

    let outputs = session.key_outputs().unwrap();
    assert_eq!(outputs.earth_value, Some(124.48));
    assert_eq!(outputs.earth_cumulative_revenue, Some(488.0));
    assert_eq!(outputs.earth_cumulative_costs, Some(195.0));
    assert_eq!(outputs.mars_cumulative_cost, Some(0.085));

    let model = session.surrogate().unwrap();
    let report = session.verify_consistency(&model, 1e-9).unwrap();
    assert!(report.passed(), "{report}");
}
