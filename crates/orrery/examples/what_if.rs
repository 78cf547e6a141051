//! Example: Load a snapshot, anchor a surrogate, and sweep scenarios

use orrery::prelude::*;

const SNAPSHOT_JSON: &str = r#"{
    "Summary": {"cells": {
        "B2": {"formula": "=Earth!B20"},
        "B3": {"formula": "=Mars!B14"},
        "B4": {"formula": "=B5+B3"},
        "B5": {"formula": "=B2*18"}
    }},
    "Earth": {"cells": {
        "B10": {"value": 488},
        "B11": {"value": 195},
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
}"#;

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let snapshot = Snapshot::from_json_str(SNAPSHOT_JSON)?;
    let mut session = ValuationSession::new(&snapshot);

    // Evaluate the headline cells through the formula graph
    let outputs = session.key_outputs()?;
    println!("Graph-evaluated anchors:");
    println!("  Earth value: {:?}", outputs.earth_value);
    println!("  Mars value:  {:?}", outputs.mars_value);
    println!("  Total value: {:?}", outputs.total_value);

    // Anchor a surrogate and check it against the graph
    let model = session.surrogate()?;
    let report = session.verify_consistency(&model, 1e-9)?;
    println!("\nConsistency at the anchors:\n{report}");

    // Sweep Starlink penetration, everything else at baseline
    println!("Penetration sweep:");
    for penetration in [0.05, 0.10, 0.15, 0.20, 0.30] {
        let inputs = ValuationInputs {
            earth: EarthInputs {
                starlink_penetration: penetration,
                ..EarthInputs::default()
            },
            ..ValuationInputs::default()
        };
        println!(
            "  penetration {:>4.0}% -> earth {:>8.2}B, total {:>8.2}B",
            penetration * 100.0,
            model.calculate_earth_valuation(&inputs),
            model.calculate_total_enterprise_value(&inputs)
        );
    }

    // One structural what-if on the Mars side
    let no_bootstrap = ValuationInputs {
        mars: MarsInputs {
            industrial_bootstrap: false,
            ..MarsInputs::default()
        },
        ..ValuationInputs::default()
    };
    println!(
        "\nMars without industrial bootstrap: {:.3}B (baseline {:.3}B)",
        model.calculate_mars_valuation(&no_bootstrap),
        model.calculate_mars_valuation(&ValuationInputs::default())
    );

    Ok(())
}
