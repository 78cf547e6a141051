//! Valuation input vector
//!
//! The handful of business parameters the surrogate model responds to,
//! grouped the way the source workbook groups its driver cells. Every
//! field has a baseline value; `Default` is exactly the baseline vector
//! the ground-truth anchors were captured at, and partial JSON input
//! deserializes with the missing fields completed from it.

use serde::{Deserialize, Serialize};

/// Full parameter vector for one valuation scenario
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ValuationInputs {
    pub earth: EarthInputs,
    pub mars: MarsInputs,
    pub financial: FinancialInputs,
}

/// Drivers of the Earth (launch + constellation) component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EarthInputs {
    /// Broadband market penetration reached by the constellation,
    /// as a fraction of the addressable market.
    pub starlink_penetration: f64,
    /// Launches per year at steady state.
    pub launch_volume: f64,
    /// Payload mass to orbit per launch, in tonnes.
    pub payload_capacity: f64,
    /// Annual decline rate of bandwidth pricing.
    pub bandwidth_price_decline: f64,
    /// Annual decline rate of cost per launch.
    pub launch_cost_decline: f64,
    /// Fraction of launches flown on reused hardware.
    pub reusability_rate: f64,
}

impl Default for EarthInputs {
    fn default() -> Self {
        Self {
            starlink_penetration: 0.15,
            launch_volume: 150.0,
            payload_capacity: 100.0,
            bandwidth_price_decline: 0.08,
            launch_cost_decline: 0.15,
            reusability_rate: 0.90,
        }
    }
}

/// Drivers of the Mars component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarsInputs {
    /// Year the first permanent colony is established.
    pub first_colony_year: f64,
    /// Annual colony population growth rate.
    pub population_growth: f64,
    /// Annual decline rate of Earth-to-Mars transport cost.
    pub transport_cost_decline: f64,
    /// Whether the colony reaches industrial self-sufficiency. When
    /// false the valuation is cut to a tenth.
    pub industrial_bootstrap: bool,
}

impl Default for MarsInputs {
    fn default() -> Self {
        Self {
            first_colony_year: 2030.0,
            population_growth: 0.50,
            transport_cost_decline: 0.20,
            industrial_bootstrap: true,
        }
    }
}

/// Discounting assumptions shared by both components
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinancialInputs {
    /// Discount rate applied to future cash flows.
    pub discount_rate: f64,
    /// Terminal growth rate in the continuing-value term.
    pub terminal_growth: f64,
}

impl Default for FinancialInputs {
    fn default() -> Self {
        Self {
            discount_rate: 0.12,
            terminal_growth: 0.03,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_is_the_baseline_vector() {
        let inputs = ValuationInputs::default();
        assert_eq!(inputs.earth.starlink_penetration, 0.15);
        assert_eq!(inputs.earth.launch_volume, 150.0);
        assert_eq!(inputs.earth.reusability_rate, 0.90);
        assert_eq!(inputs.mars.first_colony_year, 2030.0);
        assert!(inputs.mars.industrial_bootstrap);
        assert_eq!(inputs.financial.discount_rate, 0.12);
        assert_eq!(inputs.financial.terminal_growth, 0.03);
    }

    #[test]
    fn partial_json_completes_with_baselines() {
        let inputs: ValuationInputs = serde_json::from_str(
            r#"{"earth": {"starlink_penetration": 0.25}, "mars": {"industrial_bootstrap": false}}"#,
        )
        .unwrap();

        assert_eq!(inputs.earth.starlink_penetration, 0.25);
        // Untouched fields keep their baselines
        assert_eq!(inputs.earth.launch_volume, 150.0);
        assert!(!inputs.mars.industrial_bootstrap);
        assert_eq!(inputs.financial.discount_rate, 0.12);
    }
}
