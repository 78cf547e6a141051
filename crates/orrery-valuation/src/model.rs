//! Closed-form surrogate valuation
//!
//! Reproduces the snapshot's headline valuations from a
//! [`ValuationInputs`] vector without touching the dependency graph.
//! Each input contributes a ratio-to-baseline factor; independent
//! drivers combine multiplicatively, and each multiplier is reshaped
//! through a fitted gain as `1 + gain * (raw - 1)`, which leaves the
//! baseline anchor exact for any gain. Everything here is a pure
//! function over the captured baselines and the calibration table, so
//! parameter sweeps are just loops.

use crate::anchors::BaselineOutputs;
use crate::calibration::CalibrationTable;
use crate::inputs::ValuationInputs;

/// Denominator guard for ratio factors
const MIN_DENOMINATOR: f64 = 1e-9;
/// Floor on the discount-minus-growth spread in the terminal term
const MIN_RATE_SPREAD: f64 = 1e-3;

/// Surrogate model anchored to one set of ground-truth outputs
///
/// # Example
/// ```rust
/// use orrery_valuation::{BaselineOutputs, CalibrationTable, SurrogateModel, ValuationInputs};
///
/// let model = SurrogateModel::new(BaselineOutputs::default(), CalibrationTable::default());
///
/// // At the baseline vector the anchors are reproduced exactly
/// let baseline = ValuationInputs::default();
/// assert!((model.calculate_earth_valuation(&baseline) - 124.48).abs() < 0.1);
/// assert!((model.calculate_mars_valuation(&baseline) - 0.745).abs() < 0.001);
/// ```
#[derive(Debug, Clone)]
pub struct SurrogateModel {
    baselines: BaselineOutputs,
    baseline_inputs: ValuationInputs,
    calibration: CalibrationTable,
}

impl SurrogateModel {
    /// Anchor a model to captured baselines and a calibration table
    ///
    /// The baseline input vector is fixed: it is the vector the anchors
    /// were captured at, `ValuationInputs::default()`.
    pub fn new(baselines: BaselineOutputs, calibration: CalibrationTable) -> Self {
        Self {
            baselines,
            baseline_inputs: ValuationInputs::default(),
            calibration,
        }
    }

    pub fn baselines(&self) -> &BaselineOutputs {
        &self.baselines
    }

    pub fn calibration(&self) -> &CalibrationTable {
        &self.calibration
    }

    /// Earth component value in billions
    ///
    /// Zero or negative penetration short-circuits to 0; the valuation
    /// is undefined below any adoption at all.
    pub fn calculate_earth_valuation(&self, inputs: &ValuationInputs) -> f64 {
        if inputs.earth.starlink_penetration <= 0.0 {
            return 0.0;
        }

        let revenue_multiplier = self.revenue_multiplier(inputs);
        let cost_multiplier = self.cost_multiplier(inputs);
        // Taxes scale with revenue
        let tax_multiplier = revenue_multiplier;

        let b = &self.baselines;
        let baseline_net = b.earth_cumulative_revenue
            - b.earth_cumulative_costs
            - b.earth_cumulative_taxes;
        let net = b.earth_cumulative_revenue * revenue_multiplier
            - b.earth_cumulative_costs * cost_multiplier
            - b.earth_cumulative_taxes * tax_multiplier;

        b.earth_value * (net / non_zero(baseline_net))
            * self.discount_factor(inputs)
            * self.terminal_growth_factor(inputs)
    }

    /// Mars component value in billions
    pub fn calculate_mars_valuation(&self, inputs: &ValuationInputs) -> f64 {
        self.baselines.mars_value * self.mars_multiplier(inputs)
    }

    /// Mars option value in billions
    ///
    /// Cumulative value + revenue - cost from the anchor cells, scaled
    /// by the Mars multiplier chain. Without option anchors this tracks
    /// the Mars valuation figure, an approximation rather than parity.
    pub fn calculate_mars_option_value(&self, inputs: &ValuationInputs) -> f64 {
        match &self.baselines.mars_option {
            Some(anchors) => anchors.base_value() * self.mars_multiplier(inputs),
            None => self.calculate_mars_valuation(inputs),
        }
    }

    /// Combined enterprise value in billions
    pub fn calculate_total_enterprise_value(&self, inputs: &ValuationInputs) -> f64 {
        let c = &self.calibration;
        let combined = self.calculate_earth_valuation(inputs) * c.dilution_multiplier
            + self.calculate_mars_valuation(inputs);
        combined / non_zero(c.normalization_divisor)
    }

    /// Gain-reshaped Earth revenue multiplier
    pub fn revenue_multiplier(&self, inputs: &ValuationInputs) -> f64 {
        let c = &self.calibration;
        let e = &inputs.earth;
        let b = &self.baseline_inputs.earth;

        let raw = positive_ratio(e.starlink_penetration, b.starlink_penetration)
            .powf(c.penetration_exponent)
            * positive_ratio(e.launch_volume, b.launch_volume).powf(c.volume_exponent)
            * positive_ratio(e.payload_capacity, b.payload_capacity).powf(c.payload_exponent)
            * decline_factor(
                e.bandwidth_price_decline,
                b.bandwidth_price_decline,
                c.price_decline_horizon_years,
            )
            * self.viability_factor(e.starlink_penetration);

        reshape(raw, c.revenue_gain).max(0.0)
    }

    /// Gain-reshaped and clamped Earth cost multiplier
    ///
    /// Always inside `[cost_multiplier_floor, cost_multiplier_ceiling]`;
    /// the clamp bounds extrapolation, not ordinary operation.
    pub fn cost_multiplier(&self, inputs: &ValuationInputs) -> f64 {
        let c = &self.calibration;
        let e = &inputs.earth;
        let b = &self.baseline_inputs.earth;

        let scale_economies = positive_ratio(e.starlink_penetration, b.starlink_penetration)
            .powf(c.penetration_exponent)
            * positive_ratio(e.launch_volume, b.launch_volume).powf(c.volume_exponent);
        let raw = (1.0 / non_zero(scale_economies))
            * decline_factor(
                e.launch_cost_decline,
                b.launch_cost_decline,
                c.cost_decline_horizon_years,
            )
            * expendable_ratio(e.reusability_rate, b.reusability_rate);

        reshape(raw, c.cost_gain).clamp(c.cost_multiplier_floor, c.cost_multiplier_ceiling)
    }

    /// Gain-reshaped Mars multiplier, including the bootstrap penalty
    pub fn mars_multiplier(&self, inputs: &ValuationInputs) -> f64 {
        let c = &self.calibration;
        let m = &inputs.mars;
        let b = &self.baseline_inputs.mars;

        let delay_years = m.first_colony_year - b.first_colony_year;
        let delay_factor = (1.0 - c.colony_delay_decay).max(0.0).powf(delay_years);
        let raw = delay_factor
            * positive_ratio(m.population_growth, b.population_growth)
            * positive_ratio(m.transport_cost_decline, b.transport_cost_decline);

        let mut multiplier = reshape(raw, c.mars_gain).max(0.0);
        if !m.industrial_bootstrap {
            multiplier /= non_zero(c.bootstrap_penalty);
        }
        multiplier
    }

    fn discount_factor(&self, inputs: &ValuationInputs) -> f64 {
        let baseline_rate = self.baseline_inputs.financial.discount_rate;
        positive_ratio(baseline_rate, inputs.financial.discount_rate)
            .powf(self.calibration.discount_exponent)
    }

    /// Terminal-growth sensitivity, blended at the terminal-value share
    fn terminal_growth_factor(&self, inputs: &ValuationInputs) -> f64 {
        let f = &self.baseline_inputs.financial;
        let baseline_spread = f.discount_rate - f.terminal_growth;
        let spread = (f.discount_rate - inputs.financial.terminal_growth).max(MIN_RATE_SPREAD);

        let weight = self.calibration.terminal_value_weight;
        (1.0 - weight) + weight * (baseline_spread / spread)
    }

    /// Linear ramp from 0 to 1 below the minimum viable penetration
    fn viability_factor(&self, penetration: f64) -> f64 {
        let min_viable = self.calibration.min_viable_penetration;
        if penetration >= min_viable {
            1.0
        } else {
            (penetration / non_zero(min_viable)).max(0.0)
        }
    }
}

impl Default for SurrogateModel {
    /// Built-in baselines and the shipped calibration table
    fn default() -> Self {
        Self::new(BaselineOutputs::default(), CalibrationTable::default())
    }
}

/// `1 + gain * (raw - 1)`: rescale distance from the baseline point
fn reshape(raw: f64, gain: f64) -> f64 {
    1.0 + gain * (raw - 1.0)
}

/// Ratio with a guarded denominator and a non-negative numerator, so
/// fractional powers stay real
fn positive_ratio(value: f64, baseline: f64) -> f64 {
    value.max(0.0) / baseline.max(MIN_DENOMINATOR)
}

fn non_zero(value: f64) -> f64 {
    if value.abs() < MIN_DENOMINATOR {
        MIN_DENOMINATOR
    } else {
        value
    }
}

/// Ratio of retained fractions after an annual decline, compounded over
/// the horizon: `((1 - decline) / (1 - baseline))^horizon`
fn decline_factor(decline: f64, baseline_decline: f64, horizon_years: f64) -> f64 {
    let retained = (1.0 - decline).max(0.0);
    let baseline_retained = (1.0 - baseline_decline).max(0.0);
    positive_ratio(retained, baseline_retained).powf(horizon_years)
}

/// Ratio of expendable (non-reused) launch fractions; cost tracks the
/// hardware thrown away
fn expendable_ratio(reusability: f64, baseline_reusability: f64) -> f64 {
    let expendable = (1.0 - reusability).max(0.0);
    let baseline_expendable = (1.0 - baseline_reusability).max(0.0);
    positive_ratio(expendable, baseline_expendable)
}
