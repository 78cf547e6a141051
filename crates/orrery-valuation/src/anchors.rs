//! Anchor cells and ground-truth capture
//!
//! The surrogate is pinned to a handful of headline cells in the
//! snapshot. [`AnchorCells`] names where those cells live (the default
//! layout matches the workbook export this engine was built against and
//! can be overridden from serde config), [`KeyOutputs`] is what one
//! capture pass reads out of them, and [`BaselineOutputs`] resolves the
//! captured values against built-in fallbacks so the model always has a
//! complete anchor set to scale from.

use orrery_formula::{Evaluator, FormulaResult};
use serde::{Deserialize, Serialize};

/// Baseline Earth component value in billions
pub const BASELINE_EARTH_VALUE: f64 = 124.48;
/// Baseline cumulative Earth revenue in billions
pub const BASELINE_EARTH_CUMULATIVE_REVENUE: f64 = 488.0;
/// Baseline cumulative Earth costs in billions
pub const BASELINE_EARTH_CUMULATIVE_COSTS: f64 = 195.0;
/// Baseline cumulative Earth taxes in billions
pub const BASELINE_EARTH_CUMULATIVE_TAXES: f64 = 102.0;
/// Baseline Mars component value in billions
pub const BASELINE_MARS_VALUE: f64 = 0.745;
/// Baseline cumulative Mars value in billions
pub const BASELINE_MARS_CUMULATIVE_VALUE: f64 = 0.52;
/// Baseline cumulative Mars revenue in billions
pub const BASELINE_MARS_CUMULATIVE_REVENUE: f64 = 0.31;
/// Baseline cumulative Mars cost in billions
pub const BASELINE_MARS_CUMULATIVE_COST: f64 = 0.085;

/// One named cell location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorCell {
    pub sheet: String,
    pub reference: String,
}

impl AnchorCell {
    pub fn new(sheet: &str, reference: &str) -> Self {
        Self {
            sheet: sheet.to_string(),
            reference: reference.to_string(),
        }
    }
}

/// Where each headline output lives in the snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorCells {
    pub earth_value: AnchorCell,
    pub mars_value: AnchorCell,
    pub total_value: AnchorCell,
    pub earth_cumulative_revenue: AnchorCell,
    pub earth_cumulative_costs: AnchorCell,
    pub earth_cumulative_taxes: AnchorCell,
    pub mars_cumulative_value: AnchorCell,
    pub mars_cumulative_revenue: AnchorCell,
    pub mars_cumulative_cost: AnchorCell,
}

impl Default for AnchorCells {
    fn default() -> Self {
        Self {
            earth_value: AnchorCell::new("Summary", "B2"),
            mars_value: AnchorCell::new("Summary", "B3"),
            total_value: AnchorCell::new("Summary", "B4"),
            earth_cumulative_revenue: AnchorCell::new("Earth", "B10"),
            earth_cumulative_costs: AnchorCell::new("Earth", "B11"),
            earth_cumulative_taxes: AnchorCell::new("Earth", "B12"),
            mars_cumulative_value: AnchorCell::new("Mars", "B10"),
            mars_cumulative_revenue: AnchorCell::new("Mars", "B11"),
            mars_cumulative_cost: AnchorCell::new("Mars", "B12"),
        }
    }
}

/// Headline outputs read from one snapshot capture pass
///
/// Every field is optional: a snapshot export that lacks an anchor cell
/// (or holds text there) simply captures nothing for it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct KeyOutputs {
    pub earth_value: Option<f64>,
    pub mars_value: Option<f64>,
    pub total_value: Option<f64>,
    pub earth_cumulative_revenue: Option<f64>,
    pub earth_cumulative_costs: Option<f64>,
    pub earth_cumulative_taxes: Option<f64>,
    pub mars_cumulative_value: Option<f64>,
    pub mars_cumulative_revenue: Option<f64>,
    pub mars_cumulative_cost: Option<f64>,
}

impl KeyOutputs {
    /// Evaluate every anchor cell through the graph evaluator
    ///
    /// The only error is a reference cycle somewhere under an anchor.
    pub fn capture(evaluator: &mut Evaluator<'_>, cells: &AnchorCells) -> FormulaResult<Self> {
        let mut value = |cell: &AnchorCell| -> FormulaResult<Option<f64>> {
            evaluator.get_cell_value(&cell.sheet, &cell.reference)
        };
        Ok(Self {
            earth_value: value(&cells.earth_value)?,
            mars_value: value(&cells.mars_value)?,
            total_value: value(&cells.total_value)?,
            earth_cumulative_revenue: value(&cells.earth_cumulative_revenue)?,
            earth_cumulative_costs: value(&cells.earth_cumulative_costs)?,
            earth_cumulative_taxes: value(&cells.earth_cumulative_taxes)?,
            mars_cumulative_value: value(&cells.mars_cumulative_value)?,
            mars_cumulative_revenue: value(&cells.mars_cumulative_revenue)?,
            mars_cumulative_cost: value(&cells.mars_cumulative_cost)?,
        })
    }
}

/// Mars option value components
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarsOptionAnchors {
    pub cumulative_value: f64,
    pub cumulative_revenue: f64,
    pub cumulative_cost: f64,
}

impl MarsOptionAnchors {
    /// `value + revenue - cost`, the option's base figure
    pub fn base_value(&self) -> f64 {
        self.cumulative_value + self.cumulative_revenue - self.cumulative_cost
    }
}

/// Fully resolved baseline anchor set
///
/// Construction from [`KeyOutputs`] fills gaps with the built-in
/// constants and logs each substitution. The Mars option components are
/// the one exception: when the snapshot provides none of the three, the
/// whole group resolves to `None` and the model substitutes the Mars
/// valuation figure for the option value instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineOutputs {
    pub earth_value: f64,
    pub mars_value: f64,
    pub earth_cumulative_revenue: f64,
    pub earth_cumulative_costs: f64,
    pub earth_cumulative_taxes: f64,
    pub mars_option: Option<MarsOptionAnchors>,
}

impl Default for BaselineOutputs {
    fn default() -> Self {
        Self {
            earth_value: BASELINE_EARTH_VALUE,
            mars_value: BASELINE_MARS_VALUE,
            earth_cumulative_revenue: BASELINE_EARTH_CUMULATIVE_REVENUE,
            earth_cumulative_costs: BASELINE_EARTH_CUMULATIVE_COSTS,
            earth_cumulative_taxes: BASELINE_EARTH_CUMULATIVE_TAXES,
            mars_option: Some(MarsOptionAnchors {
                cumulative_value: BASELINE_MARS_CUMULATIVE_VALUE,
                cumulative_revenue: BASELINE_MARS_CUMULATIVE_REVENUE,
                cumulative_cost: BASELINE_MARS_CUMULATIVE_COST,
            }),
        }
    }
}

impl BaselineOutputs {
    /// Resolve captured outputs against the built-in fallbacks
    pub fn from_key_outputs(outputs: &KeyOutputs) -> Self {
        let resolve = |captured: Option<f64>, name: &str, fallback: f64| -> f64 {
            match captured {
                Some(value) => value,
                None => {
                    log::warn!("anchor cell for {name} missing; using built-in {fallback}");
                    fallback
                }
            }
        };

        let mars_option = if outputs.mars_cumulative_value.is_none()
            && outputs.mars_cumulative_revenue.is_none()
            && outputs.mars_cumulative_cost.is_none()
        {
            log::warn!("no Mars option anchors captured; option value will track the Mars valuation");
            None
        } else {
            Some(MarsOptionAnchors {
                cumulative_value: resolve(
                    outputs.mars_cumulative_value,
                    "mars cumulative value",
                    BASELINE_MARS_CUMULATIVE_VALUE,
                ),
                cumulative_revenue: resolve(
                    outputs.mars_cumulative_revenue,
                    "mars cumulative revenue",
                    BASELINE_MARS_CUMULATIVE_REVENUE,
                ),
                cumulative_cost: resolve(
                    outputs.mars_cumulative_cost,
                    "mars cumulative cost",
                    BASELINE_MARS_CUMULATIVE_COST,
                ),
            })
        };

        Self {
            earth_value: resolve(outputs.earth_value, "earth value", BASELINE_EARTH_VALUE),
            mars_value: resolve(outputs.mars_value, "mars value", BASELINE_MARS_VALUE),
            earth_cumulative_revenue: resolve(
                outputs.earth_cumulative_revenue,
                "earth cumulative revenue",
                BASELINE_EARTH_CUMULATIVE_REVENUE,
            ),
            earth_cumulative_costs: resolve(
                outputs.earth_cumulative_costs,
                "earth cumulative costs",
                BASELINE_EARTH_CUMULATIVE_COSTS,
            ),
            earth_cumulative_taxes: resolve(
                outputs.earth_cumulative_taxes,
                "earth cumulative taxes",
                BASELINE_EARTH_CUMULATIVE_TAXES,
            ),
            mars_option,
        }
    }
}
