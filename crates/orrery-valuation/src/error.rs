//! Error types for calibration and fitting

use thiserror::Error;

use crate::calibration::GainTarget;

pub type ValuationResult<T> = std::result::Result<T, ValuationError>;

#[derive(Debug, Error)]
pub enum ValuationError {
    /// A scenario's observed output is NaN or infinite
    #[error("Observed value for the {0} scenario is not finite")]
    NonFiniteObservation(GainTarget),

    /// The scenario's output does not respond to the gain being fitted,
    /// so no gain value can reproduce the observation
    #[error("Scenario does not move the {0} gain; choose inputs away from baseline")]
    DegenerateScenario(GainTarget),

    /// The secant iteration ran out of steps. The response is linear in
    /// each gain away from the multiplier clamp, so this indicates a
    /// scenario pinned against the clamp.
    #[error("Fitting the {target} gain did not converge after {iterations} iterations")]
    NoConvergence { target: GainTarget, iterations: usize },
}
