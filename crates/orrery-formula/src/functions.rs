//! Builtin spreadsheet functions
//!
//! Every function works over `Option<f64>`, the evaluator's null-aware
//! value type: `None` is a blank or non-numeric cell. Degenerate numeric
//! inputs (zero divisors, non-positive logarithms, zero-period growth)
//! recover to `0.0` locally instead of poisoning the whole computation,
//! which is how the financial models these snapshots come from expect
//! their edge rows to behave.

use crate::ast::BinaryOperator;

/// Sum of the numeric values, blanks skipped
pub fn sum(values: &[Option<f64>]) -> f64 {
    values.iter().flatten().sum()
}

/// Largest numeric value, `0.0` when none are numeric
pub fn max(values: &[Option<f64>]) -> f64 {
    values.iter().flatten().fold(None, |best: Option<f64>, &v| {
        Some(best.map_or(v, |b| b.max(v)))
    })
    .unwrap_or(0.0)
}

/// Smallest numeric value, `0.0` when none are numeric
pub fn min(values: &[Option<f64>]) -> f64 {
    values.iter().flatten().fold(None, |best: Option<f64>, &v| {
        Some(best.map_or(v, |b| b.min(v)))
    })
    .unwrap_or(0.0)
}

/// Ternary select over already-resolved branches
///
/// A condition is truthy when it is a nonzero number; blanks are falsy.
pub fn if_statement(
    condition: Option<f64>,
    if_true: Option<f64>,
    if_false: Option<f64>,
) -> Option<f64> {
    if matches!(condition, Some(n) if n != 0.0) {
        if_true
    } else {
        if_false
    }
}

/// Fallback when the first value is blank or NaN
///
/// Zero is a legitimate value and passes through.
pub fn if_error(value: Option<f64>, fallback: Option<f64>) -> Option<f64> {
    match value {
        Some(v) if !v.is_nan() => Some(v),
        _ => fallback,
    }
}

/// Logarithm of `value` in `base`
///
/// The outer `Option` on `base` is argument presence: `None` means the
/// base argument was omitted and natural log is taken. Non-positive
/// values and degenerate bases recover to `0.0`.
pub fn log(value: Option<f64>, base: Option<Option<f64>>) -> Option<f64> {
    let v = value?;
    let b = match base {
        None => std::f64::consts::E,
        Some(base) => base?,
    };
    if v <= 0.0 || b <= 0.0 || b == 1.0 {
        return Some(0.0);
    }
    Some(v.log(b))
}

/// e raised to `value`
pub fn exp(value: Option<f64>) -> Option<f64> {
    Some(value?.exp())
}

/// Equivalent periodic growth rate: `(fv / pv)^(1 / nper) - 1`
///
/// Zero periods or zero principal recover to `0.0`, as does a
/// sign-flipping trajectory that has no real rate.
pub fn rri(nper: Option<f64>, pv: Option<f64>, fv: Option<f64>) -> Option<f64> {
    let n = nper?;
    let p = pv?;
    let f = fv?;
    if n == 0.0 || p == 0.0 {
        return Some(0.0);
    }
    let ratio = f / p;
    if ratio < 0.0 {
        return Some(0.0);
    }
    Some(ratio.powf(1.0 / n) - 1.0)
}

/// Apply one arithmetic operator, nulls propagating
pub fn apply_binary(op: BinaryOperator, lhs: Option<f64>, rhs: Option<f64>) -> Option<f64> {
    let l = lhs?;
    let r = rhs?;
    let result = match op {
        BinaryOperator::Add => l + r,
        BinaryOperator::Subtract => l - r,
        BinaryOperator::Multiply => l * r,
        BinaryOperator::Divide => {
            if r == 0.0 {
                0.0
            } else {
                l / r
            }
        }
    };
    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sum_skips_blanks() {
        assert_eq!(sum(&[Some(1.0), None, Some(2.5)]), 3.5);
        assert_eq!(sum(&[]), 0.0);
        assert_eq!(sum(&[None, None]), 0.0);
    }

    #[test]
    fn max_and_min_default_to_zero() {
        assert_eq!(max(&[Some(-3.0), None, Some(-1.0)]), -1.0);
        assert_eq!(min(&[Some(-3.0), None, Some(-1.0)]), -3.0);
        // All-blank input does not produce an infinity sentinel
        assert_eq!(max(&[None, None]), 0.0);
        assert_eq!(min(&[None, None]), 0.0);
        assert_eq!(max(&[]), 0.0);
    }

    #[test]
    fn if_condition_truthiness() {
        assert_eq!(if_statement(Some(1.0), Some(10.0), Some(20.0)), Some(10.0));
        assert_eq!(if_statement(Some(-0.5), Some(10.0), Some(20.0)), Some(10.0));
        assert_eq!(if_statement(Some(0.0), Some(10.0), Some(20.0)), Some(20.0));
        assert_eq!(if_statement(None, Some(10.0), Some(20.0)), Some(20.0));
        // Branches stay whatever they resolved to, including blank
        assert_eq!(if_statement(Some(1.0), None, Some(20.0)), None);
    }

    #[test]
    fn if_error_fallback_rules() {
        assert_eq!(if_error(Some(f64::NAN), Some(5.0)), Some(5.0));
        assert_eq!(if_error(None, Some(5.0)), Some(5.0));
        // Zero is a value, not an error
        assert_eq!(if_error(Some(0.0), Some(5.0)), Some(0.0));
        assert_eq!(if_error(Some(2.0), Some(5.0)), Some(2.0));
        assert_eq!(if_error(None, None), None);
    }

    #[test]
    fn log_edge_cases_recover_to_zero() {
        assert_eq!(log(Some(8.0), Some(Some(2.0))), Some(3.0));
        assert_eq!(log(Some(0.0), None), Some(0.0));
        assert_eq!(log(Some(-4.0), Some(Some(10.0))), Some(0.0));
        assert_eq!(log(Some(100.0), Some(Some(1.0))), Some(0.0));
        assert_eq!(log(Some(100.0), Some(Some(0.0))), Some(0.0));
        assert_eq!(log(None, None), None);
        // Present-but-blank base propagates blank
        assert_eq!(log(Some(8.0), Some(None)), None);

        let natural = log(Some(std::f64::consts::E), None).unwrap();
        assert!((natural - 1.0).abs() < 1e-12);
    }

    #[test]
    fn exp_propagates_blank() {
        assert_eq!(exp(Some(0.0)), Some(1.0));
        assert_eq!(exp(None), None);
    }

    #[test]
    fn rri_growth_rate() {
        let rate = rri(Some(10.0), Some(100.0), Some(200.0)).unwrap();
        assert!((rate - (2.0f64.powf(0.1) - 1.0)).abs() < 1e-12);

        assert_eq!(rri(Some(0.0), Some(100.0), Some(150.0)), Some(0.0));
        assert_eq!(rri(Some(10.0), Some(0.0), Some(150.0)), Some(0.0));
        assert_eq!(rri(Some(10.0), Some(100.0), Some(-150.0)), Some(0.0));
        assert_eq!(rri(None, Some(100.0), Some(150.0)), None);
    }

    #[test]
    fn binary_arithmetic() {
        use BinaryOperator::*;

        assert_eq!(apply_binary(Add, Some(2.0), Some(3.0)), Some(5.0));
        assert_eq!(apply_binary(Subtract, Some(2.0), Some(3.0)), Some(-1.0));
        assert_eq!(apply_binary(Multiply, Some(2.0), Some(3.0)), Some(6.0));
        assert_eq!(apply_binary(Divide, Some(7.0), Some(2.0)), Some(3.5));
        assert_eq!(apply_binary(Divide, Some(7.0), Some(0.0)), Some(0.0));
        assert_eq!(apply_binary(Add, None, Some(3.0)), None);
        assert_eq!(apply_binary(Multiply, Some(3.0), None), None);
    }
}
