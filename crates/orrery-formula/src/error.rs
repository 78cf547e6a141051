//! Formula error types

use std::fmt;

use thiserror::Error;

use crate::ast::FunctionName;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Errors that can occur during formula parsing or evaluation
#[derive(Debug, Error)]
pub enum FormulaError {
    /// Formula falls outside the supported grammar subset
    ///
    /// This is the parser's honest "I cannot evaluate this" answer. The
    /// evaluator degrades it to a null result; callers that parse directly
    /// see the typed reason.
    #[error("Unsupported formula: {0}")]
    Unsupported(UnsupportedReason),

    /// Circular dependency between formula cells
    ///
    /// The one fatal evaluation error. Silently defaulting a cycle would
    /// mask snapshot corruption, so it always surfaces.
    #[error("Circular reference detected at {cell}")]
    Circular {
        /// Qualified cell name, e.g. "Model!A1"
        cell: String,
    },
}

impl FormulaError {
    /// Shorthand for the unsupported-formula case
    pub fn unsupported(reason: UnsupportedReason) -> Self {
        FormulaError::Unsupported(reason)
    }
}

/// Why a formula falls outside the supported grammar
///
/// Each gap in coverage gets its own reason so the gaps stay visible and
/// testable instead of disappearing into a generic parse failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnsupportedReason {
    /// More than one arithmetic operator in a formula
    OperatorChain,
    /// Operand of an arithmetic operator is a function call
    NonLeafOperand,
    /// Function argument is itself a function call
    NonLeafArgument,
    /// Operator outside the arithmetic set (comparison, concat, power, ...)
    Operator(String),
    /// Function outside the supported library
    UnknownFunction(String),
    /// Supported function called with the wrong number of arguments
    ArgumentCount {
        function: FunctionName,
        expected: &'static str,
        actual: usize,
    },
    /// Range in a position that needs a single value
    RangeOperand,
    /// Input left over after a complete expression
    TrailingInput,
    /// Construct the grammar does not recognize
    Syntax(String),
}

impl fmt::Display for UnsupportedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnsupportedReason::OperatorChain => {
                write!(f, "operator chains are not supported")
            }
            UnsupportedReason::NonLeafOperand => {
                write!(f, "operands must be literals or cell references")
            }
            UnsupportedReason::NonLeafArgument => {
                write!(f, "function arguments must be literals or references")
            }
            UnsupportedReason::Operator(op) => {
                write!(f, "operator '{op}' is not supported")
            }
            UnsupportedReason::UnknownFunction(name) => {
                write!(f, "function '{name}' is not supported")
            }
            UnsupportedReason::ArgumentCount {
                function,
                expected,
                actual,
            } => {
                write!(f, "{function} expects {expected} argument(s), got {actual}")
            }
            UnsupportedReason::RangeOperand => {
                write!(f, "range used where a single value is required")
            }
            UnsupportedReason::TrailingInput => {
                write!(f, "unexpected input after expression")
            }
            UnsupportedReason::Syntax(what) => write!(f, "{what}"),
        }
    }
}
