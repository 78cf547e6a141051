//! Formula abstract syntax tree types
//!
//! The grammar subset keeps the tree shallow: a formula is a literal, a
//! reference, one arithmetic operation between two leaves, or a single
//! call into the supported function library. The parser enforces the
//! shape; everything deeper parses as unsupported.

use std::fmt;

use orrery_core::{CellAddress, CellRange};

/// Formula expression
#[derive(Debug, Clone, PartialEq)]
pub enum FormulaExpr {
    /// Numeric literal
    Number(f64),
    /// String literal
    Text(String),
    /// Boolean literal
    Bool(bool),
    /// Single cell reference, optionally sheet-qualified
    CellRef(CellRef),
    /// Range reference, optionally sheet-qualified; only valid inside
    /// aggregate function arguments
    RangeRef(RangeRef),
    /// One arithmetic operation between two leaf operands
    BinaryOp {
        op: BinaryOperator,
        left: Box<FormulaExpr>,
        right: Box<FormulaExpr>,
    },
    /// Call into the supported function library
    FunctionCall {
        name: FunctionName,
        args: Vec<FormulaExpr>,
    },
}

/// Cell reference with optional sheet qualifier
///
/// `sheet: None` means the sheet the formula lives on.
#[derive(Debug, Clone, PartialEq)]
pub struct CellRef {
    pub sheet: Option<String>,
    pub address: CellAddress,
}

/// Range reference with optional sheet qualifier
#[derive(Debug, Clone, PartialEq)]
pub struct RangeRef {
    pub sheet: Option<String>,
    pub range: CellRange,
}

/// Arithmetic operators
///
/// The grammar supports nothing else; comparison, concatenation, and
/// exponentiation all parse as unsupported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

/// The supported function library, closed by construction
///
/// Unknown names never reach evaluation: the parser resolves names into
/// this enum and reports anything else as unsupported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionName {
    Sum,
    Max,
    Min,
    If,
    IfError,
    Log,
    Exp,
    Rri,
}

impl FunctionName {
    /// Resolve a function name, case-insensitively
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "SUM" => Some(FunctionName::Sum),
            "MAX" => Some(FunctionName::Max),
            "MIN" => Some(FunctionName::Min),
            "IF" => Some(FunctionName::If),
            "IFERROR" => Some(FunctionName::IfError),
            "LOG" => Some(FunctionName::Log),
            "EXP" => Some(FunctionName::Exp),
            "RRI" => Some(FunctionName::Rri),
            _ => None,
        }
    }

    /// Canonical spreadsheet spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            FunctionName::Sum => "SUM",
            FunctionName::Max => "MAX",
            FunctionName::Min => "MIN",
            FunctionName::If => "IF",
            FunctionName::IfError => "IFERROR",
            FunctionName::Log => "LOG",
            FunctionName::Exp => "EXP",
            FunctionName::Rri => "RRI",
        }
    }
}

impl fmt::Display for FunctionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
