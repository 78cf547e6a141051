//! Formula evaluation over a snapshot
//!
//! An [`Evaluator`] borrows one immutable [`Snapshot`] and resolves cell
//! values on demand, recursing through formula references and memoizing
//! each formula cell the first time it is computed. Formulas the parser
//! cannot represent degrade to empty with a debug log line; the only
//! hard failure is a reference cycle.

use std::collections::{HashMap, HashSet};

use orrery_core::{CellAddress, Snapshot};

use crate::ast::{CellRef, FormulaExpr, FunctionName};
use crate::dependency::{cell_display_name, CellKey};
use crate::error::{FormulaError, FormulaResult};
use crate::functions;
use crate::parser::parse_formula;

/// Lazy, memoizing evaluator for one snapshot
///
/// Results are cached per evaluator, so dropping it and building a new
/// one is how a caller invalidates everything at once.
///
/// # Example
/// ```rust
/// use orrery_core::Snapshot;
/// use orrery_formula::Evaluator;
///
/// let snapshot = Snapshot::from_json_str(
///     r#"{"Model": {"cells": {
///         "A1": {"value": 2},
///         "B1": {"formula": "=A1*3"}
///     }}}"#,
/// ).unwrap();
///
/// let mut evaluator = Evaluator::new(&snapshot);
/// assert_eq!(evaluator.get_cell_value("Model", "B1").unwrap(), Some(6.0));
/// ```
pub struct Evaluator<'s> {
    snapshot: &'s Snapshot,
    cache: HashMap<CellKey, Option<f64>>,
    in_progress: HashSet<CellKey>,
}

impl<'s> Evaluator<'s> {
    pub fn new(snapshot: &'s Snapshot) -> Self {
        Self {
            snapshot,
            cache: HashMap::new(),
            in_progress: HashSet::new(),
        }
    }

    /// The snapshot this evaluator reads
    pub fn snapshot(&self) -> &'s Snapshot {
        self.snapshot
    }

    /// Resolve a cell by sheet name and A1 reference
    ///
    /// Unknown sheets and malformed references are empty, not errors;
    /// the snapshot is data and lookups into it are total. The one
    /// error is [`FormulaError::Circular`].
    pub fn get_cell_value(
        &mut self,
        sheet: &str,
        reference: &str,
    ) -> FormulaResult<Option<f64>> {
        let Some(sheet_index) = self.snapshot.sheet_index(sheet) else {
            return Ok(None);
        };
        let Ok(address) = CellAddress::parse(reference) else {
            return Ok(None);
        };
        self.value_at(CellKey::from_address(sheet_index, &address))
    }

    fn value_at(&mut self, key: CellKey) -> FormulaResult<Option<f64>> {
        if let Some(cached) = self.cache.get(&key) {
            return Ok(*cached);
        }
        if self.in_progress.contains(&key) {
            return Err(FormulaError::Circular {
                cell: cell_display_name(self.snapshot, key),
            });
        }

        let snapshot = self.snapshot;
        let cell = match snapshot.sheet(key.sheet).and_then(|s| s.cell_at(key.row, key.col)) {
            Some(cell) => cell,
            None => return Ok(None),
        };

        let Some(formula) = &cell.formula else {
            // Plain values are a map lookup; only formula results are
            // worth caching
            return Ok(cell.value.as_number());
        };

        let result = match parse_formula(formula) {
            Ok(expr) => {
                self.in_progress.insert(key);
                let value = self.evaluate_expr(&expr, key.sheet);
                self.in_progress.remove(&key);
                value?
            }
            Err(err) => {
                log::debug!(
                    "treating formula at {} as empty: {err}",
                    cell_display_name(snapshot, key)
                );
                None
            }
        };

        self.cache.insert(key, result);
        Ok(result)
    }

    fn evaluate_expr(
        &mut self,
        expr: &FormulaExpr,
        current_sheet: usize,
    ) -> FormulaResult<Option<f64>> {
        match expr {
            FormulaExpr::Number(n) => Ok(Some(*n)),
            FormulaExpr::Text(s) => Ok(s.trim().parse().ok()),
            FormulaExpr::Bool(b) => Ok(Some(if *b { 1.0 } else { 0.0 })),
            FormulaExpr::CellRef(cell_ref) => self.resolve_ref(cell_ref, current_sheet),
            // The parser only builds ranges inside aggregate calls, which
            // spread them before evaluation reaches here
            FormulaExpr::RangeRef(_) => Ok(None),
            FormulaExpr::BinaryOp { op, left, right } => {
                let lhs = self.evaluate_expr(left, current_sheet)?;
                let rhs = self.evaluate_expr(right, current_sheet)?;
                Ok(functions::apply_binary(*op, lhs, rhs))
            }
            FormulaExpr::FunctionCall { name, args } => {
                self.apply_function(*name, args, current_sheet)
            }
        }
    }

    fn resolve_ref(
        &mut self,
        cell_ref: &CellRef,
        current_sheet: usize,
    ) -> FormulaResult<Option<f64>> {
        let sheet = match &cell_ref.sheet {
            None => Some(current_sheet),
            Some(name) => self.snapshot.sheet_index(name),
        };
        match sheet {
            Some(sheet) => self.value_at(CellKey::from_address(sheet, &cell_ref.address)),
            None => Ok(None),
        }
    }

    // Argument counts are enforced by the parser, so indexing is safe
    // here. Branches of IF evaluate eagerly; the condition only selects
    // which resolved value is returned.
    fn apply_function(
        &mut self,
        name: FunctionName,
        args: &[FormulaExpr],
        current_sheet: usize,
    ) -> FormulaResult<Option<f64>> {
        match name {
            FunctionName::Sum | FunctionName::Max | FunctionName::Min => {
                let values = self.spread_arguments(args, current_sheet)?;
                let result = match name {
                    FunctionName::Sum => functions::sum(&values),
                    FunctionName::Max => functions::max(&values),
                    _ => functions::min(&values),
                };
                Ok(Some(result))
            }
            FunctionName::If => {
                let condition = self.evaluate_expr(&args[0], current_sheet)?;
                let if_true = self.evaluate_expr(&args[1], current_sheet)?;
                let if_false = self.evaluate_expr(&args[2], current_sheet)?;
                Ok(functions::if_statement(condition, if_true, if_false))
            }
            FunctionName::IfError => {
                let value = self.evaluate_expr(&args[0], current_sheet)?;
                let fallback = self.evaluate_expr(&args[1], current_sheet)?;
                Ok(functions::if_error(value, fallback))
            }
            FunctionName::Log => {
                let value = self.evaluate_expr(&args[0], current_sheet)?;
                let base = match args.get(1) {
                    Some(arg) => Some(self.evaluate_expr(arg, current_sheet)?),
                    None => None,
                };
                Ok(functions::log(value, base))
            }
            FunctionName::Exp => {
                let value = self.evaluate_expr(&args[0], current_sheet)?;
                Ok(functions::exp(value))
            }
            FunctionName::Rri => {
                let nper = self.evaluate_expr(&args[0], current_sheet)?;
                let pv = self.evaluate_expr(&args[1], current_sheet)?;
                let fv = self.evaluate_expr(&args[2], current_sheet)?;
                Ok(functions::rri(nper, pv, fv))
            }
        }
    }

    /// Flatten aggregate arguments, expanding ranges cell by cell
    fn spread_arguments(
        &mut self,
        args: &[FormulaExpr],
        current_sheet: usize,
    ) -> FormulaResult<Vec<Option<f64>>> {
        let mut values = Vec::new();
        for arg in args {
            match arg {
                FormulaExpr::RangeRef(range_ref) => {
                    let sheet = match &range_ref.sheet {
                        None => Some(current_sheet),
                        Some(name) => self.snapshot.sheet_index(name),
                    };
                    let Some(sheet) = sheet else { continue };
                    for address in range_ref.range.cells() {
                        values.push(self.value_at(CellKey::from_address(sheet, &address))?);
                    }
                }
                _ => values.push(self.evaluate_expr(arg, current_sheet)?),
            }
        }
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn snapshot(json: &str) -> Snapshot {
        Snapshot::from_json_str(json).unwrap()
    }

    #[test]
    fn resolves_literal_cells() {
        let snapshot = snapshot(
            r#"{"Model": {"cells": {
                "A1": {"value": 2.5},
                "A2": {"value": " 17 "},
                "A3": {"value": "colony"},
                "A4": {}
            }}}"#,
        );
        let mut eval = Evaluator::new(&snapshot);

        assert_eq!(eval.get_cell_value("Model", "A1").unwrap(), Some(2.5));
        assert_eq!(eval.get_cell_value("Model", "A2").unwrap(), Some(17.0));
        assert_eq!(eval.get_cell_value("Model", "A3").unwrap(), None);
        assert_eq!(eval.get_cell_value("Model", "A4").unwrap(), None);
        assert_eq!(eval.get_cell_value("Model", "Z99").unwrap(), None);
        assert_eq!(eval.get_cell_value("Missing", "A1").unwrap(), None);
        assert_eq!(eval.get_cell_value("Model", "not a ref").unwrap(), None);
    }

    #[test]
    fn evaluates_formula_chains() {
        let snapshot = snapshot(
            r#"{"Model": {"cells": {
                "A1": {"value": 2},
                "B1": {"formula": "=A1+1"},
                "C1": {"formula": "=B1*10"}
            }}}"#,
        );
        let mut eval = Evaluator::new(&snapshot);

        assert_eq!(eval.get_cell_value("Model", "C1").unwrap(), Some(30.0));
        // B1 is now cached; asking for it directly hits the cache
        assert_eq!(eval.get_cell_value("Model", "B1").unwrap(), Some(3.0));
    }

    #[test]
    fn empty_operands_make_empty_results() {
        let snapshot = snapshot(
            r#"{"Model": {"cells": {
                "A1": {"value": "colony"},
                "B1": {"formula": "=A1*2"},
                "C1": {"formula": "=D1+1"}
            }}}"#,
        );
        let mut eval = Evaluator::new(&snapshot);

        assert_eq!(eval.get_cell_value("Model", "B1").unwrap(), None);
        assert_eq!(eval.get_cell_value("Model", "C1").unwrap(), None);
    }

    #[test]
    fn division_by_zero_is_zero() {
        let snapshot = snapshot(
            r#"{"Model": {"cells": {
                "A1": {"value": 10},
                "B1": {"value": 0},
                "C1": {"formula": "=A1/B1"}
            }}}"#,
        );
        let mut eval = Evaluator::new(&snapshot);
        assert_eq!(eval.get_cell_value("Model", "C1").unwrap(), Some(0.0));
    }

    #[test]
    fn unsupported_formulas_are_empty() {
        let snapshot = snapshot(
            r#"{"Model": {"cells": {
                "A1": {"formula": "=NPV(0.1,B1:B9)"},
                "A2": {"formula": "=1+2+3"},
                "A3": {"formula": "=A1"}
            }}}"#,
        );
        let mut eval = Evaluator::new(&snapshot);

        assert_eq!(eval.get_cell_value("Model", "A1").unwrap(), None);
        assert_eq!(eval.get_cell_value("Model", "A2").unwrap(), None);
        // Downstream of an unsupported formula is empty, not an error
        assert_eq!(eval.get_cell_value("Model", "A3").unwrap(), None);
    }

    #[test]
    fn aggregates_spread_ranges_and_skip_blanks() {
        let snapshot = snapshot(
            r#"{"Model": {"cells": {
                "A1": {"value": 1},
                "A2": {"value": "two"},
                "A4": {"value": 4},
                "B1": {"formula": "=SUM(A1:A4)"},
                "B2": {"formula": "=MAX(A1:A4)"},
                "B3": {"formula": "=MIN(A1:A4,0.5)"},
                "B4": {"formula": "=SUM(A1:A4,10,A1)"}
            }}}"#,
        );
        let mut eval = Evaluator::new(&snapshot);

        assert_eq!(eval.get_cell_value("Model", "B1").unwrap(), Some(5.0));
        assert_eq!(eval.get_cell_value("Model", "B2").unwrap(), Some(4.0));
        assert_eq!(eval.get_cell_value("Model", "B3").unwrap(), Some(0.5));
        assert_eq!(eval.get_cell_value("Model", "B4").unwrap(), Some(16.0));
    }

    #[test]
    fn if_selects_between_resolved_branches() {
        let snapshot = snapshot(
            r#"{"Model": {"cells": {
                "A1": {"value": 1},
                "A2": {"value": 0},
                "B1": {"formula": "=IF(A1,10,20)"},
                "B2": {"formula": "=IF(A2,10,20)"},
                "B3": {"formula": "=IF(A3,10,20)"},
                "C1": {"formula": "=IFERROR(A1,99)"},
                "C2": {"formula": "=IFERROR(A3,99)"}
            }}}"#,
        );
        let mut eval = Evaluator::new(&snapshot);

        assert_eq!(eval.get_cell_value("Model", "B1").unwrap(), Some(10.0));
        assert_eq!(eval.get_cell_value("Model", "B2").unwrap(), Some(20.0));
        // Empty condition is falsy
        assert_eq!(eval.get_cell_value("Model", "B3").unwrap(), Some(20.0));
        assert_eq!(eval.get_cell_value("Model", "C1").unwrap(), Some(1.0));
        assert_eq!(eval.get_cell_value("Model", "C2").unwrap(), Some(99.0));
    }

    #[test]
    fn cross_sheet_references_resolve() {
        let snapshot = snapshot(
            r#"{
                "Inputs": {"cells": {"B2": {"value": 0.15}}},
                "Summary": {"cells": {
                    "A1": {"formula": "=Inputs!B2*100"},
                    "A2": {"formula": "=SUM(Inputs!B1:B3)"},
                    "A3": {"formula": "=Venus!B2"}
                }}
            }"#,
        );
        let mut eval = Evaluator::new(&snapshot);

        assert_eq!(eval.get_cell_value("Summary", "A1").unwrap(), Some(15.0));
        assert_eq!(eval.get_cell_value("Summary", "A2").unwrap(), Some(0.15));
        // Reference into a sheet the snapshot lacks is empty
        assert_eq!(eval.get_cell_value("Summary", "A3").unwrap(), None);
    }

    #[test]
    fn circular_references_error_without_poisoning() {
        let snapshot = snapshot(
            r#"{"Model": {"cells": {
                "A1": {"formula": "=B1"},
                "B1": {"formula": "=A1"},
                "C1": {"formula": "=2*2"}
            }}}"#,
        );
        let mut eval = Evaluator::new(&snapshot);

        let err = eval.get_cell_value("Model", "A1").unwrap_err();
        assert!(matches!(err, FormulaError::Circular { .. }));
        assert!(err.to_string().contains("Model!"));

        // The evaluator stays usable for unrelated cells
        assert_eq!(eval.get_cell_value("Model", "C1").unwrap(), Some(4.0));
    }

    #[test]
    fn self_reference_is_circular() {
        let snapshot = snapshot(
            r#"{"Model": {"cells": {"A1": {"formula": "=A1+1"}}}}"#,
        );
        let mut eval = Evaluator::new(&snapshot);
        let err = eval.get_cell_value("Model", "A1").unwrap_err();
        assert_eq!(err.to_string(), "Circular reference detected at Model!A1");
    }
}
