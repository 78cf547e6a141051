//! Cell dependency graph
//!
//! Edges come from parsed formulas: a formula cell depends on every cell
//! it references, with ranges expanded to their member cells. The graph
//! exists to answer one question before evaluation starts: is there a
//! reference cycle anywhere in the snapshot?

use std::collections::{HashMap, HashSet};

use orrery_core::{CellAddress, Snapshot};

use crate::ast::FormulaExpr;
use crate::error::{FormulaError, FormulaResult};
use crate::parser::parse_formula;

/// Snapshot-wide cell identity: sheet index plus grid position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellKey {
    pub sheet: usize,
    pub row: u32,
    pub col: u16,
}

impl CellKey {
    pub fn new(sheet: usize, row: u32, col: u16) -> Self {
        Self { sheet, row, col }
    }

    pub fn from_address(sheet: usize, address: &CellAddress) -> Self {
        Self {
            sheet,
            row: address.row,
            col: address.col,
        }
    }
}

/// Collect every cell a formula references
///
/// Unqualified references resolve against `current_sheet`. References to
/// sheets the snapshot does not contain produce no edges; they evaluate
/// to empty later, so they cannot participate in a cycle.
pub fn extract_references(
    expr: &FormulaExpr,
    current_sheet: usize,
    snapshot: &Snapshot,
) -> Vec<CellKey> {
    let mut refs = Vec::new();
    collect_references(expr, current_sheet, snapshot, &mut refs);
    refs
}

fn collect_references(
    expr: &FormulaExpr,
    current_sheet: usize,
    snapshot: &Snapshot,
    refs: &mut Vec<CellKey>,
) {
    match expr {
        FormulaExpr::Number(_) | FormulaExpr::Text(_) | FormulaExpr::Bool(_) => {}
        FormulaExpr::CellRef(cell_ref) => {
            let sheet = match &cell_ref.sheet {
                None => Some(current_sheet),
                Some(name) => snapshot.sheet_index(name),
            };
            if let Some(sheet) = sheet {
                refs.push(CellKey::from_address(sheet, &cell_ref.address));
            }
        }
        FormulaExpr::RangeRef(range_ref) => {
            let sheet = match &range_ref.sheet {
                None => Some(current_sheet),
                Some(name) => snapshot.sheet_index(name),
            };
            if let Some(sheet) = sheet {
                for address in range_ref.range.cells() {
                    refs.push(CellKey::from_address(sheet, &address));
                }
            }
        }
        FormulaExpr::BinaryOp { left, right, .. } => {
            collect_references(left, current_sheet, snapshot, refs);
            collect_references(right, current_sheet, snapshot, refs);
        }
        FormulaExpr::FunctionCall { args, .. } => {
            for arg in args {
                collect_references(arg, current_sheet, snapshot, refs);
            }
        }
    }
}

/// Dependency graph over formula cells
#[derive(Debug, Default)]
pub struct DependencyGraph {
    /// cell -> cells whose formulas read it
    dependents: HashMap<CellKey, HashSet<CellKey>>,
    /// cell -> cells its formula reads
    precedents: HashMap<CellKey, HashSet<CellKey>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the graph for every parseable formula in a snapshot
    ///
    /// Formulas the parser rejects contribute no edges. They degrade to
    /// empty at evaluation time, so leaving them out keeps the cycle
    /// check aligned with what evaluation will actually traverse.
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let mut graph = Self::new();

        for (sheet_index, sheet) in snapshot.sheets().enumerate() {
            for (address, cell) in sheet.cells() {
                let Some(formula) = &cell.formula else { continue };
                let Ok(expr) = parse_formula(formula) else { continue };

                let dependent = CellKey::from_address(sheet_index, &address);
                for precedent in extract_references(&expr, sheet_index, snapshot) {
                    graph.add_dependency(precedent, dependent);
                }
            }
        }

        graph
    }

    /// Record that `dependent`'s formula reads `precedent`
    pub fn add_dependency(&mut self, precedent: CellKey, dependent: CellKey) {
        self.dependents
            .entry(precedent)
            .or_default()
            .insert(dependent);
        self.precedents
            .entry(dependent)
            .or_default()
            .insert(precedent);
    }

    /// Cells whose formulas read the given cell
    pub fn dependents_of(&self, cell: CellKey) -> impl Iterator<Item = CellKey> + '_ {
        self.dependents.get(&cell).into_iter().flatten().copied()
    }

    /// Cells the given cell's formula reads
    pub fn precedents_of(&self, cell: CellKey) -> impl Iterator<Item = CellKey> + '_ {
        self.precedents.get(&cell).into_iter().flatten().copied()
    }

    /// Whether the cell sits on a reference cycle
    pub fn has_circular_reference(&self, cell: CellKey) -> bool {
        let mut visited = HashSet::new();
        let mut in_stack = HashSet::new();
        self.detect_cycle(cell, &mut visited, &mut in_stack)
    }

    fn detect_cycle(
        &self,
        cell: CellKey,
        visited: &mut HashSet<CellKey>,
        in_stack: &mut HashSet<CellKey>,
    ) -> bool {
        if in_stack.contains(&cell) {
            return true;
        }
        if visited.contains(&cell) {
            return false;
        }

        visited.insert(cell);
        in_stack.insert(cell);

        for precedent in self.precedents_of(cell) {
            if self.detect_cycle(precedent, visited, in_stack) {
                return true;
            }
        }

        in_stack.remove(&cell);
        false
    }

    /// First cell found on any cycle, in sheet/row/column order
    pub fn find_cycle(&self) -> Option<CellKey> {
        let mut cells: Vec<CellKey> = self.precedents.keys().copied().collect();
        cells.sort();
        cells
            .into_iter()
            .find(|&cell| self.has_circular_reference(cell))
    }

    /// Fail with [`FormulaError::Circular`] if the snapshot's formulas
    /// form a cycle
    pub fn ensure_acyclic(&self, snapshot: &Snapshot) -> FormulaResult<()> {
        match self.find_cycle() {
            None => Ok(()),
            Some(key) => Err(FormulaError::Circular {
                cell: cell_display_name(snapshot, key),
            }),
        }
    }
}

/// Human-readable `Sheet!A1` name for a cell key
pub(crate) fn cell_display_name(snapshot: &Snapshot, key: CellKey) -> String {
    let address = CellAddress::new(key.row, key.col);
    match snapshot.sheet(key.sheet) {
        Some(sheet) => format!("{}!{}", sheet.name(), address),
        None => address.to_string(),
    }
}
