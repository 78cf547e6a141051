//! Cell address and range types
//!
//! Addresses use A1 notation: column letters in a base-26 scheme with no
//! zero digit (A=1 .. Z=26, AA=27, ...) followed by a 1-based row number.
//! Internally both axes are 0-based; the codec owns the off-by-one.

use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_ROWS};
use std::fmt;
use std::str::FromStr;

/// A cell address (e.g., "A1", "$B$2")
///
/// `$` markers mark an axis as absolute and round-trip through
/// parse/format unchanged. A snapshot is never edited, so the markers
/// carry no further meaning here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellAddress {
    /// Row index (0-based internally, 1-based in display)
    pub row: u32,
    /// Column index (0-based, A=0, B=1, ..., XFD=16383)
    pub col: u16,
    /// Whether the row reference is absolute ($)
    pub row_absolute: bool,
    /// Whether the column reference is absolute ($)
    pub col_absolute: bool,
}

impl CellAddress {
    /// Create a relative cell address
    pub fn new(row: u32, col: u16) -> Self {
        Self {
            row,
            col,
            row_absolute: false,
            col_absolute: false,
        }
    }

    /// Create a cell address with explicit absolute markers
    pub fn with_absolute(row: u32, col: u16, row_absolute: bool, col_absolute: bool) -> Self {
        Self {
            row,
            col,
            row_absolute,
            col_absolute,
        }
    }

    /// Parse an address from A1 notation
    ///
    /// Accepts `A1`, `$A1`, `A$1`, and `$A$1` forms. Anything else is an
    /// [`Error::InvalidAddress`], returned as a value so callers can fold
    /// malformed references into their own unresolved handling.
    ///
    /// # Examples
    /// ```
    /// use orrery_core::CellAddress;
    ///
    /// let addr = CellAddress::parse("C7").unwrap();
    /// assert_eq!((addr.row, addr.col), (6, 2));
    ///
    /// let addr = CellAddress::parse("$B$2").unwrap();
    /// assert!(addr.row_absolute && addr.col_absolute);
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::InvalidAddress("empty address".into()));
        }

        let bytes = s.as_bytes();
        let mut pos = 0;

        let col_absolute = bytes.get(pos) == Some(&b'$');
        if col_absolute {
            pos += 1;
        }

        let col_start = pos;
        while pos < bytes.len() && bytes[pos].is_ascii_alphabetic() {
            pos += 1;
        }
        if pos == col_start {
            return Err(Error::InvalidAddress(format!("no column letters in '{s}'")));
        }
        let col = Self::letters_to_column(&s[col_start..pos])?;

        let row_absolute = bytes.get(pos) == Some(&b'$');
        if row_absolute {
            pos += 1;
        }

        let row_str = &s[pos..];
        if row_str.is_empty() {
            return Err(Error::InvalidAddress(format!("no row number in '{s}'")));
        }
        let row: u32 = row_str
            .parse()
            .map_err(|_| Error::InvalidAddress(format!("bad row number in '{s}'")))?;

        // Display rows are 1-based
        if row == 0 {
            return Err(Error::InvalidAddress(format!("row 0 in '{s}'")));
        }
        let row = row - 1;

        if row >= MAX_ROWS {
            return Err(Error::RowOutOfBounds(row, MAX_ROWS - 1));
        }

        Ok(Self {
            row,
            col,
            row_absolute,
            col_absolute,
        })
    }

    /// Convert a column index to letters (0 = A, 25 = Z, 26 = AA, ...)
    pub fn column_to_letters(col: u16) -> String {
        let mut letters = String::new();
        let mut n = col as u32 + 1;

        while n > 0 {
            n -= 1;
            letters.insert(0, ((n % 26) as u8 + b'A') as char);
            n /= 26;
        }

        letters
    }

    /// Convert column letters to an index (A = 0, Z = 25, AA = 26, ...)
    ///
    /// Case-insensitive. Rejects anything past the XFD column limit,
    /// including letter runs too long to be a column at all.
    pub fn letters_to_column(letters: &str) -> Result<u16> {
        if letters.is_empty() {
            return Err(Error::InvalidAddress("empty column letters".into()));
        }
        // XFD is three letters; longer runs cannot be in bounds
        if letters.len() > 3 {
            return Err(Error::ColumnOutOfBounds(u16::MAX, MAX_COLS - 1));
        }

        let mut col: u32 = 0;
        for c in letters.chars() {
            if !c.is_ascii_alphabetic() {
                return Err(Error::InvalidAddress(format!("bad column letter '{c}'")));
            }
            col = col * 26 + (c.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
        }
        let col = col - 1;

        if col >= MAX_COLS as u32 {
            return Err(Error::ColumnOutOfBounds(col.min(u16::MAX as u32) as u16, MAX_COLS - 1));
        }

        Ok(col as u16)
    }

    /// Format as an A1 string, preserving absolute markers
    pub fn to_a1_string(&self) -> String {
        let mut out = String::new();
        if self.col_absolute {
            out.push('$');
        }
        out.push_str(&Self::column_to_letters(self.col));
        if self.row_absolute {
            out.push('$');
        }
        out.push_str(&(self.row + 1).to_string());
        out
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for CellAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// A rectangular block of cells (e.g., "A1:B10")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRange {
    /// Top-left corner
    pub start: CellAddress,
    /// Bottom-right corner
    pub end: CellAddress,
}

impl CellRange {
    /// Create a range, normalizing so `start` is top-left
    ///
    /// Each axis is normalized independently, so "B1:A2" covers the same
    /// cells as "A1:B2".
    pub fn new(start: CellAddress, end: CellAddress) -> Self {
        let (top, bottom) = if start.row <= end.row {
            (start.row, end.row)
        } else {
            (end.row, start.row)
        };
        let (left, right) = if start.col <= end.col {
            (start.col, end.col)
        } else {
            (end.col, start.col)
        };

        Self {
            start: CellAddress::with_absolute(top, left, start.row_absolute, start.col_absolute),
            end: CellAddress::with_absolute(bottom, right, end.row_absolute, end.col_absolute),
        }
    }

    /// Create a range covering a single cell
    pub fn single(addr: CellAddress) -> Self {
        Self {
            start: addr,
            end: addr,
        }
    }

    /// Parse a range from "A1:B10" notation; a bare address is a
    /// single-cell range
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        match s.find(':') {
            Some(colon) => {
                let start = CellAddress::parse(&s[..colon])?;
                let end = CellAddress::parse(&s[colon + 1..])?;
                Ok(Self::new(start, end))
            }
            None => Ok(Self::single(CellAddress::parse(s)?)),
        }
    }

    /// Number of rows in the range
    pub fn row_count(&self) -> u32 {
        self.end.row - self.start.row + 1
    }

    /// Number of columns in the range
    pub fn col_count(&self) -> u16 {
        self.end.col - self.start.col + 1
    }

    /// Total number of cells in the range
    pub fn cell_count(&self) -> u64 {
        self.row_count() as u64 * self.col_count() as u64
    }

    /// Iterate every address in the range, row-major
    pub fn cells(&self) -> CellRangeIterator {
        CellRangeIterator {
            range: *self,
            next_row: self.start.row,
            next_col: self.start.col,
        }
    }

    /// Format as an "A1:B10" string; single-cell ranges format as the cell
    pub fn to_a1_string(&self) -> String {
        if self.start == self.end {
            self.start.to_a1_string()
        } else {
            format!("{}:{}", self.start.to_a1_string(), self.end.to_a1_string())
        }
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for CellRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Row-major iterator over the addresses in a range
pub struct CellRangeIterator {
    range: CellRange,
    next_row: u32,
    next_col: u16,
}

impl Iterator for CellRangeIterator {
    type Item = CellAddress;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_row > self.range.end.row {
            return None;
        }

        let addr = CellAddress::new(self.next_row, self.next_col);

        self.next_col += 1;
        if self.next_col > self.range.end.col {
            self.next_col = self.range.start.col;
            self.next_row += 1;
        }

        Some(addr)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.next_row > self.range.end.row {
            return (0, Some(0));
        }
        let full_rows = (self.range.end.row - self.next_row) as u64;
        let in_row = (self.range.end.col - self.next_col) as u64 + 1;
        let remaining = (full_rows * self.range.col_count() as u64 + in_row) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for CellRangeIterator {}
