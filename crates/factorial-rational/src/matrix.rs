//! Dense mutable grid of [`Rational`]s used as the Simplex tableau.

use crate::rational::Rational;
use std::fmt;
use std::ops::{Index, IndexMut};

/// Errors raised by matrix mutation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatrixError {
    #[error("row {row} has width {found}, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("pivot cell ({row}, {col}) is zero")]
    ZeroPivot { row: usize, col: usize },
    #[error("row {row} out of bounds for height {height}")]
    RowOutOfBounds { row: usize, height: usize },
}

/// A `width` x `height` rectangular matrix. All rows always have the same
/// width; the height may shrink through [`RationalMatrix::remove_row`].
#[derive(Clone, PartialEq, Eq)]
pub struct RationalMatrix {
    width: usize,
    rows: Vec<Vec<Rational>>,
}

impl RationalMatrix {
    /// A matrix filled with zeros.
    pub fn zeros(width: usize, height: usize) -> Self {
        Self {
            width,
            rows: vec![vec![Rational::zero(); width]; height],
        }
    }

    /// Build from explicit rows. The first row fixes the width.
    pub fn from_rows(rows: Vec<Vec<Rational>>) -> Result<Self, MatrixError> {
        let width = rows.first().map_or(0, Vec::len);
        for (row, values) in rows.iter().enumerate() {
            if values.len() != width {
                return Err(MatrixError::RaggedRow {
                    row,
                    expected: width,
                    found: values.len(),
                });
            }
        }
        Ok(Self { width, rows })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, row: usize) -> &[Rational] {
        &self.rows[row]
    }

    /// Replace a whole row.
    pub fn set_row(&mut self, row: usize, values: Vec<Rational>) -> Result<(), MatrixError> {
        if values.len() != self.width {
            return Err(MatrixError::RaggedRow {
                row,
                expected: self.width,
                found: values.len(),
            });
        }
        let height = self.height();
        let slot = self
            .rows
            .get_mut(row)
            .ok_or(MatrixError::RowOutOfBounds { row, height })?;
        *slot = values;
        Ok(())
    }

    /// Copy of one column, top to bottom.
    pub fn column(&self, col: usize) -> Vec<Rational> {
        self.rows.iter().map(|r| r[col].clone()).collect()
    }

    /// `row += factor * other`.
    pub fn add_to_row(
        &mut self,
        row: usize,
        other: &[Rational],
        factor: &Rational,
    ) -> Result<(), MatrixError> {
        if other.len() != self.width {
            return Err(MatrixError::RaggedRow {
                row,
                expected: self.width,
                found: other.len(),
            });
        }
        let height = self.height();
        let target = self
            .rows
            .get_mut(row)
            .ok_or(MatrixError::RowOutOfBounds { row, height })?;
        for (cell, add) in target.iter_mut().zip(other) {
            if !add.is_zero() {
                *cell += factor * add;
            }
        }
        Ok(())
    }

    /// Normalise `row` so that cell `(row, col)` becomes 1, then eliminate
    /// column `col` from every other row. Afterwards the column is the unit
    /// vector at `row`.
    pub fn pivot(&mut self, row: usize, col: usize) -> Result<(), MatrixError> {
        let height = self.height();
        if row >= height {
            return Err(MatrixError::RowOutOfBounds { row, height });
        }
        let pivot_value = self.rows[row][col].clone();
        if pivot_value.is_zero() {
            return Err(MatrixError::ZeroPivot { row, col });
        }

        if pivot_value != Rational::one() {
            for cell in &mut self.rows[row] {
                *cell = &*cell / &pivot_value;
            }
        }

        let pivot_row = self.rows[row].clone();
        for r in 0..height {
            if r == row || self.rows[r][col].is_zero() {
                continue;
            }
            let factor = -&self.rows[r][col];
            self.add_to_row(r, &pivot_row, &factor)?;
        }
        Ok(())
    }

    /// Remove a row and return it. Later rows shift up by one.
    pub fn remove_row(&mut self, row: usize) -> Result<Vec<Rational>, MatrixError> {
        let height = self.height();
        if row >= height {
            return Err(MatrixError::RowOutOfBounds { row, height });
        }
        Ok(self.rows.remove(row))
    }
}

impl Index<(usize, usize)> for RationalMatrix {
    type Output = Rational;

    fn index(&self, (row, col): (usize, usize)) -> &Rational {
        &self.rows[row][col]
    }
}

impl IndexMut<(usize, usize)> for RationalMatrix {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut Rational {
        &mut self.rows[row][col]
    }
}

impl fmt::Display for RationalMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cells: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| row.iter().map(ToString::to_string).collect())
            .collect();
        let mut widths = vec![2usize; self.width];
        for row in &cells {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(cell.len());
            }
        }

        writeln!(f, "[")?;
        for (i, row) in cells.iter().enumerate() {
            let padded: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|(cell, w)| format!("{cell:>w$}"))
                .collect();
            let sep = if i + 1 < cells.len() { "," } else { "" };
            writeln!(f, "[{}]{sep}", padded.join(","))?;
        }
        write!(f, "]")
    }
}

impl fmt::Debug for RationalMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
