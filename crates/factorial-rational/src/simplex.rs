//! Two-phase Simplex over exact rationals.
//!
//! # Tableau layout
//!
//! ```text
//! | structural (var_count) | slack | artificial | rhs |
//! | ...one row per kept constraint...                 |
//! | objective row (phase 1: artificial sum, then real) |
//! ```
//!
//! Every constraint row is scaled so its right-hand side is non-negative.
//! Phase 1 drives the artificial variables out of the basis, redundant rows
//! are dropped, then phase 2 optimises the real objective over the
//! structural and slack columns only. The returned solution is re-checked
//! against the unscaled constraints before it is handed back.

use crate::matrix::{MatrixError, RationalMatrix};
use crate::program::{LinearProgram, ProgramError, Relation, Solution};
use crate::rational::Rational;
use tracing::{debug, trace};

/// Why a program could not be solved.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SimplexError {
    /// No point satisfies every constraint.
    #[error("conflicting constraints{}", describe(.constraint))]
    ConflictingConstraints { constraint: Option<String> },
    /// The objective grows without limit along `column`.
    #[error("objective is unbounded along column [{column}]")]
    Unbounded { column: usize },
    /// [`SimplexOptions::max_pivots`] was reached.
    #[error("pivot limit of {pivots} reached")]
    PivotLimit { pivots: usize },
    /// The solver produced a vector that fails the program's own check.
    #[error("solver self-check failed: {0}")]
    SelfCheck(#[from] ProgramError),
    #[error("tableau error: {0}")]
    Tableau(#[from] MatrixError),
}

fn describe(constraint: &Option<String>) -> String {
    constraint
        .as_ref()
        .map(|c| format!(": {c}"))
        .unwrap_or_default()
}

/// Solver knobs.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SimplexOptions {
    /// Hard cap on the number of pivots across both phases. `None` means no
    /// cap.
    #[serde(default)]
    pub max_pivots: Option<usize>,
}

impl LinearProgram {
    /// Solve with default options.
    pub fn solve(&self) -> Result<Solution, SimplexError> {
        self.solve_with(&SimplexOptions::default())
    }

    pub fn solve_with(&self, options: &SimplexOptions) -> Result<Solution, SimplexError> {
        Simplex::new(self, options)?.solve()
    }
}

// ---------------------------------------------------------------------------
// Constraint sign patterns
// ---------------------------------------------------------------------------

/// How a constraint row is laid into the tableau: the factor applied to the
/// whole row and the coefficients of its slack and artificial columns
/// (0 means the column is absent).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SignPattern {
    row_scale: i32,
    slack: i32,
    artificial: i32,
}

impl SignPattern {
    fn of(relation: Relation, bound: &Rational) -> Self {
        let negative = bound.is_negative();
        let (slack, artificial) = match (relation, negative) {
            // x >= b, b >= 0
            (Relation::GreaterOrEqual, false) | (Relation::LessOrEqual, true) => (-1, 1),
            // x <= b, b >= 0
            (Relation::LessOrEqual, false) | (Relation::GreaterOrEqual, true) => (1, 0),
            (Relation::Equal, _) => (0, 1),
        };
        Self {
            row_scale: if negative { -1 } else { 1 },
            slack,
            artificial,
        }
    }

    fn has_slack(self) -> bool {
        self.slack != 0
    }

    fn has_artificial(self) -> bool {
        self.artificial != 0
    }
}

// ---------------------------------------------------------------------------
// Solver state
// ---------------------------------------------------------------------------

struct Simplex<'p> {
    program: &'p LinearProgram,
    tab: RationalMatrix,
    /// Basic column of each constraint row.
    basics: Vec<usize>,
    /// Index into `program.constraints()` of each constraint row.
    origins: Vec<usize>,
    var_count: usize,
    slack_count: usize,
    artificial_count: usize,
    pivots: usize,
    max_pivots: Option<usize>,
}

impl<'p> Simplex<'p> {
    fn new(program: &'p LinearProgram, options: &SimplexOptions) -> Result<Self, SimplexError> {
        let mut kept = Vec::new();
        for (index, constraint) in program.constraints().iter().enumerate() {
            if !constraint.is_constant() {
                kept.push(index);
            } else if !constraint.bound.is_zero() {
                return Err(SimplexError::ConflictingConstraints {
                    constraint: Some(constraint.to_string()),
                });
            }
        }

        let patterns: Vec<SignPattern> = kept
            .iter()
            .map(|&i| {
                let c = &program.constraints()[i];
                SignPattern::of(c.relation, &c.bound)
            })
            .collect();
        let var_count = program.var_count();
        let slack_count = patterns.iter().filter(|p| p.has_slack()).count();
        let artificial_count = patterns.iter().filter(|p| p.has_artificial()).count();

        let width = var_count + slack_count + artificial_count + 1;
        let height = kept.len() + 1;
        let rhs = width - 1;
        let objective_row = height - 1;

        let mut simplex = Self {
            program,
            tab: RationalMatrix::zeros(width, height),
            basics: vec![0; kept.len()],
            origins: kept.clone(),
            var_count,
            slack_count,
            artificial_count,
            pivots: 0,
            max_pivots: options.max_pivots,
        };

        let mut next_slack = var_count;
        let mut next_artificial = var_count + slack_count;
        for (row, (&index, pattern)) in kept.iter().zip(&patterns).enumerate() {
            let constraint = &program.constraints()[index];
            let tab = &mut simplex.tab;

            for (col, scalar) in constraint.scalars.iter().enumerate() {
                tab[(row, col)] = if pattern.row_scale < 0 {
                    -scalar
                } else {
                    scalar.clone()
                };
            }
            tab[(row, rhs)] = constraint.bound.abs();

            simplex.basics[row] = if pattern.has_artificial() {
                next_artificial
            } else {
                next_slack
            };
            if pattern.has_slack() {
                tab[(row, next_slack)] = Rational::from(pattern.slack);
                next_slack += 1;
            }
            if pattern.has_artificial() {
                let coefficient = Rational::from(pattern.artificial);
                tab[(objective_row, next_artificial)] -= &coefficient;
                tab[(row, next_artificial)] = coefficient;
                next_artificial += 1;
                // Price the artificial out of the phase 1 objective.
                let values = tab.row(row).to_vec();
                tab.add_to_row(objective_row, &values, &Rational::one())?;
            }
        }

        Ok(simplex)
    }

    fn rhs_col(&self) -> usize {
        self.tab.width() - 1
    }

    fn objective_row(&self) -> usize {
        self.tab.height() - 1
    }

    fn artificial_start(&self) -> usize {
        self.var_count + self.slack_count
    }

    fn is_artificial(&self, col: usize) -> bool {
        col >= self.artificial_start() && col < self.artificial_start() + self.artificial_count
    }

    fn solve(mut self) -> Result<Solution, SimplexError> {
        let all_columns = self.rhs_col();
        self.optimize(all_columns)?;

        let infeasibility = &self.tab[(self.objective_row(), self.rhs_col())];
        if !infeasibility.is_zero() {
            debug!(%infeasibility, "phase 1 left artificial variables positive");
            return Err(SimplexError::ConflictingConstraints {
                constraint: self.offending_constraint(),
            });
        }
        debug!(pivots = self.pivots, "phase 1 found a feasible basis");

        self.remove_artificials()?;
        self.init_phase2()?;
        let real_columns = self.rhs_col() - self.artificial_count;
        self.optimize(real_columns)?;

        let solution = self.read_solution();
        debug!(pivots = self.pivots, score = %solution.score, "phase 2 optimal");
        self.program.check_solution(&solution)?;
        Ok(solution)
    }

    /// The constraint of the first row whose artificial stayed positive.
    fn offending_constraint(&self) -> Option<String> {
        let rhs = self.rhs_col();
        self.basics
            .iter()
            .enumerate()
            .find(|&(row, &col)| self.is_artificial(col) && self.tab[(row, rhs)].is_positive())
            .map(|(row, _)| self.program.constraints()[self.origins[row]].to_string())
    }

    /// Pivot every artificial out of the basis, or drop its row when the row
    /// is redundant (no usable non-artificial column).
    fn remove_artificials(&mut self) -> Result<(), SimplexError> {
        let real_columns = self.var_count + self.slack_count;
        let mut row = 0;
        while row < self.objective_row() {
            if !self.is_artificial(self.basics[row]) {
                row += 1;
                continue;
            }
            let replacement = (0..real_columns)
                .find(|&col| !self.tab[(row, col)].is_zero() && !self.basics.contains(&col));
            match replacement {
                Some(col) => {
                    self.pivot(row, col)?;
                    row += 1;
                }
                None => {
                    debug!(
                        constraint = self.origins[row],
                        "dropping redundant constraint row"
                    );
                    self.tab.remove_row(row)?;
                    self.basics.remove(row);
                    self.origins.remove(row);
                }
            }
        }
        Ok(())
    }

    /// Load the real objective and eliminate the coefficients of basic
    /// structural variables so the row holds reduced costs.
    fn init_phase2(&mut self) -> Result<(), SimplexError> {
        let objective_row = self.objective_row();
        let mut values = vec![Rational::zero(); self.tab.width()];
        values[..self.var_count].clone_from_slice(self.program.objective());
        self.tab.set_row(objective_row, values)?;

        for col in 0..self.var_count {
            if self.tab[(objective_row, col)].is_zero() {
                continue;
            }
            let Some(row) = self.basics.iter().position(|&b| b == col) else {
                continue;
            };
            let factor = -&self.tab[(objective_row, col)];
            let values = self.tab.row(row).to_vec();
            self.tab.add_to_row(objective_row, &values, &factor)?;
        }
        Ok(())
    }

    /// Pivot until no column among the first `usable_columns` has a positive
    /// reduced cost.
    fn optimize(&mut self, usable_columns: usize) -> Result<(), SimplexError> {
        while let Some(col) = self.entering_column(usable_columns) {
            let row = self
                .leaving_row(col)
                .ok_or(SimplexError::Unbounded { column: col })?;
            self.pivot(row, col)?;
        }
        Ok(())
    }

    /// First column, left to right, with a positive objective-row entry.
    fn entering_column(&self, usable_columns: usize) -> Option<usize> {
        let objective = self.tab.row(self.objective_row());
        objective[..usable_columns]
            .iter()
            .position(Rational::is_positive)
    }

    /// Minimum ratio `rhs / entry` over rows with a positive entry in `col`.
    /// Ties go to the row whose basic variable has the smallest index.
    fn leaving_row(&self, col: usize) -> Option<usize> {
        let rhs = self.rhs_col();
        let mut best: Option<(usize, Rational)> = None;
        for row in 0..self.objective_row() {
            let entry = &self.tab[(row, col)];
            if !entry.is_positive() {
                continue;
            }
            let ratio = &self.tab[(row, rhs)] / entry;
            let better = match &best {
                None => true,
                Some((best_row, best_ratio)) => {
                    ratio < *best_ratio
                        || (ratio == *best_ratio && self.basics[row] < self.basics[*best_row])
                }
            };
            if better {
                best = Some((row, ratio));
            }
        }
        best.map(|(row, _)| row)
    }

    fn pivot(&mut self, row: usize, col: usize) -> Result<(), SimplexError> {
        if let Some(max) = self.max_pivots {
            if self.pivots >= max {
                return Err(SimplexError::PivotLimit { pivots: self.pivots });
            }
        }
        trace!(row, col, leaving = self.basics[row], "pivot");
        self.tab.pivot(row, col)?;
        self.basics[row] = col;
        self.pivots += 1;
        Ok(())
    }

    fn read_solution(&self) -> Solution {
        let rhs = self.rhs_col();
        let mut values = vec![Rational::zero(); self.var_count];
        for (row, &col) in self.basics.iter().enumerate() {
            if col < self.var_count {
                values[col] = self.tab[(row, rhs)].clone();
            }
        }
        Solution {
            values,
            score: -&self.tab[(self.objective_row(), rhs)],
        }
    }
}
