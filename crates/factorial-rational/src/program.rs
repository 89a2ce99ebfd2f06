//! Linear program model: an objective to maximise and typed constraints.

use crate::rational::Rational;
use std::fmt;

/// Errors raised while building a program or re-checking a solution.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProgramError {
    #[error("constraint {index} has {found} scalars, objective has {expected}")]
    DimensionMismatch {
        index: usize,
        expected: usize,
        found: usize,
    },
    #[error("solution has {found} values, program has {expected} variables")]
    WrongValueCount { expected: usize, found: usize },
    #[error("solution {values:?} does not satisfy constraint {constraint}")]
    Unsatisfied {
        values: Vec<Rational>,
        constraint: String,
    },
    #[error("solution reports score {reported}, objective evaluates to {actual}")]
    WrongScore { reported: Rational, actual: Rational },
}

/// The comparison a constraint enforces between its left-hand side and bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Relation {
    LessOrEqual,
    GreaterOrEqual,
    Equal,
}

impl Relation {
    fn symbol(self) -> &'static str {
        match self {
            Relation::LessOrEqual => "<=",
            Relation::GreaterOrEqual => ">=",
            Relation::Equal => "==",
        }
    }
}

/// `scalars . x  (relation)  bound`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    pub scalars: Vec<Rational>,
    pub relation: Relation,
    pub bound: Rational,
}

impl Constraint {
    pub fn new(scalars: Vec<Rational>, relation: Relation, bound: Rational) -> Self {
        Self {
            scalars,
            relation,
            bound,
        }
    }

    pub fn less_or_equal(scalars: Vec<Rational>, bound: Rational) -> Self {
        Self::new(scalars, Relation::LessOrEqual, bound)
    }

    pub fn greater_or_equal(scalars: Vec<Rational>, bound: Rational) -> Self {
        Self::new(scalars, Relation::GreaterOrEqual, bound)
    }

    pub fn equal(scalars: Vec<Rational>, bound: Rational) -> Self {
        Self::new(scalars, Relation::Equal, bound)
    }

    /// True when every scalar is zero, i.e. the left-hand side is constant.
    pub fn is_constant(&self) -> bool {
        self.scalars.iter().all(Rational::is_zero)
    }

    /// Left-hand side evaluated at `values`.
    pub fn evaluate(&self, values: &[Rational]) -> Rational {
        dot(&self.scalars, values)
    }

    pub fn is_satisfied_by(&self, values: &[Rational]) -> bool {
        let lhs = self.evaluate(values);
        match self.relation {
            Relation::LessOrEqual => lhs <= self.bound,
            Relation::GreaterOrEqual => lhs >= self.bound,
            Relation::Equal => lhs == self.bound,
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            linear_text(&self.scalars),
            self.relation.symbol(),
            self.bound
        )
    }
}

/// Variable values plus the objective evaluated at them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    pub values: Vec<Rational>,
    pub score: Rational,
}

impl Solution {
    /// Value of variable `index`.
    pub fn value(&self, index: usize) -> &Rational {
        &self.values[index]
    }
}

/// Maximise `objective . x` subject to `constraints` and `x >= 0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearProgram {
    objective: Vec<Rational>,
    constraints: Vec<Constraint>,
}

impl LinearProgram {
    /// Every constraint must have exactly one scalar per objective entry.
    pub fn new(objective: Vec<Rational>, constraints: Vec<Constraint>) -> Result<Self, ProgramError> {
        let expected = objective.len();
        for (index, constraint) in constraints.iter().enumerate() {
            if constraint.scalars.len() != expected {
                return Err(ProgramError::DimensionMismatch {
                    index,
                    expected,
                    found: constraint.scalars.len(),
                });
            }
        }
        Ok(Self {
            objective,
            constraints,
        })
    }

    pub fn var_count(&self) -> usize {
        self.objective.len()
    }

    pub fn objective(&self) -> &[Rational] {
        &self.objective
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Objective evaluated at `values`.
    pub fn score(&self, values: &[Rational]) -> Rational {
        dot(&self.objective, values)
    }

    /// Verify that `solution` satisfies every constraint and that its score
    /// matches the objective.
    pub fn check_solution(&self, solution: &Solution) -> Result<(), ProgramError> {
        if solution.values.len() != self.var_count() {
            return Err(ProgramError::WrongValueCount {
                expected: self.var_count(),
                found: solution.values.len(),
            });
        }
        if let Some(constraint) = self
            .constraints
            .iter()
            .find(|c| !c.is_satisfied_by(&solution.values))
        {
            return Err(ProgramError::Unsatisfied {
                values: solution.values.clone(),
                constraint: constraint.to_string(),
            });
        }
        let actual = self.score(&solution.values);
        if actual != solution.score {
            return Err(ProgramError::WrongScore {
                reported: solution.score.clone(),
                actual,
            });
        }
        Ok(())
    }
}

impl fmt::Display for LinearProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "max {}", linear_text(&self.objective))?;
        let mut lead = "where";
        for constraint in &self.constraints {
            writeln!(f, "{lead:>5} {constraint}")?;
            lead = "";
        }
        Ok(())
    }
}

fn dot(scalars: &[Rational], values: &[Rational]) -> Rational {
    scalars.iter().zip(values).map(|(s, v)| s * v).sum()
}

/// `1 [0] - 2/3 [1] + 0 [2]`
fn linear_text(scalars: &[Rational]) -> String {
    scalars
        .iter()
        .enumerate()
        .map(|(i, s)| format!("{s} [{i}]"))
        .collect::<Vec<_>>()
        .join(" + ")
        .replace("+ -", "- ")
}
