//! Factorial Rational -- exact linear programming for production planning.
//!
//! Everything in this crate works on arbitrary-precision fractions so that
//! pivoting decisions are never corrupted by rounding.
//!
//! # Key Types
//!
//! - [`rational::Rational`] -- reduced fraction with a positive denominator.
//! - [`matrix::RationalMatrix`] -- mutable tableau supporting row pivots.
//! - [`program::LinearProgram`] -- objective (maximised) plus `<=`, `>=`
//!   and `==` constraints over non-negative variables.
//! - [`simplex`] -- two-phase Simplex returning a [`program::Solution`] or a
//!   classified [`simplex::SimplexError`].
//!
//! ```rust
//! use factorial_rational::program::{Constraint, LinearProgram};
//! use factorial_rational::rational::Rational;
//!
//! let one = Rational::one();
//! let program = LinearProgram::new(
//!     vec![one.clone(), one.clone()],
//!     vec![Constraint::less_or_equal(vec![one.clone(), one.clone()], one.clone())],
//! )
//! .unwrap();
//! let solution = program.solve().unwrap();
//! assert_eq!(solution.score, one);
//! ```

pub mod matrix;
pub mod program;
pub mod rational;
pub mod simplex;

pub use matrix::{MatrixError, RationalMatrix};
pub use program::{Constraint, LinearProgram, ProgramError, Relation, Solution};
pub use rational::{Rational, RationalError, MAX_DECIMAL_EXPONENT};
pub use simplex::{SimplexError, SimplexOptions};
