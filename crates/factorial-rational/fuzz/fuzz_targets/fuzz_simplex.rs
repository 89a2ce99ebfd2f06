#![no_main]
use arbitrary::Arbitrary;
use factorial_rational::program::{Constraint, LinearProgram, Relation};
use factorial_rational::rational::Rational;
use factorial_rational::simplex::{SimplexError, SimplexOptions};
use libfuzzer_sys::fuzz_target;

/// One constraint row with small integer coefficients.
#[derive(Arbitrary, Debug)]
struct FuzzConstraint {
    scalars: [i8; 4],
    relation: u8,
    bound: i8,
}

/// Top-level fuzz input: a program over at most four variables.
#[derive(Arbitrary, Debug)]
struct FuzzInput {
    var_count: u8,
    objective: [i8; 4],
    constraints: Vec<FuzzConstraint>,
}

fuzz_target!(|input: FuzzInput| {
    let vars = (input.var_count % 4) as usize + 1;
    let small = |v: i8| Rational::from(i64::from(v % 8));

    let objective = input.objective[..vars].iter().map(|&v| small(v)).collect();
    // Limit constraint count to prevent timeouts.
    let constraints = input
        .constraints
        .iter()
        .take(8)
        .map(|c| {
            let relation = match c.relation % 3 {
                0 => Relation::LessOrEqual,
                1 => Relation::GreaterOrEqual,
                _ => Relation::Equal,
            };
            let scalars = c.scalars[..vars].iter().map(|&v| small(v)).collect();
            Constraint::new(scalars, relation, small(c.bound))
        })
        .collect();

    let program = LinearProgram::new(objective, constraints).expect("dimensions match");
    let options = SimplexOptions {
        max_pivots: Some(10_000),
    };
    match program.solve_with(&options) {
        Ok(solution) => {
            program.check_solution(&solution).expect("returned solution must verify");
        }
        Err(SimplexError::ConflictingConstraints { .. }) | Err(SimplexError::Unbounded { .. }) => {}
        Err(other) => panic!("unexpected solver failure: {other}"),
    }
});
