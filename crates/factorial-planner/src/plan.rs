//! End-to-end planning: resolve, solve, interpret, group.

use crate::catalog::GameData;
use crate::config::PlanConfig;
use crate::error::PlanError;
use crate::grouping::{group, ProductionGroup};
use crate::id::RecipeId;
use crate::production::Production;
use crate::resolver::Resolver;
use factorial_rational::Rational;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A solved plan: the flat production list, the same productions nested
/// by the inline directives, and the objective score (negated cost).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub productions: Vec<Production>,
    pub groups: Vec<ProductionGroup>,
    pub score: Rational,
}

impl Plan {
    pub fn production(&self, recipe: RecipeId) -> Option<&Production> {
        self.productions.iter().find(|p| p.recipe == recipe)
    }

    /// Recipe executions per second, zero for recipes the plan does not use.
    pub fn count(&self, recipe: RecipeId) -> Rational {
        self.production(recipe)
            .map(|p| p.count.clone())
            .unwrap_or_default()
    }
}

pub fn plan(data: &GameData, config: &PlanConfig) -> Result<Plan, PlanError> {
    config.validate(data)?;
    let resolution = Resolver::new(data, config).resolve()?;
    let solution = resolution.solve()?;
    debug!(score = %solution.score, "solved");
    let productions = resolution.interpret(data, &solution)?;
    let groups = group(data, config, &resolution.recipes, &productions)?;
    Ok(Plan {
        productions,
        groups,
        score: solution.score,
    })
}
