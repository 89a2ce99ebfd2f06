use crate::catalog::{CatalogError, GameData};
use crate::effect::{Effect, ModuleLayout, PRODUCTIVITY, SPEED};
use crate::error::PlanError;
use crate::id::*;
use crate::resolver::RecipeSetup;
use factorial_rational::Rational;
use serde::{Deserialize, Serialize};

/// One recipe of a solved plan and the machines running it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Production {
    pub recipe: RecipeId,
    pub assembler: AssemblerId,
    pub layout: ModuleLayout,
    pub effect: Effect,
    /// Recipe executions per second.
    pub count: Rational,
    /// Machines needed to sustain `count`.
    pub assembler_count: Rational,
}

impl Production {
    /// `assembler_count = count * energy / total(speed) / assembler speed`.
    pub fn new(data: &GameData, recipe: RecipeId, setup: RecipeSetup, count: Rational) -> Result<Self, PlanError> {
        let recipe_def = data.recipe(recipe)?;
        let assembler = data.assembler(setup.assembler)?;
        let speed = setup.effect.total(SPEED) * &assembler.speed;
        if !speed.is_positive() {
            return Err(PlanError::NonPositiveSpeed {
                recipe: recipe_def.name.clone(),
                assembler: assembler.name.clone(),
                speed,
            });
        }
        let assembler_count = (&count * &recipe_def.energy).checked_div(&speed)?;
        Ok(Self {
            recipe,
            assembler: setup.assembler,
            layout: setup.layout,
            effect: setup.effect,
            count,
            assembler_count,
        })
    }

    /// Amount of `item` produced per second, productivity included.
    pub fn produced(&self, data: &GameData, item: ItemId) -> Result<Rational, CatalogError> {
        let recipe = data.recipe(self.recipe)?;
        Ok(&self.count * recipe.produced(item) * self.effect.total(PRODUCTIVITY))
    }

    /// Amount of `item` consumed per second.
    pub fn consumed(&self, data: &GameData, item: ItemId) -> Result<Rational, CatalogError> {
        let recipe = data.recipe(self.recipe)?;
        Ok(&self.count * recipe.consumed(item))
    }

    /// Same machines, with activity and machine count multiplied by `factor`.
    pub fn scaled(&self, factor: &Rational) -> Self {
        Self {
            count: &self.count * factor,
            assembler_count: &self.assembler_count * factor,
            ..self.clone()
        }
    }
}
