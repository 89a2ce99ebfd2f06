//! Production graph resolution.
//!
//! Walks the recipe graph backwards from the demanded items, picks an
//! assembler and module layout for every relevant recipe, and compiles the
//! material balance into a [`LinearProgram`]:
//!
//! ```text
//! max  -cost . x
//! for every relevant, non-given item i:
//!     sum_r (produced(r, i) * productivity(r) - consumed(r, i)) x_r >= demand(i)
//! ```

use crate::catalog::{Assembler, GameData, Recipe};
use crate::config::{fastest, ModulePicker, PlanConfig};
use crate::effect::{Effect, ModuleCounts, ModuleLayout, PRODUCTIVITY};
use crate::error::PlanError;
use crate::id::*;
use crate::production::Production;
use factorial_rational::{Constraint, LinearProgram, Rational, SimplexOptions, Solution};
use std::collections::{BTreeSet, VecDeque};
use tracing::debug;

/// Machine choice for one recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeSetup {
    pub assembler: AssemblerId,
    pub layout: ModuleLayout,
    pub effect: Effect,
}

/// Everything the resolver derived from a catalog and a configuration.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Relevant items in visit order.
    pub items: Vec<ItemId>,
    /// Relevant recipes in discovery order; variable `i` is `recipes[i]`.
    pub recipes: Vec<RecipeId>,
    /// `setups[i]` belongs to `recipes[i]`.
    pub setups: Vec<RecipeSetup>,
    /// `program.constraints()[j]` balances `constraint_items[j]`.
    pub constraint_items: Vec<ItemId>,
    pub program: LinearProgram,
    options: SimplexOptions,
}

impl Resolution {
    pub fn solve(&self) -> Result<Solution, PlanError> {
        Ok(self.program.solve_with(&self.options)?)
    }

    pub fn variable(&self, recipe: RecipeId) -> Option<usize> {
        self.recipes.iter().position(|&r| r == recipe)
    }

    /// One [`Production`] per recipe with non-zero activity, reusing the
    /// setups chosen during compilation.
    pub fn interpret(&self, data: &GameData, solution: &Solution) -> Result<Vec<Production>, PlanError> {
        self.recipes
            .iter()
            .zip(&self.setups)
            .zip(&solution.values)
            .filter(|(_, count)| !count.is_zero())
            .map(|((&recipe, setup), count)| Production::new(data, recipe, setup.clone(), count.clone()))
            .collect()
    }
}

pub struct Resolver<'a> {
    data: &'a GameData,
    config: &'a PlanConfig,
}

impl<'a> Resolver<'a> {
    pub fn new(data: &'a GameData, config: &'a PlanConfig) -> Self {
        Self { data, config }
    }

    /// Worklist traversal from the demanded items. Returns the relevant
    /// items in visit order and the relevant recipes in discovery order.
    pub fn relevant(&self) -> (Vec<ItemId>, Vec<RecipeId>) {
        let mut items = Vec::new();
        let mut seen_items = BTreeSet::new();
        let mut recipes = Vec::new();
        let mut seen_recipes = BTreeSet::new();

        let mut to_visit: VecDeque<ItemId> = self.config.demands().keys().copied().collect();
        while let Some(next) = to_visit.pop_front() {
            if self.config.is_item_blacklisted(next) || !seen_items.insert(next) {
                continue;
            }
            items.push(next);

            for (id, recipe) in self.data.recipes() {
                if self.config.is_recipe_blacklisted(id) || !recipe.produces(next) {
                    continue;
                }
                if seen_recipes.insert(id) {
                    recipes.push(id);
                    to_visit.extend(recipe.ingredients.iter().map(|s| s.item));
                }
            }
        }
        (items, recipes)
    }

    /// Assemblers whose category set and ingredient limit admit `recipe`.
    pub fn candidates(&self, recipe: &Recipe) -> Vec<AssemblerId> {
        self.data
            .assemblers()
            .filter(|(_, a)| a.admits(recipe))
            .map(|(id, _)| id)
            .collect()
    }

    /// First picker answer, else the fastest candidate.
    pub fn pick_assembler(&self, id: RecipeId) -> Result<AssemblerId, PlanError> {
        let recipe = self.data.recipe(id)?;
        let candidates = self.candidates(recipe);
        for picker in self.config.assembler_pickers() {
            if let Some(assembler) = picker.pick(self.data, id, &candidates)? {
                return Ok(assembler);
            }
        }
        fastest(self.data, &candidates)?.ok_or_else(|| PlanError::NoAssembler {
            recipe: recipe.name.clone(),
        })
    }

    /// First module picker answer and first beacon picker answer, each
    /// empty when no picker answers.
    pub fn pick_layout(&self, recipe: RecipeId, assembler: AssemblerId) -> Result<ModuleLayout, PlanError> {
        let first = |pickers: &[ModulePicker]| -> Result<ModuleCounts, PlanError> {
            for picker in pickers {
                if let Some(counts) = picker.pick(self.data, recipe, assembler)? {
                    return Ok(counts);
                }
            }
            Ok(ModuleCounts::new())
        };
        Ok(ModuleLayout::new(
            first(self.config.module_pickers())?,
            first(self.config.beacon_pickers())?,
        ))
    }

    /// Pick and validate the assembler and layout of `id`.
    pub fn setup(&self, id: RecipeId) -> Result<RecipeSetup, PlanError> {
        let recipe = self.data.recipe(id)?;
        let assembler_id = self.pick_assembler(id)?;
        let assembler = self.data.assembler(assembler_id)?;
        if !assembler.crafting_categories.contains(&recipe.category) {
            return Err(PlanError::AssemblerNotAllowed {
                assembler: assembler.name.clone(),
                recipe: recipe.name.clone(),
                category: recipe.category.clone(),
            });
        }

        let layout = self.pick_layout(id, assembler_id)?;
        let effect = self.check_layout(id, recipe, assembler, &layout)?;
        debug!(
            recipe = %recipe.name,
            assembler = %assembler.name,
            effect = %effect,
            "recipe setup"
        );
        Ok(RecipeSetup {
            assembler: assembler_id,
            layout,
            effect,
        })
    }

    fn check_layout(
        &self,
        id: RecipeId,
        recipe: &Recipe,
        assembler: &Assembler,
        layout: &ModuleLayout,
    ) -> Result<Effect, PlanError> {
        for module_id in layout.used_modules() {
            let module = self.data.module(module_id)?;
            if !module.allowed_on(id) {
                return Err(PlanError::ModuleNotAllowed {
                    module: module.name.clone(),
                    recipe: recipe.name.clone(),
                });
            }
        }

        let count = layout.module_count();
        if count > u64::from(assembler.module_slots) {
            return Err(PlanError::TooManyModules {
                assembler: assembler.name.clone(),
                slots: assembler.module_slots,
                count,
            });
        }

        let effect = layout.effect(self.data)?;
        if let Some(name) = effect.active().find(|e| !assembler.allows_effect(e)) {
            return Err(PlanError::EffectNotAllowed {
                effect: name.to_string(),
                assembler: assembler.name.clone(),
                recipe: recipe.name.clone(),
            });
        }
        Ok(effect)
    }

    pub fn resolve(&self) -> Result<Resolution, PlanError> {
        let (items, recipe_ids) = self.relevant();
        debug!(items = items.len(), recipes = recipe_ids.len(), "relevant set");

        let recipes = recipe_ids
            .iter()
            .map(|&id| self.data.recipe(id))
            .collect::<Result<Vec<_>, _>>()?;
        let setups = recipe_ids
            .iter()
            .map(|&id| self.setup(id))
            .collect::<Result<Vec<_>, _>>()?;

        // The solver maximises; costs are minimised.
        let objective = recipe_ids
            .iter()
            .map(|&id| Ok(-self.config.objective().cost(self.data, id)?))
            .collect::<Result<Vec<Rational>, PlanError>>()?;

        let constraint_items: Vec<ItemId> = items
            .iter()
            .copied()
            .filter(|&item| !self.config.is_given(item))
            .collect();
        let constraints = constraint_items
            .iter()
            .map(|&item| {
                let scalars = recipes
                    .iter()
                    .zip(&setups)
                    .map(|(recipe, setup)| {
                        recipe.produced(item) * setup.effect.total(PRODUCTIVITY) - recipe.consumed(item)
                    })
                    .collect();
                Constraint::greater_or_equal(scalars, self.config.demand(item))
            })
            .collect();

        let program = LinearProgram::new(objective, constraints)?;
        debug!(
            variables = program.var_count(),
            constraints = program.constraints().len(),
            "compiled program"
        );
        Ok(Resolution {
            items,
            recipes: recipe_ids,
            setups,
            constraint_items,
            program,
            options: self.config.simplex().clone(),
        })
    }
}
