//! Immutable plan configuration.
//!
//! A [`PlanConfig`] is assembled once through [`PlanConfigBuilder`] and then
//! handed to the resolver by reference. Pickers are plain data (or shared
//! closures for custom rules) evaluated in registration order.

use crate::catalog::{CatalogError, GameData};
use crate::effect::ModuleCounts;
use crate::error::PlanError;
use crate::id::*;
use factorial_rational::{Rational, SimplexOptions};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

/// The unit a demanded amount is expressed per.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    #[default]
    Second,
    Minute,
    Hour,
}

impl TimeUnit {
    pub fn seconds(self) -> u32 {
        match self {
            TimeUnit::Second => 1,
            TimeUnit::Minute => 60,
            TimeUnit::Hour => 3600,
        }
    }
}

pub type CostFn = Arc<dyn Fn(&GameData, RecipeId) -> Rational + Send + Sync>;
pub type AssemblerFn = Arc<dyn Fn(&GameData, RecipeId, &[AssemblerId]) -> Option<AssemblerId> + Send + Sync>;
pub type ModuleFn = Arc<dyn Fn(&GameData, RecipeId, AssemblerId) -> Option<ModuleCounts> + Send + Sync>;

/// Per-recipe cost to minimise, summed over activity.
#[derive(Clone, Default)]
pub enum Objective {
    /// Net consumption of resource items.
    ResourceUsage,
    /// One unit of cost per recipe execution.
    RecipeCount,
    /// Every feasible plan is optimal.
    #[default]
    Nothing,
    Custom(CostFn),
}

impl Objective {
    /// Cost of one execution of `recipe`.
    pub fn cost(&self, data: &GameData, recipe: RecipeId) -> Result<Rational, CatalogError> {
        Ok(match self {
            Objective::ResourceUsage => {
                let recipe = data.recipe(recipe)?;
                data.resource_items()
                    .into_iter()
                    .map(|item| -recipe.net(item))
                    .sum()
            }
            Objective::RecipeCount => Rational::one(),
            Objective::Nothing => Rational::zero(),
            Objective::Custom(cost) => cost(data, recipe),
        })
    }
}

impl fmt::Debug for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Objective::ResourceUsage => write!(f, "ResourceUsage"),
            Objective::RecipeCount => write!(f, "RecipeCount"),
            Objective::Nothing => write!(f, "Nothing"),
            Objective::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

/// Chooses an assembler among the candidates that can craft a recipe.
#[derive(Clone)]
pub enum AssemblerPicker {
    /// This assembler whenever it is a candidate.
    Prefer(AssemblerId),
    /// The fastest candidate.
    Fastest,
    Custom(AssemblerFn),
}

impl AssemblerPicker {
    pub fn pick(
        &self,
        data: &GameData,
        recipe: RecipeId,
        candidates: &[AssemblerId],
    ) -> Result<Option<AssemblerId>, CatalogError> {
        match self {
            AssemblerPicker::Prefer(id) => Ok(candidates.contains(id).then_some(*id)),
            AssemblerPicker::Fastest => fastest(data, candidates),
            AssemblerPicker::Custom(pick) => Ok(pick(data, recipe, candidates)),
        }
    }
}

/// Highest speed; the first registered wins ties.
pub fn fastest(data: &GameData, candidates: &[AssemblerId]) -> Result<Option<AssemblerId>, CatalogError> {
    let mut best: Option<(AssemblerId, &Rational)> = None;
    for &id in candidates {
        let speed = &data.assembler(id)?.speed;
        if best.is_none_or(|(_, s)| speed > s) {
            best = Some((id, speed));
        }
    }
    Ok(best.map(|(id, _)| id))
}

impl fmt::Debug for AssemblerPicker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssemblerPicker::Prefer(id) => f.debug_tuple("Prefer").field(id).finish(),
            AssemblerPicker::Fastest => write!(f, "Fastest"),
            AssemblerPicker::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

/// Chooses the modules (or beacon modules) for a recipe on an assembler.
#[derive(Clone)]
pub enum ModulePicker {
    /// Fill every module slot with this module, when it is allowed on the
    /// recipe and all its effects are allowed by the assembler.
    FillWith(ModuleId),
    /// Always this multiset.
    Constant(ModuleCounts),
    /// This multiset, only for one assembler.
    ForAssembler {
        assembler: AssemblerId,
        modules: ModuleCounts,
    },
    Custom(ModuleFn),
}

impl ModulePicker {
    pub fn pick(
        &self,
        data: &GameData,
        recipe: RecipeId,
        assembler: AssemblerId,
    ) -> Result<Option<ModuleCounts>, CatalogError> {
        match self {
            ModulePicker::FillWith(id) => {
                let module = data.module(*id)?;
                let machine = data.assembler(assembler)?;
                let usable = module.allowed_on(recipe)
                    && module.effect.active().all(|e| machine.allows_effect(e));
                Ok(usable.then(|| {
                    let mut counts = ModuleCounts::new();
                    if machine.module_slots > 0 {
                        counts.insert(*id, machine.module_slots);
                    }
                    counts
                }))
            }
            ModulePicker::Constant(modules) => Ok(Some(modules.clone())),
            ModulePicker::ForAssembler {
                assembler: wanted,
                modules,
            } => Ok((*wanted == assembler).then(|| modules.clone())),
            ModulePicker::Custom(pick) => Ok(pick(data, recipe, assembler)),
        }
    }
}

impl fmt::Debug for ModulePicker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModulePicker::FillWith(id) => f.debug_tuple("FillWith").field(id).finish(),
            ModulePicker::Constant(modules) => f.debug_tuple("Constant").field(modules).finish(),
            ModulePicker::ForAssembler { assembler, modules } => f
                .debug_struct("ForAssembler")
                .field("assembler", assembler)
                .field("modules", modules)
                .finish(),
            ModulePicker::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

/// Where an inlined item may be nested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InlineTarget {
    /// Under its single consumer, whichever recipe that is.
    Always,
    /// Only under one of these consumer recipes.
    Into(BTreeSet<RecipeId>),
}

/// Frozen plan configuration.
#[derive(Debug, Clone, Default)]
pub struct PlanConfig {
    demands: BTreeMap<ItemId, Rational>,
    given: BTreeSet<ItemId>,
    objective: Objective,
    item_blacklist: BTreeSet<ItemId>,
    recipe_blacklist: BTreeSet<RecipeId>,
    assembler_pickers: Vec<AssemblerPicker>,
    module_pickers: Vec<ModulePicker>,
    beacon_pickers: Vec<ModulePicker>,
    inline: BTreeMap<ItemId, InlineTarget>,
    simplex: SimplexOptions,
}

impl PlanConfig {
    pub fn builder() -> PlanConfigBuilder {
        PlanConfigBuilder::default()
    }

    /// Demanded rate per second for each item.
    pub fn demands(&self) -> &BTreeMap<ItemId, Rational> {
        &self.demands
    }

    pub fn demand(&self, item: ItemId) -> Rational {
        self.demands.get(&item).cloned().unwrap_or_default()
    }

    pub fn is_given(&self, item: ItemId) -> bool {
        self.given.contains(&item)
    }

    pub fn given(&self) -> &BTreeSet<ItemId> {
        &self.given
    }

    pub fn objective(&self) -> &Objective {
        &self.objective
    }

    pub fn is_item_blacklisted(&self, item: ItemId) -> bool {
        self.item_blacklist.contains(&item)
    }

    pub fn is_recipe_blacklisted(&self, recipe: RecipeId) -> bool {
        self.recipe_blacklist.contains(&recipe)
    }

    pub fn assembler_pickers(&self) -> &[AssemblerPicker] {
        &self.assembler_pickers
    }

    pub fn module_pickers(&self) -> &[ModulePicker] {
        &self.module_pickers
    }

    pub fn beacon_pickers(&self) -> &[ModulePicker] {
        &self.beacon_pickers
    }

    pub fn inline_targets(&self) -> &BTreeMap<ItemId, InlineTarget> {
        &self.inline
    }

    pub fn simplex(&self) -> &SimplexOptions {
        &self.simplex
    }

    /// Every `inline_into` target recipe must consume its item.
    pub fn validate(&self, data: &GameData) -> Result<(), PlanError> {
        for (&item, target) in &self.inline {
            let InlineTarget::Into(recipes) = target else {
                continue;
            };
            let item_name = &data.item(item)?.name;
            for &recipe_id in recipes {
                let recipe = data.recipe(recipe_id)?;
                if !recipe.consumes(item) {
                    return Err(PlanError::InvalidInlineTarget {
                        item: item_name.clone(),
                        recipe: recipe.name.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Mutable staging area for a [`PlanConfig`].
#[derive(Debug, Clone, Default)]
pub struct PlanConfigBuilder {
    config: PlanConfig,
}

impl PlanConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Demand `amount` of `item` per `unit`. Repeated demands accumulate.
    pub fn demand(&mut self, item: ItemId, amount: impl Into<Rational>, unit: TimeUnit) -> &mut Self {
        let per_second = amount.into() / Rational::from(unit.seconds());
        *self.config.demands.entry(item).or_default() += per_second;
        self
    }

    /// Supplied from outside the plan; no balance constraint.
    pub fn given(&mut self, item: ItemId) -> &mut Self {
        self.config.given.insert(item);
        self
    }

    /// Every resource item of the catalog is given.
    pub fn given_resources(&mut self, data: &GameData) -> &mut Self {
        self.config.given.extend(data.resource_items());
        self
    }

    pub fn minimize(&mut self, objective: Objective) -> &mut Self {
        self.config.objective = objective;
        self
    }

    pub fn blacklist_item(&mut self, item: ItemId) -> &mut Self {
        self.config.item_blacklist.insert(item);
        self
    }

    pub fn blacklist_recipe(&mut self, recipe: RecipeId) -> &mut Self {
        self.config.recipe_blacklist.insert(recipe);
        self
    }

    pub fn assembler_picker(&mut self, picker: AssemblerPicker) -> &mut Self {
        self.config.assembler_pickers.push(picker);
        self
    }

    pub fn module_picker(&mut self, picker: ModulePicker) -> &mut Self {
        self.config.module_pickers.push(picker);
        self
    }

    pub fn beacon_picker(&mut self, picker: ModulePicker) -> &mut Self {
        self.config.beacon_pickers.push(picker);
        self
    }

    /// Nest `item`'s producer under its single consumer.
    pub fn inline(&mut self, item: ItemId) -> &mut Self {
        self.config.inline.insert(item, InlineTarget::Always);
        self
    }

    /// Nest `item`'s producer under `recipe` only. Has no effect after
    /// [`PlanConfigBuilder::inline`] for the same item.
    pub fn inline_into(&mut self, item: ItemId, recipe: RecipeId) -> &mut Self {
        match self
            .config
            .inline
            .entry(item)
            .or_insert_with(|| InlineTarget::Into(BTreeSet::new()))
        {
            InlineTarget::Always => {}
            InlineTarget::Into(recipes) => {
                recipes.insert(recipe);
            }
        }
        self
    }

    pub fn simplex(&mut self, options: SimplexOptions) -> &mut Self {
        self.config.simplex = options;
        self
    }

    pub fn build(self) -> PlanConfig {
        self.config
    }
}
