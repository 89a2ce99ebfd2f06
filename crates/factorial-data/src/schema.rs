//! Serde data file structs.
//!
//! Two documents are described here: the game catalog export (objects keyed
//! by entity name, field names as the game's data dump spells them) and the
//! plan file, which names everything by catalog name. Both are resolved into
//! planner types by [`crate::catalog`] and [`crate::plan`].

use factorial_planner::config::TimeUnit;
use factorial_rational::Rational;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};

// ===========================================================================
// Catalog export
// ===========================================================================

/// The whole catalog export.
///
/// Sections are keyed by name and visited in key order, which fixes the
/// catalog order the resolver relies on.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogData {
    pub items: BTreeMap<String, ItemData>,
    pub recipes: BTreeMap<String, RecipeData>,
    pub assemblers: BTreeMap<String, AssemblerData>,
    #[serde(default)]
    pub resources: BTreeMap<String, ResourceData>,
    #[serde(default)]
    pub miners: BTreeMap<String, MinerData>,
    #[serde(default)]
    pub modules: BTreeMap<String, ModuleData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemData {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// An item stack. Resource products may carry `minimum_resource_amount`
/// instead of `amount`.
#[derive(Debug, Clone, Deserialize)]
pub struct StackData {
    pub name: String,
    #[serde(default)]
    pub amount: Option<Rational>,
    #[serde(default)]
    pub minimum_resource_amount: Option<Rational>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecipeData {
    pub name: String,
    pub category: String,
    pub ingredients: Vec<StackData>,
    pub products: Vec<StackData>,
    pub energy: Rational,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssemblerData {
    pub name: String,
    pub crafting_speed: Rational,
    pub ingredient_count: usize,
    pub crafting_categories: BTreeSet<String>,
    pub allowed_effects: BTreeMap<String, bool>,
    pub module_inventory_size: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResourceData {
    pub name: String,
    pub products: Vec<StackData>,
    pub mining_time: Rational,
    pub resource_category: String,
    #[serde(default)]
    pub required_fluid: Option<StackData>,
    #[serde(default)]
    pub normal_amount: Option<Rational>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MinerData {
    pub name: String,
    pub mining_speed: Rational,
    pub resource_categories: BTreeSet<String>,
    pub allowed_effects: BTreeMap<String, bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModuleData {
    pub name: String,
    pub category: String,
    pub tier: u32,
    pub module_effects: BTreeMap<String, Rational>,
    /// Recipe names; absent means usable everywhere.
    #[serde(default)]
    pub limitations: Option<Vec<String>>,
}

// ===========================================================================
// Plan file
// ===========================================================================

/// A plan: what to build and how.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlanData {
    pub demands: Vec<DemandData>,
    #[serde(default)]
    pub given: Vec<String>,
    /// Treat every resource item as given.
    #[serde(default)]
    pub given_resources: bool,
    #[serde(default)]
    pub minimize: ObjectiveData,
    #[serde(default)]
    pub blacklist_items: Vec<String>,
    #[serde(default)]
    pub blacklist_recipes: Vec<String>,
    #[serde(default)]
    pub assemblers: Vec<AssemblerPickerData>,
    #[serde(default)]
    pub modules: Vec<ModulePickerData>,
    #[serde(default)]
    pub beacons: Vec<ModulePickerData>,
    #[serde(default)]
    pub inline: Vec<InlineData>,
    #[serde(default)]
    pub max_pivots: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DemandData {
    pub item: String,
    pub amount: Rational,
    #[serde(default)]
    pub per: TimeUnit,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectiveData {
    ResourceUsage,
    RecipeCount,
    #[default]
    Nothing,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssemblerPickerData {
    Prefer(String),
    Fastest,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModulePickerData {
    FillWith(String),
    Constant(BTreeMap<String, u32>),
    ForAssembler {
        assembler: String,
        modules: BTreeMap<String, u32>,
    },
}

/// Inline `item` under its consumer, or only under the `into` recipes
/// when any are listed.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InlineData {
    pub item: String,
    #[serde(default)]
    pub into: Vec<String>,
}
