use crate::effect::Effect;
use crate::id::*;
use factorial_rational::Rational;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// An item kind as exported by the game ("item", "fluid", "tool", ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub kind: String,
}

/// An amount of one item. Amounts are exact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub item: ItemId,
    pub amount: Rational,
}

impl ItemStack {
    pub fn new(item: ItemId, amount: impl Into<Rational>) -> Self {
        Self {
            item,
            amount: amount.into(),
        }
    }
}

/// A crafting recipe. `energy` is the crafting time in seconds at speed 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub name: String,
    pub category: String,
    pub ingredients: Vec<ItemStack>,
    pub products: Vec<ItemStack>,
    pub energy: Rational,
}

impl Recipe {
    /// Total amount of `item` produced by one execution, before effects.
    pub fn produced(&self, item: ItemId) -> Rational {
        count_item(&self.products, item)
    }

    /// Total amount of `item` consumed by one execution.
    pub fn consumed(&self, item: ItemId) -> Rational {
        count_item(&self.ingredients, item)
    }

    /// `produced - consumed` for one execution.
    pub fn net(&self, item: ItemId) -> Rational {
        self.produced(item) - self.consumed(item)
    }

    pub fn produces(&self, item: ItemId) -> bool {
        self.products.iter().any(|s| s.item == item)
    }

    pub fn consumes(&self, item: ItemId) -> bool {
        self.ingredients.iter().any(|s| s.item == item)
    }
}

fn count_item(stacks: &[ItemStack], item: ItemId) -> Rational {
    stacks
        .iter()
        .filter(|s| s.item == item)
        .map(|s| &s.amount)
        .sum()
}

/// A crafting machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assembler {
    pub name: String,
    pub speed: Rational,
    pub max_ingredients: usize,
    pub crafting_categories: BTreeSet<String>,
    pub allowed_effects: BTreeMap<String, bool>,
    pub module_slots: u32,
}

impl Assembler {
    pub fn allows_effect(&self, effect: &str) -> bool {
        self.allowed_effects.get(effect).copied().unwrap_or(false)
    }

    /// Category and ingredient-count check.
    pub fn admits(&self, recipe: &Recipe) -> bool {
        self.crafting_categories.contains(&recipe.category)
            && recipe.ingredients.len() <= self.max_ingredients
    }
}

/// A module. `limitations`, when present, whitelists the recipes it may be
/// used on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub name: String,
    pub category: String,
    pub tier: u32,
    pub effect: Effect,
    pub limitations: Option<BTreeSet<RecipeId>>,
}

impl Module {
    pub fn allowed_on(&self, recipe: RecipeId) -> bool {
        self.limitations
            .as_ref()
            .is_none_or(|allowed| allowed.contains(&recipe))
    }
}

/// A minable resource patch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub name: String,
    pub products: Vec<ItemStack>,
    pub mining_time: Rational,
    pub category: String,
    pub required_fluid: Option<ItemStack>,
    pub normal_amount: Option<Rational>,
}

/// A mining machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Miner {
    pub name: String,
    pub speed: Rational,
    pub resource_categories: BTreeSet<String>,
    pub allowed_effects: BTreeMap<String, bool>,
}

/// Name table shared by every entity kind: dense storage plus a name index.
#[derive(Debug, Clone)]
struct Table<T> {
    entries: Vec<T>,
    by_name: HashMap<String, u32>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            by_name: HashMap::new(),
        }
    }
}

impl<T> Table<T> {
    /// Returns the new index and whether the name was already taken.
    fn push(&mut self, name: &str, entry: T) -> (u32, bool) {
        let index = self.entries.len() as u32;
        self.entries.push(entry);
        let duplicate = self.by_name.insert(name.to_string(), index).is_some();
        (index, duplicate)
    }

    fn get(&self, index: u32) -> Option<&T> {
        self.entries.get(index as usize)
    }

    fn index_of(&self, name: &str) -> Option<u32> {
        self.by_name.get(name).copied()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Builder for constructing an immutable [`GameData`] catalog.
/// Entities are registered first; `build()` validates every cross
/// reference and rejects duplicate names.
#[derive(Debug, Default)]
pub struct GameDataBuilder {
    items: Table<Item>,
    recipes: Table<Recipe>,
    assemblers: Table<Assembler>,
    modules: Table<Module>,
    resources: Vec<Resource>,
    miners: Vec<Miner>,
    duplicate: Option<(&'static str, String)>,
}

impl GameDataBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn note_duplicate(&mut self, kind: &'static str, name: &str, duplicate: bool) {
        if duplicate && self.duplicate.is_none() {
            self.duplicate = Some((kind, name.to_string()));
        }
    }

    /// Register an item. Returns its ID.
    pub fn register_item(&mut self, name: &str, kind: &str) -> ItemId {
        let (index, duplicate) = self.items.push(
            name,
            Item {
                name: name.to_string(),
                kind: kind.to_string(),
            },
        );
        self.note_duplicate("item", name, duplicate);
        ItemId(index)
    }

    /// Register a recipe. Returns its ID.
    pub fn register_recipe(
        &mut self,
        name: &str,
        category: &str,
        ingredients: Vec<ItemStack>,
        products: Vec<ItemStack>,
        energy: Rational,
    ) -> RecipeId {
        let (index, duplicate) = self.recipes.push(
            name,
            Recipe {
                name: name.to_string(),
                category: category.to_string(),
                ingredients,
                products,
                energy,
            },
        );
        self.note_duplicate("recipe", name, duplicate);
        RecipeId(index)
    }

    /// Register an assembler. Its `name` is the lookup key.
    pub fn register_assembler(&mut self, assembler: Assembler) -> AssemblerId {
        let name = assembler.name.clone();
        let (index, duplicate) = self.assemblers.push(&name, assembler);
        self.note_duplicate("assembler", &name, duplicate);
        AssemblerId(index)
    }

    /// Register a module. Its `name` is the lookup key.
    pub fn register_module(&mut self, module: Module) -> ModuleId {
        let name = module.name.clone();
        let (index, duplicate) = self.modules.push(&name, module);
        self.note_duplicate("module", &name, duplicate);
        ModuleId(index)
    }

    pub fn register_resource(&mut self, resource: Resource) {
        self.resources.push(resource);
    }

    pub fn register_miner(&mut self, miner: Miner) {
        self.miners.push(miner);
    }

    pub fn item_id(&self, name: &str) -> Option<ItemId> {
        self.items.index_of(name).map(ItemId)
    }

    pub fn recipe_id(&self, name: &str) -> Option<RecipeId> {
        self.recipes.index_of(name).map(RecipeId)
    }

    /// Finalize and build the immutable catalog.
    pub fn build(self) -> Result<GameData, CatalogError> {
        if let Some((kind, name)) = self.duplicate {
            return Err(CatalogError::DuplicateName { kind, name });
        }

        let item_count = self.items.len();
        let check_stack = |stack: &ItemStack| {
            if stack.item.0 as usize >= item_count {
                Err(CatalogError::InvalidItemRef(stack.item))
            } else {
                Ok(())
            }
        };

        for recipe in &self.recipes.entries {
            recipe
                .ingredients
                .iter()
                .chain(&recipe.products)
                .try_for_each(check_stack)?;
        }
        for resource in &self.resources {
            resource
                .products
                .iter()
                .chain(&resource.required_fluid)
                .try_for_each(check_stack)?;
        }
        for module in &self.modules.entries {
            if let Some(bad) = module
                .limitations
                .iter()
                .flatten()
                .find(|r| r.0 as usize >= self.recipes.len())
            {
                return Err(CatalogError::InvalidRecipeRef(*bad));
            }
        }

        Ok(GameData {
            items: self.items,
            recipes: self.recipes,
            assemblers: self.assemblers,
            modules: self.modules,
            resources: self.resources,
            miners: self.miners,
        })
    }
}

/// Immutable game catalog. Frozen after build(). Thread-safe to share.
#[derive(Debug, Clone)]
pub struct GameData {
    items: Table<Item>,
    recipes: Table<Recipe>,
    assemblers: Table<Assembler>,
    modules: Table<Module>,
    resources: Vec<Resource>,
    miners: Vec<Miner>,
}

impl GameData {
    pub fn builder() -> GameDataBuilder {
        GameDataBuilder::new()
    }

    pub fn item(&self, id: ItemId) -> Result<&Item, CatalogError> {
        self.items.get(id.0).ok_or(CatalogError::InvalidItemRef(id))
    }

    pub fn recipe(&self, id: RecipeId) -> Result<&Recipe, CatalogError> {
        self.recipes.get(id.0).ok_or(CatalogError::InvalidRecipeRef(id))
    }

    pub fn assembler(&self, id: AssemblerId) -> Result<&Assembler, CatalogError> {
        self.assemblers
            .get(id.0)
            .ok_or(CatalogError::InvalidAssemblerRef(id))
    }

    pub fn module(&self, id: ModuleId) -> Result<&Module, CatalogError> {
        self.modules.get(id.0).ok_or(CatalogError::InvalidModuleRef(id))
    }

    pub fn items(&self) -> impl Iterator<Item = (ItemId, &Item)> {
        self.items
            .entries
            .iter()
            .enumerate()
            .map(|(i, item)| (ItemId(i as u32), item))
    }

    /// Recipes in registration order.
    pub fn recipes(&self) -> impl Iterator<Item = (RecipeId, &Recipe)> {
        self.recipes
            .entries
            .iter()
            .enumerate()
            .map(|(i, recipe)| (RecipeId(i as u32), recipe))
    }

    pub fn assemblers(&self) -> impl Iterator<Item = (AssemblerId, &Assembler)> {
        self.assemblers
            .entries
            .iter()
            .enumerate()
            .map(|(i, assembler)| (AssemblerId(i as u32), assembler))
    }

    pub fn modules(&self) -> impl Iterator<Item = (ModuleId, &Module)> {
        self.modules
            .entries
            .iter()
            .enumerate()
            .map(|(i, module)| (ModuleId(i as u32), module))
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn miners(&self) -> &[Miner] {
        &self.miners
    }

    /// Every item some resource yields, in first-seen order.
    pub fn resource_items(&self) -> Vec<ItemId> {
        let mut seen = BTreeSet::new();
        self.resources
            .iter()
            .flat_map(|r| &r.products)
            .map(|s| s.item)
            .filter(|&item| seen.insert(item))
            .collect()
    }

    pub fn item_id(&self, name: &str) -> Option<ItemId> {
        self.items.index_of(name).map(ItemId)
    }

    pub fn recipe_id(&self, name: &str) -> Option<RecipeId> {
        self.recipes.index_of(name).map(RecipeId)
    }

    pub fn assembler_id(&self, name: &str) -> Option<AssemblerId> {
        self.assemblers.index_of(name).map(AssemblerId)
    }

    pub fn module_id(&self, name: &str) -> Option<ModuleId> {
        self.modules.index_of(name).map(ModuleId)
    }

    /// Like [`GameData::item_id`], but a miss carries "did you mean"
    /// suggestions.
    pub fn find_item(&self, name: &str) -> Result<ItemId, CatalogError> {
        self.item_id(name)
            .ok_or_else(|| not_found("item", name, self.items.entries.iter().map(|i| &i.name)))
    }

    pub fn find_recipe(&self, name: &str) -> Result<RecipeId, CatalogError> {
        self.recipe_id(name)
            .ok_or_else(|| not_found("recipe", name, self.recipes.entries.iter().map(|r| &r.name)))
    }

    pub fn find_assembler(&self, name: &str) -> Result<AssemblerId, CatalogError> {
        self.assembler_id(name).ok_or_else(|| {
            not_found("assembler", name, self.assemblers.entries.iter().map(|a| &a.name))
        })
    }

    pub fn find_module(&self, name: &str) -> Result<ModuleId, CatalogError> {
        self.module_id(name)
            .ok_or_else(|| not_found("module", name, self.modules.entries.iter().map(|m| &m.name)))
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn recipe_count(&self) -> usize {
        self.recipes.len()
    }

    pub fn assembler_count(&self) -> usize {
        self.assemblers.len()
    }

    pub fn module_count(&self) -> usize {
        self.modules.len()
    }
}

fn not_found<'a>(
    kind: &'static str,
    name: &str,
    names: impl Iterator<Item = &'a String>,
) -> CatalogError {
    CatalogError::NotFound {
        kind,
        name: name.to_string(),
        suggestions: suggestions(name, names),
    }
}

/// Names sharing at least one `-`-separated token with `query`.
pub fn suggestions<'a>(query: &str, names: impl Iterator<Item = &'a String>) -> Vec<String> {
    let tokens: BTreeSet<&str> = query.split('-').collect();
    names
        .filter(|name| name.split('-').any(|t| tokens.contains(t)))
        .cloned()
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("{kind} '{name}' not found, similar: {suggestions:?}")]
    NotFound {
        kind: &'static str,
        name: String,
        suggestions: Vec<String>,
    },
    #[error("duplicate {kind} name '{name}'")]
    DuplicateName { kind: &'static str, name: String },
    #[error("invalid item reference: {0:?}")]
    InvalidItemRef(ItemId),
    #[error("invalid recipe reference: {0:?}")]
    InvalidRecipeRef(RecipeId),
    #[error("invalid assembler reference: {0:?}")]
    InvalidAssemblerRef(AssemblerId),
    #[error("invalid module reference: {0:?}")]
    InvalidModuleRef(ModuleId),
}
