//! Game catalog loading.

use crate::loader::{deserialize_file, in_file, resolve_name, DataLoadError};
use crate::schema::*;
use factorial_planner::catalog::{
    Assembler, GameData, GameDataBuilder, ItemStack, Miner, Module, Resource,
};
use factorial_planner::effect::Effect;
use factorial_planner::id::{ItemId, RecipeId};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use tracing::debug;

/// Load a catalog export from `path` (format from the extension).
pub fn load_catalog(path: &Path) -> Result<GameData, DataLoadError> {
    let data: CatalogData = deserialize_file(path)?;
    let catalog = build_catalog(&data, path)?;
    debug!(
        path = %path.display(),
        items = catalog.item_count(),
        recipes = catalog.recipe_count(),
        assemblers = catalog.assembler_count(),
        modules = catalog.module_count(),
        "catalog loaded"
    );
    Ok(catalog)
}

/// Resolve every name reference of `data` and build the catalog. `file`
/// labels errors.
pub fn build_catalog(data: &CatalogData, file: &Path) -> Result<GameData, DataLoadError> {
    let mut builder = GameDataBuilder::new();

    let mut item_names: HashMap<String, ItemId> = HashMap::new();
    for item in data.items.values() {
        let id = builder.register_item(&item.name, &item.kind);
        item_names.insert(item.name.clone(), id);
    }
    let stacks = |list: &[StackData]| -> Result<Vec<ItemStack>, DataLoadError> {
        list.iter().map(|s| stack(s, &item_names, file)).collect()
    };

    let mut recipe_names: HashMap<String, RecipeId> = HashMap::new();
    for recipe in data.recipes.values() {
        let id = builder.register_recipe(
            &recipe.name,
            &recipe.category,
            stacks(&recipe.ingredients)?,
            stacks(&recipe.products)?,
            recipe.energy.clone(),
        );
        recipe_names.insert(recipe.name.clone(), id);
    }

    for a in data.assemblers.values() {
        builder.register_assembler(Assembler {
            name: a.name.clone(),
            speed: a.crafting_speed.clone(),
            max_ingredients: a.ingredient_count,
            crafting_categories: a.crafting_categories.clone(),
            allowed_effects: a.allowed_effects.clone(),
            module_slots: a.module_inventory_size,
        });
    }

    for m in data.modules.values() {
        let limitations = m
            .limitations
            .as_ref()
            .map(|names| {
                names
                    .iter()
                    .map(|n| resolve_name(&recipe_names, n, file, "recipe"))
                    .collect::<Result<BTreeSet<_>, _>>()
            })
            .transpose()?;
        builder.register_module(Module {
            name: m.name.clone(),
            category: m.category.clone(),
            tier: m.tier,
            effect: m
                .module_effects
                .iter()
                .map(|(e, v)| (e.clone(), v.clone()))
                .collect::<Effect>(),
            limitations,
        });
    }

    for r in data.resources.values() {
        builder.register_resource(Resource {
            name: r.name.clone(),
            products: stacks(&r.products)?,
            mining_time: r.mining_time.clone(),
            category: r.resource_category.clone(),
            required_fluid: r
                .required_fluid
                .as_ref()
                .map(|s| stack(s, &item_names, file))
                .transpose()?,
            normal_amount: r.normal_amount.clone(),
        });
    }

    for m in data.miners.values() {
        builder.register_miner(Miner {
            name: m.name.clone(),
            speed: m.mining_speed.clone(),
            resource_categories: m.resource_categories.clone(),
            allowed_effects: m.allowed_effects.clone(),
        });
    }

    builder.build().map_err(in_file(file))
}

fn stack(
    data: &StackData,
    items: &HashMap<String, ItemId>,
    file: &Path,
) -> Result<ItemStack, DataLoadError> {
    let item = resolve_name(items, &data.name, file, "item")?;
    let amount = data
        .amount
        .as_ref()
        .or(data.minimum_resource_amount.as_ref())
        .ok_or_else(|| DataLoadError::MissingAmount {
            file: file.to_path_buf(),
            item: data.name.clone(),
        })?;
    Ok(ItemStack::new(item, amount.clone()))
}
