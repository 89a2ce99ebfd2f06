//! Plan file loading.
//!
//! A plan file names items, recipes, assemblers and modules by their catalog
//! names. Every name is looked up with the catalog's `find_*` methods so a
//! typo reports similarly named entries.

use crate::loader::{deserialize_file, in_file, DataLoadError};
use crate::schema::*;
use factorial_planner::catalog::{CatalogError, GameData};
use factorial_planner::config::{AssemblerPicker, ModulePicker, Objective, PlanConfig};
use factorial_planner::effect::ModuleCounts;
use factorial_rational::SimplexOptions;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Load a plan file from `path` and resolve it against `data`.
pub fn load_plan(path: &Path, data: &GameData) -> Result<PlanConfig, DataLoadError> {
    let plan: PlanData = deserialize_file(path)?;
    let config = build_config(&plan, data).map_err(in_file(path))?;
    debug!(
        path = %path.display(),
        demands = config.demands().len(),
        given = config.given().len(),
        "plan loaded"
    );
    Ok(config)
}

/// Resolve a parsed plan into a [`PlanConfig`].
pub fn build_config(plan: &PlanData, data: &GameData) -> Result<PlanConfig, CatalogError> {
    let mut b = PlanConfig::builder();

    for d in &plan.demands {
        b.demand(data.find_item(&d.item)?, d.amount.clone(), d.per);
    }
    for name in &plan.given {
        b.given(data.find_item(name)?);
    }
    if plan.given_resources {
        b.given_resources(data);
    }
    b.minimize(match plan.minimize {
        ObjectiveData::ResourceUsage => Objective::ResourceUsage,
        ObjectiveData::RecipeCount => Objective::RecipeCount,
        ObjectiveData::Nothing => Objective::Nothing,
    });
    for name in &plan.blacklist_items {
        b.blacklist_item(data.find_item(name)?);
    }
    for name in &plan.blacklist_recipes {
        b.blacklist_recipe(data.find_recipe(name)?);
    }

    for picker in &plan.assemblers {
        b.assembler_picker(match picker {
            AssemblerPickerData::Prefer(name) => AssemblerPicker::Prefer(data.find_assembler(name)?),
            AssemblerPickerData::Fastest => AssemblerPicker::Fastest,
        });
    }
    for picker in &plan.modules {
        b.module_picker(module_picker(picker, data)?);
    }
    for picker in &plan.beacons {
        b.beacon_picker(module_picker(picker, data)?);
    }

    for inline in &plan.inline {
        let item = data.find_item(&inline.item)?;
        if inline.into.is_empty() {
            b.inline(item);
        }
        for recipe in &inline.into {
            b.inline_into(item, data.find_recipe(recipe)?);
        }
    }

    b.simplex(SimplexOptions {
        max_pivots: plan.max_pivots,
    });
    Ok(b.build())
}

fn module_picker(picker: &ModulePickerData, data: &GameData) -> Result<ModulePicker, CatalogError> {
    Ok(match picker {
        ModulePickerData::FillWith(name) => ModulePicker::FillWith(data.find_module(name)?),
        ModulePickerData::Constant(modules) => ModulePicker::Constant(module_counts(modules, data)?),
        ModulePickerData::ForAssembler { assembler, modules } => ModulePicker::ForAssembler {
            assembler: data.find_assembler(assembler)?,
            modules: module_counts(modules, data)?,
        },
    })
}

fn module_counts(modules: &BTreeMap<String, u32>, data: &GameData) -> Result<ModuleCounts, CatalogError> {
    modules
        .iter()
        .filter(|&(_, &count)| count > 0)
        .map(|(name, &count)| data.find_module(name).map(|id| (id, count)))
        .collect()
}
