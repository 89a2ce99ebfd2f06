//! Shared test helpers for unit tests, integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so the sample
//! catalog is available everywhere a test needs one.

use crate::catalog::*;
use crate::effect::Effect;
use crate::id::ItemId;
use factorial_rational::Rational;
use std::collections::{BTreeMap, BTreeSet};

// ===========================================================================
// Helpers
// ===========================================================================

/// `n / d`, panicking on a zero denominator.
pub fn frac(n: i64, d: i64) -> Rational {
    Rational::new(n, d).expect("test fraction has a zero denominator")
}

pub fn stack(item: ItemId, amount: i64) -> ItemStack {
    ItemStack::new(item, amount)
}

fn names(list: &[&str]) -> BTreeSet<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn allowed(list: &[(&str, bool)]) -> BTreeMap<String, bool> {
    list.iter().map(|&(e, a)| (e.to_string(), a)).collect()
}

fn effect(list: &[(&str, Rational)]) -> Effect {
    list.iter().map(|(e, v)| (e.to_string(), v.clone())).collect()
}

pub fn assembler(
    name: &str,
    speed: Rational,
    max_ingredients: usize,
    categories: &[&str],
    module_slots: u32,
) -> Assembler {
    Assembler {
        name: name.to_string(),
        speed,
        max_ingredients,
        crafting_categories: names(categories),
        allowed_effects: allowed(&[
            ("consumption", true),
            ("speed", true),
            ("productivity", true),
            ("pollution", true),
        ]),
        module_slots,
    }
}

// ===========================================================================
// Sample catalog
// ===========================================================================

/// A small slice of the base game:
///
/// - smelting: `iron-plate`, `copper-plate`, `steel-plate`
/// - crafting: `copper-cable`, `electronic-circuit`, `iron-gear-wheel`,
///   `pipe`, `engine-unit` (three ingredients)
/// - oil: `oil-refining` (two products), `solid-fuel-from-light-oil`
/// - assemblers: `assembling-machine-1` (no slots, no productivity),
///   `assembling-machine-2`, `electric-furnace`, `oil-refinery`,
///   `chemical-plant`
/// - modules: `speed-module`, `productivity-module` (whitelisted on
///   intermediates, gears excluded)
pub fn sample_data() -> GameData {
    sample_builder().build().expect("sample catalog is consistent")
}

/// [`sample_data`] plus `iron-plate-slow`, a second smelting route for iron
/// plates that takes three ore per plate.
pub fn sample_data_with_slow_iron() -> GameData {
    let mut b = sample_builder();
    let ore = b.item_id("iron-ore").expect("sample catalog has iron ore");
    let plate = b.item_id("iron-plate").expect("sample catalog has iron plates");
    b.register_recipe(
        "iron-plate-slow",
        "smelting",
        vec![stack(ore, 3)],
        vec![stack(plate, 1)],
        frac(16, 5),
    );
    b.build().expect("sample catalog is consistent")
}

pub fn sample_builder() -> GameDataBuilder {
    let mut b = GameDataBuilder::new();

    let iron_ore = b.register_item("iron-ore", "item");
    let copper_ore = b.register_item("copper-ore", "item");
    let iron_plate = b.register_item("iron-plate", "item");
    let copper_plate = b.register_item("copper-plate", "item");
    let steel_plate = b.register_item("steel-plate", "item");
    let copper_cable = b.register_item("copper-cable", "item");
    let circuit = b.register_item("electronic-circuit", "item");
    let gear = b.register_item("iron-gear-wheel", "item");
    let pipe = b.register_item("pipe", "item");
    let engine = b.register_item("engine-unit", "item");
    let crude_oil = b.register_item("crude-oil", "fluid");
    let petroleum_gas = b.register_item("petroleum-gas", "fluid");
    let light_oil = b.register_item("light-oil", "fluid");
    let solid_fuel = b.register_item("solid-fuel", "item");

    let iron_recipe = b.register_recipe(
        "iron-plate",
        "smelting",
        vec![stack(iron_ore, 1)],
        vec![stack(iron_plate, 1)],
        frac(16, 5),
    );
    let copper_recipe = b.register_recipe(
        "copper-plate",
        "smelting",
        vec![stack(copper_ore, 1)],
        vec![stack(copper_plate, 1)],
        frac(16, 5),
    );
    b.register_recipe(
        "steel-plate",
        "smelting",
        vec![stack(iron_plate, 5)],
        vec![stack(steel_plate, 1)],
        frac(16, 1),
    );
    let cable_recipe = b.register_recipe(
        "copper-cable",
        "crafting",
        vec![stack(copper_plate, 1)],
        vec![stack(copper_cable, 2)],
        frac(1, 2),
    );
    let circuit_recipe = b.register_recipe(
        "electronic-circuit",
        "crafting",
        vec![stack(iron_plate, 1), stack(copper_cable, 3)],
        vec![stack(circuit, 1)],
        frac(1, 2),
    );
    b.register_recipe(
        "iron-gear-wheel",
        "crafting",
        vec![stack(iron_plate, 2)],
        vec![stack(gear, 1)],
        frac(1, 2),
    );
    b.register_recipe(
        "pipe",
        "crafting",
        vec![stack(iron_plate, 1)],
        vec![stack(pipe, 1)],
        frac(1, 2),
    );
    let engine_recipe = b.register_recipe(
        "engine-unit",
        "crafting",
        vec![stack(steel_plate, 1), stack(gear, 1), stack(pipe, 2)],
        vec![stack(engine, 1)],
        frac(10, 1),
    );
    b.register_recipe(
        "oil-refining",
        "oil-processing",
        vec![stack(crude_oil, 10)],
        vec![stack(petroleum_gas, 5), stack(light_oil, 5)],
        frac(5, 1),
    );
    b.register_recipe(
        "solid-fuel-from-light-oil",
        "chemistry",
        vec![stack(light_oil, 10)],
        vec![stack(solid_fuel, 1)],
        frac(2, 1),
    );

    let mut am1 = assembler(
        "assembling-machine-1",
        frac(1, 2),
        2,
        &["crafting"],
        0,
    );
    am1.allowed_effects.insert("productivity".to_string(), false);
    b.register_assembler(am1);
    b.register_assembler(assembler(
        "assembling-machine-2",
        frac(3, 4),
        4,
        &["crafting"],
        2,
    ));
    b.register_assembler(assembler(
        "electric-furnace",
        frac(2, 1),
        1,
        &["smelting"],
        2,
    ));
    b.register_assembler(assembler(
        "oil-refinery",
        frac(1, 1),
        2,
        &["oil-processing"],
        3,
    ));
    b.register_assembler(assembler(
        "chemical-plant",
        frac(1, 1),
        2,
        &["chemistry"],
        3,
    ));

    b.register_module(Module {
        name: "speed-module".to_string(),
        category: "speed".to_string(),
        tier: 1,
        effect: effect(&[("speed", frac(1, 5)), ("consumption", frac(1, 2))]),
        limitations: None,
    });
    b.register_module(Module {
        name: "productivity-module".to_string(),
        category: "productivity".to_string(),
        tier: 1,
        effect: effect(&[
            ("productivity", frac(1, 10)),
            ("speed", frac(-1, 20)),
            ("consumption", frac(2, 5)),
        ]),
        limitations: Some(
            [iron_recipe, copper_recipe, cable_recipe, circuit_recipe, engine_recipe]
                .into_iter()
                .collect(),
        ),
    });

    for (name, ore) in [("iron-ore", iron_ore), ("copper-ore", copper_ore)] {
        b.register_resource(Resource {
            name: name.to_string(),
            products: vec![stack(ore, 1)],
            mining_time: frac(1, 1),
            category: "basic-solid".to_string(),
            required_fluid: None,
            normal_amount: None,
        });
    }
    b.register_resource(Resource {
        name: "crude-oil".to_string(),
        products: vec![stack(crude_oil, 10)],
        mining_time: frac(1, 1),
        category: "basic-fluid".to_string(),
        required_fluid: None,
        normal_amount: Some(frac(300000, 1)),
    });
    b.register_miner(Miner {
        name: "electric-mining-drill".to_string(),
        speed: frac(1, 2),
        resource_categories: names(&["basic-solid"]),
        allowed_effects: allowed(&[("speed", true), ("productivity", true)]),
    });
    b.register_miner(Miner {
        name: "pumpjack".to_string(),
        speed: frac(1, 1),
        resource_categories: names(&["basic-fluid"]),
        allowed_effects: allowed(&[("speed", true), ("productivity", true)]),
    });
    b
}
