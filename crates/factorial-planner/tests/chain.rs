//! Stoichiometry of small hand-built chains.

use factorial_planner::catalog::{Assembler, GameData, GameDataBuilder, Module};
use factorial_planner::config::{ModulePicker, Objective, PlanConfig, TimeUnit};
use factorial_planner::effect::{Effect, PRODUCTIVITY};
use factorial_planner::id::*;
use factorial_planner::plan;
use factorial_planner::resolver::Resolver;
use factorial_planner::test_utils::{assembler, frac, stack};
use factorial_rational::Rational;

/// `a` (given) -> R1: 1 a => 2 b -> R2: 1 b => 1 c, plus an unrelated
/// recipe that must stay out of the plan.
fn chain() -> (GameData, [ItemId; 3], [RecipeId; 2], ModuleId) {
    let mut b = GameDataBuilder::new();
    let a = b.register_item("a", "item");
    let bb = b.register_item("b", "item");
    let c = b.register_item("c", "item");
    let d = b.register_item("d", "item");
    let r1 = b.register_recipe("r1", "crafting", vec![stack(a, 1)], vec![stack(bb, 2)], frac(1, 1));
    let r2 = b.register_recipe("r2", "crafting", vec![stack(bb, 1)], vec![stack(c, 1)], frac(1, 1));
    b.register_recipe("r3", "crafting", vec![stack(c, 1)], vec![stack(d, 1)], frac(1, 1));
    b.register_assembler(assembler("machine", frac(1, 1), 4, &["crafting"], 4));
    let module = b.register_module(Module {
        name: "productivity".to_string(),
        category: "productivity".to_string(),
        tier: 1,
        effect: vec![(PRODUCTIVITY.to_string(), frac(1, 10))].into_iter().collect::<Effect>(),
        limitations: None,
    });
    let data = b.build().unwrap();
    (data, [a, bb, c], [r1, r2], module)
}

fn config(c: ItemId, a: ItemId) -> PlanConfig {
    let mut b = PlanConfig::builder();
    b.demand(c, 1, TimeUnit::Second)
        .given(a)
        .minimize(Objective::RecipeCount);
    b.build()
}

#[test]
fn resolver_includes_exactly_the_chain() {
    let (data, [a, _, c], [r1, r2], _) = chain();
    let config = config(c, a);
    let resolution = Resolver::new(&data, &config).resolve().unwrap();
    assert_eq!(resolution.recipes, vec![r2, r1]);
}

#[test]
fn solved_counts_follow_stoichiometry() {
    let (data, [a, _, c], [r1, r2], _) = chain();
    let plan = plan(&data, &config(c, a)).unwrap();
    assert_eq!(plan.count(r2), Rational::one());
    assert_eq!(plan.count(r1), frac(1, 2) * plan.count(r2));
}

#[test]
fn productivity_reduces_upstream_activity() {
    let (data, [a, b_item, c], [r1, r2], module) = chain();
    let mut b = PlanConfig::builder();
    b.demand(c, 1, TimeUnit::Second)
        .given(a)
        .minimize(Objective::RecipeCount)
        .module_picker(ModulePicker::Custom(std::sync::Arc::new(
            move |_: &GameData, recipe: RecipeId, _: AssemblerId| {
                (recipe == r1).then(|| [(module, 1)].into_iter().collect())
            },
        )));
    let plan = plan(&data, &b.build()).unwrap();

    let r1_production = plan.production(r1).unwrap();
    assert_eq!(r1_production.effect.total(PRODUCTIVITY), frac(11, 10));
    // 2.2 b per execution instead of 2.
    assert_eq!(plan.count(r1), frac(5, 11));
    assert_eq!(r1_production.produced(&data, b_item).unwrap(), Rational::one());
    assert_eq!(plan.count(r2), Rational::one());
}

#[test]
fn assembler_is_shared_by_every_recipe() {
    let (data, [a, _, c], _, _) = chain();
    let plan = plan(&data, &config(c, a)).unwrap();
    let machine: &Assembler = data.assembler(plan.productions[0].assembler).unwrap();
    assert_eq!(machine.name, "machine");
    assert!(plan
        .productions
        .iter()
        .all(|p| p.assembler == plan.productions[0].assembler));
}
