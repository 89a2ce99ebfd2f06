//! Nesting of inlined intermediate productions under their consumers.
//!
//! Productions live in an arena (the input slice) and are referenced by
//! index. Each production has at most one *target*: the single consumer its
//! only product is inlined into. Trees are grown from a root with an
//! explicit stack; a child is attached with the share of its output that
//! the parent node actually consumes. Every production is attributed
//! exactly once in total, any share left over becomes its own root.

use crate::catalog::{GameData, Recipe};
use crate::config::{InlineTarget, PlanConfig};
use crate::error::PlanError;
use crate::id::{ItemId, RecipeId};
use crate::production::Production;
use factorial_rational::Rational;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

/// A (possibly scaled) production and the inlined productions feeding it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionGroup {
    pub production: Production,
    pub children: Vec<ProductionGroup>,
}

impl ProductionGroup {
    /// Pre-order walk with depth.
    pub fn walk(&self) -> Vec<(usize, &ProductionGroup)> {
        let mut out = Vec::new();
        let mut stack = vec![(0, self)];
        while let Some((depth, group)) = stack.pop() {
            out.push((depth, group));
            stack.extend(group.children.iter().rev().map(|c| (depth + 1, c)));
        }
        out
    }
}

/// An inline edge: `productions[producer]` feeds `item` to `consumer`.
#[derive(Debug, Clone, Copy)]
struct Target {
    consumer: usize,
    item: ItemId,
}

/// Which productions are nested under which consumer. An item qualifies
/// only when exactly one of the `relevant` recipes produces it, whether or
/// not the others ended up with any activity.
fn inline_targets(
    data: &GameData,
    config: &PlanConfig,
    relevant: &[RecipeId],
    productions: &[Production],
) -> Result<Vec<Option<Target>>, PlanError> {
    let mut targets = vec![None; productions.len()];
    let recipes = productions
        .iter()
        .map(|p| data.recipe(p.recipe))
        .collect::<Result<Vec<_>, _>>()?;
    let relevant = relevant
        .iter()
        .map(|&id| data.recipe(id).map(|recipe| (id, recipe)))
        .collect::<Result<Vec<_>, _>>()?;

    for (&item, directive) in config.inline_targets() {
        let item_name = &data.item(item)?.name;
        let producing: Vec<&(RecipeId, &Recipe)> =
            relevant.iter().filter(|(_, r)| r.produces(item)).collect();
        let &[&(producer_recipe, recipe)] = producing.as_slice() else {
            debug!(item = %item_name, producers = producing.len(), "not inlined: producer is not unique");
            continue;
        };
        if recipe.products.len() > 1 {
            return Err(PlanError::InlineMultipleProducts {
                item: item_name.clone(),
                recipe: recipe.name.clone(),
                products: recipe.products.len(),
            });
        }
        let Some(producer) = productions.iter().position(|p| p.recipe == producer_recipe) else {
            debug!(item = %item_name, "not inlined: producer is idle");
            continue;
        };

        let consumers: Vec<usize> = (0..productions.len())
            .filter(|&i| i != producer && recipes[i].consumes(item))
            .filter(|&i| match directive {
                InlineTarget::Always => true,
                InlineTarget::Into(allowed) => allowed.contains(&productions[i].recipe),
            })
            .collect();
        match consumers.as_slice() {
            [] => debug!(item = %item_name, "not inlined: no consumer"),
            &[consumer] => targets[producer] = Some(Target { consumer, item }),
            _ => {
                return Err(PlanError::InlineAmbiguousConsumer {
                    item: item_name.clone(),
                    consumers: consumers.iter().map(|&i| recipes[i].name.clone()).collect(),
                });
            }
        }
    }
    Ok(targets)
}

/// One node of a tree under construction.
struct Node {
    production: usize,
    scale: Rational,
    parent: Option<usize>,
}

/// Build the production forest. Summed over the forest, the scales of every
/// production add up to one.
pub fn group(
    data: &GameData,
    config: &PlanConfig,
    relevant: &[RecipeId],
    productions: &[Production],
) -> Result<Vec<ProductionGroup>, PlanError> {
    let targets = inline_targets(data, config, relevant, productions)?;
    let mut children_of: Vec<Vec<usize>> = vec![Vec::new(); productions.len()];
    for (producer, target) in targets.iter().enumerate() {
        if let Some(t) = target {
            children_of[t.consumer].push(producer);
        }
    }

    let mut attributed = vec![Rational::zero(); productions.len()];
    let mut remaining: BTreeSet<usize> = (0..productions.len()).collect();
    let mut forest = Vec::new();

    while let Some(&first) = remaining.iter().next() {
        // A production waits for its consumer unless the inline edges form
        // a cycle.
        let root = remaining
            .iter()
            .copied()
            .find(|&i| targets[i].is_none_or(|t| !remaining.contains(&t.consumer)))
            .unwrap_or(first);
        remaining.remove(&root);
        let scale = Rational::one() - &attributed[root];
        attributed[root] = Rational::one();

        let mut nodes = vec![Node {
            production: root,
            scale,
            parent: None,
        }];
        let mut stack = vec![0];
        while let Some(n) = stack.pop() {
            let parent = nodes[n].production;
            for &child in &children_of[parent] {
                if on_path(&nodes, n, child) || attributed[child] == Rational::one() {
                    continue;
                }
                let Some(item) = targets[child].map(|t| t.item) else {
                    continue;
                };
                let consumed = &nodes[n].scale * productions[parent].consumed(data, item)?;
                let produced = productions[child].produced(data, item)?;
                let Ok(share) = consumed.checked_div(&produced) else {
                    continue;
                };
                let share = share.min(Rational::one() - &attributed[child]);
                if !share.is_positive() {
                    continue;
                }
                attributed[child] += &share;
                if attributed[child] == Rational::one() {
                    remaining.remove(&child);
                }
                nodes.push(Node {
                    production: child,
                    scale: share,
                    parent: Some(n),
                });
                stack.push(nodes.len() - 1);
            }
        }
        debug!(root, nodes = nodes.len(), "production group");
        forest.push(materialize(productions, nodes));
    }
    Ok(forest)
}

fn on_path(nodes: &[Node], mut n: usize, production: usize) -> bool {
    loop {
        if nodes[n].production == production {
            return true;
        }
        match nodes[n].parent {
            Some(parent) => n = parent,
            None => return false,
        }
    }
}

/// Every node's parent precedes it, so folding from the back attaches each
/// subtree once it is complete.
fn materialize(productions: &[Production], nodes: Vec<Node>) -> ProductionGroup {
    let build = |node: &Node| {
        let production = &productions[node.production];
        ProductionGroup {
            production: if node.scale == Rational::one() {
                production.clone()
            } else {
                production.scaled(&node.scale)
            },
            children: Vec::new(),
        }
    };
    let mut root = build(&nodes[0]);
    let mut slots: Vec<Option<ProductionGroup>> = nodes.iter().map(|n| Some(build(n))).collect();

    for n in (1..nodes.len()).rev() {
        let Some(mut group) = slots[n].take() else {
            continue;
        };
        group.children.reverse();
        match nodes[n].parent {
            Some(0) | None => root.children.push(group),
            Some(parent) => {
                if let Some(parent_group) = slots[parent].as_mut() {
                    parent_group.children.push(group);
                }
            }
        }
    }
    root.children.reverse();
    root
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Objective, TimeUnit};
    use crate::plan::plan;
    use crate::test_utils::*;

    fn recipe_name<'a>(data: &'a GameData, group: &ProductionGroup) -> &'a str {
        &data.recipe(group.production.recipe).unwrap().name
    }

    fn circuit_plan(inline: &[&str]) -> (GameData, crate::config::PlanConfigBuilder) {
        let data = sample_data();
        let mut b = crate::config::PlanConfig::builder();
        b.demand(data.item_id("electronic-circuit").unwrap(), 1, TimeUnit::Second)
            .given_resources(&data)
            .minimize(Objective::ResourceUsage);
        for name in inline {
            b.inline(data.item_id(name).unwrap());
        }
        (data, b)
    }

    #[test]
    fn without_directives_every_production_is_a_root() {
        let (data, b) = circuit_plan(&[]);
        let plan = plan(&data, &b.build()).unwrap();
        assert_eq!(plan.groups.len(), plan.productions.len());
        assert!(plan.groups.iter().all(|g| g.children.is_empty()));
    }

    #[test]
    fn chain_nests_completely() {
        let (data, b) = circuit_plan(&["copper-cable", "copper-plate"]);
        let plan = plan(&data, &b.build()).unwrap();
        assert_eq!(plan.groups.len(), 2);

        let circuit = &plan.groups[0];
        assert_eq!(recipe_name(&data, circuit), "electronic-circuit");
        assert_eq!(circuit.children.len(), 1);
        let cable = &circuit.children[0];
        assert_eq!(recipe_name(&data, cable), "copper-cable");
        assert_eq!(cable.production.count, Rational::new(3, 2).unwrap());
        assert_eq!(recipe_name(&data, &cable.children[0]), "copper-plate");

        assert_eq!(recipe_name(&data, &plan.groups[1]), "iron-plate");
    }

    #[test]
    fn surplus_demand_stays_a_root() {
        let (data, mut b) = circuit_plan(&["copper-cable"]);
        // Three extra cables on top of the three the circuit eats.
        b.demand(data.item_id("copper-cable").unwrap(), 3, TimeUnit::Second);
        let plan = plan(&data, &b.build()).unwrap();

        let cable = data.recipe_id("copper-cable").unwrap();
        let mut scales: Vec<Rational> = plan
            .groups
            .iter()
            .flat_map(|g| g.walk())
            .filter(|(_, g)| g.production.recipe == cable)
            .map(|(_, g)| g.production.count.clone())
            .collect();
        scales.sort();
        assert_eq!(scales, vec![Rational::new(3, 2).unwrap(), Rational::new(3, 2).unwrap()]);
    }

    #[test]
    fn ambiguous_consumer_rejected() {
        let data = sample_data();
        let mut b = crate::config::PlanConfig::builder();
        b.demand(data.item_id("electronic-circuit").unwrap(), 1, TimeUnit::Second)
            .demand(data.item_id("iron-gear-wheel").unwrap(), 1, TimeUnit::Second)
            .given_resources(&data)
            .minimize(Objective::ResourceUsage)
            .inline(data.item_id("iron-plate").unwrap());
        match plan(&data, &b.build()) {
            Err(PlanError::InlineAmbiguousConsumer { item, consumers }) => {
                assert_eq!(item, "iron-plate");
                assert_eq!(consumers.len(), 2);
            }
            other => panic!("expected InlineAmbiguousConsumer, got: {other:?}"),
        }
    }

    #[test]
    fn inline_into_picks_among_consumers() {
        let data = sample_data();
        let gear = data.recipe_id("iron-gear-wheel").unwrap();
        let mut b = crate::config::PlanConfig::builder();
        b.demand(data.item_id("electronic-circuit").unwrap(), 1, TimeUnit::Second)
            .demand(data.item_id("iron-gear-wheel").unwrap(), 1, TimeUnit::Second)
            .given_resources(&data)
            .minimize(Objective::ResourceUsage)
            .inline_into(data.item_id("iron-plate").unwrap(), gear);
        let plan = plan(&data, &b.build()).unwrap();

        let gear_group = plan
            .groups
            .iter()
            .find(|g| g.production.recipe == gear)
            .unwrap();
        assert_eq!(gear_group.children.len(), 1);
        // Two of the three plates per second go into gears.
        assert_eq!(gear_group.children[0].production.count, Rational::from(2));
        let smelt = data.recipe_id("iron-plate").unwrap();
        assert!(plan
            .groups
            .iter()
            .any(|g| g.production.recipe == smelt && g.production.count == Rational::one()));
    }

    #[test]
    fn multiple_products_rejected() {
        let data = sample_data();
        let mut b = crate::config::PlanConfig::builder();
        b.demand(data.item_id("petroleum-gas").unwrap(), 1, TimeUnit::Second)
            .demand(data.item_id("solid-fuel").unwrap(), 1, TimeUnit::Second)
            .given(data.item_id("crude-oil").unwrap())
            .minimize(Objective::RecipeCount)
            .inline(data.item_id("light-oil").unwrap());
        match plan(&data, &b.build()) {
            Err(PlanError::InlineMultipleProducts { item, recipe, products }) => {
                assert_eq!(item, "light-oil");
                assert_eq!(recipe, "oil-refining");
                assert_eq!(products, 2);
            }
            other => panic!("expected InlineMultipleProducts, got: {other:?}"),
        }
    }

    fn gear_plan(data: &GameData) -> crate::config::PlanConfigBuilder {
        let mut b = crate::config::PlanConfig::builder();
        b.demand(data.item_id("iron-gear-wheel").unwrap(), 1, TimeUnit::Second)
            .given_resources(data)
            .minimize(Objective::ResourceUsage)
            .inline(data.item_id("iron-plate").unwrap());
        b
    }

    #[test]
    fn idle_second_producer_blocks_inlining() {
        let data = sample_data_with_slow_iron();
        let plan = plan(&data, &gear_plan(&data).build()).unwrap();

        let slow = data.recipe_id("iron-plate-slow").unwrap();
        assert!(plan.production(slow).is_none());
        assert_eq!(plan.productions.len(), 2);
        assert_eq!(plan.groups.len(), 2);
        assert!(plan.groups.iter().all(|g| g.children.is_empty()));
    }

    #[test]
    fn single_producer_still_inlines() {
        let data = sample_data();
        let plan = plan(&data, &gear_plan(&data).build()).unwrap();
        assert_eq!(plan.groups.len(), 1);
        assert_eq!(recipe_name(&data, &plan.groups[0].children[0]), "iron-plate");
    }

    #[test]
    fn two_active_producers_block_inlining() {
        let mut builder = sample_builder();
        let ore = builder.item_id("iron-ore").unwrap();
        let plate = builder.item_id("iron-plate").unwrap();
        let slag = builder.register_item("slag", "item");
        builder.register_recipe(
            "iron-plate-with-slag",
            "smelting",
            vec![stack(ore, 2)],
            vec![stack(plate, 1), stack(slag, 1)],
            frac(16, 5),
        );
        let data = builder.build().unwrap();

        let mut b = gear_plan(&data);
        b.demand(slag, 1, TimeUnit::Second);
        // Two-product producer is not an error: the item never qualifies.
        let plan = plan(&data, &b.build()).unwrap();

        let count = |name: &str| plan.count(data.recipe_id(name).unwrap());
        assert_eq!(count("iron-plate"), Rational::one());
        assert_eq!(count("iron-plate-with-slag"), Rational::one());
        assert_eq!(plan.groups.len(), 3);
        assert!(plan.groups.iter().all(|g| g.children.is_empty()));
    }

    #[test]
    fn walk_is_pre_order() {
        let (data, b) = circuit_plan(&["copper-cable", "copper-plate"]);
        let plan = plan(&data, &b.build()).unwrap();
        let order: Vec<(usize, &str)> = plan.groups[0]
            .walk()
            .into_iter()
            .map(|(depth, g)| (depth, recipe_name(&data, g)))
            .collect();
        assert_eq!(
            order,
            vec![(0, "electronic-circuit"), (1, "copper-cable"), (2, "copper-plate")]
        );
    }
}
