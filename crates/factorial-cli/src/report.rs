//! Text rendering of a solved plan.

use factorial_planner::catalog::{CatalogError, GameData};
use factorial_planner::effect::ModuleCounts;
use factorial_planner::production::Production;
use factorial_planner::Plan;
use factorial_rational::Rational;
use std::fmt::Write;

#[derive(Debug, Clone, Copy, Default)]
pub struct Style {
    /// Three decimal places instead of exact fractions.
    pub decimals: bool,
}

impl Style {
    fn amount(self, value: &Rational) -> String {
        if self.decimals {
            format!("{:.3}", value.to_f64())
        } else {
            value.to_string()
        }
    }
}

/// One row per production: recipe, assembler, executions per second,
/// machine count and modules.
pub fn table(data: &GameData, plan: &Plan, style: Style) -> Result<String, CatalogError> {
    let mut rows = vec![[
        "recipe".to_string(),
        "assembler".to_string(),
        "count".to_string(),
        "machines".to_string(),
        "modules".to_string(),
    ]];
    for p in &plan.productions {
        rows.push([
            data.recipe(p.recipe)?.name.clone(),
            data.assembler(p.assembler)?.name.clone(),
            style.amount(&p.count),
            style.amount(&p.assembler_count),
            layout(data, p)?,
        ]);
    }

    let mut widths = [0usize; 5];
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.len());
        }
    }

    let mut out = String::new();
    let _ = writeln!(out, "score: {}", style.amount(&plan.score));
    for row in &rows {
        let line: Vec<String> = row
            .iter()
            .zip(widths)
            .map(|(cell, w)| format!("{cell:<w$}"))
            .collect();
        let _ = writeln!(out, "{}", line.join("  ").trim_end());
    }
    Ok(out)
}

/// The grouped forest, children indented under the production they feed.
pub fn tree(data: &GameData, plan: &Plan, style: Style) -> Result<String, CatalogError> {
    let mut out = String::new();
    for root in &plan.groups {
        for (depth, group) in root.walk() {
            let p = &group.production;
            let _ = writeln!(
                out,
                "{:indent$}{} x{} ({} {}){}",
                "",
                data.recipe(p.recipe)?.name,
                style.amount(&p.count),
                style.amount(&p.assembler_count),
                data.assembler(p.assembler)?.name,
                match layout(data, p)? {
                    l if l.is_empty() => String::new(),
                    l => format!(" [{l}]"),
                },
                indent = depth * 2,
            );
        }
    }
    Ok(out)
}

fn layout(data: &GameData, p: &Production) -> Result<String, CatalogError> {
    let mut parts = counts(data, &p.layout.modules)?;
    parts.extend(
        counts(data, &p.layout.beacons)?
            .into_iter()
            .map(|c| format!("beacon {c}")),
    );
    Ok(parts.join(", "))
}

fn counts(data: &GameData, modules: &ModuleCounts) -> Result<Vec<String>, CatalogError> {
    modules
        .iter()
        .filter(|&(_, &n)| n > 0)
        .map(|(&id, &n)| data.module(id).map(|m| format!("{n}x {}", m.name)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use factorial_planner::config::{ModulePicker, Objective, PlanConfig, TimeUnit};
    use factorial_planner::plan;
    use factorial_planner::test_utils::sample_data;

    fn circuits(data: &GameData, inline: bool) -> Plan {
        let item = |name: &str| data.item_id(name).unwrap();
        let mut b = PlanConfig::builder();
        b.demand(item("electronic-circuit"), 1, TimeUnit::Second)
            .given_resources(data)
            .minimize(Objective::ResourceUsage);
        if inline {
            b.inline(item("copper-cable")).inline(item("copper-plate"));
        }
        plan(data, &b.build()).unwrap()
    }

    #[test]
    fn table_lists_every_production() {
        let data = sample_data();
        let plan = circuits(&data, false);
        let text = table(&data, &plan, Style::default()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "score: -5/2");
        assert!(lines[1].starts_with("recipe"));
        assert_eq!(lines.len(), 2 + plan.productions.len());
        let circuit = lines.iter().find(|l| l.starts_with("electronic-circuit")).unwrap();
        assert!(circuit.contains("assembling-machine-2"), "got: {circuit}");
        assert!(circuit.contains("2/3"), "got: {circuit}");
    }

    #[test]
    fn decimals_style() {
        let data = sample_data();
        let plan = circuits(&data, false);
        let text = table(&data, &plan, Style { decimals: true }).unwrap();
        assert!(text.contains("score: -2.500"), "got: {text}");
        assert!(text.contains("0.667"), "got: {text}");
    }

    #[test]
    fn tree_indents_inlined_productions() {
        let data = sample_data();
        let plan = circuits(&data, true);
        let text = tree(&data, &plan, Style::default()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("electronic-circuit x1 "), "got: {text}");
        assert!(lines[1].starts_with("  copper-cable x3/2 "), "got: {text}");
        assert!(lines[2].starts_with("    copper-plate x3/2 "), "got: {text}");
        assert!(lines[3].starts_with("iron-plate x1 "), "got: {text}");
    }

    #[test]
    fn modules_are_named() {
        let data = sample_data();
        let speed = data.module_id("speed-module").unwrap();
        let mut b = PlanConfig::builder();
        b.demand(data.item_id("iron-plate").unwrap(), 2, TimeUnit::Second)
            .given_resources(&data)
            .module_picker(ModulePicker::FillWith(speed));
        let plan = plan(&data, &b.build()).unwrap();
        let text = tree(&data, &plan, Style::default()).unwrap();
        assert!(text.contains("[2x speed-module]"), "got: {text}");
    }
}
