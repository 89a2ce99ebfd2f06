//! Checks that span the loader, the planner and the solver.

use factorial_data::{load_catalog, load_plan, DataLoadError, GameData};
use factorial_planner::catalog::CatalogError;
use factorial_planner::resolver::Resolver;
use factorial_planner::test_utils::sample_data;
use factorial_planner::{plan, PlanError};
use factorial_rational::{Rational, SimplexError};
use std::fs;
use std::path::{Path, PathBuf};

fn data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data")
}

fn catalog() -> GameData {
    load_catalog(&data_dir().join("catalog.json")).unwrap()
}

/// Create a temporary directory with a unique name for test isolation.
fn make_test_dir(suffix: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "factorial_integration_{suffix}_{}",
        std::process::id()
    ));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn cleanup(dir: &Path) {
    let _ = fs::remove_dir_all(dir);
}

#[test]
fn solution_passes_program_check() {
    let data = catalog();
    for file in ["circuits.ron", "engines.toml", "solid-fuel.json"] {
        let config = load_plan(&data_dir().join(file), &data).unwrap();
        let resolution = Resolver::new(&data, &config).resolve().unwrap();
        let solution = resolution.solve().unwrap();
        resolution.program.check_solution(&solution).unwrap();
        assert_eq!(solution.values.len(), resolution.recipes.len(), "{file}");
        assert!(solution.values.iter().all(|v| !v.is_negative()), "{file}");
    }
}

#[test]
fn same_plan_in_every_format() {
    let dir = make_test_dir("formats");
    fs::write(
        dir.join("p.ron"),
        r#"(demands: [(item: "iron-gear-wheel", amount: 2)], given: ["iron-ore"], minimize: recipe_count)"#,
    )
    .unwrap();
    fs::write(
        dir.join("p.json"),
        r#"{"demands": [{"item": "iron-gear-wheel", "amount": 2}], "given": ["iron-ore"], "minimize": "recipe_count"}"#,
    )
    .unwrap();
    fs::write(
        dir.join("p.toml"),
        "given = [\"iron-ore\"]\nminimize = \"recipe_count\"\n\n[[demands]]\nitem = \"iron-gear-wheel\"\namount = 2\n",
    )
    .unwrap();

    let data = catalog();
    let plans: Vec<_> = ["ron", "json", "toml"]
        .iter()
        .map(|ext| {
            let config = load_plan(&dir.join(format!("p.{ext}")), &data).unwrap();
            plan(&data, &config).unwrap()
        })
        .collect();
    assert_eq!(plans[0], plans[1]);
    assert_eq!(plans[1], plans[2]);
    // 2 gears + 4 plates.
    assert_eq!(plans[0].score, Rational::from(-6));

    cleanup(&dir);
}

#[test]
fn plan_typo_names_similar_items() {
    let dir = make_test_dir("typo");
    let path = dir.join("typo.json");
    fs::write(&path, r#"{"demands": [{"item": "iron-gear", "amount": 1}]}"#).unwrap();

    let data = catalog();
    match load_plan(&path, &data) {
        Err(DataLoadError::Catalog {
            source: CatalogError::NotFound { suggestions, .. },
            ..
        }) => {
            assert!(suggestions.contains(&"iron-gear-wheel".to_string()));
            assert!(suggestions.contains(&"iron-plate".to_string()));
        }
        other => panic!("expected NotFound, got: {other:?}"),
    }

    cleanup(&dir);
}

#[test]
fn missing_inputs_conflict() {
    let dir = make_test_dir("conflict");
    let path = dir.join("nothing-given.ron");
    fs::write(&path, r#"(demands: [(item: "electronic-circuit", amount: 1)])"#).unwrap();

    let data = catalog();
    let config = load_plan(&path, &data).unwrap();
    assert!(matches!(
        plan(&data, &config),
        Err(PlanError::Simplex(SimplexError::ConflictingConstraints { .. }))
    ));

    cleanup(&dir);
}

#[test]
fn pivot_cap_from_plan_file() {
    let dir = make_test_dir("pivots");
    let path = dir.join("capped.toml");
    fs::write(
        &path,
        "given_resources = true\nmax_pivots = 0\n\n[[demands]]\nitem = \"pipe\"\namount = 1\n",
    )
    .unwrap();

    let data = catalog();
    let config = load_plan(&path, &data).unwrap();
    assert!(matches!(
        plan(&data, &config),
        Err(PlanError::Simplex(SimplexError::PivotLimit { pivots: 0 }))
    ));

    cleanup(&dir);
}

#[test]
fn inline_into_non_consumer_rejected() {
    let dir = make_test_dir("inline");
    let path = dir.join("bad-inline.ron");
    fs::write(
        &path,
        r#"(
            demands: [(item: "pipe", amount: 1)],
            given_resources: true,
            inline: [(item: "copper-cable", into: ["pipe"])],
        )"#,
    )
    .unwrap();

    let data = catalog();
    let config = load_plan(&path, &data).unwrap();
    assert!(matches!(
        plan(&data, &config),
        Err(PlanError::InvalidInlineTarget { .. })
    ));

    cleanup(&dir);
}

#[test]
fn plan_serializes_with_exact_numbers() {
    let data = sample_data();
    let mut b = factorial_planner::config::PlanConfig::builder();
    b.demand(data.item_id("copper-cable").unwrap(), 3, factorial_planner::config::TimeUnit::Second)
        .given_resources(&data);
    let plan = plan(&data, &b.build()).unwrap();

    let json = serde_json::to_value(&plan).unwrap();
    let cable = &json["productions"][0];
    assert_eq!(cable["count"], "3/2");
    assert_eq!(cable["assembler_count"], "1");
    assert_eq!(json["score"], "0");
}
