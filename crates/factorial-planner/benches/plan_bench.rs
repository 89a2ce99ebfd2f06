//! Criterion benchmarks for end-to-end planning over the sample catalog.
//!
//! - `resolve_circuits`: graph walk and program compilation only.
//! - `plan_circuits`: the full pipeline with two inline directives.
//! - `plan_engines`: a deeper tree mixing smelting and crafting.

use criterion::{criterion_group, criterion_main, Criterion};
use factorial_planner::catalog::GameData;
use factorial_planner::config::{Objective, PlanConfig, TimeUnit};
use factorial_planner::plan;
use factorial_planner::resolver::Resolver;
use factorial_planner::test_utils::sample_data;

fn circuit_config(data: &GameData) -> PlanConfig {
    let item = |name: &str| data.item_id(name).expect("sample item");
    let mut b = PlanConfig::builder();
    b.demand(item("electronic-circuit"), 10, TimeUnit::Second)
        .given_resources(data)
        .minimize(Objective::ResourceUsage)
        .inline(item("copper-cable"))
        .inline(item("copper-plate"));
    b.build()
}

fn engine_config(data: &GameData) -> PlanConfig {
    let item = |name: &str| data.item_id(name).expect("sample item");
    let mut b = PlanConfig::builder();
    b.demand(item("engine-unit"), 3, TimeUnit::Minute)
        .demand(item("electronic-circuit"), 5, TimeUnit::Second)
        .given_resources(data)
        .minimize(Objective::ResourceUsage)
        .inline(item("steel-plate"))
        .inline(item("iron-gear-wheel"))
        .inline(item("pipe"));
    b.build()
}

fn bench_resolve(c: &mut Criterion) {
    let data = sample_data();
    let config = circuit_config(&data);
    c.bench_function("resolve_circuits", |b| {
        b.iter(|| Resolver::new(&data, &config).resolve().expect("resolvable"))
    });
}

fn bench_plan_circuits(c: &mut Criterion) {
    let data = sample_data();
    let config = circuit_config(&data);
    c.bench_function("plan_circuits", |b| {
        b.iter(|| plan(&data, &config).expect("circuits are plannable"))
    });
}

fn bench_plan_engines(c: &mut Criterion) {
    let data = sample_data();
    let config = engine_config(&data);
    c.bench_function("plan_engines", |b| {
        b.iter(|| plan(&data, &config).expect("engines are plannable"))
    });
}

criterion_group!(benches, bench_resolve, bench_plan_circuits, bench_plan_engines);
criterion_main!(benches);
