//! 过滤引擎性能基准测试
//!
//! 覆盖单条规则评估、规则编译收益以及集合级过滤的规模扩展。

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use product_filter::{FilterEngine, GroupFilterEngine, Rule, RuleCompiler, RuleEvaluator, State};
use serde_json::{Value, json};
use std::hint::black_box;

/// 创建测试商品
fn create_product(i: usize) -> Value {
    let brand = if i % 3 == 0 { "Acme" } else { "Globex" };
    let active = if i % 2 == 0 { "Yes" } else { "No" };
    let price = (i % 500) as f64 + 0.99;

    json!({
        "sku": format!("SKU-{}", i),
        "name": format!("Product {}", i),
        "brand": brand,
        "price": price,
        "weight": format!("{} kg", i % 40),
        "isActive": active,
        "dimensions": {"width": i % 120, "depth": i % 60}
    })
}

fn create_catalogue(size: usize) -> Vec<Value> {
    (0..size).map(create_product).collect()
}

fn sample_filters() -> Vec<Rule> {
    vec![
        Rule::new("brand", "=", "Acme, Initech"),
        Rule::new("name", "%", "product"),
        Rule::new("weight", "><", "5,35"),
        Rule::new("dimensions.width,dimensions.depth", "*>", "100"),
    ]
}

/// 单条规则评估基准
fn bench_single_rule(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_rule");
    let product = create_product(42);

    let rules = [
        ("eq", Rule::new("brand", "=", "Acme")),
        ("like", Rule::new("name", "%", "product")),
        ("gt_extracted", Rule::new("weight", ">", "10")),
        ("bool_eq", Rule::new("isActive", "===", "true")),
        ("between", Rule::new("price", "><", "10,100")),
        ("multiply", Rule::new("dimensions.width,dimensions.depth", "*=", "100")),
        ("field_or_group", Rule::new("sku, name, brand", "=", "x, y, Acme")),
        ("missing_field", Rule::new("colour", "=", "red")),
    ];

    for (name, rule) in &rules {
        group.bench_function(*name, |b| {
            b.iter(|| RuleEvaluator::matches_rule(black_box(&product), black_box(rule)))
        });
    }

    group.finish();
}

/// 预编译与逐次编译对比
fn bench_compiled_vs_uncompiled(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile");
    let product = create_product(42);
    let filters = sample_filters();
    let compiled = RuleCompiler::new().with_warnings(false).compile(&filters);

    group.bench_function("matches_all_rules", |b| {
        b.iter(|| RuleEvaluator::matches_all_rules(black_box(&product), black_box(&filters)))
    });

    group.bench_function("matches_compiled", |b| {
        b.iter(|| RuleEvaluator::matches_compiled(black_box(&product), black_box(&compiled)))
    });

    group.finish();
}

/// 集合过滤规模扩展
fn bench_collection_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("collection_scaling");
    let engine = FilterEngine::default();
    let groups = GroupFilterEngine::default();
    let filters = sample_filters();
    let states = vec![
        State::new("Yes", "criteria", vec![]),
        State::new("acme", "master", vec![Rule::new("brand", "=", "Acme")]),
    ];

    for size in [100usize, 1_000, 10_000] {
        let records = create_catalogue(size);

        group.bench_with_input(BenchmarkId::new("include", size), &records, |b, records| {
            b.iter(|| engine.include(black_box(records), black_box(&filters)))
        });

        group.bench_with_input(BenchmarkId::new("match_ratio", size), &records, |b, records| {
            b.iter(|| engine.match_ratio(black_box(records), black_box(&filters)))
        });

        group.bench_with_input(
            BenchmarkId::new("include_by_criteria", size),
            &records,
            |b, records| {
                b.iter(|| groups.include_by_criteria(black_box(records), "Is Active", &states))
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_single_rule,
    bench_compiled_vs_uncompiled,
    bench_collection_scaling,
);

criterion_main!(benches);
