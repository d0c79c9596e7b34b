use couchdb_query_builder::parser::parse_line;
use couchdb_query_builder::{CombinationOperator, Condition, Filter, QueryBuilder};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;

// 构建一个与测试用例相同规模的查询
fn create_flat_builder() -> QueryBuilder {
    let mut builder = QueryBuilder::new();
    builder
        .set_doc_type("items")
        .set_limit(10)
        .set_skip(20)
        .add_fields(["fieldOne", "fieldTwo", "fieldThree", "fieldFour", "fieldFive"])
        .add_filter("id", vec![1, 2, 3])
        .add_filter("name", "peckstadt")
        .add_filter("categories", vec!["a", "b"])
        .add_condition("testFieldForCondition", Condition::not_equal(1))
        .add_sort("docType", "desc")
        .add_sort("createdAt", "desc");
    builder
}

// 构建指定深度的嵌套组合
fn create_nested_builder(depth: usize) -> QueryBuilder {
    let mut builder = QueryBuilder::new();
    builder.set_doc_type("items");
    let mut node = builder.add_combination(
        CombinationOperator::Or,
        [Filter::new("id", 5), Filter::new("ids", 10)],
    );
    for level in 0..depth {
        let operator = if level % 2 == 0 {
            CombinationOperator::And
        } else {
            CombinationOperator::Or
        };
        node = node.add_combination(
            operator,
            [Filter::new("a", level as i64), Filter::new("b", "value")],
        );
    }
    builder
}

// 基准测试：扁平查询构建
fn benchmark_flat_build(c: &mut Criterion) {
    let builder = create_flat_builder();
    c.bench_function("build_flat_query", |b| {
        b.iter(|| black_box(builder.build_json().expect("构建应该成功")))
    });
}

// 基准测试：嵌套组合展开
fn benchmark_nested_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("nested_combinations");

    for depth in [3usize, 16, 64] {
        let builder = create_nested_builder(depth);
        group.bench_with_input(BenchmarkId::new("build", depth), &builder, |b, builder| {
            b.iter(|| black_box(builder.build().expect("构建应该成功")))
        });
    }

    group.finish();
}

// 基准测试：从命令行到JSON的完整流程
fn benchmark_shell_pipeline(c: &mut Criterion) {
    let lines = [
        "doctype items",
        "field fieldOne fieldTwo",
        "filter id [1, 2, 3]",
        "cond testFieldForCondition neq 1",
        "sort createdAt desc",
        "group or id=5 ids=10",
        "group and @0 a=1 b=2",
        "group or @0.0 x=0 x=100",
    ];

    c.bench_function("shell_pipeline", |b| {
        b.iter(|| {
            let mut builder = QueryBuilder::new();
            for line in lines {
                let command = parse_line(black_box(line)).expect("解析应该成功");
                command.apply(&mut builder).expect("执行应该成功");
            }
            black_box(builder.build_json().expect("构建应该成功"))
        })
    });
}

criterion_group!(
    benches,
    benchmark_flat_build,
    benchmark_nested_build,
    benchmark_shell_pipeline
);
criterion_main!(benches);
