use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use chrono::{DateTime, Utc};
use pgrepo::{
    Create, Database, Executor, OrderBy, OrmResult, Pagination, Predicate, Record, Row, Statement,
    Update, set_clause, values_clause, where_clause,
};

#[derive(Record)]
#[orm(table = "examples")]
#[allow(dead_code)]
struct Example {
    id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    flag: bool,
    metadata: pgrepo::Json<serde_json::Value>,
}

/// Never reached: the benches only build statements.
struct Offline;

impl Executor for Offline {
    async fn query(&self, _statement: &Statement) -> OrmResult<Vec<Row>> {
        Ok(Vec::new())
    }
}

fn wide_predicate(n: usize) -> Predicate<Example> {
    (0..n).fold(Predicate::new(), |p, i| p.eq(&format!("col{i}"), i as i64))
}

fn bench_where(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter_compiler/where_render");

    for n in [1, 5, 10, 50, 100] {
        let predicate = wide_predicate(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &predicate, |b, p| {
            b.iter(|| black_box(where_clause(p).to_sql()));
        });
    }

    group.finish();
}

fn bench_list_statement(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter_compiler/list_statement");
    let repo = Database::new(Offline).repository::<Example>();
    let order = OrderBy::<Example>::new().desc("created_at").asc("id");
    let page = Pagination::new().limit(50).offset(100);

    let predicates = [
        ("empty", Predicate::<Example>::new()),
        ("flag", Predicate::new().eq("flag", true)),
        (
            "flag_id_created",
            Predicate::new()
                .eq("flag", true)
                .eq("id", "a")
                .eq("created_at", Utc::now()),
        ),
    ];

    for (name, predicate) in &predicates {
        group.bench_with_input(BenchmarkId::from_parameter(name), predicate, |b, p| {
            b.iter(|| {
                let statement = repo
                    .list_statement(p, Some(&page), Some(&order))
                    .expect("declared fields");
                black_box(statement)
            });
        });
    }

    group.finish();
}

fn bench_writes(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter_compiler/writes");

    for n in [5, 20, 100] {
        let update = (0..n).fold(Update::<Example>::new(), |u, i| {
            u.set(&format!("col{i}"), i as i64)
        });
        let create = (0..n).fold(Create::<Example>::new(), |c, i| {
            c.set(&format!("col{i}"), i as i64)
        });

        group.bench_with_input(BenchmarkId::new("set", n), &update, |b, u| {
            b.iter(|| black_box(set_clause(u).to_sql()));
        });
        group.bench_with_input(BenchmarkId::new("values", n), &create, |b, c| {
            b.iter(|| black_box(values_clause(c).to_sql()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_where, bench_list_statement, bench_writes);
criterion_main!(benches);
