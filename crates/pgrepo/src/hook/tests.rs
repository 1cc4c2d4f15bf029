use super::*;
use crate::sql::Sql;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

fn statement() -> Statement {
    Sql::new("SELECT * FROM \"examples\" WHERE \"flag\" = ")
        .append(Sql::bind(true))
        .into_statement()
}

#[test]
fn closures_are_hooks() {
    let seen = Mutex::new(Vec::new());
    let hook = |ctx: &QueryContext<'_>| {
        seen.lock().unwrap().push(ctx.statement.text.clone());
    };
    let stmt = statement();
    hook.before_query(&QueryContext {
        operation: Operation::List,
        table: "examples",
        statement: &stmt,
    });
    assert_eq!(
        seen.into_inner().unwrap(),
        vec![r#"SELECT * FROM "examples" WHERE "flag" = $1"#.to_string()]
    );
}

#[test]
fn composite_runs_every_hook_in_order() {
    let order = Arc::new(Mutex::new(Vec::new()));
    let first = {
        let order = order.clone();
        move |_: &QueryContext<'_>| order.lock().unwrap().push("first")
    };
    let second = {
        let order = order.clone();
        move |_: &QueryContext<'_>| order.lock().unwrap().push("second")
    };
    let hook = CompositeHook::new().add(first).add(second).add(NoopHook);
    assert_eq!(hook.len(), 3);

    let stmt = statement();
    hook.before_query(&QueryContext {
        operation: Operation::Count,
        table: "examples",
        statement: &stmt,
    });
    assert_eq!(*order.lock().unwrap(), vec!["first", "second"]);
}

#[test]
fn composite_accepts_shared_hooks() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter: Arc<dyn QueryHook> = {
        let calls = calls.clone();
        Arc::new(move |_: &QueryContext<'_>| {
            calls.fetch_add(1, Ordering::SeqCst);
        })
    };
    let hook = CompositeHook::new()
        .add_arc(counter.clone())
        .add_arc(counter);

    let stmt = statement();
    hook.before_query(&QueryContext {
        operation: Operation::Remove,
        table: "examples",
        statement: &stmt,
    });
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn tracing_hook_truncation() {
    let hook = TracingSqlHook::new().max_sql_length(10);
    assert_eq!(hook.truncate_sql("SELECT * FROM users"), "SELECT * F...");
    assert_eq!(hook.truncate_sql("SELECT 1"), "SELECT 1");
    assert_eq!(
        TracingSqlHook::new().no_truncate().truncate_sql("SELECT * FROM users"),
        "SELECT * FROM users"
    );
}

#[test]
fn truncate_respects_char_boundaries() {
    assert_eq!(truncate_sql_bytes("héllo", 2), "h");
    assert_eq!(truncate_sql_bytes("abc", 10), "abc");
}

#[test]
fn operation_names() {
    assert_eq!(Operation::GetById.to_string(), "get_by_id");
    assert_eq!(Operation::Remove.as_str(), "remove");
}
