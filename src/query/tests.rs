//! Tests for query module

use super::*;
use crate::args::PaginationArgs;
use crate::config::PaginationConfig;
use crate::cursor::{Cursor, CursorFields};
use crate::error::Error;
use crate::types::{Comparison, NullsOrder, PagingDirection, QueryOrder, Record};
use crate::value::{Node, Value};
use pretty_assertions::assert_eq;
use test_case::test_case;

fn task(id: &str, name: &str, rank: Option<i64>) -> Record {
    let mut row = Record::new();
    row.insert("id".to_string(), Value::from(id));
    row.insert("name".to_string(), Value::from(name));
    row.insert("rank".to_string(), Value::from(rank));
    row
}

fn tasks_table() -> TableMetadata {
    TableMetadata::new("tasks")
        .with_columns(["id", "name", "rank"])
        .with_primary_key("id")
        .with_index(["rank", "id"])
}

fn engine() -> MemoryEngine<Record> {
    MemoryEngine::new().with_table(
        tasks_table(),
        vec![
            task("a", "Task A", Some(3)),
            task("b", "Task B", Some(1)),
            task("c", "Task C", Some(2)),
            task("d", "Task D", Some(2)),
            task("e", "Task E", None),
        ],
    )
}

fn ids<N: Node>(rows: &[N]) -> Vec<String> {
    rows.iter()
        .map(|r| r.field("id").map(|v| v.to_string()).unwrap_or_default())
        .collect()
}

// ============================================================================
// Operator Algebra Tests
// ============================================================================

#[test_case(QueryOrder::Asc, PagingDirection::Forward, Comparison::Gt ; "asc forward")]
#[test_case(QueryOrder::Asc, PagingDirection::Backward, Comparison::Lt ; "asc backward")]
#[test_case(QueryOrder::Desc, PagingDirection::Forward, Comparison::Lt ; "desc forward")]
#[test_case(QueryOrder::Desc, PagingDirection::Backward, Comparison::Gt ; "desc backward")]
fn test_comparison_operator(order: QueryOrder, direction: PagingDirection, expected: Comparison) {
    assert_eq!(comparison_operator(order, direction), expected);
}

#[test]
fn test_paging_direction() {
    let cases = [
        (PaginationArgs::new().first(2), PagingDirection::Forward),
        (PaginationArgs::new().first(2).after("x"), PagingDirection::Forward),
        (PaginationArgs::new().last(2).before("x"), PagingDirection::Backward),
        (PaginationArgs::new().first(2).before("x"), PagingDirection::Backward),
        (PaginationArgs::new().last(2), PagingDirection::Backward),
        (
            PaginationArgs::new().first(2).after("x").before("y"),
            PagingDirection::Backward,
        ),
    ];

    for (args, expected) in cases {
        assert_eq!(paging_direction(&args), expected, "{args:?}");
    }
}

#[test]
fn test_effective_order_flips_for_last() {
    let last = PaginationArgs::new().last(2).before("x");
    assert_eq!(effective_order(QueryOrder::Asc, &last), QueryOrder::Desc);
    assert_eq!(effective_order(QueryOrder::Desc, &last), QueryOrder::Asc);

    let first = PaginationArgs::new().first(2);
    assert_eq!(effective_order(QueryOrder::Desc, &first), QueryOrder::Desc);
}

#[test]
fn test_cursor_predicate_single_field() {
    let fields = CursorFields::id_only("id").unwrap();
    let cursor = Cursor::from_after("c", Some(Value::from(2)));

    assert_eq!(
        cursor_predicate(&fields, &cursor, QueryOrder::Asc, PagingDirection::Forward, NullsOrder::Last),
        Predicate::compare("id", Comparison::Gt, "c")
    );
}

#[test]
fn test_cursor_predicate_composite() {
    let fields = CursorFields::new("id", "rank").unwrap();
    let cursor = Cursor::from_after("c", Some(Value::from(2)));

    let expected = Predicate::or(vec![
        Predicate::compare("rank", Comparison::Lt, 2),
        Predicate::and(vec![
            Predicate::eq("rank", 2),
            Predicate::compare("id", Comparison::Lt, "c"),
        ]),
    ]);
    assert_eq!(
        cursor_predicate(&fields, &cursor, QueryOrder::Asc, PagingDirection::Backward, NullsOrder::Last),
        expected
    );

    // Without a sort value only the id is compared
    let id_only = Cursor::from_after("c", None);
    assert_eq!(
        cursor_predicate(&fields, &id_only, QueryOrder::Asc, PagingDirection::Forward, NullsOrder::Last),
        Predicate::compare("id", Comparison::Gt, "c")
    );
}

#[test]
fn test_cursor_predicate_adds_null_block_on_its_side() {
    let fields = CursorFields::new("id", "rank").unwrap();
    let cursor = Cursor::from_after("c", Some(Value::from(2)));

    let forward = cursor_predicate(&fields, &cursor, QueryOrder::Asc, PagingDirection::Forward, NullsOrder::Last);
    assert_eq!(
        forward,
        Predicate::or(vec![
            Predicate::compare("rank", Comparison::Gt, 2),
            Predicate::and(vec![
                Predicate::eq("rank", 2),
                Predicate::compare("id", Comparison::Gt, "c"),
            ]),
            Predicate::is_null("rank"),
        ])
    );

    // NULLs first sit behind a forward cursor
    let nulls_first = cursor_predicate(&fields, &cursor, QueryOrder::Asc, PagingDirection::Forward, NullsOrder::First);
    assert!(!nulls_first.matches(&task("e", "Task E", None)));
    let backward = cursor_predicate(&fields, &cursor, QueryOrder::Asc, PagingDirection::Backward, NullsOrder::First);
    assert!(backward.matches(&task("e", "Task E", None)));
}

#[test]
fn test_cursor_predicate_with_null_sort_value() {
    let fields = CursorFields::new("id", "rank").unwrap();
    let cursor = Cursor::from_after("b", Some(Value::Null));
    let within_nulls = Predicate::and(vec![
        Predicate::is_null("rank"),
        Predicate::compare("id", Comparison::Gt, "b"),
    ]);

    assert_eq!(
        cursor_predicate(&fields, &cursor, QueryOrder::Asc, PagingDirection::Forward, NullsOrder::Last),
        within_nulls
    );
    assert_eq!(
        cursor_predicate(&fields, &cursor, QueryOrder::Asc, PagingDirection::Forward, NullsOrder::First),
        Predicate::or(vec![Predicate::is_not_null("rank"), within_nulls])
    );

    let backward = cursor_predicate(&fields, &cursor, QueryOrder::Asc, PagingDirection::Backward, NullsOrder::Last);
    assert!(backward.matches(&task("z", "Task Z", Some(9))));
    assert!(backward.matches(&task("a", "Task A", None)));
    assert!(!backward.matches(&task("c", "Task C", None)));
}

#[test]
fn test_predicate_null_never_matches() {
    let row = task("e", "Task E", None);
    assert!(!Predicate::compare("rank", Comparison::Gt, 0).matches(&row));
    assert!(!Predicate::compare("rank", Comparison::Lt, 0).matches(&row));
    assert!(!Predicate::eq("missing", "x").matches(&row));
    assert!(Predicate::eq("name", "Task E").matches(&row));
    assert!(Predicate::is_null("rank").matches(&row));
    assert!(Predicate::is_null("missing").matches(&row));
    assert!(!Predicate::is_not_null("rank").matches(&row));
    assert!(Predicate::is_not_null("name").matches(&row));
    assert!(Predicate::and(vec![]).matches(&row));
    assert!(!Predicate::or(vec![]).matches(&row));
}

// ============================================================================
// Field Resolution Tests
// ============================================================================

#[test]
fn test_resolve_fields_preference() {
    let meta = tasks_table().with_create_date_column("rank");
    let query = QuerySpec::new("tasks");

    let resolved = resolve_cursor_fields(Some(&meta), &query, &PaginationArgs::new(), None).unwrap();
    assert_eq!(resolved, CursorFields::new("id", "rank").unwrap());

    let ordered = QuerySpec::new("tasks").with_order_by("name", QueryOrder::Desc);
    let resolved = resolve_cursor_fields(Some(&meta), &ordered, &PaginationArgs::new(), None).unwrap();
    assert_eq!(resolved.order_by_field(), "name");

    let args = PaginationArgs::new().order_by("id");
    let resolved = resolve_cursor_fields(Some(&meta), &ordered, &args, None).unwrap();
    assert!(!resolved.is_composite());

    let explicit = CursorFields::new("name", "rank").unwrap();
    let resolved = resolve_cursor_fields(Some(&meta), &ordered, &args, Some(&explicit)).unwrap();
    assert_eq!(resolved, explicit);
}

#[test]
fn test_resolve_fields_falls_back_to_id() {
    let resolved = resolve_cursor_fields(
        Some(&tasks_table()),
        &QuerySpec::new("tasks"),
        &PaginationArgs::new(),
        None,
    )
    .unwrap();
    assert_eq!(resolved, CursorFields::id_only("id").unwrap());
}

#[test]
fn test_resolve_fields_errors() {
    let query = QuerySpec::new("tasks");
    let args = PaginationArgs::new();

    let err = resolve_cursor_fields(None, &query, &args, None).unwrap_err();
    assert!(matches!(err, Error::Config { .. }));

    let no_pk = TableMetadata::new("tasks").with_columns(["id"]);
    let err = resolve_cursor_fields(Some(&no_pk), &query, &args, None).unwrap_err();
    assert!(err.to_string().contains("no primary key"));

    let bad_order_by = PaginationArgs::new().order_by("secret");
    let err = resolve_cursor_fields(Some(&tasks_table()), &query, &bad_order_by, None).unwrap_err();
    assert!(matches!(err, Error::Validation { .. }));

    let explicit = CursorFields::new("id", "secret").unwrap();
    let err = resolve_cursor_fields(Some(&tasks_table()), &query, &args, Some(&explicit)).unwrap_err();
    assert!(matches!(err, Error::Config { .. }));
}

// ============================================================================
// Adapter Query Derivation Tests
// ============================================================================

#[test]
fn test_window_query_forward() {
    let engine = engine();
    let config = PaginationConfig::default();
    let args = PaginationArgs::new().first(2).order_by("rank");
    let cursor = Cursor::from_after("c", Some(Value::from(2)));
    let adapter = QueryAdapter::new(
        &engine,
        QuerySpec::new("tasks"),
        args,
        Some(cursor.clone()),
        None,
        &config,
    )
    .unwrap();

    let window = adapter.window_query();
    assert_eq!(window.limit(), Some(2));
    assert_eq!(
        window.order_by(),
        &[
            OrderBy::new("rank", QueryOrder::Asc).with_nulls(NullsOrder::Last),
            OrderBy::new("id", QueryOrder::Asc)
        ]
    );
    assert_eq!(
        window.filters(),
        &[cursor_predicate(
            adapter.fields(),
            &cursor,
            QueryOrder::Asc,
            PagingDirection::Forward,
            NullsOrder::Last
        )]
    );

    let previous = adapter.previous_count_query().unwrap();
    assert_eq!(
        previous.filters(),
        &[cursor_predicate(
            adapter.fields(),
            &cursor,
            QueryOrder::Asc,
            PagingDirection::Backward,
            NullsOrder::Last
        )]
    );
    assert!(previous.order_by().is_empty());
    assert_eq!(previous.limit(), None);
}

#[test]
fn test_window_query_last_reverses_physical_order_only() {
    let engine = engine();
    let config = PaginationConfig::default();
    let base = QuerySpec::new("tasks")
        .with_order_term(OrderBy::new("rank", QueryOrder::Asc).with_nulls(NullsOrder::First));
    let args = PaginationArgs::new().last(2).before("x");
    let adapter = QueryAdapter::new(
        &engine,
        base,
        args,
        Some(Cursor::from_before("c", Some(Value::from(2)))),
        None,
        &config,
    )
    .unwrap();

    assert_eq!(adapter.order(), QueryOrder::Asc);
    assert_eq!(adapter.operator(), Comparison::Lt);

    let window = adapter.window_query();
    assert_eq!(
        window.order_by(),
        &[
            OrderBy::new("rank", QueryOrder::Desc).with_nulls(NullsOrder::Last),
            OrderBy::new("id", QueryOrder::Desc)
        ]
    );
}

#[test]
fn test_order_preference() {
    let engine = engine();
    let config = PaginationConfig::default().with_default_order(QueryOrder::Desc);

    let adapter = QueryAdapter::new(
        &engine,
        QuerySpec::new("tasks"),
        PaginationArgs::new().first(1),
        None,
        None,
        &config,
    )
    .unwrap();
    assert_eq!(adapter.order(), QueryOrder::Desc);

    let adapter = QueryAdapter::new(
        &engine,
        QuerySpec::new("tasks").with_order_by("rank", QueryOrder::Asc),
        PaginationArgs::new().first(1),
        None,
        None,
        &config,
    )
    .unwrap();
    assert_eq!(adapter.order(), QueryOrder::Asc);

    let adapter = QueryAdapter::new(
        &engine,
        QuerySpec::new("tasks").with_order_by("rank", QueryOrder::Asc),
        PaginationArgs::new().first(1).order(QueryOrder::Desc),
        None,
        None,
        &config,
    )
    .unwrap();
    assert_eq!(adapter.order(), QueryOrder::Desc);
}

#[test]
fn test_unknown_filter_field_rejected() {
    let engine = engine();
    let result = QueryAdapter::new(
        &engine,
        QuerySpec::new("tasks").with_where("owner", "me"),
        PaginationArgs::new().first(1),
        None,
        None,
        &PaginationConfig::default(),
    );
    assert!(matches!(result, Err(Error::Config { .. })));
}

#[test]
fn test_no_previous_count_query_without_cursor() {
    let engine = engine();
    let adapter = QueryAdapter::new(
        &engine,
        QuerySpec::new("tasks"),
        PaginationArgs::new().first(2),
        None,
        None,
        &PaginationConfig::default(),
    )
    .unwrap();

    assert!(adapter.previous_count_query().is_none());
    assert!(adapter.current_count_query().filters().is_empty());
}

// ============================================================================
// Adapter Execution Tests
// ============================================================================

#[tokio::test]
async fn test_fetch_entities_and_count() {
    let engine = engine();
    let config = PaginationConfig::default();
    let adapter = QueryAdapter::new(
        &engine,
        QuerySpec::new("tasks"),
        PaginationArgs::new().first(2).order_by("rank"),
        Some(Cursor::from_after("b", Some(Value::from(1)))),
        None,
        &config,
    )
    .unwrap();

    let window = adapter.fetch_entities_and_count().await.unwrap();
    assert_eq!(ids(&window.rows), vec!["c", "d"]);
    // c, d and a rank above 1 and e sorts last without a rank
    assert_eq!(window.counts.current, Some(4));
    assert_eq!(window.counts.previous, Some(0));
}

#[tokio::test]
async fn test_fetch_entities_ties_broken_by_id() {
    let engine = engine();
    let adapter = QueryAdapter::new(
        &engine,
        QuerySpec::new("tasks"),
        PaginationArgs::new().first(5).order_by("rank"),
        Some(Cursor::from_after("c", Some(Value::from(2)))),
        None,
        &PaginationConfig::default(),
    )
    .unwrap();

    let rows = adapter.fetch_entities().await.unwrap();
    assert_eq!(ids(&rows), vec!["d", "a", "e"]);
    // Only b precedes; the cursor row c is on neither side
    assert_eq!(adapter.calculate_previous_count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_fetch_entities_last_returns_logical_order() {
    let engine = engine();
    let adapter = QueryAdapter::new(
        &engine,
        QuerySpec::new("tasks"),
        PaginationArgs::new().last(2).before("x").order_by("rank"),
        Some(Cursor::from_before("a", Some(Value::from(3)))),
        None,
        &PaginationConfig::default(),
    )
    .unwrap();

    let rows = adapter.fetch_entities().await.unwrap();
    assert_eq!(ids(&rows), vec!["c", "d"]);
}

#[tokio::test]
async fn test_paginate_without_counts() {
    let engine = engine();
    let adapter = QueryAdapter::new(
        &engine,
        QuerySpec::new("tasks").with_where("name", "Task B"),
        PaginationArgs::new().first(10),
        None,
        None,
        &PaginationConfig::default(),
    )
    .unwrap();

    let window = adapter.paginate(false).await.unwrap();
    assert_eq!(ids(&window.rows), vec!["b"]);
    assert!(window.counts.is_unknown());
}

async fn walk_forward(engine: &MemoryEngine<Record>, base: QuerySpec, size: i64) -> Vec<String> {
    let config = PaginationConfig::default();
    let fields = CursorFields::new("id", "rank").unwrap();
    let mut seen = Vec::new();
    let mut cursor: Option<Cursor> = None;

    loop {
        let adapter = QueryAdapter::new(
            engine,
            base.clone(),
            PaginationArgs::new().first(size),
            cursor.take(),
            Some(&fields),
            &config,
        )
        .unwrap();
        let rows = adapter.fetch_entities().await.unwrap();
        let Some(last) = rows.last() else { break };
        cursor = Some(Cursor::from_after(
            last.field("id").unwrap().to_string(),
            Some(last.field("rank").unwrap_or(Value::Null)),
        ));
        seen.extend(ids(&rows));
    }
    seen
}

#[tokio::test]
async fn test_paging_through_null_sort_values() {
    let engine = MemoryEngine::new().with_table(
        tasks_table(),
        vec![
            task("a", "Task A", Some(1)),
            task("b", "Task B", None),
            task("c", "Task C", None),
            task("d", "Task D", Some(2)),
        ],
    );

    for size in 1..=4 {
        let asc = QuerySpec::new("tasks").with_order_by("rank", QueryOrder::Asc);
        assert_eq!(walk_forward(&engine, asc, size).await, vec!["a", "d", "b", "c"]);

        let desc = QuerySpec::new("tasks").with_order_by("rank", QueryOrder::Desc);
        assert_eq!(walk_forward(&engine, desc, size).await, vec!["d", "a", "c", "b"]);

        let nulls_first = QuerySpec::new("tasks")
            .with_order_term(OrderBy::new("rank", QueryOrder::Asc).with_nulls(NullsOrder::First));
        assert_eq!(walk_forward(&engine, nulls_first, size).await, vec!["b", "c", "a", "d"]);
    }
}

#[tokio::test]
async fn test_counts_around_null_cursor() {
    let engine = engine();
    let adapter = QueryAdapter::new(
        &engine,
        QuerySpec::new("tasks"),
        PaginationArgs::new().last(2).before("x").order_by("rank"),
        Some(Cursor::from_before("e", Some(Value::Null))),
        None,
        &PaginationConfig::default(),
    )
    .unwrap();

    let window = adapter.fetch_entities_and_count().await.unwrap();
    assert_eq!(ids(&window.rows), vec!["d", "a"]);
    assert_eq!(window.counts.current, Some(4));
    assert_eq!(window.counts.previous, Some(0));
}

// ============================================================================
// Memory Engine Tests
// ============================================================================

#[tokio::test]
async fn test_memory_engine_sorts_nulls_last() {
    let engine = engine();

    let query = QuerySpec::new("tasks")
        .with_order_by("rank", QueryOrder::Desc)
        .with_order_by("id", QueryOrder::Asc);
    let rows = engine.fetch(&query).await.unwrap();
    assert_eq!(ids(&rows), vec!["a", "c", "d", "b", "e"]);

    let query = QuerySpec::new("tasks")
        .with_order_term(OrderBy::new("rank", QueryOrder::Asc).with_nulls(NullsOrder::First))
        .with_limit(2);
    let rows = engine.fetch(&query).await.unwrap();
    assert_eq!(ids(&rows), vec!["e", "b"]);
}

#[tokio::test]
async fn test_memory_engine_count_and_unknown_table() {
    let mut engine = engine();
    engine
        .insert("tasks", task("f", "Task F", Some(9)))
        .unwrap();
    assert_eq!(engine.row_count("tasks"), 6);

    let query = QuerySpec::new("tasks").with_filter(Predicate::compare(
        "rank",
        Comparison::Gt,
        1,
    ));
    assert_eq!(engine.count(&query).await.unwrap(), 4);

    assert!(engine.fetch(&QuerySpec::new("nope")).await.is_err());
    assert!(engine.insert("nope", task("x", "X", None)).is_err());
}

// ============================================================================
// Table Metadata Tests
// ============================================================================

#[test]
fn test_table_metadata() {
    let meta = tasks_table()
        .with_update_date_column("rank")
        .with_unique(["name"]);

    assert_eq!(meta.primary_column(), Some("id"));
    assert_eq!(meta.date_column(), Some("rank"));
    assert!(meta.has_column("name"));
    assert!(!meta.has_column("owner"));

    let indexed = meta.indexed_fields();
    assert!(indexed.contains("id"));
    assert!(indexed.contains("rank"));
    assert!(indexed.contains("name"));
    assert!(meta.validate().is_ok());

    let broken = TableMetadata::new("tasks")
        .with_columns(["id"])
        .with_create_date_column("created_at");
    assert!(broken.validate().is_err());
    assert!(TableMetadata::new(" ").validate().is_err());
}
