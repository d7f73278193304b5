use std::sync::Arc;

use cql::types::{Consistency, CqlValue};
use delta::error::ErrorKind;
use delta::statement::{BindValue, Mutation, Statement};
use delta::test_utils::event::{
    delete_value, insert, int_map, set_value, text_list, text_set, udt, update,
};
use delta::test_utils::schema::{SIMPLE_TABLE, WIDE_TABLE, example_translator};
use delta::types::{ChangeEvent, OperationType};
use telemetry::tracing::init_test_tracing;
use uuid::Uuid;

const T: i64 = 1_700_000_000_000_000;

fn value(value: impl Into<CqlValue>) -> BindValue {
    BindValue::Value(value.into())
}

fn statement(query: &str, values: Vec<BindValue>) -> Statement {
    Statement::new(Arc::from(query), values)
}

fn single_batch(mutations: Vec<Mutation>) -> delta::statement::Batch {
    assert_eq!(mutations.len(), 1);
    match mutations.into_iter().next() {
        Some(Mutation::Batch(batch)) => batch,
        other => panic!("expected a batch, got {other:?}"),
    }
}

#[test]
fn insert_writes_row_marker_then_columns() {
    init_test_tracing();
    let translator = example_translator(SIMPLE_TABLE);
    let event = insert(1, 1, T).with_ttl(100).with_change("val", set_value(5));

    let batch = single_batch(translator.plan(&[event]).unwrap());

    assert_eq!(
        batch.statements,
        vec![
            statement(
                "INSERT INTO ks.t (id, seq) VALUES (?, ?) USING TTL ?",
                vec![value(1), value(1), value(100)],
            ),
            statement(
                "UPDATE ks.t USING TTL ? SET val = ? WHERE id = ? AND seq = ?",
                vec![value(100), value(5), value(1), value(1)],
            ),
        ]
    );
    assert_eq!(batch.options.timestamp, T);
    assert_eq!(batch.options.consistency, Consistency::One);
    assert!(!batch.options.idempotent);
}

#[test]
fn insert_without_ttl_binds_zero() {
    let translator = example_translator(SIMPLE_TABLE);

    let batch = single_batch(translator.plan(&[insert(1, 2, T)]).unwrap());

    assert_eq!(batch.statements.len(), 1);
    assert_eq!(
        batch.statements[0].values,
        vec![value(1), value(2), value(0)]
    );
}

#[test]
fn update_deleting_scalar_emits_only_the_delete() {
    let translator = example_translator(SIMPLE_TABLE);
    let event = update(1, 1, T).with_change("val", delete_value());

    let batch = single_batch(translator.plan(&[event]).unwrap());

    assert_eq!(
        batch.statements,
        vec![statement(
            "DELETE val FROM ks.t WHERE id = ? AND seq = ?",
            vec![value(1), value(1)],
        )]
    );
}

#[test]
fn set_additions_and_removals_are_separate_statements() {
    let translator = example_translator(SIMPLE_TABLE);
    let event = update(1, 1, T)
        .with_ttl(30)
        .with_change("tags", text_set(&["a"], &["b"]));

    let batch = single_batch(translator.plan(&[event]).unwrap());

    assert_eq!(
        batch.statements,
        vec![
            statement(
                "UPDATE ks.t USING TTL ? SET tags = tags + ? WHERE id = ? AND seq = ?",
                vec![
                    value(30),
                    value(CqlValue::Set(vec![CqlValue::from("a")])),
                    value(1),
                    value(1),
                ],
            ),
            statement(
                "UPDATE ks.t USING TTL ? SET tags = tags - ? WHERE id = ? AND seq = ?",
                vec![
                    value(30),
                    value(CqlValue::Set(vec![CqlValue::from("b")])),
                    value(1),
                    value(1),
                ],
            ),
        ]
    );
}

#[test]
fn set_reset_overwrites_whole_value() {
    let translator = example_translator(SIMPLE_TABLE);
    let mut change = text_set(&["x", "y"], &[]);
    if let delta::types::ColumnChange::Set(set) = &mut change {
        set.is_reset = true;
    }
    let event = update(1, 1, T).with_change("tags", change);

    let batch = single_batch(translator.plan(&[event]).unwrap());

    assert_eq!(batch.statements.len(), 1);
    assert_eq!(
        &*batch.statements[0].query,
        "UPDATE ks.t USING TTL ? SET tags = ? WHERE id = ? AND seq = ?"
    );
}

#[test]
fn list_reset_orders_clear_before_appends() {
    let translator = example_translator(SIMPLE_TABLE);
    let cell = Uuid::from_u128(0x1234);
    let event = update(1, 1, T).with_change("items", text_list(true, &[(cell, "x")], &[]));

    let batch = single_batch(translator.plan(&[event]).unwrap());

    assert_eq!(
        batch.statements,
        vec![
            statement(
                "DELETE items FROM ks.t USING TIMESTAMP ? WHERE id = ? AND seq = ?",
                vec![value(CqlValue::BigInt(T - 1)), value(1), value(1)],
            ),
            statement(
                "UPDATE ks.t USING TTL ? SET items[SCYLLA_TIMEUUID_LIST_INDEX(?)] = ? WHERE id = ? AND seq = ?",
                vec![
                    value(0),
                    value(CqlValue::Timeuuid(cell)),
                    value("x"),
                    value(1),
                    value(1),
                ],
            ),
        ]
    );
    assert_eq!(batch.options.timestamp, T);
}

#[test]
fn list_appends_keep_source_order() {
    let translator = example_translator(SIMPLE_TABLE);
    let first = Uuid::from_u128(1);
    let second = Uuid::from_u128(2);
    let event = update(1, 1, T).with_change(
        "items",
        text_list(false, &[(first, "a"), (second, "b")], &[]),
    );

    let batch = single_batch(translator.plan(&[event]).unwrap());

    let cells: Vec<_> = batch
        .statements
        .iter()
        .map(|statement| statement.values[1].clone())
        .collect();
    assert_eq!(
        cells,
        vec![
            value(CqlValue::Timeuuid(first)),
            value(CqlValue::Timeuuid(second))
        ]
    );
}

#[test]
fn columns_follow_schema_order() {
    let translator = example_translator(SIMPLE_TABLE);
    let event = update(1, 1, T)
        .with_change("items", text_list(false, &[], &[Uuid::from_u128(9)]))
        .with_change("val", set_value(3));

    let batch = single_batch(translator.plan(&[event]).unwrap());

    assert!(batch.statements[0].query.contains("SET val = ?"));
    assert!(batch.statements[1].query.contains("SET items["));
}

#[test]
fn wide_table_binds_composite_keys() {
    let translator = example_translator(WIDE_TABLE);
    let event = ChangeEvent::new(OperationType::Update, T)
        .with_key("p1", 1)
        .with_key("p2", "x")
        .with_key("c1", 1)
        .with_key("c2", 2)
        .with_key("c3", 3)
        .with_change("attrs", int_map(false, &[("k", 1)], &[]))
        .with_change(
            "point",
            set_value(CqlValue::Tuple(vec![Some(CqlValue::Int(4)), Some(CqlValue::Int(5))])),
        )
        .with_change("home", udt(false, &[("city", CqlValue::from("Oslo"))], &[]))
        .with_change("owner", set_value("me"));

    let batch = single_batch(translator.plan(&[event]).unwrap());

    let keys = vec![value(1), value("x"), value(1), value(2), value(3)];
    let where_clause = "WHERE p1 = ? AND p2 = ? AND c1 = ? AND c2 = ? AND c3 = ?";
    let mut expected_point = vec![value(0), value(4), value(5)];
    expected_point.extend(keys.clone());

    assert_eq!(batch.statements.len(), 4);
    assert_eq!(
        &*batch.statements[0].query,
        format!("UPDATE ks.wide USING TTL ? SET attrs = attrs + ? {where_clause}")
    );
    assert_eq!(
        &*batch.statements[1].query,
        format!("UPDATE ks.wide USING TTL ? SET home.city = ? {where_clause}")
    );
    assert_eq!(
        batch.statements[2],
        statement(
            &format!("UPDATE ks.wide USING TTL ? SET point = (?, ?) {where_clause}"),
            expected_point,
        )
    );
    assert_eq!(
        &*batch.statements[3].query,
        format!("UPDATE ks.wide USING TTL ? SET owner = ? {where_clause}")
    );
}

#[test]
fn map_reset_overwrites_whole_value() {
    let translator = example_translator(WIDE_TABLE);
    let event = ChangeEvent::new(OperationType::Update, T)
        .with_key("p1", 1)
        .with_key("p2", "x")
        .with_key("c1", 1)
        .with_key("c2", 2)
        .with_key("c3", 3)
        .with_change("attrs", int_map(true, &[("k", 1)], &["z"]));

    let batch = single_batch(translator.plan(&[event]).unwrap());

    assert_eq!(
        batch.statements,
        vec![statement(
            "UPDATE ks.wide USING TTL ? SET attrs = ? WHERE p1 = ? AND p2 = ? AND c1 = ? AND c2 = ? AND c3 = ?",
            vec![
                value(0),
                value(CqlValue::Map(vec![(CqlValue::from("k"), CqlValue::Int(1))])),
                value(1),
                value("x"),
                value(1),
                value(2),
                value(3),
            ],
        )]
    );
}

#[test]
fn frozen_collections_are_overwritten_whole() {
    let translator = example_translator(WIDE_TABLE);
    let history = CqlValue::List(vec![CqlValue::from("a"), CqlValue::from("b")]);
    let event = ChangeEvent::new(OperationType::Update, T)
        .with_key("p1", 1)
        .with_key("p2", "x")
        .with_key("c1", 1)
        .with_key("c2", 2)
        .with_key("c3", 3)
        .with_change("history", set_value(history.clone()));

    let batch = single_batch(translator.plan(&[event]).unwrap());

    assert_eq!(batch.statements.len(), 1);
    assert_eq!(batch.statements[0].values[1], value(history));
}

#[test]
fn missing_clustering_key_is_bound_as_unset() {
    let translator = example_translator(SIMPLE_TABLE);
    let event = ChangeEvent::new(OperationType::Update, T)
        .with_key("id", 1)
        .with_change("val", set_value(1));

    let batch = single_batch(translator.plan(&[event]).unwrap());

    assert_eq!(
        batch.statements[0].values,
        vec![value(0), value(1), value(1), BindValue::Unset]
    );
}

#[test]
fn mismatched_change_is_rejected() {
    let translator = example_translator(SIMPLE_TABLE);
    let event = update(1, 1, T).with_change("tags", set_value("a"));

    let err = translator.plan(&[event]).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidData);
}
