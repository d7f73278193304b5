use std::collections::HashSet;

use cql::types::CqlValue;
use delta::error::ErrorKind;
use delta::query::{RANGE_TEMPLATES_PER_COLUMN, range_delete_index};
use delta::statement::{BindValue, Mutation};
use delta::test_utils::event::{insert, range_end, range_start};
use delta::test_utils::schema::{SIMPLE_TABLE, WIDE_TABLE, example_schema, example_translator};
use delta::types::{BoundKind, ChangeEvent, OperationType};

const T: i64 = 1_700_000_000_000_000;

fn value(value: impl Into<CqlValue>) -> BindValue {
    BindValue::Value(value.into())
}

fn wide_bound(operation: OperationType, clustering: &[(&str, i32)]) -> ChangeEvent {
    clustering.iter().fold(
        ChangeEvent::new(operation, T)
            .with_key("p1", 1)
            .with_key("p2", "x"),
        |event, (column, value)| event.with_key(*column, *value),
    )
}

#[test]
fn open_ended_range_uses_left_bound_template() {
    let translator = example_translator(SIMPLE_TABLE);
    let events = [
        range_start(BoundKind::Inclusive, 1, T).with_key("seq", 5),
        range_end(BoundKind::Inclusive, 1, T),
    ];

    let mutations = translator.plan(&events).unwrap();

    let [Mutation::Single { statement, options }] = mutations.as_slice() else {
        panic!("expected one range delete, got {mutations:?}");
    };
    assert_eq!(&*statement.query, "DELETE FROM ks.t WHERE id = ? AND seq >= ?");
    assert_eq!(statement.values, vec![value(1), value(5)]);
    assert!(options.idempotent);
    assert_eq!(options.timestamp, T);

    assert_eq!(
        translator
            .templates()
            .range_delete(range_delete_index(0, Some(BoundKind::Inclusive), None).unwrap()),
        Some(&statement.query)
    );
}

#[test]
fn range_pair_is_consumed_as_one_unit() {
    let translator = example_translator(SIMPLE_TABLE);
    let events = [
        insert(1, 1, T),
        range_start(BoundKind::Exclusive, 1, T + 1).with_key("seq", 2),
        range_end(BoundKind::Exclusive, 1, T + 1).with_key("seq", 8),
        insert(1, 9, T + 2),
    ];

    let mutations = translator.plan(&events).unwrap();

    assert_eq!(mutations.len(), 3);
    assert_eq!(
        &*mutations[1].statements()[0].query,
        "DELETE FROM ks.t WHERE id = ? AND seq > ? AND seq < ?"
    );
    assert_eq!(
        mutations[1].statements()[0].values,
        vec![value(1), value(2), value(8)]
    );
}

#[test]
fn nested_range_binds_equality_prefix() {
    let translator = example_translator(WIDE_TABLE);
    let events = [
        wide_bound(
            OperationType::RangeDeleteStart(BoundKind::Inclusive),
            &[("c1", 1), ("c2", 2)],
        ),
        wide_bound(
            OperationType::RangeDeleteEnd(BoundKind::Exclusive),
            &[("c1", 1), ("c2", 7)],
        ),
    ];

    let mutations = translator.plan(&events).unwrap();

    let statement = &mutations[0].statements()[0];
    assert_eq!(
        &*statement.query,
        "DELETE FROM ks.wide WHERE p1 = ? AND p2 = ? AND c1 = ? AND c2 >= ? AND c2 < ?"
    );
    assert_eq!(
        statement.values,
        vec![value(1), value("x"), value(1), value(2), value(7)]
    );
}

#[test]
fn right_only_range_on_deepest_column() {
    let translator = example_translator(WIDE_TABLE);
    let events = [
        wide_bound(
            OperationType::RangeDeleteStart(BoundKind::Inclusive),
            &[("c1", 1), ("c2", 2)],
        ),
        wide_bound(
            OperationType::RangeDeleteEnd(BoundKind::Inclusive),
            &[("c1", 1), ("c2", 2), ("c3", 10)],
        ),
    ];

    let mutations = translator.plan(&events).unwrap();

    let statement = &mutations[0].statements()[0];
    assert_eq!(
        &*statement.query,
        "DELETE FROM ks.wide WHERE p1 = ? AND p2 = ? AND c1 = ? AND c2 = ? AND c3 <= ?"
    );
    assert_eq!(
        statement.values,
        vec![value(1), value("x"), value(1), value(2), value(10)]
    );
}

#[test]
fn range_table_has_eight_templates_per_clustering_column() {
    for (table, columns) in [(SIMPLE_TABLE, 1), (WIDE_TABLE, 3)] {
        let translator = example_translator(table);
        assert_eq!(
            example_schema(table).clustering_key_columns().len(),
            columns
        );
        assert_eq!(
            translator.templates().range_delete_count(),
            RANGE_TEMPLATES_PER_COLUMN * columns
        );

        let kinds = [None, Some(BoundKind::Inclusive), Some(BoundKind::Exclusive)];
        let mut queries = HashSet::new();
        for depth in 0..columns {
            for left in kinds {
                for right in kinds {
                    if let Some(index) = range_delete_index(depth, left, right) {
                        let query = translator.templates().range_delete(index).unwrap();
                        assert!(queries.insert(query.clone()));
                    }
                }
            }
        }
        assert_eq!(queries.len(), RANGE_TEMPLATES_PER_COLUMN * columns);
    }
}

#[test]
fn ill_formed_range_sequences_are_rejected() {
    let translator = example_translator(SIMPLE_TABLE);

    let err = translator
        .plan(&[range_start(BoundKind::Inclusive, 1, T).with_key("seq", 1)])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidData);

    let err = translator
        .plan(&[range_end(BoundKind::Inclusive, 1, T).with_key("seq", 1)])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedOperation);

    let err = translator
        .plan(&[
            range_start(BoundKind::Inclusive, 1, T),
            range_end(BoundKind::Inclusive, 1, T),
        ])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidData);

    let err = translator
        .plan(&[
            range_start(BoundKind::Inclusive, 1, T).with_key("seq", 1),
            insert(1, 1, T),
        ])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidData);
}
