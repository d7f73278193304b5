use std::sync::Arc;

use cql::types::CqlValue;
use delta::destination::memory::MemoryDestination;
use delta::statement::{BindValue, Mutation, Statement};
use delta::test_utils::event::{partition_delete, row_delete};
use delta::test_utils::schema::{SIMPLE_TABLE, WIDE_TABLE, example_translator};
use delta::types::{ChangeEvent, OperationType};
use telemetry::tracing::init_test_tracing;

const T: i64 = 1_700_000_000_000_000;

fn value(value: impl Into<CqlValue>) -> BindValue {
    BindValue::Value(value.into())
}

#[test]
fn row_delete_is_a_single_idempotent_statement() {
    let translator = example_translator(SIMPLE_TABLE);

    let mutations = translator.plan(&[row_delete(1, 2, T)]).unwrap();

    let [Mutation::Single { statement, options }] = mutations.as_slice() else {
        panic!("expected one single statement, got {mutations:?}");
    };
    assert_eq!(
        *statement,
        Statement::new(
            Arc::from("DELETE FROM ks.t WHERE id = ? AND seq = ?"),
            vec![value(1), value(2)],
        )
    );
    assert!(options.idempotent);
    assert_eq!(options.timestamp, T);
}

#[test]
fn partition_delete_binds_partition_key_only() {
    let translator = example_translator(WIDE_TABLE);
    let event = ChangeEvent::new(OperationType::PartitionDelete, T)
        .with_key("p1", 4)
        .with_key("p2", "b");

    let mutations = translator.plan(&[event]).unwrap();

    assert_eq!(
        mutations[0].statements(),
        &[Statement::new(
            Arc::from("DELETE FROM ks.wide WHERE p1 = ? AND p2 = ?"),
            vec![value(4), value("b")],
        )]
    );
    assert!(mutations[0].options().idempotent);
}

#[tokio::test]
async fn replayed_deletes_produce_identical_writes() {
    init_test_tracing();
    let translator = example_translator(SIMPLE_TABLE);
    let destination = MemoryDestination::new();
    let events = [row_delete(1, 2, T), partition_delete(1, T + 1)];

    translator.consume(&destination, &events).await.unwrap();
    let first = destination.mutations().await;

    destination.clear().await;
    translator.consume(&destination, &events).await.unwrap();
    translator.consume(&destination, &events).await.unwrap();
    let replayed = destination.mutations().await;

    assert_eq!(first.len(), 2);
    assert_eq!(replayed[..2], first[..]);
    assert_eq!(replayed[2..], first[..]);
}
