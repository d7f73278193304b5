use delta::destination::memory::MemoryDestination;
use delta::error::ErrorKind;
use delta::failpoints::{
    DELTA_TRANSLATOR__BEFORE_BATCH_EXECUTION, DELTA_TRANSLATOR__BEFORE_DELETE_EXECUTION,
};
use delta::test_utils::event::{insert, row_delete, set_value};
use delta::test_utils::failpoints::FailpointScenario;
use delta::test_utils::schema::{SIMPLE_TABLE, example_translator};
use telemetry::tracing::init_test_tracing;

const T: i64 = 1_700_000_000_000_000;

#[tokio::test]
async fn batch_failure_stops_before_reaching_destination() {
    init_test_tracing();
    let scenario = FailpointScenario::setup(&[(
        DELTA_TRANSLATOR__BEFORE_BATCH_EXECUTION,
        "return(manual_retry)",
    )]);

    let translator = example_translator(SIMPLE_TABLE);
    let destination = MemoryDestination::new();

    let err = translator
        .consume(
            &destination,
            &[
                row_delete(1, 1, T),
                insert(1, 1, T + 1).with_change("val", set_value(1)),
                row_delete(1, 2, T + 2),
            ],
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::WithManualRetry);
    let mutations = destination.mutations().await;
    assert_eq!(mutations.len(), 1);
    assert!(mutations[0].options().idempotent);

    scenario.teardown();
}

#[tokio::test]
async fn delete_failure_defaults_to_no_retry() {
    init_test_tracing();
    let scenario = FailpointScenario::setup(&[(DELTA_TRANSLATOR__BEFORE_DELETE_EXECUTION, "return")]);

    let translator = example_translator(SIMPLE_TABLE);
    let destination = MemoryDestination::new();

    let err = translator
        .consume(&destination, &[row_delete(1, 1, T)])
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::WithNoRetry);
    assert!(destination.mutations().await.is_empty());

    scenario.teardown();
}
