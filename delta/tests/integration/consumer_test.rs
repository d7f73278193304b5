use config::shared::{DestinationConfig, ReplicatorConfig, SourceConfig};
use cql::types::Consistency;
use delta::consumer::{ChangeConsumer, ConsumerFactory};
use delta::destination::memory::MemoryDestination;
use delta::error::ErrorKind;
use delta::schema::MemoryCatalog;
use delta::test_utils::event::{insert, row_delete, set_value, update};
use delta::test_utils::schema::example_catalog;
use delta::translator::TranslatorOptions;
use telemetry::tracing::init_test_tracing;

const T: i64 = 1_700_000_000_000_000;

fn replicator_config(table: &str) -> ReplicatorConfig {
    ReplicatorConfig {
        source: SourceConfig {
            address: "127.0.0.1:9042".to_string(),
            table: table.to_string(),
        },
        destination: DestinationConfig {
            address: "127.0.0.2:9042".to_string(),
            consistency: Consistency::Quorum,
        },
        log_statements: true,
    }
}

#[tokio::test]
async fn factory_builds_consumer_from_configuration() {
    init_test_tracing();
    let config = replicator_config("ks.t");
    let destination = MemoryDestination::new();
    let factory =
        ConsumerFactory::from_config(&config, example_catalog().await, destination.clone())
            .unwrap();

    let consumer = factory.create_consumer(&config.source.table).await.unwrap();
    consumer
        .consume(&[
            insert(1, 1, T).with_change("val", set_value(5)),
            row_delete(1, 1, T + 1),
        ])
        .await
        .unwrap();
    consumer.end().await.unwrap();

    let mutations = destination.mutations().await;
    assert_eq!(mutations.len(), 2);
    for mutation in &mutations {
        assert_eq!(mutation.options().consistency, Consistency::Quorum);
    }
    assert_eq!(mutations[1].options().timestamp, T + 1);
    assert!(consumer.translator().options().log_statements);
}

#[tokio::test]
async fn factory_rejects_invalid_configuration() {
    let mut config = replicator_config("ks.t");
    config.destination.address = String::new();

    let err = ConsumerFactory::from_config(&config, MemoryCatalog::new(), MemoryDestination::new())
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ConfigError);
}

#[tokio::test]
async fn factory_reports_unknown_tables() {
    let factory = ConsumerFactory::new(
        example_catalog().await,
        MemoryDestination::new(),
        TranslatorOptions::default(),
    );

    let err = factory.create_translator("ks").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidTableName);
    assert!(err.kind().is_configuration());

    let err = factory.create_translator("other.t").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingKeyspace);

    let err = factory.create_translator("ks.missing").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingTable);
}

#[tokio::test]
async fn consume_stops_at_first_destination_failure() {
    init_test_tracing();
    let destination = MemoryDestination::new();
    let factory = ConsumerFactory::new(
        example_catalog().await,
        destination.clone(),
        TranslatorOptions::default(),
    );
    let consumer = factory.create_consumer("ks.t").await.unwrap();

    consumer
        .consume(&[insert(1, 1, T)])
        .await
        .unwrap();
    destination.fail_next(1).await;

    let err = consumer
        .consume(&[
            update(1, 1, T + 1).with_change("val", set_value(2)),
            update(1, 1, T + 2).with_change("val", set_value(3)),
        ])
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::DestinationQueryFailed);
    assert!(err.kind().is_destination());
    assert_eq!(destination.mutations().await.len(), 1);
}

#[tokio::test]
async fn translation_errors_happen_before_later_writes() {
    let destination = MemoryDestination::new();
    let factory = ConsumerFactory::new(
        example_catalog().await,
        destination.clone(),
        TranslatorOptions::default(),
    );
    let consumer = factory.create_consumer("ks.t").await.unwrap();

    let err = consumer
        .consume(&[
            insert(1, 1, T),
            update(1, 1, T + 1).with_change("tags", set_value("a")),
            insert(1, 2, T + 2),
        ])
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidData);
    assert_eq!(destination.mutations().await.len(), 1);
}
