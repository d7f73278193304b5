//! Consumers handed to the CDC reader and the factory that builds them.

use std::future::Future;

use config::shared::ReplicatorConfig;
use cql::types::TableName;
use tracing::info;

use crate::destination::Destination;
use crate::error::ReplicatorResult;
use crate::schema::{SchemaCatalog, introspect};
use crate::translator::{DeltaTranslator, TranslatorOptions};
use crate::types::ChangeEvent;

/// Receiver of the change events read from one table's CDC log.
///
/// The reader calls [`ChangeConsumer::consume`] with events in source order for each partition
/// and [`ChangeConsumer::end`] once it stops reading.
pub trait ChangeConsumer {
    fn consume(&self, events: &[ChangeEvent]) -> impl Future<Output = ReplicatorResult<()>> + Send;

    /// Called when the reader stops. The default implementation is a no-op.
    fn end(&self) -> impl Future<Output = ReplicatorResult<()>> + Send {
        async { Ok(()) }
    }
}

/// [`ChangeConsumer`] applying events to a destination through a [`DeltaTranslator`].
#[derive(Debug, Clone)]
pub struct DeltaConsumer<D> {
    translator: DeltaTranslator,
    destination: D,
}

impl<D> DeltaConsumer<D> {
    pub fn new(translator: DeltaTranslator, destination: D) -> DeltaConsumer<D> {
        Self {
            translator,
            destination,
        }
    }

    pub fn translator(&self) -> &DeltaTranslator {
        &self.translator
    }

    pub fn destination(&self) -> &D {
        &self.destination
    }
}

impl<D> ChangeConsumer for DeltaConsumer<D>
where
    D: Destination + Send + Sync,
{
    async fn consume(&self, events: &[ChangeEvent]) -> ReplicatorResult<()> {
        self.translator.consume(&self.destination, events).await
    }
}

/// Builds a consumer per replicated table.
///
/// The destination schema is looked up once per table, when the consumer is created.
#[derive(Debug, Clone)]
pub struct ConsumerFactory<C, D> {
    catalog: C,
    destination: D,
    options: TranslatorOptions,
}

impl<C, D> ConsumerFactory<C, D>
where
    C: SchemaCatalog,
    D: Destination + Clone,
{
    pub fn new(catalog: C, destination: D, options: TranslatorOptions) -> ConsumerFactory<C, D> {
        Self {
            catalog,
            destination,
            options,
        }
    }

    /// Creates a factory from a validated configuration.
    ///
    /// Fails if the configuration does not validate.
    pub fn from_config(
        config: &ReplicatorConfig,
        catalog: C,
        destination: D,
    ) -> ReplicatorResult<ConsumerFactory<C, D>> {
        config.validate()?;

        let options = TranslatorOptions {
            consistency: config.destination.consistency,
            log_statements: config.log_statements,
        };

        Ok(Self::new(catalog, destination, options))
    }

    pub fn options(&self) -> &TranslatorOptions {
        &self.options
    }

    /// Resolves the schema of `table` and returns a translator for it.
    ///
    /// `table` must be a `keyspace.table` qualified name of an existing destination table.
    pub async fn create_translator(&self, table: &str) -> ReplicatorResult<DeltaTranslator> {
        let table_name: TableName = table.parse()?;

        info!(table = %table_name, "resolving destination table schema");
        let schema = introspect(&self.catalog, &table_name).await?;

        Ok(DeltaTranslator::new(schema, self.options))
    }

    /// Same as [`ConsumerFactory::create_translator`], paired with the factory's destination.
    pub async fn create_consumer(&self, table: &str) -> ReplicatorResult<DeltaConsumer<D>> {
        let translator = self.create_translator(table).await?;

        Ok(DeltaConsumer::new(translator, self.destination.clone()))
    }
}
