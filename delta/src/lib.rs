//! Delta replication of CDC change events onto a destination table.
//!
//! The crate turns decoded CDC log rows ([`types::ChangeEvent`]) into the statements that
//! reproduce each write on an independent destination cluster, keeping the source's write
//! timestamps, TTLs and cell-level collection edits.
//!
//! A [`consumer::ConsumerFactory`] resolves the destination table's schema through a
//! [`schema::SchemaCatalog`] and returns a [`translator::DeltaTranslator`], which precomputes
//! the table's statement texts ([`query::QueryTemplates`]) and sends the translated
//! [`statement::Mutation`]s to a [`destination::Destination`].

pub mod consumer;
pub mod destination;
pub mod error;
#[cfg(feature = "failpoints")]
pub mod failpoints;
mod macros;
pub mod query;
pub mod schema;
pub mod statement;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
pub mod translator;
pub mod types;
