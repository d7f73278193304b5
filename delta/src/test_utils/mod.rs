//! Shared fixtures for unit and integration tests.
//!
//! - [`schema`] provides an example keyspace and ready-made schemas and translators.
//! - [`event`] provides builders for change events against the example tables.
//! - `failpoints` (with the `failpoints` feature) scopes failpoint configuration to a test.

pub mod event;
#[cfg(feature = "failpoints")]
pub mod failpoints;
pub mod schema;
