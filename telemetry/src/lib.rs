//! Tracing setup shared by the replicator binaries and test suites.

pub mod tracing;
