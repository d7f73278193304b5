//! CQL domain types shared by the replicator crates.
//!
//! Holds the column type system (and the parser for the textual type definitions stored in
//! the destination catalog), the value model used for bind parameters, consistency levels,
//! table names with identifier quoting, and the raw catalog metadata structures.

pub mod catalog;
pub mod types;
