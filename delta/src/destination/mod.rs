//! Destination cluster abstractions.
//!
//! This module provides the [`Destination`] trait through which translated mutations reach the
//! destination cluster, and an in-memory implementation for tests and dry runs.

mod base;
pub mod memory;

pub use base::Destination;
