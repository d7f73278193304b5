//! Change events as delivered by the CDC reader.

mod event;

pub use event::*;
