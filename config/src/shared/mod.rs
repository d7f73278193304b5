mod base;
mod destination;
mod replicator;
mod source;

pub use base::*;
pub use destination::*;
pub use replicator::*;
pub use source::*;
