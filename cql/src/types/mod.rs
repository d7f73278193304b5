//! Core CQL types.

mod column;
mod consistency;
mod name;
mod parse;
mod value;

pub use column::*;
pub use consistency::*;
pub use name::*;
pub use parse::*;
pub use value::*;
