//! Core types for ragmind.

mod profile;
mod memory;
mod turn;

pub use profile::*;
pub use memory::*;
pub use turn::*;
