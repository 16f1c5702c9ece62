//! Declarative resource definitions

#[macro_use]
pub mod macros;
