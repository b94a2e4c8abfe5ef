//! Subcommand implementations.

pub mod agreement;
pub mod compare;
pub mod evaluate;
pub mod validate;
