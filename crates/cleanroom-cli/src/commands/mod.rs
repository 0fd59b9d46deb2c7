//! Command implementations.

pub mod detect;
pub mod run;
