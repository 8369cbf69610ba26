//! Command implementations for the `mispro` binary.

pub mod build;
pub mod cli;
pub mod inspect;
