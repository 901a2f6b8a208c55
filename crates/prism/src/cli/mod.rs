//! Command implementations for the Prism CLI.

pub mod config;
pub mod filters;
pub mod run;
