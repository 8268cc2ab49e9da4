//! CLI subcommands.

pub mod build;
