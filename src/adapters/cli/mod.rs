//! CLI Adapter
//!
//! Command-line interface for the solboy-api proxy.
//! Uses clap derive macros for argument parsing.

mod commands;

pub use commands::{build_service, execute, CliApp, Command, EnrichCmd, ServeCmd};
