#![forbid(unsafe_code)]

//! `tether` command-line tool.
//!
//! Mounts an HTML template with a JSON app file, replays scripted user
//! events, and prints either the rendered root or a binding report.

pub mod check;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod mount;
pub mod render;

pub use cli::{Cli, Commands, run, run_from_env};
pub use error::{CliError, Result};
