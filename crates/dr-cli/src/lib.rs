//! `dr` command-line front end.
//!
//! The binary is a thin shell over these modules so the argument surface and
//! the report format can be tested without spawning a process.

#![allow(clippy::uninlined_format_args)]

pub mod cli;
pub mod config;
pub mod logging;
pub mod report;

pub use cli::{Cli, Command};
pub use config::AppConfig;
pub use report::render_stop_report;
