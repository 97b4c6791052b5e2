//! genforge command line
//!
//! - `validate <paths>...`: validation report as JSON, exit status 1 on a
//!   failed verdict
//! - `plan --request <file>`: ordered stages for a request
//! - `cache-key --request <file>`: cache key of a request

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod cli;
pub mod commands;
pub mod logging;

pub use cli::{Cli, Command};
pub use commands::{run, CommandOutput};
