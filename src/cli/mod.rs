//! Command line boundary of skelly.

pub mod args;
pub mod runner;

pub use args::{
    get_cli, get_log_level_from_verbose, Cli, Commands, ListArgs, NewArgs, RepositoryArgs,
};
pub use runner::run;
