// CLI module
// Command-line interface, argument parsing and subcommand execution

mod args;
mod commands;

pub use args::{CliArgs, Command, ReconcileArgs, RemitArgs, StrategyType, SweepArgs};
pub use commands::run;

use clap::Parser;

pub fn parse_args() -> CliArgs {
    CliArgs::parse()
}
