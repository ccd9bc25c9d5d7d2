// vidmend-cli/src/main.rs
//
// Entry point for the `vidmend` binary: parses the command line, sets up
// logging and hands off to `vidmend_cli::run`. Any error is printed with its
// context chain and the process exits with status 1.

use std::process;

use clap::Parser;
use vidmend_cli::{Cli, describe, logging, run, terminal};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init_logging(cli.verbose, cli.log_dir.as_deref()) {
        terminal::print_error(&describe(&e));
        process::exit(1);
    }

    if let Err(e) = run(&cli) {
        log::debug!("Command failed: {e:?}");
        terminal::print_error(&describe(&e));
        process::exit(1);
    }
}
