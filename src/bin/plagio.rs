//! plagio CLI binary.

use std::process;

use clap::Parser;
use plagio::cli::{args::PlagioArgs, commands::execute_command};
use plagio::logging;

fn main() {
    let args = PlagioArgs::parse();

    if let Err(e) = logging::init(args.verbosity()) {
        eprintln!("Warning: {e}");
    }

    if let Err(e) = execute_command(args) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
