#![forbid(unsafe_code)]

//! `panelcheck` binary entry point.

use panelcheck_tty::app;
use panelcheck_tty::cli;
use panelcheck_tty::logging;

fn main() {
    let opts = cli::Opts::parse();

    if let Err(e) = logging::init() {
        eprintln!("Failed to initialize logging: {e}");
        std::process::exit(1);
    }

    if let Err(e) = app::run(&opts) {
        eprintln!("Runtime error: {e}");
        std::process::exit(1);
    }
}
