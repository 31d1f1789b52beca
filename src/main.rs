//! linemap CLI entry point
//!
//! Parses arguments and dispatches to the CLI module. Errors have already
//! been written as a JSON response; they are repeated on stderr and the
//! process exits non-zero.

use linemap::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
