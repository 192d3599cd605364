//! mdsuite - Test suites from markdown examples

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = mdsuite::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
