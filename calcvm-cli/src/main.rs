//! calcvm CLI: load a bytecode file, run it, dump the stack.
//!
//! Exit codes:
//! - 0: Success
//! - 1: Usage, input or bytecode format error
//! - 3: Runtime error

mod commands;

use std::process;

fn main() {
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();

    let path = match args.as_slice() {
        [flag] if flag == "--help" || flag == "-h" => {
            print_usage();
            process::exit(0);
        }
        [path] => path,
        _ => {
            print_usage();
            process::exit(1);
        }
    };

    if let Err(code) = commands::run(path) {
        process::exit(code);
    }
}

/// Log to stderr at `warn`; the filter is fixed so behaviour does not
/// depend on the environment.
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(EnvFilter::new("warn"))
        .init();
}

fn print_usage() {
    eprintln!("Usage: calcvm <bytecode-file>");
    eprintln!();
    eprintln!("Loads a compiled calculator bytecode file, runs it, and prints");
    eprintln!("the final operand stack.");
}
