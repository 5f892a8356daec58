//! CLI command implementation.

use calcvm_common::Datum;
use std::fs;

/// Load, execute and dump one bytecode file.
pub fn run(path: &str) -> Result<(), i32> {
    println!("Loading from {path}...");

    let text = fs::read_to_string(path).map_err(|e| {
        eprintln!("error: cannot read '{path}': {e}");
        1
    })?;

    let program = calcvm_loader::load(&text).map_err(|e| {
        eprintln!("error: {path}: {e}");
        1
    })?;

    println!("Running code...");

    match calcvm_vm::run(&program) {
        Ok(stack) => {
            print!("{}", render_stack(&stack));
            Ok(())
        }
        Err(fault) => {
            eprintln!("runtime error: {fault}");
            Err(3)
        }
    }
}

/// One line per slot, bottom of the stack first.
fn render_stack(stack: &[Datum]) -> String {
    stack
        .iter()
        .enumerate()
        .map(|(index, datum)| format!("{index:>3} | {datum}\n"))
        .collect()
}
