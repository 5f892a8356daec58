//! Encoder: instruction array → textual records.
//!
//! Output is one record per line followed by the `source` terminator.
//! Reals use Rust's shortest round-trip formatting, so decoding the output
//! reproduces the array exactly.

use crate::error::FormatError;
use calcvm_common::{Datum, Program};

/// Encode a program into canonical record text.
pub fn encode(program: &Program) -> Result<String, FormatError> {
    let mut lines = Vec::with_capacity(program.len() + 1);

    for (address, datum) in program.code.iter().enumerate() {
        let line = match datum {
            Datum::None => "nul".to_string(),
            Datum::Integer(value) => format!("int {value}"),
            Datum::Real(value) => format!("flt {value:?}"),
            Datum::Instruction(instr) => {
                if instr.file.is_empty() || instr.file.contains(char::is_whitespace) {
                    return Err(FormatError::UnencodableFilename {
                        address,
                        file: instr.file.to_string(),
                    });
                }
                format!("ist {} {} {}", instr.id, instr.line, instr.file)
            }
            Datum::Function(_) | Datum::List(_) | Datum::Scope(_) => {
                return Err(FormatError::UnencodableDatum {
                    address,
                    tag: datum.tag(),
                })
            }
        };
        lines.push(line);
    }

    lines.push("source".to_string());
    let mut text = lines.join("\n");
    text.push('\n');
    Ok(text)
}
