//! Record decoder: tokens → instruction array.
//!
//! Record forms:
//!
//! ```text
//! int <i64>
//! flt <f64>
//! ist <opcode_id> <line> <filename>
//! str <token>      reserved, decodes to none
//! nul              decodes to none
//! source           terminator
//! ```
//!
//! An unknown tag stops decoding. Skipping it would shift every later
//! record by one slot and silently corrupt jump targets.

use crate::error::FormatError;
use crate::lexer::{Lexer, Token};
use calcvm_common::{Datum, Instruction, Program};
use std::collections::HashMap;
use std::rc::Rc;
use std::str::FromStr;

/// Header tag written by the compiler's dumper on the first line.
const HEADER_TAG: &str = "bytecode";

/// What one record decodes to.
#[derive(Debug)]
enum Record {
    Datum(Datum),
    Terminator,
}

pub(crate) struct Decoder<'a> {
    lexer: Lexer<'a>,
    /// Index of the record currently being decoded.
    record: usize,
    /// Interned filenames; one allocation per distinct name.
    files: HashMap<&'a str, Rc<str>>,
}

impl<'a> Decoder<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Self {
            lexer: Lexer::new(text),
            record: 0,
            files: HashMap::new(),
        }
    }

    /// Decode every record up to `source`, failing once more than
    /// `capacity` datums would be produced.
    pub(crate) fn decode(mut self, capacity: usize) -> Result<Program, FormatError> {
        let mut code = Vec::new();
        let mut first = true;

        loop {
            let Some(token) = self.lexer.next() else {
                return Err(FormatError::MissingTerminator {
                    records: self.record,
                });
            };

            if first && token.text == HEADER_TAG {
                first = false;
                self.lexer.skip_line();
                continue;
            }
            first = false;

            match self.decode_record(token)? {
                Record::Terminator => break,
                Record::Datum(datum) => {
                    if code.len() >= capacity {
                        return Err(FormatError::CapacityExceeded { capacity });
                    }
                    code.push(datum);
                    self.record += 1;
                }
            }
        }

        Ok(Program::new(code))
    }

    fn decode_record(&mut self, tag: Token<'a>) -> Result<Record, FormatError> {
        let datum = match tag.text {
            "int" => Datum::Integer(self.number(&tag, "int", "value")?),
            "flt" => Datum::Real(self.number(&tag, "flt", "value")?),
            "ist" => {
                let id = self.number(&tag, "ist", "opcode id")?;
                let line = self.number(&tag, "ist", "line number")?;
                let file = self.field(&tag, "ist", "filename")?;
                let file = self.intern(file.text);
                Datum::Instruction(Instruction::new(id, line, file))
            }
            "str" => {
                self.field(&tag, "str", "token")?;
                Datum::None
            }
            "nul" => Datum::None,
            "source" => return Ok(Record::Terminator),
            other => {
                return Err(FormatError::UnknownRecord {
                    record: self.record,
                    line: tag.line,
                    tag: other.to_string(),
                })
            }
        };
        Ok(Record::Datum(datum))
    }

    fn field(
        &mut self,
        tag: &Token<'a>,
        name: &'static str,
        field: &'static str,
    ) -> Result<Token<'a>, FormatError> {
        self.lexer.next().ok_or(FormatError::MissingField {
            record: self.record,
            line: tag.line,
            tag: name,
            field,
        })
    }

    fn number<T: FromStr>(
        &mut self,
        tag: &Token<'a>,
        name: &'static str,
        field: &'static str,
    ) -> Result<T, FormatError> {
        let token = self.field(tag, name, field)?;
        token.text.parse().map_err(|_| FormatError::InvalidNumber {
            record: self.record,
            line: token.line,
            token: token.text.to_string(),
        })
    }

    fn intern(&mut self, file: &'a str) -> Rc<str> {
        Rc::clone(self.files.entry(file).or_insert_with(|| Rc::from(file)))
    }
}
