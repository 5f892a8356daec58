//! Error types for the bytecode loader.

use calcvm_common::Tag;
use thiserror::Error;

/// Errors produced while decoding or encoding the textual record format.
///
/// Decoding errors carry the zero-based record index and the one-based text
/// line of the offending record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// A record began with a tag the format does not define.
    #[error("record {record} (line {line}): unknown record tag '{tag}'")]
    UnknownRecord {
        record: usize,
        line: usize,
        tag: String,
    },

    /// A record ended before all of its fields were read.
    #[error("record {record} (line {line}): '{tag}' is missing its {field}")]
    MissingField {
        record: usize,
        line: usize,
        tag: &'static str,
        field: &'static str,
    },

    /// A numeric field could not be parsed or is out of range.
    #[error("record {record} (line {line}): invalid number '{token}'")]
    InvalidNumber {
        record: usize,
        line: usize,
        token: String,
    },

    /// The instruction array would grow past its capacity.
    #[error("program exceeds the capacity of {capacity} records")]
    CapacityExceeded { capacity: usize },

    /// Input ended before the `source` terminator.
    #[error("missing 'source' terminator after {records} records")]
    MissingTerminator { records: usize },

    /// The datum has no record form (functions, lists, scopes).
    #[error("cannot encode {tag} at address {address}")]
    UnencodableDatum { address: usize, tag: Tag },

    /// The filename would not survive whitespace tokenisation.
    #[error("cannot encode filename '{file}' at address {address}")]
    UnencodableFilename { address: usize, file: String },
}
