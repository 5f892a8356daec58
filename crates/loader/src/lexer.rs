//! Tokenizer for the textual record format.
//!
//! Records are whitespace-delimited and may wrap across lines, so the lexer
//! yields a flat stream of words, each tagged with its one-based line. It is
//! lazy: whatever follows the `source` terminator is never scanned.

use std::iter::Enumerate;
use std::str::{Lines, SplitWhitespace};

/// A single whitespace-delimited word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Token<'a> {
    pub text: &'a str,
    pub line: usize,
}

/// Lazy word stream over the input text.
pub(crate) struct Lexer<'a> {
    lines: Enumerate<Lines<'a>>,
    words: SplitWhitespace<'a>,
    line: usize,
}

impl<'a> Lexer<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().enumerate(),
            words: "".split_whitespace(),
            line: 0,
        }
    }

    /// Drop the rest of the current line.
    pub(crate) fn skip_line(&mut self) {
        self.words = "".split_whitespace();
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        loop {
            if let Some(text) = self.words.next() {
                return Some(Token {
                    text,
                    line: self.line,
                });
            }
            let (idx, line) = self.lines.next()?;
            self.line = idx + 1;
            self.words = line.split_whitespace();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(text: &str) -> Vec<(&str, usize)> {
        Lexer::new(text).map(|t| (t.text, t.line)).collect()
    }

    #[test]
    fn empty_input() {
        assert!(words("").is_empty());
    }

    #[test]
    fn whitespace_only() {
        assert!(words("   \n\t \n").is_empty());
    }

    #[test]
    fn words_carry_line_numbers() {
        assert_eq!(
            words("int 5\nist 19 2 main"),
            vec![
                ("int", 1),
                ("5", 1),
                ("ist", 2),
                ("19", 2),
                ("2", 2),
                ("main", 2),
            ]
        );
    }

    #[test]
    fn blank_lines_are_counted() {
        assert_eq!(words("\n\nsource"), vec![("source", 3)]);
    }

    #[test]
    fn records_may_wrap_lines() {
        assert_eq!(words("int\n  42"), vec![("int", 1), ("42", 2)]);
    }

    #[test]
    fn skip_line_discards_rest_of_line() {
        let mut lexer = Lexer::new("bytecode 0 0 0 (unstable)\nint 1");
        assert_eq!(lexer.next().map(|t| t.text), Some("bytecode"));
        lexer.skip_line();
        assert_eq!(lexer.next(), Some(Token { text: "int", line: 2 }));
    }

    #[test]
    fn crlf_line_endings() {
        assert_eq!(words("int 1\r\nsource\r\n"), vec![("int", 1), ("1", 1), ("source", 2)]);
    }
}
