//! Lexer token types

use gridscript_core::SourcePosition;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Token kinds for the gridscript surface syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    /// A `(category:id)` trigger head.
    Trigger,
    /// A delimited string literal.
    Str,
    /// A numeric literal.
    Number,
    /// Global variable reference: sigil followed by an identifier.
    GlobalVariable,
    /// Private variable reference: sigil followed by an identifier.
    PrivateVariable,
    /// Comment to end of line. Consumed, never yielded.
    Comment,
    /// Insignificant word run. Consumed, never yielded.
    Word,
    /// Insignificant punctuation. Consumed, never yielded.
    Symbol,
    /// Whitespace. Consumed, never yielded.
    Whitespace,
    /// End of source; always the final token of a stream.
    EndOfInput,
}

/// A single scanned token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub position: SourcePosition,
}

/// One entry in the lexer's ordered definition list.
///
/// Definitions are tried in registration order at each scan position and
/// the first whose pattern matches at exactly the current offset wins, so
/// registration order is the precedence mechanism: specific patterns come
/// before the catch-all word/symbol/whitespace definitions.
#[derive(Debug, Clone)]
pub struct TokenDefinition {
    pub kind: TokenKind,
    pub pattern: Regex,
    pub ignored: bool,
}

impl TokenDefinition {
    /// A definition whose matches are yielded to the parser.
    pub fn new(kind: TokenKind, pattern: Regex) -> Self {
        Self {
            kind,
            pattern,
            ignored: false,
        }
    }

    /// A definition whose matches advance the scan but are discarded.
    pub fn ignored(kind: TokenKind, pattern: Regex) -> Self {
        Self {
            kind,
            pattern,
            ignored: true,
        }
    }
}
