//! Engine configuration

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Options controlling script syntax and handler registration.
///
/// The symbol options feed straight into the lexer's token definitions, so
/// a host can re-skin the surface syntax without touching the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineOptions {
    /// Allow a later registration to replace an existing trigger handler.
    /// Default: false
    pub allow_handler_override: bool,
    /// Opening string literal delimiter. Default: `{`
    pub string_begin_symbol: char,
    /// Closing string literal delimiter. Default: `}`
    pub string_end_symbol: char,
    /// Global variable reference sigil. Default: `~`
    pub global_variable_sigil: char,
    /// Private variable reference sigil. Default: `%`
    pub private_variable_sigil: char,
    /// Comment-to-end-of-line symbol. Default: `*`
    pub comment_symbol: char,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            allow_handler_override: false,
            string_begin_symbol: '{',
            string_end_symbol: '}',
            global_variable_sigil: '~',
            private_variable_sigil: '%',
            comment_symbol: '*',
        }
    }
}

impl EngineOptions {
    /// Reject symbol assignments that would make token classes ambiguous.
    ///
    /// The string end delimiter may equal the begin delimiter (quote-style
    /// strings); every other collision would let one token class swallow
    /// another.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let pairs = [
            (self.global_variable_sigil, self.private_variable_sigil),
            (self.comment_symbol, self.global_variable_sigil),
            (self.comment_symbol, self.private_variable_sigil),
            (self.string_begin_symbol, self.global_variable_sigil),
            (self.string_begin_symbol, self.private_variable_sigil),
            (self.string_begin_symbol, self.comment_symbol),
        ];
        for (symbol_a, symbol_b) in pairs {
            if symbol_a == symbol_b {
                return Err(ConfigError::AmbiguousSymbols { symbol_a, symbol_b });
            }
        }
        Ok(())
    }
}
