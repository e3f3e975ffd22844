//! Error types for gridscript operations
//!
//! Lexer/parser errors abort the load of a script - no partial rule set is
//! ever installed. Execution errors are scoped to a single block and
//! surfaced in the execution summary; variable errors propagate to the
//! calling handler. Nothing is silently dropped.

use thiserror::Error;

use crate::trigger::{TriggerCategory, TriggerKey};

/// Tokenization errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LexError {
    #[error("unrecognized symbol '{symbol}' at offset {offset} (line {line}, column {column})")]
    UnrecognizedSymbol {
        symbol: char,
        offset: usize,
        line: usize,
        column: usize,
    },
}

/// Script parsing errors.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ParseError {
    #[error("lex error: {0}")]
    Lex(#[from] LexError),

    #[error("malformed trigger head '{text}' at line {line}, column {column}")]
    MalformedTriggerHead {
        text: String,
        line: usize,
        column: usize,
    },

    #[error("unknown trigger category {digit} at line {line}, column {column}")]
    UnknownCategory {
        digit: u32,
        line: usize,
        column: usize,
    },

    #[error("trigger id '{text}' out of range at line {line}, column {column}")]
    InvalidTriggerId {
        text: String,
        line: usize,
        column: usize,
    },

    #[error("invalid number '{text}' at line {line}, column {column}")]
    InvalidNumber {
        text: String,
        line: usize,
        column: usize,
    },

    #[error("content at line {line}, column {column} precedes any trigger head")]
    DanglingContent { line: usize, column: usize },
}

/// Handler registration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("a trigger handler for {key} already exists")]
    DuplicateHandler { key: TriggerKey },
}

/// A structural invariant a stored block can violate.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum BlockViolation {
    #[error("block has no clauses")]
    Empty,

    #[error("block head is {found}, expected Cause")]
    HeadNotCause { found: TriggerCategory },

    #[error("sibling cause at clause {index}")]
    SiblingCause { index: usize },

    #[error("category order violated at clause {index}: {found} after {previous}")]
    CategoryOrder {
        index: usize,
        previous: TriggerCategory,
        found: TriggerCategory,
    },
}

/// Block execution errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExecError {
    #[error("no handler registered for {key}")]
    MissingHandler { key: TriggerKey },

    #[error("malformed block {block}: {violation}")]
    MalformedBlock {
        block: usize,
        violation: BlockViolation,
    },
}

/// Content access and variable resolution errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VariableError {
    #[error("content index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("cannot convert content {index} to {expected}: '{found}'")]
    TypeConversion {
        index: usize,
        expected: &'static str,
        found: String,
    },

    #[error("global variable '{key}' is not set")]
    GlobalNotFound { key: String },

    #[error("private variable '{key}' was not resolved")]
    PrivateNotFound { key: String },

    #[error("private variable '{key}' referenced but no resolver is installed")]
    NoResolver { key: String },

    #[error("content index {index} is not a variable")]
    NotAVariable { index: usize },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("ambiguous symbol configuration: '{symbol_a}' conflicts with '{symbol_b}'")]
    AmbiguousSymbols { symbol_a: char, symbol_b: char },

    #[error("invalid token pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

/// Master error type for all gridscript errors.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ScriptError {
    #[error("lex error: {0}")]
    Lex(#[from] LexError),

    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("execution error: {0}")]
    Exec(#[from] ExecError),

    #[error("variable error: {0}")]
    Variable(#[from] VariableError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for gridscript operations.
pub type ScriptResult<T> = Result<T, ScriptError>;

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lex_error_display() {
        let err = LexError::UnrecognizedSymbol {
            symbol: '@',
            offset: 12,
            line: 2,
            column: 4,
        };
        let msg = err.to_string();
        assert!(msg.contains('@'));
        assert!(msg.contains("line 2"));
        assert!(msg.contains("column 4"));
    }

    #[test]
    fn test_parse_error_wraps_lex_error() {
        let err = ParseError::from(LexError::UnrecognizedSymbol {
            symbol: '#',
            offset: 0,
            line: 1,
            column: 0,
        });
        assert!(matches!(err, ParseError::Lex(_)));
        assert!(err.to_string().contains("unrecognized symbol"));
    }

    #[test]
    fn test_registry_error_display() {
        let err = RegistryError::DuplicateHandler {
            key: TriggerKey::new(TriggerCategory::Condition, 12),
        };
        assert!(err.to_string().contains("(1:12)"));
    }

    #[test]
    fn test_exec_error_display_missing_handler() {
        let err = ExecError::MissingHandler {
            key: TriggerKey::new(TriggerCategory::Effect, 254),
        };
        assert!(err.to_string().contains("(5:254)"));
    }

    #[test]
    fn test_exec_error_display_malformed_block() {
        let err = ExecError::MalformedBlock {
            block: 3,
            violation: BlockViolation::SiblingCause { index: 1 },
        };
        let msg = err.to_string();
        assert!(msg.contains("block 3"));
        assert!(msg.contains("sibling cause"));
    }

    #[test]
    fn test_variable_error_display() {
        let err = VariableError::TypeConversion {
            index: 0,
            expected: "integer",
            found: "10.5".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("integer"));
        assert!(msg.contains("10.5"));
    }

    #[test]
    fn test_script_error_from_variants() {
        let parse = ScriptError::from(ParseError::DanglingContent { line: 1, column: 0 });
        assert!(matches!(parse, ScriptError::Parse(_)));

        let registry = ScriptError::from(RegistryError::DuplicateHandler {
            key: TriggerKey::new(TriggerCategory::Cause, 1),
        });
        assert!(matches!(registry, ScriptError::Registry(_)));

        let variable = ScriptError::from(VariableError::GlobalNotFound {
            key: "x".to_string(),
        });
        assert!(matches!(variable, ScriptError::Variable(_)));

        let config = ScriptError::from(ConfigError::AmbiguousSymbols {
            symbol_a: '~',
            symbol_b: '~',
        });
        assert!(matches!(config, ScriptError::Config(_)));
    }
}
