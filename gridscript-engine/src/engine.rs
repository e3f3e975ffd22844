//! Engine facade: options → lexer → parser → Page

use tracing::debug;

use gridscript_core::{ConfigError, EngineOptions, ParseError};
use gridscript_dsl::{parse_blocks, Lexer};

use crate::page::Page;

/// Loads scripts and produces independent [`Page`] runtimes.
///
/// The engine owns the options and the lexer built from them; every loaded
/// script gets its own Page, and pages share no state - two loaded scripts
/// never see each other's handlers or variables.
pub struct ScriptEngine {
    options: EngineOptions,
    lexer: Lexer,
}

impl ScriptEngine {
    /// An engine with the default symbol set.
    pub fn new() -> Result<Self, ConfigError> {
        Self::with_options(EngineOptions::default())
    }

    /// An engine with custom options. Fails if the symbol assignments are
    /// ambiguous.
    pub fn with_options(options: EngineOptions) -> Result<Self, ConfigError> {
        let lexer = Lexer::new(&options)?;
        Ok(Self { options, lexer })
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Tokenize and parse `source` into a fresh Page.
    ///
    /// On any lex or parse error nothing is installed - there is no
    /// partially loaded script.
    pub fn load_script(&self, source: &str) -> Result<Page, ParseError> {
        let blocks = parse_blocks(&self.lexer, source)?;
        debug!(target: "gridscript::engine", blocks = blocks.len(), "script loaded");
        Ok(Page::new(blocks, self.options.allow_handler_override))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_script_counts_blocks() {
        let engine = ScriptEngine::new().expect("default engine");
        let page = engine
            .load_script("(0:1)(5:2)(0:3)(5:4)")
            .expect("script loads");
        assert_eq!(page.block_count(), 2);
    }

    #[test]
    fn test_load_error_produces_no_page() {
        let engine = ScriptEngine::new().expect("default engine");
        let err = engine.load_script("(9:1)").expect_err("unknown category");
        assert!(matches!(err, ParseError::UnknownCategory { digit: 9, .. }));
    }

    #[test]
    fn test_invalid_options_rejected() {
        let options = EngineOptions {
            global_variable_sigil: '%',
            ..EngineOptions::default()
        };
        assert!(matches!(
            ScriptEngine::with_options(options),
            Err(ConfigError::AmbiguousSymbols { .. })
        ));
    }

    #[test]
    fn test_pages_are_independent() {
        let engine = ScriptEngine::new().expect("default engine");
        let first = engine.load_script("(0:1)(5:2)").expect("loads");
        let second = engine.load_script("(0:1)(5:2)").expect("loads");

        first.set_global_variable("x", 1);
        assert_eq!(second.global_variable("x"), None);

        first
            .set_trigger_handler(crate::TriggerCategory::Effect, 2, |_, _, _| true)
            .expect("registration on first page");
        // The same key is still free on the second page.
        second
            .set_trigger_handler(crate::TriggerCategory::Effect, 2, |_, _, _| true)
            .expect("registration on second page");
    }
}
