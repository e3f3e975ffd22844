//! Lexer implementation

use gridscript_core::{ConfigError, EngineOptions, LexError, SourcePosition};
use regex::Regex;

use super::token::{Token, TokenDefinition, TokenKind};

fn build_pattern(pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|err| ConfigError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: err.to_string(),
    })
}

fn escaped(symbol: char) -> String {
    regex::escape(&symbol.to_string())
}

/// Regex-driven scanner over an ordered token definition list.
pub struct Lexer {
    definitions: Vec<TokenDefinition>,
    line_terminator: Regex,
}

impl Lexer {
    /// Build the standard definition list for the given options.
    ///
    /// Trigger heads, variable references, strings, numbers and comments
    /// are registered before the catch-all word/symbol/whitespace
    /// definitions that discard everything else.
    pub fn new(options: &EngineOptions) -> Result<Self, ConfigError> {
        options.validate()?;

        let definitions = vec![
            TokenDefinition::new(TokenKind::Trigger, build_pattern(r"\([0-9]:[0-9]+\)")?),
            TokenDefinition::new(
                TokenKind::GlobalVariable,
                build_pattern(&format!(r"{}\w+", escaped(options.global_variable_sigil)))?,
            ),
            TokenDefinition::new(
                TokenKind::PrivateVariable,
                build_pattern(&format!(r"{}\w+", escaped(options.private_variable_sigil)))?,
            ),
            TokenDefinition::new(
                TokenKind::Str,
                build_pattern(&format!(
                    r"(?s){}.*?{}",
                    escaped(options.string_begin_symbol),
                    escaped(options.string_end_symbol)
                ))?,
            ),
            TokenDefinition::new(
                TokenKind::Number,
                build_pattern(r"[-+]?([0-9]*\.[0-9]+|[0-9]+)")?,
            ),
            TokenDefinition::ignored(
                TokenKind::Comment,
                build_pattern(&format!(r"{}[^\r\n]*", escaped(options.comment_symbol)))?,
            ),
            TokenDefinition::ignored(TokenKind::Word, build_pattern(r"\w+")?),
            TokenDefinition::ignored(TokenKind::Symbol, build_pattern(r"\W")?),
            TokenDefinition::ignored(TokenKind::Whitespace, build_pattern(r"\s+")?),
        ];

        Self::with_definitions(definitions)
    }

    /// A lexer over a caller-supplied definition list.
    pub fn with_definitions(definitions: Vec<TokenDefinition>) -> Result<Self, ConfigError> {
        Ok(Self {
            definitions,
            line_terminator: build_pattern(r"\r\n|\r|\n")?,
        })
    }

    pub fn definitions(&self) -> &[TokenDefinition] {
        &self.definitions
    }

    /// Produce the lazy token stream for `source`.
    ///
    /// The stream is finite and not restartable; call `tokenize` again to
    /// re-scan from the start. It ends with a single `EndOfInput` token, or
    /// with a `LexError` if some position matches no definition.
    pub fn tokenize<'a>(&'a self, source: &'a str) -> Tokens<'a> {
        Tokens {
            lexer: self,
            source,
            offset: 0,
            line: 1,
            column: 0,
            finished: false,
        }
    }
}

/// Lazy token stream produced by [`Lexer::tokenize`].
pub struct Tokens<'a> {
    lexer: &'a Lexer,
    source: &'a str,
    offset: usize,
    line: usize,
    column: usize,
    finished: bool,
}

impl Tokens<'_> {
    /// Roll line/column forward across the matched text. The text is
    /// scanned for embedded line terminators so multi-line matches
    /// (comments, strings) track correctly.
    fn roll_position(&mut self, text: &str) {
        let mut terminators = 0;
        let mut last_end = None;
        for m in self.lexer.line_terminator.find_iter(text) {
            terminators += 1;
            last_end = Some(m.end());
        }
        match last_end {
            Some(end) => {
                self.line += terminators;
                self.column = text.len() - end;
            }
            None => self.column += text.len(),
        }
    }
}

impl Iterator for Tokens<'_> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let source = self.source;

        while self.offset < source.len() {
            let mut matched = None;
            for definition in &self.lexer.definitions {
                if let Some(m) = definition.pattern.find_at(source, self.offset) {
                    // Only a match anchored at the current position counts,
                    // and an empty match cannot advance the scan.
                    if m.start() == self.offset && !m.is_empty() {
                        matched = Some((definition, m));
                        break;
                    }
                }
            }

            let Some((definition, m)) = matched else {
                self.finished = true;
                let symbol = source[self.offset..].chars().next().unwrap_or('\u{0}');
                return Some(Err(LexError::UnrecognizedSymbol {
                    symbol,
                    offset: self.offset,
                    line: self.line,
                    column: self.column,
                }));
            };

            let position = SourcePosition {
                offset: self.offset,
                line: self.line,
                column: self.column,
            };
            let text = m.as_str();
            self.offset = m.end();
            self.roll_position(text);

            if !definition.ignored {
                return Some(Ok(Token {
                    kind: definition.kind,
                    text: text.to_string(),
                    position,
                }));
            }
        }

        self.finished = true;
        Some(Ok(Token {
            kind: TokenKind::EndOfInput,
            text: String::new(),
            position: SourcePosition {
                offset: self.offset,
                line: self.line,
                column: self.column,
            },
        }))
    }
}

// ============================================================================
// TESTS
// ============================================================================
