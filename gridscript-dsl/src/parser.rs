//! Single-pass block parser
//!
//! Groups the token stream into ordered trigger blocks. Blocks have no
//! explicit delimiter in source: a Cause head arriving after an Effect
//! closes the active block and opens the next one. The parser performs no
//! category-order validation - malformed blocks load and are rejected at
//! execution time, where the failure can be scoped to the one block.

use gridscript_core::{
    ContentItem, ParseError, Trigger, TriggerBlock, TriggerCategory, Value, VariableKind,
};

use crate::lexer::{Lexer, Token, TokenKind};

/// Parse `source` into trigger blocks using `lexer`.
///
/// A script with no trigger heads yields no blocks. Lex errors surface as
/// `ParseError::Lex`; nothing partial is returned on any error.
pub fn parse_blocks(lexer: &Lexer, source: &str) -> Result<Vec<TriggerBlock>, ParseError> {
    let mut blocks = Vec::new();
    let mut block: Vec<Trigger> = Vec::new();
    let mut current: Option<Trigger> = None;
    let mut previous_category: Option<TriggerCategory> = None;

    for token in lexer.tokenize(source) {
        let token = token?;
        match token.kind {
            TokenKind::Trigger => {
                if let Some(trigger) = current.take() {
                    // An Effect followed by a fresh Cause ends the rule.
                    if previous_category == Some(TriggerCategory::Effect)
                        && trigger.category == TriggerCategory::Cause
                    {
                        blocks.push(TriggerBlock::new(std::mem::take(&mut block)));
                    }
                    previous_category = Some(trigger.category);
                    block.push(trigger);
                }
                current = Some(parse_trigger_head(&token)?);
            }
            TokenKind::Str => {
                let trigger = expect_current(&mut current, &token)?;
                trigger
                    .content
                    .push(ContentItem::Literal(Value::Str(strip_delimiters(
                        &token.text,
                    ))));
            }
            TokenKind::Number => {
                let trigger = expect_current(&mut current, &token)?;
                let number: f64 =
                    token
                        .text
                        .parse()
                        .map_err(|_| ParseError::InvalidNumber {
                            text: token.text.clone(),
                            line: token.position.line,
                            column: token.position.column,
                        })?;
                trigger
                    .content
                    .push(ContentItem::Literal(Value::Number(number)));
            }
            TokenKind::GlobalVariable => {
                let trigger = expect_current(&mut current, &token)?;
                trigger.content.push(ContentItem::Variable {
                    kind: VariableKind::Global,
                    key: strip_sigil(&token.text),
                });
            }
            TokenKind::PrivateVariable => {
                let trigger = expect_current(&mut current, &token)?;
                trigger.content.push(ContentItem::Variable {
                    kind: VariableKind::Private,
                    key: strip_sigil(&token.text),
                });
            }
            TokenKind::EndOfInput => {
                if let Some(trigger) = current.take() {
                    if trigger.category != TriggerCategory::Undefined {
                        block.push(trigger);
                        blocks.push(TriggerBlock::new(std::mem::take(&mut block)));
                    }
                }
            }
            // Never yielded by the lexer.
            TokenKind::Comment | TokenKind::Word | TokenKind::Symbol | TokenKind::Whitespace => {}
        }
    }

    Ok(blocks)
}

fn parse_trigger_head(token: &Token) -> Result<Trigger, ParseError> {
    let line = token.position.line;
    let column = token.position.column;

    let malformed = || ParseError::MalformedTriggerHead {
        text: token.text.clone(),
        line,
        column,
    };

    let inner = token
        .text
        .strip_prefix('(')
        .and_then(|text| text.strip_suffix(')'))
        .ok_or_else(|| malformed())?;
    let (digit_text, id_text) = inner.split_once(':').ok_or_else(|| malformed())?;

    let digit: u32 = digit_text.parse().map_err(|_| malformed())?;
    let category = TriggerCategory::from_digit(digit).ok_or(ParseError::UnknownCategory {
        digit,
        line,
        column,
    })?;
    let id: u32 = id_text.parse().map_err(|_| ParseError::InvalidTriggerId {
        text: id_text.to_string(),
        line,
        column,
    })?;

    Ok(Trigger::new(category, id).with_position(token.position))
}

fn expect_current<'a>(
    current: &'a mut Option<Trigger>,
    token: &Token,
) -> Result<&'a mut Trigger, ParseError> {
    current.as_mut().ok_or(ParseError::DanglingContent {
        line: token.position.line,
        column: token.position.column,
    })
}

/// Strip the begin/end delimiter characters of a string token.
fn strip_delimiters(text: &str) -> String {
    let mut chars = text.chars();
    chars.next();
    chars.next_back();
    chars.as_str().to_string()
}

/// Strip the leading sigil character of a variable token.
fn strip_sigil(text: &str) -> String {
    let mut chars = text.chars();
    chars.next();
    chars.as_str().to_string()
}

// ============================================================================
// TESTS
// ============================================================================
