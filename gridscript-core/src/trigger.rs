//! Trigger clauses and trigger blocks
//!
//! A script is an ordered list of blocks; a block is one Cause clause
//! followed by its Condition/Area/Filter/Effect clauses. Stored blocks are
//! immutable after load - all per-execution state lives in the engine.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::BlockViolation;
use crate::variable::{Value, VariableKind};

// ============================================================================
// SOURCE POSITIONS
// ============================================================================

/// Location of a token or clause in script source.
///
/// `line` is 1-based, `column` is a 0-based byte offset within the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcePosition {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Default for SourcePosition {
    fn default() -> Self {
        Self {
            offset: 0,
            line: 1,
            column: 0,
        }
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

// ============================================================================
// CATEGORIES
// ============================================================================

/// Category of a trigger clause, written as the leading digit of a
/// `(category:id)` head.
///
/// Categories are ranked; a block's non-head clauses must appear in
/// non-decreasing rank order. The digit space leaves a gap at 2 between
/// Condition and Area; the set is fixed at five stages for the pipeline.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum TriggerCategory {
    /// Placeholder for a clause whose head has not been parsed.
    /// Never appears in a committed block.
    #[default]
    Undefined,
    /// Entry gate of a block, matched against an external event id.
    Cause,
    /// Boolean gate evaluated after the cause.
    Condition,
    /// Produces a set of grid points for later clauses.
    Area,
    /// Narrows a previously established area.
    Filter,
    /// Terminal action, runs once all preceding gates pass.
    Effect,
}

impl TriggerCategory {
    /// Map a head digit to its category. Digit 2 is reserved and unknown
    /// digits are rejected by the parser.
    pub fn from_digit(digit: u32) -> Option<Self> {
        match digit {
            0 => Some(Self::Cause),
            1 => Some(Self::Condition),
            3 => Some(Self::Area),
            4 => Some(Self::Filter),
            5 => Some(Self::Effect),
            _ => None,
        }
    }

    /// The digit written in script source, if the category has one.
    pub fn digit(self) -> Option<u32> {
        match self {
            Self::Undefined => None,
            Self::Cause => Some(0),
            Self::Condition => Some(1),
            Self::Area => Some(3),
            Self::Filter => Some(4),
            Self::Effect => Some(5),
        }
    }
}

impl fmt::Display for TriggerCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Undefined => "Undefined",
            Self::Cause => "Cause",
            Self::Condition => "Condition",
            Self::Area => "Area",
            Self::Filter => "Filter",
            Self::Effect => "Effect",
        };
        f.write_str(name)
    }
}

// ============================================================================
// IDENTITY
// ============================================================================

/// Registry identity of a trigger: the `(category, id)` pair.
///
/// Handler lookup is keyed by this value; clause content is not part of
/// identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TriggerKey {
    pub category: TriggerCategory,
    pub id: u32,
}

impl TriggerKey {
    pub const fn new(category: TriggerCategory, id: u32) -> Self {
        Self { category, id }
    }
}

impl fmt::Display for TriggerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.category.digit() {
            Some(digit) => write!(f, "({}:{})", digit, self.id),
            None => write!(f, "(?:{})", self.id),
        }
    }
}

impl From<&Trigger> for TriggerKey {
    fn from(trigger: &Trigger) -> Self {
        Self::new(trigger.category, trigger.id)
    }
}

// ============================================================================
// CLAUSES
// ============================================================================

/// One literal or deferred variable reference in a clause's content queue.
///
/// Variable references are resolved at evaluation time, never at parse
/// time - the same script may run against different entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ContentItem {
    Literal(Value),
    Variable { kind: VariableKind, key: String },
}

/// One parsed clause: a category, a numeric id and ordered content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    pub category: TriggerCategory,
    pub id: u32,
    /// Literals and variable references in source order.
    pub content: Vec<ContentItem>,
    /// Position of the head token, for diagnostics.
    pub position: SourcePosition,
}

impl Trigger {
    pub fn new(category: TriggerCategory, id: u32) -> Self {
        Self {
            category,
            id,
            content: Vec::new(),
            position: SourcePosition::default(),
        }
    }

    pub fn with_position(mut self, position: SourcePosition) -> Self {
        self.position = position;
        self
    }

    pub fn key(&self) -> TriggerKey {
        TriggerKey::new(self.category, self.id)
    }
}

// ============================================================================
// BLOCKS
// ============================================================================

/// One executable rule: a Cause clause plus its ordered
/// Condition/Area/Filter/Effect clauses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TriggerBlock {
    pub triggers: Vec<Trigger>,
}

impl TriggerBlock {
    pub fn new(triggers: Vec<Trigger>) -> Self {
        Self { triggers }
    }

    /// The head clause, if it is a well-formed Cause.
    pub fn cause(&self) -> Option<&Trigger> {
        self.triggers
            .first()
            .filter(|trigger| trigger.category == TriggerCategory::Cause)
    }

    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Trigger> {
        self.triggers.iter()
    }

    /// Check the structural invariants: non-empty, head is the only Cause,
    /// and non-head categories are non-decreasing in rank.
    ///
    /// The parser deliberately skips this so malformed scripts still load;
    /// the engine runs it before evaluating a block.
    pub fn validate(&self) -> Result<(), BlockViolation> {
        let head = self.triggers.first().ok_or(BlockViolation::Empty)?;
        if head.category != TriggerCategory::Cause {
            return Err(BlockViolation::HeadNotCause {
                found: head.category,
            });
        }

        let mut previous = TriggerCategory::Cause;
        for (index, trigger) in self.triggers.iter().enumerate().skip(1) {
            if trigger.category == TriggerCategory::Cause {
                return Err(BlockViolation::SiblingCause { index });
            }
            if trigger.category < previous {
                return Err(BlockViolation::CategoryOrder {
                    index,
                    previous,
                    found: trigger.category,
                });
            }
            previous = trigger.category;
        }
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
