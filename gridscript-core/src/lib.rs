//! Gridscript Core - Shared Data Types
//!
//! Pure data structures with no behavior beyond construction, validation
//! and conversion. The lexer/parser crate and the execution engine both
//! depend on this; it depends on nothing but serde and thiserror.

pub mod area;
pub mod config;
pub mod error;
pub mod trigger;
pub mod variable;

pub use area::{Area, Point};
pub use config::EngineOptions;
pub use error::{
    BlockViolation, ConfigError, ExecError, LexError, ParseError, RegistryError, ScriptError,
    ScriptResult, VariableError,
};
pub use trigger::{
    ContentItem, SourcePosition, Trigger, TriggerBlock, TriggerCategory, TriggerKey,
};
pub use variable::{Value, VariableKind};
