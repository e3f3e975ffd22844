//! Gridscript Engine - rule execution runtime
//!
//! Owns parsed trigger blocks, the handler registry and the global
//! variable store; evaluates blocks against host events:
//!
//! ```text
//! ScriptEngine::load_script(text) → Page
//! host event → Page::execute(entity, args, cause_ids)
//!     → cause gate → conditions → areas → filters → effects
//! ```
//!
//! The engine attaches no meaning to any trigger id - hosts register a
//! handler per `(category, id)` pair and the pipeline short-circuits on the
//! first gate that fails. Variable references in clause content resolve at
//! read time against the page's global store or the host's private
//! resolver.
//!
//! # Example
//!
//! ```
//! use gridscript_engine::{ScriptEngine, TriggerCategory};
//!
//! let engine = ScriptEngine::new()?;
//! let page = engine.load_script("(0:66) on move, (5:254) place a block")?;
//!
//! page.set_trigger_handler(TriggerCategory::Effect, 254, |scope, _entity, _args| {
//!     for point in scope.area().iter() {
//!         let _ = point;
//!     }
//!     true
//! })?;
//!
//! let summary = page.execute(None, None, &[66]);
//! assert_eq!(summary.completed, 1);
//! # Ok::<(), gridscript_core::ScriptError>(())
//! ```

pub mod engine;
pub mod handler;
pub mod page;

pub use engine::ScriptEngine;
pub use handler::{Payload, PrivateVariableResolver, TriggerHandler, TriggerScope};
pub use page::{BlockFault, BlockOutcome, BlockRecord, ExecutionSummary, Halted, Page};

// Commonly used core types, re-exported for hosts.
pub use gridscript_core::{
    Area, EngineOptions, Point, Trigger, TriggerCategory, TriggerKey, Value,
};
