//! The Page runtime
//!
//! A Page owns the blocks of one loaded script, the handler registry and
//! the global variable store. Blocks are appended once at load and never
//! mutated; the registry and variable store live behind RwLocks so hosts
//! that deliver events from several threads can share a Page. Handler
//! lookup clones the handler `Arc` and releases the guard before invoking
//! it, so handlers may re-enter page operations freely.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, trace};

use gridscript_core::{
    Area, BlockViolation, ExecError, RegistryError, Trigger, TriggerBlock, TriggerCategory,
    TriggerKey, Value, VariableError,
};

use crate::handler::{Payload, PrivateVariableResolver, TriggerHandler, TriggerScope};

// A poisoned guard means a handler panicked mid-call. The guarded maps are
// never left logically inconsistent by that, so recover the data instead of
// turning one bad handler into a permanently dead page.
fn read_lock<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write_lock<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// One loaded script: trigger blocks, handlers and variables.
pub struct Page {
    blocks: Vec<TriggerBlock>,
    handlers: RwLock<HashMap<TriggerKey, TriggerHandler>>,
    globals: RwLock<HashMap<String, Value>>,
    resolver: RwLock<Option<PrivateVariableResolver>>,
    allow_handler_override: bool,
}

// Handlers and the resolver are `Arc<dyn Fn ...>`, which are not `Debug`, so
// `Page` cannot derive it. This manual impl reports the structural counts tests
// need (e.g. `expect_err`) without touching the un-printable closures.
impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page")
            .field("blocks", &self.blocks.len())
            .field("handlers", &read_lock(&self.handlers).len())
            .field("globals", &read_lock(&self.globals).len())
            .field("has_resolver", &read_lock(&self.resolver).is_some())
            .field("allow_handler_override", &self.allow_handler_override)
            .finish()
    }
}

impl Page {
    pub(crate) fn new(blocks: Vec<TriggerBlock>, allow_handler_override: bool) -> Self {
        Self {
            blocks,
            handlers: RwLock::new(HashMap::new()),
            globals: RwLock::new(HashMap::new()),
            resolver: RwLock::new(None),
            allow_handler_override,
        }
    }

    pub fn blocks(&self) -> &[TriggerBlock] {
        &self.blocks
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Register a handler for the `(category, id)` pair.
    ///
    /// Fails with `DuplicateHandler` when one is already bound and the
    /// engine was not configured to allow overrides; with overrides
    /// enabled the new handler replaces the old one.
    pub fn set_trigger_handler<F>(
        &self,
        category: TriggerCategory,
        id: u32,
        handler: F,
    ) -> Result<(), RegistryError>
    where
        F: Fn(&mut TriggerScope<'_>, Option<&Payload>, Option<&Payload>) -> bool
            + Send
            + Sync
            + 'static,
    {
        let key = TriggerKey::new(category, id);
        let mut handlers = write_lock(&self.handlers);
        if handlers.contains_key(&key) && !self.allow_handler_override {
            return Err(RegistryError::DuplicateHandler { key });
        }
        handlers.insert(key, Arc::new(handler));
        Ok(())
    }

    /// Remove the handler for the `(category, id)` pair, if any.
    pub fn remove_trigger_handler(&self, category: TriggerCategory, id: u32) -> bool {
        write_lock(&self.handlers)
            .remove(&TriggerKey::new(category, id))
            .is_some()
    }

    /// Upsert a global variable: updates in place if the key exists.
    pub fn set_global_variable(&self, key: impl Into<String>, value: impl Into<Value>) {
        write_lock(&self.globals).insert(key.into(), value.into());
    }

    pub fn global_variable(&self, key: &str) -> Option<Value> {
        read_lock(&self.globals).get(key).cloned()
    }

    /// Install the host callback used to resolve private variable
    /// references. Replaces any previous resolver.
    pub fn set_private_variable_resolver<F>(&self, resolver: F)
    where
        F: Fn(&Trigger, Option<&Payload>, &str) -> Option<Value> + Send + Sync + 'static,
    {
        *write_lock(&self.resolver) = Some(Arc::new(resolver));
    }

    pub(crate) fn resolve_private(
        &self,
        node: &Trigger,
        entity: Option<&Payload>,
        key: &str,
    ) -> Result<Value, VariableError> {
        let resolver = read_lock(&self.resolver).clone();
        match resolver {
            None => Err(VariableError::NoResolver {
                key: key.to_string(),
            }),
            Some(resolver) => {
                resolver(node, entity, key).ok_or_else(|| VariableError::PrivateNotFound {
                    key: key.to_string(),
                })
            }
        }
    }

    fn handler(&self, key: TriggerKey) -> Option<TriggerHandler> {
        read_lock(&self.handlers).get(&key).cloned()
    }

    /// Run every stored block whose head id matches one of `cause_ids`.
    ///
    /// Blocks are tried in load order per requested cause id; all matches
    /// run, there is no early exit across blocks. Failures (missing
    /// handlers, malformed blocks) are collected per block and never stop
    /// the remaining blocks or cause ids.
    pub fn execute(
        &self,
        entity: Option<&Payload>,
        args: Option<&Payload>,
        cause_ids: &[u32],
    ) -> ExecutionSummary {
        let mut summary = ExecutionSummary::default();

        for &cause_id in cause_ids {
            for (index, block) in self.blocks.iter().enumerate() {
                let head_matches = block
                    .triggers
                    .first()
                    .is_some_and(|head| head.id == cause_id);
                if !head_matches {
                    continue;
                }

                summary.matched += 1;
                match self.run_block(index, block, cause_id, entity, args) {
                    Ok(record) => {
                        if record.outcome == BlockOutcome::Completed {
                            summary.completed += 1;
                        }
                        summary.runs.push(record);
                    }
                    Err(error) => {
                        debug!(target: "gridscript::exec", block = index, %error, "block faulted");
                        summary.faults.push(BlockFault {
                            block_index: index,
                            cause_id,
                            error,
                        });
                    }
                }
            }
        }

        summary
    }

    fn run_block(
        &self,
        index: usize,
        block: &TriggerBlock,
        cause_id: u32,
        entity: Option<&Payload>,
        args: Option<&Payload>,
    ) -> Result<BlockRecord, ExecError> {
        block
            .validate()
            .map_err(|violation| ExecError::MalformedBlock {
                block: index,
                violation,
            })?;
        debug!(target: "gridscript::exec", block = index, cause = cause_id, "evaluating block");

        let (head, rest) = block
            .triggers
            .split_first()
            .ok_or(ExecError::MalformedBlock {
                block: index,
                violation: BlockViolation::Empty,
            })?;

        let mut record = BlockRecord::new(index, cause_id);
        let mut area = Area::new();

        let halted = self.walk_block(index, head, rest, entity, args, &mut record, &mut area)?;
        if let Some(halted) = halted {
            record.outcome = BlockOutcome::Halted(halted);
        }
        record.area = area;
        Ok(record)
    }

    /// Walk a validated block's clauses, short-circuiting on the first gate
    /// that fails. Returns where evaluation halted, or None if the whole
    /// block ran.
    #[allow(clippy::too_many_arguments)]
    fn walk_block(
        &self,
        index: usize,
        head: &Trigger,
        rest: &[Trigger],
        entity: Option<&Payload>,
        args: Option<&Payload>,
        record: &mut BlockRecord,
        area: &mut Area,
    ) -> Result<Option<Halted>, ExecError> {
        let mut area_established = false;

        // A cause with no handler registered is implicitly true; it is the
        // one category with a non-failing default.
        if let Some(handler) = self.handler(head.key()) {
            let mut scope = TriggerScope::new(head, entity, args, self, area);
            if !handler(&mut scope, entity, args) {
                return Ok(Some(Halted::Cause));
            }
        }

        for (offset, node) in rest.iter().enumerate() {
            let key = node.key();
            trace!(target: "gridscript::exec", node = %key, "dispatch");

            let Some(handler) = self.handler(key) else {
                return Err(ExecError::MissingHandler { key });
            };

            match node.category {
                TriggerCategory::Condition => {
                    let mut scope = TriggerScope::new(node, entity, args, self, area);
                    if !handler(&mut scope, entity, args) {
                        return Ok(Some(Halted::Condition(key)));
                    }
                    record.conditions.push(key);
                }
                TriggerCategory::Area => {
                    let mut scope = TriggerScope::new(node, entity, args, self, area);
                    if !handler(&mut scope, entity, args) {
                        return Ok(Some(Halted::Area(key)));
                    }
                    area_established = true;
                    record.areas.push(key);
                }
                TriggerCategory::Filter => {
                    if !area_established {
                        return Ok(Some(Halted::FilterWithoutArea(key)));
                    }
                    let mut scope = TriggerScope::new(node, entity, args, self, area);
                    if !handler(&mut scope, entity, args) {
                        return Ok(Some(Halted::Filter(key)));
                    }
                    record.filters.push(key);
                }
                TriggerCategory::Effect => {
                    if !area_established {
                        // No Area clause ran: effects see the empty default,
                        // not scratch left behind by earlier handlers.
                        area.clear();
                    }
                    let mut scope = TriggerScope::new(node, entity, args, self, area);
                    handler(&mut scope, entity, args);
                    record.effects.push(key);
                }
                TriggerCategory::Cause | TriggerCategory::Undefined => {
                    // validate() rejects these up front; a stray one here
                    // means the block was mutated out from under us.
                    return Err(ExecError::MalformedBlock {
                        block: index,
                        violation: BlockViolation::SiblingCause { index: offset + 1 },
                    });
                }
            }
        }

        Ok(None)
    }
}

// ============================================================================
// EXECUTION RECORDS
// ============================================================================

/// Which gate halted a block, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Halted {
    Cause,
    Condition(TriggerKey),
    Area(TriggerKey),
    Filter(TriggerKey),
    /// A Filter clause ran before any Area clause established points.
    FilterWithoutArea(TriggerKey),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockOutcome {
    Completed,
    Halted(Halted),
}

/// Introspection record for one evaluated block: which clauses passed each
/// stage and the final area. This is the bookkeeping the original design
/// kept on the terminal clause, moved to per-run state.
#[derive(Debug, Clone)]
pub struct BlockRecord {
    pub block_index: usize,
    pub cause_id: u32,
    pub outcome: BlockOutcome,
    pub conditions: Vec<TriggerKey>,
    pub areas: Vec<TriggerKey>,
    pub filters: Vec<TriggerKey>,
    pub effects: Vec<TriggerKey>,
    /// The working area when the block finished or halted.
    pub area: Area,
}

impl BlockRecord {
    fn new(block_index: usize, cause_id: u32) -> Self {
        Self {
            block_index,
            cause_id,
            outcome: BlockOutcome::Completed,
            conditions: Vec::new(),
            areas: Vec::new(),
            filters: Vec::new(),
            effects: Vec::new(),
            area: Area::new(),
        }
    }
}

/// A per-block failure surfaced by `execute`.
#[derive(Debug, Clone)]
pub struct BlockFault {
    pub block_index: usize,
    pub cause_id: u32,
    pub error: ExecError,
}

/// Result of one `Page::execute` call.
#[derive(Debug, Clone, Default)]
pub struct ExecutionSummary {
    /// Blocks whose head id matched a requested cause id.
    pub matched: usize,
    /// Blocks that ran to completion.
    pub completed: usize,
    /// Per-block run records, in evaluation order.
    pub runs: Vec<BlockRecord>,
    /// Per-block failures. One block's fault never stops the others.
    pub faults: Vec<BlockFault>,
}

impl ExecutionSummary {
    pub fn is_clean(&self) -> bool {
        self.faults.is_empty()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use gridscript_core::Trigger;

    fn cause_effect_block(cause_id: u32, effect_id: u32) -> TriggerBlock {
        TriggerBlock::new(vec![
            Trigger::new(TriggerCategory::Cause, cause_id),
            Trigger::new(TriggerCategory::Effect, effect_id),
        ])
    }

    #[test]
    fn test_duplicate_handler_rejected_without_override() {
        let page = Page::new(Vec::new(), false);
        page.set_trigger_handler(TriggerCategory::Effect, 1, |_, _, _| true)
            .expect("first registration");
        let err = page
            .set_trigger_handler(TriggerCategory::Effect, 1, |_, _, _| true)
            .expect_err("second registration");
        assert_eq!(
            err,
            RegistryError::DuplicateHandler {
                key: TriggerKey::new(TriggerCategory::Effect, 1),
            }
        );
    }

    #[test]
    fn test_override_replaces_handler() {
        let page = Page::new(vec![cause_effect_block(1, 9)], true);
        page.set_trigger_handler(TriggerCategory::Cause, 1, |_, _, _| false)
            .expect("first registration");
        // The replacement lets the block through.
        page.set_trigger_handler(TriggerCategory::Cause, 1, |_, _, _| true)
            .expect("override registration");
        page.set_trigger_handler(TriggerCategory::Effect, 9, |_, _, _| true)
            .expect("effect registration");

        let summary = page.execute(None, None, &[1]);
        assert_eq!(summary.completed, 1);
    }

    #[test]
    fn test_remove_trigger_handler() {
        let page = Page::new(Vec::new(), false);
        page.set_trigger_handler(TriggerCategory::Condition, 5, |_, _, _| true)
            .expect("registration");
        assert!(page.remove_trigger_handler(TriggerCategory::Condition, 5));
        assert!(!page.remove_trigger_handler(TriggerCategory::Condition, 5));
        // The key is free again.
        page.set_trigger_handler(TriggerCategory::Condition, 5, |_, _, _| true)
            .expect("re-registration after removal");
    }

    #[test]
    fn test_global_variable_upsert() {
        let page = Page::new(Vec::new(), false);
        page.set_global_variable("x", 5);
        assert_eq!(page.global_variable("x"), Some(Value::Number(5.0)));
        page.set_global_variable("x", 6);
        assert_eq!(page.global_variable("x"), Some(Value::Number(6.0)));
        assert_eq!(page.global_variable("missing"), None);
    }

    #[test]
    fn test_handler_may_reenter_page_operations() {
        let page = Arc::new(Page::new(vec![cause_effect_block(1, 2)], false));
        let inner = Arc::clone(&page);
        page.set_trigger_handler(TriggerCategory::Effect, 2, move |_, _, _| {
            // Re-entering the page from inside a handler must not deadlock.
            inner.set_global_variable("ran", 1);
            true
        })
        .expect("effect registration");

        let summary = page.execute(None, None, &[1]);
        assert_eq!(summary.completed, 1);
        assert_eq!(page.global_variable("ran"), Some(Value::Number(1.0)));
    }

    #[test]
    fn test_malformed_block_faults_at_execute() {
        let block = TriggerBlock::new(vec![
            Trigger::new(TriggerCategory::Cause, 1),
            Trigger::new(TriggerCategory::Effect, 2),
            Trigger::new(TriggerCategory::Condition, 3),
        ]);
        let page = Page::new(vec![block], false);

        let summary = page.execute(None, None, &[1]);
        assert_eq!(summary.matched, 1);
        assert_eq!(summary.completed, 0);
        assert_eq!(summary.faults.len(), 1);
        assert!(matches!(
            summary.faults[0].error,
            ExecError::MalformedBlock {
                violation: BlockViolation::CategoryOrder { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_missing_handler_faults_block() {
        let page = Page::new(
            vec![TriggerBlock::new(vec![
                Trigger::new(TriggerCategory::Cause, 1),
                Trigger::new(TriggerCategory::Condition, 2),
            ])],
            false,
        );

        let summary = page.execute(None, None, &[1]);
        assert_eq!(summary.faults.len(), 1);
        assert!(matches!(
            summary.faults[0].error,
            ExecError::MissingHandler {
                key: TriggerKey {
                    category: TriggerCategory::Condition,
                    id: 2,
                },
            }
        ));
    }

    #[test]
    fn test_cause_without_handler_is_implicitly_true() {
        let page = Page::new(vec![cause_effect_block(4, 8)], false);
        page.set_trigger_handler(TriggerCategory::Effect, 8, |_, _, _| true)
            .expect("effect registration");

        let summary = page.execute(None, None, &[4]);
        assert_eq!(summary.completed, 1);
        assert!(summary.is_clean());
    }
}
