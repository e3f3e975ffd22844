//! Handler plumbing and the per-clause evaluation scope

use std::any::Any;
use std::sync::Arc;

use gridscript_core::{
    Area, ContentItem, Trigger, TriggerKey, Value, VariableError, VariableKind,
};

use crate::page::Page;

/// Opaque host payload carried through an execution (the triggering entity
/// or the event arguments). Handlers downcast to their concrete types.
pub type Payload = dyn Any + Send + Sync;

/// A registered trigger callback.
///
/// Returning false stops evaluation of the current block. The return value
/// of an Effect handler is ignored - effects never gate later clauses.
pub type TriggerHandler =
    Arc<dyn Fn(&mut TriggerScope<'_>, Option<&Payload>, Option<&Payload>) -> bool + Send + Sync>;

/// Host-supplied resolver for private variable references.
///
/// Invoked at read time with the clause being evaluated, the triggering
/// entity and the variable key; the engine passes the result through
/// verbatim.
pub type PrivateVariableResolver =
    Arc<dyn Fn(&Trigger, Option<&Payload>, &str) -> Option<Value> + Send + Sync>;

/// The evaluation view handed to a handler for one clause.
///
/// Bundles the clause, the opaque payloads, the block's working area and
/// access to the owning page's variable stores. Content accessors resolve
/// variable references at read time.
pub struct TriggerScope<'a> {
    node: &'a Trigger,
    entity: Option<&'a Payload>,
    args: Option<&'a Payload>,
    page: &'a Page,
    area: &'a mut Area,
}

impl<'a> TriggerScope<'a> {
    pub(crate) fn new(
        node: &'a Trigger,
        entity: Option<&'a Payload>,
        args: Option<&'a Payload>,
        page: &'a Page,
        area: &'a mut Area,
    ) -> Self {
        Self {
            node,
            entity,
            args,
            page,
            area,
        }
    }

    /// The clause under evaluation.
    pub fn node(&self) -> &Trigger {
        self.node
    }

    pub fn key(&self) -> TriggerKey {
        self.node.key()
    }

    /// The entity that triggered the cause, if the host supplied one.
    pub fn entity(&self) -> Option<&Payload> {
        self.entity
    }

    /// The event arguments, if the host supplied any.
    pub fn args(&self) -> Option<&Payload> {
        self.args
    }

    /// Downcast the triggering entity to a concrete type.
    pub fn entity_as<T: Any>(&self) -> Option<&T> {
        self.entity.and_then(|entity| entity.downcast_ref())
    }

    /// Downcast the event arguments to a concrete type.
    pub fn args_as<T: Any>(&self) -> Option<&T> {
        self.args.and_then(|args| args.downcast_ref())
    }

    /// The block's working area. Empty until an Area clause establishes it.
    pub fn area(&self) -> &Area {
        self.area
    }

    /// Mutable working area: Area handlers populate it, Filter handlers
    /// narrow it.
    pub fn area_mut(&mut self) -> &mut Area {
        self.area
    }

    /// Replace the working area wholesale.
    pub fn set_area(&mut self, area: Area) {
        *self.area = area;
    }

    pub fn content_len(&self) -> usize {
        self.node.content.len()
    }

    /// Resolve the content item at `index` to a value.
    ///
    /// Literals are returned as written; global references read the page's
    /// variable store; private references go through the host resolver.
    pub fn get(&self, index: usize) -> Result<Value, VariableError> {
        let item = self
            .node
            .content
            .get(index)
            .ok_or(VariableError::IndexOutOfRange {
                index,
                len: self.node.content.len(),
            })?;

        match item {
            ContentItem::Literal(value) => Ok(value.clone()),
            ContentItem::Variable {
                kind: VariableKind::Global,
                key,
            } => self
                .page
                .global_variable(key)
                .ok_or_else(|| VariableError::GlobalNotFound { key: key.clone() }),
            ContentItem::Variable {
                kind: VariableKind::Private,
                key,
            } => self.page.resolve_private(self.node, self.entity, key),
        }
    }

    /// Integral accessor; fractional values fail rather than truncate.
    pub fn get_int(&self, index: usize) -> Result<i64, VariableError> {
        let value = self.get(index)?;
        value
            .to_integer()
            .ok_or_else(|| VariableError::TypeConversion {
                index,
                expected: "integer",
                found: value.to_text(),
            })
    }

    pub fn get_double(&self, index: usize) -> Result<f64, VariableError> {
        let value = self.get(index)?;
        value
            .to_number()
            .ok_or_else(|| VariableError::TypeConversion {
                index,
                expected: "number",
                found: value.to_text(),
            })
    }

    /// Text accessor; never fails for a resolvable item.
    pub fn get_string(&self, index: usize) -> Result<String, VariableError> {
        Ok(self.get(index)?.to_text())
    }

    /// The key of the variable reference at `index`.
    pub fn variable_name(&self, index: usize) -> Result<&str, VariableError> {
        match self.node.content.get(index) {
            Some(ContentItem::Variable { key, .. }) => Ok(key),
            Some(ContentItem::Literal(_)) => Err(VariableError::NotAVariable { index }),
            None => Err(VariableError::IndexOutOfRange {
                index,
                len: self.node.content.len(),
            }),
        }
    }
}
