//! Selector-addressed node sets
//!
//! Scopes are owned by their [`Document`](crate::Document) and addressed
//! by [`ScopeId`]. Each one keeps the mutations logged against it and
//! memoizes the child scopes resolved from it.

use crate::context::{ContextId, Slot};
use crate::mutation::{LoggedMutation, MutationKey};
use stencil_dom::NodeId;
use std::collections::HashMap;

/// Scope identifier, only meaningful for the document that issued it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(pub u32);

#[derive(Debug)]
pub struct Scope {
    id: ScopeId,
    nodes: Vec<NodeId>,
    context: ContextId,
    /// Insertion order; the compile walk runs handlers in this order
    log: Vec<LoggedMutation>,
    slots: HashMap<MutationKey, Slot>,
    children: HashMap<String, ScopeId>,
    nested: Option<ContextId>,
}

impl Scope {
    pub(crate) fn new(id: ScopeId, nodes: Vec<NodeId>, context: ContextId) -> Self {
        Self {
            id,
            nodes,
            context,
            log: Vec::new(),
            slots: HashMap::new(),
            children: HashMap::new(),
            nested: None,
        }
    }

    pub fn id(&self) -> ScopeId {
        self.id
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Context the scope's slots are allocated from
    pub fn context(&self) -> ContextId {
        self.context
    }

    pub fn mutations(&self) -> &[LoggedMutation] {
        &self.log
    }

    pub fn slot_for(&self, key: &MutationKey) -> Option<Slot> {
        self.slots.get(key).copied()
    }

    /// Context created for a repeated region rooted at this scope
    pub fn nested_context(&self) -> Option<ContextId> {
        self.nested
    }

    pub(crate) fn child(&self, selector: &str) -> Option<ScopeId> {
        self.children.get(selector).copied()
    }

    pub(crate) fn insert_child(&mut self, selector: &str, child: ScopeId) {
        self.children.insert(selector.to_string(), child);
    }

    pub(crate) fn set_nested(&mut self, context: ContextId) {
        self.nested = Some(context);
    }

    pub(crate) fn record(&mut self, key: MutationKey, slot: Slot) {
        self.slots.insert(key.clone(), slot);
        self.log.push(LoggedMutation { key, slot });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mutation::{APPEND, SET_ATTRIBUTE};

    #[test]
    fn test_record_keeps_order() {
        let mut scope = Scope::new(ScopeId(0), vec![NodeId(1)], ContextId(0));
        scope.record(MutationKey::new(SET_ATTRIBUTE, &["href"]), 0);
        scope.record(MutationKey::new(APPEND, &[]), 1);

        let kinds: Vec<_> = scope.mutations().iter().map(|m| m.key.kind.as_str()).collect();
        assert_eq!(kinds, vec![SET_ATTRIBUTE, APPEND]);
        assert_eq!(scope.slot_for(&MutationKey::new(APPEND, &[])), Some(1));
        assert_eq!(scope.slot_for(&MutationKey::new(SET_ATTRIBUTE, &["id"])), None);
    }
}
