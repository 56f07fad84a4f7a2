//! Slot allocation frames
//!
//! One context backs the top-level render arguments; every repeated
//! region that declares mutations of its own gets a nested one.

use crate::ast::VarRef;
use crate::scope::ScopeId;
use std::fmt;

/// Context identifier, assigned sequentially per document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(pub u32);

/// Dense positional index within a context
pub type Slot = usize;

#[derive(Debug)]
pub struct Context {
    id: ContextId,
    slot_count: usize,
    scope: ScopeId,
}

impl Context {
    pub(crate) fn new(id: ContextId, scope: ScopeId) -> Self {
        Self {
            id,
            slot_count: 0,
            scope,
        }
    }

    pub fn id(&self) -> ContextId {
        self.id
    }

    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    /// Root scope over this context's node set
    pub fn scope(&self) -> ScopeId {
        self.scope
    }

    /// Hand out the next slot. Scopes call this once per distinct mutation.
    pub(crate) fn allocate_slot(&mut self) -> Slot {
        let slot = self.slot_count;
        self.slot_count += 1;
        tracing::trace!("Allocated slot {}", VarRef::new(self.id, slot));
        slot
    }

    pub fn var(&self, slot: Slot) -> VarRef {
        VarRef::new(self.id, slot)
    }

    /// Parameters of the top-level render frame; missing trailing
    /// arguments read as absent.
    pub fn parameter_list(&self) -> ParamList {
        ParamList {
            context: self.id,
            arity: self.slot_count,
            optional: true,
        }
    }

    /// Parameters bound by each iteration of a repeated region
    pub fn loop_parameter_list(&self) -> ParamList {
        ParamList {
            context: self.id,
            arity: self.slot_count,
            optional: false,
        }
    }
}

/// Parameter-list description handed to a backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamList {
    pub context: ContextId,
    pub arity: usize,
    pub optional: bool,
}

impl ParamList {
    pub fn vars(&self) -> impl Iterator<Item = VarRef> + '_ {
        (0..self.arity).map(|slot| VarRef::new(self.context, slot))
    }

    pub fn names(&self) -> Vec<String> {
        self.vars().map(|var| var.to_string()).collect()
    }
}

impl fmt::Display for ParamList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, var) in self.vars().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{var}")?;
            if self.optional {
                f.write_str(" = absent")?;
            }
        }
        Ok(())
    }
}
