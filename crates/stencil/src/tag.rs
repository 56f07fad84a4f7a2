//! Per-node compile state
//!
//! A [`Tag`] exists only while the compile walk is at one mutated
//! element. Handlers register wrappers around the element's content
//! (`inner`) or around the whole element (`outer`); wrappers are applied
//! in registration order, each one wrapping the result of the previous.

use crate::ast::{Ast, VarRef};
use stencil_dom::NodeId;

/// An AST transformation registered by a handler
pub type Wrap = Box<dyn FnOnce(Ast) -> Ast>;

/// Data handlers leave for the attribute pass
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TagData {
    overrides: Vec<(String, VarRef)>,
}

impl TagData {
    /// Override an attribute; a later override of the same name wins.
    /// Names are ASCII case-insensitive and stored lowercased, as the
    /// parser stores source attributes.
    pub fn set_override(&mut self, name: &str, var: VarRef) {
        let name = name.to_ascii_lowercase();
        self.overrides.retain(|(existing, _)| *existing != name);
        self.overrides.push((name, var));
    }

    pub fn override_for(&self, name: &str) -> Option<VarRef> {
        self.overrides
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, var)| *var)
    }

    pub fn overrides(&self) -> &[(String, VarRef)] {
        &self.overrides
    }
}

pub struct Tag {
    node: NodeId,
    inner: Vec<Wrap>,
    outer: Vec<Wrap>,
    content: Option<Ast>,
    data: TagData,
}

impl Tag {
    pub fn new(node: NodeId) -> Self {
        Self {
            node,
            inner: Vec::new(),
            outer: Vec::new(),
            content: None,
            data: TagData::default(),
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn wrap_inner(&mut self, wrap: impl FnOnce(Ast) -> Ast + 'static) {
        self.inner.push(Box::new(wrap));
    }

    pub fn wrap_outer(&mut self, wrap: impl FnOnce(Ast) -> Ast + 'static) {
        self.outer.push(Box::new(wrap));
    }

    /// Supply the element's base content; its children are then not compiled
    pub fn set_content(&mut self, content: Ast) {
        self.content = Some(content);
    }

    pub fn data(&self) -> &TagData {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut TagData {
        &mut self.data
    }

    pub(crate) fn take_content(&mut self) -> Option<Ast> {
        self.content.take()
    }

    pub(crate) fn apply_inner(&mut self, content: Ast) -> Ast {
        self.inner.drain(..).fold(content, |ast, wrap| wrap(ast))
    }

    pub(crate) fn apply_outer(&mut self, element: Ast) -> Ast {
        self.outer.drain(..).fold(element, |ast, wrap| wrap(ast))
    }
}

impl std::fmt::Debug for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tag")
            .field("node", &self.node)
            .field("inner", &self.inner.len())
            .field("outer", &self.outer.len())
            .field("content", &self.content)
            .field("data", &self.data)
            .finish()
    }
}
