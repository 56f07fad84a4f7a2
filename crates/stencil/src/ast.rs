//! Template AST
//!
//! The tree handed from the compile walk to a [`Backend`](crate::Backend).
//! `Static` always holds finished markup: text and attribute values are
//! escaped before they are wrapped, so backends write it verbatim.

use crate::context::{ContextId, ParamList, Slot};
use std::fmt;

/// Reference to one slot of one context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VarRef {
    pub context: ContextId,
    pub slot: Slot,
}

impl VarRef {
    pub fn new(context: ContextId, slot: Slot) -> Self {
        Self { context, slot }
    }
}

impl fmt::Display for VarRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "_c{}_{}", self.context.0, self.slot)
    }
}

/// Branch condition of an [`Ast::If`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cond {
    Truthy(VarRef),
    Falsy(VarRef),
}

impl Cond {
    pub fn var(self) -> VarRef {
        match self {
            Cond::Truthy(var) | Cond::Falsy(var) => var,
        }
    }
}

/// Header of an [`Ast::Block`]: iterate `source`, binding each item to
/// the loop parameters of the repeated region's context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopHeader {
    pub source: VarRef,
    /// `None` when the repeated region never entered a nested context
    pub frame: Option<ParamList>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Ast {
    Static(String),
    Dynamic(VarRef),
    Multi(Vec<Ast>),
    If {
        cond: Cond,
        then: Box<Ast>,
        otherwise: Option<Box<Ast>>,
    },
    Block {
        header: LoopHeader,
        body: Box<Ast>,
    },
    Element {
        name: String,
        attrs: Box<Ast>,
        content: Box<Ast>,
    },
    /// One attribute inside an element's `attrs`
    Attr {
        name: String,
        value: Box<Ast>,
    },
}

impl Ast {
    /// Emits nothing
    pub fn empty() -> Self {
        Ast::Multi(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Ast::Static(s) => s.is_empty(),
            Ast::Multi(items) => items.iter().all(Ast::is_empty),
            _ => false,
        }
    }

    pub fn if_else(cond: Cond, then: Ast, otherwise: Option<Ast>) -> Self {
        Ast::If {
            cond,
            then: Box::new(then),
            otherwise: otherwise.map(Box::new),
        }
    }

    pub fn element(name: impl Into<String>, attrs: Ast, content: Ast) -> Self {
        Ast::Element {
            name: name.into(),
            attrs: Box::new(attrs),
            content: Box::new(content),
        }
    }

    pub fn attr(name: impl Into<String>, value: Ast) -> Self {
        Ast::Attr {
            name: name.into(),
            value: Box::new(value),
        }
    }
}

impl fmt::Display for LoopHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(each {}", self.source)?;
        if let Some(frame) = &self.frame {
            write!(f, " |{}|", frame.names().join(" "))?;
        }
        f.write_str(")")
    }
}

/// S-expression dump, used when inspecting a compiled template
impl fmt::Display for Ast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ast::Static(text) => write!(f, "(static {text:?})"),
            Ast::Dynamic(var) => write!(f, "(dynamic {var})"),
            Ast::Multi(items) => {
                f.write_str("(multi")?;
                for item in items {
                    write!(f, " {item}")?;
                }
                f.write_str(")")
            }
            Ast::If {
                cond,
                then,
                otherwise,
            } => {
                match cond {
                    Cond::Truthy(var) => write!(f, "(if {var} {then}")?,
                    Cond::Falsy(var) => write!(f, "(if (not {var}) {then}")?,
                }
                if let Some(otherwise) = otherwise {
                    write!(f, " {otherwise}")?;
                }
                f.write_str(")")
            }
            Ast::Block { header, body } => write!(f, "(block {header} {body})"),
            Ast::Element {
                name,
                attrs,
                content,
            } => write!(f, "(element {name} {attrs} {content})"),
            Ast::Attr { name, value } => write!(f, "(attr {name} {value})"),
        }
    }
}
